//! Itinerary document model as read from the content store.
//!
//! The store owns these documents; the pipeline only ever reads an immutable-per-request
//! snapshot. [`Itinerary::validate`] checks the invariants the store promises so fixtures and
//! editor-side tooling can assert them without a round trip.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::{_prelude::*, error::ValidationError};

const DOCUMENT_ID_MAX_LEN: usize = 64;

/// Error returned when document-identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum DocumentIdError {
	/// The identifier was empty.
	#[error("Document identifier cannot be empty.")]
	Empty,
	/// The identifier exceeded the allowed character count.
	#[error("Document identifier exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
	/// The identifier contains a character outside `[A-Za-z0-9_-]`.
	#[error("Document identifier contains the forbidden character `{found}`.")]
	ForbiddenCharacter {
		/// First offending character.
		found: char,
	},
}

/// Unique identifier of an itinerary document.
///
/// Restricted to `[A-Za-z0-9_-]` so an identifier can be embedded verbatim in URLs, signed
/// messages, and filenames without escaping.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);
impl DocumentId {
	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, DocumentIdError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for DocumentId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for DocumentId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for DocumentId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<DocumentId> for String {
	fn from(value: DocumentId) -> Self {
		value.0
	}
}
impl TryFrom<String> for DocumentId {
	type Error = DocumentIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl Debug for DocumentId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "DocumentId({})", self.0)
	}
}
impl Display for DocumentId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for DocumentId {
	type Err = DocumentIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

fn validate_view(view: &str) -> Result<(), DocumentIdError> {
	if view.is_empty() {
		return Err(DocumentIdError::Empty);
	}
	if view.len() > DOCUMENT_ID_MAX_LEN {
		return Err(DocumentIdError::TooLong { max: DOCUMENT_ID_MAX_LEN });
	}
	if let Some(found) =
		view.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
	{
		return Err(DocumentIdError::ForbiddenCharacter { found });
	}

	Ok(())
}

/// Multi-day travel plan with lodging bookings, snapshotted from the content store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
	/// Unique document identifier.
	pub id: DocumentId,
	/// Display name of the traveling client; drives the download filename.
	pub client_name: String,
	/// First travel day, inclusive.
	pub start: Date,
	/// Last travel day, inclusive.
	pub end: Date,
	/// Number of travelers covered by the plan.
	pub head_count: u32,
	/// Ordered day-by-day schedule.
	#[serde(default)]
	pub days: Vec<DayEntry>,
	/// Ordered lodging bookings; ranges may overlap across occupant groups.
	#[serde(default)]
	pub hotels: Vec<HotelBooking>,
}
impl Itinerary {
	/// Checks the invariants the content store promises for a well-formed document.
	///
	/// `start ≤ end`, day entries unique per date and inside the travel window, and every
	/// booking checking in strictly before it checks out.
	pub fn validate(&self) -> Result<(), ValidationError> {
		if self.start > self.end {
			return Err(ValidationError::InvalidRange { start: self.start, end: self.end });
		}

		let mut seen = Vec::with_capacity(self.days.len());

		for day in &self.days {
			if day.date < self.start || day.date > self.end {
				return Err(ValidationError::DayOutsideRange { date: day.date });
			}
			if seen.contains(&day.date) {
				return Err(ValidationError::DuplicateDay { date: day.date });
			}

			seen.push(day.date);
		}

		for booking in &self.hotels {
			if booking.check_in >= booking.check_out {
				return Err(ValidationError::BookingOrder { hotel: booking.hotel.clone() });
			}
		}

		Ok(())
	}
}

/// One calendar day of the schedule.
///
/// Created by a human editor or synthesized by [`crate::schedule::reconcile`]; never deleted
/// automatically.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayEntry {
	/// Calendar day; unique key within an itinerary.
	pub date: Date,
	/// Short heading for the day.
	pub title: String,
	/// Free-text morning program.
	#[serde(default)]
	pub morning: String,
	/// Free-text afternoon program.
	#[serde(default)]
	pub afternoon: String,
	/// Free-text evening program.
	#[serde(default)]
	pub evening: String,
	/// Optional structured activity list.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub activities: Option<Vec<String>>,
	/// Optional lunch note.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub lunch: Option<String>,
	/// Optional dinner note.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub dinner: Option<String>,
}
impl DayEntry {
	/// Creates an entry with the provided title and empty activity fields.
	pub fn synthesized(date: Date, title: impl Into<String>) -> Self {
		Self {
			date,
			title: title.into(),
			morning: String::new(),
			afternoon: String::new(),
			evening: String::new(),
			activities: None,
			lunch: None,
			dinner: None,
		}
	}
}

/// One lodging booking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelBooking {
	/// Hotel name.
	pub hotel: String,
	/// Check-in day.
	pub check_in: Date,
	/// Check-out day; strictly after check-in.
	pub check_out: Date,
	/// Occupant-group label used to visually cluster bookings of one sub-party.
	pub group: String,
	/// Optional free-text note.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub note: Option<String>,
	/// Optional display color tag.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
}
impl HotelBooking {
	/// Number of nights covered by the booking.
	pub fn nights(&self) -> i64 {
		(self.check_out - self.check_in).whole_days()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::date;
	// self
	use super::*;

	fn minimal(id: &str) -> Itinerary {
		Itinerary {
			id: DocumentId::new(id).expect("Fixture identifier should be valid."),
			client_name: "Lee".into(),
			start: date!(2026 - 03 - 01),
			end: date!(2026 - 03 - 03),
			head_count: 2,
			days: Vec::new(),
			hotels: Vec::new(),
		}
	}

	#[test]
	fn document_id_enforces_allow_list() {
		assert!(DocumentId::new("abc123").is_ok());
		assert!(DocumentId::new("trip_2026-feb").is_ok());
		assert!(matches!(DocumentId::new(""), Err(DocumentIdError::Empty)));
		assert!(matches!(
			DocumentId::new("a/b"),
			Err(DocumentIdError::ForbiddenCharacter { found: '/' })
		));
		assert!(matches!(
			DocumentId::new("a".repeat(65)),
			Err(DocumentIdError::TooLong { max: 64 })
		));
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let id: DocumentId =
			serde_json::from_str("\"abc123\"").expect("Identifier should deserialize.");

		assert_eq!(id.as_ref(), "abc123");
		assert!(serde_json::from_str::<DocumentId>("\"../etc\"").is_err());
	}

	#[test]
	fn validate_catches_backwards_range() {
		let mut itinerary = minimal("doc-1");

		itinerary.end = date!(2026 - 02 - 01);

		assert!(matches!(
			itinerary.validate(),
			Err(ValidationError::InvalidRange { .. })
		));
	}

	#[test]
	fn validate_catches_duplicate_and_out_of_range_days() {
		let mut itinerary = minimal("doc-2");

		itinerary.days = vec![
			DayEntry::synthesized(date!(2026 - 03 - 01), "Day 1"),
			DayEntry::synthesized(date!(2026 - 03 - 01), "Day 1 again"),
		];

		assert!(matches!(itinerary.validate(), Err(ValidationError::DuplicateDay { .. })));

		itinerary.days = vec![DayEntry::synthesized(date!(2026 - 03 - 09), "Stray")];

		assert!(matches!(itinerary.validate(), Err(ValidationError::DayOutsideRange { .. })));
	}

	#[test]
	fn validate_requires_check_in_before_check_out() {
		let mut itinerary = minimal("doc-3");

		itinerary.hotels = vec![HotelBooking {
			hotel: "Backwards Inn".into(),
			check_in: date!(2026 - 03 - 02),
			check_out: date!(2026 - 03 - 02),
			group: "All".into(),
			note: None,
			color: None,
		}];

		assert!(matches!(itinerary.validate(), Err(ValidationError::BookingOrder { .. })));
	}

	#[test]
	fn overlapping_bookings_across_groups_are_legal() {
		let mut itinerary = minimal("doc-4");

		itinerary.hotels = vec![
			HotelBooking {
				hotel: "Harbor View Hotel".into(),
				check_in: date!(2026 - 03 - 01),
				check_out: date!(2026 - 03 - 03),
				group: "Parents".into(),
				note: None,
				color: None,
			},
			HotelBooking {
				hotel: "Garden Lodge".into(),
				check_in: date!(2026 - 03 - 01),
				check_out: date!(2026 - 03 - 02),
				group: "Kids".into(),
				note: None,
				color: None,
			},
		];

		assert!(itinerary.validate().is_ok());
		assert_eq!(itinerary.hotels[0].nights(), 2);
	}

	#[test]
	fn itinerary_decodes_camel_case_payloads() {
		let payload = r#"{
			"id": "abc123",
			"clientName": "Lee",
			"start": "2026-03-01",
			"end": "2026-03-03",
			"headCount": 2,
			"days": [{"date": "2026-03-02", "title": "Old town walk"}],
			"hotels": [{
				"hotel": "Harbor View Hotel",
				"checkIn": "2026-03-01",
				"checkOut": "2026-03-03",
				"group": "All"
			}]
		}"#;
		let itinerary: Itinerary =
			serde_json::from_str(payload).expect("CMS payload should deserialize.");

		assert_eq!(itinerary.client_name, "Lee");
		assert_eq!(itinerary.days[0].title, "Old town walk");
		assert_eq!(itinerary.days[0].morning, "");
		assert_eq!(itinerary.hotels[0].nights(), 2);
		itinerary.validate().expect("Fixture payload should satisfy the invariants.");
	}
}
