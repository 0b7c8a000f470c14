//! Day-by-day schedule reconciliation.
//!
//! [`reconcile`] expands a travel date range into calendar entries while preserving whatever
//! a human editor already wrote: existing entries are never mutated, removed, or reordered
//! relative to each other. Only missing dates gain a synthesized placeholder entry, which
//! makes the operation additive and idempotent.

// std
use std::collections::HashSet;
// self
use crate::{_prelude::*, error::ValidationError, itinerary::DayEntry};

/// Largest inclusive day count a travel window may span.
pub const MAX_SPAN_DAYS: i64 = 30;

/// Merges `existing` with synthesized entries so every date in `[start, end]` is covered.
///
/// Fails with [`ValidationError::InvalidRange`] when the range runs backwards and with
/// [`ValidationError::SpanTooLong`] when the inclusive span exceeds [`MAX_SPAN_DAYS`]. The
/// result is sorted ascending by date; re-running on its own output is a no-op.
pub fn reconcile(
	start: Date,
	end: Date,
	existing: Vec<DayEntry>,
) -> Result<Vec<DayEntry>, ValidationError> {
	if start > end {
		return Err(ValidationError::InvalidRange { start, end });
	}

	let days = (end - start).whole_days() + 1;

	if days > MAX_SPAN_DAYS {
		return Err(ValidationError::SpanTooLong { days, max: MAX_SPAN_DAYS });
	}

	let present: HashSet<Date> = existing.iter().map(|entry| entry.date).collect();
	let mut merged = existing;

	for offset in 0..days {
		let date = start + Duration::days(offset);

		if present.contains(&date) {
			continue;
		}

		merged.push(DayEntry::synthesized(date, default_title(offset, days)));
	}

	// Stable sort: entries sharing a date keep their original relative order.
	merged.sort_by_key(|entry| entry.date);

	Ok(merged)
}

fn default_title(offset: i64, total: i64) -> String {
	let n = offset + 1;

	if offset == 0 {
		format!("Day {n} (Departure)")
	} else if offset == total - 1 {
		format!("Day {n} (Return)")
	} else {
		format!("Day {n}")
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::date;
	// self
	use super::*;

	#[test]
	fn empty_input_yields_one_entry_per_date() {
		let days = reconcile(date!(2026 - 02 - 20), date!(2026 - 02 - 26), Vec::new())
			.expect("Seven-day range should reconcile.");

		assert_eq!(days.len(), 7);

		for (offset, entry) in days.iter().enumerate() {
			assert_eq!(entry.date, date!(2026 - 02 - 20) + Duration::days(offset as i64));
		}

		assert_eq!(days[0].title, "Day 1 (Departure)");
		assert_eq!(days[3].title, "Day 4");
		assert_eq!(days[6].title, "Day 7 (Return)");
	}

	#[test]
	fn existing_entries_are_preserved_verbatim() {
		let custom = DayEntry::synthesized(date!(2026 - 02 - 23), "Custom");
		let days = reconcile(date!(2026 - 02 - 20), date!(2026 - 02 - 26), vec![custom.clone()])
			.expect("Range with one existing entry should reconcile.");

		assert_eq!(days.len(), 7);
		assert_eq!(days[3], custom);
		assert!(days.iter().filter(|entry| entry.date == custom.date).count() == 1);
	}

	#[test]
	fn reconcile_is_idempotent() {
		let once = reconcile(
			date!(2026 - 02 - 20),
			date!(2026 - 02 - 26),
			vec![DayEntry::synthesized(date!(2026 - 02 - 23), "Custom")],
		)
		.expect("First reconciliation should succeed.");
		let twice = reconcile(date!(2026 - 02 - 20), date!(2026 - 02 - 26), once.clone())
			.expect("Second reconciliation should succeed.");

		assert_eq!(once, twice);
	}

	#[test]
	fn backwards_range_is_rejected() {
		assert!(matches!(
			reconcile(date!(2026 - 02 - 26), date!(2026 - 02 - 20), Vec::new()),
			Err(ValidationError::InvalidRange { .. }),
		));
	}

	#[test]
	fn span_is_capped_at_thirty_days() {
		// 30 days inclusive is the boundary; 31 is over.
		assert!(reconcile(date!(2026 - 03 - 01), date!(2026 - 03 - 30), Vec::new()).is_ok());
		assert!(matches!(
			reconcile(date!(2026 - 03 - 01), date!(2026 - 03 - 31), Vec::new()),
			Err(ValidationError::SpanTooLong { days: 31, max: MAX_SPAN_DAYS }),
		));
	}

	#[test]
	fn single_day_range_takes_the_departure_label() {
		let days = reconcile(date!(2026 - 02 - 20), date!(2026 - 02 - 20), Vec::new())
			.expect("Single-day range should reconcile.");

		assert_eq!(days.len(), 1);
		assert_eq!(days[0].title, "Day 1 (Departure)");
	}
}
