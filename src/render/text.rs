//! Plain-text itinerary transcript for copy/paste messaging.
//!
//! A pure transform with no I/O and no failure modes: the same snapshot always produces the
//! same transcript. Layout is day-by-day schedule, then the hotel block grouped by occupant
//! label with abbreviated date ranges, then the head-count summary.

// self
use crate::{
	itinerary::{HotelBooking, Itinerary},
	render::{date_range, short_date},
};

/// Renders the itinerary into a line-oriented transcript.
pub fn render(itinerary: &Itinerary) -> String {
	let mut out = String::new();

	out.push_str(&format!("{} Itinerary\n", itinerary.client_name));
	out.push_str(&format!("{}\n", date_range(itinerary.start, itinerary.end)));

	for day in &itinerary.days {
		out.push('\n');
		out.push_str(&format!("{} ({})\n", day.title, short_date(day.date)));

		push_field(&mut out, "Morning", &day.morning);
		push_field(&mut out, "Afternoon", &day.afternoon);
		push_field(&mut out, "Evening", &day.evening);

		if let Some(activities) = &day.activities {
			for activity in activities {
				out.push_str(&format!("  - {activity}\n"));
			}
		}
		if let Some(lunch) = &day.lunch {
			push_field(&mut out, "Lunch", lunch);
		}
		if let Some(dinner) = &day.dinner {
			push_field(&mut out, "Dinner", dinner);
		}
	}

	if !itinerary.hotels.is_empty() {
		out.push_str("\nHotels\n");

		for group in occupant_groups(&itinerary.hotels) {
			out.push_str(&format!("{group}:\n"));

			for booking in itinerary.hotels.iter().filter(|booking| booking.group == group) {
				out.push_str(&format!(
					"  {} ({})",
					booking.hotel,
					date_range(booking.check_in, booking.check_out),
				));

				if let Some(note) = &booking.note {
					out.push_str(&format!(" {note}"));
				}

				out.push('\n');
			}
		}
	}

	out.push_str(&format!("\nTravelers: {}\n", itinerary.head_count));

	out
}

fn push_field(out: &mut String, label: &str, value: &str) {
	if !value.is_empty() {
		out.push_str(&format!("  {label}: {value}\n"));
	}
}

/// Occupant labels in first-appearance order.
fn occupant_groups(hotels: &[HotelBooking]) -> Vec<&str> {
	let mut groups = Vec::new();

	for booking in hotels {
		if !groups.contains(&booking.group.as_str()) {
			groups.push(booking.group.as_str());
		}
	}

	groups
}
