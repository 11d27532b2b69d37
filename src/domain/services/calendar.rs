use crate::domain::models::booking::{Booking, BookingService};
use crate::domain::models::customer::Customer;
use chrono::Duration;
use icalendar::{Calendar, Component, Event as IcalEvent, EventLike};

/// Generates the .ics invite attached to customer reminder emails.
pub fn generate_ics(booking: &Booking, customer: &Customer, lines: &[BookingService]) -> String {
    let total_min: i64 = lines.iter().map(|l| l.duration_min as i64).max().unwrap_or(60);
    let description = if lines.is_empty() {
        "Spa appointment".to_string()
    } else {
        lines.iter()
            .map(|l| format!("{} ({} min)", l.service_name, l.duration_min))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut calendar = Calendar::new();

    let ical_event = IcalEvent::new()
        .summary(&format!("Spa appointment for {}", customer.name))
        .description(&description)
        .location(&booking.address)
        .starts(booking.scheduled_at)
        .ends(booking.scheduled_at + Duration::minutes(total_min))
        .uid(&booking.id)
        .done();

    calendar.push(ical_event);
    calendar.to_string()
}
