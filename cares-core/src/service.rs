//! Event listing and creation over an in-memory collection.
//!
//! These functions never touch the filesystem; pair them with
//! [`EventStore`](crate::store::EventStore) to persist the result.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::{CaresError, CaresResult};
use crate::event::{Event, NewEvent, parse_tags};

/// Events on or after `today`, earliest first. Same-day events keep their
/// order from the collection.
pub fn upcoming(events: &[Event], today: NaiveDate) -> Vec<Event> {
    sorted_by_date(events.iter().filter(|e| e.date >= today))
}

/// Events whose id is in `ids`, earliest first. Unknown ids are ignored.
pub fn enrolled(events: &[Event], ids: &HashSet<u64>) -> Vec<Event> {
    sorted_by_date(events.iter().filter(|e| ids.contains(&e.id)))
}

pub fn find(events: &[Event], id: u64) -> Option<&Event> {
    events.iter().find(|e| e.id == id)
}

/// One more than the largest id in use, or 1 for an empty collection.
pub fn next_id(events: &[Event]) -> CaresResult<u64> {
    let max = events.iter().map(|e| e.id).max().unwrap_or(0);
    max.checked_add(1).ok_or(CaresError::IdsExhausted(max))
}

/// Validate the form, build the event with a fresh id and append it.
///
/// Returns the new event. On a validation error `events` is left untouched.
pub fn add(events: &mut Vec<Event>, fields: NewEvent) -> CaresResult<Event> {
    let event = build_event(next_id(events)?, fields)?;
    events.push(event.clone());
    Ok(event)
}

fn build_event(id: u64, fields: NewEvent) -> CaresResult<Event> {
    let title = fields.title.trim();
    let organization = fields.organization.trim();
    let tags = parse_tags(&fields.tags);
    let spots = fields.spots.filter(|&s| s > 0);
    let date_input = fields.date.trim();

    let date = match date_input {
        "" => None,
        s => Some(NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            CaresError::Validation(format!("Invalid date '{s}'. Expected YYYY-MM-DD"))
        })?),
    };

    let mut missing = Vec::new();
    if title.is_empty() {
        missing.push("title");
    }
    if organization.is_empty() {
        missing.push("organization");
    }
    if date.is_none() {
        missing.push("date");
    }
    if tags.is_empty() {
        missing.push("tags");
    }
    if spots.is_none() {
        missing.push("spots");
    }

    match (date, spots) {
        (Some(date), Some(spots)) if missing.is_empty() => Ok(Event {
            id,
            title: title.to_string(),
            organization: organization.to_string(),
            date,
            spots,
            tags,
        }),
        _ => Err(CaresError::Validation(format!(
            "Please fill out all required fields (missing: {})",
            missing.join(", ")
        ))),
    }
}

fn sorted_by_date<'a>(events: impl Iterator<Item = &'a Event>) -> Vec<Event> {
    let mut events: Vec<Event> = events.cloned().collect();
    // sort_by_key is stable
    events.sort_by_key(|e| e.date);
    events
}
