//! Review-stage payload and validation.
//!
//! After a parse, the caller shows the extracted events and schedule for
//! correction and sends back an [`ImportPayload`]. Validation runs the
//! structural rules in a fixed order and reports the first violation;
//! nothing touches the database until the whole payload passes.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::enums::{EventCategory, EventType};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One recurring meeting block as confirmed by the reviewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSlot {
    /// Weekday indices, 0 = Monday through 6 = Sunday.
    pub days: Vec<u8>,
    /// "HH:MM", 24-hour.
    pub start_time: String,
    pub end_time: String,
}

/// One event row as it left the review screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewedEvent {
    pub date: Option<NaiveDate>,
    /// "HH:MM" when the reviewer set one; otherwise resolved from the
    /// schedule slot matching the event's weekday.
    pub time: Option<String>,
    pub description: String,
    pub event_type: EventType,
    pub category: Option<EventCategory>,
    /// Deselected rows are kept in the payload but never imported.
    pub include: bool,
    /// Grade weight percentage (0-100).
    pub weight: Option<f32>,
}

/// Everything the importer needs, post-review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPayload {
    pub course_name: String,
    pub course_code: Option<String>,
    pub term_start: Option<NaiveDate>,
    pub term_end: Option<NaiveDate>,
    pub schedule_slots: Vec<ScheduleSlot>,
    pub events: Vec<ReviewedEvent>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("course name must not be empty")]
    EmptyCourseName,

    #[error("at least one schedule slot with valid days and times is required")]
    NoValidScheduleSlot,

    #[error("schedule slot {index} is invalid: {reason}")]
    InvalidScheduleSlot { index: usize, reason: String },

    #[error("events were extracted but none are marked for import")]
    NoIncludedEvents,

    #[error("included event {index} (\"{description}\") has no date")]
    EventMissingDate { index: usize, description: String },

    #[error("included event {index} (\"{description}\") has no time and no schedule slot covers its weekday")]
    EventTimeUnresolvable { index: usize, description: String },
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a payload against the structural rules, in order. Returns on
/// the first violation so the caller can surface one actionable message.
pub fn validate_payload(payload: &ImportPayload) -> Result<(), ValidationError> {
    if payload.course_name.trim().is_empty() {
        return Err(ValidationError::EmptyCourseName);
    }

    let mut any_valid_slot = false;
    for (index, slot) in payload.schedule_slots.iter().enumerate() {
        match slot_problem(slot) {
            None => any_valid_slot = true,
            Some(reason) => {
                return Err(ValidationError::InvalidScheduleSlot { index, reason });
            }
        }
    }
    if !any_valid_slot {
        return Err(ValidationError::NoValidScheduleSlot);
    }

    if !payload.events.is_empty() && !payload.events.iter().any(|e| e.include) {
        return Err(ValidationError::NoIncludedEvents);
    }

    for (index, event) in payload.events.iter().enumerate().filter(|(_, e)| e.include) {
        let date = event.date.ok_or_else(|| ValidationError::EventMissingDate {
            index,
            description: event.description.clone(),
        })?;

        if resolve_event_time(event, date, &payload.schedule_slots).is_none() {
            return Err(ValidationError::EventTimeUnresolvable {
                index,
                description: event.description.clone(),
            });
        }
    }

    Ok(())
}

fn slot_problem(slot: &ScheduleSlot) -> Option<String> {
    if slot.days.is_empty() {
        return Some("no meeting days".to_string());
    }
    if let Some(bad) = slot.days.iter().find(|d| **d > 6) {
        return Some(format!("day index {bad} out of range (0-6)"));
    }
    if !is_valid_clock(&slot.start_time) || !is_valid_clock(&slot.end_time) {
        return Some("times must be HH:MM".to_string());
    }
    if slot.start_time >= slot.end_time {
        return Some("start time must precede end time".to_string());
    }
    None
}

/// "HH:MM", 24-hour. Zero-padded strings compare correctly as text, which
/// the slot ordering check relies on.
pub(crate) fn is_valid_clock(value: &str) -> bool {
    let Some((h, m)) = value.split_once(':') else {
        return false;
    };
    h.len() == 2
        && m.len() == 2
        && h.parse::<u8>().map(|h| h < 24).unwrap_or(false)
        && m.parse::<u8>().map(|m| m < 60).unwrap_or(false)
}

/// The event's own time wins; otherwise the first slot meeting on the
/// event's weekday supplies its start time.
pub(crate) fn resolve_event_time(
    event: &ReviewedEvent,
    date: NaiveDate,
    slots: &[ScheduleSlot],
) -> Option<String> {
    if let Some(time) = event.time.as_deref() {
        if is_valid_clock(time) {
            return Some(time.to_string());
        }
    }

    let weekday = date.weekday().num_days_from_monday() as u8;
    slots
        .iter()
        .find(|s| s.days.contains(&weekday) && is_valid_clock(&s.start_time))
        .map(|s| s.start_time.clone())
}
