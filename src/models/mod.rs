pub mod enums;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use enums::{EventCategory, EventType};

/// A persisted class: the recurring meeting pattern plus course identity.
///
/// `days` uses weekday indices 0 = Monday … 6 = Sunday throughout the crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRecord {
    pub id: Uuid,
    pub name: String,
    pub course_code: Option<String>,
    /// Union of all schedule slots' weekdays.
    pub days: Vec<u8>,
    /// Primary meeting block ("HH:MM").
    pub start_time: String,
    pub end_time: String,
    pub term_start: Option<NaiveDate>,
    pub term_end: Option<NaiveDate>,
    /// Category label → grade weight percentage, aggregated from imported events.
    pub weights: BTreeMap<String, f32>,
}

/// A persisted calendar event owned by a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEventRecord {
    pub id: Uuid,
    pub class_id: Uuid,
    pub date: NaiveDate,
    /// Resolved start time ("HH:MM"), from the event itself or the matching slot.
    pub time: String,
    pub description: String,
    pub event_type: EventType,
    pub category: Option<EventCategory>,
    pub weight: Option<f32>,
}
