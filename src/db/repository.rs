//! Typed repositories for the class and calendar-event tables.
//!
//! The importer depends only on these traits, so tests (and any alternate
//! storage engine) can substitute an in-memory implementation.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::DatabaseError;
use crate::models::enums::{EventCategory, EventType};
use crate::models::{CalendarEventRecord, ClassRecord};

pub trait ClassRepository: Send + Sync {
    fn insert(&self, class: &ClassRecord) -> Result<(), DatabaseError>;
    fn get(&self, id: Uuid) -> Result<Option<ClassRecord>, DatabaseError>;
    fn delete(&self, id: Uuid) -> Result<(), DatabaseError>;
}

pub trait EventRepository: Send + Sync {
    fn insert(&self, event: &CalendarEventRecord) -> Result<(), DatabaseError>;
    fn get_for_class(&self, class_id: Uuid) -> Result<Vec<CalendarEventRecord>, DatabaseError>;
}

// ── SQLite implementations ──────────────────────────────────────

pub struct SqliteClassRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteClassRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

impl ClassRepository for SqliteClassRepository {
    fn insert(&self, class: &ClassRecord) -> Result<(), DatabaseError> {
        let conn = self.conn.lock().expect("class repo lock poisoned");
        let weights = serde_json::to_string(&class.weights)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
        conn.execute(
            "INSERT INTO classes (id, name, course_code, days, start_time, end_time, term_start, term_end, weights)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                class.id.to_string(),
                class.name,
                class.course_code,
                encode_days(&class.days),
                class.start_time,
                class.end_time,
                class.term_start.map(|d| d.to_string()),
                class.term_end.map(|d| d.to_string()),
                weights,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<ClassRecord>, DatabaseError> {
        let conn = self.conn.lock().expect("class repo lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, course_code, days, start_time, end_time, term_start, term_end, weights
             FROM classes WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?;

        match rows.next() {
            Some(row) => {
                let (id, name, course_code, days, start_time, end_time, term_start, term_end, weights) =
                    row?;
                let weights: BTreeMap<String, f32> = serde_json::from_str(&weights)
                    .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
                Ok(Some(ClassRecord {
                    id: parse_uuid(&id)?,
                    name,
                    course_code,
                    days: decode_days(&days),
                    start_time,
                    end_time,
                    term_start: term_start.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
                    term_end: term_end.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
                    weights,
                }))
            }
            None => Ok(None),
        }
    }

    fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let conn = self.conn.lock().expect("class repo lock poisoned");
        let affected =
            conn.execute("DELETE FROM classes WHERE id = ?1", params![id.to_string()])?;
        if affected == 0 {
            return Err(DatabaseError::NotFound {
                entity_type: "class".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

pub struct SqliteEventRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEventRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

impl EventRepository for SqliteEventRepository {
    fn insert(&self, event: &CalendarEventRecord) -> Result<(), DatabaseError> {
        let conn = self.conn.lock().expect("event repo lock poisoned");
        conn.execute(
            "INSERT INTO calendar_events (id, class_id, date, time, description, event_type, category, weight)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                event.id.to_string(),
                event.class_id.to_string(),
                event.date.to_string(),
                event.time,
                event.description,
                event.event_type.as_str(),
                event.category.map(|c| c.as_str()),
                event.weight,
            ],
        )?;
        Ok(())
    }

    fn get_for_class(&self, class_id: Uuid) -> Result<Vec<CalendarEventRecord>, DatabaseError> {
        let conn = self.conn.lock().expect("event repo lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, class_id, date, time, description, event_type, category, weight
             FROM calendar_events WHERE class_id = ?1 ORDER BY date, time",
        )?;
        let rows = stmt.query_map(params![class_id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, Option<f64>>(7)?,
            ))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, class_id, date, time, description, event_type, category, weight) = row?;
            events.push(CalendarEventRecord {
                id: parse_uuid(&id)?,
                class_id: parse_uuid(&class_id)?,
                date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                    .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
                time,
                description,
                event_type: EventType::from_str(&event_type)?,
                category: match category {
                    Some(c) => Some(EventCategory::from_str(&c)?),
                    None => None,
                },
                weight: weight.map(|w| w as f32),
            });
        }
        Ok(events)
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

/// Days are stored as a comma-joined list of weekday indices ("0,2,4").
fn encode_days(days: &[u8]) -> String {
    days.iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn decode_days(s: &str) -> Vec<u8> {
    s.split(',').filter_map(|p| p.trim().parse().ok()).collect()
}

// ── In-memory implementations (tests, embedding without SQLite) ─

#[derive(Default)]
pub struct InMemoryClassRepository {
    classes: Mutex<BTreeMap<Uuid, ClassRecord>>,
}

impl InMemoryClassRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.classes.lock().expect("lock poisoned").len()
    }
}

impl ClassRepository for InMemoryClassRepository {
    fn insert(&self, class: &ClassRecord) -> Result<(), DatabaseError> {
        self.classes
            .lock()
            .expect("lock poisoned")
            .insert(class.id, class.clone());
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<ClassRecord>, DatabaseError> {
        Ok(self.classes.lock().expect("lock poisoned").get(&id).cloned())
    }

    fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        match self.classes.lock().expect("lock poisoned").remove(&id) {
            Some(_) => Ok(()),
            None => Err(DatabaseError::NotFound {
                entity_type: "class".to_string(),
                id: id.to_string(),
            }),
        }
    }
}

/// In-memory event store with optional failure injection, used to exercise
/// the importer's rollback path.
#[derive(Default)]
pub struct InMemoryEventRepository {
    events: Mutex<Vec<CalendarEventRecord>>,
    /// Fail the Nth insert (0-based) when set.
    fail_on_insert: Mutex<Option<usize>>,
    inserts_seen: Mutex<usize>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(insert_index: usize) -> Self {
        let repo = Self::default();
        *repo.fail_on_insert.lock().expect("lock poisoned") = Some(insert_index);
        repo
    }

    pub fn count(&self) -> usize {
        self.events.lock().expect("lock poisoned").len()
    }
}

impl EventRepository for InMemoryEventRepository {
    fn insert(&self, event: &CalendarEventRecord) -> Result<(), DatabaseError> {
        let mut seen = self.inserts_seen.lock().expect("lock poisoned");
        let index = *seen;
        *seen += 1;
        drop(seen);

        if *self.fail_on_insert.lock().expect("lock poisoned") == Some(index) {
            return Err(DatabaseError::ConstraintViolation(
                "injected insert failure".into(),
            ));
        }
        self.events.lock().expect("lock poisoned").push(event.clone());
        Ok(())
    }

    fn get_for_class(&self, class_id: Uuid) -> Result<Vec<CalendarEventRecord>, DatabaseError> {
        Ok(self
            .events
            .lock()
            .expect("lock poisoned")
            .iter()
            .filter(|e| e.class_id == class_id)
            .cloned()
            .collect())
    }
}
