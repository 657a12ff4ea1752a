//! Final import stage: a validated payload becomes one class row plus its
//! calendar events. Persistence is atomic at the class level: any event
//! insert failure deletes the just-created class, and cascade removes the
//! events already written.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::db::repository::{ClassRepository, EventRepository};
use crate::db::DatabaseError;
use crate::models::{CalendarEventRecord, ClassRecord};
use crate::review::{self, ImportPayload, ValidationError};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("caller identity missing")]
    Unauthenticated,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("persistence failed: {0}")]
    Persistence(#[from] DatabaseError),
}

/// What the caller gets back after a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub class_id: Uuid,
    pub events_imported: usize,
}

pub struct Importer {
    class_repo: Arc<dyn ClassRepository>,
    event_repo: Arc<dyn EventRepository>,
}

impl Importer {
    pub fn new(class_repo: Arc<dyn ClassRepository>, event_repo: Arc<dyn EventRepository>) -> Self {
        Self {
            class_repo,
            event_repo,
        }
    }

    /// Validate and persist one reviewed payload for `caller`. Rejection
    /// order: identity, payload structure, persistence.
    pub fn import(
        &self,
        caller: Option<Uuid>,
        payload: &ImportPayload,
    ) -> Result<ImportOutcome, ImportError> {
        let caller = caller.ok_or(ImportError::Unauthenticated)?;
        review::validate_payload(payload)?;

        let class = build_class(payload);
        tracing::info!(class_id = %class.id, caller = %caller, name = %class.name, "importing class");
        self.class_repo.insert(&class)?;

        let mut imported = 0usize;
        for event in payload.events.iter().filter(|e| e.include) {
            // Both unwraps are guarded by validate_payload above.
            let date = event.date.ok_or_else(|| {
                DatabaseError::ConstraintViolation("included event lost its date".to_string())
            })?;
            let time = review::resolve_event_time(event, date, &payload.schedule_slots)
                .ok_or_else(|| {
                    DatabaseError::ConstraintViolation("included event lost its time".to_string())
                })?;

            let record = CalendarEventRecord {
                id: Uuid::new_v4(),
                class_id: class.id,
                date,
                time,
                description: event.description.clone(),
                event_type: event.event_type,
                category: event.category,
                weight: event.weight,
            };

            if let Err(e) = self.event_repo.insert(&record) {
                tracing::error!(class_id = %class.id, error = %e, "event insert failed, rolling back class");
                // Cascade removes events already written for this class.
                self.class_repo.delete(class.id)?;
                return Err(ImportError::Persistence(e));
            }
            imported += 1;
        }

        Ok(ImportOutcome {
            class_id: class.id,
            events_imported: imported,
        })
    }
}

fn build_class(payload: &ImportPayload) -> ClassRecord {
    let mut days: Vec<u8> = payload
        .schedule_slots
        .iter()
        .flat_map(|s| s.days.iter().copied())
        .collect();
    days.sort_unstable();
    days.dedup();

    // The first slot is the primary meeting block.
    let primary = &payload.schedule_slots[0];

    let mut weights: BTreeMap<String, f32> = BTreeMap::new();
    for event in payload.events.iter().filter(|e| e.include) {
        if let (Some(category), Some(weight)) = (event.category, event.weight) {
            *weights.entry(category.label().to_string()).or_insert(0.0) += weight;
        }
    }

    ClassRecord {
        id: Uuid::new_v4(),
        name: payload.course_name.trim().to_string(),
        course_code: payload.course_code.clone(),
        days,
        start_time: primary.start_time.clone(),
        end_time: primary.end_time.clone(),
        term_start: payload.term_start,
        term_end: payload.term_end,
        weights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{
        ClassRepository, EventRepository, InMemoryClassRepository, InMemoryEventRepository,
    };
    use crate::models::enums::{EventCategory, EventType};
    use crate::review::{ReviewedEvent, ScheduleSlot};
    use chrono::NaiveDate;

    fn payload() -> ImportPayload {
        ImportPayload {
            course_name: "GEOL 101".to_string(),
            course_code: Some("GEOL 101".to_string()),
            term_start: NaiveDate::from_ymd_opt(2026, 1, 5),
            term_end: NaiveDate::from_ymd_opt(2026, 4, 24),
            schedule_slots: vec![
                ScheduleSlot {
                    days: vec![0, 2],
                    start_time: "09:00".to_string(),
                    end_time: "09:50".to_string(),
                },
                ScheduleSlot {
                    days: vec![3],
                    start_time: "14:00".to_string(),
                    end_time: "16:00".to_string(),
                },
            ],
            events: vec![
                ReviewedEvent {
                    // Monday
                    date: NaiveDate::from_ymd_opt(2026, 2, 9),
                    time: None,
                    description: "Quiz 1".to_string(),
                    event_type: EventType::Test,
                    category: Some(EventCategory::Quiz),
                    include: true,
                    weight: Some(10.0),
                },
                ReviewedEvent {
                    // Thursday, covered by the lab slot
                    date: NaiveDate::from_ymd_opt(2026, 2, 12),
                    time: None,
                    description: "Lab 1".to_string(),
                    event_type: EventType::Assignment,
                    category: Some(EventCategory::Lab),
                    include: true,
                    weight: Some(5.0),
                },
                ReviewedEvent {
                    date: NaiveDate::from_ymd_opt(2026, 3, 2),
                    time: Some("11:00".to_string()),
                    description: "Reading response".to_string(),
                    event_type: EventType::Assignment,
                    category: Some(EventCategory::Reading),
                    include: false,
                    weight: None,
                },
            ],
        }
    }

    fn importer() -> (Importer, Arc<InMemoryClassRepository>, Arc<InMemoryEventRepository>) {
        let classes = Arc::new(InMemoryClassRepository::new());
        let events = Arc::new(InMemoryEventRepository::new());
        (
            Importer::new(classes.clone(), events.clone()),
            classes,
            events,
        )
    }

    #[test]
    fn unauthenticated_rejected_before_validation() {
        let (importer, classes, _) = importer();
        let mut bad = payload();
        bad.course_name = String::new();

        let err = importer.import(None, &bad).unwrap_err();
        assert!(matches!(err, ImportError::Unauthenticated));
        assert_eq!(classes.count(), 0);
    }

    #[test]
    fn invalid_payload_touches_nothing() {
        let (importer, classes, events) = importer();
        let mut bad = payload();
        bad.schedule_slots.clear();

        let err = importer.import(Some(Uuid::new_v4()), &bad).unwrap_err();
        assert!(matches!(err, ImportError::Validation(_)));
        assert_eq!(classes.count(), 0);
        assert_eq!(events.count(), 0);
    }

    #[test]
    fn import_persists_class_and_included_events() {
        let (importer, classes, events) = importer();
        let outcome = importer.import(Some(Uuid::new_v4()), &payload()).unwrap();

        assert_eq!(outcome.events_imported, 2);
        let class = classes
            .get(outcome.class_id)
            .unwrap()
            .expect("class stored");
        assert_eq!(class.days, vec![0, 2, 3]);
        assert_eq!(class.start_time, "09:00");
        assert_eq!(class.weights.get("Quiz"), Some(&10.0));
        assert_eq!(class.weights.get("Lab"), Some(&5.0));

        let stored = events.get_for_class(class.id).unwrap();
        assert_eq!(stored.len(), 2);
        // Monday event resolved from the first slot, Thursday from the second.
        assert_eq!(stored[0].time, "09:00");
        assert_eq!(stored[1].time, "14:00");
    }

    #[test]
    fn event_insert_failure_rolls_back_class() {
        let classes = Arc::new(InMemoryClassRepository::new());
        let events = Arc::new(InMemoryEventRepository::failing_on(1));
        let importer = Importer::new(classes.clone(), events.clone());

        let err = importer.import(Some(Uuid::new_v4()), &payload()).unwrap_err();
        assert!(matches!(err, ImportError::Persistence(_)));
        assert_eq!(classes.count(), 0, "class rolled back");
    }

    #[test]
    fn weight_map_sums_repeated_categories() {
        let (importer, classes, _) = importer();
        let mut p = payload();
        p.events.push(ReviewedEvent {
            date: NaiveDate::from_ymd_opt(2026, 2, 16),
            time: None,
            description: "Quiz 2".to_string(),
            event_type: EventType::Test,
            category: Some(EventCategory::Quiz),
            include: true,
            weight: Some(10.0),
        });

        let outcome = importer.import(Some(Uuid::new_v4()), &p).unwrap();
        let class = classes.get(outcome.class_id).unwrap().unwrap();
        assert_eq!(class.weights.get("Quiz"), Some(&20.0));
    }
}
