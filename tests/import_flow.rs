//! Review-to-import flow against a real (in-memory) SQLite database.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use uuid::Uuid;

use courseline::db::repository::{
    ClassRepository, EventRepository, InMemoryClassRepository, InMemoryEventRepository,
    SqliteClassRepository, SqliteEventRepository,
};
use courseline::db::sqlite::open_memory_database;
use courseline::import::{ImportError, Importer};
use courseline::models::enums::{EventCategory, EventType};
use courseline::review::{ImportPayload, ReviewedEvent, ScheduleSlot};

fn sqlite_importer() -> (Importer, Arc<Mutex<rusqlite::Connection>>) {
    let conn = Arc::new(Mutex::new(open_memory_database().expect("memory db")));
    let importer = Importer::new(
        Arc::new(SqliteClassRepository::new(conn.clone())),
        Arc::new(SqliteEventRepository::new(conn.clone())),
    );
    (importer, conn)
}

fn payload() -> ImportPayload {
    ImportPayload {
        course_name: "GEOL 101: Physical Geology".to_string(),
        course_code: Some("GEOL 101".to_string()),
        term_start: NaiveDate::from_ymd_opt(2026, 1, 5),
        term_end: NaiveDate::from_ymd_opt(2026, 4, 24),
        schedule_slots: vec![
            // Lecture block Mon/Wed/Fri.
            ScheduleSlot {
                days: vec![0, 2, 4],
                start_time: "09:00".to_string(),
                end_time: "09:50".to_string(),
            },
            // Lab block Thursday.
            ScheduleSlot {
                days: vec![3],
                start_time: "14:00".to_string(),
                end_time: "16:00".to_string(),
            },
        ],
        events: vec![
            ReviewedEvent {
                // 2026-02-09 is a Monday.
                date: NaiveDate::from_ymd_opt(2026, 2, 9),
                time: None,
                description: "Quiz 1".to_string(),
                event_type: EventType::Test,
                category: Some(EventCategory::Quiz),
                include: true,
                weight: Some(10.0),
            },
            ReviewedEvent {
                // 2026-02-12 is a Thursday.
                date: NaiveDate::from_ymd_opt(2026, 2, 12),
                time: None,
                description: "Lab practical".to_string(),
                event_type: EventType::Assignment,
                category: Some(EventCategory::Lab),
                include: true,
                weight: Some(15.0),
            },
        ],
    }
}

#[test]
fn reviewed_payload_persists_class_and_events() {
    let (importer, conn) = sqlite_importer();

    let outcome = importer.import(Some(Uuid::new_v4()), &payload()).unwrap();
    assert_eq!(outcome.events_imported, 2);

    let classes = SqliteClassRepository::new(conn.clone());
    let class = classes.get(outcome.class_id).unwrap().expect("class row");
    assert_eq!(class.name, "GEOL 101: Physical Geology");
    assert_eq!(class.days, vec![0, 2, 3, 4]);
    assert_eq!(class.start_time, "09:00");
    assert_eq!(class.term_start, NaiveDate::from_ymd_opt(2026, 1, 5));
    assert_eq!(class.weights.get("Quiz"), Some(&10.0));

    let events = SqliteEventRepository::new(conn);
    let stored = events.get_for_class(outcome.class_id).unwrap();
    assert_eq!(stored.len(), 2);
}

#[test]
fn each_event_gets_its_own_weekday_slot_time() {
    let (importer, conn) = sqlite_importer();
    let outcome = importer.import(Some(Uuid::new_v4()), &payload()).unwrap();

    let events = SqliteEventRepository::new(conn);
    let stored = events.get_for_class(outcome.class_id).unwrap();

    let monday = stored
        .iter()
        .find(|e| e.date == NaiveDate::from_ymd_opt(2026, 2, 9).unwrap())
        .unwrap();
    let thursday = stored
        .iter()
        .find(|e| e.date == NaiveDate::from_ymd_opt(2026, 2, 12).unwrap())
        .unwrap();

    assert_eq!(monday.time, "09:00");
    assert_eq!(thursday.time, "14:00");
}

#[test]
fn all_deselected_events_reject_the_whole_payload() {
    let (importer, conn) = sqlite_importer();
    let mut p = payload();
    for event in &mut p.events {
        event.include = false;
    }

    let err = importer.import(Some(Uuid::new_v4()), &p).unwrap_err();
    assert!(matches!(err, ImportError::Validation(_)));

    let count: i64 = conn
        .lock()
        .unwrap()
        .query_row("SELECT COUNT(*) FROM classes", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0, "nothing persisted on rejection");
}

#[test]
fn missing_caller_identity_rejected_first() {
    let (importer, _conn) = sqlite_importer();
    let err = importer.import(None, &payload()).unwrap_err();
    assert!(matches!(err, ImportError::Unauthenticated));
}

#[test]
fn failed_event_insert_leaves_no_orphan_class() {
    let classes = Arc::new(InMemoryClassRepository::new());
    let events = Arc::new(InMemoryEventRepository::failing_on(1));
    let importer = Importer::new(classes.clone(), events);

    let err = importer.import(Some(Uuid::new_v4()), &payload()).unwrap_err();
    assert!(matches!(err, ImportError::Persistence(_)));
    assert_eq!(classes.count(), 0);
}

#[test]
fn deleting_a_class_cascades_to_its_events() {
    let (importer, conn) = sqlite_importer();
    let outcome = importer.import(Some(Uuid::new_v4()), &payload()).unwrap();

    let classes = SqliteClassRepository::new(conn.clone());
    classes.delete(outcome.class_id).unwrap();

    let events = SqliteEventRepository::new(conn);
    assert!(events.get_for_class(outcome.class_id).unwrap().is_empty());
}
