//! Merges rule- and AI-derived candidates into one event list and one
//! schedule decision. Runs only after every extraction source has
//! finished, so no partial merge is ever exposed.

use std::collections::HashMap;

use super::confidence::thresholds;
use super::types::{ParsedEvent, ParsedSchedule, ScheduleCandidate};

/// Deduplicate events across sources. On a key collision the higher
/// confidence wins, then the longer source snippet, then presence of a
/// grade weight. Undated events shadowed by a dated event with the same
/// normalized description are dropped as redundant.
pub fn merge_events(candidates: Vec<ParsedEvent>) -> Vec<ParsedEvent> {
    let mut by_key: HashMap<(String, String, &'static str, String), ParsedEvent> = HashMap::new();
    let mut order: Vec<(String, String, &'static str, String)> = Vec::new();

    for event in candidates {
        let key = (
            event.date.map(|d| d.to_string()).unwrap_or_default(),
            event.time.clone().unwrap_or_default(),
            event.event_type.as_str(),
            normalize_description(&event.description),
        );
        match by_key.get_mut(&key) {
            None => {
                order.push(key.clone());
                by_key.insert(key, event);
            }
            Some(existing) => {
                if wins_collision(&event, existing) {
                    *existing = event;
                }
            }
        }
    }

    let mut merged: Vec<ParsedEvent> = order
        .into_iter()
        .map(|key| by_key.remove(&key).expect("key collected from insertion"))
        .collect();

    drop_shadowed_undated(&mut merged);

    for event in &mut merged {
        event.needs_review = event.date.is_none() || event.confidence < thresholds::NEEDS_REVIEW;
    }

    // Dated events in calendar order, undated last, stable within groups.
    merged.sort_by(|a, b| match (a.date, b.date) {
        (Some(x), Some(y)) => x.cmp(&y).then(a.time.cmp(&b.time)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    merged
}

fn wins_collision(challenger: &ParsedEvent, incumbent: &ParsedEvent) -> bool {
    if challenger.confidence != incumbent.confidence {
        return challenger.confidence > incumbent.confidence;
    }
    if challenger.source_snippet.len() != incumbent.source_snippet.len() {
        return challenger.source_snippet.len() > incumbent.source_snippet.len();
    }
    challenger.weight.is_some() && incumbent.weight.is_none()
}

fn drop_shadowed_undated(events: &mut Vec<ParsedEvent>) {
    let dated: Vec<String> = events
        .iter()
        .filter(|e| e.date.is_some())
        .map(|e| normalize_description(&e.description))
        .collect();
    events.retain(|e| e.date.is_some() || !dated.contains(&normalize_description(&e.description)));
}

fn normalize_description(description: &str) -> String {
    description
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(['.', '!', ':'])
        .to_string()
}

/// Rank schedule candidates purely by confidence and return the best one
/// if it is complete; otherwise the needs-input sentinel.
pub fn choose_schedule(mut candidates: Vec<ScheduleCandidate>) -> ParsedSchedule {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    match candidates.into_iter().next() {
        Some(best) if best.is_complete() => ParsedSchedule {
            days: best.days.into_iter().collect(),
            start_time: best.start_time,
            end_time: best.end_time,
            confidence: best.confidence,
            needs_review: best.confidence < thresholds::NEEDS_REVIEW,
        },
        _ => ParsedSchedule {
            days: Vec::new(),
            start_time: None,
            end_time: None,
            confidence: 0.0,
            needs_review: true,
        },
    }
}
