//! Deterministic rule-based extraction: an ordered list of matcher
//! strategies (schedule, table-row, inline-date) composed over each
//! section's lines. No external calls; same input, same output.

pub mod classify;
pub mod inline;
pub mod schedule;
pub mod table;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::confidence::{score_event, thresholds, CandidateSource};
use super::types::{OutlineDocument, OutlineSection, ParsedEvent, ScheduleCandidate};
use classify::{classify_event, parse_weight, shorten_description};

/// A matcher's raw output before classification and scoring.
#[derive(Debug, Clone)]
pub struct RawCandidate {
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    /// Provisional type hint from the matcher (may be empty).
    pub type_hint: String,
    pub description: String,
    pub snippet: String,
}

/// Table-row diagnostics: date-bearing rows seen vs. normalized vs.
/// dropped for lacking a usable description.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RowDiagnostics {
    pub date_rows_seen: usize,
    pub date_rows_normalized: usize,
    pub date_rows_dropped: usize,
}

/// Everything the rule pass produces for one document.
#[derive(Debug, Clone, Default)]
pub struct RuleExtraction {
    pub events: Vec<ParsedEvent>,
    pub schedules: Vec<ScheduleCandidate>,
    pub course_name: String,
    pub course_code: Option<String>,
    pub diagnostics: RowDiagnostics,
}

/// Run the matcher strategies over every section line, in order:
/// schedule first (a schedule line is never also an event), then the
/// table-row matcher, then the inline-date matcher.
pub fn extract_rules(doc: &OutlineDocument, sections: &[OutlineSection]) -> RuleExtraction {
    let mut out = RuleExtraction::default();
    let (course_name, course_code) = classify::guess_course_name(&doc.text);
    out.course_name = course_name;
    out.course_code = course_code;

    for section in sections {
        for line in section.text.lines() {
            if line.trim().is_empty() {
                continue;
            }

            if let Some(candidate) = schedule::match_schedule_line(line, section.kind) {
                out.schedules.push(candidate);
                continue;
            }

            let mut raw = table::match_table_row(line, doc, &mut out.diagnostics);
            if raw.is_empty() {
                raw = inline::match_inline_line(line, doc);
            }

            for candidate in raw {
                out.events
                    .push(finish_candidate(candidate, section, CandidateSource::Rule));
            }
        }
    }

    out
}

/// Classify, shorten, and score one raw candidate. Shared with the AI
/// path so both sources are normalized identically.
pub fn finish_candidate(
    raw: RawCandidate,
    section: &OutlineSection,
    source: CandidateSource,
) -> ParsedEvent {
    let classification = classify_event(&raw.type_hint, &raw.description);
    let description = shorten_description(&raw.description, classification.category);
    let weight = parse_weight(&raw.snippet);

    let confidence = score_event(
        source,
        raw.date.is_some(),
        raw.snippet.chars().count(),
        section.kind,
        classification.event_type,
        classification.keyword_matched,
    );

    ParsedEvent {
        date: raw.date,
        time: raw.time,
        description,
        event_type: classification.event_type,
        category: classification.category,
        confidence,
        needs_review: raw.date.is_none() || confidence < thresholds::NEEDS_REVIEW,
        source_snippet: raw.snippet,
        chunk_id: None,
        weight,
    }
}
