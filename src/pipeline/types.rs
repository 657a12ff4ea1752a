use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::enums::{EventCategory, EventType, SectionKind, SlashDateOrder};

/// Parser version tag for the hybrid rule+AI pipeline.
pub const PARSER_VERSION_HYBRID: &str = "v3-hybrid";
/// Parser version tag for legacy rule-only extraction.
pub const PARSER_VERSION_FALLBACK: &str = "v1-fallback";

/// A normalized outline document with its per-document date inference,
/// computed once and immutable afterwards.
#[derive(Debug, Clone)]
pub struct OutlineDocument {
    pub text: String,
    /// Year assumed for date tokens that carry none.
    pub fallback_year: i32,
    pub slash_order: SlashDateOrder,
}

/// A named span of document lines. Sections partition the document:
/// every line belongs to exactly one section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineSection {
    pub id: usize,
    pub kind: SectionKind,
    pub start_line: usize,
    pub end_line: usize,
    pub text: String,
}

/// A size-bounded fragment of one section, the unit of AI extraction.
/// Never splits a line and never crosses a section boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineChunk {
    pub chunk_id: usize,
    pub section_id: usize,
    pub section_kind: SectionKind,
    pub start_line: usize,
    pub end_line: usize,
    pub text: String,
}

/// A candidate recurring meeting pattern. Weekday indices are
/// 0 = Monday … 6 = Sunday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleCandidate {
    pub days: BTreeSet<u8>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub confidence: f32,
    pub source_snippet: String,
    pub section: SectionKind,
}

impl ScheduleCandidate {
    /// Complete means usable without human input: days plus both times.
    pub fn is_complete(&self) -> bool {
        !self.days.is_empty() && self.start_time.is_some() && self.end_time.is_some()
    }
}

/// One extracted calendar item, from either extraction source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedEvent {
    pub date: Option<NaiveDate>,
    /// Normalized "HH:MM" when present.
    pub time: Option<String>,
    pub description: String,
    pub event_type: EventType,
    pub category: Option<EventCategory>,
    pub confidence: f32,
    pub needs_review: bool,
    pub source_snippet: String,
    pub chunk_id: Option<usize>,
    /// Grade weight percentage (0-100) when the source text stated one.
    pub weight: Option<f32>,
}

/// The chosen recurring schedule. An unresolved schedule (no qualifying
/// candidate) has empty `days`, missing times, and `needs_review = true`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedSchedule {
    pub days: Vec<u8>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub confidence: f32,
    pub needs_review: bool,
}

impl ParsedSchedule {
    /// No qualifying candidate was found; the reviewer must supply the schedule.
    pub fn needs_input(&self) -> bool {
        self.days.is_empty() || self.start_time.is_none() || self.end_time.is_none()
    }
}

/// Counters describing one parse run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseMetrics {
    pub duration_ms: u64,
    pub chunks_used: usize,
    pub rule_candidates: usize,
    /// Table diagnostics: date-bearing rows seen / normalized / dropped
    /// for lacking a usable description.
    pub date_rows_seen: usize,
    pub date_rows_normalized: usize,
    pub date_rows_dropped: usize,
    pub ai_chunks_attempted: usize,
    pub ai_timeouts: usize,
    pub ai_failures: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseMeta {
    pub parser_version: String,
    pub warnings: Vec<String>,
    pub extracted_sections: Vec<SectionKind>,
    pub metrics: ParseMetrics,
}

/// The contract returned to the reviewing caller. Never an error for
/// imperfect extraction; warnings and `needs_review` flags carry that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedOutlineResponse {
    pub course_name: String,
    pub course_code: Option<String>,
    pub events: Vec<ParsedEvent>,
    pub schedule: ParsedSchedule,
    pub meta: ParseMeta,
}

impl ParsedOutlineResponse {
    /// Filtered view over test-type events.
    pub fn tests(&self) -> Vec<&ParsedEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type == EventType::Test)
            .collect()
    }

    /// Filtered view over assignment-type events.
    pub fn assignments(&self) -> Vec<&ParsedEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type == EventType::Assignment)
            .collect()
    }
}
