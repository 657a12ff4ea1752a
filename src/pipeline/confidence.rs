//! Confidence scoring for candidate events and schedules.
//!
//! All weights live here as named constants so scoring stays one
//! tunable table instead of literals scattered through the matchers.

use crate::models::enums::{EventType, SectionKind};

/// Where a candidate came from; sets the base trust level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    Rule,
    Ai,
}

/// Scoring weights (event candidates).
pub mod weights {
    /// Base score for deterministic rule extraction.
    pub const RULE_BASE: f32 = 0.62;
    /// Base score for AI-derived candidates (lower inherent trust).
    pub const AI_BASE: f32 = 0.50;
    /// Candidate carries a valid calendar date.
    pub const HAS_DATE: f32 = 0.15;
    /// Source snippet long enough to carry real context.
    pub const LONG_SNIPPET: f32 = 0.05;
    /// Minimum snippet length for the snippet bonus.
    pub const LONG_SNIPPET_CHARS: usize = 18;
    /// Event type agrees with the section it was found in.
    pub const SECTION_AFFINITY: f32 = 0.08;
    /// No explicit keyword justified the type classification.
    pub const NO_KEYWORD_PENALTY: f32 = 0.10;
    /// Schedule candidate carries parsed weekdays.
    pub const SCHEDULE_DAYS: f32 = 0.10;
    /// Schedule candidate carries both a start and an end time.
    pub const SCHEDULE_BOTH_TIMES: f32 = 0.12;
}

/// Review thresholds.
pub mod thresholds {
    /// Final per-event review bar: below this, a human must confirm.
    pub const NEEDS_REVIEW: f32 = 0.80;
    /// Orchestrator trigger: any event below this invites AI assistance.
    pub const AI_ASSIST_EVENT: f32 = 0.78;
    /// A schedule candidate at or above this (and complete) is trusted
    /// without AI assistance.
    pub const SCHEDULE_CONFIDENT: f32 = 0.82;
}

/// Score one event candidate.
pub fn score_event(
    source: CandidateSource,
    has_date: bool,
    snippet_len: usize,
    section: SectionKind,
    event_type: EventType,
    keyword_matched: bool,
) -> f32 {
    let base = match source {
        CandidateSource::Rule => weights::RULE_BASE,
        CandidateSource::Ai => weights::AI_BASE,
    };

    let mut score = base;
    if has_date {
        score += weights::HAS_DATE;
    }
    if snippet_len >= weights::LONG_SNIPPET_CHARS {
        score += weights::LONG_SNIPPET;
    }
    if section_affinity(section, event_type) {
        score += weights::SECTION_AFFINITY;
    }
    if !keyword_matched {
        score -= weights::NO_KEYWORD_PENALTY;
    }
    score.clamp(0.0, 1.0)
}

/// Score a schedule candidate from its completeness.
pub fn score_schedule(
    source: CandidateSource,
    has_days: bool,
    has_both_times: bool,
    section: SectionKind,
) -> f32 {
    let base = match source {
        CandidateSource::Rule => weights::RULE_BASE,
        CandidateSource::Ai => weights::AI_BASE,
    };

    let mut score = base;
    if has_days {
        score += weights::SCHEDULE_DAYS;
    }
    if has_both_times {
        score += weights::SCHEDULE_BOTH_TIMES;
    }
    if matches!(section, SectionKind::Schedule | SectionKind::General) {
        score += weights::SECTION_AFFINITY;
    }
    score.clamp(0.0, 1.0)
}

/// Does the event type belong where it was found?
fn section_affinity(section: SectionKind, event_type: EventType) -> bool {
    match section {
        SectionKind::Assessments | SectionKind::ImportantDates => {
            matches!(event_type, EventType::Test | EventType::Assignment)
        }
        SectionKind::WeeklyOutline => matches!(event_type, EventType::Lecture),
        SectionKind::Labs => matches!(event_type, EventType::Lecture | EventType::Other),
        SectionKind::Schedule | SectionKind::General => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dated_keyworded_assessment_clears_review_bar() {
        let score = score_event(
            CandidateSource::Rule,
            true,
            30,
            SectionKind::Assessments,
            EventType::Test,
            true,
        );
        assert!(score >= thresholds::NEEDS_REVIEW, "got {score}");
    }

    #[test]
    fn undated_candidate_stays_below_review_bar() {
        let score = score_event(
            CandidateSource::Rule,
            false,
            30,
            SectionKind::Assessments,
            EventType::Test,
            true,
        );
        assert!(score < thresholds::NEEDS_REVIEW, "got {score}");
    }

    #[test]
    fn ai_base_scores_below_rule_base() {
        let rule = score_event(CandidateSource::Rule, true, 30, SectionKind::General, EventType::Test, true);
        let ai = score_event(CandidateSource::Ai, true, 30, SectionKind::General, EventType::Test, true);
        assert!(rule > ai);
    }

    #[test]
    fn missing_keyword_penalized() {
        let with = score_event(CandidateSource::Rule, true, 30, SectionKind::General, EventType::Other, true);
        let without = score_event(CandidateSource::Rule, true, 30, SectionKind::General, EventType::Other, false);
        assert!((with - without - weights::NO_KEYWORD_PENALTY).abs() < f32::EPSILON);
    }

    #[test]
    fn complete_rule_schedule_is_confident() {
        let score = score_schedule(CandidateSource::Rule, true, true, SectionKind::Schedule);
        assert!(score >= thresholds::SCHEDULE_CONFIDENT, "got {score}");
    }

    #[test]
    fn schedule_bonuses_match_their_weights() {
        let base = score_schedule(CandidateSource::Rule, false, false, SectionKind::Assessments);
        let with_days = score_schedule(CandidateSource::Rule, true, false, SectionKind::Assessments);
        let with_times = score_schedule(CandidateSource::Rule, false, true, SectionKind::Assessments);
        assert!((with_days - base - weights::SCHEDULE_DAYS).abs() < f32::EPSILON);
        assert!((with_times - base - weights::SCHEDULE_BOTH_TIMES).abs() < f32::EPSILON);
    }

    #[test]
    fn incomplete_schedule_is_not_confident() {
        let score = score_schedule(CandidateSource::Rule, true, false, SectionKind::Schedule);
        assert!(score < thresholds::SCHEDULE_CONFIDENT, "got {score}");
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let score = score_event(CandidateSource::Rule, true, 100, SectionKind::Assessments, EventType::Test, true);
        assert!((0.0..=1.0).contains(&score));
    }
}
