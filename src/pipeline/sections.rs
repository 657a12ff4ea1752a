//! Section detection: splits a normalized outline into named spans using
//! heading heuristics, so later stages can prioritize schedule and
//! assessment text over policy prose.

use std::sync::LazyLock;

use regex::Regex;

use super::types::OutlineSection;
use crate::models::enums::SectionKind;

static NUMBERED_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{1,2}[.)]|[IVX]{1,4}\.)\s+\S").expect("heading regex"));

/// Keyword table mapping heading text to a section kind. First hit wins,
/// so more specific topics come before generic "schedule".
const TOPIC_PATTERNS: &[(SectionKind, &[&str])] = &[
    (
        SectionKind::ImportantDates,
        &["important date", "key date", "deadline"],
    ),
    (
        SectionKind::Assessments,
        &[
            "assessment",
            "evaluation",
            "grading",
            "grade breakdown",
            "exam",
            "test",
            "quizzes",
            "assignment",
            "marking",
        ],
    ),
    (
        SectionKind::WeeklyOutline,
        &["weekly", "week-by-week", "course outline", "lecture schedule", "topics"],
    ),
    // "lab" alone would hit inside "syllabus" / "collaboration"
    (SectionKind::Labs, &["lab ", "labs", "laboratory", "tutorial", "practical"]),
    (
        SectionKind::Schedule,
        &["schedule", "class time", "meeting time", "class hours", "lectures"],
    ),
];

/// Split normalized text into sections. Every line lands in exactly one
/// section; text before the first recognized heading is `General`, and a
/// document with no recognized headings becomes one `General` section.
pub fn detect_sections(text: &str) -> Vec<OutlineSection> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return Vec::new();
    }

    let mut sections: Vec<OutlineSection> = Vec::new();
    let mut current_kind = SectionKind::General;
    let mut current_start = 0usize;

    for (i, line) in lines.iter().enumerate() {
        let Some(kind) = classify_heading(line) else {
            continue;
        };
        if i > current_start {
            sections.push(make_section(sections.len(), current_kind, current_start, i - 1, &lines));
        }
        current_kind = kind;
        current_start = i;
    }

    sections.push(make_section(
        sections.len(),
        current_kind,
        current_start,
        lines.len() - 1,
        &lines,
    ));
    sections
}

fn make_section(
    id: usize,
    kind: SectionKind,
    start_line: usize,
    end_line: usize,
    lines: &[&str],
) -> OutlineSection {
    OutlineSection {
        id,
        kind,
        start_line,
        end_line,
        text: lines[start_line..=end_line].join("\n"),
    }
}

/// A heading is a recognized topic written as a heading-shaped line.
fn classify_heading(line: &str) -> Option<SectionKind> {
    if !is_heading_shaped(line) {
        return None;
    }
    let lower = line.to_lowercase();
    for (kind, keywords) in TOPIC_PATTERNS {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return Some(*kind);
        }
    }
    None
}

fn is_heading_shaped(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.len() > 60 {
        return false;
    }
    if trimmed.starts_with('#') {
        return true;
    }
    if NUMBERED_HEADING.is_match(trimmed) {
        return true;
    }
    // "Label:" line with nothing substantial after the colon
    if let Some(colon) = trimmed.find(':') {
        if colon > 0 && trimmed[colon + 1..].trim().len() <= 20 {
            return true;
        }
    }
    // Short all-caps line (ignoring digits/punctuation)
    let letters: Vec<char> = trimmed.chars().filter(|c| c.is_alphabetic()).collect();
    !letters.is_empty() && letters.iter().all(|c| c.is_uppercase())
}
