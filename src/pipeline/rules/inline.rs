//! Inline date matcher for non-tabular lines: splits a line at its date
//! anchors so several dated items on one line become separate candidates.

use super::RawCandidate;
use crate::pipeline::dates::{date_anchor_spans, normalize_time};
use crate::pipeline::types::OutlineDocument;

/// Match a prose line carrying one or more date tokens.
pub fn match_inline_line(line: &str, doc: &OutlineDocument) -> Vec<RawCandidate> {
    let spans = date_anchor_spans(line);
    if spans.is_empty() {
        return Vec::new();
    }

    // Single date: the whole line minus the date token is the description.
    if spans.len() == 1 {
        let (start, end) = spans[0];
        let date = crate::pipeline::dates::parse_date_token(
            &line[start..end],
            doc.fallback_year,
            doc.slash_order,
        );
        let description = clean_fragment(&format!("{} {}", &line[..start], &line[end..]));
        if description.is_empty() {
            return Vec::new();
        }
        return vec![RawCandidate {
            date,
            time: normalize_time(&line[end..]),
            type_hint: String::new(),
            description,
            snippet: line.trim().to_string(),
        }];
    }

    // Multiple dates: each anchor owns the text up to the next anchor.
    let mut candidates = Vec::new();
    for (i, (start, end)) in spans.iter().enumerate() {
        let segment_end = spans.get(i + 1).map_or(line.len(), |(next, _)| *next);
        let date = crate::pipeline::dates::parse_date_token(
            &line[*start..*end],
            doc.fallback_year,
            doc.slash_order,
        );
        let mut description = clean_fragment(&line[*end..segment_end]);
        // Text before the first date ("Quizzes: Jan 22, Feb 5") applies to all.
        if description.is_empty() && i == 0 {
            description = clean_fragment(&line[..*start]);
        }
        if description.is_empty() {
            if let Some(prev) = candidates.last().map(|c: &RawCandidate| c.description.clone()) {
                description = prev;
            }
        }
        if description.is_empty() {
            continue;
        }
        candidates.push(RawCandidate {
            date,
            time: normalize_time(&line[*end..segment_end]),
            type_hint: String::new(),
            description,
            snippet: line.trim().to_string(),
        });
    }

    candidates
}

/// Strip separator punctuation and collapse leftover whitespace.
fn clean_fragment(fragment: &str) -> String {
    fragment
        .trim()
        .trim_matches(|c: char| {
            c == ':' || c == '-' || c == '–' || c == ',' || c == ';' || c == '&' || c == '('
                || c == ')'
        })
        .trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
