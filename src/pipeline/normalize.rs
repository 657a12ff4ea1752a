//! Text normalization and per-document date inference.
//!
//! Everything here is a pure function of the input text, so a given
//! document always normalizes identically.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;

use super::types::OutlineDocument;
use crate::models::enums::SlashDateOrder;

static YEAR_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").expect("year regex"));

static SLASH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{2,4}))?\b").expect("slash regex"));

/// Normalize raw outline text and infer the document's date conventions.
pub fn normalize_document(raw: &str) -> OutlineDocument {
    let text = normalize_text(raw);
    let fallback_year = infer_fallback_year(&text);
    let slash_order = infer_slash_order(&text);
    OutlineDocument {
        text,
        fallback_year,
        slash_order,
    }
}

/// Trim lines, collapse runs of spaces/tabs inside lines, and collapse
/// runs of blank lines down to one.
pub fn normalize_text(raw: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut blank_run = 0usize;

    for line in raw.lines() {
        let collapsed = collapse_inner_whitespace(line.trim());
        if collapsed.is_empty() {
            blank_run += 1;
            if blank_run == 1 && !out.is_empty() {
                out.push(String::new());
            }
        } else {
            blank_run = 0;
            out.push(collapsed);
        }
    }

    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

fn collapse_inner_whitespace(line: &str) -> String {
    // Tabs and 2+ space runs are cell separators for the table matcher,
    // so collapse them to exactly two spaces rather than one.
    let mut out = String::with_capacity(line.len());
    let mut run = 0usize;
    let mut saw_tab = false;

    for ch in line.chars() {
        if ch == ' ' || ch == '\t' {
            run += 1;
            saw_tab |= ch == '\t';
        } else {
            if run > 0 {
                out.push_str(if run >= 2 || saw_tab { "  " } else { " " });
                run = 0;
                saw_tab = false;
            }
            out.push(ch);
        }
    }
    out
}

/// The most frequent 4-digit year token, or the current year if none appear.
pub fn infer_fallback_year(text: &str) -> i32 {
    let mut counts: HashMap<i32, usize> = HashMap::new();
    for cap in YEAR_TOKEN.captures_iter(text) {
        if let Ok(year) = cap[1].parse::<i32>() {
            *counts.entry(year).or_default() += 1;
        }
    }
    counts
        .into_iter()
        // Highest count wins; earlier year breaks ties deterministically.
        .max_by_key(|(year, count)| (*count, -*year))
        .map(|(year, _)| year)
        .unwrap_or_else(|| chrono::Local::now().year())
}

/// Scan `D/D` tokens: any first component > 12 means the document writes
/// day-first dates. Month-first on ambiguity.
pub fn infer_slash_order(text: &str) -> SlashDateOrder {
    for cap in SLASH_DATE.captures_iter(text) {
        let first: u32 = match cap[1].parse() {
            Ok(n) => n,
            Err(_) => continue,
        };
        if first > 12 && first <= 31 {
            return SlashDateOrder::DayFirst;
        }
    }
    SlashDateOrder::MonthFirst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_collapses_whitespace() {
        let raw = "  Course   Outline \n\n\n\nWeek 1\t\tIntro  ";
        let text = normalize_text(raw);
        assert_eq!(text, "Course  Outline\n\nWeek 1  Intro");
    }

    #[test]
    fn single_spaces_survive() {
        assert_eq!(normalize_text("Quiz 1 on Friday"), "Quiz 1 on Friday");
    }

    #[test]
    fn most_frequent_year_wins() {
        let text = "Winter 2026. Exam Jan 2026. Originally offered 2019.";
        assert_eq!(infer_fallback_year(text), 2026);
    }

    #[test]
    fn no_year_falls_back_to_current() {
        let year = infer_fallback_year("no dates here");
        assert_eq!(year, chrono::Local::now().year());
    }

    #[test]
    fn slash_order_day_first_when_first_component_over_12() {
        assert_eq!(infer_slash_order("due 25/3"), SlashDateOrder::DayFirst);
    }

    #[test]
    fn slash_order_defaults_to_month_first() {
        assert_eq!(infer_slash_order("due 3/25"), SlashDateOrder::MonthFirst);
        assert_eq!(infer_slash_order("no slashes"), SlashDateOrder::MonthFirst);
    }

    #[test]
    fn normalize_document_is_deterministic() {
        let raw = "GEOL 101 Winter 2026\n\n\nQuiz  9/7";
        let a = normalize_document(raw);
        let b = normalize_document(raw);
        assert_eq!(a.text, b.text);
        assert_eq!(a.fallback_year, b.fallback_year);
        assert_eq!(a.fallback_year, 2026);
    }
}
