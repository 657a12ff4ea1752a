//! Table-row matcher: pipe-, tab-, or wide-space-separated rows where one
//! cell holds the date(s) and the rest describe the event.

use super::{RawCandidate, RowDiagnostics};
use crate::pipeline::dates::{contains_date_token, expand_date_cell, normalize_time};
use crate::pipeline::types::OutlineDocument;

/// Cell texts that are column headers, not event data.
const HEADER_CELLS: &[&str] = &[
    "date", "dates", "day", "week", "topic", "topics", "description", "event",
    "assignment", "assignments", "reading", "readings", "due date", "deadline",
    "weight", "value", "item", "assessment",
];

/// Keywords that mark a long sentence as scheduling content rather than
/// policy/conduct prose.
const SCHEDULING_KEYWORDS: &[&str] = &[
    "due", "exam", "quiz", "test", "midterm", "final", "assignment", "lecture",
    "reading", "lab", "class", "week", "chapter", "review", "presentation",
];

const PROSE_LENGTH_LIMIT: usize = 120;

/// Match one table-like row. Non-tabular lines return no candidates and
/// leave the diagnostics untouched.
pub fn match_table_row(
    line: &str,
    doc: &OutlineDocument,
    diag: &mut RowDiagnostics,
) -> Vec<RawCandidate> {
    let cells = split_cells(line);
    if cells.len() < 2 {
        return Vec::new();
    }

    let Some(date_cell_index) = cells.iter().position(|c| contains_date_token(c)) else {
        return Vec::new();
    };
    diag.date_rows_seen += 1;

    if is_header_row(&cells) || is_policy_prose(line) {
        diag.date_rows_dropped += 1;
        return Vec::new();
    }

    let dates = expand_date_cell(&cells[date_cell_index], doc.fallback_year, doc.slash_order);
    let description = cells
        .iter()
        .enumerate()
        .filter(|(i, cell)| *i != date_cell_index && !is_header_cell(cell))
        .map(|(_, cell)| cell.as_str())
        .collect::<Vec<_>>()
        .join(" — ");

    if dates.is_empty() || description.trim().is_empty() {
        diag.date_rows_dropped += 1;
        return Vec::new();
    }
    diag.date_rows_normalized += 1;

    let time = normalize_time(line);
    dates
        .into_iter()
        .map(|date| RawCandidate {
            date: Some(date),
            time: time.clone(),
            type_hint: String::new(),
            description: description.clone(),
            snippet: line.trim().to_string(),
        })
        .collect()
}

/// Split on pipes when present, otherwise on the two-space cell separator
/// the normalizer leaves in place of tabs and wide-space runs.
fn split_cells(line: &str) -> Vec<String> {
    let parts: Vec<String> = if line.contains('|') {
        line.split('|').map(|c| c.trim().to_string()).collect()
    } else {
        line.split("  ").map(|c| c.trim().to_string()).collect()
    };
    parts.into_iter().filter(|c| !c.is_empty()).collect()
}

fn is_header_cell(cell: &str) -> bool {
    HEADER_CELLS.contains(&cell.trim().to_lowercase().as_str())
}

fn is_header_row(cells: &[String]) -> bool {
    cells.iter().all(|c| is_header_cell(c))
}

fn is_policy_prose(line: &str) -> bool {
    if line.chars().count() <= PROSE_LENGTH_LIMIT {
        return false;
    }
    let lower = line.to_lowercase();
    !SCHEDULING_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::SlashDateOrder;
    use chrono::NaiveDate;

    fn doc() -> OutlineDocument {
        OutlineDocument {
            text: String::new(),
            fallback_year: 2026,
            slash_order: SlashDateOrder::MonthFirst,
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn pipe_row_yields_candidate() {
        let mut diag = RowDiagnostics::default();
        let row = "| Jan 22 | Quiz 1 | 10% |";
        let candidates = match_table_row(row, &doc(), &mut diag);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].date, Some(ymd(2026, 1, 22)));
        assert_eq!(candidates[0].description, "Quiz 1 — 10%");
        assert_eq!(diag.date_rows_normalized, 1);
    }

    #[test]
    fn wide_space_row_yields_candidate() {
        let mut diag = RowDiagnostics::default();
        let row = "Mar 14  Midterm Exam  Chapters 1-5";
        let candidates = match_table_row(row, &doc(), &mut diag);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].date, Some(ymd(2026, 3, 14)));
        assert!(candidates[0].description.starts_with("Midterm Exam"));
    }

    #[test]
    fn multi_date_cell_fans_out() {
        let mut diag = RowDiagnostics::default();
        let row = "| Jan 22 & 24 | Lab sessions |";
        let candidates = match_table_row(row, &doc(), &mut diag);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].date, Some(ymd(2026, 1, 22)));
        assert_eq!(candidates[1].date, Some(ymd(2026, 1, 24)));
        assert_eq!(diag.date_rows_normalized, 1);
    }

    #[test]
    fn header_row_dropped() {
        let mut diag = RowDiagnostics::default();
        // "Due Date" contains a date-ish word but no token; craft one that does
        let row = "| Date | Topic | Reading |";
        let candidates = match_table_row(row, &doc(), &mut diag);
        assert!(candidates.is_empty());
        assert_eq!(diag.date_rows_seen, 0, "no date token, row never counted");
    }

    #[test]
    fn dateless_description_row_dropped() {
        let mut diag = RowDiagnostics::default();
        let row = "| Jan 22 | Date |";
        let candidates = match_table_row(row, &doc(), &mut diag);
        assert!(candidates.is_empty());
        assert_eq!(diag.date_rows_seen, 1);
        assert_eq!(diag.date_rows_dropped, 1);
    }

    #[test]
    fn policy_prose_dropped() {
        let mut diag = RowDiagnostics::default();
        let row = format!(
            "Academic honesty (see May 5 policy):  {}",
            "any use of unauthorized aid will be referred to the dean of students for formal disciplinary action under university regulations."
        );
        let candidates = match_table_row(&row, &doc(), &mut diag);
        assert!(candidates.is_empty());
        assert_eq!(diag.date_rows_dropped, 1);
    }

    #[test]
    fn non_tabular_line_ignored() {
        let mut diag = RowDiagnostics::default();
        let candidates = match_table_row("Quiz 1 happens Jan 22", &doc(), &mut diag);
        assert!(candidates.is_empty());
        assert_eq!(diag.date_rows_seen, 0);
    }
}
