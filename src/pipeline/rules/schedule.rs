//! Schedule-pattern matcher: recognizes recurring meeting lines like
//! "MWF 9:00-9:50" or "Lectures: Tue/Thu 2pm to 3:15pm".

use crate::models::enums::SectionKind;
use crate::pipeline::confidence::{score_schedule, CandidateSource};
use crate::pipeline::dates::{find_time_range, normalize_time, parse_weekdays};
use crate::pipeline::types::ScheduleCandidate;

/// Scan one line for a recurring meeting pattern. Lines carrying explicit
/// dates are event material, not schedules, and are left to other matchers.
pub fn match_schedule_line(line: &str, section: SectionKind) -> Option<ScheduleCandidate> {
    if crate::pipeline::dates::contains_date_token(line) {
        return None;
    }

    let days = parse_weekdays(line);
    if days.is_empty() {
        return None;
    }

    let (start_time, end_time) = match find_time_range(line) {
        Some((start, end)) => (Some(start), Some(end)),
        // A single time still helps ("Mondays at 6pm"); the reviewer
        // supplies the end.
        None => (normalize_time(line), None),
    };

    let has_both = start_time.is_some() && end_time.is_some();
    let confidence = score_schedule(CandidateSource::Rule, true, has_both, section);

    Some(ScheduleCandidate {
        days,
        start_time,
        end_time,
        confidence,
        source_snippet: line.trim().to_string(),
        section,
    })
}
