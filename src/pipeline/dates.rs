//! Date, time, and weekday token vocabulary shared by the rule matchers
//! and by AI-candidate normalization.
//!
//! All functions are pure; per-document inference (`fallback_year`,
//! `slash_order`) is passed in from the normalizer.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::enums::SlashDateOrder;

static NAMED_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+(\d{1,2})(?:st|nd|rd|th)?(?:,?\s*(\d{4}))?\b",
    )
    .expect("named date regex")
});

static SLASH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{2,4}))?\b").expect("slash regex"));

static TIME_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    // Requires minutes or an am/pm marker; a bare hour is too ambiguous.
    Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*(a\.?m\.?|p\.?m\.?)\b|\b(\d{1,2}):(\d{2})\b")
        .expect("time regex")
});

static TIME_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2}(?::\d{2})?\s*(?:a\.?m\.?|p\.?m\.?)?)\s*(?:-|–|—|to|until)\s*(\d{1,2}(?::\d{2})?\s*(?:a\.?m\.?|p\.?m\.?)?)\b",
    )
    .expect("time range regex")
});

static WEEKDAY_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(mon(?:day)?s?|tues?(?:day)?s?|wed(?:nesday)?s?|thu(?:r|rs|rsday)?s?|fri(?:day)?s?|sat(?:urday)?s?|sun(?:day)?s?)\b",
    )
    .expect("weekday regex")
});

// Compact day-letter runs like "MWF", "TTh", "T/Th", "M-W-F". At least two
// day tokens, so a lone "M" in prose never matches.
static COMPACT_DAYS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:(?:Th|Tu|Sa|Su|M|T|W|R|F)[/-]?){2,}\b").expect("compact days regex")
});

static BARE_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})(?:st|nd|rd|th)?$").expect("bare day regex"));

static MULTI_DATE_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*(?:&|,|;|–|—|-|\band\b)\s*").expect("split regex"));

fn month_number(name: &str) -> Option<u32> {
    let key: String = name
        .trim_end_matches('.')
        .chars()
        .take(3)
        .collect::<String>()
        .to_lowercase();
    match key.as_str() {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}

fn normalize_year(raw: i32) -> i32 {
    if raw < 100 {
        2000 + raw
    } else {
        raw
    }
}

/// Parse a single date token ("Jan 5", "January 5, 2026", "9/7", "25/3/26")
/// to a calendar-valid date. Invalid calendar values return None.
pub fn parse_date_token(
    token: &str,
    fallback_year: i32,
    slash_order: SlashDateOrder,
) -> Option<NaiveDate> {
    let trimmed = token.trim();

    if let Some(cap) = NAMED_DATE.captures(trimmed) {
        let month = month_number(&cap[1])?;
        let day: u32 = cap[2].parse().ok()?;
        let year = cap
            .get(3)
            .and_then(|y| y.as_str().parse::<i32>().ok())
            .map(normalize_year)
            .unwrap_or(fallback_year);
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(cap) = SLASH_DATE.captures(trimmed) {
        let first: u32 = cap[1].parse().ok()?;
        let second: u32 = cap[2].parse().ok()?;
        let year = cap
            .get(3)
            .and_then(|y| y.as_str().parse::<i32>().ok())
            .map(normalize_year)
            .unwrap_or(fallback_year);
        let (month, day) = match slash_order {
            SlashDateOrder::MonthFirst => (first, second),
            SlashDateOrder::DayFirst => (second, first),
        };
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

/// True when the text carries at least one date-shaped token.
pub fn contains_date_token(text: &str) -> bool {
    NAMED_DATE.is_match(text) || SLASH_DATE.is_match(text)
}

/// Byte spans of date tokens, for splitting multi-event lines.
pub fn date_anchor_spans(line: &str) -> Vec<(usize, usize)> {
    let mut spans: Vec<(usize, usize)> = NAMED_DATE
        .find_iter(line)
        .map(|m| (m.start(), m.end()))
        .chain(SLASH_DATE.find_iter(line).map(|m| (m.start(), m.end())))
        .collect();
    spans.sort_unstable();
    spans.dedup_by_key(|(start, _)| *start);
    spans
}

/// Byte offsets where date tokens start.
pub fn date_anchor_offsets(line: &str) -> Vec<usize> {
    date_anchor_spans(line).into_iter().map(|(s, _)| s).collect()
}

/// Expand a multi-date cell ("Jan 22 & 24", "Jan 22-Jan 24", "3/2, 3/9")
/// into discrete listed dates. Hyphenated pairs are deliberately treated
/// as two listed dates, not an inclusive range.
pub fn expand_date_cell(
    cell: &str,
    fallback_year: i32,
    slash_order: SlashDateOrder,
) -> Vec<NaiveDate> {
    let parts: Vec<&str> = MULTI_DATE_SPLIT.split(cell).collect();

    // A cell holding one date and no bare-day continuations
    // ("January 5, 2026") must not be broken apart at its own comma.
    let has_continuation = parts.iter().any(|p| BARE_DAY.is_match(p.trim()));
    if date_anchor_offsets(cell).len() <= 1 && !has_continuation {
        return parse_date_token(cell, fallback_year, slash_order)
            .into_iter()
            .collect();
    }

    let mut dates = Vec::new();
    let mut carry: Option<(u32, i32)> = None; // (month, year) of the last named date

    for part in parts {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some(cap) = NAMED_DATE.captures(part) {
            if let (Some(month), Ok(day)) = (month_number(&cap[1]), cap[2].parse::<u32>()) {
                let year = cap
                    .get(3)
                    .and_then(|y| y.as_str().parse::<i32>().ok())
                    .map(normalize_year)
                    .unwrap_or(fallback_year);
                if let Some(d) = NaiveDate::from_ymd_opt(year, month, day) {
                    dates.push(d);
                    carry = Some((month, year));
                }
            }
            continue;
        }

        if SLASH_DATE.is_match(part) {
            if let Some(d) = parse_date_token(part, fallback_year, slash_order) {
                dates.push(d);
            }
            continue;
        }

        // Bare day continuation: "& 24" inherits the previous month
        if let (Some(cap), Some((month, year))) = (BARE_DAY.captures(part), carry) {
            if let Ok(day) = cap[1].parse::<u32>() {
                if let Some(d) = NaiveDate::from_ymd_opt(year, month, day) {
                    dates.push(d);
                }
            }
        }
    }

    dates
}

/// Normalize a clock token to "HH:MM" 24-hour form.
/// "9am" → "09:00", "9:30 PM" → "21:30", "27:10" → None.
pub fn normalize_time(text: &str) -> Option<String> {
    let cap = TIME_TOKEN.captures(text.trim())?;

    if let Some(hour) = cap.get(1) {
        let hour: u32 = hour.as_str().parse().ok()?;
        let minute: u32 = cap.get(2).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
        let meridiem = cap[3].to_lowercase();
        if !(1..=12).contains(&hour) || minute > 59 {
            return None;
        }
        let hour24 = match (meridiem.starts_with('p'), hour) {
            (false, 12) => 0,
            (false, h) => h,
            (true, 12) => 12,
            (true, h) => h + 12,
        };
        return Some(format!("{hour24:02}:{minute:02}"));
    }

    let hour: u32 = cap.get(4)?.as_str().parse().ok()?;
    let minute: u32 = cap.get(5)?.as_str().parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some(format!("{hour:02}:{minute:02}"))
}

/// Detect a "start to end" clock range ("9:00-9:50", "9am to 10am").
/// A bare-hour start inherits the end's meridiem ("9 to 10am").
pub fn find_time_range(text: &str) -> Option<(String, String)> {
    for cap in TIME_RANGE.captures_iter(text) {
        let raw_start = cap[1].trim().to_string();
        let raw_end = cap[2].trim().to_string();

        // Day ranges ("Jan 22-24") also match the shape; skip anything
        // whose endpoints don't normalize as clock times.
        let Some(end) = normalize_time(&raw_end) else {
            continue;
        };
        let start = normalize_time(&raw_start).or_else(|| {
            let meridiem = if raw_end.to_lowercase().contains('p') { "pm" } else { "am" };
            normalize_time(&format!("{raw_start}{meridiem}"))
        });
        if let Some(start) = start {
            return Some((start, end));
        }
    }
    None
}

/// Extract weekday indices (0 = Monday … 6 = Sunday) from names,
/// abbreviations, or compact letter runs.
pub fn parse_weekdays(text: &str) -> BTreeSet<u8> {
    let mut days = BTreeSet::new();

    for cap in WEEKDAY_NAME.captures_iter(text) {
        let token = cap[1].to_lowercase();
        let day = match &token[..2.min(token.len())] {
            "mo" => 0,
            "tu" => 1,
            "we" => 2,
            "th" => 3,
            "fr" => 4,
            "sa" => 5,
            "su" => 6,
            _ => continue,
        };
        days.insert(day);
    }

    for m in COMPACT_DAYS.find_iter(text) {
        days.extend(decode_compact_run(m.as_str()));
    }

    days
}

fn decode_compact_run(run: &str) -> Vec<u8> {
    let chars: Vec<char> = run.chars().filter(|c| *c != '/' && *c != '-').collect();
    let mut days = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let pair: String = chars[i..(i + 2).min(chars.len())].iter().collect();
        let (day, consumed) = match pair.as_str() {
            "Th" => (Some(3), 2),
            "Tu" => (Some(1), 2),
            "Sa" => (Some(5), 2),
            "Su" => (Some(6), 2),
            _ => match chars[i] {
                'M' => (Some(0), 1),
                'T' => (Some(1), 1),
                'W' => (Some(2), 1),
                'R' => (Some(3), 1),
                'F' => (Some(4), 1),
                _ => (None, 1),
            },
        };
        if let Some(d) = day {
            days.push(d);
        }
        i += consumed;
    }
    days
}
