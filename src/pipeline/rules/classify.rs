//! Keyword classification of candidates into event types and categories,
//! description shortening, grade-weight capture, and the course-name guess.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::enums::{EventCategory, EventType};

static WEIGHT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,3}(?:\.\d+)?)\s*%").expect("weight regex")
});

static COURSE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{2,5})\s?-?(\d{3,4}[A-Z]?)\b").expect("code regex"));

/// Maximum description length before shortening kicks in.
const MAX_DESCRIPTION_CHARS: usize = 50;

/// Category keywords, most specific first. The first hit decides both the
/// fine category and the coarse type.
const CATEGORY_KEYWORDS: &[(EventCategory, &[&str])] = &[
    (EventCategory::Final, &["final exam", "final examination", "final test", "final"]),
    (EventCategory::Midterm, &["midterm", "mid-term", "mid term"]),
    (EventCategory::Quiz, &["quiz", "quizzes"]),
    (EventCategory::Exam, &["exam", "examination", "test "]),
    (EventCategory::Project, &["project", "capstone"]),
    (EventCategory::Essay, &["essay", "paper", "report"]),
    (EventCategory::Presentation, &["presentation", "present "]),
    (EventCategory::Homework, &["assignment", "homework", "problem set", "pset", "due"]),
    (EventCategory::Lab, &["lab ", "laboratory", "practical"]),
    (EventCategory::Reading, &["reading", "chapter", "ch.", "textbook"]),
    (EventCategory::Lecture, &["lecture", "topic", "unit ", "week ", "intro"]),
];

/// Classification outcome: the coarse type, the fine category when a
/// keyword justified it, and whether any keyword matched at all.
#[derive(Debug, Clone, Copy)]
pub struct Classification {
    pub event_type: EventType,
    pub category: Option<EventCategory>,
    pub keyword_matched: bool,
}

/// Classify a candidate from its provisional type hint plus description.
pub fn classify_event(type_hint: &str, description: &str) -> Classification {
    let combined = format!("{type_hint} {description} ").to_lowercase();

    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|kw| combined.contains(kw)) {
            return Classification {
                event_type: category.event_type(),
                category: Some(*category),
                keyword_matched: true,
            };
        }
    }

    Classification {
        event_type: EventType::Other,
        category: None,
        keyword_matched: false,
    }
}

/// Shorten descriptions longer than the cap to a short event name:
/// the category label (keeping a trailing ordinal like "Quiz 2" when the
/// text has one), falling back to the first clause.
pub fn shorten_description(description: &str, category: Option<EventCategory>) -> String {
    let trimmed = description.trim();
    if trimmed.chars().count() <= MAX_DESCRIPTION_CHARS {
        return trimmed.to_string();
    }

    if let Some(category) = category {
        let label = category.label();
        if let Some(number) = trailing_ordinal(trimmed, label) {
            return format!("{label} {number}");
        }
        return label.to_string();
    }

    first_clause(trimmed)
}

/// "Quiz 2 covering sections ..." → Some(2)
fn trailing_ordinal(text: &str, label: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    let label_lower = label.to_lowercase();
    let pos = lower.find(&label_lower)?;
    let rest = lower[pos + label_lower.len()..].trim_start();
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn first_clause(text: &str) -> String {
    let clause = text
        .split(['.', ';', ':', ','])
        .next()
        .unwrap_or(text)
        .trim();
    let mut out: String = clause.chars().take(MAX_DESCRIPTION_CHARS).collect();
    if clause.chars().count() > MAX_DESCRIPTION_CHARS {
        out.push('…');
    }
    out
}

/// Grade weight percentage (0-100) stated in the text, if any.
pub fn parse_weight(text: &str) -> Option<f32> {
    let cap = WEIGHT_TOKEN.captures(text)?;
    let value: f32 = cap[1].parse().ok()?;
    (0.0..=100.0).contains(&value).then_some(value)
}

/// Best-effort course name from the first lines of the document:
/// a line carrying a course code wins, otherwise the first short
/// non-heading-ish line. Returns (name, code).
pub fn guess_course_name(text: &str) -> (String, Option<String>) {
    let head: Vec<&str> = text.lines().take(10).collect();

    for line in &head {
        if let Some(cap) = COURSE_CODE.captures(line) {
            // "FALL 2026" has the same shape; year-like numbers are not codes.
            let number: u32 = cap[2]
                .trim_end_matches(|c: char| c.is_ascii_alphabetic())
                .parse()
                .unwrap_or(0);
            if (1900..=2099).contains(&number) {
                continue;
            }
            let code = format!("{} {}", &cap[1], &cap[2]);
            let name = line.trim();
            if name.chars().count() <= 80 {
                return (name.to_string(), Some(code));
            }
            return (code.clone(), Some(code));
        }
    }

    for line in &head {
        let trimmed = line.trim();
        if !trimmed.is_empty() && trimmed.chars().count() <= 80 && !trimmed.ends_with(':') {
            return (trimmed.to_string(), None);
        }
    }

    (String::new(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_assessments() {
        let c = classify_event("", "Midterm Exam covering chapters 1-5");
        assert_eq!(c.event_type, EventType::Test);
        assert_eq!(c.category, Some(EventCategory::Midterm));
        assert!(c.keyword_matched);
    }

    #[test]
    fn due_keyword_is_assignment() {
        let c = classify_event("", "Assignment 2 due");
        assert_eq!(c.event_type, EventType::Assignment);
        assert_eq!(c.category, Some(EventCategory::Homework));
    }

    #[test]
    fn reading_is_lecture_type() {
        let c = classify_event("", "Reading: Chapter 4");
        assert_eq!(c.event_type, EventType::Lecture);
        assert_eq!(c.category, Some(EventCategory::Reading));
    }

    #[test]
    fn no_keyword_flags_unmatched() {
        let c = classify_event("", "Guest speaker visit");
        assert_eq!(c.event_type, EventType::Other);
        assert_eq!(c.category, None);
        assert!(!c.keyword_matched);
    }

    #[test]
    fn type_hint_participates() {
        let c = classify_event("quiz", "covering sections 2.1 through 2.4");
        assert_eq!(c.event_type, EventType::Test);
        assert_eq!(c.category, Some(EventCategory::Quiz));
    }

    #[test]
    fn short_descriptions_unchanged() {
        assert_eq!(
            shorten_description("Quiz 1", Some(EventCategory::Quiz)),
            "Quiz 1"
        );
    }

    #[test]
    fn long_description_shortens_to_label_with_ordinal() {
        let long = "Quiz 3 covering all of the material from weeks five and six, closed book";
        assert_eq!(shorten_description(long, Some(EventCategory::Quiz)), "Quiz 3");
    }

    #[test]
    fn long_description_without_category_takes_first_clause() {
        let long = "Bring your field notebooks, rock samples, and completed worksheets to class";
        let short = shorten_description(long, None);
        assert_eq!(short, "Bring your field notebooks");
    }

    #[test]
    fn weight_capture() {
        assert_eq!(parse_weight("Midterm Exam 30%"), Some(30.0));
        assert_eq!(parse_weight("worth 12.5 %"), Some(12.5));
        assert_eq!(parse_weight("no weight here"), None);
    }

    #[test]
    fn course_name_prefers_code_line() {
        let text = "University of Somewhere\nGEOL 101: Introduction to Geology\nWinter 2026";
        let (name, code) = guess_course_name(text);
        assert_eq!(name, "GEOL 101: Introduction to Geology");
        assert_eq!(code.as_deref(), Some("GEOL 101"));
    }

    #[test]
    fn course_name_falls_back_to_first_line() {
        let (name, code) = guess_course_name("Introduction to Pottery\nInstructor: J. Doe");
        assert_eq!(name, "Introduction to Pottery");
        assert_eq!(code, None);
    }
}
