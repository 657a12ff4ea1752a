use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(EventType {
    Test => "test",
    Assignment => "assignment",
    Lecture => "lecture",
    Other => "other",
});

str_enum!(EventCategory {
    Quiz => "quiz",
    Exam => "exam",
    Midterm => "midterm",
    Final => "final",
    Homework => "homework",
    Project => "project",
    Essay => "essay",
    Presentation => "presentation",
    Reading => "reading",
    Lab => "lab",
    Lecture => "lecture",
});

str_enum!(SectionKind {
    Schedule => "schedule",
    Assessments => "assessments",
    WeeklyOutline => "weekly-outline",
    Labs => "labs",
    ImportantDates => "important-dates",
    General => "general",
});

/// Component order of slash dates (`9/7` vs `7/9`) inferred per document.
str_enum!(SlashDateOrder {
    MonthFirst => "mdy",
    DayFirst => "dmy",
});

impl EventCategory {
    /// Short display label used when shortening long descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Quiz => "Quiz",
            Self::Exam => "Exam",
            Self::Midterm => "Midterm Exam",
            Self::Final => "Final Exam",
            Self::Homework => "Homework",
            Self::Project => "Project",
            Self::Essay => "Essay",
            Self::Presentation => "Presentation",
            Self::Reading => "Reading",
            Self::Lab => "Lab",
            Self::Lecture => "Lecture",
        }
    }

    /// The coarse event type this category belongs to.
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Quiz | Self::Exam | Self::Midterm | Self::Final => EventType::Test,
            Self::Homework | Self::Project | Self::Essay | Self::Presentation => {
                EventType::Assignment
            }
            Self::Reading | Self::Lab | Self::Lecture => EventType::Lecture,
        }
    }
}
