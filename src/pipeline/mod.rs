//! The hybrid outline parsing pipeline.
//!
//! Stages run in a fixed order: normalize the raw text, detect topical
//! sections, extract rule-based candidates, optionally fan out capped
//! chunks to an AI extractor, then merge and score everything into one
//! reviewable response.

pub mod chunker;
pub mod confidence;
pub mod dates;
pub mod extractor;
pub mod merge;
pub mod normalize;
pub mod orchestrator;
pub mod rules;
pub mod sections;
pub mod types;

pub use extractor::{ChunkExtraction, EventHint, ExtractorError, MockExtractor, OutlineExtractor, ScheduleHint};
pub use orchestrator::OutlineParser;
pub use types::{ParsedEvent, ParsedOutlineResponse, ParsedSchedule};
