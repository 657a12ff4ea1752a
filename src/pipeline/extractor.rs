//! Capability boundary to an external AI extractor.
//!
//! The core never depends on any provider's request/response shape: the
//! caller supplies an implementation of `OutlineExtractor`, and the
//! orchestrator feeds it one chunk at a time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::OutlineChunk;

#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("extractor call failed: {0}")]
    Adapter(String),

    #[error("extractor call exceeded its timeout")]
    Timeout,

    #[error("extractor response could not be parsed: {0}")]
    ResponseParsing(String),
}

/// Partial structured extraction for a single chunk. All fields optional:
/// an adapter reports only what it saw.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkExtraction {
    pub course_name: Option<String>,
    pub schedule: Option<ScheduleHint>,
    pub events: Vec<EventHint>,
}

/// A recurring-schedule hint as loose strings; the orchestrator runs it
/// through the same normalization as rule candidates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleHint {
    /// Free-form days text ("Mon/Wed/Fri", "TTh").
    pub days: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// One event hint as loose strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventHint {
    pub date: Option<String>,
    pub time: Option<String>,
    pub event_type: Option<String>,
    pub description: String,
    pub weight: Option<f32>,
}

/// External AI extraction capability: one chunk in, a partial structured
/// result or failure out. Implementations may block; the orchestrator
/// isolates each call behind its own timeout.
pub trait OutlineExtractor: Send + Sync {
    fn extract_chunk(&self, chunk: &OutlineChunk) -> Result<ChunkExtraction, ExtractorError>;
}

enum MockFailure {
    Adapter,
    ResponseParsing,
}

/// Mock extractor for testing. Returns a configurable result, optionally
/// sleeping first to exercise the timeout path.
pub struct MockExtractor {
    result: ChunkExtraction,
    delay: Option<std::time::Duration>,
    failure: Option<MockFailure>,
}

impl MockExtractor {
    pub fn new(result: ChunkExtraction) -> Self {
        Self {
            result,
            delay: None,
            failure: None,
        }
    }

    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every call fails at the transport level.
    pub fn failing() -> Self {
        Self {
            result: ChunkExtraction::default(),
            delay: None,
            failure: Some(MockFailure::Adapter),
        }
    }

    /// Every call returns output that cannot be parsed.
    pub fn garbled() -> Self {
        Self {
            result: ChunkExtraction::default(),
            delay: None,
            failure: Some(MockFailure::ResponseParsing),
        }
    }
}

impl OutlineExtractor for MockExtractor {
    fn extract_chunk(&self, _chunk: &OutlineChunk) -> Result<ChunkExtraction, ExtractorError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        match self.failure {
            Some(MockFailure::Adapter) => Err(ExtractorError::Adapter("mock failure".into())),
            Some(MockFailure::ResponseParsing) => Err(ExtractorError::ResponseParsing(
                "mock produced malformed output".into(),
            )),
            None => Ok(self.result.clone()),
        }
    }
}
