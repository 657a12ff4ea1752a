//! Parser configuration: chunking, AI fan-out limits, and degraded mode.
//!
//! Confidence weights and review thresholds live in `pipeline::confidence`
//! so scoring stays a single tunable table.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for one outline parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Maximum characters per chunk sent to the AI extractor.
    pub max_chunk_chars: usize,
    /// Hard cap on chunks submitted to the AI extractor per parse.
    pub max_ai_chunks: usize,
    /// Worker pool size for AI fan-out (actual size = min(this, chunk count)).
    pub ai_concurrency: usize,
    /// Per-chunk AI call timeout.
    #[serde(with = "duration_secs")]
    pub ai_timeout: Duration,
    /// Force legacy rule-only extraction, bypassing sections/chunks/AI.
    pub force_legacy: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 1800,
            max_ai_chunks: 12,
            ai_concurrency: 3,
            ai_timeout: Duration::from_secs(8),
            force_legacy: false,
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_limits() {
        let config = ParserConfig::default();
        assert_eq!(config.max_chunk_chars, 1800);
        assert_eq!(config.max_ai_chunks, 12);
        assert_eq!(config.ai_concurrency, 3);
        assert_eq!(config.ai_timeout, Duration::from_secs(8));
        assert!(!config.force_legacy);
    }

    #[test]
    fn serializes_timeout_as_seconds() {
        let json = serde_json::to_value(ParserConfig::default()).unwrap();
        assert_eq!(json["ai_timeout"], 8);
    }
}
