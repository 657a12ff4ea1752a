//! Courseline extracts a structured class calendar (recurring meeting
//! times, tests, assignments, lecture topics) from an unstructured course
//! outline or syllabus already decoded to plain text.
//!
//! Flow: [`pipeline::OutlineParser`] turns raw text into a
//! [`pipeline::ParsedOutlineResponse`] with per-event confidence; the
//! caller reviews and corrects it into a [`review::ImportPayload`]; the
//! [`import::Importer`] validates and persists it as a class plus its
//! calendar events, rolling the class back if any event insert fails.

pub mod config;
pub mod db;
pub mod import;
pub mod models;
pub mod pipeline;
pub mod review;

pub use config::ParserConfig;
pub use import::{ImportError, ImportOutcome, Importer};
pub use pipeline::{OutlineExtractor, OutlineParser, ParsedOutlineResponse};
pub use review::{ImportPayload, ValidationError};
