//! Hybrid parse orchestration: rule extraction first, then a bounded
//! concurrent AI pass over a prioritized, capped subset of chunks, run
//! only when rule quality is insufficient and an adapter was supplied.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::NaiveDate;

use super::chunker::chunk_sections;
use super::confidence::{score_schedule, thresholds, CandidateSource};
use super::dates::{normalize_time, parse_date_token, parse_weekdays};
use super::extractor::{ChunkExtraction, ExtractorError, OutlineExtractor};
use super::merge::{choose_schedule, merge_events};
use super::normalize::normalize_document;
use super::rules::{self, RawCandidate, RuleExtraction};
use super::sections::detect_sections;
use super::types::{
    OutlineChunk, OutlineDocument, OutlineSection, ParseMeta, ParseMetrics,
    ParsedOutlineResponse, ScheduleCandidate, PARSER_VERSION_FALLBACK, PARSER_VERSION_HYBRID,
};
use crate::config::ParserConfig;
use crate::models::enums::SectionKind;

/// The outline parsing engine. Collaborators arrive by injection: the
/// AI extractor is optional, and its absence only degrades the result.
pub struct OutlineParser {
    config: ParserConfig,
    extractor: Option<Arc<dyn OutlineExtractor>>,
}

impl OutlineParser {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            extractor: None,
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn OutlineExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Parse one outline document. Never fails for imperfect extraction:
    /// the response carries warnings and `needs_review` flags instead.
    pub async fn parse(&self, raw_text: &str) -> ParsedOutlineResponse {
        let started = Instant::now();
        tracing::debug!(
            chars = raw_text.len(),
            legacy = self.config.force_legacy,
            "parsing outline document"
        );

        let doc = normalize_document(raw_text);

        if self.config.force_legacy {
            return self.legacy_parse(&doc, started);
        }

        let sections = detect_sections(&doc.text);
        let chunks = chunk_sections(&sections, self.config.max_chunk_chars);
        let rule = rules::extract_rules(&doc, &sections);

        let mut metrics = ParseMetrics {
            rule_candidates: rule.events.len(),
            date_rows_seen: rule.diagnostics.date_rows_seen,
            date_rows_normalized: rule.diagnostics.date_rows_normalized,
            date_rows_dropped: rule.diagnostics.date_rows_dropped,
            chunks_used: chunks.len(),
            ..ParseMetrics::default()
        };

        let mut warnings = Vec::new();
        let mut course_name = rule.course_name.clone();
        let course_code = rule.course_code.clone();
        let mut events = rule.events.clone();
        let mut schedules = rule.schedules.clone();

        match self.extractor.as_ref() {
            None => warnings.push(
                "AI assistance unavailable; results come from rule-based extraction only.".to_string(),
            ),
            Some(_) if !needs_ai_assistance(&rule) => {}
            Some(extractor) => {
                let ranked = rank_chunks(&chunks, &rule.schedules, self.config.max_ai_chunks);
                metrics.ai_chunks_attempted = ranked.len();

                let results = fan_out(
                    Arc::clone(extractor),
                    ranked.clone(),
                    self.config.ai_concurrency,
                    self.config.ai_timeout,
                )
                .await;

                for (chunk, result) in ranked.iter().zip(results) {
                    match result {
                        Ok(extraction) => {
                            absorb_extraction(
                                extraction,
                                chunk,
                                &sections,
                                &doc,
                                &mut events,
                                &mut schedules,
                                &mut course_name,
                            );
                        }
                        Err(ExtractorError::Timeout) => {
                            tracing::warn!(chunk_id = chunk.chunk_id, "AI extraction timed out");
                            metrics.ai_timeouts += 1;
                        }
                        Err(e) => {
                            tracing::warn!(chunk_id = chunk.chunk_id, error = %e, "AI extraction failed");
                            metrics.ai_failures += 1;
                        }
                    }
                }
            }
        }

        if metrics.ai_timeouts > 0 {
            warnings.push(format!(
                "{} AI extraction call(s) timed out; those chunks contributed nothing.",
                metrics.ai_timeouts
            ));
        }
        if metrics.ai_failures > 0 {
            warnings.push(format!(
                "{} AI extraction call(s) failed; those chunks contributed nothing.",
                metrics.ai_failures
            ));
        }

        let events = merge_events(events);
        let schedule = choose_schedule(schedules);

        push_result_warnings(&mut warnings, &events, schedule.needs_input());

        metrics.duration_ms = started.elapsed().as_millis() as u64;

        ParsedOutlineResponse {
            course_name,
            course_code,
            events,
            schedule,
            meta: ParseMeta {
                parser_version: PARSER_VERSION_HYBRID.to_string(),
                warnings,
                extracted_sections: section_kinds(&sections),
                metrics,
            },
        }
    }

    /// Degraded mode: the whole document as one general section, rules
    /// only, no chunking, no AI.
    fn legacy_parse(&self, doc: &OutlineDocument, started: Instant) -> ParsedOutlineResponse {
        let line_count = doc.text.lines().count();
        let section = OutlineSection {
            id: 0,
            kind: SectionKind::General,
            start_line: 0,
            end_line: line_count.saturating_sub(1),
            text: doc.text.clone(),
        };
        let rule = rules::extract_rules(doc, std::slice::from_ref(&section));

        let mut warnings =
            vec!["Legacy rule-only extraction was forced; AI and section analysis skipped.".to_string()];
        let rule_candidates = rule.events.len();
        let events = merge_events(rule.events);
        let schedule = choose_schedule(rule.schedules);
        push_result_warnings(&mut warnings, &events, schedule.needs_input());

        ParsedOutlineResponse {
            course_name: rule.course_name,
            course_code: rule.course_code,
            events,
            schedule,
            meta: ParseMeta {
                parser_version: PARSER_VERSION_FALLBACK.to_string(),
                warnings,
                extracted_sections: vec![SectionKind::General],
                metrics: ParseMetrics {
                    duration_ms: started.elapsed().as_millis() as u64,
                    rule_candidates,
                    date_rows_seen: rule.diagnostics.date_rows_seen,
                    date_rows_normalized: rule.diagnostics.date_rows_normalized,
                    date_rows_dropped: rule.diagnostics.date_rows_dropped,
                    ..ParseMetrics::default()
                },
            },
        }
    }
}

/// Rule output is good enough to skip AI only when a confident complete
/// schedule exists, enough dated events were found, and nothing scored
/// below the assistance threshold.
fn needs_ai_assistance(rule: &RuleExtraction) -> bool {
    let confident_schedule = rule
        .schedules
        .iter()
        .any(|s| s.is_complete() && s.confidence >= thresholds::SCHEDULE_CONFIDENT);
    if !confident_schedule {
        return true;
    }

    let dated = rule.events.iter().filter(|e| e.date.is_some()).count();
    rule.events.len() < 2
        || dated < 5
        || rule
            .events
            .iter()
            .any(|e| e.confidence < thresholds::AI_ASSIST_EVENT)
}

/// Rank chunks for the capped AI pass: schedule sections first while the
/// schedule is unresolved, then assessments/important-dates, then
/// document order.
fn rank_chunks(
    chunks: &[OutlineChunk],
    schedules: &[ScheduleCandidate],
    cap: usize,
) -> Vec<OutlineChunk> {
    let schedule_missing = !schedules
        .iter()
        .any(|s| s.is_complete() && s.confidence >= thresholds::SCHEDULE_CONFIDENT);

    let mut ranked: Vec<&OutlineChunk> = chunks.iter().collect();
    ranked.sort_by_key(|c| {
        let priority = match c.section_kind {
            SectionKind::Schedule if schedule_missing => 0,
            SectionKind::Assessments | SectionKind::ImportantDates => 1,
            _ => 2,
        };
        (priority, c.chunk_id)
    });
    ranked.into_iter().take(cap).cloned().collect()
}

/// Bounded fan-out: `min(concurrency, chunks)` workers pull indices from
/// a shared counter and write into slots addressed by chunk position, so
/// output order never depends on completion order. A timeout or error
/// discards only that chunk's result.
async fn fan_out(
    extractor: Arc<dyn OutlineExtractor>,
    chunks: Vec<OutlineChunk>,
    concurrency: usize,
    timeout: std::time::Duration,
) -> Vec<Result<ChunkExtraction, ExtractorError>> {
    let total = chunks.len();
    let chunks = Arc::new(chunks);
    let next_index = Arc::new(AtomicUsize::new(0));
    let slots: Arc<Mutex<Vec<Option<Result<ChunkExtraction, ExtractorError>>>>> =
        Arc::new(Mutex::new((0..total).map(|_| None).collect()));

    let workers = concurrency.max(1).min(total);
    let mut handles = Vec::with_capacity(workers);

    for _ in 0..workers {
        let extractor = Arc::clone(&extractor);
        let chunks = Arc::clone(&chunks);
        let next_index = Arc::clone(&next_index);
        let slots = Arc::clone(&slots);

        handles.push(tokio::spawn(async move {
            loop {
                let index = next_index.fetch_add(1, Ordering::SeqCst);
                if index >= chunks.len() {
                    break;
                }
                let chunk = chunks[index].clone();
                let extractor = Arc::clone(&extractor);

                let call =
                    tokio::task::spawn_blocking(move || extractor.extract_chunk(&chunk));
                let outcome = match tokio::time::timeout(timeout, call).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(join_error)) => Err(ExtractorError::Adapter(join_error.to_string())),
                    Err(_elapsed) => Err(ExtractorError::Timeout),
                };

                slots.lock().expect("result slots lock poisoned")[index] = Some(outcome);
            }
        }));
    }

    for handle in handles {
        // A panicked worker only loses its own slots; siblings continue.
        let _ = handle.await;
    }

    let mut slots = slots.lock().expect("result slots lock poisoned");
    slots
        .iter_mut()
        .map(|slot| {
            slot.take()
                .unwrap_or_else(|| Err(ExtractorError::Adapter("worker panicked".into())))
        })
        .collect()
}

/// Push one chunk's AI output through the same normalization and scoring
/// as rule candidates, with the lower AI base trust.
fn absorb_extraction(
    extraction: ChunkExtraction,
    chunk: &OutlineChunk,
    sections: &[OutlineSection],
    doc: &OutlineDocument,
    events: &mut Vec<super::types::ParsedEvent>,
    schedules: &mut Vec<ScheduleCandidate>,
    course_name: &mut String,
) {
    let section = &sections[chunk.section_id];

    if course_name.trim().is_empty() {
        if let Some(name) = extraction.course_name {
            if !name.trim().is_empty() {
                *course_name = name.trim().to_string();
            }
        }
    }

    if let Some(hint) = extraction.schedule {
        let days = parse_weekdays(&hint.days);
        if !days.is_empty() {
            let start_time = hint.start_time.as_deref().and_then(normalize_time);
            let end_time = hint.end_time.as_deref().and_then(normalize_time);
            let has_both = start_time.is_some() && end_time.is_some();
            schedules.push(ScheduleCandidate {
                confidence: score_schedule(CandidateSource::Ai, true, has_both, chunk.section_kind),
                days,
                start_time,
                end_time,
                source_snippet: hint.days,
                section: chunk.section_kind,
            });
        }
    }

    for hint in extraction.events {
        if hint.description.trim().is_empty() {
            continue;
        }
        let date = hint.date.as_deref().and_then(|d| normalize_hint_date(d, doc));
        let hint_weight = hint.weight.filter(|w| (0.0..=100.0).contains(w));
        let mut event = rules::finish_candidate(
            RawCandidate {
                date,
                time: hint.time.as_deref().and_then(normalize_time),
                type_hint: hint.event_type.unwrap_or_default(),
                description: hint.description,
                snippet: chunk.text.lines().next().unwrap_or("").to_string(),
            },
            section,
            CandidateSource::Ai,
        );
        event.chunk_id = Some(chunk.chunk_id);
        // The snippet here is surrounding chunk context, not the event's
        // own line; a percentage found in it belongs to some other item.
        // Only the adapter's stated weight applies to an AI candidate.
        event.weight = hint_weight;
        events.push(event);
    }
}

/// AI adapters usually emit ISO dates, but anything the rule vocabulary
/// knows is accepted too.
fn normalize_hint_date(raw: &str, doc: &OutlineDocument) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| parse_date_token(raw, doc.fallback_year, doc.slash_order))
}

fn push_result_warnings(
    warnings: &mut Vec<String>,
    events: &[super::types::ParsedEvent],
    schedule_needs_input: bool,
) {
    let undated = events.iter().filter(|e| e.date.is_none()).count();
    if undated > 0 {
        warnings.push(format!(
            "{undated} event(s) are missing dates and need review before import."
        ));
    }
    if schedule_needs_input {
        warnings.push(
            "No complete recurring schedule was found; meeting days and times need input.".to_string(),
        );
    }
}

fn section_kinds(sections: &[OutlineSection]) -> Vec<SectionKind> {
    let mut kinds = Vec::new();
    for section in sections {
        if !kinds.contains(&section.kind) {
            kinds.push(section.kind);
        }
    }
    kinds
}
