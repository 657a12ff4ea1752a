//! Splits sections into size-bounded chunks for AI extraction, packing
//! whole lines greedily. Chunks never split a line and never cross a
//! section boundary, so line provenance survives.

use super::types::{OutlineChunk, OutlineSection};

/// Chunk every section. Chunk ids are global and follow document order.
pub fn chunk_sections(sections: &[OutlineSection], max_chars: usize) -> Vec<OutlineChunk> {
    let mut chunks = Vec::new();
    for section in sections {
        chunk_section(section, max_chars, &mut chunks);
    }
    chunks
}

fn chunk_section(section: &OutlineSection, max_chars: usize, chunks: &mut Vec<OutlineChunk>) {
    let mut buf = String::new();
    let mut buf_start = section.start_line;
    let mut line_no = section.start_line;

    for line in section.text.lines() {
        let extra = line.len() + usize::from(!buf.is_empty());
        if !buf.is_empty() && buf.len() + extra > max_chars {
            push_chunk(chunks, section, buf_start, line_no - 1, &buf);
            buf.clear();
            buf_start = line_no;
        }
        if !buf.is_empty() {
            buf.push('\n');
        }
        buf.push_str(line);
        line_no += 1;
    }

    if !buf.trim().is_empty() {
        push_chunk(chunks, section, buf_start, line_no - 1, &buf);
    }
}

fn push_chunk(
    chunks: &mut Vec<OutlineChunk>,
    section: &OutlineSection,
    start_line: usize,
    end_line: usize,
    text: &str,
) {
    chunks.push(OutlineChunk {
        chunk_id: chunks.len(),
        section_id: section.id,
        section_kind: section.kind,
        start_line,
        end_line,
        text: text.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::SectionKind;

    fn section(id: usize, start_line: usize, lines: &[&str]) -> OutlineSection {
        OutlineSection {
            id,
            kind: SectionKind::General,
            start_line,
            end_line: start_line + lines.len() - 1,
            text: lines.join("\n"),
        }
    }

    #[test]
    fn small_section_is_one_chunk() {
        let s = section(0, 0, &["line one", "line two"]);
        let chunks = chunk_sections(&[s], 1800);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start_line, 0);
        assert_eq!(chunks[0].end_line, 1);
    }

    #[test]
    fn oversized_section_splits_without_breaking_lines() {
        let lines: Vec<String> = (0..40).map(|i| format!("row {i} {}", "x".repeat(50))).collect();
        let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        let s = section(0, 0, &refs);
        let chunks = chunk_sections(&[s], 300);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.len() <= 300, "chunk over budget: {}", chunk.text.len());
            for line in chunk.text.lines() {
                assert!(line.starts_with("row "), "line was split: {line:?}");
            }
        }
    }

    #[test]
    fn line_provenance_is_contiguous() {
        let lines: Vec<String> = (0..20).map(|i| format!("line {i} {}", "y".repeat(40))).collect();
        let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        let s = section(0, 5, &refs);
        let chunks = chunk_sections(&[s], 200);

        assert_eq!(chunks[0].start_line, 5);
        for pair in chunks.windows(2) {
            assert_eq!(pair[1].start_line, pair[0].end_line + 1);
        }
        assert_eq!(chunks.last().unwrap().end_line, 5 + 19);
    }

    #[test]
    fn chunks_do_not_cross_sections() {
        let a = section(0, 0, &["aaa", "bbb"]);
        let b = section(1, 2, &["ccc", "ddd"]);
        let chunks = chunk_sections(&[a, b], 1800);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].section_id, 0);
        assert_eq!(chunks[1].section_id, 1);
        assert_eq!(chunks[0].chunk_id, 0);
        assert_eq!(chunks[1].chunk_id, 1);
    }

    #[test]
    fn single_line_over_budget_still_emitted() {
        let long = "z".repeat(500);
        let s = section(0, 0, &[long.as_str()]);
        let chunks = chunk_sections(&[s], 100);
        assert_eq!(chunks.len(), 1, "a line never splits, even over budget");
    }
}
