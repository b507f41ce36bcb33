//! Boundary protocol parser.
//!
//! The boundary-analysis model answers with a small textual grammar: either
//! the sentinel `<NO RESULT/>`, or a `<RESULT>` block of numbered marker
//! lines locating section edges inside the chunk by anchor text, optionally
//! accompanied by a `<META>` block with the document title and year. This
//! module turns such a response back into section body strings.
//!
//! The parser never fails. Malformed lines, unknown operators and anchors
//! that do not occur in the chunk are silently dropped; a response with no
//! usable markers simply yields no sections, which the assembler handles
//! with its whole-chunk fallback.

use crate::llm::strip_code_fence;

const RESULT_START: &str = "<RESULT>";
const RESULT_END: &str = "</RESULT>";
const META_START: &str = "<META>";
const META_END: &str = "</META>";
const NO_RESULT: &str = "<NO RESULT";

/// A marker line decoded from the model response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerKind {
    /// `section startfrom` - a new section opens at the anchor.
    Start,
    /// `section continue` - a section (re)opens at the anchor. Handled
    /// exactly like [`MarkerKind::Start`]: a rubbish-interrupted section is
    /// emitted as two separate sections, not merged.
    Continue,
    /// `rubbish skipfrom` - the open section (if any) closes before the
    /// anchor.
    Skip,
}

/// Year field of a `<META>` block.
///
/// The model is asked for an integer but occasionally answers with prose;
/// the raw string is preserved here, though only numeric years make it into
/// the indexed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaYear {
    /// Numeric year.
    Year(i32),
    /// Whatever non-numeric text the model produced.
    Text(String),
}

/// Title and year decoded from a `<META>` block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedMeta {
    /// Document title, if reported.
    pub title: Option<String>,
    /// Document year, if reported.
    pub year: Option<MetaYear>,
}

/// Extract section bodies from a boundary-analysis response.
///
/// Markers are processed strictly in file order against `chunk`. Every
/// returned body is a verbatim substring of `chunk`; a still-open section at
/// the end of the marker list runs to the end of the chunk.
pub fn parse_sections(response: &str, chunk: &str) -> Vec<String> {
    let content = strip_code_fence(response);

    if content.to_uppercase().contains(NO_RESULT) {
        return Vec::new();
    }

    // Restrict to the <RESULT> block when both tags are present; otherwise
    // scan the whole response for marker lines.
    let content = match (content.find(RESULT_START), content.find(RESULT_END)) {
        (Some(start), Some(_)) => {
            let after_start = start + RESULT_START.len();
            match content[after_start..].find(RESULT_END) {
                Some(end) => content[after_start..after_start + end].trim(),
                None => content,
            }
        }
        _ => content,
    };

    let mut sections = Vec::new();
    let mut open: Option<usize> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (kind, anchor) = match decode_marker(strip_sequence_prefix(line)) {
            Some(marker) => marker,
            None => continue,
        };

        // Anchors the model invented (or reworded) are silently dropped.
        let pos = match chunk.find(anchor) {
            Some(pos) => pos,
            None => continue,
        };

        match kind {
            MarkerKind::Skip => {
                if let Some(start) = open.take() {
                    let body = if pos >= start { &chunk[start..pos] } else { "" };
                    sections.push(body.to_string());
                }
            }
            MarkerKind::Start | MarkerKind::Continue => {
                open = Some(pos);
            }
        }
    }

    if let Some(start) = open {
        sections.push(chunk[start..].to_string());
    }

    sections
}

/// Extract document title and year from a response's `<META>` block.
///
/// Returns `None` when the block is absent or contains no recognized keys.
/// Keys are matched case-insensitively; a non-numeric year is kept as raw
/// text.
pub fn parse_meta(response: &str) -> Option<ParsedMeta> {
    let content = strip_code_fence(response);

    let start = content.find(META_START)? + META_START.len();
    let end = start + content[start..].find(META_END)?;
    let block = content[start..end].trim();

    let mut meta = ParsedMeta::default();
    let mut found = false;

    for line in block.lines() {
        let line = line.trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim().to_lowercase().as_str() {
            "title" => {
                meta.title = Some(value.to_string());
                found = true;
            }
            "year" => {
                meta.year = Some(match value.parse::<i32>() {
                    Ok(year) => MetaYear::Year(year),
                    Err(_) => MetaYear::Text(value.to_string()),
                });
                found = true;
            }
            _ => {}
        }
    }

    found.then_some(meta)
}

/// Strip the cosmetic `NNNN:` sequence prefix from a marker line.
fn strip_sequence_prefix(line: &str) -> &str {
    let bytes = line.as_bytes();
    if bytes.len() > 5 && bytes[4] == b':' && bytes[..4].iter().all(|b| b.is_ascii_digit()) {
        line[5..].trim_start()
    } else {
        line
    }
}

/// Decode one marker line into its kind and anchor text.
///
/// A trailing ellipsis on the anchor (`...` or `…`) is trimmed: the model
/// tends to elide long anchors, and the prefix is enough for first-occurrence
/// search.
fn decode_marker(line: &str) -> Option<(MarkerKind, &str)> {
    let (kind, anchor) = if let Some(rest) = line.strip_prefix("section startfrom ") {
        (MarkerKind::Start, rest)
    } else if let Some(rest) = line.strip_prefix("section continue") {
        (MarkerKind::Continue, rest)
    } else if let Some(rest) = line.strip_prefix("rubbish skipfrom ") {
        (MarkerKind::Skip, rest)
    } else {
        return None;
    };

    let anchor = anchor.trim();
    let anchor = anchor
        .strip_suffix("...")
        .or_else(|| anchor.strip_suffix('…'))
        .unwrap_or(anchor)
        .trim();

    Some((kind, anchor))
}
