//! Section assembly across chunk boundaries.
//!
//! Chunks are analyzed independently, so a section that spans a chunk edge
//! comes back in pieces. The assembler folds per-chunk section bodies into a
//! running document-wide list. A chunk that produced no boundaries at all is
//! never dropped: its whole text is merged into the most recent section, or
//! becomes a section of its own at the start of a document. The
//! minimum-length filter applies only to parsed bodies; fallback text is
//! exempt, so no chunk's words are ever silently lost.

use crate::types::{DocumentMeta, Section};

/// Parsed section bodies shorter than this (in characters) are discarded as
/// noise.
pub const MIN_SECTION_CHARS: usize = 80;

/// Accumulates section bodies chunk by chunk, in document order.
#[derive(Debug, Default)]
pub struct SectionAssembler {
    sections: Vec<String>,
}

impl SectionAssembler {
    /// Create an empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one chunk's parsed section bodies into the running list.
    ///
    /// Bodies below [`MIN_SECTION_CHARS`] characters are dropped. An empty
    /// `bodies` means the boundary analysis saw no edges inside the chunk;
    /// the whole chunk is then merged into the previous section with a
    /// single space, or opens the list when there is no previous section.
    pub fn fold(&mut self, chunk: &str, bodies: Vec<String>) {
        if bodies.is_empty() {
            match self.sections.last_mut() {
                Some(last) => {
                    last.push(' ');
                    last.push_str(chunk);
                }
                None => self.sections.push(chunk.to_string()),
            }
            return;
        }

        self.sections.extend(
            bodies
                .into_iter()
                .filter(|body| body.chars().count() >= MIN_SECTION_CHARS),
        );
    }

    /// Number of sections accumulated so far.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// True when no sections have been accumulated.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Finish assembly, attaching the document metadata to each section.
    pub fn finish(self, meta: &DocumentMeta) -> Vec<Section> {
        self.sections
            .into_iter()
            .map(|text| Section {
                text,
                meta: meta.clone(),
            })
            .collect()
    }
}
