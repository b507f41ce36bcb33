//! Word-window chunking.
//!
//! A document is normalized to a whitespace-separated word sequence and cut
//! into consecutive, non-overlapping windows of [`CHUNK_SIZE`] words. The
//! windows reconstruct the full word sequence when concatenated in order;
//! the last one may be shorter. The leading [`TITLE_INFO_SIZE`] words form
//! the meta window used once per document for title/year extraction.

/// Approximate words per page of a regulatory document.
///
/// All window sizes derive from this constant. The values are part of the
/// corpus contract: changing them changes segmentation of every document
/// processed afterwards.
pub const PAGE_SIZE: usize = 240;

/// Words inspected for the document title and year (first two pages).
pub const TITLE_INFO_SIZE: usize = PAGE_SIZE * 2;

/// Words per boundary-analysis chunk (twenty pages).
pub const CHUNK_SIZE: usize = PAGE_SIZE * 20;

/// Normalize a document into its word sequence.
///
/// Newlines and runs of whitespace collapse into single separators; the
/// returned slices borrow from the input text.
pub fn words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// The leading window used for title/year extraction, joined with spaces.
pub fn meta_window(words: &[&str]) -> String {
    words[..words.len().min(TITLE_INFO_SIZE)].join(" ")
}

/// Lazy sequence of chunk texts covering the whole word sequence.
pub fn chunks<'a>(words: &'a [&'a str]) -> impl Iterator<Item = String> + 'a {
    words.chunks(CHUNK_SIZE).map(|window| window.join(" "))
}
