//! Text chunking for ingestion.
//!
//! Splits a source document into overlapping fixed-size windows so that
//! semantic context spanning a window boundary is never lost to retrieval.
//! Window lengths are measured in grapheme clusters, not bytes, so
//! multi-byte text never splits mid-character.

use unicode_segmentation::UnicodeSegmentation;

/// Default chunk window length in grapheme clusters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap between consecutive chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Sliding-window text chunker.
///
/// Invariant: the effective step is `chunk_size - overlap`, clamped to at
/// least 1 so an overlap ≥ window length can never stall the window.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

impl TextChunker {
    /// Creates a chunker with the given window length and overlap.
    ///
    /// A `chunk_size` of zero is treated as 1.
    #[must_use]
    pub const fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = if chunk_size == 0 { 1 } else { chunk_size };
        Self {
            chunk_size,
            overlap,
        }
    }

    /// The configured window length.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The configured overlap.
    #[must_use]
    pub const fn overlap(&self) -> usize {
        self.overlap
    }

    /// Splits `text` into overlapping windows.
    ///
    /// Returns an empty vec for empty input. The final window may be
    /// shorter than `chunk_size`; every grapheme of the input appears in
    /// at least one window.
    #[must_use]
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let graphemes: Vec<&str> = text.graphemes(true).collect();
        if graphemes.is_empty() {
            return Vec::new();
        }

        let step = self.chunk_size.saturating_sub(self.overlap).max(1);
        let mut chunks = Vec::with_capacity(graphemes.len().div_ceil(step));
        let mut start = 0;

        while start < graphemes.len() {
            let end = (start + self.chunk_size).min(graphemes.len());
            chunks.push(graphemes[start..end].concat());
            if end == graphemes.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_input() {
        let chunker = TextChunker::new(10, 2);
        assert!(chunker.chunk("").is_empty());
    }

    #[test]
    fn test_short_input_single_chunk() {
        let chunker = TextChunker::new(100, 20);
        let chunks = chunker.chunk("hello world");
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn test_windows_overlap() {
        let chunker = TextChunker::new(10, 4);
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = chunker.chunk(text);

        assert_eq!(chunks[0], "abcdefghij");
        // Next window starts at step = 10 - 4 = 6.
        assert_eq!(chunks[1], "ghijklmnop");
        // Each consecutive pair shares the 4-grapheme overlap.
        for pair in chunks.windows(2) {
            let tail: String = pair[0].graphemes(true).rev().take(4).collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            assert!(pair[1].starts_with(&tail));
        }
    }

    #[test]
    fn test_final_partial_window_kept() {
        let chunker = TextChunker::new(10, 0);
        let chunks = chunker.chunk("abcdefghijklm");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1], "klm");
    }

    #[test]
    fn test_overlap_larger_than_window_still_advances() {
        let chunker = TextChunker::new(3, 5);
        let chunks = chunker.chunk("abcdef");
        // Step clamps to 1; the window still advances and terminates.
        assert_eq!(chunks.first().map(String::as_str), Some("abc"));
        assert!(chunks.len() >= 4);
    }

    #[test]
    fn test_multibyte_graphemes_not_split() {
        let chunker = TextChunker::new(2, 1);
        let chunks = chunker.chunk("héllo");
        for c in &chunks {
            // Every chunk must be valid UTF-8 of whole graphemes by
            // construction; verify the accented char survives intact.
            assert!(c.is_char_boundary(c.len()));
        }
        assert_eq!(chunks[0], "hé");
    }

    proptest! {
        #[test]
        fn prop_chunks_cover_input(text in "\\PC{0,400}", size in 1usize..50, overlap in 0usize..20) {
            let chunker = TextChunker::new(size, overlap);
            let chunks = chunker.chunk(&text);
            let rejoined_len: usize = chunks
                .iter()
                .map(|c| c.graphemes(true).count())
                .sum();
            let input_len = text.graphemes(true).count();
            // With overlap, total output length is at least the input length.
            prop_assert!(rejoined_len >= input_len);
            // And the concatenation of first-chunk-at-each-step covers the text.
            if input_len > 0 {
                prop_assert!(!chunks.is_empty());
                let last = chunks.last().map(String::as_str).unwrap_or_default();
                prop_assert!(text.ends_with(last));
            }
        }

        #[test]
        fn prop_no_chunk_exceeds_window(text in "\\PC{0,400}", size in 1usize..50, overlap in 0usize..20) {
            let chunker = TextChunker::new(size, overlap);
            for chunk in chunker.chunk(&text) {
                prop_assert!(chunk.graphemes(true).count() <= size);
            }
        }
    }
}
