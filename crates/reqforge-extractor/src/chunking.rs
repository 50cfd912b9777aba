//! Line-preserving text chunking for large documents

/// Splits text into bounded-size runs of whole lines.
///
/// Lines are accumulated until appending the next one (plus its `\n`
/// separator) would exceed the budget. A line longer than the budget is
/// emitted as its own oversized chunk; lines are never split.
///
/// Joining the chunks with `\n` reconstructs the input exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    max_chunk_size: usize,
}

impl TextChunker {
    /// Create a new text chunker with a byte budget per chunk
    pub fn new(max_chunk_size: usize) -> Self {
        Self { max_chunk_size }
    }

    /// Configured budget
    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Chunk the given text
    pub fn chunk(&self, text: &str) -> Vec<String> {
        chunk_text(text, self.max_chunk_size)
    }
}

/// Split `text` into line-aligned chunks of at most `max_size` bytes.
///
/// Separators count toward the budget:
///
/// ```
/// use reqforge_extractor::chunk_text;
///
/// assert_eq!(chunk_text("a\nb\nc", 3), vec!["a\nb", "c"]);
/// assert!(chunk_text("", 10).is_empty());
/// ```
pub fn chunk_text(text: &str, max_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    if text.is_empty() {
        return chunks;
    }

    let mut buffer = String::new();
    let mut started = false;

    for line in text.split('\n') {
        if started && buffer.len() + 1 + line.len() > max_size {
            chunks.push(std::mem::take(&mut buffer));
            buffer.push_str(line);
        } else {
            if started {
                buffer.push('\n');
            }
            buffer.push_str(line);
            started = true;
        }
    }

    // A started buffer may hold an empty line and is still a chunk
    if started {
        chunks.push(buffer);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_separators_count_toward_budget() {
        let chunker = TextChunker::new(3);
        assert_eq!(chunker.chunk("a\nb\nc"), vec!["a\nb".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunker = TextChunker::new(100);
        assert!(chunker.chunk("").is_empty());
    }

    #[test]
    fn test_small_text_is_single_chunk() {
        let chunker = TextChunker::new(100);
        let text = "Short text here.\nSecond line.";
        assert_eq!(chunker.chunk(text), vec![text.to_string()]);
    }

    #[test]
    fn test_oversized_line_is_its_own_chunk() {
        let long_line = "x".repeat(50);
        let text = format!("ab\n{}\ncd", long_line);
        let chunks = chunk_text(&text, 10);

        assert_eq!(chunks, vec!["ab".to_string(), long_line, "cd".to_string()]);
    }

    #[test]
    fn test_oversized_first_line() {
        let chunks = chunk_text("abcdefgh\nij", 4);
        assert_eq!(chunks, vec!["abcdefgh", "ij"]);
    }

    #[test]
    fn test_trailing_newline_is_preserved() {
        let text = "line one\nline two\n";
        let chunks = chunk_text(text, 9);
        assert_eq!(chunks, vec!["line one", "line two\n"]);
    }

    #[test]
    fn test_blank_lines_reconstruct() {
        let text = "\n\n\n";
        let chunks = chunk_text(text, 1);
        assert_eq!(chunks.join("\n"), text);
    }

    #[test]
    fn test_multibyte_lines_count_bytes() {
        // "é" is two bytes
        let chunks = chunk_text("éé\néé", 5);
        assert_eq!(chunks, vec!["éé", "éé"]);
    }

    proptest! {
        #[test]
        fn prop_chunks_reconstruct_input(text in "[a-c \n]{0,200}", budget in 1usize..40) {
            let chunks = chunk_text(&text, budget);
            prop_assert_eq!(chunks.join("\n"), text);
        }

        #[test]
        fn prop_oversized_chunks_are_single_lines(text in "[a-z\n]{0,200}", budget in 1usize..20) {
            for chunk in chunk_text(&text, budget) {
                if chunk.len() > budget {
                    prop_assert!(!chunk.contains('\n'));
                }
            }
        }

        #[test]
        fn prop_chunks_are_maximal(text in "[a-z\n]{0,200}", budget in 1usize..20) {
            let chunks = chunk_text(&text, budget);
            for pair in chunks.windows(2) {
                let next_first_line = pair[1].split('\n').next().unwrap_or_default();
                prop_assert!(pair[0].len() + 1 + next_first_line.len() > budget);
            }
        }
    }
}
