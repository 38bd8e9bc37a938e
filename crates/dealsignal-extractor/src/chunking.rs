//! Text chunking strategies for ingested documents
//!
//! Sizes are counted in characters, and every split lands on a UTF-8
//! character boundary.

use crate::config::ChunkStrategy;

/// Chunks text according to the specified strategy
#[derive(Debug, Clone)]
pub struct TextChunker {
    strategy: ChunkStrategy,
    max_chunk_size: usize,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl TextChunker {
    /// Create a new text chunker
    pub fn new(strategy: ChunkStrategy, max_chunk_size: usize) -> Self {
        Self {
            strategy,
            max_chunk_size: max_chunk_size.max(1),
        }
    }

    /// Chunk the given text; blank text yields no chunks
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        if char_len(text) <= self.max_chunk_size {
            return vec![text.to_string()];
        }

        match self.strategy {
            ChunkStrategy::ByParagraph => self.chunk_by_paragraph(text),
            ChunkStrategy::BySection => self.chunk_by_section(text),
            ChunkStrategy::ByCharCount => self.chunk_by_char_count(text),
        }
    }

    fn chunk_by_paragraph(&self, text: &str) -> Vec<String> {
        let paragraphs: Vec<&str> = text
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        self.combine_until_limit(paragraphs)
    }

    fn chunk_by_section(&self, text: &str) -> Vec<String> {
        let mut sections = Vec::new();
        let mut current_section = String::new();

        for line in text.lines() {
            let trimmed = line.trim_start();
            // Markdown headers (# Header) or numbered sections (1. Section)
            let is_section_header = trimmed.starts_with('#') || is_numbered_heading(trimmed);

            if is_section_header && !current_section.trim().is_empty() {
                sections.push(current_section.trim().to_string());
                current_section.clear();
            }

            current_section.push_str(line);
            current_section.push('\n');
        }

        if !current_section.trim().is_empty() {
            sections.push(current_section.trim().to_string());
        }

        if sections.len() <= 1 {
            self.chunk_by_paragraph(text)
        } else {
            self.combine_until_limit(sections)
        }
    }

    fn chunk_by_char_count(&self, text: &str) -> Vec<String> {
        let sentences = split_sentences(text);

        let mut chunks = Vec::new();
        let mut current_chunk = String::new();

        for sentence in sentences {
            let needed = char_len(&current_chunk) + char_len(sentence) + 1;
            if needed > self.max_chunk_size {
                if !current_chunk.is_empty() {
                    chunks.push(current_chunk.trim().to_string());
                    current_chunk.clear();
                }

                if char_len(sentence) > self.max_chunk_size {
                    chunks.extend(split_at_char_limit(sentence, self.max_chunk_size));
                    continue;
                }
            }
            if !current_chunk.is_empty() {
                current_chunk.push(' ');
            }
            current_chunk.push_str(sentence);
        }

        if !current_chunk.trim().is_empty() {
            chunks.push(current_chunk.trim().to_string());
        }

        chunks
    }

    /// Combine elements until they reach the size limit
    fn combine_until_limit<S: AsRef<str>>(&self, elements: Vec<S>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current_chunk = String::new();

        for element in elements {
            let element_str = element.as_ref();

            if char_len(&current_chunk) + char_len(element_str) + 2 > self.max_chunk_size {
                if !current_chunk.is_empty() {
                    chunks.push(current_chunk.trim().to_string());
                    current_chunk.clear();
                }

                if char_len(element_str) > self.max_chunk_size {
                    chunks.extend(split_at_char_limit(element_str, self.max_chunk_size));
                    continue;
                }
            }
            current_chunk.push_str(element_str);
            current_chunk.push_str("\n\n");
        }

        if !current_chunk.trim().is_empty() {
            chunks.push(current_chunk.trim().to_string());
        }

        chunks
    }
}

fn is_numbered_heading(line: &str) -> bool {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && line[digits..].starts_with(". ")
}

/// Split after `.`, `!` or `?` followed by whitespace, keeping the punctuation
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if let Some(&(next_i, next_c)) = chars.peek() {
            if next_c.is_whitespace() {
                let sentence = text[start..next_i].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = next_i;
            }
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Split text into pieces of at most `limit` characters
fn split_at_char_limit(text: &str, limit: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(limit.max(1))
        .map(|piece| piece.iter().collect::<String>())
        .filter(|piece| !piece.trim().is_empty())
        .map(|piece| piece.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_chunking_needed_for_small_text() {
        let chunker = TextChunker::new(ChunkStrategy::ByParagraph, 100);
        let text = "Short text here.";
        let chunks = chunker.chunk(text);
        assert_eq!(chunks, vec![text.to_string()]);
    }

    #[test]
    fn test_chunk_by_paragraph() {
        let chunker = TextChunker::new(ChunkStrategy::ByParagraph, 50);
        let text = "First paragraph here.\n\nSecond paragraph here.\n\nThird paragraph here.";
        let chunks = chunker.chunk(text);

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].starts_with("First"));
        for chunk in &chunks {
            assert!(char_len(chunk) <= 50);
        }
    }

    #[test]
    fn test_chunk_by_section_with_markdown() {
        let chunker = TextChunker::new(ChunkStrategy::BySection, 30);
        let text = "# Section 1\nContent one here\n# Section 2\nContent two here";
        let chunks = chunker.chunk(text);

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].contains("Section 1"));
        assert!(chunks[1].contains("Section 2"));
    }

    #[test]
    fn test_chunk_by_section_with_numbered() {
        let chunker = TextChunker::new(ChunkStrategy::BySection, 30);
        let text = "1. First section\nSome content\n2. Second section\nMore content";
        let chunks = chunker.chunk(text);

        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].starts_with("2. Second"));
    }

    #[test]
    fn test_decimal_is_not_a_numbered_heading() {
        assert!(!is_numbered_heading("3.5% CAGR expected"));
        assert!(is_numbered_heading("12. Risks"));
    }

    #[test]
    fn test_chunk_by_char_count() {
        let chunker = TextChunker::new(ChunkStrategy::ByCharCount, 45);
        let text = "First sentence here. Second sentence here. Third sentence here.";
        let chunks = chunker.chunk(text);

        assert_eq!(
            chunks,
            vec![
                "First sentence here. Second sentence here.".to_string(),
                "Third sentence here.".to_string(),
            ]
        );
    }

    #[test]
    fn test_sentence_split_keeps_decimals() {
        let sentences = split_sentences("Growth hit 23.5% in 2024. Next year too.");
        assert_eq!(sentences, vec!["Growth hit 23.5% in 2024.", "Next year too."]);
    }

    #[test]
    fn test_empty_text() {
        let chunker = TextChunker::new(ChunkStrategy::ByParagraph, 100);
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("  \n\n ").is_empty());
    }

    #[test]
    fn test_very_long_single_paragraph() {
        let chunker = TextChunker::new(ChunkStrategy::ByParagraph, 20);
        let text = "a".repeat(100);
        let chunks = chunker.chunk(&text);

        assert_eq!(chunks.len(), 5);
        assert!(chunks.iter().all(|c| char_len(c) == 20));
    }

    #[test]
    fn test_multibyte_text_splits_on_char_boundaries() {
        let chunker = TextChunker::new(ChunkStrategy::ByParagraph, 7);
        let text = "€".repeat(20);
        let chunks = chunker.chunk(&text);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_section_fallback_to_paragraph() {
        let chunker = TextChunker::new(ChunkStrategy::BySection, 20);
        let text = "Just text\n\nWith paragraphs\n\nBut no sections";
        let chunks = chunker.chunk(text);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2], "But no sections");
    }
}
