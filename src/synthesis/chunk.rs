/// A bounded-length slice of the input text submitted to one engine call.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub text: String,
    pub is_last: bool,
}

impl TextChunk {
    pub fn whole(text: &str) -> Self {
        Self {
            text: text.trim().to_string(),
            is_last: true,
        }
    }
}

fn is_sentence_terminal(word: &str) -> bool {
    word.ends_with(['.', '!', '?'])
}

/// Split text into chunks of at most `max_words` words each.
///
/// Once a chunk has accumulated `soft_break_words` words it closes at the
/// next sentence-terminal word; at `max_words` it closes unconditionally.
/// The trailing partial accumulation is emitted as a final chunk. Words are
/// never dropped, duplicated or reordered, and the output depends on
/// nothing but the input and the thresholds.
pub fn split_text(text: &str, max_words: usize, soft_break_words: usize) -> Vec<TextChunk> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    let words: Vec<&str> = trimmed.split_whitespace().collect();
    if words.len() <= max_words {
        return vec![TextChunk::whole(trimmed)];
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for word in words {
        current.push(word);
        if current.len() >= soft_break_words && is_sentence_terminal(word) {
            chunks.push(current.join(" "));
            current.clear();
        } else if current.len() >= max_words {
            chunks.push(current.join(" "));
            current.clear();
        }
    }
    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    let last = chunks.len() - 1;
    chunks
        .into_iter()
        .enumerate()
        .map(|(index, text)| TextChunk {
            text,
            is_last: index == last,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words_of(chunks: &[TextChunk]) -> Vec<String> {
        chunks
            .iter()
            .flat_map(|c| c.text.split_whitespace().map(|w| w.to_string()))
            .collect()
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split_text("  Hello world.  ", 500, 450);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Hello world.");
        assert!(chunks[0].is_last);
    }

    #[test]
    fn test_exactly_max_words_single_chunk() {
        let text = vec!["word"; 500].join(" ");
        let chunks = split_text(&text, 500, 450);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_hard_cutoff_without_sentence_boundary() {
        // 501 one-character words with no terminal punctuation.
        let text = vec!["a"; 501].join(" ");
        let chunks = split_text(&text, 500, 450);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text.split_whitespace().count(), 500);
        assert_eq!(chunks[1].text.split_whitespace().count(), 1);
        assert!(!chunks[0].is_last);
        assert!(chunks[1].is_last);
    }

    #[test]
    fn test_soft_break_at_sentence_boundary() {
        // Sentence ends at word 460; the chunk should close there, not at 500.
        let mut words = vec!["word"; 600];
        words[459] = "done.";
        let text = words.join(" ");
        let chunks = split_text(&text, 500, 450);
        assert_eq!(chunks[0].text.split_whitespace().count(), 460);
        assert!(chunks[0].text.ends_with("done."));
    }

    #[test]
    fn test_sentence_boundary_before_soft_threshold_ignored() {
        // A period at word 100 is below the soft threshold and must not split.
        let mut words = vec!["word"; 501];
        words[99] = "early.";
        let text = words.join(" ");
        let chunks = split_text(&text, 500, 450);
        assert_eq!(chunks[0].text.split_whitespace().count(), 500);
    }

    #[test]
    fn test_no_words_dropped_or_reordered() {
        let words: Vec<String> = (0..1234).map(|i| format!("w{}", i)).collect();
        let text = words.join(" ");
        let chunks = split_text(&text, 500, 450);
        assert!(chunks.len() > 1);
        assert_eq!(words_of(&chunks), words);
        for chunk in &chunks {
            let count = chunk.text.split_whitespace().count();
            assert!(count > 0 && count <= 500);
        }
    }

    #[test]
    fn test_only_final_chunk_marked_last() {
        let text = vec!["a"; 1200].join(" ");
        let chunks = split_text(&text, 500, 450);
        let last_flags: Vec<bool> = chunks.iter().map(|c| c.is_last).collect();
        assert_eq!(last_flags, vec![false, false, true]);
    }

    #[test]
    fn test_deterministic() {
        let mut words = vec!["word"; 980];
        words[470] = "stop!";
        words[900] = "end?";
        let text = words.join(" ");
        assert_eq!(split_text(&text, 500, 450), split_text(&text, 500, 450));
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(split_text("   ", 500, 450).is_empty());
    }
}
