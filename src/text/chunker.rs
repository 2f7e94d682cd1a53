//! Utterance chunking.
//!
//! Script entries are split at sentence boundaries, then packed greedily
//! into chunks no longer than a character limit. Speech models degrade on
//! over-long inputs, and very short inputs waste a synthesis call per
//! fragment, so both directions matter.

/// Default maximum utterance length, in characters.
pub const DEFAULT_MAX_CHARS: usize = 120;

/// Split raw script sentences into ordered, model-sized utterance units.
///
/// Whitespace-only entries are dropped. Lengths are counted in `char`s, not
/// bytes, so CJK scripts pack the same way Latin text does.
///
/// # Arguments
/// * `sentences` - Raw script entries, in speaking order
/// * `max_chars` - Upper bound on the character length of one utterance
pub fn chunk_script<S: AsRef<str>>(sentences: &[S], max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for raw in sentences {
        for unit in split_sentences(raw.as_ref()) {
            let unit_len = unit.chars().count();
            let needed = if current.is_empty() { unit_len } else { unit_len + 1 };

            if !current.is_empty() && current_len + needed > max_chars {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }

            if unit_len > max_chars {
                chunks.extend(split_oversize(&unit, max_chars));
                continue;
            }

            if current.is_empty() {
                current_len = unit_len;
                current = unit;
            } else {
                current.push(' ');
                current.push_str(&unit);
                current_len += unit_len + 1;
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Split text into sentences at terminal punctuation or newlines.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        current.push(c);

        if matches!(c, '.' | '!' | '?' | '。' | '！' | '？' | '\n') {
            let trimmed = current.trim().to_string();
            if !trimmed.is_empty() {
                sentences.push(trimmed);
            }
            current.clear();
        }
    }

    let trimmed = current.trim().to_string();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }

    sentences
}

/// Break a single over-long sentence into pieces of at most `max_chars`,
/// preferring commas and whitespace over hard character cuts.
fn split_oversize(sentence: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = sentence.chars().collect();
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let remaining = chars.len() - start;
        if remaining <= max_chars {
            push_trimmed(&mut pieces, &chars[start..]);
            break;
        }

        let window = &chars[start..start + max_chars];
        let cut = window.iter().rposition(|&c| is_soft_boundary(c)).map(|i| i + 1).unwrap_or(max_chars);
        push_trimmed(&mut pieces, &chars[start..start + cut]);
        start += cut;
    }

    pieces
}

fn push_trimmed(pieces: &mut Vec<String>, chars: &[char]) {
    let piece: String = chars.iter().collect();
    let piece = piece.trim().to_string();
    if !piece.is_empty() {
        pieces.push(piece);
    }
}

fn is_soft_boundary(c: char) -> bool {
    matches!(c, ',' | '，' | '、' | ';' | '；' | ':' | '：') || c.is_whitespace()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_blank_entries() {
        let chunks = chunk_script(&["  ", "", "\n", "Real text."], 120);
        assert_eq!(chunks, vec!["Real text."]);
    }

    #[test]
    fn packs_short_sentences_together() {
        let chunks = chunk_script(&["One.", "Two.", "Three."], 120);
        assert_eq!(chunks, vec!["One. Two. Three."]);
    }

    #[test]
    fn respects_the_character_limit_when_packing() {
        let chunks = chunk_script(&["Aaaa.", "Bbbb.", "Cccc."], 11);
        assert_eq!(chunks, vec!["Aaaa. Bbbb.", "Cccc."]);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 11);
        }
    }

    #[test]
    fn preserves_input_order() {
        let chunks = chunk_script(&["First thing here.", "Second thing there.", "Third one now."], 20);
        assert_eq!(chunks, vec!["First thing here.", "Second thing there.", "Third one now."]);
    }

    #[test]
    fn splits_entries_containing_multiple_sentences() {
        let chunks = chunk_script(&["Hello there! How are you? Fine."], 12);
        assert_eq!(chunks, vec!["Hello there!", "How are you?", "Fine."]);
    }

    #[test]
    fn oversize_sentence_breaks_at_commas() {
        let long = "alpha beta gamma, delta epsilon zeta, eta theta iota";
        let chunks = chunk_script(&[long], 20);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 20, "chunk too long: {chunk:?}");
        }
        assert_eq!(chunks.concat().replace(' ', ""), long.replace(' ', ""));
    }

    #[test]
    fn oversize_run_without_boundaries_hard_splits() {
        let solid = "x".repeat(25);
        let chunks = chunk_script(&[solid.as_str()], 10);
        assert_eq!(chunks, vec!["x".repeat(10), "x".repeat(10), "x".repeat(5)]);
    }

    #[test]
    fn handles_cjk_punctuation_and_lengths() {
        let chunks = chunk_script(&["第一句话。第二句话！第三句话？"], 6);
        assert_eq!(chunks, vec!["第一句话。", "第二句话！", "第三句话？"]);
    }

    #[test]
    fn split_sentences_keeps_trailing_fragment() {
        assert_eq!(split_sentences("Done. And more"), vec!["Done.", "And more"]);
    }
}
