//! Word-granularity position tracking
//!
//! Converts between character offsets into a session's text and word-index
//! checkpoints, so playback can restart at (approximately) the same spoken
//! word after an utterance is cancelled. Pure functions over the text; no
//! state.

/// Clamp `offset` to the text length and floor it to a char boundary
fn floor_to_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Index of the last fully or partially spoken word at `char_offset`
///
/// Splits `text[..char_offset]` on runs of whitespace and returns
/// `token_count - 1`. Returns 0 for an offset at the start or empty text.
pub fn word_index_at(text: &str, char_offset: usize) -> usize {
    if text.is_empty() || char_offset == 0 {
        return 0;
    }
    let spoken = &text[..floor_to_char_boundary(text, char_offset)];
    spoken.split_whitespace().count().saturating_sub(1)
}

/// Character offset where the word at `word_index` starts, approximately
///
/// Sums `len(token) + 1` over the tokens before `word_index`, assuming
/// single-space separation. This deliberately does not reproduce the
/// original multi-space/newline spacing: resumed speech only needs to start
/// near the right word, not byte-exact. Returns 0 when `word_index` is out
/// of range or the text is empty.
pub fn char_offset_for_word_index(text: &str, word_index: usize) -> usize {
    let words: Vec<&str> = text.split_whitespace().collect();
    if word_index >= words.len() {
        return 0;
    }
    let offset = words[..word_index].iter().map(|w| w.len() + 1).sum();
    // Multi-byte separators can put the single-space estimate inside a
    // character; floor it so the result is always safe to slice at.
    floor_to_char_boundary(text, offset)
}
