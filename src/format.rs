//! MarkdownV2 escaping and message chunking.
//!
//! Telegram caps messages at ~4096 characters; outputs are split into
//! 3500-character chunks so a header still fits on the first one.

/// Chunk size used for outgoing transcripts and notes.
pub const MAX_CHUNK_LEN: usize = 3500;

/// Characters Telegram MarkdownV2 requires escaping.
const MARKDOWN_SPECIAL: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Backslash-escape text for MarkdownV2. Backslashes are escaped too,
/// in the same single pass, so nothing gets escaped twice.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\\' || MARKDOWN_SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Split text into consecutive chunks of at most `max_len` characters.
/// The non-empty remainder becomes the final chunk; empty input yields
/// no chunks.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    assert!(max_len > 0, "max_len must be positive");

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut len = 0;
    for c in text.chars() {
        current.push(c);
        len += 1;
        if len == max_len {
            chunks.push(std::mem::take(&mut current));
            len = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Split text and prefix only the first chunk with `header`.
pub fn header_chunks(header: &str, text: &str, max_len: usize) -> Vec<String> {
    split_message(text, max_len)
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            if i == 0 {
                format!("{header}{chunk}")
            } else {
                chunk
            }
        })
        .collect()
}
