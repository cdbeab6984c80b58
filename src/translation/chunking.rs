/*!
 * Word-bounded text chunking.
 *
 * Translation engines cap the size of a single request. Paragraph text is cut
 * into chunks at whitespace so no word is ever split across two requests.
 */

/// Split `text` into chunks of at most `max_chars` characters
///
/// Words are accumulated greedily; a word joins the current chunk only while
/// the chunk plus a separating space plus the word still fits. A single word
/// longer than `max_chars` becomes its own oversized chunk. Lengths are
/// counted in characters, not bytes.
///
/// Blank input yields no chunks.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + word_len + 1 <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += word_len + 1;
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
