/// Expand a byte span of `text` to the surrounding sentence, marking cut edges with an ellipsis.
pub fn sentence_context(text: &str, start: usize, end: usize) -> String {
    if start > end || end > text.len() || !text.is_char_boundary(start) || !text.is_char_boundary(end) {
        return leading_excerpt(text, 200);
    }
    let sent_start = text[..start].rfind('.').map(|i| i + 1).unwrap_or(0);
    let sent_end = text[end..].find('.').map(|i| end + i + 1).unwrap_or(text.len());

    let mut out = String::new();
    if sent_start > 0 {
        out.push_str("… ");
    }
    out.push_str(text[sent_start..sent_end].trim());
    if sent_end < text.len() {
        out.push_str(" …");
    }
    out
}

/// First `max_chars` characters, with an ellipsis when truncated.
pub fn leading_excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
