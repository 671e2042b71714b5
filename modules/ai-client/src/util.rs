/// Longest prefix of `text` that fits in `max_bytes` without splitting a character.
/// Used to keep logged oracle output bounded.
pub fn truncate_to_char_boundary(text: &str, max_bytes: usize) -> &str {
    let end = text
        .char_indices()
        .map(|(start, c)| start + c.len_utf8())
        .take_while(|&end| end <= max_bytes)
        .last()
        .unwrap_or(0);
    &text[..end]
}

/// Strip markdown code fences from a response.
///
/// Removes every ```` ```json ```` and ```` ``` ```` marker, not just the outer
/// pair, then trims surrounding whitespace. Models sometimes fence each item
/// separately or leave a stray fence mid-response.
pub fn strip_code_blocks(response: &str) -> String {
    response
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// The span from the first `{` to the last `}` inclusive, if any.
pub fn json_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
