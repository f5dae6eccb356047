use std::collections::HashSet;

/// Strips every HTML tag from a participant-supplied value and returns plain
/// text.
///
/// Participant answers are plain text; they end up in result files and may be
/// shown back in forms, so no markup is kept at all. Text content between
/// harmless tags survives, `<script>` bodies do not. Characters such as `&`
/// and `<` that are not markup come back unchanged.
pub fn strip_html(input: &str) -> String {
    let cleaned = ammonia::Builder::empty()
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(input)
        .to_string();
    unescape_text(&cleaned)
}

/// Reverses the escaping ammonia's serializer applies to text nodes.
/// `&amp;` goes last so an escaped entity is not decoded twice.
fn unescape_text(escaped: &str) -> String {
    escaped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}
