use std::collections::HashSet;

use ammonia::Builder;

/// Replaces CR/LF with spaces so a value can never start a new mail header.
pub fn strip_line_breaks(value: &str) -> String {
    value
        .replace("\r\n", " ")
        .replace(['\r', '\n'], " ")
        .trim()
        .to_string()
}

/// Drops control characters, keeping newlines and tabs. CRLF becomes LF.
pub fn strip_control_chars(value: &str) -> String {
    value
        .replace("\r\n", "\n")
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Removes every tag and attribute, keeping text content. The result is
/// HTML-escaped and safe to embed in an HTML body.
pub fn sanitize_html(content: &str) -> String {
    Builder::empty()
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(&strip_control_chars(content))
        .to_string()
}

/// Sanitized message ready for an HTML mail body, line breaks preserved.
pub fn sanitize_message_html(content: &str) -> String {
    sanitize_html(content).replace('\n', "<br>\n")
}

/// Plain text of a message once markup has been removed.
pub fn strip_html(content: &str) -> String {
    html_escape::decode_html_entities(&sanitize_html(content)).into_owned()
}
