//! Filesystem-safe token normalization.

/// Characters rejected by at least one mainstream filesystem.
const FORBIDDEN: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Normalizes arbitrary text into a filesystem-safe token.
///
/// - Replaces `\ / : * ? " < > |` with `_`
/// - Turns any whitespace run into a single `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing `_`
///
/// Total and idempotent: `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_underscore = false;

    for c in text.chars() {
        let mapped = if FORBIDDEN.contains(&c) || c.is_whitespace() {
            '_'
        } else {
            c
        };

        if mapped == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(mapped);
            prev_underscore = false;
        }
    }

    out.trim_matches('_').to_string()
}
