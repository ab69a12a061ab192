//! Title sanitization for library filenames.

/// Sanitizes an episode title for use inside a library filename.
///
/// - `:` becomes ` -`
/// - `/` and `\` become `_`
/// - `? * " < > |`, NUL and control characters are dropped
/// - `&` becomes the word `and`
/// - Runs of whitespace collapse to one space; leading/trailing spaces and
///   dots are trimmed
///
/// Parentheses are kept: the filename regex anchors on the last
/// parenthesized group, which is always the remote number.
pub fn sanitize_title(title: &str) -> String {
    let mut raw = String::with_capacity(title.len() + 8);
    for c in title.chars() {
        match c {
            ':' => raw.push_str(" -"),
            '/' | '\\' => raw.push('_'),
            '?' | '*' | '"' | '<' | '>' | '|' => {}
            '&' => raw.push_str(" and "),
            c if c.is_whitespace() => raw.push(' '),
            c if c == '\0' || c.is_control() => {}
            c => raw.push(c),
        }
    }

    let mut out = String::with_capacity(raw.len());
    let mut prev_space = false;
    for c in raw.chars() {
        if c.is_whitespace() {
            if !prev_space {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(c);
            prev_space = false;
        }
    }

    out.trim_matches(|c| c == ' ' || c == '.').to_string()
}
