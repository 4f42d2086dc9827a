/// Escape a TEXT value: backslash, comma, semicolon and newlines
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => result.push_str("\\\\"),
            ',' => result.push_str("\\,"),
            ';' => result.push_str("\\;"),
            '\n' => result.push_str("\\n"),
            '\r' => {
                // CRLF and lone CR both become one escaped newline
                if chars.peek() != Some(&'\n') {
                    result.push_str("\\n");
                }
            }
            _ => result.push(c),
        }
    }
    result
}
