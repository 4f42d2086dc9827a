/// Longest content line in octets, CRLF excluded
const MAX_LINE_OCTETS: usize = 75;

/// Terminate a content line with CRLF, folding it when longer than 75 octets
///
/// Continuation lines start with a single space and never split a UTF-8
/// sequence.
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return format!("{line}\r\n");
    }

    let mut result = String::with_capacity(line.len() + (line.len() / MAX_LINE_OCTETS + 1) * 3);
    let mut rest = line;
    let mut limit = MAX_LINE_OCTETS;

    while rest.len() > limit {
        let mut end = limit;
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        result.push_str(&rest[..end]);
        result.push_str("\r\n ");
        rest = &rest[end..];
        // The leading space counts towards the limit
        limit = MAX_LINE_OCTETS - 1;
    }
    result.push_str(rest);
    result.push_str("\r\n");

    result
}
