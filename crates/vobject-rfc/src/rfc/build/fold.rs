//! Content line folding (RFC 5545 §3.1, RFC 2425 §5.8.1).

/// Folds one content line so no physical line exceeds `width` octets.
///
/// Breaks are CRLF followed by a single space. A break never lands inside a
/// UTF-8 sequence or between a backslash and the character it escapes. The
/// returned text ends with CRLF.
#[must_use]
pub fn fold_line(line: &str, width: usize) -> String {
    let bytes = line.as_bytes();
    let width = width.max(2);

    if bytes.len() <= width {
        return format!("{line}\r\n");
    }

    let mut result = String::with_capacity(bytes.len() + (bytes.len() / width + 1) * 3);
    let mut pos = 0;
    let mut first_line = true;

    while pos < bytes.len() {
        // Continuation lines spend one octet on the leading space
        let max_len = if first_line { width } else { width - 1 };

        if !first_line {
            result.push(' ');
        }

        if bytes.len() - pos <= max_len {
            result.push_str(&line[pos..]);
            result.push_str("\r\n");
            break;
        }

        let end = safe_break(line, pos, pos + max_len);
        result.push_str(&line[pos..end]);
        result.push_str("\r\n");

        pos = end;
        first_line = false;
    }

    result
}

/// Finds the last acceptable break at or before `end`, always advancing
/// past `pos`.
fn safe_break(line: &str, pos: usize, end: usize) -> usize {
    let bytes = line.as_bytes();
    let mut end = end;

    while end > pos && !line.is_char_boundary(end) {
        end -= 1;
    }
    if end > pos + 1 && ends_in_open_escape(&bytes[..end]) {
        end -= 1;
    }

    if end == pos {
        // A single character wider than the budget goes out whole
        end = pos + 1;
        while end < bytes.len() && !line.is_char_boundary(end) {
            end += 1;
        }
    }
    end
}

fn ends_in_open_escape(prefix: &[u8]) -> bool {
    let run = prefix.iter().rev().take_while(|b| **b == b'\\').count();
    run % 2 == 1
}

/// Joins physical lines that were folded with a leading SPACE or HTAB.
///
/// Accepts CRLF and bare LF line endings. The result uses LF between
/// logical lines.
#[must_use]
pub fn unfold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (idx, raw) in text.split('\n').enumerate() {
        let physical = raw.strip_suffix('\r').unwrap_or(raw);
        match physical.as_bytes().first() {
            Some(b' ' | b'\t') if idx > 0 => out.push_str(&physical[1..]),
            _ => {
                if idx > 0 {
                    out.push('\n');
                }
                out.push_str(physical);
            }
        }
    }
    out
}
