//! Text and parameter escaping (RFC 5545 §3.3.11, RFC 6868).

/// Escapes a TEXT value: backslash, comma, semicolon and newlines.
#[must_use]
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
                if chars.peek() != Some(&'\n') {
                    result.push_str("\\n");
                }
            }
            _ => result.push(c),
        }
    }
    result
}

/// Reverses [`escape_text`].
///
/// Unknown escapes keep their backslash so no input is lost.
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => result.push('\n'),
            Some(escaped @ ('\\' | ',' | ';' | ':' | '"')) => result.push(escaped),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

/// Splits `s` on an unescaped `sep`, leaving escapes in place.
#[must_use]
pub fn split_unescaped(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (idx, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == sep {
            parts.push(&s[start..idx]);
            start = idx + c.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Escapes a parameter value, quoting it when it contains a separator.
#[must_use]
pub fn escape_param_value(s: &str) -> String {
    if needs_quoting(s) {
        let mut result = String::with_capacity(s.len() + 4);
        result.push('"');
        for c in s.chars() {
            match c {
                '^' => result.push_str("^^"),
                '\n' => result.push_str("^n"),
                '"' => result.push_str("^'"),
                _ => result.push(c),
            }
        }
        result.push('"');
        result
    } else {
        s.to_string()
    }
}

/// Decodes RFC 6868 caret escapes inside a quoted parameter value.
#[must_use]
pub fn unescape_param_value(s: &str) -> String {
    if !s.contains('^') {
        return s.to_string();
    }
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '^' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some('^') => {
                result.push('^');
                chars.next();
            }
            Some('n') => {
                result.push('\n');
                chars.next();
            }
            Some('\'') => {
                result.push('"');
                chars.next();
            }
            _ => result.push('^'),
        }
    }
    result
}

fn needs_quoting(s: &str) -> bool {
    s.chars().any(|c| matches!(c, ':' | ';' | ',' | '"' | '\n'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_text_specials() {
        assert_eq!(escape_text("hello, world"), "hello\\, world");
        assert_eq!(escape_text("line1\r\nline2"), "line1\\nline2");
        assert_eq!(escape_text("back\\slash;"), "back\\\\slash\\;");
    }

    #[test]
    fn unescape_reverses_escape() {
        let text = "Meeting; room 2, \\floor\\\nbring notes";
        assert_eq!(unescape_text(&escape_text(text)), text);
    }

    #[test]
    fn unescape_keeps_unknown_escape() {
        assert_eq!(unescape_text("a\\tb\\N"), "a\\tb\n");
    }

    #[test]
    fn split_respects_escapes() {
        assert_eq!(
            split_unescaped("Random category,Other\\, category", ','),
            vec!["Random category", "Other\\, category"]
        );
        assert_eq!(split_unescaped(";;Street;", ';'), vec!["", "", "Street", ""]);
    }

    #[test]
    fn param_value_quoting() {
        assert_eq!(escape_param_value("Simple"), "Simple");
        assert_eq!(escape_param_value("http://www.wiz.org;;"), "\"http://www.wiz.org;;\"");
        assert_eq!(escape_param_value("Line1\nLine2"), "\"Line1^nLine2\"");
    }

    #[test]
    fn caret_decoding() {
        assert_eq!(unescape_param_value("Line1^nLine2 ^'q^' ^^ ^x"), "Line1\nLine2 \"q\" ^ ^x");
    }
}
