//! Logical-line unfolding and content-line tokenizing (RFC 5545 §3.1,
//! RFC 2425 §5.8).

use std::iter::Peekable;
use std::str::{CharIndices, Split};

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::options::CompatFlags;
use crate::rfc::build::unescape_param_value;
use crate::rfc::core::Parameter;

/// One unfolded line together with the physical line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based physical line number of the first fragment.
    pub number: usize,
    /// Unfolded text without the line terminator.
    pub text: String,
}

/// Lazy iterator over the logical lines of a document.
///
/// Continuation lines start with one SPACE or HTAB, which is removed. While
/// a line declares quoted-printable, a trailing `=` is a soft break instead
/// and the next physical line is appended verbatim.
pub struct LogicalLines<'a> {
    physical: Peekable<std::iter::Enumerate<Split<'a, char>>>,
}

impl<'a> LogicalLines<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            physical: input.split('\n').enumerate().peekable(),
        }
    }
}

impl Iterator for LogicalLines<'_> {
    type Item = LogicalLine;

    fn next(&mut self) -> Option<Self::Item> {
        let (number, mut text) = loop {
            let (idx, raw) = self.physical.next()?;
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if !line.trim().is_empty() {
                break (idx + 1, line.to_string());
            }
        };

        loop {
            if declares_quoted_printable(&text) && text.ends_with('=') {
                let Some((_, raw)) = self.physical.next() else {
                    break;
                };
                text.pop();
                text.push_str(raw.strip_suffix('\r').unwrap_or(raw));
                continue;
            }

            let continues = self
                .physical
                .peek()
                .is_some_and(|(_, raw)| raw.starts_with([' ', '\t']));
            if !continues {
                break;
            }
            if let Some((_, raw)) = self.physical.next() {
                let raw = raw.strip_suffix('\r').unwrap_or(raw);
                text.push_str(&raw[1..]);
            }
        }

        tracing::trace!(line = number, "Unfolded logical line");
        Some(LogicalLine { number, text })
    }
}

/// Whether the parameter section of `line` asks for quoted-printable, either
/// as `ENCODING=QUOTED-PRINTABLE` or as the bare vCard 2.1 parameter.
fn declares_quoted_printable(line: &str) -> bool {
    raw_params(line).into_iter().any(|param| match param.split_once('=') {
        Some((name, values)) => {
            name.eq_ignore_ascii_case("ENCODING")
                && values
                    .split(',')
                    .any(|v| v.trim_matches('"').eq_ignore_ascii_case("QUOTED-PRINTABLE"))
        }
        None => param.eq_ignore_ascii_case("QUOTED-PRINTABLE"),
    })
}

/// Raw `;`-separated parameters before the first colon outside quotes.
fn raw_params(line: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut start = None;
    let mut quoted = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ';' | ':' if !quoted => {
                if let Some(s) = start {
                    params.push(&line[s..i]);
                }
                if c == ':' {
                    return params;
                }
                start = Some(i + 1);
            }
            _ => {}
        }
    }
    params
}

/// The four parts of a content line, before any behavior is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTokens {
    /// Group label, case preserved.
    pub group: Option<String>,
    /// Uppercased name.
    pub name: String,
    /// Parameters in source order, names exactly as written.
    pub params: Vec<Parameter>,
    /// Raw value after the first unquoted colon.
    pub value: String,
}

type Chars<'a> = Peekable<CharIndices<'a>>;

/// Splits one logical line into group, name, parameters and value.
///
/// Format: `[group "."] name *(";" param) ":" value`
///
/// ## Errors
/// Returns an error if the name is empty or malformed, a parameter is
/// malformed, a quote is not closed, or the line has no colon.
pub fn parse_line(line: &str, line_num: usize, compat: CompatFlags) -> ParseResult<LineTokens> {
    let mut chars = line.char_indices().peekable();
    let mut group = None;
    let mut name_start = 0;
    let mut name_end = None;
    let mut at_colon = false;

    while let Some(&(i, c)) = chars.peek() {
        match c {
            ';' | ':' => {
                name_end = Some(i);
                at_colon = c == ':';
                chars.next();
                break;
            }
            '.' if group.is_none() && i > 0 => {
                group = Some(line[..i].to_string());
                name_start = i + 1;
            }
            _ if is_name_char(c, compat) => {}
            _ => {
                return Err(ParseError::new(
                    ParseErrorKind::InvalidPropertyName,
                    line_num,
                    i + 1,
                ));
            }
        }
        chars.next();
    }

    let Some(name_end) = name_end else {
        return Err(ParseError::new(ParseErrorKind::MissingColon, line_num, line.len() + 1));
    };
    if name_end == name_start {
        return Err(ParseError::new(
            ParseErrorKind::MissingPropertyName,
            line_num,
            name_start + 1,
        ));
    }

    let name = normalize_name(&line[name_start..name_end], compat);
    let group = group.map(|g| normalize_group(g, compat));

    let mut params = Vec::new();
    let mut value_start = name_end + 1;
    while !at_colon {
        let (param, next_is_colon) = parse_parameter(&mut chars, line, line_num, compat)?;
        params.push(param);
        if next_is_colon {
            value_start = chars.peek().map_or(line.len(), |&(i, _)| i);
            at_colon = true;
        }
    }

    Ok(LineTokens {
        group,
        name,
        params,
        value: line[value_start..].to_string(),
    })
}

fn is_name_char(c: char, compat: CompatFlags) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || (compat.underscore_names && c == '_')
}

fn normalize_name(raw: &str, compat: CompatFlags) -> String {
    let upper = raw.to_ascii_uppercase();
    if compat.underscore_names {
        upper.replace('_', "-")
    } else {
        upper
    }
}

fn normalize_group(raw: String, compat: CompatFlags) -> String {
    if compat.underscore_names {
        raw.replace('_', "-")
    } else {
        raw
    }
}

/// Parses one parameter; returns it and whether the value section follows.
fn parse_parameter(
    chars: &mut Chars<'_>,
    line: &str,
    line_num: usize,
    compat: CompatFlags,
) -> ParseResult<(Parameter, bool)> {
    let start = chars.peek().map_or(line.len(), |&(i, _)| i);

    let mut name_end = None;
    let mut has_values = false;
    while let Some(&(i, c)) = chars.peek() {
        match c {
            '=' => {
                name_end = Some(i);
                has_values = true;
                chars.next();
                break;
            }
            ';' | ':' => {
                name_end = Some(i);
                break;
            }
            _ if is_name_char(c, compat) => {
                chars.next();
            }
            _ => {
                return Err(ParseError::new(ParseErrorKind::InvalidParameter, line_num, i + 1)
                    .with_context(format!("unexpected character '{c}' in parameter name")));
            }
        }
    }

    let Some(name_end) = name_end else {
        return Err(ParseError::new(ParseErrorKind::MissingColon, line_num, line.len() + 1));
    };
    if name_end == start {
        return Err(ParseError::new(ParseErrorKind::InvalidParameter, line_num, start + 1)
            .with_context("empty parameter name"));
    }
    let name = if compat.underscore_names {
        line[start..name_end].replace('_', "-")
    } else {
        line[start..name_end].to_string()
    };

    if !has_values {
        // Value-less parameter such as `;PREF`
        let next_is_colon = matches!(chars.next(), Some((_, ':')));
        return Ok((Parameter { name, values: Vec::new() }, next_is_colon));
    }

    let keep_commas = compat.tzid_commas && name.eq_ignore_ascii_case("TZID");
    let mut values = Vec::new();
    loop {
        values.push(parse_param_value(chars, line, line_num, keep_commas)?);

        match chars.next() {
            Some((_, ',')) => {}
            Some((_, ';')) => return Ok((Parameter { name, values }, false)),
            Some((_, ':')) => return Ok((Parameter { name, values }, true)),
            Some((i, c)) => {
                return Err(ParseError::new(ParseErrorKind::InvalidParameter, line_num, i + 1)
                    .with_context(format!("unexpected character '{c}'")));
            }
            None => {
                return Err(ParseError::new(
                    ParseErrorKind::MissingColon,
                    line_num,
                    line.len() + 1,
                ));
            }
        }
    }
}

/// Parses a parameter value, quoted or bare.
fn parse_param_value(
    chars: &mut Chars<'_>,
    line: &str,
    line_num: usize,
    keep_commas: bool,
) -> ParseResult<String> {
    let Some(&(start, first)) = chars.peek() else {
        return Err(ParseError::new(ParseErrorKind::MissingColon, line_num, line.len() + 1));
    };

    if first == '"' {
        chars.next();
        for (i, c) in chars.by_ref() {
            if c == '"' {
                return Ok(unescape_param_value(&line[start + 1..i]));
            }
        }
        return Err(ParseError::new(ParseErrorKind::UnclosedQuote, line_num, start + 1));
    }

    let mut end = start;
    while let Some(&(i, c)) = chars.peek() {
        if c == ';' || c == ':' || (c == ',' && !keep_commas) {
            break;
        }
        end = i + c.len_utf8();
        chars.next();
    }
    Ok(line[start..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> ParseResult<LineTokens> {
        parse_line(line, 1, CompatFlags::default())
    }

    fn pairs(tokens: &LineTokens) -> Vec<(String, Vec<String>)> {
        tokens
            .params
            .iter()
            .map(|p| (p.name.clone(), p.values.clone()))
            .collect()
    }

    #[test]
    fn empty_value() {
        let tokens = parse("BLAH:").unwrap();
        assert_eq!(tokens.name, "BLAH");
        assert!(tokens.params.is_empty());
        assert_eq!(tokens.value, "");
        assert!(tokens.group.is_none());
    }

    #[test]
    fn group_and_repeated_params() {
        let tokens = parse("item1.ADR;type=HOME;type=pref:;;Reeperbahn 116;Hamburg;;20359;").unwrap();
        assert_eq!(tokens.group.as_deref(), Some("item1"));
        assert_eq!(tokens.name, "ADR");
        assert_eq!(
            pairs(&tokens),
            vec![
                ("type".to_string(), vec!["HOME".to_string()]),
                ("type".to_string(), vec!["pref".to_string()]),
            ]
        );
        assert_eq!(tokens.value, ";;Reeperbahn 116;Hamburg;;20359;");
    }

    #[test]
    fn bare_colon_is_error() {
        let err = parse(":").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingPropertyName);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn missing_colon_is_error() {
        let err = parse_line("NOCOLONHERE", 7, CompatFlags::default()).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingColon);
        assert_eq!(err.line, 7);
    }

    #[test]
    fn quoted_values_keep_separators() {
        let tokens =
            parse("ATTENDEE;ALTREP=\"http://www.wiz.org;;\",Blah,Foo;NEXT=Nope;BAR:mailto:x@y.z")
                .unwrap();
        assert_eq!(
            pairs(&tokens),
            vec![
                (
                    "ALTREP".to_string(),
                    vec!["http://www.wiz.org;;".to_string(), "Blah".to_string(), "Foo".to_string()]
                ),
                ("NEXT".to_string(), vec!["Nope".to_string()]),
                ("BAR".to_string(), vec![]),
            ]
        );
        assert_eq!(tokens.value, "mailto:x@y.z");
    }

    #[test]
    fn singleton_params() {
        let tokens = parse("EMAIL;PREF;INTERNET:john@nowhere.com").unwrap();
        assert_eq!(tokens.params.len(), 2);
        assert!(tokens.params.iter().all(Parameter::is_singleton));
        assert_eq!(tokens.value, "john@nowhere.com");
    }

    #[test]
    fn value_may_hold_colons() {
        let tokens = parse("URL:http://example.com:8080/a;b").unwrap();
        assert_eq!(tokens.value, "http://example.com:8080/a;b");
    }

    #[test]
    fn unclosed_quote() {
        let err = parse("ATTENDEE;CN=\"Unclosed:mailto:test@example.com").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnclosedQuote);
    }

    #[test]
    fn underscore_rejected_by_default() {
        let err = parse("X-BAD_UNDERSCORE:TRUE").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidPropertyName);
    }

    #[test]
    fn underscore_rewritten_when_enabled() {
        let compat = CompatFlags {
            underscore_names: true,
            ..CompatFlags::default()
        };
        let tokens = parse_line("X-BAD_UNDERSCORE:TRUE", 1, compat).unwrap();
        assert_eq!(tokens.name, "X-BAD-UNDERSCORE");
    }

    #[test]
    fn tzid_commas_flag() {
        let line = "DTSTART;TZID=America/Los_Angeles, CA:20060101T090000";
        let plain = parse(line).unwrap();
        assert_eq!(plain.params[0].values.len(), 2);

        let compat = CompatFlags {
            tzid_commas: true,
            ..CompatFlags::default()
        };
        let kept = parse_line(line, 1, compat).unwrap();
        assert_eq!(kept.params[0].values, vec!["America/Los_Angeles, CA".to_string()]);
    }

    #[test]
    fn logical_lines_unfold() {
        let input = "BEGIN:VCARD\r\nNOTE:first\r\n  second\r\n\tthird\r\n\r\nEND:VCARD\r\n";
        let lines: Vec<LogicalLine> = LogicalLines::new(input).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].text, "NOTE:first secondthird");
        assert_eq!(lines[1].number, 2);
        assert_eq!(lines[2].number, 6);
    }

    #[test]
    fn quoted_printable_soft_breaks() {
        let input = "NOTE;ENCODING=QUOTED-PRINTABLE:line one=0D=0A=\n line two=\nend\nFN:x\n";
        let lines: Vec<LogicalLine> = LogicalLines::new(input).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "NOTE;ENCODING=QUOTED-PRINTABLE:line one=0D=0A line twoend");
        assert_eq!(lines[1].text, "FN:x");
    }

    #[test]
    fn quoted_colon_before_encoding_still_soft_breaks() {
        let input = "NOTE;X-L=\"a:b\";ENCODING=QUOTED-PRINTABLE:foo=\r\nbar\r\nFN:x\r\n";
        let lines: Vec<LogicalLine> = LogicalLines::new(input).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "NOTE;X-L=\"a:b\";ENCODING=QUOTED-PRINTABLE:foobar");
    }

    #[test]
    fn quoted_printable_is_matched_as_a_parameter() {
        assert!(declares_quoted_printable("NOTE;CHARSET=UTF-8;QUOTED-PRINTABLE:a="));
        assert!(declares_quoted_printable("NOTE;encoding=quoted-printable:a="));
        assert!(!declares_quoted_printable("NOTE;X-FOO=QUOTED-PRINTABLE-ISH:a="));
        assert!(!declares_quoted_printable("NOTE:ENCODING=QUOTED-PRINTABLE="));
    }

    #[test]
    fn trailing_equals_without_qp_is_plain() {
        let input = "NOTE:a=\nFN:b";
        let lines: Vec<LogicalLine> = LogicalLines::new(input).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "NOTE:a=");
    }
}
