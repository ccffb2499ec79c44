//! Value parsers (RFC 5545 §3.3, RFC 2426 §4).
//!
//! All positions are reported against column 1 of the value; callers move
//! the error onto the owning line with [`ParseError::at_line`].

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::core::{DateTimeValue, Duration, Period, PeriodEnd, UtcOffset};

/// Strips the ISO 8601 extended separators some vCard producers emit.
fn basic_form(s: &str) -> std::borrow::Cow<'_, str> {
    if s.contains(['-', ':']) {
        std::borrow::Cow::Owned(s.replace(['-', ':'], ""))
    } else {
        std::borrow::Cow::Borrowed(s)
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a DATE value (`19970714`).
///
/// ## Errors
/// Returns an error if the string is not a valid calendar date.
pub fn parse_date(s: &str, line: usize) -> ParseResult<NaiveDate> {
    let s = basic_form(s.trim());
    if s.len() != 8 || !all_digits(&s) {
        return Err(ParseError::new(ParseErrorKind::InvalidDate, line, 1)
            .with_context(format!("expected YYYYMMDD, found {s:?}")));
    }
    NaiveDate::parse_from_str(&s, "%Y%m%d").map_err(|e| {
        ParseError::new(ParseErrorKind::InvalidDate, line, 1).with_context(e.to_string())
    })
}

fn parse_time(s: &str, line: usize, col: usize) -> ParseResult<NaiveTime> {
    if s.len() != 6 || !all_digits(s) {
        return Err(ParseError::new(ParseErrorKind::InvalidDateTime, line, col)
            .with_context(format!("expected HHMMSS, found {s:?}")));
    }
    NaiveTime::parse_from_str(s, "%H%M%S").map_err(|e| {
        ParseError::new(ParseErrorKind::InvalidDateTime, line, col).with_context(e.to_string())
    })
}

/// Parses a DATE-TIME value (`19970714T133000[Z]`).
///
/// A trailing `Z` wins over `tzid`; otherwise a TZID makes the value zoned
/// and its absence makes it floating.
///
/// ## Errors
/// Returns an error if the string is not a valid date-time.
pub fn parse_datetime(s: &str, tzid: Option<&str>, line: usize) -> ParseResult<DateTimeValue> {
    let s = basic_form(s.trim());
    let (body, is_utc) = match s.strip_suffix(['Z', 'z']) {
        Some(stripped) => (stripped, true),
        None => (&*s, false),
    };
    let Some((date, time)) = body.split_once(['T', 't']) else {
        return Err(ParseError::new(ParseErrorKind::InvalidDateTime, line, 1)
            .with_context(format!("no time part in {s:?}")));
    };

    let local = NaiveDateTime::new(
        parse_date(date, line)?,
        parse_time(time, line, date.len() + 2)?,
    );

    Ok(match (is_utc, tzid) {
        (true, _) => DateTimeValue::utc(local),
        (false, Some(tzid)) => DateTimeValue::zoned(local, tzid),
        (false, None) => DateTimeValue::Floating(local),
    })
}

/// Parses either form, deciding by the presence of a time part.
///
/// ## Errors
/// Returns an error if the string is neither a DATE nor a DATE-TIME.
pub fn parse_date_or_datetime(
    s: &str,
    tzid: Option<&str>,
    line: usize,
) -> ParseResult<DateTimeValue> {
    if s.contains(['T', 't']) {
        parse_datetime(s, tzid, line)
    } else {
        parse_date(s, line).map(DateTimeValue::Date)
    }
}

/// Parses a comma-separated list of DATE or DATE-TIME values.
///
/// ## Errors
/// Returns the first item that fails to parse.
pub fn parse_datetime_list(
    s: &str,
    tzid: Option<&str>,
    line: usize,
) -> ParseResult<Vec<DateTimeValue>> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| parse_date_or_datetime(item, tzid, line))
        .collect()
}

/// Parses a UTC-OFFSET value: `(+|-)HHMM[SS]`.
///
/// ## Errors
/// Returns an error if the string is not a valid UTC offset.
pub fn parse_utc_offset(s: &str, line: usize) -> ParseResult<UtcOffset> {
    let s = s.trim();
    let invalid = || {
        ParseError::new(ParseErrorKind::InvalidUtcOffset, line, 1)
            .with_context(format!("expected (+|-)HHMM[SS], found {s:?}"))
    };

    let (sign, digits) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(invalid()),
    };
    if !(digits.len() == 4 || digits.len() == 6) || !all_digits(digits) {
        return Err(invalid());
    }

    let field = |range: std::ops::Range<usize>| digits[range].parse::<i32>().map_err(|_e| invalid());
    let hours = field(0..2)?;
    let minutes = field(2..4)?;
    let seconds = if digits.len() == 6 { field(4..6)? } else { 0 };
    if minutes > 59 || seconds > 59 {
        return Err(invalid());
    }

    Ok(UtcOffset::from_seconds(sign * (hours * 3600 + minutes * 60 + seconds)))
}

/// Parses a DURATION value: `[+|-]P[nW]` or `[+|-]P[nD][T[nH][nM][nS]]`.
///
/// ## Errors
/// Returns an error if the string is not a valid duration.
pub fn parse_duration(s: &str, line: usize) -> ParseResult<Duration> {
    let s = s.trim();
    let invalid = |col: usize| {
        ParseError::new(ParseErrorKind::InvalidDuration, line, col)
            .with_context(format!("invalid duration {s:?}"))
    };

    let mut duration = Duration::zero();
    let rest = match s.as_bytes().first() {
        Some(b'-') => {
            duration.negative = true;
            &s[1..]
        }
        Some(b'+') => &s[1..],
        _ => s,
    };
    let Some(rest) = rest.strip_prefix(['P', 'p']) else {
        return Err(invalid(1));
    };

    let mut in_time = false;
    let mut number = String::new();
    let mut seen_component = false;
    for (idx, c) in rest.char_indices() {
        let col = s.len() - rest.len() + idx + 1;
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }
        if c.eq_ignore_ascii_case(&'T') {
            if in_time || !number.is_empty() {
                return Err(invalid(col));
            }
            in_time = true;
            continue;
        }

        let value = number.parse::<u32>().map_err(|_e| invalid(col))?;
        number.clear();
        match (c.to_ascii_uppercase(), in_time) {
            ('W', false) => duration.weeks = value,
            ('D', false) => duration.days = value,
            ('H', true) => duration.hours = value,
            ('M', true) => duration.minutes = value,
            ('S', true) => duration.seconds = value,
            _ => return Err(invalid(col)),
        }
        seen_component = true;
    }

    if !number.is_empty() || !seen_component {
        return Err(invalid(s.len()));
    }
    Ok(duration)
}

/// Parses a PERIOD value: `start/end` or `start/duration`.
///
/// ## Errors
/// Returns an error if the string is not a valid period.
pub fn parse_period(s: &str, tzid: Option<&str>, line: usize) -> ParseResult<Period> {
    let Some((start, end)) = s.trim().split_once('/') else {
        return Err(ParseError::new(ParseErrorKind::InvalidPeriod, line, 1)
            .with_context(format!("no '/' in {s:?}")));
    };

    let start = parse_datetime(start, tzid, line)?;
    let end = if end.starts_with(['P', 'p', '+', '-']) {
        PeriodEnd::Lasting(parse_duration(end, line)?)
    } else {
        PeriodEnd::At(parse_datetime(end, tzid, line)?)
    };
    Ok(Period { start, end })
}

/// Parses a comma-separated list of periods.
///
/// ## Errors
/// Returns the first item that fails to parse.
pub fn parse_period_list(s: &str, tzid: Option<&str>, line: usize) -> ParseResult<Vec<Period>> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| parse_period(item, tzid, line))
        .collect()
}
