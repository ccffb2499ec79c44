//! VTIMEZONE parsing and offset lookup (RFC 5545 §3.6.5).
//!
//! Annual `FREQ=YEARLY;BYMONTH=m;BYDAY=nWD` observances are evaluated
//! directly; any other rule is handed to `rrule`.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc, Weekday};
use rrule::{RRuleSet, Tz};

use super::recurrence::{compile_rule, split_until};
use super::timezone::{OffsetSource, Transition};
use crate::error::TimezoneError;
use crate::rfc::core::{Component, ContentLine, DateTimeValue, NativeValue, UtcOffset, Value};
use crate::rfc::parse::{parse_date_or_datetime, parse_datetime_list, parse_utc_offset};

/// Kind of timezone observance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObservanceKind {
    Standard,
    Daylight,
}

impl ObservanceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Daylight => "DAYLIGHT",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("STANDARD") {
            Some(Self::Standard)
        } else if name.eq_ignore_ascii_case("DAYLIGHT") {
            Some(Self::Daylight)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ObservanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `FREQ=YEARLY;BYMONTH=m;BYDAY=nWD` with an optional bound.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AnnualRule {
    month: u32,
    ordinal: i8,
    weekday: Weekday,
    until: Option<DateTimeValue>,
    count: Option<u32>,
}

#[derive(Debug, Clone)]
enum Rule {
    Annual(AnnualRule),
    General(RRuleSet),
}

/// A STANDARD or DAYLIGHT sub-component.
#[derive(Debug, Clone)]
pub struct Observance {
    pub kind: ObservanceKind,
    pub offset_from: UtcOffset,
    pub offset_to: UtcOffset,
    /// First onset, wall clock in `offset_from`.
    pub dtstart: NaiveDateTime,
    pub rdates: Vec<NaiveDateTime>,
    pub tzname: Option<String>,
    rule: Option<Rule>,
}

/// A parsed VTIMEZONE.
#[derive(Debug, Clone)]
pub struct VTimezone {
    pub tzid: String,
    pub observances: Vec<Observance>,
}

fn text(line: &ContentLine) -> Option<&str> {
    match &line.value {
        Value::Raw(raw) => Some(raw),
        value => value.as_text(),
    }
}

/// Returns the `n`th `weekday` of a month; negative `n` counts from the end.
#[must_use]
pub fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: i8) -> Option<NaiveDate> {
    if n > 0 {
        return NaiveDate::from_weekday_of_month_opt(year, month, weekday, n.unsigned_abs());
    }
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
    let back = (7 + last.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    let from_end = u32::from(n.unsigned_abs()).checked_sub(1)?;
    let date = last - TimeDelta::days(i64::from(back + 7 * from_end));
    (date.month() == month).then_some(date)
}

/// Parses `SU`, `-1SU` or `2MO`.
pub(crate) fn parse_byday(s: &str) -> Option<(i8, Weekday)> {
    let s = s.trim();
    let split = s.len().checked_sub(2)?;
    let (number, day) = s.split_at_checked(split)?;
    let ordinal = match number {
        "" => 0,
        n => n.trim_start_matches('+').parse().ok()?,
    };
    let weekday = match day.to_ascii_uppercase().as_str() {
        "MO" => Weekday::Mon,
        "TU" => Weekday::Tue,
        "WE" => Weekday::Wed,
        "TH" => Weekday::Thu,
        "FR" => Weekday::Fri,
        "SA" => Weekday::Sat,
        "SU" => Weekday::Sun,
        _ => return None,
    };
    Some((ordinal, weekday))
}

/// Recognizes the annual shape; anything else returns `None`.
fn parse_annual(rule: &str) -> Option<AnnualRule> {
    let mut freq = None;
    let mut annual = AnnualRule {
        month: 0,
        ordinal: 0,
        weekday: Weekday::Sun,
        until: None,
        count: None,
    };
    for part in rule.trim().trim_start_matches("RRULE:").split(';') {
        if part.is_empty() {
            continue;
        }
        let (key, value) = part.split_once('=')?;
        match key.to_ascii_uppercase().as_str() {
            "FREQ" => freq = Some(value.to_ascii_uppercase()),
            "BYMONTH" => annual.month = value.parse().ok()?,
            "BYDAY" => (annual.ordinal, annual.weekday) = parse_byday(value)?,
            "UNTIL" => annual.until = Some(parse_date_or_datetime(value, None, 0).ok()?),
            "COUNT" => annual.count = Some(value.parse().ok()?),
            "INTERVAL" if value == "1" => {}
            "WKST" => {}
            _ => return None,
        }
    }
    let valid = freq.as_deref() == Some("YEARLY")
        && (1..=12).contains(&annual.month)
        && annual.ordinal != 0;
    valid.then_some(annual)
}

impl Observance {
    fn parse(component: &Component, kind: ObservanceKind, tzid: &str) -> Result<Self, TimezoneError> {
        let malformed = |reason: String| TimezoneError::Malformed {
            tzid: tzid.to_string(),
            reason: format!("{kind}: {reason}"),
        };

        let dtstart_line = component
            .line("DTSTART")
            .ok_or_else(|| malformed("missing DTSTART".to_string()))?;
        let dtstart = match &dtstart_line.value {
            Value::Native(NativeValue::DateTime(value)) => value.local(),
            Value::Raw(raw) => parse_date_or_datetime(raw, None, dtstart_line.line_number.unwrap_or(0))
                .map_err(|err| malformed(err.to_string()))?
                .local(),
            Value::Native(_) => return Err(malformed("DTSTART is not a date-time".to_string())),
        };

        let offset = |name: &'static str| -> Result<UtcOffset, TimezoneError> {
            let line = component
                .line(name)
                .ok_or_else(|| malformed(format!("missing {name}")))?;
            let raw = text(line).ok_or_else(|| malformed(format!("{name} is not text")))?;
            parse_utc_offset(raw, line.line_number.unwrap_or(0)).map_err(|err| malformed(err.to_string()))
        };
        let offset_from = offset("TZOFFSETFROM")?;
        let offset_to = offset("TZOFFSETTO")?;

        let mut rdates = Vec::new();
        for line in component.lines("RDATE") {
            match &line.value {
                Value::Native(NativeValue::DateTimeList(values)) => {
                    rdates.extend(values.iter().map(DateTimeValue::local));
                }
                Value::Native(NativeValue::Periods(periods)) => {
                    rdates.extend(periods.iter().map(|p| p.start.local()));
                }
                Value::Raw(raw) => rdates.extend(
                    parse_datetime_list(raw, None, line.line_number.unwrap_or(0))
                        .map_err(|err| malformed(err.to_string()))?
                        .iter()
                        .map(DateTimeValue::local),
                ),
                Value::Native(_) => return Err(malformed("RDATE is not a date list".to_string())),
            }
        }

        let rule = match component.line("RRULE").and_then(text) {
            Some(raw) => Some(match parse_annual(raw) {
                Some(annual) => Rule::Annual(annual),
                None => Rule::General(general_rule(raw, dtstart, offset_from).map_err(malformed)?),
            }),
            None => None,
        };

        Ok(Self {
            kind,
            offset_from,
            offset_to,
            dtstart,
            rdates,
            tzname: component.text("TZNAME").map(str::to_string),
            rule,
        })
    }

    fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        (local - self.offset_from.as_delta()).and_utc()
    }

    /// Rule date in `year`, ignoring COUNT and UNTIL.
    fn rule_date(&self, rule: &AnnualRule, year: i32) -> Option<NaiveDateTime> {
        if year < self.dtstart.year() {
            return None;
        }
        let local = nth_weekday(year, rule.month, rule.weekday, rule.ordinal)?.and_time(self.dtstart.time());
        (local >= self.dtstart).then_some(local)
    }

    /// Annual onset in `year`, if the rule produces one there.
    fn annual_onset(&self, rule: &AnnualRule, year: i32) -> Option<DateTime<Utc>> {
        let local = self.rule_date(rule, year)?;
        if let Some(count) = rule.count {
            let earlier = (self.dtstart.year()..year)
                .filter(|y| self.rule_date(rule, *y).is_some())
                .count();
            if earlier >= usize::try_from(count).unwrap_or(usize::MAX) {
                return None;
            }
        }
        let onset = self.to_utc(local);
        let within = match &rule.until {
            None => true,
            Some(DateTimeValue::Utc(until)) => onset <= *until,
            Some(DateTimeValue::Date(date)) => local.date() <= *date,
            Some(until) => local <= until.local(),
        };
        within.then_some(onset)
    }

    /// Latest onset at or before `instant`.
    fn latest_onset(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let explicit = std::iter::once(self.dtstart)
            .chain(self.rdates.iter().copied())
            .map(|local| self.to_utc(local))
            .filter(|onset| *onset <= instant)
            .max();

        let ruled = match &self.rule {
            None => None,
            Some(Rule::Annual(rule)) => {
                let last_year = match &rule.until {
                    Some(until) => until.local().year().min(instant.year() + 1),
                    None => instant.year() + 1,
                };
                (self.dtstart.year()..=last_year)
                    .rev()
                    .filter_map(|year| self.annual_onset(rule, year))
                    .find(|onset| *onset <= instant)
            }
            Some(Rule::General(set)) => {
                let bound = instant.naive_utc() + self.offset_from.as_delta();
                set.into_iter()
                    .take_while(|local| local.naive_utc() <= bound)
                    .last()
                    .map(|local| self.to_utc(local.naive_utc()))
            }
        };
        explicit.max(ruled)
    }

    /// Onsets in `[from, to)`, ascending.
    fn onsets_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let mut onsets: Vec<DateTime<Utc>> = std::iter::once(self.dtstart)
            .chain(self.rdates.iter().copied())
            .map(|local| self.to_utc(local))
            .collect();
        match &self.rule {
            None => {}
            Some(Rule::Annual(rule)) => {
                let first = self.dtstart.year().max(from.year() - 1);
                onsets.extend((first..=to.year() + 1).filter_map(|year| self.annual_onset(rule, year)));
            }
            Some(Rule::General(set)) => {
                let bound = to.naive_utc() + self.offset_from.as_delta();
                onsets.extend(
                    set.into_iter()
                        .take_while(|local| local.naive_utc() <= bound)
                        .map(|local| self.to_utc(local.naive_utc())),
                );
            }
        }
        onsets.retain(|onset| *onset >= from && *onset < to);
        onsets.sort_unstable();
        onsets.dedup();
        onsets
    }
}

/// Compiles a non-annual observance rule in the observance's wall clock.
fn general_rule(rule: &str, dtstart: NaiveDateTime, offset_from: UtcOffset) -> Result<RRuleSet, String> {
    let dt_start = Tz::UTC.from_utc_datetime(&dtstart);
    let (text, until) = split_until(rule);
    let until = match until {
        Some(raw) => {
            let local = match parse_date_or_datetime(raw, None, 0).map_err(|err| err.to_string())? {
                DateTimeValue::Utc(instant) => instant.naive_utc() + offset_from.as_delta(),
                DateTimeValue::Date(date) => date.and_hms_opt(23, 59, 59).unwrap_or(dtstart),
                other => other.local(),
            };
            Some(Tz::UTC.from_utc_datetime(&local))
        }
        None => None,
    };
    let set = RRuleSet::new(dt_start);
    Ok(match compile_rule(&text, dt_start, until)? {
        Some(rule) => set.rrule(rule),
        None => set,
    })
}

impl VTimezone {
    /// ## Summary
    /// Reads a VTIMEZONE component, raw or decoded.
    ///
    /// ## Errors
    /// Returns an error if TZID is missing, there are no observances, or an
    /// observance lacks DTSTART or an offset.
    pub fn parse(component: &Component) -> Result<Self, TimezoneError> {
        let tzid = component
            .text("TZID")
            .ok_or(TimezoneError::MissingTzid)?
            .to_string();

        let observances = component
            .children()
            .iter()
            .filter_map(|child| ObservanceKind::from_name(&child.name).map(|kind| (child, kind)))
            .map(|(child, kind)| Observance::parse(child, kind, &tzid))
            .collect::<Result<Vec<_>, _>>()?;

        if observances.is_empty() {
            return Err(TimezoneError::Malformed {
                tzid,
                reason: "no STANDARD or DAYLIGHT observance".to_string(),
            });
        }
        tracing::trace!(tzid = %tzid, observances = observances.len(), "Parsed VTIMEZONE");
        Ok(Self { tzid, observances })
    }

    /// Converts a wall-clock time to UTC.
    ///
    /// Reads the offset at the naive guess, then again at the corrected
    /// instant.
    #[must_use]
    pub fn local_to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let guess = local.and_utc() - self.offset_at(local.and_utc()).0.as_delta();
        local.and_utc() - self.offset_at(guess).0.as_delta()
    }
}

impl OffsetSource for VTimezone {
    fn offset_at(&self, instant: DateTime<Utc>) -> (UtcOffset, Option<String>) {
        let latest = self
            .observances
            .iter()
            .filter_map(|obs| obs.latest_onset(instant).map(|onset| (onset, obs)))
            .max_by_key(|(onset, _)| *onset);
        match latest {
            Some((_, obs)) => (obs.offset_to, obs.tzname.clone()),
            None => {
                let earliest = self.observances.iter().min_by_key(|obs| obs.to_utc(obs.dtstart));
                (earliest.map_or(UtcOffset::UTC, |obs| obs.offset_from), None)
            }
        }
    }

    fn transitions(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<Transition> {
        let mut found: Vec<Transition> = self
            .observances
            .iter()
            .flat_map(|obs| {
                obs.onsets_between(from, to).into_iter().map(|at| Transition {
                    at,
                    before: obs.offset_from,
                    after: obs.offset_to,
                    abbreviation: obs.tzname.clone(),
                })
            })
            .collect();
        found.sort_by_key(|transition| transition.at);
        found
    }
}
