//! Occurrence sequences built from DTSTART, RRULE, RDATE, EXRULE and EXDATE.
//!
//! Rule arithmetic is delegated to the `rrule` crate. Every instant is
//! carried in a single frame chosen from DTSTART:
//!
//! - floating and date values iterate as wall-clock times in [`Tz::UTC`]
//! - UTC and IANA-zoned values iterate in that zone
//! - values in a document-defined VTIMEZONE iterate as wall-clock times and
//!   are mapped to instants on the way out

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc,
};
use rrule::{RRule, RRuleSet, Tz, Unvalidated, Validated};

use super::timezone::{TimezoneResolver, Zone};
use super::vtimezone::VTimezone;
use crate::error::{RecurrenceError, TimezoneError, VObjectError, VObjectResult};
use crate::rfc::core::{Component, ContentLine, DateTimeValue, NativeValue, Value};
use crate::rfc::parse::parse_date_or_datetime;

const RECURRENCE_LINES: [&str; 4] = ["RRULE", "RDATE", "EXRULE", "EXDATE"];

/// One produced occurrence, in the form of the component's DTSTART.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Occurrence {
    Date(NaiveDate),
    Floating(NaiveDateTime),
    Aware(DateTime<FixedOffset>),
}

impl Occurrence {
    /// Wall-clock reading.
    #[must_use]
    pub fn local(&self) -> NaiveDateTime {
        match self {
            Self::Date(date) => date.and_time(NaiveTime::MIN),
            Self::Floating(local) => *local,
            Self::Aware(instant) => instant.naive_local(),
        }
    }

    /// Absolute instant, if the occurrence has one.
    #[must_use]
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Aware(instant) => Some(instant.with_timezone(&Utc)),
            Self::Date(_) | Self::Floating(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
enum Frame {
    Floating { dates: bool },
    Fixed { tz: Tz, tzid: String },
    Embedded(VTimezone),
}

/// A compiled recurrence set. Iterating never changes it.
#[derive(Debug, Clone)]
pub struct RecurrenceSet {
    set: RRuleSet,
    frame: Frame,
}

impl RecurrenceSet {
    /// Lazy ascending iterator over the occurrences.
    #[must_use]
    pub fn iter(&self) -> Occurrences<'_> {
        Occurrences {
            inner: Box::new((&self.set).into_iter()),
            frame: &self.frame,
            last: None,
        }
    }
}

impl<'a> IntoIterator for &'a RecurrenceSet {
    type Item = Occurrence;
    type IntoIter = Occurrences<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`RecurrenceSet::iter`].
pub struct Occurrences<'a> {
    inner: Box<dyn Iterator<Item = DateTime<Tz>> + 'a>,
    frame: &'a Frame,
    last: Option<DateTime<Tz>>,
}

impl Iterator for Occurrences<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = self.inner.next()?;
            if self.last == Some(next) {
                continue;
            }
            self.last = Some(next);
            return Some(self.frame.occurrence(next));
        }
    }
}

impl Frame {
    fn occurrence(&self, value: DateTime<Tz>) -> Occurrence {
        match self {
            Self::Floating { dates: true } => Occurrence::Date(value.naive_utc().date()),
            Self::Floating { dates: false } => Occurrence::Floating(value.naive_utc()),
            Self::Fixed { .. } => Occurrence::Aware(value.fixed_offset()),
            Self::Embedded(vtimezone) => {
                let instant = vtimezone.local_to_utc(value.naive_utc());
                let offset = Zone::Embedded(vtimezone)
                    .offset_at(instant)
                    .to_fixed()
                    .unwrap_or_else(|| Utc.fix());
                Occurrence::Aware(instant.with_timezone(&offset))
            }
        }
    }

    const fn is_aware(&self) -> bool {
        !matches!(self, Self::Floating { .. })
    }

    /// Wall clock in the frame, as the `Tz::UTC` value iteration uses.
    fn wall(local: NaiveDateTime) -> DateTime<Tz> {
        Tz::UTC.from_utc_datetime(&local)
    }

    fn place(
        &self,
        value: &DateTimeValue,
        resolver: &mut TimezoneResolver,
        component: &str,
    ) -> VObjectResult<DateTime<Tz>> {
        let mixed = || RecurrenceError::MixedAwareness {
            component: component.to_string(),
        };
        match (self, value) {
            (Self::Floating { .. }, DateTimeValue::Date(_) | DateTimeValue::Floating(_)) => {
                Ok(Self::wall(value.local()))
            }
            (Self::Floating { .. }, _) | (_, DateTimeValue::Floating(_)) => Err(mixed().into()),
            (Self::Fixed { .. }, DateTimeValue::Date(date)) => Ok(self
                .local_to_utc(date.and_time(NaiveTime::MIN))?
                .with_timezone(self.tz())),
            (Self::Embedded(_), DateTimeValue::Date(date)) => {
                Ok(Self::wall(date.and_time(NaiveTime::MIN)))
            }
            (Self::Embedded(vtimezone), DateTimeValue::Zoned { local, tzid })
                if *tzid == vtimezone.tzid =>
            {
                Ok(Self::wall(*local))
            }
            (_, _) => {
                let instant = instant_of(value, resolver, component)?;
                Ok(match self {
                    Self::Embedded(vtimezone) => {
                        Self::wall(Zone::Embedded(vtimezone).to_local(instant))
                    }
                    Self::Fixed { tz, .. } => instant.with_timezone(tz),
                    Self::Floating { .. } => Self::wall(instant.naive_utc()),
                })
            }
        }
    }

    fn tz(&self) -> &Tz {
        match self {
            Self::Fixed { tz, .. } => tz,
            Self::Floating { .. } | Self::Embedded(_) => &Tz::UTC,
        }
    }

    /// Instant of a wall-clock time read in the frame.
    fn local_to_utc(&self, local: NaiveDateTime) -> VObjectResult<DateTime<Utc>> {
        match self {
            Self::Floating { .. } => Ok(local.and_utc()),
            Self::Fixed { tz, tzid } => tz
                .from_local_datetime(&local)
                .earliest()
                .or_else(|| tz.from_local_datetime(&(local + TimeDelta::hours(1))).earliest())
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| unrepresentable(tzid, local)),
            Self::Embedded(vtimezone) => Ok(vtimezone.local_to_utc(local)),
        }
    }

    /// UNTIL bound as a UTC value, or a wall clock for VTIMEZONE frames.
    fn until(
        &self,
        value: &DateTimeValue,
        resolver: &mut TimezoneResolver,
        component: &str,
    ) -> VObjectResult<DateTime<Tz>> {
        let end_of_day = |date: &NaiveDate| {
            date.and_hms_opt(23, 59, 59)
                .unwrap_or_else(|| value.local())
        };
        if let Self::Embedded(_) = self {
            return match value {
                DateTimeValue::Date(date) => Ok(Self::wall(end_of_day(date))),
                DateTimeValue::Floating(local) => Ok(Self::wall(*local)),
                DateTimeValue::Utc(_) | DateTimeValue::Zoned { .. } => {
                    self.place(value, resolver, component)
                }
            };
        }
        let instant = match value {
            DateTimeValue::Date(date) => self.local_to_utc(end_of_day(date))?,
            DateTimeValue::Floating(local) => self.local_to_utc(*local)?,
            DateTimeValue::Utc(instant) => *instant,
            DateTimeValue::Zoned { .. } if self.is_aware() => {
                instant_of(value, resolver, component)?
            }
            DateTimeValue::Zoned { .. } => {
                return Err(RecurrenceError::MixedAwareness {
                    component: component.to_string(),
                }
                .into());
            }
        };
        Ok(instant.with_timezone(&Tz::UTC))
    }
}

fn unrepresentable(tzid: &str, local: NaiveDateTime) -> VObjectError {
    TimezoneError::Unrepresentable {
        tzid: tzid.to_string(),
        local: local.to_string(),
    }
    .into()
}

fn unknown_zone(component: &str, tzid: &str) -> VObjectError {
    TimezoneError::UnknownZone {
        component: component.to_string(),
        tzid: tzid.to_string(),
    }
    .into()
}

fn instant_of(
    value: &DateTimeValue,
    resolver: &mut TimezoneResolver,
    component: &str,
) -> VObjectResult<DateTime<Utc>> {
    match value {
        DateTimeValue::Utc(instant) => Ok(*instant),
        DateTimeValue::Zoned { local, tzid } => resolver
            .resolve(tzid)
            .ok_or_else(|| unknown_zone(component, tzid))?
            .to_utc(*local)
            .ok_or_else(|| unrepresentable(tzid, *local)),
        DateTimeValue::Date(_) | DateTimeValue::Floating(_) => {
            Err(RecurrenceError::MixedAwareness {
                component: component.to_string(),
            }
            .into())
        }
    }
}

fn frame_for(
    dtstart: &DateTimeValue,
    resolver: &mut TimezoneResolver,
    component: &str,
) -> VObjectResult<Frame> {
    Ok(match dtstart {
        DateTimeValue::Date(_) => Frame::Floating { dates: true },
        DateTimeValue::Floating(_) => Frame::Floating { dates: false },
        DateTimeValue::Utc(_) => Frame::Fixed {
            tz: Tz::UTC,
            tzid: "UTC".to_string(),
        },
        DateTimeValue::Zoned { tzid, .. } => match resolver.resolve(tzid) {
            Some(Zone::Named(tz)) => Frame::Fixed {
                tz: Tz::Tz(tz),
                tzid: tzid.clone(),
            },
            Some(Zone::Embedded(vtimezone)) => Frame::Embedded(vtimezone.clone()),
            None => return Err(unknown_zone(component, tzid)),
        },
    })
}

/// Splits the UNTIL part off a rule, leaving the rest for `rrule` to parse.
pub(crate) fn split_until(rule: &str) -> (String, Option<&str>) {
    let mut until = None;
    let rest: Vec<&str> = rule
        .trim()
        .trim_start_matches("RRULE:")
        .split(';')
        .filter(|part| {
            match part
                .split_once('=')
                .filter(|(key, _)| key.eq_ignore_ascii_case("UNTIL"))
            {
                Some((_, value)) => {
                    until = Some(value);
                    false
                }
                None => !part.is_empty(),
            }
        })
        .collect();
    (rest.join(";"), until)
}

/// ## Summary
/// Compiles one rule relative to `dt_start`.
///
/// Returns `Ok(None)` when UNTIL falls before the start, so the rule
/// contributes nothing.
///
/// ## Errors
/// Returns the `rrule` crate's message when the rule does not parse or
/// validate.
pub(crate) fn compile_rule(
    text: &str,
    dt_start: DateTime<Tz>,
    until: Option<DateTime<Tz>>,
) -> Result<Option<RRule<Validated>>, String> {
    let mut rule = text
        .parse::<RRule<Unvalidated>>()
        .map_err(|err| err.to_string())?;
    if let Some(until) = until {
        if until < dt_start {
            return Ok(None);
        }
        rule = rule.until(until);
    }
    rule.validate(dt_start)
        .map(Some)
        .map_err(|err| err.to_string())
}

fn rule_text(line: &ContentLine) -> Option<&str> {
    match &line.value {
        Value::Raw(raw) => Some(raw),
        value => value.as_text(),
    }
}

fn native_values<'a>(
    line: &'a ContentLine,
    component: &str,
) -> VObjectResult<Vec<&'a DateTimeValue>> {
    match line.value.as_native() {
        Some(NativeValue::DateTime(value)) => Ok(vec![value]),
        Some(NativeValue::DateTimeList(values)) => Ok(values.iter().collect()),
        Some(NativeValue::Periods(periods)) => Ok(periods.iter().map(|p| &p.start).collect()),
        _ => Err(RecurrenceError::NotNative {
            component: component.to_string(),
            name: line.name.clone(),
        }
        .into()),
    }
}

/// ## Summary
/// Builds the occurrence set of `component`, resolving TZIDs against the
/// IANA database only. Use [`occurrences_in`] when the TZIDs name
/// VTIMEZONEs defined in the enclosing calendar.
///
/// Returns `Ok(None)` when the component has no recurrence lines.
///
/// ## Errors
/// See [`occurrences_with`].
pub fn occurrences(
    component: &Component,
    include_start: bool,
) -> VObjectResult<Option<RecurrenceSet>> {
    occurrences_with(component, include_start, &mut TimezoneResolver::new())
}

/// ## Summary
/// Builds the occurrence set of `component`, a child of `calendar`. TZIDs
/// resolve against the calendar's VTIMEZONEs first, then IANA.
///
/// ## Errors
/// Returns an error if a VTIMEZONE in `calendar` is malformed, or see
/// [`occurrences_with`].
pub fn occurrences_in(
    calendar: &Component,
    component: &Component,
    include_start: bool,
) -> VObjectResult<Option<RecurrenceSet>> {
    let mut resolver = TimezoneResolver::from_calendar(calendar)?;
    occurrences_with(component, include_start, &mut resolver)
}

/// ## Summary
/// Builds the occurrence set of `component`: RRULE and RDATE expansions
/// minus EXRULE and EXDATE expansions, optionally with DTSTART itself.
///
/// Returns `Ok(None)` when the component has no recurrence lines.
///
/// ## Errors
/// Returns an error naming the component if DTSTART is missing or not
/// decoded, a rule is malformed, floating and zoned values are mixed, or a
/// TZID cannot be resolved.
#[tracing::instrument(skip(component, resolver), fields(name = %component.name))]
pub fn occurrences_with(
    component: &Component,
    include_start: bool,
    resolver: &mut TimezoneResolver,
) -> VObjectResult<Option<RecurrenceSet>> {
    let name = component.name.as_str();
    if !RECURRENCE_LINES
        .iter()
        .any(|line| component.line(line).is_some())
    {
        return Ok(None);
    }

    let dtstart_line = component
        .line("DTSTART")
        .ok_or_else(|| RecurrenceError::MissingDtstart {
            component: name.to_string(),
        })?;
    let Some(NativeValue::DateTime(dtstart)) = dtstart_line.value.as_native() else {
        return Err(RecurrenceError::NotNative {
            component: name.to_string(),
            name: "DTSTART".to_string(),
        }
        .into());
    };

    let frame = frame_for(dtstart, resolver, name)?;
    let dt_start = frame.place(dtstart, resolver, name)?;
    let mut set = RRuleSet::new(dt_start);

    for (line_name, exclude) in [("RRULE", false), ("EXRULE", true)] {
        for line in component.lines(line_name) {
            let invalid = |message: String| RecurrenceError::InvalidRule {
                component: name.to_string(),
                message,
            };
            let text = rule_text(line).ok_or_else(|| RecurrenceError::NotNative {
                component: name.to_string(),
                name: line_name.to_string(),
            })?;
            let (text, until) = split_until(text);
            let until = match until {
                Some(raw) => {
                    let value = parse_date_or_datetime(raw, None, line.line_number.unwrap_or(0))
                        .map_err(|err| invalid(err.to_string()))?;
                    Some(frame.until(&value, resolver, name)?)
                }
                None => None,
            };
            let Some(rule) = compile_rule(&text, dt_start, until).map_err(invalid)? else {
                tracing::debug!(rule = %text, "UNTIL precedes DTSTART, rule skipped");
                continue;
            };
            set = if exclude { set.exrule(rule) } else { set.rrule(rule) };
        }
    }

    let mut rdates = Vec::new();
    let mut exdates = Vec::new();
    for (line_name, target) in [("RDATE", &mut rdates), ("EXDATE", &mut exdates)] {
        for line in component.lines(line_name) {
            for value in native_values(line, name)? {
                target.push(frame.place(value, resolver, name)?);
            }
        }
    }
    if include_start {
        rdates.push(dt_start);
    }
    if !rdates.is_empty() {
        set = set.set_rdates(rdates);
    }
    if !exdates.is_empty() {
        set = set.set_exdates(exdates);
    }

    tracing::debug!(include_start, "Compiled recurrence set");
    Ok(Some(RecurrenceSet { set, frame }))
}
