//! Timezone lookup: the [`OffsetSource`] abstraction, TZID normalization and
//! the per-document resolver.
//!
//! Uses ICU4X for Windows timezone ID to IANA mapping and canonicalization.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::{OffsetName, Tz};
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;

use super::vtimezone::VTimezone;
use crate::error::VObjectResult;
use crate::rfc::core::{Component, DateTimeValue, NativeValue, UtcOffset, Value};

/// One change of UTC offset or abbreviation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// First instant the new offset applies.
    pub at: DateTime<Utc>,
    pub before: UtcOffset,
    pub after: UtcOffset,
    /// Abbreviation in effect from `at`.
    pub abbreviation: Option<String>,
}

impl Transition {
    /// Wall-clock time of the transition, read in the old offset.
    #[must_use]
    pub fn local_start(&self) -> NaiveDateTime {
        self.at.naive_utc() + self.before.as_delta()
    }
}

/// Anything that can answer "which offset applies at this instant".
pub trait OffsetSource {
    /// Offset and abbreviation in effect at `instant`.
    fn offset_at(&self, instant: DateTime<Utc>) -> (UtcOffset, Option<String>);

    /// Transitions in `[from, to)`, ascending.
    ///
    /// The default scans day by day and bisects each change down to the
    /// second.
    fn transitions(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<Transition> {
        let mut found = Vec::new();
        let mut prev_at = from;
        let mut prev = self.offset_at(from);
        let mut cursor = from;
        while cursor < to {
            cursor = (cursor + TimeDelta::days(1)).min(to);
            let current = self.offset_at(cursor);
            if current != prev {
                let at = bisect(self, prev_at, cursor, &prev);
                found.push(Transition {
                    at,
                    before: prev.0,
                    after: current.0,
                    abbreviation: self.offset_at(at).1,
                });
            }
            prev_at = cursor;
            prev = current;
        }
        found
    }
}

/// First instant in `(lo, hi]` whose offset differs from `old`.
fn bisect<S: OffsetSource + ?Sized>(
    source: &S,
    mut lo: DateTime<Utc>,
    mut hi: DateTime<Utc>,
    old: &(UtcOffset, Option<String>),
) -> DateTime<Utc> {
    while hi - lo > TimeDelta::seconds(1) {
        let mid = lo + (hi - lo) / 2;
        if source.offset_at(mid) == *old {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    hi
}

impl OffsetSource for Tz {
    fn offset_at(&self, instant: DateTime<Utc>) -> (UtcOffset, Option<String>) {
        let offset = self.offset_from_utc_datetime(&instant.naive_utc());
        (
            UtcOffset::from(offset.fix()),
            offset.abbreviation().map(str::to_string),
        )
    }
}

/// A zone a TZID resolved to.
#[derive(Debug, Clone, Copy)]
pub enum Zone<'a> {
    /// From the IANA database.
    Named(Tz),
    /// Defined by a VTIMEZONE in the document.
    Embedded(&'a VTimezone),
}

impl Zone<'_> {
    /// Converts a wall-clock time to UTC.
    ///
    /// Times skipped by a forward transition are read one hour later;
    /// repeated times take the earlier instant.
    #[must_use]
    pub fn to_utc(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Self::Named(tz) => named_to_utc(*tz, local),
            Self::Embedded(vtimezone) => Some(vtimezone.local_to_utc(local)),
        }
    }

    #[must_use]
    pub fn offset_at(&self, instant: DateTime<Utc>) -> UtcOffset {
        match self {
            Self::Named(tz) => tz.offset_at(instant).0,
            Self::Embedded(vtimezone) => vtimezone.offset_at(instant).0,
        }
    }

    /// Wall-clock reading of `instant` in this zone.
    #[must_use]
    pub fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.naive_utc() + self.offset_at(instant).as_delta()
    }
}

fn named_to_utc(tz: Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + TimeDelta::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Resolves TZIDs for one document.
///
/// VTIMEZONE definitions in the document win over the IANA database.
#[derive(Debug, Default)]
pub struct TimezoneResolver {
    named: HashMap<String, Option<Tz>>,
    embedded: HashMap<String, VTimezone>,
}

impl TimezoneResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Builds a resolver knowing every VTIMEZONE directly under `calendar`.
    ///
    /// ## Errors
    /// Returns an error if a VTIMEZONE is malformed.
    pub fn from_calendar(calendar: &Component) -> VObjectResult<Self> {
        let mut resolver = Self::new();
        for component in calendar.children_named("VTIMEZONE") {
            resolver.register(VTimezone::parse(component)?);
        }
        tracing::debug!(count = resolver.embedded.len(), "Registered VTIMEZONE definitions");
        Ok(resolver)
    }

    pub fn register(&mut self, vtimezone: VTimezone) {
        self.embedded.insert(vtimezone.tzid.clone(), vtimezone);
    }

    #[must_use]
    pub fn embedded(&self, tzid: &str) -> Option<&VTimezone> {
        self.embedded.get(tzid)
    }

    /// Resolves a TZID, caching IANA lookups.
    pub fn resolve(&mut self, tzid: &str) -> Option<Zone<'_>> {
        if self.embedded.contains_key(tzid) {
            return self.embedded.get(tzid).map(Zone::Embedded);
        }
        let tz = *self
            .named
            .entry(tzid.to_string())
            .or_insert_with(|| resolve_named(tzid));
        tz.map(Zone::Named)
    }
}

/// Maps common non-IANA TZIDs to IANA names.
///
/// Strips the Mozilla and SoftwareStudio prefixes, maps Windows zone names
/// and canonicalizes aliases. Unknown names come back unchanged.
#[must_use]
pub fn normalize_tzid(tzid: &str) -> String {
    let stripped = tzid
        .strip_prefix("/mozilla.org/")
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(tzid);
    let stripped = match stripped.split_once('/') {
        Some((release, name)) if release.starts_with("Olson_") => name,
        _ => stripped,
    };

    let iana = IanaParserExtended::new();
    if let Some(zone) = WindowsParser::new().parse(stripped, None)
        && let Some(entry) = iana.iter().find(|entry| entry.time_zone == zone)
    {
        return entry.canonical.to_string();
    }

    let parsed = iana.parse(stripped);
    if parsed.time_zone != icu::time::TimeZone::UNKNOWN {
        return parsed.canonical.to_string();
    }
    stripped.to_string()
}

/// Looks a TZID up in the IANA database after normalization.
#[must_use]
pub fn resolve_named(tzid: &str) -> Option<Tz> {
    Tz::from_str(tzid)
        .ok()
        .or_else(|| Tz::from_str(&normalize_tzid(tzid)).ok())
}

/// Converts a wall-clock time in an IANA zone to UTC.
#[must_use]
pub fn local_to_utc(local: NaiveDateTime, tzid: &str) -> Option<DateTime<Utc>> {
    named_to_utc(resolve_named(tzid)?, local)
}

/// Every TZID used by a date-time in the tree, in first-use order.
#[must_use]
pub fn referenced_tzids(component: &Component) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let mut note = |tzid: &str| {
        if !found.iter().any(|f| f == tzid) {
            found.push(tzid.to_string());
        }
    };
    component.walk(&mut |node| {
        for line in node.all_lines() {
            match &line.value {
                Value::Raw(_) => {
                    if let Some(tzid) = line.param_value("TZID") {
                        note(tzid);
                    }
                }
                Value::Native(NativeValue::DateTime(value)) => {
                    value.tzid().into_iter().for_each(&mut note);
                }
                Value::Native(NativeValue::DateTimeList(values)) => {
                    values.iter().filter_map(DateTimeValue::tzid).for_each(&mut note);
                }
                Value::Native(NativeValue::Periods(periods)) => {
                    periods.iter().filter_map(|p| p.start.tzid()).for_each(&mut note);
                }
                Value::Native(_) => {}
            }
        }
    });
    found
}
