//! DATE, DATE-TIME, PERIOD and UTC-OFFSET value types (RFC 5545 §3.3).

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use super::duration::Duration;

const DATE_FORMAT: &str = "%Y%m%d";
const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// UTC offset representation (e.g., +0530, -0800).
///
/// Stored as total seconds from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcOffset {
    /// Total seconds from UTC (positive = east, negative = west).
    seconds: i32,
}

impl UtcOffset {
    /// UTC offset (zero).
    pub const UTC: Self = Self { seconds: 0 };

    /// Creates a UTC offset from total seconds.
    #[must_use]
    pub const fn from_seconds(seconds: i32) -> Self {
        Self { seconds }
    }

    /// Returns the offset as total seconds from UTC.
    #[must_use]
    pub const fn as_seconds(self) -> i32 {
        self.seconds
    }

    /// Converts to a chrono offset, if in range.
    #[must_use]
    pub fn to_fixed(self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.seconds)
    }

    #[must_use]
    pub fn as_delta(self) -> chrono::TimeDelta {
        chrono::TimeDelta::seconds(i64::from(self.seconds))
    }
}

impl From<FixedOffset> for UtcOffset {
    fn from(offset: FixedOffset) -> Self {
        Self::from_seconds(offset.local_minus_utc())
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.seconds >= 0 { '+' } else { '-' };
        let abs = self.seconds.abs();
        let hours = abs / 3600;
        let minutes = (abs % 3600) / 60;
        let seconds = abs % 60;
        write!(f, "{sign}{hours:02}{minutes:02}")?;
        if seconds != 0 {
            write!(f, "{seconds:02}")?;
        }
        Ok(())
    }
}

/// A DATE or DATE-TIME in one of its four forms.
///
/// The TZID parameter of the owning line is folded into [`Self::Zoned`];
/// it is put back on the line when the value is encoded again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DateTimeValue {
    /// All-day value: `19970714`.
    Date(NaiveDate),
    /// Wall-clock time in no particular zone: `19980118T230000`.
    Floating(NaiveDateTime),
    /// Absolute instant: `19980119T070000Z`.
    Utc(DateTime<Utc>),
    /// Wall-clock time in a named zone: `TZID=America/New_York:19980119T020000`.
    Zoned { local: NaiveDateTime, tzid: String },
}

impl DateTimeValue {
    #[must_use]
    pub fn zoned(local: NaiveDateTime, tzid: impl Into<String>) -> Self {
        Self::Zoned {
            local,
            tzid: tzid.into(),
        }
    }

    #[must_use]
    pub fn utc(local: NaiveDateTime) -> Self {
        Self::Utc(local.and_utc())
    }

    /// Returns whether this is a date without time.
    #[must_use]
    pub const fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// Returns whether the value names an absolute instant.
    #[must_use]
    pub const fn is_aware(&self) -> bool {
        matches!(self, Self::Utc(_) | Self::Zoned { .. })
    }

    /// Returns the TZID parameter this value needs, if any.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match self {
            Self::Zoned { tzid, .. } => Some(tzid),
            _ => None,
        }
    }

    /// Wall-clock reading; dates read as midnight.
    #[must_use]
    pub fn local(&self) -> NaiveDateTime {
        match self {
            Self::Date(date) => date.and_time(NaiveTime::MIN),
            Self::Floating(local) | Self::Zoned { local, .. } => *local,
            Self::Utc(instant) => instant.naive_utc(),
        }
    }

    /// Returns the wire form of the value (without any TZID).
    #[must_use]
    pub fn to_wire(&self) -> String {
        match self {
            Self::Date(date) => date.format(DATE_FORMAT).to_string(),
            Self::Floating(local) | Self::Zoned { local, .. } => {
                local.format(DATE_TIME_FORMAT).to_string()
            }
            Self::Utc(instant) => format!("{}Z", instant.format(DATE_TIME_FORMAT)),
        }
    }
}

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Self::Zoned { tzid, .. } = self {
            write!(f, "TZID={tzid}:")?;
        }
        write!(f, "{}", self.to_wire())
    }
}

/// End of a PERIOD: an explicit instant or a length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodEnd {
    At(DateTimeValue),
    Lasting(Duration),
}

/// PERIOD value (RFC 5545 §3.3.9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub start: DateTimeValue,
    pub end: PeriodEnd,
}

impl Period {
    /// Returns the wire form, e.g. `20060216T100000/PT2H`.
    #[must_use]
    pub fn to_wire(&self) -> String {
        match &self.end {
            PeriodEnd::At(end) => format!("{}/{}", self.start.to_wire(), end.to_wire()),
            PeriodEnd::Lasting(duration) => format!("{}/{duration}", self.start.to_wire()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(hh, mm, ss))
            .unwrap()
    }

    #[test]
    fn offset_display() {
        assert_eq!(UtcOffset::from_seconds(5 * 3600 + 1800).to_string(), "+0530");
        assert_eq!(UtcOffset::from_seconds(-8 * 3600).to_string(), "-0800");
        assert_eq!(UtcOffset::UTC.to_string(), "+0000");
        assert_eq!(UtcOffset::from_seconds(3600 + 61).to_string(), "+010101");
    }

    #[test]
    fn wire_forms() {
        let at = local(2006, 2, 16, 10, 0, 0);
        assert_eq!(DateTimeValue::Floating(at).to_wire(), "20060216T100000");
        assert_eq!(DateTimeValue::utc(at).to_wire(), "20060216T100000Z");
        assert_eq!(
            DateTimeValue::zoned(at, "US/Pacific").to_string(),
            "TZID=US/Pacific:20060216T100000"
        );
        assert_eq!(DateTimeValue::Date(at.date()).to_wire(), "20060216");
    }

    #[test]
    fn awareness() {
        let at = local(2006, 2, 16, 10, 0, 0);
        assert!(!DateTimeValue::Floating(at).is_aware());
        assert!(!DateTimeValue::Date(at.date()).is_aware());
        assert!(DateTimeValue::utc(at).is_aware());
        assert!(DateTimeValue::zoned(at, "Europe/Berlin").is_aware());
    }

    #[test]
    fn period_with_duration() {
        let period = Period {
            start: DateTimeValue::Floating(local(2006, 2, 16, 10, 0, 0)),
            end: PeriodEnd::Lasting(Duration::hours(2)),
        };
        assert_eq!(period.to_wire(), "20060216T100000/PT2H");
    }
}
