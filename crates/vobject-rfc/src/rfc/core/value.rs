//! Property values: wire form or decoded native form.

use super::datetime::{DateTimeValue, Period};
use super::duration::Duration;
use super::structured::{Address, Name, Organization};

/// A decoded property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeValue {
    /// Unescaped TEXT.
    Text(String),
    /// Comma- or semicolon-separated TEXT items, unescaped.
    TextList(Vec<String>),
    /// Decoded base64 payload.
    Binary(Vec<u8>),
    DateTime(DateTimeValue),
    /// EXDATE / RDATE lists.
    DateTimeList(Vec<DateTimeValue>),
    Duration(Duration),
    /// FREEBUSY and `RDATE;VALUE=PERIOD`.
    Periods(Vec<Period>),
    Name(Name),
    Address(Address),
    Org(Organization),
}

/// A line's value, either still escaped as on the wire or decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Raw(String),
    Native(NativeValue),
}

impl Value {
    #[must_use]
    pub const fn is_native(&self) -> bool {
        matches!(self, Self::Native(_))
    }

    /// Returns the wire string, if not decoded.
    #[must_use]
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Self::Raw(raw) => Some(raw),
            Self::Native(_) => None,
        }
    }

    #[must_use]
    pub const fn as_native(&self) -> Option<&NativeValue> {
        match self {
            Self::Native(native) => Some(native),
            Self::Raw(_) => None,
        }
    }

    /// Returns decoded TEXT, if this is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Native(NativeValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_datetime(&self) -> Option<&DateTimeValue> {
        match self {
            Self::Native(NativeValue::DateTime(value)) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_datetimes(&self) -> Option<&[DateTimeValue]> {
        match self {
            Self::Native(NativeValue::DateTimeList(values)) => Some(values),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_duration(&self) -> Option<&Duration> {
        match self {
            Self::Native(NativeValue::Duration(value)) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Native(NativeValue::TextList(items)) => Some(items),
            _ => None,
        }
    }
}

impl From<NativeValue> for Value {
    fn from(native: NativeValue) -> Self {
        Self::Native(native)
    }
}

impl From<DateTimeValue> for Value {
    fn from(value: DateTimeValue) -> Self {
        Self::Native(NativeValue::DateTime(value))
    }
}

impl From<Duration> for Value {
    fn from(value: Duration) -> Self {
        Self::Native(NativeValue::Duration(value))
    }
}

impl From<Name> for Value {
    fn from(value: Name) -> Self {
        Self::Native(NativeValue::Name(value))
    }
}

impl From<Address> for Value {
    fn from(value: Address) -> Self {
        Self::Native(NativeValue::Address(value))
    }
}
