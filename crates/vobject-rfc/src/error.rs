use thiserror::Error;

use crate::rfc::parse::ParseError;

/// Cardinality, grouping and per-line validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidateError {
    #[error("{component} requires at least {min} {child}, found {found}")]
    TooFew {
        component: String,
        child: String,
        min: u32,
        found: u32,
    },

    #[error("{component} allows at most {max} {child}, found {found}")]
    TooMany {
        component: String,
        child: String,
        max: u32,
        found: u32,
    },

    #[error("{component} allows at most {max} {child} for LANGUAGE={language}, found {found}")]
    TooManyForLanguage {
        component: String,
        child: String,
        language: String,
        max: u32,
        found: u32,
    },

    #[error("{line} has more than one LANGUAGE value")]
    MultipleLanguages { line: String },

    #[error("{name} is not recognized inside {component}")]
    Unrecognized { component: String, name: String },

    #[error("group {group:?} not allowed on {name}")]
    GroupNotAllowed { name: String, group: String },

    #[error("invalid {name}: {reason}")]
    InvalidLine { name: String, reason: String },
}

/// Failures converting between wire and native values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NativeError {
    #[error("{name} has no encoder for its native value")]
    NoInverse { name: String },

    #[error("cannot decode {name}: {reason}")]
    Decode { name: String, reason: String },

    #[error("{name} holds a native value of the wrong kind for its behavior")]
    Mismatch { name: String },
}

/// Failures building an occurrence sequence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("{component} has recurrence lines but no DTSTART")]
    MissingDtstart { component: String },

    #[error("{component} mixes floating and zoned date-times")]
    MixedAwareness { component: String },

    #[error("{component} has an invalid recurrence rule: {message}")]
    InvalidRule { component: String, message: String },

    #[error("{component} needs a value that is not decoded: {name}")]
    NotNative { component: String, name: String },
}

/// Failures resolving or synthesizing timezones.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimezoneError {
    #[error("unknown timezone {tzid:?} in {component}")]
    UnknownZone { component: String, tzid: String },

    #[error("VTIMEZONE {tzid:?} is malformed: {reason}")]
    Malformed { tzid: String, reason: String },

    #[error("VTIMEZONE has no TZID")]
    MissingTzid,

    #[error("local time {local} does not exist in {tzid}")]
    Unrepresentable { tzid: String, local: String },
}

/// Crate-level error.
#[derive(Error, Debug)]
pub enum VObjectError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validate(#[from] ValidateError),

    #[error(transparent)]
    Native(#[from] NativeError),

    #[error(transparent)]
    Recurrence(#[from] RecurrenceError),

    #[error(transparent)]
    Timezone(#[from] TimezoneError),

    /// A group label on a node whose behavior forbids groups.
    #[error("{name} may not carry group {group:?}")]
    GroupNotAllowed { name: String, group: String },

    #[error("no behavior registered for {0}")]
    UnknownBehavior(String),

    /// Structural misuse of the API.
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Core(#[from] vobject_core::error::CoreError),
}

pub type VObjectResult<T> = std::result::Result<T, VObjectError>;
