//! Derived views: occurrence sequences and timezone offset tables.

pub mod recurrence;
pub mod synthesize;
pub mod timezone;
pub mod vtimezone;

pub use recurrence::{Occurrence, Occurrences, RecurrenceSet, occurrences, occurrences_in, occurrences_with};
pub use synthesize::{SynthesisWindow, from_offset_source};
pub use timezone::{
    OffsetSource, TimezoneResolver, Transition, Zone, local_to_utc, normalize_tzid,
    referenced_tzids, resolve_named,
};
pub use vtimezone::{Observance, ObservanceKind, VTimezone, nth_weekday};
