//! Document model: components, content lines, parameters and values.

mod component;
mod content_line;
mod datetime;
mod duration;
mod parameter;
mod structured;
mod value;

pub use component::{Added, Component, UnreadableLine};
pub use content_line::ContentLine;
pub use datetime::{DateTimeValue, Period, PeriodEnd, UtcOffset};
pub use duration::Duration;
pub use parameter::Parameter;
pub use structured::{Address, Name, Organization};
pub use value::{NativeValue, Value};
