//! Reading text into component trees.
//!
//! [`LogicalLines`] unfolds the input, [`parse_line`] tokenizes each logical
//! line and [`Roots`] frames the result into components. The `values`
//! decoders are used by the behaviors when a line is made native.

mod error;
mod lexer;
mod options;
mod reader;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use lexer::{LineTokens, LogicalLine, LogicalLines, parse_line};
pub use options::{CompatFlags, ParseOptions};
pub use reader::{Roots, is_framing_error};
pub use values::{
    parse_date, parse_date_or_datetime, parse_datetime, parse_datetime_list, parse_duration,
    parse_period, parse_period_list, parse_utc_offset,
};
