//! Parse error types shared by the tokenizer, the framing reader and the
//! value decoders.

use std::fmt;

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Error raised while reading content lines or decoding their values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Kind of error.
    pub kind: ParseErrorKind,
    /// Logical line number where the error occurred (1-based).
    pub line: usize,
    /// Column number where the error occurred (1-based).
    pub column: usize,
    /// Additional context about the error.
    pub context: Option<String>,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, line: usize, column: usize) -> Self {
        Self {
            kind,
            line,
            column,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Moves a value-level error onto the line it came from.
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}, column {}", self.kind, self.line, self.column)?;
        if let Some(ref ctx) = self.context {
            write!(f, ": {ctx}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Kinds of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Unexpected end of input.
    UnexpectedEof,
    /// Missing property name.
    MissingPropertyName,
    /// Invalid property name character.
    InvalidPropertyName,
    /// Missing colon separator.
    MissingColon,
    /// Invalid parameter format.
    InvalidParameter,
    /// Unclosed quoted string.
    UnclosedQuote,
    /// Invalid date format.
    InvalidDate,
    /// Invalid date-time format.
    InvalidDateTime,
    /// Invalid duration format.
    InvalidDuration,
    /// Invalid period format.
    InvalidPeriod,
    /// Invalid UTC offset format.
    InvalidUtcOffset,
    /// Invalid property value.
    InvalidValue,
    /// Quoted-printable, base64 or charset decoding failed.
    InvalidEncoding,
    /// `END` name does not match the open component.
    MismatchedComponent,
    /// `END` with no open component.
    UnmatchedEnd,
    /// Input ended with components still open.
    UnterminatedComponent,
    /// More than one root where exactly one was expected.
    MultipleRoots,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::MissingPropertyName => write!(f, "missing property name"),
            Self::InvalidPropertyName => write!(f, "invalid property name"),
            Self::MissingColon => write!(f, "missing colon separator"),
            Self::InvalidParameter => write!(f, "invalid parameter format"),
            Self::UnclosedQuote => write!(f, "unclosed quoted string"),
            Self::InvalidDate => write!(f, "invalid date format"),
            Self::InvalidDateTime => write!(f, "invalid date-time format"),
            Self::InvalidDuration => write!(f, "invalid duration format"),
            Self::InvalidPeriod => write!(f, "invalid period format"),
            Self::InvalidUtcOffset => write!(f, "invalid UTC offset format"),
            Self::InvalidValue => write!(f, "invalid property value"),
            Self::InvalidEncoding => write!(f, "invalid value encoding"),
            Self::MismatchedComponent => write!(f, "mismatched BEGIN/END"),
            Self::UnmatchedEnd => write!(f, "END without matching BEGIN"),
            Self::UnterminatedComponent => write!(f, "component not terminated"),
            Self::MultipleRoots => write!(f, "more than one root component"),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
