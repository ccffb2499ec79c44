//! iCalendar (RFC 5545) and vCard (RFC 2425/2426) object model.
//!
//! Text is read with [`parse_all`] or [`parse_one`] into [`Component`]
//! trees whose lines are decoded by their behaviors, and written back with
//! [`serialize`].

pub mod behavior;
pub mod build;
pub mod core;
pub mod expand;
pub mod parse;
pub mod tools;

#[cfg(test)]
mod tests;

pub use build::{SerializeOptions, serialize};

use crate::error::VObjectResult;
use crate::rfc::behavior::{Registry, engine};
use crate::rfc::core::Component;
use crate::rfc::parse::{ParseError, ParseErrorKind, ParseOptions, Roots};

/// ## Summary
/// Lazily reads every root component in `input`.
///
/// Nothing is read until the sequence is advanced. After an error the
/// sequence ends.
#[must_use]
pub fn parse_all<'a>(input: &'a str, options: &ParseOptions) -> Roots<'a> {
    Roots::new(input, *options)
}

/// ## Summary
/// Reads exactly one root component.
///
/// ## Errors
/// Returns the first parse, decode or validation error. Input without a
/// root fails with [`ParseErrorKind::UnexpectedEof`]. A second root fails
/// with [`ParseErrorKind::MultipleRoots`] unless `options.tolerant`, in
/// which case it is ignored.
#[tracing::instrument(skip(input, options), fields(input_len = input.len(), tolerant = options.tolerant))]
pub fn parse_one(input: &str, options: &ParseOptions) -> VObjectResult<Component> {
    let mut roots = parse_all(input, options);
    let Some(first) = roots.next() else {
        tracing::warn!("No component in input");
        return Err(ParseError::new(ParseErrorKind::UnexpectedEof, 1, 1).into());
    };
    let first = first?;

    if let Some(second) = roots.next() {
        let line = match &second {
            Ok(root) => root.line_number.unwrap_or(1),
            Err(_) => 1,
        };
        if !options.tolerant {
            return Err(ParseError::new(ParseErrorKind::MultipleRoots, line, 1)
                .with_context(format!("{} after {}", name_of(&second), first.name))
                .into());
        }
        tracing::warn!(line, "Ignoring components after the first");
    }
    Ok(first)
}

fn name_of(root: &VObjectResult<Component>) -> &str {
    match root {
        Ok(component) => &component.name,
        Err(_) => "unreadable component",
    }
}

/// ## Summary
/// Creates an empty top-level component with the behavior registered for
/// `name`, falling back to the generic component behavior.
#[must_use]
pub fn new_component(name: &str, version: Option<&str>) -> Component {
    let registry = Registry::standard();
    let mut component = Component::new(name);
    component.behavior = registry
        .component(&component.name, version)
        .or_else(|| engine::resolve_root(&component.name, registry));
    component
}
