//! Component framing over logical lines.

use vobject_core::error::CoreError;

use super::error::{ParseError, ParseErrorKind};
use super::lexer::{LogicalLine, LogicalLines, parse_line};
use super::options::ParseOptions;
use crate::error::{VObjectError, VObjectResult};
use crate::rfc::behavior::engine::{self, ValidateOptions};
use crate::rfc::core::{Component, ContentLine, UnreadableLine};

/// Lazy sequence of the root components in a document.
///
/// Each `BEGIN`/`END` block at the top level is one item; a document with
/// properties but no `BEGIN` yields one unnamed root. The sequence ends
/// after the first error.
pub struct Roots<'a> {
    lines: LogicalLines<'a>,
    options: ParseOptions,
    stack: Vec<Component>,
    /// Unreadable lines seen before any root opened.
    pending: Vec<UnreadableLine>,
    last_line: usize,
    done: bool,
}

impl<'a> Roots<'a> {
    #[must_use]
    pub fn new(input: &'a str, options: ParseOptions) -> Self {
        Self {
            lines: LogicalLines::new(input),
            options,
            stack: Vec::new(),
            pending: Vec::new(),
            last_line: 0,
            done: false,
        }
    }

    fn open(&mut self, mut component: Component) {
        if self.stack.is_empty() {
            component.unreadable_lines.append(&mut self.pending);
        }
        self.stack.push(component);
    }

    fn skip(&mut self, line: LogicalLine, error: &ParseError) {
        tracing::warn!(line = line.number, %error, "Skipping unreadable line");
        let unreadable = UnreadableLine {
            number: line.number,
            text: line.text,
            reason: error.to_string(),
        };
        match self.stack.last_mut() {
            Some(top) => top.unreadable_lines.push(unreadable),
            None => self.pending.push(unreadable),
        }
    }

    /// Handles one logical line; returns a root when one closes.
    fn step(&mut self, line: LogicalLine) -> VObjectResult<Option<Component>> {
        let tokens = match parse_line(&line.text, line.number, self.options.compat) {
            Ok(tokens) => tokens,
            Err(error) if self.options.tolerant => {
                self.skip(line, &error);
                return Ok(None);
            }
            Err(error) => return Err(error.into()),
        };

        match tokens.name.as_str() {
            "BEGIN" => {
                let mut component = Component::new(tokens.value.trim());
                component.group = tokens.group;
                component.line_number = Some(line.number);
                tracing::trace!(name = %component.name, line = line.number, "BEGIN");
                self.open(component);
                Ok(None)
            }
            "END" => {
                let name = tokens.value.trim();
                let Some(top) = self.stack.pop() else {
                    let error = ParseError::new(ParseErrorKind::UnmatchedEnd, line.number, 1)
                        .with_context(format!("END:{name}"));
                    if self.options.tolerant {
                        self.skip(line, &error);
                        return Ok(None);
                    }
                    return Err(error.into());
                };
                if !top.name.eq_ignore_ascii_case(name) {
                    return Err(ParseError::new(
                        ParseErrorKind::MismatchedComponent,
                        line.number,
                        1,
                    )
                    .with_context(format!("expected END:{}, got END:{name}", top.name))
                    .into());
                }
                match self.stack.last_mut() {
                    Some(parent) => {
                        parent.push_child(top);
                        Ok(None)
                    }
                    None => Ok(Some(top)),
                }
            }
            _ => {
                let content = ContentLine::from_tokens(tokens, line.number);
                if self.stack.is_empty() {
                    tracing::debug!(line = line.number, "Property outside BEGIN, opening unnamed root");
                    self.open(Component::unnamed());
                }
                if let Some(top) = self.stack.last_mut() {
                    top.push_line(content);
                }
                Ok(None)
            }
        }
    }

    /// Deals with components still open at the end of input.
    fn at_eof(&mut self) -> VObjectResult<Option<Component>> {
        let Some(innermost) = self.stack.last() else {
            if !self.pending.is_empty() {
                tracing::warn!(count = self.pending.len(), "Dropping unreadable lines outside any component");
            }
            return Ok(None);
        };

        if !self.options.tolerant && !innermost.is_unnamed() {
            return Err(ParseError::new(ParseErrorKind::UnterminatedComponent, self.last_line, 1)
                .with_context(format!("missing END:{}", innermost.name))
                .into());
        }

        while self.stack.len() > 1 {
            let child = self
                .stack
                .pop()
                .ok_or(CoreError::InvariantViolation("open component stack underflow"))?;
            tracing::warn!(name = %child.name, "Closing unterminated component");
            self.stack
                .last_mut()
                .ok_or(CoreError::InvariantViolation("open component without parent"))?
                .push_child(child);
        }
        Ok(self.stack.pop())
    }

    fn finish(&self, mut root: Component) -> VObjectResult<Component> {
        engine::assign_root(&mut root, self.options.registry);
        if self.options.transform {
            engine::to_native_tree(&mut root, self.options.compat, self.options.tolerant)?;
        }
        if self.options.validate {
            engine::validate(&root, ValidateOptions::raising())?;
        }
        tracing::debug!(name = %root.name, behavior = root.behavior.is_some(), "Read root component");
        Ok(root)
    }
}

impl Iterator for Roots<'_> {
    type Item = VObjectResult<Component>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let closed = loop {
            let Some(line) = self.lines.next() else {
                self.done = true;
                break self.at_eof();
            };
            self.last_line = line.number;
            match self.step(line) {
                Ok(None) => {}
                other => break other,
            }
        };

        let result = match closed {
            Ok(Some(root)) => self.finish(root),
            Ok(None) => return None,
            Err(error) => Err(error),
        };
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

impl std::iter::FusedIterator for Roots<'_> {}

/// Whether `error` came from framing rather than a single line.
#[must_use]
pub fn is_framing_error(error: &VObjectError) -> bool {
    matches!(
        error,
        VObjectError::Parse(ParseError {
            kind: ParseErrorKind::MismatchedComponent
                | ParseErrorKind::UnmatchedEnd
                | ParseErrorKind::UnterminatedComponent,
            ..
        })
    )
}
