//! Applies behaviors to a tree: assignment, value transforms, validation
//! and implicit-field generation.

use std::collections::HashMap;

use super::codec;
use super::{Behavior, BehaviorRef, DecodeContext, Registry};
use crate::error::{NativeError, VObjectError, VObjectResult, ValidateError};
use crate::rfc::build::{SerializeOptions, escape_text};
use crate::rfc::core::{Component, ContentLine, Value};
use crate::rfc::parse::{CompatFlags, ParseError, ParseErrorKind};

/// Keeps the raw value untouched. Used when nothing else matches.
#[derive(Debug)]
struct PassThrough;

impl Behavior for PassThrough {
    fn name(&self) -> &'static str {
        ""
    }

    /// Decoded text put on an unknown line by a caller is escaped back.
    fn from_native(&self, line: &mut ContentLine) -> VObjectResult<()> {
        let text = line.value.as_text().ok_or_else(|| NativeError::Mismatch {
            name: line.name.clone(),
        })?;
        line.value = Value::Raw(escape_text(text));
        Ok(())
    }
}

/// Component with no schema. Used when nothing else matches.
#[derive(Debug)]
struct AnyComponent;

impl Behavior for AnyComponent {
    fn name(&self) -> &'static str {
        ""
    }

    fn is_component(&self) -> bool {
        true
    }
}

static PASS_THROUGH: PassThrough = PassThrough;
static ANY_COMPONENT: AnyComponent = AnyComponent;

/// Property behavior used when nothing more specific is registered.
#[must_use]
pub fn fallback_property() -> BehaviorRef {
    &PASS_THROUGH
}

/// Component behavior used when nothing more specific is registered.
#[must_use]
pub fn fallback_component() -> BehaviorRef {
    &ANY_COMPONENT
}

fn override_for(parent: &Component, name: &str) -> Option<BehaviorRef> {
    parent.behavior?.known_children().iter().find_map(|spec| {
        spec.behavior
            .filter(|_| spec.name.eq_ignore_ascii_case(name))
    })
}

fn parent_version(parent: &Component) -> Option<&'static str> {
    parent.behavior.and_then(|b| b.version())
}

/// Behavior for a property named `name` inside `parent`.
///
/// Order: the parent's schema override, the registry, the parent's default,
/// the registry's property fallback.
#[must_use]
pub fn resolve_line(parent: &Component, name: &str, registry: &Registry) -> BehaviorRef {
    override_for(parent, name)
        .filter(|b| !b.is_component())
        .or_else(|| registry.property(name, parent_version(parent)))
        .or_else(|| parent.behavior.and_then(|b| b.default_behavior()))
        .or_else(|| registry.default_property())
        .unwrap_or(&PASS_THROUGH)
}

/// Behavior for a component named `name` inside `parent`.
#[must_use]
pub fn resolve_component(parent: &Component, name: &str, registry: &Registry) -> BehaviorRef {
    override_for(parent, name)
        .filter(|b| b.is_component())
        .or_else(|| registry.component(name, parent_version(parent)))
        .or_else(|| registry.default_component())
        .unwrap_or(&ANY_COMPONENT)
}

/// Behavior for a top-level component.
#[must_use]
pub fn resolve_root(name: &str, registry: &Registry) -> Option<BehaviorRef> {
    if name.is_empty() {
        return None;
    }
    registry
        .component(name, None)
        .or_else(|| registry.default_component())
        .or(Some(&ANY_COMPONENT))
}

/// Whether adding `name` under `parent` should create a component.
#[must_use]
pub fn names_component(parent: &Component, name: &str, registry: &Registry) -> bool {
    override_for(parent, name).is_some_and(|b| b.is_component())
        || registry.component(name, parent_version(parent)).is_some()
}

/// Gives every node below `component` a behavior, top-down.
///
/// Nodes that already have one keep it.
pub fn assign(component: &mut Component, registry: &Registry) {
    let line_behaviors: Vec<Option<BehaviorRef>> = component
        .all_lines()
        .iter()
        .map(|line| {
            line.behavior
                .is_none()
                .then(|| resolve_line(component, &line.name, registry))
        })
        .collect();
    for (line, behavior) in component.all_lines_mut().iter_mut().zip(line_behaviors) {
        if let Some(behavior) = behavior {
            line.behavior = Some(behavior);
        }
    }

    let child_behaviors: Vec<Option<BehaviorRef>> = component
        .children()
        .iter()
        .map(|child| {
            child
                .behavior
                .is_none()
                .then(|| resolve_component(component, &child.name, registry))
        })
        .collect();
    for (child, behavior) in component.children_mut().iter_mut().zip(child_behaviors) {
        if let Some(behavior) = behavior {
            child.behavior = Some(behavior);
        }
        assign(child, registry);
    }
}

/// Assigns the root's own behavior, then everything below it.
pub fn assign_root(root: &mut Component, registry: &Registry) {
    if root.behavior.is_none() {
        root.behavior = resolve_root(&root.name, registry);
    }
    assign(root, registry);
}

/// Decodes one line in place. A no-op on native values and on behaviors
/// without a native form.
///
/// The line is left untouched on failure.
///
/// ## Errors
/// Returns a [`ParseError`] carrying the line number if the value cannot
/// be decoded.
pub fn to_native(line: &mut ContentLine, compat: CompatFlags) -> VObjectResult<()> {
    if line.value.is_native() {
        return Ok(());
    }
    let Some(behavior) = line.behavior.filter(|b| b.has_native()) else {
        return Ok(());
    };

    let mut work = line.clone();
    let mut ctx = DecodeContext {
        compat,
        from_quoted_printable: false,
    };

    if behavior.decodes_transfer_encoding() && codec::is_quoted_printable(&work) {
        let raw = work.raw_value().unwrap_or_default();
        let text = codec::decode_quoted_printable(raw, work.param_value("CHARSET")).map_err(
            |reason| {
                ParseError::new(ParseErrorKind::InvalidEncoding, work.line_number.unwrap_or(0), 1)
                    .with_context(format!("{}: {reason}", work.name))
            },
        )?;
        work.value = Value::Raw(text);
        codec::clear_transfer_encoding(&mut work);
        ctx.from_quoted_printable = true;
    }

    behavior.to_native(&mut work, ctx).map_err(|e| match e {
        VObjectError::Parse(err) => VObjectError::Parse(err.at_line(work.line_number.unwrap_or(0))),
        other => other,
    })?;
    *line = work;
    Ok(())
}

/// Encodes one line in place. A no-op on raw values.
///
/// ## Errors
/// Returns [`NativeError::NoInverse`] if the line has no behavior able to
/// encode its value.
pub fn from_native(line: &mut ContentLine) -> VObjectResult<()> {
    if !line.value.is_native() {
        return Ok(());
    }
    let Some(behavior) = line.behavior else {
        return Err(NativeError::NoInverse {
            name: line.name.clone(),
        }
        .into());
    };
    behavior.from_native(line)
}

/// Decodes every line of the tree.
///
/// In tolerant mode a line that fails to decode stays raw and is logged.
///
/// ## Errors
/// Returns the first decoding failure when not tolerant.
pub fn to_native_tree(
    component: &mut Component,
    compat: CompatFlags,
    tolerant: bool,
) -> VObjectResult<()> {
    for line in component.all_lines_mut() {
        if let Err(error) = to_native(line, compat) {
            if !tolerant {
                return Err(error);
            }
            tracing::warn!(name = %line.name, %error, "Keeping undecodable value raw");
        }
    }
    for child in component.children_mut() {
        to_native_tree(child, compat, tolerant)?;
    }
    Ok(())
}

/// Encodes every line of the tree.
///
/// ## Errors
/// Returns the first line that cannot be encoded.
pub fn from_native_tree(component: &mut Component) -> VObjectResult<()> {
    for line in component.all_lines_mut() {
        from_native(line)?;
    }
    for child in component.children_mut() {
        from_native_tree(child)?;
    }
    Ok(())
}

/// Runs implicit-field generation, parents before children.
///
/// ## Errors
/// Returns the first generation failure.
pub fn generate_implicit_tree(
    component: &mut Component,
    options: &SerializeOptions,
) -> VObjectResult<()> {
    if let Some(behavior) = component.behavior {
        behavior.generate_implicit(component, options)?;
    }
    assign(component, options.registry);
    for child in component.children_mut() {
        generate_implicit_tree(child, options)?;
    }
    Ok(())
}

/// How [`validate`] reports problems.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptions {
    /// Fail with the first problem instead of returning `Ok(false)`.
    pub raise: bool,
    /// Treat non-`X-` names without a specific behavior as problems.
    pub complain_unrecognized: bool,
}

impl ValidateOptions {
    #[must_use]
    pub const fn raising() -> Self {
        Self {
            raise: true,
            complain_unrecognized: false,
        }
    }
}

/// Validates a component tree.
///
/// ## Errors
/// Returns [`VObjectError::GroupNotAllowed`] for a group where the behavior
/// forbids one, regardless of `options.raise`. Other problems are errors
/// only when `options.raise` is set.
pub fn validate(component: &Component, options: ValidateOptions) -> VObjectResult<bool> {
    validate_with(component, options, &mut |_| {})
}

/// Like [`validate`], reporting each problem to `observer` as well.
///
/// ## Errors
/// See [`validate`].
pub fn validate_with(
    component: &Component,
    options: ValidateOptions,
    observer: &mut dyn FnMut(&ValidateError),
) -> VObjectResult<bool> {
    match check_component(component, options) {
        Ok(()) => Ok(true),
        Err(Failure::Fatal(error)) => Err(error),
        Err(Failure::Invalid(error)) => {
            observer(&error);
            if options.raise {
                return Err(error.into());
            }
            tracing::warn!(component = %component.name, %error, "Validation failed");
            Ok(false)
        }
    }
}

/// Validates a single line.
///
/// ## Errors
/// See [`validate`].
pub fn validate_line(line: &ContentLine, options: ValidateOptions) -> VObjectResult<bool> {
    match check_line(line, "", options) {
        Ok(()) => Ok(true),
        Err(Failure::Fatal(error)) => Err(error),
        Err(Failure::Invalid(error)) if options.raise => Err(error.into()),
        Err(Failure::Invalid(error)) => {
            tracing::warn!(line = %line.name, %error, "Validation failed");
            Ok(false)
        }
    }
}

enum Failure {
    Fatal(VObjectError),
    Invalid(ValidateError),
}

impl From<ValidateError> for Failure {
    fn from(error: ValidateError) -> Self {
        Self::Invalid(error)
    }
}

fn check_group(
    name: &str,
    group: Option<&String>,
    behavior: Option<BehaviorRef>,
) -> Result<(), Failure> {
    match (group, behavior) {
        (Some(group), Some(b)) if !b.allow_group() => Err(Failure::Fatal(
            VObjectError::GroupNotAllowed {
                name: name.to_string(),
                group: group.clone(),
            },
        )),
        _ => Ok(()),
    }
}

fn is_unrecognized(name: &str, behavior: Option<BehaviorRef>) -> bool {
    !name.to_ascii_uppercase().starts_with("X-") && behavior.is_none_or(|b| b.name().is_empty())
}

fn check_line(line: &ContentLine, parent: &str, options: ValidateOptions) -> Result<(), Failure> {
    check_group(&line.name, line.group.as_ref(), line.behavior)?;

    if options.complain_unrecognized && is_unrecognized(&line.name, line.behavior) {
        return Err(ValidateError::Unrecognized {
            component: parent.to_string(),
            name: line.name.clone(),
        }
        .into());
    }
    if line.param_values("LANGUAGE").len() > 1 {
        return Err(ValidateError::MultipleLanguages {
            line: line.name.clone(),
        }
        .into());
    }
    if let Some(behavior) = line.behavior {
        behavior.validate_line(line)?;
    }
    Ok(())
}

fn check_component(component: &Component, options: ValidateOptions) -> Result<(), Failure> {
    check_group(&component.name, component.group.as_ref(), component.behavior)?;

    if options.complain_unrecognized
        && !component.is_unnamed()
        && is_unrecognized(&component.name, component.behavior)
    {
        return Err(ValidateError::Unrecognized {
            component: String::new(),
            name: component.name.clone(),
        }
        .into());
    }

    for line in component.all_lines() {
        check_line(line, &component.name, options)?;
    }
    for child in component.children() {
        check_component(child, options)?;
    }

    let Some(behavior) = component.behavior else {
        return Ok(());
    };
    for spec in behavior.known_children() {
        let found = count_named(component, spec.name);
        if found < spec.min {
            return Err(ValidateError::TooFew {
                component: component.name.clone(),
                child: spec.name.to_string(),
                min: spec.min,
                found,
            }
            .into());
        }
        let Some(max) = spec.max else {
            continue;
        };
        if behavior.counts_per_language(spec.name) {
            for (language, found) in count_per_language(component, spec.name) {
                if found > max {
                    return Err(ValidateError::TooManyForLanguage {
                        component: component.name.clone(),
                        child: spec.name.to_string(),
                        language,
                        max,
                        found,
                    }
                    .into());
                }
            }
        } else if found > max {
            return Err(ValidateError::TooMany {
                component: component.name.clone(),
                child: spec.name.to_string(),
                max,
                found,
            }
            .into());
        }
    }
    Ok(())
}

fn count_named(component: &Component, name: &str) -> u32 {
    let total = component.lines(name).count() + component.children_named(name).count();
    u32::try_from(total).unwrap_or(u32::MAX)
}

fn count_per_language(component: &Component, name: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for line in component.lines(name) {
        let language = line
            .param_value("LANGUAGE")
            .unwrap_or_default()
            .to_ascii_lowercase();
        *counts.entry(language).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
