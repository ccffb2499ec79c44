//! Per-name behaviors: validation schema, value codec and implicit fields.
//!
//! A [`Behavior`] is a stateless policy object. The [`Registry`] maps
//! uppercased names to behaviors; [`engine`] walks a tree and applies them.

use std::fmt;

use crate::error::{NativeError, ValidateError, VObjectResult};
use crate::rfc::build::SerializeOptions;
use crate::rfc::core::{Component, ContentLine};
use crate::rfc::parse::CompatFlags;

pub mod codec;
pub mod engine;
pub mod icalendar;
mod registry;
pub mod vcard;

pub use registry::Registry;

/// Shared handle to a registered behavior.
pub type BehaviorRef = &'static dyn Behavior;

/// Schema entry for one child name of a component behavior.
#[derive(Clone, Copy)]
pub struct ChildSpec {
    pub name: &'static str,
    pub min: u32,
    /// `None` means unbounded.
    pub max: Option<u32>,
    /// Overrides the registry for this name inside the parent.
    pub behavior: Option<BehaviorRef>,
}

impl ChildSpec {
    #[must_use]
    pub const fn new(name: &'static str, min: u32, max: Option<u32>) -> Self {
        Self {
            name,
            min,
            max,
            behavior: None,
        }
    }

    /// Exactly one occurrence.
    #[must_use]
    pub const fn one(name: &'static str) -> Self {
        Self::new(name, 1, Some(1))
    }

    /// Zero or one occurrence.
    #[must_use]
    pub const fn optional(name: &'static str) -> Self {
        Self::new(name, 0, Some(1))
    }

    /// Any number of occurrences.
    #[must_use]
    pub const fn many(name: &'static str) -> Self {
        Self::new(name, 0, None)
    }

    #[must_use]
    pub const fn with_behavior(mut self, behavior: BehaviorRef) -> Self {
        self.behavior = Some(behavior);
        self
    }
}

impl fmt::Debug for ChildSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildSpec")
            .field("name", &self.name)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("behavior", &self.behavior.map(|b| b.name()))
            .finish()
    }
}

/// Per-line state handed to [`Behavior::to_native`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeContext {
    pub compat: CompatFlags,
    /// The raw value has already been through quoted-printable decoding.
    pub from_quoted_printable: bool,
}

/// Policy for one property or component name.
///
/// Every method has a pass-through default so concrete behaviors only
/// override what they need.
pub trait Behavior: fmt::Debug + Send + Sync {
    /// Uppercased name this behavior is registered under.
    fn name(&self) -> &'static str;

    /// Version string, for names registered more than once.
    fn version(&self) -> Option<&'static str> {
        None
    }

    fn is_component(&self) -> bool {
        false
    }

    /// Whether [`Self::to_native`] does anything.
    fn has_native(&self) -> bool {
        false
    }

    fn allow_group(&self) -> bool {
        false
    }

    /// Whether quoted-printable or base64 values are decoded for this name.
    fn decodes_transfer_encoding(&self) -> bool {
        false
    }

    /// Child schema used for validation and parent-scoped overrides.
    fn known_children(&self) -> &'static [ChildSpec] {
        &[]
    }

    /// Lowercase child names serialized before anything else, in order.
    fn sort_first(&self) -> &'static [&'static str] {
        &[]
    }

    /// Behavior for children that neither the schema nor the registry know.
    fn default_behavior(&self) -> Option<BehaviorRef> {
        None
    }

    /// Whether LANGUAGE-localized copies of a child count separately.
    fn counts_per_language(&self, child: &str) -> bool {
        matches!(child, "NAME" | "SUMMARY" | "DESCRIPTION" | "LOCATION")
    }

    /// Line-specific checks.
    ///
    /// ## Errors
    /// Returns the first problem found.
    fn validate_line(&self, _line: &ContentLine) -> Result<(), ValidateError> {
        Ok(())
    }

    /// Decodes a raw value in place. Only called on raw values.
    ///
    /// ## Errors
    /// Returns an error if the raw value cannot be decoded.
    fn to_native(&self, _line: &mut ContentLine, _ctx: DecodeContext) -> VObjectResult<()> {
        Ok(())
    }

    /// Encodes a native value in place. Only called on native values.
    ///
    /// ## Errors
    /// Returns [`NativeError::NoInverse`] unless overridden.
    fn from_native(&self, line: &mut ContentLine) -> VObjectResult<()> {
        Err(NativeError::NoInverse {
            name: line.name.clone(),
        }
        .into())
    }

    /// Adds required fields that are missing. Never overwrites.
    ///
    /// ## Errors
    /// Returns an error if a generated value cannot be built.
    fn generate_implicit(
        &self,
        _component: &mut Component,
        _options: &SerializeOptions,
    ) -> VObjectResult<()> {
        Ok(())
    }
}
