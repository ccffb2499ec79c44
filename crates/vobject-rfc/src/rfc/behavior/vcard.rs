//! vCard 3.0 behaviors (RFC 2426), reading 2.1 input as well.

use vobject_core::constants::VCARD_VERSION;
use vobject_core::types::Format;

use super::{Behavior, BehaviorRef, ChildSpec, DecodeContext, Registry, codec, engine};
use crate::error::{NativeError, VObjectError, VObjectResult};
use crate::rfc::build::{SerializeOptions, escape_text};
use crate::rfc::core::{
    Address, Component, ContentLine, Name, NativeValue, Organization, Value,
};

const VERSION: Option<&str> = Some(VCARD_VERSION);

fn mismatch(line: &ContentLine) -> VObjectError {
    NativeError::Mismatch {
        name: line.name.clone(),
    }
    .into()
}

/// Text that may arrive quoted-printable or base64 encoded.
///
/// Also the default for any vCard line without a more specific behavior.
#[derive(Debug)]
pub struct VCardText {
    name: &'static str,
}

impl Behavior for VCardText {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> Option<&'static str> {
        VERSION
    }

    fn has_native(&self) -> bool {
        true
    }

    fn allow_group(&self) -> bool {
        true
    }

    fn decodes_transfer_encoding(&self) -> bool {
        true
    }

    fn to_native(&self, line: &mut ContentLine, ctx: DecodeContext) -> VObjectResult<()> {
        let raw = line.raw_value().unwrap_or_default();
        let native = if codec::is_base64(line) {
            let bytes = codec::decode_base64(raw).map_err(|reason| NativeError::Decode {
                name: line.name.clone(),
                reason,
            })?;
            codec::clear_transfer_encoding(line);
            NativeValue::Binary(bytes)
        } else {
            NativeValue::Text(codec::unescape(raw, ctx))
        };
        line.value = native.into();
        Ok(())
    }

    fn from_native(&self, line: &mut ContentLine) -> VObjectResult<()> {
        match line.value.as_native().cloned() {
            Some(NativeValue::Text(text)) => {
                line.value = Value::Raw(escape_text(&text));
                Ok(())
            }
            Some(NativeValue::Binary(bytes)) => {
                let encoded = codec::encode_base64(line, &bytes, Format::VCard);
                line.value = Value::Raw(encoded);
                Ok(())
            }
            _ => Err(mismatch(line)),
        }
    }
}

/// Shared shape of the structured vCard properties.
fn decode_structured(line: &ContentLine, ctx: DecodeContext) -> Vec<Vec<String>> {
    codec::split_structured(line.raw_value().unwrap_or_default(), ctx)
}

/// N: family;given;additional;prefix;suffix.
#[derive(Debug)]
pub struct NameProperty;

impl Behavior for NameProperty {
    fn name(&self) -> &'static str {
        "N"
    }

    fn version(&self) -> Option<&'static str> {
        VERSION
    }

    fn has_native(&self) -> bool {
        true
    }

    fn allow_group(&self) -> bool {
        true
    }

    fn decodes_transfer_encoding(&self) -> bool {
        true
    }

    fn to_native(&self, line: &mut ContentLine, ctx: DecodeContext) -> VObjectResult<()> {
        line.value = Name::from_fields(decode_structured(line, ctx)).into();
        Ok(())
    }

    fn from_native(&self, line: &mut ContentLine) -> VObjectResult<()> {
        let Some(NativeValue::Name(name)) = line.value.as_native() else {
            return Err(mismatch(line));
        };
        line.value = Value::Raw(codec::join_structured(&name.fields()));
        Ok(())
    }
}

/// ADR: box;extended;street;city;region;code;country.
#[derive(Debug)]
pub struct AddressProperty;

impl Behavior for AddressProperty {
    fn name(&self) -> &'static str {
        "ADR"
    }

    fn version(&self) -> Option<&'static str> {
        VERSION
    }

    fn has_native(&self) -> bool {
        true
    }

    fn allow_group(&self) -> bool {
        true
    }

    fn decodes_transfer_encoding(&self) -> bool {
        true
    }

    fn to_native(&self, line: &mut ContentLine, ctx: DecodeContext) -> VObjectResult<()> {
        line.value = Address::from_fields(decode_structured(line, ctx)).into();
        Ok(())
    }

    fn from_native(&self, line: &mut ContentLine) -> VObjectResult<()> {
        let Some(NativeValue::Address(address)) = line.value.as_native() else {
            return Err(mismatch(line));
        };
        line.value = Value::Raw(codec::join_structured(&address.fields()));
        Ok(())
    }
}

/// ORG: organization name followed by unit names, `;`-separated.
#[derive(Debug)]
pub struct OrgProperty;

impl Behavior for OrgProperty {
    fn name(&self) -> &'static str {
        "ORG"
    }

    fn version(&self) -> Option<&'static str> {
        VERSION
    }

    fn has_native(&self) -> bool {
        true
    }

    fn allow_group(&self) -> bool {
        true
    }

    fn decodes_transfer_encoding(&self) -> bool {
        true
    }

    fn to_native(&self, line: &mut ContentLine, ctx: DecodeContext) -> VObjectResult<()> {
        let items = codec::split_list(line.raw_value().unwrap_or_default(), ';', ctx);
        line.value = NativeValue::Org(Organization::from_items(items)).into();
        Ok(())
    }

    fn from_native(&self, line: &mut ContentLine) -> VObjectResult<()> {
        let Some(NativeValue::Org(org)) = line.value.as_native() else {
            return Err(mismatch(line));
        };
        line.value = Value::Raw(codec::join_list(&org.items(), ';'));
        Ok(())
    }
}

#[derive(Debug)]
pub struct VCardComponent;

const CARD_CHILDREN: &[ChildSpec] = &[
    ChildSpec::optional("N"),
    ChildSpec::optional("FN"),
    ChildSpec::one("VERSION"),
    ChildSpec::optional("PRODID"),
    ChildSpec::many("LABEL"),
    ChildSpec::many("UID"),
    ChildSpec::many("ADR"),
    ChildSpec::many("ORG"),
    ChildSpec::many("PHOTO"),
    ChildSpec::many("CATEGORIES"),
];

static DEFAULT_TEXT: VCardText = VCardText { name: "" };

impl Behavior for VCardComponent {
    fn name(&self) -> &'static str {
        "VCARD"
    }

    fn version(&self) -> Option<&'static str> {
        VERSION
    }

    fn is_component(&self) -> bool {
        true
    }

    fn allow_group(&self) -> bool {
        true
    }

    fn known_children(&self) -> &'static [ChildSpec] {
        CARD_CHILDREN
    }

    fn sort_first(&self) -> &'static [&'static str] {
        &["version", "prodid", "uid"]
    }

    fn default_behavior(&self) -> Option<BehaviorRef> {
        Some(&DEFAULT_TEXT)
    }

    fn generate_implicit(
        &self,
        component: &mut Component,
        options: &SerializeOptions,
    ) -> VObjectResult<()> {
        if component.line("VERSION").is_none() {
            let mut line = ContentLine::new("VERSION", NativeValue::Text(VCARD_VERSION.to_string()));
            line.behavior = Some(engine::resolve_line(component, "VERSION", options.registry));
            component.push_line(line);
        }
        Ok(())
    }
}

pub static VCARD: VCardComponent = VCardComponent;

static TEXT_PROPERTIES: [VCardText; 3] = [
    VCardText { name: "FN" },
    VCardText { name: "LABEL" },
    VCardText { name: "PHOTO" },
];

static N: NameProperty = NameProperty;
static ADR: AddressProperty = AddressProperty;
static ORG: OrgProperty = OrgProperty;

/// Registers every vCard behavior.
pub fn register(registry: &mut Registry) {
    registry.register(&VCARD, false);
    for behavior in &TEXT_PROPERTIES {
        registry.register(behavior, false);
    }
    registry.register(&N, false);
    registry.register(&ADR, false);
    registry.register(&ORG, false);
}
