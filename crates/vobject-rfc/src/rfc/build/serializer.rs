//! Tree serializer.
//!
//! Works on a clone: implicit fields are generated, the tree is validated,
//! native values are encoded, then children are written in `sort_first`
//! order followed by insertion order.

use vobject_core::config::Settings;
use vobject_core::constants::{DEFAULT_LINE_LENGTH, DEFAULT_PRODID};

use super::fold::fold_line;
use crate::error::VObjectResult;
use crate::rfc::behavior::Registry;
use crate::rfc::behavior::engine::{self, ValidateOptions};
use crate::rfc::core::{Component, ContentLine};
use crate::rfc::expand::SynthesisWindow;

/// Options for [`serialize`].
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// Maximum octets per physical line.
    pub line_length: usize,
    /// Validate before writing, failing on the first problem.
    pub validate: bool,
    /// PRODID for calendars that lack one.
    pub prodid: String,
    /// Years covered by synthesized VTIMEZONE blocks.
    pub window: SynthesisWindow,
    pub registry: &'static Registry,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            line_length: DEFAULT_LINE_LENGTH,
            validate: true,
            prodid: DEFAULT_PRODID.to_string(),
            window: SynthesisWindow::default(),
            registry: Registry::standard(),
        }
    }
}

impl SerializeOptions {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            line_length: settings.serialize.line_length,
            validate: settings.serialize.validate,
            prodid: settings
                .serialize
                .prodid
                .clone()
                .unwrap_or_else(|| DEFAULT_PRODID.to_string()),
            window: SynthesisWindow::from(&settings.timezone),
            registry: Registry::standard(),
        }
    }
}

/// ## Summary
/// Serializes a component tree to folded, CRLF-terminated text.
///
/// The input is not modified; native values stay native.
///
/// ## Errors
/// Returns an error if implicit generation fails, validation fails (when
/// enabled), or a native value has no encoder.
#[tracing::instrument(skip(component, options), fields(name = %component.name))]
pub fn serialize(component: &Component, options: &SerializeOptions) -> VObjectResult<String> {
    let mut work = component.clone();
    if work.behavior.is_none() {
        work.behavior = engine::resolve_root(&work.name, options.registry);
    }
    engine::assign(&mut work, options.registry);
    engine::generate_implicit_tree(&mut work, options)?;

    if options.validate {
        engine::validate(&work, ValidateOptions::raising())?;
    }
    engine::from_native_tree(&mut work)?;

    let mut out = String::new();
    write_component(&mut out, &work, options.line_length);
    tracing::debug!(bytes = out.len(), "Serialized component");
    Ok(out)
}

/// ## Summary
/// Serializes one line, folded and CRLF-terminated.
///
/// ## Errors
/// Returns an error if the line holds a native value its behavior cannot
/// encode.
pub fn serialize_line(line: &ContentLine, width: usize) -> VObjectResult<String> {
    if line.value.is_native() {
        let mut encoded = line.clone();
        engine::from_native(&mut encoded)?;
        return Ok(fold_line(&unfolded_line(&encoded), width));
    }
    Ok(fold_line(&unfolded_line(line), width))
}

fn unfolded_line(line: &ContentLine) -> String {
    let mut out = String::new();
    if let Some(group) = &line.group {
        out.push_str(group);
        out.push('.');
    }
    out.push_str(&line.name);
    for param in line.params() {
        out.push(';');
        out.push_str(&param.to_string());
    }
    for singleton in &line.singletons {
        out.push(';');
        out.push_str(singleton);
    }
    out.push(':');
    out.push_str(line.raw_value().unwrap_or_default());
    out
}

fn write_component(out: &mut String, component: &Component, width: usize) {
    let prefix = component
        .group
        .as_ref()
        .map(|g| format!("{g}."))
        .unwrap_or_default();
    if !component.is_unnamed() {
        out.push_str(&fold_line(&format!("{prefix}BEGIN:{}", component.name), width));
    }

    let first = component.behavior.map(|b| b.sort_first()).unwrap_or_default();
    let is_first = |name: &str| first.iter().any(|f| f.eq_ignore_ascii_case(name));

    for name in first {
        for line in component.lines(name) {
            out.push_str(&fold_line(&unfolded_line(line), width));
        }
        for child in component.children_named(name) {
            write_component(out, child, width);
        }
    }
    for line in component.all_lines().iter().filter(|l| !is_first(&l.name)) {
        out.push_str(&fold_line(&unfolded_line(line), width));
    }
    for child in component.children().iter().filter(|c| !is_first(&c.name)) {
        write_component(out, child, width);
    }

    if !component.is_unnamed() {
        out.push_str(&fold_line(&format!("{prefix}END:{}", component.name), width));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::core::{DateTimeValue, NativeValue};

    fn options() -> SerializeOptions {
        SerializeOptions {
            validate: false,
            ..SerializeOptions::default()
        }
    }

    #[test]
    fn singletons_follow_params() {
        let mut line = ContentLine::raw("EMAIL", "john@nowhere.com");
        line.add_param_value("TYPE", "HOME");
        line.add_singleton("PREF");
        assert_eq!(
            serialize_line(&line, 75).unwrap(),
            "EMAIL;TYPE=HOME;PREF:john@nowhere.com\r\n"
        );
    }

    #[test]
    fn param_values_with_separators_are_quoted() {
        let mut line = ContentLine::raw("DESCRIPTION", "x");
        line.set_param("ALTREP", vec!["http://www.wiz.org;;".into(), "Blah".into()]);
        assert_eq!(
            serialize_line(&line, 75).unwrap(),
            "DESCRIPTION;ALTREP=\"http://www.wiz.org;;\",Blah:x\r\n"
        );
    }

    #[test]
    fn group_prefixes_begin_and_end() {
        let mut card = Component::new("VCARD");
        card.group = Some("home".into());
        card.push_line(ContentLine::raw("FN", "Jane").in_group("home"));
        let text = serialize(&card, &options()).unwrap();
        assert!(text.starts_with("home.BEGIN:VCARD\r\n"));
        assert!(text.contains("home.FN:Jane\r\n"));
        assert!(text.ends_with("home.END:VCARD\r\n"));
    }

    #[test]
    fn unnamed_root_has_no_frame() {
        let mut root = Component::unnamed();
        root.push_line(ContentLine::raw("FOO", "bar"));
        assert_eq!(serialize(&root, &options()).unwrap(), "FOO:bar\r\n");
    }

    #[test]
    fn source_tree_stays_native() {
        let mut event = Component::new("VEVENT");
        let at = chrono::NaiveDate::from_ymd_opt(2006, 2, 16)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .unwrap();
        event.add_line(ContentLine::new("DTSTART", DateTimeValue::Floating(at)));
        event.add_line(ContentLine::new("SUMMARY", NativeValue::Text("a, b".into())));

        let text = serialize(&event, &options()).unwrap();
        assert!(text.contains("DTSTART:20060216T100000\r\n"));
        assert!(text.contains("SUMMARY:a\\, b\r\n"));
        assert!(event.line("DTSTART").unwrap().value.is_native());
    }

    #[test]
    fn sort_first_then_insertion_order() {
        let mut event = Component::new("VEVENT");
        event.add_line(ContentLine::raw("SUMMARY", "s"));
        event.add_line(ContentLine::raw("DTSTART", "20060216T100000"));
        event.add_line(ContentLine::raw("UID", "u"));
        event.add_line(ContentLine::raw("DTSTAMP", "20060216T100000Z"));
        let text = serialize(&event, &options()).unwrap();
        let names: Vec<&str> = text
            .lines()
            .filter_map(|l| l.split([':', ';']).next())
            .collect();
        assert_eq!(
            names,
            ["BEGIN", "UID", "DTSTART", "SUMMARY", "DTSTAMP", "END"]
        );
    }

    #[test]
    fn settings_map_onto_options() {
        let mut settings = Settings::defaults().unwrap();
        settings.serialize.line_length = 40;
        settings.serialize.prodid = Some("-//Test//EN".into());
        settings.timezone.synthesis_start_year = 2000;
        let options = SerializeOptions::from_settings(&settings);
        assert_eq!(options.line_length, 40);
        assert_eq!(options.prodid, "-//Test//EN");
        assert_eq!(options.window.start_year, 2000);
        assert!(options.validate);

        let defaults = SerializeOptions::from_settings(&Settings::defaults().unwrap());
        assert_eq!(defaults.prodid, DEFAULT_PRODID);
    }
}
