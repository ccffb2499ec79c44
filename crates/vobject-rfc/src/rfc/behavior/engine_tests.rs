//! Tests for behavior assignment, transforms, validation and implicit
//! generation.

use super::*;
use crate::rfc::behavior::{ChildSpec, icalendar, vcard};
use crate::rfc::core::{DateTimeValue, NativeValue};

#[derive(Debug)]
struct Shouty;

impl Behavior for Shouty {
    fn name(&self) -> &'static str {
        "X-SHOUT"
    }

    fn has_native(&self) -> bool {
        true
    }

    fn to_native(&self, line: &mut ContentLine, _ctx: DecodeContext) -> VObjectResult<()> {
        let raw = line.raw_value().unwrap_or_default().to_ascii_uppercase();
        line.value = NativeValue::Text(raw).into();
        Ok(())
    }
}

static SHOUTY: Shouty = Shouty;

#[derive(Debug)]
struct Loud;

const LOUD_CHILDREN: &[ChildSpec] = &[ChildSpec::many("NOTE").with_behavior(&SHOUTY)];

impl Behavior for Loud {
    fn name(&self) -> &'static str {
        "X-LOUD"
    }

    fn is_component(&self) -> bool {
        true
    }

    fn known_children(&self) -> &'static [ChildSpec] {
        LOUD_CHILDREN
    }
}

static LOUD: Loud = Loud;

fn registry() -> &'static Registry {
    Registry::standard()
}

fn event() -> Component {
    let mut event = Component::new("VEVENT");
    event.behavior = Some(&icalendar::VEVENT);
    event
}

fn assigned(mut component: Component) -> Component {
    assign_root(&mut component, registry());
    component
}

#[test]
fn parent_schema_override_wins() {
    let mut parent = Component::new("X-LOUD");
    parent.behavior = Some(&LOUD);
    assert_eq!(resolve_line(&parent, "note", registry()).name(), "X-SHOUT");
    assert_eq!(resolve_line(&parent, "SUMMARY", registry()).name(), "SUMMARY");
}

#[test]
fn vcard_lines_fall_back_to_card_text() {
    let mut card = Component::new("VCARD");
    card.behavior = Some(&vcard::VCARD);
    let behavior = resolve_line(&card, "NOTE", registry());
    assert!(behavior.name().is_empty());
    assert!(behavior.has_native());
    assert!(behavior.allow_group());
}

#[test]
fn unknown_lines_pass_through() {
    let behavior = resolve_line(&event(), "X-WR-CALNAME", registry());
    assert!(behavior.name().is_empty());
    assert!(!behavior.has_native());
}

#[test]
fn unknown_roots_get_the_generic_component() {
    assert!(resolve_root("", registry()).is_none());
    let behavior = resolve_root("X-THING", registry()).unwrap();
    assert!(behavior.is_component());
    assert!(behavior.known_children().is_empty());
    assert_eq!(resolve_root("vcalendar", registry()).map(|b| b.name()), Some("VCALENDAR"));
}

#[test]
fn names_component_uses_registry_and_schema() {
    let calendar = new_calendar();
    assert!(names_component(&calendar, "vevent", registry()));
    assert!(!names_component(&calendar, "SUMMARY", registry()));
}

fn new_calendar() -> Component {
    let mut calendar = Component::new("VCALENDAR");
    calendar.behavior = Some(&icalendar::VCALENDAR);
    calendar
}

#[test]
fn assign_reaches_every_node() {
    let mut calendar = Component::new("VCALENDAR");
    let mut event = Component::new("VEVENT");
    event.push_line(ContentLine::raw("DTSTART", "20260101T090000Z"));
    let mut alarm = Component::new("VALARM");
    alarm.push_line(ContentLine::raw("TRIGGER", "-PT15M"));
    event.push_child(alarm);
    calendar.push_child(event);

    let calendar = assigned(calendar);
    assert_eq!(calendar.behavior.map(|b| b.name()), Some("VCALENDAR"));
    let event = calendar.child("VEVENT").unwrap();
    assert_eq!(event.line("DTSTART").and_then(|l| l.behavior).map(|b| b.name()), Some("DTSTART"));
    let alarm = event.child("VALARM").unwrap();
    assert_eq!(alarm.behavior.map(|b| b.name()), Some("VALARM"));
    assert_eq!(alarm.line("TRIGGER").and_then(|l| l.behavior).map(|b| b.name()), Some("TRIGGER"));
}

#[test]
fn assign_keeps_existing_behaviors() {
    let mut parent = Component::new("VEVENT");
    let mut line = ContentLine::raw("NOTE", "quiet");
    line.behavior = Some(&SHOUTY);
    parent.push_line(line);
    let parent = assigned(parent);
    assert_eq!(parent.line("NOTE").and_then(|l| l.behavior).map(|b| b.name()), Some("X-SHOUT"));
}

#[test]
fn to_native_is_idempotent() {
    let mut line = ContentLine::raw("X-SHOUT", "hello");
    line.behavior = Some(&SHOUTY);
    to_native(&mut line, CompatFlags::default()).unwrap();
    assert_eq!(line.value.as_text(), Some("HELLO"));
    to_native(&mut line, CompatFlags::default()).unwrap();
    assert_eq!(line.value.as_text(), Some("HELLO"));
}

#[test]
fn decode_failure_leaves_line_raw_and_names_the_line() {
    let mut line = ContentLine::raw("DTSTART", "not-a-date");
    line.line_number = Some(7);
    line.behavior = Some(resolve_line(&event(), "DTSTART", registry()));
    let error = to_native(&mut line, CompatFlags::default()).unwrap_err();
    let VObjectError::Parse(parse) = error else {
        panic!("expected parse error, got {error:?}");
    };
    assert_eq!(parse.line, 7);
    assert_eq!(line.raw_value(), Some("not-a-date"));
}

#[test]
fn from_native_without_behavior_has_no_inverse() {
    let mut line = ContentLine::new("X-ANY", NativeValue::Text("x".into()));
    assert!(matches!(
        from_native(&mut line),
        Err(VObjectError::Native(NativeError::NoInverse { .. }))
    ));
}

#[test]
fn from_native_with_one_way_behavior_has_no_inverse() {
    let mut line = ContentLine::raw("X-SHOUT", "a");
    line.behavior = Some(&SHOUTY);
    to_native(&mut line, CompatFlags::default()).unwrap();
    assert!(matches!(
        from_native(&mut line),
        Err(VObjectError::Native(NativeError::NoInverse { .. }))
    ));
}

#[test]
fn tree_transforms_tolerate_bad_values_when_asked() {
    let mut event = Component::new("VEVENT");
    event.push_line(ContentLine::raw("DTSTART", "garbage"));
    event.push_line(ContentLine::raw("SUMMARY", "a\\, b"));
    let mut event = assigned(event);

    assert!(to_native_tree(&mut event.clone(), CompatFlags::default(), false).is_err());
    to_native_tree(&mut event, CompatFlags::default(), true).unwrap();
    assert_eq!(event.line("DTSTART").and_then(|l| l.raw_value()), Some("garbage"));
    assert_eq!(event.line("SUMMARY").and_then(|l| l.value.as_text()), Some("a, b"));

    from_native_tree(&mut event).unwrap();
    assert_eq!(event.line("SUMMARY").and_then(|l| l.raw_value()), Some("a\\, b"));
}

fn valid_event() -> Component {
    let mut event = Component::new("VEVENT");
    event.push_line(ContentLine::raw("UID", "1@example.com"));
    event.push_line(ContentLine::raw("DTSTAMP", "20260101T000000Z"));
    assigned(event)
}

#[test]
fn valid_event_passes() {
    assert!(validate(&valid_event(), ValidateOptions::raising()).unwrap());
}

#[test]
fn missing_required_line() {
    let mut event = valid_event();
    event.remove_lines("UID");
    assert!(matches!(
        validate(&event, ValidateOptions::raising()),
        Err(VObjectError::Validate(ValidateError::TooFew { min: 1, found: 0, .. }))
    ));
}

#[test_log::test]
fn non_raising_validation_reports_to_observer() {
    let mut event = valid_event();
    event.add_line(ContentLine::raw("UID", "2@example.com"));
    let mut seen = Vec::new();
    let ok = validate_with(&event, ValidateOptions::default(), &mut |e| seen.push(e.clone())).unwrap();
    assert!(!ok);
    assert!(matches!(
        seen.as_slice(),
        [ValidateError::TooMany { max: 1, found: 2, .. }]
    ));
}

#[test]
fn localized_summaries_count_per_language() {
    let mut event = valid_event();
    let mut english = ContentLine::raw("SUMMARY", "Meeting");
    english.set_param("LANGUAGE", vec!["en".into()]);
    let mut german = ContentLine::raw("SUMMARY", "Besprechung");
    german.set_param("LANGUAGE", vec!["de".into()]);
    event.add_line(english.clone());
    event.add_line(german);
    assert!(validate(&event, ValidateOptions::raising()).unwrap());

    event.add_line(english);
    assert!(matches!(
        validate(&event, ValidateOptions::raising()),
        Err(VObjectError::Validate(ValidateError::TooManyForLanguage { .. }))
    ));
}

#[test]
fn several_languages_on_one_line() {
    let mut line = ContentLine::raw("SUMMARY", "x");
    line.set_param("LANGUAGE", vec!["en".into(), "de".into()]);
    assert!(matches!(
        validate_line(&line, ValidateOptions::raising()),
        Err(VObjectError::Validate(ValidateError::MultipleLanguages { .. }))
    ));
    assert!(!validate_line(&line, ValidateOptions::default()).unwrap());
}

#[test]
fn group_on_icalendar_line_is_always_fatal() {
    let mut event = valid_event();
    event.add_line(ContentLine::raw("SUMMARY", "x").in_group("item1"));
    assert!(matches!(
        validate(&event, ValidateOptions::default()),
        Err(VObjectError::GroupNotAllowed { .. })
    ));
}

#[test]
fn group_on_vcard_line_is_fine() {
    let mut card = Component::new("VCARD");
    card.push_line(ContentLine::raw("VERSION", "3.0"));
    card.push_line(ContentLine::raw("TEL", "555").in_group("item1"));
    let card = assigned(card);
    assert!(validate(&card, ValidateOptions::raising()).unwrap());
}

#[test]
fn unrecognized_names_only_when_asked() {
    let mut event = valid_event();
    event.add_line(ContentLine::raw("FOO", "x"));
    event.add_line(ContentLine::raw("X-FOO", "x"));
    assert!(validate(&event, ValidateOptions::raising()).unwrap());

    let strict = ValidateOptions {
        raise: true,
        complain_unrecognized: true,
    };
    assert!(matches!(
        validate(&event, strict),
        Err(VObjectError::Validate(ValidateError::Unrecognized { name, .. })) if name == "FOO"
    ));
}

#[test]
fn implicit_fields_are_added_once() {
    let mut calendar = new_calendar();
    let mut event = Component::new("VEVENT");
    event.push_line(ContentLine::raw("UID", "keep-me"));
    event.push_line(ContentLine::new(
        "DTSTART",
        DateTimeValue::Floating(
            chrono::NaiveDate::from_ymd_opt(2026, 3, 1)
                .and_then(|d| d.and_hms_opt(9, 0, 0))
                .unwrap(),
        ),
    ));
    calendar.push_child(event);
    let mut alarm_owner = Component::new("VTODO");
    alarm_owner.push_child(Component::new("VALARM"));
    calendar.push_child(alarm_owner);

    let options = SerializeOptions::default();
    generate_implicit_tree(&mut calendar, &options).unwrap();
    generate_implicit_tree(&mut calendar, &options).unwrap();

    assert_eq!(calendar.text("PRODID"), Some(options.prodid.as_str()));
    assert_eq!(calendar.lines("VERSION").count(), 1);
    let event = calendar.child("VEVENT").unwrap();
    assert_eq!(event.text("UID"), Some("keep-me"));
    assert_eq!(event.lines("DTSTAMP").count(), 1);
    assert!(matches!(
        event.line("DTSTAMP").and_then(|l| l.value.as_datetime()),
        Some(DateTimeValue::Utc(_))
    ));

    let todo = calendar.child("VTODO").unwrap();
    assert!(todo.text("UID").is_some_and(|uid| uid.ends_with(vobject_core::constants::UID_DOMAIN)));
    let alarm = todo.child("VALARM").unwrap();
    assert_eq!(alarm.text("ACTION"), Some("AUDIO"));
    assert!(alarm.line("TRIGGER").and_then(|l| l.value.as_duration()).is_some());
    assert!(validate(&calendar, ValidateOptions::raising()).unwrap());
}
