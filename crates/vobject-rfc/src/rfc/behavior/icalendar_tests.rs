use chrono::{NaiveDate, NaiveDateTime};

use super::*;
use crate::rfc::core::{Duration, PeriodEnd};
use crate::rfc::parse::CompatFlags;

fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(hh, mm, ss))
        .unwrap()
}

fn event_line(name: &str, raw: &str) -> ContentLine {
    let mut event = Component::new("VEVENT");
    event.behavior = Some(&VEVENT);
    let mut line = ContentLine::raw(name, raw);
    line.behavior = Some(engine::resolve_line(&event, name, Registry::standard()));
    line
}

fn decoded(mut line: ContentLine) -> ContentLine {
    engine::to_native(&mut line, CompatFlags::default()).unwrap();
    line
}

fn encoded(mut line: ContentLine) -> ContentLine {
    engine::from_native(&mut line).unwrap();
    line
}

#[test]
fn text_unescapes_and_escapes_back() {
    let line = decoded(event_line("DESCRIPTION", "Line one\\nLine two\\; with\\, marks\\\\"));
    assert_eq!(line.value.as_text(), Some("Line one\nLine two; with, marks\\"));
    let line = encoded(line);
    assert_eq!(line.raw_value(), Some("Line one\\nLine two\\; with\\, marks\\\\"));
}

#[test]
fn categories_split_on_unescaped_commas() {
    let line = decoded(event_line("CATEGORIES", "APPOINTMENT,EDUCATION\\, TRAINING"));
    assert_eq!(
        line.value.as_list(),
        Some(&["APPOINTMENT".to_string(), "EDUCATION, TRAINING".to_string()][..])
    );
}

#[test]
fn request_status_splits_on_semicolons() {
    let line = decoded(event_line("REQUEST-STATUS", "2.0;Success"));
    assert_eq!(line.value.as_list().map(<[String]>::len), Some(2));
    assert_eq!(encoded(line).raw_value(), Some("2.0;Success"));
}

#[test]
fn zoned_dtstart_folds_tzid_into_the_value() {
    let mut line = event_line("DTSTART", "20060216T100000");
    line.set_param("TZID", vec!["US/Pacific".into()]);
    let line = decoded(line);
    assert!(!line.has_param("TZID"));
    assert_eq!(
        line.value.as_datetime(),
        Some(&DateTimeValue::zoned(at(2006, 2, 16, 10, 0, 0), "US/Pacific"))
    );

    let line = encoded(line);
    assert_eq!(line.param_value("TZID"), Some("US/Pacific"));
    assert_eq!(line.raw_value(), Some("20060216T100000"));
}

#[test]
fn all_day_dtstart() {
    let mut line = event_line("DTSTART", "20060216");
    line.set_param("VALUE", vec!["DATE".into()]);
    let line = decoded(line);
    assert!(line.value.as_datetime().is_some_and(DateTimeValue::is_date));
    let line = encoded(line);
    assert_eq!(line.param_value("VALUE"), Some("DATE"));
    assert_eq!(line.raw_value(), Some("20060216"));
}

#[test]
fn utc_only_properties_write_utc() {
    let mut line = event_line("DTSTAMP", "x");
    line.value = DateTimeValue::zoned(at(2006, 7, 1, 12, 0, 0), "America/New_York").into();
    let line = encoded(line);
    assert!(!line.has_param("TZID"));
    assert_eq!(line.raw_value(), Some("20060701T160000Z"));
}

#[test]
fn dtstart_keeps_zone_on_write() {
    let mut line = event_line("DTSTART", "x");
    line.value = DateTimeValue::zoned(at(2006, 7, 1, 12, 0, 0), "America/New_York").into();
    assert_eq!(encoded(line).raw_value(), Some("20060701T120000"));
}

#[test]
fn exdate_list_shares_one_tzid() {
    let mut line = event_line("EXDATE", "20060102T090000,20060103T090000");
    line.set_param("TZID", vec!["Europe/Paris".into()]);
    let line = decoded(line);
    let values = line.value.as_datetimes().unwrap();
    assert_eq!(values.len(), 2);
    assert!(values.iter().all(|v| v.tzid() == Some("Europe/Paris")));

    let line = encoded(line);
    assert_eq!(line.param_value("TZID"), Some("Europe/Paris"));
    assert_eq!(line.raw_value(), Some("20060102T090000,20060103T090000"));
}

#[test]
fn rdate_periods() {
    let mut line = event_line("RDATE", "19960403T020000Z/19960403T040000Z,19960404T010000Z/PT3H");
    line.set_param("VALUE", vec!["PERIOD".into()]);
    let line = decoded(line);
    let Some(NativeValue::Periods(periods)) = line.value.as_native() else {
        panic!("not periods: {:?}", line.value);
    };
    assert_eq!(periods[1].end, PeriodEnd::Lasting(Duration::hours(3)));

    let line = encoded(line);
    assert_eq!(line.param_value("VALUE"), Some("PERIOD"));
    assert_eq!(
        line.raw_value(),
        Some("19960403T020000Z/19960403T040000Z,19960404T010000Z/PT3H")
    );
}

#[test]
fn durations() {
    let line = decoded(event_line("DURATION", "PT2H"));
    assert_eq!(line.value.as_duration(), Some(&Duration::hours(2)));
    let line = decoded(event_line("DURATION", "-P1D"));
    assert_eq!(line.value.as_duration(), Some(&Duration::days(1).negate()));
    assert_eq!(encoded(line).raw_value(), Some("-P1D"));
}

#[test]
fn trigger_forms() {
    let relative = decoded(event_line("TRIGGER", "-PT15M"));
    assert_eq!(relative.value.as_duration(), Some(&Duration::minutes(15).negate()));

    let mut absolute = event_line("TRIGGER", "19980403T120000Z");
    absolute.set_param("VALUE", vec!["DATE-TIME".into()]);
    let absolute = decoded(absolute);
    assert_eq!(
        absolute.value.as_datetime(),
        Some(&DateTimeValue::utc(at(1998, 4, 3, 12, 0, 0)))
    );
    let absolute = encoded(absolute);
    assert_eq!(absolute.param_value("VALUE"), Some("DATE-TIME"));

    let bare = decoded(event_line("TRIGGER", "19980403T120000Z"));
    assert!(bare.value.as_datetime().is_some());

    let mut bad = event_line("TRIGGER", "soon");
    assert!(engine::to_native(&mut bad, CompatFlags::default()).is_err());
}

#[test]
fn freebusy_period_with_duration() {
    let line = decoded(event_line("FREEBUSY", "20060216T100000Z/PT2H"));
    let Some(NativeValue::Periods(periods)) = line.value.as_native() else {
        panic!("not periods: {:?}", line.value);
    };
    assert_eq!(periods[0].start, DateTimeValue::utc(at(2006, 2, 16, 10, 0, 0)));
    assert_eq!(periods[0].end, PeriodEnd::Lasting(Duration::hours(2)));
    assert_eq!(encoded(line).raw_value(), Some("20060216T100000Z/PT2H"));
}

#[test]
fn rrule_stays_raw() {
    let line = decoded(event_line("RRULE", "FREQ=WEEKLY;COUNT=2"));
    assert_eq!(line.raw_value(), Some("FREQ=WEEKLY;COUNT=2"));
}

fn calendar_with_zoned_event(tzid: &str) -> Component {
    let mut calendar = crate::rfc::new_component("VCALENDAR", None);
    let mut event = Component::new("VEVENT");
    event.push_line(ContentLine::new(
        "DTSTART",
        DateTimeValue::zoned(at(2026, 6, 1, 9, 0, 0), tzid),
    ));
    calendar.add_child(event);
    calendar
}

#[test_log::test]
fn calendar_synthesizes_referenced_timezones() {
    let mut calendar = calendar_with_zoned_event("Europe/Berlin");
    let options = SerializeOptions::default();
    engine::generate_implicit_tree(&mut calendar, &options).unwrap();

    let vtimezone = calendar.child("VTIMEZONE").unwrap();
    assert_eq!(vtimezone.text("TZID"), Some("Europe/Berlin"));
    assert_eq!(vtimezone.behavior.map(|b| b.name()), Some("VTIMEZONE"));
    assert!(vtimezone.child("STANDARD").is_some());
    assert!(vtimezone.child("DAYLIGHT").is_some());

    engine::generate_implicit_tree(&mut calendar, &options).unwrap();
    assert_eq!(calendar.children_named("VTIMEZONE").count(), 1);
}

#[test]
fn unknown_zones_are_not_synthesized() {
    let mut calendar = calendar_with_zoned_event("Nowhere/Special");
    engine::generate_implicit_tree(&mut calendar, &SerializeOptions::default()).unwrap();
    assert!(calendar.child("VTIMEZONE").is_none());
}

#[test]
fn defined_timezones_are_kept() {
    let mut calendar = calendar_with_zoned_event("Europe/Berlin");
    let mut vtimezone = Component::new("VTIMEZONE");
    vtimezone.push_line(ContentLine::raw("TZID", "Europe/Berlin"));
    calendar.add_child(vtimezone);
    engine::generate_implicit_tree(&mut calendar, &SerializeOptions::default()).unwrap();
    assert_eq!(calendar.children_named("VTIMEZONE").count(), 1);
    assert!(calendar.child("VTIMEZONE").and_then(|tz| tz.child("STANDARD")).is_none());
}
