//! iCalendar 2.0 behaviors (RFC 5545, RFC 7953 for availability).

use chrono::{SubsecRound, Utc};
use vobject_core::constants::{ICALENDAR_VERSION, UID_DOMAIN};

use super::{Behavior, BehaviorRef, ChildSpec, DecodeContext, Registry, codec, engine};
use crate::error::{NativeError, VObjectError, VObjectResult};
use crate::rfc::build::{SerializeOptions, escape_text};
use crate::rfc::core::{Component, ContentLine, DateTimeValue, NativeValue, Period, Value};
use crate::rfc::expand::{synthesize, timezone};
use crate::rfc::parse::{
    parse_date, parse_date_or_datetime, parse_datetime, parse_datetime_list, parse_duration,
    parse_period_list,
};

const VERSION: Option<&str> = Some(ICALENDAR_VERSION);

fn raw(line: &ContentLine) -> &str {
    line.raw_value().unwrap_or_default()
}

fn line_no(line: &ContentLine) -> usize {
    line.line_number.unwrap_or(0)
}

fn mismatch(line: &ContentLine) -> VObjectError {
    NativeError::Mismatch {
        name: line.name.clone(),
    }
    .into()
}

fn value_param_is(line: &ContentLine, expected: &str) -> bool {
    line.param_value("VALUE")
        .is_some_and(|v| v.eq_ignore_ascii_case(expected))
}

/// Puts TZID and VALUE back for a date-time about to be written.
fn restore_datetime_params(line: &mut ContentLine, value: &DateTimeValue) {
    line.remove_param("TZID");
    if let Some(tzid) = value.tzid() {
        line.set_param("TZID", vec![tzid.to_string()]);
    }
    if value.is_date() {
        line.set_param("VALUE", vec!["DATE".to_string()]);
    } else if value_param_is(line, "DATE") {
        line.remove_param("VALUE");
    }
}

fn strip_datetime_params(line: &mut ContentLine) {
    line.remove_param("TZID");
    line.remove_param("VALUE");
}

/// Escaped TEXT.
#[derive(Debug)]
pub struct Text {
    name: &'static str,
}

impl Behavior for Text {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> Option<&'static str> {
        VERSION
    }

    fn has_native(&self) -> bool {
        true
    }

    fn to_native(&self, line: &mut ContentLine, ctx: DecodeContext) -> VObjectResult<()> {
        line.value = NativeValue::Text(codec::unescape(raw(line), ctx)).into();
        Ok(())
    }

    fn from_native(&self, line: &mut ContentLine) -> VObjectResult<()> {
        let text = line.value.as_text().ok_or_else(|| mismatch(line))?;
        line.value = Value::Raw(escape_text(text));
        Ok(())
    }
}

/// Separated list of TEXT items.
#[derive(Debug)]
pub struct TextList {
    name: &'static str,
    separator: char,
}

impl Behavior for TextList {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> Option<&'static str> {
        VERSION
    }

    fn has_native(&self) -> bool {
        true
    }

    fn to_native(&self, line: &mut ContentLine, ctx: DecodeContext) -> VObjectResult<()> {
        line.value = NativeValue::TextList(codec::split_list(raw(line), self.separator, ctx)).into();
        Ok(())
    }

    fn from_native(&self, line: &mut ContentLine) -> VObjectResult<()> {
        let items = line.value.as_list().ok_or_else(|| mismatch(line))?;
        line.value = Value::Raw(codec::join_list(items, self.separator));
        Ok(())
    }
}

/// DATE or DATE-TIME. With `utc_only`, zoned values are written in UTC.
#[derive(Debug)]
pub struct DateTimeProperty {
    name: &'static str,
    utc_only: bool,
}

impl Behavior for DateTimeProperty {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> Option<&'static str> {
        VERSION
    }

    fn has_native(&self) -> bool {
        true
    }

    fn to_native(&self, line: &mut ContentLine, _ctx: DecodeContext) -> VObjectResult<()> {
        let value = if value_param_is(line, "DATE") {
            DateTimeValue::Date(parse_date(raw(line), line_no(line))?)
        } else {
            parse_date_or_datetime(raw(line), line.param_value("TZID"), line_no(line))?
        };
        strip_datetime_params(line);
        line.value = value.into();
        Ok(())
    }

    fn from_native(&self, line: &mut ContentLine) -> VObjectResult<()> {
        let mut value = line.value.as_datetime().cloned().ok_or_else(|| mismatch(line))?;
        let converted = match &value {
            DateTimeValue::Zoned { local, tzid } if self.utc_only => {
                let instant = timezone::local_to_utc(*local, tzid);
                if instant.is_none() {
                    tracing::warn!(name = self.name, tzid, "Cannot convert to UTC");
                }
                instant
            }
            _ => None,
        };
        if let Some(instant) = converted {
            value = DateTimeValue::Utc(instant);
        }
        restore_datetime_params(line, &value);
        line.value = Value::Raw(value.to_wire());
        Ok(())
    }
}

/// EXDATE / RDATE: comma lists of date-times, or periods for
/// `VALUE=PERIOD`.
#[derive(Debug)]
pub struct DateTimeList {
    name: &'static str,
}

impl Behavior for DateTimeList {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> Option<&'static str> {
        VERSION
    }

    fn has_native(&self) -> bool {
        true
    }

    fn to_native(&self, line: &mut ContentLine, _ctx: DecodeContext) -> VObjectResult<()> {
        let tzid = line.param_value("TZID");
        let native = if value_param_is(line, "PERIOD") {
            NativeValue::Periods(parse_period_list(raw(line), tzid, line_no(line))?)
        } else if value_param_is(line, "DATE") {
            let dates = raw(line)
                .split(',')
                .filter(|item| !item.trim().is_empty())
                .map(|item| parse_date(item, line_no(line)).map(DateTimeValue::Date))
                .collect::<Result<Vec<_>, _>>()?;
            NativeValue::DateTimeList(dates)
        } else {
            NativeValue::DateTimeList(parse_datetime_list(raw(line), tzid, line_no(line))?)
        };
        strip_datetime_params(line);
        line.value = native.into();
        Ok(())
    }

    fn from_native(&self, line: &mut ContentLine) -> VObjectResult<()> {
        match line.value.as_native().cloned() {
            Some(NativeValue::DateTimeList(values)) => {
                line.remove_param("TZID");
                line.remove_param("VALUE");
                if let Some(tzid) = values.iter().find_map(DateTimeValue::tzid) {
                    line.set_param("TZID", vec![tzid.to_string()]);
                }
                if !values.is_empty() && values.iter().all(DateTimeValue::is_date) {
                    line.set_param("VALUE", vec!["DATE".to_string()]);
                }
                let wire: Vec<String> = values.iter().map(DateTimeValue::to_wire).collect();
                line.value = Value::Raw(wire.join(","));
                Ok(())
            }
            Some(NativeValue::Periods(periods)) => {
                write_periods(line, &periods);
                line.set_param("VALUE", vec!["PERIOD".to_string()]);
                Ok(())
            }
            _ => Err(mismatch(line)),
        }
    }
}

fn write_periods(line: &mut ContentLine, periods: &[Period]) {
    line.remove_param("TZID");
    if let Some(tzid) = periods.iter().find_map(|p| p.start.tzid()) {
        line.set_param("TZID", vec![tzid.to_string()]);
    }
    let wire: Vec<String> = periods.iter().map(Period::to_wire).collect();
    line.value = Value::Raw(wire.join(","));
}

/// RRULE / EXRULE. Kept as wire text; the recurrence module reads it.
#[derive(Debug)]
pub struct Recur {
    name: &'static str,
}

impl Behavior for Recur {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> Option<&'static str> {
        VERSION
    }
}

#[derive(Debug)]
pub struct DurationProperty;

impl Behavior for DurationProperty {
    fn name(&self) -> &'static str {
        "DURATION"
    }

    fn version(&self) -> Option<&'static str> {
        VERSION
    }

    fn has_native(&self) -> bool {
        true
    }

    fn to_native(&self, line: &mut ContentLine, _ctx: DecodeContext) -> VObjectResult<()> {
        line.value = parse_duration(raw(line), line_no(line))?.into();
        Ok(())
    }

    fn from_native(&self, line: &mut ContentLine) -> VObjectResult<()> {
        let duration = line.value.as_duration().ok_or_else(|| mismatch(line))?;
        line.value = Value::Raw(duration.to_string());
        Ok(())
    }
}

/// TRIGGER: a duration relative to the start, or an absolute date-time.
///
/// Date-times are accepted without `VALUE=DATE-TIME`.
#[derive(Debug)]
pub struct Trigger;

impl Behavior for Trigger {
    fn name(&self) -> &'static str {
        "TRIGGER"
    }

    fn version(&self) -> Option<&'static str> {
        VERSION
    }

    fn has_native(&self) -> bool {
        true
    }

    fn to_native(&self, line: &mut ContentLine, _ctx: DecodeContext) -> VObjectResult<()> {
        let text = raw(line).trim();
        let value: Value = if value_param_is(line, "DATE-TIME") {
            parse_datetime(text, None, line_no(line))?.into()
        } else {
            match (
                parse_duration(text, line_no(line)),
                parse_datetime(text, None, line_no(line)),
            ) {
                (Ok(duration), _) => duration.into(),
                (Err(_), Ok(at)) => at.into(),
                (Err(err), Err(_)) => return Err(err.into()),
            }
        };
        line.remove_param("VALUE");
        line.value = value;
        Ok(())
    }

    fn from_native(&self, line: &mut ContentLine) -> VObjectResult<()> {
        match line.value.as_native().cloned() {
            Some(NativeValue::Duration(duration)) => {
                line.remove_param("VALUE");
                line.value = Value::Raw(duration.to_string());
                Ok(())
            }
            Some(NativeValue::DateTime(value)) => {
                line.set_param("VALUE", vec!["DATE-TIME".to_string()]);
                line.value = Value::Raw(value.to_wire());
                Ok(())
            }
            _ => Err(mismatch(line)),
        }
    }
}

/// FREEBUSY period lists.
#[derive(Debug)]
pub struct FreeBusy;

impl Behavior for FreeBusy {
    fn name(&self) -> &'static str {
        "FREEBUSY"
    }

    fn version(&self) -> Option<&'static str> {
        VERSION
    }

    fn has_native(&self) -> bool {
        true
    }

    fn to_native(&self, line: &mut ContentLine, _ctx: DecodeContext) -> VObjectResult<()> {
        let periods = parse_period_list(raw(line), line.param_value("TZID"), line_no(line))?;
        line.remove_param("TZID");
        line.value = NativeValue::Periods(periods).into();
        Ok(())
    }

    fn from_native(&self, line: &mut ContentLine) -> VObjectResult<()> {
        let Some(NativeValue::Periods(periods)) = line.value.as_native().cloned() else {
            return Err(mismatch(line));
        };
        write_periods(line, &periods);
        Ok(())
    }
}

/// What a component adds to itself before serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Implicit {
    Nothing,
    /// PRODID, VERSION and VTIMEZONE blocks.
    Calendar,
    /// UID and DTSTAMP.
    Scheduled,
    /// ACTION and TRIGGER.
    Alarm,
}

/// A component schema.
#[derive(Debug)]
pub struct ComponentBehavior {
    name: &'static str,
    children: &'static [ChildSpec],
    sort_first: &'static [&'static str],
    implicit: Implicit,
}

impl Behavior for ComponentBehavior {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> Option<&'static str> {
        VERSION
    }

    fn is_component(&self) -> bool {
        true
    }

    fn known_children(&self) -> &'static [ChildSpec] {
        self.children
    }

    fn sort_first(&self) -> &'static [&'static str] {
        self.sort_first
    }

    fn generate_implicit(
        &self,
        component: &mut Component,
        options: &SerializeOptions,
    ) -> VObjectResult<()> {
        match self.implicit {
            Implicit::Nothing => {}
            Implicit::Calendar => {
                add_missing(component, options, "PRODID", || {
                    NativeValue::Text(options.prodid.clone()).into()
                });
                add_missing(component, options, "VERSION", || {
                    Value::Raw(ICALENDAR_VERSION.to_string())
                });
                add_missing_timezones(component, options);
            }
            Implicit::Scheduled => {
                add_missing(component, options, "UID", || {
                    NativeValue::Text(format!("{}{UID_DOMAIN}", uuid::Uuid::new_v4())).into()
                });
                add_missing(component, options, "DTSTAMP", || {
                    DateTimeValue::Utc(Utc::now().trunc_subsecs(0)).into()
                });
            }
            Implicit::Alarm => {
                add_missing(component, options, "ACTION", || {
                    NativeValue::Text("AUDIO".to_string()).into()
                });
                add_missing(component, options, "TRIGGER", || {
                    crate::rfc::core::Duration::zero().into()
                });
            }
        }
        Ok(())
    }
}

fn add_missing(
    component: &mut Component,
    options: &SerializeOptions,
    name: &str,
    value: impl FnOnce() -> Value,
) {
    if component.line(name).is_some() {
        return;
    }
    let mut line = ContentLine::new(name, value());
    line.behavior = Some(engine::resolve_line(component, name, options.registry));
    tracing::debug!(component = %component.name, name, "Generated implicit line");
    component.push_line(line);
}

/// Adds a VTIMEZONE for every TZID the calendar uses but does not define.
fn add_missing_timezones(calendar: &mut Component, options: &SerializeOptions) {
    let defined: Vec<String> = calendar
        .children_named("VTIMEZONE")
        .filter_map(|tz| tz.text("TZID").map(str::to_string))
        .collect();

    for tzid in timezone::referenced_tzids(calendar) {
        if defined.iter().any(|d| d == &tzid) {
            continue;
        }
        let Some(zone) = timezone::resolve_named(&tzid) else {
            tracing::warn!(tzid, "No zone data for referenced TZID, not synthesizing");
            continue;
        };
        let mut vtimezone = synthesize::from_offset_source(&tzid, &zone, options.window);
        vtimezone.behavior = Some(engine::resolve_component(
            calendar,
            "VTIMEZONE",
            options.registry,
        ));
        engine::assign(&mut vtimezone, options.registry);
        tracing::debug!(tzid, "Synthesized VTIMEZONE");
        calendar.push_child(vtimezone);
    }
}

const CALENDAR_CHILDREN: &[ChildSpec] = &[
    ChildSpec::optional("CALSCALE"),
    ChildSpec::optional("METHOD"),
    ChildSpec::optional("VERSION"),
    ChildSpec::one("PRODID"),
    ChildSpec::many("VTIMEZONE"),
    ChildSpec::many("VEVENT"),
    ChildSpec::many("VTODO"),
    ChildSpec::many("VJOURNAL"),
    ChildSpec::many("VFREEBUSY"),
    ChildSpec::many("VAVAILABILITY"),
];

const EVENT_CHILDREN: &[ChildSpec] = &[
    ChildSpec::optional("DTSTART"),
    ChildSpec::optional("CLASS"),
    ChildSpec::optional("CREATED"),
    ChildSpec::optional("DESCRIPTION"),
    ChildSpec::optional("GEO"),
    ChildSpec::optional("LAST-MODIFIED"),
    ChildSpec::optional("LOCATION"),
    ChildSpec::optional("ORGANIZER"),
    ChildSpec::optional("PRIORITY"),
    ChildSpec::one("DTSTAMP"),
    ChildSpec::optional("SEQUENCE"),
    ChildSpec::optional("STATUS"),
    ChildSpec::optional("SUMMARY"),
    ChildSpec::optional("TRANSP"),
    ChildSpec::one("UID"),
    ChildSpec::optional("URL"),
    ChildSpec::optional("RECURRENCE-ID"),
    ChildSpec::optional("DTEND"),
    ChildSpec::optional("DURATION"),
    ChildSpec::many("ATTACH"),
    ChildSpec::many("ATTENDEE"),
    ChildSpec::many("CATEGORIES"),
    ChildSpec::many("COMMENT"),
    ChildSpec::many("CONTACT"),
    ChildSpec::many("EXDATE"),
    ChildSpec::many("EXRULE"),
    ChildSpec::many("REQUEST-STATUS"),
    ChildSpec::many("RELATED-TO"),
    ChildSpec::many("RESOURCES"),
    ChildSpec::many("RDATE"),
    ChildSpec::many("RRULE"),
    ChildSpec::many("VALARM"),
];

const TODO_CHILDREN: &[ChildSpec] = &[
    ChildSpec::optional("CLASS"),
    ChildSpec::optional("COMPLETED"),
    ChildSpec::optional("CREATED"),
    ChildSpec::optional("DESCRIPTION"),
    ChildSpec::optional("DTSTART"),
    ChildSpec::optional("GEO"),
    ChildSpec::optional("LAST-MODIFIED"),
    ChildSpec::optional("LOCATION"),
    ChildSpec::optional("ORGANIZER"),
    ChildSpec::optional("PERCENT"),
    ChildSpec::optional("PRIORITY"),
    ChildSpec::one("DTSTAMP"),
    ChildSpec::optional("SEQUENCE"),
    ChildSpec::optional("STATUS"),
    ChildSpec::optional("SUMMARY"),
    ChildSpec::one("UID"),
    ChildSpec::optional("URL"),
    ChildSpec::optional("RECURRENCE-ID"),
    ChildSpec::optional("DUE"),
    ChildSpec::optional("DURATION"),
    ChildSpec::many("ATTACH"),
    ChildSpec::many("ATTENDEE"),
    ChildSpec::many("CATEGORIES"),
    ChildSpec::many("COMMENT"),
    ChildSpec::many("CONTACT"),
    ChildSpec::many("EXDATE"),
    ChildSpec::many("EXRULE"),
    ChildSpec::many("REQUEST-STATUS"),
    ChildSpec::many("RELATED-TO"),
    ChildSpec::many("RESOURCES"),
    ChildSpec::many("RDATE"),
    ChildSpec::many("RRULE"),
    ChildSpec::many("VALARM"),
];

const JOURNAL_CHILDREN: &[ChildSpec] = &[
    ChildSpec::optional("CLASS"),
    ChildSpec::optional("CREATED"),
    ChildSpec::optional("DESCRIPTION"),
    ChildSpec::optional("DTSTART"),
    ChildSpec::one("DTSTAMP"),
    ChildSpec::optional("LAST-MODIFIED"),
    ChildSpec::optional("ORGANIZER"),
    ChildSpec::optional("RECURRENCE-ID"),
    ChildSpec::optional("SEQUENCE"),
    ChildSpec::optional("STATUS"),
    ChildSpec::optional("SUMMARY"),
    ChildSpec::one("UID"),
    ChildSpec::optional("URL"),
    ChildSpec::many("ATTACH"),
    ChildSpec::many("ATTENDEE"),
    ChildSpec::many("CATEGORIES"),
    ChildSpec::many("COMMENT"),
    ChildSpec::many("CONTACT"),
    ChildSpec::many("EXDATE"),
    ChildSpec::many("EXRULE"),
    ChildSpec::many("REQUEST-STATUS"),
    ChildSpec::many("RELATED-TO"),
    ChildSpec::many("RDATE"),
    ChildSpec::many("RRULE"),
];

const FREEBUSY_CHILDREN: &[ChildSpec] = &[
    ChildSpec::optional("DTSTART"),
    ChildSpec::optional("CONTACT"),
    ChildSpec::optional("DTEND"),
    ChildSpec::optional("DURATION"),
    ChildSpec::optional("ORGANIZER"),
    ChildSpec::one("DTSTAMP"),
    ChildSpec::one("UID"),
    ChildSpec::optional("URL"),
    ChildSpec::many("ATTENDEE"),
    ChildSpec::many("COMMENT"),
    ChildSpec::many("FREEBUSY"),
    ChildSpec::many("REQUEST-STATUS"),
];

const ALARM_CHILDREN: &[ChildSpec] = &[
    ChildSpec::one("ACTION"),
    ChildSpec::one("TRIGGER"),
    ChildSpec::optional("DURATION"),
    ChildSpec::optional("REPEAT"),
    ChildSpec::optional("DESCRIPTION"),
    ChildSpec::optional("SUMMARY"),
    ChildSpec::many("ATTACH"),
    ChildSpec::many("ATTENDEE"),
];

const TIMEZONE_CHILDREN: &[ChildSpec] = &[
    ChildSpec::one("TZID"),
    ChildSpec::optional("LAST-MODIFIED"),
    ChildSpec::optional("TZURL"),
    ChildSpec::many("STANDARD"),
    ChildSpec::many("DAYLIGHT"),
];

const OBSERVANCE_CHILDREN: &[ChildSpec] = &[
    ChildSpec::one("DTSTART"),
    ChildSpec::one("TZOFFSETFROM"),
    ChildSpec::one("TZOFFSETTO"),
    ChildSpec::many("COMMENT"),
    ChildSpec::many("RDATE"),
    ChildSpec::many("RRULE"),
    ChildSpec::many("TZNAME"),
];

const AVAILABILITY_CHILDREN: &[ChildSpec] = &[
    ChildSpec::one("UID"),
    ChildSpec::one("DTSTAMP"),
    ChildSpec::optional("BUSYTYPE"),
    ChildSpec::optional("CLASS"),
    ChildSpec::optional("CREATED"),
    ChildSpec::optional("DESCRIPTION"),
    ChildSpec::optional("DTSTART"),
    ChildSpec::optional("LAST-MODIFIED"),
    ChildSpec::optional("LOCATION"),
    ChildSpec::optional("ORGANIZER"),
    ChildSpec::optional("PRIORITY"),
    ChildSpec::optional("SEQUENCE"),
    ChildSpec::optional("SUMMARY"),
    ChildSpec::optional("URL"),
    ChildSpec::optional("DTEND"),
    ChildSpec::optional("DURATION"),
    ChildSpec::many("CATEGORIES"),
    ChildSpec::many("COMMENT"),
    ChildSpec::many("CONTACT"),
    ChildSpec::many("AVAILABLE"),
];

const AVAILABLE_CHILDREN: &[ChildSpec] = &[
    ChildSpec::one("UID"),
    ChildSpec::one("DTSTAMP"),
    ChildSpec::one("DTSTART"),
    ChildSpec::optional("DTEND"),
    ChildSpec::optional("DURATION"),
    ChildSpec::optional("CREATED"),
    ChildSpec::optional("DESCRIPTION"),
    ChildSpec::optional("LAST-MODIFIED"),
    ChildSpec::optional("LOCATION"),
    ChildSpec::optional("RECURRENCE-ID"),
    ChildSpec::optional("RRULE"),
    ChildSpec::optional("SUMMARY"),
    ChildSpec::many("CATEGORIES"),
    ChildSpec::many("COMMENT"),
    ChildSpec::many("CONTACT"),
    ChildSpec::many("EXDATE"),
    ChildSpec::many("RDATE"),
];

const SCHEDULED_FIRST: &[&str] = &["uid", "recurrence-id", "dtstart", "duration", "dtend"];

pub static VCALENDAR: ComponentBehavior = ComponentBehavior {
    name: "VCALENDAR",
    children: CALENDAR_CHILDREN,
    sort_first: &["version", "calscale", "method", "prodid", "vtimezone"],
    implicit: Implicit::Calendar,
};

pub static VEVENT: ComponentBehavior = ComponentBehavior {
    name: "VEVENT",
    children: EVENT_CHILDREN,
    sort_first: SCHEDULED_FIRST,
    implicit: Implicit::Scheduled,
};

pub static VTODO: ComponentBehavior = ComponentBehavior {
    name: "VTODO",
    children: TODO_CHILDREN,
    sort_first: &["uid", "dtstart", "duration", "due"],
    implicit: Implicit::Scheduled,
};

pub static VJOURNAL: ComponentBehavior = ComponentBehavior {
    name: "VJOURNAL",
    children: JOURNAL_CHILDREN,
    sort_first: &["uid", "dtstart"],
    implicit: Implicit::Scheduled,
};

pub static VFREEBUSY: ComponentBehavior = ComponentBehavior {
    name: "VFREEBUSY",
    children: FREEBUSY_CHILDREN,
    sort_first: &["uid", "dtstart", "duration", "dtend"],
    implicit: Implicit::Scheduled,
};

pub static VALARM: ComponentBehavior = ComponentBehavior {
    name: "VALARM",
    children: ALARM_CHILDREN,
    sort_first: &["action", "trigger"],
    implicit: Implicit::Alarm,
};

pub static VTIMEZONE: ComponentBehavior = ComponentBehavior {
    name: "VTIMEZONE",
    children: TIMEZONE_CHILDREN,
    sort_first: &["tzid", "last-modified", "tzurl", "standard", "daylight"],
    implicit: Implicit::Nothing,
};

pub static STANDARD: ComponentBehavior = ComponentBehavior {
    name: "STANDARD",
    children: OBSERVANCE_CHILDREN,
    sort_first: &["dtstart", "rrule", "rdate"],
    implicit: Implicit::Nothing,
};

pub static DAYLIGHT: ComponentBehavior = ComponentBehavior {
    name: "DAYLIGHT",
    children: OBSERVANCE_CHILDREN,
    sort_first: &["dtstart", "rrule", "rdate"],
    implicit: Implicit::Nothing,
};

pub static VAVAILABILITY: ComponentBehavior = ComponentBehavior {
    name: "VAVAILABILITY",
    children: AVAILABILITY_CHILDREN,
    sort_first: &["uid", "dtstart", "duration", "dtend"],
    implicit: Implicit::Scheduled,
};

pub static AVAILABLE: ComponentBehavior = ComponentBehavior {
    name: "AVAILABLE",
    children: AVAILABLE_CHILDREN,
    sort_first: SCHEDULED_FIRST,
    implicit: Implicit::Scheduled,
};

const fn text(name: &'static str) -> Text {
    Text { name }
}

static TEXT_PROPERTIES: [Text; 15] = [
    text("ACTION"),
    text("BUSYTYPE"),
    text("CALSCALE"),
    text("CLASS"),
    text("COMMENT"),
    text("CONTACT"),
    text("DESCRIPTION"),
    text("LOCATION"),
    text("METHOD"),
    text("PRODID"),
    text("RELATED-TO"),
    text("STATUS"),
    text("SUMMARY"),
    text("TRANSP"),
    text("UID"),
];

static LIST_PROPERTIES: [TextList; 3] = [
    TextList {
        name: "CATEGORIES",
        separator: ',',
    },
    TextList {
        name: "RESOURCES",
        separator: ',',
    },
    TextList {
        name: "REQUEST-STATUS",
        separator: ';',
    },
];

const fn datetime(name: &'static str, utc_only: bool) -> DateTimeProperty {
    DateTimeProperty { name, utc_only }
}

static DATETIME_PROPERTIES: [DateTimeProperty; 8] = [
    datetime("DTSTART", false),
    datetime("DTEND", false),
    datetime("DUE", false),
    datetime("RECURRENCE-ID", false),
    datetime("DTSTAMP", true),
    datetime("CREATED", true),
    datetime("COMPLETED", true),
    datetime("LAST-MODIFIED", true),
];

static DATETIME_LISTS: [DateTimeList; 2] = [
    DateTimeList { name: "EXDATE" },
    DateTimeList { name: "RDATE" },
];

static RULES: [Recur; 2] = [Recur { name: "RRULE" }, Recur { name: "EXRULE" }];

static DURATION: DurationProperty = DurationProperty;
static TRIGGER: Trigger = Trigger;
static FREEBUSY: FreeBusy = FreeBusy;

/// Registers every iCalendar behavior plus the partition fallbacks.
pub fn register(registry: &mut Registry) {
    let components: [BehaviorRef; 11] = [
        &VCALENDAR,
        &VEVENT,
        &VTODO,
        &VJOURNAL,
        &VFREEBUSY,
        &VALARM,
        &VTIMEZONE,
        &STANDARD,
        &DAYLIGHT,
        &VAVAILABILITY,
        &AVAILABLE,
    ];
    for behavior in components {
        registry.register(behavior, false);
    }

    for behavior in &TEXT_PROPERTIES {
        registry.register(behavior, false);
    }
    for behavior in &LIST_PROPERTIES {
        registry.register(behavior, false);
    }
    for behavior in &DATETIME_PROPERTIES {
        registry.register(behavior, false);
    }
    for behavior in &DATETIME_LISTS {
        registry.register(behavior, false);
    }
    for behavior in &RULES {
        registry.register(behavior, false);
    }
    registry.register(&DURATION, false);
    registry.register(&TRIGGER, false);
    registry.register(&FREEBUSY, false);

    registry.register(engine::fallback_property(), true);
    registry.register(engine::fallback_component(), true);
}

#[cfg(test)]
#[path = "icalendar_tests.rs"]
mod tests;
