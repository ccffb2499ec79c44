use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::error::{TimezoneError, VObjectError, VObjectResult};
use crate::rfc::core::{Component, DateTimeValue, NativeValue, Value};
use crate::rfc::expand::{TimezoneResolver, resolve_named};

const SHIFTED: [&str; 2] = ["DTSTART", "DTEND"];

fn is_utc(tzid: &str) -> bool {
    matches!(
        resolve_named(tzid),
        Some(Tz::UTC | Tz::Etc__UTC | Tz::Etc__GMT | Tz::GMT | Tz::Etc__Universal)
    )
}

fn unknown_zone(component: &str, tzid: &str) -> VObjectError {
    TimezoneError::UnknownZone {
        component: component.to_string(),
        tzid: tzid.to_string(),
    }
    .into()
}

fn zoned_to_utc(
    resolver: &mut TimezoneResolver,
    component: &str,
    local: NaiveDateTime,
    tzid: &str,
) -> VObjectResult<DateTime<Utc>> {
    resolver
        .resolve(tzid)
        .ok_or_else(|| unknown_zone(component, tzid))?
        .to_utc(local)
        .ok_or_else(|| {
            TimezoneError::Unrepresentable {
                tzid: tzid.to_string(),
                local: local.to_string(),
            }
            .into()
        })
}

/// ## Summary
/// Moves the DTSTART and DTEND of every VEVENT in `calendar` into `new_tz`.
///
/// Floating values are read in `default_tz`. With `utc_only`, only values
/// that are (or default to) UTC change. Dates and undecoded lines are left
/// alone. Returns the number of lines rewritten.
///
/// ## Errors
/// Returns an error if `new_tz`, `default_tz` or a value's TZID cannot be
/// resolved, or the calendar carries a malformed VTIMEZONE.
#[tracing::instrument(skip(calendar), fields(name = %calendar.name))]
pub fn change_tz(
    calendar: &mut Component,
    new_tz: &str,
    default_tz: &str,
    utc_only: bool,
) -> VObjectResult<usize> {
    let mut resolver = TimezoneResolver::from_calendar(calendar)?;
    let owner = calendar.name.clone();
    if resolver.resolve(new_tz).is_none() {
        return Err(unknown_zone(&owner, new_tz));
    }
    let default_is_utc = is_utc(default_tz);
    let target_is_utc = is_utc(new_tz);

    let mut changed = 0;
    for event in calendar
        .children_mut()
        .iter_mut()
        .filter(|child| child.name.eq_ignore_ascii_case("VEVENT"))
    {
        for line in event
            .all_lines_mut()
            .iter_mut()
            .filter(|line| SHIFTED.contains(&line.name.as_str()))
        {
            let Some(NativeValue::DateTime(value)) = line.value.as_native() else {
                continue;
            };
            let instant = match value {
                DateTimeValue::Date(_) => continue,
                DateTimeValue::Utc(instant) => *instant,
                DateTimeValue::Floating(_) if utc_only && !default_is_utc => continue,
                DateTimeValue::Floating(local) => {
                    zoned_to_utc(&mut resolver, &owner, *local, default_tz)?
                }
                DateTimeValue::Zoned { tzid, .. } if utc_only && !is_utc(tzid) => continue,
                DateTimeValue::Zoned { local, tzid } => {
                    zoned_to_utc(&mut resolver, &owner, *local, tzid)?
                }
            };

            let shifted = if target_is_utc {
                DateTimeValue::Utc(instant)
            } else {
                let local = resolver
                    .resolve(new_tz)
                    .ok_or_else(|| unknown_zone(&owner, new_tz))?
                    .to_local(instant);
                DateTimeValue::zoned(local, new_tz)
            };
            tracing::trace!(line = %line.name, value = %shifted, "Shifted date-time");
            line.value = Value::Native(NativeValue::DateTime(shifted));
            changed += 1;
        }
    }
    tracing::debug!(changed, new_tz, "Changed event timezones");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::core::ContentLine;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(hh, mm, ss))
            .unwrap()
    }

    fn calendar(pairs: Vec<(DateTimeValue, DateTimeValue)>) -> Component {
        let mut calendar = Component::new("VCALENDAR");
        for (start, end) in pairs {
            let mut event = Component::new("VEVENT");
            event.push_line(ContentLine::new("DTSTART", start));
            event.push_line(ContentLine::new("DTEND", end));
            calendar.push_child(event);
        }
        calendar
    }

    fn values(calendar: &Component) -> Vec<DateTimeValue> {
        calendar
            .children_named("VEVENT")
            .flat_map(|event| SHIFTED.iter().filter_map(|name| event.line(name)))
            .filter_map(|line| line.value.as_datetime().cloned())
            .collect()
    }

    #[test]
    fn utc_events_move_to_new_zone() {
        let mut cal = calendar(vec![
            (
                DateTimeValue::utc(at(1999, 12, 31, 23, 59, 59)),
                DateTimeValue::utc(at(2000, 1, 1, 0, 0, 0)),
            ),
            (
                DateTimeValue::utc(at(2010, 12, 31, 23, 59, 59)),
                DateTimeValue::utc(at(2011, 1, 2, 3, 0, 0)),
            ),
        ]);
        assert_eq!(change_tz(&mut cal, "America/Chicago", "UTC", false).unwrap(), 4);
        let chicago = |local| DateTimeValue::zoned(local, "America/Chicago");
        assert_eq!(
            values(&cal),
            [
                chicago(at(1999, 12, 31, 17, 59, 59)),
                chicago(at(1999, 12, 31, 18, 0, 0)),
                chicago(at(2010, 12, 31, 17, 59, 59)),
                chicago(at(2011, 1, 1, 21, 0, 0)),
            ]
        );
    }

    #[test]
    fn utc_only_leaves_zoned_values() {
        let santiago = DateTimeValue::zoned(at(2000, 1, 1, 0, 0, 0), "America/Santiago");
        let mut cal = calendar(vec![(
            DateTimeValue::utc(at(1999, 12, 31, 23, 59, 59)),
            santiago.clone(),
        )]);
        assert_eq!(change_tz(&mut cal, "America/Chicago", "UTC", true).unwrap(), 1);
        assert_eq!(
            values(&cal),
            [
                DateTimeValue::zoned(at(1999, 12, 31, 17, 59, 59), "America/Chicago"),
                santiago
            ]
        );
    }

    #[test]
    fn floating_values_assume_default_zone() {
        let mut cal = calendar(vec![(
            DateTimeValue::Floating(at(1999, 12, 31, 23, 59, 59)),
            DateTimeValue::Floating(at(2000, 1, 1, 0, 0, 0)),
        )]);
        change_tz(&mut cal, "America/Chicago", "UTC", false).unwrap();
        assert_eq!(
            values(&cal)[1],
            DateTimeValue::zoned(at(1999, 12, 31, 18, 0, 0), "America/Chicago")
        );
    }

    #[test]
    fn dates_are_untouched_and_utc_target_stays_utc() {
        let day = DateTimeValue::Date(at(2026, 1, 1, 0, 0, 0).date());
        let mut cal = calendar(vec![(
            day.clone(),
            DateTimeValue::zoned(at(2026, 1, 1, 12, 0, 0), "Europe/Berlin"),
        )]);
        assert_eq!(change_tz(&mut cal, "UTC", "UTC", false).unwrap(), 1);
        assert_eq!(
            values(&cal),
            [day, DateTimeValue::utc(at(2026, 1, 1, 11, 0, 0))]
        );
    }

    #[test]
    fn unknown_target_zone_fails() {
        let mut cal = calendar(Vec::new());
        assert!(matches!(
            change_tz(&mut cal, "Mars/Olympus_Mons", "UTC", false),
            Err(VObjectError::Timezone(TimezoneError::UnknownZone { .. }))
        ));
    }
}
