//! VTIMEZONE synthesis from an [`OffsetSource`].

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use vobject_core::config::TimezoneConfig;
use vobject_core::constants::{SYNTHESIS_END_YEAR, SYNTHESIS_START_YEAR};

use super::timezone::{OffsetSource, Transition};
use super::vtimezone::ObservanceKind;
use crate::rfc::core::{Component, ContentLine, UtcOffset};

const LOCAL_FORMAT: &str = "%Y%m%dT%H%M%S";
const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Years scanned for transitions, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisWindow {
    pub start_year: i32,
    pub end_year: i32,
}

impl Default for SynthesisWindow {
    fn default() -> Self {
        Self {
            start_year: SYNTHESIS_START_YEAR,
            end_year: SYNTHESIS_END_YEAR,
        }
    }
}

impl From<&TimezoneConfig> for SynthesisWindow {
    fn from(config: &TimezoneConfig) -> Self {
        Self {
            start_year: config.synthesis_start_year,
            end_year: config.synthesis_end_year,
        }
    }
}

impl SynthesisWindow {
    fn bounds(self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = NaiveDate::from_ymd_opt(self.start_year, 1, 1)?;
        let end = NaiveDate::from_ymd_opt(self.end_year.checked_add(1)?, 1, 1)?;
        (start < end).then(|| {
            (
                start.and_time(NaiveTime::MIN).and_utc(),
                end.and_time(NaiveTime::MIN).and_utc(),
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pattern {
    kind: ObservanceKind,
    before: UtcOffset,
    after: UtcOffset,
    abbreviation: Option<String>,
}

impl Pattern {
    fn of(transition: &Transition) -> Self {
        let kind = if transition.after <= transition.before {
            ObservanceKind::Standard
        } else {
            ObservanceKind::Daylight
        };
        Self {
            kind,
            before: transition.before,
            after: transition.after,
            abbreviation: transition.abbreviation.clone(),
        }
    }
}

/// The nth-weekday-of-month shape of one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RuleKey {
    month: u32,
    ordinal: i8,
    weekday: Weekday,
    time: NaiveTime,
}

fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .map_or(31, |last| last.day())
}

/// Where one transition, or a run of them, falls within its month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placement {
    month: u32,
    weekday: Weekday,
    time: NaiveTime,
    /// `n` of the nth weekday, only for 1 to 4.
    nth: Option<i8>,
    /// Last such weekday of the month.
    last: bool,
}

impl Placement {
    fn of(local: NaiveDateTime) -> Self {
        let day = local.day();
        Self {
            month: local.month(),
            weekday: local.weekday(),
            time: local.time(),
            nth: (day <= 28).then(|| i8::try_from((day - 1) / 7 + 1).unwrap_or(1)),
            last: day + 7 > days_in_month(local.date()),
        }
    }

    /// The placement both share, or `None` when no single rule produces both.
    fn merge(self, other: Self) -> Option<Self> {
        if (self.month, self.weekday, self.time) != (other.month, other.weekday, other.time) {
            return None;
        }
        let nth = self.nth.filter(|n| other.nth == Some(*n));
        let last = self.last && other.last;
        (nth.is_some() || last).then_some(Self { nth, last, ..self })
    }

    /// `-1` wins when both ordinals fit.
    fn key(self) -> RuleKey {
        let ordinal = match self.nth {
            Some(n) if !self.last => n,
            _ => -1,
        };
        RuleKey {
            month: self.month,
            ordinal,
            weekday: self.weekday,
            time: self.time,
        }
    }
}

impl RuleKey {
    fn byday(self) -> String {
        let code = match self.weekday {
            Weekday::Mon => "MO",
            Weekday::Tue => "TU",
            Weekday::Wed => "WE",
            Weekday::Thu => "TH",
            Weekday::Fri => "FR",
            Weekday::Sat => "SA",
            Weekday::Sun => "SU",
        };
        format!("{}{code}", self.ordinal)
    }
}

/// One emitted STANDARD or DAYLIGHT block.
struct Block<'a> {
    pattern: &'a Pattern,
    first: &'a Transition,
    rule: Option<(RuleKey, Option<DateTime<Utc>>)>,
}

impl Block<'_> {
    fn to_component(&self) -> Component {
        let mut block = Component::new(self.pattern.kind.as_str());
        block.push_line(ContentLine::raw(
            "DTSTART",
            self.first.local_start().format(LOCAL_FORMAT).to_string(),
        ));
        if let Some((key, until)) = self.rule {
            let mut rule = format!("FREQ=YEARLY;BYDAY={};BYMONTH={}", key.byday(), key.month);
            if let Some(until) = until {
                rule.push_str(&format!(";UNTIL={}", until.format(UTC_FORMAT)));
            }
            block.push_line(ContentLine::raw("RRULE", rule));
        }
        if let Some(abbreviation) = &self.pattern.abbreviation {
            block.push_line(ContentLine::raw("TZNAME", abbreviation.clone()));
        }
        block.push_line(ContentLine::raw("TZOFFSETFROM", self.pattern.before.to_string()));
        block.push_line(ContentLine::raw("TZOFFSETTO", self.pattern.after.to_string()));
        block
    }
}

/// Splits one pattern's transitions into runs of consecutive years that one
/// nth-weekday rule describes.
fn runs(transitions: &[&Transition]) -> Vec<(RuleKey, usize, usize)> {
    let mut found: Vec<(Placement, usize, usize)> = Vec::new();
    for (index, transition) in transitions.iter().enumerate() {
        let placement = Placement::of(transition.local_start());
        let year = transition.local_start().year();
        let merged = found.last().and_then(|(run, _, end)| {
            (transitions[*end].local_start().year() + 1 == year)
                .then(|| run.merge(placement))
                .flatten()
        });
        match (merged, found.last_mut()) {
            (Some(run), Some((current, _, end))) => {
                *current = run;
                *end = index;
            }
            _ => found.push((placement, index, index)),
        }
    }
    found
        .into_iter()
        .map(|(placement, start, end)| (placement.key(), start, end))
        .collect()
}

/// ## Summary
/// Builds a VTIMEZONE describing `source` over `window`.
///
/// Transitions are grouped by kind, offsets and abbreviation. Runs of
/// consecutive years on one nth-weekday rule become a yearly RRULE, bounded
/// by UNTIL when the run ends before the window does. Isolated transitions
/// become bare DTSTART blocks. A source without transitions yields a single
/// STANDARD block.
#[tracing::instrument(skip(source))]
pub fn from_offset_source<S: OffsetSource + ?Sized>(
    tzid: &str,
    source: &S,
    window: SynthesisWindow,
) -> Component {
    let mut vtimezone = Component::new("VTIMEZONE");
    vtimezone.push_line(ContentLine::raw("TZID", tzid));

    let Some((from, to)) = window.bounds() else {
        tracing::warn!("Empty synthesis window");
        return vtimezone;
    };
    let transitions = source.transitions(from, to);

    if transitions.is_empty() {
        let (offset, abbreviation) = source.offset_at(from);
        let pattern = Pattern {
            kind: ObservanceKind::Standard,
            before: offset,
            after: offset,
            abbreviation,
        };
        let first = Transition {
            at: from - offset.as_delta(),
            before: offset,
            after: offset,
            abbreviation: None,
        };
        let block = Block {
            pattern: &pattern,
            first: &first,
            rule: None,
        };
        vtimezone.push_child(block.to_component());
        return vtimezone;
    }

    let mut patterns: Vec<(Pattern, Vec<&Transition>)> = Vec::new();
    for transition in &transitions {
        let pattern = Pattern::of(transition);
        match patterns.iter_mut().find(|(p, _)| *p == pattern) {
            Some((_, members)) => members.push(transition),
            None => patterns.push((pattern, vec![transition])),
        }
    }

    let mut blocks: Vec<Block<'_>> = Vec::new();
    for (pattern, members) in &patterns {
        for (key, start, end) in runs(members) {
            let last = members[end];
            let rule = (end > start).then(|| {
                let until = (last.local_start().year() < window.end_year).then_some(last.at);
                (key, until)
            });
            blocks.push(Block {
                pattern,
                first: members[start],
                rule,
            });
        }
    }
    blocks.sort_by_key(|block| block.first.at);

    tracing::debug!(
        transitions = transitions.len(),
        blocks = blocks.len(),
        "Synthesized VTIMEZONE"
    );
    for block in &blocks {
        vtimezone.push_child(block.to_component());
    }
    vtimezone
}
