use crate::model::PlaybackEvent;
use anyhow::{Context, Result};
use serde::Serialize;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime};

/// Inclusive calendar-date window; an unset bound is open.
///
/// Bounds are compared against the event's local calendar date, so `to`
/// covers the whole of its last day. A window with `from > to` is accepted
/// and simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DateRange {
    pub from: Option<Date>,
    pub to: Option<Date>,
}

impl DateRange {
    pub fn new(from: Option<Date>, to: Option<Date>) -> Self {
        Self { from, to }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn year(year: i32) -> Result<Self> {
        let from = Date::from_calendar_date(year, Month::January, 1)
            .with_context(|| format!("year {year} is out of range"))?;
        let to = Date::from_calendar_date(year, Month::December, 31)
            .with_context(|| format!("year {year} is out of range"))?;
        Ok(Self::new(Some(from), Some(to)))
    }

    pub fn parse_bounds(from: &str, to: &str) -> Result<Self> {
        Ok(Self::new(parse_bound(from)?, parse_bound(to)?))
    }

    pub fn contains_date(&self, date: Date) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }

    pub fn contains(&self, timestamp: OffsetDateTime) -> bool {
        self.contains_date(timestamp.date())
    }

    pub fn intersect(self, other: Self) -> Self {
        Self {
            from: tighter(self.from, other.from, Date::max),
            to: tighter(self.to, other.to, Date::min),
        }
    }
}

fn tighter(a: Option<Date>, b: Option<Date>, pick: fn(Date, Date) -> Date) -> Option<Date> {
    match (a, b) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, b) => a.or(b),
    }
}

fn parse_bound(raw: &str) -> Result<Option<Date>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let date = Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("invalid date `{raw}`, expected YYYY-MM-DD"))?;
    Ok(Some(date))
}

/// Events that fell inside a [`DateRange`], in input order, plus the number of
/// events dropped because their timestamp could not be parsed.
#[derive(Debug, Clone, Default)]
pub struct Window<'a> {
    events: Vec<&'a PlaybackEvent>,
    skipped_timestamps: usize,
}

impl<'a> Window<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a PlaybackEvent> + '_ {
        self.events.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn skipped_timestamps(&self) -> usize {
        self.skipped_timestamps
    }
}

pub fn filter<'a, I>(events: I, range: &DateRange) -> Window<'a>
where
    I: IntoIterator<Item = &'a PlaybackEvent>,
{
    let mut window = Window::default();
    for event in events {
        let Some(timestamp) = event.timestamp else {
            window.skipped_timestamps += 1;
            continue;
        };
        if range.contains(timestamp) {
            window.events.push(event);
        }
    }
    window
}
