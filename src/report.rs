use crate::model::{GroupingKey, PlaybackEvent};
use crate::stats::{
    AggregateResult, DateRange, GroupSummary, HourlyDistribution, aggregate, available_years,
    filter, hourly_distribution, rank,
};
use serde::Serialize;
use std::fmt::Write;

const HOUR_BAR_WIDTH: u64 = 40;
const MS_PER_HOUR: u64 = 3_600_000;

#[derive(Debug, Clone, Serialize)]
pub struct ListeningReport {
    pub range: DateRange,
    pub grouping: GroupingKey,
    pub kpis: AggregateResult,
    pub ranking: Vec<GroupSummary>,
    pub hourly: HourlyDistribution,
    pub available_years: Vec<i32>,
    pub events_in_range: usize,
    pub skipped_timestamps: usize,
}

impl ListeningReport {
    pub fn build(
        events: &[PlaybackEvent],
        range: DateRange,
        grouping: GroupingKey,
        top_n: usize,
    ) -> Self {
        let window = filter(events, &range);
        Self {
            range,
            grouping,
            kpis: aggregate(window.iter()),
            ranking: rank(window.iter(), grouping, top_n),
            hourly: hourly_distribution(window.iter()),
            available_years: available_years(events),
            events_in_range: window.len(),
            skipped_timestamps: window.skipped_timestamps(),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Listening report ({})", describe_range(&self.range));
        if !self.available_years.is_empty() {
            let years: Vec<String> = self
                .available_years
                .iter()
                .map(ToString::to_string)
                .collect();
            let _ = writeln!(out, "Years in history: {}", years.join(", "));
        }
        let _ = writeln!(out);

        let _ = writeln!(
            out,
            "Total listening time:  {} ({:.2} h)",
            format_duration(self.kpis.total_ms),
            self.kpis.total_hours()
        );
        let _ = writeln!(out, "Distinct tracks:       {}", self.kpis.distinct_track_count);
        let _ = writeln!(out, "Distinct artists:      {}", self.kpis.distinct_artist_count);
        let _ = writeln!(out, "Distinct albums:       {}", self.kpis.distinct_album_count);
        if self.skipped_timestamps > 0 {
            let _ = writeln!(
                out,
                "Skipped {} events with unreadable timestamps",
                self.skipped_timestamps
            );
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "{}", self.grouping.label());
        if self.ranking.is_empty() {
            let _ = writeln!(out, "  (no plays in range)");
        }
        for (position, row) in self.ranking.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>3}. {}  {} plays  {:.2} h",
                position + 1,
                row.key,
                row.event_count,
                row.total_hours()
            );
        }
        let _ = writeln!(out);

        match self.hourly.peak() {
            Some(peak) => {
                let _ = writeln!(
                    out,
                    "Busiest hour: {:02}:00 ({:.2} h)",
                    peak.hour,
                    peak.total_hours()
                );
            }
            None => {
                let _ = writeln!(out, "Busiest hour: none");
            }
        }
        let _ = writeln!(out, "Hours of the day");
        // Under 0.005 h the ceiling rounds to zero; scale to the busiest hour instead.
        let ceiling_ms = match self.hourly.display_ceiling_hours() {
            0 => self.hourly.max_ms(),
            hours => hours.saturating_mul(MS_PER_HOUR),
        };
        for bucket in self.hourly.buckets() {
            let width = if ceiling_ms == 0 {
                0
            } else {
                bucket.total_ms.saturating_mul(HOUR_BAR_WIDTH) / ceiling_ms
            };
            let _ = writeln!(
                out,
                "  {:02}  {:<bar$}  {:.2} h",
                bucket.hour,
                "#".repeat(width as usize),
                bucket.total_hours(),
                bar = HOUR_BAR_WIDTH as usize
            );
        }
        out
    }
}

fn describe_range(range: &DateRange) -> String {
    match (range.from, range.to) {
        (None, None) => String::from("all time"),
        (Some(from), None) => format!("from {from}"),
        (None, Some(to)) => format!("until {to}"),
        (Some(from), Some(to)) => format!("{from} to {to}"),
    }
}

pub fn format_duration(ms: u64) -> String {
    let total_seconds = ms / 1_000;
    let hours = total_seconds / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours}h {minutes}m {seconds}s")
}
