use crate::model::{PlaybackEvent, ms_to_hours};
use serde::Serialize;

pub const HOURS_PER_DAY: usize = 24;

const DISPLAY_HEADROOM: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HourlyBucket {
    pub hour: u8,
    pub total_ms: u64,
}

impl HourlyBucket {
    pub fn total_hours(&self) -> f64 {
        ms_to_hours(self.total_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyDistribution {
    buckets: [HourlyBucket; HOURS_PER_DAY],
}

impl Default for HourlyDistribution {
    fn default() -> Self {
        Self::from_totals([0; HOURS_PER_DAY])
    }
}

impl HourlyDistribution {
    fn from_totals(totals: [u64; HOURS_PER_DAY]) -> Self {
        Self {
            buckets: std::array::from_fn(|hour| HourlyBucket {
                hour: hour as u8,
                total_ms: totals[hour],
            }),
        }
    }

    pub fn buckets(&self) -> &[HourlyBucket; HOURS_PER_DAY] {
        &self.buckets
    }

    pub fn total_ms(&self) -> u64 {
        self.buckets
            .iter()
            .fold(0_u64, |total, bucket| total.saturating_add(bucket.total_ms))
    }

    pub fn max_ms(&self) -> u64 {
        self.buckets
            .iter()
            .map(|bucket| bucket.total_ms)
            .max()
            .unwrap_or(0)
    }

    pub fn peak(&self) -> Option<HourlyBucket> {
        self.buckets
            .iter()
            .copied()
            .filter(|bucket| bucket.total_ms > 0)
            .fold(None, |best: Option<HourlyBucket>, bucket| match best {
                Some(best) if best.total_ms >= bucket.total_ms => Some(best),
                _ => Some(bucket),
            })
    }

    pub fn display_ceiling_hours(&self) -> u64 {
        (ms_to_hours(self.max_ms()) * DISPLAY_HEADROOM).ceil() as u64
    }
}

pub fn hourly_distribution<'a, I>(events: I) -> HourlyDistribution
where
    I: IntoIterator<Item = &'a PlaybackEvent>,
{
    let mut totals = [0_u64; HOURS_PER_DAY];
    for event in events {
        let Some(timestamp) = event.timestamp else {
            continue;
        };
        let slot = &mut totals[usize::from(timestamp.hour())];
        *slot = slot.saturating_add(event.ms_played);
    }
    HourlyDistribution::from_totals(totals)
}
