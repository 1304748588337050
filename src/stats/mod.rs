mod hourly;
mod kpi;
mod ranking;
mod window;
mod years;

pub use hourly::{HOURS_PER_DAY, HourlyBucket, HourlyDistribution, hourly_distribution};
pub use kpi::{AggregateResult, aggregate};
pub use ranking::{DEFAULT_TOP_N, GroupSummary, rank};
pub use window::{DateRange, Window, filter};
pub use years::available_years;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroupingKey, PlaybackEvent};
    use proptest::prelude::*;
    use time::macros::{date, datetime};
    use time::{Date, Duration, OffsetDateTime};

    const ARTISTS: &[&str] = &["Neon", "Blue", "Harbor", ""];

    fn event_strategy() -> impl Strategy<Value = PlaybackEvent> {
        (
            proptest::option::weighted(0.9, 0_i64..4 * 365 * 86_400),
            0_u64..600_000,
            proptest::option::of(0_usize..ARTISTS.len()),
        )
            .prop_map(|(offset, ms_played, artist)| PlaybackEvent {
                timestamp: offset
                    .map(|seconds| datetime!(2020-01-01 00:00 UTC) + Duration::seconds(seconds)),
                ms_played,
                artist_name: artist.map(|index| ARTISTS[index].to_string()),
                ..PlaybackEvent::default()
            })
    }

    fn bound_strategy() -> impl Strategy<Value = Option<Date>> {
        proptest::option::of(
            (0_i64..4 * 365).prop_map(|days| date!(2020 - 01 - 01) + Duration::days(days)),
        )
    }

    fn range_strategy() -> impl Strategy<Value = DateRange> {
        (bound_strategy(), bound_strategy()).prop_map(|(from, to)| DateRange::new(from, to))
    }

    fn same_events(a: &Window<'_>, b: &Window<'_>) -> bool {
        a.len() == b.len()
            && a
                .iter()
                .zip(b.iter())
                .all(|(left, right)| std::ptr::eq(left, right))
    }

    fn timestamp_in(range: &DateRange, timestamp: Option<OffsetDateTime>) -> bool {
        timestamp.is_some_and(|timestamp| range.contains(timestamp))
    }

    #[test]
    fn three_listen_scenario() {
        let events = vec![
            PlaybackEvent {
                timestamp: Some(datetime!(2023-01-01 10:00 UTC)),
                ms_played: 60_000,
                artist_name: Some(String::from("A")),
                ..PlaybackEvent::default()
            },
            PlaybackEvent {
                timestamp: Some(datetime!(2023-06-01 10:00 UTC)),
                ms_played: 120_000,
                artist_name: Some(String::from("B")),
                ..PlaybackEvent::default()
            },
            PlaybackEvent {
                timestamp: Some(datetime!(2024-01-01 23:00 UTC)),
                ms_played: 30_000,
                artist_name: Some(String::from("A")),
                ..PlaybackEvent::default()
            },
        ];

        assert_eq!(available_years(&events), vec![2023, 2024]);

        let range = DateRange::new(Some(date!(2023 - 01 - 01)), Some(date!(2023 - 12 - 31)));
        let window = filter(&events, &range);
        let kpis = aggregate(window.iter());
        assert_eq!(kpis.total_ms, 180_000);
        assert_eq!(kpis.distinct_artist_count, 2);

        let rows = rank(window.iter(), GroupingKey::ArtistName, DEFAULT_TOP_N);
        assert_eq!(
            rows,
            vec![
                GroupSummary {
                    key: String::from("B"),
                    event_count: 1,
                    total_ms: 120_000,
                },
                GroupSummary {
                    key: String::from("A"),
                    event_count: 1,
                    total_ms: 60_000,
                },
            ]
        );

        let hourly = hourly_distribution(&events);
        for bucket in hourly.buckets() {
            let expected = match bucket.hour {
                10 => 180_000,
                23 => 30_000,
                _ => 0,
            };
            assert_eq!(bucket.total_ms, expected, "hour {}", bucket.hour);
        }
    }

    proptest::proptest! {
        #[test]
        fn filter_is_an_order_preserving_subsequence(
            events in proptest::collection::vec(event_strategy(), 0..60),
            range in range_strategy(),
        ) {
            let window = filter(&events, &range);
            let mut source = events.iter();
            for kept in window.iter() {
                prop_assert!(timestamp_in(&range, kept.timestamp));
                prop_assert!(source.any(|candidate| std::ptr::eq(candidate, kept)));
            }

            let expected = events
                .iter()
                .filter(|event| timestamp_in(&range, event.timestamp))
                .count();
            prop_assert_eq!(window.len(), expected);
        }

        #[test]
        fn filtering_twice_equals_filtering_by_the_intersection(
            events in proptest::collection::vec(event_strategy(), 0..60),
            first in range_strategy(),
            second in range_strategy(),
        ) {
            let twice = filter(filter(&events, &first).iter(), &second);
            let once = filter(&events, &first.intersect(second));
            prop_assert!(same_events(&twice, &once));
        }

        #[test]
        fn hourly_totals_reconcile_with_kpi_totals(
            events in proptest::collection::vec(event_strategy(), 0..60),
            range in range_strategy(),
        ) {
            let window = filter(&events, &range);
            let hourly = hourly_distribution(window.iter());
            prop_assert_eq!(hourly.buckets().len(), HOURS_PER_DAY);
            prop_assert_eq!(hourly.total_ms(), aggregate(window.iter()).total_ms);
        }

        #[test]
        fn ranking_is_bounded_sorted_and_complete(
            events in proptest::collection::vec(event_strategy(), 0..60),
            top_n in 0_usize..6,
        ) {
            let limited = rank(&events, GroupingKey::ArtistName, top_n);
            prop_assert!(limited.len() <= top_n);
            prop_assert!(limited.windows(2).all(|pair| pair[0].total_ms >= pair[1].total_ms));

            let unlimited = rank(&events, GroupingKey::ArtistName, usize::MAX);
            let counted: u64 = unlimited.iter().map(|row| row.event_count).sum();
            prop_assert_eq!(counted, events.len() as u64);
            prop_assert!(unlimited.iter().all(|row| row.event_count >= 1));
        }

        #[test]
        fn years_are_strictly_ascending(
            events in proptest::collection::vec(event_strategy(), 0..60),
        ) {
            let years = available_years(&events);
            prop_assert!(years.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }
}
