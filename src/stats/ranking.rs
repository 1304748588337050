use crate::model::{GroupingKey, PlaybackEvent, ms_to_hours};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub event_count: u64,
    pub total_ms: u64,
}

impl GroupSummary {
    pub fn total_hours(&self) -> f64 {
        ms_to_hours(self.total_ms)
    }
}

/// Groups events by `grouping` and returns the `top_n` groups with the most
/// accumulated listening time. Pass `usize::MAX` for every group.
///
/// Groups with equal time keep the order in which their key first appeared.
pub fn rank<'a, I>(events: I, grouping: GroupingKey, top_n: usize) -> Vec<GroupSummary>
where
    I: IntoIterator<Item = &'a PlaybackEvent>,
{
    let mut slots: HashMap<&'a str, usize> = HashMap::new();
    let mut rows: Vec<GroupSummary> = Vec::new();

    for event in events {
        let key = event.key(grouping);
        let slot = *slots.entry(key).or_insert_with(|| {
            rows.push(GroupSummary {
                key: key.to_string(),
                event_count: 0,
                total_ms: 0,
            });
            rows.len() - 1
        });
        let row = &mut rows[slot];
        row.event_count = row.event_count.saturating_add(1);
        row.total_ms = row.total_ms.saturating_add(event.ms_played);
    }

    rows.sort_by(compare_groups);
    rows.truncate(top_n);
    rows
}

fn compare_groups(a: &GroupSummary, b: &GroupSummary) -> Ordering {
    b.total_ms.cmp(&a.total_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UNKNOWN_KEY;

    fn by_artist(artist: Option<&str>, ms: u64) -> PlaybackEvent {
        PlaybackEvent {
            ms_played: ms,
            artist_name: artist.map(String::from),
            ..PlaybackEvent::default()
        }
    }

    #[test]
    fn ranks_by_accumulated_time_not_count() {
        let events = vec![
            by_artist(Some("Neon"), 10_000),
            by_artist(Some("Neon"), 10_000),
            by_artist(Some("Neon"), 10_000),
            by_artist(Some("Blue"), 90_000),
        ];

        let rows = rank(&events, GroupingKey::ArtistName, DEFAULT_TOP_N);
        assert_eq!(
            rows,
            vec![
                GroupSummary {
                    key: String::from("Blue"),
                    event_count: 1,
                    total_ms: 90_000,
                },
                GroupSummary {
                    key: String::from("Neon"),
                    event_count: 3,
                    total_ms: 30_000,
                },
            ]
        );
    }

    #[test]
    fn truncates_to_top_n() {
        let events: Vec<PlaybackEvent> = (0..25_u64)
            .map(|n| by_artist(Some(format!("artist {n}").as_str()), n * 1_000))
            .collect();

        let rows = rank(&events, GroupingKey::ArtistName, DEFAULT_TOP_N);
        assert_eq!(rows.len(), DEFAULT_TOP_N);
        assert_eq!(rows[0].key, "artist 24");
        assert_eq!(rows[9].key, "artist 15");
    }

    #[test]
    fn ties_keep_first_occurrence_order() {
        let events = vec![
            by_artist(Some("Second"), 5_000),
            by_artist(Some("First"), 5_000),
            by_artist(Some("Third"), 5_000),
        ];

        let keys: Vec<String> = rank(&events, GroupingKey::ArtistName, DEFAULT_TOP_N)
            .into_iter()
            .map(|row| row.key)
            .collect();
        assert_eq!(keys, vec!["Second", "First", "Third"]);
    }

    #[test]
    fn missing_keys_share_the_unknown_group() {
        let events = vec![
            by_artist(None, 1_000),
            by_artist(Some(""), 2_000),
            by_artist(Some("Neon"), 500),
        ];

        let rows = rank(&events, GroupingKey::ArtistName, DEFAULT_TOP_N);
        assert_eq!(rows[0].key, UNKNOWN_KEY);
        assert_eq!(rows[0].event_count, 2);
        assert_eq!(rows[0].total_ms, 3_000);
    }

    #[test]
    fn absent_duration_still_counts_as_an_event() {
        let events = vec![by_artist(Some("Neon"), 0)];

        let rows = rank(&events, GroupingKey::ArtistName, DEFAULT_TOP_N);
        assert_eq!(rows[0].event_count, 1);
        assert_eq!(rows[0].total_ms, 0);
    }

    #[test]
    fn groups_by_the_selected_field() {
        let events = vec![PlaybackEvent {
            ms_played: 1_000,
            track_name: Some(String::from("Night Drive")),
            album_name: Some(String::from("Skyline")),
            artist_name: Some(String::from("Neon")),
            ..PlaybackEvent::default()
        }];

        assert_eq!(rank(&events, GroupingKey::TrackName, 1)[0].key, "Night Drive");
        assert_eq!(rank(&events, GroupingKey::AlbumName, 1)[0].key, "Skyline");
        assert_eq!(rank(&events, GroupingKey::ArtistName, 1)[0].key, "Neon");
    }

    #[test]
    fn zero_top_n_returns_nothing() {
        let events = vec![by_artist(Some("Neon"), 1_000)];
        assert!(rank(&events, GroupingKey::ArtistName, 0).is_empty());
    }
}
