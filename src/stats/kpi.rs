use crate::model::{GroupingKey, PlaybackEvent, ms_to_hours};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AggregateResult {
    pub total_ms: u64,
    pub distinct_track_count: usize,
    pub distinct_artist_count: usize,
    pub distinct_album_count: usize,
}

impl AggregateResult {
    pub fn total_hours(&self) -> f64 {
        ms_to_hours(self.total_ms)
    }
}

pub fn aggregate<'a, I>(events: I) -> AggregateResult
where
    I: IntoIterator<Item = &'a PlaybackEvent>,
{
    let mut total_ms = 0_u64;
    let mut tracks = HashSet::new();
    let mut artists = HashSet::new();
    let mut albums = HashSet::new();

    for event in events {
        total_ms = total_ms.saturating_add(event.ms_played);
        tracks.insert(event.track_uri_key());
        artists.insert(event.key(GroupingKey::ArtistName));
        albums.insert(event.key(GroupingKey::AlbumName));
    }

    AggregateResult {
        total_ms,
        distinct_track_count: tracks.len(),
        distinct_artist_count: artists.len(),
        distinct_album_count: albums.len(),
    }
}
