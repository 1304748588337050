use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use time::OffsetDateTime;

pub const UNKNOWN_KEY: &str = "Unknown";

const MS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaybackEvent {
    pub timestamp: Option<OffsetDateTime>,
    pub ms_played: u64,
    pub track_uri: Option<String>,
    pub track_name: Option<String>,
    pub artist_name: Option<String>,
    pub album_name: Option<String>,
}

impl PlaybackEvent {
    pub fn key(&self, grouping: GroupingKey) -> &str {
        let value = match grouping {
            GroupingKey::TrackName => self.track_name.as_deref(),
            GroupingKey::AlbumName => self.album_name.as_deref(),
            GroupingKey::ArtistName => self.artist_name.as_deref(),
        };
        key_or_unknown(value)
    }

    pub fn track_uri_key(&self) -> &str {
        key_or_unknown(self.track_uri.as_deref())
    }
}

fn key_or_unknown(value: Option<&str>) -> &str {
    match value {
        Some(value) if !value.is_empty() => value,
        _ => UNKNOWN_KEY,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupingKey {
    #[default]
    TrackName,
    AlbumName,
    ArtistName,
}

impl GroupingKey {
    pub const ALL: [Self; 3] = [Self::TrackName, Self::AlbumName, Self::ArtistName];

    pub fn label(self) -> &'static str {
        match self {
            Self::TrackName => "Top tracks",
            Self::AlbumName => "Top albums",
            Self::ArtistName => "Top artists",
        }
    }

    pub fn field_name(self) -> &'static str {
        match self {
            Self::TrackName => "track",
            Self::AlbumName => "album",
            Self::ArtistName => "artist",
        }
    }

}

impl fmt::Display for GroupingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported grouping key `{0}`, expected one of: track, album, artist")]
pub struct UnknownGroupingKey(pub String);

impl FromStr for GroupingKey {
    type Err = UnknownGroupingKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "track" | "tracks" | "track_name" | "trackname" | "master_metadata_track_name" => {
                Ok(Self::TrackName)
            }
            "album" | "albums" | "album_name" | "albumname"
            | "master_metadata_album_album_name" => Ok(Self::AlbumName),
            "artist" | "artists" | "artist_name" | "artistname"
            | "master_metadata_album_artist_name" => Ok(Self::ArtistName),
            _ => Err(UnknownGroupingKey(value.to_string())),
        }
    }
}

pub fn ms_to_hours(ms: u64) -> f64 {
    let hours = ms as f64 / MS_PER_HOUR;
    (hours * 100.0).round() / 100.0
}
