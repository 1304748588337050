use crate::model::PlaybackEvent;
use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};
use tracing::{debug, warn};
use walkdir::WalkDir;

const EXPORT_EXTENSION: &str = "json";

const NAIVE_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
];

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

// Extended streaming history names first, then basic export and camelCase spellings.
const TIMESTAMP_KEYS: &[&str] = &["ts", "timestamp", "endTime"];
const MS_PLAYED_KEYS: &[&str] = &["ms_played", "msPlayed"];
const TRACK_URI_KEYS: &[&str] = &["spotify_track_uri", "trackUri", "track_uri"];
const TRACK_NAME_KEYS: &[&str] = &["master_metadata_track_name", "trackName", "track_name"];
const ARTIST_NAME_KEYS: &[&str] = &[
    "master_metadata_album_artist_name",
    "artistName",
    "artist_name",
];
const ALBUM_NAME_KEYS: &[&str] = &[
    "master_metadata_album_album_name",
    "albumName",
    "album_name",
];

fn record_to_event(record: &Map<String, Value>, offset: UtcOffset) -> PlaybackEvent {
    PlaybackEvent {
        timestamp: lenient_string(first_present(record, TIMESTAMP_KEYS))
            .and_then(|raw| parse_timestamp(&raw, offset)),
        ms_played: lenient_ms(first_present(record, MS_PLAYED_KEYS)),
        track_uri: lenient_string(first_present(record, TRACK_URI_KEYS)),
        track_name: lenient_string(first_present(record, TRACK_NAME_KEYS)),
        artist_name: lenient_string(first_present(record, ARTIST_NAME_KEYS)),
        album_name: lenient_string(first_present(record, ALBUM_NAME_KEYS)),
    }
}

fn first_present<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

fn lenient_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) => Some(text.clone()),
        _ => None,
    }
}

fn lenient_ms(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(number)) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|ms| ms.is_finite() && *ms >= 0.0)
                    .map(|ms| ms.round() as u64)
            })
            .unwrap_or(0),
        _ => 0,
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportBatch {
    pub events: Vec<PlaybackEvent>,
    pub malformed_records: usize,
    pub files: Vec<PathBuf>,
}

impl ExportBatch {
    pub fn merge(&mut self, mut other: ExportBatch) {
        self.events.append(&mut other.events);
        self.malformed_records = self.malformed_records.saturating_add(other.malformed_records);
        self.files.append(&mut other.files);
    }

    pub fn invalid_timestamps(&self) -> usize {
        self.events
            .iter()
            .filter(|event| event.timestamp.is_none())
            .count()
    }
}

/// Parses a date-time from an export into `offset`.
///
/// RFC 3339 values are converted; naive date-times are taken to already be in
/// `offset`; a bare date means UTC midnight.
pub fn parse_timestamp(raw: &str, offset: UtcOffset) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(timestamp) = OffsetDateTime::parse(raw, &Rfc3339) {
        return timestamp.checked_to_offset(offset);
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(raw, *format).ok())
    {
        return Some(naive.assume_offset(offset));
    }
    Date::parse(raw, DATE_FORMAT)
        .ok()
        .and_then(|date| date.midnight().assume_utc().checked_to_offset(offset))
}

pub fn parse_export(raw: &str, offset: UtcOffset) -> Result<ExportBatch> {
    let document: Value = serde_json::from_str(raw).context("export is not valid JSON")?;
    let Value::Array(records) = document else {
        bail!("export must be a JSON array of playback records");
    };

    let mut batch = ExportBatch {
        events: Vec::with_capacity(records.len()),
        ..ExportBatch::default()
    };
    for record in records {
        let Value::Object(record) = record else {
            batch.malformed_records += 1;
            continue;
        };
        batch.events.push(record_to_event(&record, offset));
    }
    Ok(batch)
}

pub fn load_export_file(path: &Path, offset: UtcOffset) -> Result<ExportBatch> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mut batch =
        parse_export(&raw, offset).with_context(|| format!("failed to parse {}", path.display()))?;

    let invalid_timestamps = batch.invalid_timestamps();
    debug!(
        path = %path.display(),
        events = batch.events.len(),
        "loaded export"
    );
    if batch.malformed_records > 0 || invalid_timestamps > 0 {
        warn!(
            path = %path.display(),
            malformed_records = batch.malformed_records,
            invalid_timestamps,
            "export contains records that will be skipped"
        );
    }
    batch.files.push(path.to_path_buf());
    Ok(batch)
}

pub fn load_exports(paths: &[PathBuf], offset: UtcOffset) -> Result<ExportBatch> {
    let mut batch = ExportBatch::default();
    for path in paths {
        for file in export_files(path)? {
            batch.merge(load_export_file(&file, offset)?);
        }
    }
    Ok(batch)
}

fn export_files(root: &Path) -> Result<Vec<PathBuf>> {
    let metadata =
        fs::metadata(root).with_context(|| format!("failed to access {}", root.display()))?;
    if metadata.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && is_export(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    Ok(files)
}

fn is_export(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(EXPORT_EXTENSION))
}
