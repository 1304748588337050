use crate::model::GroupingKey;
use crate::stats::DEFAULT_TOP_N;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use time::UtcOffset;
use tracing::warn;

const APP_DIR: &str = "tunestats";
const CONFIG_FILE: &str = "config.json";
const MAX_OFFSET_MINUTES: i32 = 18 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub default_grouping: GroupingKey,
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            default_grouping: GroupingKey::default(),
            utc_offset_minutes: None,
        }
    }
}

pub fn config_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var("TUNESTATS_CONFIG_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("neither HOME nor USERPROFILE is set")?;
    Ok(PathBuf::from(home).join(".config").join(APP_DIR))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_root()?.join(CONFIG_FILE))
}

pub fn ensure_config_dir() -> Result<PathBuf> {
    let root = config_root()?;
    fs::create_dir_all(&root).with_context(|| format!("failed to create {}", root.display()))?;
    Ok(root)
}

pub fn load_config() -> Result<ReportConfig> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(ReportConfig::default());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: ReportConfig = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}

pub fn save_config(config: &ReportConfig) -> Result<()> {
    ensure_config_dir()?;
    let path = config_path()?;
    let json = serde_json::to_string_pretty(config)?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

pub fn offset_from_minutes(minutes: i32) -> Result<UtcOffset> {
    let clamped = minutes.clamp(-MAX_OFFSET_MINUTES, MAX_OFFSET_MINUTES);
    UtcOffset::from_whole_seconds(clamped.saturating_mul(60))
        .with_context(|| format!("invalid UTC offset of {minutes} minutes"))
}

pub fn resolve_offset(config: &ReportConfig) -> Result<UtcOffset> {
    if let Some(minutes) = config.utc_offset_minutes {
        return offset_from_minutes(minutes);
    }
    Ok(UtcOffset::current_local_offset().unwrap_or_else(|err| {
        warn!(error = %err, "local UTC offset is unavailable, using UTC");
        UtcOffset::UTC
    }))
}
