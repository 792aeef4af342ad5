//! Application Configuration
//!
//! Install settings stored in TOML format, plus the plain-text list files
//! (keywords, hours, recipients) that operators edit by hand.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::analysis::{AllowedHours, KeywordSet};
use crate::error::WatchError;
use crate::notify::RecipientList;
use crate::vision::LabelDictionary;

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Locations of list files and marker storage
    #[serde(default)]
    pub paths: PathSettings,
    /// Cycle timing settings
    #[serde(default)]
    pub schedule: ScheduleSettings,
    /// Marker storage settings
    #[serde(default)]
    pub storage: StorageSettings,
    /// Outbound message settings
    #[serde(default)]
    pub dispatch: DispatchSettings,
}

/// File locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Keyword list, one keyword per line
    pub keywords_file: PathBuf,
    /// Hours during which notifications are considered, one integer per line
    pub hours_file: PathBuf,
    /// Phone numbers notified when charging is detected
    pub success_recipients_file: PathBuf,
    /// Phone numbers notified when charging has stopped
    pub failure_recipients_file: PathBuf,
    /// Directory holding one marker file per notification attempt
    pub marker_dir: PathBuf,
    /// Recognition label dictionary, one label per line
    pub label_file: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        let base = default_base_dir();
        Self {
            keywords_file: base.join("keywords.conf"),
            hours_file: base.join("allowed_hours.conf"),
            success_recipients_file: base.join("success_recipients.conf"),
            failure_recipients_file: base.join("failure_recipients.conf"),
            marker_dir: base.join("markers"),
            label_file: base.join("labels.txt"),
        }
    }
}

/// Cycle timing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSettings {
    /// Charging is only reported from this minute of the hour onwards
    pub charging_minute_gate: u32,
    /// Seconds between classification cycles when looping
    pub interval_secs: u64,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            charging_minute_gate: 50,
            interval_secs: 60,
        }
    }
}

/// Marker storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerBackend {
    /// One empty file per marker
    #[default]
    Files,
    /// Single SQLite database
    Sqlite,
    /// Process-local, lost on exit
    Memory,
}

/// Marker storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    pub backend: MarkerBackend,
    /// Database file used by the sqlite backend
    pub sqlite_path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: MarkerBackend::Files,
            sqlite_path: default_base_dir().join("markers.sqlite"),
        }
    }
}

/// Outbound message settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// Carrier service number receiving data-flow control codes
    pub carrier_number: String,
    /// Control code resuming mobile data
    pub resume_code: String,
    /// Control code pausing mobile data
    pub pause_code: String,
    /// Maximum characters per transport segment
    pub segment_chars: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            carrier_number: "10086".to_string(),
            resume_code: "HFSJLL".to_string(),
            pause_code: "ZTSJLL".to_string(),
            segment_chars: 70,
        }
    }
}

/// Immutable configuration threaded through every cycle
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub keywords: KeywordSet,
    pub allowed_hours: AllowedHours,
    pub success_recipients: RecipientList,
    pub failure_recipients: RecipientList,
    pub labels: LabelDictionary,
    pub charging_minute_gate: u32,
    pub dispatch: DispatchSettings,
}

impl WatchConfig {
    /// Read every list file named by `config`, falling back to defaults where
    /// a file is missing or empty. The label dictionary has no default and
    /// must be present.
    pub fn load(config: &AppConfig) -> Result<Self, WatchError> {
        let paths = &config.paths;

        let keywords = KeywordSet::from_lines(read_string_lines(&paths.keywords_file));
        let allowed_hours = AllowedHours::from_hours(read_hour_lines(&paths.hours_file));
        let success_recipients = read_string_lines(&paths.success_recipients_file);
        let failure_recipients = read_string_lines(&paths.failure_recipients_file);

        let labels = LabelDictionary::load(&paths.label_file)?;

        info!(
            "Loaded watch config: keywords {:?}, hours {:?}, recipients {}/{}, {} labels",
            keywords.iter().collect::<Vec<_>>(),
            allowed_hours.hours(),
            success_recipients.len(),
            failure_recipients.len(),
            labels.label_count()
        );

        Ok(Self {
            keywords,
            allowed_hours,
            success_recipients,
            failure_recipients,
            labels,
            charging_minute_gate: config.schedule.charging_minute_gate,
            dispatch: config.dispatch.clone(),
        })
    }
}

#[cfg(test)]
impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            keywords: KeywordSet::default(),
            allowed_hours: AllowedHours::default(),
            success_recipients: Vec::new(),
            failure_recipients: Vec::new(),
            labels: LabelDictionary::default(),
            charging_minute_gate: ScheduleSettings::default().charging_minute_gate,
            dispatch: DispatchSettings::default(),
        }
    }
}

/// Base directory for list files when none is configured
fn default_base_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "chargewatch", "ChargeWatch")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Read trimmed, non-empty lines. A missing or unreadable file yields no lines.
pub fn read_string_lines(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("List file {:?} not found, using defaults", path);
            Vec::new()
        }
        Err(e) => {
            warn!("Failed to read list file {:?}: {}", path, e);
            Vec::new()
        }
    }
}

/// Read hour-of-day lines, skipping anything that is not an integer in 0..=23
pub fn read_hour_lines(path: &Path) -> Vec<u32> {
    read_string_lines(path)
        .into_iter()
        .filter_map(|line| match line.parse::<u32>() {
            Ok(hour) if hour < 24 => Some(hour),
            _ => {
                warn!("Ignoring invalid hour '{}' in {:?}", line, path);
                None
            }
        })
        .collect()
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
