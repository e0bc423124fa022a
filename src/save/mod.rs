//! Persisted records and preferences.
//!
//! The front end used to keep three ad-hoc key-value entries (high
//! score, furthest level, audio prefs). Here they live in one versioned
//! JSON document with forward migration:
//! - Each save has a `version` field
//! - Migration functions transform v(N) → v(N+1) → ... → v(current)
//! - Old saves are never lost — always migrated forward
//! - Unknown future versions produce an error (no downgrade)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

/// Current save format version
pub const CURRENT_SAVE_VERSION: u32 = 2;

/// Minimum supported version (anything below cannot be migrated)
pub const MIN_SUPPORTED_VERSION: u32 = 1;

/// Audio preferences carried between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioPrefs {
    pub muted: bool,
    pub music_volume: f32,
    pub sfx_volume: f32,
}

impl Default for AudioPrefs {
    fn default() -> Self {
        Self {
            muted: false,
            music_volume: 0.8,
            sfx_volume: 1.0,
        }
    }
}

impl AudioPrefs {
    /// Volumes outside [0, 1] are clamped on load.
    fn clamp(&mut self) {
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
    }
}

/// Everything the game persists between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub high_score: u64,
    pub furthest_level: u32,
    pub audio: AudioPrefs,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            version: CURRENT_SAVE_VERSION,
            high_score: 0,
            furthest_level: 1,
            audio: AudioPrefs::default(),
        }
    }
}

/// Save handling failure
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("save is missing a usable 'version' field")]
    MissingVersion,
    #[error("save version {save_version} is newer than supported {max_supported}")]
    FutureVersion { save_version: u32, max_supported: u32 },
    #[error("save version {save_version} is older than supported {min_supported}")]
    TooOldVersion { save_version: u32, min_supported: u32 },
    #[error("migration from v{from_version} failed: {detail}")]
    MigrationStepFailed { from_version: u32, detail: String },
}

/// Migrate a save document from its stored version to the current one,
/// then deserialize it.
pub fn migrate_save(json_str: &str) -> Result<SaveData, SaveError> {
    let mut data: Value = serde_json::from_str(json_str)?;

    let version = data
        .get("version")
        .and_then(|v| v.as_u64())
        .ok_or(SaveError::MissingVersion)? as u32;

    if version > CURRENT_SAVE_VERSION {
        return Err(SaveError::FutureVersion {
            save_version: version,
            max_supported: CURRENT_SAVE_VERSION,
        });
    }
    if version < MIN_SUPPORTED_VERSION {
        return Err(SaveError::TooOldVersion {
            save_version: version,
            min_supported: MIN_SUPPORTED_VERSION,
        });
    }

    let mut current_version = version;
    while current_version < CURRENT_SAVE_VERSION {
        let description = apply_migration_step(&mut data, current_version)?;
        current_version += 1;
        data["version"] = serde_json::json!(current_version);
        debug!(from = current_version - 1, "save migration step: {description}");
    }

    let mut save: SaveData = serde_json::from_value(data)?;
    save.audio.clamp();
    Ok(save)
}

/// Apply a single migration step from `from_version` to `from_version + 1`
fn apply_migration_step(data: &mut Value, from_version: u32) -> Result<String, SaveError> {
    match from_version {
        1 => migrate_v1_to_v2(data),
        _ => Err(SaveError::MigrationStepFailed {
            from_version,
            detail: format!("no migration path from version {}", from_version),
        }),
    }
}

/// Migration v1 → v2:
/// - Added `audio` preferences (v1 predates the audio settings screen)
fn migrate_v1_to_v2(data: &mut Value) -> Result<String, SaveError> {
    let obj = data
        .as_object_mut()
        .ok_or_else(|| SaveError::MigrationStepFailed {
            from_version: 1,
            detail: "save data is not an object".to_string(),
        })?;

    if !obj.contains_key("audio") {
        let prefs = serde_json::to_value(AudioPrefs::default()).map_err(|e| {
            SaveError::MigrationStepFailed {
                from_version: 1,
                detail: e.to_string(),
            }
        })?;
        obj.insert("audio".to_string(), prefs);
    }

    Ok("v1→v2: Added audio preferences".to_string())
}

/// Is this JSON already at the current version?
pub fn validate_save(json_str: &str) -> bool {
    let data: Value = match serde_json::from_str(json_str) {
        Ok(v) => v,
        Err(_) => return false,
    };
    data.get("version")
        .and_then(|v| v.as_u64())
        .map(|v| v as u32 == CURRENT_SAVE_VERSION)
        .unwrap_or(false)
}

/// File-backed store for the save document.
#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the save, migrating old versions forward. A missing file is
    /// a fresh install and yields defaults.
    pub fn load(&self) -> Result<SaveData, SaveError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no save file, starting fresh");
            return Ok(SaveData::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        migrate_save(&raw)
    }

    pub fn save(&self, data: &SaveData) -> Result<(), SaveError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Write-through: persist a score if it beats the stored record.
    /// Returns the stored data after the update.
    pub fn record_score(&self, score: u64) -> Result<SaveData, SaveError> {
        let mut data = self.load()?;
        if score > data.high_score {
            info!(score, previous = data.high_score, "new high score");
            data.high_score = score;
            self.save(&data)?;
        }
        Ok(data)
    }

    /// Write-through: persist a level if it beats the stored record.
    pub fn record_level(&self, level: u32) -> Result<SaveData, SaveError> {
        let mut data = self.load()?;
        if level > data.furthest_level {
            data.furthest_level = level;
            self.save(&data)?;
        }
        Ok(data)
    }

    /// Replace the stored audio preferences.
    pub fn set_audio(&self, audio: AudioPrefs) -> Result<SaveData, SaveError> {
        let mut data = self.load()?;
        data.audio = audio;
        data.audio.clamp();
        self.save(&data)?;
        Ok(data)
    }
}
