use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Well-known storage keys. Each key maps to one JSON file in the data
/// directory, so adding a key never risks clobbering another record.
pub mod keys {
    pub const CUSTOM_PACKS: &str = "custom-question-packs";
    pub const WRONG_IDS: &str = "wrong-question-ids";
    pub const TAB_INDEX: &str = "app-tabbar-index";
    pub const COLLECTED_CARDS: &str = "collected-card-ids";
}

/// Key/value store persisting each key as `<key>.json` under the data
/// directory. Reads never fail: anything missing or unparseable degrades to
/// the caller's default so a damaged file cannot take the app down.
pub struct KvStore {
    base_dir: PathBuf,
}

impl KvStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quizdr");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("failed to create data directory {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }

    /// Typed read. Returns `default` when the key is absent or the stored
    /// JSON does not match `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let path = self.file_path(key);
        let Ok(contents) = fs::read_to_string(&path) else {
            return default;
        };
        match serde_json::from_str(&contents) {
            Ok(value) => value,
            Err(err) => {
                warn!("ignoring unreadable record {}: {err}", path.display());
                default
            }
        }
    }

    /// Raw read, for callers that repair legacy shapes themselves. `None`
    /// means the key has never been written (or the file is not JSON at all).
    pub fn get_value(&self, key: &str) -> Option<Value> {
        let contents = fs::read_to_string(self.file_path(key)).ok()?;
        serde_json::from_str(&contents).ok()
    }

    /// Writes via a temp file in the same directory, then renames over the
    /// target so readers never observe a half-written record.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.file_path(key);
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(value).context("failed to serialize record")?;
        {
            let mut file = File::create(&tmp_path)
                .with_context(|| format!("failed to create {}", tmp_path.display()))?;
            file.write_all(json.as_bytes())
                .with_context(|| format!("failed to write {}", tmp_path.display()))?;
            file.sync_all()
                .with_context(|| format!("failed to sync {}", tmp_path.display()))?;
        }
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("failed to move record into place at {}", path.display()))?;
        Ok(())
    }

    /// Deletes the record. Removing an absent key is a no-op.
    pub fn remove(&self, key: &str) {
        let path = self.file_path(key);
        if let Err(err) = fs::remove_file(&path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to remove record {}: {err}", path.display());
            }
        }
    }
}
