//! Where calibration records live between runs.
//!
//! The store only needs two operations from its backing storage: read the whole
//! list and replace the whole list. Record counts are small (one per
//! device/lens/format/focal-length a user has bothered to calibrate), so there
//! is no incremental write path.

use super::{CalibrationError, CalibrationRecord};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Backing storage for a [`CalibrationStore`](super::CalibrationStore).
pub trait CalibrationPersistence {
    /// Read every stored record. Missing storage is an empty list, not an error.
    fn load(&self) -> Result<Vec<CalibrationRecord>, CalibrationError>;

    /// Replace the stored list with `records` (already ordered newest first).
    fn save(&self, records: &[CalibrationRecord]) -> Result<(), CalibrationError>;
}

/// Records stored as a pretty-printed JSON array in a single file.
///
/// A missing file loads as an empty list. A file that exists but fails to
/// parse is an error: silently starting over would drop every calibration the
/// user has made.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CalibrationPersistence for JsonFilePersistence {
    fn load(&self) -> Result<Vec<CalibrationRecord>, CalibrationError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, records: &[CalibrationRecord]) -> Result<(), CalibrationError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// In-memory storage, for tests and sessions that should not touch disk.
///
/// Uses `Mutex` (not `RefCell`) so stores built on it stay `Sync`.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    records: Mutex<Vec<CalibrationRecord>>,
    saves: Mutex<usize>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with records already "on disk".
    pub fn with_records(records: Vec<CalibrationRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            saves: Mutex::new(0),
        }
    }

    /// Snapshot of what was last saved.
    pub fn saved_records(&self) -> Vec<CalibrationRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// How many times `save` has been called.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or_default()
    }
}

impl CalibrationPersistence for MemoryPersistence {
    fn load(&self) -> Result<Vec<CalibrationRecord>, CalibrationError> {
        Ok(self.saved_records())
    }

    fn save(&self, records: &[CalibrationRecord]) -> Result<(), CalibrationError> {
        if let Ok(mut stored) = self.records.lock() {
            *stored = records.to_vec();
        }
        if let Ok(mut n) = self.saves.lock() {
            *n += 1;
        }
        Ok(())
    }
}
