//! Empirical crop-frame calibration records and their store.
//!
//! The geometric crop-frame projection assumes an ideal pinhole model for both
//! the phone camera and the simulated camera. Real phone lenses crop, distort,
//! and report slightly wrong fields of view, so users can calibrate: photograph
//! an object of known size at a known distance, measure how much of the frame
//! it fills, and save the ratio as a correction factor.
//!
//! # Records
//!
//! A [`CalibrationRecord`] is keyed by `(device model, lens type, capture plane,
//! focal length)`. Adding a record with an existing key supersedes the old one.
//!
//! # Lookups
//!
//! - [`CalibrationStore::lookup_exact`] matches the full key.
//! - [`CalibrationStore::lookup_by_combo`] ignores focal length and returns the
//!   most recent record for a device/lens/format pairing. This is what the
//!   crop-frame engine uses: the correction characterizes the pairing, not the
//!   simulated focal length.
//!
//! # Storage
//!
//! The store owns a [`CalibrationPersistence`] and writes the full record list
//! (newest first) after every mutation. [`JsonFilePersistence`] keeps it in a
//! single JSON array on disk; [`MemoryPersistence`] keeps it in memory.
//!
//! # Concurrency
//!
//! The store is plain owned data with `&mut self` mutation. Share it between
//! threads behind a `Mutex` so `add()` (dedupe + re-sort + save) is never
//! observed half-done.

mod persistence;
mod record;
mod store;

pub use persistence::{CalibrationPersistence, JsonFilePersistence, MemoryPersistence};
pub use record::{CalibrationMeasurement, CalibrationRecord};
pub use store::{CalibrationLookup, CalibrationStore, ComboMatch, NoCalibration};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid calibration measurement: {0}")]
    InvalidMeasurement(String),
    #[error("No calibration record with id {0}")]
    NotFound(String),
}
