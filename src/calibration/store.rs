//! In-memory calibration store with write-through persistence.

use super::{CalibrationError, CalibrationPersistence, CalibrationRecord};
use log::debug;

/// Correction found by a focal-length-agnostic lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComboMatch {
    pub correction_factor: f64,
    /// Focal length (mm) the matching record was calibrated at.
    pub calibrated_focal_length: f64,
}

/// Source of crop-frame corrections.
///
/// The crop-frame engine depends on this trait rather than on a concrete
/// store, so callers can pass a live [`CalibrationStore`], a fixed table in
/// tests, or [`NoCalibration`].
pub trait CalibrationLookup {
    fn lookup_by_combo(
        &self,
        device_model: &str,
        lens_type: &str,
        capture_plane: &str,
    ) -> Option<ComboMatch>;
}

/// Lookup that never finds a calibration (correction factor 1.0).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCalibration;

impl CalibrationLookup for NoCalibration {
    fn lookup_by_combo(&self, _: &str, _: &str, _: &str) -> Option<ComboMatch> {
        None
    }
}

/// Calibration records, newest first, backed by `P`.
#[derive(Debug)]
pub struct CalibrationStore<P: CalibrationPersistence> {
    records: Vec<CalibrationRecord>,
    persistence: P,
}

impl<P: CalibrationPersistence> CalibrationStore<P> {
    /// Load all records from `persistence` and sort them newest first.
    pub fn open(persistence: P) -> Result<Self, CalibrationError> {
        let mut records = persistence.load()?;
        sort_newest_first(&mut records);
        debug!("loaded {} calibration record(s)", records.len());
        Ok(Self {
            records,
            persistence,
        })
    }

    /// All records, newest first.
    pub fn records(&self) -> &[CalibrationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Add a record, replacing any record with the same exact key
    /// (device, lens, capture plane, focal length), then re-sort and save.
    ///
    /// The in-memory list only changes once the save succeeds.
    pub fn add(&mut self, record: CalibrationRecord) -> Result<(), CalibrationError> {
        let mut next: Vec<CalibrationRecord> = self
            .records
            .iter()
            .filter(|existing| !existing.same_key(&record))
            .cloned()
            .collect();
        let superseded = self.records.len() - next.len();
        debug!(
            "adding calibration {} for {}/{}/{} @ {}mm (superseded {})",
            record.id,
            record.device_model,
            record.lens_type,
            record.capture_plane,
            record.focal_length,
            superseded
        );
        next.push(record);
        sort_newest_first(&mut next);
        self.commit(next)
    }

    /// Delete the record with `id`.
    pub fn delete(&mut self, id: &str) -> Result<CalibrationRecord, CalibrationError> {
        let pos = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| CalibrationError::NotFound(id.to_string()))?;
        let mut next = self.records.clone();
        let removed = next.remove(pos);
        self.commit(next)?;
        debug!("deleted calibration {}", removed.id);
        Ok(removed)
    }

    /// Delete every record. Returns how many were removed.
    pub fn delete_all(&mut self) -> Result<usize, CalibrationError> {
        let count = self.records.len();
        self.commit(Vec::new())?;
        debug!("deleted all {} calibration record(s)", count);
        Ok(count)
    }

    /// Save `next`, then make it the live list. On error the store is untouched.
    fn commit(&mut self, next: Vec<CalibrationRecord>) -> Result<(), CalibrationError> {
        self.persistence.save(&next)?;
        self.records = next;
        Ok(())
    }

    /// Record matching device, lens, capture plane, and focal length.
    pub fn lookup_exact(
        &self,
        device_model: &str,
        lens_type: &str,
        capture_plane: &str,
        focal_length: f64,
    ) -> Option<&CalibrationRecord> {
        self.records
            .iter()
            .find(|r| r.matches_exact(device_model, lens_type, capture_plane, focal_length))
    }
}

impl<P: CalibrationPersistence> CalibrationLookup for CalibrationStore<P> {
    /// Most recent record for the device/lens/format pairing, any focal length.
    fn lookup_by_combo(
        &self,
        device_model: &str,
        lens_type: &str,
        capture_plane: &str,
    ) -> Option<ComboMatch> {
        self.records
            .iter()
            .find(|r| r.matches_combo(device_model, lens_type, capture_plane))
            .map(|r| ComboMatch {
                correction_factor: r.correction_factor,
                calibrated_focal_length: r.focal_length,
            })
    }
}

/// Stable sort, so records with equal dates keep their relative order.
fn sort_newest_first(records: &mut [CalibrationRecord]) {
    records.sort_by(|a, b| b.calibration_date.cmp(&a.calibration_date));
}
