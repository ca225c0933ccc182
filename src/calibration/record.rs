//! Calibration record type and the measurement that produces it.

use super::CalibrationError;
use crate::optics::CapturePlane;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One empirically measured crop-frame correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    pub id: String,
    /// Hardware model identifier of the phone, e.g. `iPhone15,2`.
    pub device_model: String,
    /// Which phone lens was active, e.g. `wide`, `ultra_wide`, `telephoto`.
    pub lens_type: String,
    pub zoom_factor: f64,
    /// Name of the simulated capture plane (see [`CapturePlane::name`]).
    pub capture_plane: String,
    /// Simulated focal length (mm) the measurement was taken at.
    pub focal_length: f64,
    /// Real size of the reference object across the frame, mm.
    pub measured_object_size: f64,
    /// Distance from camera to the reference object, mm.
    pub measured_distance: f64,
    /// Field size the pinhole model predicts at `measured_distance`, mm.
    pub calculated_field_size: f64,
    /// `calculated_field_size / measured_object_size`.
    pub correction_factor: f64,
    pub calibration_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
}

impl CalibrationRecord {
    /// True when device, lens, capture plane, and focal length all match.
    pub fn matches_exact(
        &self,
        device_model: &str,
        lens_type: &str,
        capture_plane: &str,
        focal_length: f64,
    ) -> bool {
        self.matches_combo(device_model, lens_type, capture_plane)
            && self.focal_length == focal_length
    }

    /// True when device, lens, and capture plane match (focal length ignored).
    pub fn matches_combo(&self, device_model: &str, lens_type: &str, capture_plane: &str) -> bool {
        self.device_model == device_model
            && self.lens_type == lens_type
            && self.capture_plane == capture_plane
    }

    /// True when `other` would supersede this record.
    pub fn same_key(&self, other: &CalibrationRecord) -> bool {
        self.matches_exact(
            &other.device_model,
            &other.lens_type,
            &other.capture_plane,
            other.focal_length,
        )
    }

    /// Turn a finished calibration measurement into a record.
    ///
    /// The calculated field size is the linear extent the capture plane's long
    /// side covers at the measured distance: `2·u·tan(atan(long / 2f))`, which
    /// reduces to `u · long / f`.
    pub fn from_measurement(
        measurement: &CalibrationMeasurement,
        date: DateTime<Utc>,
    ) -> Result<Self, CalibrationError> {
        measurement.validate()?;

        let plane = &measurement.capture_plane;
        let calculated_field_size =
            measurement.measured_distance * plane.long_side() / measurement.focal_length;
        let correction_factor = calculated_field_size / measurement.measured_object_size;

        Ok(Self {
            id: record_id(measurement, date),
            device_model: measurement.device_model.clone(),
            lens_type: measurement.lens_type.clone(),
            zoom_factor: measurement.zoom_factor,
            capture_plane: plane.name.clone(),
            focal_length: measurement.focal_length,
            measured_object_size: measurement.measured_object_size,
            measured_distance: measurement.measured_distance,
            calculated_field_size,
            correction_factor,
            calibration_date: date,
            notes: measurement.notes.clone(),
        })
    }
}

/// Everything the user entered or measured during a calibration session.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationMeasurement {
    pub device_model: String,
    pub lens_type: String,
    pub zoom_factor: f64,
    pub capture_plane: CapturePlane,
    pub focal_length: f64,
    pub measured_object_size: f64,
    pub measured_distance: f64,
    pub notes: String,
}

impl CalibrationMeasurement {
    fn validate(&self) -> Result<(), CalibrationError> {
        if self.device_model.is_empty() || self.lens_type.is_empty() {
            return Err(CalibrationError::InvalidMeasurement(
                "device model and lens type must not be empty".into(),
            ));
        }
        if self.capture_plane.name.is_empty() {
            return Err(CalibrationError::InvalidMeasurement(
                "capture plane must be named".into(),
            ));
        }
        self.capture_plane
            .validate()
            .map_err(|e| CalibrationError::InvalidMeasurement(e.to_string()))?;
        for (field, value) in [
            ("zoom factor", self.zoom_factor),
            ("focal length", self.focal_length),
            ("measured object size", self.measured_object_size),
            ("measured distance", self.measured_distance),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CalibrationError::InvalidMeasurement(format!(
                    "{field} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Stable id: SHA-256 over the exact key and timestamp, first 16 hex chars.
fn record_id(m: &CalibrationMeasurement, date: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(m.device_model.as_bytes());
    hasher.update(b"\0");
    hasher.update(m.lens_type.as_bytes());
    hasher.update(b"\0");
    hasher.update(m.capture_plane.name.as_bytes());
    hasher.update(b"\0");
    hasher.update(m.focal_length.to_le_bytes());
    hasher.update(date.timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}
