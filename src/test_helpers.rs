//! Shared test utilities for the lenscalc test suite.
//!
//! Provides float assertions, stock optical systems, and calibration record
//! builders with deterministic timestamps.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let r = depth_of_field(&full_frame(50.0, 8.0), FocusDistance::Infinity).unwrap();
//! assert_close(r.coc, 43.2666 / 1500.0, 1e-6);
//!
//! let rec = record_with_factor("iPhone15,2", "wide", "6x7", 90.0, at(10), 1.2);
//! ```

use crate::calibration::{CalibrationMeasurement, CalibrationRecord};
use crate::optics::{CapturePlane, OpticalSystem};
use chrono::{DateTime, TimeZone, Utc};

// =========================================================================
// Floats
// =========================================================================

/// Assert `actual` is within `tolerance` of `expected`.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}

// =========================================================================
// Optics
// =========================================================================

/// 36×24mm sensor with the given lens.
pub fn full_frame(focal_length: f64, aperture: f64) -> OpticalSystem {
    OpticalSystem::new(focal_length, aperture, 36.0, 24.0)
}

/// Capture plane dimensions for a few common format names; 36×24 otherwise.
pub fn plane(name: &str) -> CapturePlane {
    match name {
        "6x6" => CapturePlane::new(name, 56.0, 56.0),
        "6x7" => CapturePlane::new(name, 56.0, 69.5),
        "4x5" => CapturePlane::new(name, 101.6, 127.0),
        _ => CapturePlane::new(name, 36.0, 24.0),
    }
}

// =========================================================================
// Calibration
// =========================================================================

/// Fixed base time plus `secs` seconds, so ordering in tests is explicit.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_760_000_000 + secs, 0).unwrap()
}

/// A plausible measurement: 1m object at 3m.
pub fn measurement(
    device: &str,
    lens: &str,
    plane_name: &str,
    focal_length: f64,
) -> CalibrationMeasurement {
    CalibrationMeasurement {
        device_model: device.to_string(),
        lens_type: lens.to_string(),
        zoom_factor: 1.0,
        capture_plane: plane(plane_name),
        focal_length,
        measured_object_size: 1000.0,
        measured_distance: 3000.0,
        notes: String::new(),
    }
}

/// Record built from [`measurement`] at `date`.
pub fn record(
    device: &str,
    lens: &str,
    plane_name: &str,
    focal_length: f64,
    date: DateTime<Utc>,
) -> CalibrationRecord {
    CalibrationRecord::from_measurement(&measurement(device, lens, plane_name, focal_length), date)
        .unwrap()
}

/// Record with an explicit correction factor.
pub fn record_with_factor(
    device: &str,
    lens: &str,
    plane_name: &str,
    focal_length: f64,
    date: DateTime<Utc>,
    correction_factor: f64,
) -> CalibrationRecord {
    CalibrationRecord {
        correction_factor,
        ..record(device, lens, plane_name, focal_length, date)
    }
}
