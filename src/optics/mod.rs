//! Optical calculations: pure functions over lens and sensor geometry.
//!
//! | Calculation | Function |
//! |---|---|
//! | **Depth of field** | [`depth_of_field`]: hyperfocal, near/far limits, total |
//! | **Field of view** | [`field_of_view`]: angular + linear extent per sensor axis |
//! | **DoF tables** | [`dof_table`]: apertures × distances, computed in parallel |
//!
//! All inputs are millimeters (focal length, sensor dimensions, distances) and
//! f-numbers. Outputs are millimeters and degrees. Nothing here performs I/O or
//! holds state; every call is independent and safe to run from any thread.
//!
//! Physical preconditions (positive focal length, aperture, sensor size) are
//! checked up front and reported as [`OpticsError`] rather than producing NaN.

mod dof;
mod fov;
mod table;

pub use dof::{DEFAULT_COC_DIVISOR, DofResult, depth_of_field, depth_of_field_with_coc};
pub use fov::{FovResult, angle_of_view, field_of_view, linear_field};
pub use table::{DofTableRow, dof_table};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpticsError {
    #[error("invalid {field}: {value} (out of range)")]
    InvalidInput { field: &'static str, value: f64 },
    #[error("focus distance {focus_mm:.1}mm is closer than the minimum {min_mm:.1}mm")]
    FocusTooClose { focus_mm: f64, min_mm: f64 },
}

/// Reject zero, negative, NaN, and infinite physical quantities.
pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<f64, OpticsError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(OpticsError::InvalidInput { field, value })
    }
}

/// Reject angles (radians) outside the open interval (0, π).
///
/// Extreme focal lengths make `2·atan(dim/2f)` round to exactly π or 0.
pub(crate) fn require_open_angle(field: &'static str, radians: f64) -> Result<f64, OpticsError> {
    if radians > 0.0 && radians < std::f64::consts::PI {
        Ok(radians)
    } else {
        Err(OpticsError::InvalidInput {
            field,
            value: radians,
        })
    }
}

/// A lens mounted in front of a sensor (or film gate).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpticalSystem {
    /// Focal length in mm.
    pub focal_length: f64,
    /// f-number (N).
    pub aperture: f64,
    /// Sensor width in mm.
    pub sensor_width: f64,
    /// Sensor height in mm.
    pub sensor_height: f64,
    /// Sensor diagonal in mm. Usually `√(w²+h²)`, but hardware may report its own.
    pub sensor_diagonal: f64,
}

impl OpticalSystem {
    /// Build a system whose diagonal is derived from width and height.
    pub fn new(focal_length: f64, aperture: f64, sensor_width: f64, sensor_height: f64) -> Self {
        Self {
            focal_length,
            aperture,
            sensor_width,
            sensor_height,
            sensor_diagonal: sensor_width.hypot(sensor_height),
        }
    }

    /// Build a system with an independently supplied diagonal.
    pub fn with_diagonal(
        focal_length: f64,
        aperture: f64,
        sensor_width: f64,
        sensor_height: f64,
        sensor_diagonal: f64,
    ) -> Self {
        Self {
            focal_length,
            aperture,
            sensor_width,
            sensor_height,
            sensor_diagonal,
        }
    }

    /// Check every physical quantity is positive and finite.
    pub fn validate(&self) -> Result<(), OpticsError> {
        require_positive("focal length", self.focal_length)?;
        require_positive("aperture", self.aperture)?;
        require_positive("sensor width", self.sensor_width)?;
        require_positive("sensor height", self.sensor_height)?;
        require_positive("sensor diagonal", self.sensor_diagonal)?;
        Ok(())
    }

    /// Width-to-height ratio of the sensor.
    pub fn aspect_ratio(&self) -> f64 {
        self.sensor_width / self.sensor_height
    }
}

/// Where the lens is focused.
///
/// Upstream code decides when a measured distance counts as infinity (see
/// [`crate::units::focus_from_feet`]); the optics code only sees the result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusDistance {
    /// Finite distance in mm.
    Finite(f64),
    Infinity,
}

impl FocusDistance {
    pub fn is_infinite(&self) -> bool {
        match self {
            FocusDistance::Infinity => true,
            FocusDistance::Finite(mm) => mm.is_infinite(),
        }
    }

    /// Distance in mm, with `f64::INFINITY` for the infinity marker.
    pub fn as_mm(&self) -> f64 {
        match self {
            FocusDistance::Finite(mm) => *mm,
            FocusDistance::Infinity => f64::INFINITY,
        }
    }

    /// Build from a `(value, is_infinity)` pair as supplied by distance sensors.
    pub fn from_parts(mm: f64, is_infinity: bool) -> Self {
        if is_infinity {
            FocusDistance::Infinity
        } else {
            FocusDistance::Finite(mm)
        }
    }

    pub(crate) fn validate(&self) -> Result<(), OpticsError> {
        match self {
            FocusDistance::Infinity => Ok(()),
            FocusDistance::Finite(mm) if mm.is_infinite() && *mm > 0.0 => Ok(()),
            FocusDistance::Finite(mm) => require_positive("focus distance", *mm).map(|_| ()),
        }
    }
}

/// The film or sensor format a simulated camera captures onto, e.g. `6x7` at 56×69.5mm.
///
/// `name` is the identity used for calibration lookups; the dimensions drive
/// the geometry. Orientation is not part of the plane: the long side is
/// horizontal in landscape and vertical in portrait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturePlane {
    pub name: String,
    pub width: f64,
    pub height: f64,
}

impl CapturePlane {
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    pub fn short_side(&self) -> f64 {
        self.width.min(self.height)
    }

    pub fn long_side(&self) -> f64 {
        self.width.max(self.height)
    }

    /// Long side over short side (always ≥ 1).
    pub fn aspect_ratio(&self) -> f64 {
        self.long_side() / self.short_side()
    }

    pub fn validate(&self) -> Result<(), OpticsError> {
        require_positive("capture plane width", self.width)?;
        require_positive("capture plane height", self.height)?;
        Ok(())
    }
}
