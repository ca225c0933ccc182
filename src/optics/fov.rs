//! Angular and linear field of view.
//!
//! For each sensor dimension (width, height, diagonal):
//!
//! ```text
//! angle  = 2 · atan(dim / 2f)
//! linear = 2 · u · tan(angle / 2)      (∞ when u is ∞)
//! ```

use super::{FocusDistance, OpticalSystem, OpticsError, require_open_angle, require_positive};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FovResult {
    pub focal_length: f64,
    pub aperture: f64,
    pub focus_distance: FocusDistance,
    pub sensor_width: f64,
    pub sensor_height: f64,
    pub aspect_ratio: f64,
    pub horizontal_angle_deg: f64,
    pub vertical_angle_deg: f64,
    pub diagonal_angle_deg: f64,
    /// Linear extents at the focus distance in mm (`f64::INFINITY` at infinity focus).
    pub horizontal_fov_mm: f64,
    pub vertical_fov_mm: f64,
    pub diagonal_fov_mm: f64,
}

/// Angle of view in radians across a sensor dimension.
///
/// Both arguments must be positive; callers in this module validate first.
pub fn angle_of_view(dimension: f64, focal_length: f64) -> f64 {
    2.0 * (dimension / (2.0 * focal_length)).atan()
}

/// Linear extent in mm covered by `angle` (radians) at the focus distance.
pub fn linear_field(angle: f64, focus: FocusDistance) -> f64 {
    if focus.is_infinite() {
        f64::INFINITY
    } else {
        2.0 * focus.as_mm() * (angle / 2.0).tan()
    }
}

/// Compute the field of view of `system` focused at `focus`.
///
/// The diagonal is always `√(w²+h²)` here, independent of
/// `system.sensor_diagonal`, so the three extents stay geometrically consistent.
pub fn field_of_view(
    system: &OpticalSystem,
    focus: FocusDistance,
) -> Result<FovResult, OpticsError> {
    let f = require_positive("focal length", system.focal_length)?;
    let w = require_positive("sensor width", system.sensor_width)?;
    let h = require_positive("sensor height", system.sensor_height)?;
    focus.validate()?;

    let diagonal = w.hypot(h);
    let horizontal = require_open_angle("horizontal angle of view", angle_of_view(w, f))?;
    let vertical = require_open_angle("vertical angle of view", angle_of_view(h, f))?;
    let diagonal_angle =
        require_open_angle("diagonal angle of view", angle_of_view(diagonal, f))?;

    Ok(FovResult {
        focal_length: f,
        aperture: system.aperture,
        focus_distance: focus,
        sensor_width: w,
        sensor_height: h,
        aspect_ratio: w / h,
        horizontal_angle_deg: horizontal.to_degrees(),
        vertical_angle_deg: vertical.to_degrees(),
        diagonal_angle_deg: diagonal_angle.to_degrees(),
        horizontal_fov_mm: linear_field(horizontal, focus),
        vertical_fov_mm: linear_field(vertical, focus),
        diagonal_fov_mm: linear_field(diagonal_angle, focus),
    })
}
