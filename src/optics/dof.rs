//! Depth of field from focal length, aperture, sensor size, and focus distance.
//!
//! ```text
//! coc = diagonal / 1500
//! H   = f² / (N · coc) + f
//!
//! u ≥ H or u = ∞:   near = H / 2        far = ∞
//! otherwise:        near = H·u / (H + u − 2f)
//!                   far  = H·u / (H − u + 2f)
//! ```
//!
//! ## Boundary policy
//!
//! In the finite branch (`u < H`) the far denominator `H − u + 2f` is always
//! greater than `2f`, so it never reaches zero. The formulas stop describing a
//! real depth of field below `u = 2f` (1:1 magnification): there `near > far`.
//! Such focus distances are rejected with [`OpticsError::FocusTooClose`] so
//! that every returned result satisfies `near ≤ u ≤ far`.

use super::{FocusDistance, OpticalSystem, OpticsError, require_positive};
use serde::{Deserialize, Serialize};

/// Circle of confusion = sensor diagonal / this divisor.
pub const DEFAULT_COC_DIVISOR: f64 = 1500.0;

/// Depth-of-field result. All distances in mm; `far_limit` and `total_dof`
/// are `f64::INFINITY` when everything to infinity is acceptably sharp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DofResult {
    pub focal_length: f64,
    pub aperture: f64,
    pub focus_distance: FocusDistance,
    /// Circle of confusion in mm.
    pub coc: f64,
    pub hyperfocal: f64,
    pub near_limit: f64,
    pub far_limit: f64,
    pub total_dof: f64,
    /// True when the far limit is infinite.
    pub is_infinity: bool,
}

/// Compute depth of field with the standard `diagonal / 1500` circle of confusion.
pub fn depth_of_field(
    system: &OpticalSystem,
    focus: FocusDistance,
) -> Result<DofResult, OpticsError> {
    depth_of_field_with_coc(system, focus, DEFAULT_COC_DIVISOR)
}

/// Compute depth of field with a custom circle-of-confusion divisor.
///
/// Only the focal length, aperture, and diagonal of `system` are used.
pub fn depth_of_field_with_coc(
    system: &OpticalSystem,
    focus: FocusDistance,
    coc_divisor: f64,
) -> Result<DofResult, OpticsError> {
    let f = require_positive("focal length", system.focal_length)?;
    let n = require_positive("aperture", system.aperture)?;
    let d = require_positive("sensor diagonal", system.sensor_diagonal)?;
    let divisor = require_positive("circle of confusion divisor", coc_divisor)?;
    focus.validate()?;

    let coc = d / divisor;
    let hyperfocal = f * f / (n * coc) + f;
    if !hyperfocal.is_finite() {
        return Err(OpticsError::InvalidInput {
            field: "hyperfocal distance",
            value: hyperfocal,
        });
    }
    let u = focus.as_mm();

    let (near_limit, far_limit) = if focus.is_infinite() || u >= hyperfocal {
        (hyperfocal / 2.0, f64::INFINITY)
    } else {
        let min_focus = 2.0 * f;
        if u < min_focus {
            return Err(OpticsError::FocusTooClose {
                focus_mm: u,
                min_mm: min_focus,
            });
        }
        let near = (hyperfocal * u) / (hyperfocal + u - 2.0 * f);
        let far = (hyperfocal * u) / (hyperfocal - u + 2.0 * f);
        if !near.is_finite() {
            return Err(OpticsError::InvalidInput {
                field: "near limit",
                value: near,
            });
        }
        if !far.is_finite() {
            return Err(OpticsError::InvalidInput {
                field: "far limit",
                value: far,
            });
        }
        (near, far)
    };

    let is_infinity = far_limit.is_infinite();
    let total_dof = if is_infinity {
        f64::INFINITY
    } else {
        far_limit - near_limit
    };

    Ok(DofResult {
        focal_length: f,
        aperture: n,
        focus_distance: focus,
        coc,
        hyperfocal,
        near_limit,
        far_limit,
        total_dof,
        is_infinity,
    })
}
