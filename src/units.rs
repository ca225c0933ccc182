//! Millimeter ↔ imperial/metric conversions shared by every calculator.
//!
//! The engine works in millimeters internally. Distances entered by hand (or
//! read from a depth sensor) arrive in feet, inches, or meters and are converted
//! here before reaching the optics code.
//!
//! ## Infinity Threshold
//!
//! Focus distances at or beyond [`INFINITY_FOCUS_FEET`] are treated as infinite
//! by [`focus_from_feet`]. Past that point the far limit is infinite for every
//! practical focal length/aperture pairing, so the UI shows `∞` instead of a
//! meaningless large number.

use crate::optics::FocusDistance;

/// Millimeters per inch (exact, by definition).
pub const MM_PER_INCH: f64 = 25.4;

/// Millimeters per foot (exact, by definition).
pub const MM_PER_FOOT: f64 = 304.8;

/// Millimeters per meter.
pub const MM_PER_METER: f64 = 1000.0;

/// Focus distances at or beyond this many feet are treated as infinity.
pub const INFINITY_FOCUS_FEET: f64 = 50.0;

pub fn inches_to_mm(inches: f64) -> f64 {
    inches * MM_PER_INCH
}

pub fn mm_to_inches(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

pub fn feet_to_mm(feet: f64) -> f64 {
    feet * MM_PER_FOOT
}

pub fn mm_to_feet(mm: f64) -> f64 {
    mm / MM_PER_FOOT
}

pub fn meters_to_mm(meters: f64) -> f64 {
    meters * MM_PER_METER
}

pub fn mm_to_meters(mm: f64) -> f64 {
    mm / MM_PER_METER
}

/// Combine a feet + inches entry (e.g. `10' 6"`) into millimeters.
pub fn feet_inches_to_mm(feet: f64, inches: f64) -> f64 {
    feet_to_mm(feet) + inches_to_mm(inches)
}

/// Split millimeters into whole feet and the remaining inches.
///
/// Returns `None` for infinite, NaN, or negative input.
///
/// ```
/// # use lenscalc::units::mm_to_feet_inches;
/// let (feet, inches) = mm_to_feet_inches(3200.4).unwrap();
/// assert_eq!(feet, 10);
/// assert!((inches - 6.0).abs() < 1e-9);
/// ```
pub fn mm_to_feet_inches(mm: f64) -> Option<(u32, f64)> {
    if !mm.is_finite() || mm < 0.0 {
        return None;
    }
    let total_inches = mm_to_inches(mm);
    let feet = (total_inches / 12.0).floor();
    let inches = total_inches - feet * 12.0;
    Some((feet as u32, inches))
}

/// Convert a distance in feet to a [`FocusDistance`], snapping to infinity
/// at or beyond [`INFINITY_FOCUS_FEET`].
pub fn focus_from_feet(feet: f64) -> FocusDistance {
    if feet >= INFINITY_FOCUS_FEET || feet.is_infinite() {
        FocusDistance::Infinity
    } else {
        FocusDistance::Finite(feet_to_mm(feet))
    }
}
