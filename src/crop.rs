//! Crop-frame geometry: where a simulated camera's view sits on a live preview.
//!
//! The phone's camera preview shows the phone lens's field of view. A simulated
//! camera (say, a 6×7 medium-format body with a 90mm lens) sees a narrower or
//! wider slice of the same scene. This module computes the on-screen rectangle
//! that slice occupies, so the UI can draw it as an overlay.
//!
//! ```text
//! orientation   = screen_w < screen_h ? Portrait : Landscape
//! capture_horiz = Portrait ? plane.short : plane.long
//! target_fov    = 2·atan(capture_horiz / 2f)
//! base_scale    = tan(target_fov/2) / tan(device_diag_fov/2)
//! final_scale   = base_scale · correction          (correction = 1 without calibration)
//! crop_short    = preview_short · final_scale
//! crop_long     = crop_short · plane.aspect
//! ```
//!
//! The frame is visible when both sides are at least `min_display_size` and fit
//! inside the preview. Out-of-bounds frames are clamped to the preview and
//! returned with `is_visible = false` so the UI can warn instead of drawing
//! nonsense.
//!
//! Calibration lookup deliberately ignores focal length: a correction
//! characterizes the phone lens + capture format pairing, and applies to every
//! simulated focal length on that format.

use crate::calibration::CalibrationLookup;
use crate::optics::{
    CapturePlane, OpticsError, angle_of_view, require_open_angle, require_positive,
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Smallest frame side (preview pixels) still worth drawing.
pub const DEFAULT_MIN_DISPLAY_SIZE: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Portrait when the preview is taller than wide; square counts as landscape.
    pub fn from_screen(width: f64, height: f64) -> Self {
        if width < height {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }

    /// Map `(short, long)` sides to `(width, height)` for this orientation.
    pub fn orient(self, short: f64, long: f64) -> (f64, f64) {
        match self {
            Orientation::Portrait => (short, long),
            Orientation::Landscape => (long, short),
        }
    }
}

/// Everything needed to place one crop frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CropRequest {
    /// Phone model, used for calibration lookup.
    pub device_model: String,
    /// Active phone lens, used for calibration lookup.
    pub lens_type: String,
    /// Format of the simulated camera.
    pub capture_plane: CapturePlane,
    /// Simulated focal length, mm.
    pub focal_length: f64,
    /// Diagonal field of view of the active phone lens, radians.
    pub device_diagonal_fov: f64,
    /// Preview width in pixels.
    pub screen_width: f64,
    /// Preview height in pixels.
    pub screen_height: f64,
}

/// On-screen rectangle for the simulated camera, in preview pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropFrame {
    pub width: f64,
    pub height: f64,
    pub is_visible: bool,
    pub orientation: Orientation,
    /// Scale before calibration.
    pub base_scale: f64,
    /// Calibration factor applied (1.0 when none found).
    pub correction: f64,
}

/// Compute the crop frame for `request`, correcting with `calibration`.
pub fn compute_crop_frame<L>(
    request: &CropRequest,
    calibration: &L,
    min_display_size: f64,
) -> Result<CropFrame, OpticsError>
where
    L: CalibrationLookup + ?Sized,
{
    let f = require_positive("focal length", request.focal_length)?;
    let device_fov = require_open_angle("device field of view", request.device_diagonal_fov)?;
    let screen_w = require_positive("screen width", request.screen_width)?;
    let screen_h = require_positive("screen height", request.screen_height)?;
    request.capture_plane.validate()?;

    let plane = &request.capture_plane;
    let orientation = Orientation::from_screen(screen_w, screen_h);
    let capture_horizontal = match orientation {
        Orientation::Portrait => plane.short_side(),
        Orientation::Landscape => plane.long_side(),
    };

    let target_fov = require_open_angle(
        "target field of view",
        angle_of_view(capture_horizontal, f),
    )?;
    let base_scale = (target_fov / 2.0).tan() / (device_fov / 2.0).tan();

    let correction = match calibration.lookup_by_combo(
        &request.device_model,
        &request.lens_type,
        &plane.name,
    ) {
        Some(m) => {
            debug!(
                "crop calibration hit for {}/{}/{}: x{} (calibrated at {}mm)",
                request.device_model,
                request.lens_type,
                plane.name,
                m.correction_factor,
                m.calibrated_focal_length
            );
            m.correction_factor
        }
        None => {
            debug!(
                "no crop calibration for {}/{}/{}",
                request.device_model, request.lens_type, plane.name
            );
            1.0
        }
    };
    let final_scale = base_scale * correction;

    let preview_short = screen_w.min(screen_h);
    let preview_long = screen_w.max(screen_h);

    let crop_short = preview_short * final_scale;
    let crop_long = crop_short * plane.aspect_ratio();

    let is_visible = crop_short >= min_display_size
        && crop_long >= min_display_size
        && crop_short <= preview_short
        && crop_long <= preview_long;

    let crop_short = crop_short.clamp(0.0, preview_short);
    let crop_long = crop_long.clamp(0.0, preview_long);
    let (width, height) = orientation.orient(crop_short, crop_long);

    Ok(CropFrame {
        width,
        height,
        is_visible,
        orientation,
        base_scale,
        correction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{CalibrationStore, MemoryPersistence, NoCalibration};
    use crate::test_helpers::{assert_close, at, record_with_factor};

    /// Device FOV chosen so the simulated horizontal FOV matches it exactly.
    fn matched_request(screen_w: f64, screen_h: f64) -> CropRequest {
        let plane = CapturePlane::new("6x6", 56.0, 56.0);
        let device_fov = angle_of_view(56.0, 80.0);
        CropRequest {
            device_model: "iPhone15,2".into(),
            lens_type: "wide".into(),
            capture_plane: plane,
            focal_length: 80.0,
            device_diagonal_fov: device_fov,
            screen_width: screen_w,
            screen_height: screen_h,
        }
    }

    fn request_6x7(focal_length: f64) -> CropRequest {
        CropRequest {
            device_model: "iPhone15,2".into(),
            lens_type: "wide".into(),
            capture_plane: CapturePlane::new("6x7", 56.0, 69.5),
            focal_length,
            device_diagonal_fov: 77.0_f64.to_radians(),
            screen_width: 390.0,
            screen_height: 844.0,
        }
    }

    // =========================================================================
    // Orientation
    // =========================================================================

    #[test]
    fn orientation_from_screen() {
        assert_eq!(Orientation::from_screen(390.0, 844.0), Orientation::Portrait);
        assert_eq!(Orientation::from_screen(844.0, 390.0), Orientation::Landscape);
        assert_eq!(Orientation::from_screen(500.0, 500.0), Orientation::Landscape);
    }

    #[test]
    fn orient_maps_short_and_long() {
        assert_eq!(Orientation::Portrait.orient(1.0, 2.0), (1.0, 2.0));
        assert_eq!(Orientation::Landscape.orient(1.0, 2.0), (2.0, 1.0));
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    #[test]
    fn matched_fov_fills_preview_short_side() {
        let frame = compute_crop_frame(&matched_request(390.0, 844.0), &NoCalibration, 20.0).unwrap();
        assert_close(frame.base_scale, 1.0, 1e-12);
        assert_close(frame.width, 390.0, 1e-9);
        assert_close(frame.height, 390.0, 1e-9);
        assert_eq!(frame.correction, 1.0);
    }

    #[test]
    fn portrait_and_landscape_swap_sides() {
        let portrait = compute_crop_frame(&request_6x7(90.0), &NoCalibration, 20.0).unwrap();
        assert_eq!(portrait.orientation, Orientation::Portrait);
        assert!(portrait.height > portrait.width);
        assert_close(portrait.height / portrait.width, 69.5 / 56.0, 1e-9);

        let mut req = request_6x7(90.0);
        std::mem::swap(&mut req.screen_width, &mut req.screen_height);
        let landscape = compute_crop_frame(&req, &NoCalibration, 20.0).unwrap();
        assert_eq!(landscape.orientation, Orientation::Landscape);
        assert!(landscape.width > landscape.height);
    }

    #[test]
    fn longer_lens_gives_smaller_frame() {
        let normal = compute_crop_frame(&request_6x7(90.0), &NoCalibration, 20.0).unwrap();
        let tele = compute_crop_frame(&request_6x7(180.0), &NoCalibration, 20.0).unwrap();
        assert!(tele.width < normal.width);
        assert!(tele.is_visible);
    }

    #[test]
    fn wide_lens_overflows_and_clamps() {
        let frame = compute_crop_frame(&request_6x7(20.0), &NoCalibration, 20.0).unwrap();
        assert!(!frame.is_visible);
        assert_eq!(frame.width, 390.0);
        assert_eq!(frame.height, 844.0);
    }

    #[test]
    fn tiny_frame_is_not_visible_but_still_returned() {
        let frame = compute_crop_frame(&request_6x7(5000.0), &NoCalibration, 20.0).unwrap();
        assert!(!frame.is_visible);
        assert!(frame.width > 0.0 && frame.width < 20.0);
    }

    // =========================================================================
    // Calibration
    // =========================================================================

    #[test]
    fn calibration_multiplies_scale_regardless_of_focal_length() {
        let mut store = CalibrationStore::open(MemoryPersistence::new()).unwrap();
        store
            .add(record_with_factor("iPhone15,2", "wide", "6x7", 65.0, at(1), 1.2))
            .unwrap();

        let plain = compute_crop_frame(&request_6x7(90.0), &NoCalibration, 20.0).unwrap();
        let corrected = compute_crop_frame(&request_6x7(90.0), &store, 20.0).unwrap();
        assert_eq!(corrected.correction, 1.2);
        assert_close(corrected.width, plain.width * 1.2, 1e-9);
        assert_close(corrected.base_scale, plain.base_scale, 1e-15);
    }

    #[test]
    fn calibration_for_other_format_ignored() {
        let mut store = CalibrationStore::open(MemoryPersistence::new()).unwrap();
        store
            .add(record_with_factor("iPhone15,2", "wide", "4x5", 150.0, at(1), 1.5))
            .unwrap();
        let frame = compute_crop_frame(&request_6x7(90.0), &store, 20.0).unwrap();
        assert_eq!(frame.correction, 1.0);
    }

    // =========================================================================
    // Invalid input
    // =========================================================================

    #[test]
    fn invalid_request_is_error() {
        let mut req = request_6x7(90.0);
        req.device_diagonal_fov = 0.0;
        assert!(compute_crop_frame(&req, &NoCalibration, 20.0).is_err());

        let mut req = request_6x7(90.0);
        req.capture_plane.width = 0.0;
        assert!(compute_crop_frame(&req, &NoCalibration, 20.0).is_err());

        let req = request_6x7(0.0);
        assert!(compute_crop_frame(&req, &NoCalibration, 20.0).is_err());

        let mut req = request_6x7(90.0);
        req.screen_width = -390.0;
        assert!(compute_crop_frame(&req, &NoCalibration, 20.0).is_err());
    }

    #[test]
    fn device_fov_of_half_turn_or_more_is_error() {
        for fov in [
            std::f64::consts::PI,
            200.0_f64.to_radians(),
            f64::NAN,
            f64::INFINITY,
        ] {
            let mut req = request_6x7(90.0);
            req.device_diagonal_fov = fov;
            assert!(
                matches!(
                    compute_crop_frame(&req, &NoCalibration, 20.0),
                    Err(OpticsError::InvalidInput {
                        field: "device field of view",
                        ..
                    })
                ),
                "fov {fov} accepted"
            );
        }
        let mut req = request_6x7(90.0);
        req.device_diagonal_fov = 179.0_f64.to_radians();
        assert!(compute_crop_frame(&req, &NoCalibration, 20.0).is_ok());
    }
}
