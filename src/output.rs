//! CLI output formatting for every subcommand.
//!
//! # Display Contract
//!
//! Every result follows the same two-level pattern:
//!
//! 1. **Header line**: what was computed, with the key inputs
//! 2. **Context lines**: indented `Label: value` pairs
//!
//! ```text
//! Depth of field: 50mm f/8
//!     Focus: 3000.0mm (9' 10.1")
//!     Circle of confusion: 0.0288mm
//!     Hyperfocal: 10884.0mm (35' 8.5")
//!     Near: 2368.8mm (7' 9.3")
//!     Far: 4089.7mm (13' 5.0")
//!     Total: 1720.8mm (5' 7.7")
//! ```
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and is printed with [`print_lines`]. Format functions are pure:
//! no I/O, no side effects.

use crate::calibration::CalibrationRecord;
use crate::crop::CropFrame;
use crate::exposure::{DurationClass, ExposurePlan};
use crate::optics::{DofResult, DofTableRow, FocusDistance, FovResult};
use crate::units::mm_to_feet_inches;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Indented `Label: value` context line.
fn field(label: &str, value: impl std::fmt::Display) -> String {
    format!("    {}: {}", label, value)
}

/// Millimeters with a feet-inches hint; `∞` for infinite values.
fn format_distance(mm: f64) -> String {
    match mm_to_feet_inches(mm) {
        Some((feet, inches)) => format!("{:.1}mm ({}' {:.1}\")", mm, feet, inches),
        None if mm.is_infinite() => "∞".to_string(),
        None => format!("{}mm", mm),
    }
}

fn format_focus(focus: FocusDistance) -> String {
    format_distance(focus.as_mm())
}

/// Seconds as `1/N` below one second, otherwise decimal seconds.
fn format_seconds(seconds: f64) -> String {
    if seconds > 0.0 && seconds < 1.0 {
        format!("1/{:.0}s", 1.0 / seconds)
    } else {
        format!("{:.1}s", seconds)
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// Write formatted lines to stdout.
pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Optics
// ============================================================================

pub fn format_dof(r: &DofResult) -> Vec<String> {
    vec![
        format!("Depth of field: {}mm f/{}", r.focal_length, r.aperture),
        field("Focus", format_focus(r.focus_distance)),
        field("Circle of confusion", format!("{:.4}mm", r.coc)),
        field("Hyperfocal", format_distance(r.hyperfocal)),
        field("Near", format_distance(r.near_limit)),
        field("Far", format_distance(r.far_limit)),
        field("Total", format_distance(r.total_dof)),
    ]
}

pub fn format_fov(r: &FovResult) -> Vec<String> {
    vec![
        format!(
            "Field of view: {}mm on {}×{}mm",
            r.focal_length, r.sensor_width, r.sensor_height
        ),
        field("Focus", format_focus(r.focus_distance)),
        field(
            "Horizontal",
            format!(
                "{:.2}° / {}",
                r.horizontal_angle_deg,
                format_distance(r.horizontal_fov_mm)
            ),
        ),
        field(
            "Vertical",
            format!(
                "{:.2}° / {}",
                r.vertical_angle_deg,
                format_distance(r.vertical_fov_mm)
            ),
        ),
        field(
            "Diagonal",
            format!(
                "{:.2}° / {}",
                r.diagonal_angle_deg,
                format_distance(r.diagonal_fov_mm)
            ),
        ),
        field("Aspect ratio", format!("{:.3}", r.aspect_ratio)),
    ]
}

/// One line per table cell: aperture, focus, near → far (or the error).
pub fn format_dof_table(focal_length: f64, rows: &[DofTableRow]) -> Vec<String> {
    let mut lines = vec![format!("Depth of field table: {}mm", focal_length)];
    for row in rows {
        let detail = match &row.result {
            Ok(r) => format!(
                "{} → {} (total {})",
                format_distance(r.near_limit),
                format_distance(r.far_limit),
                format_distance(r.total_dof)
            ),
            Err(e) => format!("error: {}", e),
        };
        lines.push(format!(
            "    f/{} @ {}: {}",
            row.aperture,
            format_focus(row.focus),
            detail
        ));
    }
    lines
}

// ============================================================================
// Crop frame
// ============================================================================

pub fn format_crop(frame: &CropFrame) -> Vec<String> {
    let mut lines = vec![
        format!("Crop frame: {:.1} × {:.1}px", frame.width, frame.height),
        field("Orientation", format!("{:?}", frame.orientation).to_lowercase()),
        field("Base scale", format!("{:.4}", frame.base_scale)),
        field("Calibration", format!("×{:.4}", frame.correction)),
        field("Visible", yes_no(frame.is_visible)),
    ];
    if !frame.is_visible {
        lines.push("    Warning: frame is too small or larger than the preview".to_string());
    }
    lines
}

// ============================================================================
// Exposure
// ============================================================================

pub fn format_exposure(plan: &ExposurePlan) -> Vec<String> {
    let mut lines = vec![
        format!("Exposure: {}", format_seconds(plan.seconds())),
        field(
            "Required (before reciprocity)",
            format_seconds(plan.required.seconds),
        ),
        field(
            "Reciprocity correction",
            yes_no(plan.reciprocity.correction_applied),
        ),
    ];
    if plan.reciprocity.beyond_documented_range {
        lines.push("    Warning: beyond the film's published reciprocity data".to_string());
    }
    if let Some(nearest) = &plan.nearest {
        lines.push(field("Nearest setting", &nearest.label));
    }
    if plan.duration_class == DurationClass::OutOfRange {
        lines.push("    Warning: duration out of range".to_string());
    }
    lines
}

// ============================================================================
// Calibration
// ============================================================================

/// List records newest first, indexed from 001.
pub fn format_calibrations(records: &[CalibrationRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec!["No calibrations".to_string()];
    }
    let mut lines = vec!["Calibrations".to_string()];
    for (i, r) in records.iter().enumerate() {
        lines.push(format!(
            "{} {} / {} / {} @ {}mm",
            format_index(i + 1),
            r.device_model,
            r.lens_type,
            r.capture_plane,
            r.focal_length
        ));
        lines.push(field("Id", &r.id));
        lines.push(field("Correction", format!("×{:.4}", r.correction_factor)));
        lines.push(field(
            "Date",
            r.calibration_date.format("%Y-%m-%d %H:%M UTC"),
        ));
        if !r.notes.is_empty() {
            lines.push(field("Notes", &r.notes));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::Orientation;
    use crate::exposure::{
        ExposureRequest, ExposureSettings, FilterStack, ReciprocityModel, plan_exposure,
        standard_scale,
    };
    use crate::optics::{depth_of_field, field_of_view};
    use crate::test_helpers::{at, full_frame, record};

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn index_is_zero_padded() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
    }

    #[test]
    fn distance_formats() {
        assert_eq!(format_distance(f64::INFINITY), "∞");
        assert_eq!(format_distance(304.8), "304.8mm (1' 0.0\")");
    }

    #[test]
    fn seconds_formats() {
        assert_eq!(format_seconds(1.0 / 125.0), "1/125s");
        assert_eq!(format_seconds(30.0), "30.0s");
    }

    // =========================================================================
    // Commands
    // =========================================================================

    #[test]
    fn dof_lines() {
        let r = depth_of_field(&full_frame(50.0, 8.0), FocusDistance::Infinity).unwrap();
        let lines = format_dof(&r);
        assert_eq!(lines[0], "Depth of field: 50mm f/8");
        assert_eq!(lines[1], "    Focus: ∞");
        assert_eq!(lines[5], "    Far: ∞");
    }

    #[test]
    fn fov_lines() {
        let r = field_of_view(&full_frame(50.0, 8.0), FocusDistance::Infinity).unwrap();
        let lines = format_fov(&r);
        assert_eq!(lines[0], "Field of view: 50mm on 36×24mm");
        assert_eq!(lines[2], "    Horizontal: 39.60° / ∞");
    }

    #[test]
    fn crop_warning_only_when_invisible() {
        let mut frame = CropFrame {
            width: 100.0,
            height: 125.0,
            is_visible: true,
            orientation: Orientation::Portrait,
            base_scale: 0.5,
            correction: 1.0,
        };
        assert_eq!(format_crop(&frame).len(), 5);
        assert_eq!(format_crop(&frame)[1], "    Orientation: portrait");
        frame.is_visible = false;
        assert!(format_crop(&frame).last().unwrap().contains("Warning"));
    }

    #[test]
    fn exposure_lines() {
        let request = ExposureRequest {
            metered: ExposureSettings::new(4.0, 7.0, 0.0),
            target_aperture_ev: 4.0,
            target_iso_ev: 0.0,
            ev_compensation: 0.0,
            filters: FilterStack::new(),
        };
        let plan = plan_exposure(
            &request,
            &ReciprocityModel::None { cutoff: 1.0 },
            &standard_scale(),
            28_800.0,
        );
        let lines = format_exposure(&plan);
        assert_eq!(lines[0], "Exposure: 1/128s");
        assert!(lines.contains(&"    Nearest setting: 1/125".to_string()));
        assert!(!lines.iter().any(|l| l.contains("Warning")));
    }

    #[test]
    fn calibration_list() {
        assert_eq!(format_calibrations(&[]), vec!["No calibrations"]);
        let lines = format_calibrations(&[record("iPhone15,2", "wide", "6x7", 90.0, at(0))]);
        assert_eq!(lines[0], "Calibrations");
        assert_eq!(lines[1], "001 iPhone15,2 / wide / 6x7 @ 90mm");
        assert!(lines[3].starts_with("    Correction: ×"));
    }
}
