//! Shutter-speed scales, label snapping, and duration range classification.

use serde::{Deserialize, Serialize};

/// Longest duration (8 hours) shown as a number; anything longer is "out of range".
pub const MAX_REPRESENTABLE_SECONDS: f64 = 8.0 * 60.0 * 60.0;

/// One labelled stop on a camera's shutter dial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShutterSpeed {
    pub label: String,
    pub seconds: f64,
}

impl ShutterSpeed {
    pub fn new(label: impl Into<String>, seconds: f64) -> Self {
        Self {
            label: label.into(),
            seconds,
        }
    }
}

/// Whether a duration can be displayed as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationClass {
    InRange,
    OutOfRange,
}

/// Classify `seconds` against `max_seconds`. NaN counts as out of range.
pub fn classify_duration(seconds: f64, max_seconds: f64) -> DurationClass {
    if seconds <= max_seconds {
        DurationClass::InRange
    } else {
        DurationClass::OutOfRange
    }
}

/// Scale entry closest to `seconds` by absolute difference.
///
/// Ties go to the earlier entry. Returns `None` only for an empty scale.
pub fn nearest_shutter_speed(seconds: f64, scale: &[ShutterSpeed]) -> Option<&ShutterSpeed> {
    let mut best: Option<(&ShutterSpeed, f64)> = None;
    for speed in scale {
        let diff = (speed.seconds - seconds).abs();
        if best.is_none_or(|(_, best_diff)| diff < best_diff) {
            best = Some((speed, diff));
        }
    }
    best.map(|(speed, _)| speed)
}

/// Third-stop shutter scale from 1/8000 s to 30 s, fastest first.
pub fn standard_scale() -> Vec<ShutterSpeed> {
    const FRACTIONS: &[u32] = &[
        8000, 6400, 5000, 4000, 3200, 2500, 2000, 1600, 1250, 1000, 800, 640, 500, 400, 320, 250,
        200, 160, 125, 100, 80, 60, 50, 40, 30, 25, 20, 15, 13, 10, 8, 6, 5, 4, 3,
    ];
    const WHOLE: &[(&str, f64)] = &[
        ("0.4\"", 0.4),
        ("0.5\"", 0.5),
        ("0.6\"", 0.6),
        ("0.8\"", 0.8),
        ("1\"", 1.0),
        ("1.3\"", 1.3),
        ("1.6\"", 1.6),
        ("2\"", 2.0),
        ("2.5\"", 2.5),
        ("3.2\"", 3.2),
        ("4\"", 4.0),
        ("5\"", 5.0),
        ("6\"", 6.0),
        ("8\"", 8.0),
        ("10\"", 10.0),
        ("13\"", 13.0),
        ("15\"", 15.0),
        ("20\"", 20.0),
        ("25\"", 25.0),
        ("30\"", 30.0),
    ];

    FRACTIONS
        .iter()
        .map(|&d| ShutterSpeed::new(format!("1/{d}"), 1.0 / d as f64))
        .chain(WHOLE.iter().map(|&(label, s)| ShutterSpeed::new(label, s)))
        .collect()
}
