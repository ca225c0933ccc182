//! Exposure-value arithmetic.
//!
//! Aperture, shutter, and ISO each contribute a log2-scaled offset. The offsets
//! come from lookup tables outside this crate; only their sums matter here.

use serde::{Deserialize, Serialize};

/// EV offsets for one combination of aperture, shutter speed, and ISO.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExposureSettings {
    pub aperture_ev: f64,
    pub shutter_ev: f64,
    pub iso_ev: f64,
}

impl ExposureSettings {
    pub fn new(aperture_ev: f64, shutter_ev: f64, iso_ev: f64) -> Self {
        Self {
            aperture_ev,
            shutter_ev,
            iso_ev,
        }
    }

    pub fn total_ev(&self) -> f64 {
        self.aperture_ev + self.shutter_ev + self.iso_ev
    }
}

/// A single filter in front of the lens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub name: String,
    /// Light loss in stops (e.g. 3.0 for an ND8).
    pub stops: f64,
}

/// Filters stacked in front of the lens. Order is kept for display only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterStack {
    pub filters: Vec<Filter>,
}

impl FilterStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stack from bare stop values, unnamed.
    pub fn from_stops(stops: &[f64]) -> Self {
        Self {
            filters: stops
                .iter()
                .map(|&stops| Filter {
                    name: String::new(),
                    stops,
                })
                .collect(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, stops: f64) {
        self.filters.push(Filter {
            name: name.into(),
            stops,
        });
    }

    pub fn total_stops(&self) -> f64 {
        self.filters.iter().map(|f| f.stops).sum()
    }
}

/// Required shutter speed for a target aperture/ISO.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequiredShutter {
    pub shutter_ev: f64,
    pub seconds: f64,
}

/// Shutter EV for a duration: `−log2(seconds)`.
pub fn shutter_ev_from_seconds(seconds: f64) -> f64 {
    -seconds.log2()
}

/// Duration for a shutter EV: `2^(−ev)`.
pub fn seconds_from_shutter_ev(shutter_ev: f64) -> f64 {
    (-shutter_ev).exp2()
}

/// Shutter speed that keeps the metered exposure at a new aperture and ISO.
///
/// ```text
/// base       = metered.total + compensation − Σ filter stops
/// shutter_ev = base − target_aperture_ev − target_iso_ev
/// seconds    = 2^(−shutter_ev)
/// ```
pub fn required_shutter(
    metered: &ExposureSettings,
    target_aperture_ev: f64,
    target_iso_ev: f64,
    ev_compensation: f64,
    filters: &FilterStack,
) -> RequiredShutter {
    let base_ev = metered.total_ev() + ev_compensation - filters.total_stops();
    let shutter_ev = base_ev - target_aperture_ev - target_iso_ev;
    RequiredShutter {
        shutter_ev,
        seconds: seconds_from_shutter_ev(shutter_ev),
    }
}
