//! Exposure calculations: required shutter speed, filters, reciprocity.
//!
//! The pipeline for one exposure is:
//!
//! ```text
//! metered settings + target aperture/ISO + compensation + filters
//!     → required shutter (EV arithmetic)          ev.rs
//!     → reciprocity-corrected duration            reciprocity.rs
//!     → nearest dial label + range classification shutter.rs
//! ```
//!
//! [`plan_exposure`] runs all three. Every step is a pure function; domain
//! conditions (correction applied, beyond the film's published data, too long
//! to display) are flags on [`ExposurePlan`], never errors.

mod ev;
mod reciprocity;
mod shutter;

pub use ev::{
    ExposureSettings, Filter, FilterStack, RequiredShutter, required_shutter,
    seconds_from_shutter_ev, shutter_ev_from_seconds,
};
pub use reciprocity::{ReciprocityError, ReciprocityModel, ReciprocityPoint, ReciprocityResult};
pub use shutter::{
    DurationClass, MAX_REPRESENTABLE_SECONDS, ShutterSpeed, classify_duration,
    nearest_shutter_speed, standard_scale,
};

use serde::Serialize;

/// Inputs for a full exposure calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureRequest {
    pub metered: ExposureSettings,
    pub target_aperture_ev: f64,
    pub target_iso_ev: f64,
    pub ev_compensation: f64,
    pub filters: FilterStack,
}

/// Result of [`plan_exposure`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExposurePlan {
    pub required: RequiredShutter,
    pub reciprocity: ReciprocityResult,
    /// Nearest dial setting to the corrected duration (`None` for an empty scale).
    pub nearest: Option<ShutterSpeed>,
    pub duration_class: DurationClass,
}

impl ExposurePlan {
    /// Final duration to expose for, in seconds.
    pub fn seconds(&self) -> f64 {
        self.reciprocity.corrected_seconds
    }

    pub fn is_out_of_range(&self) -> bool {
        self.duration_class == DurationClass::OutOfRange
    }
}

/// Required shutter → reciprocity correction → label snap → range check.
///
/// Out-of-range durations are still returned unmodified; only the
/// classification changes.
pub fn plan_exposure(
    request: &ExposureRequest,
    film: &ReciprocityModel,
    scale: &[ShutterSpeed],
    max_duration_secs: f64,
) -> ExposurePlan {
    let required = required_shutter(
        &request.metered,
        request.target_aperture_ev,
        request.target_iso_ev,
        request.ev_compensation,
        &request.filters,
    );
    let reciprocity = film.apply(required.seconds);
    let nearest = nearest_shutter_speed(reciprocity.corrected_seconds, scale).cloned();
    let duration_class = classify_duration(reciprocity.corrected_seconds, max_duration_secs);

    ExposurePlan {
        required,
        reciprocity,
        nearest,
        duration_class,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::assert_close;

    fn request(shutter_ev: f64, filter_stops: &[f64]) -> ExposureRequest {
        ExposureRequest {
            metered: ExposureSettings::new(4.0, shutter_ev, 0.0),
            target_aperture_ev: 4.0,
            target_iso_ev: 0.0,
            ev_compensation: 0.0,
            filters: FilterStack::from_stops(filter_stops),
        }
    }

    #[test]
    fn short_exposure_passes_through() {
        let film = ReciprocityModel::PowerLaw {
            cutoff: 1.0,
            exponent: 1.3,
        };
        let plan = plan_exposure(&request(7.0, &[]), &film, &standard_scale(), 28_800.0);
        assert!(!plan.reciprocity.correction_applied);
        assert_eq!(plan.nearest.as_ref().unwrap().label, "1/125");
        assert!(!plan.is_out_of_range());
    }

    #[test]
    fn nd_filter_triggers_reciprocity() {
        // 1/8s metered + 10 stops ND → 128s before correction
        let film = ReciprocityModel::PowerLaw {
            cutoff: 1.0,
            exponent: 1.3,
        };
        let plan = plan_exposure(&request(3.0, &[10.0]), &film, &standard_scale(), 28_800.0);
        assert_close(plan.required.seconds, 128.0, 1e-9);
        assert_close(plan.seconds(), 128.0_f64.powf(1.3), 1e-6);
        assert!(plan.reciprocity.correction_applied);
        assert_eq!(plan.nearest.unwrap().label, "30\"");
    }

    #[test]
    fn very_long_exposure_is_out_of_range_but_returned() {
        let film = ReciprocityModel::PowerLaw {
            cutoff: 1.0,
            exponent: 1.5,
        };
        // 2^10 = 1024s → 1024^1.5 = 32768s > 8h
        let plan = plan_exposure(&request(-10.0, &[]), &film, &standard_scale(), 28_800.0);
        assert_close(plan.seconds(), 32_768.0, 1e-6);
        assert!(plan.is_out_of_range());
    }

    #[test]
    fn empty_scale_gives_no_label() {
        let film = ReciprocityModel::None { cutoff: 1.0 };
        let plan = plan_exposure(&request(7.0, &[]), &film, &[], 28_800.0);
        assert_eq!(plan.nearest, None);
    }
}
