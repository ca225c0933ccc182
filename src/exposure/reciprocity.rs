//! Film reciprocity-failure correction.
//!
//! Past roughly a second, film stops obeying the reciprocity law: doubling the
//! exposure time no longer doubles the exposure. Manufacturers publish the
//! correction either as a formula or as a table, and each film profile carries
//! one of four models:
//!
//! | Model | Below cutoff | At/above cutoff | Beyond table |
//! |---|---|---|---|
//! | `None` | unchanged | unchanged | never |
//! | `PowerLaw` | unchanged | `metered^exponent` | never (unbounded) |
//! | `LookupTable` | unchanged | interpolated corrected time | extrapolated from last segment |
//! | `StopCorrection` | unchanged | `metered · 2^stops`, stops interpolated | stops clamped to last entry |
//!
//! Tables must be sorted ascending by metered time. [`ReciprocityModel::validate`]
//! checks this when a profile is loaded; `apply` itself never fails and never
//! panics, even on malformed tables.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReciprocityError {
    #[error("reciprocity table has no points")]
    EmptyTable,
    #[error("reciprocity table not sorted by metered time at index {index}")]
    UnsortedTable { index: usize },
    #[error("invalid reciprocity parameter: {0}")]
    InvalidParameter(String),
}

/// One `(metered, value)` pair from a published table.
///
/// For [`ReciprocityModel::LookupTable`] the value is the corrected time in
/// seconds; for [`ReciprocityModel::StopCorrection`] it is a stop adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReciprocityPoint {
    pub metered: f64,
    pub value: f64,
}

impl From<(f64, f64)> for ReciprocityPoint {
    fn from((metered, value): (f64, f64)) -> Self {
        Self { metered, value }
    }
}

/// A film's reciprocity behaviour. Cutoffs are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ReciprocityModel {
    None {
        cutoff: f64,
    },
    PowerLaw {
        cutoff: f64,
        exponent: f64,
    },
    LookupTable {
        cutoff: f64,
        points: Vec<ReciprocityPoint>,
    },
    StopCorrection {
        cutoff: f64,
        points: Vec<ReciprocityPoint>,
    },
}

/// Outcome of applying a reciprocity model to a metered time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReciprocityResult {
    pub corrected_seconds: f64,
    pub correction_applied: bool,
    /// Metered time is longer than anything the manufacturer published.
    pub beyond_documented_range: bool,
}

impl ReciprocityResult {
    fn unchanged(metered: f64) -> Self {
        Self {
            corrected_seconds: metered,
            correction_applied: false,
            beyond_documented_range: false,
        }
    }
}

impl ReciprocityModel {
    /// Build a lookup-table model, rejecting empty or unsorted tables.
    pub fn lookup_table(
        cutoff: f64,
        points: impl IntoIterator<Item = (f64, f64)>,
    ) -> Result<Self, ReciprocityError> {
        let model = ReciprocityModel::LookupTable {
            cutoff,
            points: points.into_iter().map(Into::into).collect(),
        };
        model.validate()?;
        Ok(model)
    }

    /// Build a stop-correction model, rejecting empty or unsorted tables.
    pub fn stop_correction(
        cutoff: f64,
        points: impl IntoIterator<Item = (f64, f64)>,
    ) -> Result<Self, ReciprocityError> {
        let model = ReciprocityModel::StopCorrection {
            cutoff,
            points: points.into_iter().map(Into::into).collect(),
        };
        model.validate()?;
        Ok(model)
    }

    pub fn cutoff(&self) -> f64 {
        match self {
            ReciprocityModel::None { cutoff }
            | ReciprocityModel::PowerLaw { cutoff, .. }
            | ReciprocityModel::LookupTable { cutoff, .. }
            | ReciprocityModel::StopCorrection { cutoff, .. } => *cutoff,
        }
    }

    /// Check parameters and table ordering.
    pub fn validate(&self) -> Result<(), ReciprocityError> {
        let cutoff = self.cutoff();
        if !(cutoff.is_finite() && cutoff >= 0.0) {
            return Err(ReciprocityError::InvalidParameter(format!(
                "cutoff must be a non-negative number, got {cutoff}"
            )));
        }
        match self {
            ReciprocityModel::None { .. } => Ok(()),
            ReciprocityModel::PowerLaw { exponent, .. } => {
                if exponent.is_finite() && *exponent > 0.0 {
                    Ok(())
                } else {
                    Err(ReciprocityError::InvalidParameter(format!(
                        "exponent must be positive, got {exponent}"
                    )))
                }
            }
            ReciprocityModel::LookupTable { points, .. }
            | ReciprocityModel::StopCorrection { points, .. } => validate_points(points),
        }
    }

    /// Correct a metered exposure time (seconds).
    pub fn apply(&self, metered: f64) -> ReciprocityResult {
        match self {
            // Identical either side of the cutoff.
            ReciprocityModel::None { .. } => ReciprocityResult::unchanged(metered),
            ReciprocityModel::PowerLaw { cutoff, exponent } => {
                if metered < *cutoff {
                    return ReciprocityResult::unchanged(metered);
                }
                ReciprocityResult {
                    corrected_seconds: metered.powf(*exponent),
                    correction_applied: true,
                    beyond_documented_range: false,
                }
            }
            ReciprocityModel::LookupTable { cutoff, points } => {
                if metered < *cutoff || points.is_empty() {
                    return ReciprocityResult::unchanged(metered);
                }
                ReciprocityResult {
                    corrected_seconds: interpolate(points, metered, Edge::Extrapolate),
                    correction_applied: true,
                    beyond_documented_range: metered > max_metered(points),
                }
            }
            ReciprocityModel::StopCorrection { cutoff, points } => {
                if metered < *cutoff || points.is_empty() {
                    return ReciprocityResult::unchanged(metered);
                }
                let stops = interpolate(points, metered, Edge::Clamp);
                ReciprocityResult {
                    corrected_seconds: metered * stops.exp2(),
                    correction_applied: true,
                    beyond_documented_range: metered > max_metered(points),
                }
            }
        }
    }
}

fn validate_points(points: &[ReciprocityPoint]) -> Result<(), ReciprocityError> {
    if points.is_empty() {
        return Err(ReciprocityError::EmptyTable);
    }
    for (i, p) in points.iter().enumerate() {
        if !(p.metered.is_finite() && p.value.is_finite()) {
            return Err(ReciprocityError::InvalidParameter(format!(
                "non-finite table entry at index {i}"
            )));
        }
    }
    if let Some(i) = points.windows(2).position(|w| w[1].metered < w[0].metered) {
        return Err(ReciprocityError::UnsortedTable { index: i + 1 });
    }
    Ok(())
}

fn max_metered(points: &[ReciprocityPoint]) -> f64 {
    points
        .iter()
        .map(|p| p.metered)
        .fold(f64::NEG_INFINITY, f64::max)
}

/// What to do past the last table entry.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Edge {
    Extrapolate,
    Clamp,
}

/// Piecewise-linear value at `x`. `points` must be non-empty.
///
/// Below the first point the first value is used. At or past the last point
/// the final segment's slope is extended (`Extrapolate`) or the last value is
/// held (`Clamp`). If no bracketing pair is found (unsorted input) the last
/// value is returned.
fn interpolate(points: &[ReciprocityPoint], x: f64, edge: Edge) -> f64 {
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return x,
    };

    if x <= first.metered {
        return first.value;
    }
    if x >= last.metered {
        return match (edge, points.len()) {
            (Edge::Clamp, _) | (Edge::Extrapolate, 1) => last.value,
            (Edge::Extrapolate, n) => {
                let prev = &points[n - 2];
                let run = last.metered - prev.metered;
                if run <= 0.0 {
                    last.value
                } else {
                    last.value + (x - last.metered) * (last.value - prev.value) / run
                }
            }
        };
    }

    points
        .windows(2)
        .find(|w| w[0].metered <= x && x <= w[1].metered)
        .map(|w| lerp(&w[0], &w[1], x))
        .unwrap_or(last.value)
}

fn lerp(a: &ReciprocityPoint, b: &ReciprocityPoint, x: f64) -> f64 {
    let run = b.metered - a.metered;
    if run <= 0.0 {
        return a.value;
    }
    a.value + (x - a.metered) / run * (b.value - a.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::assert_close;

    fn table(points: &[(f64, f64)]) -> Vec<ReciprocityPoint> {
        points.iter().copied().map(Into::into).collect()
    }

    // =========================================================================
    // None
    // =========================================================================

    #[test]
    fn none_never_corrects() {
        let m = ReciprocityModel::None { cutoff: 1.0 };
        for t in [0.5, 1.0, 120.0] {
            assert_eq!(m.apply(t), ReciprocityResult::unchanged(t));
        }
    }

    // =========================================================================
    // PowerLaw
    // =========================================================================

    #[test]
    fn power_law_above_cutoff() {
        let m = ReciprocityModel::PowerLaw {
            cutoff: 1.0,
            exponent: 1.3,
        };
        let r = m.apply(60.0);
        assert_close(r.corrected_seconds, 204.9258, 1e-3);
        assert!(r.correction_applied);
        assert!(!r.beyond_documented_range);
    }

    #[test]
    fn power_law_below_cutoff_unchanged() {
        let m = ReciprocityModel::PowerLaw {
            cutoff: 1.0,
            exponent: 1.3,
        };
        assert_eq!(m.apply(0.5), ReciprocityResult::unchanged(0.5));
    }

    // =========================================================================
    // LookupTable
    // =========================================================================

    #[test]
    fn lookup_interpolates_between_points() {
        let m = ReciprocityModel::lookup_table(1.0, [(1.0, 1.0), (10.0, 15.0)]).unwrap();
        let r = m.apply(5.5);
        assert_close(r.corrected_seconds, 8.0, 1e-12);
        assert!(r.correction_applied);
        assert!(!r.beyond_documented_range);
    }

    #[test]
    fn lookup_extrapolates_final_segment() {
        let m = ReciprocityModel::lookup_table(1.0, [(1.0, 1.0), (10.0, 20.0), (30.0, 100.0)])
            .unwrap();
        let r = m.apply(40.0);
        // slope (100-20)/(30-10) = 4 → 100 + 10·4
        assert_close(r.corrected_seconds, 140.0, 1e-9);
        assert!(r.beyond_documented_range);

        let at_end = m.apply(30.0);
        assert_close(at_end.corrected_seconds, 100.0, 1e-12);
        assert!(!at_end.beyond_documented_range);
    }

    #[test]
    fn lookup_below_first_point_uses_first_value() {
        let m = ReciprocityModel::lookup_table(0.5, [(2.0, 3.0), (8.0, 20.0)]).unwrap();
        assert_eq!(m.apply(1.0).corrected_seconds, 3.0);
    }

    #[test]
    fn lookup_single_point_holds_value() {
        let m = ReciprocityModel::lookup_table(1.0, [(4.0, 9.0)]).unwrap();
        let r = m.apply(100.0);
        assert_eq!(r.corrected_seconds, 9.0);
        assert!(r.beyond_documented_range);
    }

    // =========================================================================
    // StopCorrection
    // =========================================================================

    #[test]
    fn stop_correction_interpolates_stops() {
        let m = ReciprocityModel::stop_correction(1.0, [(1.0, 0.0), (10.0, 1.0), (100.0, 2.0)])
            .unwrap();
        let r = m.apply(10.0);
        assert_close(r.corrected_seconds, 20.0, 1e-9);
        let mid = m.apply(55.0);
        assert_close(mid.corrected_seconds, 55.0 * 1.5_f64.exp2(), 1e-9);
        assert!(!mid.beyond_documented_range);
    }

    #[test]
    fn stop_correction_clamps_past_table() {
        let m = ReciprocityModel::stop_correction(1.0, [(1.0, 0.5), (10.0, 1.0)]).unwrap();
        let r = m.apply(40.0);
        assert_close(r.corrected_seconds, 80.0, 1e-9);
        assert!(r.beyond_documented_range);
        let low = m.apply(1.0);
        assert_close(low.corrected_seconds, 1.0 * 0.5_f64.exp2(), 1e-12);
    }

    #[test]
    fn table_models_respect_cutoff() {
        let m = ReciprocityModel::stop_correction(2.0, [(1.0, 1.0), (10.0, 2.0)]).unwrap();
        assert_eq!(m.apply(1.5), ReciprocityResult::unchanged(1.5));
    }

    // =========================================================================
    // Malformed tables
    // =========================================================================

    #[test]
    fn constructors_reject_bad_tables() {
        assert_eq!(
            ReciprocityModel::lookup_table(1.0, Vec::<(f64, f64)>::new()),
            Err(ReciprocityError::EmptyTable)
        );
        assert_eq!(
            ReciprocityModel::stop_correction(1.0, [(1.0, 0.0), (10.0, 1.0), (5.0, 2.0)]),
            Err(ReciprocityError::UnsortedTable { index: 2 })
        );
        let bad = ReciprocityModel::PowerLaw {
            cutoff: 1.0,
            exponent: 0.0,
        };
        assert!(matches!(
            bad.validate(),
            Err(ReciprocityError::InvalidParameter(_))
        ));
    }

    #[test]
    fn apply_on_empty_table_is_unchanged() {
        let m = ReciprocityModel::LookupTable {
            cutoff: 1.0,
            points: Vec::new(),
        };
        assert_eq!(m.apply(30.0), ReciprocityResult::unchanged(30.0));
    }

    #[test]
    fn apply_on_unsorted_table_does_not_panic() {
        let m = ReciprocityModel::LookupTable {
            cutoff: 1.0,
            points: table(&[(1.0, 1.0), (50.0, 80.0), (10.0, 12.0)]),
        };
        let r = m.apply(20.0);
        assert!(r.corrected_seconds.is_finite());
        assert!(r.correction_applied);
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    #[test]
    fn models_load_from_tagged_json() {
        let json = r#"[
            {"model": "none", "cutoff": 1.0},
            {"model": "power_law", "cutoff": 1.0, "exponent": 1.31},
            {"model": "lookup_table", "cutoff": 1.0,
             "points": [{"metered": 1, "value": 1}, {"metered": 10, "value": 15}]},
            {"model": "stop_correction", "cutoff": 0.5,
             "points": [{"metered": 1, "value": 0.33}, {"metered": 10, "value": 1}]}
        ]"#;
        let models: Vec<ReciprocityModel> = serde_json::from_str(json).unwrap();
        assert_eq!(models.len(), 4);
        assert!(matches!(models[1], ReciprocityModel::PowerLaw { exponent, .. } if exponent == 1.31));
        for m in &models {
            assert!(m.validate().is_ok());
        }
    }
}
