//! # lenscalc
//!
//! Photographic optics and exposure calculations for film and digital
//! shooters: depth of field, field of view, a calibrated crop-frame overlay
//! for phone viewfinders, and exposure planning with film reciprocity
//! correction.
//!
//! Every calculator is a pure function from inputs to a result value. Nothing
//! in the library prints, reads the clock, or touches the filesystem except
//! the calibration store's persistence collaborator.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`units`] | Millimeter, inch, foot and meter conversions; infinity-focus threshold |
//! | [`optics`] | Optical system model, depth of field, field of view, parallel DoF tables |
//! | [`calibration`] | Measured correction factors per device/lens/capture plane, with persistence |
//! | [`crop`] | Crop-frame geometry for overlaying a film format on a phone preview |
//! | [`exposure`] | EV arithmetic, filter stacks, reciprocity models, shutter-scale snapping |
//! | [`config`] | `lenscalc.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting: header line plus indented context lines |
//!
//! # Design Decisions
//!
//! ## Millimeters Everywhere
//!
//! All lengths inside the engine are millimeters, all durations seconds, all
//! angles radians (degrees only on result structs meant for display). Imperial
//! units exist only at the edges, via [`units`]. Mixing units inside a
//! formula is the classic failure mode of optics calculators; a single
//! internal unit rules it out.
//!
//! ## Infinity Is a Variant, Not a Sentinel
//!
//! Focus at infinity is [`optics::FocusDistance::Infinity`], not a magic large
//! number. Results carry `f64::INFINITY` in their far limit or linear extents so
//! arithmetic stays honest, and formatters render it as `∞`.
//!
//! ## Domain Conditions Are Data
//!
//! Errors are reserved for invalid input (a zero focal length, an unsorted
//! reciprocity table passed to a validating constructor). Conditions a
//! photographer needs to see (no calibration found, a crop frame too small to
//! display, an exposure beyond the film's published data or longer than eight
//! hours) are flags on the result.
//!
//! ## Calibration Behind Traits
//!
//! The crop calculator reads corrections through
//! [`calibration::CalibrationLookup`], and the store writes through
//! [`calibration::CalibrationPersistence`]. Tests use in-memory
//! implementations; the CLI uses a JSON file next to `lenscalc.toml`.

pub mod calibration;
pub mod config;
pub mod crop;
pub mod exposure;
pub mod optics;
pub mod output;
pub mod units;

#[cfg(test)]
pub(crate) mod test_helpers;
