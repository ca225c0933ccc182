//! Depth-of-field tables: one lens, many apertures × focus distances.
//!
//! Each cell is an independent [`depth_of_field_with_coc`] call, so the grid is
//! computed with rayon. Row order matches the input order (apertures outer,
//! distances inner) regardless of how the work is scheduled.

use super::{DofResult, FocusDistance, OpticalSystem, OpticsError, depth_of_field_with_coc};
use rayon::prelude::*;

/// One aperture/distance cell of a DoF table.
#[derive(Debug, Clone, PartialEq)]
pub struct DofTableRow {
    pub aperture: f64,
    pub focus: FocusDistance,
    pub result: Result<DofResult, OpticsError>,
}

/// Compute depth of field for every `apertures × distances` combination.
///
/// The aperture of `base` is replaced by each entry of `apertures`. Cells that
/// fail validation (e.g. a focus distance inside macro range) carry their
/// error instead of aborting the whole table.
pub fn dof_table(
    base: &OpticalSystem,
    apertures: &[f64],
    distances: &[FocusDistance],
    coc_divisor: f64,
) -> Vec<DofTableRow> {
    let cells: Vec<(f64, FocusDistance)> = apertures
        .iter()
        .flat_map(|&n| distances.iter().map(move |&u| (n, u)))
        .collect();

    cells
        .into_par_iter()
        .map(|(aperture, focus)| {
            let system = OpticalSystem { aperture, ..*base };
            DofTableRow {
                aperture,
                focus,
                result: depth_of_field_with_coc(&system, focus, coc_divisor),
            }
        })
        .collect()
}
