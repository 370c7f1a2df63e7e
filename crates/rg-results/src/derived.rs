//! Results computed from other results or from grid geometry.

use rayon::prelude::*;
use rg_core::{UNDEFINED_VALUE, is_missing};
use rg_grid::{FaceType, MainGrid};

use crate::address::ResultAddress;
use crate::store::CellResultsStore;
use crate::{ResultsError, ResultsResult};

/// Saturations subtracted from one to give SOIL.
const SATURATIONS: [&str; 3] = ["SWAT", "SGAS", "SSOL"];

pub const DEPTH_RELATED_RESULTS: [&str; 6] = ["DEPTH", "DX", "DY", "DZ", "TOPS", "BOTTOM"];

/// Compute `SOIL = 1 - SWAT - SGAS - SSOL` for one time step from the
/// saturations loaded at that step.
///
/// Needs SWAT or SGAS; SSOL is optional. A cell is missing when any of the
/// loaded saturations is missing there. Returns `false` when nothing was
/// computed: no input is loaded, or SOIL already holds values.
pub fn compute_soil_for_time_step(store: &mut CellResultsStore, time_step: usize) -> ResultsResult<bool> {
    let loaded: Vec<ResultAddress> = SATURATIONS
        .iter()
        .map(|name| ResultAddress::dynamic_native(*name))
        .filter(|addr| {
            store
                .cell_scalar_results(addr, time_step)
                .is_ok_and(|values| !values.is_empty())
        })
        .collect();
    if !loaded.iter().any(|addr| addr.name != "SSOL") {
        return Ok(false);
    }

    let soil = ResultAddress::dynamic_native("SOIL");
    store.add_empty_scalar_result(&soil);
    let infos = loaded
        .iter()
        .filter_map(|addr| store.time_step_infos(addr).ok())
        .max_by_key(|infos| infos.len())
        .map(<[_]>::to_vec)
        .unwrap_or_default();
    if store.time_step_count(&soil) < infos.len() {
        store.set_time_step_infos(&soil, infos)?;
    }
    if !store.cell_scalar_results(&soil, time_step)?.is_empty() {
        return Ok(false);
    }

    let inputs = loaded
        .iter()
        .map(|addr| store.cell_scalar_results(addr, time_step))
        .collect::<ResultsResult<Vec<_>>>()?;
    let count = inputs.iter().map(|v| v.len()).max().unwrap_or(0);
    let values: Vec<f64> = (0..count)
        .into_par_iter()
        .map(|cell| {
            let mut soil = 1.0;
            for input in &inputs {
                match input.get(cell) {
                    Some(&s) if !is_missing(s) => soil -= s,
                    _ => return UNDEFINED_VALUE,
                }
            }
            soil
        })
        .collect();

    store.set_cell_scalar_result(&soil, time_step, values)?;
    tracing::debug!(time_step, inputs = loaded.len(), "SOIL computed");
    Ok(true)
}

/// Compute the static geometry results DEPTH, DX, DY, DZ, TOPS and BOTTOM,
/// active addressed.
///
/// Results that already hold one value per active cell are kept. Returns the
/// number of results computed.
pub fn compute_depth_related_results(store: &mut CellResultsStore, grid: &MainGrid) -> ResultsResult<usize> {
    let active_count = store.active_cell_count();
    if active_count == 0 {
        return Ok(0);
    }
    if grid.total_cell_count() != store.global_cell_count() {
        return Err(ResultsError::GridCellCountMismatch {
            grid: grid.total_cell_count(),
            results: store.global_cell_count(),
        });
    }

    let pending: Vec<(usize, ResultAddress)> = DEPTH_RELATED_RESULTS
        .iter()
        .enumerate()
        .map(|(slot, name)| (slot, ResultAddress::static_native(*name)))
        .filter(|(_, addr)| {
            store
                .cell_scalar_results(addr, 0)
                .map_or(true, |values| values.len() < active_count)
        })
        .collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let active = store.active_cell_info();
    let per_cell: Vec<[f64; 6]> = (0..active_count)
        .into_par_iter()
        .map(|index| {
            active
                .global_cell_index(index)
                .and_then(|global| depth_related_values(grid, global))
                .unwrap_or([UNDEFINED_VALUE; 6])
        })
        .collect();

    for (slot, addr) in &pending {
        let values = per_cell.iter().map(|cell| cell[*slot]).collect();
        if store.time_step_count(addr) == 0 {
            store.add_static_scalar_result(addr, active_count)?;
        } else {
            // Replaced wholesale; drop the short array first so the new
            // length is not checked against it.
            store.set_cell_scalar_result(addr, 0, Vec::new())?;
        }
        store.set_cell_scalar_result(addr, 0, values)?;
    }

    tracing::debug!(computed = pending.len(), cells = active_count, "depth related results computed");
    Ok(pending.len())
}

/// DEPTH, DX, DY, DZ, TOPS, BOTTOM of one cell.
fn depth_related_values(grid: &MainGrid, global: usize) -> Option<[f64; 6]> {
    let face = |f: FaceType| grid.face_center(global, f);
    let width = |neg: FaceType, pos: FaceType| Some((face(neg)? - face(pos)?).norm());
    Some([
        grid.cell_center(global)?.z.abs(),
        width(FaceType::NegI, FaceType::PosI)?,
        width(FaceType::NegJ, FaceType::PosJ)?,
        width(FaceType::NegK, FaceType::PosK)?,
        face(FaceType::NegK)?.z.abs(),
        face(FaceType::PosK)?.z.abs(),
    ])
}
