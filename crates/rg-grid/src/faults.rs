//! Geometric fault-face detection.
//!
//! A face is a fault face when the cell's face corners do not coincide with
//! the corners of the IJK neighbour's opposite face. Every cell only writes
//! its own flags, so K layers are processed in parallel.

use rayon::prelude::*;
use rg_core::timing::Timer;
use rg_core::{Length, in_meters, m};

use crate::active_cells::ActiveCellInfo;
use crate::error::{GridError, GridResult};
use crate::face::{FaceSet, FaceType, OPPOSITE_FACE_CORNER};
use crate::geometry::Point3;
use crate::grid::Grid;
use crate::main_grid::MainGrid;

/// Fault detection configuration.
#[derive(Debug, Clone, Copy)]
pub struct FaultDetectionConfig {
    /// Maximum corner distance for two faces to count as shared.
    pub tolerance: Length,
    /// Also compare K faces (top/bottom), not only I and J faces.
    pub include_k_faces: bool,
}

impl Default for FaultDetectionConfig {
    fn default() -> Self {
        Self {
            tolerance: m(1e-6),
            include_k_faces: true,
        }
    }
}

/// Fault flags of one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CellFaultFlags {
    pub(crate) faults: FaceSet,
    /// Subset of `faults` where this cell or the neighbour is inactive.
    pub(crate) with_inactive: FaceSet,
}

/// A fault face listed once per cell pair, from the lower global index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultFace {
    pub cell: usize,
    pub face: FaceType,
    pub neighbor: usize,
    pub with_inactive: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultDetectionSummary {
    /// Flagged (cell, face) pairs, counting both sides of a fault.
    pub flagged_cell_faces: usize,
    /// Flagged (cell, face) pairs touching an inactive cell.
    pub flagged_with_inactive: usize,
}

impl MainGrid {
    /// Detect fault faces on every grid of the arena.
    ///
    /// With `active` supplied, faults where either cell is inactive are also
    /// tagged "with inactive". Results replace any previous detection.
    pub fn compute_fault_faces(
        &mut self,
        config: &FaultDetectionConfig,
        active: Option<&ActiveCellInfo>,
    ) -> GridResult<FaultDetectionSummary> {
        if let Some(info) = active
            && info.reservoir_cell_count() != self.total_cell_count()
        {
            return Err(GridError::ReservoirCellCountMismatch {
                len: info.reservoir_cell_count(),
                expected: self.total_cell_count(),
            });
        }

        let timer = Timer::start("fault detection");
        let tolerance = in_meters(config.tolerance);
        let mut flags = vec![CellFaultFlags::default(); self.total_cell_count()];

        let this = &*self;
        for grid in &this.grids {
            let range = grid.cell_offset()..grid.cell_offset() + grid.cell_count();
            flags[range]
                .par_chunks_mut(grid.layer_size())
                .enumerate()
                .for_each(|(k, layer)| {
                    this.detect_layer(grid, k, layer, tolerance, config.include_k_faces, active);
                });
        }

        let summary = FaultDetectionSummary {
            flagged_cell_faces: flags.iter().map(|f| f.faults.len()).sum(),
            flagged_with_inactive: flags.iter().map(|f| f.with_inactive.len()).sum(),
        };
        tracing::info!(
            flagged = summary.flagged_cell_faces,
            with_inactive = summary.flagged_with_inactive,
            "fault faces detected"
        );
        timer.stop_and_log();

        self.fault_flags = Some(flags);
        Ok(summary)
    }

    fn detect_layer(
        &self,
        grid: &Grid,
        k: usize,
        layer: &mut [CellFaultFlags],
        tolerance: f64,
        include_k_faces: bool,
        active: Option<&ActiveCellInfo>,
    ) {
        let nx = grid.cell_count_i();
        for (in_layer, slot) in layer.iter_mut().enumerate() {
            let (i, j) = (in_layer % nx, in_layer / nx);
            let global = grid.global_cell_index(grid.cell_index_from_ijk(i, j, k));
            let cell = &self.cells[global];
            if cell.is_invalid() {
                continue;
            }
            let cell_active = active.is_none_or(|a| a.is_active(global));

            for face in FaceType::ALL {
                if face.is_k_face() && !include_k_faces {
                    continue;
                }
                let Some(nb_local) = grid.cell_ijk_neighbor(i, j, k, face) else {
                    continue;
                };
                let nb_global = grid.global_cell_index(nb_local);
                let neighbor = &self.cells[nb_global];
                if neighbor.is_invalid() {
                    continue;
                }

                let own = cell.face_indices(face);
                let other = neighbor.face_indices(face.opposite());
                if faces_coincide(&self.nodes, &own, &other, tolerance) {
                    continue;
                }

                slot.faults.insert(face);
                let nb_active = active.is_none_or(|a| a.is_active(nb_global));
                if !(cell_active && nb_active) {
                    slot.with_inactive.insert(face);
                }
            }
        }
    }

    /// Whether fault detection has run since the last topology change.
    pub fn has_fault_data(&self) -> bool {
        self.fault_flags.is_some()
    }

    pub fn is_fault_face(&self, global: usize, face: FaceType) -> bool {
        self.fault_flags
            .as_ref()
            .and_then(|f| f.get(global))
            .is_some_and(|f| f.faults.contains(face))
    }

    /// Fault faces of one cell; empty before detection.
    pub fn fault_face_set(&self, global: usize) -> FaceSet {
        self.fault_flags
            .as_ref()
            .and_then(|f| f.get(global))
            .map(|f| f.faults)
            .unwrap_or_default()
    }

    /// Flagged (cell, face) pairs; each fault is counted from both sides.
    pub fn fault_face_count(&self) -> usize {
        self.fault_flags
            .as_ref()
            .map_or(0, |f| f.iter().map(|c| c.faults.len()).sum())
    }

    /// Every fault face once, from the cell with the lower global index.
    pub fn fault_faces(&self) -> Vec<FaultFace> {
        let Some(flags) = &self.fault_flags else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for (cell, f) in flags.iter().enumerate() {
            for face in f.faults.iter() {
                let Some(neighbor) = self.cell_ijk_neighbor(cell, face) else {
                    continue;
                };
                if cell < neighbor {
                    out.push(FaultFace {
                        cell,
                        face,
                        neighbor,
                        with_inactive: f.with_inactive.contains(face),
                    });
                }
            }
        }
        out
    }
}

fn faces_coincide(nodes: &[Point3<f64>], own: &[usize; 4], other: &[usize; 4], tolerance: f64) -> bool {
    own.iter()
        .zip(OPPOSITE_FACE_CORNER)
        .all(|(&a, n)| nalgebra::distance(&nodes[a], &nodes[other[n]]) <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::main_grid::LocalGridSpec;

    /// 4x1x1 box grid with the two right-most cells shifted down by `throw`.
    fn faulted_line(throw: f64) -> MainGrid {
        let mut grid = MainGrid::box_grid("MAIN", [4, 1, 1], [1.0, 1.0, 1.0]).unwrap();
        for cell in 2..4 {
            let corners = *grid.cells[cell].corner_indices();
            for n in corners {
                grid.nodes[n].z -= throw;
            }
        }
        grid
    }

    #[test]
    fn unfaulted_grid_has_no_faults() {
        let mut grid = MainGrid::box_grid("MAIN", [3, 3, 3], [1.0, 2.0, 0.5]).unwrap();
        let summary = grid.compute_fault_faces(&FaultDetectionConfig::default(), None).unwrap();
        assert_eq!(summary.flagged_cell_faces, 0);
        assert!(grid.has_fault_data());
        assert!(grid.fault_faces().is_empty());
    }

    #[test]
    fn throw_marks_both_sides() {
        let mut grid = faulted_line(0.5);
        let summary = grid.compute_fault_faces(&FaultDetectionConfig::default(), None).unwrap();
        assert_eq!(summary.flagged_cell_faces, 2);
        assert!(grid.is_fault_face(1, FaceType::PosI));
        assert!(grid.is_fault_face(2, FaceType::NegI));
        assert!(!grid.is_fault_face(0, FaceType::PosI));
        assert!(!grid.is_fault_face(2, FaceType::PosI));

        let faces = grid.fault_faces();
        assert_eq!(faces.len(), 1);
        assert_eq!(
            faces[0],
            FaultFace {
                cell: 1,
                face: FaceType::PosI,
                neighbor: 2,
                with_inactive: false
            }
        );
    }

    #[test]
    fn displacement_within_tolerance_is_ignored() {
        let mut grid = faulted_line(1e-8);
        let summary = grid.compute_fault_faces(&FaultDetectionConfig::default(), None).unwrap();
        assert_eq!(summary.flagged_cell_faces, 0);
    }

    #[test]
    fn invalid_neighbor_is_skipped() {
        let mut grid = faulted_line(0.5);
        grid.set_cell_invalid(2, true).unwrap();
        assert!(!grid.has_fault_data());
        let summary = grid.compute_fault_faces(&FaultDetectionConfig::default(), None).unwrap();
        assert_eq!(summary.flagged_cell_faces, 0);
    }

    #[test]
    fn inactive_cells_are_tagged() {
        let mut grid = faulted_line(0.5);
        let active = ActiveCellInfo::from_mask(&[true, true, false, true]);
        let summary = grid
            .compute_fault_faces(&FaultDetectionConfig::default(), Some(&active))
            .unwrap();
        assert_eq!(summary.flagged_with_inactive, 2);
        assert!(grid.fault_faces()[0].with_inactive);
    }

    #[test]
    fn active_info_size_is_checked() {
        let mut grid = faulted_line(0.5);
        let active = ActiveCellInfo::from_mask(&[true; 3]);
        let err = grid
            .compute_fault_faces(&FaultDetectionConfig::default(), Some(&active))
            .unwrap_err();
        assert!(matches!(err, GridError::ReservoirCellCountMismatch { len: 3, expected: 4 }));
    }

    #[test]
    fn k_faces_can_be_excluded() {
        let mut grid = MainGrid::box_grid("MAIN", [1, 1, 2], [1.0, 1.0, 1.0]).unwrap();
        let top = *grid.cells[1].corner_indices();
        for n in top {
            grid.nodes[n].x += 0.3;
        }
        let all = grid.compute_fault_faces(&FaultDetectionConfig::default(), None).unwrap();
        assert_eq!(all.flagged_cell_faces, 2);
        assert!(grid.is_fault_face(0, FaceType::PosK));

        let config = FaultDetectionConfig {
            include_k_faces: false,
            ..Default::default()
        };
        let ij_only = grid.compute_fault_faces(&config, None).unwrap();
        assert_eq!(ij_only.flagged_cell_faces, 0);
    }

    #[test]
    fn lgr_registration_discards_faults() {
        let mut grid = faulted_line(0.5);
        grid.compute_fault_faces(&FaultDetectionConfig::default(), None).unwrap();
        let spec = LocalGridSpec::refine_cell("LGR", &grid, 0, [2, 1, 1]).unwrap();
        grid.add_local_grid(spec).unwrap();
        assert!(!grid.has_fault_data());

        // Refined cells share corners inside the LGR, so only the main grid throw remains.
        let summary = grid.compute_fault_faces(&FaultDetectionConfig::default(), None).unwrap();
        assert_eq!(summary.flagged_cell_faces, 2);
        assert_eq!(grid.fault_face_set(1).len(), 1);
    }
}
