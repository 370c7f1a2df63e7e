//! Active cell compression: global cell index -> dense active index.
//!
//! Matrix and fracture porosity models each carry their own mapping.
//! Lookups of inactive cells return `None`; callers must check before using
//! the index.

use crate::error::{GridError, GridResult};
use crate::geometry::BoundingBox;
use crate::main_grid::MainGrid;

/// Flow domain of a dual-porosity model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PorosityModel {
    Matrix,
    Fracture,
}

/// Inclusive IJK range of main-grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IjkBoundingBox {
    pub min: [usize; 3],
    pub max: [usize; 3],
}

impl IjkBoundingBox {
    fn single(ijk: [usize; 3]) -> Self {
        Self { min: ijk, max: ijk }
    }

    fn add(&mut self, ijk: [usize; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(ijk[axis]);
            self.max[axis] = self.max[axis].max(ijk[axis]);
        }
    }

    pub fn contains(&self, ijk: [usize; 3]) -> bool {
        (0..3).all(|a| (self.min[a]..=self.max[a]).contains(&ijk[a]))
    }
}

/// Mapping between global (reservoir) cell indices and active result indices.
#[derive(Debug, Clone, Default)]
pub struct ActiveCellInfo {
    global_to_active: Vec<Option<usize>>,
    active_to_global: Vec<Option<usize>>,
    grid_active_counts: Vec<usize>,
    ijk_bounding_box: Option<IjkBoundingBox>,
    geometry_bounding_box: BoundingBox,
}

impl ActiveCellInfo {
    /// All `reservoir_cell_count` cells inactive.
    pub fn new(reservoir_cell_count: usize) -> Self {
        Self {
            global_to_active: vec![None; reservoir_cell_count],
            ..Default::default()
        }
    }

    /// Active indices assigned in global order to every `true` entry.
    pub fn from_mask(mask: &[bool]) -> Self {
        let mut info = Self::new(mask.len());
        for (global, _) in mask.iter().enumerate().filter(|(_, a)| **a) {
            let active = info.active_to_global.len();
            info.global_to_active[global] = Some(active);
            info.active_to_global.push(Some(global));
        }
        info
    }

    /// Assign an explicit active index to a cell.
    pub fn set_cell_result_index(&mut self, global: usize, active: usize) -> GridResult<()> {
        let count = self.global_to_active.len();
        let slot = self
            .global_to_active
            .get_mut(global)
            .ok_or(GridError::CellOob { index: global, count })?;

        if let Some(previous) = slot.replace(active) {
            self.active_to_global[previous] = None;
        }
        if active >= self.active_to_global.len() {
            self.active_to_global.resize(active + 1, None);
        }
        if let Some(other) = self.active_to_global[active].replace(global)
            && other != global
        {
            self.global_to_active[other] = None;
        }
        Ok(())
    }

    /// Number of cells over all grids this mapping covers.
    pub fn reservoir_cell_count(&self) -> usize {
        self.global_to_active.len()
    }

    /// Length of an active-addressed result array.
    pub fn reservoir_active_cell_count(&self) -> usize {
        self.active_to_global.len()
    }

    pub fn is_active(&self, global: usize) -> bool {
        self.cell_result_index(global).is_some()
    }

    /// Active index of a global cell, `None` when inactive or out of range.
    pub fn cell_result_index(&self, global: usize) -> Option<usize> {
        self.global_to_active.get(global).copied().flatten()
    }

    /// Reverse lookup: global cell of an active index.
    pub fn global_cell_index(&self, active: usize) -> Option<usize> {
        self.active_to_global.get(active).copied().flatten()
    }

    /// Global indices of all active cells, in active order.
    pub fn active_cell_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.active_to_global.iter().filter_map(|g| *g)
    }

    /// Compute per-grid counts and bounding boxes against `grid`.
    pub fn compute_derived_data(&mut self, grid: &MainGrid) -> GridResult<()> {
        if self.reservoir_cell_count() != grid.total_cell_count() {
            return Err(GridError::ReservoirCellCountMismatch {
                len: self.reservoir_cell_count(),
                expected: grid.total_cell_count(),
            });
        }

        let mut counts = vec![0; grid.grid_count()];
        let mut ijk_box: Option<IjkBoundingBox> = None;
        let mut geo_box = BoundingBox::new();
        let main = grid.main_grid();

        for global in self.active_cell_indices() {
            let Some((grid_id, _)) = grid.grid_and_local_index_from_global(global) else {
                continue;
            };
            counts[grid_id.index()] += 1;

            if let Some(main_cell) = grid.main_grid_cell_index(global) {
                let (i, j, k) = main.ijk_from_cell_index(main_cell);
                match ijk_box.as_mut() {
                    Some(bb) => bb.add([i, j, k]),
                    None => ijk_box = Some(IjkBoundingBox::single([i, j, k])),
                }
            }
            if let Some(corners) = grid.cell_corner_vertices(global) {
                for p in &corners {
                    geo_box.add_point(p);
                }
            }
        }

        tracing::debug!(
            active = self.reservoir_active_cell_count(),
            grids = counts.len(),
            "active cell derived data computed"
        );

        self.grid_active_counts = counts;
        self.ijk_bounding_box = ijk_box;
        self.geometry_bounding_box = geo_box;
        Ok(())
    }

    /// Active cells per grid, available after `compute_derived_data`.
    pub fn grid_active_cell_count(&self, grid_index: usize) -> usize {
        self.grid_active_counts.get(grid_index).copied().unwrap_or(0)
    }

    /// Active cells in all grids preceding `grid_index`.
    pub fn grid_active_cell_offset(&self, grid_index: usize) -> usize {
        self.grid_active_counts.iter().take(grid_index).sum()
    }

    pub fn ijk_bounding_box(&self) -> Option<IjkBoundingBox> {
        self.ijk_bounding_box
    }

    pub fn geometry_bounding_box(&self) -> &BoundingBox {
        &self.geometry_bounding_box
    }

    /// Make every cell inactive and drop derived data.
    pub fn clear(&mut self) {
        let count = self.reservoir_cell_count();
        *self = Self::new(count);
    }
}

/// Active cell mappings for both porosity models of a case.
#[derive(Debug, Clone, Default)]
pub struct CaseActiveCells {
    pub matrix: ActiveCellInfo,
    pub fracture: ActiveCellInfo,
}

impl CaseActiveCells {
    pub fn get(&self, model: PorosityModel) -> &ActiveCellInfo {
        match model {
            PorosityModel::Matrix => &self.matrix,
            PorosityModel::Fracture => &self.fracture,
        }
    }

    pub fn get_mut(&mut self, model: PorosityModel) -> &mut ActiveCellInfo {
        match model {
            PorosityModel::Matrix => &mut self.matrix,
            PorosityModel::Fracture => &mut self.fracture,
        }
    }

    /// A case is dual porosity when any fracture cell is active.
    pub fn is_dual_porosity(&self) -> bool {
        self.fracture.reservoir_active_cell_count() > 0
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn mask_mapping_is_a_bijection(mask in prop::collection::vec(any::<bool>(), 0..200)) {
            let info = ActiveCellInfo::from_mask(&mask);
            prop_assert_eq!(info.reservoir_active_cell_count(), mask.iter().filter(|a| **a).count());
            for (global, &a) in mask.iter().enumerate() {
                match info.cell_result_index(global) {
                    Some(active) => {
                        prop_assert!(a);
                        prop_assert_eq!(info.global_cell_index(active), Some(global));
                    }
                    None => prop_assert!(!a),
                }
            }
        }
    }
}
