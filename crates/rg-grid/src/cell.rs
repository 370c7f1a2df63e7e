//! Per-cell topology record.

use rg_core::GridId;

use crate::face::FaceType;

/// A hexahedral cell of any grid in the arena.
///
/// Cells are stored in one flat array indexed by global cell index. Corner
/// indices point into the shared node array; LGR corners hold absolute
/// coordinates, so no transform is applied when walking to the main grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub(crate) corner_indices: [usize; 8],
    pub(crate) host_grid: GridId,
    pub(crate) grid_local_index: usize,
    /// Global index of the enclosing cell in the parent grid (LGR cells only).
    pub(crate) parent_cell: Option<usize>,
    /// Local grid refining this cell, if any.
    pub(crate) sub_grid: Option<GridId>,
    pub(crate) invalid: bool,
}

impl Cell {
    pub(crate) fn new(corner_indices: [usize; 8], host_grid: GridId, grid_local_index: usize) -> Self {
        Self {
            corner_indices,
            host_grid,
            grid_local_index,
            parent_cell: None,
            sub_grid: None,
            invalid: false,
        }
    }

    pub fn corner_indices(&self) -> &[usize; 8] {
        &self.corner_indices
    }

    /// Node indices of one face, in the winding given by `FaceType::vertex_indices`.
    pub fn face_indices(&self, face: FaceType) -> [usize; 4] {
        face.vertex_indices().map(|c| self.corner_indices[c])
    }

    pub fn host_grid(&self) -> GridId {
        self.host_grid
    }

    pub fn grid_local_index(&self) -> usize {
        self.grid_local_index
    }

    pub fn parent_cell_index(&self) -> Option<usize> {
        self.parent_cell
    }

    pub fn sub_grid(&self) -> Option<GridId> {
        self.sub_grid
    }

    /// Invalid (collapsed or otherwise unusable) cells are skipped by
    /// neighbour-based algorithms.
    pub fn is_invalid(&self) -> bool {
        self.invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_indices_follow_corner_table() {
        let cell = Cell::new([10, 11, 12, 13, 14, 15, 16, 17], GridId::MAIN, 0);
        assert_eq!(cell.face_indices(FaceType::PosI), [11, 12, 16, 15]);
        assert_eq!(cell.face_indices(FaceType::NegK), [10, 13, 12, 11]);
        assert!(!cell.is_invalid());
        assert_eq!(cell.parent_cell_index(), None);
    }
}
