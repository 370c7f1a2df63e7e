//! One structured grid of the arena (main grid or LGR).

use rg_core::GridId;

use crate::face::FaceType;

/// IJK extents and global placement of one grid.
///
/// Local cell indices are row-major: `i + j*nx + k*nx*ny`. The grid's cells
/// occupy the global range `cell_offset..cell_offset + cell_count()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub(crate) id: GridId,
    pub(crate) name: String,
    /// Grid number in the source file, when it differs from the arena index.
    pub(crate) file_number: Option<i32>,
    pub(crate) extents: [usize; 3],
    pub(crate) cell_offset: usize,
    pub(crate) parent: Option<GridId>,
}

impl Grid {
    pub fn id(&self) -> GridId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_number(&self) -> Option<i32> {
        self.file_number
    }

    pub fn is_main_grid(&self) -> bool {
        self.id.is_main()
    }

    /// Parent grid of a local grid; `None` for the main grid.
    pub fn parent(&self) -> Option<GridId> {
        self.parent
    }

    pub fn cell_count_i(&self) -> usize {
        self.extents[0]
    }

    pub fn cell_count_j(&self) -> usize {
        self.extents[1]
    }

    pub fn cell_count_k(&self) -> usize {
        self.extents[2]
    }

    pub fn extents(&self) -> [usize; 3] {
        self.extents
    }

    pub fn cell_count(&self) -> usize {
        self.extents[0] * self.extents[1] * self.extents[2]
    }

    /// Number of cells in one K layer.
    pub fn layer_size(&self) -> usize {
        self.extents[0] * self.extents[1]
    }

    pub fn cell_offset(&self) -> usize {
        self.cell_offset
    }

    pub fn is_valid_ijk(&self, i: usize, j: usize, k: usize) -> bool {
        i < self.extents[0] && j < self.extents[1] && k < self.extents[2]
    }

    /// Row-major local index. No bounds check; see `try_cell_index_from_ijk`.
    #[inline]
    pub fn cell_index_from_ijk(&self, i: usize, j: usize, k: usize) -> usize {
        i + j * self.extents[0] + k * self.extents[0] * self.extents[1]
    }

    pub fn try_cell_index_from_ijk(&self, i: usize, j: usize, k: usize) -> Option<usize> {
        self.is_valid_ijk(i, j, k)
            .then(|| self.cell_index_from_ijk(i, j, k))
    }

    /// Exact inverse of `cell_index_from_ijk` for in-range indices.
    #[inline]
    pub fn ijk_from_cell_index(&self, index: usize) -> (usize, usize, usize) {
        let nx = self.extents[0];
        let nxy = nx * self.extents[1];
        let k = index / nxy;
        let rem = index % nxy;
        (rem % nx, rem / nx, k)
    }

    /// Local index of the IJK neighbour across `face`, if inside the grid.
    pub fn cell_ijk_neighbor(&self, i: usize, j: usize, k: usize, face: FaceType) -> Option<usize> {
        let [di, dj, dk] = face.ijk_offset();
        let ni = i.checked_add_signed(di)?;
        let nj = j.checked_add_signed(dj)?;
        let nk = k.checked_add_signed(dk)?;
        self.try_cell_index_from_ijk(ni, nj, nk)
    }

    /// Global cell index of a grid-local cell index.
    #[inline]
    pub fn global_cell_index(&self, local: usize) -> usize {
        self.cell_offset + local
    }

    /// Grid-local index of a global cell index, if the cell belongs to this grid.
    pub fn local_cell_index(&self, global: usize) -> Option<usize> {
        global
            .checked_sub(self.cell_offset)
            .filter(|&local| local < self.cell_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(extents: [usize; 3], offset: usize) -> Grid {
        Grid {
            id: GridId::MAIN,
            name: "G".to_string(),
            file_number: None,
            extents,
            cell_offset: offset,
            parent: None,
        }
    }

    #[test]
    fn five_cells_in_a_line() {
        let g = grid([5, 1, 1], 0);
        assert_eq!(g.cell_index_from_ijk(3, 0, 0), 3);
        assert_eq!(g.ijk_from_cell_index(3), (3, 0, 0));
    }

    #[test]
    fn row_major_layout() {
        let g = grid([4, 3, 2], 0);
        assert_eq!(g.cell_index_from_ijk(1, 2, 1), 1 + 2 * 4 + 12);
        assert_eq!(g.ijk_from_cell_index(21), (1, 2, 1));
        assert_eq!(g.layer_size(), 12);
        assert_eq!(g.try_cell_index_from_ijk(4, 0, 0), None);
    }

    #[test]
    fn neighbors_stop_at_boundary() {
        let g = grid([3, 3, 3], 0);
        assert_eq!(g.cell_ijk_neighbor(0, 0, 0, FaceType::NegI), None);
        assert_eq!(g.cell_ijk_neighbor(0, 0, 0, FaceType::PosI), Some(1));
        assert_eq!(g.cell_ijk_neighbor(1, 1, 1, FaceType::PosJ), Some(g.cell_index_from_ijk(1, 2, 1)));
        assert_eq!(g.cell_ijk_neighbor(1, 1, 2, FaceType::PosK), None);
    }

    #[test]
    fn local_global_mapping() {
        let g = grid([2, 2, 1], 10);
        assert_eq!(g.global_cell_index(3), 13);
        assert_eq!(g.local_cell_index(13), Some(3));
        assert_eq!(g.local_cell_index(14), None);
        assert_eq!(g.local_cell_index(9), None);
    }
}
