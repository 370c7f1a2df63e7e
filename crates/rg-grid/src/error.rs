//! Grid-specific error types.

use rg_core::{GridId, RgError};
use thiserror::Error;

/// Grid construction and lookup errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Grid '{name}' has invalid extents {nx}x{ny}x{nz}")]
    InvalidExtents {
        name: String,
        nx: usize,
        ny: usize,
        nz: usize,
    },

    #[error("Grid '{name}' has {len} cells, expected {expected}")]
    CellCountMismatch {
        name: String,
        len: usize,
        expected: usize,
    },

    #[error("Cell {cell} references node {node} but only {node_count} nodes exist")]
    NodeIndexOob {
        cell: usize,
        node: usize,
        node_count: usize,
    },

    #[error("Grid {0} not found")]
    UnknownGrid(GridId),

    #[error("Grid name '{0}' is already registered")]
    DuplicateGridName(String),

    #[error("Parent cell {parent_cell} of local grid '{name}' is not a cell of grid {parent}")]
    InvalidParentCell {
        name: String,
        parent: GridId,
        parent_cell: usize,
    },

    #[error("Cell index {index} out of range ({count} cells)")]
    CellOob { index: usize, count: usize },

    #[error("Active cell data has {len} entries, grid has {expected} cells")]
    ReservoirCellCountMismatch { len: usize, expected: usize },

    #[error("Fault '{name}' range {min:?}..={max:?} is outside the main grid")]
    InvalidFaultRange {
        name: String,
        min: [usize; 3],
        max: [usize; 3],
    },
}

pub type GridResult<T> = Result<T, GridError>;

impl From<GridError> for RgError {
    fn from(err: GridError) -> Self {
        RgError::Invariant {
            what: err.to_string(),
        }
    }
}
