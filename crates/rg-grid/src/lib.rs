//! rg-grid: cell addressing for a main grid with nested local grids.
//!
//! Provides:
//! - Grid arena (main grid + LGRs) with IJK <-> linear and local <-> global mapping
//! - Face conventions and IJK neighbour lookup
//! - Geometric fault-face detection (parallel over K layers)
//! - Named faults from IJK ranges, taking precedence over detected faults
//! - Active cell compression per porosity model
//!
//! # Example
//!
//! ```
//! use rg_grid::{MainGrid, FaceType};
//!
//! let grid = MainGrid::box_grid("MAIN", [5, 1, 1], [1.0, 1.0, 1.0]).unwrap();
//! let main = grid.main_grid();
//!
//! assert_eq!(main.cell_index_from_ijk(3, 0, 0), 3);
//! assert_eq!(main.ijk_from_cell_index(3), (3, 0, 0));
//! assert_eq!(grid.cell_ijk_neighbor(3, FaceType::PosI), Some(4));
//! ```

pub mod active_cells;
pub mod cell;
pub mod error;
pub mod face;
pub mod faults;
pub mod geometry;
pub mod grid;
pub mod main_grid;
pub mod named_faults;

pub use active_cells::{ActiveCellInfo, CaseActiveCells, IjkBoundingBox, PorosityModel};
pub use cell::Cell;
pub use error::{GridError, GridResult};
pub use face::{FaceSet, FaceType};
pub use faults::{FaultDetectionConfig, FaultDetectionSummary, FaultFace};
pub use geometry::{BoundingBox, Point3};
pub use grid::Grid;
pub use main_grid::{LocalGridSpec, MainGrid};
pub use named_faults::{
    FaultCellRange, FaultRef, NamedFault, UNDEFINED_GRID_FAULT_NAME, UNDEFINED_GRID_FAULT_WITH_INACTIVE_NAME,
};
