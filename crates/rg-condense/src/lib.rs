//! rg-condense: reduce a transmissibility network onto its external cells.
//!
//! Internal cells are eliminated by static condensation (Schur complement
//! of the network's conductance matrix). The result is the equivalent
//! direct transmissibility between every pair of external cells.
//!
//! # Example
//!
//! ```
//! use rg_condense::{CellAddress, CellSpace, TransmissibilityCondenser};
//!
//! let i0 = CellAddress::internal(CellSpace::GridCell, 0);
//! let e0 = CellAddress::external(CellSpace::GridCell, 10);
//! let e1 = CellAddress::external(CellSpace::GridCell, 11);
//!
//! let mut condenser = TransmissibilityCondenser::new();
//! condenser.add_neighbor_transmissibility(i0, e0, 2.0).unwrap();
//! condenser.add_neighbor_transmissibility(i0, e1, 3.0).unwrap();
//!
//! let t = condenser.condensed_transmissibility(e0, e1).unwrap();
//! assert!((t - 1.2).abs() < 1e-12);
//! ```

pub mod address;
pub mod condenser;
pub mod error;

pub use address::{CellAddress, CellSpace};
pub use condenser::{CondensationSummary, CondenserConfig, TransmissibilityCondenser};
pub use error::{CondenserError, CondenserResult};
