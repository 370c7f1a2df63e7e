//! Error types for network condensation.

use rg_core::RgError;
use thiserror::Error;

use crate::address::CellAddress;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CondenserError {
    #[error("Non-finite transmissibility {value} between {a} and {b}")]
    NonFinite { a: CellAddress, b: CellAddress, value: f64 },

    #[error("Transmissibility from {address} to itself")]
    SelfConnection { address: CellAddress },

    #[error("Internal block with {internal_count} cells could not be eliminated")]
    SingularElimination { internal_count: usize },
}

pub type CondenserResult<T> = Result<T, CondenserError>;

impl From<CondenserError> for RgError {
    fn from(e: CondenserError) -> Self {
        match e {
            CondenserError::NonFinite { value, .. } => RgError::NonFinite {
                what: "transmissibility",
                value,
            },
            other => RgError::Invariant {
                what: other.to_string(),
            },
        }
    }
}
