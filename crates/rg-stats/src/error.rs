//! Error types for statistics computation.

use rg_core::RgError;
use rg_results::{ResultAddress, ResultsError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Result not found: {address}")]
    ResultNotFound { address: ResultAddress },

    #[error("Histogram needs at least one bin")]
    InvalidBinCount,

    #[error("Invalid histogram range [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },

    #[error("Values of {address} at time step {time_step} are not loaded")]
    DataNotLoaded { address: ResultAddress, time_step: usize },

    #[error("Time step {index} out of range ({count} time steps)")]
    TimeStepOutOfRange { index: usize, count: usize },

    #[error("Weights ({weights}) and values ({values}) differ in length")]
    WeightLengthMismatch { weights: usize, values: usize },

    #[error("Visibility mask ({mask}) and values ({values}) differ in length")]
    MaskLengthMismatch { mask: usize, values: usize },

    #[error("Result store error: {0}")]
    Results(#[from] ResultsError),
}

pub type StatsResult<T> = Result<T, StatsError>;

impl From<StatsError> for RgError {
    fn from(e: StatsError) -> Self {
        match e {
            StatsError::TimeStepOutOfRange { index, count } => RgError::IndexOob {
                what: "time step",
                index,
                len: count,
            },
            StatsError::Results(inner) => inner.into(),
            other => RgError::InvalidArg {
                what: other.to_string(),
            },
        }
    }
}
