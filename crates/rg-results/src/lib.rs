//! rg-results: named, time-indexed scalar results per cell.

pub mod address;
pub mod derived;
pub mod export;
pub mod source;
pub mod store;
pub mod timestep;

pub use address::{ResultAddress, ResultCategory};
pub use derived::{DEPTH_RELATED_RESULTS, compute_depth_related_results, compute_soil_for_time_step};
pub use export::{KeywordExportConfig, write_keyword};
pub use source::StatisticsSource;
pub use store::{AddressingMode, CellResultsStore};
pub use timestep::TimeStepInfo;

use rg_core::RgError;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Result not found: {address}")]
    ResultNotFound { address: ResultAddress },

    #[error("Time step {index} out of range for {address} ({count} time steps)")]
    TimeStepOutOfRange {
        address: ResultAddress,
        index: usize,
        count: usize,
    },

    #[error(
        "Invalid result size for {address}: {len} values, expected {global} (global) or {active} (active)"
    )]
    InvalidResultSize {
        address: ResultAddress,
        len: usize,
        global: usize,
        active: usize,
    },

    #[error("Time step arrays differ in length: {dates} dates, {days} day offsets, {reports} report numbers")]
    TimeStepInfoMismatch {
        dates: usize,
        days: usize,
        reports: usize,
    },

    #[error("Grid has {grid} cells, results are sized for {results}")]
    GridCellCountMismatch { grid: usize, results: usize },
}

impl From<ResultsError> for RgError {
    fn from(err: ResultsError) -> Self {
        match err {
            ResultsError::TimeStepOutOfRange { index, count, .. } => RgError::IndexOob {
                what: "time step",
                index,
                len: count,
            },
            other => RgError::InvalidArg {
                what: other.to_string(),
            },
        }
    }
}
