use thiserror::Error;

pub type RgResult<T> = Result<T, RgError>;

/// Error shared by the grid, result, statistics and condensation crates.
#[derive(Error, Debug)]
pub enum RgError {
    #[error("{what} is not finite ({value})")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("{what} index {index} out of range 0..{len}")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Inconsistent state: {what}")]
    Invariant { what: String },
}
