//! rg-core: shared foundation for the reservoir grid crates.
//!
//! Contains:
//! - error (shared error type)
//! - ids (compact grid identifiers)
//! - numeric (missing-value sentinel)
//! - units (uom SI types + constructors)
//! - timing (opt-in elapsed-time reporting)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod timing;
pub mod units;

pub use error::{RgError, RgResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
