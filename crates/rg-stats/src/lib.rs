//! rg-stats: memoized statistics over cell results.
//!
//! Provides:
//! - Single-pass accumulators (min/max, closest to zero, sum, unique values)
//! - Fixed-bin histogram with binned percentiles
//! - Weighted mean with visibility masks and active-index remapping
//! - Per-result statistics cache with all-time-step folds
//!
//! Caches are mutated through `&mut self` only; share them behind a lock
//! when queried from several threads.
//!
//! # Example
//!
//! ```
//! use rg_stats::Histogram;
//!
//! let mut h = Histogram::new(0.0, 100.0, 100).unwrap();
//! h.add_value(50.5);
//! assert_eq!(h.bins()[50], 1);
//! ```

pub mod accumulators;
pub mod cache;
pub mod cached;
pub mod calculator;
pub mod case;
pub mod error;
pub mod histogram;
pub mod weighted;

pub use accumulators::{MinMax, MinMaxAccumulator, PosNegClosestToZero, SumCount, UniqueValues};
pub use cache::StatisticsDataCache;
pub use cached::Cached;
pub use calculator::StatCalculator;
pub use case::CaseStatistics;
pub use error::{StatsError, StatsResult};
pub use histogram::{Histogram, HistogramConfig};
pub use weighted::{CellLookup, WeightedMean, weighted_mean, weighted_mean_over_cells};
