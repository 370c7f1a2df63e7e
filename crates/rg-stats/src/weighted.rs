//! Weighted mean `sum(w * v) / sum(w)`.
//!
//! Pairs where either the weight or the value is missing are skipped.

use rg_core::{defined, is_missing};
use rg_grid::ActiveCellInfo;
use rg_results::{AddressingMode, CellResultsStore, ResultAddress};

use crate::error::{StatsError, StatsResult};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedMean {
    weighted_sum: f64,
    weight_sum: f64,
}

impl WeightedMean {
    pub fn add(&mut self, weight: f64, value: f64) {
        if is_missing(weight) || is_missing(value) {
            return;
        }
        self.weighted_sum += weight * value;
        self.weight_sum += weight;
    }

    pub fn merge(&mut self, other: &WeightedMean) {
        self.weighted_sum += other.weighted_sum;
        self.weight_sum += other.weight_sum;
    }

    /// `None` when the weights sum to zero.
    pub fn result(&self) -> Option<f64> {
        (self.weight_sum != 0.0).then(|| self.weighted_sum / self.weight_sum)
    }
}

/// Weighted mean of parallel arrays, optionally restricted by a mask.
pub fn weighted_mean(weights: &[f64], values: &[f64], visible: Option<&[bool]>) -> StatsResult<Option<f64>> {
    if weights.len() != values.len() {
        return Err(StatsError::WeightLengthMismatch {
            weights: weights.len(),
            values: values.len(),
        });
    }
    if let Some(mask) = visible
        && mask.len() != values.len()
    {
        return Err(StatsError::MaskLengthMismatch {
            mask: mask.len(),
            values: values.len(),
        });
    }

    let mut acc = WeightedMean::default();
    for (i, (&w, &v)) in weights.iter().zip(values).enumerate() {
        if visible.is_none_or(|m| m[i]) {
            acc.add(w, v);
        }
    }
    Ok(acc.result())
}

/// Value array read by global cell index, remapped through the active
/// index for active-addressed arrays.
#[derive(Debug, Clone, Copy)]
pub struct CellLookup<'a> {
    values: &'a [f64],
    active: Option<&'a ActiveCellInfo>,
}

impl<'a> CellLookup<'a> {
    pub fn global(values: &'a [f64]) -> Self {
        Self { values, active: None }
    }

    pub fn active(values: &'a [f64], active: &'a ActiveCellInfo) -> Self {
        Self {
            values,
            active: Some(active),
        }
    }

    pub fn from_store(store: &'a CellResultsStore, address: &ResultAddress, time_step: usize) -> StatsResult<Self> {
        let values = store.cell_scalar_results(address, time_step)?;
        Ok(match store.addressing_mode(address) {
            Some(AddressingMode::Active) => Self::active(values, store.active_cell_info()),
            _ => Self::global(values),
        })
    }

    /// `None` for inactive cells, unloaded arrays and missing values.
    pub fn value(&self, global_cell: usize) -> Option<f64> {
        let index = match self.active {
            Some(info) => info.cell_result_index(global_cell)?,
            None => global_cell,
        };
        self.values.get(index).copied().and_then(defined)
    }
}

/// Weighted mean over a set of global cells.
pub fn weighted_mean_over_cells(
    cells: impl IntoIterator<Item = usize>,
    weights: &CellLookup<'_>,
    values: &CellLookup<'_>,
) -> WeightedMean {
    let mut acc = WeightedMean::default();
    for cell in cells {
        if let (Some(w), Some(v)) = (weights.value(cell), values.value(cell)) {
            acc.add(w, v);
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use rg_core::UNDEFINED_VALUE;

    #[test]
    fn parallel_arrays() {
        let w = [1.0, 3.0, 2.0, 5.0];
        let v = [10.0, 20.0, UNDEFINED_VALUE, f64::NAN];
        let mean = weighted_mean(&w, &v, None).unwrap().unwrap();
        assert!((mean - 17.5).abs() < 1e-12);

        let mask = [true, false, true, true];
        assert_eq!(weighted_mean(&w, &v, Some(&mask)).unwrap(), Some(10.0));
        assert_eq!(weighted_mean(&[0.0], &[1.0], None).unwrap(), None);
    }

    #[test]
    fn length_checks() {
        assert!(matches!(
            weighted_mean(&[1.0], &[1.0, 2.0], None),
            Err(StatsError::WeightLengthMismatch { weights: 1, values: 2 })
        ));
        assert!(matches!(
            weighted_mean(&[1.0], &[1.0], Some(&[true, true])),
            Err(StatsError::MaskLengthMismatch { .. })
        ));
    }

    #[test]
    fn active_remapping() {
        let info = ActiveCellInfo::from_mask(&[false, true, true]);
        let weights = [2.0, 2.0, 6.0];
        let values = [4.0, 8.0];
        let w = CellLookup::global(&weights);
        let v = CellLookup::active(&values, &info);
        assert_eq!(v.value(0), None);
        assert_eq!(v.value(2), Some(8.0));
        let mean = weighted_mean_over_cells(0..3, &w, &v).result().unwrap();
        assert!((mean - 7.0).abs() < 1e-12);
    }
}
