//! Statistics calculators: where the values of a statistic come from.

use std::sync::Arc;

use rg_results::{AddressingMode, CellResultsStore, ResultAddress, StatisticsSource};

use crate::accumulators::{MinMax, MinMaxAccumulator, PosNegClosestToZero, SumCount, UniqueValues};
use crate::error::{StatsError, StatsResult};
use crate::histogram::Histogram;
use crate::weighted::{CellLookup, WeightedMean, weighted_mean_over_cells};

#[derive(Debug, Clone, PartialEq)]
pub enum StatCalculator {
    /// Values of one result.
    Native(ResultAddress),
    /// Values of several results pooled together. Missing components and
    /// components without the requested time step contribute nothing.
    MultiProperty(Vec<ResultAddress>),
    /// Values of one result restricted to cells flagged in `visible`,
    /// indexed by global cell.
    VisibleCells {
        address: ResultAddress,
        visible: Arc<[bool]>,
    },
}

impl StatCalculator {
    /// Calculator matching the statistics source bound in the store.
    pub fn from_store(store: &CellResultsStore, address: &ResultAddress) -> StatsResult<Self> {
        match store.statistics_source(address) {
            Some(StatisticsSource::Native) => Ok(StatCalculator::Native(address.clone())),
            Some(StatisticsSource::MultiProperty(parts)) => Ok(StatCalculator::MultiProperty(parts.clone())),
            None => Err(StatsError::ResultNotFound {
                address: address.clone(),
            }),
        }
    }

    pub fn inputs(&self) -> &[ResultAddress] {
        match self {
            StatCalculator::Native(address) | StatCalculator::VisibleCells { address, .. } => {
                std::slice::from_ref(address)
            }
            StatCalculator::MultiProperty(parts) => parts,
        }
    }

    /// Largest time step count over the inputs.
    pub fn time_step_count(&self, store: &CellResultsStore) -> usize {
        self.inputs()
            .iter()
            .map(|a| store.time_step_count(a))
            .max()
            .unwrap_or(0)
    }

    /// Store revision of every input, in [`inputs`](Self::inputs) order.
    /// `None` marks an input that is absent (never created, renamed or
    /// removed).
    pub fn input_revisions(&self, store: &CellResultsStore) -> Vec<Option<u64>> {
        self.inputs().iter().map(|a| store.result_revision(a)).collect()
    }

    /// Feed every value slice of `time_step` to `f`.
    fn visit(&self, store: &CellResultsStore, time_step: usize, mut f: impl FnMut(&[f64])) -> StatsResult<()> {
        match self {
            StatCalculator::Native(address) => {
                if let Some(values) = loaded_step(store, address, time_step)? {
                    f(values);
                }
            }
            StatCalculator::MultiProperty(parts) => {
                for part in parts.iter().filter(|p| store.has_result(p)) {
                    if let Some(values) = loaded_step(store, part, time_step)? {
                        f(values);
                    }
                }
            }
            StatCalculator::VisibleCells { address, visible } => {
                let Some(values) = loaded_step(store, address, time_step)? else {
                    return Ok(());
                };
                let active = store.active_cell_info();
                let mode = store.addressing_mode(address);
                let selected: Vec<f64> = visible
                    .iter()
                    .enumerate()
                    .filter(|(_, shown)| **shown)
                    .filter_map(|(cell, _)| match mode {
                        Some(AddressingMode::Active) => active.cell_result_index(cell),
                        _ => Some(cell),
                    })
                    .filter_map(|i| values.get(i).copied())
                    .collect();
                f(&selected);
            }
        }
        Ok(())
    }

    pub fn min_max(&self, store: &CellResultsStore, time_step: usize) -> StatsResult<Option<MinMax>> {
        let mut acc = MinMaxAccumulator::default();
        self.visit(store, time_step, |v| acc.add_values(v))?;
        Ok(acc.result())
    }

    pub fn pos_neg_closest_to_zero(
        &self,
        store: &CellResultsStore,
        time_step: usize,
    ) -> StatsResult<PosNegClosestToZero> {
        let mut acc = PosNegClosestToZero::default();
        self.visit(store, time_step, |v| acc.add_values(v))?;
        Ok(acc)
    }

    pub fn sum_and_count(&self, store: &CellResultsStore, time_step: usize) -> StatsResult<SumCount> {
        let mut acc = SumCount::default();
        self.visit(store, time_step, |v| acc.add_values(v))?;
        Ok(acc)
    }

    pub fn unique_values(&self, store: &CellResultsStore, time_step: usize) -> StatsResult<UniqueValues> {
        let mut acc = UniqueValues::default();
        self.visit(store, time_step, |v| acc.add_values(v))?;
        Ok(acc)
    }

    pub fn add_to_histogram(
        &self,
        store: &CellResultsStore,
        time_step: usize,
        histogram: &mut Histogram,
    ) -> StatsResult<()> {
        self.visit(store, time_step, |v| histogram.add_values(v))
    }

    /// Mean of the inputs weighted by `weight`, cell by cell.
    ///
    /// A weight result with a single time step applies to every time step.
    pub fn weighted_mean(
        &self,
        store: &CellResultsStore,
        weight: &ResultAddress,
        time_step: usize,
    ) -> StatsResult<Option<f64>> {
        let weight_step = if store.time_step_count(weight) == 1 { 0 } else { time_step };
        let weights = CellLookup::from_store(store, weight, weight_step)?;

        let mut acc = WeightedMean::default();
        for input in self.inputs() {
            if store.time_step_count(input) <= time_step {
                continue;
            }
            let values = CellLookup::from_store(store, input, time_step)?;
            let part = match self {
                StatCalculator::VisibleCells { visible, .. } => weighted_mean_over_cells(
                    visible.iter().enumerate().filter(|(_, s)| **s).map(|(c, _)| c),
                    &weights,
                    &values,
                ),
                _ => weighted_mean_over_cells(0..store.global_cell_count(), &weights, &values),
            };
            acc.merge(&part);
        }
        Ok(acc.result())
    }
}

/// Values of `time_step`, or `None` when the result has fewer time steps.
/// A slot that exists but holds no values (not loaded yet, or freed) is an
/// error: computing over it would memoize empty statistics.
fn loaded_step<'a>(
    store: &'a CellResultsStore,
    address: &ResultAddress,
    time_step: usize,
) -> StatsResult<Option<&'a [f64]>> {
    let all = store.all_cell_scalar_results(address)?;
    match all.get(time_step) {
        None => Ok(None),
        Some(values) if values.is_empty() => Err(StatsError::DataNotLoaded {
            address: address.clone(),
            time_step,
        }),
        Some(values) => Ok(Some(values.as_slice())),
    }
}
