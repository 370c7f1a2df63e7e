//! Memoized statistics for one result.
//!
//! Per-time-step statistics are computed on first query. Aggregates over
//! all time steps are folded from the per-time-step entries (min of mins,
//! union of unique values, histograms merged by bin centre) and never
//! rescan raw values. Every query first compares the store revision of each
//! of the calculator's inputs with the revisions the cache was filled from,
//! and drops everything when any of them differs.

use std::collections::HashMap;

use rg_results::{CellResultsStore, ResultAddress};

use crate::accumulators::{MinMax, MinMaxAccumulator, PosNegClosestToZero, SumCount, UniqueValues};
use crate::cached::Cached;
use crate::calculator::StatCalculator;
use crate::error::{StatsError, StatsResult};
use crate::histogram::{Histogram, HistogramConfig};

#[derive(Debug, Clone, Default)]
struct StepStatistics {
    min_max: Cached<Option<MinMax>>,
    pos_neg: Cached<PosNegClosestToZero>,
    sum_count: Cached<SumCount>,
    unique: Cached<UniqueValues>,
    histogram: Cached<Option<Histogram>>,
    p10_p90: Cached<Option<(f64, f64)>>,
    /// Keyed by weight result; stores the weight revision used.
    weighted_means: HashMap<ResultAddress, (u64, Option<f64>)>,
}

impl StepStatistics {
    fn clear_histogram(&mut self) {
        self.histogram.invalidate();
        self.p10_p90.invalidate();
    }
}

#[derive(Debug, Clone)]
pub struct StatisticsDataCache {
    calculator: StatCalculator,
    config: HistogramConfig,
    /// Per-input revisions the cache was filled from; `None` before the
    /// first query.
    source_revisions: Option<Vec<Option<u64>>>,
    steps: Vec<StepStatistics>,
    all: StepStatistics,
}

impl StatisticsDataCache {
    pub fn new(calculator: StatCalculator) -> Self {
        Self::with_config(calculator, HistogramConfig::default())
    }

    pub fn with_config(calculator: StatCalculator, config: HistogramConfig) -> Self {
        Self {
            calculator,
            config,
            source_revisions: None,
            steps: Vec::new(),
            all: StepStatistics::default(),
        }
    }

    pub fn calculator(&self) -> &StatCalculator {
        &self.calculator
    }

    pub fn num_bins(&self) -> usize {
        self.config.num_bins
    }

    /// Change the histogram resolution. Drops histograms and percentiles.
    pub fn set_num_bins(&mut self, num_bins: usize) -> StatsResult<()> {
        if num_bins == 0 {
            return Err(StatsError::InvalidBinCount);
        }
        if num_bins != self.config.num_bins {
            self.config.num_bins = num_bins;
            self.steps.iter_mut().for_each(StepStatistics::clear_histogram);
            self.all.clear_histogram();
        }
        Ok(())
    }

    /// Reset every memoized value to "not computed".
    pub fn clear_all_statistics(&mut self) {
        self.steps.clear();
        self.all = StepStatistics::default();
        self.source_revisions = None;
    }

    /// Whether the inputs changed since the cache was last filled.
    pub fn is_stale(&self, store: &CellResultsStore) -> bool {
        self.source_revisions
            .as_ref()
            .is_some_and(|r| *r != self.calculator.input_revisions(store))
    }

    pub fn time_step_count(&self, store: &CellResultsStore) -> usize {
        self.calculator.time_step_count(store)
    }

    fn sync(&mut self, store: &CellResultsStore) {
        let revisions = self.calculator.input_revisions(store);
        if self.source_revisions.as_ref() != Some(&revisions) {
            if self.source_revisions.is_some() {
                tracing::debug!(
                    inputs = self.calculator.inputs().len(),
                    revision = store.revision(),
                    "statistics invalidated"
                );
            }
            self.clear_all_statistics();
            self.source_revisions = Some(revisions);
        }
        let count = self.calculator.time_step_count(store);
        if self.steps.len() != count {
            self.steps.resize_with(count, StepStatistics::default);
        }
    }

    fn step(&mut self, store: &CellResultsStore, time_step: usize) -> StatsResult<()> {
        self.sync(store);
        if time_step >= self.steps.len() {
            return Err(StatsError::TimeStepOutOfRange {
                index: time_step,
                count: self.steps.len(),
            });
        }
        Ok(())
    }

    // ---- per time step ----

    pub fn min_max(&mut self, store: &CellResultsStore, time_step: usize) -> StatsResult<Option<MinMax>> {
        self.step(store, time_step)?;
        let Self { calculator, steps, .. } = self;
        steps[time_step]
            .min_max
            .get_or_try_insert_with(|| calculator.min_max(store, time_step))
            .copied()
    }

    pub fn pos_neg_closest_to_zero(
        &mut self,
        store: &CellResultsStore,
        time_step: usize,
    ) -> StatsResult<PosNegClosestToZero> {
        self.step(store, time_step)?;
        let Self { calculator, steps, .. } = self;
        steps[time_step]
            .pos_neg
            .get_or_try_insert_with(|| calculator.pos_neg_closest_to_zero(store, time_step))
            .copied()
    }

    pub fn sum_and_count(&mut self, store: &CellResultsStore, time_step: usize) -> StatsResult<SumCount> {
        self.step(store, time_step)?;
        let Self { calculator, steps, .. } = self;
        steps[time_step]
            .sum_count
            .get_or_try_insert_with(|| calculator.sum_and_count(store, time_step))
            .copied()
    }

    pub fn mean(&mut self, store: &CellResultsStore, time_step: usize) -> StatsResult<Option<f64>> {
        Ok(self.sum_and_count(store, time_step)?.mean())
    }

    pub fn unique_values(&mut self, store: &CellResultsStore, time_step: usize) -> StatsResult<&UniqueValues> {
        self.step(store, time_step)?;
        let Self { calculator, steps, .. } = self;
        steps[time_step]
            .unique
            .get_or_try_insert_with(|| calculator.unique_values(store, time_step))
    }

    /// Histogram over the time step's own `[min, max]`; `None` without values.
    pub fn histogram(&mut self, store: &CellResultsStore, time_step: usize) -> StatsResult<Option<&Histogram>> {
        let range = self.min_max(store, time_step)?;
        let num_bins = self.config.num_bins;
        let Self { calculator, steps, .. } = self;
        let histogram = steps[time_step].histogram.get_or_try_insert_with(|| {
            let Some(r) = range else {
                return Ok(None);
            };
            let mut h = Histogram::new(r.min, r.max, num_bins)?;
            calculator.add_to_histogram(store, time_step, &mut h)?;
            Ok::<_, StatsError>(Some(h))
        })?;
        Ok(histogram.as_ref())
    }

    /// Binned 10th and 90th percentiles.
    pub fn p10_p90(&mut self, store: &CellResultsStore, time_step: usize) -> StatsResult<Option<(f64, f64)>> {
        self.step(store, time_step)?;
        if let Some(p) = self.steps[time_step].p10_p90.get() {
            return Ok(*p);
        }
        let p = self.histogram(store, time_step)?.and_then(Histogram::p10_p90);
        self.steps[time_step].p10_p90 = Cached::Computed(p);
        Ok(p)
    }

    /// Mean weighted by another result (e.g. pore volume).
    pub fn weighted_mean(
        &mut self,
        store: &CellResultsStore,
        weight: &ResultAddress,
        time_step: usize,
    ) -> StatsResult<Option<f64>> {
        self.step(store, time_step)?;
        let weight_revision = store.result_revision(weight).ok_or_else(|| StatsError::ResultNotFound {
            address: weight.clone(),
        })?;
        if let Some(&(revision, mean)) = self.steps[time_step].weighted_means.get(weight)
            && revision == weight_revision
        {
            return Ok(mean);
        }
        let mean = self.calculator.weighted_mean(store, weight, time_step)?;
        self.steps[time_step]
            .weighted_means
            .insert(weight.clone(), (weight_revision, mean));
        Ok(mean)
    }

    // ---- all time steps ----

    pub fn min_max_all(&mut self, store: &CellResultsStore) -> StatsResult<Option<MinMax>> {
        self.sync(store);
        if let Some(r) = self.all.min_max.get() {
            return Ok(*r);
        }
        let mut acc = MinMaxAccumulator::default();
        for ts in 0..self.steps.len() {
            acc.merge(self.min_max(store, ts)?);
        }
        let r = acc.result();
        self.all.min_max = Cached::Computed(r);
        Ok(r)
    }

    pub fn pos_neg_closest_to_zero_all(&mut self, store: &CellResultsStore) -> StatsResult<PosNegClosestToZero> {
        self.sync(store);
        if let Some(r) = self.all.pos_neg.get() {
            return Ok(*r);
        }
        let mut acc = PosNegClosestToZero::default();
        for ts in 0..self.steps.len() {
            acc.merge(&self.pos_neg_closest_to_zero(store, ts)?);
        }
        self.all.pos_neg = Cached::Computed(acc);
        Ok(acc)
    }

    pub fn sum_and_count_all(&mut self, store: &CellResultsStore) -> StatsResult<SumCount> {
        self.sync(store);
        if let Some(r) = self.all.sum_count.get() {
            return Ok(*r);
        }
        let mut acc = SumCount::default();
        for ts in 0..self.steps.len() {
            acc.merge(&self.sum_and_count(store, ts)?);
        }
        self.all.sum_count = Cached::Computed(acc);
        Ok(acc)
    }

    pub fn mean_all(&mut self, store: &CellResultsStore) -> StatsResult<Option<f64>> {
        Ok(self.sum_and_count_all(store)?.mean())
    }

    pub fn unique_values_all(&mut self, store: &CellResultsStore) -> StatsResult<&UniqueValues> {
        self.sync(store);
        if !self.all.unique.is_computed() {
            let mut acc = UniqueValues::default();
            for ts in 0..self.steps.len() {
                acc.merge(self.unique_values(store, ts)?);
            }
            self.all.unique = Cached::Computed(acc);
        }
        Ok(self.all.unique.get_or_insert_with(UniqueValues::default))
    }

    /// Histogram over the all-time-step range, built by moving each
    /// per-time-step bin's count into the bin holding its centre. Counts
    /// can shift by up to one bin compared with rebinning raw values.
    pub fn histogram_all(&mut self, store: &CellResultsStore) -> StatsResult<Option<&Histogram>> {
        self.sync(store);
        if !self.all.histogram.is_computed() {
            let built = match self.min_max_all(store)? {
                None => None,
                Some(r) => {
                    let mut all = Histogram::new(r.min, r.max, self.config.num_bins)?;
                    for ts in 0..self.steps.len() {
                        if let Some(h) = self.histogram(store, ts)? {
                            all.add_binned(h);
                        }
                    }
                    Some(all)
                }
            };
            self.all.histogram = Cached::Computed(built);
        }
        Ok(self.all.histogram.get().and_then(Option::as_ref))
    }

    pub fn p10_p90_all(&mut self, store: &CellResultsStore) -> StatsResult<Option<(f64, f64)>> {
        self.sync(store);
        if let Some(p) = self.all.p10_p90.get() {
            return Ok(*p);
        }
        let p = self.histogram_all(store)?.and_then(Histogram::p10_p90);
        self.all.p10_p90 = Cached::Computed(p);
        Ok(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rg_grid::ActiveCellInfo;
    use std::sync::Arc;

    fn store_with(values: Vec<f64>) -> (CellResultsStore, ResultAddress) {
        let mut store = CellResultsStore::new(Arc::new(ActiveCellInfo::from_mask(&vec![true; values.len()])));
        let addr = ResultAddress::static_native("PORO");
        store.add_static_scalar_result(&addr, values.len()).unwrap();
        store.set_cell_scalar_result(&addr, 0, values).unwrap();
        (store, addr)
    }

    #[test]
    fn memoizes_until_source_changes() {
        let (mut store, addr) = store_with(vec![0.1, 0.3, 0.2]);
        let mut cache = StatisticsDataCache::new(StatCalculator::Native(addr.clone()));
        assert_eq!(cache.min_max(&store, 0).unwrap(), Some(MinMax { min: 0.1, max: 0.3 }));
        assert!(cache.steps[0].min_max.is_computed());
        assert!(!cache.is_stale(&store));

        store.set_cell_scalar_result(&addr, 0, vec![0.5, 0.6, 0.7]).unwrap();
        assert!(cache.is_stale(&store));
        assert_eq!(cache.min_max(&store, 0).unwrap(), Some(MinMax { min: 0.5, max: 0.7 }));
    }

    #[test]
    fn bin_count_change_drops_histograms_only() {
        let (store, addr) = store_with((0..10).map(f64::from).collect());
        let mut cache = StatisticsDataCache::new(StatCalculator::Native(addr));
        assert_eq!(cache.histogram(&store, 0).unwrap().map(Histogram::num_bins), Some(100));
        cache.p10_p90(&store, 0).unwrap();

        cache.set_num_bins(5).unwrap();
        assert!(cache.steps[0].min_max.is_computed());
        assert!(!cache.steps[0].histogram.is_computed());
        assert!(!cache.steps[0].p10_p90.is_computed());
        assert_eq!(cache.histogram(&store, 0).unwrap().map(|h| h.bins().to_vec()), Some(vec![2; 5]));
        assert!(matches!(cache.set_num_bins(0), Err(StatsError::InvalidBinCount)));
    }

    #[test]
    fn explicit_clear() {
        let (store, addr) = store_with(vec![1.0, 2.0]);
        let mut cache = StatisticsDataCache::new(StatCalculator::Native(addr));
        cache.sum_and_count_all(&store).unwrap();
        assert!(cache.all.sum_count.is_computed());
        cache.clear_all_statistics();
        assert!(!cache.all.sum_count.is_computed());
        assert!(cache.steps.is_empty());
        assert_eq!(cache.mean_all(&store).unwrap(), Some(1.5));
    }

    #[test]
    fn empty_result_has_no_statistics() {
        let mut store = CellResultsStore::new(Arc::new(ActiveCellInfo::from_mask(&[true; 2])));
        let addr = ResultAddress::dynamic_native("SWAT");
        store.add_empty_scalar_result(&addr);
        let mut cache = StatisticsDataCache::new(StatCalculator::Native(addr));
        assert_eq!(cache.time_step_count(&store), 0);
        assert_eq!(cache.min_max_all(&store).unwrap(), None);
        assert!(cache.histogram_all(&store).unwrap().is_none());
        assert!(matches!(
            cache.min_max(&store, 0),
            Err(StatsError::TimeStepOutOfRange { index: 0, count: 0 })
        ));
    }

    #[test]
    fn freed_step_is_not_memoized_as_empty() {
        let (mut store, addr) = store_with(vec![0.1, 0.4, 0.2]);
        let mut cache = StatisticsDataCache::new(StatCalculator::Native(addr.clone()));
        assert_eq!(cache.min_max(&store, 0).unwrap(), Some(MinMax { min: 0.1, max: 0.4 }));

        store.free_allocated_results_data(&[], None);
        assert!(matches!(
            cache.histogram(&store, 0),
            Err(StatsError::DataNotLoaded { time_step: 0, .. })
        ));
        assert!(!cache.steps[0].histogram.is_computed());
        assert!(cache.p10_p90(&store, 0).is_err());
        assert!(!cache.steps[0].p10_p90.is_computed());
        // Already computed values survive freeing.
        assert_eq!(cache.min_max(&store, 0).unwrap(), Some(MinMax { min: 0.1, max: 0.4 }));

        store.set_cell_scalar_result(&addr, 0, vec![0.1, 0.4, 0.2]).unwrap();
        let h = cache.histogram(&store, 0).unwrap().unwrap();
        assert_eq!(h.observation_count(), 3);
        assert!(cache.p10_p90(&store, 0).unwrap().is_some());
    }
}
