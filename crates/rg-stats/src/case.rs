//! Statistics caches for every result of a case.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use rg_results::{CellResultsStore, ResultAddress};

use crate::cache::StatisticsDataCache;
use crate::calculator::StatCalculator;
use crate::error::StatsResult;
use crate::histogram::HistogramConfig;

/// One [`StatisticsDataCache`] per result address, created on first use
/// from the statistics source bound in the store.
#[derive(Debug, Clone, Default)]
pub struct CaseStatistics {
    caches: HashMap<ResultAddress, StatisticsDataCache>,
    config: HistogramConfig,
}

impl CaseStatistics {
    pub fn new(config: HistogramConfig) -> Self {
        Self {
            caches: HashMap::new(),
            config,
        }
    }

    pub fn statistics(
        &mut self,
        store: &CellResultsStore,
        address: &ResultAddress,
    ) -> StatsResult<&mut StatisticsDataCache> {
        match self.caches.entry(address.clone()) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let calculator = StatCalculator::from_store(store, address)?;
                Ok(e.insert(StatisticsDataCache::with_config(calculator, self.config)))
            }
        }
    }

    pub fn set_num_bins(
        &mut self,
        store: &CellResultsStore,
        address: &ResultAddress,
        num_bins: usize,
    ) -> StatsResult<()> {
        self.statistics(store, address)?.set_num_bins(num_bins)
    }

    pub fn clear_all_statistics(&mut self) {
        self.caches.values_mut().for_each(StatisticsDataCache::clear_all_statistics);
    }

    /// Drop the cache of one result, e.g. after it was renamed or deleted.
    pub fn remove(&mut self, address: &ResultAddress) -> Option<StatisticsDataCache> {
        self.caches.remove(address)
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }
}
