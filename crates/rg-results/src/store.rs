//! Scalar result storage for one porosity model of a case.
//!
//! Each result holds one value array per time step. An array is indexed
//! either by global cell index or by active cell index; which one is
//! inferred from its length. Every write bumps a store-wide revision so
//! derived data (statistics) can detect stale inputs.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDateTime;
use rg_core::{UNDEFINED_VALUE, defined};
use rg_grid::ActiveCellInfo;

use crate::address::{ResultAddress, ResultCategory};
use crate::source::StatisticsSource;
use crate::timestep::TimeStepInfo;
use crate::{ResultsError, ResultsResult};

/// How a value array is indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Global,
    Active,
}

#[derive(Debug, Clone)]
struct ResultEntry {
    address: ResultAddress,
    source: StatisticsSource,
    time_steps: Vec<TimeStepInfo>,
    values: Vec<Vec<f64>>,
    modified_at: u64,
}

impl ResultEntry {
    fn allocated_value_count(&self) -> usize {
        self.values.iter().map(Vec::len).sum()
    }

    fn first_non_empty_len(&self) -> Option<usize> {
        self.values.iter().map(Vec::len).find(|len| *len > 0)
    }
}

#[derive(Debug, Clone)]
pub struct CellResultsStore {
    active_cells: Arc<ActiveCellInfo>,
    entries: Vec<ResultEntry>,
    index: HashMap<ResultAddress, usize>,
    revision: u64,
}

impl CellResultsStore {
    pub fn new(active_cells: Arc<ActiveCellInfo>) -> Self {
        Self {
            active_cells,
            entries: Vec::new(),
            index: HashMap::new(),
            revision: 0,
        }
    }

    pub fn active_cell_info(&self) -> &ActiveCellInfo {
        &self.active_cells
    }

    /// Length of a globally addressed array.
    pub fn global_cell_count(&self) -> usize {
        self.active_cells.reservoir_cell_count()
    }

    /// Length of an actively addressed array.
    pub fn active_cell_count(&self) -> usize {
        self.active_cells.reservoir_active_cell_count()
    }

    /// Store-wide counter, bumped on every mutation of values or metadata.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Revision of the last change to one result.
    pub fn result_revision(&self, address: &ResultAddress) -> Option<u64> {
        self.find(address).map(|e| e.modified_at)
    }

    fn find(&self, address: &ResultAddress) -> Option<&ResultEntry> {
        self.index.get(address).map(|&i| &self.entries[i])
    }

    fn entry(&self, address: &ResultAddress) -> ResultsResult<&ResultEntry> {
        self.find(address).ok_or_else(|| ResultsError::ResultNotFound {
            address: address.clone(),
        })
    }

    /// Mutable entry, marked as modified.
    fn touch(&mut self, address: &ResultAddress) -> ResultsResult<&mut ResultEntry> {
        let &i = self.index.get(address).ok_or_else(|| ResultsError::ResultNotFound {
            address: address.clone(),
        })?;
        self.revision += 1;
        let entry = &mut self.entries[i];
        entry.modified_at = self.revision;
        Ok(entry)
    }

    // ---- creation ----

    /// Find or create a result without values. Returns its index.
    ///
    /// A new result gets its statistics source from its name (see
    /// [`StatisticsSource::for_address`]).
    pub fn add_empty_scalar_result(&mut self, address: &ResultAddress) -> usize {
        if let Some(&i) = self.index.get(address) {
            return i;
        }

        self.revision += 1;
        let i = self.entries.len();
        let source = StatisticsSource::for_address(address);
        tracing::debug!(result = %address, native = source.is_native(), "result created");
        self.entries.push(ResultEntry {
            address: address.clone(),
            source,
            time_steps: Vec::new(),
            values: Vec::new(),
            modified_at: self.revision,
        });
        self.index.insert(address.clone(), i);
        i
    }

    /// Find or create a result with a single time step of `value_count`
    /// missing values.
    pub fn add_static_scalar_result(
        &mut self,
        address: &ResultAddress,
        value_count: usize,
    ) -> ResultsResult<usize> {
        self.check_size(address, value_count, None)?;
        let i = self.add_empty_scalar_result(address);
        let entry = self.touch(address)?;
        entry.values.resize_with(1, Vec::new);
        entry.values[0].resize(value_count, UNDEFINED_VALUE);
        Ok(i)
    }

    // ---- time steps ----

    /// Set time step metadata. Resizes the value container without
    /// allocating any value arrays.
    pub fn set_time_step_infos(
        &mut self,
        address: &ResultAddress,
        infos: Vec<TimeStepInfo>,
    ) -> ResultsResult<()> {
        let entry = self.touch(address)?;
        entry.values.resize_with(infos.len(), Vec::new);
        entry.time_steps = infos;
        Ok(())
    }

    pub fn set_time_step_dates(
        &mut self,
        address: &ResultAddress,
        dates: &[NaiveDateTime],
        days_since_start: &[f64],
        report_numbers: &[i32],
    ) -> ResultsResult<()> {
        let infos = TimeStepInfo::from_parts(dates, days_since_start, report_numbers)?;
        self.set_time_step_infos(address, infos)
    }

    pub fn time_step_infos(&self, address: &ResultAddress) -> ResultsResult<&[TimeStepInfo]> {
        Ok(&self.entry(address)?.time_steps)
    }

    pub fn time_step_dates(&self, address: &ResultAddress) -> ResultsResult<Vec<NaiveDateTime>> {
        Ok(self.entry(address)?.time_steps.iter().map(|t| t.date).collect())
    }

    pub fn days_since_start(&self, address: &ResultAddress) -> ResultsResult<Vec<f64>> {
        Ok(self
            .entry(address)?
            .time_steps
            .iter()
            .map(|t| t.days_since_start)
            .collect())
    }

    pub fn report_step_number(&self, address: &ResultAddress, time_step: usize) -> Option<i32> {
        self.find(address)?
            .time_steps
            .get(time_step)
            .and_then(|t| t.report_number)
    }

    /// Number of value slots (allocated or not); 0 for unknown results.
    pub fn time_step_count(&self, address: &ResultAddress) -> usize {
        self.find(address).map_or(0, |e| e.values.len())
    }

    /// Largest number of time step infos over all results.
    pub fn max_time_step_count(&self) -> usize {
        self.entries.iter().map(|e| e.time_steps.len()).max().unwrap_or(0)
    }

    /// First result having [`Self::max_time_step_count`] time steps.
    pub fn result_with_most_time_steps(&self) -> Option<&ResultAddress> {
        let mut best: Option<&ResultEntry> = None;
        for entry in &self.entries {
            if entry.time_steps.len() > best.map_or(0, |b| b.time_steps.len()) {
                best = Some(entry);
            }
        }
        best.map(|e| &e.address)
    }

    // ---- addressing ----

    /// Addressing mode inferred from the first non-empty time step.
    ///
    /// A length equal to the global cell count means global addressing,
    /// anything else active addressing. When the model has no inactive
    /// cells the two are indistinguishable and this reports `Global`.
    /// Returns `None` while no values are loaded.
    pub fn addressing_mode(&self, address: &ResultAddress) -> Option<AddressingMode> {
        let len = self.find(address)?.first_non_empty_len()?;
        Some(if len == self.global_cell_count() {
            AddressingMode::Global
        } else {
            AddressingMode::Active
        })
    }

    /// Classify an array length, checking it against the mode already in use.
    fn check_size(
        &self,
        address: &ResultAddress,
        len: usize,
        skip_time_step: Option<usize>,
    ) -> ResultsResult<AddressingMode> {
        let global = self.global_cell_count();
        let active = self.active_cell_count();
        let invalid = || ResultsError::InvalidResultSize {
            address: address.clone(),
            len,
            global,
            active,
        };

        let mode = if len == global {
            AddressingMode::Global
        } else if len == active {
            AddressingMode::Active
        } else {
            return Err(invalid());
        };

        let existing = self.find(address).and_then(|e| {
            e.values
                .iter()
                .enumerate()
                .filter(|(ts, v)| Some(*ts) != skip_time_step && !v.is_empty())
                .map(|(_, v)| v.len())
                .next()
        });
        match existing {
            Some(existing_len) if existing_len != len => Err(invalid()),
            _ => Ok(mode),
        }
    }

    // ---- values ----

    /// Replace the values of one time step. The length must match the
    /// global or active cell count, and the other time steps of the result.
    /// An empty array releases the time step.
    pub fn set_cell_scalar_result(
        &mut self,
        address: &ResultAddress,
        time_step: usize,
        values: Vec<f64>,
    ) -> ResultsResult<()> {
        let count = self.entry(address)?.values.len();
        if time_step >= count {
            return Err(ResultsError::TimeStepOutOfRange {
                address: address.clone(),
                index: time_step,
                count,
            });
        }
        if !values.is_empty() {
            self.check_size(address, values.len(), Some(time_step))?;
        }
        self.touch(address)?.values[time_step] = values;
        Ok(())
    }

    /// Edit values of one time step in place.
    pub fn modify_cell_scalar_result<R>(
        &mut self,
        address: &ResultAddress,
        time_step: usize,
        f: impl FnOnce(&mut [f64]) -> R,
    ) -> ResultsResult<R> {
        let count = self.entry(address)?.values.len();
        if time_step >= count {
            return Err(ResultsError::TimeStepOutOfRange {
                address: address.clone(),
                index: time_step,
                count,
            });
        }
        let entry = self.touch(address)?;
        Ok(f(&mut entry.values[time_step]))
    }

    /// Values of one time step; empty when not loaded or freed.
    pub fn cell_scalar_results(&self, address: &ResultAddress, time_step: usize) -> ResultsResult<&[f64]> {
        let entry = self.entry(address)?;
        entry
            .values
            .get(time_step)
            .map(Vec::as_slice)
            .ok_or_else(|| ResultsError::TimeStepOutOfRange {
                address: address.clone(),
                index: time_step,
                count: entry.values.len(),
            })
    }

    pub fn all_cell_scalar_results(&self, address: &ResultAddress) -> ResultsResult<&[Vec<f64>]> {
        Ok(&self.entry(address)?.values)
    }

    /// Value of one cell by global cell index. `None` for unknown results,
    /// unloaded time steps, inactive cells of active-addressed results and
    /// missing values.
    pub fn cell_scalar_value(&self, address: &ResultAddress, time_step: usize, global_cell: usize) -> Option<f64> {
        let values = self.find(address)?.values.get(time_step)?;
        let index = match self.addressing_mode(address)? {
            AddressingMode::Global => global_cell,
            AddressingMode::Active => self.active_cells.cell_result_index(global_cell)?,
        };
        values.get(index).copied().and_then(defined)
    }

    // ---- queries ----

    pub fn result_count(&self) -> usize {
        self.entries.len()
    }

    pub fn has_result(&self, address: &ResultAddress) -> bool {
        self.index.contains_key(address)
    }

    /// Index assigned at creation.
    pub fn result_index(&self, address: &ResultAddress) -> Option<usize> {
        self.index.get(address).copied()
    }

    /// Every result, in creation order.
    pub fn existing_results(&self) -> impl Iterator<Item = &ResultAddress> {
        self.entries.iter().map(|e| &e.address)
    }

    pub fn result_names(&self, category: ResultCategory) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.address.category == category)
            .map(|e| e.address.name.as_str())
            .collect()
    }

    pub fn statistics_source(&self, address: &ResultAddress) -> Option<&StatisticsSource> {
        self.find(address).map(|e| &e.source)
    }

    /// Values held in memory over all time steps.
    pub fn allocated_value_count(&self, address: &ResultAddress) -> usize {
        self.find(address).map_or(0, ResultEntry::allocated_value_count)
    }

    pub fn is_result_loaded(&self, address: &ResultAddress) -> bool {
        self.allocated_value_count(address) > 0
    }

    /// Allocated value count of every result.
    pub fn result_value_count(&self) -> BTreeMap<ResultAddress, usize> {
        self.entries
            .iter()
            .map(|e| (e.address.clone(), e.allocated_value_count()))
            .collect()
    }

    // ---- naming ----

    /// `candidate`, or `candidate_1`, `candidate_2`, ... whichever is unused
    /// in every category.
    pub fn make_result_name_unique(&self, candidate: &str) -> String {
        let taken = |name: &str| self.entries.iter().any(|e| e.address.name == name);
        if !taken(candidate) {
            return candidate.to_string();
        }
        (1..)
            .map(|n| format!("{candidate}_{n}"))
            .find(|name| !taken(name))
            .unwrap_or_else(|| candidate.to_string())
    }

    /// Rename a result. Returns false when the result is unknown or the new
    /// address is taken.
    pub fn update_result_name(&mut self, category: ResultCategory, old_name: &str, new_name: &str) -> bool {
        let old = ResultAddress::new(category, old_name);
        let new = ResultAddress::new(category, new_name);
        if self.has_result(&new) {
            return false;
        }
        let Some(i) = self.index.remove(&old) else {
            return false;
        };
        self.revision += 1;
        let entry = &mut self.entries[i];
        entry.address = new.clone();
        entry.modified_at = self.revision;
        self.index.insert(new, i);
        true
    }

    /// Move a generated result to [`ResultCategory::Removed`].
    pub fn set_removed_tag(&mut self, address: &ResultAddress) -> bool {
        if address.category != ResultCategory::Generated {
            return false;
        }
        let removed = ResultAddress::new(ResultCategory::Removed, address.name.clone());
        if self.has_result(&removed) {
            return false;
        }
        let Some(i) = self.index.remove(address) else {
            return false;
        };
        self.revision += 1;
        self.entries[i].address = removed.clone();
        self.entries[i].modified_at = self.revision;
        self.index.insert(removed, i);
        true
    }

    // ---- releasing ----

    /// Drop the values of every time step; time step slots remain.
    pub fn clear_scalar_result(&mut self, address: &ResultAddress) {
        if let Ok(entry) = self.touch(address) {
            entry.values.iter_mut().for_each(|v| *v = Vec::new());
        }
    }

    /// Remove every result and its metadata.
    pub fn clear_all_results(&mut self) {
        self.revision += 1;
        self.entries.clear();
        self.index.clear();
    }

    /// Release value storage while keeping metadata and time step slots.
    ///
    /// Results in `categories_to_exclude` are kept. With `time_step` set,
    /// only that time step is released. Revisions are unchanged: freed
    /// values were not modified, so statistics computed from them stay
    /// valid.
    pub fn free_allocated_results_data(&mut self, categories_to_exclude: &[ResultCategory], time_step: Option<usize>) {
        let mut freed = 0usize;
        for entry in &mut self.entries {
            if categories_to_exclude.contains(&entry.address.category) {
                continue;
            }
            for (ts, values) in entry.values.iter_mut().enumerate() {
                if time_step.is_some_and(|keep| keep != ts) || values.is_empty() {
                    continue;
                }
                freed += values.len();
                *values = Vec::new();
            }
        }
        tracing::debug!(freed_values = freed, "result data released");
    }
}
