//! Single-pass statistics over value slices.
//!
//! Missing values (infinite or NaN) are skipped by every accumulator. Each
//! accumulator also merges with another of its kind, which is how
//! multi-property results and all-time-step aggregates are built.

use std::collections::BTreeSet;

use rg_core::is_missing;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MinMaxAccumulator {
    range: Option<MinMax>,
}

impl MinMaxAccumulator {
    pub fn add_value(&mut self, v: f64) {
        if is_missing(v) {
            return;
        }
        self.range = Some(match self.range {
            Some(r) => MinMax {
                min: r.min.min(v),
                max: r.max.max(v),
            },
            None => MinMax { min: v, max: v },
        });
    }

    pub fn add_values(&mut self, values: &[f64]) {
        values.iter().for_each(|&v| self.add_value(v));
    }

    pub fn merge(&mut self, other: Option<MinMax>) {
        if let Some(r) = other {
            self.add_value(r.min);
            self.add_value(r.max);
        }
    }

    /// `None` when no value was added.
    pub fn result(&self) -> Option<MinMax> {
        self.range
    }
}

/// Smallest positive and largest negative value. Zero counts as neither.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PosNegClosestToZero {
    pub pos: Option<f64>,
    pub neg: Option<f64>,
}

impl PosNegClosestToZero {
    pub fn add_value(&mut self, v: f64) {
        if is_missing(v) {
            return;
        }
        if v > 0.0 && self.pos.is_none_or(|p| v < p) {
            self.pos = Some(v);
        }
        if v < 0.0 && self.neg.is_none_or(|n| v > n) {
            self.neg = Some(v);
        }
    }

    pub fn add_values(&mut self, values: &[f64]) {
        values.iter().for_each(|&v| self.add_value(v));
    }

    pub fn merge(&mut self, other: &PosNegClosestToZero) {
        if let Some(p) = other.pos {
            self.add_value(p);
        }
        if let Some(n) = other.neg {
            self.add_value(n);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SumCount {
    pub sum: f64,
    pub count: usize,
}

impl SumCount {
    pub fn add_value(&mut self, v: f64) {
        if is_missing(v) {
            return;
        }
        self.sum += v;
        self.count += 1;
    }

    pub fn add_values(&mut self, values: &[f64]) {
        values.iter().for_each(|&v| self.add_value(v));
    }

    pub fn merge(&mut self, other: &SumCount) {
        self.sum += other.sum;
        self.count += other.count;
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Distinct integer values, for category-like results (e.g. region numbers).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniqueValues {
    values: BTreeSet<i32>,
}

impl UniqueValues {
    /// Values are truncated toward zero.
    pub fn add_value(&mut self, v: f64) {
        if is_missing(v) {
            return;
        }
        self.values.insert(v as i32);
    }

    pub fn add_values(&mut self, values: &[f64]) {
        values.iter().for_each(|&v| self.add_value(v));
    }

    pub fn merge(&mut self, other: &UniqueValues) {
        self.values.extend(other.values.iter().copied());
    }

    pub fn values(&self) -> &BTreeSet<i32> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
