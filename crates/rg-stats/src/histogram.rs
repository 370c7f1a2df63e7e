//! Fixed-bin histogram and binned percentiles.
//!
//! Percentiles are read from the bins, not from sorted values: the result
//! is exact only to within one bin width.

use rg_core::is_missing;

use crate::error::{StatsError, StatsResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramConfig {
    pub num_bins: usize,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self { num_bins: 100 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    min: f64,
    max: f64,
    bins: Vec<usize>,
    observation_count: usize,
}

impl Histogram {
    /// Empty histogram over `[min, max]`. A degenerate range gets one bin.
    pub fn new(min: f64, max: f64, num_bins: usize) -> StatsResult<Self> {
        if num_bins == 0 {
            return Err(StatsError::InvalidBinCount);
        }
        if !(min.is_finite() && max.is_finite()) || min > max {
            return Err(StatsError::InvalidRange { min, max });
        }
        let num_bins = if min == max { 1 } else { num_bins };
        Ok(Self {
            min,
            max,
            bins: vec![0; num_bins],
            observation_count: 0,
        })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    pub fn observation_count(&self) -> usize {
        self.observation_count
    }

    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.bins.len() as f64
    }

    /// Bin of `v`, or `None` for missing values and values outside the range.
    ///
    /// `floor(n * (v - min) / range)`, with `v == max` in the last bin.
    pub fn bin_index(&self, v: f64) -> Option<usize> {
        if is_missing(v) || v < self.min || v > self.max {
            return None;
        }
        let range = self.max - self.min;
        if range == 0.0 {
            return Some(0);
        }
        let n = self.bins.len();
        let index = (n as f64 * (v - self.min) / range).floor() as usize;
        Some(index.min(n - 1))
    }

    pub fn add_value(&mut self, v: f64) {
        if let Some(i) = self.bin_index(v) {
            self.bins[i] += 1;
            self.observation_count += 1;
        }
    }

    pub fn add_values(&mut self, values: &[f64]) {
        values.iter().for_each(|&v| self.add_value(v));
    }

    /// Add another histogram's counts, each bin placed by its centre.
    pub fn add_binned(&mut self, other: &Histogram) {
        let width = other.bin_width();
        for (i, &count) in other.bins.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let centre = (other.min + (i as f64 + 0.5) * width).clamp(self.min, self.max);
            if let Some(target) = self.bin_index(centre) {
                self.bins[target] += count;
                self.observation_count += count;
            }
        }
    }

    /// Value below which a fraction `p` of the observations fall.
    ///
    /// Walks the bins until the running count reaches `p * N`, then
    /// interpolates linearly inside that bin. `p` is clamped to `[0, 1]`;
    /// `None` without observations.
    pub fn percentile(&self, p: f64) -> Option<f64> {
        if self.observation_count == 0 {
            return None;
        }
        let target = p.clamp(0.0, 1.0) * self.observation_count as f64;
        if target == 0.0 {
            return Some(self.min);
        }

        let width = self.bin_width();
        let mut accumulated = 0usize;
        for (i, &count) in self.bins.iter().enumerate() {
            accumulated += count;
            let acc = accumulated as f64;
            if acc >= target {
                let end_of_bin = self.min + (i + 1) as f64 * width;
                let unused_fraction = (acc - target) / count as f64;
                return Some(end_of_bin - unused_fraction * width);
            }
        }
        Some(self.max)
    }

    /// `(p10, p90)`.
    pub fn p10_p90(&self) -> Option<(f64, f64)> {
        Some((self.percentile(0.1)?, self.percentile(0.9)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rg_core::UNDEFINED_VALUE;

    #[test]
    fn value_lands_in_expected_bin() {
        let mut h = Histogram::new(0.0, 100.0, 100).unwrap();
        assert_eq!(h.bin_index(50.5), Some(50));
        assert_eq!(h.bin_index(0.0), Some(0));
        assert_eq!(h.bin_index(100.0), Some(99));
        assert_eq!(h.bin_index(-0.1), None);
        assert_eq!(h.bin_index(UNDEFINED_VALUE), None);
        h.add_value(50.5);
        assert_eq!(h.bins()[50], 1);
        assert_eq!(h.observation_count(), 1);
    }

    #[test]
    fn non_finite_values_are_not_counted() {
        let mut h = Histogram::new(1.0, 2.0, 2).unwrap();
        h.add_values(&[1.0, f64::NEG_INFINITY, 2.0, f64::NAN]);
        assert_eq!(h.observation_count(), 2);
        assert_eq!(h.bins(), &[1, 1]);
    }

    #[test]
    fn median_of_uniform_values() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let mut h = Histogram::new(0.0, 99.0, 100).unwrap();
        h.add_values(&values);
        assert!(h.bins().iter().all(|&c| c == 1));
        let median = h.percentile(0.5).unwrap();
        assert!((median - 50.0).abs() <= 1.0, "median = {median}");
    }

    #[test]
    fn percentile_bounds() {
        let mut h = Histogram::new(-5.0, 5.0, 10).unwrap();
        h.add_values(&[-5.0, -1.0, 0.0, 2.0, 5.0]);
        assert_eq!(h.percentile(0.0), Some(-5.0));
        let top = h.percentile(1.0).unwrap();
        assert!((top - 5.0).abs() <= h.bin_width());
    }

    #[test]
    fn degenerate_range_has_one_bin() {
        let mut h = Histogram::new(3.0, 3.0, 100).unwrap();
        assert_eq!(h.num_bins(), 1);
        h.add_values(&[3.0, 3.0, 4.0]);
        assert_eq!(h.bins(), &[2]);
        assert_eq!(h.percentile(0.5), Some(3.0));
    }

    #[test]
    fn invalid_construction() {
        assert!(matches!(Histogram::new(0.0, 1.0, 0), Err(StatsError::InvalidBinCount)));
        assert!(matches!(Histogram::new(2.0, 1.0, 10), Err(StatsError::InvalidRange { .. })));
        assert!(Histogram::new(0.0, f64::INFINITY, 10).is_err());
        assert_eq!(Histogram::new(0.0, 1.0, 4).unwrap().percentile(0.5), None);
    }

    #[test]
    fn binned_merge_uses_bin_centres() {
        let mut step = Histogram::new(0.0, 10.0, 10).unwrap();
        step.add_values(&[0.5, 0.7, 9.9]);
        let mut all = Histogram::new(0.0, 20.0, 10).unwrap();
        all.add_binned(&step);
        assert_eq!(all.observation_count(), 3);
        assert_eq!(all.bins()[0], 2);
        assert_eq!(all.bins()[4], 1);
    }
}
