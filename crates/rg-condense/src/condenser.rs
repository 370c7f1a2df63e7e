//! Lazy Schur-complement condensation of a transmissibility network.

use std::collections::{BTreeMap, BTreeSet};

use nalgebra::DMatrix;
use petgraph::unionfind::UnionFind;
use rg_core::timing::Timer;

use crate::address::CellAddress;
use crate::error::{CondenserError, CondenserResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CondenserConfig {
    /// Transmissibilities below this are dropped on insertion.
    pub min_transmissibility: f64,
}

impl Default for CondenserConfig {
    fn default() -> Self {
        Self {
            min_transmissibility: 1e-9,
        }
    }
}

/// Outcome of the last condensation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CondensationSummary {
    pub internal_count: usize,
    pub external_count: usize,
    /// Internal cells with no path to any external cell, left out of the
    /// elimination.
    pub excluded_internal_count: usize,
    pub condensed_pair_count: usize,
}

type Pair = (CellAddress, CellAddress);

fn canonical(a: CellAddress, b: CellAddress) -> Pair {
    if a <= b { (a, b) } else { (b, a) }
}

/// Accumulates raw neighbour transmissibilities and serves the condensed
/// transmissibilities between external cells.
///
/// Adding an edge marks the condensed state dirty; it is recomputed on the
/// next condensed query. Not synchronized: wrap in a lock to share.
#[derive(Debug, Clone, Default)]
pub struct TransmissibilityCondenser {
    config: CondenserConfig,
    raw: BTreeMap<Pair, f64>,
    dirty: bool,
    condensed: BTreeMap<Pair, f64>,
    external: BTreeSet<CellAddress>,
    summary: CondensationSummary,
}

impl TransmissibilityCondenser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CondenserConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Add `t` to the connection between `a` and `b`. Values below the
    /// configured minimum are ignored.
    pub fn add_neighbor_transmissibility(&mut self, a: CellAddress, b: CellAddress, t: f64) -> CondenserResult<()> {
        if !t.is_finite() {
            return Err(CondenserError::NonFinite { a, b, value: t });
        }
        if a == b {
            return Err(CondenserError::SelfConnection { address: a });
        }
        if t < self.config.min_transmissibility {
            return Ok(());
        }
        *self.raw.entry(canonical(a, b)).or_insert(0.0) += t;
        self.dirty = true;
        Ok(())
    }

    /// Accumulated raw transmissibility; 0.0 when not connected.
    pub fn neighbor_transmissibility(&self, a: CellAddress, b: CellAddress) -> f64 {
        self.raw.get(&canonical(a, b)).copied().unwrap_or(0.0)
    }

    /// Raw connections as canonical `(a, b, t)` with `a < b`.
    pub fn raw_transmissibilities(&self) -> impl Iterator<Item = (CellAddress, CellAddress, f64)> + '_ {
        self.raw.iter().map(|(&(a, b), &t)| (a, b, t))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Equivalent transmissibility between two external cells; 0.0 when no
    /// flow path connects them.
    pub fn condensed_transmissibility(&mut self, a: CellAddress, b: CellAddress) -> CondenserResult<f64> {
        self.calculate_condensed_transmissibilities_if_needed()?;
        Ok(self.condensed.get(&canonical(a, b)).copied().unwrap_or(0.0))
    }

    /// Every non-zero condensed connection as `(a, b, t)` with `a < b`.
    pub fn condensed_transmissibilities(
        &mut self,
    ) -> CondenserResult<impl Iterator<Item = (CellAddress, CellAddress, f64)> + '_> {
        self.calculate_condensed_transmissibilities_if_needed()?;
        Ok(self.condensed.iter().map(|(&(a, b), &t)| (a, b, t)))
    }

    /// External cells referenced by any connection.
    pub fn external_cells(&mut self) -> CondenserResult<&BTreeSet<CellAddress>> {
        self.calculate_condensed_transmissibilities_if_needed()?;
        Ok(&self.external)
    }

    pub fn calculate_condensed_transmissibilities_if_needed(&mut self) -> CondenserResult<CondensationSummary> {
        if !self.dirty {
            return Ok(self.summary);
        }

        let timer = Timer::start("transmissibility condensation");
        let (condensed, external, summary) = condense(&self.raw)?;
        timer.stop_and_log();

        if summary.excluded_internal_count > 0 {
            tracing::warn!(
                excluded = summary.excluded_internal_count,
                "internal cells without path to an external cell left out of condensation"
            );
        }
        tracing::info!(
            internal = summary.internal_count,
            external = summary.external_count,
            pairs = summary.condensed_pair_count,
            "transmissibilities condensed"
        );

        self.condensed = condensed;
        self.external = external;
        self.summary = summary;
        self.dirty = false;
        Ok(summary)
    }
}

fn condense(
    raw: &BTreeMap<Pair, f64>,
) -> CondenserResult<(BTreeMap<Pair, f64>, BTreeSet<CellAddress>, CondensationSummary)> {
    // Sorted enumeration puts internal cells first.
    let nodes: Vec<CellAddress> = raw
        .keys()
        .flat_map(|&(a, b)| [a, b])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let index_of: BTreeMap<CellAddress, usize> = nodes.iter().enumerate().map(|(i, &a)| (a, i)).collect();
    let first_external = nodes.partition_point(|a| !a.is_external);

    let reaches_external = components_reaching_external(&nodes, &index_of, raw, first_external);
    let kept: Vec<usize> = (0..first_external).filter(|&i| reaches_external[i]).collect();
    let internal_count = kept.len();
    let external_count = nodes.len() - first_external;

    // Equation index: kept internal cells, then external cells.
    let mut equation = vec![None; nodes.len()];
    for (eq, &node) in kept.iter().enumerate() {
        equation[node] = Some(eq);
    }
    for node in first_external..nodes.len() {
        equation[node] = Some(internal_count + node - first_external);
    }

    let n = internal_count + external_count;
    let mut t = DMatrix::<f64>::zeros(n, n);
    for (&(a, b), &value) in raw {
        let (Some(u), Some(v)) = (equation[index_of[&a]], equation[index_of[&b]]) else {
            continue;
        };
        t[(u, v)] += value;
        t[(v, u)] += value;
        t[(u, u)] -= value;
        t[(v, v)] -= value;
    }

    let t_ee = t
        .view((internal_count, internal_count), (external_count, external_count))
        .into_owned();
    let t_cond = if internal_count == 0 {
        t_ee
    } else {
        let t_ii = t.view((0, 0), (internal_count, internal_count)).into_owned();
        let t_ie = t.view((0, internal_count), (internal_count, external_count)).into_owned();
        let t_ei = t.view((internal_count, 0), (external_count, internal_count)).into_owned();

        // -T_II is symmetric positive definite when every internal
        // component touches an external cell.
        let singular = CondenserError::SingularElimination { internal_count };
        let cholesky = (-t_ii).cholesky().ok_or_else(|| singular.clone())?;
        let x = cholesky.solve(&t_ie);
        let reduced = t_ee + &t_ei * x;
        if reduced.iter().any(|v| !v.is_finite()) {
            return Err(singular);
        }
        reduced
    };

    let externals = &nodes[first_external..];
    let mut condensed = BTreeMap::new();
    for i in 0..external_count {
        for j in (i + 1)..external_count {
            let value = t_cond[(i, j)];
            if value != 0.0 {
                condensed.insert(canonical(externals[i], externals[j]), value);
            }
        }
    }

    let summary = CondensationSummary {
        internal_count,
        external_count,
        excluded_internal_count: first_external - internal_count,
        condensed_pair_count: condensed.len(),
    };
    Ok((condensed, externals.iter().copied().collect(), summary))
}

/// For each node, whether its connected component contains an external node.
fn components_reaching_external(
    nodes: &[CellAddress],
    index_of: &BTreeMap<CellAddress, usize>,
    raw: &BTreeMap<Pair, f64>,
    first_external: usize,
) -> Vec<bool> {
    let mut components = UnionFind::<usize>::new(nodes.len());
    for &(a, b) in raw.keys() {
        components.union(index_of[&a], index_of[&b]);
    }

    let mut root_has_external = vec![false; nodes.len()];
    for node in first_external..nodes.len() {
        root_has_external[components.find_mut(node)] = true;
    }
    (0..nodes.len())
        .map(|node| root_has_external[components.find_mut(node)])
        .collect()
}
