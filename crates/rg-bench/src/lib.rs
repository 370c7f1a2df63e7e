//! Synthetic benchmarks for grid addressing, statistics and condensation.
//!
//! Each scenario builds a faulted corner-point grid, marks a share of cells
//! inactive, fills a multi-step dynamic result and a transmissibility network
//! over the grid, then times the three hot paths.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration, NaiveDate};
use rg_condense::{CellAddress, CellSpace, CondenserError, TransmissibilityCondenser};
use rg_grid::{ActiveCellInfo, FaceType, FaultDetectionConfig, GridError, MainGrid, Point3};
use rg_results::{CellResultsStore, ResultAddress, ResultsError};
use rg_stats::{CaseStatistics, HistogramConfig, StatsError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Results(#[from] ResultsError),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error(transparent)]
    Condenser(#[from] CondenserError),
    #[error("Invalid scenario {id}: {what}")]
    InvalidScenario { id: String, what: String },
}

pub type BenchResult<T> = Result<T, BenchError>;

/// A benchmark scenario definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkScenario {
    /// Unique identifier for this benchmark.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Main grid extents (nx, ny, nz).
    pub extents: [usize; 3],
    /// Columns with `i >= fault_column` are thrown down.
    pub fault_column: usize,
    /// Vertical fault throw in metres.
    pub throw_m: f64,
    /// Every n-th cell is inactive; 0 keeps all cells active.
    pub inactive_every: usize,
    pub time_steps: usize,
    /// Cells per layer boundary treated as external in the condensation network.
    pub external_layers: usize,
    /// Column window `(ni, nj)` of the condensation network, centred on the
    /// fault column in I and starting at `j = 0`. Clamped to the grid.
    pub condense_columns: [usize; 2],
}

/// Condensation solves a dense system over the network cells; larger
/// networks are skipped.
pub const MAX_CONDENSED_CELLS: usize = 4096;

/// A single run's timing breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetrics {
    pub total_time_s: f64,
    pub build_time_s: f64,
    pub fault_time_s: f64,
    pub statistics_time_s: f64,
    pub condense_time_s: f64,
    pub cell_count: usize,
    pub active_cell_count: usize,
    pub fault_faces: usize,
    /// Cells inside the condensation window; 0 when condensation was skipped.
    pub condensed_cells: usize,
    pub p10: Option<f64>,
    pub p90: Option<f64>,
    pub condensed_pairs: usize,
}

/// Aggregated statistics for multiple runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub run_count: usize,
    pub total_time_median_s: f64,
    pub total_time_min_s: f64,
    pub total_time_max_s: f64,
    pub fault_time_median_s: f64,
    pub statistics_time_median_s: f64,
    pub condense_time_median_s: f64,
}

/// Complete benchmark result for a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub scenario: BenchmarkScenario,
    pub runs: Vec<RunMetrics>,
    pub aggregate: AggregateMetrics,
}

/// Collection of benchmark results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSuite {
    pub timestamp: String,
    pub results: Vec<BenchmarkResult>,
}

pub fn default_benchmarks() -> Vec<BenchmarkScenario> {
    vec![
        BenchmarkScenario {
            id: "small_faulted".to_string(),
            name: "Small faulted box (20x20x5)".to_string(),
            extents: [20, 20, 5],
            fault_column: 10,
            throw_m: 2.5,
            inactive_every: 7,
            time_steps: 10,
            external_layers: 1,
            condense_columns: [20, 20],
        },
        BenchmarkScenario {
            id: "medium_faulted".to_string(),
            name: "Medium faulted box (60x60x10)".to_string(),
            extents: [60, 60, 10],
            fault_column: 30,
            throw_m: 4.0,
            inactive_every: 5,
            time_steps: 20,
            external_layers: 1,
            condense_columns: [12, 12],
        },
    ]
}

/// Corner-point grid with unit-sized cells; columns at or beyond
/// `fault_column` are shifted down by `throw_m`.
pub fn build_faulted_grid(extents: [usize; 3], fault_column: usize, throw_m: f64) -> BenchResult<MainGrid> {
    let [nx, ny, nz] = extents;
    let mut nodes = Vec::with_capacity(nx * ny * nz * 8);
    let mut corners = Vec::with_capacity(nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let dz = if i >= fault_column { throw_m } else { 0.0 };
                let base = nodes.len();
                for c in 0..8 {
                    let x = (i + [0, 1, 1, 0][c % 4]) as f64;
                    let y = (j + [0, 0, 1, 1][c % 4]) as f64;
                    let z = (k + c / 4) as f64 + dz;
                    nodes.push(Point3::new(x, y, z));
                }
                corners.push(std::array::from_fn(|c| base + c));
            }
        }
    }
    Ok(MainGrid::new("MAIN", extents, nodes, corners)?)
}

/// Run a single benchmark scenario N times.
pub fn run_scenario(scenario: &BenchmarkScenario, times: usize) -> BenchResult<BenchmarkResult> {
    validate(scenario)?;
    let mut runs = Vec::with_capacity(times);
    for run in 0..times {
        tracing::debug!(scenario = %scenario.id, run, "benchmark run");
        runs.push(run_once(scenario)?);
    }
    let aggregate = compute_aggregates(&runs);
    Ok(BenchmarkResult {
        scenario: scenario.clone(),
        runs,
        aggregate,
    })
}

fn validate(scenario: &BenchmarkScenario) -> BenchResult<()> {
    let invalid = |what: &str| BenchError::InvalidScenario {
        id: scenario.id.clone(),
        what: what.to_string(),
    };
    if scenario.extents.contains(&0) {
        return Err(invalid("grid extents must be non-zero"));
    }
    if scenario.time_steps == 0 {
        return Err(invalid("at least one time step is required"));
    }
    if scenario.condense_columns.contains(&0) {
        return Err(invalid("condensation window must be non-empty"));
    }
    Ok(())
}

/// Half-open `(i, j)` column ranges of the condensation window.
pub fn condense_window(scenario: &BenchmarkScenario) -> [std::ops::Range<usize>; 2] {
    let [nx, ny, _] = scenario.extents;
    let [ni, nj] = scenario.condense_columns;
    let ni = ni.min(nx);
    let i0 = scenario.fault_column.saturating_sub(ni / 2).min(nx - ni);
    [i0..i0 + ni, 0..nj.min(ny)]
}

/// Main-grid cells inside the condensation window, active or not.
pub fn condense_window_cells(scenario: &BenchmarkScenario) -> usize {
    let [i, j] = condense_window(scenario);
    i.len() * j.len() * scenario.extents[2]
}

fn run_once(scenario: &BenchmarkScenario) -> BenchResult<RunMetrics> {
    let total = Instant::now();

    let build = Instant::now();
    let mut grid = build_faulted_grid(scenario.extents, scenario.fault_column, scenario.throw_m)?;
    let mask: Vec<bool> = (0..grid.total_cell_count())
        .map(|c| scenario.inactive_every == 0 || c % scenario.inactive_every != 0)
        .collect();
    let mut active = ActiveCellInfo::from_mask(&mask);
    active.compute_derived_data(&grid)?;
    let active = Arc::new(active);
    let (store, pressure, pore_volume) = synthetic_results(Arc::clone(&active), scenario.time_steps)?;
    let build_time_s = build.elapsed().as_secs_f64();

    let faults = Instant::now();
    let summary = grid.compute_fault_faces(&FaultDetectionConfig::default(), Some(active.as_ref()))?;
    let fault_time_s = faults.elapsed().as_secs_f64();

    let stats = Instant::now();
    let mut case = CaseStatistics::new(HistogramConfig::default());
    let cache = case.statistics(&store, &pressure)?;
    for ts in 0..scenario.time_steps {
        cache.min_max(&store, ts)?;
        cache.histogram(&store, ts)?;
        cache.weighted_mean(&store, &pore_volume, ts)?;
    }
    cache.min_max_all(&store)?;
    let p10_p90 = cache.p10_p90_all(&store)?;
    let statistics_time_s = stats.elapsed().as_secs_f64();

    let condense = Instant::now();
    let window_cells = condense_window_cells(scenario);
    let (condensed_cells, condensed_pairs) = if window_cells > MAX_CONDENSED_CELLS {
        tracing::warn!(
            scenario = %scenario.id,
            cells = window_cells,
            limit = MAX_CONDENSED_CELLS,
            "condensation window too large, skipping condensation"
        );
        (0, 0)
    } else {
        let window = condense_window(scenario);
        let mut condenser = transmissibility_network(&grid, &active, &window, scenario.external_layers)?;
        let summary = condenser.calculate_condensed_transmissibilities_if_needed()?;
        (window_cells, summary.condensed_pair_count)
    };
    let condense_time_s = condense.elapsed().as_secs_f64();

    Ok(RunMetrics {
        total_time_s: total.elapsed().as_secs_f64(),
        build_time_s,
        fault_time_s,
        statistics_time_s,
        condense_time_s,
        cell_count: grid.total_cell_count(),
        active_cell_count: active.reservoir_active_cell_count(),
        fault_faces: summary.flagged_cell_faces,
        condensed_cells,
        p10: p10_p90.map(|(p10, _)| p10),
        p90: p10_p90.map(|(_, p90)| p90),
        condensed_pairs,
    })
}

/// Active-addressed pressure over `time_steps` monthly steps plus a static
/// pore volume weight.
fn synthetic_results(
    active: Arc<ActiveCellInfo>,
    time_steps: usize,
) -> BenchResult<(CellResultsStore, ResultAddress, ResultAddress)> {
    let active_count = active.reservoir_active_cell_count();
    let mut store = CellResultsStore::new(active);

    let pore_volume = ResultAddress::static_native("PORV");
    store.add_static_scalar_result(&pore_volume, active_count)?;
    store.modify_cell_scalar_result(&pore_volume, 0, |values| {
        for (i, v) in values.iter_mut().enumerate() {
            *v = 1.0 + (i % 13) as f64 * 0.1;
        }
    })?;

    let pressure = ResultAddress::dynamic_native("PRESSURE");
    store.add_empty_scalar_result(&pressure);
    let start = NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let dates: Vec<_> = (0..time_steps)
        .map(|ts| start + Duration::days(30 * ts as i64))
        .collect();
    let days: Vec<_> = (0..time_steps).map(|ts| 30.0 * ts as f64).collect();
    store.set_time_step_dates(&pressure, &dates, &days, &[])?;
    for ts in 0..time_steps {
        let values = (0..active_count)
            .map(|i| 250.0 - ts as f64 * 1.5 + ((i * 7919) % 101) as f64 * 0.2)
            .collect();
        store.set_cell_scalar_result(&pressure, ts, values)?;
    }
    Ok((store, pressure, pore_volume))
}

/// Neighbour network over active main-grid cells inside `window`. Cells in
/// the top and bottom `external_layers` layers are external; the rest are
/// eliminated.
fn transmissibility_network(
    grid: &MainGrid,
    active: &ActiveCellInfo,
    window: &[std::ops::Range<usize>; 2],
    external_layers: usize,
) -> BenchResult<TransmissibilityCondenser> {
    let main = grid.main_grid();
    let nz = main.cell_count_k();
    let in_window = |global: usize| {
        let (i, j, _) = main.ijk_from_cell_index(global);
        window[0].contains(&i) && window[1].contains(&j)
    };
    let address = |global: usize| {
        let (_, _, k) = main.ijk_from_cell_index(global);
        if k < external_layers || k + external_layers >= nz {
            CellAddress::external(CellSpace::GridCell, global)
        } else {
            CellAddress::internal(CellSpace::GridCell, global)
        }
    };

    let mut condenser = TransmissibilityCondenser::new();
    for global in active.active_cell_indices().filter(|&g| in_window(g)) {
        for face in [FaceType::PosI, FaceType::PosJ, FaceType::PosK] {
            let Some(neighbor) = grid.cell_ijk_neighbor(global, face) else {
                continue;
            };
            if !active.is_active(neighbor) || !in_window(neighbor) {
                continue;
            }
            let t = if grid.is_fault_face(global, face) { 0.1 } else { 1.0 };
            condenser.add_neighbor_transmissibility(address(global), address(neighbor), t)?;
        }
    }
    Ok(condenser)
}

pub fn compute_aggregates(runs: &[RunMetrics]) -> AggregateMetrics {
    if runs.is_empty() {
        return AggregateMetrics::default();
    }

    let median = |f: fn(&RunMetrics) -> f64| {
        let mut values: Vec<f64> = runs.iter().map(f).collect();
        values.sort_by(f64::total_cmp);
        values[values.len() / 2]
    };
    let totals = runs.iter().map(|r| r.total_time_s);

    AggregateMetrics {
        run_count: runs.len(),
        total_time_median_s: median(|r| r.total_time_s),
        total_time_min_s: totals.clone().fold(f64::INFINITY, f64::min),
        total_time_max_s: totals.fold(0.0, f64::max),
        fault_time_median_s: median(|r| r.fault_time_s),
        statistics_time_median_s: median(|r| r.statistics_time_s),
        condense_time_median_s: median(|r| r.condense_time_s),
    }
}
