//! Eclipse ASCII keyword export of one result time step.

use std::io::Write;

use rg_grid::MainGrid;

use crate::address::ResultAddress;
use crate::store::CellResultsStore;
use crate::ResultsResult;

#[derive(Debug, Clone)]
pub struct KeywordExportConfig {
    pub values_per_line: usize,
    /// Written for inactive cells and missing values.
    pub undefined_value: f64,
    /// Written as a `--` line before the keyword.
    pub comment: Option<String>,
}

impl Default for KeywordExportConfig {
    fn default() -> Self {
        Self {
            values_per_line: 5,
            undefined_value: 0.0,
            comment: Some("Exported from resgrid".to_string()),
        }
    }
}

/// Write `keyword` followed by one value per main-grid cell in IJK order,
/// terminated by `/`. Returns the number of values written.
pub fn write_keyword<W: Write>(
    out: &mut W,
    keyword: &str,
    grid: &MainGrid,
    store: &CellResultsStore,
    address: &ResultAddress,
    time_step: usize,
    config: &KeywordExportConfig,
) -> ResultsResult<usize> {
    // Fails early for unknown results and time steps.
    store.cell_scalar_results(address, time_step)?;

    writeln!(out)?;
    if let Some(comment) = &config.comment {
        writeln!(out, "-- {comment}")?;
    }
    writeln!(out, "{keyword}")?;

    let per_line = config.values_per_line.max(1);
    let count = grid.main_grid().cell_count();
    for cell in 0..count {
        let value = store
            .cell_scalar_value(address, time_step, cell)
            .unwrap_or(config.undefined_value);
        write!(out, "{value:>16}")?;
        if (cell + 1) % per_line == 0 {
            writeln!(out)?;
        }
    }
    if count % per_line != 0 {
        writeln!(out)?;
    }
    writeln!(out, "/")?;

    tracing::debug!(keyword, values = count, "keyword written");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rg_grid::{ActiveCellInfo, LocalGridSpec};
    use std::sync::Arc;

    #[test]
    fn writes_main_grid_cells_only() {
        let mut grid = MainGrid::box_grid("MAIN", [3, 2, 1], [1.0, 1.0, 1.0]).unwrap();
        let lgr = LocalGridSpec::refine_cell("LGR", &grid, 0, [2, 1, 1]).unwrap();
        grid.add_local_grid(lgr).unwrap();

        let mut mask = vec![true; grid.total_cell_count()];
        mask[4] = false;
        let active = Arc::new(ActiveCellInfo::from_mask(&mask));
        let mut store = CellResultsStore::new(active);
        let poro = ResultAddress::static_native("PORO");
        store.add_static_scalar_result(&poro, 7).unwrap();
        store
            .set_cell_scalar_result(&poro, 0, vec![0.1, 0.2, 0.3, 0.4, 0.6, 0.7, 0.8])
            .unwrap();

        let mut buf = Vec::new();
        let config = KeywordExportConfig {
            undefined_value: -1.0,
            comment: None,
            ..Default::default()
        };
        let written = write_keyword(&mut buf, "PORO", &grid, &store, &poro, 0, &config).unwrap();
        assert_eq!(written, 6);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "PORO");
        let first: Vec<f64> = lines[2].split_whitespace().map(|v| v.parse().unwrap()).collect();
        assert_eq!(first, vec![0.1, 0.2, 0.3, 0.4, -1.0]);
        assert_eq!(lines[3].trim(), "0.6");
        assert_eq!(lines[4], "/");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn unknown_result_fails() {
        let grid = MainGrid::box_grid("MAIN", [1, 1, 1], [1.0, 1.0, 1.0]).unwrap();
        let store = CellResultsStore::new(Arc::new(ActiveCellInfo::from_mask(&[true])));
        let mut buf = Vec::new();
        let addr = ResultAddress::static_native("NOPE");
        assert!(write_keyword(&mut buf, "NOPE", &grid, &store, &addr, 0, &KeywordExportConfig::default()).is_err());
        assert!(buf.is_empty());
    }
}
