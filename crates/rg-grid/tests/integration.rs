//! End-to-end grid addressing: corner-point input, LGRs, faults and active cells.

use rg_core::GridId;
use rg_grid::{
    ActiveCellInfo, FaceType, FaultDetectionConfig, GridError, LocalGridSpec, MainGrid, Point3,
};

/// Corner-point grid of `nx x 1 x nz` unit cells. Columns with `i >= fault_i`
/// are shifted down by `throw`.
fn stepped_grid(nx: usize, nz: usize, fault_i: usize, throw: f64) -> MainGrid {
    let mut nodes = Vec::new();
    let mut corners = Vec::new();
    for k in 0..nz {
        for i in 0..nx {
            let dz = if i >= fault_i { throw } else { 0.0 };
            let base = nodes.len();
            for c in 0..8 {
                let x = (i + [0, 1, 1, 0][c % 4]) as f64;
                let y = [0, 0, 1, 1][c % 4] as f64;
                let z = (k + c / 4) as f64 - dz;
                nodes.push(Point3::new(x, y, z));
            }
            corners.push(std::array::from_fn(|c| base + c));
        }
    }
    MainGrid::new("MAIN", [nx, 1, nz], nodes, corners).unwrap()
}

#[test]
fn line_of_five_cells() {
    let grid = MainGrid::box_grid("MAIN", [5, 1, 1], [10.0, 10.0, 2.0]).unwrap();
    let main = grid.main_grid();
    assert_eq!(main.cell_count_i(), 5);
    assert_eq!(main.cell_index_from_ijk(3, 0, 0), 3);
    assert_eq!(main.ijk_from_cell_index(4), (4, 0, 0));
    assert!(grid.is_cell_valid(GridId::MAIN, 4, 0, 0));
    assert!(!grid.is_cell_valid(GridId::MAIN, 5, 0, 0));
    assert_eq!(grid.cell_ijk_neighbor(0, FaceType::NegI), None);
}

#[test]
fn fault_detection_over_layers() {
    let mut grid = stepped_grid(4, 3, 2, 0.25);
    let summary = grid
        .compute_fault_faces(&FaultDetectionConfig::default(), None)
        .unwrap();

    // One I-face pair per layer, counted from both sides.
    assert_eq!(summary.flagged_cell_faces, 6);
    assert_eq!(grid.fault_face_count(), 6);

    let faults = grid.fault_faces();
    assert_eq!(faults.len(), 3);
    for (layer, fault) in faults.iter().enumerate() {
        assert_eq!(fault.cell, layer * 4 + 1);
        assert_eq!(fault.neighbor, layer * 4 + 2);
        assert_eq!(fault.face, FaceType::PosI);
    }

    // Vertical stacking inside a column stays continuous.
    assert!(!grid.is_fault_face(2, FaceType::PosK));
    assert!(!grid.is_fault_face(6, FaceType::NegK));
}

#[test]
fn fault_detection_with_inactive_neighbours() {
    let mut grid = stepped_grid(3, 1, 1, 1.5);
    let active = ActiveCellInfo::from_mask(&[true, false, true]);
    let summary = grid
        .compute_fault_faces(&FaultDetectionConfig::default(), Some(&active))
        .unwrap();
    assert_eq!(summary.flagged_cell_faces, 2);
    assert_eq!(summary.flagged_with_inactive, 2);
    assert!(grid.fault_faces().iter().all(|f| f.with_inactive));
}

#[test]
fn nested_lgr_resolves_to_main_cell() {
    let mut grid = MainGrid::box_grid("MAIN", [2, 2, 1], [100.0, 100.0, 10.0]).unwrap();
    let lgr = LocalGridSpec::refine_cell("LGR1", &grid, 3, [2, 2, 1]).unwrap();
    let lgr_id = grid.add_local_grid(lgr).unwrap();
    let nested_host = grid.global_cell_index(lgr_id, 0).unwrap();
    let nested = LocalGridSpec::refine_cell("LGR2", &grid, nested_host, [3, 1, 1]).unwrap();
    let nested_id = grid.add_local_grid(nested).unwrap();

    assert_eq!(grid.grid_count(), 3);
    assert_eq!(grid.total_cell_count(), 4 + 4 + 3);
    assert_eq!(grid.grid_by_name("LGR2").map(|g| g.id()), Some(nested_id));

    for local in 0..3 {
        let global = grid.global_cell_index(nested_id, local).unwrap();
        assert_eq!(grid.grid_and_local_index_from_global(global), Some((nested_id, local)));
        assert_eq!(grid.main_grid_cell_index(global), Some(3));
    }

    let center = grid.cell_center(nested_host).unwrap();
    assert!((center.x - 125.0).abs() < 1e-9);
    assert!((center.y - 125.0).abs() < 1e-9);
}

#[test]
fn active_cells_over_lgr() {
    let mut grid = MainGrid::box_grid("MAIN", [2, 1, 1], [1.0, 1.0, 1.0]).unwrap();
    let lgr = LocalGridSpec::refine_cell("LGR", &grid, 1, [2, 1, 1]).unwrap();
    grid.add_local_grid(lgr).unwrap();

    let mut active = ActiveCellInfo::from_mask(&[false, false, true, true]);
    active.compute_derived_data(&grid).unwrap();
    assert_eq!(active.reservoir_active_cell_count(), 2);
    assert_eq!(active.grid_active_cell_count(0), 0);
    assert_eq!(active.grid_active_cell_count(1), 2);

    let ijk = active.ijk_bounding_box().unwrap();
    assert_eq!(ijk.min, [1, 0, 0]);
    assert_eq!(ijk.max, [1, 0, 0]);
    assert!((active.geometry_bounding_box().min().x - 1.0).abs() < 1e-12);
}

#[test]
fn rejects_bad_topology() {
    let err = MainGrid::new("MAIN", [1, 1, 1], vec![Point3::origin(); 4], vec![[0, 1, 2, 3, 4, 5, 6, 7]])
        .unwrap_err();
    assert!(matches!(err, GridError::NodeIndexOob { .. }));
}
