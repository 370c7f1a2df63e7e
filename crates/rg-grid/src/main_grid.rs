//! Grid arena: the main grid plus registered local grid refinements.

use std::collections::HashMap;

use rg_core::GridId;

use crate::cell::Cell;
use crate::error::{GridError, GridResult};
use crate::face::FaceType;
use crate::faults::CellFaultFlags;
use crate::geometry::{BoundingBox, Point3};
use crate::grid::Grid;
use crate::named_faults::NamedFault;

/// Input for registering a local grid refinement.
#[derive(Debug, Clone)]
pub struct LocalGridSpec {
    pub name: String,
    pub file_number: Option<i32>,
    pub parent: GridId,
    pub extents: [usize; 3],
    /// Corner nodes of the LGR, absolute coordinates.
    pub nodes: Vec<Point3<f64>>,
    /// Eight indices into `nodes` per LGR cell, in local cell order.
    pub cell_corners: Vec<[usize; 8]>,
    /// Global index of the parent-grid cell enclosing each LGR cell.
    pub parent_cells: Vec<usize>,
}

impl LocalGridSpec {
    /// Uniformly refine one host cell by trilinear subdivision of its corners.
    pub fn refine_cell(
        name: impl Into<String>,
        grid: &MainGrid,
        host_cell: usize,
        refinement: [usize; 3],
    ) -> GridResult<Self> {
        let name = name.into();
        let [rx, ry, rz] = refinement;
        if rx == 0 || ry == 0 || rz == 0 {
            return Err(GridError::InvalidExtents {
                name,
                nx: rx,
                ny: ry,
                nz: rz,
            });
        }
        let host = grid.cell(host_cell).ok_or(GridError::CellOob {
            index: host_cell,
            count: grid.total_cell_count(),
        })?;
        let corners = grid.cell_corner_vertices(host_cell).ok_or(GridError::CellOob {
            index: host_cell,
            count: grid.total_cell_count(),
        })?;

        let (lx, ly) = (rx + 1, ry + 1);
        let mut nodes = Vec::with_capacity(lx * ly * (rz + 1));
        for c in 0..=rz {
            for b in 0..=ry {
                for a in 0..=rx {
                    let u = a as f64 / rx as f64;
                    let v = b as f64 / ry as f64;
                    let w = c as f64 / rz as f64;
                    nodes.push(trilinear(&corners, u, v, w));
                }
            }
        }

        let node = |a: usize, b: usize, c: usize| a + b * lx + c * lx * ly;
        let mut cell_corners = Vec::with_capacity(rx * ry * rz);
        for k in 0..rz {
            for j in 0..ry {
                for i in 0..rx {
                    cell_corners.push([
                        node(i, j, k),
                        node(i + 1, j, k),
                        node(i + 1, j + 1, k),
                        node(i, j + 1, k),
                        node(i, j, k + 1),
                        node(i + 1, j, k + 1),
                        node(i + 1, j + 1, k + 1),
                        node(i, j + 1, k + 1),
                    ]);
                }
            }
        }

        Ok(Self {
            name,
            file_number: None,
            parent: host.host_grid(),
            extents: refinement,
            nodes,
            parent_cells: vec![host_cell; cell_corners.len()],
            cell_corners,
        })
    }
}

fn trilinear(c: &[Point3<f64>; 8], u: f64, v: f64, w: f64) -> Point3<f64> {
    let lerp = |a: &Point3<f64>, b: &Point3<f64>, t: f64| a.coords * (1.0 - t) + b.coords * t;
    let bottom = lerp(&c[0], &c[1], u) * (1.0 - v) + lerp(&c[3], &c[2], u) * v;
    let top = lerp(&c[4], &c[5], u) * (1.0 - v) + lerp(&c[7], &c[6], u) * v;
    Point3::from(bottom * (1.0 - w) + top * w)
}

/// The main grid and every local grid, stored as an arena.
///
/// Grids are addressed by `GridId` (main grid = index 0). All cells of all
/// grids live in one flat array indexed by global cell index; each grid owns
/// a contiguous range of it. Parent/child relations are ids and indices,
/// never references.
#[derive(Debug, Clone)]
pub struct MainGrid {
    pub(crate) nodes: Vec<Point3<f64>>,
    pub(crate) cells: Vec<Cell>,
    pub(crate) grids: Vec<Grid>,
    file_number_to_grid: HashMap<i32, GridId>,
    bounding_box: BoundingBox,
    /// Per-cell fault faces; `None` until fault detection has run.
    pub(crate) fault_flags: Option<Vec<CellFaultFlags>>,
    pub(crate) named_faults: Vec<NamedFault>,
    /// Per cell and face, index into `named_faults`.
    pub(crate) named_fault_owner: Vec<[Option<usize>; 6]>,
}

impl MainGrid {
    /// Build the main grid from corner-point geometry.
    ///
    /// `cell_corners` holds eight node indices per cell in row-major cell order.
    pub fn new(
        name: impl Into<String>,
        extents: [usize; 3],
        nodes: Vec<Point3<f64>>,
        cell_corners: Vec<[usize; 8]>,
    ) -> GridResult<Self> {
        let name = name.into();
        validate_topology(&name, extents, &nodes, &cell_corners, 0)?;

        let cells = cell_corners
            .into_iter()
            .enumerate()
            .map(|(local, corners)| Cell::new(corners, GridId::MAIN, local))
            .collect();
        let bounding_box = BoundingBox::from_points(nodes.iter());

        let main = Grid {
            id: GridId::MAIN,
            name,
            file_number: Some(0),
            extents,
            cell_offset: 0,
            parent: None,
        };

        let mut file_number_to_grid = HashMap::new();
        file_number_to_grid.insert(0, GridId::MAIN);

        tracing::debug!(
            cells = main.cell_count(),
            nodes = nodes.len(),
            "main grid created"
        );

        Ok(Self {
            nodes,
            cells,
            grids: vec![main],
            file_number_to_grid,
            bounding_box,
            fault_flags: None,
            named_faults: Vec::new(),
            named_fault_owner: Vec::new(),
        })
    }

    /// Regular box grid with unshared corners (one node set per cell).
    pub fn box_grid(name: impl Into<String>, extents: [usize; 3], cell_size: [f64; 3]) -> GridResult<Self> {
        let [nx, ny, nz] = extents;
        let [dx, dy, dz] = cell_size;
        let mut nodes = Vec::with_capacity(nx * ny * nz * 8);
        let mut cell_corners = Vec::with_capacity(nx * ny * nz);
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let base = nodes.len();
                    for c in 0..8 {
                        let ci = [0, 1, 1, 0][c % 4];
                        let cj = [0, 0, 1, 1][c % 4];
                        let ck = c / 4;
                        nodes.push(Point3::new(
                            (i + ci) as f64 * dx,
                            (j + cj) as f64 * dy,
                            (k + ck) as f64 * dz,
                        ));
                    }
                    cell_corners.push(core::array::from_fn(|c| base + c));
                }
            }
        }
        Self::new(name, extents, nodes, cell_corners)
    }

    /// Register a local grid. Returns its id (arena index).
    pub fn add_local_grid(&mut self, spec: LocalGridSpec) -> GridResult<GridId> {
        if self.grid_by_name(&spec.name).is_some() {
            return Err(GridError::DuplicateGridName(spec.name));
        }
        let parent = self
            .grid(spec.parent)
            .ok_or(GridError::UnknownGrid(spec.parent))?
            .clone();

        validate_topology(&spec.name, spec.extents, &spec.nodes, &spec.cell_corners, self.cells.len())?;
        if spec.parent_cells.len() != spec.cell_corners.len() {
            return Err(GridError::CellCountMismatch {
                name: spec.name,
                len: spec.parent_cells.len(),
                expected: spec.cell_corners.len(),
            });
        }
        if let Some(&bad) = spec
            .parent_cells
            .iter()
            .find(|&&pc| parent.local_cell_index(pc).is_none())
        {
            return Err(GridError::InvalidParentCell {
                name: spec.name,
                parent: parent.id,
                parent_cell: bad,
            });
        }

        let id = GridId::from_index(self.grids.len() as u32);
        let cell_offset = self.cells.len();
        let node_offset = self.nodes.len();

        self.nodes.extend_from_slice(&spec.nodes);
        for node in &spec.nodes {
            self.bounding_box.add_point(node);
        }

        for (local, (corners, &parent_cell)) in spec
            .cell_corners
            .iter()
            .zip(&spec.parent_cells)
            .enumerate()
        {
            let mut cell = Cell::new(corners.map(|n| n + node_offset), id, local);
            cell.parent_cell = Some(parent_cell);
            self.cells.push(cell);
            self.cells[parent_cell].sub_grid = Some(id);
        }

        if let Some(n) = spec.file_number {
            self.file_number_to_grid.insert(n, id);
        }

        tracing::debug!(
            grid = %id,
            name = %spec.name,
            parent = %parent.id,
            cells = spec.cell_corners.len(),
            "local grid registered"
        );

        self.grids.push(Grid {
            id,
            name: spec.name,
            file_number: spec.file_number,
            extents: spec.extents,
            cell_offset,
            parent: Some(parent.id),
        });
        self.fault_flags = None;
        if !self.named_fault_owner.is_empty() {
            self.named_fault_owner.resize(self.cells.len(), [None; 6]);
        }

        Ok(id)
    }

    /// Number of cells over all grids.
    pub fn total_cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn nodes(&self) -> &[Point3<f64>] {
        &self.nodes
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, global: usize) -> Option<&Cell> {
        self.cells.get(global)
    }

    /// Grid count including the main grid.
    pub fn grid_count(&self) -> usize {
        self.grids.len()
    }

    pub fn grids(&self) -> &[Grid] {
        &self.grids
    }

    pub fn grid(&self, id: GridId) -> Option<&Grid> {
        self.grids.get(id.index())
    }

    pub fn main_grid(&self) -> &Grid {
        &self.grids[0]
    }

    pub fn grid_by_name(&self, name: &str) -> Option<&Grid> {
        self.grids.iter().find(|g| g.name == name)
    }

    pub fn grid_by_file_number(&self, number: i32) -> Option<&Grid> {
        self.file_number_to_grid
            .get(&number)
            .and_then(|&id| self.grid(id))
    }

    /// Host grid and grid-local index of a global cell index.
    pub fn grid_and_local_index_from_global(&self, global: usize) -> Option<(GridId, usize)> {
        let cell = self.cells.get(global)?;
        Some((cell.host_grid, cell.grid_local_index))
    }

    /// Global index of a grid-local cell.
    pub fn global_cell_index(&self, grid: GridId, local: usize) -> Option<usize> {
        let g = self.grid(grid)?;
        (local < g.cell_count()).then(|| g.global_cell_index(local))
    }

    pub fn cell_by_grid_and_local_index(&self, grid: GridId, local: usize) -> Option<&Cell> {
        self.global_cell_index(grid, local)
            .and_then(|global| self.cells.get(global))
    }

    /// Main-grid cell enclosing `global`, found by walking the parent chain.
    /// Main-grid cells map to themselves.
    pub fn main_grid_cell_index(&self, global: usize) -> Option<usize> {
        let mut current = global;
        loop {
            let cell = self.cells.get(current)?;
            match cell.parent_cell {
                Some(parent) => current = parent,
                None => return Some(current),
            }
        }
    }

    /// Bounds check plus the invalid flag.
    pub fn is_cell_valid(&self, grid: GridId, i: usize, j: usize, k: usize) -> bool {
        let Some(g) = self.grid(grid) else {
            return false;
        };
        g.try_cell_index_from_ijk(i, j, k)
            .and_then(|local| self.cells.get(g.global_cell_index(local)))
            .is_some_and(|cell| !cell.invalid)
    }

    /// Mark a cell as invalid (collapsed). Discards computed fault faces.
    pub fn set_cell_invalid(&mut self, global: usize, invalid: bool) -> GridResult<()> {
        let count = self.cells.len();
        let cell = self
            .cells
            .get_mut(global)
            .ok_or(GridError::CellOob { index: global, count })?;
        cell.invalid = invalid;
        self.fault_flags = None;
        Ok(())
    }

    /// Global index of the IJK neighbour across `face`, within the same grid.
    pub fn cell_ijk_neighbor(&self, global: usize, face: FaceType) -> Option<usize> {
        let (grid_id, local) = self.grid_and_local_index_from_global(global)?;
        let grid = self.grid(grid_id)?;
        let (i, j, k) = grid.ijk_from_cell_index(local);
        grid.cell_ijk_neighbor(i, j, k, face)
            .map(|n| grid.global_cell_index(n))
    }

    pub fn cell_corner_vertices(&self, global: usize) -> Option<[Point3<f64>; 8]> {
        let cell = self.cells.get(global)?;
        Some(cell.corner_indices.map(|n| self.nodes[n]))
    }

    pub fn face_corner_vertices(&self, global: usize, face: FaceType) -> Option<[Point3<f64>; 4]> {
        let cell = self.cells.get(global)?;
        Some(cell.face_indices(face).map(|n| self.nodes[n]))
    }

    pub fn cell_center(&self, global: usize) -> Option<Point3<f64>> {
        let corners = self.cell_corner_vertices(global)?;
        let sum = corners.iter().fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
        Some(Point3::from(sum / 8.0))
    }

    /// Mean of the four face corners.
    pub fn face_center(&self, global: usize, face: FaceType) -> Option<Point3<f64>> {
        let corners = self.face_corner_vertices(global, face)?;
        let sum = corners.iter().fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
        Some(Point3::from(sum / 4.0))
    }

    /// Bounding box of every node of every grid.
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }
}

fn validate_topology(
    name: &str,
    extents: [usize; 3],
    nodes: &[Point3<f64>],
    cell_corners: &[[usize; 8]],
    global_offset: usize,
) -> GridResult<()> {
    let [nx, ny, nz] = extents;
    if nx == 0 || ny == 0 || nz == 0 {
        return Err(GridError::InvalidExtents {
            name: name.to_string(),
            nx,
            ny,
            nz,
        });
    }
    let expected = nx * ny * nz;
    if cell_corners.len() != expected {
        return Err(GridError::CellCountMismatch {
            name: name.to_string(),
            len: cell_corners.len(),
            expected,
        });
    }
    for (local, corners) in cell_corners.iter().enumerate() {
        if let Some(&node) = corners.iter().find(|&&n| n >= nodes.len()) {
            return Err(GridError::NodeIndexOob {
                cell: global_offset + local,
                node,
                node_count: nodes.len(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_by_three() -> MainGrid {
        MainGrid::box_grid("MAIN", [3, 3, 1], [10.0, 10.0, 2.0]).unwrap()
    }

    #[test]
    fn box_grid_geometry() {
        let grid = three_by_three();
        assert_eq!(grid.total_cell_count(), 9);
        assert_eq!(grid.grid_count(), 1);
        let center = grid.cell_center(4).unwrap();
        assert_eq!(center, Point3::new(15.0, 15.0, 1.0));
        let bb = grid.bounding_box();
        assert_eq!(bb.max(), Point3::new(30.0, 30.0, 2.0));
    }

    #[test]
    fn face_centers() {
        let grid = three_by_three();
        assert_eq!(grid.face_center(4, FaceType::PosI), Some(Point3::new(20.0, 15.0, 1.0)));
        assert_eq!(grid.face_center(4, FaceType::NegK), Some(Point3::new(15.0, 15.0, 0.0)));
        assert_eq!(grid.face_center(9, FaceType::PosI), None);
    }

    #[test]
    fn rejects_bad_topology() {
        let err = MainGrid::new("M", [2, 1, 1], vec![Point3::origin(); 8], vec![[0; 8]]).unwrap_err();
        assert!(matches!(err, GridError::CellCountMismatch { .. }));

        let err = MainGrid::new("M", [1, 1, 1], vec![Point3::origin(); 7], vec![[0, 1, 2, 3, 4, 5, 6, 7]]).unwrap_err();
        assert!(matches!(err, GridError::NodeIndexOob { node: 7, .. }));

        let err = MainGrid::new("M", [0, 1, 1], vec![], vec![]).unwrap_err();
        assert!(matches!(err, GridError::InvalidExtents { .. }));
    }

    #[test]
    fn lgr_registration_and_lookup() {
        let mut grid = three_by_three();
        let spec = LocalGridSpec::refine_cell("LGR1", &grid, 4, [2, 2, 1]).unwrap();
        let lgr = grid.add_local_grid(spec).unwrap();

        assert_eq!(lgr.index(), 1);
        assert_eq!(grid.grid_count(), 2);
        assert_eq!(grid.total_cell_count(), 13);
        assert_eq!(grid.cell(4).unwrap().sub_grid(), Some(lgr));

        let g = grid.grid(lgr).unwrap();
        assert_eq!(g.cell_offset(), 9);
        assert_eq!(g.parent(), Some(GridId::MAIN));

        assert_eq!(grid.global_cell_index(lgr, 3), Some(12));
        assert_eq!(grid.global_cell_index(lgr, 4), None);
        assert_eq!(grid.grid_and_local_index_from_global(11), Some((lgr, 2)));
        assert_eq!(grid.main_grid_cell_index(11), Some(4));
        assert_eq!(grid.main_grid_cell_index(2), Some(2));
        assert_eq!(grid.main_grid_cell_index(99), None);
    }

    #[test]
    fn refined_cell_corners_span_host() {
        let mut grid = three_by_three();
        let spec = LocalGridSpec::refine_cell("LGR1", &grid, 4, [2, 2, 1]).unwrap();
        let lgr = grid.add_local_grid(spec).unwrap();
        let first = grid.global_cell_index(lgr, 0).unwrap();
        let corners = grid.cell_corner_vertices(first).unwrap();
        assert_eq!(corners[0], Point3::new(10.0, 10.0, 0.0));
        assert_eq!(corners[6], Point3::new(15.0, 15.0, 2.0));
    }

    #[test]
    fn nested_lgr_walks_to_main_grid() {
        let mut grid = three_by_three();
        let lgr1 = grid
            .add_local_grid(LocalGridSpec::refine_cell("LGR1", &grid, 8, [2, 1, 1]).unwrap())
            .unwrap();
        let host = grid.global_cell_index(lgr1, 1).unwrap();
        let lgr2 = grid
            .add_local_grid(LocalGridSpec::refine_cell("LGR2", &grid, host, [3, 1, 1]).unwrap())
            .unwrap();

        assert_eq!(grid.grid(lgr2).unwrap().parent(), Some(lgr1));
        let deepest = grid.global_cell_index(lgr2, 2).unwrap();
        assert_eq!(grid.cell(deepest).unwrap().parent_cell_index(), Some(host));
        assert_eq!(grid.main_grid_cell_index(deepest), Some(8));
    }

    #[test]
    fn lgr_rejects_foreign_parent_cell() {
        let mut grid = three_by_three();
        let mut spec = LocalGridSpec::refine_cell("LGR1", &grid, 4, [1, 1, 1]).unwrap();
        spec.parent_cells = vec![42];
        let err = grid.add_local_grid(spec).unwrap_err();
        assert!(matches!(err, GridError::InvalidParentCell { parent_cell: 42, .. }));

        let spec = LocalGridSpec::refine_cell("MAIN", &grid, 4, [1, 1, 1]).unwrap();
        assert!(matches!(grid.add_local_grid(spec), Err(GridError::DuplicateGridName(_))));
    }

    #[test]
    fn cell_validity_and_neighbors() {
        let mut grid = three_by_three();
        assert!(grid.is_cell_valid(GridId::MAIN, 1, 1, 0));
        assert!(!grid.is_cell_valid(GridId::MAIN, 3, 0, 0));
        grid.set_cell_invalid(4, true).unwrap();
        assert!(!grid.is_cell_valid(GridId::MAIN, 1, 1, 0));

        assert_eq!(grid.cell_ijk_neighbor(4, FaceType::PosI), Some(5));
        assert_eq!(grid.cell_ijk_neighbor(4, FaceType::NegJ), Some(1));
        assert_eq!(grid.cell_ijk_neighbor(4, FaceType::PosK), None);
    }

    #[test]
    fn file_number_lookup() {
        let mut grid = three_by_three();
        let mut spec = LocalGridSpec::refine_cell("LGR1", &grid, 0, [1, 1, 1]).unwrap();
        spec.file_number = Some(7);
        let id = grid.add_local_grid(spec).unwrap();
        assert_eq!(grid.grid_by_file_number(7).map(|g| g.id()), Some(id));
        assert_eq!(grid.grid_by_file_number(0).map(|g| g.id()), Some(GridId::MAIN));
        assert!(grid.grid_by_file_number(3).is_none());
    }
}
