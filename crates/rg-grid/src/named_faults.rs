//! Named faults given as main-grid IJK ranges.
//!
//! Named faults take precedence over geometrically detected ones: a face
//! covered by a named fault reports that fault even when detection also
//! flagged it.

use crate::error::{GridError, GridResult};
use crate::face::FaceType;
use crate::faults::FaultFace;
use crate::main_grid::MainGrid;

/// Name reported for detected faces not covered by a named fault.
pub const UNDEFINED_GRID_FAULT_NAME: &str = "Undefined Grid Faults";
/// Same, where one of the two cells is inactive.
pub const UNDEFINED_GRID_FAULT_WITH_INACTIVE_NAME: &str = "Undefined Grid Faults With Inactive";

/// Inclusive IJK box of main-grid cells, faulted on `face`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultCellRange {
    pub min: [usize; 3],
    pub max: [usize; 3],
    pub face: FaceType,
}

impl FaultCellRange {
    pub fn new(min: [usize; 3], max: [usize; 3], face: FaceType) -> Self {
        Self { min, max, face }
    }

    fn cells(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        (self.min[2]..=self.max[2]).flat_map(move |k| {
            (self.min[1]..=self.max[1])
                .flat_map(move |j| (self.min[0]..=self.max[0]).map(move |i| [i, j, k]))
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedFault {
    name: String,
    ranges: Vec<FaultCellRange>,
    faces: Vec<FaultFace>,
}

impl NamedFault {
    pub fn new(name: impl Into<String>, ranges: Vec<FaultCellRange>) -> Self {
        Self {
            name: name.into(),
            ranges,
            faces: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ranges(&self) -> &[FaultCellRange] {
        &self.ranges
    }

    /// Faces resolved from the ranges by [`MainGrid::set_faults`]. Range
    /// cells on the grid boundary have no neighbour and contribute nothing.
    pub fn fault_faces(&self) -> &[FaultFace] {
        &self.faces
    }
}

/// Fault owning one cell face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FaultRef<'a> {
    Named(&'a NamedFault),
    /// Detected geometrically, not covered by any named fault.
    Undefined { with_inactive: bool },
}

impl FaultRef<'_> {
    pub fn name(&self) -> &str {
        match self {
            FaultRef::Named(fault) => fault.name(),
            FaultRef::Undefined { with_inactive: false } => UNDEFINED_GRID_FAULT_NAME,
            FaultRef::Undefined { with_inactive: true } => UNDEFINED_GRID_FAULT_WITH_INACTIVE_NAME,
        }
    }
}

impl MainGrid {
    /// Replace the named faults. Every range must lie inside the main grid.
    ///
    /// Both sides of each face are assigned; when two faults cover the same
    /// face the first one keeps it.
    pub fn set_faults(&mut self, mut faults: Vec<NamedFault>) -> GridResult<()> {
        let main = self.main_grid().clone();
        let extents = main.extents();
        let mut owner = vec![[None; 6]; self.total_cell_count()];

        for (index, fault) in faults.iter_mut().enumerate() {
            let mut faces = Vec::new();
            for range in &fault.ranges {
                let inside = (0..3).all(|d| range.min[d] <= range.max[d] && range.max[d] < extents[d]);
                if !inside {
                    return Err(GridError::InvalidFaultRange {
                        name: fault.name.clone(),
                        min: range.min,
                        max: range.max,
                    });
                }
                for [i, j, k] in range.cells() {
                    let Some(nb_local) = main.cell_ijk_neighbor(i, j, k, range.face) else {
                        continue;
                    };
                    let cell = main.global_cell_index(main.cell_index_from_ijk(i, j, k));
                    let neighbor = main.global_cell_index(nb_local);
                    faces.push(FaultFace {
                        cell,
                        face: range.face,
                        neighbor,
                        with_inactive: false,
                    });
                    for (c, f) in [(cell, range.face), (neighbor, range.face.opposite())] {
                        owner[c][f.index()].get_or_insert(index);
                    }
                }
            }
            fault.faces = faces;
        }

        tracing::debug!(faults = faults.len(), "named faults assigned");
        self.named_faults = faults;
        self.named_fault_owner = owner;
        Ok(())
    }

    pub fn faults(&self) -> &[NamedFault] {
        &self.named_faults
    }

    /// Named faults, plus the two undefined fault names once detection has run.
    pub fn has_fault_with_name(&self, name: &str) -> bool {
        self.named_faults.iter().any(|f| f.name == name)
            || (self.has_fault_data()
                && (name == UNDEFINED_GRID_FAULT_NAME || name == UNDEFINED_GRID_FAULT_WITH_INACTIVE_NAME))
    }

    /// Fault on one face of a cell: the named fault if any, otherwise the
    /// detected undefined fault.
    pub fn find_fault_from_cell_index_and_face(&self, global: usize, face: FaceType) -> Option<FaultRef<'_>> {
        let named = self
            .named_fault_owner
            .get(global)
            .and_then(|faces| faces[face.index()]);
        if let Some(index) = named {
            return self.named_faults.get(index).map(FaultRef::Named);
        }
        let flags = self.fault_flags.as_ref()?.get(global)?;
        flags.faults.contains(face).then(|| FaultRef::Undefined {
            with_inactive: flags.with_inactive.contains(face),
        })
    }
}
