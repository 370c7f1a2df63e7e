//! Node identity in a transmissibility network.

use std::fmt;

/// Index space a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellSpace {
    GridCell,
    FractureCell,
    WellSegment,
}

/// Network node.
///
/// Ordering: internal before external, then by space, then by index. The
/// condenser relies on it to place internal equations first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    pub is_external: bool,
    pub space: CellSpace,
    pub index: usize,
}

impl CellAddress {
    pub const fn internal(space: CellSpace, index: usize) -> Self {
        Self {
            is_external: false,
            space,
            index,
        }
    }

    pub const fn external(space: CellSpace, index: usize) -> Self {
        Self {
            is_external: true,
            space,
            index,
        }
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = if self.is_external { "ext" } else { "int" };
        write!(f, "{side}:{:?}[{}]", self.space, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_sorts_first() {
        let mut v = vec![
            CellAddress::external(CellSpace::GridCell, 0),
            CellAddress::internal(CellSpace::WellSegment, 0),
            CellAddress::internal(CellSpace::GridCell, 9),
            CellAddress::internal(CellSpace::GridCell, 2),
            CellAddress::external(CellSpace::FractureCell, 1),
        ];
        v.sort();
        assert_eq!(
            v,
            vec![
                CellAddress::internal(CellSpace::GridCell, 2),
                CellAddress::internal(CellSpace::GridCell, 9),
                CellAddress::internal(CellSpace::WellSegment, 0),
                CellAddress::external(CellSpace::GridCell, 0),
                CellAddress::external(CellSpace::FractureCell, 1),
            ]
        );
    }

    #[test]
    fn display() {
        let a = CellAddress::external(CellSpace::WellSegment, 4);
        assert_eq!(a.to_string(), "ext:WellSegment[4]");
    }
}
