use core::fmt;
use core::num::NonZeroU32;

/// Compact identifier of a grid inside a case's grid arena.
///
/// - index 0 is always the main grid, local grids follow in registration order
/// - `NonZero` storage keeps `Option<GridId>` the same size as `GridId`
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridId(NonZeroU32);

impl GridId {
    /// The main grid.
    pub const MAIN: GridId = GridId(NonZeroU32::MIN);

    /// Create an id from a 0-based arena index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Recover the 0-based arena index.
    pub fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }

    pub fn is_main(self) -> bool {
        self == Self::MAIN
    }
}

impl fmt::Debug for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GridId({})", self.index())
    }
}

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}
