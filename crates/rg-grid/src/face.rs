//! Hexahedral cell face conventions.
//!
//! Corner numbering of a cell (k pointing up in index space):
//!
//! ```text
//!     7---------6
//!    /|        /|     |k
//!   / |       / |     | /j
//!  4---------5  |     |/
//!  |  3------|--2     *---i
//!  | /       | /
//!  |/        |/
//!  0---------1
//! ```

use core::fmt;

/// One of the six faces of a hexahedral cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FaceType {
    PosI,
    NegI,
    PosJ,
    NegJ,
    PosK,
    NegK,
}

/// Corner `n` of a face touches corner `OPPOSITE_FACE_CORNER[n]` of the
/// opposite face on the IJK neighbour, given the winding of `vertex_indices`.
pub const OPPOSITE_FACE_CORNER: [usize; 4] = [0, 3, 2, 1];

impl FaceType {
    pub const ALL: [FaceType; 6] = [
        FaceType::PosI,
        FaceType::NegI,
        FaceType::PosJ,
        FaceType::NegJ,
        FaceType::PosK,
        FaceType::NegK,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> FaceType {
        match self {
            FaceType::PosI => FaceType::NegI,
            FaceType::NegI => FaceType::PosI,
            FaceType::PosJ => FaceType::NegJ,
            FaceType::NegJ => FaceType::PosJ,
            FaceType::PosK => FaceType::NegK,
            FaceType::NegK => FaceType::PosK,
        }
    }

    /// IJK step to the neighbour across this face.
    pub fn ijk_offset(self) -> [isize; 3] {
        match self {
            FaceType::PosI => [1, 0, 0],
            FaceType::NegI => [-1, 0, 0],
            FaceType::PosJ => [0, 1, 0],
            FaceType::NegJ => [0, -1, 0],
            FaceType::PosK => [0, 0, 1],
            FaceType::NegK => [0, 0, -1],
        }
    }

    pub fn is_k_face(self) -> bool {
        matches!(self, FaceType::PosK | FaceType::NegK)
    }

    /// Cell corner numbers of this face, wound so that the face normal
    /// points out of the cell.
    pub fn vertex_indices(self) -> [usize; 4] {
        match self {
            FaceType::NegK => [0, 3, 2, 1],
            FaceType::PosK => [4, 5, 6, 7],
            FaceType::NegJ => [0, 1, 5, 4],
            FaceType::PosI => [1, 2, 6, 5],
            FaceType::PosJ => [3, 7, 6, 2],
            FaceType::NegI => [0, 4, 7, 3],
        }
    }
}

impl fmt::Display for FaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FaceType::PosI => "I+",
            FaceType::NegI => "I-",
            FaceType::PosJ => "J+",
            FaceType::NegJ => "J-",
            FaceType::PosK => "K+",
            FaceType::NegK => "K-",
        };
        f.write_str(s)
    }
}

/// Compact set of faces, one bit per `FaceType`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FaceSet(u8);

impl FaceSet {
    pub const EMPTY: FaceSet = FaceSet(0);

    pub fn insert(&mut self, face: FaceType) {
        self.0 |= 1 << face.index();
    }

    pub fn remove(&mut self, face: FaceType) {
        self.0 &= !(1 << face.index());
    }

    pub fn contains(self, face: FaceType) -> bool {
        self.0 & (1 << face.index()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = FaceType> {
        FaceType::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner_ijk(c: usize) -> [isize; 3] {
        let i = [0, 1, 1, 0][c % 4];
        let j = [0, 0, 1, 1][c % 4];
        let k = (c / 4) as isize;
        [i, j, k]
    }

    #[test]
    fn opposite_is_involution() {
        for f in FaceType::ALL {
            assert_eq!(f.opposite().opposite(), f);
            assert_ne!(f.opposite(), f);
        }
    }

    #[test]
    fn face_corners_lie_on_face() {
        for f in FaceType::ALL {
            let off = f.ijk_offset();
            let axis = off.iter().position(|&o| o != 0).unwrap();
            let side = if off[axis] > 0 { 1 } else { 0 };
            for c in f.vertex_indices() {
                assert_eq!(corner_ijk(c)[axis], side, "face {f} corner {c}");
            }
        }
    }

    #[test]
    fn shared_corners_match_through_permutation() {
        // Corner n of a face and corner OPPOSITE_FACE_CORNER[n] of the
        // neighbour's opposite face must be the same lattice point.
        for f in FaceType::ALL {
            let off = f.ijk_offset();
            let own = f.vertex_indices();
            let nb = f.opposite().vertex_indices();
            for n in 0..4 {
                let a = corner_ijk(own[n]);
                let b = corner_ijk(nb[OPPOSITE_FACE_CORNER[n]]);
                let b_shifted = [b[0] + off[0], b[1] + off[1], b[2] + off[2]];
                assert_eq!(a, b_shifted, "face {f} corner {n}");
            }
        }
    }

    #[test]
    fn face_set_ops() {
        let mut s = FaceSet::EMPTY;
        assert!(s.is_empty());
        s.insert(FaceType::PosI);
        s.insert(FaceType::NegK);
        s.insert(FaceType::PosI);
        assert_eq!(s.len(), 2);
        assert!(s.contains(FaceType::NegK));
        assert!(!s.contains(FaceType::PosJ));
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![FaceType::PosI, FaceType::NegK]);
        s.remove(FaceType::PosI);
        assert_eq!(s.len(), 1);
    }
}
