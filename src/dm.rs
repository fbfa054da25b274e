//! Dulmage–Mendelsohn view: consumed, never produced, by this crate.
//!
//! The block decomposition algorithm itself is someone else's problem (an
//! external collaborator). What this module carries is the narrow shape the
//! core actually touches: a tiling of `A`'s diagonal by disjoint rectangular
//! blocks, used by the PPM dump to color cells by block membership. A
//! future diagonal-block LU would consume the same type; no such solver is
//! implemented here.

use thiserror::Error;

/// One rectangular block `A[i0..i1, j0..j1]` sitting on the diagonal tiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmBlock {
    pub i0: usize,
    pub j0: usize,
    pub i1: usize,
    pub j1: usize,
}

#[derive(Debug, Error)]
pub enum DmError {
    #[error("block {index} is empty or inverted: i0={i0} i1={i1} j0={j0} j1={j1}")]
    InvalidBlock {
        index: usize,
        i0: usize,
        i1: usize,
        j0: usize,
        j1: usize,
    },
    #[error(
        "block {index}'s southeast corner ({i1},{j1}) does not meet block {next}'s northwest corner ({next_i0},{next_j0})"
    )]
    NotAdjacent {
        index: usize,
        i1: usize,
        j1: usize,
        next: usize,
        next_i0: usize,
        next_j0: usize,
    },
    #[error("tiling ends at ({i1},{j1}) instead of the matrix corner ({n},{m})")]
    DoesNotReachCorner { i1: usize, j1: usize, n: usize, m: usize },
}

/// A validated sequence of diagonal blocks tiling an `n x m` matrix.
///
/// Blocks are listed in increasing `(i0, j0)` order and each block's
/// southeast corner coincides with the next block's northwest corner; the
/// final block's southeast corner is the matrix corner `(n, m)`.
#[derive(Debug, Clone)]
pub struct DmBlocks {
    pub blocks: Vec<DmBlock>,
}

impl DmBlocks {
    pub fn new(blocks: Vec<DmBlock>, n: usize, m: usize) -> Result<Self, DmError> {
        for (idx, b) in blocks.iter().enumerate() {
            if b.i1 <= b.i0 || b.j1 <= b.j0 {
                return Err(DmError::InvalidBlock {
                    index: idx,
                    i0: b.i0,
                    i1: b.i1,
                    j0: b.j0,
                    j1: b.j1,
                });
            }
            if let Some(next) = blocks.get(idx + 1) {
                if b.i1 != next.i0 || b.j1 != next.j0 {
                    return Err(DmError::NotAdjacent {
                        index: idx,
                        i1: b.i1,
                        j1: b.j1,
                        next: idx + 1,
                        next_i0: next.i0,
                        next_j0: next.j0,
                    });
                }
            }
        }
        if let Some(last) = blocks.last() {
            if last.i1 != n || last.j1 != m {
                return Err(DmError::DoesNotReachCorner {
                    i1: last.i1,
                    j1: last.j1,
                    n,
                    m,
                });
            }
        }
        Ok(Self { blocks })
    }

    /// Which block (if any) column `j` at row `i` lands in, and whether the
    /// cell is on that block's diagonal extent (`i - i0 == j - j0` band is
    /// not required here — "diagonal block" means inside the block's own
    /// rectangle, not literally on its numeric diagonal).
    pub fn classify(&self, i: usize, j: usize) -> CellClass {
        for block in &self.blocks {
            let in_rows = i >= block.i0 && i < block.i1;
            let in_cols = j >= block.j0 && j < block.j1;
            if in_rows && in_cols {
                return CellClass::Diagonal;
            }
            if in_rows && j >= block.j1 {
                return CellClass::OffDiagonal;
            }
        }
        CellClass::Other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellClass {
    /// Inside the diagonal block owning this row.
    Diagonal,
    /// Same row-band as a diagonal block, but a column to its right.
    OffDiagonal,
    /// Not covered by any supplied block.
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_tiling_that_reaches_the_corner() {
        let blocks = vec![
            DmBlock { i0: 0, j0: 0, i1: 2, j1: 2 },
            DmBlock { i0: 2, j0: 2, i1: 5, j1: 5 },
        ];
        let dm = DmBlocks::new(blocks, 5, 5).unwrap();
        assert_eq!(dm.classify(0, 1), CellClass::Diagonal);
        assert_eq!(dm.classify(0, 4), CellClass::OffDiagonal);
        assert_eq!(dm.classify(3, 3), CellClass::Diagonal);
    }

    #[test]
    fn rejects_a_gap_between_blocks() {
        let blocks = vec![
            DmBlock { i0: 0, j0: 0, i1: 2, j1: 2 },
            DmBlock { i0: 3, j0: 3, i1: 5, j1: 5 },
        ];
        assert!(matches!(
            DmBlocks::new(blocks, 5, 5),
            Err(DmError::NotAdjacent { .. })
        ));
    }

    #[test]
    fn rejects_a_tiling_that_stops_short_of_the_corner() {
        let blocks = vec![DmBlock { i0: 0, j0: 0, i1: 2, j1: 2 }];
        assert!(matches!(
            DmBlocks::new(blocks, 5, 5),
            Err(DmError::DoesNotReachCorner { .. })
        ));
    }

    #[test]
    fn empty_tiling_is_valid_and_classifies_everything_other() {
        let dm = DmBlocks::new(vec![], 0, 0).unwrap();
        assert_eq!(dm.classify(0, 0), CellClass::Other);
    }
}
