use crate::matrix::Dim;
use crate::matrix::error::CsrError;

/// Compressed Sparse Row matrix over GF(p).
///
/// Column indices within a row are **not required** to be sorted: pivot
/// discovery and factorization deliberately move a distinguished entry to
/// `row_pointers[i]` by swapping both `column_indices` and `values` in
/// place, rather than re-sorting the row.
///
/// `column_indices`/`values` are sized to `nzmax` (capacity), not to the
/// logical entry count; the logical count is `row_pointers[n]`. Algorithms
/// that write new rows must grow the arrays before writing past `nzmax` and
/// re-borrow any slices taken before the grow.
#[derive(Debug, Clone)]
pub struct CsrMatrix {
    pub dim: Dim,
    pub p: u64,
    /// Row pointers, len = nrows + 1.
    pub row_pointers: Vec<usize>,
    /// Column indices, len = nzmax; only `[0, row_pointers[nrows])` is live.
    pub column_indices: Vec<usize>,
    /// Nonzero values, len = nzmax when present; `None` means a pattern-only matrix.
    pub values: Option<Vec<u64>>,
}

impl CsrMatrix {
    /// Allocate an all-empty CSR with capacity for `nzmax` entries.
    pub fn alloc(n: usize, m: usize, nzmax: usize, p: u64, with_values: bool) -> Self {
        Self {
            dim: Dim { nrows: n, ncols: m },
            p,
            row_pointers: vec![0; n + 1],
            column_indices: vec![0; nzmax],
            values: with_values.then(|| vec![0; nzmax]),
        }
    }

    pub fn nzmax(&self) -> usize {
        self.column_indices.len()
    }

    pub fn nnz(&self) -> usize {
        *self.row_pointers.last().unwrap_or(&0)
    }

    pub fn row_weight(&self, i: usize) -> usize {
        self.row_pointers[i + 1] - self.row_pointers[i]
    }

    pub fn has_values(&self) -> bool {
        self.values.is_some()
    }

    /// Grow `column_indices`/`values` so at least `needed` entries fit,
    /// using the geometric rule `2*nzmax + needed`. No-op if capacity already
    /// suffices. Returns the new capacity so callers can reason about
    /// whether a grow happened (and thus whether previously taken slices are
    /// stale).
    pub fn grow_for(&mut self, needed: usize) -> usize {
        let nzmax = self.nzmax();
        if needed <= nzmax {
            return nzmax;
        }
        let new_nzmax = 2 * nzmax + needed;
        self.realloc(new_nzmax as isize);
        new_nzmax
    }

    /// `new_nzmax < 0` shrinks storage to the current logical nnz (the `-1`
    /// convention used throughout this system). Otherwise resizes both
    /// arrays to exactly `new_nzmax`, preserving the existing prefix.
    pub fn realloc(&mut self, new_nzmax: isize) {
        let target = if new_nzmax < 0 {
            self.nnz()
        } else {
            new_nzmax as usize
        };
        self.column_indices.resize(target, 0);
        if let Some(values) = &mut self.values {
            values.resize(target, 0);
        }
    }

    /// Change the declared dimensions. `row_pointers` is reallocated to
    /// `n'+1`; the existing prefix (rows that still exist) is preserved, new
    /// rows start with the same row pointer as the old last row (empty).
    pub fn resize(&mut self, new_n: usize, new_m: usize) {
        let fill = *self.row_pointers.last().unwrap_or(&0);
        self.row_pointers.resize(new_n + 1, fill);
        self.dim = Dim {
            nrows: new_n,
            ncols: new_m,
        };
    }

    /// Swap two absolute positions in the entry arrays (both column indices
    /// and, if present, values). Used to move a pivot to the head of a row.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.column_indices.swap(a, b);
        if let Some(values) = &mut self.values {
            values.swap(a, b);
        }
    }

    pub fn row(&self, i: usize) -> (&[usize], &[u64]) {
        let (s, e) = (self.row_pointers[i], self.row_pointers[i + 1]);
        (
            &self.column_indices[s..e],
            self.values
                .as_deref()
                .map(|v| &v[s..e])
                .unwrap_or(&[]),
        )
    }

    pub fn row_cols(&self, i: usize) -> &[usize] {
        let (s, e) = (self.row_pointers[i], self.row_pointers[i + 1]);
        &self.column_indices[s..e]
    }

    pub fn row_start(&self, i: usize) -> usize {
        self.row_pointers[i]
    }

    pub fn col_index(&self, k: usize) -> usize {
        self.column_indices[k]
    }

    pub fn check_invariants(&self) -> Result<(), CsrError> {
        if self.row_pointers.len() != self.dim.nrows + 1 {
            return Err(CsrError::InvalidRowPointersLength {
                expected: self.dim.nrows + 1,
                actual: self.row_pointers.len(),
            });
        }
        if self.row_pointers[0] != 0 {
            return Err(CsrError::InvalidRowPointers {
                index: 0,
                expected: 0,
                actual: self.row_pointers[0],
            });
        }
        let nnz = self.nnz();
        if nnz > self.nzmax() {
            return Err(CsrError::ExceedsCapacity {
                index: self.dim.nrows,
                value: nnz,
                nzmax: self.nzmax(),
            });
        }
        if let Some(values) = &self.values {
            if values.len() != self.column_indices.len() {
                return Err(CsrError::ColumnIndicesValuesLengthMismatch {
                    column_indices: self.column_indices.len(),
                    values: values.len(),
                });
            }
        }
        for i in 0..self.dim.nrows {
            let (start, end) = (self.row_pointers[i], self.row_pointers[i + 1]);
            if start > end {
                return Err(CsrError::InvalidRowPointers {
                    index: i,
                    expected: start,
                    actual: end,
                });
            }
            for &c in &self.column_indices[start..end] {
                if c >= self.dim.ncols {
                    return Err(CsrError::OutOfBoundsIndex {
                        index: c,
                        max: self.dim.ncols,
                    });
                }
            }
        }
        Ok(())
    }
}
