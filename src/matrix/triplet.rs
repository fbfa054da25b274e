use std::collections::HashMap;

use crate::matrix::Dim;
use crate::matrix::csr::CsrMatrix;
use crate::matrix::error::TripletError;

/// An unordered intake buffer of (row, col, value) triples. The only
/// outbound operation is [`TripletMatrix::compress`] into a [`CsrMatrix`];
/// nothing else reads a `TripletMatrix` directly.
#[derive(Debug, Clone)]
pub struct TripletMatrix {
    dim: Dim,
    p: u64,
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Option<Vec<u64>>,
}

impl TripletMatrix {
    pub fn new(nrows: usize, ncols: usize, p: u64, with_values: bool) -> Self {
        Self {
            dim: Dim { nrows, ncols },
            p,
            rows: Vec::new(),
            cols: Vec::new(),
            values: with_values.then(Vec::new),
        }
    }

    pub fn nz(&self) -> usize {
        self.rows.len()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.rows.reserve(additional);
        self.cols.reserve(additional);
        if let Some(values) = &mut self.values {
            values.reserve(additional);
        }
    }

    /// Append one triple. Values are reduced mod p by the caller's
    /// contract; this does not itself re-reduce, matching the field's
    /// "values in [0, p)" invariant being the caller's responsibility at
    /// the point of insertion.
    pub fn push(&mut self, row: usize, col: usize, value: u64) -> Result<(), TripletError> {
        self.push_opt(row, col, Some(value))
    }

    /// Append a pattern-only entry (no value).
    pub fn push_pattern(&mut self, row: usize, col: usize) -> Result<(), TripletError> {
        self.push_opt(row, col, None)
    }

    fn push_opt(&mut self, row: usize, col: usize, value: Option<u64>) -> Result<(), TripletError> {
        if row >= self.dim.nrows {
            return Err(TripletError::RowOutOfBounds {
                index: row,
                max: self.dim.nrows,
            });
        }
        if col >= self.dim.ncols {
            return Err(TripletError::ColumnOutOfBounds {
                index: col,
                max: self.dim.ncols,
            });
        }
        match (&mut self.values, value) {
            (Some(values), Some(v)) => values.push(v),
            (None, None) => {}
            _ => return Err(TripletError::ValuePresenceMismatch),
        }
        self.rows.push(row);
        self.cols.push(col);
        Ok(())
    }

    /// Compress into a CSR matrix: row i holds all triplets with row == i in
    /// insertion order of first appearance, duplicates summed modulo p.
    ///
    /// Two passes: a counting-sort placement by row (stable, so within-row
    /// order matches insertion order), then a per-row merge pass that folds
    /// duplicate columns into their first occurrence.
    pub fn compress(&self) -> CsrMatrix {
        let n = self.dim.nrows;
        let nz = self.nz();
        let with_values = self.values.is_some();

        let mut row_pointers = vec![0usize; n + 1];
        for &r in &self.rows {
            row_pointers[r + 1] += 1;
        }
        for i in 0..n {
            row_pointers[i + 1] += row_pointers[i];
        }

        let mut staged_cols = vec![0usize; nz];
        let mut staged_vals = with_values.then(|| vec![0u64; nz]);
        let mut next = row_pointers.clone();
        for k in 0..nz {
            let r = self.rows[k];
            let pos = next[r];
            staged_cols[pos] = self.cols[k];
            if let (Some(dst), Some(src)) = (&mut staged_vals, &self.values) {
                dst[pos] = src[k];
            }
            next[r] += 1;
        }

        let mut out_cols = Vec::with_capacity(nz);
        let mut out_vals = with_values.then(|| Vec::with_capacity(nz));
        let mut out_rowptr = vec![0usize; n + 1];

        for i in 0..n {
            let (s, e) = (row_pointers[i], row_pointers[i + 1]);
            let mut seen: HashMap<usize, usize> = HashMap::new();
            for k in s..e {
                let c = staged_cols[k];
                if let Some(&pos) = seen.get(&c) {
                    if let (Some(dst), Some(src)) = (&mut out_vals, &staged_vals) {
                        dst[pos] = (dst[pos] + src[k]) % self.p;
                    }
                } else {
                    seen.insert(c, out_cols.len());
                    out_cols.push(c);
                    if let (Some(dst), Some(src)) = (&mut out_vals, &staged_vals) {
                        dst.push(src[k] % self.p);
                    }
                }
            }
            out_rowptr[i + 1] = out_cols.len();
        }

        CsrMatrix {
            dim: self.dim,
            p: self.p,
            row_pointers: out_rowptr,
            column_indices: out_cols,
            values: out_vals,
        }
    }
}
