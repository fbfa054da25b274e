//! Schur complement: eliminate a batch of already-identified pivots and
//! emit the residual matrix on the remaining rows x remaining columns.
//!
//! Reuses the sparse forward solver directly against `A` itself: once
//! `qinv` names the pivotal rows, the solver's "pivot row" lookup
//! (`U.row(qinv[j])`) is satisfied by `A`'s own rows, since pivot discovery
//! already swapped each pivotal row's distinguished entry to its head.

use crate::error::FactorError;
use crate::field::Field;
use crate::matrix::CsrMatrix;
use crate::perm::EMPTY;
use crate::solve::sparse_forward_solve;
use crate::workspace::Workspace;

/// Eliminate the first `n_pivots` rows named by `p` (a full row permutation
/// of length `n`, pivotal rows first — each such row's first entry already
/// sitting at its pivot column, the layout [`crate::pivots::find_pivots`]
/// and [`crate::lu::factor`] both produce) and return the
/// `(n - n_pivots) x (m - n_pivots)` residual on the remaining rows and
/// columns, in `p`'s own non-pivotal tail order.
///
/// `p[..n_pivots]` must name each row at most once; this is checked rather
/// than assumed, since an accidental duplicate would silently corrupt
/// `qinv`.
pub fn schur_complement(
    a: &CsrMatrix,
    p: &[usize],
    n_pivots: usize,
    field: &Field,
    ws: &mut Workspace,
) -> Result<CsrMatrix, FactorError> {
    let n = a.dim.nrows;
    let m = a.dim.ncols;

    let mut qinv = vec![EMPTY; m];
    for &row in &p[..n_pivots] {
        let pivot_col = a.row_cols(row)[0];
        if qinv[pivot_col] != EMPTY {
            return Err(FactorError::DuplicatePivotRow { row });
        }
        qinv[pivot_col] = row as isize;
    }

    let mut q = vec![EMPTY; m];
    let mut next_col = 0isize;
    for j in 0..m {
        if qinv[j] == EMPTY {
            q[j] = next_col;
            next_col += 1;
        }
    }

    let s_rows = n - n_pivots;
    let s_cols = m - n_pivots;
    let init_nzmax = a.nnz().max(s_cols).max(1);
    let mut s = CsrMatrix::alloc(s_rows, s_cols, init_nzmax, field.modulus(), true);

    let progress_every = (n / 1000).max(1);
    let mut snz = 0usize;

    for (out_row, &inew) in p[n_pivots..].iter().enumerate() {
        s.grow_for(snz + s_cols);
        s.row_pointers[out_row] = snz;

        let top = sparse_forward_solve(a, a, inew, &qinv, ws, field);
        for p in top..m {
            ws.touch(ws.xi[p]);
        }

        for p in top..m {
            let j = ws.xi[p];
            if q[j] != EMPTY && ws.x[j] != 0 {
                s.column_indices[snz] = q[j] as usize;
                s.values.as_mut().unwrap()[snz] = ws.x[j];
                snz += 1;
            }
        }
        ws.clear_touched();

        if (out_row + 1) % progress_every == 0 {
            eprintln!("[schur] row {}/{}  nnz(S)={snz}", out_row + 1, s_rows);
        }
    }

    s.row_pointers[s_rows] = snz;
    s.realloc(-1);
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lu::factor;
    use crate::matrix::triplet::TripletMatrix;
    use crate::pivots::find_pivots;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn field() -> Field {
        Field::new(257).unwrap()
    }

    #[test]
    fn schur_rank_law_holds() {
        // rank-3, 4x5 matrix with a clear dependency between row 2 and row 3.
        let mut t = TripletMatrix::new(4, 5, 257, true);
        t.push(0, 0, 1).unwrap();
        t.push(0, 1, 2).unwrap();
        t.push(1, 1, 1).unwrap();
        t.push(1, 2, 3).unwrap();
        t.push(2, 2, 1).unwrap();
        t.push(2, 3, 1).unwrap();
        t.push(3, 2, 2).unwrap();
        t.push(3, 3, 2).unwrap();
        let mut a = t.compress();
        let f = field();

        let mut ws = Workspace::new(5);
        let search = find_pivots(&mut a, &mut ws);

        let config = crate::config::SolverConfig {
            modulus: 257,
            keep_l: false,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let bundle = factor(&a, None, &config, &f, &mut ws, &mut rng);

        let s = schur_complement(&a, &search.p, search.npiv, &f, &mut ws).unwrap();

        let mut ws2 = Workspace::new(s.dim.ncols.max(1));
        let mut rng2 = StdRng::seed_from_u64(7);
        let s_bundle = factor(&s, None, &config, &f, &mut ws2, &mut rng2);

        assert_eq!(search.npiv + s_bundle.rank, bundle.rank);
    }

    #[test]
    fn rejects_a_duplicate_pivot_row() {
        let mut t = TripletMatrix::new(2, 2, 257, true);
        t.push(0, 0, 1).unwrap();
        t.push(1, 1, 1).unwrap();
        let a = t.compress();
        let f = field();
        let mut ws = Workspace::new(2);
        let err = schur_complement(&a, &[0, 0], 2, &f, &mut ws).unwrap_err();
        assert!(matches!(err, FactorError::DuplicatePivotRow { .. }));
    }
}
