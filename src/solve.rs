//! Sparse triangular solve: `x . U = B[k,:]`, via symbolic reachability
//! (graph.rs) followed by a numeric scatter along the discovered pattern.

use crate::field::Field;
use crate::graph::reachable;
use crate::matrix::CsrMatrix;
use crate::perm::EMPTY;
use crate::workspace::Workspace;

/// Solve `x . U = B[k,:]` symbolically and numerically.
///
/// Returns `top` such that `ws.xi[top..m)` is the pattern of `x`, in an
/// order consistent with a topological sort of the dependency graph.
/// `ws.x[ws.xi[p]]` holds the numeric value for each `p` in that range;
/// entries where cancellation produced zero are left in the pattern for the
/// caller to filter (numerical cancellation vs. structural nonzeros).
///
/// Precondition: `ws.x` is zero on every column `U` can reach from `B`'s
/// row `k`. The caller is responsible for clearing `ws.x` at `ws.xi[top..m)`
/// once it is done reading the result — this function does not clear on
/// its own way out, so the pattern/value pair survives the call.
pub fn sparse_forward_solve(
    u: &CsrMatrix,
    b: &CsrMatrix,
    k: usize,
    qinv: &[isize],
    ws: &mut Workspace,
    field: &Field,
) -> usize {
    let m = u.dim.ncols;
    let epoch = ws.fresh_epoch();
    let (b_cols, b_vals) = b.row(k);

    let top = reachable(b_cols.iter().copied(), u, qinv, ws, m, epoch);

    for (&c, &v) in b_cols.iter().zip(b_vals.iter()) {
        ws.x[c] = field.add(ws.x[c], v);
    }

    for p in top..m {
        let j = ws.xi[p];
        if qinv[j] != EMPTY {
            let pivot_row = qinv[j] as usize;
            let (cols, vals) = u.row(pivot_row);
            debug_assert_eq!(cols[0], j, "pivot must sit at the head of its row");
            let pivot_entry = vals[0];
            let d = field
                .inverse(pivot_entry)
                .map(|inv| field.mul(ws.x[j], inv))
                .unwrap_or(0);
            for (&c, &v) in cols.iter().zip(vals.iter()) {
                ws.x[c] = field.sub_mul(ws.x[c], d, v);
            }
            ws.x[j] = d;
        }
        // else: j is a U-column (no pivot yet); ws.x[j] already holds its
        // final coefficient, nothing further to eliminate.
    }

    top
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::triplet::TripletMatrix;

    fn field() -> Field {
        Field::new(257).unwrap()
    }

    #[test]
    fn solves_against_identity() {
        // U = I (3x3), B = row [5, 7, 0] -> x should equal B directly, no elimination.
        let mut tu = TripletMatrix::new(3, 3, 257, true);
        tu.push(0, 0, 1).unwrap();
        tu.push(1, 1, 1).unwrap();
        tu.push(2, 2, 1).unwrap();
        let u = tu.compress();

        let mut tb = TripletMatrix::new(1, 3, 257, true);
        tb.push(0, 0, 5).unwrap();
        tb.push(0, 1, 7).unwrap();
        let b = tb.compress();

        let qinv = vec![0isize, 1, 2];
        let mut ws = Workspace::new(3);
        let f = field();
        let top = sparse_forward_solve(&u, &b, 0, &qinv, &mut ws, &f);

        let mut result = vec![0u64; 3];
        for p in top..3 {
            result[ws.xi[p]] = ws.x[ws.xi[p]];
        }
        assert_eq!(result, vec![5, 7, 0]);
    }

    #[test]
    fn eliminates_through_a_pivot_row() {
        // U row0 (pivot col0): [col0=1, col1=2]; row1 (pivot col1): [col1=1]
        // B = [col0=3] -> x.U = B means x0*U[0,:] + x1*U[1,:] = B
        // x0*[1,2] + x1*[0,1] = [3,0] => x0=3, x1 = -2*3 = -6 mod 257
        let mut tu = TripletMatrix::new(2, 2, 257, true);
        tu.push(0, 0, 1).unwrap();
        tu.push(0, 1, 2).unwrap();
        tu.push(1, 1, 1).unwrap();
        let u = tu.compress();

        let mut tb = TripletMatrix::new(1, 2, 257, true);
        tb.push(0, 0, 3).unwrap();
        let b = tb.compress();

        let qinv = vec![0isize, 1];
        let mut ws = Workspace::new(2);
        let f = field();
        let top = sparse_forward_solve(&u, &b, 0, &qinv, &mut ws, &f);

        let mut result = vec![0u64; 2];
        for p in top..2 {
            result[ws.xi[p]] = ws.x[ws.xi[p]];
        }
        assert_eq!(result[0], 3);
        assert_eq!(result[1], f.reduce(-6));
    }
}
