//! Graph primitives: the matrix viewed as a directed graph where column `j`
//! has an out-edge to every column in the same row as the pivot of column
//! `j` (if any), and depth-first reachability over that relation in reverse
//! topological order.

use crate::matrix::CsrMatrix;
use crate::perm::EMPTY;
use crate::workspace::Workspace;

/// Depth-first search from column `j0`, writing newly reached columns into
/// `ws.xi[..top)` from the right (so the final reachable set, across all
/// seed columns of a call site, ends up in `ws.xi[top..m)`).
///
/// `qinv[j] >= 0` means column `j` is pivotal on row `qinv[j]`, and its
/// out-edges are every other column present on that row; `qinv[j] == EMPTY`
/// means `j` is a sink (no out-edges) and is emitted immediately.
///
/// Iterative, using `ws.dfs_stack`/`ws.dfs_pos` as an explicit recursion
/// stack so a row with thousands of entries does not blow a native call
/// stack. Mirrors the head/position-stack discipline used by every
/// sparse-LU DFS in this family of algorithms: stop recursing into a row as
/// soon as an unvisited column is found, push it, and resume the scan of
/// the parent row exactly where it left off.
pub fn dfs(j0: usize, a: &CsrMatrix, qinv: &[isize], ws: &mut Workspace, mut top: usize, epoch: i64) -> usize {
    ws.dfs_stack[0] = j0;
    let mut head: isize = 0;

    while head >= 0 {
        let j = ws.dfs_stack[head as usize];

        if !ws.is_marked(j, epoch) {
            ws.mark(j, epoch);
            ws.dfs_pos[head as usize] = if qinv[j] >= 0 {
                a.row_weight(qinv[j] as usize) as isize - 1
            } else {
                -1
            };
        }

        let mut pushed = false;
        if qinv[j] >= 0 {
            let row = qinv[j] as usize;
            let cols = a.row_cols(row);
            let mut pos = ws.dfs_pos[head as usize];
            while pos >= 0 {
                let i = cols[pos as usize];
                if !ws.is_marked(i, epoch) {
                    ws.dfs_pos[head as usize] = pos;
                    head += 1;
                    ws.dfs_stack[head as usize] = i;
                    pushed = true;
                    break;
                }
                pos -= 1;
            }
            if !pushed {
                ws.dfs_pos[head as usize] = pos;
            }
        }

        if !pushed {
            head -= 1;
            top -= 1;
            ws.xi[top] = j;
        }
    }

    top
}

/// Reachability from every column named in `seeds` (typically the nonzero
/// columns of a right-hand-side row), skipping seeds already visited under
/// `epoch`. Returns the new `top`.
pub fn reachable(seeds: impl Iterator<Item = usize>, a: &CsrMatrix, qinv: &[isize], ws: &mut Workspace, mut top: usize, epoch: i64) -> usize {
    for j in seeds {
        if !ws.is_marked(j, epoch) {
            top = dfs(j, a, qinv, ws, top, epoch);
        }
    }
    top
}

/// Topological order of the pivotal columns: seeds a fresh DFS sweep from
/// every pivotal column (`qinv[j] != EMPTY`) not yet visited, using `a`
/// itself as the edge relation. Used by pivot-discovery's final
/// row-permutation assembly to order the pivotal rows acyclically.
pub fn topological_order_of_pivots(a: &CsrMatrix, qinv: &[isize], ws: &mut Workspace) -> Vec<usize> {
    let m = qinv.len();
    let epoch = ws.fresh_epoch();
    let mut top = m;
    for j in 0..m {
        if qinv[j] != EMPTY && !ws.is_marked(j, epoch) {
            top = dfs(j, a, qinv, ws, top, epoch);
        }
    }
    ws.xi[top..m].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::triplet::TripletMatrix;

    fn small_matrix() -> CsrMatrix {
        // row0: cols 0,1   row1: cols 1,2   row2: cols 2
        let mut t = TripletMatrix::new(3, 3, 257, true);
        t.push(0, 0, 1).unwrap();
        t.push(0, 1, 1).unwrap();
        t.push(1, 1, 1).unwrap();
        t.push(1, 2, 1).unwrap();
        t.push(2, 2, 1).unwrap();
        t.compress()
    }

    #[test]
    fn dfs_orders_dependencies_before_dependents() {
        let a = small_matrix();
        // qinv: column 0 pivotal on row 0, column 1 pivotal on row 1, column 2 pivotal on row 2.
        let qinv = vec![0isize, 1, 2];
        let mut ws = Workspace::new(3);
        let epoch = ws.fresh_epoch();
        let top = dfs(0, &a, &qinv, &mut ws, 3, epoch);
        let order = ws.xi[top..3].to_vec();
        // column 0 depends on column 1 (same row) which depends on column 2.
        // reverse-topological emission means deepest dependency (2) comes first.
        assert_eq!(order, vec![2, 1, 0]);
    }

    #[test]
    fn dfs_stops_at_non_pivotal_sink() {
        let a = small_matrix();
        let qinv = vec![0isize, crate::perm::EMPTY, 2];
        let mut ws = Workspace::new(3);
        let epoch = ws.fresh_epoch();
        let top = dfs(0, &a, &qinv, &mut ws, 3, epoch);
        let order = ws.xi[top..3].to_vec();
        // column 1 has no pivot row, so it's a sink: reached but no further edges.
        assert_eq!(order, vec![1, 0]);
    }
}
