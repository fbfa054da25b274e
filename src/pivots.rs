//! Three-pass pivot discovery: Faugère–Lachartre leftmost pivot, free
//! columns, and cycle-free cheap pivots via an alternating-path BFS. All
//! three passes share one `qinv` (column -> pivot row, `EMPTY` if none) and
//! converge on a row permutation `p` assembled at the end by a topological
//! sort of the pivotal columns.

use crate::graph::topological_order_of_pivots;
use crate::matrix::CsrMatrix;
use crate::perm::{EMPTY, Perm};
use crate::workspace::Workspace;

/// Find the leftmost entry of row `i` and swap it to the head of the row,
/// returning its column.
fn move_leftmost_to_head(a: &mut CsrMatrix, i: usize) -> Option<usize> {
    let (start, end) = (a.row_start(i), a.row_start(i) + a.row_weight(i));
    if start == end {
        return None;
    }
    let mut best_pos = start;
    let mut best_col = a.col_index(start);
    for p in start + 1..end {
        let c = a.col_index(p);
        if c < best_col {
            best_col = c;
            best_pos = p;
        }
    }
    a.swap(start, best_pos);
    Some(best_col)
}

/// Pass 1 — Faugère–Lachartre leftmost pivot.
fn find_fl_pivots(a: &mut CsrMatrix, qinv: &mut [isize]) {
    for i in 0..a.dim.nrows {
        let Some(j) = move_leftmost_to_head(a, i) else {
            continue;
        };
        let w_i = a.row_weight(i);
        if qinv[j] == EMPTY || w_i < a.row_weight(qinv[j] as usize) {
            qinv[j] = i as isize;
        }
    }
}

/// Pass 2 — free columns. Every column touched by an already-pivotal row is
/// "closed"; a non-pivotal row with an entry in an open column claims that
/// column as its pivot and closes its own remaining columns in turn.
fn find_free_column_pivots(a: &mut CsrMatrix, qinv: &mut [isize]) {
    let m = a.dim.ncols;
    let mut closed = vec![false; m];

    for i in 0..a.dim.nrows {
        let (start, end) = (a.row_start(i), a.row_start(i) + a.row_weight(i));
        if start == end {
            continue;
        }
        if qinv[a.col_index(start)] == i as isize {
            for p in start..end {
                closed[a.col_index(p)] = true;
            }
        }
    }

    for i in 0..a.dim.nrows {
        let (start, end) = (a.row_start(i), a.row_start(i) + a.row_weight(i));
        if start == end {
            continue;
        }
        if qinv[a.col_index(start)] == i as isize {
            continue; // already pivotal
        }
        for p in start..end {
            let j = a.col_index(p);
            if closed[j] {
                continue;
            }
            if qinv[j] == EMPTY {
                qinv[j] = i as isize;
                a.swap(start, p);
                for q in start..end {
                    closed[a.col_index(q)] = true;
                }
                break;
            }
        }
    }
}

/// Pass 3 — cycle-free cheap pivots via alternating-path BFS. For each
/// still non-pivotal row, entries reachable from its pivotal entries
/// through the chain of already-assigned pivots are marked unusable; any
/// entry left unreached is a safe pivot (claiming it cannot create a cycle
/// among pivotal columns).
fn find_cycle_free_pivots(a: &mut CsrMatrix, qinv: &mut [isize], ws: &mut Workspace) {
    for i in 0..a.dim.nrows {
        let (start, end) = (a.row_start(i), a.row_start(i) + a.row_weight(i));
        if start == end {
            continue;
        }
        if qinv[a.col_index(start)] == i as isize {
            continue; // already pivotal
        }

        ws.queue.clear();
        let mut surviving: i64 = 0;
        for p in start..end {
            let c = a.col_index(p);
            if qinv[c] == EMPTY {
                ws.w[c] = 1;
                surviving += 1;
            } else {
                ws.w[c] = -1;
                ws.queue.push(c);
            }
        }

        let mut head = 0usize;
        while head < ws.queue.len() && surviving > 0 {
            let j = ws.queue[head];
            head += 1;
            if qinv[j] == EMPTY {
                continue;
            }
            let prow = qinv[j] as usize;
            let (s2, e2) = (a.row_start(prow), a.row_start(prow) + a.row_weight(prow));
            for p in s2..e2 {
                let c = a.col_index(p);
                if ws.w[c] < 0 {
                    continue;
                }
                surviving -= ws.w[c] as i64;
                ws.w[c] = -1;
                ws.queue.push(c);
            }
        }

        if surviving > 0 {
            for p in start..end {
                let c = a.col_index(p);
                if ws.w[c] == 1 {
                    qinv[c] = i as isize;
                    a.swap(start, p);
                    break;
                }
            }
        }

        for p in start..end {
            ws.w[a.col_index(p)] = 0;
        }
        for &c in &ws.queue {
            ws.w[c] = 0;
        }
    }
}

/// Final row-permutation assembly: pivotal rows first (in a topological
/// order of their pivot columns), then non-pivotal non-empty rows, then
/// empty rows last.
fn assemble_row_permutation(a: &CsrMatrix, qinv: &[isize], ws: &mut Workspace) -> Perm {
    let n = a.dim.nrows;
    let visited_order = topological_order_of_pivots(a, qinv, ws);

    let mut p = Vec::with_capacity(n);
    for col in visited_order {
        let row = qinv[col];
        if row != EMPTY {
            p.push(row as isize);
        }
    }

    for i in 0..n {
        let (start, end) = (a.row_start(i), a.row_start(i) + a.row_weight(i));
        if start == end {
            continue;
        }
        if qinv[a.col_index(start)] != i as isize {
            p.push(i as isize);
        }
    }

    for i in 0..n {
        if a.row_weight(i) == 0 {
            p.push(i as isize);
        }
    }

    debug_assert_eq!(p.len(), n);
    p
}

/// Result of the full three-pass pivot search: the partial column->row map,
/// the assembled row permutation, and the pivot count.
pub struct PivotSearch {
    pub qinv: Vec<isize>,
    pub p: Perm,
    pub npiv: usize,
}

/// Run all three passes and assemble the row permutation. `a`'s rows are
/// mutated in place (pivot entries move to row heads).
pub fn find_pivots(a: &mut CsrMatrix, ws: &mut Workspace) -> PivotSearch {
    let m = a.dim.ncols;
    let mut qinv = vec![EMPTY; m];

    find_fl_pivots(a, &mut qinv);
    find_free_column_pivots(a, &mut qinv);
    find_cycle_free_pivots(a, &mut qinv, ws);

    let npiv = qinv.iter().filter(|&&x| x != EMPTY).count();
    let p = assemble_row_permutation(a, &qinv, ws);

    PivotSearch { qinv, p, npiv }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::triplet::TripletMatrix;

    #[test]
    fn identity_is_all_pivotal_via_fl() {
        let mut t = TripletMatrix::new(3, 3, 257, true);
        t.push(0, 0, 1).unwrap();
        t.push(1, 1, 1).unwrap();
        t.push(2, 2, 1).unwrap();
        let mut a = t.compress();
        let mut ws = Workspace::new(3);
        let result = find_pivots(&mut a, &mut ws);
        assert_eq!(result.npiv, 3);
        assert_eq!(result.qinv, vec![0, 1, 2]);
        assert_eq!(result.p, vec![0, 1, 2]);
    }

    #[test]
    fn fl_pass_moves_leftmost_column_to_head() {
        // single row with entries in columns (5,2,7) insertion order, value 1 each.
        let mut t = TripletMatrix::new(1, 8, 257, true);
        t.push(0, 5, 1).unwrap();
        t.push(0, 2, 1).unwrap();
        t.push(0, 7, 1).unwrap();
        let mut a = t.compress();
        assert_eq!(a.row_cols(0), &[5, 2, 7]);
        let mut ws = Workspace::new(8);
        let result = find_pivots(&mut a, &mut ws);
        assert_eq!(a.row_cols(0)[0], 2);
        assert_eq!(result.qinv[2], 0);
    }

    #[test]
    fn rank_deficient_leaves_one_row_non_pivotal() {
        // rows: {(0,0,1),(0,1,1)}, {(1,0,2),(1,1,2)}, {(2,2,1)} (0-based)
        let mut t = TripletMatrix::new(3, 4, 257, true);
        t.push(0, 0, 1).unwrap();
        t.push(0, 1, 1).unwrap();
        t.push(1, 0, 2).unwrap();
        t.push(1, 1, 2).unwrap();
        t.push(2, 2, 1).unwrap();
        let mut a = t.compress();
        let mut ws = Workspace::new(4);
        let result = find_pivots(&mut a, &mut ws);
        assert_eq!(result.npiv, 2);
        assert_eq!(result.qinv.iter().filter(|&&x| x != EMPTY).count(), 2);
    }

    #[test]
    fn cycle_free_pass_rejects_a_pivot_that_would_cycle() {
        // row0: cols {0,1}; row1: cols {1,0} -- same pattern, rank 1. FL claims
        // col0 for row0; col1 for row1 would close a 2-cycle (row0 has col1,
        // row1 has col0), so pass 3 must leave row1 non-pivotal.
        let mut t = TripletMatrix::new(2, 2, 257, true);
        t.push(0, 0, 1).unwrap();
        t.push(0, 1, 1).unwrap();
        t.push(1, 1, 1).unwrap();
        t.push(1, 0, 1).unwrap();
        let mut a = t.compress();
        let mut ws = Workspace::new(2);
        let result = find_pivots(&mut a, &mut ws);
        assert_eq!(result.npiv, 1);
    }

    #[test]
    fn cycle_free_pivot_on_genuinely_independent_free_column() {
        // row0: cols {0,1}; row1: cols {1} only. FL claims col0 for row0 (row0
        // is the only row touching col0). col1 is touched by both rows so pass
        // 2 can't free it, but row1's only entry (col1) has no path back into
        // row0 beyond col1 itself, so pass 3 must claim it safely.
        let mut t = TripletMatrix::new(2, 2, 257, true);
        t.push(0, 0, 1).unwrap();
        t.push(0, 1, 1).unwrap();
        t.push(1, 1, 1).unwrap();
        let mut a = t.compress();
        let mut ws = Workspace::new(2);
        let result = find_pivots(&mut a, &mut ws);
        assert_eq!(result.npiv, 2);
        assert_eq!(result.qinv[1], 1);
    }
}
