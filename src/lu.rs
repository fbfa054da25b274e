//! PLUQ/LU factorization: row-by-row lazy pivot discovery driven by the
//! sparse forward solver, with optional probabilistic early-abort once a
//! long streak of rows fails to yield a new pivot, and a finalization pass
//! that turns the partial `qinv`/`p` bookkeeping into the bundle's public,
//! fully-assigned permutations.

use rand::Rng;

use crate::config::SolverConfig;
use crate::field::Field;
use crate::matrix::CsrMatrix;
use crate::perm::{EMPTY, extend_qinv_to_bijection};
use crate::solve::sparse_forward_solve;
use crate::workspace::Workspace;

/// Counters describing one factorization run, surfaced for the CLI's timing
/// report and for callers who want to know whether early-abort fired.
#[derive(Debug, Clone, Default)]
pub struct FactorMetrics {
    pub rows_processed: usize,
    pub early_abort_probes: usize,
    pub early_abort_fired: bool,
}

/// Result of factoring `A`: `L . U = P . A . Q` where `Q` is folded into
/// `U`'s column indices (already rewritten through the final `qinv`) and `P`
/// is `p`, a full row permutation of length `n`.
pub struct FactorBundle {
    /// `n x r` lower-trapezoidal, rows in final `p` order. `None` unless
    /// `config.keep_l` was set.
    pub l: Option<CsrMatrix>,
    /// `r x m` upper-trapezoidal; column indices already rewritten through
    /// the finalized `qinv`, so `U`'s own column `k` is the pivot of the
    /// original column `qinv_inverse[k]`.
    pub u: CsrMatrix,
    /// Row permutation: `p[k]` is the original row id now at position `k`.
    pub p: Vec<usize>,
    /// Full inverse column permutation (after `extend_qinv_to_bijection`):
    /// `qinv[j]` is the final position of original column `j`.
    pub qinv: Vec<isize>,
    pub rank: usize,
    pub metrics: FactorMetrics,
}

/// Factor `a`, optionally visiting its rows in the order given by `pi`
/// (typically the permutation pivot discovery suggested) rather than `a`'s
/// own row order. `pi` is applied on the fly and never baked into `u`/`l`.
pub fn factor(
    a: &CsrMatrix,
    pi: Option<&[usize]>,
    config: &SolverConfig,
    field: &Field,
    ws: &mut Workspace,
    rng: &mut impl Rng,
) -> FactorBundle {
    let n = a.dim.nrows;
    let m = a.dim.ncols;
    let keep_l = config.keep_l;

    let init_nzmax = ((a.nnz() as f64 * config.initmem_factor) as usize).max(m);
    let mut l = keep_l.then(|| CsrMatrix::alloc(n, n, init_nzmax, field.modulus(), true));
    let mut u = CsrMatrix::alloc(n.min(m), m, init_nzmax, field.modulus(), true);

    let mut qinv = vec![EMPTY; m];
    let mut p_perm = vec![EMPTY; n];
    let mut final_to_loop = vec![0usize; n];

    let mut lnz = 0usize;
    let mut unz = 0usize;
    let mut defficiency = 0usize;
    let mut no_pivot_streak = 0usize;
    let mut abort_tested = false;
    let mut metrics = FactorMetrics::default();

    let progress_every = (n / 1000).max(1);
    let mut processed = 0usize;

    for i in 0..n {
        let inew = pi.map_or(i, |pi| pi[i]);
        processed = i + 1;

        if let Some(l) = l.as_mut() {
            l.grow_for(lnz + m);
            l.row_pointers[i] = lnz;
        }
        let urow = i - defficiency;
        u.grow_for(unz + m);
        u.row_pointers[urow] = unz;

        let top = sparse_forward_solve(&u, a, inew, &qinv, ws, field);
        for p in top..m {
            ws.touch(ws.xi[p]);
        }

        let mut ipiv: Option<usize> = None;
        for idx in top..m {
            let j = ws.xi[idx];
            if qinv[j] == EMPTY && ws.x[j] != 0 {
                let better = match ipiv {
                    Some(cur) => j < cur,
                    None => true,
                };
                if better {
                    ipiv = Some(j);
                }
            }
        }

        if let Some(l) = l.as_mut() {
            for idx in top..m {
                let j = ws.xi[idx];
                if qinv[j] != EMPTY && ws.x[j] != 0 {
                    l.column_indices[lnz] = qinv[j] as usize;
                    l.values.as_mut().unwrap()[lnz] = ws.x[j];
                    lnz += 1;
                }
            }
        }

        match ipiv {
            None => {
                defficiency += 1;
                let k = n - defficiency;
                p_perm[k] = inew as isize;
                final_to_loop[k] = i;
                no_pivot_streak += 1;
            }
            Some(piv) => {
                if let Some(l) = l.as_mut() {
                    l.column_indices[lnz] = urow;
                    l.values.as_mut().unwrap()[lnz] = 1;
                    lnz += 1;
                }
                qinv[piv] = urow as isize;
                p_perm[urow] = inew as isize;
                final_to_loop[urow] = i;

                u.column_indices[unz] = piv;
                u.values.as_mut().unwrap()[unz] = ws.x[piv];
                unz += 1;
                for idx in top..m {
                    let j = ws.xi[idx];
                    if j != piv && qinv[j] == EMPTY && ws.x[j] != 0 {
                        u.column_indices[unz] = j;
                        u.values.as_mut().unwrap()[unz] = ws.x[j];
                        unz += 1;
                    }
                }
                no_pivot_streak = 0;
                abort_tested = false;
            }
        }

        ws.clear_touched();
        metrics.rows_processed += 1;

        if processed % progress_every == 0 {
            eprintln!(
                "[lu] row {processed}/{n}  rank={}  nnz(L)+nnz(U)={}",
                processed - defficiency,
                lnz + unz
            );
        }

        // Early termination only applies when L is not being kept: stopping
        // early leaves no elimination coefficients for the unprocessed rows,
        // which a caller that wants L cannot tolerate.
        if !keep_l {
            let rank_so_far = processed - defficiency;
            if rank_so_far == n.min(m) {
                break;
            }
            if !abort_tested
                && no_pivot_streak > config.early_abort_min_streak
                && no_pivot_streak > n / 100
            {
                abort_tested = true;
                metrics.early_abort_probes += 1;
                let rank = urow + if ipiv.is_some() { 1 } else { 0 };
                if early_abort(a, pi, i + 1, &u, rank, field, rng) {
                    metrics.early_abort_fired = true;
                    break;
                }
            }
        }
    }

    let rank = processed - defficiency;

    // Finalization: any row this loop never reached (early stop) is
    // deficient by construction -- fill its slot from the back same as a
    // row that was processed and found no pivot.
    for i in processed..n {
        let inew = pi.map_or(i, |pi| pi[i]);
        defficiency += 1;
        let k = n - defficiency;
        p_perm[k] = inew as isize;
    }
    debug_assert!(p_perm.iter().all(|&x| x != EMPTY));

    extend_qinv_to_bijection(&mut qinv, m);
    for idx in 0..unz {
        let old = u.column_indices[idx];
        u.column_indices[idx] = qinv[old] as usize;
    }
    u.row_pointers[rank] = unz;
    u.resize(rank, m);
    u.realloc(-1);

    let l = l.map(|mut l| {
        l.row_pointers[n] = lnz;
        let mut out = CsrMatrix::alloc(n, rank, lnz, field.modulus(), true);
        let mut cursor = 0usize;
        for k in 0..n {
            out.row_pointers[k] = cursor;
            let src = final_to_loop[k];
            let (cols, vals) = l.row(src);
            let len = cols.len();
            out.column_indices[cursor..cursor + len].copy_from_slice(cols);
            out.values.as_mut().unwrap()[cursor..cursor + len].copy_from_slice(vals);
            cursor += len;
        }
        out.row_pointers[n] = cursor;
        out
    });

    let p = p_perm.into_iter().map(|x| x as usize).collect();

    FactorBundle {
        l,
        u,
        p,
        qinv,
        rank,
        metrics,
    }
}

/// Probabilistic early-abort test: scatter a random linear
/// combination of the not-yet-processed rows `a[k..n]` (in `pi` order) and
/// reduce it against the pivots found so far. A nonzero residual proves at
/// least one more pivot remains; an all-zero residual is a high-confidence
/// (not certain) proof that the current rank is already final.
fn early_abort(
    a: &CsrMatrix,
    pi: Option<&[usize]>,
    k: usize,
    u: &CsrMatrix,
    rank: usize,
    field: &Field,
    rng: &mut impl Rng,
) -> bool {
    let n = a.dim.nrows;
    let m = a.dim.ncols;
    let mut y = vec![0u64; m];

    for i in k..n {
        let inew = pi.map_or(i, |pi| pi[i]);
        let coeff = rng.gen_range(0..field.modulus());
        if coeff == 0 {
            continue;
        }
        let (cols, vals) = a.row(inew);
        for (&c, &v) in cols.iter().zip(vals.iter()) {
            y[c] = field.add(y[c], field.mul(coeff, v));
        }
    }

    for urow in 0..rank {
        let (cols, vals) = u.row(urow);
        if cols.is_empty() {
            continue;
        }
        let pivot_col = cols[0];
        if y[pivot_col] == 0 {
            continue;
        }
        let Ok(inv) = field.inverse(vals[0]) else {
            continue;
        };
        let d = field.mul(y[pivot_col], inv);
        for (&c, &v) in cols.iter().zip(vals.iter()) {
            y[c] = field.sub_mul(y[c], d, v);
        }
    }

    y.iter().all(|&v| v == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::triplet::TripletMatrix;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn field() -> Field {
        Field::new(257).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn factors_identity_with_full_rank_and_trivial_l() {
        let mut t = TripletMatrix::new(3, 3, 257, true);
        t.push(0, 0, 1).unwrap();
        t.push(1, 1, 1).unwrap();
        t.push(2, 2, 1).unwrap();
        let a = t.compress();

        let config = SolverConfig {
            modulus: 257,
            keep_l: true,
            ..Default::default()
        };
        let f = field();
        let mut ws = Workspace::new(3);
        let mut r = rng();
        let bundle = factor(&a, None, &config, &f, &mut ws, &mut r);

        assert_eq!(bundle.rank, 3);
        assert_eq!(bundle.u.dim.nrows, 3);
        let l = bundle.l.unwrap();
        for i in 0..3 {
            let (cols, vals) = l.row(i);
            assert_eq!(cols, &[i]);
            assert_eq!(vals, &[1]);
        }
    }

    #[test]
    fn factors_rank_deficient_matrix() {
        // row0 = row1 (scaled), row2 independent -> rank 2 out of 3.
        let mut t = TripletMatrix::new(3, 3, 257, true);
        t.push(0, 0, 1).unwrap();
        t.push(0, 1, 1).unwrap();
        t.push(1, 0, 2).unwrap();
        t.push(1, 1, 2).unwrap();
        t.push(2, 2, 1).unwrap();
        let a = t.compress();

        let config = SolverConfig {
            modulus: 257,
            keep_l: true,
            ..Default::default()
        };
        let f = field();
        let mut ws = Workspace::new(3);
        let mut r = rng();
        let bundle = factor(&a, None, &config, &f, &mut ws, &mut r);

        assert_eq!(bundle.rank, 2);
        assert_eq!(bundle.u.dim.nrows, 2);
        assert_eq!(bundle.p.len(), 3);
        let mut sorted_p = bundle.p.clone();
        sorted_p.sort();
        assert_eq!(sorted_p, vec![0, 1, 2]);
    }

    #[test]
    fn early_abort_can_stop_rank_computation_without_l() {
        let mut t = TripletMatrix::new(3, 3, 257, true);
        t.push(0, 0, 1).unwrap();
        t.push(0, 1, 1).unwrap();
        t.push(1, 0, 2).unwrap();
        t.push(1, 1, 2).unwrap();
        t.push(2, 2, 1).unwrap();
        let a = t.compress();

        let config = SolverConfig {
            modulus: 257,
            keep_l: false,
            early_abort_min_streak: 0,
            ..Default::default()
        };
        let f = field();
        let mut ws = Workspace::new(3);
        let mut r = rng();
        let bundle = factor(&a, None, &config, &f, &mut ws, &mut r);

        assert_eq!(bundle.rank, 2);
        assert!(bundle.l.is_none());
    }
}
