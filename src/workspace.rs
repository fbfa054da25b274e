//! Reusable scratch arrays bound to a matrix's column count, shared by the
//! graph, solver, pivot-discovery and factorization modules so that no row
//! or column of a large sparse matrix pays for a fresh O(m) allocation.
//!
//! The DFS recursion stack, the per-row scan cursor, and the output pattern
//! buffer are kept as three equally-sized, separately named arrays —
//! `dfs_stack`, `dfs_pos`, `xi` — rather than one buffer sliced by
//! hand-computed offsets. Same total footprint, same reuse-across-rows
//! discipline; this just keeps each region's purpose in its type instead of
//! in pointer arithmetic.

/// Scratch workspace bound to an `m`-column matrix.
pub struct Workspace {
    m: usize,
    /// Dense value accumulator, indexed by column. Zero on every position
    /// not currently "touched" (see `touched`).
    pub x: Vec<u64>,
    /// DFS recursion stack (node ids), indexed by depth.
    pub dfs_stack: Vec<usize>,
    /// Per-depth scan position into the row currently being walked.
    pub dfs_pos: Vec<isize>,
    /// Output pattern buffer; a completed DFS/solve call leaves the
    /// reachable set in `xi[top..m)`, in reverse-topological order.
    pub xi: Vec<usize>,
    /// Epoch-stamped visited marks for DFS reachability: column `j` is
    /// visited in the current call iff `marks[j] == epoch`. Using a
    /// monotonic epoch counter instead of a boolean array avoids an O(m)
    /// reset between calls.
    marks: Vec<i64>,
    epoch: i64,
    /// Pass-3 pivot-discovery marks: 1 = non-pivotal entry on the row under
    /// consideration, -1 = reachable (or pivotal), 0 = absent.
    pub w: Vec<i8>,
    /// BFS queue for pass 3 of pivot discovery.
    pub queue: Vec<usize>,
    /// Positions in `x`/`xi` touched since the last reset, so callers can
    /// clear exactly what they dirtied instead of scanning all `m` entries.
    touched: Vec<usize>,
}

impl Workspace {
    pub fn new(m: usize) -> Self {
        Self {
            m,
            x: vec![0; m],
            dfs_stack: vec![0; m],
            dfs_pos: vec![0; m],
            xi: vec![0; m],
            marks: vec![0; m],
            epoch: 0,
            w: vec![0; m],
            queue: Vec::with_capacity(m),
            touched: Vec::with_capacity(m),
        }
    }

    pub fn len(&self) -> usize {
        self.m
    }

    /// Begin a new reachability sweep: returns a fresh epoch such that no
    /// column is marked visited under it yet.
    pub fn fresh_epoch(&mut self) -> i64 {
        self.epoch += 1;
        self.epoch
    }

    pub fn is_marked(&self, j: usize, epoch: i64) -> bool {
        self.marks[j] == epoch
    }

    pub fn mark(&mut self, j: usize, epoch: i64) {
        self.marks[j] = epoch;
    }

    /// Record that column `j` now holds a live value in `x`, so it can be
    /// cleared again by [`Workspace::clear_touched`].
    pub fn touch(&mut self, j: usize) {
        self.touched.push(j);
    }

    /// Zero every position of `x` touched since the last call, restoring
    /// the "zero on entry" invariant without scanning all `m` columns.
    pub fn clear_touched(&mut self) {
        for j in self.touched.drain(..) {
            self.x[j] = 0;
        }
    }
}
