//! Crate-wide configuration, in the style of this system's component
//! configs: a plain struct with a `Default` impl and a `validate` pass,
//! rather than scattered free parameters.

use crate::error::FieldError;

#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Field modulus p. Must be set before `validate()`; there is no sane
    /// default prime to assume on the caller's behalf.
    pub modulus: u64,
    /// Whether factorization retains L (and therefore runs every row to
    /// completion instead of stopping at the first rank-revealing proof).
    pub keep_l: bool,
    /// Multiplier applied to `nnz(A)` to size L/U's initial `nzmax` guess,
    /// avoiding the first few geometric reallocations on typical inputs.
    pub initmem_factor: f64,
    /// Fixed floor for the early-abort no-pivot-streak threshold (the
    /// source's `rows_since_last_pivot > 10` half of the conjunction).
    pub early_abort_min_streak: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            modulus: 0,
            keep_l: true,
            initmem_factor: 2.0,
            early_abort_min_streak: 10,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.modulus <= 1 {
            return Err(FieldError::InvalidModulus { p: self.modulus });
        }
        Ok(())
    }
}
