//! A sparse linear algebra kernel over a prime finite field GF(p):
//! compressed-sparse-row matrices, the sparse triangular solver, three-pass
//! pivot discovery (Faugère–Lachartre leftmost pivot, free columns,
//! cycle-free cheap pivots), PLUQ/LU factorization, and the Schur complement
//! used to eliminate a batch of pivots out of a larger residual.
//!
//! Row-at-a-time, lazily-pivoting LU: index-based CSR storage instead of
//! raw-pointer re-aliasing, a shared `Workspace` instead of per-call scratch
//! allocation, `thiserror` error enums at every fallible boundary.

pub mod config;
pub mod dm;
pub mod error;
pub mod field;
pub mod graph;
pub mod io;
pub mod lu;
pub mod matrix;
pub mod perm;
pub mod pivots;
pub mod schur;
pub mod solve;
pub mod workspace;

pub use config::SolverConfig;
pub use dm::{CellClass, DmBlock, DmBlocks};
pub use error::SpasmError;
pub use field::Field;
pub use lu::{factor, FactorBundle, FactorMetrics};
pub use matrix::{CsrMatrix, Dim, TripletMatrix};
pub use pivots::{find_pivots, PivotSearch};
pub use schur::schur_complement;
pub use workspace::Workspace;
