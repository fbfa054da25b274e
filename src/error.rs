use thiserror::Error;

use crate::dm::DmError;
use crate::io::sms::SmsError;
use crate::matrix::error::{CsrError, TripletError};

/// Crate-level error composing every module's structured error type.
#[derive(Debug, Error)]
pub enum SpasmError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Triplet(#[from] TripletError),

    #[error(transparent)]
    Csr(#[from] CsrError),

    #[error(transparent)]
    Sms(#[from] SmsError),

    #[error(transparent)]
    Factor(#[from] FactorError),

    #[error(transparent)]
    Dm(#[from] DmError),
}

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("field modulus must be > 1, got p={p}")]
    InvalidModulus { p: u64 },

    #[error("{value} has no inverse mod {p}")]
    NotInvertible { value: u64, p: u64 },
}

/// Errors raised by the LU/PLUQ factorization and Schur complement kernels.
#[derive(Debug, Error)]
pub enum FactorError {
    #[error("matrix dimensions do not match workspace: expected {expected} columns, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("row permutation length {actual} does not match row count {expected}")]
    InvalidPermutationLength { expected: usize, actual: usize },

    #[error("pivot list names row {row} more than once")]
    DuplicatePivotRow { row: usize },

    #[error(transparent)]
    Csr(#[from] CsrError),
}
