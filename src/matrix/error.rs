use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsrError {
    #[error("out of bounds column index: {index} (ncols: {max})")]
    OutOfBoundsIndex { index: usize, max: usize },

    #[error("invalid row pointers length: expected {expected}, got {actual}")]
    InvalidRowPointersLength { expected: usize, actual: usize },

    #[error("row pointers must start at 0, end at nnz, and be non-decreasing (row {index}: expected {expected}, got {actual})")]
    InvalidRowPointers {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("column indices/values length mismatch: {column_indices} vs {values}")]
    ColumnIndicesValuesLengthMismatch { column_indices: usize, values: usize },

    #[error("row pointer {index} ({value}) exceeds capacity nzmax={nzmax}")]
    ExceedsCapacity {
        index: usize,
        value: usize,
        nzmax: usize,
    },
}

#[derive(Debug, Error)]
pub enum TripletError {
    #[error("row index {index} out of bounds (nrows: {max})")]
    RowOutOfBounds { index: usize, max: usize },

    #[error("column index {index} out of bounds (ncols: {max})")]
    ColumnOutOfBounds { index: usize, max: usize },

    #[error("triplet has a value but the matrix was built pattern-only, or vice versa")]
    ValuePresenceMismatch,
}
