use thiserror::Error;

/// Errors reported by matrix operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// Row or column index out of bounds.
    #[error("Index out of bounds: row {row}, col {col:?} in a {rows} x {cols} matrix")]
    Index {
        row: usize,
        col: Option<usize>,
        rows: usize,
        cols: usize,
    },

    /// Operand shapes are incompatible for the operation.
    #[error("Dimensions not compatible for {op}: {lhs:?} and {rhs:?}")]
    DimensionMismatch {
        op: &'static str,
        lhs: (usize, usize),
        rhs: (usize, usize),
    },

    /// Only square matrices have an inverse.
    #[error("No inverse for a {rows} x {cols} matrix")]
    NotInvertible { rows: usize, cols: usize },

    /// The cell count overflows or cannot be allocated.
    #[error("A {rows} x {cols} matrix does not fit in memory")]
    TooLarge { rows: usize, cols: usize },
}

pub type MatrixResult<T> = Result<T, MatrixError>;

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
