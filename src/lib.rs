pub mod error;

pub mod matrix {
    pub mod echelon;
    pub mod element;
    pub mod matrix;
    pub mod ops;
}

pub mod capi;

#[cfg(feature = "python")]
pub mod python;

pub use error::{MatrixError, MatrixResult};
pub use matrix::element::{Element, Promote, Promoted};
pub use matrix::matrix::Matrix;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// A Python module implemented in Rust.
#[cfg(feature = "python")]
#[pymodule]
fn dense_matrix(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyMatrix>()?;
    Ok(())
}
