use crate::error::MatrixError;
use crate::matrix::matrix::Matrix;
use log::warn;
use pyo3::exceptions::{PyIndexError, PyMemoryError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyType;

impl From<MatrixError> for PyErr {
    fn from(error: MatrixError) -> PyErr {
        warn!("python: {}", error);
        match error {
            MatrixError::Index { .. } => PyIndexError::new_err(error.to_string()),
            MatrixError::TooLarge { .. } => PyMemoryError::new_err(error.to_string()),
            _ => PyValueError::new_err(error.to_string()),
        }
    }
}

/// Double precision matrix exposed to Python.
#[derive(Debug, Clone)]
#[pyclass(name = "Matrix")]
pub struct PyMatrix {
    inner: Matrix<f64>,
}

impl From<Matrix<f64>> for PyMatrix {
    fn from(inner: Matrix<f64>) -> Self {
        PyMatrix { inner }
    }
}

#[derive(FromPyObject)]
pub enum MatrixOrScalar<'a> {
    Matrix(Bound<'a, PyMatrix>),
    Scalar(f64),
}

#[pymethods]
impl PyMatrix {
    #[new]
    #[pyo3(signature = (rows=0, cols=0))]
    pub fn new(rows: usize, cols: usize) -> PyResult<Self> {
        Ok(Matrix::try_new(rows, cols)?.into())
    }

    #[staticmethod]
    pub fn zeros(rows: usize, cols: usize) -> PyResult<Self> {
        Ok(Matrix::try_new(rows, cols)?.into())
    }

    #[classmethod]
    pub fn from_list(_cls: &Bound<PyType>, lines: Vec<Vec<f64>>) -> PyResult<Self> {
        Ok(Matrix::from_list(lines)?.into())
    }

    #[staticmethod]
    pub fn identity(n: usize) -> PyResult<Self> {
        Ok(Matrix::try_identity(n)?.into())
    }

    pub fn to_list(&self) -> Vec<Vec<f64>> {
        self.inner.to_list()
    }

    #[getter]
    pub fn rows(&self) -> usize {
        self.inner.rows()
    }

    #[getter]
    pub fn cols(&self) -> usize {
        self.inner.cols()
    }

    #[allow(non_snake_case)]
    #[getter]
    pub fn T(&self) -> PyMatrix {
        self.inner.transpose().into()
    }

    pub fn get(&self, row: usize, col: usize) -> PyResult<f64> {
        Ok(self.inner.get(row, col)?)
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> PyResult<()> {
        Ok(self.inner.set(row, col, value)?)
    }

    pub fn __add__(&self, rhs: PyRef<PyMatrix>) -> PyResult<PyMatrix> {
        Ok((&self.inner + &rhs.inner)?.into())
    }

    pub fn __sub__(&self, rhs: PyRef<PyMatrix>) -> PyResult<PyMatrix> {
        Ok((&self.inner - &rhs.inner)?.into())
    }

    pub fn __mul__(&self, rhs: MatrixOrScalar) -> PyResult<PyMatrix> {
        match rhs {
            MatrixOrScalar::Matrix(rhs) => Ok((&self.inner * &rhs.borrow().inner)?.into()),
            MatrixOrScalar::Scalar(rhs) => Ok((&self.inner * rhs).into()),
        }
    }

    pub fn __rmul__(&self, lhs: f64) -> PyMatrix {
        (&self.inner * lhs).into()
    }

    pub fn __truediv__(&self, rhs: f64) -> PyMatrix {
        (&self.inner / rhs).into()
    }

    pub fn __eq__(&self, other: PyRef<PyMatrix>) -> bool {
        self.inner == other.inner
    }

    pub fn __repr__(&self) -> String {
        format!("Matrix({:?})", self.inner.to_list())
    }

    pub fn eval(&self, input: Vec<f64>) -> PyResult<Vec<f64>> {
        Ok(self.inner.eval(input.as_slice())?)
    }

    pub fn augment(&self, rhs: PyRef<PyMatrix>) -> PyResult<PyMatrix> {
        Ok(self.inner.augment(&rhs.inner)?.into())
    }

    pub fn echelon(&self) -> PyMatrix {
        self.inner.echelon().into()
    }

    pub fn inverse(&self) -> PyResult<PyMatrix> {
        Ok(self.inner.inverse()?.into())
    }

    pub fn is_rref(&self) -> bool {
        self.inner.is_rref()
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
