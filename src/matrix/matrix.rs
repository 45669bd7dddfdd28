use crate::error::{MatrixError, MatrixResult};
use crate::matrix::element::{Element, Promote, Promoted};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Dense row-major matrix. Every row holds exactly `cols` elements.
#[derive(Debug, Clone)]
pub struct Matrix<V> {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) cells: Vec<V>,
}

impl<V: Element> Matrix<V> {
    /// The 0 x 0 matrix.
    pub fn empty() -> Matrix<V> {
        Matrix {
            rows: 0,
            cols: 0,
            cells: vec![],
        }
    }

    /// A zero-filled `rows` x `cols` matrix. Panics when it does not fit in memory.
    pub fn new(rows: usize, cols: usize) -> Matrix<V> {
        match Matrix::try_new(rows, cols) {
            Ok(matrix) => matrix,
            Err(error) => panic!("{}", error),
        }
    }

    /// A zero-filled `rows` x `cols` matrix, or `TooLarge` when the cell count
    /// overflows or the allocation fails.
    pub fn try_new(rows: usize, cols: usize) -> MatrixResult<Matrix<V>> {
        let too_large = MatrixError::TooLarge { rows, cols };
        let len = rows.checked_mul(cols).ok_or_else(|| too_large.clone())?;

        let mut cells = Vec::new();
        cells.try_reserve_exact(len).map_err(|_| too_large)?;
        cells.resize(len, V::zero());

        Ok(Matrix::from_cells(rows, cols, cells))
    }

    pub fn identity(n: usize) -> Matrix<V> {
        match Matrix::try_identity(n) {
            Ok(matrix) => matrix,
            Err(error) => panic!("{}", error),
        }
    }

    pub fn try_identity(n: usize) -> MatrixResult<Matrix<V>> {
        let mut matrix = Matrix::try_new(n, n)?;
        for i in 0..n {
            matrix.cells[i * n + i] = V::one();
        }
        Ok(matrix)
    }

    // Column count follows the first row, so a matrix without rows has no columns.
    pub(crate) fn from_cells(rows: usize, cols: usize, cells: Vec<V>) -> Matrix<V> {
        let cols = if rows == 0 { 0 } else { cols };
        debug_assert_eq!(cells.len(), rows * cols);
        Matrix { rows, cols, cells }
    }

    pub fn from_list(lines: Vec<Vec<V>>) -> MatrixResult<Matrix<V>> {
        let rows = lines.len();
        let cols = lines.first().map(|l| l.len()).unwrap_or(0);

        if let Some(line) = lines.iter().find(|l| l.len() != cols) {
            return Err(MatrixError::DimensionMismatch {
                op: "from_list",
                lhs: (rows, cols),
                rhs: (1, line.len()),
            });
        }

        Ok(Matrix::from_cells(
            rows,
            cols,
            lines.into_iter().flatten().collect(),
        ))
    }

    pub fn to_list(&self) -> Vec<Vec<V>> {
        self.iter_rows().map(|row| row.to_vec()).collect()
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    fn check_row(&self, row: usize) -> MatrixResult<()> {
        if row >= self.rows {
            return Err(MatrixError::Index {
                row,
                col: None,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    fn check_cell(&self, row: usize, col: usize) -> MatrixResult<()> {
        if row >= self.rows || col >= self.cols {
            return Err(MatrixError::Index {
                row,
                col: Some(col),
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    /// Row `i`. Panics when `i` is out of bounds.
    pub fn row(&self, i: usize) -> &[V] {
        if let Err(error) = self.check_row(i) {
            panic!("{}", error);
        }
        &self.cells[i * self.cols..(i + 1) * self.cols]
    }

    /// Mutable row `i`. Panics when `i` is out of bounds.
    pub fn row_mut(&mut self, i: usize) -> &mut [V] {
        if let Err(error) = self.check_row(i) {
            panic!("{}", error);
        }
        &mut self.cells[i * self.cols..(i + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[V]> + '_ {
        (0..self.rows).map(move |i| &self.cells[i * self.cols..(i + 1) * self.cols])
    }

    #[inline(always)]
    pub fn at(&self, row: usize, col: usize) -> V {
        self[(row, col)]
    }

    pub fn get(&self, row: usize, col: usize) -> MatrixResult<V> {
        self.check_cell(row, col)?;
        Ok(self.cells[row * self.cols + col])
    }

    pub fn set(&mut self, row: usize, col: usize, value: V) -> MatrixResult<()> {
        self.check_cell(row, col)?;
        self.cells[row * self.cols + col] = value;
        Ok(())
    }

    /// Replaces row `i` with `values`, which must hold exactly `cols` elements.
    pub fn set_row(&mut self, i: usize, values: Vec<V>) -> MatrixResult<()> {
        self.check_row(i)?;
        if values.len() != self.cols {
            return Err(MatrixError::DimensionMismatch {
                op: "set_row",
                lhs: (self.rows, self.cols),
                rhs: (1, values.len()),
            });
        }
        self.row_mut(i).copy_from_slice(&values);
        Ok(())
    }

    /// Exchanges rows `a` and `b`. Panics when either is out of bounds.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if let Err(error) = self.check_row(a).and_then(|_| self.check_row(b)) {
            panic!("{}", error);
        }
        if a == b {
            return;
        }
        for k in 0..self.cols {
            self.cells.swap(a * self.cols + k, b * self.cols + k);
        }
    }

    pub fn transpose(&self) -> Matrix<V> {
        Matrix::from_cells(
            self.cols,
            self.rows,
            (0..self.cols)
                .flat_map(|c| (0..self.rows).map(move |r| self.at(r, c)))
                .collect(),
        )
    }

    /// Converts every element to the wider type `X`.
    pub fn cast<X: Element + From<V>>(&self) -> Matrix<X> {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(|&x| <X as From<V>>::from(x)).collect(),
        }
    }

    /// Horizontal concatenation: the columns of `rhs` follow the columns of `self`.
    pub fn augment<W>(&self, rhs: &Matrix<W>) -> MatrixResult<Matrix<Promoted<V, W>>>
    where
        V: Promote<W>,
        W: Element,
    {
        self.cast::<Promoted<V, W>>()
            .concat(&rhs.cast::<Promoted<V, W>>())
    }

    pub(crate) fn concat(&self, rhs: &Matrix<V>) -> MatrixResult<Matrix<V>> {
        if self.rows != rhs.rows {
            return Err(MatrixError::DimensionMismatch {
                op: "augment",
                lhs: (self.rows, self.cols),
                rhs: (rhs.rows, rhs.cols),
            });
        }

        Ok(Matrix::from_cells(
            self.rows,
            self.cols + rhs.cols,
            self.iter_rows()
                .zip(rhs.iter_rows())
                .flat_map(|(l, r)| l.iter().chain(r.iter()).copied())
                .collect(),
        ))
    }

    /// Largest elementwise absolute difference, or `None` if the shapes differ.
    pub fn max_abs_diff(&self, other: &Matrix<V>) -> Option<V> {
        if self.rows != other.rows || self.cols != other.cols {
            return None;
        }
        Some(
            self.cells
                .iter()
                .zip(other.cells.iter())
                .map(|(&a, &b)| (a - b).abs())
                .fold(V::zero(), V::max),
        )
    }
}

impl<V: Element> Default for Matrix<V> {
    fn default() -> Self {
        Matrix::empty()
    }
}

impl<V: Element> Index<usize> for Matrix<V> {
    type Output = [V];

    fn index(&self, row: usize) -> &[V] {
        self.row(row)
    }
}

impl<V: Element> IndexMut<usize> for Matrix<V> {
    fn index_mut(&mut self, row: usize) -> &mut [V] {
        self.row_mut(row)
    }
}

impl<V: Element> Index<(usize, usize)> for Matrix<V> {
    type Output = V;

    fn index(&self, (row, col): (usize, usize)) -> &V {
        if let Err(error) = self.check_cell(row, col) {
            panic!("{}", error);
        }
        &self.cells[row * self.cols + col]
    }
}

impl<V: Element> IndexMut<(usize, usize)> for Matrix<V> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut V {
        if let Err(error) = self.check_cell(row, col) {
            panic!("{}", error);
        }
        &mut self.cells[row * self.cols + col]
    }
}

impl<V, W> PartialEq<Matrix<W>> for Matrix<V>
where
    V: Promote<W>,
    W: Element,
{
    fn eq(&self, other: &Matrix<W>) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self
                .cells
                .iter()
                .zip(other.cells.iter())
                .all(|(&a, &b)| V::widen_lhs(a) == V::widen_rhs(b))
    }
}

impl<V: Element> fmt::Display for Matrix<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.iter_rows() {
            write!(f, "[")?;
            for (j, x) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", x)?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matrix<f64> {
        Matrix::from_list(vec![vec![1., 2., 3.], vec![4., 5., 6.]]).unwrap()
    }

    #[test]
    fn test_construction() {
        let m = Matrix::<f64>::new(2, 3);
        assert_eq!((m.rows(), m.cols()), (2, 3));
        assert_eq!(m.to_list(), vec![vec![0.; 3]; 2]);

        let m = Matrix::<f32>::empty();
        assert_eq!((m.rows(), m.cols()), (0, 0));
        assert_eq!(m.to_list(), Vec::<Vec<f32>>::new());

        let m = Matrix::<f64>::new(0, 4);
        assert_eq!((m.rows(), m.cols()), (0, 0));

        let m = Matrix::<f64>::new(3, 0);
        assert_eq!((m.rows(), m.cols()), (3, 0));
        assert_eq!(m.to_list(), vec![Vec::<f64>::new(); 3]);

        assert_eq!(
            Matrix::<f32>::identity(3).to_list(),
            vec![vec![1., 0., 0.], vec![0., 1., 0.], vec![0., 0., 1.]]
        );
    }

    #[test]
    fn test_from_list_rejects_ragged_rows() {
        let err = Matrix::<f64>::from_list(vec![vec![1., 2.], vec![3.]]).unwrap_err();
        assert_eq!(
            err,
            MatrixError::DimensionMismatch {
                op: "from_list",
                lhs: (2, 2),
                rhs: (1, 1)
            }
        );
    }

    #[test]
    fn test_indexing() {
        let mut m = sample();
        assert_eq!(m[1], [4., 5., 6.]);
        assert_eq!(m[(0, 2)], 3.);
        assert_eq!(m.at(1, 0), 4.);

        m[(0, 0)] = 9.;
        m[1][2] = -1.;
        assert_eq!(m.to_list(), vec![vec![9., 2., 3.], vec![4., 5., -1.]]);
    }

    #[test]
    #[should_panic(expected = "Index out of bounds")]
    fn test_row_index_out_of_bounds() {
        let m = sample();
        let _ = &m[2];
    }

    #[test]
    #[should_panic(expected = "Index out of bounds")]
    fn test_cell_index_out_of_bounds() {
        let m = sample();
        let _ = m[(0, 3)];
    }

    #[test]
    #[should_panic(expected = "Index out of bounds")]
    fn test_row_index_on_columnless_matrix() {
        let m = Matrix::<f64>::new(2, 0);
        let _ = m.row(2);
    }

    #[test]
    #[should_panic(expected = "Index out of bounds")]
    fn test_swap_rows_out_of_bounds() {
        let mut m = sample();
        m.swap_rows(0, 2);
    }

    #[test]
    #[should_panic(expected = "Index out of bounds")]
    fn test_swap_rows_on_columnless_matrix() {
        let mut m = Matrix::<f64>::new(2, 0);
        m.swap_rows(1, 5);
    }

    #[test]
    fn test_oversized_construction() {
        assert_eq!(
            Matrix::<f64>::try_new(usize::MAX, 2).unwrap_err(),
            MatrixError::TooLarge {
                rows: usize::MAX,
                cols: 2
            }
        );
        // The cell count fits in usize but its byte size does not.
        assert!(Matrix::<f64>::try_new(usize::MAX / 4, 1).is_err());
        assert!(Matrix::<f32>::try_identity(usize::MAX / 2 + 1).is_err());

        assert_eq!(
            Matrix::<f64>::try_identity(2).unwrap(),
            Matrix::<f64>::identity(2)
        );
        assert_eq!(Matrix::<f64>::try_new(0, usize::MAX).unwrap().cols(), 0);
    }

    #[test]
    #[should_panic(expected = "does not fit in memory")]
    fn test_new_panics_when_oversized() {
        let _ = Matrix::<f64>::new(usize::MAX, usize::MAX);
    }

    #[test]
    fn test_checked_access() {
        let mut m = sample();
        assert_eq!(m.get(1, 1), Ok(5.));
        assert_eq!(
            m.get(2, 0),
            Err(MatrixError::Index {
                row: 2,
                col: Some(0),
                rows: 2,
                cols: 3
            })
        );
        assert!(m.set(0, 3, 1.).is_err());
        assert!(m.set(0, 2, 7.).is_ok());
        assert_eq!(m[(0, 2)], 7.);
    }

    #[test]
    fn test_set_row() {
        let mut m = sample();
        m.set_row(0, vec![7., 8., 9.]).unwrap();
        assert_eq!(m.row(0), [7., 8., 9.]);

        assert!(matches!(
            m.set_row(1, vec![1., 2.]),
            Err(MatrixError::DimensionMismatch { op: "set_row", .. })
        ));
        assert!(matches!(
            m.set_row(5, vec![1., 2., 3.]),
            Err(MatrixError::Index { row: 5, .. })
        ));
        assert_eq!(m.row(1), [4., 5., 6.]);
    }

    #[test]
    fn test_swap_and_transpose() {
        let mut m = sample();
        m.swap_rows(0, 1);
        assert_eq!(m.to_list(), vec![vec![4., 5., 6.], vec![1., 2., 3.]]);

        assert_eq!(
            sample().transpose().to_list(),
            vec![vec![1., 4.], vec![2., 5.], vec![3., 6.]]
        );
        assert_eq!(Matrix::<f64>::new(3, 0).transpose().rows(), 0);
    }

    #[test]
    fn test_equality() {
        let a = sample();
        let mut b = sample();
        assert_eq!(a, b);

        b[(1, 1)] = 5.5;
        assert_ne!(a, b);
        assert_ne!(a, a.transpose());
        assert_ne!(Matrix::<f64>::new(2, 2), Matrix::<f64>::new(2, 3));

        let single = Matrix::<f32>::from_list(vec![vec![1., 2., 3.], vec![4., 5., 6.]]).unwrap();
        assert!(a == single);
        assert!(single == a);

        let tenth = Matrix::<f32>::from_list(vec![vec![0.1]]).unwrap();
        let tenth_double = Matrix::<f64>::from_list(vec![vec![0.1]]).unwrap();
        assert!(tenth != tenth_double);
        assert!(tenth == tenth.cast::<f64>());
    }

    #[test]
    fn test_augment() {
        let lhs = Matrix::<f32>::from_list(vec![vec![1., 2.], vec![3., 4.]]).unwrap();
        let rhs = Matrix::<f64>::identity(2);

        let aug: Matrix<f64> = lhs.augment(&rhs).unwrap();
        assert_eq!(
            aug.to_list(),
            vec![vec![1., 2., 1., 0.], vec![3., 4., 0., 1.]]
        );

        let err = lhs.augment(&Matrix::<f64>::identity(3)).unwrap_err();
        assert_eq!(
            err,
            MatrixError::DimensionMismatch {
                op: "augment",
                lhs: (2, 2),
                rhs: (3, 3)
            }
        );
    }

    #[test]
    fn test_max_abs_diff() {
        let a = sample();
        let mut b = sample();
        b[(0, 1)] = 2.5;
        b[(1, 2)] = 5.;
        assert_eq!(a.max_abs_diff(&b), Some(1.));
        assert_eq!(a.max_abs_diff(&a.transpose()), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(sample().to_string(), "[1 2 3]\n[4 5 6]\n");
    }
}
