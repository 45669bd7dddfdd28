use crate::error::{MatrixError, MatrixResult};
use crate::matrix::element::{Element, Promote, Promoted};
use crate::matrix::matrix::Matrix;
use itertools::iproduct;
use std::ops;

impl<V: Element> Matrix<V> {
    fn elementwise<W, F>(
        &self,
        rhs: &Matrix<W>,
        op: &'static str,
        f: F,
    ) -> MatrixResult<Matrix<Promoted<V, W>>>
    where
        V: Promote<W>,
        W: Element,
        F: Fn(Promoted<V, W>, Promoted<V, W>) -> Promoted<V, W>,
    {
        if self.cols != rhs.cols || self.rows != rhs.rows {
            return Err(MatrixError::DimensionMismatch {
                op,
                lhs: (self.rows, self.cols),
                rhs: (rhs.rows, rhs.cols),
            });
        }

        Ok(Matrix::from_cells(
            self.rows,
            self.cols,
            self.cells
                .iter()
                .zip(rhs.cells.iter())
                .map(|(&a, &b)| f(V::widen_lhs(a), V::widen_rhs(b)))
                .collect(),
        ))
    }

    /// Matrix-vector product, treating `input` as a column vector.
    pub fn eval<W>(&self, input: &[W]) -> MatrixResult<Vec<Promoted<V, W>>>
    where
        V: Promote<W>,
        W: Element,
    {
        if input.len() != self.cols {
            return Err(MatrixError::DimensionMismatch {
                op: "eval",
                lhs: (self.rows, self.cols),
                rhs: (input.len(), 1),
            });
        }

        Ok(self
            .iter_rows()
            .map(|row| {
                row.iter()
                    .zip(input.iter())
                    .map(|(&a, &b)| V::widen_lhs(a) * V::widen_rhs(b))
                    .sum()
            })
            .collect())
    }

    pub fn scale<W>(&self, scalar: W) -> Matrix<Promoted<V, W>>
    where
        V: Promote<W>,
        W: Element,
    {
        let scalar = V::widen_rhs(scalar);
        Matrix::from_cells(
            self.rows,
            self.cols,
            self.cells
                .iter()
                .map(|&x| scalar * V::widen_lhs(x))
                .collect(),
        )
    }

    /// Elementwise `element / scalar`. Division by zero follows IEEE 754.
    pub fn divide<W>(&self, scalar: W) -> Matrix<Promoted<V, W>>
    where
        V: Promote<W>,
        W: Element,
    {
        let scalar = V::widen_rhs(scalar);
        Matrix::from_cells(
            self.rows,
            self.cols,
            self.cells
                .iter()
                .map(|&x| V::widen_lhs(x) / scalar)
                .collect(),
        )
    }
}

impl<V, W> ops::Add<&Matrix<W>> for &Matrix<V>
where
    V: Promote<W>,
    W: Element,
{
    type Output = MatrixResult<Matrix<Promoted<V, W>>>;

    fn add(self, rhs: &Matrix<W>) -> Self::Output {
        self.elementwise(rhs, "add", |a, b| a + b)
    }
}

impl<V, W> ops::Sub<&Matrix<W>> for &Matrix<V>
where
    V: Promote<W>,
    W: Element,
{
    type Output = MatrixResult<Matrix<Promoted<V, W>>>;

    fn sub(self, rhs: &Matrix<W>) -> Self::Output {
        self.elementwise(rhs, "sub", |a, b| a - b)
    }
}

impl<V, W> ops::Mul<&Matrix<W>> for &Matrix<V>
where
    V: Promote<W>,
    W: Element,
{
    type Output = MatrixResult<Matrix<Promoted<V, W>>>;

    fn mul(self, rhs: &Matrix<W>) -> Self::Output {
        if self.cols != rhs.rows {
            return Err(MatrixError::DimensionMismatch {
                op: "mul",
                lhs: (self.rows, self.cols),
                rhs: (rhs.rows, rhs.cols),
            });
        }

        // index (i, j) of the output is the dot product of row i of self and column j of rhs
        Ok(Matrix::from_cells(
            self.rows,
            rhs.cols,
            iproduct!(0..self.rows, 0..rhs.cols)
                .map(|(i, j)| {
                    (0..self.cols)
                        .map(|k| V::widen_lhs(self.at(i, k)) * V::widen_rhs(rhs.at(k, j)))
                        .sum()
                })
                .collect(),
        ))
    }
}

impl<V, W> ops::Mul<&[W]> for &Matrix<V>
where
    V: Promote<W>,
    W: Element,
{
    type Output = MatrixResult<Vec<Promoted<V, W>>>;

    fn mul(self, rhs: &[W]) -> Self::Output {
        self.eval(rhs)
    }
}

macro_rules! impl_scalar_ops {
    ($($scalar:ty),*) => {
        $(
            impl<V> ops::Mul<$scalar> for &Matrix<V>
            where
                V: Promote<$scalar>,
            {
                type Output = Matrix<Promoted<V, $scalar>>;

                fn mul(self, rhs: $scalar) -> Self::Output {
                    self.scale(rhs)
                }
            }

            impl<V> ops::Div<$scalar> for &Matrix<V>
            where
                V: Promote<$scalar>,
            {
                type Output = Matrix<Promoted<V, $scalar>>;

                fn div(self, rhs: $scalar) -> Self::Output {
                    self.divide(rhs)
                }
            }
        )*
    };
}

impl_scalar_ops!(f32, f64);

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn random_integer_matrix(rows: usize, cols: usize) -> Matrix<f64> {
        let mut rng = rand::thread_rng();
        Matrix::from_list(
            (0..rows)
                .map(|_| (0..cols).map(|_| rng.gen_range(-50..=50) as f64).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_add_then_sub_is_identity() {
        for (rows, cols) in [(1, 1), (2, 3), (4, 4), (5, 2)] {
            let a = random_integer_matrix(rows, cols);
            let b = random_integer_matrix(rows, cols);
            let sum = (&a + &b).unwrap();
            assert_eq!((&sum - &b).unwrap(), a);
        }
    }

    #[test]
    fn test_add_sub_values() {
        let a = Matrix::<f64>::identity(2);
        let b = Matrix::<f64>::from_list(vec![vec![2., 3.], vec![4., 5.]]).unwrap();

        assert_eq!(
            (&a + &b).unwrap().to_list(),
            vec![vec![3., 3.], vec![4., 6.]]
        );
        assert_eq!(
            (&a - &b).unwrap().to_list(),
            vec![vec![-1., -3.], vec![-4., -4.]]
        );
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = Matrix::<f64>::new(2, 3);
        let b = Matrix::<f64>::new(3, 2);

        assert_eq!(
            (&a + &b).unwrap_err(),
            MatrixError::DimensionMismatch {
                op: "add",
                lhs: (2, 3),
                rhs: (3, 2)
            }
        );
        assert!(matches!(
            &a - &b,
            Err(MatrixError::DimensionMismatch { op: "sub", .. })
        ));
        assert!(matches!(
            &a * &a,
            Err(MatrixError::DimensionMismatch { op: "mul", .. })
        ));
        assert!((&a * &b).is_ok());
    }

    #[test]
    fn test_identity_is_neutral() {
        for n in 1..6 {
            let a = random_integer_matrix(n, n);
            let id = Matrix::<f64>::identity(n);
            assert_eq!((&id * &a).unwrap(), a);
            assert_eq!((&a * &id).unwrap(), a);
        }
    }

    #[test]
    fn test_mixed_width_product() {
        let lhs =
            Matrix::<f32>::from_list(vec![vec![1., 2., 3.], vec![4., 5., 6.], vec![7., 8., 9.]])
                .unwrap();
        let rhs = Matrix::<f64>::from_list(vec![
            vec![10., 11., 12.],
            vec![13., 14., 15.],
            vec![16., 17., 18.],
        ])
        .unwrap();

        let out: Matrix<f64> = (&lhs * &rhs).unwrap();
        let expected = Matrix::<f64>::from_list(vec![
            vec![
                1. * 10. + 2. * 13. + 3. * 16.,
                1. * 11. + 2. * 14. + 3. * 17.,
                1. * 12. + 2. * 15. + 3. * 18.,
            ],
            vec![
                4. * 10. + 5. * 13. + 6. * 16.,
                4. * 11. + 5. * 14. + 6. * 17.,
                4. * 12. + 5. * 15. + 6. * 18.,
            ],
            vec![
                7. * 10. + 8. * 13. + 9. * 16.,
                7. * 11. + 8. * 14. + 9. * 17.,
                7. * 12. + 8. * 15. + 9. * 18.,
            ],
        ])
        .unwrap();
        assert_eq!(out, expected);
        assert_eq!(out.to_list()[2], vec![318., 342., 366.]);
    }

    #[test]
    fn test_rectangular_product() {
        let a = Matrix::<f64>::from_list(vec![vec![1., 2., 3.], vec![4., 5., 6.]]).unwrap();
        let b = a.transpose();
        let c = (&a * &b).unwrap();
        assert_eq!(c.to_list(), vec![vec![14., 32.], vec![32., 77.]]);

        let c = (&b * &a).unwrap();
        assert_eq!((c.rows(), c.cols()), (3, 3));
        assert_eq!(c.row(0), [17., 22., 27.]);
    }

    #[test]
    fn test_matrix_vector_product() {
        let a =
            Matrix::<f64>::from_list(vec![vec![1., 2., 3.], vec![4., 5., 6.], vec![7., 8., 9.]])
                .unwrap();
        assert_eq!((&a * &[1f64, 1., 1.][..]).unwrap(), vec![6., 15., 24.]);

        let wide = Matrix::<f64>::from_list(vec![vec![1., 2., 3.]]).unwrap();
        let out: Vec<f64> = wide.eval(&[1f32, 0., 2.]).unwrap();
        assert_eq!(out, vec![7.]);

        assert_eq!(
            a.eval(&[1f64, 1.]).unwrap_err(),
            MatrixError::DimensionMismatch {
                op: "eval",
                lhs: (3, 3),
                rhs: (2, 1)
            }
        );
    }

    #[test]
    fn test_scalar_ops() {
        let a = Matrix::<f32>::from_list(vec![vec![1., -2.], vec![4., 8.]]).unwrap();

        let doubled: Matrix<f32> = &a * 2f32;
        assert_eq!(doubled.to_list(), vec![vec![2., -4.], vec![8., 16.]]);

        let halved: Matrix<f64> = &a / 2f64;
        assert_eq!(halved.to_list(), vec![vec![0.5, -1.], vec![2., 4.]]);

        let infinite = &a / 0f32;
        assert_eq!(infinite[(0, 0)], f32::INFINITY);
        assert_eq!(infinite[(0, 1)], f32::NEG_INFINITY);

        let nan = &Matrix::<f64>::new(1, 1) / 0f64;
        assert!(nan[(0, 0)].is_nan());
    }
}
