use crate::error::{MatrixError, MatrixResult};
use crate::matrix::element::Element;
use crate::matrix::matrix::Matrix;
use log::{debug, trace};

// `-0.0 == 0.0`, so this maps both zeros to `+0.0`.
#[inline(always)]
fn positive_zero<V: Element>(x: V) -> V {
    if x.is_zero() {
        V::zero()
    } else {
        x
    }
}

impl<V: Element> Matrix<V> {
    fn is_zero_row(&self, i: usize) -> bool {
        self.row(i).iter().all(|x| x.is_zero())
    }

    /// Swaps row r with row r + 1 for every r in order, the last row wrapping
    /// around to row 0. Inversion results depend on this exact schedule.
    fn cycle_rows(&mut self) {
        for r in 0..self.rows {
            self.swap_rows(r, (r + 1) % self.rows);
        }
    }

    /// Bubbles zero rows below non-zero rows until a full pass makes no swap.
    fn sink_zero_rows(&mut self) {
        let mut swapped = true;
        while swapped {
            swapped = false;
            for r in 1..self.rows {
                if self.is_zero_row(r - 1) && !self.is_zero_row(r) {
                    self.swap_rows(r - 1, r);
                    swapped = true;
                }
            }
        }
    }

    /// Makes the first non-zero entry of every row 1 and clears its column in
    /// all other rows.
    fn normalize_leading_entries(&mut self) {
        for r in 0..self.rows {
            let Some(c) = self.row(r).iter().position(|x| !x.is_zero()) else {
                continue;
            };

            let lead = self.at(r, c);
            if lead == V::one() {
                continue;
            }

            for x in self.row_mut(r) {
                *x = *x / lead;
            }

            let pivot_row = self.row(r).to_vec();
            for i in (0..self.rows).filter(|&i| i != r) {
                let factor = self.at(i, c) / pivot_row[c];
                for (x, &p) in self.row_mut(i).iter_mut().zip(pivot_row.iter()) {
                    *x = *x - factor * p;
                }
            }
        }
    }

    /// Reduced row echelon form by Gauss-Jordan elimination.
    ///
    /// Pivots are never searched for: before pivot `i` the rows are cycled by
    /// [`Matrix::cycle_rows`], and a zero at `(i, i)` skips the pivot. Zero tests
    /// are exact.
    pub fn echelon(&self) -> Matrix<V> {
        if self.rows < 2 || self.cols == 0 {
            debug!(
                "{} x {} matrix is trivially in echelon form",
                self.rows, self.cols
            );
            return self.clone();
        }

        let mut result = self.clone();

        for i in 0..self.rows.min(self.cols) {
            result.cycle_rows();

            let pivot = result.at(i, i);
            if pivot.is_zero() {
                trace!("pivot {} is zero, skipping", i);
                continue;
            }
            trace!("pivot {} = {}", i, pivot);

            for x in result.row_mut(i) {
                *x = positive_zero(*x / pivot);
            }

            let pivot_row = result.row(i).to_vec();
            for r in (0..result.rows).filter(|&r| r != i) {
                let k = result.at(r, i);
                for (x, &p) in result.row_mut(r).iter_mut().zip(pivot_row.iter()) {
                    *x = positive_zero(*x - k * p);
                }
            }

            result.sink_zero_rows();
        }

        result.normalize_leading_entries();
        result
    }

    /// Whether every non-zero row leads with a 1 that is alone in its column,
    /// leading columns strictly increase, and zero rows come last.
    pub fn is_rref(&self) -> bool {
        let mut lead = None;

        for i in 0..self.rows {
            let row = self.row(i);
            let pivot_col_opt = row.iter().position(|x| !x.is_zero());

            match pivot_col_opt {
                None => {
                    return (i + 1..self.rows).all(|r| self.is_zero_row(r));
                }
                Some(pivot_col) => {
                    if let Some(prev_lead) = lead {
                        if pivot_col <= prev_lead {
                            return false;
                        }
                    }
                    lead = Some(pivot_col);

                    if row[pivot_col] != V::one() {
                        return false;
                    }

                    if (0..self.rows).any(|r| r != i && !self.at(r, pivot_col).is_zero()) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Inverse by reducing the matrix augmented with the identity and keeping
    /// the right half.
    ///
    /// Only non-square input is rejected. A singular matrix yields a result
    /// that is not an inverse; check `self * inverse` against the identity
    /// when that matters. Expect rounding error, not exact equality.
    pub fn inverse(&self) -> MatrixResult<Matrix<V>> {
        if self.rows != self.cols {
            return Err(MatrixError::NotInvertible {
                rows: self.rows,
                cols: self.cols,
            });
        }

        let n = self.rows;
        debug!("inverting {} x {} matrix", n, n);

        let reduced = self.concat(&Matrix::identity(n))?.echelon();

        Ok(Matrix::from_cells(
            n,
            n,
            reduced
                .iter_rows()
                .flat_map(|row| row[n..].iter().copied())
                .collect(),
        ))
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
