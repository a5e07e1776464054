//! Gauss and Jordan reduction of augmented `n x (n+1)` systems, and
//! the extraction of a solution from the reduced matrix.
//!
//! Rank deficiency is never an error: it is reported as a [Classification]
//! of the system.
//!
//! ```
//! use numkit::tensors::{
//!     elimination::{Classification, EliminationOptions, Method},
//!     matrix::Matrix,
//! };
//!
//! let m = Matrix::from_linear(vec![2., 1., 5., 1., 3., 10.], 2, 3).unwrap();
//! let reduction = m.reduce(Method::Jordan, &EliminationOptions::default()).unwrap();
//! let solution = reduction.solve();
//!
//! assert_eq!(solution.classification, Classification::Determined);
//! assert!((solution.values[0] - 1.).abs() < 1e-12);
//! assert!((solution.values[1] - 3.).abs() < 1e-12);
//! ```

use std::fmt::Display;

use smallvec::SmallVec;
use tracing::{debug, instrument};

use super::matrix::{Matrix, MatrixError, Vector};

/// The kind of solution set of a linear system.
///
/// The variants are ordered by severity, so that the classification of
/// a system with several degenerate rows is the maximum over the rows:
/// an incompatible row dominates an undetermined one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Classification {
    /// Exactly one solution.
    Determined,
    /// Infinitely many solutions.
    Undetermined,
    /// No solution.
    Incompatible,
}

impl Classification {
    /// Combine the diagnosis of two parts of the same system.
    #[inline]
    pub fn combine(self, other: Classification) -> Classification {
        self.max(other)
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Determined => f.write_str("determined"),
            Classification::Undetermined => f.write_str("undetermined (infinitely many solutions)"),
            Classification::Incompatible => f.write_str("incompatible (no solution)"),
        }
    }
}

/// The elimination variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// Forward elimination to an upper triangular (row echelon) form,
    /// followed by back substitution.
    Gauss,
    /// Elimination above and below every pivot to a diagonal form.
    Jordan,
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Gauss => f.write_str("Gauss"),
            Method::Jordan => f.write_str("Gauss-Jordan"),
        }
    }
}

/// Settings of the elimination engine.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EliminationOptions {
    /// Entries with an absolute value at or below this threshold are treated as zero.
    pub zero_tolerance: f64,
    /// Keep a copy of the matrix after every pivot step.
    pub record_steps: bool,
}

impl Default for EliminationOptions {
    fn default() -> Self {
        EliminationOptions {
            zero_tolerance: 1e-12,
            record_steps: false,
        }
    }
}

/// What happened at a pivot step.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PivotAction {
    /// The pivot was nonzero and its column was eliminated.
    Eliminated,
    /// The pivot was zero; it was swapped with `row` and then eliminated.
    RowSwapped { row: usize },
    /// The pivot was zero; it was swapped with `column` and then eliminated.
    ColumnSwapped { column: usize },
    /// No pivot exists in this column: the column was cleared and its unknown is free.
    ColumnZeroed,
    /// No pivot exists in this column: it is left as-is.
    Skipped,
}

/// A snapshot of the matrix after a pivot step.
#[derive(Debug, Clone, PartialEq)]
pub struct ReductionStep {
    pub row: usize,
    pub column: usize,
    pub action: PivotAction,
    pub matrix: Matrix,
}

/// The order of the unknowns after column swaps: column `i` of the reduced
/// matrix holds the unknown `self[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation(SmallVec<[usize; 16]>);

impl Permutation {
    pub fn identity(n: usize) -> Permutation {
        Permutation((0..n).collect())
    }

    #[inline]
    pub fn swap(&mut self, a: usize, b: usize) {
        self.0.swap(a, b);
    }

    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, p)| i == *p)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Map values given per column back to the original unknowns.
    pub fn unpermute(&self, values: &[f64]) -> Vec<f64> {
        let mut res = vec![0.; values.len()];
        for (v, p) in values.iter().zip(&self.0) {
            res[*p] = *v;
        }
        res
    }
}

impl std::ops::Index<usize> for Permutation {
    type Output = usize;

    fn index(&self, index: usize) -> &usize {
        &self.0[index]
    }
}

/// The solution of a linear system, in the order of the original unknowns.
/// Free unknowns are set to `0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub classification: Classification,
    pub values: Vector,
}

/// An augmented matrix after Gauss or Jordan reduction.
#[derive(Debug, Clone)]
pub struct Reduction {
    pub method: Method,
    pub matrix: Matrix,
    pub permutation: Permutation,
    pub steps: Vec<ReductionStep>,
    zero_tolerance: f64,
}

impl Reduction {
    /// Extract the solution from the reduced matrix, using back substitution
    /// after Gauss or the diagonal after Jordan.
    pub fn solve(&self) -> Solution {
        match self.method {
            Method::Gauss => self.matrix.back_substitute(self.zero_tolerance),
            Method::Jordan => self
                .matrix
                .solve_diagonal(&self.permutation, self.zero_tolerance),
        }
    }
}

impl Matrix {
    /// Reduce the augmented system in place with the given method.
    pub fn reduce(
        mut self,
        method: Method,
        options: &EliminationOptions,
    ) -> Result<Reduction, MatrixError> {
        let (permutation, steps) = match method {
            Method::Gauss => {
                let steps = self.gauss_reduce(options)?;
                (Permutation::identity(self.nrows), steps)
            }
            Method::Jordan => self.jordan_reduce(options)?,
        };

        Ok(Reduction {
            method,
            matrix: self,
            permutation,
            steps,
            zero_tolerance: options.zero_tolerance,
        })
    }

    /// Write the augmented system in row echelon form, using the first nonzero
    /// entry below a zero pivot as the new pivot.
    ///
    /// A column without a pivot is left as-is and does not consume a row, so
    /// that every nonzero row of the result has a distinct leading column.
    #[instrument(level = "debug", skip_all, fields(n = self.nrows))]
    pub fn gauss_reduce(
        &mut self,
        options: &EliminationOptions,
    ) -> Result<Vec<ReductionStep>, MatrixError> {
        let n = self.system_size()?;
        let tol = options.zero_tolerance;
        let mut steps = vec![];

        let mut i = 0;
        for j in 0..n {
            if i + 1 >= n {
                break;
            }

            let mut action = PivotAction::Eliminated;
            if self[(i, j)].abs() <= tol {
                // select a nonzero pivot
                if let Some(k) = (i + 1..n).find(|&k| self[(k, j)].abs() > tol) {
                    self.swap_rows(i, k);
                    action = PivotAction::RowSwapped { row: k };
                } else {
                    debug!("No pivot in column {}", j);
                    if options.record_steps {
                        steps.push(self.snapshot(i, j, PivotAction::Skipped));
                    }
                    continue;
                }
            }

            self.eliminate_column(i, j, i + 1..n, tol);

            if options.record_steps {
                steps.push(self.snapshot(i, j, action));
            }
            i += 1;
        }

        Ok(steps)
    }

    /// Write the augmented system in diagonal form.
    ///
    /// A zero pivot is replaced by the first nonzero entry below it. If there
    /// is none, the first nonzero entry to its right is moved in by a column
    /// swap, which is recorded in the returned [Permutation]. If the row has no
    /// nonzero coefficient left either, the column is cleared and its unknown
    /// is free.
    #[instrument(level = "debug", skip_all, fields(n = self.nrows))]
    pub fn jordan_reduce(
        &mut self,
        options: &EliminationOptions,
    ) -> Result<(Permutation, Vec<ReductionStep>), MatrixError> {
        let n = self.system_size()?;
        let tol = options.zero_tolerance;
        let mut permutation = Permutation::identity(n);
        let mut steps = vec![];

        for i in 0..n {
            let mut action = PivotAction::Eliminated;
            if self[(i, i)].abs() <= tol {
                if let Some(k) = (i + 1..n).find(|&k| self[(k, i)].abs() > tol) {
                    self.swap_rows(i, k);
                    action = PivotAction::RowSwapped { row: k };
                } else if let Some(c) = (i + 1..n).find(|&c| self[(i, c)].abs() > tol) {
                    self.swap_columns(i, c);
                    permutation.swap(i, c);
                    action = PivotAction::ColumnSwapped { column: c };
                } else {
                    debug!("Unknown {} is free", permutation[i]);
                    self.zero_column(i);
                    if options.record_steps {
                        steps.push(self.snapshot(i, i, PivotAction::ColumnZeroed));
                    }
                    continue;
                }
            }

            self.eliminate_column(i, i, (0..n).filter(|&k| k != i), tol);

            if options.record_steps {
                steps.push(self.snapshot(i, i, action));
            }
        }

        Ok((permutation, steps))
    }

    /// Use the pivot at `(row, col)` to clear column `col` in `targets`.
    fn eliminate_column(
        &mut self,
        row: usize,
        col: usize,
        targets: impl Iterator<Item = usize>,
        tol: f64,
    ) {
        let pivot = self[(row, col)];
        for k in targets {
            let e = self[(k, col)];
            if e == 0. {
                continue;
            }
            if e.abs() <= tol {
                self[(k, col)] = 0.;
                continue;
            }

            self.sub_scaled_row(k, row, e / pivot, col);
        }
    }

    fn snapshot(&self, row: usize, column: usize, action: PivotAction) -> ReductionStep {
        ReductionStep {
            row,
            column,
            action,
            matrix: self.clone(),
        }
    }

    /// Solve a system in row echelon form by back substitution.
    ///
    /// A row without a nonzero coefficient makes the system incompatible if its
    /// constant is nonzero. Unknowns that do not lead any row are free and are set to `0`.
    pub fn back_substitute(&self, zero_tolerance: f64) -> Solution {
        let n = self.nrows;
        let last = self.ncols - 1;
        let mut classification = Classification::Determined;
        let mut values = vec![0.; last];
        let mut determined = vec![false; last];

        for i in (0..n).rev() {
            let row = self.row(i);
            match (0..last).find(|&c| row[c].abs() > zero_tolerance) {
                Some(c) => {
                    let mut acc = row[last];
                    for k in c + 1..last {
                        acc -= row[k] * values[k];
                    }
                    values[c] = acc / row[c];
                    determined[c] = true;
                }
                None => {
                    if row[last].abs() > zero_tolerance {
                        debug!("Row {} reads 0 = {}", i, row[last]);
                        classification = classification.combine(Classification::Incompatible);
                    }
                }
            }
        }

        if determined.iter().any(|d| !d) {
            classification = classification.combine(Classification::Undetermined);
        }

        Solution {
            classification,
            values: Vector::new(values),
        }
    }

    /// Solve a system in diagonal form, where column `i` holds the unknown
    /// `permutation[i]`.
    pub fn solve_diagonal(&self, permutation: &Permutation, zero_tolerance: f64) -> Solution {
        let n = self.nrows;
        let last = self.ncols - 1;
        let mut classification = Classification::Determined;
        let mut values = vec![0.; n];

        for (i, v) in values.iter_mut().enumerate() {
            let (d, b) = (self[(i, i)], self[(i, last)]);
            if d.abs() <= zero_tolerance {
                let c = if b.abs() <= zero_tolerance {
                    Classification::Undetermined
                } else {
                    Classification::Incompatible
                };
                classification = classification.combine(c);
            } else {
                *v = b / d;
            }
        }

        Solution {
            classification,
            values: Vector::new(permutation.unpermute(&values)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Classification, EliminationOptions, Method, PivotAction};
    use crate::tensors::matrix::Matrix;

    fn solve(data: Vec<f64>, n: usize, method: Method) -> super::Solution {
        Matrix::from_linear(data, n, n + 1)
            .unwrap()
            .reduce(method, &EliminationOptions::default())
            .unwrap()
            .solve()
    }

    #[test]
    fn determined() {
        for method in [Method::Gauss, Method::Jordan] {
            let s = solve(vec![2., 1., 5., 1., 3., 10.], 2, method);
            assert_eq!(s.classification, Classification::Determined);
            assert!((s.values[0] - 1.).abs() < 1e-12);
            assert!((s.values[1] - 3.).abs() < 1e-12);
        }
    }

    #[test]
    fn incompatible() {
        for method in [Method::Gauss, Method::Jordan] {
            let s = solve(vec![1., 1., 1., 1., 1., 2.], 2, method);
            assert_eq!(s.classification, Classification::Incompatible);
        }
    }

    #[test]
    fn undetermined() {
        for method in [Method::Gauss, Method::Jordan] {
            let s = solve(vec![1., 1., 2., 2., 2., 4.], 2, method);
            assert_eq!(s.classification, Classification::Undetermined);
        }
    }

    #[test]
    fn incompatible_dominates() {
        // x + y + z = 1, 0 = 0, 0 = 1
        for method in [Method::Gauss, Method::Jordan] {
            let s = solve(
                vec![1., 1., 1., 1., 2., 2., 2., 2., 3., 3., 3., 4.],
                3,
                method,
            );
            assert_eq!(s.classification, Classification::Incompatible);
        }

        assert_eq!(
            Classification::Undetermined.combine(Classification::Incompatible),
            Classification::Incompatible
        );
        assert_eq!(
            Classification::Determined.combine(Classification::Undetermined),
            Classification::Undetermined
        );
    }

    #[test]
    fn gauss_row_swap() {
        let m = Matrix::from_linear(vec![0., 1., 3., 2., 1., 5.], 2, 3).unwrap();
        let opts = EliminationOptions {
            record_steps: true,
            ..Default::default()
        };
        let r = m.reduce(Method::Gauss, &opts).unwrap();

        assert_eq!(r.steps.len(), 1);
        assert_eq!(r.steps[0].action, PivotAction::RowSwapped { row: 1 });
        assert_eq!(r.matrix.to_linear(), vec![2., 1., 5., 0., 1., 3.]);

        let s = r.solve();
        assert_eq!(s.classification, Classification::Determined);
        assert_eq!(s.values.as_slice(), &[1., 3.]);
    }

    #[test]
    fn gauss_skips_column_without_pivot() {
        // y = 1, z = 1, x free
        let m = Matrix::from_linear(
            vec![0., 1., 0., 1., 0., 0., 0., 0., 0., 0., 1., 1.],
            3,
            4,
        )
        .unwrap();
        let opts = EliminationOptions {
            record_steps: true,
            ..Default::default()
        };
        let r = m.reduce(Method::Gauss, &opts).unwrap();

        assert_eq!(r.steps[0].action, PivotAction::Skipped);
        let s = r.solve();
        assert_eq!(s.classification, Classification::Undetermined);
        assert_eq!(s.values.as_slice(), &[0., 1., 1.]);
    }

    #[test]
    fn jordan_column_swap() {
        // y + z = 3, y = 1, 2y = 2: x is free, z = 2
        let m = Matrix::from_linear(
            vec![0., 1., 1., 3., 0., 1., 0., 1., 0., 2., 0., 2.],
            3,
            4,
        )
        .unwrap();
        let opts = EliminationOptions {
            record_steps: true,
            ..Default::default()
        };
        let r = m.reduce(Method::Jordan, &opts).unwrap();

        assert_eq!(r.steps[0].action, PivotAction::ColumnSwapped { column: 1 });
        assert_eq!(r.permutation.as_slice(), &[1, 2, 0]);
        assert!(!r.permutation.is_identity());

        let s = r.solve();
        assert_eq!(s.classification, Classification::Undetermined);
        assert!(s.values.approx_eq(&vec![0., 1., 2.].into(), 1e-12));

        let g = Matrix::from_linear(
            vec![0., 1., 1., 3., 0., 1., 0., 1., 0., 2., 0., 2.],
            3,
            4,
        )
        .unwrap()
        .reduce(Method::Gauss, &EliminationOptions::default())
        .unwrap()
        .solve();
        assert_eq!(g.classification, Classification::Undetermined);
        assert!(g.values.approx_eq(&s.values, 1e-12));
    }

    #[test]
    fn jordan_zeroes_free_column() {
        let m = Matrix::from_linear(vec![0., 0., 0., 0., 1., 1.], 2, 3).unwrap();
        let opts = EliminationOptions {
            record_steps: true,
            ..Default::default()
        };
        let r = m.reduce(Method::Jordan, &opts).unwrap();

        assert_eq!(r.steps[0].action, PivotAction::ColumnZeroed);
        assert_eq!(r.steps[1].action, PivotAction::Eliminated);
        assert_eq!(r.solve().classification, Classification::Undetermined);
    }

    #[test]
    fn jordan_is_idempotent() {
        let mut m = Matrix::from_linear(
            vec![2., 0., 0., 4., 0., -1., 0., 3., 0., 0., 5., 10.],
            3,
            4,
        )
        .unwrap();
        let before = m.clone();

        let (p, _) = m.jordan_reduce(&EliminationOptions::default()).unwrap();
        assert!(p.is_identity());
        assert_eq!(m, before);

        let mut m = Matrix::from_linear(vec![2., 1., 5., 1., 3., 10.], 2, 3).unwrap();
        m.jordan_reduce(&EliminationOptions::default()).unwrap();
        let once = m.clone();
        m.jordan_reduce(&EliminationOptions::default()).unwrap();
        assert!(m.approx_eq(&once, 1e-12));
    }

    #[test]
    fn not_augmented() {
        let m = Matrix::from_linear(vec![1., 2., 3., 4.], 2, 2).unwrap();
        assert!(m.reduce(Method::Gauss, &EliminationOptions::default()).is_err());
    }

    #[test]
    fn single_unknown() {
        for method in [Method::Gauss, Method::Jordan] {
            let s = solve(vec![4., 2.], 1, method);
            assert_eq!(s.classification, Classification::Determined);
            assert_eq!(s.values.as_slice(), &[0.5]);

            assert_eq!(
                solve(vec![0., 2.], 1, method).classification,
                Classification::Incompatible
            );
            assert_eq!(
                solve(vec![0., 0.], 1, method).classification,
                Classification::Undetermined
            );
        }
    }
}
