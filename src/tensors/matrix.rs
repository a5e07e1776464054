use std::{
    fmt::Display,
    ops::{Index, IndexMut},
};

use smallvec::SmallVec;
use thiserror::Error;

use crate::printer::{MatrixPrinter, VectorPrinter};

/// An n-dimensional vector of reals, for example the solution of a linear system.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Vector {
    pub(crate) data: Vec<f64>,
}

impl Vector {
    /// Create a new vector from a list of scalars.
    pub fn new(data: Vec<f64>) -> Vector {
        Vector { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.data.iter()
    }

    /// Return true iff both vectors have the same dimension and all entries
    /// differ by at most `tolerance`.
    pub fn approx_eq(&self, other: &Vector, tolerance: f64) -> bool {
        self.data.len() == other.data.len()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

impl From<Vec<f64>> for Vector {
    fn from(data: Vec<f64>) -> Self {
        Vector { data }
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    /// Get the `i`th entry of the vector.
    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<usize> for Vector {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.data[index]
    }
}

impl Display for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        VectorPrinter::new(self).fmt(f)
    }
}

/// Errors that can occur when building or reducing a matrix.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatrixError {
    #[error("Could not allocate a {nrows}x{ncols} matrix")]
    Allocation { nrows: usize, ncols: usize },
    #[error("Data length does not match matrix dimensions: {len} vs ({nrows},{ncols})")]
    ShapeMismatch {
        len: usize,
        nrows: usize,
        ncols: usize,
    },
    #[error("Matrix is not rectangular: row {row} has {found} entries instead of {expected}")]
    NotRectangular {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Expected an augmented n x (n+1) matrix, got {nrows}x{ncols}")]
    NotAugmented { nrows: usize, ncols: usize },
}

/// A dense real matrix in row-major order.
///
/// Rows are addressed through a row-order table, so that [`Matrix::swap_rows`]
/// only exchanges two indices and never moves row data.
#[derive(Clone, Debug)]
pub struct Matrix {
    pub(crate) data: Vec<f64>,
    pub(crate) row_order: SmallVec<[usize; 16]>,
    pub(crate) nrows: usize,
    pub(crate) ncols: usize,
}

impl Matrix {
    /// Create a new zeroed matrix with `nrows` rows and `ncols` columns.
    ///
    /// The buffer is reserved fallibly, so that a matrix that does not fit
    /// in memory yields [`MatrixError::Allocation`] instead of aborting.
    pub fn new(nrows: usize, ncols: usize) -> Result<Matrix, MatrixError> {
        let len = nrows
            .checked_mul(ncols)
            .ok_or(MatrixError::Allocation { nrows, ncols })?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| MatrixError::Allocation { nrows, ncols })?;
        data.resize(len, 0.);

        let mut row_order = SmallVec::new();
        row_order
            .try_reserve_exact(nrows)
            .map_err(|_| MatrixError::Allocation { nrows, ncols })?;
        row_order.extend(0..nrows);

        Ok(Matrix {
            data,
            row_order,
            nrows,
            ncols,
        })
    }

    /// Convert a linear row-major representation of a matrix to a `Matrix`.
    pub fn from_linear(data: Vec<f64>, nrows: usize, ncols: usize) -> Result<Matrix, MatrixError> {
        if Some(data.len()) != nrows.checked_mul(ncols) {
            return Err(MatrixError::ShapeMismatch {
                len: data.len(),
                nrows,
                ncols,
            });
        }

        Ok(Matrix {
            data,
            row_order: (0..nrows).collect(),
            nrows,
            ncols,
        })
    }

    /// Create a new matrix from a 2-dimensional vector of scalars.
    pub fn from_nested_vec(matrix: Vec<Vec<f64>>) -> Result<Matrix, MatrixError> {
        let nrows = matrix.len();
        let ncols = matrix.first().map(|r| r.len()).unwrap_or(0);

        let mut data = Vec::with_capacity(nrows * ncols);
        for (row, d) in matrix.into_iter().enumerate() {
            if d.len() != ncols {
                return Err(MatrixError::NotRectangular {
                    row,
                    expected: ncols,
                    found: d.len(),
                });
            }

            data.extend(d);
        }

        Matrix::from_linear(data, nrows, ncols)
    }

    /// Create the augmented matrix `[a | b]` of the system `a * x = b`.
    pub fn augmented(a: &Matrix, b: &Vector) -> Result<Matrix, MatrixError> {
        if a.nrows != b.len() {
            return Err(MatrixError::ShapeMismatch {
                len: b.len(),
                nrows: a.nrows,
                ncols: 1,
            });
        }

        let mut m = Matrix::new(a.nrows, a.ncols + 1)?;
        for r in 0..a.nrows {
            m.row_mut(r)[..a.ncols].copy_from_slice(a.row(r));
            m[(r, a.ncols)] = b[r];
        }

        Ok(m)
    }

    /// Return the number of rows.
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Return the number of columns.
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Return the number of unknowns if the matrix is an augmented
    /// `n x (n+1)` system.
    pub fn system_size(&self) -> Result<usize, MatrixError> {
        if self.ncols != self.nrows + 1 {
            return Err(MatrixError::NotAugmented {
                nrows: self.nrows,
                ncols: self.ncols,
            });
        }

        Ok(self.nrows)
    }

    #[inline]
    fn offset(&self, row: usize) -> usize {
        self.row_order[row] * self.ncols
    }

    /// Get the `row`th row of the matrix.
    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        let o = self.offset(row);
        &self.data[o..o + self.ncols]
    }

    /// Get the `row`th row of the matrix mutably.
    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let o = self.offset(row);
        let ncols = self.ncols;
        &mut self.data[o..o + ncols]
    }

    /// Return an iterator over the rows of the matrix, in their current order.
    pub fn row_iter(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.nrows).map(move |r| self.row(r))
    }

    /// Swap two rows. Only the row-order table is touched.
    #[inline]
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        self.row_order.swap(a, b);
    }

    /// Swap two columns in every row.
    pub fn swap_columns(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }

        for r in 0..self.nrows {
            self.row_mut(r).swap(a, b);
        }
    }

    /// Set every entry of column `col` to zero.
    pub fn zero_column(&mut self, col: usize) {
        for r in 0..self.nrows {
            self.row_mut(r)[col] = 0.;
        }
    }

    /// Subtract `factor` times row `source` from row `target`, starting at
    /// column `from`. The entry at column `from` is set to exactly zero.
    pub(crate) fn sub_scaled_row(&mut self, target: usize, source: usize, factor: f64, from: usize) {
        let (t, s) = (self.offset(target), self.offset(source));
        self.data[t + from] = 0.;
        for l in from + 1..self.ncols {
            let e = self.data[s + l];
            self.data[t + l] -= factor * e;
        }
    }

    /// Copy the entries in row order into a new linear buffer.
    pub fn to_linear(&self) -> Vec<f64> {
        self.row_iter().flatten().copied().collect()
    }

    /// Return true iff both matrices have the same shape and all entries
    /// differ by at most `tolerance`.
    pub fn approx_eq(&self, other: &Matrix, tolerance: f64) -> bool {
        self.nrows == other.nrows
            && self.ncols == other.ncols
            && self
                .row_iter()
                .zip(other.row_iter())
                .all(|(r1, r2)| r1.iter().zip(r2).all(|(a, b)| (a - b).abs() <= tolerance))
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.nrows == other.nrows
            && self.ncols == other.ncols
            && self.row_iter().zip(other.row_iter()).all(|(a, b)| a == b)
    }
}

impl Index<usize> for Matrix {
    type Output = [f64];

    /// Get the `index`th row of the matrix.
    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        self.row(index)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    /// Get the `i`th row and `j`th column of the matrix, where `index=(i,j)`.
    #[inline]
    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.data[self.offset(index.0) + index.1]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    /// Get the `i`th row and `j`th column of the matrix, where `index=(i,j)`.
    #[inline]
    fn index_mut(&mut self, index: (usize, usize)) -> &mut f64 {
        let o = self.offset(index.0);
        &mut self.data[o + index.1]
    }
}

impl Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        MatrixPrinter::new(self).fmt(f)
    }
}
