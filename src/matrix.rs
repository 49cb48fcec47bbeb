//! Square matrices over the integers and over the prime field.
//!
//! A [`SquareMatrix`] is validated on construction: every row must have as
//! many entries as there are rows.  Integer matrix-vector products accumulate
//! in `i128` with checked arithmetic; field products reduce after every step.

use crate::error::{EngineError, Result};
use crate::Field;

/// An `n × n` matrix stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareMatrix<T> {
    n: usize,
    rows: Vec<Vec<T>>,
}

/// Integer matrix consumed by the Freivalds verifier.
pub type IntMatrix = SquareMatrix<i64>;

/// Matrix of canonical field elements consumed by the determinant engine.
pub type FieldMatrix = SquareMatrix<u64>;

impl<T> SquareMatrix<T> {
    /// Builds a matrix from its rows.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RaggedMatrix`] if any row length differs from
    /// the number of rows.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let n = rows.len();
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != n) {
            return Err(EngineError::RaggedMatrix {
                row,
                expected: n,
                actual: r.len(),
            });
        }
        Ok(Self { n, rows })
    }

    /// Builds a matrix by evaluating `f(i, j)` for every entry.
    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let rows = (0..n).map(|i| (0..n).map(|j| f(i, j)).collect()).collect();
        Self { n, rows }
    }

    /// Returns the dimension `n`.
    pub fn dimension(&self) -> usize {
        self.n
    }

    /// Returns `true` for the `0 × 0` matrix.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Returns all rows.
    pub fn rows(&self) -> &[Vec<T>] {
        &self.rows
    }

    /// Returns row `i`.
    pub fn row(&self, i: usize) -> &[T] {
        &self.rows[i]
    }

    /// Returns the entry at `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.rows[i][j]
    }

    /// Consumes the matrix and returns its rows.
    pub fn into_rows(self) -> Vec<Vec<T>> {
        self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Vec<T>] {
        &mut self.rows
    }

    /// Fails with [`EngineError::DimensionMismatch`] unless `other` has the
    /// same dimension.
    pub fn ensure_same_dimension<U>(&self, other: &SquareMatrix<U>) -> Result<()> {
        if self.n != other.n {
            return Err(EngineError::DimensionMismatch {
                expected: self.n,
                actual: other.n,
            });
        }
        Ok(())
    }

    fn ensure_vector_len(&self, len: usize) -> Result<()> {
        if len != self.n {
            return Err(EngineError::DimensionMismatch {
                expected: self.n,
                actual: len,
            });
        }
        Ok(())
    }
}

impl SquareMatrix<i64> {
    /// Computes `M·v` over the integers without overflow.
    ///
    /// # Errors
    ///
    /// [`EngineError::DimensionMismatch`] if `v` has the wrong length, and
    /// [`EngineError::ArithmeticOverflow`] if an accumulator leaves `i128`.
    pub fn mul_vec(&self, v: &[i128]) -> Result<Vec<i128>> {
        self.ensure_vector_len(v.len())?;
        self.rows
            .iter()
            .map(|row| {
                row.iter().zip(v).try_fold(0i128, |acc, (&m, &x)| {
                    (m as i128)
                        .checked_mul(x)
                        .and_then(|t| acc.checked_add(t))
                        .ok_or(EngineError::ArithmeticOverflow)
                })
            })
            .collect()
    }

    /// Computes the full product `self · other` in `O(n³)`.
    ///
    /// Used as ground truth; the verifiers never form a product.
    pub fn multiply(&self, other: &Self) -> Result<Self> {
        self.ensure_same_dimension(other)?;
        let n = self.n;
        let mut rows = Vec::with_capacity(n);
        for i in 0..n {
            let mut row = Vec::with_capacity(n);
            for j in 0..n {
                let mut acc = 0i64;
                for k in 0..n {
                    acc = self.rows[i][k]
                        .checked_mul(other.rows[k][j])
                        .and_then(|t| acc.checked_add(t))
                        .ok_or(EngineError::ArithmeticOverflow)?;
                }
                row.push(acc);
            }
            rows.push(row);
        }
        Ok(Self { n, rows })
    }

    /// Reduces every entry into the field, lifting negatives by `p`.
    pub fn to_field(&self, field: &Field) -> FieldMatrix {
        SquareMatrix::from_fn(self.n, |i, j| field.from_signed(self.rows[i][j]))
    }
}

impl SquareMatrix<u64> {
    /// The `n × n` identity over the field.
    pub fn identity(n: usize) -> Self {
        SquareMatrix::from_fn(n, |i, j| u64::from(i == j))
    }

    /// Computes `M·v` modulo `p`.
    pub fn mul_vec_mod(&self, field: &Field, v: &[u64]) -> Result<Vec<u64>> {
        self.ensure_vector_len(v.len())?;
        Ok(self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(v)
                    .fold(0u64, |acc, (&m, &x)| field.add(acc, field.mul(m, x)))
            })
            .collect())
    }

    /// Computes `self · other` modulo `p`.
    pub fn multiply_mod(&self, field: &Field, other: &Self) -> Result<Self> {
        self.ensure_same_dimension(other)?;
        Ok(SquareMatrix::from_fn(self.n, |i, j| {
            (0..self.n).fold(0u64, |acc, k| {
                field.add(acc, field.mul(self.rows[i][k], other.rows[k][j]))
            })
        }))
    }

    /// Computes `self − other` entrywise modulo `p`.
    pub fn sub_mod(&self, field: &Field, other: &Self) -> Result<Self> {
        self.ensure_same_dimension(other)?;
        Ok(SquareMatrix::from_fn(self.n, |i, j| {
            field.sub(self.rows[i][j], other.rows[i][j])
        }))
    }
}
