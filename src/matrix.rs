//! Dense row-major `f64` matrix used for data, distance and kernel matrices.
//!
//! Rows are samples and columns are dimensions, so a one-dimensional input of
//! `n` observations is an `(n, 1)` column.

use crate::error::{HyppoError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if rows * cols != data.len() {
            return Err(HyppoError::Shape {
                rows,
                cols,
                len: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    /// Single-column matrix, the shape of a one-dimensional sample.
    pub fn column(values: &[f64]) -> Self {
        Self {
            rows: values.len(),
            cols: 1,
            data: values.to_vec(),
        }
    }

    /// Build from a list of rows; every row must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for r in rows {
            if r.len() != cols {
                return Err(HyppoError::Shape {
                    rows: rows.len(),
                    cols,
                    len: data.len() + r.len(),
                });
            }
            data.extend_from_slice(r);
        }
        Self::new(rows.len(), cols, data)
    }

    /// Build by evaluating `f(i, j)` for every entry.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Self { rows, cols, data }
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn col(&self, j: usize) -> Vec<f64> {
        (0..self.rows).map(|i| self[(i, j)]).collect()
    }

    pub fn rows_iter(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on 0
        self.data.chunks_exact(self.cols.max(1)).take(self.rows)
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn row_sums(&self) -> Vec<f64> {
        self.rows_iter().map(|r| r.iter().sum()).collect()
    }

    pub fn col_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.cols];
        for r in self.rows_iter() {
            for (s, v) in sums.iter_mut().zip(r) {
                *s += v;
            }
        }
        sums
    }

    /// Population variance over every entry.
    pub fn variance(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let n = self.data.len() as f64;
        let mean = self.sum() / n;
        self.data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Sum of the elementwise product with `other`.
    pub fn frobenius_dot(&self, other: &Matrix) -> f64 {
        self.data.iter().zip(&other.data).map(|(a, b)| a * b).sum()
    }

    /// Rows reordered so that row `i` of the result is row `idx[i]` of `self`.
    pub fn select_rows(&self, idx: &[usize]) -> Self {
        let mut data = Vec::with_capacity(idx.len() * self.cols);
        for &i in idx {
            data.extend_from_slice(self.row(i));
        }
        Self {
            rows: idx.len(),
            cols: self.cols,
            data,
        }
    }

    /// Columns `cols` of every row.
    pub fn select_cols(&self, cols: &[usize]) -> Self {
        Self::from_fn(self.rows, cols.len(), |i, j| self[(i, cols[j])])
    }

    /// Symmetric reorder of a square matrix: entry `(i, j)` becomes
    /// `self[(idx[i], idx[j])]`.
    pub fn permute_square(&self, idx: &[usize]) -> Self {
        Self::from_fn(idx.len(), idx.len(), |i, j| self[(idx[i], idx[j])])
    }

    pub fn hstack(&self, other: &Matrix) -> Result<Self> {
        if self.rows != other.rows {
            return Err(HyppoError::SampleMismatch {
                x: self.rows,
                y: other.rows,
            });
        }
        let mut data = Vec::with_capacity(self.data.len() + other.data.len());
        for i in 0..self.rows {
            data.extend_from_slice(self.row(i));
            data.extend_from_slice(other.row(i));
        }
        Self::new(self.rows, self.cols + other.cols, data)
    }

    pub fn vstack(blocks: &[Matrix]) -> Result<Self> {
        let cols = blocks.first().map(|m| m.cols).unwrap_or(0);
        let mut data = Vec::new();
        let mut rows = 0;
        for m in blocks {
            if m.cols != cols {
                return Err(HyppoError::DimensionMismatch {
                    expected: cols,
                    got: m.cols,
                });
            }
            data.extend_from_slice(&m.data);
            rows += m.rows;
        }
        Self::new(rows, cols, data)
    }
}

/// Column-major copy for the linear algebra in the parametric tests.
impl From<&Matrix> for DMatrix<f64> {
    fn from(m: &Matrix) -> Self {
        DMatrix::from_row_slice(m.rows, m.cols, &m.data)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.cols + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_row_major_to_dmatrix() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let d = DMatrix::<f64>::from(&m);
        assert_eq!(d.shape(), (2, 3));
        assert_eq!(d[(0, 2)], 3.0);
        assert_eq!(d[(1, 0)], 4.0);
    }

    #[test]
    fn permute_square_moves_rows_and_cols() {
        let m = Matrix::from_rows(&[vec![0.0, 1.0], vec![2.0, 3.0]]).unwrap();
        let p = m.permute_square(&[1, 0]);
        assert_eq!(p.as_slice(), &[3.0, 2.0, 1.0, 0.0]);
    }
}
