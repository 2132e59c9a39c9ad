use rand::Rng;
use std::f64::consts::PI;

use crate::error::{NetworkError, Result};

/// Row-major dense matrix. Layers store their weights as `size × fan_in`,
/// so row `j` holds the incoming weights of neuron `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    /// Both u1 and u2 must be uniform on (0, 1].
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Draw two independent uniform samples in (0, 1] to avoid log(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// He initialization: samples from N(0, sqrt(2 / cols)).
    ///
    /// Used for ELU hidden layers. The variance 2/fan_in keeps activation
    /// variance roughly constant from layer to layer.
    ///
    /// Shape: (rows, cols). `cols` is the fan-in (number of input connections).
    pub fn he<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let std_dev = (2.0 / cols as f64).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    /// Xavier initialization, uniform variant: samples from
    /// U[-1/sqrt(cols), 1/sqrt(cols)).
    ///
    /// Used for the sigmoid output layer, keeping pre-activations inside the
    /// region where the sigmoid gradient is largest.
    ///
    /// Shape: (rows, cols). `cols` is the fan-in (number of input connections).
    pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let bound = 1.0 / (cols as f64).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = rng.gen_range(-bound..bound);
            }
        }
        res
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, |row| row.len()),
            data
        }
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i]
    }

    /// `self -= scale * rhs`, element-wise.
    /// `self -= scale * rhs`, element-wise.
    pub fn sub_scaled(&mut self, rhs: &Matrix, scale: f64) -> Result<()> {
        if self.rows != rhs.rows {
            return Err(NetworkError::DimensionMismatch { what: "matrix rows", expected: self.rows, actual: rhs.rows });
        }
        if self.cols != rhs.cols {
            return Err(NetworkError::DimensionMismatch { what: "matrix columns", expected: self.cols, actual: rhs.cols });
        }

        for (row, rhs_row) in self.data.iter_mut().zip(rhs.data.iter()) {
            for (x, d) in row.iter_mut().zip(rhs_row.iter()) {
                *x -= scale * d;
            }
        }
        Ok(())
    }

    pub fn fill(&mut self, value: f64) {
        for row in &mut self.data {
            row.iter_mut().for_each(|x| *x = value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.data.iter().flat_map(|row| row.iter())
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}
