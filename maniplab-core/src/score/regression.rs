//! Standardizing linear regression used by the anomaly-scoring model.
//!
//! Feature counts here are tiny (≤ 6 regressors plus intercept), so the fit
//! goes through the normal equations with a small ridge term on the diagonal
//! to keep a constant or collinear column from making the system singular.

use crate::stats::{mean, population_std};

/// Ridge added to the normal-equation diagonal.
const RIDGE: f64 = 1e-10;

/// Per-column standardization (zero mean, unit variance).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Standardizer {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl Standardizer {
    /// Fit means and population stds column-wise over `rows`.
    ///
    /// Columns with (near-)zero variance get std 1.0 so they standardize to
    /// a constant instead of exploding.
    pub fn fit(rows: &[Vec<f64>], n_cols: usize) -> Self {
        let mut means = Vec::with_capacity(n_cols);
        let mut stds = Vec::with_capacity(n_cols);
        for c in 0..n_cols {
            let col: Vec<f64> = rows.iter().map(|r| r[c]).collect();
            means.push(mean(&col));
            let s = population_std(&col);
            stds.push(if s < 1e-12 { 1.0 } else { s });
        }
        Self { means, stds }
    }

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }

    pub fn n_cols(&self) -> usize {
        self.means.len()
    }
}

/// Ordinary least squares coefficients on standardized regressors.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OlsCoefficients {
    pub intercept: f64,
    pub betas: Vec<f64>,
}

impl OlsCoefficients {
    pub fn predict(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .betas
                .iter()
                .zip(row.iter())
                .map(|(b, x)| b * x)
                .sum::<f64>()
    }
}

/// Fit OLS of `y` on `rows` (already standardized) with an intercept.
///
/// Falls back to an intercept-only model (prediction = mean(y)) if the
/// normal equations cannot be solved even with the ridge term.
pub fn ols_fit(rows: &[Vec<f64>], y: &[f64]) -> OlsCoefficients {
    debug_assert_eq!(rows.len(), y.len());
    let n = rows.len();
    let k = rows.first().map_or(0, |r| r.len());
    let dim = k + 1; // intercept first

    // Build X'X and X'y with the intercept column folded in.
    let mut xtx = vec![vec![0.0; dim]; dim];
    let mut xty = vec![0.0; dim];
    for (row, &yv) in rows.iter().zip(y.iter()) {
        let mut aug = Vec::with_capacity(dim);
        aug.push(1.0);
        aug.extend_from_slice(row);
        for i in 0..dim {
            xty[i] += aug[i] * yv;
            for j in 0..dim {
                xtx[i][j] += aug[i] * aug[j];
            }
        }
    }
    for (i, row) in xtx.iter_mut().enumerate() {
        row[i] += RIDGE * n.max(1) as f64;
    }

    match solve(&mut xtx, &mut xty) {
        Some(beta) => OlsCoefficients {
            intercept: beta[0],
            betas: beta[1..].to_vec(),
        },
        None => OlsCoefficients {
            intercept: mean(y),
            betas: vec![0.0; k],
        },
    }
}

/// Gaussian elimination with partial pivoting. Solves in place.
fn solve(a: &mut [Vec<f64>], b: &mut [f64]) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        // Pivot
        let mut pivot = col;
        for row in col + 1..n {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        if a[pivot][col].abs() < 1e-14 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for c in col..n {
                a[row][c] -= factor * a[col][c];
            }
            b[row] -= factor * b[col];
        }
    }

    // Back substitution
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut acc = b[row];
        for c in row + 1..n {
            acc -= a[row][c] * x[c];
        }
        x[row] = acc / a[row][row];
    }
    Some(x)
}
