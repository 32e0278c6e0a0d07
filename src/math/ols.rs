//! Weighted least squares solver.
//!
//! Timing residuals are "post-fit": after every change to the TOAs we remove
//! the best-fitting timing model, which is linear in its parameters:
//!
//! ```text
//! minimize Σ w_i (y_i - x_i^T β)^2,   w_i = 1 / σ_i^2
//! ```
//!
//! Implementation choices:
//! - We scale rows by `sqrt(w_i)` and solve an ordinary least squares problem.
//! - SVD handles tall design matrices (many TOAs, few parameters) and
//!   degrades gracefully when columns are nearly collinear (short spans).

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Weighted fit of `y` against `design` (rows = observations).
///
/// `sigma` holds per-row standard deviations; non-positive values are given
/// unit weight.
pub fn weighted_least_squares(design: &DMatrix<f64>, y: &[f64], sigma: &[f64]) -> Option<DVector<f64>> {
    let n = design.nrows();
    if y.len() != n || sigma.len() != n || n == 0 {
        return None;
    }

    let mut x = design.clone();
    let mut rhs = DVector::from_column_slice(y);
    for i in 0..n {
        let w = if sigma[i] > 0.0 && sigma[i].is_finite() { 1.0 / sigma[i] } else { 1.0 };
        x.row_mut(i).scale_mut(w);
        rhs[i] *= w;
    }

    solve_least_squares(&x, &rhs)
}

/// `y - design · β` for the weighted best fit; `y` unchanged if the fit fails.
pub fn fit_residuals(design: &DMatrix<f64>, y: &[f64], sigma: &[f64]) -> Vec<f64> {
    match weighted_least_squares(design, y, sigma) {
        Some(beta) => {
            let model = design * beta;
            y.iter().zip(model.iter()).map(|(obs, fit)| obs - fit).collect()
        }
        None => y.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn weights_pull_fit_toward_precise_points() {
        // Constant model on two points; the precise one dominates.
        let x = DMatrix::from_row_slice(2, 1, &[1.0, 1.0]);
        let beta = weighted_least_squares(&x, &[0.0, 10.0], &[0.01, 10.0]).unwrap();
        assert!(beta[0] < 0.01, "fit should sit near the precise point, got {}", beta[0]);
    }

    #[test]
    fn residuals_of_exact_model_vanish() {
        let t = [0.0_f64, 1.0, 2.0, 3.0];
        let design = DMatrix::from_fn(4, 3, |i, j| t[i].powi(j as i32));
        let y: Vec<f64> = t.iter().map(|&v| 1.0 - 2.0 * v + 0.5 * v * v).collect();
        let res = fit_residuals(&design, &y, &[1.0; 4]);
        assert!(res.iter().all(|r| r.abs() < 1e-9), "{res:?}");
    }
}
