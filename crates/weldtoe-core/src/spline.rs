//! Natural cubic smoothing spline evaluated at the data abscissae.
//!
//! Reinsch formulation: for a penalty weight `α`, the smoothed ordinates are
//! `f = y − α·Qγ` where `(R + α·QᵀQ)γ = Qᵀy`, with `R` the tridiagonal
//! roughness matrix and `Qᵀ` the banded second-divided-difference operator.
//! The smoothing factor exposed to callers is a residual budget `S`: `α` is
//! bisected until the sum of squared residuals `‖y − f‖²` reaches `S`. The
//! residual is monotone in `α`, from 0 (interpolation) up to the residual of
//! the limiting straight-line fit; a budget above that limit yields the
//! limit solution.
//!
//! The pentadiagonal system is symmetric positive definite and solved with a
//! bandwidth-2 Cholesky factorization in O(n).

use crate::error::EvalError;

const ALPHA_LO: f64 = 1.0e-12;
const ALPHA_HI_CAP: f64 = 1.0e12;
const BISECT_ITERS: usize = 80;

/// Banded operators of the Reinsch system, assembled once per profile.
struct System {
    /// Knot spacings, length n−1.
    h: Vec<f64>,
    /// `R` main diagonal, length n−2.
    r0: Vec<f64>,
    /// `R` first off-diagonal, length n−3.
    r1: Vec<f64>,
    /// `QᵀQ` main diagonal, length n−2.
    q0: Vec<f64>,
    /// `QᵀQ` first off-diagonal, length n−3.
    q1: Vec<f64>,
    /// `QᵀQ` second off-diagonal, length n−4.
    q2: Vec<f64>,
    /// `Qᵀy`, length n−2.
    qty: Vec<f64>,
}

impl System {
    fn assemble(x: &[f64], y: &[f64]) -> Self {
        let n = x.len();
        let m = n - 2;
        let h: Vec<f64> = (0..n - 1).map(|i| x[i + 1] - x[i]).collect();

        // Row j of Qᵀ: [1/h_j, −(1/h_j + 1/h_{j+1}), 1/h_{j+1}] at columns j..j+2.
        let band = |j: usize| -> [f64; 3] {
            let a = 1.0 / h[j];
            let c = 1.0 / h[j + 1];
            [a, -(a + c), c]
        };

        let mut r0 = vec![0.0; m];
        let mut r1 = vec![0.0; m.saturating_sub(1)];
        let mut q0 = vec![0.0; m];
        let mut q1 = vec![0.0; m.saturating_sub(1)];
        let mut q2 = vec![0.0; m.saturating_sub(2)];
        let mut qty = vec![0.0; m];

        for j in 0..m {
            let [a, b, c] = band(j);
            r0[j] = (h[j] + h[j + 1]) / 3.0;
            q0[j] = a * a + b * b + c * c;
            qty[j] = a * y[j] + b * y[j + 1] + c * y[j + 2];
            if j + 1 < m {
                let [a2, b2, _] = band(j + 1);
                r1[j] = h[j + 1] / 6.0;
                q1[j] = b * a2 + c * b2;
            }
            if j + 2 < m {
                let [a3, _, _] = band(j + 2);
                q2[j] = c * a3;
            }
        }

        Self { h, r0, r1, q0, q1, q2, qty }
    }

    /// Solve `(R + α·QᵀQ)γ = Qᵀy` and return the fitted ordinates together
    /// with the residual sum of squares.
    fn fit(&self, alpha: f64, y: &[f64]) -> Result<(Vec<f64>, f64), EvalError> {
        let m = self.qty.len();

        // Pentadiagonal Cholesky A = LLᵀ, bands d (diag), e (sub1), f (sub2).
        let mut d = vec![0.0; m];
        let mut e = vec![0.0; m.saturating_sub(1)];
        let mut fb = vec![0.0; m.saturating_sub(2)];
        for i in 0..m {
            let mut v = self.r0[i] + alpha * self.q0[i];
            if i >= 1 {
                v -= e[i - 1] * e[i - 1];
            }
            if i >= 2 {
                v -= fb[i - 2] * fb[i - 2];
            }
            if !(v > 0.0) {
                return Err(EvalError::NumericalFailure(
                    "smoothing system lost positive definiteness".into(),
                ));
            }
            d[i] = v.sqrt();
            if i + 1 < m {
                let mut v1 = self.r1[i] + alpha * self.q1[i];
                if i >= 1 {
                    v1 -= e[i - 1] * fb[i - 1];
                }
                e[i] = v1 / d[i];
            }
            if i + 2 < m {
                fb[i] = alpha * self.q2[i] / d[i];
            }
        }

        // Forward then backward substitution.
        let mut z = vec![0.0; m];
        for i in 0..m {
            let mut v = self.qty[i];
            if i >= 1 {
                v -= e[i - 1] * z[i - 1];
            }
            if i >= 2 {
                v -= fb[i - 2] * z[i - 2];
            }
            z[i] = v / d[i];
        }
        let mut gamma = vec![0.0; m];
        for i in (0..m).rev() {
            let mut v = z[i];
            if i + 1 < m {
                v -= e[i] * gamma[i + 1];
            }
            if i + 2 < m {
                v -= fb[i] * gamma[i + 2];
            }
            gamma[i] = v / d[i];
        }

        // f = y − α·Qγ; the residual is ‖α·Qγ‖².
        let n = y.len();
        let mut fitted = y.to_vec();
        let mut residual = 0.0;
        for c in 0..n {
            let mut qg = 0.0;
            if c < m {
                qg += gamma[c] / self.h[c];
            }
            if c >= 1 && c - 1 < m {
                let j = c - 1;
                qg -= gamma[j] * (1.0 / self.h[j] + 1.0 / self.h[j + 1]);
            }
            if c >= 2 && c - 2 < m {
                let j = c - 2;
                qg += gamma[j] / self.h[j + 1];
            }
            let delta = alpha * qg;
            fitted[c] -= delta;
            residual += delta * delta;
        }
        Ok((fitted, residual))
    }
}

/// Smooth `y` over abscissae `x` so that the sum of squared residuals
/// approaches `budget`. Caller guarantees strictly increasing `x` of
/// length ≥ 5.
pub(crate) fn smooth_with_budget(
    x: &[f64],
    y: &[f64],
    budget: f64,
) -> Result<Vec<f64>, EvalError> {
    let sys = System::assemble(x, y);

    // Raise the upper bound until the residual crosses the budget; if even
    // the stiffest fit stays inside the budget, it is the answer.
    let mut hi = 1.0;
    let (mut fit_hi, mut res_hi) = sys.fit(hi, y)?;
    while res_hi < budget && hi < ALPHA_HI_CAP {
        hi *= 10.0;
        let (f, r) = sys.fit(hi, y)?;
        fit_hi = f;
        res_hi = r;
    }
    if res_hi <= budget {
        return Ok(fit_hi);
    }

    let mut lo = ALPHA_LO;
    let mut best = fit_hi;
    for _ in 0..BISECT_ITERS {
        let mid = (lo * hi).sqrt();
        let (f, r) = sys.fit(mid, y)?;
        if r > budget {
            hi = mid;
            best = f;
        } else {
            lo = mid;
            best = f;
        }
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn noisy_line(n: usize, sigma: f64, seed: u64) -> (Vec<f64>, Vec<f64>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let x: Vec<f64> = (0..n).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|&xi| 2.0 * xi + 0.5 + rng.gen_range(-sigma..sigma))
            .collect();
        (x, y)
    }

    fn residual_sum(y: &[f64], f: &[f64]) -> f64 {
        y.iter().zip(f).map(|(a, b)| (a - b) * (a - b)).sum()
    }

    #[test]
    fn residual_tracks_budget() {
        let (x, y) = noisy_line(60, 0.5, 7);
        let budget = 0.9;
        let fitted = smooth_with_budget(&x, &y, budget).expect("smooth");
        let res = residual_sum(&y, &fitted);
        assert!(
            (res - budget).abs() < 0.05,
            "residual {} should track budget {}",
            res,
            budget
        );
    }

    #[test]
    fn generous_budget_falls_back_to_stiffest_fit() {
        // Noise so small that even the near-line limit fits inside the budget.
        let (x, y) = noisy_line(40, 0.01, 3);
        let fitted = smooth_with_budget(&x, &y, 0.9).expect("smooth");
        let res = residual_sum(&y, &fitted);
        assert!(res < 0.9, "residual {} stays under the budget", res);
        // The stiff limit is close to the underlying line.
        for (xi, fi) in x.iter().zip(&fitted) {
            assert!((fi - (2.0 * xi + 0.5)).abs() < 0.05);
        }
    }

    #[test]
    fn exact_line_is_left_untouched() {
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&xi| 3.0 * xi - 1.0).collect();
        let fitted = smooth_with_budget(&x, &y, 0.9).expect("smooth");
        for (a, b) in y.iter().zip(&fitted) {
            assert!((a - b).abs() < 1e-8);
        }
    }

    #[test]
    fn smoothing_reduces_wiggle() {
        let (x, y) = noisy_line(80, 0.4, 11);
        let fitted = smooth_with_budget(&x, &y, 0.95).expect("smooth");
        let raw_dev: f64 = x
            .iter()
            .zip(&y)
            .map(|(xi, yi)| (yi - (2.0 * xi + 0.5)).abs())
            .sum();
        let fit_dev: f64 = x
            .iter()
            .zip(&fitted)
            .map(|(xi, fi)| (fi - (2.0 * xi + 0.5)).abs())
            .sum();
        assert!(
            fit_dev < raw_dev,
            "smoothed curve ({}) should sit closer to the line than the data ({})",
            fit_dev,
            raw_dev
        );
    }
}
