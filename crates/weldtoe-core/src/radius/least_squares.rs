//! Toe radius from an algebraic least-squares circle fit.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::derivative::{derive_profile, interior_to_profile};
use crate::error::EvalError;
use crate::profile::Profile;
use crate::radius::{argmax, dist};
use crate::{RadiusMethod, RadiusResult};

/// Fewest window points that still determine a circle.
const MIN_FIT_POINTS: usize = 3;

/// Configuration for the least-squares method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeastSquaresConfig {
    /// Smoothing parameter for the derivative engine (1.0 disables).
    pub smoothparam: f64,
    /// Window threshold as a fraction of the maximum curvature.
    pub factor: f64,
}

impl Default for LeastSquaresConfig {
    fn default() -> Self {
        Self {
            smoothparam: 1.0,
            factor: 0.3,
        }
    }
}

/// Fit circle coefficients `(c0, c1, c2)` solving `x² + y² = c0 + c1·x + c2·y`
/// in the least-squares sense over the window points.
fn fit_circle(points: &[[f64; 2]]) -> Result<([f64; 2], f64), EvalError> {
    let m = points.len();
    let mut a = DMatrix::<f64>::zeros(m, 3);
    let mut d = DVector::<f64>::zeros(m);
    for (r, p) in points.iter().enumerate() {
        a[(r, 0)] = 1.0;
        a[(r, 1)] = p[0];
        a[(r, 2)] = p[1];
        d[r] = p[0] * p[0] + p[1] * p[1];
    }

    let c = a
        .svd(true, true)
        .solve(&d, 1.0e-12)
        .map_err(|e| EvalError::NumericalFailure(e.to_string()))?;

    let center = [c[1] / 2.0, c[2] / 2.0];
    let radicand = c[0] + center[0] * center[0] + center[1] * center[1];
    if !radicand.is_finite() || radicand < 0.0 {
        return Err(EvalError::NumericalFailure(
            "circle fit produced a negative radicand".into(),
        ));
    }
    Ok((center, radicand.sqrt()))
}

/// Estimate the toe radius via a least-squares circle over the curvature
/// window `[DP_SP, DP_EP]`.
///
/// The window is found by scanning backward and forward from the curvature
/// peak until the curvature drops to `factor × max`; a scan that never drops
/// below the threshold extends to the corresponding end of the series.
pub fn eval_least_squares(
    profile: &Profile,
    config: &LeastSquaresConfig,
) -> Result<RadiusResult, EvalError> {
    let (_, curvature) = derive_profile(profile, config.smoothparam)?;

    let (toe, max_curvature) = argmax(&curvature.y);
    let toe_idx = interior_to_profile(toe);
    let threshold = max_curvature * config.factor;

    // Nearest below-threshold sample on each side of the peak.
    let start_ci = (0..toe)
        .rev()
        .find(|&j| curvature.y[j] <= threshold)
        .unwrap_or(0);
    let end_ci = (toe + 1..curvature.len())
        .find(|&j| curvature.y[j] <= threshold)
        .unwrap_or(curvature.len() - 1);

    let start_idx = interior_to_profile(start_ci);
    let end_idx = interior_to_profile(end_ci);
    let window = &profile.points()[start_idx..=end_idx];
    if window.len() < MIN_FIT_POINTS {
        return Err(EvalError::FitWindowTooSmall {
            needed: MIN_FIT_POINTS,
            got: window.len(),
        });
    }

    let (center, radius) = fit_circle(window)?;
    let max_deviation = window
        .iter()
        .map(|p| (dist(*p, center) - radius).abs())
        .fold(0.0_f64, f64::max);

    tracing::debug!(
        "least-squares circle over [{}, {}]: radius {:.4}, maxdist {:.4}",
        start_idx,
        end_idx,
        radius,
        max_deviation
    );

    Ok(RadiusResult {
        method: RadiusMethod::LeastSquares,
        radius,
        center: Some(center),
        start_point: Some(profile.points()[start_idx]),
        end_point: Some(profile.points()[end_idx]),
        max_deviation: Some(max_deviation),
        toe_idx: Some(toe_idx),
        start_idx: Some(start_idx),
        end_idx: Some(end_idx),
    })
}
