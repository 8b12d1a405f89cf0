//! Discrete differentiation of a profile: gradient and curvature series.
//!
//! Differentiation is a two-stage midpoint scheme, not a single finite
//! difference:
//!
//! 1. First derivative at segment midpoints (length n−1).
//! 2. Second derivative from the first, same rule (length n−2).
//! 3. Reported gradient: midpoint-averaged first derivative, re-aligned to
//!    length n−2.
//! 4. Curvature `κ = y'' / (1 + y'²)^{3/2}` on the same abscissae.
//!
//! Gradient and Curvature are therefore always exactly two samples shorter
//! than the profile and aligned with its interior points `profile[1..n−1]`;
//! the evaluators' index arithmetic depends on this. Use
//! [`interior_to_profile`] / [`profile_to_interior`] to translate indices
//! instead of open-coding the offset.

use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::profile::Profile;
use crate::spline;

/// Local slope dy/dx of the profile, aligned with its interior points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    /// Abscissae, interior-aligned.
    pub x: Vec<f64>,
    /// Slope values.
    pub y: Vec<f64>,
}

/// Signed curvature of the profile, index-aligned with [`Gradient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curvature {
    /// Abscissae, identical to the gradient's.
    pub x: Vec<f64>,
    /// Curvature values.
    pub y: Vec<f64>,
}

impl Gradient {
    /// Number of samples (profile length − 2).
    pub fn len(&self) -> usize {
        self.y.len()
    }

    /// True when the series is empty (never, for a valid profile).
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

impl Curvature {
    /// Number of samples (profile length − 2).
    pub fn len(&self) -> usize {
        self.y.len()
    }

    /// True when the series is empty (never, for a valid profile).
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// Map an interior-series index (gradient/curvature) to its profile index.
pub const fn interior_to_profile(i: usize) -> usize {
    i + 1
}

/// Map a profile index to the interior-series index, if it has one.
pub const fn profile_to_interior(i: usize) -> Option<usize> {
    if i >= 1 {
        Some(i - 1)
    } else {
        None
    }
}

/// One midpoint differencing pass: abscissae move to segment midpoints,
/// ordinates become divided differences. Output is one shorter than input.
fn midpoint_diff(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let m = x.len() - 1;
    let mut mx = Vec::with_capacity(m);
    let mut dy = Vec::with_capacity(m);
    for i in 0..m {
        mx.push(x[i] + (x[i + 1] - x[i]) / 2.0);
        dy.push((y[i + 1] - y[i]) / (x[i + 1] - x[i]));
    }
    (mx, dy)
}

/// Compute gradient and curvature of a profile.
///
/// `smoothparam` selects the smoothing applied to the ordinates first:
/// a value in `[0.8, 1.0)` fits a smoothing spline with that residual
/// budget and re-evaluates it at the original abscissae, exactly `1.0`
/// skips smoothing, anything else is a configuration error.
pub fn derive_profile(
    profile: &Profile,
    smoothparam: f64,
) -> Result<(Gradient, Curvature), EvalError> {
    let xs = profile.xs();
    let ys = if (0.8..1.0).contains(&smoothparam) {
        spline::smooth_with_budget(&xs, &profile.ys(), smoothparam)?
    } else if smoothparam == 1.0 {
        profile.ys()
    } else {
        return Err(EvalError::SmoothParamOutOfRange { got: smoothparam });
    };

    // Two differencing passes.
    let (d1x, d1y) = midpoint_diff(&xs, &ys);
    let (_, d2y) = midpoint_diff(&d1x, &d1y);

    // Gradient re-aligned to the second-derivative abscissae.
    let m = d1x.len() - 1;
    let mut gx = Vec::with_capacity(m);
    let mut gy = Vec::with_capacity(m);
    for i in 0..m {
        gx.push(d1x[i] + (d1x[i + 1] - d1x[i]) / 2.0);
        gy.push(d1y[i] + (d1y[i + 1] - d1y[i]) / 2.0);
    }

    let ky: Vec<f64> = d2y
        .iter()
        .zip(&gy)
        .map(|(&d2, &g)| d2 / (1.0 + g * g).powf(1.5))
        .collect();

    let curvature = Curvature { x: gx.clone(), y: ky };
    Ok((Gradient { x: gx, y: gy }, curvature))
}
