//! Toe radius from the point of maximum curvature.

use serde::{Deserialize, Serialize};

use crate::derivative::{derive_profile, interior_to_profile};
use crate::error::EvalError;
use crate::profile::Profile;
use crate::radius::{argmax, dist};
use crate::{RadiusMethod, RadiusResult};

/// Configuration for the curvature-maximum method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvatureMaxConfig {
    /// Smoothing parameter for the derivative engine (1.0 disables).
    pub smoothparam: f64,
}

impl Default for CurvatureMaxConfig {
    fn default() -> Self {
        Self { smoothparam: 1.0 }
    }
}

/// Estimate the toe radius as the reciprocal of the maximum curvature.
///
/// The circle center sits on the outward normal at the curvature peak
/// (`normalize([−slope, 1])`, a directional convention assuming the fixed
/// profile orientation, weld above base line). The maximum deviation is
/// taken over the span between the first and the last interior point whose
/// distance to the center is within the radius; gaps inside that span are
/// not checked. Zero maximum curvature yields the `radius = +∞` sentinel
/// with no center or deviation.
pub fn eval_curvature_max(
    profile: &Profile,
    config: &CurvatureMaxConfig,
) -> Result<RadiusResult, EvalError> {
    let (gradient, curvature) = derive_profile(profile, config.smoothparam)?;

    // Interior points are index-aligned with the curvature series.
    let interior = &profile.points()[1..profile.len() - 1];
    let (toe, max_curvature) = argmax(&curvature.y);
    let toe_idx = interior_to_profile(toe);

    if max_curvature == 0.0 {
        tracing::debug!("flat curvature maximum, reporting infinite radius");
        return Ok(RadiusResult {
            method: RadiusMethod::CurvatureMax,
            radius: f64::INFINITY,
            center: None,
            start_point: Some(interior[toe]),
            end_point: None,
            max_deviation: None,
            toe_idx: Some(toe_idx),
            start_idx: None,
            end_idx: None,
        });
    }
    let radius = 1.0 / max_curvature;

    let slope = gradient.y[toe];
    let norm = (slope * slope + 1.0).sqrt();
    let normal = [-slope / norm, 1.0 / norm];

    let sp = interior[toe];
    let mp = [sp[0] + normal[0] * radius, sp[1] + normal[1] * radius];

    // Deviation span: first and last interior index within the radius.
    let within = |p: &[f64; 2]| dist(*p, mp) <= radius;
    let first = interior.iter().position(within);
    let last = interior.iter().rposition(within);
    let (first, last) = match (first, last) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(EvalError::EmptyDeviationWindow),
    };

    let max_deviation = interior[first..=last]
        .iter()
        .map(|p| (dist(*p, mp) - radius).abs())
        .fold(0.0_f64, f64::max);

    Ok(RadiusResult {
        method: RadiusMethod::CurvatureMax,
        radius,
        center: Some(mp),
        start_point: Some(sp),
        end_point: None,
        max_deviation: Some(max_deviation),
        toe_idx: Some(toe_idx),
        start_idx: None,
        end_idx: None,
    })
}
