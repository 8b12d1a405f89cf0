//! Flank-angle evaluation at the steepest-gradient point or at a radius
//! result's end point.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::derivative::derive_profile;
use crate::error::EvalError;
use crate::profile::Profile;

/// Angle evaluation method selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleMethod {
    /// Angle at the steepest-gradient point.
    Max,
    /// Angle at a previously determined radius end point.
    End,
}

impl FromStr for AngleMethod {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("max") {
            Ok(Self::Max)
        } else if s.eq_ignore_ascii_case("end") {
            Ok(Self::End)
        } else {
            Err(EvalError::UnknownAngleMethod { name: s.to_owned() })
        }
    }
}

/// Configuration shared by both angle methods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleConfig {
    /// Smoothing parameter for the derivative engine (1.0 disables).
    pub smoothparam: f64,
    /// Arc-length window for gradient smoothing; 0 evaluates the raw
    /// gradient at the reference point.
    pub smooth_len: f64,
}

impl Default for AngleConfig {
    fn default() -> Self {
        Self {
            smoothparam: 1.0,
            smooth_len: 0.2,
        }
    }
}

/// Flank-angle result.
///
/// `ref_idx` keeps the frame of the producing method: for [`AngleMethod::Max`]
/// it indexes the gradient series at the |gradient| maximum, for
/// [`AngleMethod::End`] it is the radius end index minus one. `grad_sign` is
/// the sign of the local gradient there, used only by downstream rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleResult {
    /// Method that produced this result.
    pub method: AngleMethod,
    /// Flank angle in degrees (≥ 0); `None` when the arc-length window at
    /// the end point holds no points.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle_deg: Option<f64>,
    /// Reference point index (see type docs for the frame).
    pub ref_idx: usize,
    /// Sign of the local gradient at the reference index: −1, 0 or +1.
    pub grad_sign: f64,
}

/// Cumulative segment lengths of a polyline; one entry per segment.
fn cumulative_arc_lengths(points: &[[f64; 2]]) -> Vec<f64> {
    let mut cum = Vec::with_capacity(points.len().saturating_sub(1));
    let mut total = 0.0;
    for w in points.windows(2) {
        let dx = w[1][0] - w[0][0];
        let dy = w[1][1] - w[0][1];
        total += (dx * dx + dy * dy).sqrt();
        cum.push(total);
    }
    cum
}

/// Number of points whose cumulative arc length stays below `target`
/// (left insertion index, as in a sorted-search).
fn window_len(cum: &[f64], target: f64) -> usize {
    cum.iter().position(|&d| d >= target).unwrap_or(cum.len())
}

fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// First index of the maximum absolute value.
fn argmax_abs(values: &[f64]) -> usize {
    let mut best_i = 0;
    let mut best_v = values[0].abs();
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v.abs() > best_v {
            best_i = i;
            best_v = v.abs();
        }
    }
    best_i
}

/// Flank angle at the steepest-gradient point.
///
/// With `smooth_len == 0` the angle is `atan(max |gradient|)`. Otherwise the
/// gradient is moving-averaged over a window sized by accumulating arc
/// length past the steepest point until `smooth_len` is reached (at least 5
/// points, at most the gradient length), and the angle is taken from the
/// largest window mean.
pub fn eval_angle_max(profile: &Profile, config: &AngleConfig) -> Result<AngleResult, EvalError> {
    let (gradient, _) = derive_profile(profile, config.smoothparam)?;
    let dp = argmax_abs(&gradient.y);
    let grad_sign = sign(gradient.y[dp]);

    let angle_deg = if config.smooth_len == 0.0 {
        gradient.y[dp].abs().atan().to_degrees()
    } else {
        let tail = &profile.points()[dp + 1..];
        let cum = cumulative_arc_lengths(tail);
        let win = window_len(&cum, config.smooth_len)
            .max(5)
            .min(gradient.len());
        let max_mean = gradient
            .y
            .windows(win)
            .map(|w| (w.iter().sum::<f64>() / win as f64).abs())
            .fold(0.0_f64, f64::max);
        max_mean.atan().to_degrees()
    };

    Ok(AngleResult {
        method: AngleMethod::Max,
        angle_deg: Some(angle_deg),
        ref_idx: dp,
        grad_sign,
    })
}

/// Flank angle at a radius result's end point (`end_idx`, profile frame).
///
/// With `smooth_len == 0` the angle comes from the gradient at the end
/// point. Otherwise points are collected from the end point forward until
/// their arc length reaches `smooth_len` and the angle is the regression
/// slope over that span; an empty span yields `angle_deg = None` (not an
/// error).
pub fn eval_angle_end(
    profile: &Profile,
    config: &AngleConfig,
    end_idx: usize,
) -> Result<AngleResult, EvalError> {
    let (gradient, _) = derive_profile(profile, config.smoothparam)?;
    let dp = end_idx
        .checked_sub(1)
        .ok_or(EvalError::ReferenceOutOfRange {
            index: 0,
            len: gradient.len(),
        })?;
    let local_grad = *gradient
        .y
        .get(dp)
        .ok_or(EvalError::ReferenceOutOfRange {
            index: dp,
            len: gradient.len(),
        })?;
    let grad_sign = sign(local_grad);

    let angle_deg = if config.smooth_len == 0.0 {
        Some(local_grad.abs().atan().to_degrees())
    } else {
        let tail = &profile.points()[end_idx..];
        let cum = cumulative_arc_lengths(tail);
        let win = window_len(&cum, config.smooth_len);
        if win > 0 {
            regression_slope(&profile.points()[end_idx..end_idx + win])
                .map(|slope| slope.atan().to_degrees().abs())
        } else {
            None
        }
    };

    Ok(AngleResult {
        method: AngleMethod::End,
        angle_deg,
        ref_idx: dp,
        grad_sign,
    })
}

/// Closed-form slope of the least-squares line through the points; `None`
/// when the x spread is degenerate.
fn regression_slope(points: &[[f64; 2]]) -> Option<f64> {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p[0]).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p[1]).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var = 0.0;
    for p in points {
        let dx = p[0] - mean_x;
        cov += dx * (p[1] - mean_y);
        var += dx * dx;
    }
    if var > 0.0 {
        Some(cov / var)
    } else {
        None
    }
}
