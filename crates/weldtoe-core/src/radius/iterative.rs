//! Toe radius from an exhaustive constrained search.
//!
//! Every candidate pairs a start index with a radius from a fixed grid. The
//! candidate circle center is offset from the start point along the
//! direction orthogonal to the local baseline; the baseline slope is fixed
//! at zero here (no slope regression is applied), so the offset is straight
//! up and the "local" ordinate is the raw y. The search enumerates
//! candidates, drops those failing the acceptance gates, scores the rest
//! and keeps the arg-min; on an exact score tie the first candidate in
//! enumeration order (start index outer, radius inner) wins.
//!
//! This is the performance-critical hot path: O(W·R·N) with W the lateral
//! window width, R the radius grid (1000 steps) and N the profile length.
//! Candidate evaluation is allocation-free for that reason.

use serde::{Deserialize, Serialize};

use crate::derivative::{derive_profile, interior_to_profile};
use crate::error::EvalError;
use crate::profile::Profile;
use crate::radius::argmax;
use crate::{RadiusMethod, RadiusResult};

/// Radius grid lower bound.
const RADIUS_MIN: f64 = 0.01;
/// Radius grid step; also the resolution of the reported radius.
const RADIUS_STEP: f64 = 0.01;
/// Number of radius steps covering [0.01, 10.0].
const RADIUS_STEPS: usize = 1000;
/// Lateral half-width of the candidate window around the approximate toe.
const LATERAL_HALFWIDTH: f64 = 2.0;
/// Slack added to the squared radius when locating the end point.
const END_DIST_SQ_EPS: f64 = 0.01;
/// Absolute cap of the minimum-rise requirement.
const MIN_RISE_CAP: f64 = 0.1;
/// Fraction of the maximum curvature that marks the approximate toe.
const TOE_CURVATURE_FRAC: f64 = 0.9;

/// Configuration for the iterative method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterativeConfig {
    /// Smoothing parameter for the derivative engine (1.0 disables).
    pub smoothparam: f64,
    /// Minimum-rise factor: the end point must sit at least
    /// `min(0.1, min_rise_factor × radius)` above the start point.
    pub min_rise_factor: f64,
    /// Maximum allowed radial deviation of any interior point.
    pub max_deviation: f64,
    /// Minimum number of interior points supporting the fit.
    pub min_support: usize,
}

impl Default for IterativeConfig {
    fn default() -> Self {
        Self {
            smoothparam: 1.0,
            min_rise_factor: 0.01,
            max_deviation: 0.02,
            min_support: 3,
        }
    }
}

/// Accepted candidate, scored.
struct Scored {
    start_idx: usize,
    end_idx: usize,
    radius: f64,
    center: [f64; 2],
    max_dev: f64,
    score: f64,
}

/// Evaluate one (start index, radius) candidate against the gates.
///
/// Returns `None` when the candidate is rejected: no end point within the
/// radius, insufficient rise, an interior point deviating too far, or too
/// few supporting points. Candidates without interior points can never be
/// scored and are rejected as well.
fn evaluate_candidate(
    points: &[[f64; 2]],
    start_idx: usize,
    radius: f64,
    config: &IterativeConfig,
) -> Option<Scored> {
    let sp = points[start_idx];
    let center = [sp[0], sp[1] + radius];
    let limit_sq = radius * radius + END_DIST_SQ_EPS;

    // End point: last index past the start whose distance to the center
    // stays within the (slackened) radius.
    let mut end_idx = None;
    for (j, p) in points.iter().enumerate().skip(start_idx + 1) {
        let dx = p[0] - center[0];
        let dy = p[1] - center[1];
        if dx * dx + dy * dy <= limit_sq {
            end_idx = Some(j);
        }
    }
    let end_idx = end_idx?;

    // Minimum-rise gate, in the zero-slope local frame (raw ordinates).
    let min_rise = MIN_RISE_CAP.min(config.min_rise_factor * radius);
    if points[end_idx][1] < sp[1] + min_rise {
        return None;
    }

    // Deviation gate over strictly interior points.
    let mut sum_dev = 0.0;
    let mut max_dev = 0.0_f64;
    let mut count = 0usize;
    for p in &points[start_idx + 1..end_idx] {
        let dx = p[0] - center[0];
        let dy = p[1] - center[1];
        let dev = ((dx * dx + dy * dy).sqrt() - radius).abs();
        if dev >= config.max_deviation {
            return None;
        }
        sum_dev += dev;
        max_dev = max_dev.max(dev);
        count += 1;
    }
    if count == 0 || count < config.min_support {
        return None;
    }

    // Lower is better; the squared count penalizes sparse support.
    let score = sum_dev / (count * count) as f64;
    Some(Scored {
        start_idx,
        end_idx,
        radius,
        center,
        max_dev,
        score,
    })
}

/// Candidate start-index window: all indices whose x lies within the
/// lateral half-width of the approximate toe, capped so that at least one
/// point remains past the start.
fn lateral_window(points: &[[f64; 2]], toe_idx: usize) -> (usize, usize) {
    let toe_x = points[toe_idx][0];
    let start = points
        .iter()
        .position(|p| (p[0] - toe_x).abs() < LATERAL_HALFWIDTH)
        .unwrap_or(toe_idx);
    let end = points
        .iter()
        .rposition(|p| (p[0] - toe_x).abs() < LATERAL_HALFWIDTH)
        .unwrap_or(toe_idx);
    (start, end.min(points.len() - 2))
}

/// Run the iterative search. `Ok(None)` is the legitimate not-found
/// outcome: no candidate passed all gates.
pub fn eval_iterative(
    profile: &Profile,
    config: &IterativeConfig,
) -> Result<Option<RadiusResult>, EvalError> {
    let (_, curvature) = derive_profile(profile, config.smoothparam)?;
    let points = profile.points();

    // Approximate toe: first sample reaching 90% of the curvature peak.
    let (_, max_curvature) = argmax(&curvature.y);
    let approx_toe = curvature
        .y
        .iter()
        .position(|&k| k >= max_curvature * TOE_CURVATURE_FRAC)
        .map(interior_to_profile)
        .unwrap_or(1);

    let (win_start, win_end) = lateral_window(points, approx_toe);

    let mut evaluated = 0usize;
    let mut accepted = 0usize;
    let mut best: Option<Scored> = None;
    for start_idx in win_start..=win_end {
        for k in 0..RADIUS_STEPS {
            let radius = RADIUS_MIN + k as f64 * RADIUS_STEP;
            evaluated += 1;
            if let Some(cand) = evaluate_candidate(points, start_idx, radius, config) {
                accepted += 1;
                // Strict `<` keeps the first candidate on exact ties.
                if best.as_ref().map_or(true, |b| cand.score < b.score) {
                    best = Some(cand);
                }
            }
        }
    }

    tracing::debug!(
        "iterative search: window [{}, {}], {} candidates, {} accepted",
        win_start,
        win_end,
        evaluated,
        accepted
    );

    Ok(best.map(|b| RadiusResult {
        method: RadiusMethod::Iterative,
        radius: b.radius,
        center: Some(b.center),
        start_point: Some(points[b.start_idx]),
        end_point: Some(points[b.end_idx]),
        max_deviation: Some(b.max_dev),
        toe_idx: None,
        start_idx: Some(b.start_idx),
        end_idx: Some(b.end_idx),
    }))
}
