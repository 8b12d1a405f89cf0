//! weldtoe-core: weld toe radius and flank angle determination from
//! digitized cross-section profiles, for fatigue assessment of welded
//! structures.
//!
//! The evaluation stages are:
//!
//! 1. **Profile** – validated (x, y) point sequence, strictly increasing x
//!    ([`Profile`]).
//! 2. **Derivatives** – two-stage midpoint differencing with optional
//!    smoothing-spline preconditioning ([`derive_profile`]).
//! 3. **Radius** – three independent toe-radius estimators: curvature
//!    maximum ([`eval_curvature_max`]), least-squares circle fit
//!    ([`eval_least_squares`]) and exhaustive iterative search
//!    ([`eval_iterative`]).
//! 4. **Angle** – flank angle at the steepest-gradient point or at a radius
//!    end point ([`eval_angle_max`], [`eval_angle_end`]).
//!
//! Every evaluator is a pure function of (profile, configuration) returning
//! a fresh value object; there is no shared state and no I/O. Preprocessing
//! (outlier removal, filtering, resampling) and presentation (plotting,
//! batch drivers) are external collaborators.

pub mod angle;
pub mod derivative;
pub mod error;
pub mod profile;
pub mod radius;

mod spline;

#[cfg(test)]
pub(crate) mod test_utils;

use serde::{Deserialize, Serialize};

pub use angle::{eval_angle_end, eval_angle_max, AngleConfig, AngleMethod, AngleResult};
pub use derivative::{
    derive_profile, interior_to_profile, profile_to_interior, Curvature, Gradient,
};
pub use error::EvalError;
pub use profile::Profile;
pub use radius::curvature_max::{eval_curvature_max, CurvatureMaxConfig};
pub use radius::iterative::{eval_iterative, IterativeConfig};
pub use radius::least_squares::{eval_least_squares, LeastSquaresConfig};

/// Toe-radius estimation method tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusMethod {
    /// Reciprocal of the maximum curvature.
    CurvatureMax,
    /// Algebraic least-squares circle fit.
    LeastSquares,
    /// Exhaustive constrained search.
    Iterative,
}

/// Toe-radius result value object.
///
/// All indices are profile-frame. Fields a method does not produce stay
/// `None`: the curvature-maximum method has no end point, and its
/// infinite-radius sentinel (flat profile) carries neither center nor
/// deviation. The iterative method returns `Option<RadiusResult>` instead
/// of a NaN-filled struct when no candidate is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiusResult {
    /// Producing method.
    pub method: RadiusMethod,
    /// Toe radius (distance units); may be `+∞` for a flat profile.
    pub radius: f64,
    /// Fitted circle center.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<[f64; 2]>,
    /// Start point (CM: the curvature-peak point itself).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_point: Option<[f64; 2]>,
    /// End point of the fitted span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_point: Option<[f64; 2]>,
    /// Maximum |distance − radius| over the fitted span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_deviation: Option<f64>,
    /// Profile index of the curvature peak.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toe_idx: Option<usize>,
    /// Profile index of the start point.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_idx: Option<usize>,
    /// Profile index of the end point; feeds the END angle method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_idx: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::toe_fillet_points;

    #[test]
    fn radius_result_json_round_trip() {
        let res = RadiusResult {
            method: RadiusMethod::LeastSquares,
            radius: 1.25,
            center: Some([0.1, 1.3]),
            start_point: Some([-0.2, 0.0]),
            end_point: Some([0.6, 0.4]),
            max_deviation: Some(0.004),
            toe_idx: Some(52),
            start_idx: Some(48),
            end_idx: Some(61),
        };
        let json = serde_json::to_string(&res).unwrap();
        let back: RadiusResult = serde_json::from_str(&json).unwrap();
        assert_eq!(res, back);
    }

    #[test]
    fn sparse_fields_are_omitted_from_json() {
        let res = RadiusResult {
            method: RadiusMethod::CurvatureMax,
            radius: f64::INFINITY,
            center: None,
            start_point: None,
            end_point: None,
            max_deviation: None,
            toe_idx: Some(3),
            start_idx: None,
            end_idx: None,
        };
        let json = serde_json::to_string(&res).unwrap();
        assert!(!json.contains("center"));
        assert!(!json.contains("end_idx"));
        assert!(json.contains("curvature_max"));
    }

    #[test]
    fn evaluators_are_independent_and_pure() {
        // Same profile, three methods: results do not depend on call order.
        let profile = Profile::new(toe_fillet_points(1.0, 30.0, 0.04)).unwrap();
        let cm1 = eval_curvature_max(&profile, &CurvatureMaxConfig::default()).unwrap();
        let lsm1 = eval_least_squares(&profile, &LeastSquaresConfig::default()).unwrap();
        let im1 = eval_iterative(&profile, &IterativeConfig::default()).unwrap();
        let lsm2 = eval_least_squares(&profile, &LeastSquaresConfig::default()).unwrap();
        let cm2 = eval_curvature_max(&profile, &CurvatureMaxConfig::default()).unwrap();
        let im2 = eval_iterative(&profile, &IterativeConfig::default()).unwrap();
        assert_eq!(cm1, cm2);
        assert_eq!(lsm1, lsm2);
        assert_eq!(im1, im2);
    }
}
