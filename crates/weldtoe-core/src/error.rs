//! Evaluation error type shared across the crate.

/// Errors that can occur while evaluating a profile.
///
/// Variants fall into three groups: configuration errors (invalid smoothing
/// parameter, unknown method name, malformed profile), numerical errors
/// (degenerate fits, out-of-range references) and empty-region errors (a
/// selection window without qualifying points). Sentinel outcomes (zero
/// curvature, an iterative search without an accepted candidate, an empty
/// arc-length window) are regular results, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Smoothing parameter outside `[0.8, 1.0]`.
    SmoothParamOutOfRange { got: f64 },
    /// Angle method name is neither `MAX` nor `END`.
    UnknownAngleMethod { name: String },
    /// Profile has too few points for two differencing passes.
    ProfileTooShort { needed: usize, got: usize },
    /// Profile x values are not strictly increasing at `index`.
    NonIncreasingX { index: usize },
    /// Profile contains a non-finite coordinate at `index`.
    NonFinitePoint { index: usize },
    /// Fit window holds fewer points than the fit requires.
    FitWindowTooSmall { needed: usize, got: usize },
    /// Numerical failure (singular system, negative radicand, etc.).
    NumericalFailure(String),
    /// A reference index points outside the gradient series.
    ReferenceOutOfRange { index: usize, len: usize },
    /// The deviation window selection found no qualifying point.
    EmptyDeviationWindow,
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SmoothParamOutOfRange { got } => {
                write!(f, "smoothing parameter must be in [0.8, 1.0], got {}", got)
            }
            Self::UnknownAngleMethod { name } => {
                write!(f, "unknown angle method: {:?}", name)
            }
            Self::ProfileTooShort { needed, got } => {
                write!(f, "profile too short: need {} points, got {}", needed, got)
            }
            Self::NonIncreasingX { index } => {
                write!(f, "profile x values not strictly increasing at index {}", index)
            }
            Self::NonFinitePoint { index } => {
                write!(f, "profile point at index {} is not finite", index)
            }
            Self::FitWindowTooSmall { needed, got } => {
                write!(f, "fit window too small: need {} points, got {}", needed, got)
            }
            Self::NumericalFailure(msg) => write!(f, "numerical failure: {}", msg),
            Self::ReferenceOutOfRange { index, len } => {
                write!(f, "reference index {} outside gradient of length {}", index, len)
            }
            Self::EmptyDeviationWindow => {
                write!(f, "deviation window selection found no qualifying point")
            }
        }
    }
}

impl std::error::Error for EvalError {}
