//! Common data types for the metalog crates

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Declared support bounds of a distribution. Each side is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Lower bound (`lbound`)
    pub lower: Option<f64>,
    /// Upper bound (`ubound`)
    pub upper: Option<f64>,
}

impl Bounds {
    /// Create bounds from optional sides.
    pub fn new(lower: Option<f64>, upper: Option<f64>) -> Self {
        Self { lower, upper }
    }

    /// No bounds on either side.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Bounded below only.
    pub fn lower(lower: f64) -> Self {
        Self { lower: Some(lower), upper: None }
    }

    /// Bounded above only.
    pub fn upper(upper: f64) -> Self {
        Self { lower: None, upper: Some(upper) }
    }

    /// Bounded on both sides.
    pub fn bounded(lower: f64, upper: f64) -> Self {
        Self { lower: Some(lower), upper: Some(upper) }
    }

    /// Derived boundedness tag.
    pub fn boundedness(&self) -> Boundedness {
        match (self.lower, self.upper) {
            (None, None) => Boundedness::Unbounded,
            (Some(_), None) => Boundedness::Lower,
            (None, Some(_)) => Boundedness::Upper,
            (Some(_), Some(_)) => Boundedness::Bounded,
        }
    }

    /// Check that present bounds are finite and ordered.
    pub fn validate(&self) -> Result<()> {
        for (name, b) in [("lbound", self.lower), ("ubound", self.upper)] {
            if let Some(v) = b {
                if !v.is_finite() {
                    return Err(Error::Validation(format!("{name} must be finite, got {v}")));
                }
            }
        }
        if let (Some(lo), Some(hi)) = (self.lower, self.upper) {
            if lo >= hi {
                return Err(Error::Validation(format!(
                    "lbound must be < ubound, got lbound={lo} ubound={hi}"
                )));
            }
        }
        Ok(())
    }
}

/// Which sides of the support are bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundedness {
    /// Support is the whole real line.
    Unbounded,
    /// Support is `(lbound, +inf)`.
    Lower,
    /// Support is `(-inf, ubound)`.
    Upper,
    /// Support is `(lbound, ubound)`.
    Bounded,
}

impl Boundedness {
    /// True when the support has a finite lower end.
    pub fn has_lower(self) -> bool {
        matches!(self, Self::Lower | Self::Bounded)
    }

    /// True when the support has a finite upper end.
    pub fn has_upper(self) -> bool {
        matches!(self, Self::Upper | Self::Bounded)
    }
}

impl fmt::Display for Boundedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unbounded => "none",
            Self::Lower => "lower",
            Self::Upper => "upper",
            Self::Bounded => "bounded",
        };
        f.write_str(s)
    }
}

/// Requested fitting policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitMethod {
    /// Linear least squares first, numeric refinement if the result is infeasible.
    #[default]
    Auto,
    /// Linear least squares only; an infeasible result is left invalid.
    #[serde(rename = "LLS")]
    LinearOnly,
}

impl FromStr for FitMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "auto" => Ok(Self::Auto),
            "LLS" => Ok(Self::LinearOnly),
            other => Err(Error::Validation(format!("unknown fit method: {other:?}"))),
        }
    }
}

/// Strategy used to score monotonicity violations of a coefficient vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeasibilityMethod {
    /// Minimum finite-difference slope of the quantile function (feasible when `>= 0`).
    QuantileMinimumIncrement,
    /// Log-penalty over negative quantile increments on a 200-point grid.
    QuantileSumNegativeIncrements,
    /// Sum of negative reciprocal densities on a 100-point grid.
    #[default]
    SmallMReciprocal,
}

impl FeasibilityMethod {
    /// All strategies, in declaration order.
    pub const ALL: [FeasibilityMethod; 3] = [
        Self::QuantileMinimumIncrement,
        Self::QuantileSumNegativeIncrements,
        Self::SmallMReciprocal,
    ];

    /// Canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuantileMinimumIncrement => "QuantileMinimumIncrement",
            Self::QuantileSumNegativeIncrements => "QuantileSumNegativeIncrements",
            Self::SmallMReciprocal => "SmallMReciprocal",
        }
    }
}

impl fmt::Display for FeasibilityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeasibilityMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::Validation(format!("unknown feasibility method: {s:?}")))
    }
}

/// Fit stage that produced the final coefficient vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMethodUsed {
    /// Linear least squares.
    Lls,
    /// Numeric constrained least squares.
    Numeric,
    /// No fit: the coefficient vector was supplied directly.
    None,
}

impl fmt::Display for FitMethodUsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Lls => "LLS",
            Self::Numeric => "numeric",
            Self::None => "none",
        };
        f.write_str(s)
    }
}

/// Numeric solver whose result was kept (last solver that ran).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericSolver {
    /// Numeric refinement did not run.
    None,
    /// Stage 1: quasi-Newton solver.
    Default,
    /// Stage 2: trust-region solver.
    TrustRegion,
}

impl fmt::Display for NumericSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Default => "default",
            Self::TrustRegion => "trust-region",
        };
        f.write_str(s)
    }
}

/// Diagnostics recorded once by the fit pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct FitDiagnostics {
    /// Stage that produced the final coefficients.
    pub fit_method_used: FitMethodUsed,
    /// Numeric solver used (if any).
    pub numeric_solver_used: NumericSolver,
    /// Whether the final coefficients pass the feasibility check.
    pub valid_distribution: bool,
    /// Infeasibility score of the final coefficients (0 when valid).
    pub violation_score: f64,
    /// Infeasibility score of the linear least-squares coefficients.
    pub lls_violation_score: f64,
    /// Convergence flag reported by the numeric solver that was kept.
    pub solver_converged: Option<bool>,
    /// Termination message of the numeric solver that was kept.
    pub solver_message: Option<String>,
}

impl FitDiagnostics {
    /// Diagnostics for a linear least-squares fit.
    pub fn lls(valid_distribution: bool, violation_score: f64) -> Self {
        Self {
            fit_method_used: FitMethodUsed::Lls,
            numeric_solver_used: NumericSolver::None,
            valid_distribution,
            violation_score,
            lls_violation_score: violation_score,
            solver_converged: None,
            solver_message: None,
        }
    }
}

/// Coefficient vector plus the diagnostics of the fit that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    /// Fitted a-vector (0-indexed; `a[0]` is Keelin's `a1`).
    pub coefficients: Vec<f64>,
    /// Fit diagnostics.
    pub diagnostics: FitDiagnostics,
}

impl FitResult {
    /// Create a new fit result
    pub fn new(coefficients: Vec<f64>, diagnostics: FitDiagnostics) -> Self {
        Self { coefficients, diagnostics }
    }

    /// Number of terms.
    pub fn term(&self) -> usize {
        self.coefficients.len()
    }
}
