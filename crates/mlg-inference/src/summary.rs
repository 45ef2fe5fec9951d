//! Human-readable fit summary.

use std::fmt;

use mlg_core::{Boundedness, FeasibilityMethod, FitMethodUsed, NumericSolver, Result};

use crate::distribution::Metalog;

/// Snapshot of a distribution's diagnostics, rendered by `Display`.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSummary {
    /// Number of terms.
    pub term: usize,
    /// Boundedness tag.
    pub boundedness: Boundedness,
    /// Stage that produced the coefficients.
    pub fit_method_used: FitMethodUsed,
    /// Feasibility strategy.
    pub feasibility_method: FeasibilityMethod,
    /// Whether the distribution is valid.
    pub valid_distribution: bool,
    /// Feasibility score, when invalid.
    pub violation_score: Option<f64>,
    /// Numeric solver kept, when refined numerically.
    pub numeric_solver: Option<NumericSolver>,
    /// Solver convergence flag, when refined numerically.
    pub solver_converged: Option<bool>,
    /// Mean-square CDF error, when samples are attached.
    pub mean_square_error: Option<f64>,
    /// The a-vector.
    pub coefficients: Vec<f64>,
}

impl Metalog {
    /// Collect a [`FitSummary`].
    pub fn summary(&self) -> Result<FitSummary> {
        let valid_distribution = self.valid_distribution()?;
        let violation_score =
            if valid_distribution { None } else { Some(self.violation_score()?) };
        let fit_method_used = self.fit_method_used();
        let numeric = fit_method_used == FitMethodUsed::Numeric;
        Ok(FitSummary {
            term: self.term(),
            boundedness: self.boundedness(),
            fit_method_used,
            feasibility_method: self.feasibility_method(),
            valid_distribution,
            violation_score,
            numeric_solver: numeric.then(|| self.numeric_solver_used()),
            solver_converged: self.diagnostics().and_then(|d| d.solver_converged),
            mean_square_error: self.mean_square_error()?,
            coefficients: self.coefficients().to_vec(),
        })
    }
}

impl fmt::Display for FitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Metalog fit summary")?;
        writeln!(f, "  term:               {}", self.term)?;
        writeln!(f, "  boundedness:        {}", self.boundedness)?;
        write!(f, "  fit method:         {}", self.fit_method_used)?;
        if let Some(solver) = self.numeric_solver {
            write!(f, " ({solver}")?;
            match self.solver_converged {
                Some(true) => write!(f, ", converged")?,
                Some(false) => write!(f, ", not converged")?,
                None => {}
            }
            write!(f, ")")?;
        }
        writeln!(f)?;
        writeln!(f, "  feasibility method: {}", self.feasibility_method)?;
        writeln!(f, "  valid distribution: {}", self.valid_distribution)?;
        if let Some(score) = self.violation_score {
            writeln!(f, "  violation score:    {score:.6e}")?;
        }
        if let Some(mse) = self.mean_square_error {
            writeln!(f, "  mean square error:  {mse:.6e}")?;
        }
        write!(f, "  coefficients:       [")?;
        for (i, a) in self.coefficients.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{a:.6}")?;
        }
        write!(f, "]")
    }
}
