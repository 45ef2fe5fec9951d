//! Feasibility (monotonicity) scoring of a metalog coefficient vector.
//!
//! Linear least squares does not enforce a non-decreasing quantile function,
//! so every fit is scored afterwards. Three interchangeable strategies are
//! available; all of them are grid based and can miss a violation that falls
//! strictly between grid points.

use argmin::core::{CostFunction, Executor};
use argmin::solver::brent::BrentOpt;
use mlg_core::{ContinuousDistribution, Error, FeasibilityMethod, Result};
use mlg_prob::MetalogKernel;
use mlg_prob::math::linspace;

use crate::samples::Samples;

/// First grid probability; the grid is symmetric, ending at `1 - CHECK_FROM`.
pub const CHECK_FROM: f64 = 0.001;

/// A monotonicity score for a coefficient vector.
pub trait FeasibilityScore: Send + Sync {
    /// Strategy tag.
    fn method(&self) -> FeasibilityMethod;

    /// Raw score of `kernel`.
    fn score(&self, kernel: &MetalogKernel) -> Result<f64>;

    /// Whether `score` denotes a feasible distribution.
    fn is_feasible(&self, score: f64) -> bool;

    /// Non-negative amount by which `score` misses feasibility (`0` when feasible).
    ///
    /// Log-compressed where the raw score is unbounded, so it can be squared into a penalty.
    fn violation(&self, score: f64) -> f64;

    /// Score to report in diagnostics: `0` when feasible, the raw score otherwise.
    fn reported(&self, score: f64) -> f64 {
        if self.is_feasible(score) { 0.0 } else { score }
    }
}

/// Strategy implementing `method`.
pub fn strategy(method: FeasibilityMethod) -> &'static dyn FeasibilityScore {
    match method {
        FeasibilityMethod::QuantileMinimumIncrement => &QuantileMinimumIncrement,
        FeasibilityMethod::QuantileSumNegativeIncrements => &QuantileSumNegativeIncrements,
        FeasibilityMethod::SmallMReciprocal => &SmallMReciprocal,
    }
}

/// Minimum slope of the quantile function: grid search, then a Brent polish
/// bracketed by the neighbours of the lowest grid window.
///
/// Feasible when the minimum slope is `>= 0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuantileMinimumIncrement;

impl QuantileMinimumIncrement {
    /// Grid size of the initial search.
    pub const GRID: usize = 100;
    /// Forward-difference step.
    pub const STEP: f64 = 1e-5;
    /// Iteration cap of the polish.
    pub const MAX_ITER: u64 = 100;
    /// Absolute tolerance of the polish; tail violations can be narrower than `STEP`.
    pub const POLISH_TOL: f64 = 1e-12;
}

/// Forward-difference slope of the quantile at `p`; steps backwards when `p + h` leaves the support.
fn quantile_slope(kernel: &MetalogKernel, p: f64) -> f64 {
    let mut h = QuantileMinimumIncrement::STEP;
    if !kernel.quantile(p + h).is_finite() {
        h = -h;
    }
    let slope = (kernel.quantile(p + h) - kernel.quantile(p)) / h;
    if slope.is_nan() { f64::INFINITY } else { slope }
}

struct SlopeProblem<'a> {
    kernel: &'a MetalogKernel,
}

impl<'a> CostFunction for SlopeProblem<'a> {
    type Param = f64;
    type Output = f64;

    fn cost(&self, p: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        Ok(quantile_slope(self.kernel, *p))
    }
}

impl FeasibilityScore for QuantileMinimumIncrement {
    fn method(&self) -> FeasibilityMethod {
        FeasibilityMethod::QuantileMinimumIncrement
    }

    fn score(&self, kernel: &MetalogKernel) -> Result<f64> {
        let ps = linspace(CHECK_FROM, 1.0 - CHECK_FROM, Self::GRID);
        let xs = kernel.quantiles(&ps);
        let (i, _) = xs
            .windows(2)
            .map(|w| w[1] - w[0])
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or_else(|| Error::Computation("empty feasibility grid".to_string()))?;
        let p0 = ps[i];
        let start = quantile_slope(kernel, p0);

        // Polish around the steepest-descent window only; the tails extend to the support ends.
        let lo = if i == 0 { 0.0 } else { ps[i - 1] };
        let hi = if i + 2 >= ps.len() { 1.0 } else { ps[i + 2] };
        let solver = BrentOpt::new(lo, hi).set_tolerance(f64::EPSILON.sqrt(), Self::POLISH_TOL);
        let res = Executor::new(SlopeProblem { kernel }, solver)
            .configure(|state| state.param(p0).max_iters(Self::MAX_ITER))
            .run()
            .map_err(|e| Error::Computation(format!("minimum-slope search failed: {e}")))?;
        let polished = res.state().get_best_cost();

        // The polish may settle in a different basin; never report worse than the start.
        Ok(if polished < start { polished } else { start })
    }

    fn is_feasible(&self, score: f64) -> bool {
        score >= 0.0
    }

    fn violation(&self, score: f64) -> f64 {
        if score.is_nan() { f64::INFINITY } else { (-score).max(0.0).ln_1p() }
    }
}

/// Scale-free penalty `Σ ln(1 - Δ)` over the negative quantile increments Δ.
///
/// Feasible only when no increment on the grid is negative.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuantileSumNegativeIncrements;

impl QuantileSumNegativeIncrements {
    /// Grid size.
    pub const GRID: usize = 200;
}

impl FeasibilityScore for QuantileSumNegativeIncrements {
    fn method(&self) -> FeasibilityMethod {
        FeasibilityMethod::QuantileSumNegativeIncrements
    }

    fn score(&self, kernel: &MetalogKernel) -> Result<f64> {
        let ps = linspace(CHECK_FROM, 1.0 - CHECK_FROM, Self::GRID);
        let mut prev = f64::NEG_INFINITY;
        let mut score = 0.0;
        for x in kernel.quantiles(&ps) {
            let diff = x - prev;
            if diff < 0.0 {
                score += (-diff).ln_1p();
            }
            prev = x;
        }
        Ok(score)
    }

    fn is_feasible(&self, score: f64) -> bool {
        score == 0.0
    }

    fn violation(&self, score: f64) -> f64 {
        if score.is_nan() { f64::INFINITY } else { score.abs() }
    }
}

/// Sum of the negative reciprocal densities `1 / m(p)` on the grid (absolute value).
///
/// A negative reciprocal density means the quantile function turns down there.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmallMReciprocal;

impl SmallMReciprocal {
    /// Grid size.
    pub const GRID: usize = 100;
}

impl FeasibilityScore for SmallMReciprocal {
    fn method(&self) -> FeasibilityMethod {
        FeasibilityMethod::SmallMReciprocal
    }

    fn score(&self, kernel: &MetalogKernel) -> Result<f64> {
        let mut negative_sum = 0.0;
        for p in linspace(CHECK_FROM, 1.0 - CHECK_FROM, Self::GRID) {
            let reciprocal = 1.0 / kernel.density(p)?;
            if reciprocal < 0.0 {
                negative_sum += reciprocal;
            }
        }
        Ok(negative_sum.abs())
    }

    fn is_feasible(&self, score: f64) -> bool {
        score == 0.0
    }

    fn violation(&self, score: f64) -> f64 {
        // Reciprocal densities reach ~1/(p(1-p)) at the grid edges.
        if score.is_nan() { f64::INFINITY } else { (score.abs() / Self::GRID as f64).ln_1p() }
    }
}

/// Average squared difference between the sample probabilities and the CDF at the sample values.
pub fn mean_square_error(kernel: &MetalogKernel, samples: &Samples) -> Result<f64> {
    let mut sum = 0.0;
    for (p, x) in samples.iter() {
        let residual = p - kernel.cdf(x)?;
        sum += residual * residual;
    }
    Ok(sum / samples.len() as f64)
}
