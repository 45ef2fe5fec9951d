//! # mlg-inference
//!
//! Fitting metalog distributions to quantile samples.
//!
//! - [`lls`]: linear least squares on the basis matrix (normal equations)
//! - [`feasibility`]: three interchangeable monotonicity scores
//! - [`refine`]: two-stage constrained refinement of infeasible fits
//! - [`fit`]: the fit pipeline producing an immutable [`FitResult`](mlg_core::FitResult)
//! - [`distribution`]: the [`Metalog`] distribution
//!
//! ```no_run
//! use mlg_core::ContinuousDistribution;
//! use mlg_inference::{Metalog, MetalogConfig, Samples};
//!
//! let samples = Samples::new(vec![0.1, 0.5, 0.9], vec![1.0, 2.0, 3.0])?;
//! let metalog = Metalog::fit(samples, &MetalogConfig::default())?;
//! assert!(metalog.valid_distribution()?);
//! let median = metalog.quantile(0.5);
//! # let _ = median;
//! # Ok::<(), mlg_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// The [`Metalog`] distribution.
pub mod distribution;
/// Feasibility scores and mean-square error.
pub mod feasibility;
/// Fit configuration and pipeline.
pub mod fit;
/// Linear least squares.
pub mod lls;
/// Optimizer wrappers (argmin backend).
pub mod optimizer;
/// Plot data producers.
pub mod plot;
/// Constrained numeric refinement.
pub mod refine;
/// Quantile samples.
pub mod samples;
/// Fit summary.
pub mod summary;

pub use distribution::Metalog;
pub use feasibility::{FeasibilityScore, mean_square_error, strategy};
pub use fit::{MetalogConfig, MetalogFitter};
pub use optimizer::{
    LbfgsOptimizer, ObjectiveFunction, OptimizationResult, OptimizerConfig, TrustRegionConfig,
    TrustRegionOptimizer,
};
pub use plot::{CdfPlotData, PdfPlotData, PlotRange};
pub use refine::{RefinerConfig, Refinement};
pub use samples::Samples;
pub use summary::FitSummary;
