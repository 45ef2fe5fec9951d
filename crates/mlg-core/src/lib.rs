//! # mlg-core
//!
//! Shared vocabulary for the metalog crates.
//!
//! - [`Error`] / [`Result`]: the single error type used across the workspace
//! - [`traits::ContinuousDistribution`]: `cdf` / `pdf` / `quantile` capability
//! - [`types`]: bounds, fit configuration tags and fit diagnostics
//!
//! Higher-level crates (`mlg-prob`, `mlg-inference`) depend on this crate and
//! never on each other's internals.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::ContinuousDistribution;
pub use types::{
    Boundedness, Bounds, FeasibilityMethod, FitDiagnostics, FitMethod, FitMethodUsed, FitResult,
    NumericSolver,
};
