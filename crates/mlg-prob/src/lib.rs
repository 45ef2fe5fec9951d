//! Evaluation building blocks for metalog distributions.
//!
//! This crate hosts the pure math of a metalog with a known a-vector:
//! - bounds transform between the support and unconstrained space
//! - the basis functions and the basis ("Y") matrix used for fitting
//! - quantile and density recurrences (Keelin 2016)
//! - CDF evaluation by bracketed root finding on the quantile function
//!
//! Fitting lives in `mlg-inference`.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Basis functions and the basis matrix.
pub mod basis;
/// Unbounded density (reciprocal recurrence).
pub mod density;
/// [`MetalogKernel`]: coefficients + bounds.
pub mod kernel;
/// Numerically-stable scalar helpers.
pub mod math;
/// Unbounded quantile recurrence.
pub mod quantile;
/// Bracketed root finding (CDF inversion).
pub mod roots;
/// Bounds transform.
pub mod transforms;

pub use basis::{MIN_TERM, basis_matrix, basis_row};
pub use kernel::MetalogKernel;
pub use roots::{RootConfig, invert_quantile};
pub use transforms::SupportTransform;
