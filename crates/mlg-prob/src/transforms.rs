//! Bounds transform between the support of a metalog and unconstrained space.
//!
//! The metalog is fitted and evaluated in an unconstrained coordinate `z`;
//! semi-bounded and bounded supports are reached through a bijection
//! `x = forward(z)` (Keelin 2016, sections 4.1 and 4.3).

use mlg_core::{Boundedness, Bounds};

use crate::math::sigmoid;

/// Bijection from unconstrained `z` to the declared support.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SupportTransform {
    /// `(-inf, inf) -> (-inf, inf)`, `x = z`.
    Identity,
    /// `(-inf, inf) -> (lower, inf)`, `x = lower + exp(z)`.
    Lower {
        /// Lower bound.
        lower: f64,
    },
    /// `(-inf, inf) -> (-inf, upper)`, `x = upper - exp(-z)`.
    Upper {
        /// Upper bound.
        upper: f64,
    },
    /// `(-inf, inf) -> (lower, upper)`, `x = (lower + upper * e^z) / (1 + e^z)`.
    Bounded {
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
    },
}

impl SupportTransform {
    /// Transform matching the declared bounds.
    pub fn from_bounds(bounds: &Bounds) -> Self {
        match (bounds.lower, bounds.upper) {
            (None, None) => Self::Identity,
            (Some(lower), None) => Self::Lower { lower },
            (None, Some(upper)) => Self::Upper { upper },
            (Some(lower), Some(upper)) => Self::Bounded { lower, upper },
        }
    }

    /// Boundedness tag of the target support.
    pub fn boundedness(&self) -> Boundedness {
        match self {
            Self::Identity => Boundedness::Unbounded,
            Self::Lower { .. } => Boundedness::Lower,
            Self::Upper { .. } => Boundedness::Upper,
            Self::Bounded { .. } => Boundedness::Bounded,
        }
    }

    /// Map unconstrained -> support: `x = forward(z)`.
    #[inline]
    pub fn forward(&self, z: f64) -> f64 {
        match *self {
            Self::Identity => z,
            Self::Lower { lower } => lower + z.exp(),
            Self::Upper { upper } => upper - (-z).exp(),
            Self::Bounded { lower, upper } => lower + (upper - lower) * sigmoid(z),
        }
    }

    /// Map support -> unconstrained: `z = inverse(x)`.
    ///
    /// Values on or outside the bounds give non-finite `z`; callers own that precondition.
    #[inline]
    pub fn inverse(&self, x: f64) -> f64 {
        match *self {
            Self::Identity => x,
            Self::Lower { lower } => (x - lower).ln(),
            Self::Upper { upper } => -(upper - x).ln(),
            Self::Bounded { lower, upper } => ((x - lower) / (upper - x)).ln(),
        }
    }

    /// Jacobian element `dx/dz` at `z`.
    #[inline]
    pub fn jacobian(&self, z: f64) -> f64 {
        match *self {
            Self::Identity => 1.0,
            Self::Lower { .. } => z.exp(),
            Self::Upper { .. } => (-z).exp(),
            Self::Bounded { lower, upper } => {
                let s = sigmoid(z);
                (upper - lower) * s * (1.0 - s)
            }
        }
    }

    /// The z-vector: every sample value mapped into unconstrained space.
    pub fn z_vector(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.inverse(x)).collect()
    }
}
