//! Error types for the metalog crates

use thiserror::Error;

/// Metalog error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration or input data
    #[error("Validation error: {0}")]
    Validation(String),

    /// Argument outside the domain of a function (e.g. a probability outside `[0, 1]`)
    #[error("Domain error: {0}")]
    Domain(String),

    /// Normal-equations matrix is not invertible
    #[error("Singular matrix: {0}")]
    SingularMatrix(String),

    /// Root finder or optimizer did not converge
    #[error("Non-convergence: {0}")]
    NonConvergence(String),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_variant_prefix() {
        let e = Error::SingularMatrix("term 5 > 3 samples".to_string());
        assert_eq!(e.to_string(), "Singular matrix: term 5 > 3 samples");

        let e = Error::Domain("p = 1.5".to_string());
        assert!(e.to_string().starts_with("Domain error"));
    }
}
