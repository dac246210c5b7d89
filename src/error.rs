// src/error.rs
//! Error type shared by the integrator, config intake and plotting code.

use thiserror::Error;

/// Errors produced while building or presenting a pendulum simulation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PendulumError {
    /// A physical or numerical parameter is out of range (e.g. a zero mass).
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A 3x3 matrix had a zero pivot during inversion.
    #[error("matrix is singular")]
    SingularMatrix,

    /// Rendering or encoding the trajectory plot failed.
    #[error("plot rendering failed: {0}")]
    Plot(String),
}

impl PendulumError {
    /// Creates an invalid parameter error.
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Checks that `value` is finite, returning it unchanged.
pub fn require_finite(name: &str, value: f64) -> Result<f64, PendulumError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PendulumError::invalid(name, format!("must be finite, got {value}")))
    }
}

/// Checks that `value` is finite and strictly positive, returning it unchanged.
pub fn require_positive(name: &str, value: f64) -> Result<f64, PendulumError> {
    require_finite(name, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(PendulumError::invalid(name, format!("must be > 0, got {value}")))
    }
}
