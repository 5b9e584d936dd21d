//! Unified error type for cascade simulations
//!
//! Every caller-input problem is reported through [`CascadeError`] before any
//! per-run state is created. Nothing here is transient, so nothing is retried.
//!
//! # Example
//!
//! ```
//! use cascade_core::{CascadeError, CascadeResult};
//!
//! fn check_alpha(alpha: f64) -> CascadeResult<f64> {
//!     if !(0.0..=1.0).contains(&alpha) {
//!         return Err(CascadeError::InvalidParameter(format!(
//!             "alpha must lie in [0, 1], got {alpha}"
//!         )));
//!     }
//!     Ok(alpha)
//! }
//!
//! assert!(check_alpha(0.5).is_ok());
//! assert!(check_alpha(1.5).is_err());
//! ```

use thiserror::Error;

/// Error type shared by the topology model, the seed selector and the engine.
#[derive(Error, Debug)]
pub enum CascadeError {
    /// A numeric parameter is outside its domain (alpha, seed fraction, round cap, seed ids)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A seed-selection policy name that does not map to any known policy
    #[error("Unsupported seed policy: '{0}'")]
    UnsupportedPolicy(String),

    /// The topology has no buses, so there is nothing to simulate
    #[error("Empty topology: the network has no buses")]
    EmptyTopology,

    /// Topology invariant violations (unknown branch endpoint, duplicate bus id)
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Convenience type alias for Results using CascadeError.
pub type CascadeResult<T> = Result<T, CascadeError>;
