//! Error types for the mindsim runtime

use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors that can occur in the mindsim runtime
///
/// Only construction and boundary operations fail. A tick over a built
/// network never returns an error: missing references are skipped and
/// counted in [`crate::simulation::TickReport`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Invalid network configuration
    #[error("Invalid network configuration: {reason}")]
    InvalidConfiguration {
        /// Reason for invalid configuration
        reason: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// External input rejected at the engine boundary
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Reason the input was rejected
        reason: String,
    },

    /// Named region does not exist in the network
    #[error("Region {region} not found")]
    RegionNotFound {
        /// Region name or role that was not found
        region: String,
    },

    /// A tick was requested while the previous one is still pending
    #[error("A tick is already in flight for this engine")]
    TickInFlight,

    /// The engine worker thread is gone
    #[error("Engine worker disconnected")]
    WorkerDisconnected,
}

impl RuntimeError {
    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create a region-not-found error
    pub fn region_not_found(region: impl Into<String>) -> Self {
        Self::RegionNotFound {
            region: region.into(),
        }
    }
}
