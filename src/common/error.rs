//! Error types for spatial_planner

use thiserror::Error;

/// Main error type for the planning engine
///
/// Failing to find a collision-free path is not an error: planners degrade
/// to a fallback path and report it through [`crate::common::PlanStatus`].
/// These variants are reserved for callers that violate the contract.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// A scenario, speed or density outside its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Algorithm name the engine does not know
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),
    /// Malformed TOML configuration
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for planning operations
pub type PlannerResult<T> = Result<T, PlannerError>;
