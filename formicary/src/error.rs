//! Error types for colony operations and configuration.
//!
//! None of these are fatal to a running simulation: a failing per-ant
//! operation is reported to the caller and the tick carries on.

use thiserror::Error;

use crate::simulation::AntId;

/// Recoverable failures of colony and ant operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColonyError {
    /// Reproduction needs strictly more energy than it costs.
    #[error("ant {id} has {energy} energy, reproduction costs {cost}")]
    InsufficientEnergy { id: AntId, energy: u32, cost: u32 },

    #[error("ant {0} not found")]
    NotFound(AntId),

    #[error("food source not found")]
    FoodNotFound,

    #[error("ant {0} is dead")]
    AntDead(AntId),
}

/// Result type alias for colony operations.
pub type Result<T> = std::result::Result<T, ColonyError>;

/// Rejected configuration values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    #[must_use]
    pub fn invalid<S: Into<String>>(field: &'static str, reason: S) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
