use thiserror::Error;

use super::config::ConfigError;
use super::nudge::selector::NudgePhase;
use crate::core::forcefield::params::ParamLoadError;
use crate::core::io::error::PayloadError;
use crate::core::models::moves::MoveError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("Invalid move: {0}")]
    InvalidMove(#[from] MoveError),

    #[error("Score cache is inconsistent: {0}")]
    CacheInconsistency(String),

    #[error("Invalid nudge transition: cannot {action} while {from:?}")]
    InvalidTransition {
        from: NudgePhase,
        action: &'static str,
    },

    #[error("No nudge candidates could be generated for this conformation")]
    NoCandidates,

    #[error("Parameter loading failed: {0}")]
    Params(#[from] ParamLoadError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal logic error: {0}")]
    Internal(String),
}
