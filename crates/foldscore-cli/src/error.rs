use foldscore::core::forcefield::params::ParamLoadError;
use foldscore::core::io::payload::PayloadIoError;
use foldscore::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Failed to load scoring parameters: {0}")]
    Params(#[from] ParamLoadError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to write '{path}': {source}", path = path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: PayloadIoError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Submitted score {claimed} does not match recomputed score {recomputed}")]
    Rejected { claimed: f64, recomputed: f64 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
