pub mod nudge;
pub mod score;
pub mod verify;

use crate::error::{CliError, Result};
use foldscore::core::io::payload::{JsonPayload, ScoreRequest};
use std::path::{Path, PathBuf};
use tracing::info;

pub(crate) fn read_request(path: &Path) -> Result<ScoreRequest> {
    info!("Loading score request from {:?}", path);
    ScoreRequest::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

/// Writes a response to `output`, or to stdout when no path is given.
pub(crate) fn write_response<T: JsonPayload>(response: &T, output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            response
                .write_to_path(path)
                .map_err(|source| CliError::Output {
                    path: path.clone(),
                    source,
                })?;
            info!("Response written to {:?}", path);
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            response.write_to(&mut lock).map_err(|source| CliError::Output {
                path: PathBuf::from("<stdout>"),
                source,
            })?;
        }
    }
    Ok(())
}
