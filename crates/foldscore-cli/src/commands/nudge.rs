use super::{read_request, write_response};
use crate::cli::NudgeArgs;
use crate::config::PartialConfig;
use crate::error::Result;
use foldscore::engine::nudge::model::{DeltaModel, LinearDeltaModel};
use foldscore::workflows;
use std::sync::Arc;
use tracing::{info, warn};

pub fn run(args: NudgeArgs) -> Result<()> {
    let config = PartialConfig::load(&args.common)?;
    let params = config.scoring_params(args.common.params.as_deref())?;
    let nudge_config = config.nudge_config(&args)?;

    let model: Option<Arc<dyn DeltaModel>> = match config.model_path(&args) {
        Some(path) if nudge_config.use_model => {
            info!("Loading delta model from {:?}", path);
            match LinearDeltaModel::load(&path) {
                Ok(model) => Some(Arc::new(model)),
                Err(e) => {
                    warn!("{}; falling back to heuristic evaluation.", e);
                    None
                }
            }
        }
        Some(path) => {
            warn!("Model use is disabled; ignoring {:?}", path);
            None
        }
        None => None,
    };

    let request = read_request(&args.common.input)?;
    info!("Invoking the nudge workflow...");
    let response = workflows::nudge::run(&request, params, &nudge_config, model)?;
    info!(
        res_idx = response.res_idx,
        delta = response.expected_delta_score,
        model_used = response.model_used,
        "Nudge suggested."
    );
    if let Some(note) = &response.note {
        warn!("{}", note);
    }

    write_response(&response, args.common.output.as_ref())
}
