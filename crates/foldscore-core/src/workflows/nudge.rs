use crate::core::forcefield::params::ScoringParams;
use crate::core::io::payload::{MoveRecord, NudgeResponse, ScoreRequest, TermsRecord};
use crate::engine::config::NudgeConfig;
use crate::engine::error::EngineError;
use crate::engine::nudge::model::DeltaModel;
use crate::engine::nudge::selector::{NudgeSelector, Suggestion};
use crate::engine::scorer::Scorer;
use std::sync::Arc;
use tracing::{info, instrument};

impl From<&Suggestion> for NudgeResponse {
    fn from(suggestion: &Suggestion) -> Self {
        Self {
            res_idx: suggestion.mv.res_idx(),
            mv: MoveRecord::from(&suggestion.mv),
            expected_delta_score: suggestion.expected_delta_score,
            explanation: TermsRecord::from(&suggestion.term_deltas),
            model_used: suggestion.model_used,
            note: suggestion.note.clone(),
        }
    }
}

/// Suggests one move for the request's conformation. A diff in the request is
/// applied first, so the suggestion starts from the edited state.
#[instrument(skip_all, name = "nudge_workflow", fields(residues = request.sequence.len()))]
pub fn run(
    request: &ScoreRequest,
    params: Arc<ScoringParams>,
    config: &NudgeConfig,
    model: Option<Arc<dyn DeltaModel>>,
) -> Result<NudgeResponse, EngineError> {
    config.validate()?;
    let conformation = request.build_conformation(&params.rotamer_library)?;
    let mut scorer = Scorer::new(conformation, params);
    if let Some(diff) = &request.diff {
        scorer.rescore(&diff.to_move())?;
    }

    let mut selector = NudgeSelector::new(config.clone());
    if let Some(model) = model {
        selector = selector.with_model(model);
    }
    let suggestion = selector.run(&scorer)?;
    info!(
        score = scorer.breakdown().total,
        delta = suggestion.expected_delta_score,
        "Nudge complete."
    );
    Ok(NudgeResponse::from(&suggestion))
}
