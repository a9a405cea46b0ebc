use crate::core::forcefield::params::ScoringParams;
use crate::core::io::payload::{ScoreRequest, ScoreResponse};
use crate::engine::error::EngineError;
use crate::engine::scorer::Scorer;
use std::sync::Arc;
use tracing::{info, instrument};

/// Scores the request's conformation, after applying its diff if present.
#[instrument(skip_all, name = "score_workflow", fields(residues = request.sequence.len()))]
pub fn run(request: &ScoreRequest, params: Arc<ScoringParams>) -> Result<ScoreResponse, EngineError> {
    let conformation = request.build_conformation(&params.rotamer_library)?;
    let mut scorer = Scorer::new(conformation, params);

    let breakdown = match &request.diff {
        Some(diff) => {
            let mv = diff.to_move();
            info!(res_idx = mv.res_idx(), kind = mv.kind().name(), "Applying diff.");
            scorer.rescore(&mv)?
        }
        None => scorer.breakdown().clone(),
    };

    info!(score = breakdown.total, "Scoring complete.");
    Ok(ScoreResponse::from(&breakdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::error::PayloadError;
    use crate::core::io::payload::{DiffRecord, MoveRecord};
    use crate::core::models::ideal::IdealChain;

    fn request() -> ScoreRequest {
        let params = ScoringParams::shared_default();
        let conf = IdealChain::new("MKTAYIAK")
            .with_target_ss("CCHHHHCC")
            .build(&params.rotamer_library)
            .unwrap();
        ScoreRequest::from_conformation(&conf)
    }

    #[test]
    fn per_residue_length_matches_sequence() {
        let response = run(&request(), ScoringParams::shared_default()).unwrap();
        assert_eq!(response.per_residue.len(), 8);
        let indices: Vec<usize> = response.per_residue.iter().map(|r| r.i).collect();
        assert_eq!(indices, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn diff_score_matches_full_score_of_the_moved_coordinates() {
        let params = ScoringParams::shared_default();
        let mut req = request();
        req.diff = Some(DiffRecord {
            res_idx: 3,
            mv: MoveRecord::Psi { delta: 10.0 },
        });
        let incremental = run(&req, Arc::clone(&params)).unwrap();

        let mut scorer = Scorer::new(req.build_conformation(&params.rotamer_library).unwrap(), params);
        scorer.rescore(&req.diff.as_ref().unwrap().to_move()).unwrap();
        let full = scorer.full_score();
        assert!((incremental.score - full.total).abs() < 1e-6);
    }

    #[test]
    fn invalid_diff_is_rejected() {
        let mut req = request();
        req.diff = Some(DiffRecord {
            res_idx: 0,
            mv: MoveRecord::Phi { delta: 5.0 },
        });
        assert!(matches!(
            run(&req, ScoringParams::shared_default()),
            Err(EngineError::InvalidMove(_))
        ));
    }

    #[test]
    fn malformed_payload_is_a_schema_error() {
        let mut req = request();
        req.atoms[0].elem = "Xx".to_string();
        assert!(matches!(
            run(&req, ScoringParams::shared_default()),
            Err(EngineError::Payload(PayloadError::Schema(_)))
        ));
    }
}
