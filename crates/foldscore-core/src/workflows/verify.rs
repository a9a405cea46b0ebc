use crate::core::forcefield::params::ScoringParams;
use crate::core::forcefield::scoring::{ScoreBreakdown, ScoringContext};
use crate::core::io::error::PayloadError;
use crate::core::io::payload::ScoreRequest;
use crate::core::spatial::grid::SpatialIndex;
use crate::engine::error::EngineError;
use tracing::{info, instrument, warn};

/// Largest accepted gap between a claimed score and the recomputed one.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Outcome of rescoring a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub claimed: f64,
    pub breakdown: ScoreBreakdown,
    pub accepted: bool,
}

impl Verification {
    pub fn recomputed(&self) -> f64 {
        self.breakdown.total
    }

    pub fn discrepancy(&self) -> f64 {
        (self.breakdown.total - self.claimed).abs()
    }
}

/// Rescores submitted coordinates from scratch, with a fresh spatial index and
/// no cached state, and compares against the client's claimed score.
///
/// Submissions are final coordinates, so a request carrying a diff is refused.
#[instrument(skip_all, name = "verify_submission", fields(claimed = claimed))]
pub fn verify_submission(
    request: &ScoreRequest,
    claimed: f64,
    params: &ScoringParams,
    tolerance: f64,
) -> Result<Verification, EngineError> {
    if request.diff.is_some() {
        return Err(PayloadError::Schema("a submission must not carry a diff".to_string()).into());
    }
    let conformation = request.build_conformation(&params.rotamer_library)?;
    let index = SpatialIndex::build(&conformation, params.spatial.cell_size);
    let breakdown = ScoringContext::new(&conformation, &index, params).full_breakdown();

    let accepted = claimed.is_finite() && (breakdown.total - claimed).abs() <= tolerance;
    if accepted {
        info!(score = breakdown.total, "Submission verified.");
    } else {
        warn!(
            claimed,
            recomputed = breakdown.total,
            "Submitted score does not match the recomputed score."
        );
    }
    Ok(Verification {
        claimed,
        breakdown,
        accepted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::payload::{DiffRecord, MoveRecord};
    use crate::core::models::ideal::IdealChain;
    use crate::workflows::score;
    use std::sync::Arc;

    fn request() -> ScoreRequest {
        let params = ScoringParams::shared_default();
        let conf = IdealChain::new("GAVLIMFW")
            .build(&params.rotamer_library)
            .unwrap();
        ScoreRequest::from_conformation(&conf)
    }

    #[test]
    fn honest_claim_is_accepted() {
        let params = ScoringParams::shared_default();
        let req = request();
        let claimed = score::run(&req, Arc::clone(&params)).unwrap().score;
        let result = verify_submission(&req, claimed, &params, DEFAULT_TOLERANCE).unwrap();
        assert!(result.accepted);
        assert!(result.discrepancy() <= DEFAULT_TOLERANCE);
    }

    #[test]
    fn inflated_claim_is_rejected() {
        let params = ScoringParams::shared_default();
        let req = request();
        let honest = score::run(&req, Arc::clone(&params)).unwrap().score;
        let result = verify_submission(&req, honest + 5.0, &params, DEFAULT_TOLERANCE).unwrap();
        assert!(!result.accepted);
        assert!((result.recomputed() - honest).abs() < 1e-9);
    }

    #[test]
    fn non_finite_claim_is_rejected() {
        let params = ScoringParams::shared_default();
        let result = verify_submission(&request(), f64::NAN, &params, DEFAULT_TOLERANCE).unwrap();
        assert!(!result.accepted);
    }

    #[test]
    fn submissions_with_a_diff_are_refused() {
        let params = ScoringParams::shared_default();
        let mut req = request();
        req.diff = Some(DiffRecord {
            res_idx: 2,
            mv: MoveRecord::Psi { delta: 5.0 },
        });
        assert!(matches!(
            verify_submission(&req, 0.0, &params, DEFAULT_TOLERANCE),
            Err(EngineError::Payload(PayloadError::Schema(_)))
        ));
    }
}
