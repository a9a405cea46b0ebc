use super::candidates::{self, Candidate};
use super::features;
use super::model::{DeltaModel, PredictError};
use crate::core::forcefield::scoring::ScoreBreakdown;
use crate::core::forcefield::term::EnergyTerm;
use crate::core::models::moves::Move;
use crate::engine::config::NudgeConfig;
use crate::engine::error::EngineError;
use crate::engine::scorer::Scorer;
use crate::engine::transaction::Evaluation;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Note attached to a suggestion whose exact ΔScore is not positive.
pub const NO_IMPROVEMENT_NOTE: &str = "no guaranteed improvement";

/// Lifecycle of one nudge request.
///
/// `Idle → CandidatesGenerated → Evaluated → Suggested → (Applied | Cancelled) → Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NudgePhase {
    #[default]
    Idle,
    CandidatesGenerated,
    Evaluated,
    Suggested,
    Applied,
    Cancelled,
}

/// The move a nudge recommends, with its exactly computed effect.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub mv: Move,
    pub expected_delta_score: f64,
    pub term_deltas: EnergyTerm,
    pub model_used: bool,
    pub note: Option<String>,
    pub candidates_considered: usize,
    pub candidates_verified: usize,
}

/// Drives one nudge request through its phases.
#[derive(Debug)]
pub struct NudgeSelector {
    config: NudgeConfig,
    model: Option<Arc<dyn DeltaModel>>,
    phase: NudgePhase,
    candidates: Vec<Candidate>,
    evaluated: Vec<(Candidate, Evaluation)>,
    model_used: bool,
    suggestion: Option<Suggestion>,
}

impl NudgeSelector {
    pub fn new(config: NudgeConfig) -> Self {
        Self {
            config,
            model: None,
            phase: NudgePhase::Idle,
            candidates: Vec::new(),
            evaluated: Vec::new(),
            model_used: false,
            suggestion: None,
        }
    }

    pub fn with_model(mut self, model: Arc<dyn DeltaModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn phase(&self) -> NudgePhase {
        self.phase
    }

    pub fn config(&self) -> &NudgeConfig {
        &self.config
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    fn require(&self, expected: &[NudgePhase], action: &'static str) -> Result<(), EngineError> {
        if expected.contains(&self.phase) {
            Ok(())
        } else {
            Err(EngineError::InvalidTransition {
                from: self.phase,
                action,
            })
        }
    }

    /// Proposes candidate moves around the worst residues of `scorer`.
    #[instrument(skip_all, name = "nudge_generate")]
    pub fn generate(&mut self, scorer: &Scorer) -> Result<&[Candidate], EngineError> {
        self.require(&[NudgePhase::Idle], "generate candidates")?;
        let candidates = candidates::generate(scorer, &self.config);
        if candidates.is_empty() {
            return Err(EngineError::NoCandidates);
        }
        debug!(count = candidates.len(), "Candidates generated.");
        self.candidates = candidates;
        self.phase = NudgePhase::CandidatesGenerated;
        Ok(&self.candidates)
    }

    /// Scores candidates exactly on copies of `scorer`.
    ///
    /// With a model, only the `verify_top` best predictions are rescored; if
    /// the model fails every candidate is rescored instead.
    #[instrument(skip_all, name = "nudge_evaluate", fields(candidates = self.candidates.len()))]
    pub fn evaluate(&mut self, scorer: &Scorer) -> Result<(), EngineError> {
        self.require(&[NudgePhase::CandidatesGenerated], "evaluate candidates")?;

        let shortlist = match (&self.model, self.config.use_model) {
            (Some(model), true) => match self.shortlist(model.as_ref(), scorer) {
                Ok(shortlist) => {
                    self.model_used = true;
                    shortlist
                }
                Err(e) => {
                    warn!(
                        model = model.name(),
                        error = %e,
                        "Delta model failed; evaluating every candidate exactly."
                    );
                    self.model_used = false;
                    self.candidates.clone()
                }
            },
            _ => {
                self.model_used = false;
                self.candidates.clone()
            }
        };

        // A failed evaluation abandons the round and returns to `Idle`.
        let evaluated = match evaluate_exact(scorer, &shortlist) {
            Ok(evaluated) if !evaluated.is_empty() => evaluated,
            Ok(_) => {
                self.clear();
                return Err(EngineError::NoCandidates);
            }
            Err(e) => {
                self.clear();
                return Err(e);
            }
        };
        self.evaluated = evaluated;
        debug!(
            verified = self.evaluated.len(),
            model_used = self.model_used,
            "Candidates evaluated."
        );
        self.phase = NudgePhase::Evaluated;
        Ok(())
    }

    fn shortlist(&self, model: &dyn DeltaModel, scorer: &Scorer) -> Result<Vec<Candidate>, PredictError> {
        let ctx = scorer.context();
        let vectors = features::extract_all(&ctx, scorer.breakdown(), &self.candidates);
        let mut predicted: Vec<(Candidate, f64)> = self
            .candidates
            .iter()
            .zip(&vectors)
            .map(|(c, x)| model.predict(x).map(|p| (*c, p)))
            .collect::<Result<_, _>>()?;
        predicted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.tie_break(&b.0)));
        Ok(predicted
            .into_iter()
            .take(self.config.verify_top.max(1))
            .map(|(c, _)| c)
            .collect())
    }

    /// Picks the best exactly-scored candidate.
    pub fn suggest(&mut self) -> Result<Suggestion, EngineError> {
        self.require(&[NudgePhase::Evaluated], "suggest")?;
        let (_, best) = self
            .evaluated
            .iter()
            .min_by(|a, b| rank(a, b))
            .ok_or(EngineError::NoCandidates)?;

        let note = (best.delta_score <= 0.0).then(|| NO_IMPROVEMENT_NOTE.to_string());
        let suggestion = Suggestion {
            mv: best.mv,
            expected_delta_score: best.delta_score,
            term_deltas: best.term_deltas,
            model_used: self.model_used,
            note,
            candidates_considered: self.candidates.len(),
            candidates_verified: self.evaluated.len(),
        };
        info!(
            res_idx = suggestion.mv.res_idx(),
            kind = suggestion.mv.kind().name(),
            delta = suggestion.expected_delta_score,
            model_used = suggestion.model_used,
            "Nudge suggestion selected."
        );
        self.suggestion = Some(suggestion.clone());
        self.phase = NudgePhase::Suggested;
        Ok(suggestion)
    }

    /// Commits the suggested move to `scorer`.
    pub fn apply(&mut self, scorer: &mut Scorer) -> Result<ScoreBreakdown, EngineError> {
        self.require(&[NudgePhase::Suggested], "apply")?;
        let suggestion = self
            .suggestion
            .as_ref()
            .ok_or_else(|| EngineError::Internal("suggested phase without a suggestion".to_string()))?;
        let breakdown = scorer.rescore(&suggestion.mv)?;
        self.phase = NudgePhase::Applied;
        Ok(breakdown)
    }

    pub fn cancel(&mut self) -> Result<(), EngineError> {
        self.require(&[NudgePhase::Suggested], "cancel")?;
        self.phase = NudgePhase::Cancelled;
        Ok(())
    }

    /// Returns to `Idle` after the suggestion was applied or cancelled.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        self.require(&[NudgePhase::Applied, NudgePhase::Cancelled], "reset")?;
        self.clear();
        Ok(())
    }

    fn clear(&mut self) {
        self.candidates.clear();
        self.evaluated.clear();
        self.suggestion = None;
        self.model_used = false;
        self.phase = NudgePhase::Idle;
    }

    /// Generates, evaluates, and suggests in one call.
    pub fn run(&mut self, scorer: &Scorer) -> Result<Suggestion, EngineError> {
        self.generate(scorer)?;
        self.evaluate(scorer)?;
        self.suggest()
    }
}

/// Higher ΔScore first; equal scores fall back to the candidate tie-break.
fn rank(a: &(Candidate, Evaluation), b: &(Candidate, Evaluation)) -> Ordering {
    b.1.delta_score
        .total_cmp(&a.1.delta_score)
        .then_with(|| a.0.tie_break(&b.0))
}

/// Rescores each candidate on a private copy of the scorer. Moves the
/// conformation cannot take are dropped.
fn evaluate_exact(
    scorer: &Scorer,
    candidates: &[Candidate],
) -> Result<Vec<(Candidate, Evaluation)>, EngineError> {
    let try_one = |local: &mut Scorer, c: &Candidate| match local.evaluate(&c.mv) {
        Ok(evaluation) => Ok(Some((*c, evaluation))),
        Err(EngineError::InvalidMove(e)) => {
            debug!(error = %e, "Skipping candidate the conformation rejects.");
            Ok(None)
        }
        Err(e) => Err(e),
    };

    #[cfg(feature = "parallel")]
    let results: Vec<Option<(Candidate, Evaluation)>> = candidates
        .par_iter()
        .map_init(|| scorer.clone(), |local, c| try_one(local, c))
        .collect::<Result<_, _>>()?;

    #[cfg(not(feature = "parallel"))]
    let results: Vec<Option<(Candidate, Evaluation)>> = {
        let mut local = scorer.clone();
        candidates
            .iter()
            .map(|c| try_one(&mut local, c))
            .collect::<Result<_, _>>()?
    };

    Ok(results.into_iter().flatten().collect())
}
