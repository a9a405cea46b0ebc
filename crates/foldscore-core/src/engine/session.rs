use super::config::NudgeConfig;
use super::error::EngineError;
use super::nudge::model::DeltaModel;
use super::nudge::selector::{NudgeSelector, Suggestion};
use super::scorer::Scorer;
use crate::core::forcefield::params::ScoringParams;
use crate::core::forcefield::scoring::ScoreBreakdown;
use crate::core::models::conformation::Conformation;
use crate::core::models::moves::Move;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// A long-lived scoring session shared between request handlers.
///
/// Moves take the write lock for their whole rescore, so readers never see a
/// half-applied move. Nudges work on a snapshot taken under the read lock.
#[derive(Debug)]
pub struct Session {
    scorer: RwLock<Scorer>,
    config: NudgeConfig,
    model: Option<Arc<dyn DeltaModel>>,
}

impl Session {
    pub fn new(conformation: Conformation, params: Arc<ScoringParams>) -> Self {
        Self {
            scorer: RwLock::new(Scorer::new(conformation, params)),
            config: NudgeConfig::default(),
            model: None,
        }
    }

    pub fn with_config(mut self, config: NudgeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_model(mut self, model: Arc<dyn DeltaModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn breakdown(&self) -> ScoreBreakdown {
        self.scorer.read().breakdown().clone()
    }

    /// Rescores from scratch without touching the cache.
    pub fn full_score(&self) -> ScoreBreakdown {
        self.scorer.read().full_score()
    }

    pub fn apply_move(&self, mv: &Move) -> Result<ScoreBreakdown, EngineError> {
        self.scorer.write().rescore(mv)
    }

    /// A private copy of the current scorer state.
    pub fn snapshot(&self) -> Scorer {
        self.scorer.read().clone()
    }

    /// Replaces the conformation, keeping the parameters.
    pub fn reset(&self, conformation: Conformation) {
        let mut guard = self.scorer.write();
        let params = Arc::clone(guard.params());
        *guard = Scorer::new(conformation, params);
        info!(residues = guard.conformation().len(), "Session reset.");
    }

    /// Suggests one move for the current conformation without applying it.
    pub fn nudge(&self) -> Result<Suggestion, EngineError> {
        let snapshot = self.snapshot();
        self.selector().run(&snapshot)
    }

    /// Suggests a move and applies it if its exact ΔScore is positive.
    pub fn nudge_and_apply(&self) -> Result<(Suggestion, ScoreBreakdown), EngineError> {
        let mut guard = self.scorer.write();
        let mut selector = self.selector();
        let suggestion = selector.run(&guard)?;
        let breakdown = if suggestion.expected_delta_score > 0.0 {
            selector.apply(&mut guard)?
        } else {
            selector.cancel()?;
            guard.breakdown().clone()
        };
        Ok((suggestion, breakdown))
    }

    fn selector(&self) -> NudgeSelector {
        let selector = NudgeSelector::new(self.config.clone());
        match &self.model {
            Some(model) => selector.with_model(Arc::clone(model)),
            None => selector,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ideal::IdealChain;

    fn session() -> Session {
        let params = ScoringParams::shared_default();
        let conf = IdealChain::new("ACDEFGHIK")
            .build(&params.rotamer_library)
            .unwrap();
        Session::new(conf, params)
    }

    #[test]
    fn apply_move_updates_the_shared_breakdown() {
        let s = session();
        let after = s.apply_move(&Move::psi(3, 10.0)).unwrap();
        assert_eq!(s.breakdown(), after);
        assert!((s.full_score().total - after.total).abs() < 1e-9);
    }

    #[test]
    fn rejected_move_leaves_state_unchanged() {
        let s = session();
        let before = s.breakdown();
        assert!(s.apply_move(&Move::phi(0, 5.0)).is_err());
        assert_eq!(s.breakdown(), before);
    }

    #[test]
    fn nudge_does_not_modify_the_session() {
        let s = session();
        let before = s.breakdown();
        let suggestion = s.nudge().unwrap();
        assert_eq!(s.breakdown(), before);
        assert!(suggestion.expected_delta_score.is_finite());
    }

    #[test]
    fn nudge_and_apply_only_commits_improvements() {
        let s = session();
        let before = s.breakdown().total;
        let (suggestion, after) = s.nudge_and_apply().unwrap();
        if suggestion.expected_delta_score > 0.0 {
            assert!((after.total - before - suggestion.expected_delta_score).abs() < 1e-9);
        } else {
            assert_eq!(after.total, before);
        }
    }

    #[test]
    fn reset_rescoring_matches_a_fresh_session() {
        let s = session();
        s.apply_move(&Move::phi(4, -10.0)).unwrap();
        let params = ScoringParams::shared_default();
        let conf = IdealChain::new("ACDEFGHIK")
            .build(&params.rotamer_library)
            .unwrap();
        s.reset(conf);
        assert_eq!(s.breakdown(), session().breakdown());
    }

    #[test]
    fn session_is_shareable_across_threads() {
        let s = Arc::new(session());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let s = Arc::clone(&s);
                std::thread::spawn(move || s.apply_move(&Move::psi(1 + i, 5.0)).unwrap().total)
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap().is_finite());
        }
        assert!((s.full_score().total - s.breakdown().total).abs() < 1e-9);
    }
}
