use super::error::EngineError;
use super::scorer::Scorer;
use crate::core::forcefield::scoring::ScoreBreakdown;
use crate::core::forcefield::term::EnergyTerm;
use crate::core::models::conformation::MovedAtom;
use crate::core::models::ids::AtomId;
use crate::core::models::moves::Move;
use nalgebra::Point3;
use slotmap::SecondaryMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Undo log of an open transaction: the first recorded value of everything
/// the transaction overwrote.
#[derive(Debug, Clone)]
pub(crate) struct Journal {
    positions: SecondaryMap<AtomId, Point3<f64>>,
    moved_residues: Vec<usize>,
    cache: HashMap<usize, EnergyTerm>,
    breakdown: ScoreBreakdown,
}

impl Journal {
    fn new(breakdown: ScoreBreakdown) -> Self {
        Self {
            positions: SecondaryMap::new(),
            moved_residues: Vec::new(),
            cache: HashMap::new(),
            breakdown,
        }
    }

    pub(crate) fn record_move(&mut self, res_idx: usize, moved: &[MovedAtom]) {
        if moved.is_empty() {
            return;
        }
        if !self.moved_residues.contains(&res_idx) {
            self.moved_residues.push(res_idx);
        }
        for &(id, old) in moved {
            if !self.positions.contains_key(id) {
                self.positions.insert(id, old);
            }
        }
    }

    pub(crate) fn record_cache(&mut self, res_idx: usize, previous: EnergyTerm) {
        self.cache.entry(res_idx).or_insert(previous);
    }
}

/// Exact outcome of trying one move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub mv: Move,
    /// Score after minus score before.
    pub delta_score: f64,
    /// Raw per-term change (after minus before).
    pub term_deltas: EnergyTerm,
    pub score_after: f64,
}

impl Scorer {
    /// Runs `action` and then restores coordinates, index, cache and
    /// breakdown to their state before the call, whether or not it succeeded.
    pub fn transaction<F, R>(&mut self, action: F) -> Result<R, EngineError>
    where
        F: FnOnce(&mut Self) -> Result<R, EngineError>,
    {
        if self.journal.is_some() {
            return Err(EngineError::Internal(
                "transactions cannot be nested".to_string(),
            ));
        }
        // 1. Open the journal.
        self.journal = Some(Journal::new(self.breakdown.clone()));

        // 2. Execute the action.
        let result = action(self);

        // 3. Roll back everything it touched.
        let journal = self
            .journal
            .take()
            .ok_or_else(|| EngineError::Internal("transaction journal vanished".to_string()))?;
        self.rollback(journal)?;

        result
    }

    fn rollback(&mut self, journal: Journal) -> Result<(), EngineError> {
        for (id, position) in &journal.positions {
            self.conformation.set_position(id, *position);
            self.index.update_position(id, *position);
        }
        let params = Arc::clone(self.params());
        for &res_idx in &journal.moved_residues {
            self.conformation
                .refresh_around(res_idx, &params.rotamer_library);
        }
        for (&res_idx, terms) in &journal.cache {
            self.cache.replace(res_idx, *terms)?;
        }
        self.breakdown = journal.breakdown;
        Ok(())
    }

    /// Scores `mv` exactly without keeping it.
    pub fn evaluate(&mut self, mv: &Move) -> Result<Evaluation, EngineError> {
        let before_total = self.breakdown.total;
        let before_terms = self.breakdown.terms;
        self.transaction(|scorer| {
            let after = scorer.rescore(mv)?;
            Ok(Evaluation {
                mv: *mv,
                delta_score: after.total - before_total,
                term_deltas: after.terms - before_terms,
                score_after: after.total,
            })
        })
    }
}
