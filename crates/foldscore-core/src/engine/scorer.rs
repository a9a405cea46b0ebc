use super::cache::ScoreCache;
use super::error::EngineError;
use super::transaction::Journal;
use crate::core::forcefield::params::ScoringParams;
use crate::core::forcefield::scoring::{ScoreBreakdown, ScoringContext};
use crate::core::forcefield::term::EnergyTerm;
use crate::core::forcefield::terms::compact;
use crate::core::models::conformation::{Conformation, MovedAtom};
use crate::core::models::moves::Move;
use crate::core::spatial::grid::{Cell, SpatialIndex};
use nalgebra::Point3;
use std::sync::Arc;
use tracing::{debug, info, instrument, trace};

/// Incremental scorer for one conformation.
///
/// Owns the conformation, a spatial index kept in sync with its coordinates,
/// and the per-residue cache of local terms. After [`Scorer::rescore`] only the
/// residues with an atom within the interaction cutoff of a displaced atom
/// (at its old or new position) are recomputed.
#[derive(Debug, Clone)]
pub struct Scorer {
    pub(super) conformation: Conformation,
    pub(super) index: SpatialIndex,
    pub(super) cache: ScoreCache,
    pub(super) breakdown: ScoreBreakdown,
    pub(super) journal: Option<Journal>,
    params: Arc<ScoringParams>,
    moved: Vec<MovedAtom>,
    affected_mask: Vec<bool>,
    affected: Vec<usize>,
    touched_cells: Vec<(Cell, Point3<f64>)>,
}

impl Scorer {
    #[instrument(skip_all, name = "scorer_init", fields(residues = conformation.len()))]
    pub fn new(conformation: Conformation, params: Arc<ScoringParams>) -> Self {
        let index = SpatialIndex::build(&conformation, params.spatial.cell_size);
        let ctx = ScoringContext::new(&conformation, &index, &params);
        let local: Vec<EnergyTerm> = (0..conformation.len())
            .map(|i| ctx.residue_local_terms(i))
            .collect();
        let breakdown = assemble(&conformation, &params, local.clone());
        let n = conformation.len();
        info!(score = breakdown.total, "Initial full score computed.");

        Self {
            conformation,
            index,
            cache: ScoreCache::new(local),
            breakdown,
            journal: None,
            params,
            moved: Vec::new(),
            affected_mask: vec![false; n],
            affected: Vec::with_capacity(n),
            touched_cells: Vec::new(),
        }
    }

    pub fn conformation(&self) -> &Conformation {
        &self.conformation
    }

    pub fn params(&self) -> &Arc<ScoringParams> {
        &self.params
    }

    /// The breakdown after the last applied move.
    pub fn breakdown(&self) -> &ScoreBreakdown {
        &self.breakdown
    }

    pub fn cache(&self) -> &ScoreCache {
        &self.cache
    }

    /// Residues recomputed by the last rescore, ascending.
    pub fn last_affected(&self) -> &[usize] {
        &self.affected
    }

    pub fn context(&self) -> ScoringContext<'_> {
        ScoringContext::new(&self.conformation, &self.index, &self.params)
    }

    /// Scores the current coordinates from scratch with a freshly built index.
    /// Touches neither the cache nor the maintained index.
    #[instrument(skip_all, name = "full_score")]
    pub fn full_score(&self) -> ScoreBreakdown {
        let index = SpatialIndex::build(&self.conformation, self.params.spatial.cell_size);
        ScoringContext::new(&self.conformation, &index, &self.params).full_breakdown()
    }

    /// Applies a move and returns the updated breakdown.
    ///
    /// A rejected move leaves the scorer untouched.
    #[instrument(level = "debug", skip_all, fields(res_idx = mv.res_idx(), kind = mv.kind().name()))]
    pub fn rescore(&mut self, mv: &Move) -> Result<ScoreBreakdown, EngineError> {
        let n = self.conformation.len();
        self.cache.ensure_len(n)?;

        let mut moved = std::mem::take(&mut self.moved);
        let applied = self
            .conformation
            .apply_move(mv, &self.params.rotamer_library, &mut moved);
        if let Err(e) = applied {
            self.moved = moved;
            debug!(error = %e, "Move rejected.");
            return Err(e.into());
        }

        if let Some(journal) = self.journal.as_mut() {
            journal.record_move(mv.res_idx(), &moved);
        }
        for &(id, _) in &moved {
            if let Some(atom) = self.conformation.atom(id) {
                self.index.update_position(id, atom.position);
            }
        }

        self.collect_affected(&moved);
        self.moved = moved;
        trace!(affected = self.affected.len(), "Recomputing affected residues.");

        for k in 0..self.affected.len() {
            let i = self.affected[k];
            let terms = self.context().residue_local_terms(i);
            let previous = self.cache.replace(i, terms)?;
            if let Some(journal) = self.journal.as_mut() {
                journal.record_cache(i, previous);
            }
        }

        self.refresh_breakdown()?;
        Ok(self.breakdown.clone())
    }

    /// Marks every residue with an atom within the cutoff of a displaced
    /// atom's old or new position, plus the residues owning displaced atoms.
    ///
    /// Displaced positions are grouped by grid cell so that each cell
    /// neighbourhood is scanned once, however many atoms moved through it.
    fn collect_affected(&mut self, moved: &[MovedAtom]) {
        for &i in &self.affected {
            self.affected_mask[i] = false;
        }
        self.affected.clear();
        self.touched_cells.clear();

        let cutoff = self.params.spatial.interaction_cutoff;
        let cutoff_sq = cutoff * cutoff;
        let conf = &self.conformation;
        let mask = &mut self.affected_mask;
        let affected = &mut self.affected;

        for &(id, old) in moved {
            let Some(atom) = conf.atom(id) else {
                continue;
            };
            if let Some(slot) = mask.get_mut(atom.residue_index) {
                if !*slot {
                    *slot = true;
                    affected.push(atom.residue_index);
                }
            }
            for point in [old, atom.position] {
                self.touched_cells.push((self.index.cell_of(&point), point));
            }
        }
        self.touched_cells.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        for group in self.touched_cells.chunk_by(|a, b| a.0 == b.0) {
            self.index.for_each_near_cell(group[0].0, cutoff, |b, position| {
                let Some(other) = conf.atom(b) else {
                    return;
                };
                let Some(slot) = mask.get_mut(other.residue_index) else {
                    return;
                };
                if !*slot && group.iter().any(|(_, p)| (position - p).norm_squared() < cutoff_sq) {
                    *slot = true;
                    affected.push(other.residue_index);
                }
            });
        }
        self.affected.sort_unstable();
    }

    /// Rebuilds the aggregate from the cache plus a fresh compactness pass.
    pub(super) fn refresh_breakdown(&mut self) -> Result<(), EngineError> {
        let n = self.conformation.len();
        self.cache.ensure_len(n)?;
        if self.breakdown.per_residue.len() != n {
            return Err(EngineError::CacheInconsistency(format!(
                "breakdown holds {} residues, conformation has {n}",
                self.breakdown.per_residue.len()
            )));
        }
        self.breakdown
            .per_residue
            .copy_from_slice(self.cache.entries());
        compact::distribute(
            &self.conformation,
            &self.params.compact,
            &mut self.breakdown.per_residue,
        );
        self.breakdown.terms = self.breakdown.per_residue.iter().copied().sum();
        self.breakdown.total = self.breakdown.terms.total(&self.params.weights);
        Ok(())
    }

    /// Checks the cached state against a full rescore; used after long edit
    /// sequences and in tests.
    pub fn verify_consistency(&self, tolerance: f64) -> Result<(), EngineError> {
        let full = self.full_score();
        let drift = (full.total - self.breakdown.total).abs();
        if drift > tolerance {
            return Err(EngineError::CacheInconsistency(format!(
                "incremental score {} drifted {drift:e} from full score {}",
                self.breakdown.total, full.total
            )));
        }
        Ok(())
    }
}

fn assemble(
    conformation: &Conformation,
    params: &ScoringParams,
    mut per_residue: Vec<EnergyTerm>,
) -> ScoreBreakdown {
    compact::distribute(conformation, &params.compact, &mut per_residue);
    ScoreBreakdown::assemble(per_residue, &params.weights)
}
