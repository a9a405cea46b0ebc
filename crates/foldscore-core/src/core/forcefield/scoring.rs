use super::params::{ScoringParams, Weights};
use super::term::EnergyTerm;
use super::terms::{clash, compact, hbond, rama, rotamer, ss};
use crate::core::models::conformation::Conformation;
use crate::core::spatial::grid::SpatialIndex;

/// Everything a term function reads: coordinates, a neighbour index that is
/// in sync with them, and the scoring parameters.
#[derive(Clone, Copy)]
pub struct ScoringContext<'a> {
    pub conformation: &'a Conformation,
    pub index: &'a SpatialIndex,
    pub params: &'a ScoringParams,
}

impl<'a> ScoringContext<'a> {
    pub fn new(
        conformation: &'a Conformation,
        index: &'a SpatialIndex,
        params: &'a ScoringParams,
    ) -> Self {
        Self {
            conformation,
            index,
            params,
        }
    }

    /// All terms of one residue except compactness, which is chain-level.
    pub fn residue_local_terms(&self, res_idx: usize) -> EnergyTerm {
        EnergyTerm {
            clash: clash::residue_clash(self, res_idx).energy,
            rama: rama::residue_rama(self, res_idx),
            rotamer: rotamer::residue_rotamer(self, res_idx),
            ss: ss::residue_ss(self, res_idx),
            compact: 0.0,
            hbond: hbond::residue_hbond(self, res_idx),
        }
    }

    /// Scores every residue from scratch.
    pub fn full_breakdown(&self) -> ScoreBreakdown {
        let mut per_residue: Vec<EnergyTerm> = (0..self.conformation.len())
            .map(|i| self.residue_local_terms(i))
            .collect();
        compact::distribute(self.conformation, &self.params.compact, &mut per_residue);
        ScoreBreakdown::assemble(per_residue, &self.params.weights)
    }
}

/// Score of a conformation with its per-term and per-residue decomposition.
///
/// `per_residue` has one entry per residue in index order; `terms` is their
/// sum and `total` the weighted score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub total: f64,
    pub terms: EnergyTerm,
    pub per_residue: Vec<EnergyTerm>,
}

impl ScoreBreakdown {
    pub fn assemble(per_residue: Vec<EnergyTerm>, weights: &Weights) -> Self {
        let terms: EnergyTerm = per_residue.iter().copied().sum();
        Self {
            total: terms.total(weights),
            terms,
            per_residue,
        }
    }

    /// Weighted penalty of one residue, the quantity nudge ranks residues by.
    pub fn residue_penalty(&self, res_idx: usize, weights: &Weights) -> f64 {
        self.per_residue
            .get(res_idx)
            .map_or(0.0, |t| t.weighted_penalty(weights))
    }

    pub fn len(&self) -> usize {
        self.per_residue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_residue.is_empty()
    }
}
