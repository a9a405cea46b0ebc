use crate::core::forcefield::params::Weights;
use crate::core::forcefield::scoring::ScoreBreakdown;
use crate::core::models::moves::{Move, MoveKind};
use crate::engine::config::NudgeConfig;
use crate::engine::scorer::Scorer;
use std::cmp::Ordering;

/// A proposed move and its position in generation order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub mv: Move,
    pub ordinal: usize,
}

impl Candidate {
    /// Deterministic tie-break order: residue index, then φ < ψ < rotamer,
    /// then generation order.
    pub fn tie_break(&self, other: &Self) -> Ordering {
        self.mv
            .res_idx()
            .cmp(&other.mv.res_idx())
            .then(self.mv.kind().cmp(&other.mv.kind()))
            .then(self.ordinal.cmp(&other.ordinal))
    }
}

/// The `k` residues with the largest weighted penalty, worst first; equal
/// penalties keep index order.
pub fn worst_residues(breakdown: &ScoreBreakdown, weights: &Weights, k: usize) -> Vec<usize> {
    let mut ranked: Vec<(usize, f64)> = (0..breakdown.len())
        .map(|i| (i, breakdown.residue_penalty(i, weights)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.into_iter().take(k).map(|(i, _)| i).collect()
}

/// Proposes moves around the worst residues, at most `max_candidates`.
///
/// Per residue: φ steps (not on proline, not where φ is undefined), ψ steps
/// where ψ is defined, then the nearest alternative rotamers.
pub fn generate(scorer: &Scorer, config: &NudgeConfig) -> Vec<Candidate> {
    let conf = scorer.conformation();
    let params = scorer.params();
    let mut moves: Vec<Move> = Vec::with_capacity(config.max_candidates);

    'residues: for res_idx in worst_residues(scorer.breakdown(), &params.weights, config.top_k) {
        let Some(residue) = conf.residue(res_idx) else {
            continue;
        };
        for kind in MoveKind::ALL {
            let proposals: Vec<Move> = match kind {
                MoveKind::Phi if residue.phi.is_some() && !residue.is_proline() => {
                    signed_steps(&config.torsion_steps)
                        .map(|delta| Move::phi(res_idx, delta))
                        .collect()
                }
                MoveKind::Psi if residue.psi.is_some() => signed_steps(&config.torsion_steps)
                    .map(|delta| Move::psi(res_idx, delta))
                    .collect(),
                MoveKind::Rotamer
                    if residue.residue_type.chi_count() > 0
                        && residue.chi.len() == residue.residue_type.chi_count() =>
                {
                    params
                        .rotamer_library
                        .ranked_alternatives(
                            residue.residue_type,
                            &residue.chi,
                            residue.rotamer_id,
                            config.max_rotamer_alternatives,
                        )
                        .into_iter()
                        .map(|id| Move::rotamer(res_idx, id))
                        .collect()
                }
                _ => Vec::new(),
            };
            for mv in proposals {
                if moves.len() == config.max_candidates {
                    break 'residues;
                }
                moves.push(mv);
            }
        }
    }

    moves
        .into_iter()
        .enumerate()
        .map(|(ordinal, mv)| Candidate { mv, ordinal })
        .collect()
}

fn signed_steps(steps: &[f64]) -> impl Iterator<Item = f64> + '_ {
    steps.iter().flat_map(|&s| [s, -s])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::params::ScoringParams;
    use crate::core::forcefield::term::EnergyTerm;
    use crate::core::models::ideal::IdealChain;

    fn scorer(chain: IdealChain) -> Scorer {
        let params = ScoringParams::shared_default();
        Scorer::new(chain.build(&params.rotamer_library).unwrap(), params)
    }

    #[test]
    fn worst_residues_orders_by_penalty_then_index() {
        let mut per_residue = vec![EnergyTerm::default(); 5];
        per_residue[3].clash = 2.0;
        per_residue[1].clash = 2.0;
        per_residue[4].rama = 1.0;
        let breakdown = ScoreBreakdown::assemble(per_residue, &Weights::default());
        assert_eq!(worst_residues(&breakdown, &Weights::default(), 3), vec![1, 3, 4]);
        assert_eq!(worst_residues(&breakdown, &Weights::default(), 10).len(), 5);
    }

    #[test]
    fn proline_gets_no_phi_moves_and_termini_skip_undefined_torsions() {
        let s = scorer(IdealChain::new("PAP"));
        let config = NudgeConfig::default();
        let candidates = generate(&s, &config);
        for c in &candidates {
            match c.mv {
                Move::Torsion { res_idx, d_phi, .. } if d_phi != 0.0 => {
                    assert_eq!(res_idx, 1, "φ move on residue {res_idx}");
                }
                Move::Torsion { res_idx, d_psi, .. } if d_psi != 0.0 => {
                    assert_ne!(res_idx, 2, "ψ move on last residue");
                }
                _ => {}
            }
        }
        // Residue 1: 4 φ + 4 ψ; residue 0: 4 ψ; residue 2: nothing.
        assert_eq!(candidates.len(), 12);
    }

    #[test]
    fn rotamer_alternatives_exclude_the_current_bin() {
        let s = scorer(IdealChain::new("GSG"));
        let config = NudgeConfig::default();
        let current = s.conformation().residue(1).unwrap().rotamer_id;
        let rotamers: Vec<usize> = generate(&s, &config)
            .iter()
            .filter_map(|c| match c.mv {
                Move::Rotamer { rotamer_id, .. } => Some(rotamer_id),
                _ => None,
            })
            .collect();
        assert_eq!(rotamers.len(), 2);
        assert!(current.is_some());
        assert!(!rotamers.contains(&current.unwrap()));
    }

    #[test]
    fn candidate_count_is_capped() {
        let s = scorer(IdealChain::new(&"KLMFYW".repeat(5)));
        let config = NudgeConfig {
            max_candidates: 25,
            ..NudgeConfig::default()
        };
        let candidates = generate(&s, &config);
        assert_eq!(candidates.len(), 25);
        let ordinals: Vec<usize> = candidates.iter().map(|c| c.ordinal).collect();
        assert_eq!(ordinals, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn default_caps_hold_for_a_hundred_residues() {
        let s = scorer(IdealChain::new(&"MKTAYIAKQR".repeat(10)));
        let candidates = generate(&s, &NudgeConfig::default());
        assert!(candidates.len() <= 200);
        let mut residues: Vec<usize> = candidates.iter().map(|c| c.mv.res_idx()).collect();
        residues.dedup();
        assert!(residues.len() <= 10);
    }

    #[test]
    fn tie_break_orders_by_residue_then_kind_then_ordinal() {
        let a = Candidate { mv: Move::psi(2, 5.0), ordinal: 0 };
        let b = Candidate { mv: Move::phi(2, 5.0), ordinal: 1 };
        let c = Candidate { mv: Move::rotamer(1, 0), ordinal: 2 };
        assert_eq!(b.tie_break(&a), Ordering::Less);
        assert_eq!(c.tie_break(&b), Ordering::Less);
        let d = Candidate { mv: Move::phi(2, -5.0), ordinal: 3 };
        assert_eq!(b.tie_break(&d), Ordering::Less);
    }
}
