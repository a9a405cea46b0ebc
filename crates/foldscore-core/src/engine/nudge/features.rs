use super::candidates::Candidate;
use crate::core::forcefield::scoring::{ScoreBreakdown, ScoringContext};
use crate::core::forcefield::terms::{clash, compact, hbond, ss};
use crate::core::models::moves::Move;
use crate::core::models::residue::{AminoAcidType, SsState};
use std::collections::HashMap;

/// Length of every feature vector handed to a delta model.
pub const FEATURE_COUNT: usize = 57;

/// Length of the residue part of a feature vector; the rest describes the move.
pub const RESIDUE_FEATURE_COUNT: usize = 52;

const TORSION_SCALE: f64 = 10.0;
const DENSITY_SCALE: f64 = 10.0;

/// Residue environment features, in this order:
///
/// | slots | content |
/// |-------|---------|
/// | 20 | residue type one-hot |
/// | 2  | is glycine, is proline |
/// | 4  | sin/cos of φ and ψ, zero where undefined |
/// | 8  | sin/cos of χ1..χ4, zero where absent |
/// | 6  | per-residue clash, rama, rotamer, ss, compact, hbond |
/// | 2  | overlapping pair count and local clash energy |
/// | 7  | assigned SS one-hot, target SS one-hot, mismatch flag |
/// | 1  | neighbouring Cα count within the cutoff, scaled by 1/10 |
/// | 1  | fraction of this residue's target contacts that are kept |
/// | 1  | matched hydrogen bond count |
pub fn residue_features(ctx: &ScoringContext, breakdown: &ScoreBreakdown, res_idx: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(RESIDUE_FEATURE_COUNT);
    let conf = ctx.conformation;
    let Some(residue) = conf.residue(res_idx) else {
        out.resize(RESIDUE_FEATURE_COUNT, 0.0);
        return out;
    };

    one_hot(&mut out, residue.residue_type.ordinal(), AminoAcidType::ALL.len());
    out.push(flag(residue.is_glycine()));
    out.push(flag(residue.is_proline()));

    for angle in [residue.phi, residue.psi] {
        push_angle(&mut out, angle);
    }
    for k in 0..4 {
        push_angle(&mut out, residue.chi.get(k).copied());
    }

    let terms = breakdown.per_residue.get(res_idx).copied().unwrap_or_default();
    out.extend([
        terms.clash,
        terms.rama,
        terms.rotamer,
        terms.ss,
        terms.compact,
        terms.hbond,
    ]);

    let local_clash = clash::residue_clash(ctx, res_idx);
    out.push(local_clash.contacts as f64);
    out.push(local_clash.energy);

    let assigned = ss::assign_state(ctx, res_idx);
    let target = conf.target_ss().get(res_idx).copied().unwrap_or_default();
    one_hot(&mut out, assigned.ordinal(), SsState::ALL.len());
    one_hot(&mut out, target.ordinal(), SsState::ALL.len());
    out.push(flag(assigned != target));

    out.push(neighbour_density(ctx, res_idx) / DENSITY_SCALE);
    out.push(contact_kept_ratio(ctx, res_idx));
    out.push(hbond::residue_bond_count(ctx, res_idx) as f64);

    debug_assert_eq!(out.len(), RESIDUE_FEATURE_COUNT);
    out
}

/// Appends the move description: kind one-hot, scaled torsion delta, and the
/// normalized target rotamer.
pub fn push_move_features(ctx: &ScoringContext, mv: &Move, out: &mut Vec<f64>) {
    one_hot(out, mv.kind() as usize, 3);
    match *mv {
        Move::Torsion { d_phi, d_psi, .. } => {
            out.push((d_phi + d_psi) / TORSION_SCALE);
            out.push(0.0);
        }
        Move::Rotamer {
            res_idx,
            rotamer_id,
        } => {
            out.push(0.0);
            let bins = ctx
                .conformation
                .residue(res_idx)
                .map(|r| ctx.params.rotamer_library.bins_for(r.residue_type).len())
                .unwrap_or(0);
            out.push(if bins == 0 {
                0.0
            } else {
                (rotamer_id + 1) as f64 / bins as f64
            });
        }
    }
}

/// Builds feature vectors for a candidate list, computing each residue's
/// environment once.
pub fn extract_all(
    ctx: &ScoringContext,
    breakdown: &ScoreBreakdown,
    candidates: &[Candidate],
) -> Vec<Vec<f64>> {
    let mut per_residue: HashMap<usize, Vec<f64>> = HashMap::new();
    candidates
        .iter()
        .map(|c| {
            let res_idx = c.mv.res_idx();
            let base = per_residue
                .entry(res_idx)
                .or_insert_with(|| residue_features(ctx, breakdown, res_idx));
            let mut features = Vec::with_capacity(FEATURE_COUNT);
            features.extend_from_slice(base);
            push_move_features(ctx, &c.mv, &mut features);
            features
        })
        .collect()
}

fn one_hot(out: &mut Vec<f64>, hot: usize, width: usize) {
    out.extend((0..width).map(|i| flag(i == hot)));
}

fn flag(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

fn push_angle(out: &mut Vec<f64>, angle: Option<f64>) {
    match angle {
        Some(deg) => {
            let rad = deg.to_radians();
            out.push(rad.sin());
            out.push(rad.cos());
        }
        None => out.extend([0.0, 0.0]),
    }
}

fn neighbour_density(ctx: &ScoringContext, res_idx: usize) -> f64 {
    let conf = ctx.conformation;
    let Some(ca) = conf.atom_id(res_idx, "CA") else {
        return 0.0;
    };
    let Some(position) = conf.atom(ca).map(|a| a.position) else {
        return 0.0;
    };
    let mut count = 0usize;
    ctx.index.for_each_neighbor(
        &position,
        ctx.params.spatial.interaction_cutoff,
        Some(ca),
        |other, _| {
            if conf.atom(other).is_some_and(|a| a.name == "CA") {
                count += 1;
            }
        },
    );
    count as f64
}

fn contact_kept_ratio(ctx: &ScoringContext, res_idx: usize) -> f64 {
    let conf = ctx.conformation;
    let mine: Vec<(usize, usize)> = conf
        .target_contacts()
        .iter()
        .copied()
        .filter(|&(i, j)| i == res_idx || j == res_idx)
        .collect();
    if mine.is_empty() {
        return 1.0;
    }
    let kept = mine
        .iter()
        .filter(|&&pair| compact::contact_kept(conf, pair, &ctx.params.compact))
        .count();
    kept as f64 / mine.len() as f64
}
