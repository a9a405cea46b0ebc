use crate::core::forcefield::potentials::soft_sphere_overlap;
use crate::core::forcefield::scoring::ScoringContext;

/// Clash energy and overlapping-pair count for one residue.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClashSummary {
    pub energy: f64,
    /// Non-excluded pairs with a positive overlap involving this residue.
    pub contacts: usize,
}

/// Largest distance at which two atoms can still overlap, bounded by the
/// interaction cutoff.
pub fn clash_reach(ctx: &ScoringContext) -> f64 {
    let radii = &ctx.params.vdw_radii;
    let largest = [radii.c, radii.n, radii.o, radii.s, radii.h]
        .into_iter()
        .fold(0.0, f64::max);
    (2.0 * largest + ctx.params.clash.softness).min(ctx.params.spatial.interaction_cutoff)
}

/// Sums the soft-sphere overlap of every pair involving an atom of the
/// residue. Pairs with another residue count half; intra-residue pairs are
/// visited from both ends and so count fully. Bonded 1-2 and 1-3 pairs are
/// skipped.
pub fn residue_clash(ctx: &ScoringContext, res_idx: usize) -> ClashSummary {
    let mut summary = ClashSummary::default();
    let Some(residue) = ctx.conformation.residue(res_idx) else {
        return summary;
    };
    let reach = clash_reach(ctx);
    let softness = ctx.params.clash.softness;

    for &a in residue.atoms() {
        let Some(atom_a) = ctx.conformation.atom(a) else {
            continue;
        };
        let r_a = ctx.params.vdw_radii.radius(atom_a.element);
        ctx.index
            .for_each_neighbor(&atom_a.position, reach, Some(a), |b, d2| {
                if ctx.conformation.is_excluded(a, b) {
                    return;
                }
                let Some(atom_b) = ctx.conformation.atom(b) else {
                    return;
                };
                let r_b = ctx.params.vdw_radii.radius(atom_b.element);
                let e = soft_sphere_overlap(d2.sqrt(), r_a, r_b, softness);
                if e > 0.0 {
                    summary.energy += 0.5 * e;
                    if atom_b.residue_index != res_idx || a < b {
                        summary.contacts += 1;
                    }
                }
            });
    }
    summary
}
