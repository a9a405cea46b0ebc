use crate::core::forcefield::scoring::ScoringContext;

/// Ramachandran penalty of one residue; zero while φ or ψ is undefined.
pub fn residue_rama(ctx: &ScoringContext, res_idx: usize) -> f64 {
    let Some(residue) = ctx.conformation.residue(res_idx) else {
        return 0.0;
    };
    let (Some(phi), Some(psi)) = (residue.phi, residue.psi) else {
        return 0.0;
    };
    let rama = &ctx.params.rama;
    ctx.params
        .rama_tables
        .for_class(residue.residue_type.rama_class())
        .penalty(phi, psi, rama.probability_floor, rama.max_penalty)
}
