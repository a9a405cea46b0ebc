use crate::core::forcefield::scoring::ScoringContext;

/// Rotamer penalty: `α · min Σ excess²` over the library bins of the residue
/// type. Zero inside any bin window, for residues without χ angles, and when
/// side-chain atoms are missing.
pub fn residue_rotamer(ctx: &ScoringContext, res_idx: usize) -> f64 {
    let Some(residue) = ctx.conformation.residue(res_idx) else {
        return 0.0;
    };
    let expected = residue.residue_type.chi_count();
    if expected == 0 || residue.chi.len() != expected {
        return 0.0;
    }
    let params = &ctx.params.rotamer;
    ctx.params
        .rotamer_library
        .min_excess_squared(residue.residue_type, &residue.chi, params.half_width)
        .map_or(0.0, |excess| params.alpha * excess)
}
