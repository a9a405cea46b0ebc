use crate::core::forcefield::scoring::ScoringContext;
use crate::core::models::atom::Element;
use crate::core::models::ids::AtomId;
use crate::core::models::residue::SsState;
use crate::core::utils::geometry::bond_angle;

fn in_range(value: f64, (lower, upper): (f64, f64)) -> bool {
    if lower <= upper {
        (lower..=upper).contains(&value)
    } else {
        value >= lower || value <= upper
    }
}

/// The backbone nitrogen carrying `hydrogen`, if it is an amide hydrogen.
fn amide_nitrogen(ctx: &ScoringContext, hydrogen: AtomId) -> Option<AtomId> {
    let donor = ctx.conformation.donor_heavy_atom(hydrogen)?;
    (ctx.conformation.atom(donor)?.name == "N").then_some(donor)
}

/// Calls `f(j)` for every residue `j` sharing a backbone N-H···O=C hydrogen
/// bond with `res_idx`, in either direction. Partners may repeat.
pub fn for_each_backbone_partner(ctx: &ScoringContext, res_idx: usize, mut f: impl FnMut(usize)) {
    let Some(residue) = ctx.conformation.residue(res_idx) else {
        return;
    };
    let max_distance = ctx.params.hbond.max_distance;
    let min_angle = ctx.params.hbond.min_angle;
    let conf = ctx.conformation;

    for &id in residue.atoms() {
        let Some(atom) = conf.atom(id) else {
            continue;
        };

        if atom.element == Element::H {
            let Some(nitrogen) = amide_nitrogen(ctx, id).and_then(|n| conf.atom(n)) else {
                continue;
            };
            ctx.index
                .for_each_neighbor(&atom.position, max_distance, Some(id), |b, _| {
                    let Some(acceptor) = conf.atom(b) else {
                        return;
                    };
                    if acceptor.name == "O"
                        && acceptor.residue_index != res_idx
                        && bond_angle(&nitrogen.position, &atom.position, &acceptor.position)
                            >= min_angle
                    {
                        f(acceptor.residue_index);
                    }
                });
        } else if atom.name == "O" && atom.element == Element::O {
            ctx.index
                .for_each_neighbor(&atom.position, max_distance, Some(id), |b, _| {
                    let Some(hydrogen) = conf.atom(b) else {
                        return;
                    };
                    if hydrogen.element != Element::H || hydrogen.residue_index == res_idx {
                        return;
                    }
                    let Some(nitrogen) = amide_nitrogen(ctx, b).and_then(|n| conf.atom(n)) else {
                        return;
                    };
                    if bond_angle(&nitrogen.position, &hydrogen.position, &atom.position)
                        >= min_angle
                    {
                        f(hydrogen.residue_index);
                    }
                });
        }
    }
}

/// DSSP-lite state of one residue from its φ/ψ and backbone H-bond partners.
pub fn assign_state(ctx: &ScoringContext, res_idx: usize) -> SsState {
    let Some(residue) = ctx.conformation.residue(res_idx) else {
        return SsState::Coil;
    };
    let (Some(phi), Some(psi)) = (residue.phi, residue.psi) else {
        return SsState::Coil;
    };
    let params = &ctx.params.ss;

    let has_partner = |accept: &dyn Fn(usize) -> bool| {
        let mut found = false;
        for_each_backbone_partner(ctx, res_idx, |j| found |= accept(j.abs_diff(res_idx)));
        found
    };

    if in_range(phi, params.helix_phi) && in_range(psi, params.helix_psi) {
        let (low, high) = params.helix_partner_offset;
        if has_partner(&|offset| (low..=high).contains(&offset)) {
            return SsState::Helix;
        }
    } else if in_range(phi, params.strand_phi) && in_range(psi, params.strand_psi) {
        let min_offset = params.strand_min_partner_offset;
        if has_partner(&|offset| offset >= min_offset) {
            return SsState::Strand;
        }
    }
    SsState::Coil
}

fn state_weight(ctx: &ScoringContext, state: SsState) -> f64 {
    let params = &ctx.params.ss;
    match state {
        SsState::Helix => params.helix_weight,
        SsState::Strand => params.strand_weight,
        SsState::Coil => params.coil_weight,
    }
}

/// Weight of the target state when the assigned state differs from it.
pub fn residue_ss(ctx: &ScoringContext, res_idx: usize) -> f64 {
    let target = ctx
        .conformation
        .target_ss()
        .get(res_idx)
        .copied()
        .unwrap_or_default();
    if assign_state(ctx, res_idx) == target {
        0.0
    } else {
        state_weight(ctx, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::params::ScoringParams;
    use crate::core::models::conformation::Conformation;
    use crate::core::models::ideal::IdealChain;
    use crate::core::spatial::grid::SpatialIndex;

    fn with_ctx<T>(conf: &Conformation, f: impl FnOnce(&ScoringContext) -> T) -> T {
        let params = ScoringParams::default();
        let index = SpatialIndex::build(conf, params.spatial.cell_size);
        f(&ScoringContext::new(conf, &index, &params))
    }

    fn build(chain: IdealChain) -> Conformation {
        chain.build(&ScoringParams::default().rotamer_library).unwrap()
    }

    #[test]
    fn wrapped_ranges_accept_both_ends() {
        assert!(in_range(-170.0, (150.0, -150.0)));
        assert!(in_range(170.0, (150.0, -150.0)));
        assert!(!in_range(0.0, (150.0, -150.0)));
        assert!(in_range(-30.0, (-90.0, -30.0)));
    }

    #[test]
    fn ideal_helix_interior_is_assigned_helix() {
        let conf = build(IdealChain::new("AAAAAAAAAA").with_backbone(-57.0, -47.0));
        with_ctx(&conf, |ctx| {
            for i in 3..=6 {
                assert_eq!(assign_state(ctx, i), SsState::Helix, "residue {i}");
            }
            assert_eq!(assign_state(ctx, 0), SsState::Coil);
            assert_eq!(assign_state(ctx, 9), SsState::Coil);
        });
    }

    #[test]
    fn helical_angles_without_partners_stay_coil() {
        // Too short for an i→i+3 bond to form.
        let conf = build(IdealChain::new("AAA").with_backbone(-57.0, -47.0));
        with_ctx(&conf, |ctx| assert_eq!(assign_state(ctx, 1), SsState::Coil));
    }

    #[test]
    fn lone_extended_chain_is_not_a_strand() {
        let conf = build(IdealChain::new("AAAAAA").with_backbone(-120.0, 130.0));
        with_ctx(&conf, |ctx| {
            for i in 0..6 {
                assert_eq!(assign_state(ctx, i), SsState::Coil);
            }
        });
    }

    #[test]
    fn mismatch_charges_the_target_state_weight() {
        let conf = build(
            IdealChain::new("AAAAAA")
                .with_backbone(-120.0, 130.0)
                .with_target_ss("CEEHHC"),
        );
        with_ctx(&conf, |ctx| {
            let penalties: Vec<f64> = (0..6).map(|i| residue_ss(ctx, i)).collect();
            assert_eq!(penalties, vec![0.0, 1.0, 1.0, 1.0, 1.0, 0.0]);
        });
    }

    #[test]
    fn helix_target_on_helix_costs_nothing() {
        let conf = build(
            IdealChain::new("AAAAAAAAAA")
                .with_backbone(-57.0, -47.0)
                .with_target_ss("CCCHHHHCCC"),
        );
        with_ctx(&conf, |ctx| {
            for i in 3..=6 {
                assert_eq!(residue_ss(ctx, i), 0.0);
            }
        });
    }
}
