use crate::core::forcefield::scoring::ScoringContext;
use crate::core::models::atom::Element;
use crate::core::models::ids::AtomId;
use crate::core::utils::geometry::bond_angle;

/// Distance from `hydrogen` to `acceptor` if the pair satisfies the distance
/// window and the D-H···A angle, across residues only.
fn valid_pair(ctx: &ScoringContext, hydrogen: AtomId, acceptor: AtomId) -> Option<f64> {
    let conf = ctx.conformation;
    let params = &ctx.params.hbond;
    let h = conf.atom(hydrogen)?;
    let a = conf.atom(acceptor)?;
    if a.element != Element::O || h.residue_index == a.residue_index {
        return None;
    }
    let donor = conf.atom(conf.donor_heavy_atom(hydrogen)?)?;
    let d = (h.position - a.position).norm();
    if d < params.min_distance || d > params.max_distance {
        return None;
    }
    (bond_angle(&donor.position, &h.position, &a.position) > params.min_angle).then_some(d)
}

/// Ties on distance go to the lower atom serial.
fn closest(
    ctx: &ScoringContext,
    centre: AtomId,
    mut distance_to: impl FnMut(AtomId) -> Option<f64>,
) -> Option<AtomId> {
    let conf = ctx.conformation;
    let position = conf.atom(centre)?.position;
    let mut best: Option<(f64, i64, AtomId)> = None;
    // Widened slightly so pairs sitting exactly at the maximum distance are seen.
    let radius = ctx.params.hbond.max_distance + 1e-9;
    ctx.index.for_each_neighbor(&position, radius, Some(centre), |other, _| {
        let Some(d) = distance_to(other) else {
            return;
        };
        let serial = conf.atom(other).map_or(i64::MAX, |a| a.serial);
        let better = match best {
            None => true,
            Some((bd, bs, _)) => d < bd || (d == bd && serial < bs),
        };
        if better {
            best = Some((d, serial, other));
        }
    });
    best.map(|(_, _, id)| id)
}

fn best_acceptor(ctx: &ScoringContext, hydrogen: AtomId) -> Option<AtomId> {
    ctx.conformation.donor_heavy_atom(hydrogen)?;
    closest(ctx, hydrogen, |a| valid_pair(ctx, hydrogen, a))
}

fn best_donor(ctx: &ScoringContext, acceptor: AtomId) -> Option<AtomId> {
    closest(ctx, acceptor, |h| valid_pair(ctx, h, acceptor))
}

/// A donor hydrogen and an acceptor that are each other's closest valid partner.
pub fn is_matched(ctx: &ScoringContext, hydrogen: AtomId, acceptor: AtomId) -> bool {
    best_acceptor(ctx, hydrogen) == Some(acceptor) && best_donor(ctx, acceptor) == Some(hydrogen)
}

/// Matched hydrogen bonds with at least one atom in the residue, before the cap.
pub fn residue_bond_count(ctx: &ScoringContext, res_idx: usize) -> usize {
    let conf = ctx.conformation;
    let Some(residue) = conf.residue(res_idx) else {
        return 0;
    };
    residue
        .atoms()
        .iter()
        .filter(|&&id| match conf.atom(id).map(|a| a.element) {
            Some(Element::H) => {
                best_acceptor(ctx, id).is_some_and(|a| best_donor(ctx, a) == Some(id))
            }
            Some(Element::O) => {
                best_donor(ctx, id).is_some_and(|h| best_acceptor(ctx, h) == Some(id))
            }
            _ => false,
        })
        .count()
}

/// Hydrogen-bond bonus share: `γ/2` per matched bond, at most `residue_cap` bonds.
pub fn residue_hbond(ctx: &ScoringContext, res_idx: usize) -> f64 {
    let params = &ctx.params.hbond;
    let counted = residue_bond_count(ctx, res_idx).min(params.residue_cap);
    0.5 * params.gamma * counted as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::params::ScoringParams;
    use crate::core::models::conformation::Conformation;
    use crate::core::models::ideal::IdealChain;
    use crate::core::spatial::grid::SpatialIndex;
    use nalgebra::Vector3;

    fn strand() -> Conformation {
        IdealChain::new("GGGGGG")
            .with_backbone(-120.0, 130.0)
            .build(&ScoringParams::default().rotamer_library)
            .unwrap()
    }

    /// Moves the carbonyl O of `res_idx` to `distance` from the amide H of
    /// residue 1, `bend` degrees away from the N→H axis.
    fn place_oxygen(conf: &mut Conformation, res_idx: usize, distance: f64, bend: f64) {
        let n = conf.position(1, "N").unwrap();
        let h = conf.position(1, "H").unwrap();
        let axis = (h - n).normalize();
        let helper = if axis.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let side = axis.cross(&helper).normalize();
        let (s, c) = bend.to_radians().sin_cos();
        let target = h + (axis * c + side * s) * distance;
        let o = conf.atom_id(res_idx, "O").unwrap();
        conf.set_position(o, target);
    }

    fn with_ctx<T>(
        conf: &Conformation,
        params: &ScoringParams,
        f: impl FnOnce(&ScoringContext) -> T,
    ) -> T {
        let index = SpatialIndex::build(conf, params.spatial.cell_size);
        f(&ScoringContext::new(conf, &index, params))
    }

    fn counts(conf: &Conformation, params: &ScoringParams) -> Vec<usize> {
        with_ctx(conf, params, |ctx| {
            (0..conf.len()).map(|i| residue_bond_count(ctx, i)).collect()
        })
    }

    #[test]
    fn isolated_strand_has_no_hydrogen_bonds() {
        let params = ScoringParams::default();
        assert_eq!(counts(&strand(), &params), vec![0; 6]);
    }

    #[test]
    fn linear_bond_in_window_counts_for_both_residues() {
        let params = ScoringParams::default();
        let mut conf = strand();
        place_oxygen(&mut conf, 4, 2.8, 0.0);
        assert_eq!(counts(&conf, &params), vec![0, 1, 0, 0, 1, 0]);
        with_ctx(&conf, &params, |ctx| {
            assert_eq!(residue_hbond(ctx, 1), 0.5);
            assert_eq!(residue_hbond(ctx, 4), 0.5);
            let h = conf.atom_id(1, "H").unwrap();
            let o = conf.atom_id(4, "O").unwrap();
            assert!(is_matched(ctx, h, o));
        });
    }

    #[test]
    fn distances_outside_the_window_do_not_count() {
        let params = ScoringParams::default();
        for distance in [2.3, 3.2] {
            let mut conf = strand();
            place_oxygen(&mut conf, 4, distance, 0.0);
            assert_eq!(counts(&conf, &params), vec![0; 6], "distance {distance}");
        }
    }

    #[test]
    fn bent_geometry_does_not_count() {
        let params = ScoringParams::default();
        let mut conf = strand();
        // N-H···O angle of 110°.
        place_oxygen(&mut conf, 4, 2.8, 70.0);
        assert_eq!(counts(&conf, &params), vec![0; 6]);
    }

    #[test]
    fn each_hydrogen_pairs_with_its_closest_acceptor_only() {
        let params = ScoringParams::default();
        let mut conf = strand();
        place_oxygen(&mut conf, 4, 2.8, 20.0);
        place_oxygen(&mut conf, 5, 2.6, 0.0);
        assert_eq!(counts(&conf, &params), vec![0, 1, 0, 0, 0, 1]);
    }

    #[test]
    fn residue_cap_limits_the_bonus() {
        let mut params = ScoringParams::default();
        params.hbond.residue_cap = 0;
        let mut conf = strand();
        place_oxygen(&mut conf, 4, 2.8, 0.0);
        with_ctx(&conf, &params, |ctx| {
            assert_eq!(residue_bond_count(ctx, 1), 1);
            assert_eq!(residue_hbond(ctx, 1), 0.0);
        });
    }
}
