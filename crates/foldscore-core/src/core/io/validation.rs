use super::error::PayloadError;
use crate::core::models::conformation::Conformation;
use crate::core::topology::registry::{
    BACKBONE_ANGLES, BACKBONE_BONDS, BOND_ANGLE_TOLERANCE, BOND_LENGTH_BAND,
    MIN_INTRA_RESIDUE_DISTANCE,
};
use crate::core::utils::geometry::bond_angle;
use itertools::Itertools;

/// Rejects backbone bonds and bond angles outside the allowed band around
/// their reference values, and atoms of one residue that nearly coincide.
pub fn validate_geometry(conformation: &Conformation) -> Result<(), PayloadError> {
    let n = conformation.len();
    let (low, high) = BOND_LENGTH_BAND;

    for i in 0..n {
        for bond in &BACKBONE_BONDS {
            let j = if bond.crosses_peptide { i + 1 } else { i };
            if j >= n {
                continue;
            }
            let (Some(a), Some(b)) = (
                conformation.position(i, bond.from),
                conformation.position(j, bond.to),
            ) else {
                continue;
            };
            let length = (a - b).norm();
            let (min, max) = (low * bond.typical_length, high * bond.typical_length);
            if length < min || length > max {
                return Err(PayloadError::Geometry(format!(
                    "bond {}({i})-{}({j}) is {length:.3} Å, outside [{min:.3}, {max:.3}] Å",
                    bond.from, bond.to
                )));
            }
        }

        for angle in &BACKBONE_ANGLES {
            let [(a, da), (b, db), (c, dc)] = angle.atoms;
            if i + da.max(db).max(dc) >= n {
                continue;
            }
            let (Some(pa), Some(pb), Some(pc)) = (
                conformation.position(i + da, a),
                conformation.position(i + db, b),
                conformation.position(i + dc, c),
            ) else {
                continue;
            };
            let value = bond_angle(&pa, &pb, &pc);
            if (value - angle.typical_angle).abs() > BOND_ANGLE_TOLERANCE {
                return Err(PayloadError::Geometry(format!(
                    "angle {a}({})-{b}({})-{c}({}) is {value:.1}°, expected {:.1}° ± {BOND_ANGLE_TOLERANCE}°",
                    i + da,
                    i + db,
                    i + dc,
                    angle.typical_angle
                )));
            }
        }

        let Some(residue) = conformation.residue(i) else {
            continue;
        };
        for (&a, &b) in residue.atoms().iter().tuple_combinations() {
            let (Some(atom_a), Some(atom_b)) = (conformation.atom(a), conformation.atom(b)) else {
                continue;
            };
            let d = (atom_a.position - atom_b.position).norm();
            if d < MIN_INTRA_RESIDUE_DISTANCE {
                return Err(PayloadError::Geometry(format!(
                    "atoms '{}' and '{}' of residue {i} are {d:.3} Å apart (minimum {MIN_INTRA_RESIDUE_DISTANCE} Å)",
                    atom_a.name, atom_b.name
                )));
            }
        }
    }
    Ok(())
}
