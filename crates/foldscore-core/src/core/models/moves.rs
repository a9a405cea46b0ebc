use thiserror::Error;

/// A local edit of the conformation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Move {
    /// Rotate the backbone of `res_idx` by `d_phi` and `d_psi` degrees.
    Torsion { res_idx: usize, d_phi: f64, d_psi: f64 },
    /// Set the side chain of `res_idx` to the centre of rotamer bin `rotamer_id`.
    Rotamer { res_idx: usize, rotamer_id: usize },
}

/// Kind of a single-axis move, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MoveKind {
    Phi,
    Psi,
    Rotamer,
}

impl MoveKind {
    pub const ALL: [MoveKind; 3] = [MoveKind::Phi, MoveKind::Psi, MoveKind::Rotamer];

    pub fn name(&self) -> &'static str {
        match self {
            MoveKind::Phi => "phi",
            MoveKind::Psi => "psi",
            MoveKind::Rotamer => "rotamer",
        }
    }
}

impl Move {
    pub fn phi(res_idx: usize, delta: f64) -> Self {
        Move::Torsion {
            res_idx,
            d_phi: delta,
            d_psi: 0.0,
        }
    }

    pub fn psi(res_idx: usize, delta: f64) -> Self {
        Move::Torsion {
            res_idx,
            d_phi: 0.0,
            d_psi: delta,
        }
    }

    pub fn rotamer(res_idx: usize, rotamer_id: usize) -> Self {
        Move::Rotamer {
            res_idx,
            rotamer_id,
        }
    }

    pub fn res_idx(&self) -> usize {
        match self {
            Move::Torsion { res_idx, .. } | Move::Rotamer { res_idx, .. } => *res_idx,
        }
    }

    /// Tie-break kind; a torsion move that touches φ counts as a φ move.
    pub fn kind(&self) -> MoveKind {
        match self {
            Move::Torsion { d_phi, .. } if *d_phi != 0.0 => MoveKind::Phi,
            Move::Torsion { .. } => MoveKind::Psi,
            Move::Rotamer { .. } => MoveKind::Rotamer,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MoveError {
    #[error("Residue index {res_idx} is out of range for a chain of {len} residues")]
    ResidueOutOfRange { res_idx: usize, len: usize },

    #[error("Torsion delta must be finite, got {0}")]
    NonFiniteDelta(f64),

    #[error("{angle} is undefined for residue {res_idx}")]
    UndefinedTorsion { res_idx: usize, angle: &'static str },

    #[error("Phi of proline residue {res_idx} is constrained by its ring")]
    ProlinePhi { res_idx: usize },

    #[error("Residue {res_idx} ({residue_type}) has no rotamer {rotamer_id}")]
    UnknownRotamer {
        res_idx: usize,
        residue_type: String,
        rotamer_id: usize,
    },

    #[error("Residue {res_idx} is missing side-chain atom '{atom}'")]
    MissingAtom { res_idx: usize, atom: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_the_expected_variant() {
        assert_eq!(
            Move::phi(3, 5.0),
            Move::Torsion {
                res_idx: 3,
                d_phi: 5.0,
                d_psi: 0.0
            }
        );
        assert_eq!(Move::psi(3, -5.0).kind(), MoveKind::Psi);
        assert_eq!(Move::rotamer(4, 2).res_idx(), 4);
    }

    #[test]
    fn kind_ordering_is_phi_psi_rotamer() {
        assert!(MoveKind::Phi < MoveKind::Psi);
        assert!(MoveKind::Psi < MoveKind::Rotamer);
    }
}
