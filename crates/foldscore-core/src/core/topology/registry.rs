use phf::phf_map;

/// Atom names `[a, b, c, d]` of one side-chain dihedral; the rotatable bond is `b-c`.
pub type ChiDefinition = [&'static str; 4];

static CHI_DEFINITIONS: phf::Map<&'static str, &'static [ChiDefinition]> = phf_map! {
    "SER" => &[["N", "CA", "CB", "OG"]],
    "CYS" => &[["N", "CA", "CB", "SG"]],
    "VAL" => &[["N", "CA", "CB", "CG1"]],
    "THR" => &[["N", "CA", "CB", "OG1"]],
    "ASN" => &[["N", "CA", "CB", "CG"], ["CA", "CB", "CG", "OD1"]],
    "ASP" => &[["N", "CA", "CB", "CG"], ["CA", "CB", "CG", "OD1"]],
    "LEU" => &[["N", "CA", "CB", "CG"], ["CA", "CB", "CG", "CD1"]],
    "ILE" => &[["N", "CA", "CB", "CG1"], ["CA", "CB", "CG1", "CD1"]],
    "HIS" => &[["N", "CA", "CB", "CG"], ["CA", "CB", "CG", "ND1"]],
    "PHE" => &[["N", "CA", "CB", "CG"], ["CA", "CB", "CG", "CD1"]],
    "TYR" => &[["N", "CA", "CB", "CG"], ["CA", "CB", "CG", "CD1"]],
    "TRP" => &[["N", "CA", "CB", "CG"], ["CA", "CB", "CG", "CD1"]],
    "GLN" => &[
        ["N", "CA", "CB", "CG"],
        ["CA", "CB", "CG", "CD"],
        ["CB", "CG", "CD", "OE1"],
    ],
    "GLU" => &[
        ["N", "CA", "CB", "CG"],
        ["CA", "CB", "CG", "CD"],
        ["CB", "CG", "CD", "OE1"],
    ],
    "MET" => &[
        ["N", "CA", "CB", "CG"],
        ["CA", "CB", "CG", "SD"],
        ["CB", "CG", "SD", "CE"],
    ],
    "LYS" => &[
        ["N", "CA", "CB", "CG"],
        ["CA", "CB", "CG", "CD"],
        ["CB", "CG", "CD", "CE"],
        ["CG", "CD", "CE", "NZ"],
    ],
    "ARG" => &[
        ["N", "CA", "CB", "CG"],
        ["CA", "CB", "CG", "CD"],
        ["CB", "CG", "CD", "NE"],
        ["CG", "CD", "NE", "CZ"],
    ],
};

/// χ definitions for a residue (three-letter code); empty for residues without
/// rotatable side chains.
pub fn chi_definitions(residue_name: &str) -> &'static [ChiDefinition] {
    CHI_DEFINITIONS.get(residue_name).copied().unwrap_or(&[])
}

/// A backbone bond checked during geometry validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackboneBond {
    pub from: &'static str,
    pub to: &'static str,
    /// Whether `to` belongs to the following residue.
    pub crosses_peptide: bool,
    /// Reference length in Angstroms.
    pub typical_length: f64,
}

pub const BACKBONE_BONDS: [BackboneBond; 3] = [
    BackboneBond {
        from: "N",
        to: "CA",
        crosses_peptide: false,
        typical_length: 1.458,
    },
    BackboneBond {
        from: "CA",
        to: "C",
        crosses_peptide: false,
        typical_length: 1.525,
    },
    BackboneBond {
        from: "C",
        to: "N",
        crosses_peptide: true,
        typical_length: 1.329,
    },
];

/// Allowed band around a typical bond length, as multiples of it.
pub const BOND_LENGTH_BAND: (f64, f64) = (0.5, 2.0);

/// Two atoms of the same residue may never be closer than this (Angstroms).
pub const MIN_INTRA_RESIDUE_DISTANCE: f64 = 0.6;

/// A backbone bond angle `a-b-c` checked during geometry validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackboneAngle {
    /// Atom names, each paired with its residue offset (0 or 1).
    pub atoms: [(&'static str, usize); 3],
    /// Reference angle in degrees.
    pub typical_angle: f64,
}

pub const BACKBONE_ANGLES: [BackboneAngle; 3] = [
    BackboneAngle {
        atoms: [("N", 0), ("CA", 0), ("C", 0)],
        typical_angle: 111.2,
    },
    BackboneAngle {
        atoms: [("CA", 0), ("C", 0), ("N", 1)],
        typical_angle: 116.2,
    },
    BackboneAngle {
        atoms: [("C", 0), ("N", 1), ("CA", 1)],
        typical_angle: 121.7,
    },
];

/// Largest allowed deviation of a backbone angle from its reference (degrees).
pub const BOND_ANGLE_TOLERANCE: f64 = 25.0;

/// Heavy-atom bonds shared by every residue that has the atoms.
pub const BACKBONE_TOPOLOGY: &[(&str, &str)] = &[
    ("N", "CA"),
    ("CA", "C"),
    ("C", "O"),
    ("C", "OXT"),
    ("CA", "CB"),
];

static SIDE_CHAIN_TOPOLOGY: phf::Map<&'static str, &'static [(&'static str, &'static str)]> = phf_map! {
    "ALA" => &[],
    "GLY" => &[],
    "SER" => &[("CB", "OG")],
    "CYS" => &[("CB", "SG")],
    "VAL" => &[("CB", "CG1"), ("CB", "CG2")],
    "THR" => &[("CB", "OG1"), ("CB", "CG2")],
    "LEU" => &[("CB", "CG"), ("CG", "CD1"), ("CG", "CD2")],
    "ILE" => &[("CB", "CG1"), ("CB", "CG2"), ("CG1", "CD1")],
    "MET" => &[("CB", "CG"), ("CG", "SD"), ("SD", "CE")],
    "PRO" => &[("CB", "CG"), ("CG", "CD"), ("CD", "N")],
    "PHE" => &[
        ("CB", "CG"),
        ("CG", "CD1"),
        ("CG", "CD2"),
        ("CD1", "CE1"),
        ("CD2", "CE2"),
        ("CE1", "CZ"),
        ("CE2", "CZ"),
    ],
    "TYR" => &[
        ("CB", "CG"),
        ("CG", "CD1"),
        ("CG", "CD2"),
        ("CD1", "CE1"),
        ("CD2", "CE2"),
        ("CE1", "CZ"),
        ("CE2", "CZ"),
        ("CZ", "OH"),
    ],
    "TRP" => &[
        ("CB", "CG"),
        ("CG", "CD1"),
        ("CG", "CD2"),
        ("CD1", "NE1"),
        ("NE1", "CE2"),
        ("CD2", "CE2"),
        ("CD2", "CE3"),
        ("CE2", "CZ2"),
        ("CE3", "CZ3"),
        ("CZ2", "CH2"),
        ("CZ3", "CH2"),
    ],
    "HIS" => &[
        ("CB", "CG"),
        ("CG", "ND1"),
        ("CG", "CD2"),
        ("ND1", "CE1"),
        ("CD2", "NE2"),
        ("CE1", "NE2"),
    ],
    "ASN" => &[("CB", "CG"), ("CG", "OD1"), ("CG", "ND2")],
    "ASP" => &[("CB", "CG"), ("CG", "OD1"), ("CG", "OD2")],
    "GLN" => &[("CB", "CG"), ("CG", "CD"), ("CD", "OE1"), ("CD", "NE2")],
    "GLU" => &[("CB", "CG"), ("CG", "CD"), ("CD", "OE1"), ("CD", "OE2")],
    "LYS" => &[("CB", "CG"), ("CG", "CD"), ("CD", "CE"), ("CE", "NZ")],
    "ARG" => &[
        ("CB", "CG"),
        ("CG", "CD"),
        ("CD", "NE"),
        ("NE", "CZ"),
        ("CZ", "NH1"),
        ("CZ", "NH2"),
    ],
};

/// Side-chain heavy-atom bonds of a residue (three-letter code), beyond the
/// shared [`BACKBONE_TOPOLOGY`].
pub fn side_chain_topology(residue_name: &str) -> &'static [(&'static str, &'static str)] {
    SIDE_CHAIN_TOPOLOGY.get(residue_name).copied().unwrap_or(&[])
}

/// Name of the heavy atom a hydrogen is attached to, following PDB naming:
/// the remoteness letter after `H` selects the heavy atom (`HB2` on `CB`,
/// `HXT` on `OXT`), and a branch digit selects among siblings (`HD21` on
/// `ND2`, `HG1` on `OG1`). Amide and terminal hydrogens (`H`, `HN`, `H1`..)
/// sit on `N`.
///
/// `heavy` lists the residue's heavy-atom names; `None` when nothing fits.
pub fn hydrogen_parent<'a>(hydrogen: &str, heavy: &[&'a str]) -> Option<&'a str> {
    let rest = hydrogen.strip_prefix('H')?;
    let mut chars = rest.chars();
    let remoteness = match chars.next() {
        None | Some('N') => return heavy.iter().copied().find(|&h| h == "N"),
        Some(c) if c.is_ascii_digit() => return heavy.iter().copied().find(|&h| h == "N"),
        Some(c) => c,
    };
    let digits: String = chars.take_while(|c| c.is_ascii_digit()).collect();
    let siblings: Vec<&'a str> = heavy
        .iter()
        .copied()
        .filter(|h| h.len() >= 2 && h[1..].starts_with(remoteness))
        .collect();
    let branch = |digit: char| {
        siblings
            .iter()
            .copied()
            .find(|h| h[1..].strip_prefix(remoteness) == Some(digit.to_string().as_str()))
    };

    match (siblings.as_slice(), digits.chars().next()) {
        ([], _) => None,
        ([only], None) => Some(*only),
        (_, Some(d)) if digits.len() >= 2 => branch(d),
        (_, Some(d)) => branch(d).or_else(|| (siblings.len() == 1).then(|| siblings[0])),
        (_, None) => siblings.iter().copied().find(|h| h.len() == 2),
    }
}
