use super::ids::AtomId;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AminoAcidType {
    Alanine,       // ALA
    Arginine,      // ARG
    Asparagine,    // ASN
    AsparticAcid,  // ASP
    Cysteine,      // CYS
    Glutamine,     // GLN
    GlutamicAcid,  // GLU
    Glycine,       // GLY
    Histidine,     // HIS
    Isoleucine,    // ILE
    Leucine,       // LEU
    Lysine,        // LYS
    Methionine,    // MET
    Phenylalanine, // PHE
    Proline,       // PRO
    Serine,        // SER
    Threonine,     // THR
    Tryptophan,    // TRP
    Tyrosine,      // TYR
    Valine,        // VAL
}

/// Which Ramachandran histogram a residue is scored against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RamaClass {
    General,
    Glycine,
    Proline,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown residue code: '{0}'")]
pub struct ParseAminoAcidError(pub String);

impl AminoAcidType {
    /// All twenty standard residues, in alphabetical order of their three-letter codes.
    pub const ALL: [AminoAcidType; 20] = [
        AminoAcidType::Alanine,
        AminoAcidType::Arginine,
        AminoAcidType::Asparagine,
        AminoAcidType::AsparticAcid,
        AminoAcidType::Cysteine,
        AminoAcidType::Glutamine,
        AminoAcidType::GlutamicAcid,
        AminoAcidType::Glycine,
        AminoAcidType::Histidine,
        AminoAcidType::Isoleucine,
        AminoAcidType::Leucine,
        AminoAcidType::Lysine,
        AminoAcidType::Methionine,
        AminoAcidType::Phenylalanine,
        AminoAcidType::Proline,
        AminoAcidType::Serine,
        AminoAcidType::Threonine,
        AminoAcidType::Tryptophan,
        AminoAcidType::Tyrosine,
        AminoAcidType::Valine,
    ];

    /// Position of this type in [`AminoAcidType::ALL`].
    pub fn ordinal(&self) -> usize {
        *self as usize
    }

    pub fn to_three_letter(&self) -> &'static str {
        match self {
            AminoAcidType::Alanine => "ALA",
            AminoAcidType::Arginine => "ARG",
            AminoAcidType::Asparagine => "ASN",
            AminoAcidType::AsparticAcid => "ASP",
            AminoAcidType::Cysteine => "CYS",
            AminoAcidType::Glutamine => "GLN",
            AminoAcidType::GlutamicAcid => "GLU",
            AminoAcidType::Glycine => "GLY",
            AminoAcidType::Histidine => "HIS",
            AminoAcidType::Isoleucine => "ILE",
            AminoAcidType::Leucine => "LEU",
            AminoAcidType::Lysine => "LYS",
            AminoAcidType::Methionine => "MET",
            AminoAcidType::Phenylalanine => "PHE",
            AminoAcidType::Proline => "PRO",
            AminoAcidType::Serine => "SER",
            AminoAcidType::Threonine => "THR",
            AminoAcidType::Tryptophan => "TRP",
            AminoAcidType::Tyrosine => "TYR",
            AminoAcidType::Valine => "VAL",
        }
    }

    pub fn to_one_letter(&self) -> char {
        match self {
            AminoAcidType::Alanine => 'A',
            AminoAcidType::Arginine => 'R',
            AminoAcidType::Asparagine => 'N',
            AminoAcidType::AsparticAcid => 'D',
            AminoAcidType::Cysteine => 'C',
            AminoAcidType::Glutamine => 'Q',
            AminoAcidType::GlutamicAcid => 'E',
            AminoAcidType::Glycine => 'G',
            AminoAcidType::Histidine => 'H',
            AminoAcidType::Isoleucine => 'I',
            AminoAcidType::Leucine => 'L',
            AminoAcidType::Lysine => 'K',
            AminoAcidType::Methionine => 'M',
            AminoAcidType::Phenylalanine => 'F',
            AminoAcidType::Proline => 'P',
            AminoAcidType::Serine => 'S',
            AminoAcidType::Threonine => 'T',
            AminoAcidType::Tryptophan => 'W',
            AminoAcidType::Tyrosine => 'Y',
            AminoAcidType::Valine => 'V',
        }
    }

    pub fn from_one_letter(code: char) -> Result<Self, ParseAminoAcidError> {
        let upper = code.to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|aa| aa.to_one_letter() == upper)
            .ok_or_else(|| ParseAminoAcidError(code.to_string()))
    }

    pub fn rama_class(&self) -> RamaClass {
        match self {
            AminoAcidType::Glycine => RamaClass::Glycine,
            AminoAcidType::Proline => RamaClass::Proline,
            _ => RamaClass::General,
        }
    }

    /// Number of rotatable side-chain dihedrals modelled for this residue type.
    pub fn chi_count(&self) -> usize {
        match self {
            AminoAcidType::Alanine | AminoAcidType::Glycine | AminoAcidType::Proline => 0,
            AminoAcidType::Serine
            | AminoAcidType::Cysteine
            | AminoAcidType::Valine
            | AminoAcidType::Threonine => 1,
            AminoAcidType::Asparagine
            | AminoAcidType::AsparticAcid
            | AminoAcidType::Leucine
            | AminoAcidType::Isoleucine
            | AminoAcidType::Histidine
            | AminoAcidType::Phenylalanine
            | AminoAcidType::Tyrosine
            | AminoAcidType::Tryptophan => 2,
            AminoAcidType::Glutamine | AminoAcidType::GlutamicAcid | AminoAcidType::Methionine => {
                3
            }
            AminoAcidType::Lysine | AminoAcidType::Arginine => 4,
        }
    }
}

impl fmt::Display for AminoAcidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_three_letter())
    }
}

impl FromStr for AminoAcidType {
    type Err = ParseAminoAcidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        if let (Some(code), None) = (chars.next(), chars.next()) {
            return Self::from_one_letter(code);
        }
        let upper = trimmed.to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|aa| aa.to_three_letter() == upper)
            .ok_or_else(|| ParseAminoAcidError(s.to_string()))
    }
}

/// Secondary-structure state of a residue, as assigned or as targeted by a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SsState {
    Helix,
    Strand,
    #[default]
    Coil,
}

impl SsState {
    pub const ALL: [SsState; 3] = [SsState::Helix, SsState::Strand, SsState::Coil];

    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'H' => Some(SsState::Helix),
            'E' => Some(SsState::Strand),
            'C' | '-' => Some(SsState::Coil),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            SsState::Helix => 'H',
            SsState::Strand => 'E',
            SsState::Coil => 'C',
        }
    }

    pub fn ordinal(&self) -> usize {
        *self as usize
    }
}

/// A residue of the conformation together with its derived backbone and
/// side-chain dihedrals.
///
/// The dihedrals are caches of the atom coordinates; they are refreshed by the
/// owning [`Conformation`](super::conformation::Conformation) whenever a move
/// touches the residue or one of its sequence neighbours.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    /// Position of the residue in the chain, `0..N`.
    pub index: usize,
    pub residue_type: AminoAcidType,
    /// Backbone φ in degrees; `None` for the first residue or missing atoms.
    pub phi: Option<f64>,
    /// Backbone ψ in degrees; `None` for the last residue or missing atoms.
    pub psi: Option<f64>,
    /// Measured side-chain χ angles in degrees, in χ1..χn order.
    pub chi: Vec<f64>,
    /// Index of the nearest rotamer bin, when all χ atoms are present.
    pub rotamer_id: Option<usize>,
    pub(crate) atoms: Vec<AtomId>,
    atom_name_map: HashMap<String, AtomId>,
}

impl Residue {
    pub(crate) fn new(index: usize, residue_type: AminoAcidType) -> Self {
        Self {
            index,
            residue_type,
            phi: None,
            psi: None,
            chi: Vec::with_capacity(4),
            rotamer_id: None,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
        }
    }

    /// Registers an atom; returns `false` if the name is already taken.
    pub(crate) fn add_atom(&mut self, atom_name: &str, atom_id: AtomId) -> bool {
        if self.atom_name_map.contains_key(atom_name) {
            return false;
        }
        self.atoms.push(atom_id);
        self.atom_name_map.insert(atom_name.to_string(), atom_id);
        true
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn atom_id_by_name(&self, name: &str) -> Option<AtomId> {
        self.atom_name_map.get(name).copied()
    }

    pub fn is_glycine(&self) -> bool {
        self.residue_type == AminoAcidType::Glycine
    }

    pub fn is_proline(&self) -> bool {
        self.residue_type == AminoAcidType::Proline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn dummy_atom_id(n: u64) -> AtomId {
        AtomId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn all_is_ordered_by_three_letter_code() {
        let codes: Vec<_> = AminoAcidType::ALL
            .iter()
            .map(|aa| aa.to_three_letter())
            .collect();
        let mut sorted = codes.clone();
        sorted.sort();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn ordinal_matches_position_in_all() {
        for (i, aa) in AminoAcidType::ALL.iter().enumerate() {
            assert_eq!(aa.ordinal(), i);
        }
    }

    #[test]
    fn parses_one_and_three_letter_codes() {
        assert_eq!("W".parse::<AminoAcidType>(), Ok(AminoAcidType::Tryptophan));
        assert_eq!("trp".parse::<AminoAcidType>(), Ok(AminoAcidType::Tryptophan));
        assert_eq!(
            AminoAcidType::from_one_letter('k'),
            Ok(AminoAcidType::Lysine)
        );
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert!("X".parse::<AminoAcidType>().is_err());
        assert!("XYZ".parse::<AminoAcidType>().is_err());
        assert!(AminoAcidType::from_one_letter('B').is_err());
    }

    #[test]
    fn one_letter_codes_round_trip_for_every_type() {
        for aa in AminoAcidType::ALL {
            assert_eq!(AminoAcidType::from_one_letter(aa.to_one_letter()), Ok(aa));
        }
    }

    #[test]
    fn rama_class_separates_glycine_and_proline() {
        assert_eq!(AminoAcidType::Glycine.rama_class(), RamaClass::Glycine);
        assert_eq!(AminoAcidType::Proline.rama_class(), RamaClass::Proline);
        assert_eq!(AminoAcidType::Leucine.rama_class(), RamaClass::General);
    }

    #[test]
    fn chi_counts_match_side_chain_topology() {
        assert_eq!(AminoAcidType::Alanine.chi_count(), 0);
        assert_eq!(AminoAcidType::Serine.chi_count(), 1);
        assert_eq!(AminoAcidType::Phenylalanine.chi_count(), 2);
        assert_eq!(AminoAcidType::Methionine.chi_count(), 3);
        assert_eq!(AminoAcidType::Arginine.chi_count(), 4);
    }

    #[test]
    fn ss_state_codes_parse() {
        assert_eq!(SsState::from_code('h'), Some(SsState::Helix));
        assert_eq!(SsState::from_code('E'), Some(SsState::Strand));
        assert_eq!(SsState::from_code('C'), Some(SsState::Coil));
        assert_eq!(SsState::from_code('X'), None);
    }

    #[test]
    fn add_atom_maps_name_and_rejects_duplicates() {
        let mut residue = Residue::new(4, AminoAcidType::Serine);
        assert!(residue.add_atom("CA", dummy_atom_id(1)));
        assert!(!residue.add_atom("CA", dummy_atom_id(2)));
        assert_eq!(residue.atoms(), &[dummy_atom_id(1)]);
        assert_eq!(residue.atom_id_by_name("CA"), Some(dummy_atom_id(1)));
        assert!(residue.atom_id_by_name("CB").is_none());
    }

    #[test]
    fn new_residue_has_undefined_dihedrals() {
        let residue = Residue::new(0, AminoAcidType::Glycine);
        assert!(residue.phi.is_none());
        assert!(residue.psi.is_none());
        assert!(residue.chi.is_empty());
        assert!(residue.rotamer_id.is_none());
        assert!(residue.is_glycine());
    }
}
