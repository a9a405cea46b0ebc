use nalgebra::Point3;
use std::fmt;
use std::str::FromStr;

/// Chemical element of an atom.
///
/// Only the elements that occur in standard amino acids are modelled; any other
/// element symbol in a payload is rejected at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    C,
    N,
    O,
    S,
    H,
}

impl Element {
    /// Single-bond covalent radius in Angstroms, used to infer the bond graph.
    pub fn covalent_radius(&self) -> f64 {
        match self {
            Element::C => 0.76,
            Element::N => 0.71,
            Element::O => 0.66,
            Element::S => 1.05,
            Element::H => 0.31,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::S => "S",
            Element::H => "H",
        }
    }

    pub fn is_hydrogen(&self) -> bool {
        matches!(self, Element::H)
    }

    /// Heavy atoms that can carry a donor hydrogen.
    pub fn is_polar_heavy(&self) -> bool {
        matches!(self, Element::N | Element::O)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseElementError(pub String);

impl fmt::Display for ParseElementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported element symbol '{}'", self.0)
    }
}

impl std::error::Error for ParseElementError {}

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "C" => Ok(Element::C),
            "N" => Ok(Element::N),
            "O" => Ok(Element::O),
            "S" => Ok(Element::S),
            "H" | "D" => Ok(Element::H),
            _ => Err(ParseElementError(s.to_string())),
        }
    }
}

/// Whether an atom belongs to the peptide backbone or to a side chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AtomRole {
    /// Main-chain atom (N, CA, C, O and their hydrogens).
    Backbone,
    /// Any atom hanging off CA other than HA.
    #[default]
    Sidechain,
}

impl AtomRole {
    pub fn from_atom_name(name: &str) -> Self {
        match name {
            "N" | "CA" | "C" | "O" | "OXT" | "H" | "HN" | "H1" | "H2" | "H3" | "HA" | "HA2"
            | "HA3" => AtomRole::Backbone,
            _ => AtomRole::Sidechain,
        }
    }
}

/// A single atom of a conformation.
///
/// Identity (`serial`, `name`, `residue_index`, `element`) is fixed at load time;
/// only `position` changes, and only through an applied move.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The integer id the atom carried in the submitted payload.
    pub serial: i64,
    /// PDB-style atom name (e.g., "CA", "OG1").
    pub name: String,
    /// Index of the owning residue in `0..N`.
    pub residue_index: usize,
    pub element: Element,
    pub role: AtomRole,
    /// Cartesian coordinates in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    pub fn new(
        serial: i64,
        name: &str,
        residue_index: usize,
        element: Element,
        position: Point3<f64>,
    ) -> Self {
        Self {
            serial,
            name: name.to_string(),
            residue_index,
            element,
            role: AtomRole::from_atom_name(name),
            position,
        }
    }

    pub fn is_backbone(&self) -> bool {
        self.role == AtomRole::Backbone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_parsing_is_case_insensitive_and_trims_whitespace() {
        assert_eq!("c".parse::<Element>().unwrap(), Element::C);
        assert_eq!(" N ".parse::<Element>().unwrap(), Element::N);
        assert_eq!("s".parse::<Element>().unwrap(), Element::S);
    }

    #[test]
    fn deuterium_is_treated_as_hydrogen() {
        assert_eq!("D".parse::<Element>().unwrap(), Element::H);
    }

    #[test]
    fn unsupported_element_is_rejected() {
        let err = "Fe".parse::<Element>().unwrap_err();
        assert_eq!(err, ParseElementError("Fe".to_string()));
    }

    #[test]
    fn atom_role_is_derived_from_atom_name() {
        assert_eq!(AtomRole::from_atom_name("CA"), AtomRole::Backbone);
        assert_eq!(AtomRole::from_atom_name("H"), AtomRole::Backbone);
        assert_eq!(AtomRole::from_atom_name("CB"), AtomRole::Sidechain);
        assert_eq!(AtomRole::from_atom_name("OG1"), AtomRole::Sidechain);
    }

    #[test]
    fn new_atom_assigns_role_from_name() {
        let atom = Atom::new(7, "OG", 3, Element::O, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.serial, 7);
        assert_eq!(atom.residue_index, 3);
        assert_eq!(atom.role, AtomRole::Sidechain);
        assert!(!atom.is_backbone());
    }

    #[test]
    fn polar_heavy_atoms_are_nitrogen_and_oxygen() {
        assert!(Element::N.is_polar_heavy());
        assert!(Element::O.is_polar_heavy());
        assert!(!Element::C.is_polar_heavy());
        assert!(!Element::H.is_polar_heavy());
    }
}
