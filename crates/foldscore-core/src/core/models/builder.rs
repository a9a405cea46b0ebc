use super::atom::{Atom, Element};
use super::conformation::{CompactnessMode, Conformation};
use super::ids::AtomId;
use super::residue::{AminoAcidType, Residue, SsState};
use crate::core::io::error::PayloadError;
use crate::core::io::validation::validate_geometry;
use crate::core::rotamers::library::RotamerLibrary;
use crate::core::topology::registry::{hydrogen_parent, side_chain_topology, BACKBONE_TOPOLOGY};
use nalgebra::Point3;
use slotmap::{SecondaryMap, SlotMap};
use std::collections::HashSet;
use tracing::debug;

/// Raw description of one atom, before it is placed into a conformation.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomSpec {
    pub serial: i64,
    pub residue_index: usize,
    pub name: String,
    pub element: Element,
    pub position: Point3<f64>,
}

impl AtomSpec {
    pub fn new(
        serial: i64,
        residue_index: usize,
        name: &str,
        element: Element,
        position: Point3<f64>,
    ) -> Self {
        Self {
            serial,
            residue_index,
            name: name.to_string(),
            element,
            position,
        }
    }
}

/// Assembles and validates a [`Conformation`].
///
/// All schema checks (sequence codes, indices, duplicates, required backbone
/// atoms) run before geometry checks; nothing is built unless both pass.
#[derive(Debug, Clone, Default)]
pub struct ConformationBuilder {
    sequence: String,
    atoms: Vec<AtomSpec>,
    target_ss: Option<String>,
    target_contacts: Vec<(usize, usize)>,
    compactness: CompactnessMode,
}

impl ConformationBuilder {
    pub fn new(sequence: &str) -> Self {
        Self {
            sequence: sequence.to_string(),
            ..Default::default()
        }
    }

    pub fn atom(&mut self, spec: AtomSpec) -> &mut Self {
        self.atoms.push(spec);
        self
    }

    pub fn atoms(&mut self, specs: impl IntoIterator<Item = AtomSpec>) -> &mut Self {
        self.atoms.extend(specs);
        self
    }

    pub fn target_ss(&mut self, target_ss: &str) -> &mut Self {
        self.target_ss = Some(target_ss.to_string());
        self
    }

    pub fn target_contacts(
        &mut self,
        contacts: impl IntoIterator<Item = (usize, usize)>,
    ) -> &mut Self {
        self.target_contacts.extend(contacts);
        self
    }

    pub fn compactness(&mut self, mode: CompactnessMode) -> &mut Self {
        self.compactness = mode;
        self
    }

    pub fn build(&self, library: &RotamerLibrary) -> Result<Conformation, PayloadError> {
        let residue_types = self.parse_sequence()?;
        let n = residue_types.len();
        let target_ss = self.parse_target_ss(n)?;
        let target_contacts = self.parse_contacts(n)?;
        self.check_atoms(n)?;

        let mut atoms: SlotMap<AtomId, Atom> = SlotMap::with_capacity_and_key(self.atoms.len());
        let mut residues: Vec<Residue> = residue_types
            .iter()
            .enumerate()
            .map(|(i, &rt)| Residue::new(i, rt))
            .collect();

        for spec in &self.atoms {
            let id = atoms.insert(Atom::new(
                spec.serial,
                &spec.name,
                spec.residue_index,
                spec.element,
                spec.position,
            ));
            if !residues[spec.residue_index].add_atom(&spec.name, id) {
                return Err(PayloadError::Schema(format!(
                    "duplicate atom name '{}' in residue {}",
                    spec.name, spec.residue_index
                )));
            }
        }

        for residue in &residues {
            for name in ["N", "CA", "C"] {
                if residue.atom_id_by_name(name).is_none() {
                    return Err(PayloadError::Schema(format!(
                        "residue {} ({}) is missing backbone atom '{}'",
                        residue.index, residue.residue_type, name
                    )));
                }
            }
        }

        let bonds = infer_bonds(&atoms, &residues);
        let mut conformation = Conformation::from_parts(
            self.sequence.trim().to_string(),
            atoms,
            residues,
            target_ss,
            target_contacts,
            self.compactness,
            bonds,
        );
        validate_geometry(&conformation)?;
        conformation.refresh_all_dihedrals(library);

        debug!(
            residues = conformation.len(),
            atoms = conformation.atom_count(),
            "Conformation built."
        );
        Ok(conformation)
    }

    fn parse_sequence(&self) -> Result<Vec<AminoAcidType>, PayloadError> {
        let sequence = self.sequence.trim();
        if sequence.is_empty() {
            return Err(PayloadError::Schema("sequence is empty".to_string()));
        }
        sequence
            .chars()
            .enumerate()
            .map(|(i, code)| {
                AminoAcidType::from_one_letter(code).map_err(|_| {
                    PayloadError::Schema(format!(
                        "unknown residue code '{code}' at sequence position {i}"
                    ))
                })
            })
            .collect()
    }

    fn parse_target_ss(&self, n: usize) -> Result<Vec<SsState>, PayloadError> {
        let Some(raw) = self.target_ss.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(vec![SsState::Coil; n]);
        };
        let states = raw
            .chars()
            .enumerate()
            .map(|(i, code)| {
                SsState::from_code(code).ok_or_else(|| {
                    PayloadError::Schema(format!(
                        "invalid secondary-structure code '{code}' at position {i}"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if states.len() != n {
            return Err(PayloadError::Schema(format!(
                "target_ss has length {}, expected {n}",
                states.len()
            )));
        }
        Ok(states)
    }

    fn parse_contacts(&self, n: usize) -> Result<Vec<(usize, usize)>, PayloadError> {
        let mut contacts = Vec::with_capacity(self.target_contacts.len());
        for &(i, j) in &self.target_contacts {
            if i >= n || j >= n {
                return Err(PayloadError::Schema(format!(
                    "target contact ({i}, {j}) is out of range for {n} residues"
                )));
            }
            if i == j {
                return Err(PayloadError::Schema(format!(
                    "target contact ({i}, {j}) pairs a residue with itself"
                )));
            }
            contacts.push((i.min(j), i.max(j)));
        }
        contacts.sort_unstable();
        contacts.dedup();
        Ok(contacts)
    }

    fn check_atoms(&self, n: usize) -> Result<(), PayloadError> {
        if self.atoms.is_empty() {
            return Err(PayloadError::Schema("no atoms supplied".to_string()));
        }
        let mut serials = HashSet::with_capacity(self.atoms.len());
        for spec in &self.atoms {
            if !serials.insert(spec.serial) {
                return Err(PayloadError::Schema(format!(
                    "duplicate atom id {}",
                    spec.serial
                )));
            }
            if spec.residue_index >= n {
                return Err(PayloadError::Schema(format!(
                    "atom {} references residue {} but the sequence has {n} residues",
                    spec.serial, spec.residue_index
                )));
            }
            if spec.name.trim().is_empty() {
                return Err(PayloadError::Schema(format!(
                    "atom {} has an empty name",
                    spec.serial
                )));
            }
            let p = &spec.position;
            if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
                return Err(PayloadError::Schema(format!(
                    "atom {} has non-finite coordinates",
                    spec.serial
                )));
            }
        }
        Ok(())
    }
}

/// Covalent bonds from the residue topology templates plus the peptide bonds
/// C(i)-N(i+1). Heavy atoms bond only where the template says so; each
/// hydrogen bonds to the heavy atom its name points at, or to the nearest
/// heavy atom of its residue when the name follows no known convention.
fn infer_bonds(
    atoms: &SlotMap<AtomId, Atom>,
    residues: &[Residue],
) -> SecondaryMap<AtomId, Vec<AtomId>> {
    let mut bonds: SecondaryMap<AtomId, Vec<AtomId>> = SecondaryMap::with_capacity(atoms.len());
    for id in atoms.keys() {
        bonds.insert(id, Vec::new());
    }

    for residue in residues {
        let templates = BACKBONE_TOPOLOGY
            .iter()
            .chain(side_chain_topology(residue.residue_type.to_three_letter()));
        for &(a, b) in templates {
            if let (Some(a), Some(b)) = (residue.atom_id_by_name(a), residue.atom_id_by_name(b)) {
                link(a, b, &mut bonds);
            }
        }

        let (hydrogens, heavy): (Vec<AtomId>, Vec<AtomId>) = residue
            .atoms()
            .iter()
            .partition(|&&id| atoms[id].element.is_hydrogen());
        let heavy_names: Vec<&str> = heavy.iter().map(|&id| atoms[id].name.as_str()).collect();
        for h in hydrogens {
            let parent = hydrogen_parent(&atoms[h].name, &heavy_names)
                .and_then(|name| residue.atom_id_by_name(name))
                .or_else(|| {
                    heavy.iter().copied().min_by(|&x, &y| {
                        let dx = (atoms[x].position - atoms[h].position).norm_squared();
                        let dy = (atoms[y].position - atoms[h].position).norm_squared();
                        dx.total_cmp(&dy)
                    })
                });
            match parent {
                Some(parent) => link(h, parent, &mut bonds),
                None => debug!(atom = %atoms[h].name, residue = residue.index, "Hydrogen left unbonded."),
            }
        }
    }

    for pair in residues.windows(2) {
        if let (Some(c), Some(n)) = (pair[0].atom_id_by_name("C"), pair[1].atom_id_by_name("N")) {
            link(c, n, &mut bonds);
        }
    }
    bonds
}

fn link(a: AtomId, b: AtomId, bonds: &mut SecondaryMap<AtomId, Vec<AtomId>>) {
    if let Some(list) = bonds.get_mut(a) {
        list.push(b);
    }
    if let Some(list) = bonds.get_mut(b) {
        list.push(a);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ideal::IdealChain;

    fn library() -> RotamerLibrary {
        RotamerLibrary::standard()
    }

    fn specs(sequence: &str) -> Vec<AtomSpec> {
        IdealChain::new(sequence).atoms()
    }

    fn builder(sequence: &str) -> ConformationBuilder {
        let mut b = ConformationBuilder::new(sequence);
        b.atoms(specs(sequence));
        b
    }

    fn schema_message(result: Result<Conformation, PayloadError>) -> String {
        match result {
            Err(PayloadError::Schema(msg)) => msg,
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn builds_valid_chain_with_default_targets() {
        let conf = builder("ACDG").build(&library()).unwrap();
        assert_eq!(conf.len(), 4);
        assert_eq!(conf.sequence(), "ACDG");
        assert_eq!(conf.target_ss(), &[SsState::Coil; 4]);
        assert!(conf.target_contacts().is_empty());
        assert_eq!(conf.compactness(), CompactnessMode::Rg);
    }

    #[test]
    fn empty_sequence_is_a_schema_error() {
        let msg = schema_message(ConformationBuilder::new("  ").build(&library()));
        assert!(msg.contains("empty"));
    }

    #[test]
    fn unknown_residue_code_is_a_schema_error() {
        let msg = schema_message(builder("AXA").build(&library()));
        assert!(msg.contains("'X'"));
    }

    #[test]
    fn target_ss_length_must_match_sequence() {
        let mut b = builder("AAA");
        b.target_ss("HH");
        let msg = schema_message(b.build(&library()));
        assert!(msg.contains("target_ss"));
    }

    #[test]
    fn invalid_target_ss_code_is_rejected() {
        let mut b = builder("AAA");
        b.target_ss("HQH");
        assert!(matches!(b.build(&library()), Err(PayloadError::Schema(_))));
    }

    #[test]
    fn contacts_are_normalised_and_checked() {
        let mut b = builder("AAAA");
        b.target_contacts([(3, 0), (0, 3), (1, 2)]);
        let conf = b.build(&library()).unwrap();
        assert_eq!(conf.target_contacts(), &[(0, 3), (1, 2)]);

        let mut bad = builder("AAAA");
        bad.target_contacts([(0, 9)]);
        assert!(matches!(bad.build(&library()), Err(PayloadError::Schema(_))));

        let mut self_contact = builder("AAAA");
        self_contact.target_contacts([(2, 2)]);
        assert!(matches!(
            self_contact.build(&library()),
            Err(PayloadError::Schema(_))
        ));
    }

    #[test]
    fn atom_referencing_missing_residue_is_rejected() {
        let mut b = builder("AA");
        b.atom(AtomSpec::new(999, 5, "CB", Element::C, Point3::new(50.0, 0.0, 0.0)));
        let msg = schema_message(b.build(&library()));
        assert!(msg.contains("residue 5"));
    }

    #[test]
    fn duplicate_serials_are_rejected() {
        let mut atoms = specs("AA");
        atoms[1].serial = atoms[0].serial;
        let mut b = ConformationBuilder::new("AA");
        b.atoms(atoms);
        let msg = schema_message(b.build(&library()));
        assert!(msg.contains("duplicate atom id"));
    }

    #[test]
    fn duplicate_atom_names_within_a_residue_are_rejected() {
        let mut b = builder("AA");
        b.atom(AtomSpec::new(999, 0, "CA", Element::C, Point3::new(40.0, 0.0, 0.0)));
        let msg = schema_message(b.build(&library()));
        assert!(msg.contains("duplicate atom name"));
    }

    #[test]
    fn missing_backbone_atom_is_rejected() {
        let atoms: Vec<_> = specs("AA")
            .into_iter()
            .filter(|a| !(a.residue_index == 1 && a.name == "CA"))
            .collect();
        let mut b = ConformationBuilder::new("AA");
        b.atoms(atoms);
        let msg = schema_message(b.build(&library()));
        assert!(msg.contains("'CA'"));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let mut atoms = specs("AA");
        atoms[0].position.x = f64::NAN;
        let mut b = ConformationBuilder::new("AA");
        b.atoms(atoms);
        assert!(matches!(b.build(&library()), Err(PayloadError::Schema(_))));
    }

    #[test]
    fn no_atoms_is_rejected() {
        assert!(matches!(
            ConformationBuilder::new("AA").build(&library()),
            Err(PayloadError::Schema(_))
        ));
    }

    #[test]
    fn peptide_bond_is_inferred_between_consecutive_residues() {
        let conf = builder("AA").build(&library()).unwrap();
        let c = conf.atom_id(0, "C").unwrap();
        let n = conf.atom_id(1, "N").unwrap();
        assert!(conf.bonded_neighbors(c).contains(&n));
        assert!(conf.bonded_neighbors(n).contains(&c));
    }

    #[test]
    fn non_adjacent_backbone_atoms_are_not_bonded() {
        let conf = builder("A").build(&library()).unwrap();
        let n = conf.atom_id(0, "N").unwrap();
        let c = conf.atom_id(0, "C").unwrap();
        assert!(!conf.bonded_neighbors(n).contains(&c));
    }

    #[test]
    fn side_chain_bonds_follow_the_residue_template() {
        let conf = builder("GLG").build(&library()).unwrap();
        let cb = conf.atom_id(1, "CB").unwrap();
        let cg = conf.atom_id(1, "CG").unwrap();
        let cd1 = conf.atom_id(1, "CD1").unwrap();
        assert!(conf.bonded_neighbors(cb).contains(&cg));
        assert_eq!(conf.bonded_neighbors(cd1), &[cg]);
    }

    #[test]
    fn severe_intra_residue_clash_is_not_mistaken_for_a_bond() {
        use crate::core::forcefield::params::ScoringParams;
        use crate::core::forcefield::terms::clash::residue_clash;
        use crate::core::forcefield::scoring::ScoringContext;
        use crate::core::spatial::grid::SpatialIndex;

        let mut atoms = specs("GLG");
        let find = |atoms: &[AtomSpec], name: &str| {
            atoms
                .iter()
                .position(|a| a.residue_index == 1 && a.name == name)
                .unwrap()
        };
        let n = atoms[find(&atoms, "N")].position;
        let h = atoms[find(&atoms, "H")].position;
        let cd1 = find(&atoms, "CD1");
        atoms[cd1].position = n + (n - h).normalize() * 1.0;

        let mut b = ConformationBuilder::new("GLG");
        b.atoms(atoms);
        let conf = b.build(&library()).unwrap();
        let n = conf.atom_id(1, "N").unwrap();
        let cd1 = conf.atom_id(1, "CD1").unwrap();
        assert!(!conf.bonded_neighbors(cd1).contains(&n));
        assert!(!conf.is_excluded(cd1, n));

        let params = ScoringParams::default();
        let index = SpatialIndex::build(&conf, params.spatial.cell_size);
        let summary = residue_clash(&ScoringContext::new(&conf, &index, &params), 1);
        // (1.70 + 1.55 + 0.2 - 1.0)^2 from the CD1-N pair alone.
        assert!(summary.energy >= 2.45f64.powi(2) - 1e-9, "{}", summary.energy);
    }

    #[test]
    fn hydrogens_bond_to_the_atom_their_name_points_at() {
        let conf = builder("AA").build(&library()).unwrap();
        let h = conf.atom_id(1, "H").unwrap();
        let n = conf.atom_id(1, "N").unwrap();
        assert_eq!(conf.bonded_neighbors(h), &[n]);
    }

    #[test]
    fn dihedrals_are_derived_on_build() {
        let conf = IdealChain::new("AAA")
            .with_backbone(-60.0, -45.0)
            .build(&library())
            .unwrap();
        let middle = conf.residue(1).unwrap();
        assert!((middle.phi.unwrap() + 60.0).abs() < 1e-6);
        assert!((middle.psi.unwrap() + 45.0).abs() < 1e-6);
    }
}
