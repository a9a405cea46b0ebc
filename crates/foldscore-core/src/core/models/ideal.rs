use super::atom::Element;
use super::builder::{AtomSpec, ConformationBuilder};
use super::conformation::{CompactnessMode, Conformation};
use super::residue::AminoAcidType;
use crate::core::io::error::PayloadError;
use crate::core::rotamers::library::RotamerLibrary;
use crate::core::topology::registry::chi_definitions;
use crate::core::utils::geometry::place_atom;
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;

const N_CA: f64 = 1.458;
const CA_C: f64 = 1.525;
const C_N: f64 = 1.329;
const C_O: f64 = 1.231;
const N_H: f64 = 1.01;
const CA_CB: f64 = 1.53;

const ANGLE_N_CA_C: f64 = 111.2;
const ANGLE_CA_C_N: f64 = 116.2;
const ANGLE_C_N_CA: f64 = 121.7;
const ANGLE_CA_C_O: f64 = 120.5;
const ANGLE_CA_N_H: f64 = 119.0;
const ANGLE_N_CA_CB: f64 = 110.5;
const ANGLE_SIDE_CHAIN: f64 = 111.0;
const TORSION_CB: f64 = -122.5;
const OMEGA: f64 = 180.0;

/// Generator of idealised chain coordinates from backbone and side-chain dihedrals.
///
/// Places N, CA, C, O, the amide H (except on the first residue and prolines),
/// CB, and the atoms that define each χ. Used to author level payloads and as a
/// source of well-formed geometry.
#[derive(Debug, Clone)]
pub struct IdealChain {
    sequence: Vec<AminoAcidType>,
    raw_sequence: String,
    phi: Vec<f64>,
    psi: Vec<f64>,
    chi: Vec<Vec<f64>>,
    target_ss: Option<String>,
    target_contacts: Vec<(usize, usize)>,
    compactness: CompactnessMode,
}

impl IdealChain {
    /// An extended chain (φ = −120°, ψ = 130°) with χ1 = −60° and other χ at 180°.
    ///
    /// Unknown residue codes are kept in the raw sequence so that building
    /// reports them as schema errors.
    pub fn new(sequence: &str) -> Self {
        let types: Vec<AminoAcidType> = sequence
            .trim()
            .chars()
            .filter_map(|c| AminoAcidType::from_one_letter(c).ok())
            .collect();
        let n = types.len();
        let chi = types
            .iter()
            .map(|aa| {
                (0..aa.chi_count())
                    .map(|k| if k == 0 { -60.0 } else { 180.0 })
                    .collect()
            })
            .collect();
        Self {
            sequence: types,
            raw_sequence: sequence.trim().to_string(),
            phi: vec![-120.0; n],
            psi: vec![130.0; n],
            chi,
            target_ss: None,
            target_contacts: Vec::new(),
            compactness: CompactnessMode::Rg,
        }
    }

    /// Uses the same φ/ψ for every residue.
    pub fn with_backbone(mut self, phi: f64, psi: f64) -> Self {
        self.phi.iter_mut().for_each(|p| *p = phi);
        self.psi.iter_mut().for_each(|p| *p = psi);
        self
    }

    pub fn with_residue_backbone(mut self, index: usize, phi: f64, psi: f64) -> Self {
        if index < self.phi.len() {
            self.phi[index] = phi;
            self.psi[index] = psi;
        }
        self
    }

    pub fn with_chi(mut self, index: usize, chi: &[f64]) -> Self {
        if let Some(slot) = self.chi.get_mut(index) {
            for (target, value) in slot.iter_mut().zip(chi) {
                *target = *value;
            }
        }
        self
    }

    pub fn with_target_ss(mut self, target_ss: &str) -> Self {
        self.target_ss = Some(target_ss.to_string());
        self
    }

    pub fn with_target_contacts(mut self, contacts: &[(usize, usize)]) -> Self {
        self.target_contacts = contacts.to_vec();
        self
    }

    pub fn with_compactness(mut self, mode: CompactnessMode) -> Self {
        self.compactness = mode;
        self
    }

    pub fn atoms(&self) -> Vec<AtomSpec> {
        let mut specs = Vec::with_capacity(self.sequence.len() * 10);
        let mut serial = 1i64;
        let mut push = |specs: &mut Vec<AtomSpec>, res: usize, name: &str, element, pos| {
            specs.push(AtomSpec::new(serial, res, name, element, pos));
            serial += 1;
        };

        let mut prev: Option<(Point3<f64>, Point3<f64>, Point3<f64>)> = None;
        for (i, aa) in self.sequence.iter().enumerate() {
            let (n, ca, c) = match prev {
                None => {
                    let n = Point3::origin();
                    let ca = Point3::new(N_CA, 0.0, 0.0);
                    let theta = ANGLE_N_CA_C.to_radians();
                    let c = ca + Vector3::new(-theta.cos(), theta.sin(), 0.0) * CA_C;
                    (n, ca, c)
                }
                Some((prev_n, prev_ca, prev_c)) => {
                    let n = place_atom(&prev_n, &prev_ca, &prev_c, C_N, ANGLE_CA_C_N, self.psi[i - 1]);
                    let ca = place_atom(&prev_ca, &prev_c, &n, N_CA, ANGLE_C_N_CA, OMEGA);
                    let c = place_atom(&prev_c, &n, &ca, CA_C, ANGLE_N_CA_C, self.phi[i]);
                    (n, ca, c)
                }
            };
            let o = place_atom(&n, &ca, &c, C_O, ANGLE_CA_C_O, self.psi[i] + 180.0);

            push(&mut specs, i, "N", Element::N, n);
            push(&mut specs, i, "CA", Element::C, ca);
            push(&mut specs, i, "C", Element::C, c);
            push(&mut specs, i, "O", Element::O, o);

            if i > 0 && *aa != AminoAcidType::Proline {
                let h = place_atom(&c, &ca, &n, N_H, ANGLE_CA_N_H, self.phi[i] + 180.0);
                push(&mut specs, i, "H", Element::H, h);
            }

            if *aa != AminoAcidType::Glycine {
                let cb = place_atom(&c, &n, &ca, CA_CB, ANGLE_N_CA_CB, TORSION_CB);
                push(&mut specs, i, "CB", Element::C, cb);

                let mut placed: HashMap<&str, Point3<f64>> =
                    HashMap::from([("N", n), ("CA", ca), ("CB", cb)]);
                for (k, def) in chi_definitions(aa.to_three_letter()).iter().enumerate() {
                    let (Some(a), Some(b), Some(p)) =
                        (placed.get(def[0]), placed.get(def[1]), placed.get(def[2]))
                    else {
                        break;
                    };
                    let element = element_from_name(def[3]);
                    let parent = element_from_name(def[2]);
                    let bond = element.covalent_radius() + parent.covalent_radius();
                    let pos = place_atom(a, b, p, bond, ANGLE_SIDE_CHAIN, self.chi[i][k]);
                    push(&mut specs, i, def[3], element, pos);
                    placed.insert(def[3], pos);
                }
            }

            prev = Some((n, ca, c));
        }
        specs
    }

    pub fn builder(&self) -> ConformationBuilder {
        let mut builder = ConformationBuilder::new(&self.raw_sequence);
        builder
            .atoms(self.atoms())
            .target_contacts(self.target_contacts.iter().copied())
            .compactness(self.compactness);
        if let Some(ss) = &self.target_ss {
            builder.target_ss(ss);
        }
        builder
    }

    pub fn build(&self, library: &RotamerLibrary) -> Result<Conformation, PayloadError> {
        self.builder().build(library)
    }
}

fn element_from_name(name: &str) -> Element {
    match name.chars().next() {
        Some('N') => Element::N,
        Some('O') => Element::O,
        Some('S') => Element::S,
        Some('H') => Element::H,
        _ => Element::C,
    }
}
