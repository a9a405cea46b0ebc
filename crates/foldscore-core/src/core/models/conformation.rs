use super::atom::Atom;
use super::ids::AtomId;
use super::moves::{Move, MoveError};
use super::residue::{Residue, SsState};
use crate::core::rotamers::library::RotamerLibrary;
use crate::core::topology::registry::chi_definitions;
use crate::core::utils::geometry::{dihedral, rotate_about_axis, wrap_angle};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};
use std::collections::HashSet;

/// An atom displaced by a move, with the position it had before the move.
pub type MovedAtom = (AtomId, Point3<f64>);

/// How chain compactness is scored for a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompactnessMode {
    /// Harmonic penalty on the Cα radius of gyration.
    #[default]
    Rg,
    /// Flat penalty per target contact whose Cα atoms are too far apart.
    Contacts,
}

/// A rigid rotation of a set of atoms about the bond `pivot -> axis_to`.
#[derive(Debug)]
struct RotationStep {
    pivot: AtomId,
    axis_to: AtomId,
    angle: f64,
    atoms: Vec<AtomId>,
}

/// The complete, mutable 3D state of one protein chain.
///
/// A conformation owns its atoms and residues, the covalent bond graph inferred
/// at load time, and the level's targets. Atom positions change only through
/// [`Conformation::apply_move`], which keeps the derived φ/ψ/χ of the touched
/// residues current.
#[derive(Debug, Clone)]
pub struct Conformation {
    sequence: String,
    atoms: SlotMap<AtomId, Atom>,
    residues: Vec<Residue>,
    target_ss: Vec<SsState>,
    target_contacts: Vec<(usize, usize)>,
    compactness: CompactnessMode,
    bonds: SecondaryMap<AtomId, Vec<AtomId>>,
    exclusions: SecondaryMap<AtomId, Vec<AtomId>>,
    donor_heavy: SecondaryMap<AtomId, AtomId>,
}

impl Conformation {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        sequence: String,
        atoms: SlotMap<AtomId, Atom>,
        residues: Vec<Residue>,
        target_ss: Vec<SsState>,
        target_contacts: Vec<(usize, usize)>,
        compactness: CompactnessMode,
        bonds: SecondaryMap<AtomId, Vec<AtomId>>,
    ) -> Self {
        let mut exclusions = SecondaryMap::with_capacity(atoms.len());
        let mut donor_heavy = SecondaryMap::new();
        for (id, atom) in &atoms {
            let direct = bonds.get(id).map(|v| v.as_slice()).unwrap_or(&[]);
            let mut excluded: Vec<AtomId> = direct.to_vec();
            for &neighbor in direct {
                if let Some(second) = bonds.get(neighbor) {
                    excluded.extend(second.iter().copied().filter(|&x| x != id));
                }
            }
            excluded.sort_unstable();
            excluded.dedup();
            exclusions.insert(id, excluded);

            if atom.element.is_hydrogen() {
                if let Some(&heavy) = direct
                    .iter()
                    .find(|&&n| atoms.get(n).is_some_and(|a| a.element.is_polar_heavy()))
                {
                    donor_heavy.insert(id, heavy);
                }
            }
        }

        Self {
            sequence,
            atoms,
            residues,
            target_ss,
            target_contacts,
            compactness,
            bonds,
            exclusions,
            donor_heavy,
        }
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Number of residues.
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn atoms(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    pub fn residue(&self, index: usize) -> Option<&Residue> {
        self.residues.get(index)
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    pub fn target_ss(&self) -> &[SsState] {
        &self.target_ss
    }

    pub fn target_contacts(&self) -> &[(usize, usize)] {
        &self.target_contacts
    }

    pub fn compactness(&self) -> CompactnessMode {
        self.compactness
    }

    pub fn bonded_neighbors(&self, id: AtomId) -> &[AtomId] {
        self.bonds.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Whether `a` and `b` are separated by one or two covalent bonds.
    #[inline]
    pub fn is_excluded(&self, a: AtomId, b: AtomId) -> bool {
        self.exclusions
            .get(a)
            .is_some_and(|list| list.binary_search(&b).is_ok())
    }

    /// The N or O atom a hydrogen is bonded to, if it is a polar hydrogen.
    pub fn donor_heavy_atom(&self, hydrogen: AtomId) -> Option<AtomId> {
        self.donor_heavy.get(hydrogen).copied()
    }

    pub fn atom_id(&self, res_idx: usize, name: &str) -> Option<AtomId> {
        self.residues.get(res_idx)?.atom_id_by_name(name)
    }

    pub fn position(&self, res_idx: usize, name: &str) -> Option<Point3<f64>> {
        let id = self.atom_id(res_idx, name)?;
        self.atoms.get(id).map(|a| a.position)
    }

    pub fn ca_position(&self, res_idx: usize) -> Option<Point3<f64>> {
        self.position(res_idx, "CA")
    }

    pub(crate) fn set_position(&mut self, id: AtomId, position: Point3<f64>) {
        if let Some(atom) = self.atoms.get_mut(id) {
            atom.position = position;
        }
    }

    fn compute_phi(&self, i: usize) -> Option<f64> {
        if i == 0 {
            return None;
        }
        dihedral(
            &self.position(i - 1, "C")?,
            &self.position(i, "N")?,
            &self.position(i, "CA")?,
            &self.position(i, "C")?,
        )
    }

    fn compute_psi(&self, i: usize) -> Option<f64> {
        if i + 1 >= self.residues.len() {
            return None;
        }
        dihedral(
            &self.position(i, "N")?,
            &self.position(i, "CA")?,
            &self.position(i, "C")?,
            &self.position(i + 1, "N")?,
        )
    }

    fn compute_chi(&self, i: usize, out: &mut Vec<f64>) {
        out.clear();
        let name = self.residues[i].residue_type.to_three_letter();
        for def in chi_definitions(name) {
            let angle = (|| {
                dihedral(
                    &self.position(i, def[0])?,
                    &self.position(i, def[1])?,
                    &self.position(i, def[2])?,
                    &self.position(i, def[3])?,
                )
            })();
            match angle {
                Some(a) => out.push(a),
                None => break,
            }
        }
    }

    /// Recomputes φ, ψ, χ and the nearest rotamer bin of one residue from the
    /// current coordinates.
    pub fn refresh_dihedrals(&mut self, index: usize, library: &RotamerLibrary) {
        if index >= self.residues.len() {
            return;
        }
        let phi = self.compute_phi(index);
        let psi = self.compute_psi(index);
        let mut chi = std::mem::take(&mut self.residues[index].chi);
        self.compute_chi(index, &mut chi);

        let residue_type = self.residues[index].residue_type;
        let rotamer_id = if !chi.is_empty() && chi.len() == residue_type.chi_count() {
            library.nearest_bin(residue_type, &chi)
        } else {
            None
        };

        let residue = &mut self.residues[index];
        residue.phi = phi;
        residue.psi = psi;
        residue.chi = chi;
        residue.rotamer_id = rotamer_id;
    }

    pub fn refresh_all_dihedrals(&mut self, library: &RotamerLibrary) {
        for i in 0..self.residues.len() {
            self.refresh_dihedrals(i, library);
        }
    }

    /// Atoms of residue `res_idx` reachable from `start` without passing
    /// through `exclude` (both endpoints themselves are not included).
    fn downstream_atoms(&self, res_idx: usize, start: AtomId, exclude: AtomId) -> Vec<AtomId> {
        let mut visited = vec![start, exclude];
        let mut stack = vec![start];
        let mut out = Vec::new();
        while let Some(id) = stack.pop() {
            for &neighbor in self.bonded_neighbors(id) {
                if visited.contains(&neighbor) {
                    continue;
                }
                if self.atoms.get(neighbor).map(|a| a.residue_index) != Some(res_idx) {
                    continue;
                }
                visited.push(neighbor);
                out.push(neighbor);
                stack.push(neighbor);
            }
        }
        out
    }

    fn backbone_atom(
        &self,
        res_idx: usize,
        name: &str,
        angle: &'static str,
    ) -> Result<AtomId, MoveError> {
        self.atom_id(res_idx, name)
            .ok_or(MoveError::UndefinedTorsion { res_idx, angle })
    }

    /// Rotation about the backbone bond `pivot -> axis_to` of residue
    /// `res_idx` that turns its dihedral by `angle`.
    ///
    /// The chain is split at that bond and the side with fewer atoms is
    /// rotated: the downstream side by `angle`, or the upstream side by
    /// `-angle`. Both give the same internal geometry, so every bond length,
    /// bond angle and other dihedral is preserved.
    fn torsion_step(
        &self,
        res_idx: usize,
        pivot: AtomId,
        axis_to: AtomId,
        angle: f64,
    ) -> RotationStep {
        let upstream_local = self.downstream_atoms(res_idx, pivot, axis_to);
        let downstream_local = self.downstream_atoms(res_idx, axis_to, pivot);
        let before = &self.residues[..res_idx];
        let after = &self.residues[res_idx + 1..];
        let count = |local: &[AtomId], others: &[Residue]| {
            local.len() + others.iter().map(|r| r.atoms().len()).sum::<usize>()
        };

        let (mut atoms, others, angle) =
            if count(&downstream_local, after) <= count(&upstream_local, before) {
                (downstream_local, after, angle)
            } else {
                (upstream_local, before, -angle)
            };
        atoms.extend(others.iter().flat_map(|r| r.atoms().iter().copied()));
        RotationStep {
            pivot,
            axis_to,
            angle,
            atoms,
        }
    }

    /// Checks a move against the current state and resolves it into rotation
    /// steps without mutating anything.
    fn plan_move(
        &self,
        mv: &Move,
        library: &RotamerLibrary,
    ) -> Result<Vec<RotationStep>, MoveError> {
        let res_idx = mv.res_idx();
        let residue = self
            .residues
            .get(res_idx)
            .ok_or(MoveError::ResidueOutOfRange {
                res_idx,
                len: self.residues.len(),
            })?;

        let mut steps = Vec::new();
        match *mv {
            Move::Torsion { d_phi, d_psi, .. } => {
                for delta in [d_phi, d_psi] {
                    if !delta.is_finite() {
                        return Err(MoveError::NonFiniteDelta(delta));
                    }
                }

                if d_phi != 0.0 {
                    if residue.is_proline() {
                        return Err(MoveError::ProlinePhi { res_idx });
                    }
                    if res_idx == 0 {
                        return Err(MoveError::UndefinedTorsion {
                            res_idx,
                            angle: "phi",
                        });
                    }
                    self.backbone_atom(res_idx - 1, "C", "phi")?;
                    self.backbone_atom(res_idx, "C", "phi")?;
                    let n = self.backbone_atom(res_idx, "N", "phi")?;
                    let ca = self.backbone_atom(res_idx, "CA", "phi")?;
                    steps.push(self.torsion_step(res_idx, n, ca, d_phi));
                }

                if d_psi != 0.0 {
                    if res_idx + 1 >= self.residues.len() {
                        return Err(MoveError::UndefinedTorsion {
                            res_idx,
                            angle: "psi",
                        });
                    }
                    self.backbone_atom(res_idx, "N", "psi")?;
                    self.backbone_atom(res_idx + 1, "N", "psi")?;
                    let ca = self.backbone_atom(res_idx, "CA", "psi")?;
                    let c = self.backbone_atom(res_idx, "C", "psi")?;
                    steps.push(self.torsion_step(res_idx, ca, c, d_psi));
                }
            }
            Move::Rotamer { rotamer_id, .. } => {
                let residue_type = residue.residue_type;
                let bin = library
                    .bin(residue_type, rotamer_id)
                    .ok_or_else(|| MoveError::UnknownRotamer {
                        res_idx,
                        residue_type: residue_type.to_string(),
                        rotamer_id,
                    })?;

                for (k, def) in chi_definitions(residue_type.to_three_letter())
                    .iter()
                    .enumerate()
                {
                    let mut ids = [AtomId::default(); 4];
                    for (slot, name) in ids.iter_mut().zip(def.iter()) {
                        *slot = residue
                            .atom_id_by_name(name)
                            .ok_or_else(|| MoveError::MissingAtom {
                                res_idx,
                                atom: name.to_string(),
                            })?;
                    }
                    let [a, b, c, d] = ids.map(|id| self.atoms[id].position);
                    let current = dihedral(&a, &b, &c, &d).ok_or(MoveError::UndefinedTorsion {
                        res_idx,
                        angle: "chi",
                    })?;
                    let Some(&target) = bin.chi.get(k) else {
                        break;
                    };
                    let delta = wrap_angle(target - current);
                    if delta != 0.0 {
                        steps.push(RotationStep {
                            pivot: ids[1],
                            axis_to: ids[2],
                            angle: delta,
                            atoms: self.downstream_atoms(res_idx, ids[2], ids[1]),
                        });
                    }
                }
            }
        }
        Ok(steps)
    }

    /// Applies a move in place.
    ///
    /// `moved` is cleared and filled with every displaced atom and its position
    /// before the move. A rejected move leaves the conformation untouched; a
    /// zero-delta torsion move displaces nothing.
    pub fn apply_move(
        &mut self,
        mv: &Move,
        library: &RotamerLibrary,
        moved: &mut Vec<MovedAtom>,
    ) -> Result<(), MoveError> {
        moved.clear();
        let steps = self.plan_move(mv, library)?;
        if steps.is_empty() {
            return Ok(());
        }

        // A torsion move with both deltas can rotate an atom twice.
        let mut seen = HashSet::new();
        let dedup = steps.len() > 1;
        for step in &steps {
            let origin = self.atoms[step.pivot].position;
            let axis = self.atoms[step.axis_to].position - origin;
            for &id in &step.atoms {
                let atom = &mut self.atoms[id];
                if !dedup || seen.insert(id) {
                    moved.push((id, atom.position));
                }
                atom.position = rotate_about_axis(&atom.position, &origin, &axis, step.angle);
            }
        }

        self.refresh_around(mv.res_idx(), library);
        Ok(())
    }

    /// Refreshes the dihedrals of a residue and its sequence neighbours, which
    /// share the atoms that define them.
    pub(crate) fn refresh_around(&mut self, res_idx: usize, library: &RotamerLibrary) {
        let start = res_idx.saturating_sub(1);
        let end = (res_idx + 1).min(self.residues.len().saturating_sub(1));
        for i in start..=end {
            self.refresh_dihedrals(i, library);
        }
    }
}
