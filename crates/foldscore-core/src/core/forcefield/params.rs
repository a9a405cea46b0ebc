use super::ramachandran::{RamaTable, RamaTables};
use super::term::TermKind;
use crate::core::models::atom::Element;
use crate::core::rotamers::library::{LibraryLoadError, RotamerLibrary};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Weights {
    pub clash: f64,
    pub rama: f64,
    pub rotamer: f64,
    pub ss: f64,
    pub compact: f64,
    pub hbond: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            clash: 1.0,
            rama: 0.6,
            rotamer: 0.4,
            ss: 0.5,
            compact: 0.3,
            hbond: 0.2,
        }
    }
}

impl Weights {
    pub fn get(&self, kind: TermKind) -> f64 {
        match kind {
            TermKind::Clash => self.clash,
            TermKind::Rama => self.rama,
            TermKind::Rotamer => self.rotamer,
            TermKind::Ss => self.ss,
            TermKind::Compact => self.compact,
            TermKind::HBond => self.hbond,
        }
    }
}

/// Van der Waals radii in Angstroms.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct VdwRadii {
    pub c: f64,
    pub n: f64,
    pub o: f64,
    pub s: f64,
    pub h: f64,
}

impl Default for VdwRadii {
    fn default() -> Self {
        Self {
            c: 1.70,
            n: 1.55,
            o: 1.52,
            s: 1.80,
            h: 1.10,
        }
    }
}

impl VdwRadii {
    #[inline]
    pub fn radius(&self, element: Element) -> f64 {
        match element {
            Element::C => self.c,
            Element::N => self.n,
            Element::O => self.o,
            Element::S => self.s,
            Element::H => self.h,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClashParams {
    /// Soft margin τ added to the sum of radii.
    pub softness: f64,
}

impl Default for ClashParams {
    fn default() -> Self {
        Self { softness: 0.2 }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RamaParams {
    pub probability_floor: f64,
    pub max_penalty: f64,
}

impl Default for RamaParams {
    fn default() -> Self {
        Self {
            probability_floor: 1e-6,
            max_penalty: 10.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RotamerParams {
    /// Penalty per squared degree of χ excess.
    pub alpha: f64,
    pub half_width: f64,
}

impl Default for RotamerParams {
    fn default() -> Self {
        Self {
            alpha: 0.02,
            half_width: 35.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SsParams {
    pub helix_weight: f64,
    pub strand_weight: f64,
    pub coil_weight: f64,
    pub helix_phi: (f64, f64),
    pub helix_psi: (f64, f64),
    pub strand_phi: (f64, f64),
    pub strand_psi: (f64, f64),
    /// Inclusive range of |i − j| for a helical backbone H-bond partner.
    pub helix_partner_offset: (usize, usize),
    pub strand_min_partner_offset: usize,
}

impl Default for SsParams {
    fn default() -> Self {
        Self {
            helix_weight: 1.0,
            strand_weight: 1.0,
            coil_weight: 0.0,
            helix_phi: (-90.0, -30.0),
            helix_psi: (-80.0, -10.0),
            strand_phi: (-160.0, -90.0),
            strand_psi: (90.0, 180.0),
            helix_partner_offset: (3, 5),
            strand_min_partner_offset: 2,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CompactParams {
    pub rg_alpha: f64,
    pub rg_prefactor: f64,
    pub contact_beta: f64,
    pub contact_distance: f64,
}

impl Default for CompactParams {
    fn default() -> Self {
        Self {
            rg_alpha: 0.3,
            rg_prefactor: 2.2,
            contact_beta: 1.0,
            contact_distance: 8.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HBondParams {
    pub gamma: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    /// Minimum donor-H-acceptor angle in degrees.
    pub min_angle: f64,
    pub residue_cap: usize,
}

impl Default for HBondParams {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            min_distance: 2.5,
            max_distance: 3.0,
            min_angle: 120.0,
            residue_cap: 2,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SpatialParams {
    /// Radius within which residues interact and are invalidated by a move.
    pub interaction_cutoff: f64,
    pub cell_size: f64,
}

impl Default for SpatialParams {
    fn default() -> Self {
        Self {
            interaction_cutoff: 8.0,
            cell_size: 4.5,
        }
    }
}

/// Optional external tables, resolved relative to the parameter file.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TablePaths {
    pub rama_general: Option<PathBuf>,
    pub rama_glycine: Option<PathBuf>,
    pub rama_proline: Option<PathBuf>,
    pub rotamer_library: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ParamsFile {
    pub weights: Weights,
    pub vdw_radii: VdwRadii,
    pub clash: ClashParams,
    pub rama: RamaParams,
    pub rotamer: RotamerParams,
    pub ss: SsParams,
    pub compact: CompactParams,
    pub hbond: HBondParams,
    pub spatial: SpatialParams,
    pub tables: TablePaths,
}

/// Immutable scoring configuration: weights, per-term constants and lookup tables.
///
/// Built once per process (or per level) and shared by reference between the
/// scorer, its snapshots and nudge workers.
#[derive(Debug, Clone)]
pub struct ScoringParams {
    pub weights: Weights,
    pub vdw_radii: VdwRadii,
    pub clash: ClashParams,
    pub rama: RamaParams,
    pub rotamer: RotamerParams,
    pub ss: SsParams,
    pub compact: CompactParams,
    pub hbond: HBondParams,
    pub spatial: SpatialParams,
    pub rama_tables: RamaTables,
    pub rotamer_library: RotamerLibrary,
}

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Rotamer library error: {0}")]
    RotamerLibrary(#[from] LibraryLoadError),
    #[error("Invalid lookup table: {0}")]
    InvalidTable(String),
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

impl Default for ScoringParams {
    fn default() -> Self {
        let file = ParamsFile::default();
        Self {
            rama_tables: RamaTables::standard(file.rama.probability_floor),
            rotamer_library: RotamerLibrary::standard(),
            weights: file.weights,
            vdw_radii: file.vdw_radii,
            clash: file.clash,
            rama: file.rama,
            rotamer: file.rotamer,
            ss: file.ss,
            compact: file.compact,
            hbond: file.hbond,
            spatial: file.spatial,
        }
    }
}

impl ScoringParams {
    /// Process-wide default parameters, built on first use.
    pub fn shared_default() -> Arc<ScoringParams> {
        static DEFAULT: OnceLock<Arc<ScoringParams>> = OnceLock::new();
        DEFAULT
            .get_or_init(|| Arc::new(ScoringParams::default()))
            .clone()
    }

    pub fn load(path: &Path) -> Result<Self, ParamLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let file: ParamsFile = toml::from_str(&content).map_err(|e| ParamLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_file(file, base_dir)
    }

    pub fn from_file(file: ParamsFile, base_dir: &Path) -> Result<Self, ParamLoadError> {
        validate(&file)?;

        let floor = file.rama.probability_floor;
        let standard = RamaTables::standard(floor);
        let load_rama = |path: &Option<PathBuf>, fallback: RamaTable| match path {
            Some(p) => RamaTable::load_csv(&base_dir.join(p), floor),
            None => Ok(fallback),
        };
        let rama_tables = RamaTables {
            general: load_rama(&file.tables.rama_general, standard.general)?,
            glycine: load_rama(&file.tables.rama_glycine, standard.glycine)?,
            proline: load_rama(&file.tables.rama_proline, standard.proline)?,
        };

        let rotamer_library = match &file.tables.rotamer_library {
            Some(p) => RotamerLibrary::load(&base_dir.join(p))?,
            None => RotamerLibrary::standard(),
        };

        Ok(Self {
            weights: file.weights,
            vdw_radii: file.vdw_radii,
            clash: file.clash,
            rama: file.rama,
            rotamer: file.rotamer,
            ss: file.ss,
            compact: file.compact,
            hbond: file.hbond,
            spatial: file.spatial,
            rama_tables,
            rotamer_library,
        })
    }
}

fn validate(file: &ParamsFile) -> Result<(), ParamLoadError> {
    let weights = &file.weights;
    for kind in TermKind::ALL {
        let w = weights.get(kind);
        if !w.is_finite() || w < 0.0 {
            return Err(ParamLoadError::InvalidValue {
                name: "weights",
                reason: format!("weight for '{}' must be a non-negative number, got {w}", kind.name()),
            });
        }
    }
    if !(file.spatial.cell_size > 0.0) {
        return Err(ParamLoadError::InvalidValue {
            name: "spatial.cell_size",
            reason: "must be positive".to_string(),
        });
    }
    if !(file.spatial.interaction_cutoff > 0.0) {
        return Err(ParamLoadError::InvalidValue {
            name: "spatial.interaction_cutoff",
            reason: "must be positive".to_string(),
        });
    }
    if file.hbond.min_distance > file.hbond.max_distance {
        return Err(ParamLoadError::InvalidValue {
            name: "hbond",
            reason: "min_distance exceeds max_distance".to_string(),
        });
    }
    if !(file.rama.probability_floor > 0.0) {
        return Err(ParamLoadError::InvalidValue {
            name: "rama.probability_floor",
            reason: "must be positive".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_the_published_scoring_model() {
        let params = ScoringParams::default();
        assert_eq!(params.weights, Weights::default());
        assert_eq!(params.vdw_radii.radius(Element::C), 1.7);
        assert_eq!(params.vdw_radii.radius(Element::H), 1.1);
        assert_eq!(params.clash.softness, 0.2);
        assert_eq!(params.rotamer.alpha, 0.02);
        assert_eq!(params.hbond.residue_cap, 2);
        assert_eq!(params.spatial.interaction_cutoff, 8.0);
    }

    #[test]
    fn shared_default_returns_the_same_instance() {
        let a = ScoringParams::shared_default();
        let b = ScoringParams::shared_default();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn load_merges_partial_file_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("params.toml");
        fs::write(
            &path,
            r#"
            [weights]
            clash = 2.0

            [hbond]
            residue_cap = 3

            [spatial]
            cell_size = 5.0
            "#,
        )
        .unwrap();

        let params = ScoringParams::load(&path).unwrap();
        assert_eq!(params.weights.clash, 2.0);
        assert_eq!(params.weights.rama, 0.6);
        assert_eq!(params.hbond.residue_cap, 3);
        assert_eq!(params.hbond.gamma, 1.0);
        assert_eq!(params.spatial.cell_size, 5.0);
    }

    #[test]
    fn load_resolves_table_paths_relative_to_the_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("general.csv"),
            "phi,psi,probability\n-65,-45,0.9\n",
        )
        .unwrap();
        fs::write(dir.path().join("rotamers.toml"), "[[SER]]\nchi = [60.0]\n").unwrap();
        let path = dir.path().join("params.toml");
        fs::write(
            &path,
            r#"
            [tables]
            rama_general = "general.csv"
            rotamer_library = "rotamers.toml"
            "#,
        )
        .unwrap();

        let params = ScoringParams::load(&path).unwrap();
        assert!((params.rama_tables.general.probability(-65.0, -45.0) - 0.9).abs() < 1e-12);
        assert_eq!(
            params
                .rotamer_library
                .bins_for(crate::core::models::residue::AminoAcidType::Serine)
                .len(),
            1
        );
    }

    #[test]
    fn load_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = ScoringParams::load(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ParamLoadError::Io { .. })));
    }

    #[test]
    fn load_fails_for_unknown_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("params.toml");
        fs::write(&path, "[weights]\nclashes = 1.0\n").unwrap();
        assert!(matches!(
            ScoringParams::load(&path),
            Err(ParamLoadError::Toml { .. })
        ));
    }

    #[test]
    fn negative_weights_are_rejected() {
        let mut file = ParamsFile::default();
        file.weights.rama = -1.0;
        assert!(matches!(
            ScoringParams::from_file(file, Path::new(".")),
            Err(ParamLoadError::InvalidValue { name: "weights", .. })
        ));
    }

    #[test]
    fn non_positive_cell_size_is_rejected() {
        let mut file = ParamsFile::default();
        file.spatial.cell_size = 0.0;
        assert!(matches!(
            ScoringParams::from_file(file, Path::new(".")),
            Err(ParamLoadError::InvalidValue { .. })
        ));
    }
}
