use super::rotamer::RotamerBin;
use crate::core::models::residue::AminoAcidType;
use itertools::Itertools;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

type RawRotamerFile = HashMap<String, Vec<RotamerBin>>;

/// Staggered χ positions combined per χ to form the standard library.
pub const STAGGERED_CHI_CENTRES: [f64; 3] = [-60.0, 60.0, 180.0];

/// Per-residue-type collection of rotamer bins.
///
/// Residue types without rotatable side chains have no bins. Bin indices are the
/// `rotamer_id` values carried by residues and rotamer moves.
#[derive(Debug, Default, Clone)]
pub struct RotamerLibrary {
    bins: HashMap<AminoAcidType, Vec<RotamerBin>>,
}

#[derive(Debug, Error)]
pub enum LibraryLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Unknown residue type '{0}' found in library file")]
    UnknownResidueType(String),
    #[error("Rotamer for '{residue_type}' has {found} chi angles, expected {expected}")]
    ChiCountMismatch {
        residue_type: String,
        expected: usize,
        found: usize,
    },
}

impl RotamerLibrary {
    /// Tensor product of [`STAGGERED_CHI_CENTRES`] over every χ of every residue type.
    pub fn standard() -> Self {
        let bins = AminoAcidType::ALL
            .iter()
            .filter(|aa| aa.chi_count() > 0)
            .map(|&aa| {
                let bins = (0..aa.chi_count())
                    .map(|_| STAGGERED_CHI_CENTRES.iter().copied())
                    .multi_cartesian_product()
                    .map(RotamerBin::new)
                    .collect();
                (aa, bins)
            })
            .collect();
        Self { bins }
    }

    pub fn load(path: &Path) -> Result<Self, LibraryLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| LibraryLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let raw: RawRotamerFile = toml::from_str(&content).map_err(|e| LibraryLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawRotamerFile) -> Result<Self, LibraryLoadError> {
        let mut bins = HashMap::with_capacity(raw.len());
        for (name, entries) in raw {
            let residue_type = AminoAcidType::from_str(&name)
                .map_err(|_| LibraryLoadError::UnknownResidueType(name.clone()))?;
            let expected = residue_type.chi_count();
            if let Some(bad) = entries.iter().find(|bin| bin.chi.len() != expected) {
                return Err(LibraryLoadError::ChiCountMismatch {
                    residue_type: name,
                    expected,
                    found: bad.chi.len(),
                });
            }
            bins.insert(residue_type, entries);
        }
        Ok(Self { bins })
    }

    pub fn bins_for(&self, residue_type: AminoAcidType) -> &[RotamerBin] {
        self.bins
            .get(&residue_type)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn bin(&self, residue_type: AminoAcidType, rotamer_id: usize) -> Option<&RotamerBin> {
        self.bins_for(residue_type).get(rotamer_id)
    }

    /// Index of the bin whose centres are closest to `chi`.
    pub fn nearest_bin(&self, residue_type: AminoAcidType, chi: &[f64]) -> Option<usize> {
        self.bins_for(residue_type)
            .iter()
            .enumerate()
            .map(|(i, bin)| (i, bin.distance_squared(chi)))
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(i, _)| i)
    }

    /// Smallest squared χ excess over all bins of the residue type.
    ///
    /// `None` when the type has no bins.
    pub fn min_excess_squared(
        &self,
        residue_type: AminoAcidType,
        chi: &[f64],
        half_width: f64,
    ) -> Option<f64> {
        self.bins_for(residue_type)
            .iter()
            .map(|bin| bin.excess_squared(chi, half_width))
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Bins other than `current`, nearest to `chi` first, at most `limit` of them.
    pub fn ranked_alternatives(
        &self,
        residue_type: AminoAcidType,
        chi: &[f64],
        current: Option<usize>,
        limit: usize,
    ) -> Vec<usize> {
        self.bins_for(residue_type)
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != current)
            .map(|(i, bin)| (i, bin.distance_squared(chi)))
            .sorted_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .take(limit)
            .map(|(i, _)| i)
            .collect()
    }
}
