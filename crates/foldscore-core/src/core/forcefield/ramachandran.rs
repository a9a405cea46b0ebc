use super::params::ParamLoadError;
use super::potentials::{bilinear, gaussian_2d, neg_log_probability};
use crate::core::models::residue::RamaClass;
use crate::core::utils::geometry::wrap_angle;
use serde::Deserialize;
use std::path::Path;

pub const BINS: usize = 36;
pub const BIN_WIDTH: f64 = 10.0;

/// One 2D gaussian peak `(φ0, ψ0, σφ, σψ, weight)` of a synthetic histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RamaPeak {
    pub phi: f64,
    pub psi: f64,
    pub sigma_phi: f64,
    pub sigma_psi: f64,
    pub weight: f64,
}

const fn peak(phi: f64, psi: f64, sigma_phi: f64, sigma_psi: f64, weight: f64) -> RamaPeak {
    RamaPeak {
        phi,
        psi,
        sigma_phi,
        sigma_psi,
        weight,
    }
}

/// α-helix, β-sheet and left-handed helix basins.
pub const GENERAL_PEAKS: [RamaPeak; 3] = [
    peak(-60.0, -40.0, 22.0, 18.0, 0.55),
    peak(-120.0, 130.0, 25.0, 22.0, 0.35),
    peak(60.0, 40.0, 18.0, 20.0, 0.20),
];

pub const GLYCINE_PEAKS: [RamaPeak; 3] = [
    peak(-80.0, 0.0, 25.0, 22.0, 0.45),
    peak(80.0, 0.0, 25.0, 20.0, 0.45),
    peak(-150.0, 150.0, 28.0, 24.0, 0.30),
];

pub const PROLINE_PEAKS: [RamaPeak; 2] = [
    peak(-65.0, 140.0, 18.0, 18.0, 0.60),
    peak(-80.0, -35.0, 16.0, 20.0, 0.25),
];

#[derive(Debug, Deserialize)]
struct RamaRow {
    phi: f64,
    psi: f64,
    probability: f64,
}

/// A 36×36 φ/ψ probability histogram with 10° bins centred at −175..175.
#[derive(Debug, Clone, PartialEq)]
pub struct RamaTable {
    probabilities: Vec<f64>,
}

impl RamaTable {
    pub fn from_peaks(peaks: &[RamaPeak], floor: f64) -> Self {
        let mut probabilities = vec![0.0; BINS * BINS];
        for i in 0..BINS {
            let phi = bin_centre(i);
            for j in 0..BINS {
                let psi = bin_centre(j);
                let density: f64 = peaks
                    .iter()
                    .map(|p| {
                        p.weight
                            * gaussian_2d(
                                wrap_angle(phi - p.phi),
                                wrap_angle(psi - p.psi),
                                p.sigma_phi,
                                p.sigma_psi,
                            )
                    })
                    .sum();
                probabilities[i * BINS + j] = (floor + density).min(1.0);
            }
        }
        Self { probabilities }
    }

    /// Row-major (φ outer, ψ inner) probabilities.
    pub fn from_probabilities(probabilities: Vec<f64>) -> Result<Self, ParamLoadError> {
        if probabilities.len() != BINS * BINS {
            return Err(ParamLoadError::InvalidTable(format!(
                "expected {} probabilities, found {}",
                BINS * BINS,
                probabilities.len()
            )));
        }
        if let Some(bad) = probabilities
            .iter()
            .find(|p| !p.is_finite() || **p < 0.0)
        {
            return Err(ParamLoadError::InvalidTable(format!(
                "invalid probability {bad}"
            )));
        }
        Ok(Self { probabilities })
    }

    /// Reads `phi,psi,probability` rows; each row fills the bin containing its angles.
    /// Bins absent from the file take `floor`.
    pub fn load_csv(path: &Path, floor: f64) -> Result<Self, ParamLoadError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| ParamLoadError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut probabilities = vec![floor; BINS * BINS];
        for result in reader.deserialize() {
            let row: RamaRow = result.map_err(|e| ParamLoadError::Csv {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
            let i = bin_of(row.phi);
            let j = bin_of(row.psi);
            probabilities[i * BINS + j] = row.probability;
        }
        Self::from_probabilities(probabilities)
    }

    pub fn bin_probability(&self, phi_bin: usize, psi_bin: usize) -> f64 {
        self.probabilities[(phi_bin % BINS) * BINS + (psi_bin % BINS)]
    }

    /// Probability at (φ, ψ), bilinearly interpolated between the four
    /// surrounding bin centres with periodic wrap-around.
    pub fn probability(&self, phi: f64, psi: f64) -> f64 {
        let (i0, fx) = grid_coordinate(phi);
        let (j0, fy) = grid_coordinate(psi);
        let i1 = (i0 + 1) % BINS;
        let j1 = (j0 + 1) % BINS;
        bilinear(
            self.bin_probability(i0, j0),
            self.bin_probability(i1, j0),
            self.bin_probability(i0, j1),
            self.bin_probability(i1, j1),
            fx,
            fy,
        )
    }

    pub fn penalty(&self, phi: f64, psi: f64, floor: f64, cap: f64) -> f64 {
        neg_log_probability(self.probability(phi, psi), floor, cap)
    }
}

fn bin_centre(index: usize) -> f64 {
    -180.0 + BIN_WIDTH * (index as f64 + 0.5)
}

fn bin_of(angle: f64) -> usize {
    let shifted = wrap_angle(angle) + 180.0;
    ((shifted / BIN_WIDTH).floor() as usize).min(BINS - 1)
}

fn grid_coordinate(angle: f64) -> (usize, f64) {
    let x = (wrap_angle(angle) + 180.0) / BIN_WIDTH - 0.5;
    let base = x.floor();
    let frac = x - base;
    let index = (base as i64).rem_euclid(BINS as i64) as usize;
    (index, frac)
}

/// The three histograms a residue can be scored against.
#[derive(Debug, Clone, PartialEq)]
pub struct RamaTables {
    pub general: RamaTable,
    pub glycine: RamaTable,
    pub proline: RamaTable,
}

impl RamaTables {
    pub fn standard(floor: f64) -> Self {
        Self {
            general: RamaTable::from_peaks(&GENERAL_PEAKS, floor),
            glycine: RamaTable::from_peaks(&GLYCINE_PEAKS, floor),
            proline: RamaTable::from_peaks(&PROLINE_PEAKS, floor),
        }
    }

    pub fn for_class(&self, class: RamaClass) -> &RamaTable {
        match class {
            RamaClass::General => &self.general,
            RamaClass::Glycine => &self.glycine,
            RamaClass::Proline => &self.proline,
        }
    }
}
