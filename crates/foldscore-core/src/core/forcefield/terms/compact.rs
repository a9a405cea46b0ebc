use crate::core::forcefield::params::CompactParams;
use crate::core::forcefield::potentials::harmonic;
use crate::core::forcefield::term::EnergyTerm;
use crate::core::models::conformation::{CompactnessMode, Conformation};
use nalgebra::Vector3;

/// Cα radius of gyration; zero for chains of fewer than two residues.
pub fn radius_of_gyration(conf: &Conformation) -> f64 {
    let mut count = 0usize;
    let mut sum = Vector3::zeros();
    for i in 0..conf.len() {
        if let Some(ca) = conf.ca_position(i) {
            sum += ca.coords;
            count += 1;
        }
    }
    if count < 2 {
        return 0.0;
    }
    let centre = sum / count as f64;
    let moment: f64 = (0..conf.len())
        .filter_map(|i| conf.ca_position(i))
        .map(|ca| (ca.coords - centre).norm_squared())
        .sum();
    (moment / count as f64).sqrt()
}

pub fn rg_target(residue_count: usize, params: &CompactParams) -> f64 {
    params.rg_prefactor * (residue_count as f64).cbrt()
}

/// Whether the Cα atoms of a target contact are within the contact distance.
pub fn contact_kept(conf: &Conformation, (i, j): (usize, usize), params: &CompactParams) -> bool {
    match (conf.ca_position(i), conf.ca_position(j)) {
        (Some(a), Some(b)) => (a - b).norm() <= params.contact_distance,
        _ => false,
    }
}

/// Computes the chain's compactness penalty, writes each residue's share into
/// `per_residue[i].compact`, and returns the total.
///
/// In Rg mode the penalty is shared uniformly; in contact mode each broken
/// contact charges half of `β` to each endpoint.
pub fn distribute(conf: &Conformation, params: &CompactParams, per_residue: &mut [EnergyTerm]) -> f64 {
    for terms in per_residue.iter_mut() {
        terms.compact = 0.0;
    }
    let n = per_residue.len();
    if n == 0 {
        return 0.0;
    }

    match conf.compactness() {
        CompactnessMode::Rg => {
            let total = harmonic(radius_of_gyration(conf), rg_target(n, params), params.rg_alpha);
            let share = total / n as f64;
            for terms in per_residue.iter_mut() {
                terms.compact = share;
            }
            total
        }
        CompactnessMode::Contacts => {
            let mut total = 0.0;
            for &(i, j) in conf.target_contacts() {
                if contact_kept(conf, (i, j), params) || i >= n || j >= n {
                    continue;
                }
                per_residue[i].compact += 0.5 * params.contact_beta;
                per_residue[j].compact += 0.5 * params.contact_beta;
                total += params.contact_beta;
            }
            total
        }
    }
}
