use crate::core::utils::geometry::wrap_angle;
use serde::Deserialize;

/// One rotamer bin: the χ centres of a favoured side-chain conformation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RotamerBin {
    /// χ centres in degrees, χ1 first.
    pub chi: Vec<f64>,
}

impl RotamerBin {
    pub fn new(chi: Vec<f64>) -> Self {
        Self { chi }
    }

    /// Sum over χ of the squared excess of |Δχ| beyond `half_width`.
    ///
    /// Zero when every angle lies inside the bin.
    pub fn excess_squared(&self, chi: &[f64], half_width: f64) -> f64 {
        self.chi
            .iter()
            .zip(chi)
            .map(|(centre, angle)| {
                let excess = (wrap_angle(angle - centre).abs() - half_width).max(0.0);
                excess * excess
            })
            .sum()
    }

    /// Sum over χ of the squared wrapped angular difference to the centres.
    pub fn distance_squared(&self, chi: &[f64]) -> f64 {
        self.chi
            .iter()
            .zip(chi)
            .map(|(centre, angle)| {
                let d = wrap_angle(angle - centre);
                d * d
            })
            .sum()
    }
}
