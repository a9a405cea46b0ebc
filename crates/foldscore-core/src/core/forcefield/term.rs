use super::params::Weights;
use std::ops::{Add, AddAssign, Sub};

/// Baseline the weighted penalties are subtracted from.
pub const BASE_SCORE: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TermKind {
    Clash,
    Rama,
    Rotamer,
    Ss,
    Compact,
    HBond,
}

impl TermKind {
    pub const ALL: [TermKind; 6] = [
        TermKind::Clash,
        TermKind::Rama,
        TermKind::Rotamer,
        TermKind::Ss,
        TermKind::Compact,
        TermKind::HBond,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TermKind::Clash => "clash",
            TermKind::Rama => "rama",
            TermKind::Rotamer => "rotamer",
            TermKind::Ss => "ss",
            TermKind::Compact => "compact",
            TermKind::HBond => "hbond",
        }
    }

    /// The hydrogen-bond term is added to the score; all others are subtracted.
    pub fn is_bonus(&self) -> bool {
        matches!(self, TermKind::HBond)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyTerm {
    pub clash: f64,
    pub rama: f64,
    pub rotamer: f64,
    pub ss: f64,
    pub compact: f64,
    pub hbond: f64,
}

impl EnergyTerm {
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

    pub fn set(&mut self, kind: TermKind, value: f64) {
        match kind {
            TermKind::Clash => self.clash = value,
            TermKind::Rama => self.rama = value,
            TermKind::Rotamer => self.rotamer = value,
            TermKind::Ss => self.ss = value,
            TermKind::Compact => self.compact = value,
            TermKind::HBond => self.hbond = value,
        }
    }

    #[inline]
    pub fn weighted_penalty(&self, weights: &Weights) -> f64 {
        TermKind::ALL
            .iter()
            .filter(|kind| !kind.is_bonus())
            .map(|&kind| weights.get(kind) * self.get(kind))
            .sum()
    }

    #[inline]
    pub fn weighted_bonus(&self, weights: &Weights) -> f64 {
        weights.hbond * self.hbond
    }

    /// Score contribution: bonus minus weighted penalties (without the baseline).
    #[inline]
    pub fn contribution(&self, weights: &Weights) -> f64 {
        self.weighted_bonus(weights) - self.weighted_penalty(weights)
    }

    #[inline]
    pub fn total(&self, weights: &Weights) -> f64 {
        BASE_SCORE + self.contribution(weights)
    }
}

impl Add for EnergyTerm {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            clash: self.clash + rhs.clash,
            rama: self.rama + rhs.rama,
            rotamer: self.rotamer + rhs.rotamer,
            ss: self.ss + rhs.ss,
            compact: self.compact + rhs.compact,
            hbond: self.hbond + rhs.hbond,
        }
    }
}

impl AddAssign for EnergyTerm {
    fn add_assign(&mut self, rhs: Self) {
        self.clash += rhs.clash;
        self.rama += rhs.rama;
        self.rotamer += rhs.rotamer;
        self.ss += rhs.ss;
        self.compact += rhs.compact;
        self.hbond += rhs.hbond;
    }
}

impl Sub for EnergyTerm {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            clash: self.clash - rhs.clash,
            rama: self.rama - rhs.rama,
            rotamer: self.rotamer - rhs.rotamer,
            ss: self.ss - rhs.ss,
            compact: self.compact - rhs.compact,
            hbond: self.hbond - rhs.hbond,
        }
    }
}

impl std::iter::Sum for EnergyTerm {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, term| acc + term)
    }
}
