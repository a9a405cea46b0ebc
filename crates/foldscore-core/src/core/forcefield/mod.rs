//! # Force Field Module
//!
//! The physics-lite energy model that turns a conformation into a score.
//!
//! ## Overview
//!
//! A score is `1000 − Σ wₖ·termₖ + w₆·hbond` over five penalty terms and one
//! bonus term, each of which is decomposed per residue:
//!
//! - **Clash**: soft-sphere overlap between non-bonded atoms
//! - **Rama**: `−log p(φ, ψ)` from residue-class Ramachandran histograms
//! - **Rotamer**: squared χ excess beyond the nearest staggered rotamer bin
//! - **SS**: mismatch between DSSP-lite assignment and the level's target
//! - **Compact**: radius-of-gyration or target-contact penalty
//! - **HBond**: bonus for matched donor/acceptor pairs
//!
//! ## Key Components
//!
//! - [`params`] - Weights, per-term constants and lookup tables, loadable from TOML
//! - [`terms`] - One pure function per term, scoring a single residue
//! - [`scoring`] - [`scoring::ScoringContext`] and [`scoring::ScoreBreakdown`]
//! - [`term`] - The six-valued [`term::EnergyTerm`] and [`term::TermKind`]
//! - [`ramachandran`] - Interpolated φ/ψ probability tables
//! - [`potentials`] - Scalar potential functions shared by the terms
//!
//! ## Usage
//!
//! Build a [`spatial::grid::SpatialIndex`](crate::core::spatial::grid::SpatialIndex)
//! over a conformation, wrap both in a [`scoring::ScoringContext`] with a
//! [`params::ScoringParams`], and call
//! [`full_breakdown`](scoring::ScoringContext::full_breakdown). Incremental
//! rescoring lives in the engine, which reuses the same per-residue functions.

pub mod params;
pub mod potentials;
pub mod ramachandran;
pub mod scoring;
pub mod term;
pub mod terms;
