//! # Core Models Module
//!
//! Data structures representing one protein chain in 3D: atoms, residues, the
//! conformation that owns them, and the moves that edit it.
//!
//! ## Overview
//!
//! A [`conformation::Conformation`] is created once per level load through the
//! validating [`builder::ConformationBuilder`] and afterwards mutated only by
//! [`moves::Move`]s. Backbone φ/ψ and side-chain χ angles are derived from the
//! coordinates and kept current as moves are applied.
//!
//! ## Key Components
//!
//! - [`atom`] - Atom identity, element and role
//! - [`residue`] - Amino-acid types, secondary-structure states and residues
//! - [`conformation`] - The chain state, its bond graph and move application
//! - [`builder`] - Schema and geometry validation on construction
//! - [`ideal`] - Idealised coordinate generation from dihedrals
//! - [`moves`] - The closed set of local edits
//! - [`ids`] - Arena keys for atoms
//!
//! ## Usage
//!
//! ```ignore
//! use foldscore::core::models::{ideal::IdealChain, moves::Move};
//! use foldscore::core::rotamers::library::RotamerLibrary;
//!
//! let library = RotamerLibrary::standard();
//! let mut conformation = IdealChain::new("ACDEFG").build(&library)?;
//! conformation.apply_move(&Move::phi(2, 5.0), &library, &mut Vec::new())?;
//! ```

pub mod atom;
pub mod builder;
pub mod conformation;
pub mod ideal;
pub mod ids;
pub mod moves;
pub mod residue;
