//! # Rotamers Module
//!
//! Discrete side-chain conformations used both to score how far a side chain sits
//! from a favoured state and to propose rotamer swaps as nudge candidates.
//!
//! ## Overview
//!
//! A rotamer bin is a vector of χ centres (one per rotatable side-chain bond).
//! A side chain is "inside" a bin when every χ is within the bin half-width of
//! the corresponding centre. The standard library is the tensor product of the
//! staggered positions {−60°, 60°, 180°} for each χ; a custom library can be
//! loaded from a TOML file.
//!
//! ## Key Components
//!
//! - [`rotamer`] - The `RotamerBin` value type and its angular distance measures
//! - [`library`] - `RotamerLibrary`, the per-residue-type collection of bins
//!
//! ## Usage
//!
//! ```ignore
//! use foldscore::core::rotamers::library::RotamerLibrary;
//!
//! let library = RotamerLibrary::standard();
//! let bins = library.bins_for(AminoAcidType::Leucine);
//! assert_eq!(bins.len(), 9);
//! ```

pub mod library;
pub mod rotamer;
