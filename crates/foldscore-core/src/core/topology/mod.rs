//! # Topology Module
//!
//! Static structural knowledge about the twenty standard amino acids: which atom
//! quadruples define each side-chain dihedral, and the reference lengths of the
//! backbone bonds used to validate submitted geometry.
//!
//! ## Key Components
//!
//! - [`registry`] - Compile-time tables of χ definitions and backbone bond references
//!
//! ## Usage
//!
//! ```ignore
//! use foldscore::core::topology::registry;
//!
//! let chis = registry::chi_definitions("LYS");
//! assert_eq!(chis.len(), 4);
//! ```

pub mod registry;
