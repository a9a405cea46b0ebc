//! # Core Module
//!
//! Stateless building blocks of the scoring engine: the conformation model,
//! the energy terms, neighbour search, payload I/O and the static chemistry
//! tables they share.
//!
//! ## Architecture
//!
//! - **Conformation Model** ([`models`]) - Atoms, residues, moves, and the
//!   [`Conformation`](models::conformation::Conformation) that applies them
//! - **Energy Model** ([`forcefield`]) - Term functions, weights and the score breakdown
//! - **Neighbour Search** ([`spatial`]) - Uniform grid over atom positions
//! - **Payloads** ([`io`]) - JSON request/response records and geometry validation
//! - **Structural Knowledge** ([`topology`]) - χ definitions and backbone bond references
//! - **Rotamer Bins** ([`rotamers`]) - Staggered χ bins per residue type
//! - **Geometry** ([`utils`]) - Dihedrals, rotations and internal-coordinate placement
//!
//! Nothing in this layer holds caches or locks; incremental state lives in
//! [`engine`](crate::engine).

pub mod forcefield;
pub mod io;
pub mod models;
pub mod rotamers;
pub mod spatial;
pub mod topology;
pub mod utils;
