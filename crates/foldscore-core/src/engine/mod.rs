//! # Engine Module
//!
//! Stateful scoring on top of the pure term functions in
//! [`core::forcefield`](crate::core::forcefield).
//!
//! ## Overview
//!
//! A [`scorer::Scorer`] owns a conformation, a spatial index over its atoms,
//! and a [`cache::ScoreCache`] of per-residue local terms. Applying a move
//! recomputes only the residues near the atoms it displaced, then redistributes
//! the chain-level compactness term, so the resulting breakdown is identical to
//! a full rescore.
//!
//! ## Architecture
//!
//! - **Scoring** ([`scorer`]) - incremental rescoring and consistency checks
//! - **Transactions** ([`transaction`]) - try a move and roll it back exactly
//! - **Sessions** ([`session`]) - a lock-protected scorer shared by handlers
//! - **Nudge** ([`nudge`]) - candidate generation, optional model ranking, and
//!   exact selection of a single suggested move
//! - **Configuration** ([`config`]) and **Errors** ([`error`])
//!
//! ## Guarantees
//!
//! - After any sequence of accepted moves the cached breakdown equals a fresh
//!   full score within floating-point tolerance.
//! - A rejected move leaves coordinates, cache, and breakdown untouched.
//! - Every ΔScore the engine reports comes from an exact rescore.

pub mod cache;
pub mod config;
pub mod error;
pub mod nudge;
pub mod scorer;
pub mod session;
pub mod transaction;
