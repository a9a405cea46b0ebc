//! The six term functions.
//!
//! Each function scores one residue from the current coordinates and returns
//! that residue's share of the term. Summing the shares over all residues
//! gives the chain total. Every share depends only on atoms within the
//! interaction cutoff of the residue, which is what lets the scorer recompute
//! a move's neighbourhood and keep every other cached share.
//!
//! Compactness is the exception: it is a chain-level quantity computed by
//! [`compact`] and distributed over residues after the local terms.

pub mod clash;
pub mod compact;
pub mod hbond;
pub mod rama;
pub mod rotamer;
pub mod ss;
