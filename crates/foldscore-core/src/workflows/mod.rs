//! # Workflows Module
//!
//! Top-level, request-in/response-out entry points of foldscore.
//!
//! ## Overview
//!
//! Each workflow takes a parsed [`ScoreRequest`](crate::core::io::payload::ScoreRequest)
//! and shared [`ScoringParams`](crate::core::forcefield::params::ScoringParams),
//! validates the payload into a conformation, runs the engine, and returns a
//! wire-ready response. Invalid payloads are rejected before any scorer state
//! exists.
//!
//! - **Score** ([`score`]) - full score, or the incremental score after the
//!   request's optional diff
//! - **Nudge** ([`nudge`]) - one suggested micro-move with its exact ΔScore
//! - **Verify** ([`verify`]) - rescoring of submitted coordinates from scratch
//!   against a claimed score

pub mod nudge;
pub mod score;
pub mod verify;
