//! Nudge: suggesting one small move that is likely to raise the score.
//!
//! ## Overview
//!
//! A nudge request runs a fixed pipeline on a snapshot of the scorer:
//!
//! 1. [`candidates`] picks the worst-scoring residues by weighted penalty and
//!    proposes ±step torsion moves and nearby rotamers around them.
//! 2. [`selector::NudgeSelector`] evaluates them. Without a model every
//!    candidate is rescored exactly, in parallel when the `parallel` feature
//!    is enabled. With a [`model::DeltaModel`], candidates are ranked by
//!    predicted ΔScore from [`features`] and only the top few are rescored.
//! 3. The best exactly-scored candidate is suggested. The reported ΔScore is
//!    always the exact one; predictions only decide what gets verified.
//!
//! A model that fails to predict is logged and bypassed; the suggestion then
//! reports `model_used = false`.

pub mod candidates;
pub mod features;
pub mod model;
pub mod selector;
