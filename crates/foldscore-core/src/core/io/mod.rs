//! JSON payloads exchanged with the game client.
//!
//! A [`payload::ScoreRequest`] carries a complete conformation (sequence,
//! atoms, level targets) and optionally a single move to apply. It is
//! converted into a [`Conformation`](crate::core::models::conformation::Conformation)
//! through the model builder, which runs every schema check and then the
//! geometry checks in [`validation`]. Nothing downstream ever observes a
//! payload that failed either stage.
//!
//! Responses ([`payload::ScoreResponse`], [`payload::NudgeResponse`]) are plain
//! serde records mirroring the engine's breakdown and suggestion types.

pub mod error;
pub mod payload;
pub mod validation;
