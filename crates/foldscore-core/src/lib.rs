//! # foldscore
//!
//! A real-time scoring engine for interactive protein folding. It evaluates a
//! 3D conformation against an explainable, physics-lite energy model,
//! rescoring incrementally after each small edit, and suggests "nudge"
//! micro-moves that are likely to improve the score.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Conformation`,
//!   `Move`), the pure energy term functions, the spatial grid, and payload I/O.
//!
//! - **[`engine`]: The Logic Core.** Stateful, incremental machinery: the
//!   per-residue `ScoreCache`, the `Scorer` that keeps grid, cache and
//!   coordinates in step, transactional trial moves, the nudge selector, and
//!   the lock-guarded `Session`.
//!
//! - **[`workflows`]: The Public API.** Request-in, response-out entry points
//!   (`score`, `nudge`, `verify`) that tie the engine and the payload formats
//!   together.

pub mod core;
pub mod engine;
pub mod workflows;
