// src/scoring/mod.rs
//
// Pure quiz computations: no I/O, no shared state.

pub mod grading;
pub mod leaderboard;
pub mod matching;
pub mod sampling;
