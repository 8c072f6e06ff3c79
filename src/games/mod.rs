//! Sample games.
//!
//! - `simple`: a small creature-card game with one stylesheet, used by the
//!   docs, tests and benchmarks

pub mod simple;
