//! Round reconciliation engine.
//!
//! This module provides:
//! - `core`: the `RoundKeeper` struct and initialization
//! - `cycle`: the reconciliation cycle and the polling loop
//! - `tests`: unit tests for the cycle logic

pub mod core;
pub mod cycle;

pub use core::RoundKeeper;
pub use cycle::{now_secs, CycleReport};

#[cfg(test)]
mod tests;
