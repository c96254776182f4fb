//! Simulation engine for ASTROBLITZ.
//!
//! Owns the hecs ECS world, runs systems at a fixed tick rate, and
//! produces GameStateSnapshots for the host. Completely headless
//! (no rendering or I/O dependency), enabling deterministic testing.

pub mod actions;
pub mod engine;
pub mod inventory;
pub mod systems;
pub mod world_setup;

pub use astroblitz_core as core;
pub use engine::SimulationEngine;

#[cfg(test)]
mod tests;
