//! Combat logic for ASTROBLITZ.
//!
//! Implements the two-tier damage pipeline, nearest-target acquisition,
//! and the burst fire-control clock. No ECS dependency — operates on
//! plain data, so every rule is unit-testable with arbitrary tick sizes.

pub mod damage;
pub mod fire_control;
pub mod targeting;

pub use astroblitz_core as core;
