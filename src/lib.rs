//! 2-D particle dynamics core.
//!
//! A fixed population of point masses attracts pairwise under Newtonian gravity, is
//! confined to a rectangular arena by reflective walls, and resolves overlaps with
//! elastic impulses. [`core::PhysicsStepper`] advances a [`core::ParticleState`] one
//! unit step at a time; presentation layers read the state between steps.

pub mod config;
pub mod core;
pub mod error;

#[cfg(feature = "python")]
mod python;

pub use crate::config::{ClampMode, CollisionScheme, Settings, SimulationConfig};
pub use crate::core::{Particle, ParticleState, PhysicsStepper, Simulation, StepReport};
pub use crate::error::{Error, Result};
