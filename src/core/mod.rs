//! Core simulation data structures and the per-step physics.
//!
//! - [`particle`]: the point-mass value type.
//! - [`state`]: the population plus its constants (`ParticleState`).
//! - [`stepper`]: one discrete step of gravity, clamp, drift, walls and collisions.
//! - [`sim`]: a driver-facing wrapper that counts ticks and accumulates diagnostics.

pub mod particle;
pub mod sim;
pub mod state;
pub mod stepper;

pub use particle::Particle;
pub use sim::{Diagnostics, Simulation};
pub use state::ParticleState;
pub use stepper::{DegeneratePair, Phase, PhysicsStepper, StepReport};
