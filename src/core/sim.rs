use crate::config::{Settings, SimulationConfig};
use crate::core::particle::{Particle, DIM};
use crate::core::state::ParticleState;
use crate::core::stepper::{PhysicsStepper, StepReport};
use crate::error::Result;

/// Running totals over every step taken so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub steps: u64,
    pub collisions: u64,
    pub degenerate_pairs: u64,
}

impl Diagnostics {
    fn record(&mut self, report: &StepReport) {
        self.steps += 1;
        self.collisions += report.collisions as u64;
        self.degenerate_pairs += report.degenerate.len() as u64;
    }
}

/// A population, the stepper that drives it, and the bookkeeping a driver needs.
///
/// Both outer surfaces (the headless binary and the Python binding) go through this type.
#[derive(Debug, Clone)]
pub struct Simulation {
    state: ParticleState,
    stepper: PhysicsStepper,
    diagnostics: Diagnostics,
}

impl Simulation {
    /// Seed a random population from a scenario document.
    pub fn new(settings: &Settings) -> Result<Self> {
        let config = settings.physics_config()?;
        let state = ParticleState::initialize(
            config,
            settings.particles.count,
            settings.particles.mass,
            settings.particles.velocity_range,
            settings.seed,
        )?;
        Ok(Self::from_state(state))
    }

    /// Start from an explicit population.
    pub fn from_particles(config: SimulationConfig, particles: Vec<Particle>) -> Result<Self> {
        Ok(Self::from_state(ParticleState::from_particles(
            config, particles,
        )?))
    }

    pub fn from_state(state: ParticleState) -> Self {
        Self {
            state,
            stepper: PhysicsStepper::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Advance by one step.
    pub fn step(&mut self) -> StepReport {
        let report = self.stepper.step(&mut self.state);
        self.diagnostics.record(&report);
        report
    }

    /// Advance by `n` steps and return the totals for just those steps.
    pub fn advance(&mut self, n: u64) -> Diagnostics {
        let mut window = Diagnostics::default();
        for _ in 0..n {
            let report = self.step();
            window.record(&report);
        }
        window
    }

    /// Number of completed steps.
    pub fn tick(&self) -> u64 {
        self.diagnostics.steps
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    pub fn state(&self) -> &ParticleState {
        &self.state
    }

    /// Mutable access for re-seeding between steps (e.g. from a binding's setters).
    pub fn state_mut(&mut self) -> &mut ParticleState {
        &mut self.state
    }

    pub fn config(&self) -> &SimulationConfig {
        self.state.config()
    }

    pub fn num_particles(&self) -> usize {
        self.state.len()
    }

    pub fn snapshot(&self) -> Vec<Particle> {
        self.state.snapshot()
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.state.kinetic_energy()
    }

    pub fn momentum(&self) -> [f64; DIM] {
        self.state.momentum()
    }
}
