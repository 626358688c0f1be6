use rand::{rng, rngs::StdRng, Rng, SeedableRng};

use crate::config::SimulationConfig;
use crate::core::particle::{Particle, DIM};
use crate::error::{Error, Result};

/// The population and the constants it lives under.
///
/// The particle vector is fixed-length for the run. Presentation code gets read-only
/// access; only [`crate::core::PhysicsStepper`] mutates particles between steps.
#[derive(Debug, Clone)]
pub struct ParticleState {
    config: SimulationConfig,
    particles: Vec<Particle>,
}

impl ParticleState {
    /// Seed `count` particles of identical `mass` inside the arena.
    ///
    /// Positions are uniform in `[radius, dim - radius]` per axis. Velocity components are
    /// integers drawn uniformly from `[-velocity_range, velocity_range]`. Overlap is not
    /// rejected; the stepper tolerates any finite initial state.
    pub fn initialize(
        config: SimulationConfig,
        count: usize,
        mass: f64,
        velocity_range: i64,
        seed: Option<u64>,
    ) -> Result<Self> {
        config.validate()?;
        if count == 0 {
            return Err(Error::InvalidConfiguration(
                "population size must be > 0".into(),
            ));
        }
        if velocity_range < 0 {
            return Err(Error::InvalidConfiguration(
                "velocity range must be >= 0".into(),
            ));
        }

        let mut rng: StdRng = match seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };

        let extent = [config.width, config.height];
        let mut particles = Vec::with_capacity(count);
        for _ in 0..count {
            let mut r = [0.0_f64; DIM];
            for (k, r_k) in r.iter_mut().enumerate() {
                *r_k = rng.random_range(config.radius..=extent[k] - config.radius);
            }
            let mut v = [0.0_f64; DIM];
            v.iter_mut()
                .for_each(|x| *x = rng.random_range(-velocity_range..=velocity_range) as f64);

            particles.push(Particle::new(mass, r, v)?);
        }

        log::info!(
            "initialized {} particles in {}x{} arena (seed {:?})",
            count,
            config.width,
            config.height,
            seed
        );
        Ok(Self { config, particles })
    }

    /// Wrap an explicit initial population.
    ///
    /// Errors: `Error::InvalidConfiguration` if the config is invalid, the population is
    /// empty, or any particle has non-positive mass or non-finite state.
    pub fn from_particles(config: SimulationConfig, particles: Vec<Particle>) -> Result<Self> {
        config.validate()?;
        if particles.is_empty() {
            return Err(Error::InvalidConfiguration(
                "population size must be > 0".into(),
            ));
        }
        for p in &particles {
            Particle::new(p.mass, p.r, p.v)?;
        }
        Ok(Self { config, particles })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Copy of particle `i`, or `None` if out of range.
    pub fn get(&self, i: usize) -> Option<Particle> {
        self.particles.get(i).copied()
    }

    /// Read-only view of the population as of the last completed step.
    pub fn all(&self) -> &[Particle] {
        &self.particles
    }

    /// Owned copy of the population, in index order.
    pub fn snapshot(&self) -> Vec<Particle> {
        self.particles.clone()
    }

    /// Total kinetic energy (diagnostic).
    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(|p| p.kinetic_energy()).sum()
    }

    /// Total linear momentum (diagnostic).
    pub fn momentum(&self) -> [f64; DIM] {
        self.particles.iter().fold([0.0; DIM], |acc, p| {
            let m = p.momentum();
            [acc[0] + m[0], acc[1] + m[1]]
        })
    }

    /// Replace every position. The slice length must equal the population size.
    ///
    /// Nothing is changed if any entry is rejected.
    pub fn set_positions(&mut self, positions: &[[f64; DIM]]) -> Result<()> {
        self.check_len(positions.len())?;
        let mut updated = self.particles.clone();
        for (p, &r) in updated.iter_mut().zip(positions) {
            p.set_position(r)?;
        }
        self.particles = updated;
        Ok(())
    }

    /// Replace every velocity. The slice length must equal the population size.
    ///
    /// Nothing is changed if any entry is rejected.
    pub fn set_velocities(&mut self, velocities: &[[f64; DIM]]) -> Result<()> {
        self.check_len(velocities.len())?;
        let mut updated = self.particles.clone();
        for (p, &v) in updated.iter_mut().zip(velocities) {
            p.set_velocity(v)?;
        }
        self.particles = updated;
        Ok(())
    }

    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    fn check_len(&self, got: usize) -> Result<()> {
        if got != self.particles.len() {
            return Err(Error::InvalidConfiguration(format!(
                "expected {} entries, got {}",
                self.particles.len(),
                got
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Result<SimulationConfig> {
        SimulationConfig::new(800.0, 600.0, 3.0, 10.0, 7.0)
    }

    #[test]
    fn initialize_places_inside_arena() -> Result<()> {
        let state = ParticleState::initialize(cfg()?, 200, 1.0, 5, Some(1234))?;
        assert_eq!(state.len(), 200);
        for p in state.all() {
            assert!(p.r[0] >= 3.0 && p.r[0] <= 797.0);
            assert!(p.r[1] >= 3.0 && p.r[1] <= 597.0);
            for &c in &p.v {
                assert!((-5.0..=5.0).contains(&c));
                assert_eq!(c.fract(), 0.0, "velocity components are integers");
            }
            assert_eq!(p.mass, 1.0);
        }
        Ok(())
    }

    #[test]
    fn seeded_initialize_is_reproducible() -> Result<()> {
        let a = ParticleState::initialize(cfg()?, 32, 1.0, 5, Some(77))?;
        let b = ParticleState::initialize(cfg()?, 32, 1.0, 5, Some(77))?;
        assert_eq!(a.snapshot(), b.snapshot());
        Ok(())
    }

    #[test]
    fn initialize_rejects_bad_input() -> Result<()> {
        assert!(ParticleState::initialize(cfg()?, 0, 1.0, 5, None).is_err());
        let err = ParticleState::initialize(cfg()?, 4, 0.0, 5, None).unwrap_err();
        assert!(err.to_string().contains("mass"));
        assert!(ParticleState::initialize(cfg()?, 4, 1.0, -1, None).is_err());
        Ok(())
    }

    #[test]
    fn get_and_all_agree() -> Result<()> {
        let ps = vec![
            Particle::new(1.0, [10.0, 10.0], [1.0, 0.0])?,
            Particle::new(2.0, [20.0, 10.0], [0.0, -1.0])?,
        ];
        let state = ParticleState::from_particles(cfg()?, ps.clone())?;
        assert_eq!(state.get(1), Some(ps[1]));
        assert_eq!(state.get(2), None);
        assert_eq!(state.all(), ps.as_slice());
        // The view is restartable.
        assert_eq!(state.all().iter().count(), state.all().iter().count());
        assert_eq!(state.momentum(), [1.0, -2.0]);
        Ok(())
    }

    #[test]
    fn setters_check_length_and_finiteness() -> Result<()> {
        let mut state = ParticleState::initialize(cfg()?, 3, 1.0, 5, Some(5))?;
        let before = state.snapshot();
        assert!(state.set_positions(&[[1.0, 1.0]]).is_err());
        let err = state
            .set_velocities(&[[9.0, 9.0], [f64::NAN, 0.0], [0.0, 0.0]])
            .unwrap_err();
        assert!(err.to_string().contains("velocity"));
        // A rejected batch leaves every particle untouched.
        assert_eq!(state.snapshot(), before);

        state.set_velocities(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]])?;
        state.set_positions(&[[10.0, 11.0], [12.0, 13.0], [14.0, 15.0]])?;
        assert_eq!(state.get(2).map(|p| (p.r, p.v)), Some(([14.0, 15.0], [5.0, 6.0])));
        Ok(())
    }
}
