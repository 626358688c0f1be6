use crate::error::{Error, Result};

/// Fixed spatial dimension (2D).
pub const DIM: usize = 2;

/// A point mass in the arena.
///
/// Identity is the particle's index in the population; there is no separate id.
///
/// Fields:
/// - `mass`: particle mass (> 0)
/// - `r`: position [x, y]
/// - `v`: velocity [vx, vy]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Mass (> 0).
    pub mass: f64,
    /// Position (x, y).
    pub r: [f64; DIM],
    /// Velocity (vx, vy).
    pub v: [f64; DIM],
}

impl Particle {
    /// Create a new particle after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidConfiguration` if `mass` is non-positive or any component is NaN/inf.
    pub fn new(mass: f64, r: [f64; DIM], v: [f64; DIM]) -> Result<Self> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidConfiguration(
                "mass must be finite and > 0".into(),
            ));
        }
        if !r.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidConfiguration("position must be finite".into()));
        }
        if !v.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidConfiguration("velocity must be finite".into()));
        }
        Ok(Self { mass, r, v })
    }

    /// Returns the particle's kinetic energy: 1/2 m |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        let vsq: f64 = self.v.iter().map(|&c| c * c).sum();
        0.5 * self.mass * vsq
    }

    /// Linear momentum m * v.
    #[inline]
    pub fn momentum(&self) -> [f64; DIM] {
        [self.mass * self.v[0], self.mass * self.v[1]]
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.v[0].hypot(self.v[1])
    }

    /// Speed as a fraction of `limit`, saturated to [0, 1].
    ///
    /// This is the normalized value a renderer maps to a color ramp. Returns 0 for a
    /// non-positive limit or a non-finite speed.
    pub fn speed_fraction(&self, limit: f64) -> f64 {
        let s = self.speed();
        if limit <= 0.0 || !s.is_finite() {
            return 0.0;
        }
        (s / limit).clamp(0.0, 1.0)
    }

    /// Set position (validated as finite).
    pub fn set_position(&mut self, r: [f64; DIM]) -> Result<()> {
        if !r.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidConfiguration("position must be finite".into()));
        }
        self.r = r;
        Ok(())
    }

    /// Set velocity (validated as finite).
    pub fn set_velocity(&mut self, v: [f64; DIM]) -> Result<()> {
        if !v.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidConfiguration("velocity must be finite".into()));
        }
        self.v = v;
        Ok(())
    }
}
