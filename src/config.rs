//! Run configuration for the particle core.
//!
//! Two layers live here:
//!
//! - [`SimulationConfig`] – the validated, immutable physics constants the stepper reads
//!   (arena, radius, `G`, speed limit, and the two scheme switches).
//! - [`Settings`] – a `serde`-deserializable scenario document that also carries the
//!   initializer and driver knobs (population size, mass, seed, step count).
//!
//! # YAML format
//! Every field is optional; omitted fields fall back to the default scenario:
//!
//! ```yaml
//! arena:
//!   width: 800.0
//!   height: 800.0
//!
//! particles:
//!   count: 100
//!   mass: 1.0
//!   radius: 3.0
//!   velocity_range: 5        # integer components in [-5, 5]
//!
//! physics:
//!   g: 10.0
//!   temperature: 273.0       # speed_limit = temperature * 7 / 273
//!   clamp: "one_sided"       # or "symmetric"
//!   collisions: "reference"  # or "pairwise"
//!
//! run:
//!   steps: 600
//!   report_every: 60
//!
//! seed: 42
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Ratio between temperature and the per-component speed limit.
pub const SPEED_LIMIT_FACTOR: f64 = 7.0 / 273.0;

/// Speed limit for a temperature-like scalar: `temperature * 7 / 273`.
pub fn speed_limit_from_temperature(temperature: f64) -> f64 {
    temperature * SPEED_LIMIT_FACTOR
}

/// How the speed limit is enforced after each partner's gravitational contribution.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClampMode {
    /// Cap each velocity component from above only. `vx` and `vy` may still be
    /// arbitrarily negative. This is a ceiling, not a speed bound.
    #[default]
    #[serde(rename = "one_sided")]
    OneSided,

    /// Rescale the whole velocity vector so its magnitude never exceeds the limit.
    #[serde(rename = "symmetric")]
    Symmetric,
}

/// How overlapping pairs are resolved within one step.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionScheme {
    /// Resolve collisions inside each particle's turn, in index order, mutating the
    /// partner immediately. A pair may be visited from both sides in the same step.
    #[default]
    #[serde(rename = "reference")]
    Reference,

    /// Move every particle first, then resolve each overlapping unordered pair exactly
    /// once from a frozen velocity snapshot.
    #[serde(rename = "pairwise")]
    Pairwise,
}

impl FromStr for ClampMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "one_sided" => Ok(Self::OneSided),
            "symmetric" => Ok(Self::Symmetric),
            other => Err(Error::InvalidConfiguration(format!(
                "unknown clamp mode {other:?} (expected \"one_sided\" or \"symmetric\")"
            ))),
        }
    }
}

impl FromStr for CollisionScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "reference" => Ok(Self::Reference),
            "pairwise" => Ok(Self::Pairwise),
            other => Err(Error::InvalidConfiguration(format!(
                "unknown collision scheme {other:?} (expected \"reference\" or \"pairwise\")"
            ))),
        }
    }
}

/// Immutable physics constants for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    /// Arena width (> 0).
    pub width: f64,
    /// Arena height (> 0).
    pub height: f64,
    /// Particle radius (> 0), used for wall and contact thresholds.
    pub radius: f64,
    /// Gravitational constant.
    pub g: f64,
    /// Velocity bound (>= 0).
    pub speed_limit: f64,
    pub clamp: ClampMode,
    pub collisions: CollisionScheme,
}

impl SimulationConfig {
    /// Build a config with the default clamp mode and collision scheme.
    ///
    /// Errors:
    /// - `Error::InvalidConfiguration` if an arena dimension or the radius is non-positive,
    ///   `g` is not finite, or `speed_limit` is negative or not finite.
    pub fn new(width: f64, height: f64, radius: f64, g: f64, speed_limit: f64) -> Result<Self> {
        let cfg = Self {
            width,
            height,
            radius,
            g,
            speed_limit,
            clamp: ClampMode::default(),
            collisions: CollisionScheme::default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_clamp(mut self, clamp: ClampMode) -> Self {
        self.clamp = clamp;
        self
    }

    pub fn with_collisions(mut self, collisions: CollisionScheme) -> Self {
        self.collisions = collisions;
        self
    }

    /// Check every constant; called by the constructors and by `ParticleState`.
    pub fn validate(&self) -> Result<()> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(Error::InvalidConfiguration(
                "arena width must be finite and > 0".into(),
            ));
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(Error::InvalidConfiguration(
                "arena height must be finite and > 0".into(),
            ));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::InvalidConfiguration(
                "radius must be finite and > 0".into(),
            ));
        }
        if 2.0 * self.radius > self.width || 2.0 * self.radius > self.height {
            return Err(Error::InvalidConfiguration(
                "arena must be at least 2 * radius in every dimension".into(),
            ));
        }
        if !self.g.is_finite() {
            return Err(Error::InvalidConfiguration("G must be finite".into()));
        }
        if !self.speed_limit.is_finite() || self.speed_limit < 0.0 {
            return Err(Error::InvalidConfiguration(
                "speed limit must be finite and >= 0".into(),
            ));
        }
        Ok(())
    }

    /// Minimum center distance at which two particles do not overlap.
    #[inline]
    pub fn contact_distance(&self) -> f64 {
        2.0 * self.radius
    }
}

/// Arena dimensions.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ArenaSettings {
    pub width: f64,
    pub height: f64,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 800.0,
        }
    }
}

/// Population shape handed to the initializer.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ParticleSettings {
    pub count: usize,
    pub mass: f64,
    pub radius: f64,
    /// Initial velocity components are integers drawn from `[-velocity_range, velocity_range]`.
    pub velocity_range: i64,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            count: 100,
            mass: 1.0,
            radius: 3.0,
            velocity_range: 5,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PhysicsSettings {
    pub g: f64,
    pub temperature: f64,
    pub clamp: ClampMode,
    pub collisions: CollisionScheme,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            g: 10.0,
            temperature: 273.0,
            clamp: ClampMode::default(),
            collisions: CollisionScheme::default(),
        }
    }
}

/// Driver-side settings; the core never reads these.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RunSettings {
    pub steps: u64,
    /// Log a diagnostics line every this many steps (0 disables periodic reports).
    pub report_every: u64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            steps: 600,
            report_every: 60,
        }
    }
}

/// Top-level scenario document.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub arena: ArenaSettings,
    pub particles: ParticleSettings,
    pub physics: PhysicsSettings,
    pub run: RunSettings,
    /// Deterministic seed for the initializer; `None` draws one from the thread RNG.
    pub seed: Option<u64>,
}

impl Settings {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Derive the validated physics constants (temperature becomes the speed limit here).
    pub fn physics_config(&self) -> Result<SimulationConfig> {
        if !self.physics.temperature.is_finite() || self.physics.temperature < 0.0 {
            return Err(Error::InvalidConfiguration(
                "temperature must be finite and >= 0".into(),
            ));
        }
        Ok(SimulationConfig::new(
            self.arena.width,
            self.arena.height,
            self.particles.radius,
            self.physics.g,
            speed_limit_from_temperature(self.physics.temperature),
        )?
        .with_clamp(self.physics.clamp)
        .with_collisions(self.physics.collisions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_273_gives_limit_seven() {
        assert!((speed_limit_from_temperature(273.0) - 7.0).abs() < 1e-12);
        assert_eq!(speed_limit_from_temperature(0.0), 0.0);
    }

    #[test]
    fn non_positive_radius_rejected() {
        let err = SimulationConfig::new(800.0, 800.0, 0.0, 10.0, 7.0).unwrap_err();
        assert!(err.to_string().contains("radius"));
    }

    #[test]
    fn non_positive_arena_rejected() {
        assert!(SimulationConfig::new(0.0, 800.0, 3.0, 10.0, 7.0).is_err());
        assert!(SimulationConfig::new(800.0, -1.0, 3.0, 10.0, 7.0).is_err());
        assert!(SimulationConfig::new(f64::NAN, 800.0, 3.0, 10.0, 7.0).is_err());
    }

    #[test]
    fn negative_speed_limit_rejected() {
        let err = SimulationConfig::new(800.0, 800.0, 3.0, 10.0, -1.0).unwrap_err();
        assert!(err.to_string().contains("speed limit"));
    }

    #[test]
    fn empty_document_is_default_scenario() -> Result<()> {
        let s = Settings::from_yaml_str("{}")?;
        assert_eq!(s.particles.count, 100);
        assert_eq!(s.particles.velocity_range, 5);
        assert!(s.seed.is_none());
        let cfg = s.physics_config()?;
        assert_eq!(cfg.width, 800.0);
        assert_eq!(cfg.radius, 3.0);
        assert_eq!(cfg.g, 10.0);
        assert!((cfg.speed_limit - 7.0).abs() < 1e-12);
        assert_eq!(cfg.clamp, ClampMode::OneSided);
        assert_eq!(cfg.collisions, CollisionScheme::Reference);
        Ok(())
    }

    #[test]
    fn partial_document_overrides_fields() -> Result<()> {
        let yaml = r#"
arena:
  width: 400.0
physics:
  temperature: 546.0
  clamp: "symmetric"
  collisions: "pairwise"
seed: 9
"#;
        let s = Settings::from_yaml_str(yaml)?;
        let cfg = s.physics_config()?;
        assert_eq!(cfg.width, 400.0);
        assert_eq!(cfg.height, 800.0);
        assert!((cfg.speed_limit - 14.0).abs() < 1e-12);
        assert_eq!(cfg.clamp, ClampMode::Symmetric);
        assert_eq!(cfg.collisions, CollisionScheme::Pairwise);
        assert_eq!(s.seed, Some(9));
        Ok(())
    }

    #[test]
    fn scheme_names_parse() -> Result<()> {
        assert_eq!("symmetric".parse::<ClampMode>()?, ClampMode::Symmetric);
        assert_eq!("pairwise".parse::<CollisionScheme>()?, CollisionScheme::Pairwise);
        assert!("both".parse::<CollisionScheme>().is_err());
        Ok(())
    }

    #[test]
    fn unknown_clamp_mode_is_a_parse_error() {
        let err = Settings::from_yaml_str("physics:\n  clamp: \"sideways\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
