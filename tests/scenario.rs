use std::path::PathBuf;

use particlesim::error::{Error, Result};
use particlesim::{ClampMode, CollisionScheme, Settings, Simulation};

fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

/// The shipped scenario matches the built-in defaults.
#[test]
fn default_scenario_loads() -> Result<()> {
    let settings = Settings::load(scenario_path("default.yaml"))?;
    let cfg = settings.physics_config()?;
    assert_eq!(settings.particles.count, 100);
    assert_eq!((cfg.width, cfg.height), (800.0, 800.0));
    assert_eq!(cfg.radius, 3.0);
    assert_eq!(cfg.g, 10.0);
    assert!((cfg.speed_limit - 7.0).abs() < 1e-12);
    assert_eq!(cfg.clamp, ClampMode::OneSided);
    assert_eq!(cfg.collisions, CollisionScheme::Reference);
    assert_eq!(settings.run.steps, 600);

    let mut sim = Simulation::new(&Settings {
        seed: Some(1),
        ..settings
    })?;
    sim.advance(20);
    assert!(sim.kinetic_energy().is_finite());
    Ok(())
}

#[test]
fn missing_scenario_is_io_error() {
    let err = Settings::load(scenario_path("does_not_exist.yaml")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn invalid_values_fail_at_initialization() {
    for yaml in [
        "particles:\n  mass: 0.0\n",
        "particles:\n  radius: -3.0\n",
        "particles:\n  count: 0\n",
        "arena:\n  width: 0.0\n",
        "physics:\n  temperature: -1.0\n",
    ] {
        let settings = match Settings::from_yaml_str(yaml) {
            Ok(s) => s,
            Err(e) => panic!("{yaml:?} should parse: {e}"),
        };
        match Simulation::new(&settings) {
            Err(Error::InvalidConfiguration(_)) => {}
            other => panic!("{yaml:?}: expected InvalidConfiguration, got {other:?}"),
        }
    }
}
