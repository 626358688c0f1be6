use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use particlesim::{ClampMode, CollisionScheme, Settings, Simulation};

/// Run the particle core headless and log diagnostics.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Scenario file (YAML); the built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of steps to run.
    #[arg(long)]
    steps: Option<u64>,

    /// Override the initializer seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Override the clamp mode ("one_sided" or "symmetric").
    #[arg(long)]
    clamp: Option<ClampMode>,

    /// Override the collision scheme ("reference" or "pairwise").
    #[arg(long)]
    collisions: Option<CollisionScheme>,
}

/// Scenario file (or defaults) with the command-line overrides applied.
fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(steps) = args.steps {
        settings.run.steps = steps;
    }
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    if let Some(clamp) = args.clamp {
        settings.physics.clamp = clamp;
    }
    if let Some(collisions) = args.collisions {
        settings.physics.collisions = collisions;
    }
    Ok(settings)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = load_settings(&args)?;
    let mut sim = Simulation::new(&settings).context("failed to initialize population")?;

    log::info!(
        "running {} steps: {} particles, G={}, speed limit {:.3} ({:?} clamp, {:?} collisions)",
        settings.run.steps,
        sim.num_particles(),
        sim.config().g,
        sim.config().speed_limit,
        sim.config().clamp,
        sim.config().collisions,
    );

    let every = settings.run.report_every;
    for _ in 0..settings.run.steps {
        sim.step();
        if every > 0 && sim.tick() % every == 0 {
            let p = sim.momentum();
            let d = sim.diagnostics();
            log::info!(
                "tick {:>6}  KE {:>12.4}  p ({:>10.4}, {:>10.4})  impulses {:>7}  degenerate {}",
                sim.tick(),
                sim.kinetic_energy(),
                p[0],
                p[1],
                d.collisions,
                d.degenerate_pairs
            );
        }
    }

    let d = sim.diagnostics();
    log::info!(
        "done after {} steps: {} impulses, {} degenerate pairs skipped",
        d.steps,
        d.collisions,
        d.degenerate_pairs
    );
    Ok(())
}
