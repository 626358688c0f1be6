use std::fmt;

use crate::config::{ClampMode, CollisionScheme, SimulationConfig};
use crate::core::particle::{Particle, DIM};
use crate::core::state::ParticleState;
use crate::error::{Error, Result};

/// Center distances at or below this are treated as coincident.
pub const EPS_DISTANCE: f64 = 1e-9;

/// Step phase in which a degenerate pair was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Gravity,
    Collision,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Gravity => f.write_str("gravity"),
            Phase::Collision => f.write_str("collision"),
        }
    }
}

/// A pair whose contribution was skipped because the particles coincide.
///
/// `i` is the particle whose turn it was; for the pairwise scheme `i < j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegeneratePair {
    pub i: usize,
    pub j: usize,
    pub phase: Phase,
}

impl From<DegeneratePair> for Error {
    fn from(d: DegeneratePair) -> Self {
        Error::DegenerateGeometry {
            i: d.i,
            j: d.j,
            phase: d.phase,
        }
    }
}

/// Out-of-band diagnostics for one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Impulses applied (a pair visited from both sides counts twice).
    pub collisions: usize,
    /// Skipped coincident pairs, in the order they were met.
    pub degenerate: Vec<DegeneratePair>,
}

impl StepReport {
    pub fn is_clean(&self) -> bool {
        self.degenerate.is_empty()
    }

    /// Strict mode: fail with the first degenerate pair, if any.
    pub fn check(&self) -> Result<()> {
        match self.degenerate.first() {
            Some(&d) => Err(d.into()),
            None => Ok(()),
        }
    }

    fn skip(&mut self, i: usize, j: usize, phase: Phase) {
        self.degenerate.push(DegeneratePair { i, j, phase });
    }
}

/// Outcome of testing one pair for contact.
enum Contact {
    /// Not overlapping, or overlapping but already separating.
    None,
    /// Overlapping with coincident centers.
    Degenerate,
    /// Impulse vector `j * n` along the unit normal from `p` to `q`.
    Impulse([f64; DIM]),
}

/// Advances a [`ParticleState`] by one unit time step.
///
/// Per particle `i`, in ascending index order:
/// 1. gravity from every `j != i`, clamping the velocity after each partner;
/// 2. Euler position update (`dt = 1`);
/// 3. wall reflection (velocity flip only, positions are not pushed back);
/// 4. collision impulses against every `j != i` (reference scheme only).
///
/// With [`CollisionScheme::Pairwise`] step 4 is replaced by one pass over the unordered
/// overlapping pairs after all particles have moved.
///
/// The stepper keeps no state between calls; the unique borrow of the population is
/// what keeps readers from seeing a half-applied step.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhysicsStepper;

impl PhysicsStepper {
    pub fn new() -> Self {
        Self
    }

    /// Run one step. Never fails; coincident pairs are skipped and listed in the report.
    pub fn step(&self, state: &mut ParticleState) -> StepReport {
        let cfg = *state.config();
        let particles = state.particles_mut();
        let mut report = StepReport::default();

        for i in 0..particles.len() {
            accumulate_gravity(particles, i, &cfg, &mut report);
            integrate(&mut particles[i]);
            reflect_walls(&mut particles[i], &cfg);
            if cfg.collisions == CollisionScheme::Reference {
                resolve_from(particles, i, &cfg, &mut report);
            }
        }
        if cfg.collisions == CollisionScheme::Pairwise {
            resolve_pairwise(particles, &cfg, &mut report);
        }

        for d in &report.degenerate {
            log::warn!("{}; contribution skipped", Error::from(*d));
        }
        log::debug!(
            "step done: {} impulses, {} degenerate pairs",
            report.collisions,
            report.degenerate.len()
        );
        report
    }
}

/// Phase 1: pull particle `i` toward every other particle, clamping after each partner.
fn accumulate_gravity(
    particles: &mut [Particle],
    i: usize,
    cfg: &SimulationConfig,
    report: &mut StepReport,
) {
    for j in 0..particles.len() {
        if j == i {
            continue;
        }
        let q = particles[j];
        let p = &mut particles[i];
        let dx = q.r[0] - p.r[0];
        let dy = q.r[1] - p.r[1];
        let r = (dx * dx + dy * dy).sqrt();
        if r <= EPS_DISTANCE {
            report.skip(i, j, Phase::Gravity);
        } else {
            let force = cfg.g * (p.mass * q.mass) / (r * r);
            p.v[0] += force * dx / r / p.mass;
            p.v[1] += force * dy / r / p.mass;
        }
        clamp_velocity(&mut p.v, cfg.speed_limit, cfg.clamp);
    }
}

/// Apply the speed limit to one velocity.
pub fn clamp_velocity(v: &mut [f64; DIM], limit: f64, mode: ClampMode) {
    match mode {
        ClampMode::OneSided => {
            for c in v.iter_mut() {
                if *c > limit {
                    *c = limit;
                }
            }
        }
        ClampMode::Symmetric => {
            let speed = v[0].hypot(v[1]);
            if speed > limit {
                let scale = if limit > 0.0 { limit / speed } else { 0.0 };
                v.iter_mut().for_each(|c| *c *= scale);
            }
        }
    }
}

/// Phase 2: unit-time Euler drift.
#[inline]
fn integrate(p: &mut Particle) {
    p.r[0] += p.v[0];
    p.r[1] += p.v[1];
}

/// Phase 3: flip the velocity component normal to any wall the particle touches.
pub fn reflect_walls(p: &mut Particle, cfg: &SimulationConfig) {
    let extent = [cfg.width, cfg.height];
    for k in 0..DIM {
        if p.r[k] >= extent[k] - cfg.radius || p.r[k] <= cfg.radius {
            p.v[k] = -p.v[k];
        }
    }
}

/// Phase 4, reference scheme: resolve `i` against every other particle, mutating the
/// partner immediately.
fn resolve_from(
    particles: &mut [Particle],
    i: usize,
    cfg: &SimulationConfig,
    report: &mut StepReport,
) {
    for j in 0..particles.len() {
        if j == i {
            continue;
        }
        let (p, q) = (particles[i], particles[j]);
        match contact(&p, &q, p.v, q.v, cfg.contact_distance()) {
            Contact::None => {}
            Contact::Degenerate => report.skip(i, j, Phase::Collision),
            Contact::Impulse(jn) => {
                apply_impulse(particles, i, j, jn);
                report.collisions += 1;
            }
        }
    }
}

/// Phase 4, pairwise scheme: every overlapping unordered pair once, impulses computed
/// from velocities frozen after gravity, drift and wall reflection have run for every
/// particle (not the velocities the step started with).
fn resolve_pairwise(particles: &mut [Particle], cfg: &SimulationConfig, report: &mut StepReport) {
    let frozen: Vec<[f64; DIM]> = particles.iter().map(|p| p.v).collect();
    let n = particles.len();
    let mut impulses = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            match contact(
                &particles[i],
                &particles[j],
                frozen[i],
                frozen[j],
                cfg.contact_distance(),
            ) {
                Contact::None => {}
                Contact::Degenerate => report.skip(i, j, Phase::Collision),
                Contact::Impulse(jn) => impulses.push((i, j, jn)),
            }
        }
    }
    report.collisions += impulses.len();
    for (i, j, jn) in impulses {
        apply_impulse(particles, i, j, jn);
    }
}

/// Elastic (restitution 1) impulse for `p` and `q` if they overlap and approach.
fn contact(
    p: &Particle,
    q: &Particle,
    pv: [f64; DIM],
    qv: [f64; DIM],
    contact_distance: f64,
) -> Contact {
    let dx = q.r[0] - p.r[0];
    let dy = q.r[1] - p.r[1];
    let distance = (dx * dx + dy * dy).sqrt();
    if distance >= contact_distance {
        return Contact::None;
    }
    if distance <= EPS_DISTANCE {
        return Contact::Degenerate;
    }
    let ux = dx / distance;
    let uy = dy / distance;
    let vrel_u = (qv[0] - pv[0]) * ux + (qv[1] - pv[1]) * uy;
    if vrel_u >= 0.0 {
        return Contact::None;
    }
    let j = -2.0 * vrel_u / (1.0 / p.mass + 1.0 / q.mass);
    Contact::Impulse([j * ux, j * uy])
}

/// Push `i` back along the normal and `j` forward; total momentum is unchanged.
fn apply_impulse(particles: &mut [Particle], i: usize, j: usize, jn: [f64; DIM]) {
    let (mi, mj) = (particles[i].mass, particles[j].mass);
    for (k, &c) in jn.iter().enumerate() {
        particles[i].v[k] -= c / mi;
        particles[j].v[k] += c / mj;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Result<SimulationConfig> {
        SimulationConfig::new(100.0, 100.0, 3.0, 0.0, 7.0)
    }

    #[test]
    fn one_sided_clamp_caps_positive_only() {
        let mut v = [20.0, -20.0];
        clamp_velocity(&mut v, 7.0, ClampMode::OneSided);
        assert_eq!(v, [7.0, -20.0]);
    }

    #[test]
    fn symmetric_clamp_rescales_magnitude() {
        let mut v = [-30.0, 40.0];
        clamp_velocity(&mut v, 5.0, ClampMode::Symmetric);
        assert!((v[0] + 3.0).abs() < 1e-12);
        assert!((v[1] - 4.0).abs() < 1e-12);

        let mut slow = [1.0, -1.0];
        clamp_velocity(&mut slow, 5.0, ClampMode::Symmetric);
        assert_eq!(slow, [1.0, -1.0]);

        let mut frozen = [2.0, 2.0];
        clamp_velocity(&mut frozen, 0.0, ClampMode::Symmetric);
        assert_eq!(frozen, [0.0, 0.0]);
    }

    #[test]
    fn reflection_flips_only_touching_axis() -> Result<()> {
        let c = cfg()?;
        let mut p = Particle::new(1.0, [2.0, 50.0], [-1.0, 1.0])?;
        reflect_walls(&mut p, &c);
        assert_eq!(p.v, [1.0, 1.0]);

        let mut corner = Particle::new(1.0, [97.0, 97.0], [1.0, 1.0])?;
        reflect_walls(&mut corner, &c);
        assert_eq!(corner.v, [-1.0, -1.0]);
        // Position is left where it is.
        assert_eq!(corner.r, [97.0, 97.0]);
        Ok(())
    }

    #[test]
    fn contact_ignores_separating_pairs() -> Result<()> {
        let p = Particle::new(1.0, [10.0, 10.0], [-1.0, 0.0])?;
        let q = Particle::new(1.0, [14.0, 10.0], [1.0, 0.0])?;
        assert!(matches!(contact(&p, &q, p.v, q.v, 6.0), Contact::None));
        Ok(())
    }

    #[test]
    fn contact_at_exact_distance_is_not_overlap() -> Result<()> {
        let p = Particle::new(1.0, [10.0, 10.0], [1.0, 0.0])?;
        let q = Particle::new(1.0, [16.0, 10.0], [-1.0, 0.0])?;
        assert!(matches!(contact(&p, &q, p.v, q.v, 6.0), Contact::None));
        Ok(())
    }

    #[test]
    fn unequal_mass_impulse() -> Result<()> {
        // m1 = 1, m2 = 3, head-on along x: vrel_u = -2, j = 4 / (4/3) = 3
        let p = Particle::new(1.0, [10.0, 10.0], [1.0, 0.0])?;
        let q = Particle::new(3.0, [14.0, 10.0], [-1.0, 0.0])?;
        match contact(&p, &q, p.v, q.v, 6.0) {
            Contact::Impulse(jn) => {
                assert!((jn[0] - 3.0).abs() < 1e-12);
                assert_eq!(jn[1], 0.0);
            }
            _ => panic!("expected an impulse"),
        }
        Ok(())
    }

    #[test]
    fn check_reports_first_degenerate_pair() {
        let mut report = StepReport::default();
        assert!(report.check().is_ok());
        report.skip(2, 5, Phase::Gravity);
        match report.check() {
            Err(Error::DegenerateGeometry { i, j, phase }) => {
                assert_eq!((i, j, phase), (2, 5, Phase::Gravity));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
