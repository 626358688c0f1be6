use numpy::ndarray::{Array1, Array2};
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::{speed_limit_from_temperature, ClampMode, CollisionScheme, SimulationConfig};
use crate::core::particle::DIM;
use crate::core::{ParticleState, Simulation};

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Copy an (N, 2) array into fixed-size rows after checking its shape.
fn rows_from(arr: &PyReadonlyArray2<'_, f64>, n: usize, what: &str) -> PyResult<Vec<[f64; DIM]>> {
    let arr = arr.as_array();
    if arr.shape() != [n, DIM] {
        return Err(py_err(format!(
            "{} must have shape ({}, {}), got {:?}",
            what,
            n,
            DIM,
            arr.shape()
        )));
    }
    Ok(arr.rows().into_iter().map(|row| [row[0], row[1]]).collect())
}

/// ParticleSim: Python-facing wrapper around the Rust `Simulation`.
///
/// A presentation loop (pygame, matplotlib, ...) calls `step()` once per frame and then
/// reads `get_positions()` / `get_speed_fractions()` to draw.
#[pyclass]
pub struct ParticleSim {
    sim: Simulation,
}

#[pymethods]
impl ParticleSim {
    /// Seed a random population in a width x height arena.
    ///
    /// Parameters
    /// - num_particles: population size (int, > 0)
    /// - width, height: arena size (floats, > 0)
    /// - radius: particle radius (float, > 0)
    /// - mass: particle mass (float, > 0)
    /// - g: gravitational constant
    /// - temperature: speed limit is temperature * 7 / 273
    /// - velocity_range: initial velocity components are integers in [-range, range]
    /// - seed: RNG seed for reproducibility; None for nondeterministic
    /// - clamp: "one_sided" or "symmetric"
    /// - collisions: "reference" or "pairwise"
    ///
    /// Errors: raises ValueError on invalid parameters.
    #[new]
    #[pyo3(signature = (
        num_particles,
        width=800.0,
        height=800.0,
        radius=3.0,
        mass=1.0,
        g=10.0,
        temperature=273.0,
        velocity_range=5,
        seed=None,
        clamp="one_sided",
        collisions="reference"
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        num_particles: usize,
        width: f64,
        height: f64,
        radius: f64,
        mass: f64,
        g: f64,
        temperature: f64,
        velocity_range: i64,
        seed: Option<u64>,
        clamp: &str,
        collisions: &str,
    ) -> PyResult<Self> {
        let clamp: ClampMode = clamp.parse().map_err(py_err)?;
        let collisions: CollisionScheme = collisions.parse().map_err(py_err)?;
        let config = SimulationConfig::new(
            width,
            height,
            radius,
            g,
            speed_limit_from_temperature(temperature),
        )
        .map_err(py_err)?
        .with_clamp(clamp)
        .with_collisions(collisions);
        let state = ParticleState::initialize(config, num_particles, mass, velocity_range, seed)
            .map_err(py_err)?;
        Ok(Self {
            sim: Simulation::from_state(state),
        })
    }

    /// Advance `n` steps (releases the GIL during computation).
    /// Returns the number of degenerate pairs skipped in those steps.
    #[pyo3(signature = (n=1))]
    fn step(&mut self, py: Python<'_>, n: u64) -> u64 {
        py.detach(|| self.sim.advance(n).degenerate_pairs)
    }

    /// Return positions as a NumPy array of shape (N, 2), dtype=float64.
    fn get_positions(&self, py: Python<'_>) -> Py<PyArray2<f64>> {
        let n = self.sim.num_particles();
        let mut arr = Array2::<f64>::zeros((n, DIM));
        for (i, p) in self.sim.state().all().iter().enumerate() {
            for k in 0..DIM {
                arr[[i, k]] = p.r[k];
            }
        }
        arr.into_pyarray(py).into()
    }

    /// Return velocities as a NumPy array of shape (N, 2), dtype=float64.
    fn get_velocities(&self, py: Python<'_>) -> Py<PyArray2<f64>> {
        let n = self.sim.num_particles();
        let mut arr = Array2::<f64>::zeros((n, DIM));
        for (i, p) in self.sim.state().all().iter().enumerate() {
            for k in 0..DIM {
                arr[[i, k]] = p.v[k];
            }
        }
        arr.into_pyarray(py).into()
    }

    /// Return masses as a NumPy array of shape (N,).
    fn get_masses(&self, py: Python<'_>) -> Py<PyArray1<f64>> {
        let masses: Array1<f64> = self.sim.state().all().iter().map(|p| p.mass).collect();
        masses.into_pyarray(py).into()
    }

    /// Return |v| / speed_limit per particle, saturated to [0, 1], for color mapping.
    fn get_speed_fractions(&self, py: Python<'_>) -> Py<PyArray1<f64>> {
        let limit = self.sim.config().speed_limit;
        let fractions: Array1<f64> = self
            .sim
            .state()
            .all()
            .iter()
            .map(|p| p.speed_fraction(limit))
            .collect();
        fractions.into_pyarray(py).into()
    }

    /// Set all particle positions from a NumPy array of shape (N, 2). Values must be finite.
    fn set_positions(&mut self, positions: PyReadonlyArray2<'_, f64>) -> PyResult<()> {
        let rows = rows_from(&positions, self.sim.num_particles(), "positions")?;
        self.sim.state_mut().set_positions(&rows).map_err(py_err)
    }

    /// Set all particle velocities from a NumPy array of shape (N, 2). Values must be finite.
    fn set_velocities(&mut self, velocities: PyReadonlyArray2<'_, f64>) -> PyResult<()> {
        let rows = rows_from(&velocities, self.sim.num_particles(), "velocities")?;
        self.sim.state_mut().set_velocities(&rows).map_err(py_err)
    }

    /// Total kinetic energy.
    fn kinetic_energy(&self) -> f64 {
        self.sim.kinetic_energy()
    }

    /// Total momentum as (px, py).
    fn momentum(&self) -> (f64, f64) {
        let m = self.sim.momentum();
        (m[0], m[1])
    }

    /// Cumulative number of skipped coincident pairs.
    fn degenerate_count(&self) -> u64 {
        self.sim.diagnostics().degenerate_pairs
    }

    /// Number of completed steps.
    fn tick(&self) -> u64 {
        self.sim.tick()
    }

    fn __len__(&self) -> usize {
        self.sim.num_particles()
    }
}

/// The particlesim Python module entry point.
#[pymodule]
fn particlesim(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ParticleSim>()?;
    Ok(())
}
