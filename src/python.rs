use numpy::ndarray::{Array2, ArrayView2};
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::EngineConfig;
use crate::core::{Body, Boundary, CollisionScheduler, Damping, Participant, Scatter};

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn rows(arr: ArrayView2<'_, f64>, what: &str) -> PyResult<Vec<[f64; 2]>> {
    if arr.shape()[1] != 2 {
        return Err(py_err(format!(
            "{what} must have shape (N, 2), got {:?}",
            arr.shape()
        )));
    }
    Ok(arr.rows().into_iter().map(|r| [r[0], r[1]]).collect())
}

fn to_array(points: impl ExactSizeIterator<Item = [f64; 2]>) -> Array2<f64> {
    let mut arr = Array2::<f64>::zeros((points.len(), 2));
    for (i, p) in points.enumerate() {
        arr[[i, 0]] = p[0];
        arr[[i, 1]] = p[1];
    }
    arr
}

fn participant_index(p: Participant) -> Option<usize> {
    p.body().map(|id| id.index())
}

/// Python-facing wrapper around the collision scheduler with a damping response.
///
/// API:
/// - __new__(positions, velocities, bounds=None, damping=-0.5, tolerance=1e-9)
/// - random(count=20, seed=None, bounds=None, damping=-0.5)
/// - advance_to(time)
/// - step() -> (time, i | None, j | None) or None
/// - get_positions() / get_velocities() -> np.ndarray, shape (N, 2)
/// - get_revisions() -> np.ndarray, shape (N,)
#[pyclass]
pub struct NBodySim {
    sched: CollisionScheduler<Damping>,
}

fn build(
    bodies: Vec<Body>,
    bounds: Option<(f64, f64, f64, f64)>,
    damping: f64,
    tolerance: f64,
) -> PyResult<NBodySim> {
    if !damping.is_finite() {
        return Err(py_err("damping must be finite"));
    }
    let mut config = EngineConfig {
        tolerance,
        ..EngineConfig::default()
    };
    if let Some((min_x, max_x, min_y, max_y)) = bounds {
        config.boundary = Boundary::new(min_x, max_x, min_y, max_y).map_err(py_err)?;
    }
    let sched = CollisionScheduler::new(bodies, config, Damping { factor: damping })
        .map_err(py_err)?;
    Ok(NBodySim { sched })
}

#[pymethods]
impl NBodySim {
    /// Build from explicit (N, 2) position and velocity arrays.
    ///
    /// bounds: optional (min_x, max_x, min_y, max_y); defaults to ±256.
    /// Errors: raises ValueError on invalid parameters.
    #[new]
    #[pyo3(signature = (positions, velocities, bounds=None, damping=-0.5, tolerance=1e-9))]
    fn new(
        positions: PyReadonlyArray2<'_, f64>,
        velocities: PyReadonlyArray2<'_, f64>,
        bounds: Option<(f64, f64, f64, f64)>,
        damping: f64,
        tolerance: f64,
    ) -> PyResult<Self> {
        let ps = rows(positions.as_array(), "positions")?;
        let vs = rows(velocities.as_array(), "velocities")?;
        if ps.len() != vs.len() {
            return Err(py_err("positions and velocities must have the same length"));
        }
        let bodies = ps
            .into_iter()
            .zip(vs)
            .map(|(p, v)| Body::new(p, v))
            .collect::<crate::error::Result<Vec<_>>>()
            .map_err(py_err)?;
        build(bodies, bounds, damping, tolerance)
    }

    /// Scatter `count` bodies on the integer lattice in [-50, 50] with velocities in [-5, 5].
    #[staticmethod]
    #[pyo3(signature = (count=20, seed=None, bounds=None, damping=-0.5))]
    fn random(
        count: usize,
        seed: Option<u64>,
        bounds: Option<(f64, f64, f64, f64)>,
        damping: f64,
    ) -> PyResult<Self> {
        let scatter = Scatter {
            count,
            seed,
            ..Scatter::default()
        };
        let bodies = scatter.generate().map_err(py_err)?;
        build(bodies, bounds, damping, crate::core::predictor::DEFAULT_EPS)
    }

    /// Advance to the given absolute time (releases the GIL during computation).
    fn advance_to(&mut self, py: Python<'_>, target_time: f64) -> PyResult<()> {
        py.detach(|| self.sched.advance(target_time))
            .map_err(py_err)
    }

    /// Resolve the next collision; returns (time, i, j) with None for the boundary side.
    fn step(&mut self) -> PyResult<Option<(f64, Option<usize>, Option<usize>)>> {
        let ev = self.sched.step().map_err(py_err)?;
        Ok(ev.map(|e| (e.time_f64(), participant_index(e.a), participant_index(e.b))))
    }

    fn time(&self) -> f64 {
        self.sched.time()
    }

    fn is_empty(&self) -> bool {
        self.sched.is_empty()
    }

    fn events_processed(&self) -> u64 {
        self.sched.events_processed()
    }

    /// Positions as a NumPy array of shape (N, 2), dtype=float64.
    fn get_positions<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        to_array(self.sched.positions().into_iter()).into_pyarray(py)
    }

    /// Velocities as a NumPy array of shape (N, 2), dtype=float64.
    fn get_velocities<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        to_array(self.sched.bodies().iter().map(|b| b.velocity)).into_pyarray(py)
    }

    /// Per-body collision counts.
    fn get_revisions<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<u64>> {
        self.sched
            .bodies()
            .iter()
            .map(Body::revision)
            .collect::<Vec<_>>()
            .into_pyarray(py)
    }
}

/// The nbody_events Python module entry point.
#[pymodule]
fn nbody_events(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<NBodySim>()?;
    Ok(())
}
