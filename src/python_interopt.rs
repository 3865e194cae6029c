//! Acts as the interface to the decomposers from python. Problems are passed in the same triplet form
//! the QUBO readers produce, samples as dictionaries from variable to value.
use std::collections::HashMap;
use std::sync::Arc;

use pyo3::exceptions::{PyStopIteration, PyValueError};
use pyo3::prelude::*;

use crate::chimera::ChimeraShape;
use crate::decomposer_options::{make_decomposer, DecomposerOptions, DecomposerSelection};
use crate::decomposers::Decomposer;
use crate::error::DecomposeError;
use crate::quadratic_model::QuadraticModel;
use crate::sample::Sample;
use crate::vartype::Vartype;

// type alias for the qubo data object from python
type QuboData = (Vec<usize>, Vec<usize>, Vec<f64>, Vec<f64>, usize);

// (linear, quadratic, offset) of a subproblem
type SubproblemData = (HashMap<usize, f64>, HashMap<(usize, usize), f64>, f64);

// tile-local (row, col, shore, index) to variable
type EmbeddingData = HashMap<(usize, usize, usize, usize), usize>;

fn to_py_err(err: DecomposeError) -> PyErr {
    match err {
        DecomposeError::ExhaustedSource { .. } => PyStopIteration::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn parse_vartype(name: Option<String>) -> PyResult<Vartype> {
    match name {
        None => Ok(Vartype::Binary),
        Some(name) => Vartype::from_name(&name)
            .ok_or_else(|| PyValueError::new_err(format!("unknown vartype {name}"))),
    }
}

/// A decomposer over a fixed QUBO, keeping its selection state between calls.
///
/// Example
/// ``` python
/// import qubo_decompose
///
/// # (rows, cols, values, linear, num_x)
/// problem = ([0, 1], [1, 2], [1.0, -2.0], [0.5, 0.0, -1.0], 3)
///
/// decomposer = qubo_decompose.Decomposer(problem, "EnergyImpact", max_size=2, min_diff=1)
/// (linear, quadratic, offset), _ = decomposer.select({i: 0 for i in range(problem[-1])})
/// ```
#[pyclass(name = "Decomposer", unsendable)]
pub struct PyDecomposer {
    inner: Box<dyn Decomposer>,
}

#[pymethods]
impl PyDecomposer {
    /// # Errors
    ///
    /// Raises `ValueError` for malformed problems, unknown decomposer names and invalid options.
    #[new]
    #[pyo3(signature = (problem, decomposer, max_size=None, min_gain=None, min_diff=None, stride=None, tile=None, lattice=None, looping=None, seed=None))]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        problem: QuboData,
        decomposer: String,
        max_size: Option<usize>,
        min_gain: Option<f64>,
        min_diff: Option<i64>,
        stride: Option<usize>,
        tile: Option<(usize, usize, usize)>,
        lattice: Option<(usize, usize, usize)>,
        looping: Option<bool>,
        seed: Option<usize>,
    ) -> PyResult<Self> {
        let p = QuadraticModel::from_qubo_data(&problem.0, &problem.1, &problem.2, &problem.3, problem.4)
            .map_err(|err| PyValueError::new_err(err.to_string()))?;

        let mut options = DecomposerOptions::new();
        options.decomposer = DecomposerSelection::from_name(&decomposer)
            .ok_or_else(|| PyValueError::new_err(format!("unknown decomposer {decomposer}")))?;
        options.max_size = max_size.unwrap_or(options.max_size);
        options.min_gain = min_gain;
        options.stride = stride.unwrap_or(options.stride);
        options.looping = looping.unwrap_or(options.looping);
        options.seed = seed.unwrap_or(options.seed);

        if let Some(min_diff) = min_diff {
            options.min_diff = usize::try_from(min_diff).map_err(|_| {
                to_py_err(DecomposeError::InvalidConfiguration(format!(
                    "min_diff must be nonnegative, got {min_diff}"
                )))
            })?;
        }
        if let Some((rows, cols, shore)) = tile {
            options.tile = ChimeraShape::new(rows, cols, shore);
        }
        options.lattice = lattice.map(|(rows, cols, shore)| ChimeraShape::new(rows, cols, shore));

        let inner = make_decomposer(Arc::new(p), &options).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    pub fn name(&self) -> String {
        self.inner.name().to_string()
    }

    /// Decomposes around `sample`, returning the subproblem and, for tiling, its embedding.
    ///
    /// # Errors
    ///
    /// Raises `ValueError` for malformed samples and `StopIteration` once a non-looping tiling
    /// decomposer runs out of tiles.
    #[pyo3(signature = (sample, vartype=None))]
    pub fn select(
        &mut self,
        sample: HashMap<usize, i8>,
        vartype: Option<String>,
    ) -> PyResult<(SubproblemData, Option<EmbeddingData>)> {
        let sample = Sample::new(sample, parse_vartype(vartype)?)
            .map_err(|err| PyValueError::new_err(err.to_string()))?;

        let subproblem = self.inner.select(&sample).map_err(to_py_err)?;
        let model = subproblem.model;

        let linear = model
            .variables()
            .iter()
            .filter_map(|&v| model.linear(v).map(|bias| (v, bias)))
            .collect();
        let quadratic = model.interactions().map(|(u, v, bias)| ((u, v), bias)).collect();

        let embedding = subproblem.embedding.map(|embedding| {
            embedding
                .into_iter()
                .map(|(c, v)| ((c.row, c.col, c.shore, c.index), v))
                .collect()
        });

        Ok(((linear, quadratic, model.offset()), embedding))
    }
}

#[pymodule]
fn qubo_decompose(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyDecomposer>()?;
    Ok(())
}
