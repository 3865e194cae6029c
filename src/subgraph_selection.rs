//! Variable selection primitives shared by the decomposers.
//!
//! - Variables ranked by the energy impact of flipping them
//! - Uniformly random variable subsets
//! - Chimera tiles, see [`crate::chimera::chimera_tiles`]

use smolprng::{Algorithm, PRNG};

use crate::error::{Label, ModelError};
use crate::quadratic_model::QuadraticModel;
use crate::sample::Sample;

/// Ranks the variables of `model` by the magnitude of the energy change caused by flipping each of
/// them on its own, with every other variable held at its value in `sample`.
///
/// Largest impact comes first and ties are broken by ascending label, so the ranking is fully
/// determined by its inputs. With `min_gain` set, only variables whose impact exceeds it are kept.
///
/// Example:
/// ``` rust
/// use qubo_decompose::{QuadraticModel, Sample, Vartype};
/// use qubo_decompose::subgraph_selection::select_localsearch_adversaries;
///
/// let model = QuadraticModel::new(
///     vec![(0, 1.0), (1, -3.0), (2, 0.0)],
///     vec![((0, 2), 0.5)],
///     0.0,
///     Vartype::Spin,
/// )
/// .unwrap();
/// let sample = Sample::uniform(&model, 1, Vartype::Spin).unwrap();
///
/// let ranked = select_localsearch_adversaries(&model, &sample, None).unwrap();
/// assert_eq!(ranked, vec![1, 0, 2]);
/// ```
///
/// # Errors
///
/// Returns [`ModelError::MissingValue`] if the sample does not cover the model.
pub fn select_localsearch_adversaries(
    model: &QuadraticModel,
    sample: &Sample,
    min_gain: Option<f64>,
) -> Result<Vec<Label>, ModelError> {
    let x = model.dense_sample(sample)?;
    let gains = model.flip_energy_gains(&x);

    let mut scored: Vec<(f64, Label)> = gains
        .iter()
        .zip(model.variables())
        .map(|(gain, &v)| (gain.abs(), v))
        .filter(|(impact, _)| min_gain.map_or(true, |threshold| *impact > threshold))
        .collect();

    scored.sort_by(|(a, u), (b, v)| b.total_cmp(a).then(u.cmp(v)));

    Ok(scored.into_iter().map(|(_, v)| v).collect())
}

/// Draws `size` distinct variables of `model` uniformly at random, without replacement.
///
/// Asking for more variables than the model has returns all of them, in random order.
pub fn select_random_subgraph<T: Algorithm>(
    model: &QuadraticModel,
    size: usize,
    prng: &mut PRNG<T>,
) -> Vec<Label> {
    let mut variables = model.variables().to_vec();
    let size = size.min(variables.len());

    // partial Fisher-Yates shuffle, the first `size` slots end up as the sample
    for i in 0..size {
        let j = i + prng.gen_u64() as usize % (variables.len() - i);
        variables.swap(i, j);
    }

    variables.truncate(size);
    variables
}
