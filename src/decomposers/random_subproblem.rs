//! Decomposition around a uniformly random set of variables.

use std::sync::Arc;

use smolprng::{Algorithm, JsfLarge, PRNG};

use crate::decomposers::{Decomposer, Subproblem};
use crate::error::DecomposeError;
use crate::quadratic_model::QuadraticModel;
use crate::sample::Sample;
use crate::subgraph_selection::select_random_subgraph;

/// Selects `size` variables uniformly at random on every call. The subproblem is possibly not
/// connected, and the sampled values play no part in the choice.
pub struct RandomSubproblemDecomposer<T: Algorithm> {
    model: Arc<QuadraticModel>,
    size: usize,
    prng: PRNG<T>,
}

impl<T: Algorithm> RandomSubproblemDecomposer<T> {
    /// # Errors
    ///
    /// Returns [`DecomposeError::InvalidConfiguration`] if `size` exceeds the number of variables.
    pub fn new(model: Arc<QuadraticModel>, size: usize, prng: PRNG<T>) -> Result<Self, DecomposeError> {
        if size > model.num_variables() {
            return Err(DecomposeError::InvalidConfiguration(format!(
                "subproblem size {size} is greater than the problem size {}",
                model.num_variables()
            )));
        }

        Ok(Self { model, size, prng })
    }
}

impl RandomSubproblemDecomposer<JsfLarge> {
    /// Uses a `JsfLarge` generator seeded with `seed`.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn from_seed(model: Arc<QuadraticModel>, size: usize, seed: u64) -> Result<Self, DecomposeError> {
        let prng = PRNG {
            generator: JsfLarge::from(seed),
        };
        Self::new(model, size, prng)
    }
}

impl<T: Algorithm + Send> Decomposer for RandomSubproblemDecomposer<T> {
    fn name(&self) -> &str {
        "RandomSubproblemDecomposer"
    }

    fn select(&mut self, sample: &Sample) -> Result<Subproblem, DecomposeError> {
        let mut variables = select_random_subgraph(&self.model, self.size, &mut self.prng);
        variables.sort_unstable();

        tracing::debug!("selected {} random variables", variables.len());

        let model = self.model.induced_by(&variables, sample)?;
        Ok(Subproblem::new(model))
    }
}
