//! The degenerate decomposition: the subproblem is the whole problem.

use std::sync::Arc;

use crate::decomposers::{Decomposer, Subproblem};
use crate::error::DecomposeError;
use crate::quadratic_model::QuadraticModel;
use crate::sample::Sample;

/// Copies the problem to the subproblem.
pub struct IdentityDecomposer {
    model: Arc<QuadraticModel>,
}

impl IdentityDecomposer {
    pub fn new(model: Arc<QuadraticModel>) -> Self {
        Self { model }
    }
}

impl Decomposer for IdentityDecomposer {
    fn name(&self) -> &str {
        "IdentityDecomposer"
    }

    fn select(&mut self, _sample: &Sample) -> Result<Subproblem, DecomposeError> {
        Ok(Subproblem::new(QuadraticModel::clone(&self.model)))
    }
}
