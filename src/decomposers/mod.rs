//! The decomposition strategies and the trait that lets an orchestrator drive any of them.
//!
//! Every strategy keeps a shared handle to the full model and, on each call, turns the current
//! sample into a [`Subproblem`]: the model induced by the selected variables with everything else
//! fixed at its sampled value.

pub mod energy_impact;
pub mod identity;
pub mod random_subproblem;
pub mod tiling_chimera;

pub use energy_impact::EnergyImpactDecomposer;
pub use identity::IdentityDecomposer;
pub use random_subproblem::RandomSubproblemDecomposer;
pub use tiling_chimera::TilingChimeraDecomposer;

use crate::chimera::Embedding;
use crate::error::{DecomposeError, ModelError};
use crate::quadratic_model::QuadraticModel;
use crate::sample::Sample;
use crate::state::State;

/// The output of a single decomposition step.
#[derive(Debug, Clone, PartialEq)]
pub struct Subproblem {
    pub model: QuadraticModel,
    /// Tile-local lattice positions of the subproblem variables, set by tiling strategies.
    pub embedding: Option<Embedding>,
}

impl Subproblem {
    pub fn new(model: QuadraticModel) -> Self {
        Self {
            model,
            embedding: None,
        }
    }

    pub fn with_embedding(model: QuadraticModel, embedding: Embedding) -> Self {
        Self {
            model,
            embedding: Some(embedding),
        }
    }
}

/// A strategy that carves a subproblem out of the full model around a sample.
///
/// `select` takes `&mut self`: strategies may update internal state on every call, so concurrent
/// use of one instance needs external locking.
pub trait Decomposer: Send {
    /// Name recorded in the state's debug information.
    fn name(&self) -> &str;

    /// Selects variables around `sample` and returns the induced subproblem.
    ///
    /// # Errors
    ///
    /// Strategy specific, see the implementors. A sample that does not cover the model is a
    /// [`DecomposeError::Model`] error.
    fn select(&mut self, sample: &Sample) -> Result<Subproblem, DecomposeError>;

    /// Decomposes around the lowest energy sample of `state` and returns the state carrying the
    /// subproblem.
    ///
    /// # Errors
    ///
    /// Fails when the state has no samples, or when [`Decomposer::select`] fails.
    fn run(&mut self, state: &State) -> Result<State, DecomposeError> {
        let sample = state.samples.first().ok_or(ModelError::EmptySampleSet)?;
        let subproblem = self.select(sample)?;
        Ok(state.updated(subproblem, self.name()))
    }
}
