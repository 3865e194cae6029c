//! The state passed between decomposers and the rest of an optimization loop.

use std::collections::BTreeMap;

use crate::chimera::Embedding;
use crate::decomposers::Subproblem;
use crate::error::ModelError;
use crate::quadratic_model::QuadraticModel;
use crate::sample::{Sample, SampleSet};

/// Current samples plus whatever the last decomposition produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    pub samples: SampleSet,
    pub subproblem: Option<QuadraticModel>,
    pub embedding: Option<Embedding>,
    pub debug: BTreeMap<String, String>,
}

impl State {
    pub fn from_samples(samples: SampleSet) -> Self {
        Self {
            samples,
            ..Self::default()
        }
    }

    /// A state holding a single sample, evaluated against `model`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingValue`] if the sample does not cover the model.
    pub fn from_sample(model: &QuadraticModel, sample: Sample) -> Result<Self, ModelError> {
        Ok(Self::from_samples(SampleSet::from_samples(model, vec![sample])?))
    }

    /// A copy of this state carrying `subproblem`, tagged with the decomposer that produced it.
    ///
    /// The embedding is replaced as well, so a subproblem without one clears any stale embedding.
    pub fn updated(&self, subproblem: Subproblem, decomposer: &str) -> Self {
        let mut debug = self.debug.clone();
        debug.insert("decomposer".to_string(), decomposer.to_string());

        Self {
            samples: self.samples.clone(),
            subproblem: Some(subproblem.model),
            embedding: subproblem.embedding,
            debug,
        }
    }
}
