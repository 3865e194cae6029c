//! Assignments of values to variables, and sets of them ordered by energy.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::error::{Label, ModelError};
use crate::quadratic_model::QuadraticModel;
use crate::vartype::Vartype;

/// A value for every variable, in one of the two value encodings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    values: HashMap<Label, i8>,
    vartype: Vartype,
}

impl Sample {
    /// Builds a sample, checking every value against `vartype`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidValue`] for a value outside the domain of `vartype`.
    pub fn new<I>(values: I, vartype: Vartype) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (Label, i8)>,
    {
        let values = values
            .into_iter()
            .map(|(v, value)| vartype.check(v, value).map(|value| (v, value)))
            .collect::<Result<HashMap<Label, i8>, ModelError>>()?;

        Ok(Self { values, vartype })
    }

    /// Every variable of `model` at the same `value`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidValue`] when `value` is not in the domain of `vartype`.
    pub fn uniform(model: &QuadraticModel, value: i8, vartype: Vartype) -> Result<Self, ModelError> {
        Self::new(model.variables().iter().map(|&v| (v, value)), vartype)
    }

    pub fn get(&self, v: Label) -> Option<i8> {
        self.values.get(&v).copied()
    }

    pub const fn vartype(&self) -> Vartype {
        self.vartype
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Label, i8)> + '_ {
        self.values.iter().map(|(&v, &value)| (v, value))
    }

    /// The same assignment expressed in `vartype`.
    pub fn change_vartype(&self, vartype: Vartype) -> Self {
        let values = self
            .values
            .iter()
            .map(|(&v, &value)| (v, self.vartype.convert(value, vartype)))
            .collect();

        Self { values, vartype }
    }
}

/// Samples paired with their energies, lowest energy first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleSet {
    records: Vec<(Sample, f64)>,
}

impl SampleSet {
    /// Evaluates every sample against `model` (in parallel) and orders them by energy. Ties keep
    /// their input order.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingValue`] if any sample does not cover the model.
    pub fn from_samples(model: &QuadraticModel, samples: Vec<Sample>) -> Result<Self, ModelError> {
        let energies = samples
            .par_iter()
            .map(|sample| model.energy(sample))
            .collect::<Result<Vec<f64>, ModelError>>()?;

        let mut records: Vec<(Sample, f64)> = samples.into_iter().zip(energies).collect();
        records.sort_by(|(_, a), (_, b)| a.total_cmp(b));

        Ok(Self { records })
    }

    /// The lowest energy sample.
    pub fn first(&self) -> Option<&Sample> {
        self.records.first().map(|(sample, _)| sample)
    }

    pub fn first_energy(&self) -> Option<f64> {
        self.records.first().map(|(_, energy)| *energy)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Sample, f64)> {
        self.records.iter().map(|(sample, energy)| (sample, *energy))
    }
}
