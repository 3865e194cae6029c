//! Decomposition around the variables with the largest flip impact.

use std::collections::HashSet;
use std::sync::Arc;

use crate::decomposers::{Decomposer, Subproblem};
use crate::error::{DecomposeError, Label};
use crate::quadratic_model::QuadraticModel;
use crate::sample::Sample;
use crate::subgraph_selection::select_localsearch_adversaries;

/// Selects up to `max_size` variables with the largest energy impact, making sure consecutive
/// selections differ by at least `min_diff` variables.
///
/// When the top of the ranking repeats the previous selection the window slides down the ranking
/// by `stride` until the difference is large enough. The selected variables are not necessarily
/// connected in the problem graph.
pub struct EnergyImpactDecomposer {
    model: Arc<QuadraticModel>,
    max_size: usize,
    min_gain: Option<f64>,
    min_diff: usize,
    stride: usize,
    previous: HashSet<Label>,
}

impl EnergyImpactDecomposer {
    /// No gain threshold, `min_diff = 1` and `stride = 1`.
    ///
    /// # Errors
    ///
    /// See [`Self::with_options`].
    pub fn new(model: Arc<QuadraticModel>, max_size: usize) -> Result<Self, DecomposeError> {
        Self::with_options(model, max_size, None, 1, 1)
    }

    /// # Errors
    ///
    /// Returns [`DecomposeError::InvalidConfiguration`] if `max_size` exceeds the number of
    /// variables, `min_diff` exceeds `max_size`, or `stride` is zero.
    pub fn with_options(
        model: Arc<QuadraticModel>,
        max_size: usize,
        min_gain: Option<f64>,
        min_diff: usize,
        stride: usize,
    ) -> Result<Self, DecomposeError> {
        if max_size > model.num_variables() {
            return Err(DecomposeError::InvalidConfiguration(format!(
                "subproblem size {max_size} is greater than the problem size {}",
                model.num_variables()
            )));
        }
        if min_diff > max_size {
            return Err(DecomposeError::InvalidConfiguration(format!(
                "min_diff {min_diff} must not exceed max_size {max_size}"
            )));
        }
        if stride == 0 {
            return Err(DecomposeError::InvalidConfiguration(
                "stride must be positive".to_string(),
            ));
        }

        Ok(Self {
            model,
            max_size,
            min_gain,
            min_diff,
            stride,
            previous: HashSet::new(),
        })
    }

    fn window(&self, ranked: &[Label], offset: usize) -> HashSet<Label> {
        ranked.iter().skip(offset).take(self.max_size).copied().collect()
    }

    /// Slides a window down `ranked` until it differs enough from the previous selection.
    ///
    /// If the ranking runs out first, the window that differed most (the earliest one on ties) is
    /// returned.
    fn next_selection(&self, ranked: &[Label]) -> HashSet<Label> {
        let mut offset = 0;
        let mut best = self.window(ranked, offset);
        let mut best_diff = best.symmetric_difference(&self.previous).count();

        while best_diff < self.min_diff {
            offset += self.stride;
            if offset >= ranked.len() {
                tracing::warn!(
                    "ranking of {} variables exhausted, selection differs from the previous one by {best_diff} < {}",
                    ranked.len(),
                    self.min_diff
                );
                break;
            }

            let next = self.window(ranked, offset);
            let diff = next.symmetric_difference(&self.previous).count();
            if diff > best_diff {
                best = next;
                best_diff = diff;
            }
        }

        best
    }
}

impl Decomposer for EnergyImpactDecomposer {
    fn name(&self) -> &str {
        "EnergyImpactDecomposer"
    }

    /// # Errors
    ///
    /// Only fails when the sample does not cover the model.
    fn select(&mut self, sample: &Sample) -> Result<Subproblem, DecomposeError> {
        let ranked = select_localsearch_adversaries(&self.model, sample, self.min_gain)?;
        let selection = self.next_selection(&ranked);

        tracing::debug!(
            "selected {} variables (diff from previous = {})",
            selection.len(),
            selection.symmetric_difference(&self.previous).count()
        );

        let mut variables: Vec<Label> = selection.iter().copied().collect();
        variables.sort_unstable();
        let model = self.model.induced_by(&variables, sample)?;

        self.previous = selection;

        Ok(Subproblem::new(model))
    }
}
