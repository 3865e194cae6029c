//! The quadratic model that every decomposer reads from.
//!
//! Variables carry arbitrary `usize` labels. Internally they are kept sorted and addressed by a
//! dense index, so the couplings can live in a symmetric sparse matrix and the usual operations
//! (energies, local fields, flip gains) are a single sparse mat-vec away.

use std::collections::{BTreeMap, HashMap};

use ndarray::Array1;
use smolprng::{Algorithm, PRNG};
use sprs::{CsMat, TriMat};

use crate::error::{Label, ModelError};
use crate::sample::Sample;
use crate::vartype::Vartype;

/// A quadratic objective `offset + sum_i h_i x_i + sum_{i<j} J_ij x_i x_j` over labelled variables.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticModel {
    variables: Vec<Label>,
    index: HashMap<Label, usize>,
    linear: Array1<f64>,
    // symmetric, both (i, j) and (j, i) hold J_ij, the diagonal is empty
    quadratic: CsMat<f64>,
    offset: f64,
    vartype: Vartype,
}

impl QuadraticModel {
    /// Builds a model from linear biases and pairwise couplings.
    ///
    /// Repeated linear entries and repeated couplings (in either orientation) are summed. Every
    /// coupling must reference two distinct variables that have a linear entry.
    ///
    /// Example:
    /// ``` rust
    /// use qubo_decompose::{QuadraticModel, Vartype};
    ///
    /// let model = QuadraticModel::new(
    ///     vec![(0, 1.0), (1, -1.0), (2, 0.5)],
    ///     vec![((0, 1), 2.0), ((1, 2), -1.0)],
    ///     0.0,
    ///     Vartype::Spin,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(model.num_variables(), 3);
    /// assert_eq!(model.quadratic(1, 0), Some(2.0));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownVariable`] or [`ModelError::SelfInteraction`] when a coupling is
    /// not a valid pair of model variables.
    pub fn new<L, Q>(linear: L, quadratic: Q, offset: f64, vartype: Vartype) -> Result<Self, ModelError>
    where
        L: IntoIterator<Item = (Label, f64)>,
        Q: IntoIterator<Item = ((Label, Label), f64)>,
    {
        let mut linear_map = BTreeMap::new();
        for (v, bias) in linear {
            *linear_map.entry(v).or_insert(0.0) += bias;
        }

        let variables: Vec<Label> = linear_map.keys().copied().collect();
        let index: HashMap<Label, usize> = variables
            .iter()
            .enumerate()
            .map(|(i, &v)| (v, i))
            .collect();

        let num_x = variables.len();
        let mut q = TriMat::<f64>::new((num_x, num_x));
        for ((u, v), bias) in quadratic {
            if u == v {
                return Err(ModelError::SelfInteraction(u));
            }
            let i = *index
                .get(&u)
                .ok_or(ModelError::UnknownVariable { u, v, missing: u })?;
            let j = *index
                .get(&v)
                .ok_or(ModelError::UnknownVariable { u, v, missing: v })?;
            q.add_triplet(i, j, bias);
            q.add_triplet(j, i, bias);
        }

        Ok(Self {
            variables,
            index,
            linear: linear_map.values().copied().collect(),
            quadratic: q.to_csr(),
            offset,
            vartype,
        })
    }

    /// Reads a QUBO given as triplets of `Q` plus the vector `c`, with the objective
    /// `0.5 x^T Q x + c^T x` over `x` in {0, 1}^n. Variables are labelled `0..num_x`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MalformedData`] if the triplet vectors have different lengths, an index
    /// is out of range, or `c` does not have `num_x` entries.
    pub fn from_qubo_data(
        rows: &[usize],
        cols: &[usize],
        values: &[f64],
        c: &[f64],
        num_x: usize,
    ) -> Result<Self, ModelError> {
        if rows.len() != cols.len() || rows.len() != values.len() {
            return Err(ModelError::MalformedData(format!(
                "triplet lengths differ: {} rows, {} cols, {} values",
                rows.len(),
                cols.len(),
                values.len()
            )));
        }
        if c.len() != num_x {
            return Err(ModelError::MalformedData(format!(
                "linear term has {} entries, expected {num_x}",
                c.len()
            )));
        }

        let mut linear: Vec<(Label, f64)> = c.iter().copied().enumerate().collect();
        let mut quadratic = Vec::new();

        for ((&i, &j), &value) in rows.iter().zip(cols).zip(values) {
            if i >= num_x || j >= num_x {
                return Err(ModelError::MalformedData(format!(
                    "entry ({i}, {j}) is outside a {num_x} variable problem"
                )));
            }

            // x_i^2 = x_i, so the diagonal is linear
            if i == j {
                linear[i].1 += 0.5 * value;
            } else {
                quadratic.push(((i, j), 0.5 * value));
            }
        }

        Self::new(linear, quadratic, 0.0, Vartype::Binary)
    }

    /// Generates a random binary model on `num_x` variables, each pair coupled with probability
    /// `density`, with coefficients uniform in [-0.5, 0.5).
    pub fn make_random<T: Algorithm>(num_x: usize, prng: &mut PRNG<T>, density: f64) -> Self {
        let mut quadratic = Vec::new();
        for i in 0..num_x {
            for j in (i + 1)..num_x {
                if prng.gen_f64() < density {
                    quadratic.push(((i, j), prng.gen_f64() - 0.5f64));
                }
            }
        }

        let linear: Vec<(Label, f64)> = (0..num_x).map(|i| (i, prng.gen_f64() - 0.5f64)).collect();

        Self::from_parts(linear, quadratic, 0.0, Vartype::Binary)
    }

    // infallible path for couplings that are valid by construction
    pub(crate) fn from_parts(
        linear: Vec<(Label, f64)>,
        quadratic: Vec<((Label, Label), f64)>,
        offset: f64,
        vartype: Vartype,
    ) -> Self {
        let variables: Vec<Label> = linear.iter().map(|(v, _)| *v).collect();
        let index: HashMap<Label, usize> = variables
            .iter()
            .enumerate()
            .map(|(i, &v)| (v, i))
            .collect();

        let num_x = variables.len();
        let mut q = TriMat::<f64>::new((num_x, num_x));
        for ((u, v), bias) in quadratic {
            let (i, j) = (index[&u], index[&v]);
            q.add_triplet(i, j, bias);
            q.add_triplet(j, i, bias);
        }

        Self {
            variables,
            index,
            linear: linear.iter().map(|(_, bias)| *bias).collect(),
            quadratic: q.to_csr(),
            offset,
            vartype,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of distinct coupled pairs.
    pub fn num_interactions(&self) -> usize {
        self.quadratic.iter().filter(|(_, (i, j))| i < j).count()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// The variable labels in ascending order.
    pub fn variables(&self) -> &[Label] {
        &self.variables
    }

    pub fn contains(&self, v: Label) -> bool {
        self.index.contains_key(&v)
    }

    pub fn index_of(&self, v: Label) -> Option<usize> {
        self.index.get(&v).copied()
    }

    pub const fn vartype(&self) -> Vartype {
        self.vartype
    }

    pub const fn offset(&self) -> f64 {
        self.offset
    }

    pub fn linear(&self, v: Label) -> Option<f64> {
        self.index_of(v).map(|i| self.linear[i])
    }

    /// The coupling between `u` and `v`, `None` if the pair is not coupled.
    pub fn quadratic(&self, u: Label, v: Label) -> Option<f64> {
        let i = self.index_of(u)?;
        let j = self.index_of(v)?;
        self.quadratic.get(i, j).copied()
    }

    /// The coupled neighbours of `v` with their coupling strengths.
    pub fn neighbors(&self, v: Label) -> Vec<(Label, f64)> {
        self.index_of(v)
            .and_then(|i| self.quadratic.outer_view(i))
            .map(|row| {
                row.iter()
                    .map(|(j, &bias)| (self.variables[j], bias))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every coupled pair `(u, v, J_uv)` once, with `u < v`.
    pub fn interactions(&self) -> impl Iterator<Item = (Label, Label, f64)> + '_ {
        self.quadratic
            .iter()
            .filter(|(_, (i, j))| i < j)
            .map(|(&bias, (i, j))| (self.variables[i], self.variables[j], bias))
    }

    /// Gathers `sample` into a dense vector aligned with [`Self::variables`], converted to the
    /// model's vartype.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingValue`] if a model variable has no value in the sample.
    pub fn dense_sample(&self, sample: &Sample) -> Result<Array1<f64>, ModelError> {
        let mut x = Array1::<f64>::zeros(self.num_variables());
        for (i, &v) in self.variables.iter().enumerate() {
            let value = sample.get(v).ok_or(ModelError::MissingValue(v))?;
            x[i] = f64::from(sample.vartype().convert(value, self.vartype));
        }
        Ok(x)
    }

    /// Energy of a dense point aligned with [`Self::variables`].
    pub fn eval(&self, x: &Array1<f64>) -> f64 {
        let temp = &self.quadratic * x;
        self.offset + 0.5 * x.dot(&temp) + self.linear.dot(x)
    }

    /// Energy of a sample.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingValue`] if a model variable has no value in the sample.
    pub fn energy(&self, sample: &Sample) -> Result<f64, ModelError> {
        let x = self.dense_sample(sample)?;
        Ok(self.eval(&x))
    }

    /// The local field `h_i + sum_j J_ij x_j` seen by every variable.
    pub fn local_fields(&self, x: &Array1<f64>) -> Array1<f64> {
        &self.linear + &(&self.quadratic * x)
    }

    /// Energy change from flipping each variable on its own, all others held at `x`.
    ///
    /// Run time is O(|J|) + O(n).
    pub fn flip_energy_gains(&self, x: &Array1<f64>) -> Array1<f64> {
        let fields = self.local_fields(x);
        let mut gains = Array1::<f64>::zeros(self.num_variables());
        for i in 0..self.num_variables() {
            gains[i] = self.vartype.flip_delta(x[i]) * fields[i];
        }
        gains
    }

    /// Builds the model restricted to `variables`, every other variable fixed at its value in
    /// `sample`.
    ///
    /// Couplings to fixed variables become linear terms and everything that only involves fixed
    /// variables moves into the offset, so the energy of the subproblem at any sub-assignment
    /// equals the energy of the full model at the merged assignment.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotInModel`] for a label outside the model and
    /// [`ModelError::MissingValue`] if the sample does not cover the model.
    pub fn induced_by(&self, variables: &[Label], sample: &Sample) -> Result<Self, ModelError> {
        let x = self.dense_sample(sample)?;

        let mut selected = vec![false; self.num_variables()];
        for &v in variables {
            let i = self.index_of(v).ok_or(ModelError::NotInModel(v))?;
            selected[i] = true;
        }

        // sub-model index of every selected variable, in label order
        let mut sub_index = vec![usize::MAX; self.num_variables()];
        let mut linear = Vec::new();
        let mut offset = self.offset;

        for i in 0..self.num_variables() {
            if selected[i] {
                sub_index[i] = linear.len();
                linear.push((self.variables[i], self.linear[i]));
            } else {
                offset += self.linear[i] * x[i];
            }
        }

        let mut quadratic = Vec::new();
        for (&bias, (i, j)) in self.quadratic.iter() {
            match (selected[i], selected[j]) {
                (true, true) if i < j => {
                    quadratic.push(((self.variables[i], self.variables[j]), bias));
                }
                (true, false) => linear[sub_index[i]].1 += bias * x[j],
                (false, false) if i < j => offset += bias * x[i] * x[j],
                _ => {}
            }
        }

        Ok(Self::from_parts(linear, quadratic, offset, self.vartype))
    }

    /// Converts the model to the other value encoding without changing any energy.
    pub fn change_vartype(&self, vartype: Vartype) -> Self {
        if vartype == self.vartype {
            return self.clone();
        }

        let num_x = self.num_variables();
        let row_sums = &self.quadratic * &Array1::<f64>::ones(num_x);
        let coupling_total = 0.5 * self.quadratic.data().iter().sum::<f64>();

        let (linear, quadratic, offset) = match vartype {
            // x = (s + 1) / 2
            Vartype::Spin => (
                0.5 * &self.linear + 0.25 * &row_sums,
                self.quadratic.map(|bias| 0.25 * bias),
                self.offset + 0.5 * self.linear.sum() + 0.25 * coupling_total,
            ),
            // s = 2x - 1
            Vartype::Binary => (
                2.0 * &self.linear - 2.0 * &row_sums,
                self.quadratic.map(|bias| 4.0 * bias),
                self.offset - self.linear.sum() + coupling_total,
            ),
        };

        Self {
            variables: self.variables.clone(),
            index: self.index.clone(),
            linear,
            quadratic,
            offset,
            vartype,
        }
    }
}
