//! # Decomposition strategies for large QUBO and Ising models
//!
//! Each decomposer looks at the full problem and the current best sample, picks a bounded set of
//! variables, and returns the subproblem induced by them with every other variable held at its
//! sampled value. Solving the subproblem and merging the result back is left to the caller.
//!
//! The strategies are:
//! - [`EnergyImpactDecomposer`]: the variables with the largest flip impact, kept diverse between calls
//! - [`RandomSubproblemDecomposer`]: a uniformly random set of variables
//! - [`IdentityDecomposer`]: the whole problem
//! - [`TilingChimeraDecomposer`]: successive tiles of a Chimera lattice
//!
//! Example:
//! ``` rust
//! use std::sync::Arc;
//! use qubo_decompose::{Decomposer, EnergyImpactDecomposer, QuadraticModel, Sample, State, Vartype};
//! use smolprng::{JsfLarge, PRNG};
//!
//! let mut prng = PRNG {
//!     generator: JsfLarge::default(),
//! };
//! let model = Arc::new(QuadraticModel::make_random(200, &mut prng, 0.05));
//! let state = State::from_sample(&model, Sample::uniform(&model, 0, Vartype::Binary).unwrap()).unwrap();
//!
//! let mut decomposer = EnergyImpactDecomposer::with_options(model, 20, None, 5, 1).unwrap();
//! let state = decomposer.run(&state).unwrap();
//!
//! assert_eq!(state.subproblem.unwrap().num_variables(), 20);
//! ```

pub mod chimera;
pub mod decomposer_options;
pub mod decomposers;
pub mod error;
pub mod quadratic_model;
pub mod sample;
pub mod state;
pub mod subgraph_selection;
pub mod vartype;

#[cfg(feature = "python")]
mod python_interopt;

pub use chimera::{ChimeraCoord, ChimeraShape, Embedding, TileCoord};
pub use decomposer_options::{make_decomposer, DecomposerOptions, DecomposerSelection};
pub use decomposers::{
    Decomposer, EnergyImpactDecomposer, IdentityDecomposer, RandomSubproblemDecomposer,
    Subproblem, TilingChimeraDecomposer,
};
pub use error::{DecomposeError, Label, ModelError};
pub use quadratic_model::QuadraticModel;
pub use sample::{Sample, SampleSet};
pub use state::State;
pub use vartype::Vartype;
