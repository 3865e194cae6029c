use std::sync::Arc;

use smolprng::{JsfLarge, PRNG};

use crate::chimera::ChimeraShape;
use crate::decomposers::{
    Decomposer, EnergyImpactDecomposer, IdentityDecomposer, RandomSubproblemDecomposer,
    TilingChimeraDecomposer,
};
use crate::error::DecomposeError;
use crate::quadratic_model::QuadraticModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecomposerSelection {
    EnergyImpact,
    RandomSubproblem,
    Identity,
    TilingChimera,
}

impl DecomposerSelection {
    /// Parses a strategy name, `None` if it names no strategy.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "EnergyImpact" => Some(Self::EnergyImpact),
            "RandomSubproblem" | "Random" => Some(Self::RandomSubproblem),
            "Identity" => Some(Self::Identity),
            "TilingChimera" | "Tiling" => Some(Self::TilingChimera),
            _ => None,
        }
    }
}

/// Options for building a decomposer at run time
#[derive(Debug, Clone, PartialEq)]
pub struct DecomposerOptions {
    pub decomposer: DecomposerSelection,
    pub max_size: usize,
    pub min_gain: Option<f64>,
    pub min_diff: usize,
    pub stride: usize,
    pub tile: ChimeraShape,
    pub lattice: Option<ChimeraShape>,
    pub looping: bool,
    pub seed: usize,
}

impl Default for DecomposerOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DecomposerOptions {
    pub fn new() -> Self {
        Self {
            decomposer: DecomposerSelection::EnergyImpact,
            max_size: 50,
            min_gain: None,
            min_diff: 1,
            stride: 1,
            tile: ChimeraShape::default(),
            lattice: None,
            looping: true,
            seed: 0,
        }
    }

    pub fn set_decomposer(&mut self, decomposer: Option<String>) {
        if let Some(selection) = decomposer.as_deref().and_then(DecomposerSelection::from_name) {
            self.decomposer = selection;
        }
    }
}

/// Builds the selected decomposer over `model`.
///
/// Example:
/// ``` rust
/// use std::sync::Arc;
/// use qubo_decompose::{make_decomposer, DecomposerOptions, QuadraticModel, Sample, Vartype};
/// use smolprng::{JsfLarge, PRNG};
///
/// let mut prng = PRNG {
///     generator: JsfLarge::default(),
/// };
/// let model = Arc::new(QuadraticModel::make_random(100, &mut prng, 0.1));
///
/// let mut options = DecomposerOptions::new();
/// options.set_decomposer(Some("Random".to_string()));
/// options.max_size = 10;
///
/// let mut decomposer = make_decomposer(model.clone(), &options).unwrap();
/// let sample = Sample::uniform(&model, 0, Vartype::Binary).unwrap();
/// let subproblem = decomposer.select(&sample).unwrap();
///
/// assert_eq!(subproblem.model.num_variables(), 10);
/// ```
///
/// # Errors
///
/// Returns [`DecomposeError::InvalidConfiguration`] if the options do not fit the model.
pub fn make_decomposer(
    model: Arc<QuadraticModel>,
    options: &DecomposerOptions,
) -> Result<Box<dyn Decomposer>, DecomposeError> {
    tracing::info!(
        "building {:?} decomposer for {} variables",
        options.decomposer,
        model.num_variables()
    );

    let decomposer: Box<dyn Decomposer> = match options.decomposer {
        DecomposerSelection::EnergyImpact => Box::new(EnergyImpactDecomposer::with_options(
            model,
            options.max_size,
            options.min_gain,
            options.min_diff,
            options.stride,
        )?),
        DecomposerSelection::RandomSubproblem => {
            let prng = PRNG {
                generator: JsfLarge::from(options.seed as u64),
            };
            Box::new(RandomSubproblemDecomposer::new(model, options.max_size, prng)?)
        }
        DecomposerSelection::Identity => Box::new(IdentityDecomposer::new(model)),
        DecomposerSelection::TilingChimera => match options.lattice {
            Some(lattice) => Box::new(TilingChimeraDecomposer::with_lattice(
                model,
                lattice,
                options.tile,
                options.looping,
            )?),
            None => Box::new(TilingChimeraDecomposer::new(
                model,
                options.tile,
                options.looping,
            )?),
        },
    };

    Ok(decomposer)
}
