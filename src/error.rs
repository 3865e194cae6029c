//! Error types for models and decomposers.

use crate::vartype::Vartype;

/// Variable label type used throughout the crate.
pub type Label = usize;

/// Errors raised while building a model or reading a sample against it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// A coupling references a variable without a linear entry.
    #[error("interaction ({u}, {v}) references unknown variable {missing}")]
    UnknownVariable { u: Label, v: Label, missing: Label },

    /// A label that is not one of the model's variables.
    #[error("variable {0} is not part of the model")]
    NotInModel(Label),

    /// A coupling connects a variable to itself.
    #[error("self interaction on variable {0} is not allowed")]
    SelfInteraction(Label),

    /// The sample does not assign a value to a model variable.
    #[error("sample has no value for variable {0}")]
    MissingValue(Label),

    /// A sampled value is not part of the sample's value domain.
    #[error("value {value} for variable {label} is not a valid {vartype:?} value")]
    InvalidValue {
        label: Label,
        value: i8,
        vartype: Vartype,
    },

    /// Triplet input with mismatched lengths or out of range indices.
    #[error("malformed QUBO data: {0}")]
    MalformedData(String),

    /// The state carries no samples to decompose around.
    #[error("sample set is empty")]
    EmptySampleSet,
}

/// Errors surfaced by decomposers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecomposeError {
    /// Construction parameters are inconsistent with each other or with the model.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A non-looping tile source has handed out every tile.
    #[error("no more tiles: all {tiles} tiles have been consumed")]
    ExhaustedSource { tiles: usize },

    /// The model or the incoming sample is malformed.
    #[error(transparent)]
    Model(#[from] ModelError),
}
