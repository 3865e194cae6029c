//! The two value encodings of a binary variable.

use crate::error::{Label, ModelError};

/// Value domain of the variables of a model or sample.
///
/// `Binary` variables take values in {0, 1}, `Spin` variables take values in {-1, +1}. The two are
/// related by `s = 2x - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vartype {
    Binary,
    Spin,
}

impl Vartype {
    /// Checks that `value` belongs to this domain.
    pub fn check(self, label: Label, value: i8) -> Result<i8, ModelError> {
        let valid = match self {
            Self::Binary => value == 0 || value == 1,
            Self::Spin => value == -1 || value == 1,
        };

        match valid {
            true => Ok(value),
            false => Err(ModelError::InvalidValue {
                label,
                value,
                vartype: self,
            }),
        }
    }

    /// Maps a (valid) value of this domain into `target`.
    pub const fn convert(self, value: i8, target: Self) -> i8 {
        match (self, target) {
            (Self::Binary, Self::Spin) => 2 * value - 1,
            (Self::Spin, Self::Binary) => (value + 1) / 2,
            _ => value,
        }
    }

    /// The change in value when a variable currently at `value` is flipped.
    pub fn flip_delta(self, value: f64) -> f64 {
        match self {
            Self::Binary => 1.0 - 2.0 * value,
            Self::Spin => -2.0 * value,
        }
    }

    /// Parses the usual names of the two domains, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "BINARY" | "QUBO" => Some(Self::Binary),
            "SPIN" | "ISING" => Some(Self::Spin),
            _ => None,
        }
    }
}
