//! Chimera lattice geometry and the partition of a lattice model into tiles.
//!
//! A Chimera lattice C(M, N, T) is an M x N grid of unit cells. Every cell is a complete bipartite
//! graph K(T, T) between a vertical shore (u = 0) and a horizontal shore (u = 1). Vertical shores
//! couple to the same position in the cell below, horizontal shores to the cell on the right.
//! Node `(i, j, u, k)` has the linear label `((i * N + j) * 2 + u) * T + k`.

use std::collections::BTreeMap;

use smolprng::{Algorithm, PRNG};

use crate::error::{DecomposeError, Label};
use crate::quadratic_model::QuadraticModel;
use crate::vartype::Vartype;

/// Dimensions `(rows, cols, shore)` of a Chimera lattice or of a tile cut from one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChimeraShape {
    pub rows: usize,
    pub cols: usize,
    pub shore: usize,
}

/// Position of a node inside a lattice (or inside a tile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChimeraCoord {
    pub row: usize,
    pub col: usize,
    pub shore: usize,
    pub index: usize,
}

/// Tile position `(row block, column block, shore block)` in the enclosing lattice.
pub type TileCoord = (usize, usize, usize);

/// Tile-local coordinates mapped to the model variables that occupy them.
pub type Embedding = BTreeMap<ChimeraCoord, Label>;

impl Default for ChimeraShape {
    fn default() -> Self {
        Self::new(4, 4, 4)
    }
}

impl ChimeraShape {
    pub const fn new(rows: usize, cols: usize, shore: usize) -> Self {
        Self { rows, cols, shore }
    }

    pub const fn num_nodes(&self) -> usize {
        self.rows * self.cols * 2 * self.shore
    }

    /// The smallest square lattice with the given shore size that has a node for `max_label`.
    pub fn covering(max_label: Label, shore: usize) -> Self {
        let cells = (max_label / (2 * shore.max(1))) + 1;
        let mut side = cells.isqrt();
        if side * side < cells {
            side += 1;
        }
        Self::new(side, side, shore)
    }

    pub(crate) fn validate(&self, what: &str) -> Result<(), DecomposeError> {
        if self.rows == 0 || self.cols == 0 || self.shore == 0 {
            return Err(DecomposeError::InvalidConfiguration(format!(
                "{what} dimensions must be positive, got ({}, {}, {})",
                self.rows, self.cols, self.shore
            )));
        }
        Ok(())
    }

    /// Lattice coordinate of a label, `None` if the label lies outside the lattice.
    pub fn coordinate(&self, v: Label) -> Option<ChimeraCoord> {
        if v >= self.num_nodes() {
            return None;
        }

        let (rest, index) = (v / self.shore, v % self.shore);
        let (rest, shore) = (rest / 2, rest % 2);
        let (row, col) = (rest / self.cols, rest % self.cols);

        Some(ChimeraCoord {
            row,
            col,
            shore,
            index,
        })
    }

    pub const fn label(&self, c: ChimeraCoord) -> Label {
        ((c.row * self.cols + c.col) * 2 + c.shore) * self.shore + c.index
    }

    /// Whether `u` and `v` are coupled in this lattice.
    pub fn is_edge(&self, u: Label, v: Label) -> bool {
        let (Some(a), Some(b)) = (self.coordinate(u), self.coordinate(v)) else {
            return false;
        };

        if a.row == b.row && a.col == b.col {
            return a.shore != b.shore;
        }

        if a.shore != b.shore || a.index != b.index {
            return false;
        }

        match a.shore {
            0 => a.col == b.col && a.row.abs_diff(b.row) == 1,
            _ => a.row == b.row && a.col.abs_diff(b.col) == 1,
        }
    }

    /// All edges of the lattice, each once.
    pub fn edges(&self) -> Vec<(Label, Label)> {
        let mut edges = Vec::new();
        let node = |row, col, shore, index| {
            self.label(ChimeraCoord {
                row,
                col,
                shore,
                index,
            })
        };

        for i in 0..self.rows {
            for j in 0..self.cols {
                for k in 0..self.shore {
                    for l in 0..self.shore {
                        edges.push((node(i, j, 0, k), node(i, j, 1, l)));
                    }
                    if i + 1 < self.rows {
                        edges.push((node(i, j, 0, k), node(i + 1, j, 0, k)));
                    }
                    if j + 1 < self.cols {
                        edges.push((node(i, j, 1, k), node(i, j + 1, 1, k)));
                    }
                }
            }
        }

        edges
    }
}

/// Partitions the variables of `model` into tiles of shape `tile` cut from `lattice`.
///
/// A variable at lattice coordinate `(i, j, u, k)` lands in tile `(i / m, j / n, k / t)` at the
/// tile-local coordinate `(i % m, j % n, u, k % t)`. Tiles come back ordered by tile coordinate and
/// only tiles holding at least one variable are returned. Labels that fall outside the lattice are
/// skipped.
///
/// A tile larger than the lattice in some dimension yields partial tiles covering what is there.
///
/// # Errors
///
/// Returns [`DecomposeError::InvalidConfiguration`] if a dimension is zero.
pub fn chimera_tiles(
    model: &QuadraticModel,
    lattice: ChimeraShape,
    tile: ChimeraShape,
) -> Result<Vec<(TileCoord, Embedding)>, DecomposeError> {
    lattice.validate("lattice")?;
    tile.validate("tile")?;

    let mut tiles: BTreeMap<TileCoord, Embedding> = BTreeMap::new();
    let mut skipped = 0;

    for &v in model.variables() {
        let Some(c) = lattice.coordinate(v) else {
            skipped += 1;
            continue;
        };

        let position = (c.row / tile.rows, c.col / tile.cols, c.index / tile.shore);
        let local = ChimeraCoord {
            row: c.row % tile.rows,
            col: c.col % tile.cols,
            shore: c.shore,
            index: c.index % tile.shore,
        };

        tiles.entry(position).or_default().insert(local, v);
    }

    if skipped > 0 {
        tracing::warn!("{skipped} variables lie outside lattice {lattice:?} and belong to no tile");
    }

    let off_lattice = model
        .interactions()
        .filter(|&(u, v, _)| !lattice.is_edge(u, v))
        .count();
    if off_lattice > 0 {
        tracing::warn!("{off_lattice} couplings are not edges of lattice {lattice:?}");
    }

    Ok(tiles.into_iter().collect())
}

/// Infers the lattice `model` lives on from its couplings.
///
/// Shore sizes and then column counts are tried in increasing order, and the first lattice in which
/// every coupling is an edge wins. For a model spanning a full `C(M, N, T)` that is `C(M, N, T)`
/// itself. A model without couplings has no topology to read, so it is placed on the smallest
/// square lattice with shore `shore_hint`.
///
/// # Errors
///
/// Returns [`DecomposeError::InvalidConfiguration`] if the model has no variables or its couplings
/// do not form a Chimera graph under any labelling of this form.
pub fn infer_lattice(model: &QuadraticModel, shore_hint: usize) -> Result<ChimeraShape, DecomposeError> {
    let Some(&max_label) = model.variables().last() else {
        return Err(DecomposeError::InvalidConfiguration(
            "cannot infer a lattice for a model without variables".to_string(),
        ));
    };

    if model.num_interactions() == 0 {
        return Ok(ChimeraShape::covering(max_label, shore_hint));
    }

    let couplings: Vec<(Label, Label)> = model.interactions().map(|(u, v, _)| (u, v)).collect();

    for shore in 1..=max_label.saturating_add(1) {
        let cells = max_label / (2 * shore) + 1;
        for cols in 1..=cells {
            let lattice = ChimeraShape::new(cells.div_ceil(cols), cols, shore);
            if couplings.iter().all(|&(u, v)| lattice.is_edge(u, v)) {
                tracing::debug!("inferred lattice {lattice:?} from {} couplings", couplings.len());
                return Ok(lattice);
            }
        }
    }

    Err(DecomposeError::InvalidConfiguration(format!(
        "the {} couplings of the model do not fit any Chimera lattice",
        couplings.len()
    )))
}

/// Generates a model on every node and edge of `shape`, linear biases uniform in [-0.5, 0.5) and
/// couplings uniform in [-1, 1).
pub fn make_random_chimera<T: Algorithm>(
    shape: ChimeraShape,
    prng: &mut PRNG<T>,
    vartype: Vartype,
) -> QuadraticModel {
    let linear: Vec<(Label, f64)> = (0..shape.num_nodes())
        .map(|v| (v, prng.gen_f64() - 0.5f64))
        .collect();

    let quadratic: Vec<((Label, Label), f64)> = shape
        .edges()
        .into_iter()
        .map(|edge| (edge, 2.0 * prng.gen_f64() - 1.0))
        .collect();

    QuadraticModel::from_parts(linear, quadratic, 0.0, vartype)
}
