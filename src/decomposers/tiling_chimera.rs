//! Decomposition of a Chimera-structured problem into a fixed sequence of tiles.

use std::sync::Arc;

use crate::chimera::{chimera_tiles, infer_lattice, ChimeraShape, Embedding, TileCoord};
use crate::decomposers::{Decomposer, Subproblem};
use crate::error::{DecomposeError, Label};
use crate::quadratic_model::QuadraticModel;
use crate::sample::Sample;

/// Returns sequential tile slices of the problem, each a `C(m, n, t)` block of Chimera cells.
///
/// The tiles are computed once at construction and handed out in order of their tile
/// coordinate. With `looping` set the sequence starts over after the last tile, otherwise further
/// calls fail with [`DecomposeError::ExhaustedSource`].
pub struct TilingChimeraDecomposer {
    model: Arc<QuadraticModel>,
    tiles: Vec<(TileCoord, Embedding)>,
    looping: bool,
    cursor: usize,
}

impl TilingChimeraDecomposer {
    /// Tiles of shape `tile` cut from the lattice the model's couplings live on, see
    /// [`infer_lattice`].
    ///
    /// # Errors
    ///
    /// Returns [`DecomposeError::InvalidConfiguration`] if a tile dimension is zero, the model is
    /// empty, or its couplings do not form a Chimera graph.
    pub fn new(model: Arc<QuadraticModel>, tile: ChimeraShape, looping: bool) -> Result<Self, DecomposeError> {
        tile.validate("tile")?;
        let lattice = infer_lattice(&model, tile.shore)?;
        Self::with_lattice(model, lattice, tile, looping)
    }

    /// Tiles of shape `tile` cut from an explicitly given `lattice`.
    ///
    /// # Errors
    ///
    /// Returns [`DecomposeError::InvalidConfiguration`] if a dimension is zero or no variable of
    /// the model lies in the lattice.
    pub fn with_lattice(
        model: Arc<QuadraticModel>,
        lattice: ChimeraShape,
        tile: ChimeraShape,
        looping: bool,
    ) -> Result<Self, DecomposeError> {
        let tiles = chimera_tiles(&model, lattice, tile)?;

        if tiles.is_empty() {
            return Err(DecomposeError::InvalidConfiguration(format!(
                "no {tile:?} tiles found in lattice {lattice:?}"
            )));
        }

        tracing::info!("partitioned lattice {lattice:?} into {} tiles of {tile:?}", tiles.len());

        Ok(Self {
            model,
            tiles,
            looping,
            cursor: 0,
        })
    }

    pub fn num_tiles(&self) -> usize {
        self.tiles.len()
    }

    /// Tile coordinates in the order they are handed out.
    pub fn tile_positions(&self) -> Vec<TileCoord> {
        self.tiles.iter().map(|(position, _)| *position).collect()
    }
}

impl Decomposer for TilingChimeraDecomposer {
    fn name(&self) -> &str {
        "TilingChimeraDecomposer"
    }

    /// # Errors
    ///
    /// Returns [`DecomposeError::ExhaustedSource`] once every tile has been handed out and looping
    /// is off.
    fn select(&mut self, sample: &Sample) -> Result<Subproblem, DecomposeError> {
        let num_tiles = self.tiles.len();
        if !self.looping && self.cursor >= num_tiles {
            return Err(DecomposeError::ExhaustedSource { tiles: num_tiles });
        }

        let index = self.cursor % num_tiles;
        let (position, embedding) = &self.tiles[index];
        let variables: Vec<Label> = embedding.values().copied().collect();

        tracing::debug!("selected tile {position:?} with {} variables", variables.len());

        let model = self.model.induced_by(&variables, sample)?;
        let subproblem = Subproblem::with_embedding(model, embedding.clone());

        self.cursor = match self.looping {
            true => (index + 1) % num_tiles,
            false => index + 1,
        };

        Ok(subproblem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chimera::make_random_chimera;
    use crate::vartype::Vartype;
    use smolprng::{JsfLarge, PRNG};

    fn lattice_model(shape: ChimeraShape) -> Arc<QuadraticModel> {
        let mut prng = PRNG {
            generator: JsfLarge::default(),
        };
        Arc::new(make_random_chimera(shape, &mut prng, Vartype::Spin))
    }

    fn tile_variables(subproblem: &Subproblem) -> Vec<Label> {
        subproblem.model.variables().to_vec()
    }

    #[test]
    fn test_infers_lattice() {
        let p = lattice_model(ChimeraShape::new(4, 4, 2));
        let decomposer = TilingChimeraDecomposer::new(p, ChimeraShape::new(2, 2, 2), true).unwrap();

        assert_eq!(decomposer.num_tiles(), 4);
        assert_eq!(
            decomposer.tile_positions(),
            vec![(0, 0, 0), (0, 1, 0), (1, 0, 0), (1, 1, 0)]
        );
    }

    #[test]
    fn test_loop_wraps() {
        let p = lattice_model(ChimeraShape::new(4, 4, 2));
        let sample = Sample::uniform(&p, 1, Vartype::Spin).unwrap();
        let mut decomposer = TilingChimeraDecomposer::new(p, ChimeraShape::new(2, 2, 2), true).unwrap();

        let first = decomposer.select(&sample).unwrap();
        for _ in 1..decomposer.num_tiles() {
            decomposer.select(&sample).unwrap();
        }
        let wrapped = decomposer.select(&sample).unwrap();

        assert_eq!(tile_variables(&first), tile_variables(&wrapped));
        assert_eq!(first.embedding, wrapped.embedding);
    }

    #[test]
    fn test_no_loop_exhausts() {
        let p = lattice_model(ChimeraShape::new(4, 4, 2));
        let sample = Sample::uniform(&p, -1, Vartype::Spin).unwrap();
        let mut decomposer = TilingChimeraDecomposer::new(p, ChimeraShape::new(2, 2, 2), false).unwrap();

        for _ in 0..4 {
            decomposer.select(&sample).unwrap();
        }
        assert_eq!(
            decomposer.select(&sample),
            Err(DecomposeError::ExhaustedSource { tiles: 4 })
        );
        assert_eq!(
            decomposer.select(&sample),
            Err(DecomposeError::ExhaustedSource { tiles: 4 })
        );
    }

    #[test]
    fn test_embedding_matches_subproblem() {
        let p = lattice_model(ChimeraShape::new(2, 2, 4));
        let sample = Sample::uniform(&p, 1, Vartype::Spin).unwrap();
        let mut decomposer = TilingChimeraDecomposer::new(p.clone(), ChimeraShape::new(1, 1, 4), true).unwrap();

        for _ in 0..decomposer.num_tiles() {
            let sub = decomposer.select(&sample).unwrap();
            let embedding = sub.embedding.as_ref().unwrap();
            let mut labels: Vec<Label> = embedding.values().copied().collect();
            labels.sort_unstable();

            assert_eq!(labels, tile_variables(&sub));
            assert_eq!(embedding.len(), 8);
            // a single cell is K(4, 4)
            assert_eq!(sub.model.num_interactions(), 16);
        }
    }

    #[test]
    fn test_explicit_lattice() {
        // a 2 x 4 lattice is not square, so it has to be declared
        let shape = ChimeraShape::new(2, 4, 2);
        let p = lattice_model(shape);
        let decomposer =
            TilingChimeraDecomposer::with_lattice(p, shape, ChimeraShape::new(2, 2, 2), true).unwrap();

        assert_eq!(decomposer.tile_positions(), vec![(0, 0, 0), (0, 1, 0)]);
    }

    #[test]
    fn test_no_tiles_is_invalid() {
        let p = Arc::new(QuadraticModel::new(vec![(1000, 0.0)], vec![], 0.0, Vartype::Spin).unwrap());
        let result =
            TilingChimeraDecomposer::with_lattice(p, ChimeraShape::new(2, 2, 2), ChimeraShape::new(1, 1, 2), true);
        assert!(matches!(result, Err(DecomposeError::InvalidConfiguration(_))));

        let empty = Arc::new(QuadraticModel::new(vec![], vec![], 0.0, Vartype::Spin).unwrap());
        let result = TilingChimeraDecomposer::new(empty, ChimeraShape::default(), true);
        assert!(matches!(result, Err(DecomposeError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_default_tile_on_small_lattice() {
        let p = lattice_model(ChimeraShape::new(2, 2, 4));
        let sample = Sample::uniform(&p, 1, Vartype::Spin).unwrap();
        let mut decomposer = TilingChimeraDecomposer::new(p.clone(), ChimeraShape::default(), true).unwrap();

        assert_eq!(decomposer.num_tiles(), 1);
        let sub = decomposer.select(&sample).unwrap();
        assert_eq!(sub.model.num_variables(), 32);
        assert_eq!(sub.model.num_interactions(), p.num_interactions());

        let declared =
            TilingChimeraDecomposer::with_lattice(p, ChimeraShape::new(2, 2, 4), ChimeraShape::default(), true)
                .unwrap();
        assert_eq!(declared.num_tiles(), 1);
    }

    #[test]
    fn test_narrow_tile_follows_model_shore() {
        let p = lattice_model(ChimeraShape::new(2, 2, 4));
        let sample = Sample::uniform(&p, 1, Vartype::Spin).unwrap();
        let mut decomposer = TilingChimeraDecomposer::new(p, ChimeraShape::new(1, 1, 2), true).unwrap();

        assert_eq!(decomposer.num_tiles(), 8);
        assert_eq!(decomposer.tile_positions()[..3], [(0, 0, 0), (0, 0, 1), (0, 1, 0)]);

        let first = decomposer.select(&sample).unwrap();
        assert_eq!(tile_variables(&first), vec![0, 1, 4, 5]);

        // every tile is half a cell, K(2, 2)
        assert_eq!(first.model.num_interactions(), 4);
        for _ in 1..decomposer.num_tiles() {
            let sub = decomposer.select(&sample).unwrap();
            assert_eq!(sub.model.num_variables(), 4);
            assert_eq!(sub.model.num_interactions(), 4);
        }
    }

    #[test]
    fn test_non_chimera_couplings_are_invalid() {
        let p = Arc::new(
            QuadraticModel::new(
                vec![(0, 0.0), (1, 0.0), (2, 0.0)],
                vec![((0, 1), 1.0), ((1, 2), 1.0), ((0, 2), 1.0)],
                0.0,
                Vartype::Spin,
            )
            .unwrap(),
        );
        let result = TilingChimeraDecomposer::new(p, ChimeraShape::default(), true);
        assert!(matches!(result, Err(DecomposeError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_zero_tile_dimension_is_invalid() {
        let p = lattice_model(ChimeraShape::new(2, 2, 2));
        let result = TilingChimeraDecomposer::new(p, ChimeraShape::new(1, 0, 2), true);
        assert!(matches!(result, Err(DecomposeError::InvalidConfiguration(_))));
    }
}
