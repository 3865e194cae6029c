//! Property-based tests for the decomposers.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use qubo_decompose::chimera::make_random_chimera;
use qubo_decompose::subgraph_selection::select_localsearch_adversaries;
use qubo_decompose::{
    ChimeraShape, DecomposeError, Decomposer, EnergyImpactDecomposer, IdentityDecomposer, Label,
    QuadraticModel, RandomSubproblemDecomposer, Sample, TilingChimeraDecomposer, Vartype,
};
use smolprng::{JsfLarge, PRNG};

fn random_model(num_x: usize, density: f64, seed: u64) -> Arc<QuadraticModel> {
    let mut prng = PRNG {
        generator: JsfLarge::from(seed),
    };
    Arc::new(QuadraticModel::make_random(num_x, &mut prng, density))
}

fn binary_sample(model: &QuadraticModel, bits: &[bool]) -> Sample {
    let values = model
        .variables()
        .iter()
        .zip(bits.iter().cycle())
        .map(|(&v, &bit)| (v, i8::from(bit)));
    Sample::new(values, Vartype::Binary).unwrap()
}

fn labels(model: &QuadraticModel) -> HashSet<Label> {
    model.variables().iter().copied().collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: the identity subproblem is the full variable set for any sample
    #[test]
    fn prop_identity_is_full_model(
        num_x in 1_usize..40,
        seed in any::<u64>(),
        bits in prop::collection::vec(any::<bool>(), 1..40),
    ) {
        let model = random_model(num_x, 0.2, seed);
        let sample = binary_sample(&model, &bits);
        let mut decomposer = IdentityDecomposer::new(model.clone());

        let subproblem = decomposer.select(&sample).unwrap();
        prop_assert_eq!(subproblem.model.variables(), model.variables());
    }

    /// Property: random subproblems have exactly `size` distinct model variables
    #[test]
    fn prop_random_exact_size(
        num_x in 1_usize..60,
        size_frac in 0.0_f64..=1.0,
        seed in any::<u64>(),
        bits in prop::collection::vec(any::<bool>(), 1..10),
    ) {
        let model = random_model(num_x, 0.1, seed);
        let size = ((num_x as f64) * size_frac) as usize;
        let sample = binary_sample(&model, &bits);
        let mut decomposer = RandomSubproblemDecomposer::<JsfLarge>::from_seed(model.clone(), size, seed).unwrap();

        for _ in 0..3 {
            let subproblem = decomposer.select(&sample).unwrap();
            let chosen = labels(&subproblem.model);
            prop_assert_eq!(subproblem.model.num_variables(), size);
            prop_assert_eq!(chosen.len(), size);
            prop_assert!(chosen.iter().all(|&v| model.contains(v)));
        }
    }

    /// Property: consecutive energy impact selections differ by at least `min_diff`, unless the
    /// ranking ran out, and every call terminates
    #[test]
    fn prop_energy_impact_diversity(
        num_x in 2_usize..50,
        size_frac in 0.1_f64..=1.0,
        diff_frac in 0.0_f64..=1.0,
        stride in 1_usize..5,
        seed in any::<u64>(),
        first_bits in prop::collection::vec(any::<bool>(), 1..50),
        second_bits in prop::collection::vec(any::<bool>(), 1..50),
    ) {
        let model = random_model(num_x, 0.2, seed);
        let max_size = (((num_x as f64) * size_frac) as usize).max(1);
        let min_diff = ((max_size as f64) * diff_frac) as usize;

        let mut decomposer =
            EnergyImpactDecomposer::with_options(model.clone(), max_size, None, min_diff, stride).unwrap();

        let second_sample = binary_sample(&model, &second_bits);
        let first = labels(&decomposer.select(&binary_sample(&model, &first_bits)).unwrap().model);
        let second = labels(&decomposer.select(&second_sample).unwrap().model);

        prop_assert!(first.len() <= max_size && second.len() <= max_size);
        prop_assert!(first.iter().chain(&second).all(|&v| model.contains(v)));

        // falling short is only allowed when no window of the ranking reaches the threshold
        if first.symmetric_difference(&second).count() < min_diff {
            let ranked = select_localsearch_adversaries(&model, &second_sample, None).unwrap();
            let unreachable = (0..ranked.len()).step_by(stride).all(|offset| {
                let window: HashSet<Label> = ranked.iter().skip(offset).take(max_size).copied().collect();
                window.symmetric_difference(&first).count() < min_diff
            });
            prop_assert!(unreachable);
        }
    }

    /// Property: the subproblem energy at the current sample equals the full energy
    #[test]
    fn prop_induced_energy_matches(
        num_x in 1_usize..40,
        size_frac in 0.0_f64..=1.0,
        seed in any::<u64>(),
        bits in prop::collection::vec(any::<bool>(), 1..40),
    ) {
        let model = random_model(num_x, 0.3, seed);
        let size = ((num_x as f64) * size_frac) as usize;
        let sample = binary_sample(&model, &bits);
        let mut decomposer = RandomSubproblemDecomposer::<JsfLarge>::from_seed(model.clone(), size, seed).unwrap();

        let subproblem = decomposer.select(&sample).unwrap();
        let full = model.energy(&sample).unwrap();
        let part = subproblem.model.energy(&sample).unwrap();
        prop_assert!((full - part).abs() < 1e-9);
    }

    /// Property: oversized subproblems are rejected at construction
    #[test]
    fn prop_oversized_rejected(num_x in 0_usize..30, extra in 1_usize..10, seed in any::<u64>()) {
        let model = random_model(num_x, 0.2, seed);

        let energy = EnergyImpactDecomposer::new(model.clone(), num_x + extra);
        let random = RandomSubproblemDecomposer::<JsfLarge>::from_seed(model, num_x + extra, seed);
        prop_assert!(matches!(energy, Err(DecomposeError::InvalidConfiguration(_))));
        prop_assert!(matches!(random, Err(DecomposeError::InvalidConfiguration(_))));
    }

    /// Property: tiles inferred from a full lattice follow its coordinates, partition the model,
    /// and a looping tiler repeats its first tile on call `tile_count + 1` while a non-looping one
    /// is exhausted there
    #[test]
    fn prop_tiling_wraps_or_exhausts(
        rows in 1_usize..4,
        cols in 1_usize..4,
        shore in 1_usize..4,
        tile_rows in 1_usize..5,
        tile_cols in 1_usize..5,
        tile_shore in 1_usize..5,
        seed in any::<u64>(),
    ) {
        let lattice = ChimeraShape::new(rows, cols, shore);
        let tile = ChimeraShape::new(tile_rows, tile_cols, tile_shore);
        let mut prng = PRNG { generator: JsfLarge::from(seed) };
        let model = Arc::new(make_random_chimera(lattice, &mut prng, Vartype::Spin));
        let sample = Sample::uniform(&model, 1, Vartype::Spin).unwrap();

        let mut looping = TilingChimeraDecomposer::new(model.clone(), tile, true).unwrap();
        let mut bounded = TilingChimeraDecomposer::new(model.clone(), tile, false).unwrap();
        let count = looping.num_tiles();
        prop_assert_eq!(
            count,
            rows.div_ceil(tile_rows) * cols.div_ceil(tile_cols) * shore.div_ceil(tile_shore)
        );

        let mut covered: Vec<Label> = Vec::new();
        let mut first = None;
        for position in looping.tile_positions() {
            let sub = looping.select(&sample).unwrap();
            let embedding = sub.embedding.clone().unwrap();

            for (local, &v) in &embedding {
                let c = lattice.coordinate(v).unwrap();
                prop_assert_eq!(position, (c.row / tile_rows, c.col / tile_cols, c.index / tile_shore));
                prop_assert_eq!(local.row, c.row % tile_rows);
                prop_assert_eq!(local.col, c.col % tile_cols);
                prop_assert_eq!(local.shore, c.shore);
                prop_assert_eq!(local.index, c.index % tile_shore);
            }
            for (u, v, _) in sub.model.interactions() {
                prop_assert!(lattice.is_edge(u, v));
            }

            covered.extend(sub.model.variables().iter().copied());
            first.get_or_insert(sub);
        }
        covered.sort_unstable();
        prop_assert_eq!(covered.as_slice(), model.variables());

        let wrapped = looping.select(&sample).unwrap();
        let first = first.unwrap();
        prop_assert_eq!(first.model.variables(), wrapped.model.variables());

        for _ in 0..count {
            prop_assert!(bounded.select(&sample).is_ok());
        }
        prop_assert!(
            matches!(bounded.select(&sample), Err(DecomposeError::ExhaustedSource { .. })),
            "expected exhaustion after {} tiles",
            count
        );
    }
}
