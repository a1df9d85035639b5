//   Copyright 2025 pathfold developers
//
//   Licensed under the Apache License, Version 2.0 (the "License");
//   you may not use this file except in compliance with the License.
//   You may obtain a copy of the License at
//
//       http://www.apache.org/licenses/LICENSE-2.0
//
//   Unless required by applicable law or agreed to in writing, software
//   distributed under the License is distributed on an "AS IS" BASIS,
//   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//   See the License for the specific language governing permissions and
//   limitations under the License.

/// Equivalence tests on random networks.
///
/// Networks of various depths are initialized randomly and reduced at
/// normally distributed samples. Each reduction must reproduce the output
/// of the network at its own sample, and every sample on the same firing
/// path must yield the same reduction.
#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use approx::assert_relative_eq;
    use assertables::*;
    use ndarray::{Array, Array2};
    use ndarray_rand::rand_distr::Normal;
    use ndarray_rand::RandomExt;
    use pathfold::metrics::{fidelity, local_fidelity};
    use pathfold::net::network::Network;
    use pathfold::prune::WeightPruner;
    use pathfold::reduce::{reduce, reduce_batch, reduce_with_path, ReducedModel};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn init_logger() {
        use env_logger::Target;
        use log::LevelFilter;

        let _ = env_logger::builder()
            .is_test(true)
            .target(Target::Stdout)
            .filter_level(LevelFilter::Debug)
            .try_init();
    }

    fn samples(n: usize, dim: usize, rng: &mut StdRng) -> Array2<f32> {
        let normal = Normal::new(0f32, 1f32).unwrap();
        Array::random_using((n, dim), normal, rng)
    }

    #[test]
    pub fn test_equivalence_random_networks() {
        init_logger();

        let mut rng = StdRng::seed_from_u64(2025);

        for dims in [vec![4, 1], vec![4, 3, 1], vec![7, 10, 5, 2], vec![12, 16, 16, 8, 1]] {
            let network = Network::<f32>::random(&dims, &mut rng).unwrap();
            let xs = samples(200, dims[0], &mut rng);

            for x in xs.outer_iter() {
                let model = reduce(&network, &x).unwrap();

                assert_eq!(model.indim(), dims[0]);
                assert_eq!(model.outdim(), dims[dims.len() - 1]);
                assert_relative_eq!(
                    model.evaluate(&x).unwrap(),
                    network.evaluate(&x).unwrap(),
                    epsilon = 1e-5
                );
            }
        }
    }

    #[test]
    pub fn test_equivalence_pruned() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut network = Network::<f32>::random(&[10, 8, 8, 1], &mut rng).unwrap();
        let mask = WeightPruner::default().prune(&mut network).unwrap();

        for x in samples(100, 10, &mut rng).outer_iter() {
            let model = reduce(&network, &x).unwrap();

            for &col in mask.columns() {
                assert_relative_eq!(model.weights().column(col).sum(), 0.0);
            }
            assert_lt!(local_fidelity(&network, &x).unwrap(), 1e-5);
        }
    }

    #[test]
    pub fn test_same_path_same_model() {
        let mut rng = StdRng::seed_from_u64(11);
        let network = Network::<f32>::random(&[3, 4, 1], &mut rng).unwrap();

        let mut regions = BTreeMap::<String, ReducedModel<f32>>::new();

        for x in samples(500, 3, &mut rng).outer_iter() {
            let (model, path) = reduce_with_path(&network, &x).unwrap();

            match regions.get(&path.pattern()) {
                Some(known) => assert_relative_eq!(known.linear(), model.linear(), epsilon = 1e-6),
                None => {
                    regions.insert(path.pattern(), model);
                }
            }
        }

        assert_ge!(regions.len(), 2);
        assert_le!(regions.len(), 16);
    }

    #[test]
    pub fn test_batch_matches_single() {
        let mut rng = StdRng::seed_from_u64(3);
        let network = Network::<f32>::random(&[5, 6, 2], &mut rng).unwrap();
        let xs = samples(50, 5, &mut rng);

        let models = reduce_batch(&network, &xs).unwrap();

        assert_eq!(models.len(), 50);
        for (model, x) in models.iter().zip(xs.outer_iter()) {
            assert_eq!(model, &reduce(&network, &x).unwrap());
            assert_eq!(fidelity(&network, model, &x.insert_axis(ndarray::Axis(0))).unwrap(), 1.0);
        }
    }
}
