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

//! Agreement between a network and a surrogate model

use average::{Estimate, Max, Mean};
use log::debug;
use ndarray::{ArrayBase, Axis, Data, Ix1, Ix2};

use crate::error::PathError;
use crate::linalg::Scalar;
use crate::net::network::Network;
use crate::net::Evaluate;
use crate::reduce::reduce;

fn check_models<A, R, C>(reference: &R, candidate: &C, indim: usize) -> Result<(), PathError>
where
    A: Scalar,
    R: Evaluate<A> + ?Sized,
    C: Evaluate<A> + ?Sized,
{
    PathError::check_dim(reference.indim(), indim)?;
    PathError::check_dim(reference.indim(), candidate.indim())?;
    PathError::check_dim(reference.outdim(), candidate.outdim())
}

/// Fraction of ``samples`` (rows) on which both models predict the same label for every output.
///
/// An empty sample set has fidelity 1.
pub fn fidelity<A, R, C, S>(reference: &R, candidate: &C, samples: &ArrayBase<S, Ix2>) -> Result<f64, PathError>
where
    A: Scalar,
    R: Evaluate<A> + ?Sized,
    C: Evaluate<A> + ?Sized,
    S: Data<Elem = A>,
{
    check_models(reference, candidate, samples.ncols())?;

    if samples.nrows() == 0 {
        return Ok(1.0);
    }

    let mut agreement = Mean::new();
    for sample in samples.axis_iter(Axis(0)) {
        let agree = reference.predict(sample)? == candidate.predict(sample)?;
        agreement.add(if agree { 1.0 } else { 0.0 });
    }

    debug!("Fidelity {:.4} over {} samples", agreement.mean(), samples.nrows());
    Ok(agreement.mean())
}

/// Largest absolute difference between the outputs of both models over ``samples``.
///
/// An empty sample set has deviation 0.
pub fn max_deviation<A, R, C, S>(reference: &R, candidate: &C, samples: &ArrayBase<S, Ix2>) -> Result<f64, PathError>
where
    A: Scalar,
    R: Evaluate<A> + ?Sized,
    C: Evaluate<A> + ?Sized,
    S: Data<Elem = A>,
{
    check_models(reference, candidate, samples.ncols())?;

    if samples.nrows() == 0 {
        return Ok(0.0);
    }

    let mut deviation = Max::new();
    for sample in samples.axis_iter(Axis(0)) {
        let diff = reference.evaluate(sample)? - candidate.evaluate(sample)?;
        for x in diff.iter() {
            deviation.add(x.abs().to_f64().unwrap_or(f64::NAN));
        }
    }

    Ok(deviation.max().max(0.0))
}

/// Reduces ``network`` at ``sample`` and returns the largest output difference
/// between the network and its reduction at that sample.
pub fn local_fidelity<A, S>(network: &Network<A>, sample: &ArrayBase<S, Ix1>) -> Result<f64, PathError>
where
    A: Scalar,
    S: Data<Elem = A>,
{
    let model = reduce(network, sample)?;
    let diff = network.evaluate(sample)? - model.evaluate(sample)?;

    Ok(diff
        .iter()
        .map(|x| x.abs().to_f64().unwrap_or(f64::NAN))
        .fold(0.0, f64::max))
}

#[cfg(test)]
mod tests {
    use assertables::*;
    use ndarray::{arr1, arr2, Array2};

    use super::*;
    use crate::aff;
    use crate::reduce::ReducedModel;

    fn two_layer() -> Network {
        Network::from_funcs([
            aff!([[1, 0, 1, 0], [-1, 0, 0, 0], [0.5, 1, 0, 1]] + [0, 0, 0]),
            aff!([[1, 1, 1]] + [-1]),
        ])
        .unwrap()
    }

    #[test]
    pub fn test_fidelity_self() {
        let network = two_layer();
        let samples = arr2(&[[1., 0., 1., 0.], [-3., 0., 0., 0.], [0., 0., 0., 0.]]);

        assert_eq!(fidelity(&network, &network, &samples).unwrap(), 1.0);
        assert_eq!(max_deviation(&network, &network, &samples).unwrap(), 0.0);
    }

    #[test]
    pub fn test_fidelity_reduced() {
        let network = two_layer();
        let model = reduce(&network, &arr1(&[1., 0., 1., 0.])).unwrap();
        // network: logits 1.5, 2, -1 / reduced: logits 1.5, -5.5, -1
        let samples = arr2(&[[1., 0., 1., 0.], [-3., 0., 0., 0.], [0., 0., 0., 0.]]);

        let fid = fidelity(&network, &model, &samples).unwrap();
        assert_in_delta!(fid, 2.0 / 3.0, 1e-9);

        let dev = max_deviation(&network, &model, &samples).unwrap();
        assert_gt!(dev, 0.5);
        assert_le!(dev, 1.0);
    }

    #[test]
    pub fn test_fidelity_empty() {
        let network = two_layer();
        let samples = Array2::<f32>::zeros((0, 4));

        assert_eq!(fidelity(&network, &network, &samples).unwrap(), 1.0);
        assert_eq!(max_deviation(&network, &network, &samples).unwrap(), 0.0);
    }

    #[test]
    pub fn test_fidelity_shape() {
        let network = two_layer();
        let other = ReducedModel::new(aff!([[1, 1]] + [0]));

        assert!(matches!(
            fidelity(&network, &network, &arr2(&[[1f32, 0.]])),
            Err(PathError::ShapeMismatch {
                expected: 4,
                got: 2
            })
        ));
        assert!(matches!(
            max_deviation(&network, &other, &Array2::<f32>::zeros((1, 4))),
            Err(PathError::ShapeMismatch { .. })
        ));
    }

    #[test]
    pub fn test_local_fidelity() {
        let network = two_layer();

        for x in [[1., 0., 1., 0.], [-3., 0., 0., 0.], [0.2, -1., 4., 0.5]] {
            assert_lt!(local_fidelity(&network, &arr1(&x)).unwrap(), 1e-5);
        }
    }

    #[test]
    pub fn test_dyn_evaluate() {
        let network = two_layer();
        let model = reduce(&network, &arr1(&[1., 0., 1., 0.])).unwrap();
        let models: Vec<&dyn Evaluate<f32>> = vec![&network, &model];
        let samples = arr2(&[[1., 0., 1., 0.]]);

        for candidate in models {
            assert_eq!(fidelity(&network, candidate, &samples).unwrap(), 1.0);
        }
    }
}
