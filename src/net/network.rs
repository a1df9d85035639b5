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

//! Feed-forward ReLU classifiers

use std::borrow::Borrow;
use std::fmt::Display;

use itertools::Itertools;
use ndarray::{Array1, ArrayBase, ArrayView1, Data, Ix1};
use rand::distributions::uniform::SampleUniform;
use rand::Rng;

use super::layer::Layer;
use super::linear::MaskedLinear;
use super::Evaluate;
use crate::error::PathError;
use crate::linalg::activation::{relu, sigmoid};
use crate::linalg::affine::AffFuncG;
use crate::linalg::Scalar;

/// A stack of linear layers with a ReLU between each two consecutive layers
/// and a sigmoid after the last one.
///
/// The activations are structural: they are implied by the position of a
/// layer and not stored. A network always holds at least one linear layer,
/// and the output dimension of each layer equals the input dimension of its successor.
#[derive(Clone, Debug, PartialEq)]
pub struct Network<A = f32> {
    layers: Vec<MaskedLinear<A>>,
}

impl<A: Scalar> Network<A> {
    pub fn new(layers: Vec<MaskedLinear<A>>) -> Result<Network<A>, PathError> {
        if layers.is_empty() {
            return Err(PathError::EmptyNetwork);
        }
        for (prev, next) in layers.iter().tuple_windows() {
            PathError::check_dim(prev.outdim(), next.indim())?;
        }
        Ok(Network { layers })
    }

    /// Creates a network from plain affine functions (one per linear layer).
    pub fn from_funcs<I>(funcs: I) -> Result<Network<A>, PathError>
    where
        I: IntoIterator<Item = AffFuncG<A>>,
    {
        Network::new(funcs.into_iter().map(MaskedLinear::new).collect())
    }

    /// Creates a network from a raw sequence of layers.
    ///
    /// The sequence must have the form ``Linear (ReLU Linear)* [Sigmoid]``.
    /// Any other layer, two linear layers in a row, or a ReLU at either end of the
    /// sequence is reported as [`PathError::UnsupportedTopology`].
    pub fn from_layers<I>(layers: I) -> Result<Network<A>, PathError>
    where
        I: IntoIterator,
        I::Item: Borrow<Layer<A>>,
    {
        let mut linears = Vec::new();
        let mut expect_linear = true;
        let mut finished = false;
        let mut last_position = 0;

        for (position, item) in layers.into_iter().enumerate() {
            let layer = item.borrow();
            last_position = position;

            let unsupported = || PathError::UnsupportedTopology {
                position,
                layer: layer.to_string(),
            };

            if finished {
                return Err(unsupported());
            }

            match layer {
                Layer::Linear(aff) if expect_linear => {
                    linears.push(MaskedLinear::new(aff.clone()));
                    expect_linear = false;
                }
                Layer::ReLU if !expect_linear => expect_linear = true,
                Layer::Sigmoid if !expect_linear => finished = true,
                _ => return Err(unsupported()),
            }
        }

        if linears.is_empty() {
            return Err(PathError::EmptyNetwork);
        }
        if expect_linear {
            return Err(PathError::UnsupportedTopology {
                position: last_position,
                layer: Layer::<A>::ReLU.to_string(),
            });
        }

        Network::new(linears)
    }

    /// Creates an untrained network whose layer sizes are given by ``dims``
    /// (input dimension first, output dimension last).
    pub fn random<R: Rng>(dims: &[usize], rng: &mut R) -> Result<Network<A>, PathError>
    where
        A: SampleUniform,
    {
        let layers = dims
            .iter()
            .tuple_windows()
            .map(|(&indim, &outdim)| MaskedLinear::random(indim, outdim, rng))
            .collect();
        Network::new(layers)
    }

    /// Returns the layer sequence of this network including its activations.
    pub fn to_layers(&self) -> Vec<Layer<A>> {
        let mut layers = Vec::with_capacity(2 * self.layers.len());
        for (pos, layer) in self.layers.iter().with_position() {
            layers.push(Layer::Linear(layer.func().clone()));
            match pos {
                itertools::Position::First | itertools::Position::Middle => layers.push(Layer::ReLU),
                itertools::Position::Last | itertools::Position::Only => {
                    layers.push(Layer::Sigmoid)
                }
            }
        }
        layers
    }

    /// Returns the dimension of the input space.
    pub fn indim(&self) -> usize {
        self.layers[0].indim()
    }

    /// Returns the number of outputs (classes).
    pub fn outdim(&self) -> usize {
        self.layers[self.layers.len() - 1].outdim()
    }

    /// Returns the number of linear layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always false: a network holds at least one linear layer.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn layers(&self) -> &[MaskedLinear<A>] {
        &self.layers
    }

    /// Mutable access to the layers. Shapes cannot change through [`MaskedLinear`].
    pub fn layers_mut(&mut self) -> impl Iterator<Item = &mut MaskedLinear<A>> {
        self.layers.iter_mut()
    }

    pub fn first_mut(&mut self) -> &mut MaskedLinear<A> {
        &mut self.layers[0]
    }

    /// Computes the output of the last linear layer (before the sigmoid).
    pub fn logits<S: Data<Elem = A>>(&self, input: &ArrayBase<S, Ix1>) -> Result<Array1<A>, PathError> {
        PathError::check_dim(self.indim(), input.len())?;

        let (last, hidden) = self
            .layers
            .split_last()
            .ok_or(PathError::EmptyNetwork)?;

        let mut val = input.to_owned();
        for layer in hidden {
            val = relu(&layer.apply(&val));
        }
        Ok(last.apply(&val))
    }

    /// Evaluates the network, i.e., computes the class probabilities of ``input``.
    pub fn evaluate<S: Data<Elem = A>>(&self, input: &ArrayBase<S, Ix1>) -> Result<Array1<A>, PathError> {
        Ok(sigmoid(&self.logits(input)?))
    }
}

impl<A: Scalar> Evaluate<A> for Network<A> {
    fn indim(&self) -> usize {
        Network::indim(self)
    }

    fn outdim(&self) -> usize {
        Network::outdim(self)
    }

    fn evaluate(&self, input: ArrayView1<A>) -> Result<Array1<A>, PathError> {
        Network::evaluate(self, &input)
    }
}

impl<A: Scalar> Display for Network<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:<30}   {:>6}   {:>16}", "Layer", "Pruned", "Shape")?;
        writeln!(f, "{:=<30}==={:=>6}==={:=>16}", "=", "=", "=")?;

        for (pos, layer) in self.layers.iter().with_position() {
            let descr = format!("Linear ({}x{})", layer.indim(), layer.outdim());
            let pruned = layer.pruned_columns().len();
            let shape = format!("[{}]", layer.outdim());
            writeln!(f, "{:<30}   {:>6}   {:>16}", descr, pruned, shape)?;

            let activation = match pos {
                itertools::Position::First | itertools::Position::Middle => "ReLU",
                itertools::Position::Last | itertools::Position::Only => "Sigmoid",
            };
            writeln!(f, "{:<30}   {:>6}   {:>16}", activation, "", shape)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::{arr1, Array1, Array2};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::aff;

    fn two_layer() -> Network {
        Network::from_funcs([
            aff!([[1, 0, 1, 0], [-1, 0, 0, 0], [0.5, 1, 0, 1]] + [0, 0, 0]),
            aff!([[1, 1, 1]] + [-1]),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_empty() {
        assert!(matches!(
            Network::<f32>::new(Vec::new()),
            Err(PathError::EmptyNetwork)
        ));
    }

    #[test]
    fn test_new_shape_error() {
        let res = Network::from_funcs([AffFuncG::<f32>::zeros(3, 4), AffFuncG::zeros(1, 2)]);

        assert!(matches!(
            res,
            Err(PathError::ShapeMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn test_dims() {
        let net = two_layer();

        assert_eq!(net.indim(), 4);
        assert_eq!(net.outdim(), 1);
        assert_eq!(net.len(), 2);
        assert!(!net.is_empty());
    }

    #[test]
    fn test_logits() {
        let net = two_layer();

        // hidden pre-activation [2, -1, 0.5] -> relu [2, 0, 0.5]
        assert_relative_eq!(net.logits(&arr1(&[1., 0., 1., 0.])).unwrap(), arr1(&[1.5]));
    }

    #[test]
    fn test_evaluate() {
        let net = two_layer();

        assert_relative_eq!(
            net.evaluate(&arr1(&[1., 0., 1., 0.])).unwrap(),
            arr1(&[1.0 / (1.0 + (-1.5f32).exp())]),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_evaluate_shape() {
        let net = two_layer();

        assert!(matches!(
            net.evaluate(&arr1(&[1., 0., 1.])),
            Err(PathError::ShapeMismatch {
                expected: 4,
                got: 3
            })
        ));
    }

    #[test]
    fn test_from_layers() {
        let layers = vec![
            Layer::Linear(aff!([[1, 2], [3, 4]] + [0, 0])),
            Layer::ReLU,
            Layer::Linear(aff!([[1, -1]] + [0])),
            Layer::Sigmoid,
        ];
        let net = Network::from_layers(&layers).unwrap();

        assert_eq!(net.len(), 2);
        assert_eq!(net.to_layers(), layers);
    }

    #[test]
    fn test_from_layers_without_sigmoid() {
        let layers = vec![Layer::Linear(aff!([[1, 2], [3, 4]] + [0, 0]))];
        let net = Network::from_layers(layers).unwrap();

        assert_eq!(net.len(), 1);
    }

    #[test]
    fn test_from_layers_unsupported_activation() {
        let layers = vec![
            Layer::Linear(aff!([[1, 2], [3, 4]] + [0, 0])),
            Layer::HardTanh,
            Layer::Linear(aff!([[1, -1]] + [0])),
        ];

        match Network::from_layers(layers) {
            Err(PathError::UnsupportedTopology { position, layer }) => {
                assert_eq!(position, 1);
                assert_eq!(layer, "HardTanh");
            }
            other => panic!("Expected unsupported topology, got {:?}", other),
        }
    }

    #[test]
    fn test_from_layers_consecutive_linear() {
        let layers = vec![
            Layer::Linear(aff!([[1, 2], [3, 4]] + [0, 0])),
            Layer::Linear(aff!([[1, -1]] + [0])),
        ];

        assert!(matches!(
            Network::from_layers(layers),
            Err(PathError::UnsupportedTopology { position: 1, .. })
        ));
    }

    #[test]
    fn test_from_layers_trailing_relu() {
        let layers = vec![Layer::Linear(aff!([[1, 2], [3, 4]] + [0, 0])), Layer::ReLU];

        assert!(matches!(
            Network::from_layers(layers),
            Err(PathError::UnsupportedTopology { position: 1, .. })
        ));
    }

    #[test]
    fn test_from_layers_after_sigmoid() {
        let layers = vec![
            Layer::Linear(aff!([[1, 2], [3, 4]] + [0, 0])),
            Layer::Sigmoid,
            Layer::ReLU,
        ];

        assert!(matches!(
            Network::from_layers(layers),
            Err(PathError::UnsupportedTopology { position: 2, .. })
        ));
    }

    #[test]
    fn test_from_layers_empty() {
        assert!(matches!(
            Network::<f32>::from_layers(Vec::<Layer>::new()),
            Err(PathError::EmptyNetwork)
        ));
    }

    #[test]
    fn test_random() {
        let mut rng = StdRng::seed_from_u64(7);
        let net = Network::<f64>::random(&[5, 8, 8, 3], &mut rng).unwrap();

        assert_eq!(net.len(), 3);
        assert_eq!(net.indim(), 5);
        assert_eq!(net.outdim(), 3);

        let out = net.evaluate(&Array1::ones(5)).unwrap();
        assert!(out.iter().all(|&p| p > 0.0 && p < 1.0));
    }

    #[test]
    fn test_random_too_short() {
        let mut rng = StdRng::seed_from_u64(7);

        assert!(matches!(
            Network::<f32>::random(&[5], &mut rng),
            Err(PathError::EmptyNetwork)
        ));
    }

    #[test]
    fn test_display() {
        let mut net = two_layer();
        net.first_mut()
            .apply_mask(Array2::from_shape_fn((3, 4), |(_, col)| col == 3))
            .unwrap();

        let table = net.to_string();
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 6);
        assert!(lines[2].starts_with("Linear (4x3)"));
        assert!(lines[2].contains(" 1 "));
        assert!(lines[3].starts_with("ReLU"));
        assert!(lines[5].starts_with("Sigmoid"));
    }
}
