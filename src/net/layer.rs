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

use std::fmt::Display;

use crate::linalg::affine::AffFuncG;
use crate::linalg::Scalar;

/// A simple enum type to conveniently specify the layer structure of a neural network
/// as it is exported by a training framework.
///
/// Only the stack ``Linear (ReLU Linear)* [Sigmoid]`` can be turned into a
/// [`Network`](super::network::Network); the remaining variants exist so that
/// other architectures are rejected with a proper error instead of being misread.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer<A = f32> {
    /// A fully connected linear layer
    Linear(AffFuncG<A>),
    /// The ReLU applied to every component of the input
    ReLU,
    /// The logistic function applied to every component of the input
    Sigmoid,
    /// The leaky ReLU with the given negative slope
    LeakyReLU(A),
    /// The hard hyperbolic tangent
    HardTanh,
    /// The hard sigmoid
    HardSigmoid,
    /// The argmax function
    Argmax,
}

impl<A: Scalar> Display for Layer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layer::Linear(aff) => write!(f, "Linear ({}x{})", aff.indim(), aff.outdim()),
            Layer::ReLU => write!(f, "ReLU"),
            Layer::Sigmoid => write!(f, "Sigmoid"),
            Layer::LeakyReLU(alpha) => write!(f, "LeakyReLU (alpha={})", alpha),
            Layer::HardTanh => write!(f, "HardTanh"),
            Layer::HardSigmoid => write!(f, "HardSigmoid"),
            Layer::Argmax => write!(f, "Argmax"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aff;

    #[test]
    fn test_display() {
        let layer = Layer::Linear(aff!([[1, 2, 3], [4, 5, 6]] + [0, 0]));

        assert_eq!(layer.to_string(), "Linear (3x2)");
        assert_eq!(Layer::<f32>::ReLU.to_string(), "ReLU");
        assert_eq!(Layer::LeakyReLU(0.5f32).to_string(), "LeakyReLU (alpha=0.5)");
    }
}
