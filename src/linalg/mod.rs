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

//! Dense affine functions and the element-wise activations between them

use std::fmt::{Debug, Display};
use std::iter::Sum;

use ndarray::{LinalgScalar, ScalarOperand};
use num_traits::Float;

pub mod activation;
pub mod affine;
pub mod format;

/// Floating point element type of weights, biases, and samples.
///
/// Implemented for `f32` and `f64`. All computations keep the width of
/// the network's parameters.
pub trait Scalar:
    Float + LinalgScalar + ScalarOperand + Sum + Debug + Display + Send + Sync + 'static
{
}

impl<T> Scalar for T where
    T: Float + LinalgScalar + ScalarOperand + Sum + Debug + Display + Send + Sync + 'static
{
}
