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

//! Representation of trained ReLU classifiers

use ndarray::{Array1, ArrayView1};

use crate::error::PathError;
use crate::linalg::Scalar;

pub mod io;
pub mod layer;
pub mod linear;
pub mod network;

/// Forward evaluation of a binary (multi-label) classifier.
///
/// This is the interface shared by full networks and their reductions,
/// so that explanation and scoring code can treat both alike.
pub trait Evaluate<A: Scalar> {
    fn indim(&self) -> usize;

    fn outdim(&self) -> usize;

    /// Returns the probability of each output class for ``input``.
    fn evaluate(&self, input: ArrayView1<A>) -> Result<Array1<A>, PathError>;

    /// Returns for each output class whether its probability exceeds 0.5.
    fn predict(&self, input: ArrayView1<A>) -> Result<Array1<bool>, PathError> {
        let half = A::one() / (A::one() + A::one());
        Ok(self.evaluate(input)?.mapv(|p| p > half))
    }
}
