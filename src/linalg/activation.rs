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

//! Element-wise activation functions

use ndarray::{Array1, ArrayBase, Data, Ix1};

use super::Scalar;

/// Applies the rectifier max(0, x) to each component.
pub fn relu<A: Scalar, S: Data<Elem = A>>(input: &ArrayBase<S, Ix1>) -> Array1<A> {
    input.map(|&x| x.max(A::zero()))
}

/// Applies the logistic function 1 / (1 + e^-x) to each component.
///
/// Large negative inputs are evaluated as e^x / (1 + e^x) to avoid overflow.
pub fn sigmoid<A: Scalar, S: Data<Elem = A>>(input: &ArrayBase<S, Ix1>) -> Array1<A> {
    input.map(|&x| {
        if x >= A::zero() {
            A::one() / (A::one() + (-x).exp())
        } else {
            let e = x.exp();
            e / (A::one() + e)
        }
    })
}

/// Marks the units of a pre-activation vector that pass a ReLU (h > 0).
pub fn active_units<A: Scalar, S: Data<Elem = A>>(pre_activation: &ArrayBase<S, Ix1>) -> Array1<bool> {
    pre_activation.map(|&x| x > A::zero())
}
