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

use itertools::Itertools;
use ndarray::{Array1, ArrayBase, ArrayView1, Data, Ix1};

use crate::error::PathError;
use crate::linalg::activation::{active_units, relu};
use crate::linalg::Scalar;
use crate::net::network::Network;

/// The state of one linear layer during the forward pass of a sample.
#[derive(Clone, Debug, PartialEq)]
pub struct PathStep<A> {
    /// Output of the linear layer, before any activation
    pub pre_activation: Array1<A>,
    /// Units with a strictly positive pre-activation
    pub active: Array1<bool>,
}

/// The firing path of a sample: the pre-activations and active ReLU units of
/// every layer as the sample passes through a network.
#[derive(Clone, Debug, PartialEq)]
pub struct FiringPath<A> {
    steps: Vec<PathStep<A>>,
}

impl<A: Scalar> FiringPath<A> {
    /// Replays the forward pass of ``sample`` through ``network`` and records each layer.
    ///
    /// The input of each layer is the true ReLU output of its predecessor.
    pub fn trace<S: Data<Elem = A>>(
        network: &Network<A>,
        sample: &ArrayBase<S, Ix1>,
    ) -> Result<FiringPath<A>, PathError> {
        PathError::check_dim(network.indim(), sample.len())?;

        let mut steps = Vec::with_capacity(network.len());
        let mut current = sample.to_owned();

        for layer in network.layers() {
            let pre_activation = layer.apply(&current);
            let active = active_units(&pre_activation);
            current = relu(&pre_activation);
            steps.push(PathStep {
                pre_activation,
                active,
            });
        }

        Ok(FiringPath { steps })
    }

    pub fn steps(&self) -> &[PathStep<A>] {
        &self.steps
    }

    /// Number of recorded layers.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The steps of all layers followed by a ReLU, i.e., all but the last.
    pub fn hidden(&self) -> &[PathStep<A>] {
        match self.steps.split_last() {
            Some((_, hidden)) => hidden,
            None => &[],
        }
    }

    /// Output of the last layer before the sigmoid.
    pub fn logits(&self) -> Option<ArrayView1<'_, A>> {
        self.steps.last().map(|step| step.pre_activation.view())
    }

    /// Returns true if both paths activate exactly the same hidden units.
    ///
    /// Samples on the same path share one linear region of the network and
    /// therefore the same reduced model.
    pub fn same_region(&self, other: &FiringPath<A>) -> bool {
        self.hidden().len() == other.hidden().len()
            && self
                .hidden()
                .iter()
                .zip(other.hidden())
                .all(|(lhs, rhs)| lhs.active == rhs.active)
    }

    /// Number of active hidden units.
    pub fn n_active(&self) -> usize {
        self.hidden()
            .iter()
            .map(|step| step.active.iter().filter(|&&a| a).count())
            .sum()
    }

    /// Renders the hidden activation pattern, one group per layer, e.g. ``101|01``.
    pub fn pattern(&self) -> String {
        self.hidden()
            .iter()
            .map(|step| {
                step.active
                    .iter()
                    .map(|&a| if a { '1' } else { '0' })
                    .collect::<String>()
            })
            .join("|")
    }
}
