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

//! Input pruning of the first linear layer
//!
//! Each input feature is scored by the Euclidean norm of its column in the
//! weight matrix of the first layer. Features whose norm is small relative to
//! the strongest feature are disconnected from the network for good: the mask
//! is registered on the layer and every later weight write respects it.

use float_ord::FloatOrd;
use log::{debug, warn};
use ndarray::Array2;

use crate::error::PathError;
use crate::linalg::affine::AffFuncG;
use crate::linalg::Scalar;
use crate::net::network::Network;

/// Relative column norm below which an input is pruned.
pub const PRUNE_THRESHOLD: f64 = 0.5;

/// The inputs selected for pruning together with the corresponding weight mask.
#[derive(Clone, Debug, PartialEq)]
pub struct PruneMask {
    columns: Vec<usize>,
    /// ``true`` marks a pruned weight
    mask: Array2<bool>,
}

impl PruneMask {
    /// Indices of the pruned inputs in ascending order.
    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    pub fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    pub fn into_mask(self) -> Array2<bool> {
        self.mask
    }

    /// Returns true if no input is pruned.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightPruner {
    threshold: f64,
}

impl Default for WeightPruner {
    fn default() -> Self {
        WeightPruner {
            threshold: PRUNE_THRESHOLD,
        }
    }
}

impl WeightPruner {
    pub fn new() -> WeightPruner {
        WeightPruner::default()
    }

    /// Creates a pruner that removes inputs whose column norm is below
    /// ``threshold`` times the largest column norm.
    pub fn with_threshold(threshold: f64) -> WeightPruner {
        assert!(
            threshold > 0.0 && threshold <= 1.0,
            "Pruning threshold must lie in (0, 1], got {}",
            threshold
        );
        WeightPruner { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Computes which inputs of ``func`` to prune without modifying it.
    ///
    /// If every column is zero there is no scale to compare against and nothing is pruned.
    pub fn column_mask<A: Scalar>(&self, func: &AffFuncG<A>) -> PruneMask {
        let norms = func.column_norms();
        let w_max = norms
            .iter()
            .copied()
            .max_by_key(|x| FloatOrd(x.to_f64().unwrap_or(f64::NAN)))
            .unwrap_or_else(A::zero);

        debug!("Column norms of first layer: {} (max {})", norms, w_max);

        let columns: Vec<usize> = if w_max > A::zero() {
            let threshold = A::from(self.threshold).unwrap_or_else(A::zero);
            norms
                .iter()
                .enumerate()
                .filter(|(_, &norm)| norm / w_max < threshold)
                .map(|(idx, _)| idx)
                .collect()
        } else {
            warn!("First layer has no non-zero weight, skipping pruning");
            Vec::new()
        };

        let mask = Array2::from_shape_fn((func.outdim(), func.indim()), |(_, col)| {
            columns.contains(&col)
        });

        PruneMask { columns, mask }
    }

    /// Prunes the inputs of the first linear layer of ``network``.
    ///
    /// Later layers are left untouched. Norms are computed on the current
    /// (already masked) weights, so pruning twice yields the same mask.
    pub fn prune<A: Scalar>(&self, network: &mut Network<A>) -> Result<PruneMask, PathError> {
        let first = network.first_mut();
        let mask = self.column_mask(first.func());

        debug!(
            "Pruning {} of {} inputs: {:?}",
            mask.columns().len(),
            first.indim(),
            mask.columns()
        );

        first.apply_mask(mask.mask().clone())?;
        Ok(mask)
    }
}

/// Prunes the inputs of ``network`` with the default threshold and returns the pruned network.
pub fn prune_features<A: Scalar>(mut network: Network<A>) -> Result<Network<A>, PathError> {
    WeightPruner::default().prune(&mut network)?;
    Ok(network)
}
