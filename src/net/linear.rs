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

//! Linear layers with a standing pruning mask

use log::trace;
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Axis, Data, Ix1, Zip};
use rand::distributions::uniform::SampleUniform;
use rand::Rng;

use crate::error::PathError;
use crate::linalg::affine::AffFuncG;
use crate::linalg::Scalar;

/// A fully connected layer f(x) = W @ x + b whose weights may be constrained by a pruning mask.
///
/// Once a slot of W is pruned it stays zero: every write goes through this
/// type and is masked before it is stored. Biases are never masked.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskedLinear<A> {
    func: AffFuncG<A>,
    /// ``true`` marks a pruned weight
    mask: Option<Array2<bool>>,
}

impl<A: Scalar> MaskedLinear<A> {
    pub fn new(func: AffFuncG<A>) -> MaskedLinear<A> {
        MaskedLinear { func, mask: None }
    }

    pub fn from_mats(mat: Array2<A>, bias: Array1<A>) -> MaskedLinear<A> {
        MaskedLinear::new(AffFuncG::from_mats(mat, bias))
    }

    /// Creates a layer with weights and bias drawn from U(-1/sqrt(indim), 1/sqrt(indim)),
    /// the default initialization of untrained linear layers.
    pub fn random<R: Rng>(indim: usize, outdim: usize, rng: &mut R) -> MaskedLinear<A>
    where
        A: SampleUniform,
    {
        assert!(indim > 0, "Linear layer requires at least one input");
        let bound = A::one() / A::from(indim).unwrap_or_else(A::one).sqrt();

        let mat = Array2::from_shape_fn((outdim, indim), |_| rng.gen_range(-bound..bound));
        let bias = Array1::from_shape_fn(outdim, |_| rng.gen_range(-bound..bound));

        MaskedLinear::from_mats(mat, bias)
    }

    #[inline]
    pub fn indim(&self) -> usize {
        self.func.indim()
    }

    #[inline]
    pub fn outdim(&self) -> usize {
        self.func.outdim()
    }

    /// Returns the affine function implemented by this layer (with pruned weights set to zero).
    #[inline]
    pub fn func(&self) -> &AffFuncG<A> {
        &self.func
    }

    #[inline]
    pub fn weights(&self) -> ArrayView2<'_, A> {
        self.func.matrix_view()
    }

    #[inline]
    pub fn bias(&self) -> ArrayView1<'_, A> {
        self.func.bias_view()
    }

    #[inline]
    pub fn mask(&self) -> Option<&Array2<bool>> {
        self.mask.as_ref()
    }

    pub fn is_pruned(&self, row: usize, col: usize) -> bool {
        self.mask.as_ref().is_some_and(|mask| mask[[row, col]])
    }

    /// Returns the inputs whose connections are pruned in every row.
    pub fn pruned_columns(&self) -> Vec<usize> {
        match &self.mask {
            None => Vec::new(),
            Some(mask) => mask
                .axis_iter(Axis(1))
                .enumerate()
                .filter(|(_, column)| column.iter().all(|&x| x))
                .map(|(idx, _)| idx)
                .collect(),
        }
    }

    /// Evaluates this layer under the given input.
    #[inline]
    pub fn apply<S: Data<Elem = A>>(&self, input: &ArrayBase<S, Ix1>) -> Array1<A> {
        self.func.apply(input)
    }

    /// Registers ``mask`` as a standing constraint on the weights of this layer.
    ///
    /// Masks accumulate: a slot pruned by an earlier mask stays pruned.
    pub fn apply_mask(&mut self, mask: Array2<bool>) -> Result<(), PathError> {
        PathError::check_dim(self.outdim(), mask.nrows())?;
        PathError::check_dim(self.indim(), mask.ncols())?;

        let combined = match self.mask.take() {
            None => mask,
            Some(mut current) => {
                Zip::from(&mut current)
                    .and(&mask)
                    .for_each(|old, &new| *old = *old || new);
                current
            }
        };
        self.mask = Some(combined);
        self.enforce_mask();
        Ok(())
    }

    /// Writes a single weight. Writes into a pruned slot store zero instead.
    ///
    /// Returns whether ``value`` was stored.
    pub fn set_weight(&mut self, row: usize, col: usize, value: A) -> bool {
        if self.is_pruned(row, col) {
            trace!("Rejected write to pruned weight ({}, {})", row, col);
            self.func.mat[[row, col]] = A::zero();
            false
        } else {
            self.func.mat[[row, col]] = value;
            true
        }
    }

    /// Replaces all weights. Pruned slots are zeroed.
    pub fn assign_weights(&mut self, weights: Array2<A>) -> Result<(), PathError> {
        PathError::check_dim(self.outdim(), weights.nrows())?;
        PathError::check_dim(self.indim(), weights.ncols())?;

        self.func.mat = weights;
        self.enforce_mask();
        Ok(())
    }

    /// Updates the weights in place, e.g., by an optimizer step.
    /// The mask is enforced again once ``update`` returns.
    pub fn update_weights<F>(&mut self, update: F)
    where
        F: FnOnce(&mut Array2<A>),
    {
        update(&mut self.func.mat);
        self.enforce_mask();
    }

    pub fn set_bias(&mut self, bias: Array1<A>) -> Result<(), PathError> {
        PathError::check_dim(self.outdim(), bias.len())?;
        self.func.bias = bias;
        Ok(())
    }

    fn enforce_mask(&mut self) {
        if let Some(mask) = &self.mask {
            Zip::from(&mut self.func.mat)
                .and(mask)
                .for_each(|w, &pruned| {
                    if pruned {
                        *w = A::zero();
                    }
                });
        }
    }
}

impl<A: Scalar> From<AffFuncG<A>> for MaskedLinear<A> {
    fn from(func: AffFuncG<A>) -> Self {
        MaskedLinear::new(func)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{arr1, arr2, Array2};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::aff;

    fn column_mask(rows: usize, cols: usize, pruned: &[usize]) -> Array2<bool> {
        Array2::from_shape_fn((rows, cols), |(_, col)| pruned.contains(&col))
    }

    #[test]
    pub fn test_apply_mask() {
        let mut layer = MaskedLinear::new(aff!([[1, 2, 3], [4, 5, 6]] + [1, 1]));
        layer.apply_mask(column_mask(2, 3, &[1])).unwrap();

        assert_eq!(layer.weights(), arr2(&[[1., 0., 3.], [4., 0., 6.]]));
        assert_eq!(layer.bias(), arr1(&[1., 1.]));
        assert_eq!(layer.pruned_columns(), vec![1]);
        assert!(layer.is_pruned(0, 1));
        assert!(!layer.is_pruned(0, 0));
    }

    #[test]
    pub fn test_apply_mask_accumulates() {
        let mut layer = MaskedLinear::new(aff!([[1, 2, 3], [4, 5, 6]] + [1, 1]));
        layer.apply_mask(column_mask(2, 3, &[1])).unwrap();
        layer.apply_mask(column_mask(2, 3, &[2])).unwrap();

        assert_eq!(layer.pruned_columns(), vec![1, 2]);
        assert_eq!(layer.weights(), arr2(&[[1., 0., 0.], [4., 0., 0.]]));
    }

    #[test]
    pub fn test_apply_mask_shape() {
        let mut layer = MaskedLinear::new(aff!([[1, 2, 3], [4, 5, 6]] + [1, 1]));

        assert!(matches!(
            layer.apply_mask(Array2::from_elem((3, 2), true)),
            Err(PathError::ShapeMismatch {
                expected: 2,
                got: 3
            })
        ));
        assert!(layer.mask().is_none());
    }

    #[test]
    pub fn test_set_weight() {
        let mut layer = MaskedLinear::new(aff!([[1, 2, 3], [4, 5, 6]] + [1, 1]));
        layer.apply_mask(column_mask(2, 3, &[0])).unwrap();

        assert!(!layer.set_weight(1, 0, 9.));
        assert!(layer.set_weight(1, 2, 9.));
        assert_eq!(layer.weights(), arr2(&[[0., 2., 3.], [0., 5., 9.]]));
    }

    #[test]
    pub fn test_assign_weights() {
        let mut layer = MaskedLinear::new(aff!([[1, 2, 3], [4, 5, 6]] + [1, 1]));
        layer.apply_mask(column_mask(2, 3, &[2])).unwrap();

        layer.assign_weights(Array2::ones((2, 3))).unwrap();
        assert_eq!(layer.weights(), arr2(&[[1., 1., 0.], [1., 1., 0.]]));

        assert!(layer.assign_weights(Array2::ones((3, 3))).is_err());
    }

    #[test]
    pub fn test_update_weights() {
        let mut layer = MaskedLinear::new(aff!([[1, 2, 3], [4, 5, 6]] + [1, 1]));
        layer.apply_mask(column_mask(2, 3, &[0, 2])).unwrap();

        // a gradient step touches every weight, pruned ones included
        layer.update_weights(|w| w.mapv_inplace(|x| x - 0.5));

        assert_eq!(layer.weights(), arr2(&[[0., 1.5, 0.], [0., 4.5, 0.]]));
    }

    #[test]
    pub fn test_set_bias() {
        let mut layer = MaskedLinear::new(aff!([[1, 2, 3], [4, 5, 6]] + [1, 1]));
        layer.apply_mask(column_mask(2, 3, &[0, 1, 2])).unwrap();

        layer.set_bias(arr1(&[-1., 2.])).unwrap();
        assert_eq!(layer.bias(), arr1(&[-1., 2.]));
        assert!(layer.set_bias(arr1(&[0.])).is_err());
    }

    #[test]
    pub fn test_random() {
        let mut rng = StdRng::seed_from_u64(42);
        let layer = MaskedLinear::<f32>::random(16, 4, &mut rng);

        assert_eq!(layer.indim(), 16);
        assert_eq!(layer.outdim(), 4);
        assert!(layer.weights().iter().all(|x| x.abs() <= 0.25));
        assert!(layer.bias().iter().all(|x| x.abs() <= 0.25));

        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(layer, MaskedLinear::<f32>::random(16, 4, &mut rng));
    }
}
