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

use float_ord::FloatOrd;
use ndarray::{Array1, ArrayBase, ArrayView1, ArrayView2, Axis, Data, Ix1};

use crate::error::PathError;
use crate::linalg::activation::sigmoid;
use crate::linalg::affine::AffFuncG;
use crate::linalg::format::FormatOptions;
use crate::linalg::Scalar;
use crate::net::Evaluate;

/// A single linear layer followed by a sigmoid that reproduces a network
/// on the linear region of one sample.
#[derive(Clone, Debug, PartialEq)]
pub struct ReducedModel<A = f32> {
    linear: AffFuncG<A>,
}

impl<A: Scalar> ReducedModel<A> {
    pub fn new(linear: AffFuncG<A>) -> ReducedModel<A> {
        ReducedModel { linear }
    }

    /// The collapsed affine map of the firing path.
    #[inline]
    pub fn linear(&self) -> &AffFuncG<A> {
        &self.linear
    }

    pub fn into_linear(self) -> AffFuncG<A> {
        self.linear
    }

    #[inline]
    pub fn indim(&self) -> usize {
        self.linear.indim()
    }

    #[inline]
    pub fn outdim(&self) -> usize {
        self.linear.outdim()
    }

    #[inline]
    pub fn weights(&self) -> ArrayView2<'_, A> {
        self.linear.matrix_view()
    }

    #[inline]
    pub fn bias(&self) -> ArrayView1<'_, A> {
        self.linear.bias_view()
    }

    pub fn logits<S: Data<Elem = A>>(&self, input: &ArrayBase<S, Ix1>) -> Result<Array1<A>, PathError> {
        PathError::check_dim(self.indim(), input.len())?;
        Ok(self.linear.apply(input))
    }

    pub fn evaluate<S: Data<Elem = A>>(&self, input: &ArrayBase<S, Ix1>) -> Result<Array1<A>, PathError> {
        Ok(sigmoid(&self.logits(input)?))
    }

    /// Returns the inputs with a non-zero weight for at least one output.
    pub fn support(&self) -> Vec<usize> {
        self.linear
            .mat
            .axis_iter(Axis(1))
            .enumerate()
            .filter(|(_, column)| column.iter().any(|&x| x != A::zero()))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Returns the inputs that influence ``output``, strongest absolute weight first.
    ///
    /// Inputs with a zero weight (pruned inputs, or inputs only reaching
    /// inactive units) are omitted. Ties keep the order of the inputs.
    pub fn relevant_features(&self, output: usize) -> Vec<usize> {
        assert!(
            output < self.outdim(),
            "Output {} out of range for model with {} outputs",
            output,
            self.outdim()
        );

        let row = self.linear.mat.row(output);
        let mut features = self.linear.row_support(output);
        features.sort_by_key(|&idx| std::cmp::Reverse(FloatOrd(row[idx].abs().to_f64().unwrap_or(0.0))));
        features
    }
}

impl<A: Scalar> ReducedModel<A> {
    /// Renders the logit of each output as a sum of named features, strongest first.
    pub fn explain<I, N>(&self, feature_names: I) -> String
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let options = FormatOptions::explanation().with_feature_names(feature_names);
        self.linear.display_with(options).to_string()
    }
}

impl<A: Scalar> Evaluate<A> for ReducedModel<A> {
    fn indim(&self) -> usize {
        ReducedModel::indim(self)
    }

    fn outdim(&self) -> usize {
        ReducedModel::outdim(self)
    }

    fn evaluate(&self, input: ArrayView1<A>) -> Result<Array1<A>, PathError> {
        ReducedModel::evaluate(self, &input)
    }
}

impl<A: Scalar> Display for ReducedModel<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Linear ({}x{}) → Sigmoid", self.indim(), self.outdim())?;
        write!(f, "{}", self.linear)
    }
}
