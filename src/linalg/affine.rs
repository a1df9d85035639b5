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

//! Struct to store affine functions

use approx::{AbsDiffEq, RelativeEq};
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Axis, Data, Ix1};

use super::Scalar;

/// An affine function f(x) = mat @ x + bias.
#[derive(Clone, Debug, PartialEq)]
pub struct AffFuncG<A> {
    pub mat: Array2<A>,
    pub bias: Array1<A>,
}

/// Affine function over single precision floats, the native width of most trained networks.
pub type AffFunc = AffFuncG<f32>;
pub type AffFunc64 = AffFuncG<f64>;

/// # Constructors
impl<A: Scalar> AffFuncG<A> {
    /// Create a new instance of an affine function consisting of a matrix mat: R^{m x n} and a vector bias: R^m.
    ///
    /// When interpreted as a function, it is equivalent to f(x) = mat @ x + bias.
    #[inline(always)]
    pub fn from_mats(mat: Array2<A>, bias: Array1<A>) -> AffFuncG<A> {
        assert_eq!(
            mat.len_of(Axis(0)),
            bias.len_of(Axis(0)),
            "Dimensions mismatch of matrix and bias: {} x {} and {}",
            mat.len_of(Axis(0)),
            mat.len_of(Axis(1)),
            bias.len_of(Axis(0))
        );
        debug_assert!(
            mat.iter().all(|x| x.is_finite()),
            "Non-finite floats are not supported"
        );
        debug_assert!(
            bias.iter().all(|x| x.is_finite()),
            "Non-finite floats are not supported"
        );

        AffFuncG { mat, bias }
    }

    /// Creates an affine function that implements the identity function f(x)=x.
    #[inline(always)]
    #[rustfmt::skip]
    pub fn identity(dim: usize) -> AffFuncG<A> {
        AffFuncG::from_mats(
            Array2::eye(dim),
            Array1::zeros(dim)
        )
    }

    /// Creates the function R^indim -> R^outdim that maps every input to zero.
    #[inline(always)]
    #[rustfmt::skip]
    pub fn zeros(outdim: usize, indim: usize) -> AffFuncG<A> {
        AffFuncG::from_mats(
            Array2::zeros((outdim, indim)),
            Array1::zeros(outdim)
        )
    }
}

/// # General methods
impl<A: Scalar> AffFuncG<A> {
    /// Returns the dimension of the input space.
    #[inline(always)]
    pub fn indim(&self) -> usize {
        self.mat.shape()[1]
    }

    /// Returns the dimension of the image space.
    #[inline(always)]
    pub fn outdim(&self) -> usize {
        self.mat.shape()[0]
    }

    #[inline(always)]
    pub fn matrix_view(&self) -> ArrayView2<'_, A> {
        self.mat.view()
    }

    #[inline(always)]
    pub fn bias_view(&self) -> ArrayView1<'_, A> {
        self.bias.view()
    }

    /// Evaluates this function under the given input.
    /// Mathematically, this corresponds to calculating mat @ input + bias
    pub fn apply<S: Data<Elem = A>>(&self, input: &ArrayBase<S, Ix1>) -> Array1<A> {
        self.mat.dot(input) + &self.bias
    }

    /// Composes self with other. The resulting function will have the same effect as first applying other and then self.
    ///
    /// # Example
    ///
    /// ``` rust
    /// use pathfold::aff;
    /// use ndarray::arr1;
    ///
    /// let f1 = aff!([[1, 0], [0, 0]] + [0, 1]);
    /// let f2 = aff!([[1, 1]] + [-1]);
    ///
    /// assert_eq!(
    ///     f2.compose(&f1).apply(&arr1(&[3., 4.])),
    ///     f2.apply(&f1.apply(&arr1(&[3., 4.])))
    /// );
    /// ```
    pub fn compose(&self, other: &AffFuncG<A>) -> AffFuncG<A> {
        assert_eq!(
            self.indim(),
            other.outdim(),
            "Invalid shared dimensions for composition: {} and {}",
            self.indim(),
            other.outdim()
        );
        // the product may overflow even for finite factors
        AffFuncG {
            mat: self.mat.dot(&other.mat),
            bias: self.apply(&other.bias),
        }
    }

    /// Sets the given row (weights and bias) to zero.
    pub fn reset_row(&mut self, row: usize) {
        self.mat.row_mut(row).fill(A::zero());
        self.bias[row] = A::zero();
    }

    /// Returns the Euclidean norm of every column of the matrix,
    /// i.e., the aggregate weight each input feature carries.
    pub fn column_norms(&self) -> Array1<A> {
        self.mat
            .axis_iter(Axis(1))
            .map(|column| column.iter().map(|&x| x * x).sum::<A>().sqrt())
            .collect()
    }

    /// Returns the indices of all inputs with a non-zero coefficient in ``row``.
    pub fn row_support(&self, row: usize) -> Vec<usize> {
        self.mat
            .row(row)
            .iter()
            .enumerate()
            .filter(|(_, &x)| x != A::zero())
            .map(|(idx, _)| idx)
            .collect()
    }
}

impl<A> AbsDiffEq for AffFuncG<A>
where
    A: Scalar + AbsDiffEq,
    A::Epsilon: Clone,
{
    type Epsilon = A::Epsilon;

    fn default_epsilon() -> A::Epsilon {
        A::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: A::Epsilon) -> bool {
        <Array2<A> as AbsDiffEq<_>>::abs_diff_eq(&self.mat, &other.mat, epsilon.clone())
            && <Array1<A> as AbsDiffEq<_>>::abs_diff_eq(&self.bias, &other.bias, epsilon)
    }
}

impl<A> RelativeEq for AffFuncG<A>
where
    A: Scalar + RelativeEq,
    A::Epsilon: Clone,
{
    fn default_max_relative() -> Self::Epsilon {
        A::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: A::Epsilon, max_relative: A::Epsilon) -> bool {
        <Array2<A> as RelativeEq<_>>::relative_eq(
            &self.mat,
            &other.mat,
            epsilon.clone(),
            max_relative.clone(),
        ) && <Array1<A> as RelativeEq<_>>::relative_eq(
            &self.bias,
            &other.bias,
            epsilon,
            max_relative,
        )
    }
}

/// Creates a new single precision ``AffFunc`` from the given matrix and bias.
///
/// See also ndarray's ``array`` macro
///
/// # Examples
///
/// ```rust
/// use pathfold::aff;
///
/// let func = aff!([[1, 2, 5, 7], [-2, -9, 7, 8]] + [1, -1]);
/// ```
#[macro_export]
macro_rules! aff {
    ([ $([$($x:expr),* $(,)*]),+ $(,)* ] + [ $($y:expr),* $(,)* ]) => {{
        $crate::linalg::affine::AffFunc::from_mats(
           ndarray::Array2::<f32>::from(vec![$( [ $( ($x as f32), )* ], )*]),
           ndarray::Array1::<f32>::from(vec![$($y as f32,)*])
        )
    }};
    ([ $($x:expr),* $(,)* ] + $y:expr) => {{
        $crate::linalg::affine::AffFunc::from_mats(
           ndarray::Array2::<f32>::from(vec![ [ $( ($x as f32), )* ]]),
           ndarray::Array1::<f32>::from(vec![$y as f32])
        )
    }};
}
