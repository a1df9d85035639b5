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

//! Reduction of a network along the firing path of a single sample
//!
//! On the linear region of a sample, a ReLU network behaves like one affine
//! map: inactive units output zero and active units pass their input through.
//! The reduction replays the forward pass, removes the rows of inactive units
//! from each hidden layer and folds the remaining layers into a single
//! [`AffFuncG`] that is wrapped in a [`ReducedModel`].

use std::borrow::Borrow;

use log::{debug, trace};
use ndarray::{ArrayBase, Data, Ix1};

use crate::error::PathError;
use crate::linalg::affine::AffFuncG;
use crate::linalg::Scalar;
use crate::net::layer::Layer;
use crate::net::network::Network;

pub mod batch;
pub mod model;
pub mod path;

pub use batch::{
    reduce_batch, reduce_batch_csv, reduce_batch_generic, reduce_batch_verbose, NoOpVis,
    ReduceConsole, ReduceCsv, ReduceVisitor,
};
pub use model::ReducedModel;
pub use path::{FiringPath, PathStep};

/// Records the firing path of ``sample`` through ``network``.
pub fn firing_path<A, S>(network: &Network<A>, sample: &ArrayBase<S, Ix1>) -> Result<FiringPath<A>, PathError>
where
    A: Scalar,
    S: Data<Elem = A>,
{
    FiringPath::trace(network, sample)
}

/// Reduces ``network`` to a single linear layer followed by a sigmoid that
/// agrees with ``network`` on ``sample`` and on every input sharing its firing path.
///
/// The network itself is not modified; the returned model owns fresh copies of all parameters.
pub fn reduce<A, S>(network: &Network<A>, sample: &ArrayBase<S, Ix1>) -> Result<ReducedModel<A>, PathError>
where
    A: Scalar,
    S: Data<Elem = A>,
{
    let (model, _) = reduce_with_path(network, sample)?;
    Ok(model)
}

/// Like [`reduce`], but additionally returns the firing path the reduction followed.
pub fn reduce_with_path<A, S>(
    network: &Network<A>,
    sample: &ArrayBase<S, Ix1>,
) -> Result<(ReducedModel<A>, FiringPath<A>), PathError>
where
    A: Scalar,
    S: Data<Elem = A>,
{
    let path = FiringPath::trace(network, sample)?;
    let linear = fold_path(network, &path)?;

    debug!(
        "Reduced {} layers along path {} to {}x{} linear model",
        network.len(),
        path_label(&path),
        linear.indim(),
        linear.outdim()
    );

    Ok((ReducedModel::new(linear), path))
}

/// Activation pattern of the hidden layers, ``-`` if there are none.
fn path_label<A: Scalar>(path: &FiringPath<A>) -> String {
    let pattern = path.pattern();
    if pattern.is_empty() {
        String::from("-")
    } else {
        pattern
    }
}

/// Reduces a raw layer sequence of the form ``Linear (ReLU Linear)* [Sigmoid]``.
pub fn reduce_layers<A, I, S>(layers: I, sample: &ArrayBase<S, Ix1>) -> Result<ReducedModel<A>, PathError>
where
    A: Scalar,
    I: IntoIterator,
    I::Item: Borrow<Layer<A>>,
    S: Data<Elem = A>,
{
    let network = Network::from_layers(layers)?;
    reduce(&network, sample)
}

/// Composes the layers of ``network``, dropping the rows of units that are inactive on ``path``.
///
/// The last layer is folded unmasked as no ReLU follows it.
fn fold_path<A: Scalar>(network: &Network<A>, path: &FiringPath<A>) -> Result<AffFuncG<A>, PathError> {
    PathError::check_dim(network.len(), path.len())?;

    let last = network.len().checked_sub(1).ok_or(PathError::EmptyNetwork)?;
    let mut composed: Option<AffFuncG<A>> = None;

    for (idx, (layer, step)) in network.layers().iter().zip(path.steps()).enumerate() {
        let mut func = layer.func().clone();

        if idx != last {
            let mut n_active = 0;
            for (row, &active) in step.active.iter().enumerate() {
                if active {
                    n_active += 1;
                } else {
                    func.reset_row(row);
                }
            }
            trace!("Layer {}: {} of {} units active", idx, n_active, func.outdim());
        }

        composed = Some(match composed {
            None => func,
            Some(prev) => func.compose(&prev),
        });
    }

    composed.ok_or(PathError::EmptyNetwork)
}
