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

/*!
Per-sample linear explanations of ReLU classifiers.

A feed-forward network of linear layers and ReLUs is a
[piece-wise linear function](https://en.wikipedia.org/wiki/Piecewise_linear_function):
its input space splits into regions on which the network is an affine map.
Given a single sample, `pathfold` recovers the affine map of the region the
sample lies in by following its *firing path*, i.e., the set of ReLU units
that are active for that sample. The result is a single linear layer followed
by the network's sigmoid output that agrees exactly with the network on that sample.

`pathfold` supports the following operations:
 - prune weak input features of the first layer with a standing weight mask
 - reduce a network along the firing path of a sample to one linear layer
 - reduce whole batches of samples with console or csv progress reporting
 - load and store (pruned) networks in numpy's ``.npz`` format
 - measure the agreement of a network and its reductions

# Quick Start
Linear layers are encoded using the [`AffFunc`](crate::linalg::affine::AffFunc) struct,
which can be conveniently written with the `aff!` macro.
The following example builds a network with one hidden layer of 3 neurons,
prunes its inputs, and reduces it at a sample.
```rust
use ndarray::arr1;
use pathfold::aff;
use pathfold::net::network::Network;
use pathfold::prune::WeightPruner;
use pathfold::reduce::reduce;

let mut network = Network::from_funcs([
    aff!([[1, 0, 1, 0], [-1, 0, 0, 0], [0.5, 1, 0, 1]] + [0, 0, 0]),
    aff!([[1, 1, 1]] + [-1]),
]).unwrap();

let mask = WeightPruner::default().prune(&mut network).unwrap();
assert!(mask.is_empty());

let x = arr1(&[1., 0., 1., 0.]);
let model = reduce(&network, &x).unwrap();

assert_eq!(model.relevant_features(0), vec![0, 1, 2, 3]);
assert!((model.evaluate(&x).unwrap()[0] - network.evaluate(&x).unwrap()[0]).abs() < 1e-6);
```

Pretrained networks are read from ``.npz`` archives with
[`read_network`](crate::net::io::read_network), which expects one entry per layer
such as ``0.linear.weights.npy``, ``0.linear.bias.npy``, ``1.relu.npy``, and so on.

# Firing Paths
For a fixed sample every ReLU unit either passes its input through or outputs zero.
Removing the rows of inactive units from each hidden layer turns the network into
a plain composition of affine maps, which collapses into one. The collapsed map is
only valid for samples sharing the same firing path
(see [`FiringPath::same_region`](crate::reduce::FiringPath::same_region));
outside that region the network and its reduction may disagree.
*/

#![warn(
    missing_debug_implementations,
    //missing_docs,
    rust_2021_compatibility,
    // unreachable_pub
)]

pub mod error;
pub mod linalg;
pub mod metrics;
pub mod net;
pub mod prune;
pub mod reduce;
