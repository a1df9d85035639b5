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

//! Load and store networks in numpy's ``.npz`` format
//!
//! An archive holds one entry per layer, prefixed by the position of the layer:
//! ``0.linear.weights.npy``, ``0.linear.bias.npy``, ``1.relu.npy``, ``2.linear.weights.npy``, ...
//! Activations are stored as empty marker arrays. A pruned linear layer
//! additionally stores ``<idx>.linear.weight_mask.npy`` where 1 marks a kept
//! and 0 a pruned weight.

use std::fs::File;
use std::path::Path;

use itertools::Itertools;
use log::debug;
use ndarray::{Array1, Array2};
use ndarray_npy::{NpzReader, NpzWriter, ReadableElement, WritableElement};
use regex::Regex;

use super::layer::Layer;
use super::network::Network;
use crate::error::PathError;
use crate::linalg::affine::AffFuncG;
use crate::linalg::Scalar;

type Archive<A> = (Vec<Layer<A>>, Vec<Option<Array2<A>>>);

/// Reads the raw layer sequence stored in the archive at ``path``.
///
/// Pruning masks are ignored. Use [`read_network`] to restore them.
pub fn read_layers<A, P>(path: &P) -> Result<Vec<Layer<A>>, PathError>
where
    A: Scalar + ReadableElement,
    P: AsRef<Path>,
{
    let (layers, _) = read_archive(path)?;
    Ok(layers)
}

/// Reads a network including the pruning masks of its layers.
pub fn read_network<A, P>(path: &P) -> Result<Network<A>, PathError>
where
    A: Scalar + ReadableElement,
    P: AsRef<Path>,
{
    let (layers, masks) = read_archive(path)?;
    let mut network = Network::from_layers(&layers)?;

    for (layer, mask) in network.layers_mut().zip(masks) {
        if let Some(mask) = mask {
            layer.apply_mask(mask.mapv(|x: A| x.is_zero()))?;
        }
    }

    Ok(network)
}

/// Writes ``network`` to an ``.npz`` archive at ``path``.
pub fn write_network<A, P>(network: &Network<A>, path: &P) -> Result<(), PathError>
where
    A: Scalar + WritableElement,
    P: AsRef<Path>,
{
    let file = File::create(path)?;
    let mut npz = NpzWriter::new(file);
    let marker = Array1::<A>::zeros(0);

    for (idx, layer) in network.to_layers().iter().enumerate() {
        match layer {
            Layer::Linear(aff) => {
                npz.add_array(format!("{}.linear.weights.npy", idx), &aff.mat)?;
                npz.add_array(format!("{}.linear.bias.npy", idx), &aff.bias)?;

                let linear = &network.layers()[idx / 2];
                if let Some(mask) = linear.mask() {
                    let kept = mask.mapv(|pruned| if pruned { A::zero() } else { A::one() });
                    npz.add_array(format!("{}.linear.weight_mask.npy", idx), &kept)?;
                }
            }
            Layer::ReLU => npz.add_array(format!("{}.relu.npy", idx), &marker)?,
            Layer::Sigmoid => npz.add_array(format!("{}.sigmoid.npy", idx), &marker)?,
            other => {
                return Err(PathError::InvalidArchive(format!(
                    "cannot store layer {}",
                    other
                )))
            }
        }
    }

    npz.finish()?;
    Ok(())
}

fn read_archive<A, P>(path: &P) -> Result<Archive<A>, PathError>
where
    A: Scalar + ReadableElement,
    P: AsRef<Path>,
{
    let file = File::open(path)?;
    let mut npz = NpzReader::new(file)?;
    let names = npz.names()?;

    let pattern = Regex::new(r"^(\d+)\.(linear\.weights|relu|sigmoid)\.npy$")
        .map_err(|err| PathError::InvalidArchive(err.to_string()))?;

    let entries = names
        .iter()
        .filter_map(|name| pattern.captures(name))
        .map(|caps| {
            let idx = caps[1]
                .parse::<usize>()
                .map_err(|err| PathError::InvalidArchive(err.to_string()))?;
            Ok((idx, caps[2].to_string()))
        })
        .collect::<Result<Vec<(usize, String)>, PathError>>()?
        .into_iter()
        .sorted_by_key(|(idx, _)| *idx)
        .collect_vec();

    debug!("Found {} layers in archive: {:?}", entries.len(), entries);

    let mut layers = Vec::with_capacity(entries.len());
    let mut masks = Vec::new();

    for (idx, kind) in entries {
        match kind.as_str() {
            "relu" => layers.push(Layer::ReLU),
            "sigmoid" => layers.push(Layer::Sigmoid),
            "linear.weights" => {
                let mat: Array2<A> = npz.by_name(&format!("{}.linear.weights.npy", idx))?;
                let bias: Array1<A> = npz.by_name(&format!("{}.linear.bias.npy", idx))?;

                if mat.nrows() != bias.len() {
                    return Err(PathError::InvalidArchive(format!(
                        "layer {} has {} rows but {} biases",
                        idx,
                        mat.nrows(),
                        bias.len()
                    )));
                }
                if !mat.iter().chain(bias.iter()).all(|x| x.is_finite()) {
                    return Err(PathError::InvalidArchive(format!(
                        "layer {} contains non-finite parameters",
                        idx
                    )));
                }

                let mask_name = format!("{}.linear.weight_mask.npy", idx);
                let mask = if names.contains(&mask_name) {
                    let mask: Array2<A> = npz.by_name(&mask_name)?;
                    Some(mask)
                } else {
                    None
                };

                layers.push(Layer::Linear(AffFuncG::from_mats(mat, bias)));
                masks.push(mask);
            }
            _ => unreachable!(),
        }
    }

    Ok((layers, masks))
}
