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

//! Errors raised while building, pruning, or reducing networks

use ndarray_npy::{ReadNpzError, WriteNpzError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathError {
    /// The layer sequence is not a strict stack of (linear → ReLU)* → linear.
    #[error("Unsupported topology: {layer} at position {position}")]
    UnsupportedTopology { position: usize, layer: String },
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: usize, got: usize },
    #[error("Network contains no linear layer")]
    EmptyNetwork,
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),
    #[error(transparent)]
    Npz(#[from] ReadNpzError),
    #[error(transparent)]
    NpzWrite(#[from] WriteNpzError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PathError {
    pub(crate) fn check_dim(expected: usize, got: usize) -> Result<(), PathError> {
        if expected == got {
            Ok(())
        } else {
            Err(PathError::ShapeMismatch { expected, got })
        }
    }
}
