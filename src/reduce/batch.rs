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

//! Reduction of many samples with pluggable progress reporting

use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant};

use console::style;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use itertools::Itertools;
use ndarray::{ArrayBase, Axis, Data, Ix2};

use super::model::ReducedModel;
use super::reduce_with_path;
use crate::error::PathError;
use crate::linalg::Scalar;
use crate::net::network::Network;

pub trait ReduceVisitor {
    fn start(&mut self, indim: usize, n_samples: usize);
    fn start_sample(&mut self, idx: usize);
    fn finish_sample(
        &mut self,
        idx: usize,
        active_units: usize,
        relevant_features: usize,
    ) -> Result<(), PathError>;
    fn finish(&mut self, n_samples: usize, n_regions: usize) -> Result<(), PathError>;
}

fn progress_style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(&format!("{: >12} {}", style("Reducing").cyan().bold(), template))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

#[derive(Clone, Debug)]
pub struct ReduceConsole {
    pb: ProgressBar,
    timer: Instant,
    total: Duration,
}

impl ReduceConsole {
    pub fn new() -> ReduceConsole {
        ReduceConsole {
            pb: ProgressBar::hidden(),
            timer: Instant::now(),
            total: Duration::ZERO,
        }
    }
}

impl Default for ReduceConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl ReduceVisitor for ReduceConsole {
    fn start(&mut self, indim: usize, n_samples: usize) {
        self.pb = ProgressBar::new(n_samples as u64);
        self.pb
            .set_style(progress_style("[{bar:25}] {pos:>4}/{len:4} ({elapsed})"));
        self.pb.enable_steady_tick(Duration::from_secs(5));

        println!("Input dim: {}", indim);
        println!("Number of samples: {}", n_samples);

        self.total = Duration::ZERO;
    }

    fn start_sample(&mut self, _idx: usize) {
        self.timer = Instant::now();
    }

    fn finish_sample(&mut self, _idx: usize, _active_units: usize, _relevant_features: usize) -> Result<(), PathError> {
        self.total += self.timer.elapsed();
        self.pb.inc(1);
        Ok(())
    }

    fn finish(&mut self, n_samples: usize, n_regions: usize) -> Result<(), PathError> {
        self.pb.finish_and_clear();
        println!(
            "{: >12} reducing {} samples in {:#} ({} distinct firing paths)",
            style("Completed").green().bold(),
            n_samples,
            HumanDuration(self.total),
            n_regions
        );
        Ok(())
    }
}

#[derive(serde::Serialize)]
struct CsvRow {
    sample: usize,
    active_units: usize,
    relevant_features: usize,
    time_us: u128,
}

/// Writes one line of statistics per reduced sample to a csv file.
#[derive(Debug)]
pub struct ReduceCsv {
    writer: csv::Writer<File>,
    timer: Instant,
    pb: ProgressBar,
}

impl ReduceCsv {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<ReduceCsv, PathError> {
        Ok(ReduceCsv {
            writer: csv::Writer::from_path(path)?,
            timer: Instant::now(),
            pb: ProgressBar::hidden(),
        })
    }
}

impl ReduceVisitor for ReduceCsv {
    fn start(&mut self, _indim: usize, n_samples: usize) {
        self.pb = ProgressBar::new(n_samples as u64);
        self.pb
            .set_style(progress_style("[{bar:20}] {pos:>4}/{len:4} ({elapsed})"));
    }

    fn start_sample(&mut self, _idx: usize) {
        self.timer = Instant::now();
    }

    fn finish_sample(&mut self, idx: usize, active_units: usize, relevant_features: usize) -> Result<(), PathError> {
        let duration = self.timer.elapsed();
        self.writer.serialize(CsvRow {
            sample: idx,
            active_units,
            relevant_features,
            time_us: duration.as_micros(),
        })?;
        self.pb.inc(1);
        Ok(())
    }

    fn finish(&mut self, _n_samples: usize, _n_regions: usize) -> Result<(), PathError> {
        self.writer.flush()?;
        self.pb.finish_and_clear();
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct NoOpVis {}

impl ReduceVisitor for NoOpVis {
    fn start(&mut self, _: usize, _: usize) {}
    fn start_sample(&mut self, _: usize) {}
    fn finish_sample(&mut self, _: usize, _: usize, _: usize) -> Result<(), PathError> {
        Ok(())
    }
    fn finish(&mut self, _: usize, _: usize) -> Result<(), PathError> {
        Ok(())
    }
}

/// Reduces ``network`` at every row of ``samples``.
pub fn reduce_batch<A, S>(network: &Network<A>, samples: &ArrayBase<S, Ix2>) -> Result<Vec<ReducedModel<A>>, PathError>
where
    A: Scalar,
    S: Data<Elem = A>,
{
    reduce_batch_generic(network, samples, &mut NoOpVis {})
}

/// Specialization of [`reduce_batch_generic`] that reports the progress to the console.
pub fn reduce_batch_verbose<A, S>(
    network: &Network<A>,
    samples: &ArrayBase<S, Ix2>,
) -> Result<Vec<ReducedModel<A>>, PathError>
where
    A: Scalar,
    S: Data<Elem = A>,
{
    reduce_batch_generic(network, samples, &mut ReduceConsole::new())
}

/// Specialization of [`reduce_batch_generic`] that writes characteristics of
/// each reduction to a csv file located at ``path``.
pub fn reduce_batch_csv<A, S, P>(
    network: &Network<A>,
    samples: &ArrayBase<S, Ix2>,
    path: P,
) -> Result<Vec<ReducedModel<A>>, PathError>
where
    A: Scalar,
    S: Data<Elem = A>,
    P: AsRef<Path>,
{
    reduce_batch_generic(network, samples, &mut ReduceCsv::new(path)?)
}

/// Generic implementation of the batch reduction.
///
/// Each row of ``samples`` is reduced independently with [`reduce_with_path`].
/// Behavior can be customized by providing an appropriate ``visitor``.
/// No models are returned if any sample fails.
pub fn reduce_batch_generic<A, S, Visitor>(
    network: &Network<A>,
    samples: &ArrayBase<S, Ix2>,
    visitor: &mut Visitor,
) -> Result<Vec<ReducedModel<A>>, PathError>
where
    A: Scalar,
    S: Data<Elem = A>,
    Visitor: ReduceVisitor,
{
    PathError::check_dim(network.indim(), samples.ncols())?;

    let n_samples = samples.nrows();
    let mut models = Vec::with_capacity(n_samples);
    let mut patterns = Vec::with_capacity(n_samples);

    visitor.start(network.indim(), n_samples);

    for (idx, sample) in samples.axis_iter(Axis(0)).enumerate() {
        visitor.start_sample(idx);
        let (model, path) = reduce_with_path(network, &sample)?;
        visitor.finish_sample(idx, path.n_active(), model.support().len())?;

        patterns.push(path.pattern());
        models.push(model);
    }

    let n_regions = patterns.iter().unique().count();
    visitor.finish(n_samples, n_regions)?;

    Ok(models)
}
