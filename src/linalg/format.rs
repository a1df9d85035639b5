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

//! Human readable rendering of affine functions
//!
//! Each output is written on its own line as a sum of weighted inputs followed
//! by the bias, e.g. ``+1.50 x0 −2.00 x3 +0.25``. Inputs are called ``x<idx>``
//! unless feature names are supplied.

use std::fmt::{self, Debug, Display};

use float_ord::FloatOrd;
use itertools::Itertools;
use ndarray::ArrayView1;

use super::affine::AffFuncG;
use super::Scalar;

const PLUS: &str = "+";
const MINUS: &str = "−";
const ELLIPSIS: &str = "⋯";
const VERT_ELLIPSIS: &str = "⋮";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormatOptions {
    /// Order the terms of each output by decreasing absolute weight
    pub sort_by_magnitude: bool,
    /// Omit terms whose weight is exactly zero
    pub skip_zeros: bool,
    /// Number of terms shown per output before the rest is elided
    pub max_terms: Option<usize>,
    /// Number of outputs shown before the rest is elided
    pub max_rows: Option<usize>,
    /// Names of the inputs, indexed like the columns
    pub feature_names: Option<Vec<String>>,
}

impl FormatOptions {
    /// Options used by ``Display``: zero terms are dropped and long functions are cut short.
    pub fn compact() -> FormatOptions {
        FormatOptions {
            skip_zeros: true,
            max_terms: Some(20),
            max_rows: Some(5),
            ..Default::default()
        }
    }

    /// Options suited for explanations: only non-zero terms, strongest first.
    pub fn explanation() -> FormatOptions {
        FormatOptions {
            sort_by_magnitude: true,
            skip_zeros: true,
            ..Default::default()
        }
    }

    pub fn with_feature_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_max_terms(mut self, max_terms: usize) -> Self {
        self.max_terms = Some(max_terms);
        self
    }

    pub fn show_all(mut self) -> Self {
        self.max_terms = None;
        self.max_rows = None;
        self
    }

    fn feature_name(&self, idx: usize) -> String {
        match self.feature_names.as_ref().and_then(|names| names.get(idx)) {
            Some(name) => name.clone(),
            None => format!("x{}", idx),
        }
    }
}

impl<A: Scalar> Display for AffFuncG<A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(&self.display_with(FormatOptions::compact()), f)
    }
}

impl<A: Scalar> AffFuncG<A> {
    pub fn display_with(&self, options: FormatOptions) -> AffFuncPrinter<'_, A> {
        AffFuncPrinter {
            func: self,
            options,
        }
    }
}

/// Renders an affine function with custom [`FormatOptions`].
#[derive(Clone)]
pub struct AffFuncPrinter<'a, A> {
    pub func: &'a AffFuncG<A>,
    pub options: FormatOptions,
}

impl<A: Scalar> Display for AffFuncPrinter<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let n_rows = self.func.outdim();
        let shown = self.options.max_rows.map_or(n_rows, |max| max.min(n_rows));

        for (row, bias) in self
            .func
            .matrix_view()
            .outer_iter()
            .zip(self.func.bias_view())
            .take(shown)
        {
            write_row(f, row, *bias, &self.options)?;
            writeln!(f)?;
        }

        if shown < n_rows {
            writeln!(f, "{}", VERT_ELLIPSIS)?;
        }
        Ok(())
    }
}

impl<A: Scalar> Debug for AffFuncPrinter<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Debug::fmt(&self.func, f)
    }
}

/// Writes the terms of one output followed by its bias.
pub fn write_row<A: Scalar>(
    f: &mut fmt::Formatter,
    coefficients: ArrayView1<A>,
    bias: A,
    options: &FormatOptions,
) -> fmt::Result {
    let mut terms = coefficients
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, value)| !(options.skip_zeros && value.is_zero()))
        .collect_vec();

    if options.sort_by_magnitude {
        terms.sort_by_key(|(_, value)| std::cmp::Reverse(FloatOrd(value.abs().to_f64().unwrap_or(f64::NAN))));
    }

    let n_terms = terms.len();
    let shown = options.max_terms.map_or(n_terms, |max| max.min(n_terms));

    for (idx, value) in terms.into_iter().take(shown) {
        write_float(f, value)?;
        write!(f, " {} ", options.feature_name(idx))?;
    }
    if shown < n_terms {
        write!(f, "{} ", ELLIPSIS)?;
    }

    write_float(f, bias)
}

/// Writes ``value`` with an explicit sign and the precision of the formatter (default 2).
#[inline]
pub fn write_float<A: Scalar>(f: &mut fmt::Formatter, value: A) -> fmt::Result {
    let sign = if value.is_sign_negative() { MINUS } else { PLUS };
    let precision = f.precision().unwrap_or(2);
    write!(f, "{}{:.*}", sign, precision, value.abs())
}
