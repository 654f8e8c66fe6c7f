// Copyright 2022 Zinc Labs Inc. and Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{collections::VecDeque, str::FromStr};

use serde_json::Value as JsonValue;
use strum::{EnumString, EnumVariantNames, IntoStaticStr, VariantNames};

use crate::{
    error::{ComputeError, Issue, Result, CODE_INVALID_PARAMETER},
    value::{Parameters, Sample, Series},
};

mod exponential_moving_average;
mod rolling_max;
mod rolling_mean;
mod rolling_min;
mod rolling_sum;

pub(crate) use exponential_moving_average::exponential_moving_average;
pub(crate) use rolling_max::rolling_max;
pub(crate) use rolling_mean::rolling_mean;
pub(crate) use rolling_min::rolling_min;
pub(crate) use rolling_sum::rolling_sum;

pub const DEFAULT_WINDOW_SIZE: usize = 3;
pub const DEFAULT_ALPHA: f64 = 0.5;

/// Names accepted in `/execute/<name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumVariantNames, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Func {
    RollingMean,
    RollingSum,
    RollingMin,
    RollingMax,
    ExponentialMovingAverage,
}

impl Func {
    pub fn names() -> &'static [&'static str] {
        Func::VARIANTS
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Looks up a computation by name.
    pub fn parse(name: &str) -> Result<Self> {
        Func::from_str(name).map_err(|_| ComputeError::UnknownComputation {
            name: name.to_owned(),
        })
    }
}

/// A computation with its parameters resolved and normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Computation {
    RollingMean { window_size: usize },
    RollingSum { window_size: usize },
    RollingMin { window_size: usize },
    RollingMax { window_size: usize },
    ExponentialMovingAverage { alpha: f64 },
}

impl Computation {
    /// Picks the options `func` understands out of `parameters`; other keys
    /// are ignored.
    ///
    /// Recognized options:
    /// - `window_size`: integer, default 3, values below 1 are raised to 1;
    /// - `alpha`: number in (0, 1], default 0.5.
    pub fn resolve(func: Func, parameters: &Parameters) -> Result<Self> {
        Ok(match func {
            Func::RollingMean => Computation::RollingMean {
                window_size: window_size(parameters)?,
            },
            Func::RollingSum => Computation::RollingSum {
                window_size: window_size(parameters)?,
            },
            Func::RollingMin => Computation::RollingMin {
                window_size: window_size(parameters)?,
            },
            Func::RollingMax => Computation::RollingMax {
                window_size: window_size(parameters)?,
            },
            Func::ExponentialMovingAverage => Computation::ExponentialMovingAverage {
                alpha: alpha(parameters)?,
            },
        })
    }

    /// Output has the same length and timestamps as `series`.
    pub fn apply(&self, series: &Series) -> Series {
        match *self {
            Computation::RollingMean { window_size } => rolling_mean(series, window_size),
            Computation::RollingSum { window_size } => rolling_sum(series, window_size),
            Computation::RollingMin { window_size } => rolling_min(series, window_size),
            Computation::RollingMax { window_size } => rolling_max(series, window_size),
            Computation::ExponentialMovingAverage { alpha } => {
                exponential_moving_average(series, alpha)
            }
        }
    }
}

fn window_size(parameters: &Parameters) -> Result<usize> {
    let value = match parameters.get("window_size") {
        None | Some(JsonValue::Null) => return Ok(DEFAULT_WINDOW_SIZE),
        Some(v) => v,
    };
    if let Some(n) = value.as_i64() {
        return Ok(usize::try_from(n.max(1)).unwrap_or(usize::MAX));
    }
    if value.is_u64() {
        // larger than i64::MAX, the window covers the whole series anyway
        return Ok(usize::MAX);
    }
    Err(invalid_parameter(
        "window_size",
        format!("window_size must be an integer, got {value}"),
    ))
}

fn alpha(parameters: &Parameters) -> Result<f64> {
    let value = match parameters.get("alpha") {
        None | Some(JsonValue::Null) => return Ok(DEFAULT_ALPHA),
        Some(v) => v,
    };
    match value.as_f64() {
        Some(alpha) if alpha > 0.0 && alpha <= 1.0 => Ok(alpha),
        _ => Err(invalid_parameter(
            "alpha",
            format!("alpha must be a number in (0, 1], got {value}"),
        )),
    }
}

fn invalid_parameter(name: &str, message: String) -> ComputeError {
    ComputeError::validation(Issue::new(
        CODE_INVALID_PARAMETER,
        message,
        ["parameters", name],
    ))
}

/// Trailing-window sum ending at every sample, handed to `finish` together
/// with the number of values in the window.
///
/// Near the start of the series the window holds whatever is available, so
/// the count is never zero.
pub(crate) fn eval_running_sum(
    series: &Series,
    window_size: usize,
    finish: fn(sum: f64, count: usize) -> f64,
) -> Series {
    let window_size = window_size.clamp(1, series.len().max(1));
    let values = series.values().collect::<Vec<_>>();
    let mut sum = 0.0;
    let samples = series
        .samples
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            sum += values[i];
            if i >= window_size {
                sum -= values[i - window_size];
            }
            Sample {
                timestamp: sample.timestamp,
                value: finish(sum, (i + 1).min(window_size)),
            }
        })
        .collect();
    Series::new(samples)
}

/// Trailing-window extremum ending at every sample. `keeps(a, b)` is true
/// when `a` wins over (or ties with) `b`.
///
/// The deque holds indices of window values in decreasing preference, so
/// each value is pushed and popped at most once.
pub(crate) fn eval_extremum(
    series: &Series,
    window_size: usize,
    keeps: fn(f64, f64) -> bool,
) -> Series {
    let window_size = window_size.clamp(1, series.len().max(1));
    let values = series.values().collect::<Vec<_>>();
    let mut candidates = VecDeque::<usize>::with_capacity(window_size.min(values.len()));
    let samples = series
        .samples
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            while candidates
                .back()
                .map_or(false, |&j| keeps(values[i], values[j]))
            {
                candidates.pop_back();
            }
            candidates.push_back(i);
            while candidates.front().map_or(false, |&j| j + window_size <= i) {
                candidates.pop_front();
            }
            // `i` was just pushed, so the deque is never empty here
            let best = candidates.front().copied().unwrap_or(i);
            Sample {
                timestamp: sample.timestamp,
                value: values[best],
            }
        })
        .collect();
    Series::new(samples)
}
