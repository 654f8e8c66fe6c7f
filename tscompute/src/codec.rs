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

//! Conversion between wire-level [`TimeseriesData`] and numeric [`Series`].
//!
//! Decoding keeps the original labels next to the samples so that encoding
//! can hand every result back under the exact key it arrived with.

use std::borrow::Cow;

use time::{format_description::well_known::Iso8601, Date, OffsetDateTime, PrimitiveDateTime};

use crate::{
    error::{ComputeError, Issue, Result, CODE_INVALID_TIMESTAMP},
    value::{Sample, Series, TimeseriesData, TimestampLabel},
};

/// Numeric samples together with the labels they were decoded from.
///
/// `labels[i]` is the original label of `series.samples[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub series: Series,
    pub labels: Vec<TimestampLabel>,
}

/// Converts wire data into a numeric series, dropping missing readings.
///
/// Returns `None` when there is nothing left to compute on.
pub fn decode(data: &TimeseriesData) -> Result<Option<Decoded>> {
    let mut samples = Vec::with_capacity(data.len());
    let mut labels = Vec::with_capacity(data.len());
    for (label, value) in data.iter() {
        let value = match value {
            Some(v) if v.is_finite() => *v,
            _ => continue,
        };
        samples.push(Sample {
            timestamp: parse_label(label)?,
            value,
        });
        labels.push(label.clone());
    }
    if samples.is_empty() {
        return Ok(None);
    }
    Ok(Some(Decoded {
        series: Series::new(samples),
        labels,
    }))
}

/// Converts a numeric series back into wire data.
///
/// Sample `i` is keyed by `labels[i]` when available, otherwise by its
/// timestamp in epoch milliseconds. Non-finite values become null.
pub fn encode(series: &Series, labels: Option<&[TimestampLabel]>) -> TimeseriesData {
    series
        .samples
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            let label = labels
                .and_then(|labels| labels.get(i))
                .cloned()
                .unwrap_or(TimestampLabel::Epoch(sample.timestamp));
            (label, sample.value.is_finite().then_some(sample.value))
        })
        .collect()
}

/// Resolves a label to milliseconds since the Unix epoch.
pub fn parse_label(label: &TimestampLabel) -> Result<i64> {
    match label {
        TimestampLabel::Epoch(ms) => Ok(*ms),
        TimestampLabel::DigitString(text) => text
            .parse::<i64>()
            .map_err(|_| invalid_label(label, "epoch milliseconds out of range")),
        TimestampLabel::IsoString(text) => parse_iso8601(text)
            .and_then(|t| i64::try_from(t.unix_timestamp_nanos().div_euclid(1_000_000)).ok())
            .ok_or_else(|| invalid_label(label, "expected epoch milliseconds or ISO-8601")),
    }
}

/// Accepts date-times with or without an offset (no offset means UTC),
/// a space in place of `T`, lowercase `t`/`z` designators, and bare dates
/// (midnight UTC).
fn parse_iso8601(text: &str) -> Option<OffsetDateTime> {
    let text = text.trim();
    let text: Cow<str> = if text.bytes().any(|b| matches!(b, b' ' | b't' | b'z')) {
        text.replacen(' ', "T", 1).to_ascii_uppercase().into()
    } else {
        text.into()
    };
    OffsetDateTime::parse(&text, &Iso8601::DEFAULT)
        .or_else(|_| {
            PrimitiveDateTime::parse(&text, &Iso8601::DEFAULT).map(PrimitiveDateTime::assume_utc)
        })
        .or_else(|_| Date::parse(&text, &Iso8601::DEFAULT).map(|d| d.midnight().assume_utc()))
        .ok()
}

fn invalid_label(label: &TimestampLabel, reason: &str) -> ComputeError {
    ComputeError::validation(Issue::new(
        CODE_INVALID_TIMESTAMP,
        format!("invalid timestamp '{label}': {reason}"),
        [label.to_string()],
    ))
}
