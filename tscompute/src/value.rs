use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

// See https://docs.rs/indexmap/latest/indexmap/#alternate-hashers
pub type FxIndexMap<K, V> = IndexMap<K, V, std::hash::BuildHasherDefault<rustc_hash::FxHasher>>;

/// Computation parameters exactly as received; resolved per computation by
/// [`crate::functions::Computation::resolve`].
pub type Parameters = FxIndexMap<String, serde_json::Value>;

/// Wire-level timestamp of a single point.
///
/// JSON object keys are always text, so `Epoch` only appears when a series is
/// built programmatically; text keys are classified when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimestampLabel {
    /// Milliseconds since the Unix epoch.
    Epoch(i64),
    /// Text made only of ASCII digits, read as epoch milliseconds.
    DigitString(String),
    /// Any other text, read as an ISO-8601 date/time.
    IsoString(String),
}

impl TimestampLabel {
    /// Classifies label text: pure digits are epoch milliseconds, anything else
    /// is treated as ISO-8601.
    pub fn classify(text: impl Into<String>) -> Self {
        let text = text.into();
        if is_digits(&text) {
            TimestampLabel::DigitString(text)
        } else {
            TimestampLabel::IsoString(text)
        }
    }
}

pub(crate) fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

impl From<i64> for TimestampLabel {
    fn from(ms: i64) -> Self {
        TimestampLabel::Epoch(ms)
    }
}

impl From<&str> for TimestampLabel {
    fn from(text: &str) -> Self {
        TimestampLabel::classify(text)
    }
}

impl fmt::Display for TimestampLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampLabel::Epoch(ms) => write!(f, "{ms}"),
            TimestampLabel::DigitString(s) | TimestampLabel::IsoString(s) => f.write_str(s),
        }
    }
}

impl Serialize for TimestampLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TimestampLabel::Epoch(ms) => serializer.serialize_i64(*ms),
            TimestampLabel::DigitString(s) | TimestampLabel::IsoString(s) => {
                serializer.serialize_str(s)
            }
        }
    }
}

struct LabelVisitor;

impl<'de> Visitor<'de> for LabelVisitor {
    type Value = TimestampLabel;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an epoch-milliseconds integer or a timestamp string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(TimestampLabel::Epoch(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .map(TimestampLabel::Epoch)
            .map_err(|_| E::custom(format!("epoch timestamp {v} is out of range")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(TimestampLabel::classify(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(TimestampLabel::classify(v))
    }
}

impl<'de> Deserialize<'de> for TimestampLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LabelVisitor)
    }
}

/// One sensor's readings: label -> optional value, in wire order.
///
/// A label repeated in the payload keeps its first position and its last value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeseriesData(pub FxIndexMap<TimestampLabel, Option<f64>>);

impl TimeseriesData {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TimestampLabel, &Option<f64>)> {
        self.0.iter()
    }

    pub fn get(&self, label: &TimestampLabel) -> Option<Option<f64>> {
        self.0.get(label).copied()
    }
}

impl<L: Into<TimestampLabel>> FromIterator<(L, Option<f64>)> for TimeseriesData {
    fn from_iter<I: IntoIterator<Item = (L, Option<f64>)>>(iter: I) -> Self {
        TimeseriesData(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeRequest {
    /// Input sensor data, keyed by sensor name.
    pub data: FxIndexMap<String, TimeseriesData>,
    #[serde(default)]
    pub parameters: Parameters,
    /// Execution timestamp; passed through untouched.
    pub tick: i64,
    /// Unique work identifier; echoed in the response.
    pub uwid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeResponse {
    pub data: FxIndexMap<String, TimeseriesData>,
    pub uwid: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Time in milliseconds since the Unix epoch
    pub timestamp: i64,
    pub value: f64,
}

/// Numeric form of one sensor's readings, nulls already removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.value)
    }
}

impl FromIterator<(i64, f64)> for Series {
    fn from_iter<I: IntoIterator<Item = (i64, f64)>>(iter: I) -> Self {
        Series::new(
            iter.into_iter()
                .map(|(timestamp, value)| Sample { timestamp, value })
                .collect(),
        )
    }
}
