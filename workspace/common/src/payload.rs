use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Series returned by `GET /api/dashboard/{chart}-data/?period=...`.
///
/// `values` always replaces the chart's primary dataset; `labels`, when
/// present, replaces its axis labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPayload {
    #[serde(deserialize_with = "deserialize_numbers")]
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl SeriesPayload {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            labels: None,
        }
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = Some(labels);
        self
    }
}

/// One value of the live-stats mapping.
///
/// The backend serializes decimal fields as strings, so numeric text is
/// accepted alongside JSON numbers. Anything else is kept as `Unsupported`
/// and never rendered.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawStat")]
pub enum StatValue {
    Number(f64),
    Text(String),
    Unsupported,
}

impl StatValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            StatValue::Number(value) => Some(*value),
            StatValue::Text(text) => f64::from_str(text.trim()).ok().filter(|v| v.is_finite()),
            StatValue::Unsupported => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStat {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl From<RawStat> for StatValue {
    fn from(raw: RawStat) -> Self {
        match raw {
            RawStat::Number(value) => StatValue::Number(value),
            RawStat::Text(text) => StatValue::Text(text),
            RawStat::Other(_) => StatValue::Unsupported,
        }
    }
}

/// Mapping from stat key to value, as returned by `GET /api/dashboard/live-stats/`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct StatsSnapshot(BTreeMap<String, StatValue>);

impl StatsSnapshot {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(StatValue::as_number)
    }

    /// Keys whose value can be rendered, in key order.
    pub fn numeric(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.0
            .iter()
            .filter_map(|(key, value)| value.as_number().map(|number| (key.as_str(), number)))
    }

    /// Keys that were present but carried no renderable number.
    pub fn skipped(&self) -> impl Iterator<Item = &str> + '_ {
        self.0
            .iter()
            .filter(|(_, value)| value.as_number().is_none())
            .map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for StatsSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key, StatValue::Number(value)))
                .collect(),
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

fn deserialize_numbers<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<RawNumber>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|item| match item {
            RawNumber::Number(value) => Ok(value),
            RawNumber::Text(text) => f64::from_str(text.trim()).map_err(|e| {
                serde::de::Error::custom(format!("invalid series value '{}': {}", text, e))
            }),
        })
        .collect()
}
