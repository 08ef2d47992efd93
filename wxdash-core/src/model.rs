use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::error::InvalidDateKey;

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// The four daily measurements requested from the weather API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    MaxTemperature,
    MinTemperature,
    WindSpeed,
    Precipitation,
}

impl Metric {
    /// API parameter code.
    pub fn code(&self) -> &'static str {
        match self {
            Metric::MaxTemperature => "T2M_MAX",
            Metric::MinTemperature => "T2M_MIN",
            Metric::WindSpeed => "WS10M",
            Metric::Precipitation => "PRECTOTCORR",
        }
    }

    pub const fn all() -> &'static [Metric] {
        &[
            Metric::MaxTemperature,
            Metric::MinTemperature,
            Metric::WindSpeed,
            Metric::Precipitation,
        ]
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::all().iter().copied().find(|m| m.code() == code)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A calendar day in compact `YYYYMMDD` form.
///
/// The key is fixed-width, so ordering keys lexicographically is the same as
/// ordering them chronologically; ordering on the inner date is equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub const FORMAT: &'static str = "%Y%m%d";

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl FromStr for DateKey {
    type Err = InvalidDateKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidDateKey(s.to_string()));
        }

        NaiveDate::parse_from_str(s, Self::FORMAT)
            .map(Self)
            .map_err(|_| InvalidDateKey(s.to_string()))
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Per-metric daily readings as returned by one fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSeries {
    metrics: BTreeMap<Metric, BTreeMap<DateKey, f64>>,
}

impl RawSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, metric: Metric, date: DateKey, value: f64) {
        self.metrics.entry(metric).or_default().insert(date, value);
    }

    /// Builder-style bulk insert.
    pub fn with_readings<I>(mut self, metric: Metric, readings: I) -> Self
    where
        I: IntoIterator<Item = (DateKey, f64)>,
    {
        let entry = self.metrics.entry(metric).or_default();
        entry.extend(readings);
        self
    }

    pub fn reading(&self, metric: Metric, date: &DateKey) -> Option<f64> {
        self.metrics.get(&metric).and_then(|m| m.get(date)).copied()
    }

    /// Date keys present for `metric`, oldest first.
    pub fn dates(&self, metric: Metric) -> impl Iterator<Item = &DateKey> {
        self.metrics.get(&metric).into_iter().flat_map(|m| m.keys())
    }

    pub fn len(&self, metric: Metric) -> usize {
        self.metrics.get(&metric).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, metric: Metric) -> bool {
        self.len(metric) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> DateKey {
        s.parse().expect("valid date key")
    }

    #[test]
    fn date_key_roundtrips_compact_form() {
        assert_eq!(key("20240115").to_string(), "20240115");
        assert_eq!(key("20240115").date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn date_key_rejects_malformed_input() {
        for bad in ["2024-01-15", "2024011", "202401155", "20241301", "20240230", "abcdefgh"] {
            assert!(bad.parse::<DateKey>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn date_key_order_is_chronological() {
        let mut keys = vec![key("20240110"), key("20231231"), key("20240109")];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["20231231", "20240109", "20240110"]);
    }

    #[test]
    fn metric_codes_are_stable() {
        let codes: Vec<&str> = Metric::all().iter().map(Metric::code).collect();
        assert_eq!(codes, ["T2M_MAX", "T2M_MIN", "WS10M", "PRECTOTCORR"]);
        assert_eq!(Metric::from_code("WS10M"), Some(Metric::WindSpeed));
        assert_eq!(Metric::from_code("RH2M"), None);
    }

    #[test]
    fn missing_metric_reads_as_empty() {
        let series = RawSeries::new().with_readings(Metric::MaxTemperature, [(key("20240110"), 32.0)]);

        assert_eq!(series.reading(Metric::MaxTemperature, &key("20240110")), Some(32.0));
        assert_eq!(series.reading(Metric::WindSpeed, &key("20240110")), None);
        assert!(series.is_empty(Metric::WindSpeed));
        assert_eq!(series.dates(Metric::Precipitation).count(), 0);
    }
}
