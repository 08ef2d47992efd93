//! Turns a raw weather series into per-day display records.

use serde::Serialize;
use std::fmt;

use crate::{
    error::BuildError,
    model::{DateKey, Metric, RawSeries},
};

/// A single reading as shown on a card.
///
/// Displayed to one decimal; derived scores use the raw value. A missing
/// reading displays as `N/A` but counts as `0.0` in derived scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Reading(Option<f64>);

impl Reading {
    pub fn new(value: Option<f64>) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Option<f64> {
        self.0
    }

    pub fn or_zero(&self) -> f64 {
        self.0.unwrap_or(0.0)
    }

    pub fn is_missing(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v:.1}"),
            None => f.write_str("N/A"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeatherIcon {
    HeavyShowers,
    Windy,
    SunnyHot,
    Snow,
    PartlyCloudy,
}

impl WeatherIcon {
    /// First match wins: rain, then wind, then heat, then cold.
    pub fn classify(max_temp: f64, wind: f64, rain: f64) -> Self {
        if rain > 2.0 {
            Self::HeavyShowers
        } else if wind > 8.0 {
            Self::Windy
        } else if max_temp > 30.0 {
            Self::SunnyHot
        } else if max_temp < 10.0 {
            Self::Snow
        } else {
            Self::PartlyCloudy
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            Self::HeavyShowers => "heavy-showers",
            Self::Windy => "windy",
            Self::SunnyHot => "sunny-hot",
            Self::Snow => "snow",
            Self::PartlyCloudy => "partly-cloudy",
        }
    }
}

impl fmt::Display for WeatherIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// Heuristic condition scores, each a percentage in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConditionProbabilities {
    pub hot: f64,
    pub cold: f64,
    pub windy: f64,
    pub rainy: f64,
}

impl ConditionProbabilities {
    pub fn derive(max_temp: f64, min_temp: f64, wind: f64, rain: f64) -> Self {
        Self {
            hot: percent((max_temp - 25.0) / 15.0 * 100.0),
            cold: percent((10.0 - min_temp) / 15.0 * 100.0),
            windy: percent(wind / 12.0 * 100.0),
            rainy: percent(rain / 10.0 * 100.0),
        }
    }
}

fn percent(score: f64) -> f64 {
    if score.is_nan() { 0.0 } else { score.clamp(0.0, 100.0) }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRecord {
    pub date: DateKey,
    pub weekday: String,
    pub max_temp: Reading,
    pub min_temp: Reading,
    pub wind: Reading,
    pub rain: Reading,
    pub icon: WeatherIcon,
    pub conditions: ConditionProbabilities,
}

/// Build one record per date of the max-temperature metric, newest first.
pub fn build_days(series: &RawSeries) -> Result<Vec<DayRecord>, BuildError> {
    if series.is_empty(Metric::MaxTemperature) {
        return Err(BuildError::EmptySeries);
    }

    let mut dates: Vec<DateKey> = series.dates(Metric::MaxTemperature).copied().collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));

    Ok(dates.into_iter().map(|date| build_day(series, date)).collect())
}

fn build_day(series: &RawSeries, date: DateKey) -> DayRecord {
    let reading = |metric| Reading::new(series.reading(metric, &date));

    let max_temp = reading(Metric::MaxTemperature);
    let min_temp = reading(Metric::MinTemperature);
    let wind = reading(Metric::WindSpeed);
    let rain = reading(Metric::Precipitation);

    DayRecord {
        date,
        weekday: date.date().format("%A").to_string(),
        max_temp,
        min_temp,
        wind,
        rain,
        icon: WeatherIcon::classify(max_temp.or_zero(), wind.or_zero(), rain.or_zero()),
        conditions: ConditionProbabilities::derive(
            max_temp.or_zero(),
            min_temp.or_zero(),
            wind.or_zero(),
            rain.or_zero(),
        ),
    }
}
