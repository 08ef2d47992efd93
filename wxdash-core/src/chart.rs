//! Per-day bar chart model and the registry that caches charts by day.

use serde::Serialize;
use std::collections::HashMap;

use crate::{days::DayRecord, model::DateKey, theme::Theme};

pub const CHART_TITLE: &str = "Daily Weather Summary";

/// Text and grid colours for the current theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartStyle {
    pub text_color: &'static str,
    pub grid_color: &'static str,
}

impl ChartStyle {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self { text_color: "#1f2937", grid_color: "rgba(0,0,0,0.1)" },
            Theme::Dark => Self { text_color: "#ecf0f1", grid_color: "rgba(255,255,255,0.2)" },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: &'static str,
    pub value: f64,
    pub fill: &'static str,
    pub border: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayChart {
    pub title: &'static str,
    pub bars: [ChartBar; 4],
    pub style: ChartStyle,
}

impl DayChart {
    pub fn new(day: &DayRecord, theme: Theme) -> Self {
        let bar = |label, value: f64, fill, border| ChartBar { label, value, fill, border };

        Self {
            title: CHART_TITLE,
            bars: [
                bar(
                    "Max Temp (°C)",
                    day.max_temp.or_zero(),
                    "rgba(231, 76, 60, 0.5)",
                    "rgb(231, 76, 60)",
                ),
                bar(
                    "Min Temp (°C)",
                    day.min_temp.or_zero(),
                    "rgba(52, 152, 219, 0.5)",
                    "rgb(52, 152, 219)",
                ),
                bar(
                    "Wind (m/s)",
                    day.wind.or_zero(),
                    "rgba(149, 165, 166, 0.5)",
                    "rgb(149, 165, 166)",
                ),
                bar(
                    "Rain (mm)",
                    day.rain.or_zero(),
                    "rgba(46, 204, 113, 0.5)",
                    "rgb(46, 204, 113)",
                ),
            ],
            style: ChartStyle::for_theme(theme),
        }
    }
}

/// Charts created so far, keyed by day.
///
/// Owned by the dashboard; nothing else holds chart state.
#[derive(Debug, Default)]
pub struct ChartRegistry {
    charts: HashMap<DateKey, DayChart>,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached chart for `day`, creating it on first use. The flag
    /// is `true` when the chart was created by this call.
    pub fn get_or_create(&mut self, day: &DayRecord, theme: Theme) -> (&DayChart, bool) {
        let mut created = false;
        let chart = self.charts.entry(day.date).or_insert_with(|| {
            created = true;
            DayChart::new(day, theme)
        });
        (chart, created)
    }

    pub fn get(&self, date: &DateKey) -> Option<&DayChart> {
        self.charts.get(date)
    }

    pub fn contains(&self, date: &DateKey) -> bool {
        self.charts.contains_key(date)
    }

    /// Re-colour every cached chart.
    pub fn restyle(&mut self, theme: Theme) {
        let style = ChartStyle::for_theme(theme);
        for chart in self.charts.values_mut() {
            chart.style = style;
        }
    }

    pub fn clear(&mut self) {
        self.charts.clear();
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}
