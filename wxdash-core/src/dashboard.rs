//! Owns what is on screen: the current day records, the expanded cards and
//! their charts.

use std::collections::HashSet;
use tracing::debug;

use crate::{
    chart::{ChartRegistry, DayChart},
    days::DayRecord,
    error::PipelineError,
    model::DateKey,
    pipeline::{Forecast, WeatherPipeline},
    theme::Theme,
};

/// Rendering surface. One card per record, in the given order.
pub trait DashboardView {
    fn show_days(&mut self, forecast: &Forecast);

    /// Error banner. Replaces any cards.
    fn show_error(&mut self, message: &str);

    fn show_chart(&mut self, day: &DayRecord, chart: &DayChart);

    fn hide_chart(&mut self, _day: &DayRecord) {}
}

#[derive(Debug)]
pub struct Dashboard<V> {
    view: V,
    theme: Theme,
    forecast: Option<Forecast>,
    charts: ChartRegistry,
    expanded: HashSet<DateKey>,
}

impl<V: DashboardView> Dashboard<V> {
    pub fn new(view: V, theme: Theme) -> Self {
        Self {
            view,
            theme,
            forecast: None,
            charts: ChartRegistry::new(),
            expanded: HashSet::new(),
        }
    }

    /// Run the pipeline and show either the new cards or a single error.
    ///
    /// Previous cards and charts are dropped in both cases. The error is
    /// returned after it has been shown.
    pub async fn refresh(&mut self, pipeline: &WeatherPipeline) -> Result<(), PipelineError> {
        let result = pipeline.run().await;

        self.charts.clear();
        self.expanded.clear();
        self.forecast = None;

        match result {
            Ok(forecast) => {
                debug!(days = forecast.days.len(), place = %forecast.place, "rendering forecast");
                self.view.show_days(&forecast);
                self.forecast = Some(forecast);
                Ok(())
            }
            Err(e) => {
                self.view.show_error(e.user_message());
                Err(e)
            }
        }
    }

    /// Expand or collapse a card. The chart is created the first time the
    /// card is expanded and reused afterwards.
    ///
    /// Returns the new expanded state, or `None` if no such day is shown.
    pub fn toggle_day(&mut self, date: &DateKey) -> Option<bool> {
        let day = self.forecast.as_ref()?.days.iter().find(|d| d.date == *date)?;

        if self.expanded.remove(date) {
            self.view.hide_chart(day);
            return Some(false);
        }

        self.expanded.insert(*date);
        let (chart, created) = self.charts.get_or_create(day, self.theme);
        if created {
            debug!(%date, "created chart");
        }
        self.view.show_chart(day, chart);
        Some(true)
    }

    /// Switch theme and re-colour charts that already exist.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.charts.restyle(theme);

        let Some(forecast) = &self.forecast else {
            return;
        };
        for day in forecast.days.iter().filter(|d| self.expanded.contains(&d.date)) {
            if let Some(chart) = self.charts.get(&day.date) {
                self.view.show_chart(day, chart);
            }
        }
    }

    pub fn forecast(&self) -> Option<&Forecast> {
        self.forecast.as_ref()
    }

    pub fn days(&self) -> &[DayRecord] {
        self.forecast.as_ref().map(|f| f.days.as_slice()).unwrap_or(&[])
    }

    pub fn is_expanded(&self, date: &DateKey) -> bool {
        self.expanded.contains(date)
    }

    pub fn charts(&self) -> &ChartRegistry {
        &self.charts
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn view(&self) -> &V {
        &self.view
    }
}
