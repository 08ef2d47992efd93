//! Terminal and JSON views of the dashboard.

use std::fmt::Write as _;
use wxdash_core::{ChartStyle, DashboardView, DayChart, DayRecord, Forecast, Theme, WeatherIcon};

const BAR_WIDTH: usize = 30;

/// Human-friendly cards on stdout, error banner on stderr.
#[derive(Debug, Default)]
pub struct TerminalView;

impl DashboardView for TerminalView {
    fn show_days(&mut self, forecast: &Forecast) {
        println!("{}", format_header(forecast));
        for day in &forecast.days {
            println!("{}", format_card(day));
        }
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("{}", format_banner(message));
    }

    fn show_chart(&mut self, day: &DayRecord, chart: &DayChart) {
        println!("{}", format_chart(day, chart));
    }

    fn hide_chart(&mut self, day: &DayRecord) {
        println!("{} {}: chart hidden", day.weekday, day.date.date());
    }
}

/// Machine-readable output. Everything shown during a run is folded into one
/// JSON document: the forecast with its expanded charts keyed by date, or an
/// `error` object.
#[derive(Debug, Default)]
pub struct JsonView {
    document: Option<serde_json::Value>,
}

impl JsonView {
    pub fn document(&self) -> Option<&serde_json::Value> {
        self.document.as_ref()
    }

    pub fn print(&self) {
        let Some(document) = &self.document else {
            return;
        };
        match serde_json::to_string_pretty(document) {
            Ok(s) => println!("{s}"),
            Err(e) => tracing::error!("Failed to serialize output: {}", e),
        }
    }

    fn charts_mut(&mut self) -> Option<&mut serde_json::Map<String, serde_json::Value>> {
        self.document.as_mut()?.get_mut("charts")?.as_object_mut()
    }
}

impl DashboardView for JsonView {
    fn show_days(&mut self, forecast: &Forecast) {
        match serde_json::to_value(forecast) {
            Ok(mut v) => {
                if let Some(obj) = v.as_object_mut() {
                    obj.insert("charts".to_string(), serde_json::json!({}));
                }
                self.document = Some(v);
            }
            Err(e) => tracing::error!("Failed to serialize forecast: {}", e),
        }
    }

    fn show_error(&mut self, message: &str) {
        self.document = Some(serde_json::json!({ "error": message }));
    }

    fn show_chart(&mut self, day: &DayRecord, chart: &DayChart) {
        let chart = match serde_json::to_value(chart) {
            Ok(chart) => chart,
            Err(e) => {
                tracing::error!("Failed to serialize chart: {}", e);
                return;
            }
        };
        if let Some(charts) = self.charts_mut() {
            charts.insert(day.date.to_string(), chart);
        }
    }

    fn hide_chart(&mut self, day: &DayRecord) {
        if let Some(charts) = self.charts_mut() {
            charts.remove(&day.date.to_string());
        }
    }
}

fn icon_glyph(icon: WeatherIcon) -> &'static str {
    match icon {
        WeatherIcon::HeavyShowers => "🌧",
        WeatherIcon::Windy => "💨",
        WeatherIcon::SunnyHot => "☀",
        WeatherIcon::Snow => "❄",
        WeatherIcon::PartlyCloudy => "⛅",
    }
}

pub fn format_header(forecast: &Forecast) -> String {
    format!(
        "Weather for {} ({}), last {} days",
        forecast.place,
        forecast.coords,
        forecast.days.len()
    )
}

pub fn format_card(day: &DayRecord) -> String {
    let c = &day.conditions;
    format!(
        "── {} {} {} {}\n   Max: {}°C  Min: {}°C  Wind: {} m/s  Rain: {} mm\n   Hot {:.0}% · Cold {:.0}% · Windy {:.0}% · Rainy {:.0}%",
        day.weekday,
        day.date.date(),
        icon_glyph(day.icon),
        day.icon,
        day.max_temp,
        day.min_temp,
        day.wind,
        day.rain,
        c.hot,
        c.cold,
        c.windy,
        c.rainy,
    )
}

pub fn format_banner(message: &str) -> String {
    let rule = "!".repeat(message.chars().count() + 4);
    format!("{rule}\n! {message} !\n{rule}")
}

fn bar_glyph(style: &ChartStyle) -> char {
    if *style == ChartStyle::for_theme(Theme::Light) { '▓' } else { '█' }
}

pub fn format_chart(day: &DayRecord, chart: &DayChart) -> String {
    let glyph = bar_glyph(&chart.style);
    let scale = chart.bars.iter().map(|b| b.value.abs()).fold(0.0_f64, f64::max);

    let mut out = format!("   {} ({} {})", chart.title, day.weekday, day.date.date());
    for bar in &chart.bars {
        let len = if scale > 0.0 {
            (bar.value.abs() / scale * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let sign = if bar.value < 0.0 { "-" } else { "" };
        let _ = write!(
            out,
            "\n   {:<14} {}{} {:.1}",
            bar.label,
            sign,
            glyph.to_string().repeat(len),
            bar.value
        );
    }
    out
}
