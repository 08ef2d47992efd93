use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Confirm, CustomType, Select, Text};
use std::{fmt, process::ExitCode};
use wxdash_core::{Config, Coordinates, Dashboard, DashboardView, DateKey, Theme, pipeline_from_config};

use crate::render::{JsonView, TerminalView};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "wxdash", version, about = "Ten days of weather history for where you are")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the last ten days of weather for your location.
    Show {
        /// Latitude to use instead of detecting the position.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude to use instead of detecting the position.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Print the forecast, with any expanded charts, as one JSON document.
        #[arg(long)]
        json: bool,

        /// Expand the chart of a day (YYYYMMDD). Repeatable.
        #[arg(long = "chart", value_name = "YYYYMMDD")]
        charts: Vec<String>,

        /// Pick cards to expand interactively.
        #[arg(long, short, conflicts_with = "json")]
        interactive: bool,
    },

    /// Print or change the colour theme.
    Theme {
        mode: Option<ThemeMode>,
    },

    /// Interactively set the default location, positioning and theme.
    Configure,

    /// Print the path of the configuration file.
    ConfigPath,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeMode {
    Light,
    Dark,
    Toggle,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Show { lat, lon, json, charts, interactive } => {
                let explicit = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
                show(explicit, json, &charts, interactive).await
            }
            Command::Theme { mode } => {
                theme(mode)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

async fn show(
    explicit: Option<Coordinates>,
    json: bool,
    charts: &[String],
    interactive: bool,
) -> anyhow::Result<ExitCode> {
    let dates = charts
        .iter()
        .map(|c| c.parse::<DateKey>().with_context(|| format!("Invalid --chart value '{c}'")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut config = Config::load()?;
    let pipeline = pipeline_from_config(&config, explicit)?;

    if json {
        let mut dashboard = Dashboard::new(JsonView::default(), config.theme);
        let code = render(&mut dashboard, &pipeline, &dates).await?;
        dashboard.view().print();
        return Ok(code);
    }

    let mut dashboard = Dashboard::new(TerminalView, config.theme);
    let code = render(&mut dashboard, &pipeline, &dates).await?;
    if interactive && code == ExitCode::SUCCESS {
        pick_cards(&mut dashboard, &mut config)?;
    }
    Ok(code)
}

async fn render<V: DashboardView>(
    dashboard: &mut Dashboard<V>,
    pipeline: &wxdash_core::WeatherPipeline,
    dates: &[DateKey],
) -> anyhow::Result<ExitCode> {
    if dashboard.refresh(pipeline).await.is_err() {
        // Already shown as the error banner.
        return Ok(ExitCode::FAILURE);
    }

    for date in dates {
        if dashboard.toggle_day(date).is_none() {
            tracing::warn!(%date, "no card for this day");
        }
    }

    Ok(ExitCode::SUCCESS)
}

enum Pick {
    Day(DateKey, String),
    ToggleTheme,
    Quit,
}

impl fmt::Display for Pick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pick::Day(_, label) => f.write_str(label),
            Pick::ToggleTheme => f.write_str("Toggle theme"),
            Pick::Quit => f.write_str("Quit"),
        }
    }
}

/// Card picker: selecting a day flips its chart, like clicking a card.
fn pick_cards(dashboard: &mut Dashboard<TerminalView>, config: &mut Config) -> anyhow::Result<()> {
    loop {
        let mut options: Vec<Pick> = dashboard
            .days()
            .iter()
            .map(|d| {
                let marker = if dashboard.is_expanded(&d.date) { "▾" } else { "▸" };
                Pick::Day(d.date, format!("{marker} {} {}", d.weekday, d.date.date()))
            })
            .collect();
        options.push(Pick::ToggleTheme);
        options.push(Pick::Quit);

        let picked = match Select::new("Day:", options).prompt() {
            Ok(p) => p,
            Err(
                inquire::InquireError::OperationCanceled
                | inquire::InquireError::OperationInterrupted,
            ) => return Ok(()),
            Err(e) => return Err(e).context("Card picker failed"),
        };

        match picked {
            Pick::Day(date, _) => {
                dashboard.toggle_day(&date);
            }
            Pick::ToggleTheme => {
                let theme = config.toggle_theme();
                config.save()?;
                dashboard.set_theme(theme);
                println!("Theme: {theme}");
            }
            Pick::Quit => return Ok(()),
        }
    }
}

fn theme(mode: Option<ThemeMode>) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let Some(mode) = mode else {
        println!("{}", config.theme);
        return Ok(());
    };

    config.theme = match mode {
        ThemeMode::Light => Theme::Light,
        ThemeMode::Dark => Theme::Dark,
        ThemeMode::Toggle => config.theme.toggled(),
    };
    config.save()?;

    println!("Theme set to {}", config.theme);
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    config.fallback.latitude = CustomType::<f64>::new("Default latitude:")
        .with_default(config.fallback.latitude)
        .prompt()?;
    config.fallback.longitude = CustomType::<f64>::new("Default longitude:")
        .with_default(config.fallback.longitude)
        .prompt()?;
    config.fallback.label = Text::new("Default location label:")
        .with_default(&config.fallback.label)
        .prompt()?;
    config.locator.enabled = Confirm::new("Detect position from your IP address?")
        .with_default(config.locator.enabled)
        .prompt()?;

    let starting_cursor = if config.theme.is_light() { 0 } else { 1 };
    config.theme = Select::new("Theme:", vec![Theme::Light, Theme::Dark])
        .with_starting_cursor(starting_cursor)
        .prompt()?;

    config.save()?;
    println!("Saved {}", Config::config_file_path()?.display());
    Ok(())
}
