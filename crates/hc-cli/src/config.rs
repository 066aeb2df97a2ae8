//! Configuration loading and management.

use std::path::{Path, PathBuf};

use chrono::Weekday;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use hc_core::{DayHours, LayoutOptions, ValidationError};
use serde::{Deserialize, Serialize};

/// First column of week and month views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    pub const fn weekday(self) -> Weekday {
        match self {
            Self::Monday => Weekday::Mon,
            Self::Sunday => Weekday::Sun,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the JSON file holding service definitions.
    pub services_path: PathBuf,
    /// First visible hour of a day column.
    pub day_start_hour: u32,
    /// Hour the day column ends at (24 = midnight).
    pub day_end_hour: u32,
    /// Smallest block height, as a fraction of the visible day.
    pub min_height_fraction: f64,
    /// Lanes shown side by side in the day view.
    pub max_parallel_lanes: usize,
    /// Visits previewed per month cell.
    pub month_preview_limit: usize,
    pub week_starts_on: WeekStart,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            services_path: data_dir.join("services.json"),
            day_start_hour: 0,
            day_end_hour: 24,
            min_height_fraction: 0.02,
            max_parallel_lanes: 3,
            month_preview_limit: 3,
            week_starts_on: WeekStart::Monday,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (HC_*)
        figment = figment.merge(Env::prefixed("HC_"));

        figment.extract()
    }

    /// The visible hours of each day column.
    pub fn day_hours(&self) -> Result<DayHours, ValidationError> {
        DayHours::new(self.day_start_hour, self.day_end_hour)
    }

    /// Layout options for the day view, with the parallel-lane cap applied.
    pub const fn day_layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            min_height_fraction: self.min_height_fraction,
            max_parallel_lanes: Some(self.max_parallel_lanes),
        }
    }
}

/// Returns the platform-specific config directory for hc.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hc"))
}

/// Returns the platform-specific data directory for hc.
///
/// On Linux: `~/.local/share/hc`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("hc"))
}
