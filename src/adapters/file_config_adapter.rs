//! INI file configuration adapter.
//!
//! Generic `ConfigPort` access over `configparser`, plus typed extraction
//! of the sections a backtest run needs:
//!
//! ```ini
//! [data]
//! close_csv = data/close.csv
//! position_csv = data/position.csv
//!
//! [backtest]
//! commission = 0.001
//! annual_trading_days = 252
//! indicators = all
//!
//! [report]
//! title = My Strategy
//! output = report.html
//! ```

use crate::domain::error::PostesterError;
use crate::domain::registry::IndicatorRequest;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::{Path, PathBuf};

use crate::domain::backtest::DEFAULT_ANNUAL_TRADING_DAYS;

/// Fully extracted run configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub close_csv: PathBuf,
    pub position_csv: PathBuf,
    pub commission: f64,
    pub annual_trading_days: u32,
    pub indicators: IndicatorRequest,
    pub report_title: String,
    pub report_output: Option<PathBuf>,
}

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn require(&self, section: &str, key: &str) -> Result<String, PostesterError> {
        self.get_string(section, key)
            .ok_or_else(|| PostesterError::ConfigMissing {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    fn require_f64(&self, section: &str, key: &str) -> Result<f64, PostesterError> {
        let raw = self.require(section, key)?;
        raw.parse().map_err(|_| PostesterError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("expected a number, got '{raw}'"),
        })
    }

    /// Extract and type-check everything a run needs.
    pub fn run_config(&self) -> Result<RunConfig, PostesterError> {
        let close_csv = PathBuf::from(self.require("data", "close_csv")?);
        let position_csv = PathBuf::from(self.require("data", "position_csv")?);

        let commission = self.require_f64("backtest", "commission")?;
        if !(0.0..1.0).contains(&commission) {
            return Err(PostesterError::ConfigInvalid {
                section: "backtest".into(),
                key: "commission".into(),
                reason: format!("must be in [0, 1), got {commission}"),
            });
        }

        let annual_trading_days = self.get_int(
            "backtest",
            "annual_trading_days",
            DEFAULT_ANNUAL_TRADING_DAYS as i64,
        );
        let annual_trading_days =
            u32::try_from(annual_trading_days).ok().filter(|d| *d > 0).ok_or_else(|| {
                PostesterError::ConfigInvalid {
                    section: "backtest".into(),
                    key: "annual_trading_days".into(),
                    reason: format!("must be a positive integer, got {annual_trading_days}"),
                }
            })?;

        let indicators = self
            .get_string("backtest", "indicators")
            .map(|value| IndicatorRequest::parse(&value))
            .unwrap_or(IndicatorRequest::All);

        let report_title = self
            .get_string("report", "title")
            .unwrap_or_else(|| "Backtest Report".to_string());
        let report_output = self.get_string("report", "output").map(PathBuf::from);

        Ok(RunConfig {
            close_csv,
            position_csv,
            commission,
            annual_trading_days,
            indicators,
            report_title,
            report_output,
        })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .getbool(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}
