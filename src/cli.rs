//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report::HtmlReportAdapter;
use crate::domain::backtest::Backtester;
use crate::domain::error::PostesterError;
use crate::domain::registry::{IndicatorRegistry, IndicatorRequest};
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "postester", about = "Position-series strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest from a config file
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Write an HTML report here (overrides [report] output)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Indicator names, comma-separated, or "all" (overrides config)
        #[arg(short, long)]
        indicators: Option<String>,
    },
    /// List built-in indicators and their dependencies
    Indicators,
    /// Check a config file without running
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            indicators,
        } => run_backtest(&config, output.as_deref(), indicators.as_deref()),
        Command::Indicators => run_indicators(),
        Command::Validate { config } => run_validate(&config),
    }
}

fn load_config(path: &std::path::Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = PostesterError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_backtest(
    config_path: &std::path::Path,
    output: Option<&std::path::Path>,
    indicators: Option<&str>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(adapter) => adapter,
        Err(code) => return code,
    };

    match execute_backtest(&adapter, output, indicators) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(&err)
        }
    }
}

fn execute_backtest(
    adapter: &FileConfigAdapter,
    output: Option<&std::path::Path>,
    indicators: Option<&str>,
) -> Result<(), PostesterError> {
    let mut config = adapter.run_config()?;
    if let Some(list) = indicators {
        config.indicators = IndicatorRequest::parse(list);
    }

    let data = CsvAdapter::new(config.close_csv.clone(), config.position_csv.clone());
    let prices = data.fetch_closes()?;
    let positions = data.fetch_positions()?;

    let backtester = Backtester::new(config.commission, config.annual_trading_days)?;
    let result = backtester.run(&prices, &positions, &config.indicators)?;
    let params = backtester.params(&config.indicators);

    let width = result
        .metrics
        .iter()
        .map(|entry| entry.name.len())
        .max()
        .unwrap_or(9)
        .max(9);
    println!("{:<width$}  value", "indicator");
    for entry in &result.metrics {
        println!("{:<width$}  {}", entry.name, entry.formatted);
    }
    if let Some(index) = result.wipeout {
        eprintln!("warning: equity wiped out at period {index}; curve clamped to 0 afterwards");
    }

    let report_path = output.map(PathBuf::from).or(config.report_output);
    if let Some(path) = report_path {
        HtmlReportAdapter::new(config.report_title.clone()).write(&result, &params, &path)?;
        println!("report written to {}", path.display());
    }
    Ok(())
}

fn run_indicators() -> ExitCode {
    let registry = IndicatorRegistry::with_builtins();
    for name in registry.names() {
        let requires = registry
            .get(name)
            .map(|i| i.requires().join(", "))
            .unwrap_or_default();
        if requires.is_empty() {
            println!("{name}");
        } else {
            println!("{name} (requires: {requires})");
        }
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &std::path::Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(adapter) => adapter,
        Err(code) => return code,
    };
    match adapter.run_config() {
        Ok(config) => {
            println!(
                "config ok: commission={}, annual_trading_days={}, close={}, position={}",
                config.commission,
                config.annual_trading_days,
                config.close_csv.display(),
                config.position_csv.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn backtest_args_parse() {
        let cli = Cli::parse_from([
            "postester",
            "backtest",
            "--config",
            "run.ini",
            "--indicators",
            "sharpe_ratio,win_rate",
        ]);
        match cli.command {
            Command::Backtest {
                config,
                output,
                indicators,
            } => {
                assert_eq!(config, PathBuf::from("run.ini"));
                assert_eq!(output, None);
                assert_eq!(indicators.as_deref(), Some("sharpe_ratio,win_rate"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
