//! Report generation port trait.

use crate::domain::backtest::{BacktestParams, BacktestResult};
use crate::domain::error::PostesterError;
use std::path::Path;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        params: &BacktestParams,
        output_path: &Path,
    ) -> Result<(), PostesterError>;
}
