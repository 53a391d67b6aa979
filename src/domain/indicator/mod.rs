//! Indicator contract and built-in metric implementations.
//!
//! An indicator is a named, pure computation over the run cache. It declares
//! the other indicators it reads via `requires`; the engine guarantees those
//! are evaluated first and scopes the cache view accordingly. Degenerate
//! numeric cases (zero volatility, zero drawdown, wiped-out equity) produce
//! the documented 0.0 sentinels, never errors.

pub mod returns;
pub mod risks;

use crate::domain::cache::{CacheValue, CacheView};
use crate::domain::error::PostesterError;

pub trait Indicator {
    /// Unique, stable identity; doubles as the cache key for the result.
    fn name(&self) -> &str;

    /// Names of other indicators this one reads from the cache. Base keys
    /// (`curve`, `returns`, `position`, `commission`, `annual_trading_days`)
    /// are always readable and never listed here.
    fn requires(&self) -> &[&str] {
        &[]
    }

    /// Compute the value from the cache contents at call time.
    fn calculate(&self, cache: &CacheView) -> Result<CacheValue, PostesterError>;

    /// Human-readable rendering for tables and reports.
    fn format(&self, value: f64) -> String {
        format!("{value:.4}")
    }
}

/// All built-in indicators, in registration order.
pub fn builtin_indicators() -> Vec<Box<dyn Indicator>> {
    vec![
        Box::new(returns::AnnualReturn),
        Box::new(returns::Volatility),
        Box::new(returns::SharpeRatio),
        Box::new(risks::MaxDrawdown),
        Box::new(risks::MaxDrawdownDuration),
        Box::new(risks::WinRate),
        Box::new(returns::SortinoRatio),
        Box::new(returns::CalmarRatio),
        Box::new(returns::MonthlyReturn),
    ]
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof = 1); 0.0 for fewer than two values.
pub(crate) fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

pub(crate) fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}
