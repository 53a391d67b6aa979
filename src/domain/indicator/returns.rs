//! Return-based indicators: annualized return, volatility and the ratios
//! derived from them.

use crate::domain::cache::{CacheValue, CacheView};
use crate::domain::error::PostesterError;
use crate::domain::indicator::{format_percent, sample_stddev, Indicator};

/// Compounded return annualized over the trading calendar:
/// `curve.last() ^ (annual_trading_days / n_periods) - 1`.
pub struct AnnualReturn;

impl Indicator for AnnualReturn {
    fn name(&self) -> &str {
        "annual_return"
    }

    fn calculate(&self, cache: &CacheView) -> Result<CacheValue, PostesterError> {
        let curve = cache.series("curve")?;
        let annual_days = cache.scalar("annual_trading_days")?;
        let final_value = *curve.last().unwrap_or(&1.0);
        let periods = curve.len().saturating_sub(1).max(1) as f64;
        Ok(CacheValue::Scalar(
            final_value.powf(annual_days / periods) - 1.0,
        ))
    }

    fn format(&self, value: f64) -> String {
        format_percent(value)
    }
}

/// Annualized sample standard deviation of the net return series.
pub struct Volatility;

impl Indicator for Volatility {
    fn name(&self) -> &str {
        "volatility"
    }

    fn calculate(&self, cache: &CacheView) -> Result<CacheValue, PostesterError> {
        let returns = cache.series("returns")?;
        let annual_days = cache.scalar("annual_trading_days")?;
        Ok(CacheValue::Scalar(
            sample_stddev(returns) * annual_days.sqrt(),
        ))
    }

    fn format(&self, value: f64) -> String {
        format_percent(value)
    }
}

/// Annual return over annualized volatility; 0.0 when volatility is zero.
pub struct SharpeRatio;

impl Indicator for SharpeRatio {
    fn name(&self) -> &str {
        "sharpe_ratio"
    }

    fn requires(&self) -> &[&str] {
        &["annual_return", "volatility"]
    }

    fn calculate(&self, cache: &CacheView) -> Result<CacheValue, PostesterError> {
        let annual_return = cache.scalar("annual_return")?;
        let volatility = cache.scalar("volatility")?;
        let sharpe = if volatility > 0.0 {
            annual_return / volatility
        } else {
            0.0
        };
        Ok(CacheValue::Scalar(sharpe))
    }

    fn format(&self, value: f64) -> String {
        format!("{value:.2}")
    }
}

/// Annual return over annualized downside deviation (stddev of strictly
/// negative returns); 0.0 when there is no measurable downside.
pub struct SortinoRatio;

impl Indicator for SortinoRatio {
    fn name(&self) -> &str {
        "sortino_ratio"
    }

    fn requires(&self) -> &[&str] {
        &["annual_return"]
    }

    fn calculate(&self, cache: &CacheView) -> Result<CacheValue, PostesterError> {
        let annual_return = cache.scalar("annual_return")?;
        let returns = cache.series("returns")?;
        let annual_days = cache.scalar("annual_trading_days")?;

        let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
        let downside_vol = sample_stddev(&downside) * annual_days.sqrt();

        let sortino = if downside_vol > 0.0 {
            annual_return / downside_vol
        } else {
            0.0
        };
        Ok(CacheValue::Scalar(sortino))
    }

    fn format(&self, value: f64) -> String {
        format!("{value:.2}")
    }
}

/// Annual return over maximum drawdown; 0.0 when the curve never drew down.
pub struct CalmarRatio;

impl Indicator for CalmarRatio {
    fn name(&self) -> &str {
        "calmar_ratio"
    }

    fn requires(&self) -> &[&str] {
        &["annual_return", "max_drawdown"]
    }

    fn calculate(&self, cache: &CacheView) -> Result<CacheValue, PostesterError> {
        let annual_return = cache.scalar("annual_return")?;
        let max_drawdown = cache.scalar("max_drawdown")?;
        let calmar = if max_drawdown > 0.0 {
            annual_return / max_drawdown
        } else {
            0.0
        };
        Ok(CacheValue::Scalar(calmar))
    }

    fn format(&self, value: f64) -> String {
        format!("{value:.2}")
    }
}

/// Annual return converted to a monthly compounding rate.
pub struct MonthlyReturn;

impl Indicator for MonthlyReturn {
    fn name(&self) -> &str {
        "monthly_return"
    }

    fn requires(&self) -> &[&str] {
        &["annual_return"]
    }

    fn calculate(&self, cache: &CacheView) -> Result<CacheValue, PostesterError> {
        let annual_return = cache.scalar("annual_return")?;
        Ok(CacheValue::Scalar(
            (1.0 + annual_return).powf(1.0 / 12.0) - 1.0,
        ))
    }

    fn format(&self, value: f64) -> String {
        format_percent(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::Cache;
    use approx::assert_relative_eq;

    fn seeded(curve: Vec<f64>, returns: Vec<f64>, annual_days: f64) -> Cache {
        let mut cache = Cache::new();
        let positions = vec![1.0; curve.len()];
        cache.insert("curve", CacheValue::Series(curve));
        cache.insert("returns", CacheValue::Series(returns));
        cache.insert("position", CacheValue::Series(positions));
        cache.insert("commission", CacheValue::Scalar(0.0));
        cache.insert("annual_trading_days", CacheValue::Scalar(annual_days));
        cache
    }

    fn scalar(cache: &Cache, indicator: &dyn Indicator) -> f64 {
        indicator
            .calculate(&cache.view(indicator.name(), indicator.requires()))
            .unwrap()
            .as_scalar()
            .unwrap()
    }

    #[test]
    fn annual_return_closed_form() {
        // 10% over 21 periods annualized at 252 days: 1.1^12 - 1.
        let cache = seeded(vec![1.0; 21].into_iter().chain([1.1]).collect(), vec![0.0; 21], 252.0);
        let value = scalar(&cache, &AnnualReturn);
        assert_relative_eq!(value, 1.1_f64.powf(12.0) - 1.0, max_relative = 1e-12);
    }

    #[test]
    fn annual_return_flat_curve_is_zero() {
        let cache = seeded(vec![1.0, 1.0, 1.0], vec![0.0, 0.0], 252.0);
        assert!((scalar(&cache, &AnnualReturn)).abs() < 1e-12);
    }

    #[test]
    fn annual_return_wiped_curve_is_minus_one() {
        let cache = seeded(vec![1.0, 0.5, 0.0], vec![-0.5, -1.0], 252.0);
        assert_relative_eq!(scalar(&cache, &AnnualReturn), -1.0, max_relative = 1e-12);
    }

    #[test]
    fn volatility_annualizes_sample_stddev() {
        let returns = vec![0.01, -0.02, 0.015, 0.0];
        let expected = sample_stddev(&returns) * 252.0_f64.sqrt();
        let cache = seeded(vec![1.0; 5], returns, 252.0);
        assert_relative_eq!(scalar(&cache, &Volatility), expected, max_relative = 1e-12);
    }

    #[test]
    fn volatility_single_return_is_zero() {
        let cache = seeded(vec![1.0, 1.01], vec![0.01], 252.0);
        assert_eq!(scalar(&cache, &Volatility), 0.0);
    }

    #[test]
    fn sharpe_divides_annual_return_by_volatility() {
        let mut cache = seeded(vec![1.0, 1.1], vec![0.1], 252.0);
        cache.insert("annual_return", CacheValue::Scalar(0.3));
        cache.insert("volatility", CacheValue::Scalar(0.2));
        assert_relative_eq!(scalar(&cache, &SharpeRatio), 1.5, max_relative = 1e-12);
    }

    #[test]
    fn sharpe_zero_volatility_sentinel() {
        let mut cache = seeded(vec![1.0, 1.0], vec![0.0], 252.0);
        cache.insert("annual_return", CacheValue::Scalar(0.3));
        cache.insert("volatility", CacheValue::Scalar(0.0));
        assert_eq!(scalar(&cache, &SharpeRatio), 0.0);
    }

    #[test]
    fn sortino_uses_only_negative_returns() {
        let returns = vec![0.02, -0.01, 0.03, -0.03, 0.01];
        let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
        let downside_vol = sample_stddev(&downside) * 252.0_f64.sqrt();

        let mut cache = seeded(vec![1.0; 6], returns, 252.0);
        cache.insert("annual_return", CacheValue::Scalar(0.1));
        assert_relative_eq!(
            scalar(&cache, &SortinoRatio),
            0.1 / downside_vol,
            max_relative = 1e-12
        );
    }

    #[test]
    fn sortino_no_losses_sentinel() {
        let mut cache = seeded(vec![1.0; 4], vec![0.01, 0.02, 0.0], 252.0);
        cache.insert("annual_return", CacheValue::Scalar(0.5));
        assert_eq!(scalar(&cache, &SortinoRatio), 0.0);
    }

    #[test]
    fn calmar_divides_by_drawdown() {
        let mut cache = seeded(vec![1.0, 1.1], vec![0.1], 252.0);
        cache.insert("annual_return", CacheValue::Scalar(0.4));
        cache.insert("max_drawdown", CacheValue::Scalar(0.2));
        assert_relative_eq!(scalar(&cache, &CalmarRatio), 2.0, max_relative = 1e-12);
    }

    #[test]
    fn calmar_zero_drawdown_sentinel() {
        let mut cache = seeded(vec![1.0, 1.1], vec![0.1], 252.0);
        cache.insert("annual_return", CacheValue::Scalar(0.4));
        cache.insert("max_drawdown", CacheValue::Scalar(0.0));
        assert_eq!(scalar(&cache, &CalmarRatio), 0.0);
    }

    #[test]
    fn monthly_return_from_annual() {
        let mut cache = seeded(vec![1.0, 1.1], vec![0.1], 252.0);
        cache.insert("annual_return", CacheValue::Scalar(0.2));
        assert_relative_eq!(
            scalar(&cache, &MonthlyReturn),
            1.2_f64.powf(1.0 / 12.0) - 1.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn percent_formats() {
        assert_eq!(AnnualReturn.format(0.1234), "12.34%");
        assert_eq!(Volatility.format(0.05), "5.00%");
        assert_eq!(SharpeRatio.format(1.2345), "1.23");
    }
}
