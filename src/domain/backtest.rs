//! Backtest engine: orchestrates curve construction, dependency resolution
//! and sequential indicator evaluation.
//!
//! Each `run` call owns a fresh cache; the registry is read-only once
//! registration is finished, so a `Backtester` can serve repeated runs and
//! two identical runs produce bit-identical results. All validation and
//! resolution errors surface before any indicator executes; a partial
//! metrics mapping is never returned.

use crate::domain::cache::{Cache, CacheValue};
use crate::domain::curve::{build_curve, CurveResult};
use crate::domain::error::PostesterError;
use crate::domain::indicator::Indicator;
use crate::domain::registry::{IndicatorRegistry, IndicatorRequest};
use crate::domain::series::{AlignedSeries, PositionPoint, PricePoint};
use chrono::NaiveDateTime;
use std::collections::HashSet;

pub const DEFAULT_ANNUAL_TRADING_DAYS: u32 = 252;

#[derive(Debug, Clone)]
pub struct BacktestParams {
    pub commission: f64,
    pub annual_trading_days: u32,
    pub indicators: Vec<String>,
}

/// One surfaced metric: name, raw value and display rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEntry {
    pub name: String,
    pub value: f64,
    pub formatted: String,
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    /// Requested indicators only, in evaluation order.
    pub metrics: Vec<MetricEntry>,
    /// Series-valued indicator results that were requested.
    pub series: Vec<(String, Vec<f64>)>,
    pub times: Vec<NaiveDateTime>,
    pub curve: Vec<f64>,
    pub returns: Vec<f64>,
    pub wipeout: Option<usize>,
}

impl BacktestResult {
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value)
    }

    pub fn start_time(&self) -> Option<NaiveDateTime> {
        self.times.first().copied()
    }

    pub fn end_time(&self) -> Option<NaiveDateTime> {
        self.times.last().copied()
    }
}

pub struct Backtester {
    commission: f64,
    annual_trading_days: u32,
    registry: IndicatorRegistry,
}

impl Backtester {
    /// Validates parameters and registers the built-in indicators.
    pub fn new(commission: f64, annual_trading_days: u32) -> Result<Self, PostesterError> {
        if !(0.0..1.0).contains(&commission) {
            return Err(PostesterError::InvalidInput {
                reason: format!("commission must be in [0, 1), got {commission}"),
            });
        }
        if annual_trading_days == 0 {
            return Err(PostesterError::InvalidInput {
                reason: "annual_trading_days must be positive".into(),
            });
        }
        Ok(Self {
            commission,
            annual_trading_days,
            registry: IndicatorRegistry::with_builtins(),
        })
    }

    /// Register a user indicator; available to the next `run`.
    pub fn add_indicator(&mut self, indicator: Box<dyn Indicator>) -> Result<(), PostesterError> {
        self.registry.register(indicator)
    }

    pub fn registry(&self) -> &IndicatorRegistry {
        &self.registry
    }

    pub fn params(&self, request: &IndicatorRequest) -> BacktestParams {
        BacktestParams {
            commission: self.commission,
            annual_trading_days: self.annual_trading_days,
            indicators: self.registry.requested_names(request),
        }
    }

    pub fn run(
        &self,
        prices: &[PricePoint],
        positions: &[PositionPoint],
        request: &IndicatorRequest,
    ) -> Result<BacktestResult, PostesterError> {
        let series = AlignedSeries::try_new(prices, positions)?;
        let CurveResult {
            curve,
            returns,
            wipeout,
        } = build_curve(&series, self.commission);

        // Resolution comes before evaluation so unknown names and cycles
        // fail without touching the cache.
        let order = self.registry.resolve(request)?;

        let mut cache = Cache::new();
        cache.insert("curve", CacheValue::Series(curve.clone()));
        cache.insert("returns", CacheValue::Series(returns.clone()));
        cache.insert("position", CacheValue::Series(series.positions().to_vec()));
        cache.insert("commission", CacheValue::Scalar(self.commission));
        cache.insert(
            "annual_trading_days",
            CacheValue::Scalar(self.annual_trading_days as f64),
        );

        let requested: HashSet<String> = self
            .registry
            .requested_names(request)
            .into_iter()
            .collect();

        let mut metrics = Vec::new();
        let mut series_results = Vec::new();
        for indicator in order {
            let view = cache.view(indicator.name(), indicator.requires());
            let value = indicator.calculate(&view)?;
            cache.insert(indicator.name(), value.clone());

            if !requested.contains(indicator.name()) {
                continue;
            }
            match value {
                CacheValue::Scalar(v) => metrics.push(MetricEntry {
                    name: indicator.name().to_string(),
                    value: v,
                    formatted: indicator.format(v),
                }),
                CacheValue::Series(values) => {
                    series_results.push((indicator.name().to_string(), values));
                }
            }
        }

        Ok(BacktestResult {
            metrics,
            series: series_results,
            times: series.times().to_vec(),
            curve,
            returns,
            wipeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheView;
    use chrono::NaiveDate;

    fn t(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn points(closes: &[f64], positions: &[f64]) -> (Vec<PricePoint>, Vec<PositionPoint>) {
        let prices = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                time: t(i as u32 + 1),
                close,
            })
            .collect();
        let positions = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| PositionPoint {
                time: t(i as u32 + 1),
                position,
            })
            .collect();
        (prices, positions)
    }

    #[test]
    fn invalid_commission_rejected() {
        assert!(Backtester::new(-0.1, 252).is_err());
        assert!(Backtester::new(1.0, 252).is_err());
        assert!(Backtester::new(0.0, 252).is_ok());
    }

    #[test]
    fn zero_trading_days_rejected() {
        assert!(Backtester::new(0.001, 0).is_err());
    }

    #[test]
    fn run_surfaces_requested_metrics_in_evaluation_order() {
        let backtester = Backtester::new(0.0, 252).unwrap();
        let (prices, positions) = points(&[100.0, 101.0, 99.0, 102.0], &[1.0, 1.0, 1.0, 1.0]);
        let result = backtester
            .run(&prices, &positions, &IndicatorRequest::All)
            .unwrap();

        let names: Vec<&str> = result.metrics.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "annual_return",
                "volatility",
                "sharpe_ratio",
                "max_drawdown",
                "max_drawdown_duration",
                "win_rate",
                "sortino_ratio",
                "calmar_ratio",
                "monthly_return",
            ]
        );
    }

    #[test]
    fn dependencies_computed_but_not_surfaced_unless_requested() {
        let backtester = Backtester::new(0.0, 252).unwrap();
        let (prices, positions) = points(&[100.0, 101.0, 99.0, 102.0], &[1.0, 1.0, 1.0, 1.0]);
        let request = IndicatorRequest::Named(vec!["sharpe_ratio".into()]);
        let result = backtester.run(&prices, &positions, &request).unwrap();

        assert_eq!(result.metrics.len(), 1);
        assert_eq!(result.metrics[0].name, "sharpe_ratio");
        assert!(result.metric("annual_return").is_none());
        assert!(result.metric("volatility").is_none());
    }

    #[test]
    fn run_is_idempotent() {
        let backtester = Backtester::new(0.001, 252).unwrap();
        let (prices, positions) = points(
            &[100.0, 101.0, 102.0, 101.0, 103.0],
            &[0.0, 1.0, 1.0, 0.0, 1.0],
        );
        let first = backtester
            .run(&prices, &positions, &IndicatorRequest::All)
            .unwrap();
        let second = backtester
            .run(&prices, &positions, &IndicatorRequest::All)
            .unwrap();

        assert_eq!(first.metrics, second.metrics);
        assert_eq!(first.curve, second.curve);
        assert_eq!(first.returns, second.returns);
    }

    #[test]
    fn annual_return_matches_closed_form() {
        let backtester = Backtester::new(0.001, 252).unwrap();
        let (prices, positions) = points(
            &[100.0, 101.0, 102.0, 101.0, 103.0],
            &[0.0, 1.0, 1.0, 0.0, 1.0],
        );
        let result = backtester
            .run(&prices, &positions, &IndicatorRequest::All)
            .unwrap();

        // Recompute the curve by hand from the documented return formula.
        let returns = [
            0.0,
            (102.0 / 101.0 - 1.0) - 0.001,
            101.0 / 102.0 - 1.0,
            -0.001,
        ];
        let final_value: f64 = returns.iter().map(|r| 1.0 + r).product();
        let expected = final_value.powf(252.0 / 4.0) - 1.0;

        let annual_return = result.metric("annual_return").unwrap();
        assert!((annual_return - expected).abs() < 1e-9);
    }

    #[test]
    fn unknown_request_fails_without_metrics() {
        let backtester = Backtester::new(0.0, 252).unwrap();
        let (prices, positions) = points(&[100.0, 101.0], &[1.0, 1.0]);
        let request = IndicatorRequest::Named(vec!["ghost".into()]);
        let err = backtester.run(&prices, &positions, &request).unwrap_err();
        assert!(matches!(err, PostesterError::UnknownIndicator { .. }));
    }

    #[test]
    fn user_indicator_participates_after_registration() {
        struct DoubleSharpe;
        impl Indicator for DoubleSharpe {
            fn name(&self) -> &str {
                "double_sharpe"
            }
            fn requires(&self) -> &[&str] {
                &["sharpe_ratio"]
            }
            fn calculate(&self, cache: &CacheView) -> Result<CacheValue, PostesterError> {
                Ok(CacheValue::Scalar(cache.scalar("sharpe_ratio")? * 2.0))
            }
        }

        let mut backtester = Backtester::new(0.0, 252).unwrap();
        backtester.add_indicator(Box::new(DoubleSharpe)).unwrap();

        let (prices, positions) = points(&[100.0, 101.0, 99.0, 102.0], &[1.0, 1.0, 1.0, 1.0]);
        let request = IndicatorRequest::Named(vec!["double_sharpe".into(), "sharpe_ratio".into()]);
        let result = backtester.run(&prices, &positions, &request).unwrap();

        let sharpe = result.metric("sharpe_ratio").unwrap();
        let double = result.metric("double_sharpe").unwrap();
        assert!((double - 2.0 * sharpe).abs() < 1e-12);
    }

    #[test]
    fn undeclared_read_is_fatal() {
        struct Sneaky;
        impl Indicator for Sneaky {
            fn name(&self) -> &str {
                "sneaky"
            }
            fn calculate(&self, cache: &CacheView) -> Result<CacheValue, PostesterError> {
                // No declared requires, so this read must fail even though
                // annual_return was evaluated first.
                Ok(CacheValue::Scalar(cache.scalar("annual_return")?))
            }
        }

        let mut backtester = Backtester::new(0.0, 252).unwrap();
        backtester.add_indicator(Box::new(Sneaky)).unwrap();

        let (prices, positions) = points(&[100.0, 101.0], &[1.0, 1.0]);
        let request =
            IndicatorRequest::Named(vec!["annual_return".into(), "sneaky".into()]);
        let err = backtester.run(&prices, &positions, &request).unwrap_err();
        match err {
            PostesterError::MissingDependency { indicator, key } => {
                assert_eq!(indicator, "sneaky");
                assert_eq!(key, "annual_return");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn series_valued_indicator_surfaces_separately() {
        struct DrawdownSeries;
        impl Indicator for DrawdownSeries {
            fn name(&self) -> &str {
                "drawdown_series"
            }
            fn calculate(&self, cache: &CacheView) -> Result<CacheValue, PostesterError> {
                let curve = cache.series("curve")?;
                let mut peak = f64::NEG_INFINITY;
                let series = curve
                    .iter()
                    .map(|&v| {
                        if v > peak {
                            peak = v;
                        }
                        1.0 - v / peak
                    })
                    .collect();
                Ok(CacheValue::Series(series))
            }
        }

        let mut backtester = Backtester::new(0.0, 252).unwrap();
        backtester.add_indicator(Box::new(DrawdownSeries)).unwrap();

        let (prices, positions) = points(&[100.0, 110.0, 99.0], &[1.0, 1.0, 1.0]);
        let request = IndicatorRequest::Named(vec!["drawdown_series".into()]);
        let result = backtester.run(&prices, &positions, &request).unwrap();

        assert!(result.metrics.is_empty());
        assert_eq!(result.series.len(), 1);
        assert_eq!(result.series[0].0, "drawdown_series");
        assert_eq!(result.series[0].1.len(), 3);
    }

    #[test]
    fn params_reflect_request() {
        let backtester = Backtester::new(0.002, 365).unwrap();
        let params = backtester.params(&IndicatorRequest::Named(vec!["win_rate".into()]));
        assert!((params.commission - 0.002).abs() < f64::EPSILON);
        assert_eq!(params.annual_trading_days, 365);
        assert_eq!(params.indicators, vec!["win_rate"]);
    }
}
