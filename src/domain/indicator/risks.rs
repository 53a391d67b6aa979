//! Risk indicators: drawdown depth, drawdown duration and win rate.

use crate::domain::cache::{CacheValue, CacheView};
use crate::domain::error::PostesterError;
use crate::domain::indicator::{format_percent, Indicator};

// Depth comparisons between the stored max drawdown and a rescan of the
// curve; must absorb compounding round-off only.
const DEPTH_EPSILON: f64 = 1e-12;

/// Deepest relative decline of the curve from its running peak:
/// `max over i of 1 - curve[i] / running_max(curve[0..=i])`.
/// Equal-depth troughs resolve to the earliest one.
pub struct MaxDrawdown;

impl Indicator for MaxDrawdown {
    fn name(&self) -> &str {
        "max_drawdown"
    }

    fn calculate(&self, cache: &CacheView) -> Result<CacheValue, PostesterError> {
        let curve = cache.series("curve")?;
        let mut peak = f64::NEG_INFINITY;
        let mut max_dd = 0.0;
        for &value in curve {
            if value > peak {
                peak = value;
            }
            if peak > 0.0 {
                let dd = 1.0 - value / peak;
                if dd > max_dd {
                    max_dd = dd;
                }
            }
        }
        Ok(CacheValue::Scalar(max_dd))
    }

    fn format(&self, value: f64) -> String {
        format_percent(value)
    }
}

/// Periods from the peak preceding the (earliest) maximum drawdown trough to
/// the first recovery back to that peak, or to the series end if equity never
/// recovers.
pub struct MaxDrawdownDuration;

impl Indicator for MaxDrawdownDuration {
    fn name(&self) -> &str {
        "max_drawdown_duration"
    }

    fn requires(&self) -> &[&str] {
        &["max_drawdown"]
    }

    fn calculate(&self, cache: &CacheView) -> Result<CacheValue, PostesterError> {
        let curve = cache.series("curve")?;
        let max_dd = cache.scalar("max_drawdown")?;
        if max_dd <= 0.0 {
            return Ok(CacheValue::Scalar(0.0));
        }

        // Earliest trough reaching the maximum depth, and the running peak
        // it fell from.
        let mut peak = f64::NEG_INFINITY;
        let mut trough = 0;
        let mut trough_peak = 0.0;
        for (i, &value) in curve.iter().enumerate() {
            if value > peak {
                peak = value;
            }
            if peak > 0.0 && 1.0 - value / peak >= max_dd - DEPTH_EPSILON {
                trough = i;
                trough_peak = peak;
                break;
            }
        }

        // First index where the curve attained that peak.
        let peak_index = curve
            .iter()
            .position(|&v| v >= trough_peak - DEPTH_EPSILON)
            .unwrap_or(0);

        // First recovery at or after the trough; series end if none.
        let end = curve[trough..]
            .iter()
            .position(|&v| v >= trough_peak)
            .map(|offset| trough + offset)
            .unwrap_or(curve.len());

        Ok(CacheValue::Scalar((end - peak_index) as f64))
    }

    fn format(&self, value: f64) -> String {
        format!("{value:.0} periods")
    }
}

/// Fraction of periods with strictly positive net return. Zero returns do
/// not count as wins.
pub struct WinRate;

impl Indicator for WinRate {
    fn name(&self) -> &str {
        "win_rate"
    }

    fn calculate(&self, cache: &CacheView) -> Result<CacheValue, PostesterError> {
        let returns = cache.series("returns")?;
        if returns.is_empty() {
            return Ok(CacheValue::Scalar(0.0));
        }
        let wins = returns.iter().filter(|r| **r > 0.0).count();
        Ok(CacheValue::Scalar(wins as f64 / returns.len() as f64))
    }

    fn format(&self, value: f64) -> String {
        format_percent(value)
    }
}
