//! Equity curve construction.
//!
//! Turns a validated close/position series and a commission rate into a
//! per-period net return series and a cumulative compounded equity curve
//! starting at 1.0.
//!
//! For period i (1-based over the close series):
//!   raw return  = (close[i] / close[i-1] - 1) * position[i-1]
//!   change cost = |position[i-1] - position[i-2]| * commission  (i >= 2)
//!                 |position[0]| * commission                    (i == 1)
//!   net return  = raw return - change cost
//!
//! Opening a position from flat is itself a cost event, charged in the first
//! period the new position earns returns.

use crate::domain::series::AlignedSeries;

/// Derived series: `returns.len() == series.len() - 1`,
/// `curve.len() == returns.len() + 1` with `curve[0] == 1.0`.
#[derive(Debug, Clone)]
pub struct CurveResult {
    pub curve: Vec<f64>,
    pub returns: Vec<f64>,
    /// Curve index of the first period whose net return wiped out all
    /// equity (net return <= -1). From that index on the curve is clamped
    /// to 0.0 and never recovers.
    pub wipeout: Option<usize>,
}

pub fn build_curve(series: &AlignedSeries, commission: f64) -> CurveResult {
    let closes = series.closes();
    let positions = series.positions();
    let periods = closes.len() - 1;

    let mut returns = Vec::with_capacity(periods);
    let mut curve = Vec::with_capacity(periods + 1);
    curve.push(1.0);
    let mut wipeout = None;

    for i in 1..closes.len() {
        let raw = (closes[i] / closes[i - 1] - 1.0) * positions[i - 1];
        let change = if i >= 2 {
            (positions[i - 1] - positions[i - 2]).abs()
        } else {
            positions[0].abs()
        };
        let net = raw - change * commission;
        returns.push(net);

        let prev = curve[i - 1];
        let next = prev * (1.0 + net);
        if next <= 0.0 {
            if wipeout.is_none() && prev > 0.0 {
                wipeout = Some(i);
            }
            curve.push(0.0);
        } else {
            curve.push(next);
        }
    }

    CurveResult {
        curve,
        returns,
        wipeout,
    }
}
