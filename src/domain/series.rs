//! Time-indexed close and position series.
//!
//! `AlignedSeries` is the validation gate between external loaders and the
//! core: once constructed, downstream code may assume equal-length series,
//! matching strictly-increasing timestamps, positive finite closes and
//! finite positions.

use crate::domain::error::PostesterError;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub time: NaiveDateTime,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionPoint {
    pub time: NaiveDateTime,
    pub position: f64,
}

/// Validated, time-aligned close/position series.
#[derive(Debug, Clone)]
pub struct AlignedSeries {
    times: Vec<NaiveDateTime>,
    closes: Vec<f64>,
    positions: Vec<f64>,
}

impl AlignedSeries {
    /// Validate and combine the two input series.
    ///
    /// At least two points are required (one return period). Timestamps must
    /// be strictly increasing and identical across both series.
    pub fn try_new(
        prices: &[PricePoint],
        positions: &[PositionPoint],
    ) -> Result<Self, PostesterError> {
        if prices.len() != positions.len() {
            return Err(PostesterError::InvalidInput {
                reason: format!(
                    "close and position series must have the same length, got {} and {}",
                    prices.len(),
                    positions.len()
                ),
            });
        }
        if prices.len() < 2 {
            return Err(PostesterError::InvalidInput {
                reason: format!(
                    "at least 2 price points are required for one return period, got {}",
                    prices.len()
                ),
            });
        }

        for (price, position) in prices.iter().zip(positions) {
            if price.time != position.time {
                return Err(PostesterError::InvalidInput {
                    reason: format!(
                        "close and position timestamps differ: {} vs {}",
                        price.time, position.time
                    ),
                });
            }
            if !(price.close.is_finite() && price.close > 0.0) {
                return Err(PostesterError::InvalidInput {
                    reason: format!("non-positive close {} at {}", price.close, price.time),
                });
            }
            if !position.position.is_finite() {
                return Err(PostesterError::InvalidInput {
                    reason: format!("non-finite position at {}", position.time),
                });
            }
        }

        for window in prices.windows(2) {
            if window[1].time <= window[0].time {
                return Err(PostesterError::InvalidInput {
                    reason: format!(
                        "timestamps must be strictly increasing, got {} then {}",
                        window[0].time, window[1].time
                    ),
                });
            }
        }

        Ok(Self {
            times: prices.iter().map(|p| p.time).collect(),
            closes: prices.iter().map(|p| p.close).collect(),
            positions: positions.iter().map(|p| p.position).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }
}
