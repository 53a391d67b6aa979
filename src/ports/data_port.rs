//! Series loading port trait.
//!
//! Loaders return sorted, deduplicated series; timestamp alignment across
//! the two series is checked by the domain when a run starts.

use crate::domain::error::PostesterError;
use crate::domain::series::{PositionPoint, PricePoint};

pub trait DataPort {
    fn fetch_closes(&self) -> Result<Vec<PricePoint>, PostesterError>;

    fn fetch_positions(&self) -> Result<Vec<PositionPoint>, PostesterError>;
}
