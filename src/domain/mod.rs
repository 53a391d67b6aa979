//! Core domain types and logic.

pub mod series;
pub mod curve;
pub mod cache;
pub mod indicator;
pub mod registry;
pub mod backtest;
pub mod error;
