//! Shared computation cache for indicator evaluation.
//!
//! The engine owns one `Cache` per run: it seeds the base keys from the
//! equity curve build, then appends one entry per evaluated indicator.
//! Indicators never see the cache directly; they get a [`CacheView`]
//! scoped to the base keys plus their declared `requires`, so an
//! undeclared read fails loudly instead of silently working whenever the
//! evaluation order happens to permit it.

use crate::domain::error::PostesterError;
use std::collections::HashMap;

/// Keys always present once the engine has seeded the cache.
pub const BASE_KEYS: [&str; 5] = [
    "curve",
    "returns",
    "position",
    "commission",
    "annual_trading_days",
];

#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    Scalar(f64),
    Series(Vec<f64>),
}

impl CacheValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            CacheValue::Scalar(v) => Some(*v),
            CacheValue::Series(_) => None,
        }
    }

    pub fn as_series(&self) -> Option<&[f64]> {
        match self {
            CacheValue::Scalar(_) => None,
            CacheValue::Series(values) => Some(values),
        }
    }
}

/// Append-only cache for one backtest run.
#[derive(Debug, Default)]
pub struct Cache {
    entries: HashMap<String, CacheValue>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. The engine is the only writer; overwriting is a
    /// registry bug, so the first value wins.
    pub(crate) fn insert(&mut self, key: &str, value: CacheValue) {
        self.entries.entry(key.to_string()).or_insert(value);
    }

    pub fn get(&self, key: &str) -> Option<&CacheValue> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// View scoped to the base keys plus `allowed` (an indicator's declared
    /// `requires`), attributed to `indicator` for error reporting.
    pub fn view<'a>(&'a self, indicator: &'a str, allowed: &'a [&'a str]) -> CacheView<'a> {
        CacheView {
            cache: self,
            indicator,
            allowed,
        }
    }
}

/// Read-only, dependency-scoped window onto the cache.
pub struct CacheView<'a> {
    cache: &'a Cache,
    indicator: &'a str,
    allowed: &'a [&'a str],
}

impl<'a> CacheView<'a> {
    fn lookup(&self, key: &str) -> Result<&'a CacheValue, PostesterError> {
        let declared = BASE_KEYS.contains(&key) || self.allowed.contains(&key);
        if !declared {
            return Err(self.missing(key));
        }
        self.cache.get(key).ok_or_else(|| self.missing(key))
    }

    fn missing(&self, key: &str) -> PostesterError {
        PostesterError::MissingDependency {
            indicator: self.indicator.to_string(),
            key: key.to_string(),
        }
    }

    pub fn scalar(&self, key: &str) -> Result<f64, PostesterError> {
        self.lookup(key)?.as_scalar().ok_or_else(|| self.missing(key))
    }

    pub fn series(&self, key: &str) -> Result<&'a [f64], PostesterError> {
        self.lookup(key)?.as_series().ok_or_else(|| self.missing(key))
    }
}
