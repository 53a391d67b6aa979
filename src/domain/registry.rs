//! Indicator registry and dependency resolution.
//!
//! Registration order is preserved and duplicate names are rejected; the
//! table is append-only. `resolve` topologically orders the transitive
//! closure of a request over each indicator's `requires` set by post-order
//! depth-first traversal, detecting unknown names and cycles before any
//! evaluation happens. Output order is deterministic: requested order first,
//! then `requires` declaration order.

use crate::domain::error::PostesterError;
use crate::domain::indicator::{builtin_indicators, Indicator};
use std::collections::HashMap;

/// Which indicators a run should surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorRequest {
    /// Every registered indicator, in registration order.
    All,
    Named(Vec<String>),
}

impl IndicatorRequest {
    /// Parse a config/CLI string: `"all"` or a comma-separated name list.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("all") {
            return IndicatorRequest::All;
        }
        IndicatorRequest::Named(
            value
                .split(',')
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        )
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

#[derive(Default)]
pub struct IndicatorRegistry {
    indicators: Vec<Box<dyn Indicator>>,
    index: HashMap<String, usize>,
}

impl IndicatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in indicators.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for indicator in builtin_indicators() {
            // Built-in names are unique; register cannot fail here.
            let _ = registry.register(indicator);
        }
        registry
    }

    pub fn register(&mut self, indicator: Box<dyn Indicator>) -> Result<(), PostesterError> {
        let name = indicator.name().to_string();
        if crate::domain::cache::BASE_KEYS.contains(&name.as_str()) {
            return Err(PostesterError::InvalidInput {
                reason: format!("indicator name '{name}' shadows a base cache key"),
            });
        }
        if self.index.contains_key(&name) {
            return Err(PostesterError::DuplicateIndicator { name });
        }
        self.index.insert(name, self.indicators.len());
        self.indicators.push(indicator);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Indicator> {
        self.index.get(name).map(|&i| self.indicators[i].as_ref())
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.indicators.iter().map(|i| i.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    /// Expand a request to explicit names without resolving dependencies.
    pub fn requested_names(&self, request: &IndicatorRequest) -> Vec<String> {
        match request {
            IndicatorRequest::All => self.names().iter().map(|n| n.to_string()).collect(),
            IndicatorRequest::Named(names) => names.clone(),
        }
    }

    /// Order the transitive closure of the request so that every indicator
    /// appears after all indicators it requires.
    pub fn resolve(
        &self,
        request: &IndicatorRequest,
    ) -> Result<Vec<&dyn Indicator>, PostesterError> {
        let requested = self.requested_names(request);

        let mut marks: HashMap<String, Mark> = HashMap::new();
        let mut path: Vec<String> = Vec::new();
        let mut order: Vec<&dyn Indicator> = Vec::new();

        for name in &requested {
            self.visit(name, &mut marks, &mut path, &mut order)?;
        }
        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        name: &str,
        marks: &mut HashMap<String, Mark>,
        path: &mut Vec<String>,
        order: &mut Vec<&'a dyn Indicator>,
    ) -> Result<(), PostesterError> {
        match marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                // Revisited while still on the active path: report the loop
                // from its first occurrence back to itself.
                let start = path.iter().position(|p| p == name).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].to_vec();
                cycle.push(name.to_string());
                return Err(PostesterError::CyclicDependency { cycle });
            }
            None => {}
        }

        let indicator = self
            .get(name)
            .ok_or_else(|| PostesterError::UnknownIndicator {
                name: name.to_string(),
            })?;

        marks.insert(name.to_string(), Mark::Visiting);
        path.push(name.to_string());
        for dep in indicator.requires() {
            self.visit(dep, marks, path, order)?;
        }
        path.pop();
        marks.insert(name.to_string(), Mark::Done);
        order.push(indicator);
        Ok(())
    }
}
