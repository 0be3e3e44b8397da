//! Reporting of recovered strategy failures.

use std::sync::Mutex;

use crate::types::StrategyKind;

/// A strategy that failed while generating selectors for one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyFailure {
    pub strategy: StrategyKind,
    pub message: String,
}

/// Receives failures that the engine recovered from.
pub trait DiagnosticsSink: Send + Sync {
    fn strategy_failed(&self, failure: StrategyFailure);
}

/// Forwards failures to `tracing` at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn strategy_failed(&self, failure: StrategyFailure) {
        tracing::warn!("Strategy {} failed: {}", failure.strategy, failure.message);
    }
}

/// Keeps failures in memory for later inspection.
#[derive(Debug, Default)]
pub struct CollectingSink {
    failures: Mutex<Vec<StrategyFailure>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the failures recorded so far.
    pub fn failures(&self) -> Vec<StrategyFailure> {
        match self.failures.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticsSink for CollectingSink {
    fn strategy_failed(&self, failure: StrategyFailure) {
        match self.failures.lock() {
            Ok(mut guard) => guard.push(failure),
            Err(poisoned) => poisoned.into_inner().push(failure),
        }
    }
}
