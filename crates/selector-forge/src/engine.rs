//! Orchestration of all registered strategies for one element.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::diagnostics::{DiagnosticsSink, StrategyFailure, TracingSink};
use crate::element::ElementDescriptor;
use crate::ranking::{rank, RankedSelectorSet, SelectionHistory};
use crate::strategy::{builtin_strategies, SelectorStrategy};
use crate::types::{CandidateSelector, StrategyKind, ValidationResult};

/// Runs every registered strategy and ranks the combined output.
pub struct SelectorEngine {
    strategies: Vec<Box<dyn SelectorStrategy>>,
    sink: Arc<dyn DiagnosticsSink>,
}

impl Default for SelectorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SelectorEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectorEngine")
            .field("strategies", &self.strategy_kinds())
            .finish()
    }
}

impl SelectorEngine {
    /// Engine with the built-in CSS, XPath, text and hybrid strategies.
    pub fn new() -> Self {
        Self::with_strategies(builtin_strategies())
    }

    /// Engine with an explicit, ordered strategy list.
    pub fn with_strategies(strategies: Vec<Box<dyn SelectorStrategy>>) -> Self {
        Self {
            strategies,
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the sink that receives strategy failures.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Registered strategies in execution order.
    pub fn strategy_kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Run every strategy and return candidates in registration order, unsorted.
    ///
    /// A strategy that errors or panics is reported to the sink and skipped.
    pub fn collect_candidates(&self, element: &ElementDescriptor) -> Vec<CandidateSelector> {
        let mut all = Vec::new();
        for strategy in &self.strategies {
            let kind = strategy.kind();
            let outcome = catch_unwind(AssertUnwindSafe(|| strategy.generate(element)));
            let message = match outcome {
                Ok(Ok(candidates)) => {
                    all.extend(candidates.into_iter().map(|mut c| {
                        c.strategy = kind;
                        c
                    }));
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(payload) => panic_message(payload.as_ref()),
            };
            self.sink.strategy_failed(StrategyFailure {
                strategy: kind,
                message,
            });
        }
        all
    }

    /// Generate and rank selectors for one element by priority, then confidence.
    pub fn generate_selectors(&self, element: &ElementDescriptor) -> RankedSelectorSet {
        let candidates = self.collect_candidates(element);
        tracing::debug!(
            "Generated {} candidates for {:?} element",
            candidates.len(),
            element.element_type
        );
        rank(candidates, None)
    }

    /// Generate selectors and rank them against `history` when supplied.
    pub fn generate_ranked(
        &self,
        element: &ElementDescriptor,
        history: Option<&SelectionHistory>,
    ) -> RankedSelectorSet {
        rank(self.collect_candidates(element), history)
    }

    /// Re-rank existing candidates. Without history this is the default order.
    pub fn rank_selectors(
        &self,
        candidates: Vec<CandidateSelector>,
        history: Option<&SelectionHistory>,
    ) -> RankedSelectorSet {
        rank(candidates, history)
    }

    /// Validate `selector` with the strategy registered under `strategy_name`.
    pub fn validate_selector(&self, selector: &str, strategy_name: &str) -> ValidationResult {
        let strategy = strategy_name
            .parse::<StrategyKind>()
            .ok()
            .and_then(|kind| self.strategies.iter().find(|s| s.kind() == kind));

        match strategy {
            Some(s) => s.validate(selector),
            None => ValidationResult::invalid("Unknown strategy"),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
