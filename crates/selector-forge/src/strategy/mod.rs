//! Selector generation strategies, one per dialect.

pub mod css;
pub mod hybrid;
pub mod text;
pub mod xpath;

pub use css::CssStrategy;
pub use hybrid::HybridStrategy;
pub use text::TextStrategy;
pub use xpath::XpathStrategy;

use crate::element::ElementDescriptor;
use crate::types::{CandidateSelector, SelectorResult, StrategyKind, ValidationResult};

/// A stateless generator and validator for one selector dialect.
///
/// Built-in strategies never return `Err`; the engine still isolates failures
/// so that a misbehaving strategy cannot abort generation for an element.
pub trait SelectorStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Propose selectors for `element`. Missing fields skip the rules that need them.
    fn generate(&self, element: &ElementDescriptor) -> SelectorResult<Vec<CandidateSelector>>;

    /// Check selector syntax for this dialect. Never executes the selector.
    fn validate(&self, selector: &str) -> ValidationResult;
}

/// Every built-in strategy in registration order.
pub fn builtin_strategies() -> Vec<Box<dyn SelectorStrategy>> {
    vec![
        Box::new(CssStrategy),
        Box::new(XpathStrategy),
        Box::new(TextStrategy),
        Box::new(HybridStrategy),
    ]
}

/// Whether any keyword occurs in the lowercased visible text.
pub(crate) fn text_has_any(element: &ElementDescriptor, keywords: &[&str]) -> bool {
    let text = element.text.to_lowercase();
    keywords.iter().any(|k| text.contains(k))
}

/// Lowercase and hyphenate text for id and data-testid guesses.
pub(crate) fn slug(text: &str) -> String {
    text.to_lowercase().replace(' ', "-")
}
