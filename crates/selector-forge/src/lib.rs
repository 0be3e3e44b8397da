//! selector-forge: multi-strategy selector synthesis, validation, and ranking for UI elements.

pub mod diagnostics;
pub mod element;
pub mod engine;
pub mod ranking;
pub mod strategy;
pub mod types;

pub use diagnostics::{CollectingSink, DiagnosticsSink, StrategyFailure, TracingSink};
pub use element::ElementDescriptor;
pub use engine::SelectorEngine;
pub use ranking::{
    rank, rank_default, rank_with_history, HistoryRecord, RankedSelectorSet, RankingMode,
    SelectionHistory, DEFAULT_SUCCESS_RATE,
};
pub use strategy::{
    builtin_strategies, CssStrategy, HybridStrategy, SelectorStrategy, TextStrategy,
    XpathStrategy,
};
pub use types::*;
