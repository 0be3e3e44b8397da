//! Core data types for candidate selectors and validation results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Confidence assigned when a strategy does not state one.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Priority assigned when a strategy does not state one.
pub const DEFAULT_PRIORITY: u32 = 5;

/// The selector dialect a candidate was generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Css,
    Xpath,
    Text,
    Hybrid,
}

impl StrategyKind {
    /// All built-in dialects in their default registration order.
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Css,
        StrategyKind::Xpath,
        StrategyKind::Text,
        StrategyKind::Hybrid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Css => "css",
            StrategyKind::Xpath => "xpath",
            StrategyKind::Text => "text",
            StrategyKind::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "css" => Ok(StrategyKind::Css),
            "xpath" => Ok(StrategyKind::Xpath),
            "text" => Ok(StrategyKind::Text),
            "hybrid" => Ok(StrategyKind::Hybrid),
            other => Err(SelectorError::UnknownStrategy(other.to_string())),
        }
    }
}

/// A single selector proposed by one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSelector {
    pub strategy: StrategyKind,
    pub selector: String,
    pub confidence: f64,
    pub priority: u32,
    #[serde(default)]
    pub description: String,
}

impl CandidateSelector {
    /// Start a candidate with default confidence and priority.
    pub fn new(strategy: StrategyKind, selector: impl Into<String>) -> Self {
        Self {
            strategy,
            selector: selector.into(),
            confidence: DEFAULT_CONFIDENCE,
            priority: DEFAULT_PRIORITY,
            description: String::new(),
        }
    }

    /// Set the confidence, clamped to `[0, 1]`.
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Set the priority. Priorities start at 1.
    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = priority.max(1);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Key used to look the candidate up in selection history.
    pub fn history_key(&self) -> String {
        format!("{}:{}", self.strategy, self.selector)
    }
}

/// Outcome of a syntactic selector check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub reason: String,
}

impl ValidationResult {
    pub fn valid(reason: impl Into<String>) -> Self {
        Self {
            valid: true,
            reason: reason.into(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: reason.into(),
        }
    }
}

/// Errors that can occur in the selector library.
#[derive(thiserror::Error, Debug)]
pub enum SelectorError {
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Strategy {strategy} failed: {message}")]
    StrategyFailed {
        strategy: StrategyKind,
        message: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type.
pub type SelectorResult<T> = Result<T, SelectorError>;
