//! Ordering of candidate selectors, with optional history-based re-ranking.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::{CandidateSelector, SelectorResult};

/// Success rate assumed for a history entry that does not record one.
pub const DEFAULT_SUCCESS_RATE: f64 = 0.5;

/// How a ranked set was ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    /// Ascending priority, ties by descending confidence.
    Default,
    /// Descending history-adjusted confidence only.
    Historical,
}

/// Past outcome of one selector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(default, alias = "successRate", skip_serializing_if = "Option::is_none")]
    pub success_rate: Option<f64>,
}

impl HistoryRecord {
    pub fn with_rate(rate: f64) -> Self {
        Self {
            success_rate: Some(rate),
        }
    }

    pub fn rate(&self) -> f64 {
        self.success_rate.unwrap_or(DEFAULT_SUCCESS_RATE).clamp(0.0, 1.0)
    }
}

/// Selector outcomes keyed by `"{strategy}:{selector}"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionHistory {
    records: HashMap<String, HistoryRecord>,
}

impl SelectionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> SelectorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn insert(&mut self, key: impl Into<String>, record: HistoryRecord) {
        self.records.insert(key.into(), record);
    }

    pub fn get(&self, key: &str) -> Option<&HistoryRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Ordered candidates for one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSelectorSet {
    mode: RankingMode,
    selectors: Vec<CandidateSelector>,
}

impl RankedSelectorSet {
    pub fn mode(&self) -> RankingMode {
        self.mode
    }

    /// Best candidate, if any.
    pub fn top(&self) -> Option<&CandidateSelector> {
        self.selectors.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CandidateSelector> {
        self.selectors.iter()
    }

    pub fn as_slice(&self) -> &[CandidateSelector] {
        &self.selectors
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn into_vec(self) -> Vec<CandidateSelector> {
        self.selectors
    }
}

impl<'a> IntoIterator for &'a RankedSelectorSet {
    type Item = &'a CandidateSelector;
    type IntoIter = std::slice::Iter<'a, CandidateSelector>;

    fn into_iter(self) -> Self::IntoIter {
        self.selectors.iter()
    }
}

/// Rank candidates, re-weighting by `history` when it is present and non-empty.
///
/// The historical path sorts on adjusted confidence alone and ignores priority.
pub fn rank(candidates: Vec<CandidateSelector>, history: Option<&SelectionHistory>) -> RankedSelectorSet {
    match history {
        Some(h) if !h.is_empty() => rank_with_history(candidates, h),
        _ => rank_default(candidates),
    }
}

/// Stable sort by ascending priority, then descending confidence.
pub fn rank_default(mut candidates: Vec<CandidateSelector>) -> RankedSelectorSet {
    candidates.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| by_confidence_desc(a, b))
    });
    RankedSelectorSet {
        mode: RankingMode::Default,
        selectors: dedupe(candidates),
    }
}

/// Scale confidence by recorded success rate, then stable sort by confidence.
pub fn rank_with_history(
    mut candidates: Vec<CandidateSelector>,
    history: &SelectionHistory,
) -> RankedSelectorSet {
    for candidate in &mut candidates {
        if let Some(record) = history.get(&candidate.history_key()) {
            candidate.confidence *= record.rate();
        }
    }
    candidates.sort_by(by_confidence_desc);
    RankedSelectorSet {
        mode: RankingMode::Historical,
        selectors: dedupe(candidates),
    }
}

fn by_confidence_desc(a: &CandidateSelector, b: &CandidateSelector) -> Ordering {
    b.confidence
        .partial_cmp(&a.confidence)
        .unwrap_or(Ordering::Equal)
}

/// Keep the first, best-ranked occurrence of each strategy/selector pair.
fn dedupe(candidates: Vec<CandidateSelector>) -> Vec<CandidateSelector> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert((c.strategy, c.selector.clone())))
        .collect()
}
