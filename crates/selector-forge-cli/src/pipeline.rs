//! Selector generation over every element of an analysed page.

use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use selector_forge::{
    CandidateSelector, ElementDescriptor, RankingMode, SelectionHistory, SelectorEngine,
};

use crate::error::{ForgeError, ForgeResult};

/// Ranked selectors for one element, alongside the element as reported.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ElementSelectors {
    pub element_data: Value,
    pub ranking: RankingMode,
    pub selectors: Vec<CandidateSelector>,
}

/// Per-element results in input order. Serializes as an ordered JSON object
/// keyed by element id.
#[derive(Debug, Clone, Default)]
pub struct ElementSelectorReport {
    entries: Vec<(String, ElementSelectors)>,
}

impl ElementSelectorReport {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ElementSelectors> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ElementSelectors)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Total number of selectors across all elements.
    pub fn selector_count(&self) -> usize {
        self.entries.iter().map(|(_, e)| e.selectors.len()).sum()
    }
}

impl Serialize for ElementSelectorReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, entry) in &self.entries {
            map.serialize_entry(id, entry)?;
        }
        map.end()
    }
}

/// Synthetic id for the element at `index`: `element_{index}_{type}`.
pub fn element_id(index: usize, element: &Value) -> String {
    let ty = element
        .get("type")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .unwrap_or("unknown");
    format!("element_{index}_{ty}")
}

/// Runs the selector engine over element lists.
#[derive(Debug, Clone)]
pub struct SelectorPipeline {
    engine: Arc<SelectorEngine>,
    history: Option<Arc<SelectionHistory>>,
}

impl Default for SelectorPipeline {
    fn default() -> Self {
        Self::new(SelectorEngine::new())
    }
}

impl SelectorPipeline {
    pub fn new(engine: SelectorEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            history: None,
        }
    }

    /// Re-rank every element's selectors against `history`.
    pub fn with_history(mut self, history: SelectionHistory) -> Self {
        self.history = Some(Arc::new(history));
        self
    }

    /// Load selection history from a JSON file.
    pub fn with_history_file(self, path: &str) -> ForgeResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let history = SelectionHistory::from_json_str(&json)?;
        tracing::info!("Loaded {} history records from {path}", history.len());
        Ok(self.with_history(history))
    }

    pub fn engine(&self) -> &SelectorEngine {
        &self.engine
    }

    /// Generate selectors for one raw element.
    pub fn generate_one(&self, element: &Value) -> ElementSelectors {
        select(&self.engine, self.history.as_deref(), element)
    }

    /// Generate selectors for every element on the current thread.
    pub fn run_blocking(&self, elements: Vec<Value>) -> ElementSelectorReport {
        let entries = elements
            .into_iter()
            .enumerate()
            .map(|(i, element)| (element_id(i, &element), self.generate_one(&element)))
            .collect();
        ElementSelectorReport { entries }
    }

    /// Generate selectors for every element in parallel, keeping input order.
    pub async fn run(&self, elements: Vec<Value>) -> ForgeResult<ElementSelectorReport> {
        let handles: Vec<_> = elements
            .into_iter()
            .enumerate()
            .map(|(i, element)| {
                let engine = Arc::clone(&self.engine);
                let history = self.history.clone();
                tokio::task::spawn_blocking(move || {
                    let id = element_id(i, &element);
                    let entry = select(&engine, history.as_deref(), &element);
                    (id, entry)
                })
            })
            .collect();

        let mut entries = Vec::with_capacity(handles.len());
        for handle in handles {
            entries.push(handle.await.map_err(ForgeError::from)?);
        }

        let report = ElementSelectorReport { entries };
        tracing::info!(
            "Generated {} selectors for {} elements",
            report.selector_count(),
            report.len()
        );
        Ok(report)
    }
}

fn select(engine: &SelectorEngine, history: Option<&SelectionHistory>, element: &Value) -> ElementSelectors {
    let descriptor = ElementDescriptor::from_value(element);
    let ranked = engine.generate_ranked(&descriptor, history);
    tracing::debug!(
        "{} selectors for {:?} {:?}",
        ranked.len(),
        descriptor.element_type,
        descriptor.text
    );
    ElementSelectors {
        element_data: element.clone(),
        ranking: ranked.mode(),
        selectors: ranked.into_vec(),
    }
}
