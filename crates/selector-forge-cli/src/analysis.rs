//! Parsing of vision-model responses into element lists and page summaries.
//!
//! The vision model is asked for a JSON list of elements, but replies are
//! often wrapped in a Markdown code fence, sometimes contain a single object
//! instead of a list, and occasionally are not JSON at all. Parsing never
//! fails: unusable replies become a single `parsing_error` placeholder element
//! so the rest of the pipeline still runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Element type used for the placeholder emitted on unparseable responses.
pub const PARSING_ERROR_TYPE: &str = "parsing_error";

/// Summary counts over the elements found on a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStructure {
    pub sections: BTreeMap<String, usize>,
    pub element_types: BTreeMap<String, usize>,
    pub total_elements: usize,
    pub critical_elements: usize,
}

impl PageStructure {
    pub fn from_elements(elements: &[Value]) -> Self {
        let mut structure = Self {
            total_elements: elements.len(),
            ..Self::default()
        };

        for element in elements {
            let section = element.get("section").and_then(Value::as_str).unwrap_or("main");
            *structure.sections.entry(section.to_string()).or_default() += 1;

            let ty = element.get("type").and_then(Value::as_str).unwrap_or("unknown");
            *structure.element_types.entry(ty.to_string()).or_default() += 1;

            if element.get("critical").and_then(Value::as_bool).unwrap_or(false) {
                structure.critical_elements += 1;
            }
        }

        structure
    }
}

/// Result of analysing one page screenshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub elements: Vec<Value>,
    pub page_structure: PageStructure,
    pub analysis_timestamp: String,
    pub url: String,
    pub screenshot_path: String,
}

impl AnalysisReport {
    /// Build a report from already parsed elements, stamped with the current time.
    pub fn new(elements: Vec<Value>, url: &str, screenshot_path: &str) -> Self {
        let page_structure = PageStructure::from_elements(&elements);
        Self {
            elements,
            page_structure,
            analysis_timestamp: chrono::Local::now().to_rfc3339(),
            url: url.to_string(),
            screenshot_path: screenshot_path.to_string(),
        }
    }

    /// Parse a raw model response and summarise it.
    pub fn from_response(response: &str, url: &str, screenshot_path: &str) -> Self {
        let report = Self::new(parse_analysis_response(response), url, screenshot_path);
        tracing::info!(
            "Analysis completed: {} elements found",
            report.page_structure.total_elements
        );
        report
    }
}

/// Parse a model response into a list of element objects.
pub fn parse_analysis_response(response: &str) -> Vec<Value> {
    let cleaned = strip_code_fence(response);

    match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Array(elements)) => elements,
        Ok(other) => {
            tracing::warn!("Vision response is not a list, wrapping in list");
            vec![other]
        }
        Err(e) => {
            tracing::error!("Failed to parse vision response as JSON: {e}");
            vec![parsing_error_element()]
        }
    }
}

/// Placeholder element standing in for an unparseable response.
pub fn parsing_error_element() -> Value {
    json!({
        "type": PARSING_ERROR_TYPE,
        "text": "Failed to parse vision response",
        "purpose": "Error handling",
        "selector_strategy": "manual",
        "critical": false,
        "behavior": "none",
        "position": "unknown",
        "attributes": {},
        "section": "error"
    })
}

fn strip_code_fence(response: &str) -> &str {
    let mut text = response.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}
