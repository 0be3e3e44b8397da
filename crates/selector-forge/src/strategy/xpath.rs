//! XPath selector generation.

use super::css::{count, input_type};
use super::SelectorStrategy;
use crate::element::ElementDescriptor;
use crate::types::{CandidateSelector, SelectorResult, StrategyKind, ValidationResult};

/// Element types whose text node is a reliable anchor.
const TEXT_NODE_TYPES: &[&str] = &["button", "link", "a", "span", "div"];

#[derive(Debug, Default, Clone, Copy)]
pub struct XpathStrategy;

impl SelectorStrategy for XpathStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Xpath
    }

    fn generate(&self, el: &ElementDescriptor) -> SelectorResult<Vec<CandidateSelector>> {
        let mut out = Vec::new();
        let ty = el.element_type.as_str();
        let text = el.text.as_str();
        let xpath = |selector: String| CandidateSelector::new(StrategyKind::Xpath, selector);

        if el.has_text() && el.is_type(TEXT_NODE_TYPES) {
            out.push(
                xpath(format!("//{ty}[text()=\"{text}\"]"))
                    .confidence(0.9)
                    .priority(1)
                    .describe("XPath by exact text content"),
            );
            out.push(
                xpath(format!("//{ty}[contains(text(), \"{text}\")]"))
                    .confidence(0.8)
                    .priority(2)
                    .describe("XPath by partial text content"),
            );
        }

        if ty == "input" {
            let placeholder = el.attr("placeholder");
            if !placeholder.is_empty() {
                out.push(
                    xpath(format!("//input[@placeholder=\"{placeholder}\"]"))
                        .confidence(0.9)
                        .priority(1)
                        .describe("XPath by placeholder attribute"),
                );
            }
            out.push(
                xpath(format!("//input[@type=\"{}\"]", input_type(el)))
                    .confidence(0.7)
                    .priority(3)
                    .describe("XPath by input type"),
            );
        }

        if el.mentions("email") {
            out.push(
                xpath(r#"//input[contains(@placeholder, "email") or contains(@type, "email")]"#.to_string())
                    .confidence(0.85)
                    .priority(2)
                    .describe("XPath by email pattern"),
            );
        }

        if el.mentions("password") {
            out.push(
                xpath(r#"//input[@type="password" or contains(@placeholder, "password")]"#.to_string())
                    .confidence(0.85)
                    .priority(2)
                    .describe("XPath by password pattern"),
            );
        }

        if !ty.is_empty() {
            out.push(
                xpath(format!("//{ty}[1]"))
                    .confidence(0.4)
                    .priority(6)
                    .describe(format!("XPath first {ty} element")),
            );
        }

        if el.has_text() && !ty.is_empty() {
            let normalized = text.replace('"', "'");
            out.push(
                xpath(format!("//{ty}[normalize-space(text())=\"{normalized}\"]"))
                    .confidence(0.8)
                    .priority(2)
                    .describe("XPath with normalized text"),
            );
        }

        if el.attribute_dump().contains("aria-label") || text.to_lowercase().contains("label") {
            let label = if el.has_text() { text } else { el.attr("aria-label") };
            if !label.is_empty() {
                out.push(
                    xpath(format!(
                        "//*[@aria-label=\"{label}\" or contains(@aria-label, \"{label}\")]"
                    ))
                    .confidence(0.75)
                    .priority(3)
                    .describe("XPath by aria-label"),
                );
            }
        }

        Ok(out)
    }

    fn validate(&self, selector: &str) -> ValidationResult {
        if selector.trim().is_empty() {
            return ValidationResult::invalid("Empty or invalid selector");
        }
        if !selector.starts_with('/') {
            return ValidationResult::invalid("XPath must start with / or //");
        }
        if count(selector, '[') != count(selector, ']') {
            return ValidationResult::invalid("Unbalanced square brackets");
        }
        if count(selector, '(') != count(selector, ')') {
            return ValidationResult::invalid("Unbalanced parentheses");
        }
        if count(selector, '\'') % 2 != 0 {
            return ValidationResult::invalid("Unbalanced single quotes");
        }
        if count(selector, '"') % 2 != 0 {
            return ValidationResult::invalid("Unbalanced double quotes");
        }
        ValidationResult::valid("Valid XPath selector")
    }
}
