//! CSS selector generation.

use super::SelectorStrategy;
use crate::element::ElementDescriptor;
use crate::types::{CandidateSelector, SelectorResult, StrategyKind, ValidationResult};

/// Emits CSS selectors, including the `:contains()` text extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct CssStrategy;

impl SelectorStrategy for CssStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Css
    }

    fn generate(&self, el: &ElementDescriptor) -> SelectorResult<Vec<CandidateSelector>> {
        let mut out = Vec::new();
        let ty = el.element_type.as_str();
        let text = el.text.as_str();
        let css = |selector: String| CandidateSelector::new(StrategyKind::Css, selector);

        if el.has_text() && el.is_type(&["button", "link", "a"]) {
            out.push(
                css(format!("{ty}:contains(\"{text}\")"))
                    .confidence(0.8)
                    .priority(2)
                    .describe("CSS by element type and text content"),
            );
        }

        if ty == "input" {
            let placeholder = el.attr("placeholder");
            if !placeholder.is_empty() {
                out.push(
                    css(format!("input[placeholder=\"{placeholder}\"]"))
                        .confidence(0.9)
                        .priority(1)
                        .describe("CSS by placeholder attribute"),
                );
            }

            out.push(
                css(format!("input[type=\"{}\"]", input_type(el)))
                    .confidence(0.6)
                    .priority(4)
                    .describe("CSS by input type"),
            );
        }

        if el.mentions("email") {
            out.push(
                css(r#"input[type="email"], input[placeholder*="email" i]"#.to_string())
                    .confidence(0.85)
                    .priority(2)
                    .describe("CSS by email pattern"),
            );
        }

        if el.mentions("password") {
            out.push(
                css(r#"input[type="password"], input[placeholder*="password" i]"#.to_string())
                    .confidence(0.85)
                    .priority(2)
                    .describe("CSS by password pattern"),
            );
        }

        if ty == "button" {
            let cleaned = clean_text(text);
            if !cleaned.is_empty() {
                out.push(
                    css(format!("button:contains(\"{cleaned}\")"))
                        .confidence(0.75)
                        .priority(3)
                        .describe("CSS by button text"),
                );
            }
        }

        if !ty.is_empty() {
            out.push(
                css(ty.to_string())
                    .confidence(0.3)
                    .priority(8)
                    .describe("CSS by element type only"),
            );
        }

        Ok(out)
    }

    fn validate(&self, selector: &str) -> ValidationResult {
        if selector.trim().is_empty() {
            return ValidationResult::invalid("Empty or invalid selector");
        }
        if count(selector, '[') != count(selector, ']') {
            return ValidationResult::invalid("Unbalanced square brackets");
        }
        if count(selector, '"') % 2 != 0 {
            return ValidationResult::invalid("Unbalanced quotes");
        }
        ValidationResult::valid("Valid CSS selector")
    }
}

/// The input's `type` attribute, `text` when unset.
pub(crate) fn input_type(el: &ElementDescriptor) -> &str {
    match el.attr("type") {
        "" => "text",
        t => t,
    }
}

/// Drop everything except word characters and whitespace.
fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

pub(crate) fn count(s: &str, ch: char) -> usize {
    s.chars().filter(|c| *c == ch).count()
}
