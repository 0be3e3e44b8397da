//! Hybrid selectors that combine CSS, text-engine and context signals.
//!
//! These are the strongest candidates the engine produces: a combined
//! `input[type][placeholder]` conjunction outranks every single-signal
//! selector. When no rule applies the strategy still emits a low-confidence
//! fallback, so every element gets at least one hybrid candidate.

use super::css::input_type;
use super::{slug, text_has_any, SelectorStrategy};
use crate::element::ElementDescriptor;
use crate::types::{CandidateSelector, SelectorResult, StrategyKind, ValidationResult};

const EMAIL_KEYWORDS: &[&str] = &["email", "username", "login"];
const PASSWORD_KEYWORDS: &[&str] = &["password", "pass"];
const SUBMIT_KEYWORDS: &[&str] = &["submit", "sign in", "login"];

#[derive(Debug, Default, Clone, Copy)]
pub struct HybridStrategy;

impl SelectorStrategy for HybridStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Hybrid
    }

    fn generate(&self, el: &ElementDescriptor) -> SelectorResult<Vec<CandidateSelector>> {
        let mut out = Vec::new();
        let ty = el.element_type.as_str();
        let text = el.text.as_str();
        let position = el.position.as_str();
        let placeholder = el.attr("placeholder");
        let hybrid = |selector: String| CandidateSelector::new(StrategyKind::Hybrid, selector);

        if ty == "button" && el.has_text() {
            out.push(
                hybrid(format!("button:has-text(\"{text}\")"))
                    .confidence(0.9)
                    .priority(1)
                    .describe("Hybrid: CSS button with text content"),
            );
        }

        if ty == "input" && !placeholder.is_empty() {
            out.push(
                hybrid(format!(
                    "input[type=\"{}\"][placeholder=\"{placeholder}\"]",
                    input_type(el)
                ))
                .confidence(0.95)
                .priority(1)
                .describe("Hybrid: Input type + placeholder"),
            );
        }

        if !position.is_empty() && el.has_text() {
            if position.contains("top") || position.contains("header") {
                out.push(
                    hybrid(format!("header >> text=\"{text}\", nav >> text=\"{text}\""))
                        .confidence(0.8)
                        .priority(2)
                        .describe("Hybrid: Header/nav context with text"),
                );
            }
            if position.contains("bottom") || position.contains("footer") {
                out.push(
                    hybrid(format!("footer >> text=\"{text}\""))
                        .confidence(0.8)
                        .priority(2)
                        .describe("Hybrid: Footer context with text"),
                );
            }
        }

        if ty == "input" {
            let mut conditions = Vec::new();
            let declared_type = el.attr("type");
            if !declared_type.is_empty() {
                conditions.push(format!("type=\"{declared_type}\""));
            }
            if !placeholder.is_empty() {
                let first_word = placeholder.split_whitespace().next().unwrap_or(placeholder);
                conditions.push(format!("placeholder*=\"{first_word}\""));
            }
            if conditions.len() >= 2 {
                out.push(
                    hybrid(format!("input[{}]", conditions.join(" and ")))
                        .confidence(0.85)
                        .priority(2)
                        .describe("Hybrid: Multiple input attributes"),
                );
            }
        }

        if el.has_text() {
            out.push(
                hybrid(format!(
                    "[aria-label=\"{text}\"], [title=\"{text}\"], text=\"{text}\""
                ))
                .confidence(0.8)
                .priority(2)
                .describe("Hybrid: Accessibility attributes or text"),
            );
        }

        if el.is_type(&["input", "button"]) && el.has_text() {
            if text_has_any(el, EMAIL_KEYWORDS) {
                out.push(
                    hybrid(
                        r#"form >> input[placeholder*="email" i], form >> input[type="email"]"#
                            .to_string(),
                    )
                    .confidence(0.85)
                    .priority(2)
                    .describe("Hybrid: Form context for email input"),
                );
            }
            if text_has_any(el, PASSWORD_KEYWORDS) {
                out.push(
                    hybrid(r#"form >> input[type="password"]"#.to_string())
                        .confidence(0.9)
                        .priority(1)
                        .describe("Hybrid: Form context for password input"),
                );
            }
            if text_has_any(el, SUBMIT_KEYWORDS) {
                out.push(
                    hybrid(
                        r#"form >> button[type="submit"], form >> input[type="submit"]"#
                            .to_string(),
                    )
                    .confidence(0.85)
                    .priority(2)
                    .describe("Hybrid: Form context for submit button"),
                );
            }
        }

        if !ty.is_empty() && el.has_text() {
            let id = slug(text);
            out.push(
                hybrid(format!(
                    "{ty}:has-text(\"{text}\"), [data-testid*=\"{id}\"], #{id}"
                ))
                .confidence(0.6)
                .priority(4)
                .describe("Hybrid: Multiple fallback approaches"),
            );
        }

        if el.is_type(&["link", "a"]) && el.has_text() {
            out.push(
                hybrid(format!("a:has-text(\"{text}\"), [href*=\"{}\"]", slug(text)))
                    .confidence(0.8)
                    .priority(2)
                    .describe("Hybrid: Link text or href pattern"),
            );
        }

        if out.is_empty() {
            let fallback = if ty.is_empty() { "*" } else { ty };
            out.push(
                hybrid(fallback.to_string())
                    .confidence(0.1)
                    .priority(10)
                    .describe("Hybrid fallback selector"),
            );
        }

        Ok(out)
    }

    fn validate(&self, selector: &str) -> ValidationResult {
        if selector.trim().is_empty() {
            return ValidationResult::invalid("Empty or invalid selector");
        }

        if selector.contains(">>") {
            let parts = selector.split(">>").filter(|p| !p.trim().is_empty()).count();
            if parts < 2 {
                return ValidationResult::invalid("Invalid chaining syntax");
            }
        }

        if selector
            .split(":has-text(")
            .skip(1)
            .any(|part| !part.contains(')'))
        {
            return ValidationResult::invalid("Unbalanced parentheses in has-text");
        }

        if selector.contains(',') && selector.split(',').any(|s| s.trim().is_empty()) {
            return ValidationResult::invalid("Empty sub-selector in comma-separated list");
        }

        ValidationResult::valid("Valid hybrid selector")
    }
}
