//! Text-engine selectors (`text=`, `placeholder=`, `label=`, `role=`).

use super::{text_has_any, SelectorStrategy};
use crate::element::ElementDescriptor;
use crate::types::{CandidateSelector, SelectorResult, StrategyKind, ValidationResult};

/// Text shorter than this gets no partial-text selector.
const PARTIAL_TEXT_MIN_CHARS: usize = 5;

/// Characters kept by the partial-text selector.
const PARTIAL_TEXT_CHARS: usize = 10;

const ENGINE_PREFIXES: &[&str] = &["text=", "placeholder=", "label=", "role="];

#[derive(Debug, Default, Clone, Copy)]
pub struct TextStrategy;

/// Accessible role used for an element type.
pub fn role_for(element_type: &str) -> &'static str {
    match element_type {
        "button" => "button",
        "link" => "link",
        "input" => "textbox",
        "checkbox" => "checkbox",
        "select" => "combobox",
        _ => "generic",
    }
}

impl SelectorStrategy for TextStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Text
    }

    fn generate(&self, el: &ElementDescriptor) -> SelectorResult<Vec<CandidateSelector>> {
        let mut out = Vec::new();
        let ty = el.element_type.as_str();
        let text = el.text.as_str();
        let sel = |selector: String| CandidateSelector::new(StrategyKind::Text, selector);

        if el.has_text() {
            out.push(
                sel(format!("text=\"{text}\""))
                    .confidence(0.9)
                    .priority(1)
                    .describe("Exact text selector"),
            );

            if text.chars().count() > PARTIAL_TEXT_MIN_CHARS {
                // The ellipsis is literal, so this only matches text that ends in "...".
                let head: String = text.chars().take(PARTIAL_TEXT_CHARS).collect();
                out.push(
                    sel(format!("text=\"{head}...\""))
                        .confidence(0.7)
                        .priority(3)
                        .describe("Partial text selector"),
                );
            }
        }

        let placeholder = el.attr("placeholder");
        if ty == "input" && !placeholder.is_empty() {
            out.push(
                sel(format!("placeholder=\"{placeholder}\""))
                    .confidence(0.9)
                    .priority(1)
                    .describe("Placeholder selector"),
            );
        }

        if ty == "input" && el.has_text() {
            out.push(
                sel(format!("label=\"{text}\""))
                    .confidence(0.8)
                    .priority(2)
                    .describe("Label selector, treating visible text as the form label"),
            );
        }

        if el.has_text() && el.is_type(&["button", "link", "a"]) {
            out.push(
                sel(format!("text=\"{text}\" >> visible=true"))
                    .confidence(0.85)
                    .priority(2)
                    .describe("Visible text selector"),
            );
        }

        if el.has_text() {
            out.push(
                sel(format!("role={}[name=\"{text}\"]", role_for(ty)))
                    .confidence(0.8)
                    .priority(2)
                    .describe("Role selector with accessible name"),
            );
        }

        if text_has_any(el, &["sign in", "login"]) {
            out.push(
                sel("text=/sign.?in|login/i".to_string())
                    .confidence(0.75)
                    .priority(3)
                    .describe("Text pattern for sign in/login"),
            );
        }

        if text_has_any(el, &["submit", "send"]) {
            out.push(
                sel("text=/submit|send/i".to_string())
                    .confidence(0.7)
                    .priority(4)
                    .describe("Text pattern for submit actions"),
            );
        }

        if el.mentions("email") {
            out.push(
                sel(r#"input[type="email"], [placeholder*="email" i]"#.to_string())
                    .confidence(0.8)
                    .priority(2)
                    .describe("Email input pattern"),
            );
        }

        if el.mentions("password") {
            out.push(
                sel(r#"input[type="password"], [placeholder*="password" i]"#.to_string())
                    .confidence(0.8)
                    .priority(2)
                    .describe("Password input pattern"),
            );
        }

        Ok(out)
    }

    fn validate(&self, selector: &str) -> ValidationResult {
        if selector.trim().is_empty() {
            return ValidationResult::invalid("Empty or invalid selector");
        }

        if selector.starts_with("text=/") && selector.ends_with("/i") {
            return ValidationResult::valid("Valid regex text pattern");
        }

        if ENGINE_PREFIXES.iter().any(|p| selector.starts_with(p)) {
            if let Some(value) = selector.split("text=").nth(1) {
                // Only the first segment of a `>>` chain is the text value.
                let value = value.split(">>").next().unwrap_or(value).trim_end();
                if value.starts_with('"') && (value.len() < 2 || !value.ends_with('"')) {
                    return ValidationResult::invalid("Unbalanced quotes in text selector");
                }
            }
            return ValidationResult::valid("Valid text engine selector");
        }

        ValidationResult::valid("Valid text-based selector")
    }
}
