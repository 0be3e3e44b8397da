//! Edge case integration tests for selector-forge-cli.
//!
//! Covers malformed model output, ranking with history, strategy failure
//! isolation, parallel generation, and the on-disk project layout.

use std::sync::Arc;

use serde_json::{json, Value};

use selector_forge::{
    CandidateSelector, CollectingSink, ElementDescriptor, HistoryRecord, RankingMode,
    SelectionHistory, SelectorEngine, SelectorError, SelectorResult, SelectorStrategy,
    StrategyKind, ValidationResult,
};
use selector_forge_cli::analysis::{parse_analysis_response, AnalysisReport, PARSING_ERROR_TYPE};
use selector_forge_cli::capture::{verify_screenshot, CaptureRecord};
use selector_forge_cli::pipeline::SelectorPipeline;
use selector_forge_cli::project::ProjectStore;
use selector_forge_cli::ForgeError;

// ─────────────────────── helpers ───────────────────────

fn sign_in_button() -> Value {
    json!({"type": "button", "text": "Sign in", "section": "header", "critical": true})
}

fn login_page() -> Vec<Value> {
    vec![
        json!({"type": "input", "text": "", "attributes": {"placeholder": "Enter your email", "type": "email"}}),
        json!({"type": "input", "attributes": {"placeholder": "Password", "type": "password"}}),
        sign_in_button(),
        json!({"type": "link", "text": "Forgot password?", "section": "main"}),
    ]
}

fn capture(url: &str, screenshot: &str) -> CaptureRecord {
    CaptureRecord {
        screenshot_path: screenshot.to_string(),
        page_title: "Login".to_string(),
        url: url.to_string(),
        status_code: Some(200),
        timestamp: None,
    }
}

fn strategies_of(selectors: &[CandidateSelector]) -> Vec<StrategyKind> {
    let mut kinds: Vec<StrategyKind> = selectors.iter().map(|c| c.strategy).collect();
    kinds.dedup();
    kinds
}

struct BrokenStrategy;

impl SelectorStrategy for BrokenStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Xpath
    }

    fn generate(&self, _: &ElementDescriptor) -> SelectorResult<Vec<CandidateSelector>> {
        Err(SelectorError::StrategyFailed {
            strategy: StrategyKind::Xpath,
            message: "boom".to_string(),
        })
    }

    fn validate(&self, _: &str) -> ValidationResult {
        ValidationResult::invalid("broken")
    }
}

struct PanickingStrategy;

impl SelectorStrategy for PanickingStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Hybrid
    }

    fn generate(&self, _: &ElementDescriptor) -> SelectorResult<Vec<CandidateSelector>> {
        panic!("hybrid exploded")
    }

    fn validate(&self, _: &str) -> ValidationResult {
        ValidationResult::invalid("panicking")
    }
}

// ═══════════════════════════════════════════════════════
// MALFORMED INPUT
// ═══════════════════════════════════════════════════════

/// Test 1: Non-JSON model reply becomes a placeholder that still gets selectors.
#[tokio::test]
async fn test_01_unparseable_response() {
    let elements = parse_analysis_response("I could not find any elements, sorry!");
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0]["type"], PARSING_ERROR_TYPE);

    let report = SelectorPipeline::default().run(elements).await.unwrap();
    let entry = report.get("element_0_parsing_error").unwrap();
    assert!(!entry.selectors.is_empty());
    assert!(entry
        .selectors
        .iter()
        .any(|c| c.selector == "text=\"Failed to parse vision response\""));
}

/// Test 2: Fenced and single-object replies are unwrapped.
#[tokio::test]
async fn test_02_fenced_and_single_object_responses() {
    let fenced = "```json\n[{\"type\": \"button\", \"text\": \"Go\"}, {\"type\": \"link\", \"text\": \"Home\"}]\n```";
    assert_eq!(parse_analysis_response(fenced).len(), 2);

    let single = "```\n{\"type\": \"button\", \"text\": \"Go\"}\n```";
    let elements = parse_analysis_response(single);
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0]["text"], "Go");
}

/// Test 3: Elements with wrong field types and non-object entries never abort a run.
#[tokio::test]
async fn test_03_mistyped_elements() {
    let elements = vec![
        json!({"type": 42, "text": ["not", "a", "string"], "attributes": "nope"}),
        json!(null),
        json!("button"),
        json!({"type": "input", "attributes": {"placeholder": 7, "maxlength": 20, "nested": {"x": 1}}}),
        json!({}),
    ];

    let report = SelectorPipeline::default().run(elements).await.unwrap();
    assert_eq!(report.len(), 5);

    for id in ["element_0_unknown", "element_1_unknown", "element_2_unknown", "element_4_unknown"] {
        let entry = report.get(id).unwrap();
        assert_eq!(entry.selectors.len(), 1, "{id} should only get the fallback");
        assert_eq!(entry.selectors[0].selector, "*");
        assert_eq!(entry.selectors[0].strategy, StrategyKind::Hybrid);
    }

    let input = report.get("element_3_input").unwrap();
    assert!(input
        .selectors
        .iter()
        .any(|c| c.selector == "input[placeholder=\"7\"]"));
}

/// Test 4: Empty element list produces an empty report.
#[tokio::test]
async fn test_04_empty_page() {
    let report = SelectorPipeline::default().run(Vec::new()).await.unwrap();
    assert!(report.is_empty());
    assert_eq!(report.selector_count(), 0);
    assert_eq!(serde_json::to_value(&report).unwrap(), json!({}));
}

/// Test 5: Unknown strategy names are rejected by validation.
#[tokio::test]
async fn test_05_validate_unknown_strategy() {
    let engine = SelectorEngine::new();
    let result = engine.validate_selector("button", "jquery");
    assert!(!result.valid);
    assert_eq!(result.reason, "Unknown strategy");

    assert!(!engine.validate_selector("button", "").valid);
    assert!(engine.validate_selector("//button[@id='x']", "xpath").valid);
    assert!(!engine.validate_selector("button[id=\"x\"", "css").valid);
}

// ═══════════════════════════════════════════════════════
// RANKING
// ═══════════════════════════════════════════════════════

/// Test 6: Duplicate (strategy, selector) pairs keep only the best-ranked copy.
#[tokio::test]
async fn test_06_dedup_keeps_best() {
    let entry = SelectorPipeline::default().generate_one(&sign_in_button());

    let contains: Vec<_> = entry
        .selectors
        .iter()
        .filter(|c| c.strategy == StrategyKind::Css && c.selector == "button:contains(\"Sign in\")")
        .collect();
    assert_eq!(contains.len(), 1);
    assert_eq!(contains[0].priority, 2);
    assert!((contains[0].confidence - 0.8).abs() < 1e-9);
}

/// Test 7: Default ranking is by priority, then confidence.
#[tokio::test]
async fn test_07_default_order() {
    let entry = SelectorPipeline::default().generate_one(&login_page()[0]);
    assert_eq!(entry.ranking, RankingMode::Default);

    for pair in entry.selectors.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            a.priority < b.priority || (a.priority == b.priority && a.confidence >= b.confidence),
            "{a:?} ranked before {b:?}"
        );
    }
}

/// Test 8: History scales confidence and orders by it alone.
#[tokio::test]
async fn test_08_history_reranks() {
    let mut history = SelectionHistory::new();
    history.insert("text:text=\"Sign in\"", HistoryRecord::with_rate(0.0));
    history.insert("css:button", HistoryRecord::with_rate(1.0));

    let pipeline = SelectorPipeline::default().with_history(history);
    let entry = pipeline.generate_one(&sign_in_button());
    assert_eq!(entry.ranking, RankingMode::Historical);

    for pair in entry.selectors.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }

    let last = entry.selectors.last().unwrap();
    assert_eq!(last.selector, "text=\"Sign in\"");
    assert_eq!(last.confidence, 0.0);

    let type_only = entry
        .selectors
        .iter()
        .find(|c| c.strategy == StrategyKind::Css && c.selector == "button")
        .unwrap();
    assert!((type_only.confidence - 0.3).abs() < 1e-9);
}

/// Test 9: History files load from disk; missing or corrupt files are errors.
#[tokio::test]
async fn test_09_history_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(
        &path,
        r#"{"text:text=\"Sign in\"": {"successRate": 0.9}, "css:button": {}}"#,
    )
    .unwrap();

    let pipeline = SelectorPipeline::default()
        .with_history_file(path.to_str().unwrap())
        .unwrap();
    assert_eq!(pipeline.generate_one(&sign_in_button()).ranking, RankingMode::Historical);

    let missing = dir.path().join("missing.json");
    assert!(matches!(
        SelectorPipeline::default().with_history_file(missing.to_str().unwrap()),
        Err(ForgeError::Io(_))
    ));

    let corrupt = dir.path().join("corrupt.json");
    std::fs::write(&corrupt, "{\"broken\":").unwrap();
    assert!(SelectorPipeline::default()
        .with_history_file(corrupt.to_str().unwrap())
        .is_err());
}

/// Test 10: An empty history behaves exactly like no history.
#[tokio::test]
async fn test_10_empty_history_is_default() {
    let plain = SelectorPipeline::default().generate_one(&sign_in_button());
    let empty = SelectorPipeline::default()
        .with_history(SelectionHistory::new())
        .generate_one(&sign_in_button());

    assert_eq!(empty.ranking, RankingMode::Default);
    assert_eq!(empty.selectors, plain.selectors);
}

// ═══════════════════════════════════════════════════════
// FAILURE ISOLATION & CONCURRENCY
// ═══════════════════════════════════════════════════════

/// Test 11: Failing and panicking strategies are reported, not propagated.
#[tokio::test]
async fn test_11_strategy_failures_isolated() {
    let sink = Arc::new(CollectingSink::new());
    let engine = SelectorEngine::with_strategies(vec![
        Box::new(selector_forge::CssStrategy),
        Box::new(BrokenStrategy),
        Box::new(PanickingStrategy),
        Box::new(selector_forge::TextStrategy),
    ])
    .with_sink(sink.clone());

    let report = SelectorPipeline::new(engine).run(login_page()).await.unwrap();
    assert_eq!(report.len(), 4);

    for (_, entry) in report.iter() {
        let kinds = strategies_of(&entry.selectors);
        assert!(!kinds.contains(&StrategyKind::Xpath));
        assert!(!kinds.contains(&StrategyKind::Hybrid));
    }
    let button = report.get("element_2_button").unwrap();
    assert!(button.selectors.iter().any(|c| c.strategy == StrategyKind::Text));

    let failures = sink.failures();
    assert_eq!(failures.len(), 8);
    assert_eq!(
        failures.iter().filter(|f| f.strategy == StrategyKind::Xpath).count(),
        4
    );
    assert!(failures
        .iter()
        .any(|f| f.strategy == StrategyKind::Hybrid && f.message.contains("hybrid exploded")));
}

/// Test 12: Parallel generation keeps input order and matches the serial run.
#[tokio::test]
async fn test_12_parallel_matches_serial() {
    let elements: Vec<Value> = (0..64)
        .map(|i| {
            let ty = ["button", "input", "link", "div"][i % 4];
            json!({"type": ty, "text": format!("Item {i}"), "attributes": {"id": format!("item-{i}")}})
        })
        .collect();

    let pipeline = SelectorPipeline::default();
    let parallel = pipeline.run(elements.clone()).await.unwrap();
    let serial = pipeline.run_blocking(elements);

    let ids: Vec<String> = parallel.iter().map(|(id, _)| id.to_string()).collect();
    assert_eq!(ids.len(), 64);
    assert_eq!(ids[0], "element_0_button");
    assert_eq!(ids[63], "element_63_div");
    assert_eq!(
        serde_json::to_value(&parallel).unwrap(),
        serde_json::to_value(&serial).unwrap()
    );
}

/// Test 13: One pipeline shared across concurrent tasks.
#[tokio::test]
async fn test_13_shared_pipeline() {
    let pipeline = Arc::new(SelectorPipeline::default());
    let mut handles = Vec::new();
    for _ in 0..8 {
        let p = Arc::clone(&pipeline);
        handles.push(tokio::spawn(async move { p.run(login_page()).await.unwrap() }));
    }

    let mut counts = Vec::new();
    for h in handles {
        counts.push(h.await.unwrap().selector_count());
    }
    assert!(counts.iter().all(|c| *c == counts[0]));
    assert!(counts[0] > 0);
}

// ═══════════════════════════════════════════════════════
// PROJECT LAYOUT
// ═══════════════════════════════════════════════════════

/// Test 14: Full save flow writes analysis, selectors, and page status.
#[tokio::test]
async fn test_14_persist_page_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProjectStore::open(dir.path()).unwrap();
    let url = "https://shop.test/account/sign-in";
    let record = capture(url, "reports/screenshots/sign_in.png");

    let elements = login_page();
    let report = SelectorPipeline::default().run(elements.clone()).await.unwrap();

    let page = store.add_page(url, &record).unwrap();
    assert_eq!(page, "account_sign_in");

    let analysis = AnalysisReport::new(elements, url, &record.screenshot_path);
    store.save_analysis(&page, &analysis).unwrap();
    let selectors_path = store.save_selectors(&page, &report).unwrap();
    assert!(store.update_status(url, "selectors_generated").unwrap());

    let saved: Value =
        serde_json::from_str(&std::fs::read_to_string(store.elements_path(&page)).unwrap()).unwrap();
    assert_eq!(saved["page_structure"]["total_elements"], 4);
    assert_eq!(saved["page_structure"]["critical_elements"], 1);
    assert_eq!(saved["page_structure"]["sections"]["header"], 1);
    assert_eq!(saved["page_structure"]["sections"]["main"], 3);
    assert_eq!(saved["url"], url);

    let text = std::fs::read_to_string(selectors_path).unwrap();
    let first = text.find("element_0_input").unwrap();
    let last = text.find("element_3_link").unwrap();
    assert!(first < last);

    let entry = store.get_page(url).unwrap();
    assert_eq!(entry.status, "selectors_generated");
    assert_eq!(entry.screenshot_path.as_deref(), Some("reports/screenshots/sign_in.png"));
}

/// Test 15: Invalid URLs are refused before anything is written.
#[tokio::test]
async fn test_15_invalid_url() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProjectStore::open(dir.path()).unwrap();
    let result = store.add_page("not a url", &capture("not a url", ""));
    assert!(matches!(result, Err(ForgeError::Url(_))));
    assert!(store.list_pages().is_empty());
}

/// Test 16: Screenshots are verified on disk, with dimensions for images.
#[tokio::test]
async fn test_16_screenshot_verification() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.png");
    assert!(matches!(
        verify_screenshot(missing.to_str().unwrap()),
        Err(ForgeError::ScreenshotNotFound(_))
    ));

    let png = dir.path().join("shot.png");
    image::RgbImage::new(64, 48).save(&png).unwrap();
    let info = verify_screenshot(png.to_str().unwrap()).unwrap();
    assert_eq!(info.dimensions, Some((64, 48)));
    assert!(info.bytes > 0);

    let garbage = dir.path().join("garbage.png");
    std::fs::write(&garbage, b"definitely not a png").unwrap();
    let info = verify_screenshot(garbage.to_str().unwrap()).unwrap();
    assert_eq!(info.dimensions, None);
}
