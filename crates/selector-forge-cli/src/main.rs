//! selector-forge: command-line entry point.

use std::io::Read;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use serde_json::Value;

use selector_forge::SelectorEngine;
use selector_forge_cli::analysis::{parse_analysis_response, AnalysisReport};
use selector_forge_cli::capture::{verify_screenshot, CaptureRecord};
use selector_forge_cli::config::resolve_project_dir;
use selector_forge_cli::pipeline::SelectorPipeline;
use selector_forge_cli::project::ProjectStore;

/// Status recorded once selectors have been written for a page.
const STATUS_SELECTORS_GENERATED: &str = "selectors_generated";

#[derive(Parser)]
#[command(
    name = "selector-forge",
    about = "Turn vision-analysed UI elements into ranked automation selectors",
    version
)]
struct Cli {
    /// Project root (defaults to $SELECTOR_FORGE_HOME, then the working directory).
    #[arg(short, long, global = true)]
    project_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate ranked selectors for every element and print them as JSON.
    Generate {
        /// Elements file (JSON list), or `-` for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Treat the input as a raw vision-model response (code fences, non-list replies).
        #[arg(long)]
        raw: bool,

        /// Selection history JSON used to re-rank candidates.
        #[arg(long)]
        history: Option<String>,

        /// Page URL. When set, results are saved into the project layout.
        #[arg(long)]
        url: Option<String>,

        /// Screenshot the elements were extracted from.
        #[arg(long)]
        screenshot: Option<String>,

        /// Capture record JSON from the browser step (overrides --screenshot).
        #[arg(long)]
        capture: Option<String>,
    },

    /// Parse a raw vision-model response and print the analysis report.
    Analyze {
        /// Response file, or `-` for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Page URL the screenshot was taken from.
        #[arg(long, default_value = "")]
        url: String,

        /// Screenshot the response describes.
        #[arg(long, default_value = "")]
        screenshot: String,
    },

    /// Check selector syntax for one strategy (css, xpath, text, hybrid).
    Validate {
        strategy: String,
        selector: String,
    },

    /// List pages tracked in the project.
    Pages,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   selector-forge completions bash > ~/.local/share/bash-completion/completions/selector-forge
    ///   selector-forge completions zsh > ~/.zfunc/_selector-forge
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },

    /// Launch interactive REPL mode.
    Repl,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            input,
            raw,
            history,
            url,
            screenshot,
            capture,
        } => {
            let text = read_input(&input)?;
            let elements = if raw {
                parse_analysis_response(&text)
            } else {
                parse_element_list(&text)?
            };

            let mut pipeline = SelectorPipeline::new(SelectorEngine::new());
            if let Some(path) = history {
                pipeline = pipeline.with_history_file(&path)?;
            }

            tracing::info!("Generating selectors for {} elements", elements.len());
            let report = pipeline.run(elements.clone()).await?;

            if let Some(page_url) = url {
                let record = match capture {
                    Some(path) => CaptureRecord::from_json_str(&read_input(&path)?)?,
                    None => CaptureRecord {
                        screenshot_path: screenshot.unwrap_or_default(),
                        page_title: String::new(),
                        url: page_url.clone(),
                        status_code: None,
                        timestamp: None,
                    },
                };
                if !record.screenshot_path.is_empty() {
                    let info = verify_screenshot(&record.screenshot_path)?;
                    if let Some((w, h)) = info.dimensions {
                        tracing::info!("Screenshot {}: {w}x{h}", info.path);
                    }
                }

                let store = ProjectStore::open(resolve_project_dir(cli.project_dir.as_deref()))?;
                let page_name = store.add_page(&page_url, &record)?;
                let analysis = AnalysisReport::new(elements, &page_url, &record.screenshot_path);
                store.save_analysis(&page_name, &analysis)?;
                store.save_selectors(&page_name, &report)?;
                store.update_status(&page_url, STATUS_SELECTORS_GENERATED)?;

                tracing::info!("UI analysis and selectors saved for page: {page_name}");
                tracing::info!("Total elements found: {}", analysis.page_structure.total_elements);
                tracing::info!("Critical elements: {}", analysis.page_structure.critical_elements);
            }

            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Analyze {
            input,
            url,
            screenshot,
        } => {
            let text = read_input(&input)?;
            let report = AnalysisReport::from_response(&text, &url, &screenshot);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Validate { strategy, selector } => {
            let result = SelectorEngine::new().validate_selector(&selector, &strategy);
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.valid {
                std::process::exit(1);
            }
        }

        Commands::Pages => {
            let store = ProjectStore::open(resolve_project_dir(cli.project_dir.as_deref()))?;
            let pages = store.list_pages();
            if pages.is_empty() {
                println!("No pages tracked in {}", store.root().display());
            }
            for (page_url, entry) in &pages {
                println!("{:<24} {:<20} {page_url}", entry.page_name, entry.status);
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "selector-forge", &mut std::io::stdout());
        }

        Commands::Repl => {
            selector_forge_cli::repl::run()?;
        }
    }

    Ok(())
}

/// Read a file, or stdin when `path` is `-`.
fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))
}

/// Strictly parse an elements file: a JSON list, or a single element object.
fn parse_element_list(text: &str) -> anyhow::Result<Vec<Value>> {
    match serde_json::from_str::<Value>(text).context("Elements input is not valid JSON")? {
        Value::Array(elements) => Ok(elements),
        obj @ Value::Object(_) => Ok(vec![obj]),
        _ => anyhow::bail!("Elements input must be a JSON list or object"),
    }
}
