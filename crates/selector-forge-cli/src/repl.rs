//! Interactive REPL for trying selector generation by hand.
//!
//! Launch with `selector-forge repl`. Type `/help` for available commands,
//! Tab for completion.

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};
use serde_json::Value;

use selector_forge::{SelectorEngine, StrategyKind};

use crate::config::repl_history_path;
use crate::pipeline::SelectorPipeline;

/// Available REPL commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/generate", "Generate selectors for an element given as JSON"),
    ("/validate", "Validate a selector: /validate <strategy> <selector>"),
    ("/strategies", "List registered strategies"),
    ("/history", "Load selection history from a JSON file"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// REPL helper for tab completion.
#[derive(Default)]
struct ForgeHelper;

impl Completer for ForgeHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        if !input.contains(' ') {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<16} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        }

        let (cmd, args) = input.split_once(' ').unwrap_or((input, ""));
        let prefix_start = input.len() - args.len();

        let options: Vec<String> = match cmd {
            "/validate" if !args.contains(' ') => StrategyKind::ALL
                .iter()
                .map(|k| k.as_str().to_string())
                .collect(),
            "/history" => json_files_in_cwd(),
            _ => return Ok((pos, Vec::new())),
        };

        let matches = options
            .iter()
            .filter(|o| o.starts_with(args.trim()))
            .map(|o| Pair {
                display: o.clone(),
                replacement: format!("{o} "),
            })
            .collect();
        Ok((prefix_start, matches))
    }
}

fn json_files_in_cwd() -> Vec<String> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(".") {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                    files.push(name.to_string());
                }
            }
        }
    }
    files.sort();
    files
}

impl Hinter for ForgeHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        if line.starts_with('/') && !line.contains(' ') {
            for (cmd, _) in COMMANDS {
                if cmd.starts_with(line) && *cmd != line {
                    return Some(cmd[line.len()..].to_string());
                }
            }
        }
        None
    }
}

impl Highlighter for ForgeHelper {}
impl Validator for ForgeHelper {}
impl Helper for ForgeHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

/// Session state.
struct ReplState {
    pipeline: SelectorPipeline,
}

/// Run the interactive REPL.
pub fn run() -> anyhow::Result<()> {
    eprintln!();
    eprintln!(
        "  \x1b[32m\u{25c9}\x1b[0m \x1b[1mselector-forge v{}\x1b[0m \x1b[90m\u{2014} Ranked selectors for UI elements\x1b[0m",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!();
    eprintln!(
        "    Press \x1b[36m/\x1b[0m to browse commands, \x1b[90mTab\x1b[0m to complete, \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let mut rl: Editor<ForgeHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(ForgeHelper));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let hist_path = repl_history_path();
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let mut state = ReplState {
        pipeline: SelectorPipeline::new(SelectorEngine::new()),
    };
    let prompt = " \x1b[36mforge>\x1b[0m ";

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let input = line.strip_prefix('/').unwrap_or(line);
                if input.is_empty() {
                    cmd_help();
                    continue;
                }

                let (cmd, args) = input.split_once(' ').unwrap_or((input, ""));
                let args = args.trim();

                match cmd {
                    "exit" | "quit" => {
                        eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                        break;
                    }
                    "help" | "h" | "?" => cmd_help(),
                    "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                    "strategies" => cmd_strategies(&state),
                    "generate" | "gen" => cmd_generate(args, &state),
                    "validate" => cmd_validate(args, &state),
                    "history" => cmd_history(args, &mut state),
                    _ => {
                        eprintln!("  Unknown command '/{cmd}'. Type /help for commands.");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    let _ = std::fs::create_dir_all(hist_path.parent().unwrap_or(std::path::Path::new(".")));
    let _ = rl.save_history(&hist_path);

    Ok(())
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {cmd:<18} {desc}");
    }
    eprintln!();
    eprintln!("  Example: /generate {{\"type\": \"button\", \"text\": \"Sign in\"}}");
    eprintln!();
}

fn cmd_strategies(state: &ReplState) {
    let kinds = state.pipeline.engine().strategy_kinds();
    eprintln!();
    eprintln!("  {} strategies, in execution order:", kinds.len());
    for (i, kind) in kinds.iter().enumerate() {
        eprintln!("    {}. {kind}", i + 1);
    }
    eprintln!();
}

fn cmd_generate(args: &str, state: &ReplState) {
    if args.is_empty() {
        eprintln!("  Usage: /generate <element json>");
        return;
    }
    let element: Value = match serde_json::from_str(args) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("  Invalid JSON: {e}");
            return;
        }
    };

    let result = state.pipeline.generate_one(&element);
    eprintln!();
    eprintln!("  {} selectors ({:?} ranking):", result.selectors.len(), result.ranking);
    eprintln!();
    for c in &result.selectors {
        eprintln!(
            "    \x1b[90mp{:<2}\x1b[0m {:.2}  {:<7} {}",
            c.priority,
            c.confidence,
            c.strategy.as_str(),
            c.selector
        );
    }
    eprintln!();
}

fn cmd_validate(args: &str, state: &ReplState) {
    let Some((strategy, selector)) = args.split_once(' ') else {
        eprintln!("  Usage: /validate <strategy> <selector>");
        return;
    };
    let result = state
        .pipeline
        .engine()
        .validate_selector(selector.trim(), strategy);
    let mark = if result.valid { "\x1b[32mvalid\x1b[0m" } else { "\x1b[31minvalid\x1b[0m" };
    eprintln!("  {mark}: {}", result.reason);
}

fn cmd_history(args: &str, state: &mut ReplState) {
    if args.is_empty() {
        eprintln!("  Usage: /history <file.json>");
        return;
    }
    let path = args.split_whitespace().next().unwrap_or(args);
    match SelectorPipeline::new(SelectorEngine::new()).with_history_file(path) {
        Ok(pipeline) => {
            state.pipeline = pipeline;
            eprintln!("  Loaded history: {path}");
        }
        Err(e) => eprintln!("  Failed to load history: {e}"),
    }
}
