//! Interactive shell for csvql
//!
//! Reads statements with rustyline and runs them against the session. The
//! datasets load in the background, so the prompt is available at once;
//! statements submitted before loading finishes are refused with a notice.
//!
//! # Features
//!
//! - Up/Down recall previously executed statements; leaving history restores
//!   the text being typed before recall started
//! - Tab completion for shell commands and table names
//! - Multiline input while brackets are unbalanced
//!
//! # Commands
//!
//! ```text
//! <sql>               Execute a statement
//! .tables             List loaded tables
//! .history            Show executed statements
//! .format <fmt>       Switch output format (table, json, csv)
//! .help               Show help
//! .quit               Exit the shell
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use clap::ValueEnum;
use colored::Colorize;
use parking_lot::Mutex;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{Highlighter, MatchingBracketHighlighter};
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{MatchingBracketValidator, Validator};
use rustyline::{
    Cmd, CompletionType, ConditionalEventHandler, Config, Context, EditMode, Editor, Event,
    EventContext, EventHandler, ExternalPrinter, KeyCode, KeyEvent, Modifiers, Movement,
    RepeatCount,
};
use tokio::runtime::Handle;

use crate::config::{WorkbenchConfig, DEFAULT_PROMPT};
use crate::engine::{Engine, SqliteEngine};
use crate::error::{CsvqlError, ErrorHint, Result};
use crate::ingest::IngestOutcome;
use crate::render::{render_history, render_result, OutputFormat};
use crate::session::{load_into, Session, SharedSession};

/// Shell configuration
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Prompt string
    pub prompt: String,
    /// Enable colors
    pub colors: bool,
    /// Initial output format
    pub format: OutputFormat,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            colors: true,
            format: OutputFormat::Table,
        }
    }
}

impl From<&WorkbenchConfig> for ReplConfig {
    fn from(config: &WorkbenchConfig) -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            colors: config.color,
            format: config.format,
        }
    }
}

/// Command parsed from user input
#[derive(Debug, PartialEq)]
enum Command {
    /// Execute a statement
    Statement(String),
    /// List tables
    Tables,
    /// Show the history log
    History,
    /// Switch output format
    Format(OutputFormat),
    /// Show help
    Help,
    /// Exit the shell
    Exit,
    /// Blank line
    Empty,
    /// Unknown or malformed shell command
    Unknown(String),
}

impl Command {
    fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Command::Empty;
        }

        let Some(rest) = trimmed.strip_prefix('.') else {
            return match trimmed.to_lowercase().as_str() {
                "exit" | "quit" => Command::Exit,
                _ => Command::Statement(trimmed.to_string()),
            };
        };

        let parts: Vec<&str> = rest.splitn(2, ' ').collect();
        match parts.first().map(|s| s.to_lowercase()).as_deref() {
            Some("tables") => Command::Tables,
            Some("history") => Command::History,
            Some("format") | Some("mode") => match parts.get(1) {
                Some(name) => match OutputFormat::from_str(name.trim(), true) {
                    Ok(format) => Command::Format(format),
                    Err(_) => Command::Unknown(format!(
                        "format: expected one of table, json, csv (got '{}')",
                        name.trim()
                    )),
                },
                None => Command::Unknown("format: missing format name".to_string()),
            },
            Some("help") | Some("?") => Command::Help,
            Some("quit") | Some("exit") | Some("q") => Command::Exit,
            Some(cmd) => Command::Unknown(format!("unknown command: .{}", cmd)),
            None => Command::Unknown(String::new()),
        }
    }
}

/// Which way a recall key moves through history
#[derive(Debug, Clone, Copy)]
enum Recall {
    Previous,
    Next,
}

/// Feeds the current line to the session's navigator and swaps in the
/// navigator's buffer.
struct RecallHandler {
    session: SharedSession<SqliteEngine>,
    direction: Recall,
}

impl RecallHandler {
    /// Step through history from `line`.
    ///
    /// Does nothing while the background loader holds the session.
    fn recall(&self, line: &str) -> Cmd {
        let Some(mut session) = self.session.try_lock() else {
            return Cmd::Noop;
        };
        session.set_buffer(line);

        let changed = match self.direction {
            Recall::Previous => session.recall_previous(),
            Recall::Next => session.recall_next(),
        };

        if changed {
            Cmd::Replace(Movement::WholeBuffer, Some(session.buffer().to_string()))
        } else {
            Cmd::Noop
        }
    }
}

impl ConditionalEventHandler for RecallHandler {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext,
    ) -> Option<Cmd> {
        Some(self.recall(ctx.line()))
    }
}

/// Shell helper for completions and highlighting
struct ReplHelper {
    /// Session, for table name completion
    session: SharedSession<SqliteEngine>,
    /// Matching bracket highlighter
    highlighter: MatchingBracketHighlighter,
    /// Bracket validator
    validator: MatchingBracketValidator,
    colors: bool,
}

impl rustyline::Helper for ReplHelper {}

impl ReplHelper {
    fn new(session: SharedSession<SqliteEngine>, colors: bool) -> Self {
        Self {
            session,
            highlighter: MatchingBracketHighlighter::new(),
            validator: MatchingBracketValidator::new(),
            colors,
        }
    }

    fn commands() -> Vec<&'static str> {
        vec![".tables", ".history", ".format", ".help", ".quit", ".exit"]
    }

    /// Table names, or nothing while the loader holds the session
    fn table_names(&self) -> Vec<String> {
        self.session
            .try_lock()
            .and_then(|session| session.engine().and_then(|e| e.table_names().ok()))
            .unwrap_or_default()
    }
}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> std::result::Result<(usize, Vec<Pair>), ReadlineError> {
        let line_up_to_cursor = &line[..pos];
        let start = line_up_to_cursor
            .rfind(|c: char| c.is_whitespace() || c == ',' || c == '(')
            .map(|i| i + 1)
            .unwrap_or(0);
        let prefix = &line_up_to_cursor[start..];

        // Shell commands at the start of the line
        if start == 0 && prefix.starts_with('.') {
            let matches = Self::commands()
                .into_iter()
                .filter(|cmd| cmd.starts_with(prefix))
                .map(|cmd| Pair {
                    display: cmd.to_string(),
                    replacement: cmd.to_string(),
                })
                .collect();
            return Ok((start, matches));
        }

        if prefix.is_empty() {
            return Ok((pos, vec![]));
        }

        let matches = self
            .table_names()
            .into_iter()
            .filter(|t| t.starts_with(prefix))
            .map(|t| Pair {
                display: t.clone(),
                replacement: t,
            })
            .collect();
        Ok((start, matches))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(&'s self, prompt: &'p str, default: bool) -> Cow<'b, str> {
        if default && self.colors {
            Cow::Owned(format!("\x1b[1;32m{}\x1b[0m", prompt))
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_char(&self, line: &str, pos: usize, forced: bool) -> bool {
        self.highlighter.highlight_char(line, pos, forced)
    }
}

impl Validator for ReplHelper {
    fn validate(
        &self,
        ctx: &mut rustyline::validate::ValidationContext,
    ) -> rustyline::Result<rustyline::validate::ValidationResult> {
        self.validator.validate(ctx)
    }

    fn validate_while_typing(&self) -> bool {
        self.validator.validate_while_typing()
    }
}

/// Summary line printed when the background load finishes
fn load_summary(outcomes: &[IngestOutcome]) -> String {
    let created = outcomes
        .iter()
        .filter(|o| matches!(o, IngestOutcome::Created { .. }))
        .count();
    let rows: usize = outcomes
        .iter()
        .map(|o| match o {
            IngestOutcome::Created { rows } => *rows,
            _ => 0,
        })
        .sum();
    match created {
        0 => "Database ready (no datasets loaded)".to_string(),
        1 => format!("Database ready: 1 table, {} rows", rows),
        n => format!("Database ready: {} tables, {} rows", n, rows),
    }
}

fn print_error(err: &CsvqlError) {
    eprintln!("{} {}", "Error:".red().bold(), err.with_hint());
}

/// Run the interactive shell.
///
/// Dataset loading is spawned on `runtime` and reports back through the
/// editor's external printer when it completes.
pub fn run_repl(config: &WorkbenchConfig, runtime: &Handle) -> Result<()> {
    let repl_config = ReplConfig::from(config);
    let mut format = repl_config.format;

    let session: SharedSession<SqliteEngine> =
        Arc::new(Mutex::new(Session::new(config.initial_query.clone())));

    // Configure rustyline
    let rl_config = Config::builder()
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .auto_add_history(false)
        .build();

    let helper = ReplHelper::new(session.clone(), repl_config.colors);
    let mut rl: Editor<ReplHelper, DefaultHistory> = Editor::with_config(rl_config)?;
    rl.set_helper(Some(helper));

    // Bind Ctrl-C to abort current line
    rl.bind_sequence(KeyEvent::ctrl('c'), Cmd::Interrupt);

    // Up/Down walk the session history instead of rustyline's own
    for (key, direction) in [(KeyCode::Up, Recall::Previous), (KeyCode::Down, Recall::Next)] {
        rl.bind_sequence(
            KeyEvent(key, Modifiers::NONE),
            EventHandler::Conditional(Box::new(RecallHandler {
                session: session.clone(),
                direction,
            })),
        );
    }

    let mut printer = rl.create_external_printer().ok();
    let loader_session = session.clone();
    let loader_config = config.clone();
    runtime.spawn(async move {
        let message = match load_into(loader_session, loader_config).await {
            Ok(outcomes) => load_summary(&outcomes),
            Err(e) => format!("{} {}", "Error:".red().bold(), e.with_hint()),
        };
        match printer.as_mut() {
            Some(printer) => {
                if printer.print(message.clone()).is_err() {
                    eprintln!("{}", message);
                }
            }
            None => eprintln!("{}", message),
        }
    });

    // Print welcome message
    println!();
    println!("{}", "csvql interactive shell".cyan().bold());
    println!("Type '.help' for commands, '.quit' to quit");
    println!();

    // Main loop
    loop {
        let initial = session.lock().buffer().to_string();
        match rl.readline_with_initial(&repl_config.prompt, (&initial, "")) {
            Ok(line) => match Command::parse(&line) {
                Command::Statement(statement) => {
                    let mut session = session.lock();
                    session.set_buffer(statement);
                    match session.execute() {
                        Ok(result) => match render_result(result, format, repl_config.colors) {
                            Ok(text) => println!("{}", text),
                            Err(e) => print_error(&e),
                        },
                        Err(e) => print_error(&e),
                    }
                }
                Command::Tables => {
                    let mut session = session.lock();
                    session.discard_buffer();
                    match session.engine().map(|engine| engine.table_names()) {
                        Some(Ok(tables)) if tables.is_empty() => println!("No tables loaded"),
                        Some(Ok(tables)) => {
                            for table in tables {
                                println!("  {}", table);
                            }
                        }
                        Some(Err(e)) => print_error(&e),
                        None => print_error(&CsvqlError::EngineNotReady),
                    }
                }
                Command::History => {
                    let mut session = session.lock();
                    session.discard_buffer();
                    println!("{}", render_history(session.history()));
                }
                Command::Format(new_format) => {
                    session.lock().discard_buffer();
                    format = new_format;
                    println!("Output format: {}", format);
                }
                Command::Help => {
                    session.lock().discard_buffer();
                    print_help();
                }
                Command::Exit => {
                    println!("Goodbye!");
                    break;
                }
                Command::Empty => {
                    session.lock().discard_buffer();
                }
                Command::Unknown(msg) => {
                    session.lock().discard_buffer();
                    if !msg.is_empty() {
                        println!("{}", msg);
                    }
                }
            },
            Err(ReadlineError::Interrupted) => {
                session.lock().discard_buffer();
                println!("^C");
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn print_help() {
    println!(
        r#"
csvql Shell Commands:

  <sql>             Execute a statement against the loaded tables
  .tables           List loaded tables
  .history          Show statements executed in this session
  .format <fmt>     Switch output format (table, json, csv)
  .help             Show this help
  .quit             Exit the shell

Keys:
  Up / Down         Recall previous / next statement
  Tab               Complete commands and table names
  Ctrl-C            Clear the current line
  Ctrl-D            Exit
"#
    );
}
