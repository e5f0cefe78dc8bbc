//! rbind: Command-line tools for the binding engine.
//!
//! Usage:
//!   rbind [--config rbind.json] [--verbose] <command> ...
//!
//! Parses and evaluates binding expressions, splits binding strings, and
//! classifies list changes between two JSON arrays.

use clap::{Parser as ClapParser, Subcommand};
use rbind_ast::visitor::{referenced_paths, referenced_roots};
use rbind_core::Value;
use rbind_engine::{Engine, EngineError};
use rbind_options::{parse_options_file, EngineOptions};
use rbind_parser::ParseError;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser, Debug)]
#[command(name = "rbind", about = "rbind - reactive binding expression tools", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to an options file (rbind.json).
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level (overrides RBIND_LOG).
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse an expression and print its syntax tree as JSON.
    Parse { expression: String },

    /// Evaluate an expression against JSON data.
    Eval {
        expression: String,

        /// JSON file providing the data scope.
        #[arg(short, long, value_name = "FILE")]
        data: Option<PathBuf>,
    },

    /// Split a binding string into typed pairs.
    Bindings { text: String },

    /// Classify how a JSON array changed between two files.
    Diff { old: PathBuf, new: PathBuf },
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = match &cli.config {
        Some(path) => match parse_options_file(path) {
            Ok(options) => {
                tracing::debug!(config = %path.display(), "loaded options");
                options
            }
            Err(e) => {
                print_error(&e.to_string());
                process::exit(1);
            }
        },
        None => EngineOptions::default(),
    };
    let mut engine = Engine::new(options);

    let exit_code = match &cli.command {
        Command::Parse { expression } => run_parse(&mut engine, expression),
        Command::Eval { expression, data } => run_eval(&mut engine, expression, data.as_deref()),
        Command::Bindings { text } => run_bindings(&mut engine, text),
        Command::Diff { old, new } => run_diff(&engine, old, new),
    };
    process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("RBIND_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_parse(engine: &mut Engine, expression: &str) -> i32 {
    let expr = match engine.parse_expression(expression) {
        Ok(expr) => expr,
        Err(e) => return report_parse_error(e, expression),
    };
    let output = serde_json::json!({
        "ast": &*expr,
        "paths": referenced_paths(&expr),
        "roots": referenced_roots(&expr),
    });
    print_json(&output)
}

fn run_eval(engine: &mut Engine, expression: &str, data: Option<&Path>) -> i32 {
    let scope = match data {
        Some(path) => match read_json(path) {
            Ok(json) => Value::from(json),
            Err(e) => {
                print_error(&format!("Failed to read data file '{}': {}", path.display(), e));
                return 1;
            }
        },
        None => Value::object(Vec::<(String, Value)>::new()),
    };
    match engine.evaluate(expression, &scope, None) {
        Ok(Value::Undefined) => {
            println!("undefined");
            0
        }
        Ok(value) => print_json(&value.to_json()),
        Err(EngineError::Parse(e)) => report_parse_error(e, expression),
        Err(EngineError::Eval(e)) => {
            print_error(&e.to_string());
            1
        }
    }
}

fn run_bindings(engine: &mut Engine, text: &str) -> i32 {
    match engine.parse_bindings(text) {
        Ok(pairs) => print_json(&serde_json::json!(&*pairs)),
        Err(e) => report_parse_error(e, text),
    }
}

fn run_diff(engine: &Engine, old: &Path, new: &Path) -> i32 {
    let load = |path: &Path| -> Result<Vec<Value>, String> {
        match read_json(path) {
            Ok(serde_json::Value::Array(items)) => Ok(items.into_iter().map(Value::from).collect()),
            Ok(_) => Err(format!("'{}' does not contain a JSON array", path.display())),
            Err(e) => Err(format!("Failed to read '{}': {}", path.display(), e)),
        }
    };
    let (old_items, new_items) = match (load(old), load(new)) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(e), _) | (_, Err(e)) => {
            print_error(&e);
            return 1;
        }
    };

    let mut reconciler = engine.list_reconciler();
    reconciler.reconcile("list", &old_items);
    let result = reconciler.reconcile("list", &new_items);
    let operations = result.classification.operations();
    let output = serde_json::json!({
        "classification": result.classification,
        "simple": result.simple,
        "operations": operations,
    });
    print_json(&output)
}

fn read_json(path: &Path) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn print_json(value: &serde_json::Value) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            print_error(&e.to_string());
            1
        }
    }
}

fn report_parse_error(error: ParseError, source: &str) -> i32 {
    eprintln!("{:?}", parse_error_report(error, source));
    1
}

/// Error spans are offsets into the trimmed text the caches parse.
fn parse_error_report(error: ParseError, source: &str) -> miette::Report {
    miette::Report::new(error).with_source_code(source.trim().to_string())
}

fn print_error(msg: &str) {
    if std::io::stderr().is_terminal() {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, msg);
    } else {
        eprintln!("error: {}", msg);
    }
}
