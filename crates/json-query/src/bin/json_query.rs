//! `json-query` — evaluate an expression against a JSON file.
//!
//! Usage:
//!   json-query <json_file> '<expression>'
//!
//! Prints the result to stdout. Errors go to stderr prefixed with their
//! category, and the process exits with status 1.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use json_query::evaluate;

/// Evaluate a query expression such as `a.b[0]` or `max(a.b)` against a JSON file.
#[derive(Parser, Debug)]
#[command(name = "json-query", version, about)]
struct Args {
    /// JSON document to query
    json_file: PathBuf,
    /// Expression to evaluate, e.g. `a.b[a.b[1]].c`
    expression: String,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let json_text = match std::fs::read_to_string(&args.json_file) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error in opening file: {}: {e}", args.json_file.display());
            return ExitCode::FAILURE;
        }
    };

    match evaluate(&json_text, &args.expression) {
        Ok(result) => {
            println!("{result}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
