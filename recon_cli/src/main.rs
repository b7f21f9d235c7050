//! # Recon CLI Application
//!
//! Thin front end over the recon_core dispatcher: each query is routed to a
//! calculator and the deterministic explanation is printed, followed by the
//! JSON outcome (for LLM/API use).
//!
//! ## Usage
//!
//! ```text
//! recon_cli [--settings <path>] [query...]
//! ```
//!
//! With no query arguments, one query is read per line from stdin.
//! `RECON_SETTINGS` names a settings file when `--settings` is absent.
//! Log verbosity follows `RUST_LOG` (e.g. `RUST_LOG=recon_core=debug`).

use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use recon_core::{CalcError, DispatchOutcome, EngineSettings, RequestDispatcher};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Free-text accident reconstruction queries
#[derive(Parser, Debug)]
#[command(name = "recon_cli")]
#[command(about = "Routes pt-BR reconstruction queries to the calculators", long_about = None)]
struct Args {
    /// Engine settings file (JSON)
    #[arg(long, env = "RECON_SETTINGS")]
    settings: Option<PathBuf>,

    /// Query text; one query per stdin line when omitted
    query: Vec<String>,
}

fn init_logging() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .compact()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to init logging. {}", e);
    }
}

fn load_settings(path: Option<&Path>) -> Result<EngineSettings, CalcError> {
    let Some(path) = path else {
        return Ok(EngineSettings::default());
    };
    info!(path = %path.display(), "loading settings");
    let json = fs::read_to_string(path)
        .map_err(|e| CalcError::invalid_input("settings", path.display().to_string(), e.to_string()))?;
    EngineSettings::from_json(&json)
}

fn print_outcome(query: &str, outcome: &DispatchOutcome) {
    println!("> {}", query);
    match outcome {
        DispatchOutcome::Calculated(calc) => {
            println!("{}", calc.interpretation);
            if let Some(elaboration) = &calc.elaboration {
                println!();
                println!("{}", elaboration);
            }
        }
        DispatchOutcome::MissingParameters { prompt, .. } => println!("{}", prompt),
        DispatchOutcome::NotACalculation => println!("(nenhum cálculo identificado)"),
    }
    println!();
    if let Ok(json) = serde_json::to_string_pretty(outcome) {
        println!("{}", json);
    }
    println!();
}

fn run_query(dispatcher: &RequestDispatcher, query: &str) -> bool {
    debug!(%query, "dispatching");
    match dispatcher.dispatch(query) {
        Ok(outcome) => {
            print_outcome(query, &outcome);
            true
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!("{}", json);
            }
            false
        }
    }
}

fn main() {
    init_logging();

    let args = Args::parse();

    let settings = match load_settings(args.settings.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid settings: {}", e);
            process::exit(2);
        }
    };
    let dispatcher = RequestDispatcher::new(settings);

    let mut all_ok = true;
    if args.query.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    eprintln!("Error reading stdin: {}", e);
                    process::exit(1);
                }
            };
            let query = line.trim();
            if !query.is_empty() {
                all_ok &= run_query(&dispatcher, query);
            }
        }
    } else {
        all_ok = run_query(&dispatcher, &args.query.join(" "));
    }

    if !all_ok {
        process::exit(1);
    }
}
