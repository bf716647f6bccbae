//! Expense categorizer CLI binary.
//!
//! Offline front-end for the categorization engine: train a model from a
//! JSON file of labeled records, categorize a single expense, append
//! feedback, and inspect engine stats. Results are printed as JSON.

use std::io::Write;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::Builder;
use log::LevelFilter;
use serde::Deserialize;

use expense_categorizer::{
    CategorizationEngine, Category, EngineConfig, ExpenseRecord, FeedbackEntry,
};

/// Expensecat - expense categorization engine
#[derive(Parser, Debug)]
#[command(name = "expensecat")]
#[command(about = "Categorize business expenses with a trainable model")]
#[command(version = expense_categorizer::VERSION)]
struct ExpensecatArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory for the model artifact, metadata, and feedback log
    #[arg(long, env = "EXPENSECAT_MODEL_DIR", default_value = "models")]
    model_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a model from a JSON file of labeled expense records
    Train(TrainArgs),

    /// Categorize a single expense
    Categorize(CategorizeArgs),

    /// Record a human-corrected prediction
    Feedback(FeedbackArgs),

    /// Show engine statistics
    Stats,
}

#[derive(Parser, Debug)]
struct TrainArgs {
    /// Path to a JSON array of records, or `{"training_data": [...]}`
    #[arg(short, long)]
    input: PathBuf,
}

#[derive(Parser, Debug)]
struct CategorizeArgs {
    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    vendor: Option<String>,

    #[arg(long)]
    amount: Option<f64>,
}

#[derive(Parser, Debug)]
struct FeedbackArgs {
    /// Path to a JSON feedback payload
    #[arg(short, long)]
    input: PathBuf,
}

/// Wire shape of the original feedback endpoint body.
#[derive(Debug, Deserialize)]
struct FeedbackPayload {
    expense_data: ExpenseRecord,
    predicted_category: Category,
    actual_category: Category,
    #[serde(default)]
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct TrainPayload {
    training_data: Vec<ExpenseRecord>,
}

fn main() {
    let args = ExpensecatArgs::parse();

    let log_level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(args: ExpensecatArgs) -> anyhow::Result<()> {
    let engine = CategorizationEngine::new(EngineConfig {
        model_dir: args.model_dir,
    })?;

    match args.command {
        Command::Train(train_args) => {
            let content = std::fs::read_to_string(&train_args.input)
                .with_context(|| format!("reading {}", train_args.input.display()))?;
            let records: Vec<ExpenseRecord> = match serde_json::from_str(&content) {
                Ok(records) => records,
                Err(_) => serde_json::from_str::<TrainPayload>(&content)
                    .context("input is neither a record array nor a training_data payload")?
                    .training_data,
            };

            let report = engine.train(&records)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Categorize(categorize_args) => {
            let record = ExpenseRecord {
                title: categorize_args.title,
                description: categorize_args.description,
                vendor: categorize_args.vendor,
                amount: categorize_args.amount,
                category: None,
            };
            let result = engine.predict(&record);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Feedback(feedback_args) => {
            let content = std::fs::read_to_string(&feedback_args.input)
                .with_context(|| format!("reading {}", feedback_args.input.display()))?;
            let payload: FeedbackPayload = serde_json::from_str(&content)?;

            let entry = FeedbackEntry::new(
                payload.expense_data,
                payload.predicted_category,
                payload.actual_category,
                payload.confidence,
            );
            engine.record_feedback(&entry)?;
            println!("{{\"status\": \"success\"}}");
        }
        Command::Stats => {
            let stats = engine.stats();
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}
