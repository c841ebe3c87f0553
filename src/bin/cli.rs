//! Command-line entry for the reflow engine.
//!
//! Loads an input payload, validates it, repairs the schedule, verifies
//! the result, and writes the output payload.
//!
//! # Usage
//!
//! ```bash
//! reflow-cli --input schedule.json --output repaired.json
//! reflow-cli --input schedule.json --log-level debug
//! ```
//!
//! Logger verbosity (`silent | info | debug`) never affects results.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;

use reflow::persistence::{self, OutputPayload};
use reflow::scheduler::verify_schedule;
use reflow::validation::validate_input;
use reflow::ReflowEngine;

#[derive(Debug, Parser)]
#[command(
    name = "reflow-cli",
    about = "Repair a finite-capacity production schedule under disruption"
)]
struct Args {
    /// Input payload (JSON document envelopes).
    #[arg(long)]
    input: PathBuf,

    /// Where to write the output payload; stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Logger verbosity.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Silent,
    Info,
    Debug,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Silent => LevelFilter::OFF,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from(args.log_level))
        .with_target(false)
        .init();

    let payload = persistence::load_input_from_json(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    let input = payload.to_reflow_input()?;

    if let Err(errors) = validate_input(&input.work_orders, &input.work_centers) {
        for err in &errors {
            eprintln!("invalid input: {}", err.message);
        }
        anyhow::bail!("input payload failed validation with {} error(s)", errors.len());
    }

    let output = ReflowEngine::new().run(&input)?;
    info!(changes = output.changes.len(), "schedule repaired");

    let violations = verify_schedule(
        &output.updated_work_orders,
        &input.work_centers,
        &input.work_orders,
    )?;
    for violation in &violations {
        warn!(
            entity = %violation.entity_id,
            "constraint violated: {}", violation.message
        );
    }

    let out_payload = OutputPayload::from_output(&output);
    match &args.output {
        Some(path) => {
            persistence::save_output_to_json(&out_payload, path)?;
            info!(path = %path.display(), "output written");
        }
        None => println!("{}", serde_json::to_string_pretty(&out_payload)?),
    }
    Ok(())
}
