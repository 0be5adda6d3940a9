//! Billing reconciliation CLI
//!
//! Compares a TAR extract against an ECB extract and prints the discrepancy
//! report.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- ServiceCodes_TAR.csv ServiceCodes_ECB.csv --format csv > discrepancies.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use billing_recon::{report, ReconcileError, ReconcileOptions, Reconciler, Result, ValuePolicy};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Csv,
}

/// Reconciles TAR and ECB billing extracts.
#[derive(Debug, Parser)]
#[command(name = "billing-recon", version)]
struct Cli {
    /// TAR extract (CSV with SPA, Service Code, Charge, Stop Date, New Charge).
    tar: PathBuf,

    /// ECB extract (the TAR columns plus Record Desc, System, Prin, Agent).
    ecb: PathBuf,

    /// Report format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Fail on currency cells that are not numbers instead of using 0.
    #[arg(long)]
    strict: bool,

    /// Write the report here instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let options = ReconcileOptions {
        value_policy: if cli.strict {
            ValuePolicy::Reject
        } else {
            ValuePolicy::Coerce
        },
    };

    let result = Reconciler::new(options).run(&cli.tar, &cli.ecb)?;

    for warning in &result.warnings {
        eprintln!("Warning: {}", warning);
    }

    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => {
            let file = File::create(path).map_err(|source| ReconcileError::Io {
                path: path.clone(),
                source,
            })?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };

    match cli.format {
        Format::Text => report::write_text(&result.records, &result.summary, writer),
        Format::Csv => report::write_csv(&result.records, writer),
    }
}
