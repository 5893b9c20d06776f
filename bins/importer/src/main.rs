//! Grandlivre importer
//!
//! Loads an FEC export into an in-memory ledger and prints the import
//! summary together with the trial balance, balance sheet and income
//! statement as JSON.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grandlivre_core::import::read_fec;
use grandlivre_engine::{LedgerEngine, MemoryStore};
use grandlivre_shared::AppConfig;
use grandlivre_shared::types::CompanyId;

/// Import an FEC file and print the resulting statements.
#[derive(Debug, Parser)]
#[command(name = "grandlivre", version, about)]
struct Cli {
    /// FEC file (pipe, tab or semicolon delimited)
    file: PathBuf,

    /// Company the ledger belongs to; a fresh id when omitted
    #[arg(long, env = "GRANDLIVRE_COMPANY_ID")]
    company: Option<CompanyId>,

    /// First day of the reporting period (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day of the reporting period (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Keep accounts without balance or movement in the trial balance
    #[arg(long)]
    include_zero: bool,

    /// Overrides `engine.import_batch_size`
    #[arg(long)]
    batch_size: Option<usize>,

    /// Overrides `engine.import_status`
    #[arg(long)]
    status: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("failed to load configuration")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.filter.as_str().into());
    if config.logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    if let Some(batch_size) = cli.batch_size {
        config.engine.import_batch_size = batch_size;
    }
    if let Some(status) = cli.status {
        config.engine.import_status = status;
    }

    let file = File::open(&cli.file)
        .with_context(|| format!("cannot open {}", cli.file.display()))?;
    let rows = read_fec(file).with_context(|| format!("cannot read {}", cli.file.display()))?;
    info!(rows = rows.len(), file = %cli.file.display(), "FEC file parsed");

    let company_id = cli.company.unwrap_or_default();
    let engine = LedgerEngine::new(Arc::new(MemoryStore::new()), config.engine);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping import");
            on_interrupt.cancel();
        }
    });

    let outcome = engine
        .import_ledger_with_cancel(company_id, &rows, &cancel)
        .await?;

    let trial_balance = engine
        .generate_trial_balance(company_id, cli.start, cli.end, cli.include_zero)
        .await?;
    let balance_sheet = engine
        .generate_balance_sheet(company_id, cli.start, cli.end)
        .await?;
    let income_statement = engine
        .generate_income_statement(company_id, cli.start, cli.end)
        .await?;

    let report = serde_json::json!({
        "company_id": company_id,
        "import": {
            "journals": outcome.journals,
            "accounts": outcome.accounts,
            "entries": outcome.entries,
            "lines_created": outcome.lines_created,
            "counts": outcome.counts,
            "errors": outcome.errors().collect::<Vec<_>>(),
            "cancelled": outcome.cancelled,
        },
        "trial_balance": trial_balance,
        "balance_sheet": balance_sheet,
        "income_statement": income_statement,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
