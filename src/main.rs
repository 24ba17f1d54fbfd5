mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::{CliConfig, Config};
use std::{fs::File, io, io::BufReader, path::Path};
use tracing::{info, warn};
use utxo_processor::{
    handler::TxHandler,
    transaction::Transaction,
    utxo::{UtxoPool, UtxoRecord},
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = CliConfig::parse();

    run_epoch(&config)?;

    info!("Epoch completed successfully");

    Ok(())
}

fn run_epoch<C: Config>(config: &C) -> Result<()> {
    let pool = load_pool(config.utxo_path())?;
    let candidates = load_candidates(config.transactions_path())?;

    info!(
        "Loaded {} unspent outputs and {} candidate transactions",
        pool.len(),
        candidates.len()
    );

    let mut handler = TxHandler::new(&pool);
    let report = handler.handle_epoch(&candidates);

    for rejection in &report.rejected {
        warn!(
            "Rejected transaction #{} ({}): {}",
            rejection.position, rejection.hash, rejection.reason
        );
    }

    info!(
        "Accepted {} transactions, rejected {}",
        report.accepted.len(),
        report.rejected.len()
    );

    let stdout = io::stdout();
    let handle = stdout.lock();
    let mut writer = csv::WriterBuilder::new().from_writer(handle);

    for record in handler.pool().records() {
        writer
            .serialize(&record)
            .context("Failed to serialize UTXO")?;
    }

    writer.flush().context("Failed to flush stdout")?;

    Ok(())
}

fn load_pool(path: &Path) -> Result<UtxoPool> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context("Failed to open UTXO file")?;

    let mut records: Vec<UtxoRecord> = Vec::new();
    let mut skipped = 0;

    for result in reader.deserialize() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("Failed to parse UTXO: {e}");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {skipped} unreadable UTXO rows");
    }

    Ok(UtxoPool::from_records(records))
}

fn load_candidates(path: &Path) -> Result<Vec<Transaction>> {
    let file = File::open(path).context("Failed to open transactions file")?;

    let mut candidates: Vec<Transaction> = serde_json::from_reader(BufReader::new(file))
        .context("Failed to parse transactions file")?;

    for tx in &mut candidates {
        tx.finalize();
    }

    Ok(candidates)
}
