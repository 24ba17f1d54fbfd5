use clap::Parser;
use std::path::{Path, PathBuf};

/// Trait for reading configuration parameters
pub trait Config {
    fn utxo_path(&self) -> &Path;
    fn transactions_path(&self) -> &Path;
}

/// CLI configuration
#[derive(Parser, Debug)]
#[command(
    name = "utxo-ledger",
    about = "Applies one epoch of candidate transactions to a UTXO set",
    version
)]
pub struct CliConfig {
    /// Path to the CSV file holding the starting UTXO set
    #[arg(value_name = "UTXO_FILE")]
    utxo_file: PathBuf,

    /// Path to the JSON array of candidate transactions, in submission order
    #[arg(value_name = "TRANSACTIONS_FILE")]
    transactions_file: PathBuf,
}

impl Config for CliConfig {
    fn utxo_path(&self) -> &Path {
        &self.utxo_file
    }

    fn transactions_path(&self) -> &Path {
        &self.transactions_file
    }
}
