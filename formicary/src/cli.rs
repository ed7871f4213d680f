use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the headless driver.
#[derive(Parser, Debug, Default)]
#[command(name = "formicary", version, about = "Headless ant colony simulation")]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of ticks to run (overrides the config file).
    #[arg(short, long)]
    pub ticks: Option<u64>,

    /// RNG seed (overrides the config file).
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Log a colony summary every N ticks.
    #[arg(long)]
    pub report_every: Option<u64>,

    /// Advance ants on the rayon thread pool.
    #[arg(long)]
    pub parallel: bool,

    /// Write the final snapshot (rkyv encoded) to this path.
    #[arg(long)]
    pub snapshot_out: Option<PathBuf>,
}
