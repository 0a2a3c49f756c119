use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Periwave periodic wavelet driver.
#[derive(Parser)]
#[command(
    name = "periwave",
    version,
    about = "Periodic wavelet decomposition and reconstruction"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Decimating multi-level decomposition.
    Dwt(TransformArgs),
    /// Maximal overlap (undecimated) decomposition.
    Modwt(TransformArgs),
    /// Full wavelet packet decomposition.
    Packet(TransformArgs),
    /// Round-trip every transform and report the reconstruction error.
    Check(TransformArgs),
}

/// Arguments shared by every subcommand.
#[derive(clap::Args)]
pub struct TransformArgs {
    /// Path to a whitespace-separated signal file.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path to TOML configuration file. Built-in defaults when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the filter from config (`haar`, `d4`).
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Override the decomposition depth from config.
    #[arg(short, long)]
    pub levels: Option<usize>,

    /// Path for the JSON report. Written to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
