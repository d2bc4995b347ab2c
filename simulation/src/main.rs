//! Ringlog - Object Log Workloads
//!
//! Drives the object log with fixed scenarios and seeded random workloads,
//! checking the stored fragment chain after every write.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use ringlog_simulation::{WorkloadConfig, run_ring_workload, run_string_workload, scenarios};

#[derive(Parser)]
#[command(
    name = "ringlog-sim",
    about = "Object log workloads over fragmented storage",
    version
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Workload configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Hexdump the storage when done
    #[arg(long, global = true)]
    dump: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the reference strings and a stream of random strings
    Strings {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Random write/read round trips through a bare multiring
    Ring {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Store the reference strings in a single buffer
    Hello,

    /// Store the reference strings in four uneven regions
    Fragmented,
}

/// Flags that replace values from the configuration
#[derive(clap::Args)]
struct Overrides {
    /// Number of random writes
    #[arg(short, long)]
    writes: Option<usize>,

    /// RNG seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Comma separated region sizes, e.g. 175,100,180,150
    #[arg(short, long, value_delimiter = ',')]
    regions: Option<Vec<usize>>,

    /// Skip the integrity walk after each write
    #[arg(long)]
    no_check: bool,
}

impl Overrides {
    fn apply(self, mut config: WorkloadConfig, dump: bool) -> WorkloadConfig {
        if let Some(writes) = self.writes {
            config.writes = writes;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(regions) = self.regions {
            config.regions = regions;
        }
        if self.no_check {
            config.check_integrity = false;
        }
        config.dump |= dump;
        config
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let base = match &cli.config {
        Some(path) => WorkloadConfig::load(path)?,
        None => WorkloadConfig::default(),
    };

    match cli.command {
        Commands::Strings { overrides } => {
            let config = overrides.apply(base, cli.dump);
            let report = run_string_workload(&config)?;

            for (offset, text) in report.survivors.iter().enumerate() {
                println!("String {} ({} bytes): {text}", report.oldest_live + offset, text.len());
            }
            println!(
                "Wrote {} strings ({} bytes), rejected {}, {} still stored",
                report.written,
                report.written_bytes,
                report.rejected,
                report.survivors.len()
            );
            if let Some(dump) = report.dump {
                print!("{dump}");
            }
        }
        Commands::Ring { overrides } => {
            let config = overrides.apply(base, cli.dump);
            let report = run_ring_workload(&config)?;

            println!(
                "{} round trips ({} bytes) over regions {:?}",
                report.rounds, report.bytes, report.regions
            );
            if let Some(dump) = report.dump {
                print!("{dump}");
            }
        }
        Commands::Hello => {
            scenarios::run_hello_scenario(cli.dump)?;
        }
        Commands::Fragmented => {
            scenarios::run_fragmented_scenario(cli.dump)?;
        }
    }

    Ok(())
}
