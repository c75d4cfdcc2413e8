//! BB84 command-line driver.
//!
//! Runs the experiment with and without an eavesdropper and prints both average
//! QBERs. Arguments override the optional JSON config file, which overrides the
//! defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use bb84_sim::{CancelToken, ExperimentConfig, OracleKind, RandomSource, oracle, run_experiment};

#[derive(Clone, Copy, ValueEnum)]
enum OracleArg {
    Ideal,
    DensityMatrix,
}

impl From<OracleArg> for OracleKind {
    fn from(arg: OracleArg) -> Self {
        match arg {
            OracleArg::Ideal => OracleKind::Ideal,
            OracleArg::DensityMatrix => OracleKind::DensityMatrix,
        }
    }
}

/// Simulate BB84 key distribution and measure the eavesdropper's QBER footprint
#[derive(Parser)]
#[command(name = "bb84")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// JSON configuration file
    #[arg(short, long, env = "BB84_CONFIG")]
    config: Option<PathBuf>,

    /// Carriers per trial
    #[arg(short, long, env = "BB84_N_BIT")]
    n_bit: Option<usize>,

    /// Trials per condition
    #[arg(short, long, env = "BB84_TRIALS")]
    trials: Option<usize>,

    /// Retries allowed for a trial whose oracle failed
    #[arg(long, env = "BB84_MAX_RETRIES")]
    max_retries: Option<usize>,

    /// Master seed for reproducible runs
    #[arg(short, long, env = "BB84_SEED")]
    seed: Option<u64>,

    /// Measurement oracle backend
    #[arg(long, value_enum, env = "BB84_ORACLE")]
    oracle: Option<OracleArg>,

    /// Depolarizing probability per transmission (density-matrix oracle)
    #[arg(long, env = "BB84_NOISE")]
    noise: Option<f64>,

    /// Print the full summary as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn experiment_config(&self) -> Result<ExperimentConfig> {
        let mut config = match &self.config {
            Some(path) => ExperimentConfig::from_file(path)?,
            None => ExperimentConfig::default(),
        };

        if let Some(n_bit) = self.n_bit {
            config.n_bit = n_bit;
        }
        if let Some(trials) = self.trials {
            config.trials = trials;
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(oracle) = self.oracle {
            config.oracle = oracle.into();
        }
        if let Some(noise) = self.noise {
            config.noise = Some(noise);
            if self.oracle.is_none() {
                config.oracle = OracleKind::DensityMatrix;
            }
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = cli.experiment_config()?;
    config.validate()?;

    let mut rng = match config.seed {
        Some(seed) => RandomSource::from_seed(seed),
        None => RandomSource::from_entropy(),
    };
    let mut backend = oracle::from_config(&config, &mut rng)?;

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            warn!("interrupted, stopping after the current batch");
            cancel.cancel();
        })
        .context("failed to install Ctrl-C handler")?;
    }

    let summary = run_experiment(&config, &mut rng, backend.as_mut(), &cancel)
        .context("BB84 experiment failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("oracle: {}", backend.name());
    println!(
        "{} trials x {} carriers per condition",
        summary.trials, summary.n_bit
    );
    println!("avg qber without eve {:.4}", summary.without_eve.mean_qber);
    println!("avg qber with eve    {:.4}", summary.with_eve.mean_qber);
    if !summary.failures.is_empty() {
        println!("{} failed attempts were retried", summary.failures.len());
    }

    Ok(())
}
