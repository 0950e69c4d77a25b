#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the Pac Pilot decision core headlessly.

mod config;
mod level;
mod sim;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use pacpilot_system_decision::Session;
use tracing_subscriber::EnvFilter;

use crate::{config::HarnessConfig, level::Level, sim::Simulation};

/// Command-line arguments for the headless harness.
#[derive(Debug, Parser)]
#[command(name = "pacpilot", about = "Drive the Pac Pilot decision core through a level")]
struct Args {
    /// Level file to play; the bundled level is used when omitted.
    #[arg(long)]
    level: Option<PathBuf>,

    /// TOML file with `[policy]` and `[harness]` sections.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate, overriding the config file.
    #[arg(long)]
    frames: Option<u64>,

    /// Lives granted at the start of the run, overriding the config file.
    #[arg(long)]
    lives: Option<u32>,

    /// Seed for both the pilot and the ghosts, overriding the config file.
    #[arg(long)]
    seed: Option<u64>,

    /// Log filter directive such as `info` or `pacpilot_system_decision=debug`.
    #[arg(long)]
    log_level: Option<String>,
}

/// Entry point for the Pac Pilot command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref())?;

    let mut config = match &args.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };
    if let Some(frames) = args.frames {
        config.harness.frames = frames;
    }
    if let Some(lives) = args.lives {
        config.harness.lives = lives;
    }
    if let Some(seed) = args.seed {
        config.policy.rng_seed = seed;
        config.harness.ghost_seed = seed;
    }

    let level = match &args.level {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read level at {}", path.display()))?;
            Level::parse(&text)
                .with_context(|| format!("failed to parse level at {}", path.display()))?
        }
        None => Level::parse(level::CLASSIC).context("bundled level is malformed")?,
    };

    let session = Session::new(config.policy, config.harness.lives)
        .context("policy configuration rejected")?;
    let mut simulation =
        Simulation::new(level, config.harness, session).context("level failed to start")?;
    let summary = simulation.run().context("simulation aborted")?;

    println!("{summary}");
    Ok(())
}

fn init_tracing(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter `{directive}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
