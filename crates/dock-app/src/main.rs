// ABOUTME: dock-inspect entry point.
// ABOUTME: Replays a layout scenario and prints the resulting graph, sanity report and snapshot.

mod scenario;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use dock_core::LayoutConfig;
use dock_layout::SanityFlags;
use tracing_subscriber::EnvFilter;

use scenario::{Outcome, Runner, Scenario};

#[derive(Parser)]
#[command(name = "dock-inspect")]
#[command(about = "Replay a docking layout scenario and inspect the result")]
struct Cli {
    /// Scenario file (TOML)
    scenario: PathBuf,

    /// Print the final layout snapshot as JSON
    #[arg(long)]
    json: bool,

    /// Layout config to use instead of the user's default
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LayoutConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => LayoutConfig::load_or_default(),
    };
    let source = std::fs::read_to_string(&cli.scenario)
        .with_context(|| format!("Failed to read {}", cli.scenario.display()))?;
    let scenario = Scenario::parse(&source)?;

    tracing::info!(
        "Replaying {} steps on a {}x{} canvas",
        scenario.steps.len(),
        scenario.canvas.width,
        scenario.canvas.height
    );
    let mut runner = Runner::new(&scenario, config);
    let outcomes = runner.run(&scenario.steps);
    let rejected = outcomes
        .iter()
        .filter(|o| matches!(o, Outcome::Rejected(_)))
        .count();
    for (index, outcome) in outcomes.iter().enumerate() {
        println!("{:>3}. {}", index + 1, outcome);
    }
    println!();

    let report = runner.layout.check_sanity(SanityFlags::all());
    println!("{}", report);

    if cli.json {
        let snapshot = runner.layout.snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot).context("Failed to encode snapshot")?);
    }

    if !report.is_sane() {
        bail!("layout failed its sanity check ({} steps rejected)", rejected);
    }
    tracing::info!("Done, {} of {} steps rejected", rejected, outcomes.len());
    Ok(())
}
