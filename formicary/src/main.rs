use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use formicary::cli::Cli;
use formicary::config::{AppConfig, SimulationConfig};
use formicary::simulation::Simulation;
use shared::encode_snapshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Loads the simulation configuration from a TOML file or uses defaults.
fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            let config: SimulationConfig = toml::from_str(&content)
                .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
            info!("loaded config from '{}'", path.display());
            Ok(config)
        }
        None => {
            info!("no config file provided, using defaults");
            Ok(SimulationConfig::default())
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("formicary=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let app = AppConfig::from_cli_and_config(&cli, config).context("invalid configuration")?;
    let ticks = app.simulation.ticks;
    let report_every = app.simulation.report_every;

    let mut sim = Simulation::new(app.simulation).context("failed to build simulation")?;
    sim.unpause();

    let (mut eaten, mut births, mut deaths) = (0, 0, 0);
    while sim.tick_count() < ticks {
        let Some(report) = sim.update() else { break };
        eaten += report.eaten;
        births += report.births;
        deaths += report.deaths;

        if report_every > 0 && report.tick % report_every == 0 {
            info!(
                tick = report.tick,
                population = report.population,
                eaten,
                births,
                deaths,
                food_collected = sim.colony().food_collected(),
                pheromone = sim.colony().field().total_intensity(),
                "colony report"
            );
            (eaten, births, deaths) = (0, 0, 0);
        }

        if report.population == 0 {
            warn!(tick = report.tick, "colony died out");
            break;
        }
    }

    info!(
        ticks = sim.tick_count(),
        population = sim.total_ant_count(),
        food_collected = sim.colony().food_collected(),
        "run finished"
    );

    if let Some(path) = app.snapshot_out {
        let bytes = encode_snapshot(&sim.snapshot())
            .map_err(|e| anyhow!("failed to encode snapshot: {e}"))?;
        fs::write(&path, &bytes)
            .with_context(|| format!("failed to write snapshot to '{}'", path.display()))?;
        info!(bytes = bytes.len(), "snapshot written to '{}'", path.display());
    }

    Ok(())
}
