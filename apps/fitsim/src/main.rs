//! fitsim - best-fit / worst-fit free-list allocator simulator.

mod cli;
mod logging;

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use fitalloc::{
    JsonReport, SimulationConfig, SimulationSummary, Strategy, TextReport, run_trials,
};
use tracing::info;

use crate::cli::{Cli, Command, ReportFormat, Settings};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_format)?;

    match cli.command {
        Command::Run { strategy, settings } => {
            let mut config = resolve(&settings)?;
            if let Some(strategy) = strategy {
                config.strategy = strategy;
            }
            simulate(&config, settings.format)?;
        }
        Command::Best { settings } => {
            let config = resolve(&settings)?.with_strategy(Strategy::BestFit);
            simulate(&config, settings.format)?;
        }
        Command::Worst { settings } => {
            let config = resolve(&settings)?.with_strategy(Strategy::WorstFit);
            simulate(&config, settings.format)?;
        }
        Command::Compare { settings } => compare(&resolve(&settings)?, settings.format)?,
    }

    Ok(())
}

fn resolve(settings: &Settings) -> Result<SimulationConfig> {
    settings.resolve().context("Invalid simulation settings")
}

fn simulate(config: &SimulationConfig, format: ReportFormat) -> Result<SimulationSummary> {
    info!(
        strategy = %config.strategy,
        arena_size = config.arena_size,
        trials = config.trial_count,
        operations = config.operations_per_trial,
        seed = ?config.seed,
        "starting simulation"
    );

    let stdout = io::stdout().lock();
    let summary = match format {
        ReportFormat::Text => run_trials(config, &mut TextReport::new(stdout)),
        ReportFormat::Json => run_trials(config, &mut JsonReport::new(stdout)),
    };
    summary.with_context(|| format!("{} simulation failed", config.strategy))
}

fn compare(config: &SimulationConfig, format: ReportFormat) -> Result<()> {
    let mut summaries = Vec::with_capacity(Strategy::ALL.len());
    for strategy in Strategy::ALL {
        summaries.push(simulate(&config.clone().with_strategy(strategy), format)?);
        if format == ReportFormat::Text {
            println!();
        }
    }

    if format == ReportFormat::Text {
        let mut out = io::stdout().lock();
        writeln!(out, "{:<10} {:>14} {:>12}", "strategy", "avg free size", "free chunks")?;
        for summary in &summaries {
            let free_chunks: usize = summary
                .trials
                .iter()
                .map(|trial| trial.fragmentation.free_chunk_count)
                .sum();
            let mean_chunks = free_chunks as f64 / summary.trial_count as f64;
            let average = summary
                .average_free_size
                .map_or_else(|| "n/a".to_string(), |value| format!("{value:.2}"));
            writeln!(out, "{:<10} {:>14} {:>12.2}", summary.strategy.as_str(), average, mean_chunks)?;
        }
    }

    Ok(())
}
