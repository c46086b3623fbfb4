use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use fitalloc::{ConfigError, SimulationConfig, Strategy};

use crate::logging::LogFormat;

/// Free-list allocator fragmentation simulator.
#[derive(Parser, Debug)]
#[command(name = "fitsim")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the simulation with the configured strategy
    Run {
        /// Placement strategy (best-fit or worst-fit)
        #[arg(short, long)]
        strategy: Option<Strategy>,

        #[command(flatten)]
        settings: Settings,
    },

    /// Run the simulation with best-fit placement
    Best {
        #[command(flatten)]
        settings: Settings,
    },

    /// Run the simulation with worst-fit placement
    Worst {
        #[command(flatten)]
        settings: Settings,
    },

    /// Run both strategies with the same settings and compare them
    Compare {
        #[command(flatten)]
        settings: Settings,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug, Default)]
pub struct Settings {
    /// YAML file with simulation settings; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Arena size in units
    #[arg(short, long)]
    pub arena_size: Option<usize>,

    /// Number of independent trials
    #[arg(short, long)]
    pub trials: Option<usize>,

    /// Workload steps per trial
    #[arg(short, long)]
    pub operations: Option<usize>,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Report format on stdout
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

impl Settings {
    /// Config file (or defaults) with command line overrides applied.
    pub fn resolve(&self) -> Result<SimulationConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_file(path)?,
            None => SimulationConfig::default(),
        };

        if let Some(arena_size) = self.arena_size {
            config.arena_size = arena_size;
        }
        if let Some(trials) = self.trials {
            config.trial_count = trials;
        }
        if let Some(operations) = self.operations {
            config.operations_per_trial = operations;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate()?;
        Ok(config)
    }
}
