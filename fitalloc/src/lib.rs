pub mod allocator;
pub mod chunk;
pub mod chunk_list;
pub mod config;
pub mod error;
pub mod fit;
pub mod random;
pub mod report;
pub mod simulator;

pub use allocator::{Allocator, Release};
pub use chunk::{Chunk, ChunkStatus};
pub use chunk_list::{ChunkList, Position};
pub use config::SimulationConfig;
pub use error::{AllocError, ConfigError, InvariantViolation, SimulationError};
pub use fit::{BestFit, FitSearch, Strategy, WorstFit};
pub use random::{EntropyRandom, RandomSource, ScriptedRandom, Xorshift64};
pub use report::{JsonReport, ReportSink, TextReport};
pub use simulator::{
    FragmentationReport, OperationStats, SimulationSummary, Step, TrialReport, WorkloadSimulator,
    run_trial, run_trials,
};
