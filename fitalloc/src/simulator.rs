use serde::Serialize;
use tracing::{info, info_span, trace, warn};

use crate::allocator::Allocator;
use crate::chunk_list::ChunkList;
use crate::config::SimulationConfig;
use crate::error::{AllocError, SimulationError};
use crate::fit::Strategy;
use crate::random::{EntropyRandom, RandomSource, Xorshift64};
use crate::report::ReportSink;

/// One step in `FREE_ONE_IN` (on average) releases a live allocation.
pub const FREE_ONE_IN: u64 = 3;

/// Request size for a random draw. Sizes land in 1..=7 units, usually
/// doubled and usually multiplied by five, so most requests are 10..=70 units
/// with occasional small ones.
pub fn request_size(draw: u64) -> usize {
    let mut size = draw % 7 + 1;
    if draw % 23 != 0 {
        size *= 2;
    }
    if draw % 53 != 0 {
        size *= 5;
    }
    size as usize
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperationStats {
    pub allocations: usize,
    pub failed_allocations: usize,
    pub frees: usize,
    /// Free steps drawn while nothing was live.
    pub idle_frees: usize,
}

/// Free-space shape of an arena at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragmentationReport {
    pub chunk_count: usize,
    pub free_chunk_count: usize,
    /// Free chunk sizes in address order.
    pub free_chunk_sizes: Vec<usize>,
    pub total_free: usize,
    pub largest_free: usize,
    /// Mean free chunk size; `None` when the arena is fully occupied.
    pub average_free_size: Option<f64>,
}

impl FragmentationReport {
    pub fn of(list: &ChunkList) -> Self {
        let free_chunk_sizes = list.free_chunk_sizes();
        let total_free: usize = free_chunk_sizes.iter().sum();
        let free_chunk_count = free_chunk_sizes.len();
        let average_free_size =
            (free_chunk_count > 0).then(|| total_free as f64 / free_chunk_count as f64);

        Self {
            chunk_count: list.len(),
            free_chunk_count,
            largest_free: free_chunk_sizes.iter().copied().max().unwrap_or(0),
            free_chunk_sizes,
            total_free,
            average_free_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialReport {
    pub trial: usize,
    pub strategy: Strategy,
    pub fragmentation: FragmentationReport,
    pub operations: OperationStats,
    pub live_allocations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub strategy: Strategy,
    pub arena_size: usize,
    pub operations_per_trial: usize,
    pub trial_count: usize,
    #[serde(skip_serializing)]
    pub trials: Vec<TrialReport>,
    /// Mean of the per-trial averages, over trials that ended with free space.
    pub average_free_size: Option<f64>,
}

/// What a single workload step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Allocated { address: usize, size: usize },
    AllocationFailed { size: usize },
    Freed { address: usize },
    Idle,
}

/// Drives a random allocate/free workload against one arena.
pub struct WorkloadSimulator<R: RandomSource> {
    list: ChunkList,
    allocator: Allocator,
    live: Vec<usize>,
    rng: R,
    stats: OperationStats,
}

impl<R: RandomSource> WorkloadSimulator<R> {
    pub fn new(arena_size: usize, strategy: Strategy, rng: R) -> Result<Self, SimulationError> {
        Ok(Self::with_list(
            ChunkList::new(arena_size)?,
            Allocator::new(strategy),
            rng,
        ))
    }

    pub fn with_list(list: ChunkList, allocator: Allocator, rng: R) -> Self {
        Self {
            list,
            allocator,
            live: Vec::new(),
            rng,
            stats: OperationStats::default(),
        }
    }

    pub fn list(&self) -> &ChunkList {
        &self.list
    }

    pub fn live_allocations(&self) -> &[usize] {
        &self.live
    }

    pub fn stats(&self) -> OperationStats {
        self.stats
    }

    pub fn step(&mut self) -> Result<Step, AllocError> {
        let draw = self.rng.next_value();

        if draw % FREE_ONE_IN == 0 {
            if self.live.is_empty() {
                self.stats.idle_frees += 1;
                return Ok(Step::Idle);
            }
            let index = (self.rng.next_value() % self.live.len() as u64) as usize;
            let address = self.live.swap_remove(index);
            if self.allocator.free(&mut self.list, address)?.is_none() {
                warn!(address, "live allocation was not occupied");
            }
            self.stats.frees += 1;
            trace!(address, "freed");
            return Ok(Step::Freed { address });
        }

        let size = request_size(draw);
        match self.allocator.allocate(&mut self.list, size) {
            Ok(address) => {
                self.live.push(address);
                self.stats.allocations += 1;
                trace!(address, size, "allocated");
                Ok(Step::Allocated { address, size })
            }
            Err(err) if err.is_out_of_memory() => {
                self.stats.failed_allocations += 1;
                Ok(Step::AllocationFailed { size })
            }
            Err(err) => Err(err),
        }
    }

    pub fn run(&mut self, operations: usize) -> Result<(), AllocError> {
        for _ in 0..operations {
            self.step()?;
        }
        Ok(())
    }

    /// Free-space statistics of the current arena. Does not mutate anything.
    pub fn inspect(&self) -> FragmentationReport {
        FragmentationReport::of(&self.list)
    }
}

fn trial_source(seed: Option<u64>, trial: usize) -> Box<dyn RandomSource> {
    match seed {
        Some(seed) => Box::new(Xorshift64::for_trial(seed, trial)),
        None => Box::new(EntropyRandom::new()),
    }
}

/// Runs one trial on a fresh arena.
pub fn run_trial<R: RandomSource>(
    config: &SimulationConfig,
    trial: usize,
    rng: R,
) -> Result<TrialReport, SimulationError> {
    let span = info_span!("trial", trial, strategy = %config.strategy);
    let _entered = span.enter();

    let mut simulator = WorkloadSimulator::new(config.arena_size, config.strategy, rng)?;
    simulator.run(config.operations_per_trial)?;
    simulator.list().check_invariants()?;

    let fragmentation = simulator.inspect();
    info!(
        free_chunks = fragmentation.free_chunk_count,
        total_free = fragmentation.total_free,
        average_free_size = ?fragmentation.average_free_size,
        "trial finished"
    );

    Ok(TrialReport {
        trial,
        strategy: config.strategy,
        fragmentation,
        operations: simulator.stats(),
        live_allocations: simulator.live_allocations().len(),
    })
}

/// Runs `config.trial_count` independent trials and averages their mean
/// free chunk size.
pub fn run_trials(
    config: &SimulationConfig,
    sink: &mut dyn ReportSink,
) -> Result<SimulationSummary, SimulationError> {
    config.validate()?;
    sink.on_start(config)?;

    let mut trials = Vec::with_capacity(config.trial_count);
    for trial in 0..config.trial_count {
        let report = run_trial(config, trial, trial_source(config.seed, trial))?;
        sink.on_trial(&report)?;
        trials.push(report);
    }

    let averages: Vec<f64> = trials
        .iter()
        .filter_map(|trial| trial.fragmentation.average_free_size)
        .collect();
    let average_free_size =
        (!averages.is_empty()).then(|| averages.iter().sum::<f64>() / averages.len() as f64);

    let summary = SimulationSummary {
        strategy: config.strategy,
        arena_size: config.arena_size,
        operations_per_trial: config.operations_per_trial,
        trial_count: config.trial_count,
        trials,
        average_free_size,
    };
    info!(
        strategy = %summary.strategy,
        trials = summary.trial_count,
        average_free_size = ?summary.average_free_size,
        "simulation finished"
    );
    sink.on_summary(&summary)?;

    Ok(summary)
}
