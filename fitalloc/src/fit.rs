use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chunk_list::{ChunkList, Position};
use crate::error::ConfigError;

/// Placement policy: picks the free chunk a request of `size` units goes to.
pub trait FitSearch: Send + Sync {
    /// Position of the chosen free chunk, or `None` when no single free
    /// chunk is large enough.
    fn find(&self, list: &ChunkList, size: usize) -> Option<Position>;

    fn name(&self) -> &'static str;
}

/// Picks the free chunk leaving the smallest remainder.
#[derive(Debug, Default, Clone, Copy)]
pub struct BestFit;

/// Picks the free chunk leaving the largest remainder.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorstFit;

impl FitSearch for BestFit {
    fn find(&self, list: &ChunkList, size: usize) -> Option<Position> {
        scan(list, size, |candidate, best| candidate < best)
    }

    fn name(&self) -> &'static str {
        "best-fit"
    }
}

impl FitSearch for WorstFit {
    fn find(&self, list: &ChunkList, size: usize) -> Option<Position> {
        scan(list, size, |candidate, best| candidate > best)
    }

    fn name(&self) -> &'static str {
        "worst-fit"
    }
}

/// Full address-order scan over eligible free chunks. A candidate replaces
/// the current pick only when `better(candidate_slack, current_slack)` holds,
/// so on equal slack the lowest address wins.
fn scan(list: &ChunkList, size: usize, better: impl Fn(usize, usize) -> bool) -> Option<Position> {
    let mut pick: Option<(Position, usize)> = None;

    for (position, chunk) in list.iter() {
        if !chunk.is_free() || chunk.size < size {
            continue;
        }
        let slack = chunk.size - size;
        match pick {
            Some((_, current)) if !better(slack, current) => {}
            _ => pick = Some((position, slack)),
        }
    }

    pick.map(|(position, _)| position)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    #[default]
    #[serde(alias = "best", alias = "best_fit")]
    BestFit,
    #[serde(alias = "worst", alias = "worst_fit")]
    WorstFit,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::BestFit, Strategy::WorstFit];

    pub fn search(self) -> Box<dyn FitSearch> {
        match self {
            Strategy::BestFit => Box::new(BestFit),
            Strategy::WorstFit => Box::new(WorstFit),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::BestFit => "best-fit",
            Strategy::WorstFit => "worst-fit",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "b" | "best" | "best-fit" | "best_fit" | "bestfit" => Ok(Strategy::BestFit),
            "w" | "worst" | "worst-fit" | "worst_fit" | "worstfit" => Ok(Strategy::WorstFit),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}
