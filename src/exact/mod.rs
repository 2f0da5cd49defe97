//! Exact solvers module.
//!
//! [`HeldKarpSolver`] runs the subset dynamic program over a fresh pair of
//! memo/transition tables per call, then walks the transitions to recover the
//! tour. [`brute_force`] enumerates every order and serves as a reference.

pub mod brute_force;
pub mod engine;
pub mod reconstruct;
pub mod table;

pub use brute_force::{brute_force, BRUTE_FORCE_LIMIT};
pub use engine::{Budget, DpOutcome, SubsetDp};
pub use reconstruct::reconstruct;
pub use table::{StateTable, MAX_POINTS, START};

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::distance::DistanceTable;
use crate::error::{Result, SolverError};
use crate::instance::Point;
use crate::solution::Solution;

/// Order in which the DP fills its tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Strategy {
    /// Every state, by descending mask population count
    #[default]
    BottomUp,
    /// Memoized recursion from the initial state, reachable states only
    TopDown,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::BottomUp => "HeldKarp-BottomUp",
            Strategy::TopDown => "HeldKarp-TopDown",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Largest accepted point count (further capped by `MAX_POINTS`)
    pub max_points: usize,
    pub strategy: Strategy,
    /// Wall-clock limit in seconds
    pub time_limit: Option<f64>,
    pub max_evaluations: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_points: 20,
            strategy: Strategy::BottomUp,
            time_limit: None,
            max_evaluations: None,
        }
    }
}

impl SolverConfig {
    /// Solve limits; a time limit that is negative, NaN or too large for a
    /// `Duration` is `InvalidInput`.
    pub fn budget(&self) -> Result<Budget> {
        let time_limit = match self.time_limit {
            Some(secs) => Some(Duration::try_from_secs_f64(secs).map_err(|_| {
                SolverError::invalid_input(format!(
                    "time limit must be a finite, non-negative number of seconds, got {}",
                    secs
                ))
            })?),
            None => None,
        };
        Ok(Budget {
            max_evaluations: self.max_evaluations,
            time_limit,
        })
    }

    /// Effective point limit
    pub fn point_limit(&self) -> usize {
        self.max_points.min(MAX_POINTS)
    }
}

#[derive(Debug, Clone)]
pub struct ExactResult {
    /// Optimal tour; `cost` is the memo entry of the initial state
    pub solution: Solution,
    /// States actually computed
    pub evaluations: u64,
    /// Cells allocated in each table
    pub states: usize,
    pub strategy: Strategy,
}

pub struct HeldKarpSolver {
    pub config: SolverConfig,
}

impl HeldKarpSolver {
    pub fn new(config: SolverConfig) -> Self {
        HeldKarpSolver { config }
    }

    /// Check the point count and the budget without allocating anything
    pub fn validate(&self, n: usize) -> Result<()> {
        self.config.budget()?;
        if n < 2 {
            return Err(SolverError::invalid_input(format!(
                "need at least 2 points, got {}",
                n
            )));
        }
        let limit = self.config.point_limit();
        if n > limit {
            return Err(SolverError::CapacityExceeded { points: n, limit });
        }
        Ok(())
    }

    /// Solve for the shortest closed tour through `points`, starting at index 0
    pub fn solve(&self, points: &[Point]) -> Result<ExactResult> {
        self.validate(points.len())?;
        let dist = DistanceTable::from_points(points)?;
        self.solve_table(&dist)
    }

    /// Solve on a prebuilt distance table
    pub fn solve_table(&self, dist: &DistanceTable) -> Result<ExactResult> {
        let n = dist.size();
        self.validate(n)?;

        let start = Instant::now();
        let strategy = self.config.strategy;
        let outcome = SubsetDp::new(dist, self.config.budget()?).run(strategy)?;

        // a completed run always solves the initial state
        let cost = outcome
            .optimum()
            .ok_or_else(|| SolverError::Internal("initial state left unsolved".into()))?;
        let tour = reconstruct(&outcome.table);
        let elapsed = start.elapsed().as_secs_f64();

        log::info!(
            "{}: n={} cost={:.4} evaluations={} time={:.4}s",
            strategy,
            n,
            cost,
            outcome.evaluations,
            elapsed
        );

        Ok(ExactResult {
            solution: Solution {
                tour,
                cost,
                algorithm: strategy.name().to_string(),
                computation_time: elapsed,
                evaluations: Some(outcome.evaluations),
            },
            evaluations: outcome.evaluations,
            states: outcome.table.len(),
            strategy,
        })
    }
}

impl Default for HeldKarpSolver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

/// Shortest tour with the default configuration: `(total_distance, tour)`
pub fn solve(points: &[Point]) -> Result<(f64, Vec<usize>)> {
    let result = HeldKarpSolver::default().solve(points)?;
    Ok((result.solution.cost, result.solution.tour))
}
