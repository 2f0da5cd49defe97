//! Held-Karp subset dynamic program.
//!
//! `cost(mask, v)` is the cheapest way to visit every point outside `mask`
//! starting from `v` and then return to the start:
//!
//! - full mask: `dist(v, START)` (zero when `v` is the start itself)
//! - otherwise: `min over u not in mask of cost(mask | u, u) + dist(u, v)`
//!
//! Candidates are scanned in ascending index order and only a strictly
//! smaller cost replaces the incumbent, so the first minimum wins.

use std::time::{Duration, Instant};

use crate::distance::DistanceTable;
use crate::error::{Result, SolverError};

use super::table::{bit, StateTable, START};
use super::Strategy;

/// Limits on the work a single solve may do
#[derive(Debug, Clone, Copy, Default)]
pub struct Budget {
    pub max_evaluations: Option<u64>,
    pub time_limit: Option<Duration>,
}

impl Budget {
    pub fn unlimited() -> Self {
        Self::default()
    }
}

/// Completed tables of one solve
#[derive(Debug)]
pub struct DpOutcome {
    pub table: StateTable,
    pub evaluations: u64,
}

impl DpOutcome {
    /// Optimal tour length, the cost of the initial state
    pub fn optimum(&self) -> Option<f64> {
        self.table.cost(0, START)
    }
}

pub struct SubsetDp<'a> {
    dist: &'a DistanceTable,
    table: StateTable,
    budget: Budget,
    evaluations: u64,
    started: Instant,
}

impl<'a> SubsetDp<'a> {
    /// Allocate the tables for `dist.size()` points. The time budget starts now.
    ///
    /// # Panics
    ///
    /// Panics if the table size is outside `2..=MAX_POINTS`.
    pub fn new(dist: &'a DistanceTable, budget: Budget) -> Self {
        SubsetDp {
            dist,
            table: StateTable::new(dist.size()),
            budget,
            evaluations: 0,
            started: Instant::now(),
        }
    }

    /// Fill the tables with the given strategy. On cancellation the
    /// partially-filled tables are dropped with `self`.
    pub fn run(mut self, strategy: Strategy) -> Result<DpOutcome> {
        match strategy {
            Strategy::BottomUp => self.bottom_up()?,
            Strategy::TopDown => {
                self.top_down(0, START)?;
            }
        }

        log::debug!(
            "{} filled {} of {} states in {:.4}s",
            strategy,
            self.evaluations,
            self.table.len(),
            self.started.elapsed().as_secs_f64()
        );

        Ok(DpOutcome {
            table: self.table,
            evaluations: self.evaluations,
        })
    }

    /// Every cell, layer by layer from the full mask down to the empty one.
    fn bottom_up(&mut self) -> Result<()> {
        let n = self.table.points();
        let bits = (n - 1) as u32;

        for layer in (0..=bits).rev() {
            let mut masks = 0usize;
            for mask in subsets_of_size(bits, layer) {
                self.check_budget(true)?;
                masks += 1;
                for v in 0..n {
                    let table = &self.table;
                    let (cost, next) = best_continuation(self.dist, table.full_mask(), mask, v, |m, u| {
                        // children live in the previous (larger) layer
                        Ok(table.cost(m, u).unwrap_or(f64::INFINITY))
                    })?;
                    self.table.record(mask, v, cost, next);
                    self.evaluations += 1;
                }
            }
            log::trace!("layer {}: {} masks", layer, masks);
        }

        Ok(())
    }

    /// Lazy recursion from `(mask, v)`; depth is bounded by the point count.
    fn top_down(&mut self, mask: u32, v: usize) -> Result<f64> {
        if let Some(cost) = self.table.cost(mask, v) {
            return Ok(cost);
        }

        let dist = self.dist;
        let full = self.table.full_mask();
        let (cost, next) = best_continuation(dist, full, mask, v, |m, u| self.top_down(m, u))?;

        self.table.record(mask, v, cost, next);
        self.evaluations += 1;
        self.check_budget(self.evaluations % 1024 == 0)?;

        Ok(cost)
    }

    /// `sample_clock` decides whether the time limit is checked on this call.
    fn check_budget(&self, sample_clock: bool) -> Result<()> {
        let over_evaluations = self
            .budget
            .max_evaluations
            .map_or(false, |max| self.evaluations > max);

        let over_time = sample_clock
            && self
                .budget
                .time_limit
                .map_or(false, |limit| self.started.elapsed() > limit);

        if over_evaluations || over_time {
            return Err(SolverError::Cancelled {
                evaluations: self.evaluations,
                elapsed_secs: self.started.elapsed().as_secs_f64(),
            });
        }
        Ok(())
    }
}

/// Evaluate one state given a way to obtain child costs.
fn best_continuation<F>(
    dist: &DistanceTable,
    full: u32,
    mask: u32,
    v: usize,
    mut child: F,
) -> Result<(f64, Option<usize>)>
where
    F: FnMut(u32, usize) -> Result<f64>,
{
    if mask == full {
        return Ok((dist.get(v, START), None));
    }

    let mut best = f64::INFINITY;
    let mut next = None;
    for u in 1..dist.size() {
        let b = bit(u);
        if mask & b != 0 {
            continue;
        }
        let candidate = child(mask | b, u)? + dist.get(u, v);
        if candidate < best {
            best = candidate;
            next = Some(u);
        }
    }

    Ok((best, next))
}

/// All masks over `bits` bits with exactly `k` bits set, in ascending order.
pub fn subsets_of_size(bits: u32, k: u32) -> impl Iterator<Item = u32> {
    let limit = 1u64 << bits;
    let mut current = if k > bits {
        None
    } else {
        Some((1u64 << k) - 1)
    };

    std::iter::from_fn(move || {
        let m = current?;
        current = if m == 0 {
            None
        } else {
            // Gosper's hack: next larger integer with the same popcount
            let c = m & m.wrapping_neg();
            let r = m + c;
            let following = (((r ^ m) >> 2) / c) | r;
            if following < limit {
                Some(following)
            } else {
                None
            }
        };
        Some(m as u32)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Point;

    fn square() -> DistanceTable {
        DistanceTable::from_points(&[
            Point::new(0, 0),
            Point::new(0, 10),
            Point::new(10, 10),
            Point::new(10, 0),
        ])
        .unwrap()
    }

    fn scattered(n: usize) -> DistanceTable {
        let points: Vec<Point> = (0..n as i32)
            .map(|i| Point::new((i * 37) % 23, (i * 11) % 17))
            .collect();
        DistanceTable::from_points(&points).unwrap()
    }

    fn binomial(n: u64, k: u64) -> u64 {
        (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
    }

    #[test]
    fn test_subsets_of_size() {
        for bits in 0..8u32 {
            for k in 0..=bits {
                let masks: Vec<u32> = subsets_of_size(bits, k).collect();
                assert_eq!(masks.len() as u64, binomial(bits as u64, k as u64));
                assert!(masks.iter().all(|m| m.count_ones() == k && (*m as u64) < (1 << bits)));
                assert!(masks.windows(2).all(|w| w[0] < w[1]));
            }
        }
        assert_eq!(subsets_of_size(3, 4).count(), 0);
    }

    #[test]
    fn test_square_optimum() {
        let dist = square();
        let outcome = SubsetDp::new(&dist, Budget::unlimited()).run(Strategy::BottomUp).unwrap();
        assert!((outcome.optimum().unwrap() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_terminal_state_costs_zero() {
        let dist = square();
        let outcome = SubsetDp::new(&dist, Budget::unlimited()).run(Strategy::BottomUp).unwrap();
        let full = outcome.table.full_mask();
        assert_eq!(outcome.table.cost(full, START), Some(0.0));
        assert_eq!(outcome.table.next(full, START), None);
        // last point before home pays only the closing edge
        assert_eq!(outcome.table.cost(full, 2), Some(dist.get(2, START)));
    }

    #[test]
    fn test_bottom_up_evaluates_every_cell_once() {
        for n in 2..=9 {
            let dist = scattered(n);
            let outcome = SubsetDp::new(&dist, Budget::unlimited()).run(Strategy::BottomUp).unwrap();
            assert_eq!(outcome.evaluations, (n as u64) << (n - 1));
            assert_eq!(outcome.table.solved_count(), n << (n - 1));
        }
    }

    #[test]
    fn test_top_down_evaluates_reachable_states_once() {
        for n in 2..=9 {
            let dist = scattered(n);
            let outcome = SubsetDp::new(&dist, Budget::unlimited()).run(Strategy::TopDown).unwrap();
            let expected = 1 + ((n as u64 - 1) << (n - 2));
            assert_eq!(outcome.evaluations, expected);
            assert_eq!(outcome.table.solved_count() as u64, expected);
        }
    }

    #[test]
    fn test_strategies_agree_on_shared_states() {
        let dist = scattered(8);
        let bottom = SubsetDp::new(&dist, Budget::unlimited()).run(Strategy::BottomUp).unwrap();
        let top = SubsetDp::new(&dist, Budget::unlimited()).run(Strategy::TopDown).unwrap();

        for mask in 0..top.table.mask_count() as u32 {
            for v in 0..8 {
                if let Some(cost) = top.table.cost(mask, v) {
                    assert_eq!(bottom.table.cost(mask, v), Some(cost));
                    assert_eq!(bottom.table.next(mask, v), top.table.next(mask, v));
                }
            }
        }
    }

    #[test]
    fn test_tie_break_prefers_lowest_index() {
        // 1 and 3 are mirror images through the diagonal: both directions cost 40
        let dist = square();
        let outcome = SubsetDp::new(&dist, Budget::unlimited()).run(Strategy::BottomUp).unwrap();
        assert_eq!(outcome.table.next(0, START), Some(1));
    }

    #[test]
    fn test_evaluation_budget_cancels() {
        let dist = scattered(8);
        for strategy in [Strategy::BottomUp, Strategy::TopDown] {
            let budget = Budget { max_evaluations: Some(10), time_limit: None };
            let err = SubsetDp::new(&dist, budget).run(strategy).unwrap_err();
            assert!(matches!(err, SolverError::Cancelled { evaluations, .. } if evaluations > 10));
        }
    }

    #[test]
    fn test_exact_budget_is_enough() {
        let dist = scattered(6);
        let budget = Budget { max_evaluations: Some(6 << 5), time_limit: None };
        assert!(SubsetDp::new(&dist, budget).run(Strategy::BottomUp).is_ok());
    }

    #[test]
    fn test_zero_time_limit_cancels_bottom_up() {
        let dist = scattered(6);
        let budget = Budget { max_evaluations: None, time_limit: Some(Duration::ZERO) };
        let dp = SubsetDp::new(&dist, budget);
        std::thread::sleep(Duration::from_millis(2));
        // the first mask is checked before anything is evaluated
        let err = dp.run(Strategy::BottomUp).unwrap_err();
        assert!(matches!(err, SolverError::Cancelled { evaluations: 0, .. }));
    }

    #[test]
    fn test_time_limit_cancels_bottom_up_mid_run() {
        let n = 17;
        let dist = scattered(n);
        let budget = Budget { max_evaluations: None, time_limit: Some(Duration::from_millis(1)) };
        let err = SubsetDp::new(&dist, budget).run(Strategy::BottomUp).unwrap_err();
        match err {
            SolverError::Cancelled { evaluations, .. } => {
                assert!(evaluations < (n as u64) << (n - 1));
            }
            other => panic!("expected Cancelled, got {:?}", other),
        }
    }

    #[test]
    fn test_time_limit_cancels_top_down() {
        let dist = scattered(17);
        let budget = Budget { max_evaluations: None, time_limit: Some(Duration::from_millis(1)) };
        let err = SubsetDp::new(&dist, budget).run(Strategy::TopDown).unwrap_err();
        assert!(matches!(err, SolverError::Cancelled { .. }));
    }
}
