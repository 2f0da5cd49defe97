//! Memo and transition tables of the subset dynamic program.
//!
//! A state is a pair `(mask, endpoint)`. The mask covers the non-start points
//! only: point `p >= 1` occupies bit `p - 1`, and the start point 0 never
//! appears in it. Both tables are flat arrays indexed by `mask * n + endpoint`,
//! sized once for `n * 2^(n-1)` cells and written at most once per cell.

/// Index of the fixed tour start
pub const START: usize = 0;

/// Largest point count whose masks fit the `u32` key
pub const MAX_POINTS: usize = 32;

const UNSOLVED: f64 = -1.0;
const NO_NEXT: u8 = u8::MAX;

/// Mask bit of a non-start point
#[inline]
pub fn bit(point: usize) -> u32 {
    debug_assert!(point != START);
    1 << (point - 1)
}

#[derive(Debug, Clone)]
pub struct StateTable {
    points: usize,
    cost: Vec<f64>,
    next: Vec<u8>,
}

impl StateTable {
    /// Allocate both tables for `points` points, every cell unsolved.
    ///
    /// # Panics
    ///
    /// Panics if `points` is outside `2..=MAX_POINTS`; callers validate first.
    pub fn new(points: usize) -> Self {
        assert!(
            (2..=MAX_POINTS).contains(&points),
            "state table for {} points",
            points
        );
        let cells = points << (points - 1);
        StateTable {
            points,
            cost: vec![UNSOLVED; cells],
            next: vec![NO_NEXT; cells],
        }
    }

    pub fn points(&self) -> usize {
        self.points
    }

    /// Number of distinct masks, `2^(n-1)`
    pub fn mask_count(&self) -> usize {
        1 << (self.points - 1)
    }

    /// Mask with every non-start point visited
    pub fn full_mask(&self) -> u32 {
        (self.mask_count() - 1) as u32
    }

    /// Total number of cells, `n * 2^(n-1)`
    pub fn len(&self) -> usize {
        self.cost.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cost.is_empty()
    }

    #[inline]
    fn index(&self, mask: u32, endpoint: usize) -> usize {
        assert!(endpoint < self.points, "endpoint {} out of range", endpoint);
        mask as usize * self.points + endpoint
    }

    /// Completion cost of a state, `None` while unsolved.
    ///
    /// # Panics
    ///
    /// Panics if the state lies outside the table's domain.
    #[inline]
    pub fn cost(&self, mask: u32, endpoint: usize) -> Option<f64> {
        let c = self.cost[self.index(mask, endpoint)];
        if c == UNSOLVED {
            None
        } else {
            Some(c)
        }
    }

    /// Next point chosen by the optimal continuation; `None` for unsolved
    /// states and for full masks.
    #[inline]
    pub fn next(&self, mask: u32, endpoint: usize) -> Option<usize> {
        match self.next[self.index(mask, endpoint)] {
            NO_NEXT => None,
            u => Some(u as usize),
        }
    }

    pub fn is_solved(&self, mask: u32, endpoint: usize) -> bool {
        self.cost(mask, endpoint).is_some()
    }

    /// Number of solved cells
    pub fn solved_count(&self) -> usize {
        self.cost.iter().filter(|&&c| c != UNSOLVED).count()
    }

    pub(crate) fn record(&mut self, mask: u32, endpoint: usize, cost: f64, next: Option<usize>) {
        let idx = self.index(mask, endpoint);
        debug_assert!(self.cost[idx] == UNSOLVED, "state ({:#b}, {}) written twice", mask, endpoint);
        debug_assert!(cost >= 0.0);
        self.cost[idx] = cost;
        self.next[idx] = next.map_or(NO_NEXT, |u| u as u8);
    }
}
