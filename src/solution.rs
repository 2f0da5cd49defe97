//! Solution representation for tours.
//!
//! A solution pairs a visiting order with its total length and the
//! bookkeeping of the run that produced it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::distance::DistanceTable;

/// A closed tour over all points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The tour as a sequence of point indices (starting at 0, returning to it implicitly)
    pub tour: Vec<usize>,
    /// Total tour length including the closing edge
    pub cost: f64,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of DP state evaluations (if applicable)
    pub evaluations: Option<u64>,
}

impl Solution {
    /// Create a new empty solution
    pub fn new() -> Self {
        Solution {
            tour: Vec::new(),
            cost: f64::INFINITY,
            algorithm: String::new(),
            computation_time: 0.0,
            evaluations: None,
        }
    }

    /// Create a solution from a tour, measuring its length
    pub fn from_tour(dist: &DistanceTable, tour: Vec<usize>, algorithm: &str) -> Self {
        Solution {
            cost: dist.tour_length(&tour),
            tour,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
            evaluations: None,
        }
    }

    /// Check if all `n` points are visited exactly once, starting at 0
    pub fn is_complete(&self, n: usize) -> bool {
        if self.tour.len() != n || self.tour.first() != Some(&0) {
            return false;
        }

        let unique: HashSet<usize> = self.tour.iter().cloned().collect();
        unique.len() == n && self.tour.iter().all(|&p| p < n)
    }

    /// Length of the tour as measured on `dist`, independent of the stored cost
    pub fn measured_length(&self, dist: &DistanceTable) -> f64 {
        dist.tour_length(&self.tour)
    }

    /// Visiting order as `a -> b -> ... -> a`
    pub fn route_string(&self) -> String {
        let mut parts: Vec<String> = self.tour.iter().map(|p| p.to_string()).collect();
        if let Some(first) = self.tour.first() {
            parts.push(first.to_string());
        }
        parts.join(" -> ")
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Cost: {:.6}", self.cost)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        if let Some(evaluations) = self.evaluations {
            writeln!(f, "  Evaluations: {}", evaluations)?;
        }
        writeln!(f, "  Tour: {}", self.route_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Point;

    #[test]
    fn test_solution_creation() {
        let sol = Solution::new();
        assert!(sol.tour.is_empty());
        assert_eq!(sol.cost, f64::INFINITY);
        assert!(!sol.is_complete(1));
    }

    #[test]
    fn test_is_complete() {
        let sol = Solution { tour: vec![0, 2, 1, 3], ..Solution::new() };
        assert!(sol.is_complete(4));
        assert!(!sol.is_complete(5));

        let repeated = Solution { tour: vec![0, 1, 1, 3], ..Solution::new() };
        assert!(!repeated.is_complete(4));

        let wrong_start = Solution { tour: vec![1, 0, 2, 3], ..Solution::new() };
        assert!(!wrong_start.is_complete(4));
    }

    #[test]
    fn test_from_tour_measures_length() {
        let dist = DistanceTable::from_points(&[Point::new(0, 0), Point::new(3, 4)]).unwrap();
        let sol = Solution::from_tour(&dist, vec![0, 1], "manual");
        assert!((sol.cost - 10.0).abs() < 1e-10);
        assert_eq!(sol.route_string(), "0 -> 1 -> 0");
    }
}
