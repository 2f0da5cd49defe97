//! Held-Karp TSP Solver Library
//!
//! Exact shortest closed tours over small point sets, computed with the
//! Held-Karp subset dynamic program in O(n²·2ⁿ) time.
//!
//! # Features
//!
//! - Binary point file loader and writer, seeded random instances
//! - Dense Euclidean distance table
//! - Subset DP filled bottom-up (by mask size) or top-down (memoized recursion)
//! - Deterministic tour reconstruction with first-index tie-breaking
//! - Evaluation and wall-clock budgets for cancelling long solves
//! - Brute-force baseline, benchmarking, character map and SVG rendering
//!
//! # Example
//!
//! ```
//! use held_karp_tsp::instance::Point;
//! use held_karp_tsp::exact::solve;
//!
//! let points = vec![
//!     Point::new(0, 0),
//!     Point::new(0, 10),
//!     Point::new(10, 10),
//!     Point::new(10, 0),
//! ];
//! let (length, tour) = solve(&points).unwrap();
//!
//! assert!((length - 40.0).abs() < 1e-9);
//! assert_eq!(tour, vec![0, 1, 2, 3]);
//! ```

pub mod benchmark;
pub mod distance;
pub mod error;
pub mod exact;
pub mod instance;
pub mod solution;
pub mod visualization;

pub use distance::DistanceTable;
pub use error::{Result, SolverError};
pub use exact::{HeldKarpSolver, SolverConfig};
pub use instance::{Instance, Point};
pub use solution::Solution;
