//! Dense Euclidean distance table.

use crate::error::{Result, SolverError};
use crate::instance::Point;

/// An n×n distance table stored in row-major order.
///
/// Built once from the input points and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceTable {
    data: Vec<f64>,
    size: usize,
}

impl DistanceTable {
    /// Computes pairwise Euclidean distances. Fails when fewer than two points are given.
    pub fn from_points(points: &[Point]) -> Result<Self> {
        let n = points.len();
        if n < 2 {
            return Err(SolverError::invalid_input(format!(
                "need at least 2 points, got {}",
                n
            )));
        }

        let mut data = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = points[i].distance_to(&points[j]);
                data[i * n + j] = d;
                data[j * n + i] = d;
            }
        }

        Ok(DistanceTable { data, size: n })
    }

    /// Distance between points `from` and `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the table is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Length of a closed tour, including the edge from the last point back to the first
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        if tour.len() < 2 {
            return 0.0;
        }

        let mut length = 0.0;
        for pair in tour.windows(2) {
            length += self.get(pair[0], pair[1]);
        }
        length + self.get(tour[tour.len() - 1], tour[0])
    }
}
