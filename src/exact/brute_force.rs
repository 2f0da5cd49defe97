//! Exhaustive enumeration of every visiting order.
//!
//! O(n!) baseline used to cross-check the subset DP and to show in the
//! benchmark what the DP saves.

use ordered_float::OrderedFloat;

use crate::distance::DistanceTable;
use crate::error::{Result, SolverError};

use super::table::START;

/// Largest point count accepted by [`brute_force`]
pub const BRUTE_FORCE_LIMIT: usize = 12;

/// Try all `(n-1)!` orders of the non-start points in lexicographic order and
/// return the first shortest tour.
pub fn brute_force(dist: &DistanceTable) -> Result<(f64, Vec<usize>)> {
    let n = dist.size();
    if n > BRUTE_FORCE_LIMIT {
        return Err(SolverError::CapacityExceeded {
            points: n,
            limit: BRUTE_FORCE_LIMIT,
        });
    }

    let mut order: Vec<usize> = (START..n).collect();
    let mut best = (OrderedFloat(f64::INFINITY), order.clone());

    loop {
        let length = OrderedFloat(dist.tour_length(&order));
        if length < best.0 {
            best = (length, order.clone());
        }
        if !next_permutation(&mut order[1..]) {
            break;
        }
    }

    Ok((best.0.into_inner(), best.1))
}

/// Rearrange into the next lexicographic permutation; `false` once the last one is passed.
fn next_permutation(items: &mut [usize]) -> bool {
    if items.len() < 2 {
        return false;
    }

    let Some(pivot) = (0..items.len() - 1).rev().find(|&i| items[i] < items[i + 1]) else {
        return false;
    };
    let successor = (pivot + 1..items.len())
        .rev()
        .find(|&j| items[j] > items[pivot])
        .unwrap_or(pivot + 1);
    items.swap(pivot, successor);
    items[pivot + 1..].reverse();
    true
}
