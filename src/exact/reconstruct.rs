//! Recover the visiting order from a filled transition table.

use super::table::{bit, StateTable, START};

/// Follow the recorded transitions from `(0, START)` until the mask is full.
///
/// The walk takes exactly `n - 1` steps on a table produced by the engine; the
/// result starts at `START` and the closing edge back to it is implicit.
pub fn reconstruct(table: &StateTable) -> Vec<usize> {
    let n = table.points();
    let mut tour = Vec::with_capacity(n);
    tour.push(START);

    let mut mask = 0u32;
    let mut current = START;
    while let Some(next) = table.next(mask, current) {
        tour.push(next);
        mask |= bit(next);
        current = next;
    }

    debug_assert_eq!(tour.len(), n, "transition walk stopped early");
    tour
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceTable;
    use crate::exact::engine::{Budget, SubsetDp};
    use crate::exact::Strategy;
    use crate::instance::Point;

    #[test]
    fn test_walks_recorded_transitions() {
        // hand-filled table for three points: 0 -> 2 -> 1 -> 0
        let mut table = StateTable::new(3);
        table.record(0, START, 3.0, Some(2));
        table.record(bit(2), 2, 2.0, Some(1));
        table.record(bit(1) | bit(2), 1, 1.0, None);
        assert_eq!(reconstruct(&table), vec![0, 2, 1]);
    }

    #[test]
    fn test_two_points() {
        let dist = DistanceTable::from_points(&[Point::new(0, 0), Point::new(4, 3)]).unwrap();
        let outcome = SubsetDp::new(&dist, Budget::unlimited()).run(Strategy::BottomUp).unwrap();
        assert_eq!(reconstruct(&outcome.table), vec![0, 1]);
    }

    #[test]
    fn test_never_revisits_a_point() {
        let points: Vec<Point> = (0..9).map(|i| Point::new((i * 7) % 13, (i * i) % 11)).collect();
        let dist = DistanceTable::from_points(&points).unwrap();
        for strategy in [Strategy::BottomUp, Strategy::TopDown] {
            let outcome = SubsetDp::new(&dist, Budget::unlimited()).run(strategy).unwrap();
            let tour = reconstruct(&outcome.table);
            assert_eq!(tour.len(), 9);
            assert_eq!(tour[0], START);
            let mut seen = tour.clone();
            seen.sort_unstable();
            assert_eq!(seen, (0..9).collect::<Vec<_>>());
        }
    }
}
