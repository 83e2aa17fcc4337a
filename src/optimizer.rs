//! Tour order optimizer.
//!
//! Nearest-neighbor construction for the open-path TSP over a travel matrix.
//! Pure functions: no I/O, deterministic for a given input.

use std::collections::HashMap;

use serde::Serialize;

use crate::matrix::{Cell, DistanceMatrix, Metric, cell};
use crate::traits::{Id, Marker};

/// Visiting order of a tour's markers: a permutation of the input ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TourOrder<I> {
    ids: Vec<I>,
}

impl<I: Id> TourOrder<I> {
    pub fn new(ids: Vec<I>) -> Self {
        Self { ids }
    }

    pub fn ids(&self) -> &[I] {
        &self.ids
    }

    pub fn into_ids(self) -> Vec<I> {
        self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Zero-based position of each marker, as stored per tour membership.
    pub fn positions(&self) -> HashMap<I, usize> {
        self.ids
            .iter()
            .enumerate()
            .map(|(position, id)| (id.clone(), position))
            .collect()
    }
}

/// Order `markers` to approximately minimize walking distance.
///
/// Always starts at `markers[0]`. Fewer than two markers come back unchanged.
pub fn sort_markers_optimally<M: Marker>(
    markers: &[M],
    matrix: &DistanceMatrix,
) -> TourOrder<M::Id> {
    sort_markers_by(markers, matrix, Metric::Distance)
}

/// Same as [`sort_markers_optimally`], ranking candidates by `metric`.
pub fn sort_markers_by<M: Marker>(
    markers: &[M],
    matrix: &DistanceMatrix,
    metric: Metric,
) -> TourOrder<M::Id> {
    if markers.len() < 2 {
        return TourOrder::new(markers.iter().map(|m| m.id().clone()).collect());
    }

    let order = nearest_neighbor_order(markers.len(), matrix.costs(metric));
    TourOrder::new(order.into_iter().map(|i| markers[i].id().clone()).collect())
}

/// Greedy nearest-neighbor visit order over `n` locations, starting at 0.
///
/// From the current location the cheapest reachable unvisited location is
/// taken next; ties go to the lowest index. `None` cells (and cells outside
/// `costs`) are unreachable and never compared. When nothing unvisited is
/// reachable, the lowest unvisited index is taken so the result is always a
/// full permutation.
pub fn nearest_neighbor_order(n: usize, costs: &[Vec<Cell>]) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }

    let mut visited = vec![false; n];
    let mut route = Vec::with_capacity(n);
    let mut current = 0;
    visited[current] = true;
    route.push(current);

    while route.len() < n {
        let mut best: Option<(usize, f64)> = None;

        for candidate in 0..n {
            if visited[candidate] {
                continue;
            }
            let Some(cost) = cell(costs, current, candidate) else {
                continue;
            };
            if cost.is_nan() {
                continue;
            }
            // Strictly smaller: the first index found keeps a tie.
            if best.is_none_or(|(_, best_cost)| cost < best_cost) {
                best = Some((candidate, cost));
            }
        }

        let next = match best {
            Some((candidate, _)) => candidate,
            None => match visited.iter().position(|seen| !seen) {
                Some(index) => index,
                None => break,
            },
        };

        visited[next] = true;
        route.push(next);
        current = next;
    }

    route
}

/// Sum of `distances[order[i]][order[i + 1]]` along the open path.
///
/// Missing edges (null or out of range) add zero: an unknown leg is ignored
/// rather than treated as impossible, so totals across gaps are a lower bound.
pub fn calculate_total_distance(order: &[usize], distances: &[Vec<Cell>]) -> f64 {
    order
        .windows(2)
        .filter_map(|leg| cell(distances, leg[0], leg[1]))
        .filter(|cost| !cost.is_nan())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[Option<f64>]]) -> Vec<Vec<Cell>> {
        rows.iter().map(|row| row.to_vec()).collect()
    }

    #[test]
    fn test_picks_closest_first() {
        let costs = table(&[
            &[Some(0.0), Some(500.0), Some(900.0)],
            &[Some(500.0), Some(0.0), Some(300.0)],
            &[Some(900.0), Some(300.0), Some(0.0)],
        ]);
        assert_eq!(nearest_neighbor_order(3, &costs), vec![0, 1, 2]);
    }

    #[test]
    fn test_tie_goes_to_lowest_index() {
        let costs = table(&[
            &[Some(0.0), Some(100.0), Some(100.0)],
            &[Some(100.0), Some(0.0), Some(50.0)],
            &[Some(100.0), Some(50.0), Some(0.0)],
        ]);
        assert_eq!(nearest_neighbor_order(3, &costs), vec![0, 1, 2]);
    }

    #[test]
    fn test_uses_outgoing_direction() {
        // 0 -> 2 is short, 2 -> 0 is long; only the outgoing leg matters.
        let costs = table(&[
            &[Some(0.0), Some(400.0), Some(100.0)],
            &[Some(400.0), Some(0.0), Some(200.0)],
            &[Some(900.0), Some(200.0), Some(0.0)],
        ]);
        assert_eq!(nearest_neighbor_order(3, &costs), vec![0, 2, 1]);
    }

    #[test]
    fn test_null_is_skipped_not_infinite() {
        let costs = table(&[
            &[Some(0.0), None, Some(800.0)],
            &[None, Some(0.0), Some(100.0)],
            &[Some(800.0), Some(100.0), Some(0.0)],
        ]);
        assert_eq!(nearest_neighbor_order(3, &costs), vec![0, 2, 1]);
    }

    #[test]
    fn test_isolated_location_falls_back_to_index_order() {
        let costs = table(&[
            &[Some(0.0), None, None],
            &[None, Some(0.0), None],
            &[None, None, Some(0.0)],
        ]);
        assert_eq!(nearest_neighbor_order(3, &costs), vec![0, 1, 2]);
    }

    #[test]
    fn test_ragged_matrix_still_completes() {
        let costs = table(&[&[Some(0.0), Some(10.0)]]);
        assert_eq!(nearest_neighbor_order(4, &costs), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_empty_order() {
        assert!(nearest_neighbor_order(0, &[]).is_empty());
    }

    #[test]
    fn test_total_distance() {
        let distances = table(&[
            &[Some(0.0), Some(500.0), Some(900.0)],
            &[Some(500.0), Some(0.0), Some(300.0)],
            &[Some(900.0), Some(300.0), Some(0.0)],
        ]);
        assert_eq!(calculate_total_distance(&[0, 1, 2], &distances), 800.0);
        assert_eq!(calculate_total_distance(&[0, 2, 1], &distances), 1200.0);
    }

    #[test]
    fn test_total_distance_single_or_empty() {
        let distances = table(&[&[Some(0.0)]]);
        assert_eq!(calculate_total_distance(&[0], &distances), 0.0);
        assert_eq!(calculate_total_distance(&[], &distances), 0.0);
    }

    #[test]
    fn test_positions() {
        let order = TourOrder::new(vec!["b", "a", "c"]);
        let positions = order.positions();
        assert_eq!(positions["b"], 0);
        assert_eq!(positions["a"], 1);
        assert_eq!(positions["c"], 2);
    }
}
