// Copyright 2023-2024 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! Distance-based neighbor lists.
//!
//! Two atoms `i != j` are neighbors if their distance is at most
//! `cutoff_i + cutoff_j + skin`. The resulting relation is symmetric and
//! exposed through the [`Adjacency`] trait so that graph algorithms do not
//! depend on how the pairs were found.

use crate::Point;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Undirected graph over `0..num_nodes()` given by a neighbor query.
pub trait Adjacency {
    /// Number of vertices
    fn num_nodes(&self) -> usize;
    /// Neighbors of vertex `i`, never including `i` itself
    fn neighbors(&self, i: usize) -> &[usize];
}

/// Strategy used to find candidate pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NeighborStrategy {
    /// Test every unordered pair; O(N²)
    AllPairs,
    /// Bucket atoms in a uniform spatial hash grid and test only adjacent cells
    #[default]
    #[value(name = "grid")]
    #[serde(rename = "grid")]
    CellGrid,
}

/// Symmetric neighbor list with sorted per-atom neighbor indices
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborList {
    neighbors: Vec<Vec<usize>>,
}

impl NeighborList {
    /// Build a neighbor list from positions and per-atom cutoff radii.
    ///
    /// Panics if `positions` and `cutoffs` differ in length.
    pub fn new(positions: &[Point], cutoffs: &[f64], skin: f64, strategy: NeighborStrategy) -> Self {
        assert_eq!(
            positions.len(),
            cutoffs.len(),
            "one cutoff per position is required"
        );
        let mut neighbors = vec![Vec::new(); positions.len()];
        let is_pair = |i: usize, j: usize| {
            let max_distance = cutoffs[i] + cutoffs[j] + skin;
            max_distance >= 0.0
                && (positions[i] - positions[j]).norm_squared() <= max_distance * max_distance
        };
        let mut add_pair = |i: usize, j: usize| {
            neighbors[i].push(j);
            neighbors[j].push(i);
        };

        let max_cutoff = cutoffs.iter().copied().fold(0.0, f64::max);
        let cell_size = 2.0 * max_cutoff + skin;

        match strategy {
            NeighborStrategy::CellGrid if cell_size > 0.0 => {
                let grid = SpatialGrid::new(positions, cell_size);
                let mut candidates = Vec::new();
                for (i, pos) in positions.iter().enumerate() {
                    grid.query_neighbors(pos, &mut candidates);
                    candidates
                        .iter()
                        .filter(|&&j| j > i && is_pair(i, j))
                        .for_each(|&j| add_pair(i, j));
                }
            }
            _ => (0..positions.len())
                .tuple_combinations()
                .filter(|&(i, j)| is_pair(i, j))
                .for_each(|(i, j)| add_pair(i, j)),
        }

        neighbors.iter_mut().for_each(|list| list.sort_unstable());
        log::debug!(
            "Neighbor list ({:?}) with {} atoms",
            strategy,
            positions.len()
        );
        Self { neighbors }
    }

    /// Number of unordered neighbor pairs
    pub fn num_pairs(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }
}

impl Adjacency for NeighborList {
    fn num_nodes(&self) -> usize {
        self.neighbors.len()
    }
    fn neighbors(&self, i: usize) -> &[usize] {
        &self.neighbors[i]
    }
}

/// Uniform cubic cells each holding the indices of the points inside.
///
/// With a cell edge no shorter than the largest pair distance, all
/// neighbors of a point lie in its own cell or one of the 26 around it.
struct SpatialGrid {
    cells: HashMap<(i64, i64, i64), Vec<usize>>,
    cell_size: f64,
}

impl SpatialGrid {
    fn new(positions: &[Point], cell_size: f64) -> Self {
        let mut grid = Self {
            cells: HashMap::with_capacity(positions.len()),
            cell_size,
        };
        for (i, pos) in positions.iter().enumerate() {
            let key = grid.cell_key(pos);
            grid.cells.entry(key).or_default().push(i);
        }
        grid
    }

    fn cell_key(&self, pos: &Point) -> (i64, i64, i64) {
        (
            (pos.x / self.cell_size).floor() as i64,
            (pos.y / self.cell_size).floor() as i64,
            (pos.z / self.cell_size).floor() as i64,
        )
    }

    /// Collect all indices in the 3×3×3 block of cells around `pos`.
    ///
    /// Far-away and non-finite coordinates saturate into the outermost cells;
    /// cells beyond the `i64` range do not exist and are skipped.
    fn query_neighbors(&self, pos: &Point, out: &mut Vec<usize>) {
        out.clear();
        let (cx, cy, cz) = self.cell_key(pos);
        for (dx, dy, dz) in itertools::iproduct!(-1..=1, -1..=1, -1..=1) {
            let key = cx
                .checked_add(dx)
                .zip(cy.checked_add(dy))
                .zip(cz.checked_add(dz))
                .map(|((x, y), z)| (x, y, z));
            if let Some(indices) = key.and_then(|key| self.cells.get(&key)) {
                out.extend_from_slice(indices);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random cloud of points in a 20 Å box
    fn cloud(n: usize) -> Vec<Point> {
        let mut state: u64 = 12345;
        let mut next = || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64 * 20.0 - 10.0
        };
        (0..n).map(|_| Point::new(next(), next(), next())).collect()
    }

    #[test]
    fn strategies_agree() {
        let positions = cloud(300);
        let cutoffs: Vec<f64> = (0..positions.len())
            .map(|i| if i % 3 == 0 { 0.31 } else { 0.76 })
            .collect();
        let brute = NeighborList::new(&positions, &cutoffs, 0.0, NeighborStrategy::AllPairs);
        let grid = NeighborList::new(&positions, &cutoffs, 0.0, NeighborStrategy::CellGrid);
        assert_eq!(brute, grid);
        assert!(brute.num_pairs() > 0);
    }

    #[test]
    fn symmetric_without_self() {
        let positions = cloud(100);
        let cutoffs = vec![1.0; positions.len()];
        let list = NeighborList::new(&positions, &cutoffs, 0.0, NeighborStrategy::CellGrid);
        for i in 0..list.num_nodes() {
            assert!(!list.neighbors(i).contains(&i));
            for &j in list.neighbors(i) {
                assert!(list.neighbors(j).contains(&i));
            }
        }
    }

    #[test]
    fn cutoff_is_inclusive() {
        let positions = vec![Point::new(0.0, 0.0, 0.0), Point::new(1.5, 0.0, 0.0)];
        for strategy in [NeighborStrategy::AllPairs, NeighborStrategy::CellGrid] {
            let list = NeighborList::new(&positions, &[0.75, 0.75], 0.0, strategy);
            assert_eq!(list.neighbors(0), &[1]);
            let list = NeighborList::new(&positions, &[0.7, 0.75], 0.0, strategy);
            assert!(list.neighbors(0).is_empty());
            let list = NeighborList::new(&positions, &[0.7, 0.75], 0.1, strategy);
            assert_eq!(list.num_pairs(), 1);
        }
    }

    #[test]
    fn negative_coordinates() {
        let positions = vec![Point::new(-0.5, -0.5, -0.5), Point::new(0.4, 0.4, 0.4)];
        let list = NeighborList::new(&positions, &[1.0, 1.0], 0.0, NeighborStrategy::CellGrid);
        assert_eq!(list.neighbors(1), &[0]);
    }

    #[test]
    fn extreme_coordinates() {
        let positions = vec![
            Point::new(f64::INFINITY, 0.0, 0.0),
            Point::new(0.0, 0.0, 0.0),
            Point::new(1e300, -1e300, f64::NAN),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1e300, 1e300, 1e300),
            Point::new(1e300, 1e300, 1e300 + 1.0),
        ];
        let cutoffs = vec![0.76; positions.len()];
        let brute = NeighborList::new(&positions, &cutoffs, 0.0, NeighborStrategy::AllPairs);
        let grid = NeighborList::new(&positions, &cutoffs, 0.0, NeighborStrategy::CellGrid);
        assert_eq!(brute, grid);
        assert_eq!(grid.neighbors(1), &[3]);
        assert_eq!(grid.neighbors(4), &[5]);
        assert!(grid.neighbors(0).is_empty());
        assert!(grid.neighbors(2).is_empty());
    }

    #[test]
    fn negative_threshold_never_bonds() {
        let positions = vec![Point::new(0.0, 0.0, 0.0), Point::new(1.4, 0.0, 0.0)];
        for strategy in [NeighborStrategy::AllPairs, NeighborStrategy::CellGrid] {
            let list = NeighborList::new(&positions, &[0.76, 0.76], -3.0, strategy);
            assert_eq!(list.num_pairs(), 0);
        }
    }

    #[test]
    fn empty_input() {
        let list = NeighborList::new(&[], &[], 0.0, NeighborStrategy::CellGrid);
        assert_eq!(list.num_nodes(), 0);
        assert_eq!(list.num_pairs(), 0);
    }
}
