//! Adjacency models over labelled cells

use crate::error::{CnfError, CnfResult};
use crate::sat::Key;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::ops::RangeInclusive;

/// What lies beyond the edge of a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    /// Nothing: edge cells have fewer neighbours
    Dead,
    /// The grid is a torus
    Wrap,
}

/// Undirected neighbour relation between cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacency {
    neighbors: BTreeMap<Key, Vec<Key>>,
}

impl Adjacency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an isolated cell (no-op if it is already known)
    pub fn add_cell(&mut self, cell: impl Into<Key>) {
        self.neighbors.entry(cell.into()).or_default();
    }

    /// Connect two cells both ways. Self-loops and repeated edges are ignored.
    pub fn add_edge(&mut self, a: impl Into<Key>, b: impl Into<Key>) {
        let (a, b) = (a.into(), b.into());
        if a == b {
            self.add_cell(a);
            return;
        }
        let forward = self.neighbors.entry(a.clone()).or_default();
        if !forward.contains(&b) {
            forward.push(b.clone());
        }
        let backward = self.neighbors.entry(b).or_default();
        if !backward.contains(&a) {
            backward.push(a);
        }
    }

    pub fn from_edges<K: Into<Key>>(edges: impl IntoIterator<Item = (K, K)>) -> Self {
        let mut adjacency = Self::new();
        for (a, b) in edges {
            adjacency.add_edge(a, b);
        }
        adjacency
    }

    /// Rectangular grid of `Key::Point(x, y)` cells with orthogonal (and optionally
    /// diagonal) neighbours
    pub fn grid(width: usize, height: usize, diagonals: bool, boundary: Boundary) -> Self {
        let mut adjacency = Self::new();
        let (w, h) = (width as i64, height as i64);
        let mut offsets = vec![(-1, 0), (1, 0), (0, -1), (0, 1)];
        if diagonals {
            offsets.extend([(-1, -1), (1, -1), (-1, 1), (1, 1)]);
        }

        for y in 0..h {
            for x in 0..w {
                adjacency.add_cell((x, y));
                for &(dx, dy) in &offsets {
                    let (nx, ny) = (x + dx, y + dy);
                    match boundary {
                        Boundary::Dead => {
                            if (0..w).contains(&nx) && (0..h).contains(&ny) {
                                adjacency.add_edge((x, y), (nx, ny));
                            }
                        }
                        Boundary::Wrap => {
                            let wrapped = (((nx % w) + w) % w, ((ny % h) + h) % h);
                            adjacency.add_edge((x, y), wrapped);
                        }
                    }
                }
            }
        }
        adjacency
    }

    /// Ring of `Key::Index(0..n)` cells
    pub fn cycle(n: usize) -> Self {
        let mut adjacency = Self::new();
        for i in 0..n {
            adjacency.add_edge(i, (i + 1) % n);
        }
        adjacency
    }

    pub fn cells(&self) -> impl Iterator<Item = &Key> {
        self.neighbors.keys()
    }

    /// Neighbours of `cell`, empty for unknown cells
    pub fn neighbors(&self, cell: &Key) -> &[Key] {
        self.neighbors.get(cell).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, cell: &Key) -> bool {
        self.neighbors.contains_key(cell)
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Every edge once, as `(smaller, larger)`
    pub fn edges(&self) -> Vec<(Key, Key)> {
        self.neighbors
            .iter()
            .flat_map(|(a, ns)| ns.iter().filter(move |b| a < *b).map(move |b| (a.clone(), b.clone())))
            .sorted()
            .collect()
    }

    /// Breadth-first step counts from `from` to every reachable cell
    pub fn distances(&self, from: &Key) -> BTreeMap<Key, usize> {
        let mut distances = BTreeMap::new();
        if !self.contains(from) {
            return distances;
        }
        distances.insert(from.clone(), 0);
        let mut queue = VecDeque::from([from.clone()]);
        while let Some(cell) = queue.pop_front() {
            let step = distances[&cell] + 1;
            for next in self.neighbors(&cell) {
                if !distances.contains_key(next) {
                    distances.insert(next.clone(), step);
                    queue.push_back(next.clone());
                }
            }
        }
        distances
    }

    /// Error unless `cell` is part of the model
    pub(crate) fn require(&self, cell: &Key) -> CnfResult<()> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(CnfError::InvalidArgument(format!("cell {} is not in the adjacency model", cell)))
        }
    }
}

/// Every coordinate tuple of a box given one inclusive range per axis, first axis slowest
pub fn panel(ranges: &[RangeInclusive<i64>]) -> impl Iterator<Item = Vec<i64>> + '_ {
    ranges.iter().cloned().multi_cartesian_product()
}
