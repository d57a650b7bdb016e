//! Flood fill: a region growing out of one cell over discrete layers

use super::adjacency::Adjacency;
use super::layers::{Layers, Pin};
use crate::error::CnfResult;
use crate::sat::{Clause, ClauseStore, Key, Mode, Var};
use std::collections::BTreeMap;
use tracing::debug;

/// Flood-fill encoder.
///
/// Layer 0 holds exactly one cell (the seed, if given). In the default unbounded mode
/// the region can only grow: an active cell stays active, and every newly active cell
/// touches the region of the previous layer. In exact mode each layer holds exactly one
/// cell and consecutive layers are neighbours without revisits, which makes the layers a
/// self-avoiding walk. `wrap` lets the last layer feed layer 0.
#[derive(Debug, Clone)]
pub struct FloodFill {
    name: Key,
    size: usize,
    exact: bool,
    seed: Option<Key>,
    wrap: bool,
}

impl FloodFill {
    pub fn new(name: impl Into<Key>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
            exact: false,
            seed: None,
            wrap: false,
        }
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn seed(mut self, cell: impl Into<Key>) -> Self {
        self.seed = Some(cell.into());
        self
    }

    pub fn wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    /// Write the encoding and return each cell's summary variable ("reached at some layer").
    /// Every variable is fresh, so a region name can only be encoded once per store.
    pub fn encode(&self, store: &mut ClauseStore, adjacency: &Adjacency) -> CnfResult<BTreeMap<Key, Var>> {
        store.with_mode(Mode::WriteOnly, |store| self.write_encoding(store, adjacency))
    }

    fn write_encoding(&self, store: &mut ClauseStore, adjacency: &Adjacency) -> CnfResult<BTreeMap<Key, Var>> {
        store.comment(&format!("floodfill {}: layers", self.name))?;
        let pin = self.seed.as_ref().map(|cell| Pin { cell, layer: 0 });
        let layers = Layers::allocate(store, &self.name, adjacency, self.size, pin, self.wrap)?;
        if let Some(seed) = pin.and_then(|pin| layers.get(pin.cell, 0)) {
            store.write([Clause::unit(seed)])?;
        }

        if self.exact {
            store.write(layers.occupancy(|_| (1, 1)))?;
            store.write(layers.predecessors(adjacency, false))?;
            store.write(layers.freshness())?;
        } else {
            let everything = adjacency.len();
            store.write(layers.occupancy(|layer| if layer == 0 { (1, 1) } else { (0, everything) }))?;
            store.write(layers.persistence())?;
            store.write(layers.predecessors(adjacency, true))?;
        }

        store.comment(&format!("floodfill {}: summary", self.name))?;
        let summaries = layers.summarize(store, &self.name, adjacency)?;
        debug!(region = %self.name, cells = summaries.len(), layers = self.size, "flood fill encoded");
        Ok(summaries)
    }
}

/// Flood fill with every option spelled out
pub fn floodfill(
    store: &mut ClauseStore,
    name: impl Into<Key>,
    adjacency: &Adjacency,
    size: usize,
    exact: bool,
    seed: Option<Key>,
    wrap: bool,
) -> CnfResult<BTreeMap<Key, Var>> {
    let mut fill = FloodFill::new(name, size).exact(exact).wrap(wrap);
    if let Some(seed) = seed {
        fill = fill.seed(seed);
    }
    fill.encode(store, adjacency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::adjacency::Boundary;
    use crate::region::layers::layer_label;
    use crate::sat::Solution;
    use crate::test_support::in_process_store;
    use std::collections::BTreeSet;

    fn all_solutions(store: &ClauseStore) -> Vec<Solution> {
        store
            .solutions(10_000, None)
            .unwrap()
            .collect::<CnfResult<Vec<_>>>()
            .unwrap()
    }

    /// Cells active on each layer in `solution`
    fn walk(store: &ClauseStore, name: &Key, adjacency: &Adjacency, size: usize, solution: &Solution) -> Vec<Vec<Key>> {
        (0..size)
            .map(|layer| {
                adjacency
                    .cells()
                    .filter(|cell| {
                        store
                            .lookup(&layer_label(name, cell, layer))
                            .is_some_and(|var| solution.contains(var))
                    })
                    .cloned()
                    .collect()
            })
            .collect()
    }

    /// Self-avoiding walks with `size` cells starting at `from`
    fn count_walks(adjacency: &Adjacency, path: &mut Vec<Key>, size: usize) -> usize {
        if path.len() == size {
            return 1;
        }
        let last = path[path.len() - 1].clone();
        let mut total = 0;
        for next in adjacency.neighbors(&last) {
            if !path.contains(next) {
                path.push(next.clone());
                total += count_walks(adjacency, path, size);
                path.pop();
            }
        }
        total
    }

    #[test]
    fn test_exact_ring_has_two_directions() {
        let mut store = in_process_store();
        let ring = Adjacency::cycle(4);
        let summaries = floodfill(&mut store, "ring", &ring, 4, true, Some(Key::Index(0)), false).unwrap();
        assert_eq!(summaries.len(), 4);
        store.verify(false).unwrap();

        let solutions = all_solutions(&store);
        assert_eq!(solutions.len(), 2);
        for solution in &solutions {
            assert!(summaries.values().all(|&s| solution.contains(s)));
        }
    }

    #[test]
    fn test_exact_walks_on_grid() {
        let mut store = in_process_store();
        let grid = Adjacency::grid(3, 3, false, Boundary::Dead);
        let name = Key::from("snake");
        let seed = Key::Point(0, 0);
        FloodFill::new(name.clone(), 4)
            .exact(true)
            .seed(seed.clone())
            .encode(&mut store, &grid)
            .unwrap();

        let solutions = all_solutions(&store);
        let expected = count_walks(&grid, &mut vec![seed.clone()], 4);
        assert_eq!(solutions.len(), expected);

        for solution in &solutions {
            let layers = walk(&store, &name, &grid, 4, solution);
            assert!(layers.iter().all(|cells| cells.len() == 1));
            assert_eq!(layers[0][0], seed);
            for pair in layers.windows(2) {
                assert!(grid.neighbors(&pair[0][0]).contains(&pair[1][0]));
            }
            let distinct: BTreeSet<&Key> = layers.iter().map(|cells| &cells[0]).collect();
            assert_eq!(distinct.len(), 4);
        }
    }

    #[test]
    fn test_exact_wrap_closes_the_loop() {
        let mut store = in_process_store();
        let grid = Adjacency::grid(2, 2, false, Boundary::Dead);
        let name = Key::from("loop");
        floodfill(&mut store, name.clone(), &grid, 4, true, Some(Key::Point(0, 0)), true).unwrap();

        let solutions = all_solutions(&store);
        assert_eq!(solutions.len(), 2);
        for solution in &solutions {
            let layers = walk(&store, &name, &grid, 4, solution);
            assert!(grid.neighbors(&layers[3][0]).contains(&layers[0][0]));
        }
    }

    #[test]
    fn test_unbounded_growth_is_connected_and_monotone() {
        let mut store = in_process_store();
        let row = Adjacency::from_edges([(0, 1), (1, 2), (2, 3)]);
        let name = Key::from("blob");
        let summaries = FloodFill::new(name.clone(), 3)
            .seed(1)
            .encode(&mut store, &row)
            .unwrap();
        store.verify(false).unwrap();

        let solutions = all_solutions(&store);
        let mut regions = BTreeSet::new();
        for solution in &solutions {
            let layers = walk(&store, &name, &row, 3, solution);
            assert_eq!(layers[0], vec![Key::Index(1)]);
            for pair in layers.windows(2) {
                assert!(pair[0].iter().all(|cell| pair[1].contains(cell)));
            }
            let region: Vec<Key> = summaries
                .iter()
                .filter(|(_, &var)| solution.contains(var))
                .map(|(cell, _)| cell.clone())
                .collect();
            assert_eq!(region, layers[2]);
            regions.insert(region);
        }
        // every connected stretch containing cell 1 is reachable within two steps
        let expected: BTreeSet<Vec<Key>> = [vec![1], vec![0, 1], vec![1, 2], vec![0, 1, 2], vec![1, 2, 3], vec![0, 1, 2, 3]]
            .into_iter()
            .map(|cells| cells.into_iter().map(Key::Index).collect())
            .collect();
        assert_eq!(regions, expected);
    }

    #[test]
    fn test_region_name_is_single_use() {
        let mut store = in_process_store();
        let ring = Adjacency::cycle(3);
        floodfill(&mut store, "r", &ring, 2, false, None, false).unwrap();
        let err = floodfill(&mut store, "r", &ring, 2, false, None, false).unwrap_err();
        assert!(matches!(err, crate::error::CnfError::LabelPolicyViolation { .. }));
        assert_eq!(store.mode(), Mode::ReadWrite);
    }

    #[test]
    fn test_unseeded_starts_anywhere() {
        let mut store = in_process_store();
        let ring = Adjacency::cycle(3);
        let name = Key::from("free");
        floodfill(&mut store, name.clone(), &ring, 1, false, None, false).unwrap();
        let starts: BTreeSet<Vec<Key>> = all_solutions(&store)
            .iter()
            .map(|solution| walk(&store, &name, &ring, 1, solution)[0].clone())
            .collect();
        assert_eq!(starts.len(), 3);
    }
}
