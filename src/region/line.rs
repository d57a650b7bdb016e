//! Lines: one cell per step, forming a path or a loop

use super::adjacency::Adjacency;
use super::layers::{Layers, Pin};
use crate::constraints::{if_gen, Quantifier};
use crate::error::{CnfError, CnfResult};
use crate::label;
use crate::sat::{Clause, ClauseStore, Key, Mode, Var};
use std::collections::BTreeMap;
use tracing::debug;

/// Where a line is pinned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSeed {
    /// First step
    Start(Key),
    /// Last step
    End(Key),
    /// Middle step, `size / 2`
    Mid(Key),
}

impl LineSeed {
    fn cell(&self) -> &Key {
        match self {
            LineSeed::Start(cell) | LineSeed::End(cell) | LineSeed::Mid(cell) => cell,
        }
    }

    fn layer(&self, size: usize) -> usize {
        match self {
            LineSeed::Start(_) => 0,
            LineSeed::End(_) => size - 1,
            LineSeed::Mid(_) => size / 2,
        }
    }
}

/// Variables produced by a line encoding
#[derive(Debug, Clone, Default)]
pub struct LineMap {
    /// Cell is on the line
    pub cells: BTreeMap<Key, Var>,
    /// Edge `(a, b)` (with `a < b`) is walked between two consecutive steps
    pub edges: BTreeMap<(Key, Key), Var>,
}

/// Line encoder.
///
/// Step 0 holds exactly one cell and every later step at most one (exactly one when
/// `exact`), each a fresh neighbour of the step before. A `closed` line is always exact
/// and its last step is adjacent to its first.
#[derive(Debug, Clone)]
pub struct Line {
    name: Key,
    size: usize,
    exact: bool,
    closed: bool,
    seed: Option<LineSeed>,
}

impl Line {
    pub fn new(name: impl Into<Key>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
            exact: false,
            closed: false,
            seed: None,
        }
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    pub fn seed(mut self, seed: LineSeed) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Write the encoding; like flood fills, a line name can only be encoded once per store
    pub fn encode(&self, store: &mut ClauseStore, adjacency: &Adjacency) -> CnfResult<LineMap> {
        store.with_mode(Mode::WriteOnly, |store| self.write_encoding(store, adjacency))
    }

    fn write_encoding(&self, store: &mut ClauseStore, adjacency: &Adjacency) -> CnfResult<LineMap> {
        let exact = self.exact || self.closed;

        store.comment(&format!("line {}: layers", self.name))?;
        let pin = self.seed.as_ref().map(|seed| Pin {
            cell: seed.cell(),
            layer: seed.layer(self.size.max(1)),
        });
        let layers = Layers::allocate(store, &self.name, adjacency, self.size, pin, self.closed)?;

        if let Some(pinned) = pin.and_then(|pin| layers.get(pin.cell, pin.layer)) {
            store.write([Clause::unit(pinned)])?;
        }
        store.write(layers.occupancy(|layer| if exact || layer == 0 { (1, 1) } else { (0, 1) }))?;
        store.write(layers.predecessors(adjacency, false))?;
        store.write(layers.freshness())?;

        store.comment(&format!("line {}: summary", self.name))?;
        let cells = layers.summarize(store, &self.name, adjacency)?;

        store.comment(&format!("line {}: edges", self.name))?;
        let edges = self.edges(store, &layers, adjacency)?;

        debug!(line = %self.name, cells = cells.len(), edges = edges.len(), "line encoded");
        Ok(LineMap { cells, edges })
    }

    /// One "walked at this step" variable per edge and step where that is possible, and
    /// one summary per edge
    fn edges(
        &self,
        store: &mut ClauseStore,
        layers: &Layers,
        adjacency: &Adjacency,
    ) -> CnfResult<BTreeMap<(Key, Key), Var>> {
        let size = layers.size();
        let mut steps: Vec<(usize, usize)> = (1..size).map(|to| (to - 1, to)).collect();
        if self.closed && size > 1 {
            steps.push((size - 1, 0));
        }

        let mut edges = BTreeMap::new();
        for (u, v) in adjacency.edges() {
            let mut transitions = Vec::new();
            for &(from, to) in &steps {
                let forward = layers.get(&u, from).zip(layers.get(&v, to));
                let backward = layers.get(&v, from).zip(layers.get(&u, to));
                if forward.is_none() && backward.is_none() {
                    continue;
                }

                let step = store.auto_term(label!(&self.name, Key::Role("step"), &u, &v, from))?;
                let mut clauses: Vec<Clause> = [forward, backward]
                    .into_iter()
                    .flatten()
                    .map(|(a, b)| Clause::new(vec![-a, -b, step]))
                    .collect();
                match (forward, backward) {
                    (Some((a, b)), Some((c, d))) => clauses.extend([
                        Clause::new(vec![-step, a, c]),
                        Clause::new(vec![-step, a, d]),
                        Clause::new(vec![-step, b, c]),
                        Clause::new(vec![-step, b, d]),
                    ]),
                    (Some((a, b)), None) | (None, Some((a, b))) => {
                        clauses.extend([Clause::binary(-step, a), Clause::binary(-step, b)])
                    }
                    (None, None) => {}
                }
                store.write(clauses)?;
                transitions.push(step);
            }

            let edge = store.auto_term(label!(&self.name, Key::Role("edge"), &u, &v))?;
            store.write(if_gen(&transitions, &[edge], Quantifier::Any, Quantifier::All, true))?;
            edges.insert((u, v), edge);
        }
        Ok(edges)
    }
}

/// Line with every option spelled out; at most one of the three seeds may be given
#[allow(clippy::too_many_arguments)]
pub fn line(
    store: &mut ClauseStore,
    name: impl Into<Key>,
    adjacency: &Adjacency,
    size: usize,
    exact: bool,
    closed: bool,
    seed_start: Option<Key>,
    seed_end: Option<Key>,
    seed_mid: Option<Key>,
) -> CnfResult<LineMap> {
    let seeds: Vec<LineSeed> = [
        seed_start.map(LineSeed::Start),
        seed_end.map(LineSeed::End),
        seed_mid.map(LineSeed::Mid),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut encoder = Line::new(name, size).exact(exact).closed(closed);
    match seeds.len() {
        0 => {}
        1 => encoder = encoder.seed(seeds[0].clone()),
        _ => {
            return Err(CnfError::InvalidArgument(
                "line seeds are mutually exclusive: give at most one of start, end and mid".into(),
            ))
        }
    }
    encoder.encode(store, adjacency)
}
