//! Layered growth machinery shared by the flood-fill and line encoders
//!
//! One variable per (cell, layer) means "the region or path occupies this cell at this
//! step". Cells that cannot be reached from a pinned cell in time get no variable at all.

use super::adjacency::Adjacency;
use crate::constraints::{if_gen, window, Quantifier};
use crate::error::{CnfError, CnfResult};
use crate::label;
use crate::sat::{Clause, ClauseStore, Key, Label, Lit, Var};
use std::collections::BTreeMap;

/// Label of the variable for `cell` at `layer` in region `name`
pub fn layer_label(name: &Key, cell: &Key, layer: usize) -> Label {
    label!(name, Key::Role("layer"), cell, layer)
}

/// Label of the "`cell` is used at any layer" variable in region `name`
pub fn summary_label(name: &Key, cell: &Key) -> Label {
    label!(name, Key::Role("summary"), cell)
}

/// A cell fixed at a layer
#[derive(Debug, Clone, Copy)]
pub(crate) struct Pin<'a> {
    pub cell: &'a Key,
    pub layer: usize,
}

pub(crate) struct Layers {
    size: usize,
    wrap: bool,
    layers: Vec<BTreeMap<Key, Var>>,
}

impl Layers {
    /// Allocate every reachable (cell, layer) variable, layer by layer
    pub(crate) fn allocate(
        store: &mut ClauseStore,
        name: &Key,
        adjacency: &Adjacency,
        size: usize,
        pin: Option<Pin<'_>>,
        wrap: bool,
    ) -> CnfResult<Self> {
        if size == 0 {
            return Err(CnfError::InvalidArgument(format!("region {}: no layers", name)));
        }
        if adjacency.is_empty() {
            return Err(CnfError::InvalidArgument(format!("region {}: empty adjacency model", name)));
        }
        if let Some(pin) = pin {
            adjacency.require(pin.cell)?;
            if pin.layer >= size {
                return Err(CnfError::InvalidArgument(format!(
                    "region {}: pinned layer {} out of {}",
                    name, pin.layer, size
                )));
            }
        }

        let distances = pin.map(|pin| (adjacency.distances(pin.cell), pin.layer));
        let mut layers = Vec::with_capacity(size);
        for layer in 0..size {
            let mut vars = BTreeMap::new();
            for cell in adjacency.cells() {
                let reachable = match &distances {
                    Some((distances, at)) => distances
                        .get(cell)
                        .is_some_and(|&d| d <= steps_between(layer, *at, size, wrap)),
                    None => true,
                };
                if reachable {
                    let var = store.auto_term(layer_label(name, cell, layer))?;
                    vars.insert(cell.clone(), var);
                }
            }
            layers.push(vars);
        }

        Ok(Self { size, wrap, layers })
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn get(&self, cell: &Key, layer: usize) -> Option<Var> {
        self.layers[layer].get(cell).copied()
    }

    pub(crate) fn layer(&self, layer: usize) -> &BTreeMap<Key, Var> {
        &self.layers[layer]
    }

    pub(crate) fn vars(&self, layer: usize) -> Vec<Var> {
        self.layers[layer].values().copied().collect()
    }

    /// The layer feeding `layer`, if any
    pub(crate) fn previous(&self, layer: usize) -> Option<usize> {
        match layer {
            0 if self.wrap => Some(self.size - 1),
            0 => None,
            _ => Some(layer - 1),
        }
    }

    pub(crate) fn column(&self, cell: &Key) -> Vec<Var> {
        self.layers.iter().filter_map(|vars| vars.get(cell).copied()).collect()
    }

    /// Cardinality bounds on each layer, `(low, high)` as given by `bounds(layer)`
    pub(crate) fn occupancy(&self, bounds: impl Fn(usize) -> (usize, usize)) -> Vec<Clause> {
        (0..self.size)
            .flat_map(|layer| {
                let vars = self.vars(layer);
                let (low, high) = bounds(layer);
                window(&vars, low, high).collect::<Vec<_>>()
            })
            .collect()
    }

    /// An active cell needs an active predecessor on the previous layer: one of its
    /// neighbours, or itself too when `include_self`
    pub(crate) fn predecessors(&self, adjacency: &Adjacency, include_self: bool) -> Vec<Clause> {
        let mut clauses = Vec::new();
        for layer in 0..self.size {
            let Some(previous) = self.previous(layer) else {
                continue;
            };
            for (cell, &var) in self.layer(layer) {
                let mut literals: Vec<Lit> = vec![-var];
                if include_self {
                    literals.extend(self.get(cell, previous));
                }
                literals.extend(
                    adjacency
                        .neighbors(cell)
                        .iter()
                        .filter_map(|neighbor| self.get(neighbor, previous)),
                );
                clauses.push(Clause::new(literals));
            }
        }
        clauses
    }

    /// An active cell stays active on every later layer (no wrap-around)
    pub(crate) fn persistence(&self) -> Vec<Clause> {
        let mut clauses = Vec::new();
        for layer in 1..self.size {
            for (cell, &var) in self.layer(layer) {
                if let Some(earlier) = self.get(cell, layer - 1) {
                    clauses.push(Clause::binary(-earlier, var));
                }
            }
        }
        clauses
    }

    /// No cell is active on two different layers
    pub(crate) fn freshness(&self) -> Vec<Clause> {
        let mut cells: BTreeMap<&Key, Vec<Var>> = BTreeMap::new();
        for vars in &self.layers {
            for (cell, &var) in vars {
                cells.entry(cell).or_default().push(var);
            }
        }
        let mut clauses = Vec::new();
        for column in cells.values() {
            for (i, &later) in column.iter().enumerate() {
                for &earlier in &column[..i] {
                    clauses.push(Clause::binary(-later, -earlier));
                }
            }
        }
        clauses
    }

    /// Allocate one summary per cell of `adjacency`, equivalent to "active on some layer"
    pub(crate) fn summarize(
        &self,
        store: &mut ClauseStore,
        name: &Key,
        adjacency: &Adjacency,
    ) -> CnfResult<BTreeMap<Key, Var>> {
        let mut summaries = BTreeMap::new();
        for cell in adjacency.cells() {
            let summary = store.auto_term(summary_label(name, cell))?;
            summaries.insert(cell.clone(), summary);
        }
        for (cell, &summary) in &summaries {
            let column = self.column(cell);
            store.write(if_gen(&column, &[summary], Quantifier::Any, Quantifier::All, true))?;
        }
        Ok(summaries)
    }
}

/// Layers needed to get from `at` to `layer`, going around when the layers wrap
fn steps_between(layer: usize, at: usize, size: usize, wrap: bool) -> usize {
    let direct = layer.abs_diff(at);
    if wrap {
        direct.min(size - direct)
    } else {
        direct
    }
}
