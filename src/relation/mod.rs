//! Relational grids: logic-grid puzzles over named axes
//!
//! Each axis is a set of keys (people, colours, house numbers...). Every pair of keys from
//! two different axes gets a relation variable; the grid then forces one-to-one pairings
//! between axes and keeps every three axes consistent with each other.

use crate::constraints::window;
use crate::error::{CnfError, CnfResult};
use crate::sat::{Clause, ClauseStore, Key, Label, Solution, Var};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// A named set of mutually unique keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    pub name: String,
    pub keys: Vec<String>,
    /// Exempt from the bijection and triangle constraints
    #[serde(default)]
    pub unconstrained: bool,
}

impl Axis {
    pub fn new<S: Into<String>>(name: impl Into<String>, keys: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            keys: keys.into_iter().map(Into::into).collect(),
            unconstrained: false,
        }
    }

    pub fn unconstrained(mut self) -> Self {
        self.unconstrained = true;
        self
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Validated axes plus a key index.
///
/// Relation labels are built from the key names, prefixed by the grid name when one is
/// set. Unnamed grids in one store therefore share variables for equal key pairs; give
/// each grid a name with [`RelationalGrid::named`] to keep them apart.
#[derive(Debug, Clone)]
pub struct RelationalGrid {
    name: Option<Key>,
    axes: Vec<Axis>,
    /// key -> (axis index, position in axis)
    positions: HashMap<String, (usize, usize)>,
}

impl RelationalGrid {
    /// Needs at least two non-empty axes with distinct names; no key may appear twice
    /// anywhere in the grid
    pub fn new(axes: Vec<Axis>) -> CnfResult<Self> {
        if axes.len() < 2 {
            return Err(CnfError::AxisShapeError(format!(
                "need at least two axes, got {}",
                axes.len()
            )));
        }

        let mut names = BTreeSet::new();
        let mut positions = HashMap::new();
        for (axis_index, axis) in axes.iter().enumerate() {
            if !names.insert(axis.name.as_str()) {
                return Err(CnfError::AxisShapeError(format!("duplicate axis {}", axis.name)));
            }
            if axis.is_empty() {
                return Err(CnfError::AxisShapeError(format!("axis {} has no keys", axis.name)));
            }
            for (position, key) in axis.keys.iter().enumerate() {
                if let Some((other, _)) = positions.insert(key.clone(), (axis_index, position)) {
                    return Err(CnfError::AxisShapeError(format!(
                        "key {} appears in both {} and {}",
                        key, axes[other].name, axis.name
                    )));
                }
            }
        }

        Ok(Self {
            name: None,
            axes,
            positions,
        })
    }

    /// Prefix every relation label with `name`
    pub fn named(mut self, name: impl Into<Key>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Cardinality of the first axis, the puzzle's side length
    pub fn side(&self) -> usize {
        self.axes[0].len()
    }

    fn position(&self, key: &str) -> CnfResult<(usize, usize)> {
        self.positions
            .get(key)
            .copied()
            .ok_or_else(|| CnfError::InvalidArgument(format!("unknown key {}", key)))
    }

    /// Label of the relation between two keys, in axis-declaration order whichever way
    /// round they are given, after the grid name if any
    pub fn relation_label(&self, a: &str, b: &str) -> CnfResult<Label> {
        let (pa, pb) = (self.position(a)?, self.position(b)?);
        if pa.0 == pb.0 {
            return Err(CnfError::InvalidArgument(format!(
                "{} and {} are both on axis {}",
                a, b, self.axes[pa.0].name
            )));
        }
        let (first, second) = if pa < pb { (a, b) } else { (b, a) };
        let mut keys: Vec<Key> = self.name.iter().cloned().collect();
        keys.extend([Key::Role("rel"), Key::from(first), Key::from(second)]);
        Ok(Label::new(keys))
    }

    /// Relation variable between two keys on different axes, allocated on first use.
    /// Follows the store's allocation mode, so a read-only store rejects new pairs.
    pub fn relation(&self, store: &mut ClauseStore, a: &str, b: &str) -> CnfResult<Var> {
        store.auto_term(self.relation_label(a, b)?)
    }

    /// Whether the pair of axes gets a bijection (and takes part in triangles)
    fn constrained(&self, i: usize, j: usize) -> bool {
        !self.axes[i].unconstrained && !self.axes[j].unconstrained
    }

    /// Allocate every relation variable, then write the bijection and triangle clauses
    pub fn compile(&self, store: &mut ClauseStore) -> CnfResult<()> {
        store.comment("relation variables")?;
        for (i, j) in (0..self.axes.len()).tuple_combinations() {
            for a in &self.axes[i].keys {
                for b in &self.axes[j].keys {
                    self.relation(store, a, b)?;
                }
            }
        }

        store.comment("one thing per axis")?;
        for (i, j) in (0..self.axes.len()).tuple_combinations() {
            let (x, y) = (&self.axes[i], &self.axes[j]);
            if !self.constrained(i, j) || x.len() != y.len() {
                debug!(first = %x.name, second = %y.name, "no bijection");
                continue;
            }
            for a in &x.keys {
                let row = y.keys.iter().map(|b| self.relation(store, a, b)).collect::<CnfResult<Vec<_>>>()?;
                store.write(window(&row, 1, 1))?;
            }
            for b in &y.keys {
                let column = x.keys.iter().map(|a| self.relation(store, a, b)).collect::<CnfResult<Vec<_>>>()?;
                store.write(window(&column, 1, 1))?;
            }
        }

        store.comment("links in triples")?;
        for (i, j, k) in (0..self.axes.len()).tuple_combinations() {
            if !(self.constrained(i, j) && self.constrained(j, k)) {
                continue;
            }
            for a in &self.axes[i].keys {
                for b in &self.axes[j].keys {
                    let ab = self.relation(store, a, b)?;
                    for c in &self.axes[k].keys {
                        let ac = self.relation(store, a, c)?;
                        let bc = self.relation(store, b, c)?;
                        store.write([
                            Clause::new(vec![ab, -ac, -bc]),
                            Clause::new(vec![-ab, ac, -bc]),
                            Clause::new(vec![-ab, -ac, bc]),
                        ])?;
                    }
                }
            }
        }
        Ok(())
    }

    /// One row per key of the first axis: that key, then for each other axis the keys
    /// related to it in `solution` (joined with `/`, or `-` when there are none)
    pub fn table(&self, store: &ClauseStore, solution: &Solution) -> CnfResult<Vec<Vec<String>>> {
        let (first, rest) = self
            .axes
            .split_first()
            .ok_or_else(|| CnfError::AxisShapeError("no axes".into()))?;
        let mut rows = Vec::with_capacity(first.len());
        for a in &first.keys {
            let mut row = vec![a.clone()];
            for axis in rest {
                let mut related = Vec::new();
                for b in &axis.keys {
                    let label = self.relation_label(a, b)?;
                    if store.lookup(&label).is_some_and(|var| solution.contains(var)) {
                        related.push(b.as_str());
                    }
                }
                row.push(if related.is_empty() {
                    "-".to_string()
                } else {
                    related.join("/")
                });
            }
            rows.push(row);
        }
        Ok(rows)
    }
}
