//! Variable allocation: labels to dense SAT variable ids

use super::clause::Var;
use super::label::{Key, Label};
use crate::error::{CnfError, CnfResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Whether the allocator may create unseen labels and/or resolve known ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    ReadWrite,
    /// Only labels that already exist may be used
    ReadOnly,
    /// Every label used must be new
    WriteOnly,
}

impl Mode {
    pub fn can_read(self) -> bool {
        !matches!(self, Mode::WriteOnly)
    }

    pub fn can_write(self) -> bool {
        !matches!(self, Mode::ReadOnly)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Mode::ReadWrite => "read-write",
            Mode::ReadOnly => "read-only",
            Mode::WriteOnly => "write-only",
        })
    }
}

/// Outcome of resolving a label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    Existing(Var),
    Created(Var),
}

impl Allocation {
    pub fn var(self) -> Var {
        match self {
            Allocation::Existing(var) | Allocation::Created(var) => var,
        }
    }
}

/// Predicate over one label component, used by [`VariableAllocator::search`]
pub type KeyPredicate = Box<dyn Fn(&Key) -> bool>;

/// Predicate accepting any component
pub fn any_key() -> KeyPredicate {
    Box::new(|_| true)
}

/// Predicate accepting exactly `key`
pub fn key_is(key: impl Into<Key>) -> KeyPredicate {
    let key = key.into();
    Box::new(move |k| *k == key)
}

/// Append-only mapping from labels to variable ids, with a mode stack
#[derive(Debug)]
pub struct VariableAllocator {
    /// Map from label to SAT variable ID (positive integer)
    variable_map: HashMap<Label, Var>,
    /// Allocation order, for the label log and searches
    order: Vec<(Label, Var)>,
    /// Mode stack; index 0 is the base mode and is never popped
    modes: Vec<Mode>,
}

impl VariableAllocator {
    pub fn new() -> Self {
        Self {
            variable_map: HashMap::new(),
            order: Vec::new(),
            modes: vec![Mode::ReadWrite],
        }
    }

    /// Mode currently in force
    pub fn mode(&self) -> Mode {
        self.modes.last().copied().unwrap_or(Mode::ReadWrite)
    }

    /// Replace the base mode (outside of any scoped override)
    pub fn set_mode(&mut self, mode: Mode) {
        self.modes[0] = mode;
    }

    pub fn push(&mut self, mode: Mode) {
        self.modes.push(mode);
    }

    /// Drop the innermost override. The base mode stays.
    pub fn pop(&mut self) -> Option<Mode> {
        if self.modes.len() > 1 {
            self.modes.pop()
        } else {
            None
        }
    }

    pub fn depth(&self) -> usize {
        self.modes.len() - 1
    }

    /// Resolve `label` under the current mode, creating it as `next_free` if unseen
    pub fn resolve(&mut self, label: Label, next_free: Var, context: &str) -> CnfResult<Allocation> {
        let mode = self.mode();
        if let Some(&id) = self.variable_map.get(&label) {
            if !mode.can_read() {
                return Err(CnfError::LabelPolicyViolation {
                    label: label.to_string(),
                    mode,
                    action: "reused",
                    context: context.to_string(),
                });
            }
            return Ok(Allocation::Existing(id));
        }

        if !mode.can_write() {
            return Err(CnfError::LabelPolicyViolation {
                label: label.to_string(),
                mode,
                action: "created",
                context: context.to_string(),
            });
        }

        self.variable_map.insert(label.clone(), next_free);
        self.order.push((label, next_free));
        Ok(Allocation::Created(next_free))
    }

    /// Look a label up without applying the mode policy
    pub fn get(&self, label: &Label) -> Option<Var> {
        self.variable_map.get(label).copied()
    }

    /// Known labels whose components satisfy the position-aligned predicates.
    /// Labels of a different arity never match.
    pub fn search<'a>(
        &'a self,
        predicates: &'a [KeyPredicate],
    ) -> impl Iterator<Item = (&'a Label, Var)> + 'a {
        self.order
            .iter()
            .filter(move |(label, _)| {
                label.len() == predicates.len()
                    && label
                        .keys()
                        .iter()
                        .zip(predicates)
                        .all(|(key, predicate)| predicate(key))
            })
            .map(|(label, var)| (label, *var))
    }

    /// Every allocation in the order it happened
    pub fn allocations(&self) -> impl Iterator<Item = (&Label, Var)> {
        self.order.iter().map(|(label, var)| (label, *var))
    }

    /// Most recent allocation
    pub fn latest(&self) -> Option<(&Label, Var)> {
        self.order.last().map(|(label, var)| (label, *var))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Get statistics about variable usage
    pub fn statistics(&self) -> VariableStatistics {
        let mut by_role = BTreeMap::new();
        for (label, _) in &self.order {
            for key in label.keys() {
                if let Key::Role(role) = key {
                    *by_role.entry(*role).or_insert(0) += 1;
                }
            }
        }

        VariableStatistics {
            total_labels: self.order.len(),
            by_role,
        }
    }

    /// Forget every label and override; the base mode is kept
    pub fn clear(&mut self) {
        self.variable_map.clear();
        self.order.clear();
        self.modes.truncate(1);
    }
}

impl Default for VariableAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about variable usage
#[derive(Debug, Clone)]
pub struct VariableStatistics {
    pub total_labels: usize,
    pub by_role: BTreeMap<&'static str, usize>,
}

impl std::fmt::Display for VariableStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Variable Statistics:")?;
        writeln!(f, "  Labelled variables: {}", self.total_labels)?;
        for (role, count) in &self.by_role {
            writeln!(f, "  {} variables: {}", role, count)?;
        }
        Ok(())
    }
}
