//! Constraint-to-CNF compiler
//!
//! Builds propositional formulas from labelled variables and high-level constraint
//! primitives, hands them to an external or in-process SAT solver and enumerates the
//! satisfying assignments.

pub mod config;
pub mod constraints;
pub mod error;
pub mod region;
pub mod relation;
pub mod sat;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use config::Settings;
pub use error::{CnfError, CnfResult};
pub use sat::{Clause, ClauseStore, Key, Label, Lit, Mode, Solution, Var};

use anyhow::{Context, Result};
use std::path::Path;

/// Load an existing DIMACS body into a fresh ephemeral store and enumerate up to the
/// configured number of solutions. Solutions agreeing on `interesting` count once; an empty
/// list compares whole models.
pub fn solve_file(settings: &Settings, formula: &Path, interesting: &[Var]) -> Result<Vec<Solution>> {
    let mut store = ClauseStore::ephemeral(settings).context("Failed to create clause store")?;
    store
        .read(formula)
        .with_context(|| format!("Failed to read formula {}", formula.display()))?;

    let solutions = store
        .solutions(settings.enumeration.max_solutions, Some(interesting))?
        .collect::<CnfResult<Vec<_>>>()
        .context("Enumeration failed")?;
    Ok(solutions)
}
