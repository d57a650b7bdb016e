//! Helpers shared by unit tests

use crate::config::Settings;
use crate::sat::{Clause, ClauseStore, Var};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Ephemeral store solved in process
pub(crate) fn in_process_store() -> ClauseStore {
    ClauseStore::ephemeral(&Settings::in_process()).unwrap()
}

/// Shell script standing in for an external solver; run it as `/bin/sh <script> ...`
/// so the freshly written file is never exec'd directly
pub(crate) fn shell_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    path
}

/// Whether setting exactly `true_vars` true satisfies every clause
pub(crate) fn satisfies(clauses: &[Clause], true_vars: &BTreeSet<Var>) -> bool {
    clauses
        .iter()
        .all(|clause| clause.satisfied_by(|var| true_vars.contains(&var)))
}

/// Every subset of `vars`
pub(crate) fn assignments(vars: &[Var]) -> impl Iterator<Item = BTreeSet<Var>> + '_ {
    (0u32..1 << vars.len()).map(move |mask| {
        vars.iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, &var)| var)
            .collect()
    })
}

/// Brute-force models of `clauses` over `vars`
pub(crate) fn models(clauses: &[Clause], vars: &[Var]) -> Vec<BTreeSet<Var>> {
    assignments(vars)
        .filter(|assignment| satisfies(clauses, assignment))
        .collect()
}

/// Big-endian value of `bits` under an assignment
pub(crate) fn value(bits: &[Var], true_vars: &BTreeSet<Var>) -> u32 {
    bits.iter()
        .fold(0, |acc, bit| (acc << 1) | u32::from(true_vars.contains(bit)))
}

/// Every solution of the store, projected onto `vars`
pub(crate) fn projected_solutions(store: &ClauseStore, vars: &[Var]) -> BTreeSet<BTreeSet<Var>> {
    let interesting: BTreeSet<Var> = vars.iter().copied().collect();
    store
        .solutions(100_000, Some(vars))
        .unwrap()
        .map(|solution| solution.unwrap().restricted_to(&interesting))
        .collect()
}
