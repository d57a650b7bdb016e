//! Solution enumeration over a private working copy of a formula

use super::clause::{read_dimacs_file, Clause, Lit, Var};
use super::solver::SolveOutcome;
use super::solver_factory::SolverAdapter;
use crate::error::{CnfError, CnfResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempPath;
use tracing::info;

/// One satisfying assignment: the variables set true; all others are false
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// Position in the enumeration, starting at 1
    pub index: usize,
    pub true_vars: BTreeSet<Var>,
    /// Time taken by the solver call that found this solution
    #[serde(skip)]
    pub solve_time: Duration,
}

impl Solution {
    pub fn contains(&self, var: Var) -> bool {
        self.true_vars.contains(&var)
    }

    pub fn len(&self) -> usize {
        self.true_vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.true_vars.is_empty()
    }

    /// The true variables that also belong to `vars`
    pub fn restricted_to(&self, vars: &BTreeSet<Var>) -> BTreeSet<Var> {
        self.true_vars.intersection(vars).copied().collect()
    }
}

/// How to enumerate
#[derive(Debug, Clone)]
pub struct EnumerationOptions {
    /// Stop after this many solutions
    pub limit: usize,
    /// Only these variables distinguish solutions; `None` means all of them
    pub interesting: Option<BTreeSet<Var>>,
    /// Also forbid every true literal of a found solution on its own
    pub aggressive: bool,
}

impl EnumerationOptions {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            interesting: None,
            aggressive: false,
        }
    }

    pub fn interesting(mut self, vars: impl IntoIterator<Item = Var>) -> Self {
        self.interesting = Some(vars.into_iter().collect());
        self
    }

    pub fn aggressive(mut self, aggressive: bool) -> Self {
        self.aggressive = aggressive;
        self
    }
}

/// Private copy of a formula plus a result target, both deleted on drop.
///
/// The clauses are held in memory and the formula file is rewritten with a fresh
/// `p cnf <vars> <clauses>` header before every solve, since competition-style solvers
/// refuse headerless input.
#[derive(Debug)]
pub(crate) struct Snapshot {
    clauses: Vec<Clause>,
    formula: TempPath,
    output: TempPath,
}

impl Snapshot {
    /// Copy the clauses of the formula at `source`
    pub(crate) fn copy_of(source: &Path) -> CnfResult<Self> {
        let clauses = read_dimacs_file(source)?;
        let formula = tempfile::Builder::new()
            .prefix("cnf-work-")
            .suffix(".cnf")
            .tempfile()
            .map_err(|e| CnfError::io(std::env::temp_dir(), e))?
            .into_temp_path();
        let output = tempfile::Builder::new()
            .prefix("cnf-result-")
            .tempfile()
            .map_err(|e| CnfError::io(std::env::temp_dir(), e))?
            .into_temp_path();

        Ok(Self {
            clauses,
            formula,
            output,
        })
    }

    /// DIMACS problem line for the current clauses
    pub(crate) fn header(&self) -> String {
        let variables = self.clauses.iter().map(Clause::max_var).max().unwrap_or(0);
        format!("p cnf {} {}", variables, self.clauses.len())
    }

    fn write_formula(&self) -> CnfResult<()> {
        let path = self.formula_path();
        let file = std::fs::File::create(path).map_err(|e| CnfError::io(path, e))?;
        let mut writer = std::io::BufWriter::new(file);
        writeln!(writer, "{}", self.header()).map_err(|e| CnfError::io(path, e))?;
        for clause in &self.clauses {
            writeln!(writer, "{}", clause.to_dimacs()).map_err(|e| CnfError::io(path, e))?;
        }
        writer.flush().map_err(|e| CnfError::io(path, e))
    }

    pub(crate) fn solve(&self, solver: &SolverAdapter) -> CnfResult<SolveOutcome> {
        self.write_formula()?;
        solver.solve(self.formula_path(), &self.output)
    }

    /// Add clauses to the working copy only
    pub(crate) fn append(&mut self, clauses: Vec<Clause>) {
        self.clauses.extend(clauses);
    }

    pub(crate) fn formula_path(&self) -> &Path {
        &self.formula
    }
}

/// Lazy, finite sequence of distinct solutions.
///
/// Each pull solves the working copy, then appends a clause blocking the (projected)
/// assignment. Ends at the limit, when the solver reports unsatisfiable, or after the
/// first error.
pub struct Solutions<'a> {
    solver: &'a SolverAdapter,
    snapshot: Snapshot,
    options: EnumerationOptions,
    found: usize,
    finished: bool,
}

impl<'a> Solutions<'a> {
    pub(crate) fn new(solver: &'a SolverAdapter, snapshot: Snapshot, options: EnumerationOptions) -> Self {
        Self {
            solver,
            snapshot,
            options,
            found: 0,
            finished: false,
        }
    }

    /// Number of solutions produced so far
    pub fn found(&self) -> usize {
        self.found
    }

    /// Clauses that forbid `model` (restricted to the interesting variables) from recurring
    fn blocking_clauses(&self, model: &[Lit]) -> Vec<Clause> {
        let projected: Vec<Lit> = match &self.options.interesting {
            Some(interesting) => model
                .iter()
                .copied()
                .filter(|lit| interesting.contains(&lit.abs()))
                .collect(),
            None => model.to_vec(),
        };

        let mut clauses = vec![Clause::new(projected.iter().map(|lit| -lit).collect())];
        if self.options.aggressive {
            clauses.extend(projected.iter().filter(|&&lit| lit > 0).map(|&lit| Clause::unit(-lit)));
        }
        clauses
    }

    fn advance(&mut self) -> CnfResult<Option<Solution>> {
        let start_time = Instant::now();
        let model = match self.snapshot.solve(self.solver)? {
            SolveOutcome::Satisfiable(model) => model,
            SolveOutcome::Unsatisfiable => return Ok(None),
        };
        let solve_time = start_time.elapsed();

        let blocking = self.blocking_clauses(&model);
        self.snapshot.append(blocking);
        self.found += 1;

        let true_vars: BTreeSet<Var> = model.iter().copied().filter(|&lit| lit > 0).collect();
        info!(index = self.found, true_vars = true_vars.len(), "solution found");
        Ok(Some(Solution {
            index: self.found,
            true_vars,
            solve_time,
        }))
    }
}

impl Iterator for Solutions<'_> {
    type Item = CnfResult<Solution>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.found >= self.options.limit {
            return None;
        }
        match self.advance() {
            Ok(Some(solution)) => Some(Ok(solution)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
