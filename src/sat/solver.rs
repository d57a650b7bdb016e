//! Decision-procedure backends
//!
//! Every backend answers the same question: given a formula file on disk and a path it may
//! use for its result, is the formula satisfiable and with which model. The two process
//! backends follow the exit-status convention shared by MiniSat and the SAT competition
//! (10 = satisfiable, 20 = unsatisfiable); they differ in where the model is reported.

use super::clause::{parse_literals, read_dimacs_file, Lit};
use crate::error::{CnfError, CnfResult};
use cadical::Solver;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

const EXIT_SATISFIABLE: i32 = 10;
const EXIT_UNSATISFIABLE: i32 = 20;

/// Verdict of one solver run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// Full model as signed literals, one per variable the solver reported
    Satisfiable(Vec<Lit>),
    Unsatisfiable,
}

impl SolveOutcome {
    pub fn is_satisfiable(&self) -> bool {
        matches!(self, SolveOutcome::Satisfiable(_))
    }

    pub fn model(&self) -> Option<&[Lit]> {
        match self {
            SolveOutcome::Satisfiable(model) => Some(model),
            SolveOutcome::Unsatisfiable => None,
        }
    }
}

/// Verdict from an exit status; `None` when the status follows neither convention
fn verdict(code: Option<i32>) -> Option<bool> {
    match code {
        Some(EXIT_SATISFIABLE) => Some(true),
        Some(EXIT_UNSATISFIABLE) => Some(false),
        _ => None,
    }
}

/// MiniSat convention: `solver <formula> <result>`, the model is the last line of `<result>`
#[derive(Debug, Clone)]
pub struct MinisatProcess {
    executable: PathBuf,
    extra_args: Vec<String>,
}

impl MinisatProcess {
    pub fn new(executable: impl Into<PathBuf>, extra_args: Vec<String>) -> Self {
        Self {
            executable: executable.into(),
            extra_args,
        }
    }

    pub fn name(&self) -> String {
        self.executable.display().to_string()
    }

    pub fn solve(&self, formula: &Path, output: &Path) -> CnfResult<SolveOutcome> {
        let status = Command::new(&self.executable)
            .args(&self.extra_args)
            .arg(formula)
            .arg(output)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| CnfError::protocol(self.name(), format!("failed to start: {}", e)))?;

        debug!(solver = %self.name(), code = ?status.code(), "solver finished");
        match verdict(status.code()) {
            Some(true) => {
                let result = std::fs::read_to_string(output).map_err(|e| CnfError::io(output, e))?;
                let model = Self::parse_result(&result)
                    .ok_or_else(|| CnfError::protocol(self.name(), "unparsable result file"))?;
                Ok(SolveOutcome::Satisfiable(model))
            }
            Some(false) => Ok(SolveOutcome::Unsatisfiable),
            None => Err(CnfError::protocol(
                self.name(),
                format!("unknown return {:?}", status.code()),
            )),
        }
    }

    /// Model from the trailing non-empty line of a result file
    pub fn parse_result(result: &str) -> Option<Vec<Lit>> {
        let tail = result.lines().rev().find(|line| !line.trim().is_empty())?;
        parse_literals(tail)
    }
}

/// SAT-competition convention: `solver <formula>`, `s ...` and `v ...` lines on stdout.
/// The captured stream is written to the output path for inspection.
#[derive(Debug, Clone)]
pub struct CompetitionProcess {
    executable: PathBuf,
    extra_args: Vec<String>,
}

impl CompetitionProcess {
    pub fn new(executable: impl Into<PathBuf>, extra_args: Vec<String>) -> Self {
        Self {
            executable: executable.into(),
            extra_args,
        }
    }

    pub fn name(&self) -> String {
        self.executable.display().to_string()
    }

    pub fn solve(&self, formula: &Path, output: &Path) -> CnfResult<SolveOutcome> {
        let result = Command::new(&self.executable)
            .args(&self.extra_args)
            .arg(formula)
            .stderr(Stdio::null())
            .output()
            .map_err(|e| CnfError::protocol(self.name(), format!("failed to start: {}", e)))?;

        std::fs::write(output, &result.stdout).map_err(|e| CnfError::io(output, e))?;

        debug!(solver = %self.name(), code = ?result.status.code(), "solver finished");
        match verdict(result.status.code()) {
            Some(true) => {
                let stream = String::from_utf8_lossy(&result.stdout);
                let model = Self::parse_stream(&stream)
                    .ok_or_else(|| CnfError::protocol(self.name(), "no model in output stream"))?;
                Ok(SolveOutcome::Satisfiable(model))
            }
            Some(false) => Ok(SolveOutcome::Unsatisfiable),
            None => Err(CnfError::protocol(
                self.name(),
                format!("unknown return {:?}", result.status.code()),
            )),
        }
    }

    /// Model from the `v` lines of a result stream; `None` if there are none or one is garbled
    pub fn parse_stream(stream: &str) -> Option<Vec<Lit>> {
        let mut model = Vec::new();
        let mut seen = false;
        for line in stream.lines() {
            if let Some(values) = line.strip_prefix("v ") {
                seen = true;
                model.extend(parse_literals(values)?);
            } else if line.trim() == "v" {
                seen = true;
            }
        }
        seen.then_some(model)
    }
}

/// In-process CaDiCaL, fed from the snapshot file so it sees exactly what an external
/// solver would. A MiniSat-style result file is written to the output path.
#[derive(Debug, Clone, Default)]
pub struct CadicalSolver;

impl CadicalSolver {
    pub fn new() -> Self {
        CadicalSolver
    }

    pub fn name(&self) -> String {
        "cadical".to_string()
    }

    pub fn solve(&self, formula: &Path, output: &Path) -> CnfResult<SolveOutcome> {
        let clauses = read_dimacs_file(formula)?;
        let mut solver: Solver = Solver::new();
        let mut variable_count = 0;

        for clause in &clauses {
            variable_count = variable_count.max(clause.max_var());
            solver.add_clause(clause.literals.iter().copied());
        }

        match solver.solve() {
            Some(true) => {
                let model: Vec<Lit> = (1..=variable_count)
                    .map(|var| match solver.value(var) {
                        Some(true) => var,
                        _ => -var,
                    })
                    .collect();
                let mut line = model.iter().map(|lit| lit.to_string()).collect::<Vec<_>>();
                line.push("0".to_string());
                std::fs::write(output, format!("SAT\n{}\n", line.join(" ")))
                    .map_err(|e| CnfError::io(output, e))?;
                Ok(SolveOutcome::Satisfiable(model))
            }
            Some(false) => {
                std::fs::write(output, "UNSAT\n").map_err(|e| CnfError::io(output, e))?;
                Ok(SolveOutcome::Unsatisfiable)
            }
            None => Err(CnfError::protocol(self.name(), "solver returned unknown result")),
        }
    }
}
