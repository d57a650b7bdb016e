//! Factory for creating solver adapters based on configuration

use super::solver::{CadicalSolver, CompetitionProcess, MinisatProcess, SolveOutcome};
use crate::config::{SolverBackend, SolverConfig};
use crate::error::CnfResult;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Unified solver interface over the supported backend conventions
#[derive(Debug, Clone)]
pub enum SolverAdapter {
    Minisat(MinisatProcess),
    Competition(CompetitionProcess),
    Cadical(CadicalSolver),
}

impl SolverAdapter {
    /// Create a new adapter based on the configured backend
    pub fn new(config: &SolverConfig) -> Self {
        match config.backend {
            SolverBackend::Minisat => SolverAdapter::Minisat(MinisatProcess::new(
                config.executable.clone(),
                config.extra_args.clone(),
            )),
            SolverBackend::Competition => SolverAdapter::Competition(CompetitionProcess::new(
                config.executable.clone(),
                config.extra_args.clone(),
            )),
            SolverBackend::Cadical => SolverAdapter::Cadical(CadicalSolver::new()),
        }
    }

    /// Solve the formula at `formula`, letting the backend use `output` for its result
    pub fn solve(&self, formula: &Path, output: &Path) -> CnfResult<SolveOutcome> {
        let start_time = Instant::now();
        let outcome = match self {
            SolverAdapter::Minisat(solver) => solver.solve(formula, output),
            SolverAdapter::Competition(solver) => solver.solve(formula, output),
            SolverAdapter::Cadical(solver) => solver.solve(formula, output),
        }?;

        info!(
            solver = %self.name(),
            satisfiable = outcome.is_satisfiable(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "solve finished"
        );
        Ok(outcome)
    }

    /// Get the backend type being used
    pub fn backend(&self) -> SolverBackend {
        match self {
            SolverAdapter::Minisat(_) => SolverBackend::Minisat,
            SolverAdapter::Competition(_) => SolverBackend::Competition,
            SolverAdapter::Cadical(_) => SolverBackend::Cadical,
        }
    }

    pub fn name(&self) -> String {
        match self {
            SolverAdapter::Minisat(solver) => solver.name(),
            SolverAdapter::Competition(solver) => solver.name(),
            SolverAdapter::Cadical(solver) => solver.name(),
        }
    }
}

impl Default for SolverAdapter {
    fn default() -> Self {
        SolverAdapter::new(&crate::config::Settings::default().solver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use tempfile::tempdir;

    #[test]
    fn test_backend_selection() {
        let mut config = Settings::default().solver;
        assert_eq!(SolverAdapter::new(&config).backend(), SolverBackend::Minisat);
        assert_eq!(SolverAdapter::new(&config).name(), "minisat");

        config.backend = SolverBackend::Competition;
        config.executable = "kissat".into();
        let adapter = SolverAdapter::new(&config);
        assert_eq!(adapter.backend(), SolverBackend::Competition);
        assert_eq!(adapter.name(), "kissat");

        config.backend = SolverBackend::Cadical;
        assert_eq!(SolverAdapter::new(&config).backend(), SolverBackend::Cadical);
    }

    #[test]
    fn test_simple_satisfiable_cadical() {
        let dir = tempdir().unwrap();
        let formula = dir.path().join("f.cnf");
        std::fs::write(&formula, "1 0\n").unwrap();

        let adapter = SolverAdapter::new(&Settings::in_process().solver);
        let outcome = adapter.solve(&formula, &dir.path().join("out")).unwrap();
        assert_eq!(outcome, SolveOutcome::Satisfiable(vec![1]));
    }

    #[test]
    fn test_unsatisfiable_cadical() {
        let dir = tempdir().unwrap();
        let formula = dir.path().join("f.cnf");
        // Add contradictory clauses: x1 and ¬x1
        std::fs::write(&formula, "1 0\n-1 0\n").unwrap();

        let adapter = SolverAdapter::new(&Settings::in_process().solver);
        let outcome = adapter.solve(&formula, &dir.path().join("out")).unwrap();
        assert_eq!(outcome, SolveOutcome::Unsatisfiable);
    }
}
