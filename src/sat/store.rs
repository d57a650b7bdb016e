//! The clause store: formula log, label log and the variable universe

use super::clause::{read_dimacs, read_dimacs_file, Clause, Lit, Var};
use super::enumerate::{EnumerationOptions, Snapshot, Solutions};
use super::label::Label;
use super::solver::SolveOutcome;
use super::solver_factory::SolverAdapter;
use super::variables::{Allocation, KeyPredicate, Mode, VariableAllocator};
use crate::config::{EnumerationConfig, Settings, StoreConfig};
use crate::error::{CnfError, CnfResult};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, trace};

const INITIAL_CONTEXT: &str = "beginning of file";

/// An append-only text log, optionally backed by a temporary file the store owns
#[derive(Debug)]
struct LogFile {
    path: PathBuf,
    writer: BufWriter<File>,
    /// Present when the store owns the file; deleting it is our job
    owned: Option<TempPath>,
}

impl LogFile {
    fn ephemeral(suffix: &str) -> CnfResult<Self> {
        let named = tempfile::Builder::new()
            .prefix("cnf-")
            .suffix(suffix)
            .tempfile()
            .map_err(|e| CnfError::io(std::env::temp_dir(), e))?;
        let (file, owned) = named.into_parts();
        Ok(Self {
            path: owned.to_path_buf(),
            writer: BufWriter::new(file),
            owned: Some(owned),
        })
    }

    fn create(path: &Path) -> CnfResult<Self> {
        let file = File::create(path).map_err(|e| CnfError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            owned: None,
        })
    }

    fn write_line(&mut self, line: &str) -> CnfResult<()> {
        writeln!(self.writer, "{}", line).map_err(|e| CnfError::io(&self.path, e))
    }

    fn write_raw(&mut self, text: &str) -> CnfResult<()> {
        self.writer
            .write_all(text.as_bytes())
            .map_err(|e| CnfError::io(&self.path, e))
    }

    fn flush(&mut self) -> CnfResult<()> {
        self.writer.flush().map_err(|e| CnfError::io(&self.path, e))
    }

    fn truncate(&mut self) -> CnfResult<()> {
        self.flush()?;
        let file = File::create(&self.path).map_err(|e| CnfError::io(&self.path, e))?;
        self.writer = BufWriter::new(file);
        Ok(())
    }

    fn close(mut self) -> CnfResult<()> {
        self.flush()?;
        if let Some(owned) = self.owned.take() {
            owned.close().map_err(|e| CnfError::io(&self.path, e))?;
        }
        Ok(())
    }
}

/// Append-only formula under construction.
///
/// Clauses go to the formula log in DIMACS form, allocations go to the label log as
/// `label<TAB>id`, and comments go to both. Solving and enumeration work on private
/// copies, so the logs only ever grow until [`ClauseStore::clear`].
#[derive(Debug)]
pub struct ClauseStore {
    formula: LogFile,
    labels: LogFile,
    allocator: VariableAllocator,
    solver: SolverAdapter,
    config: StoreConfig,
    enumeration: EnumerationConfig,
    clause_count: usize,
    max_term: Var,
    terms: BTreeSet<Var>,
    /// Text of the latest comment, attached to errors
    context: String,
}

impl ClauseStore {
    fn with_logs(formula: LogFile, labels: LogFile, settings: &Settings) -> Self {
        Self {
            formula,
            labels,
            allocator: VariableAllocator::new(),
            solver: SolverAdapter::new(&settings.solver),
            config: settings.store.clone(),
            enumeration: settings.enumeration.clone(),
            clause_count: 0,
            max_term: 0,
            terms: BTreeSet::new(),
            context: INITIAL_CONTEXT.to_string(),
        }
    }

    /// Store backed by temporary files that are deleted on close or drop
    pub fn ephemeral(settings: &Settings) -> CnfResult<Self> {
        let formula = LogFile::ephemeral(".cnf")?;
        let labels = LogFile::ephemeral(".lut")?;
        Ok(Self::with_logs(formula, labels, settings))
    }

    /// Store writing to caller-owned paths; existing contents are truncated, and the
    /// files are left in place on close
    pub fn create(formula_path: &Path, label_path: &Path, settings: &Settings) -> CnfResult<Self> {
        let formula = LogFile::create(formula_path)?;
        let labels = LogFile::create(label_path)?;
        Ok(Self::with_logs(formula, labels, settings))
    }

    /// Swap the solver backend
    pub fn set_solver(&mut self, solver: SolverAdapter) {
        self.solver = solver;
    }

    /// Append a batch of clauses, returning how many were written
    pub fn write<I>(&mut self, clauses: I) -> CnfResult<usize>
    where
        I: IntoIterator,
        I::Item: Into<Clause>,
    {
        let result = self.write_batch(clauses);
        self.formula.flush()?;
        self.labels.flush()?;
        result
    }

    /// Buffers and checks the whole batch first, so a rejected batch leaves the log as it was
    fn write_batch<I>(&mut self, clauses: I) -> CnfResult<usize>
    where
        I: IntoIterator,
        I::Item: Into<Clause>,
    {
        let limit = self.config.clause_limit;
        let mut batch = Vec::new();
        for clause in clauses {
            if batch.len() >= limit {
                return Err(CnfError::OverCapacity {
                    limit,
                    context: self.context.clone(),
                });
            }
            let clause = clause.into();
            self.check(&clause)?;
            batch.push(clause);
        }

        for clause in &batch {
            self.append(clause)?;
        }
        debug!(written = batch.len(), context = %self.context, "clauses written");
        Ok(batch.len())
    }

    /// Append a single clause
    pub fn write_one(&mut self, literals: &[Lit]) -> CnfResult<()> {
        self.write([Clause::from(literals)]).map(|_| ())
    }

    fn check(&self, clause: &Clause) -> CnfResult<()> {
        if clause.is_empty() {
            return Err(CnfError::EmptyClause {
                context: self.context.clone(),
            });
        }
        if clause.literals.contains(&0) {
            return Err(CnfError::InvalidLiteral {
                clause: clause.literals.clone(),
                context: self.context.clone(),
            });
        }
        Ok(())
    }

    fn append(&mut self, clause: &Clause) -> CnfResult<()> {
        self.check(clause)?;
        self.track(clause);
        let line = clause.to_dimacs();
        self.formula.write_line(&line)?;
        if self.config.echo {
            println!("{}", line);
        }
        Ok(())
    }

    fn track(&mut self, clause: &Clause) {
        self.max_term = self.max_term.max(clause.max_var());
        self.terms.extend(clause.literals.iter().map(|lit| lit.abs()));
        self.clause_count += 1;
    }

    /// Provenance tag for the clauses that follow, mirrored into both logs
    pub fn comment(&mut self, text: &str) -> CnfResult<()> {
        let line = format!("c {}", text);
        self.formula.write_line(&line)?;
        self.labels.write_line(&line)?;
        self.formula.flush()?;
        self.labels.flush()?;
        if self.config.echo || !self.config.quiet {
            println!("{}", line);
        }
        debug!(comment = text, "comment");
        self.context = text.to_string();
        Ok(())
    }

    /// Ingest an externally produced DIMACS formula. Only zero literals are rejected.
    pub fn read(&mut self, path: &Path) -> CnfResult<usize> {
        let clauses = read_dimacs_file(path)?;
        let count = clauses.len();
        let result = clauses.iter().try_for_each(|clause| self.append(clause));
        self.formula.flush()?;
        result.map(|_| count)
    }

    /// Copy a formula file verbatim into the log after a `preloading` comment
    pub fn preload(&mut self, path: &Path) -> CnfResult<()> {
        let text = std::fs::read_to_string(path).map_err(|e| CnfError::io(path, e))?;
        let clauses = read_dimacs(text.as_bytes())?;
        self.comment(&format!("preloading {}", path.display()))?;
        for clause in &clauses {
            self.track(clause);
        }
        self.formula.write_raw(&text)?;
        if !text.is_empty() && !text.ends_with('\n') {
            self.formula.write_raw("\n")?;
        }
        self.formula.flush()
    }

    /// Stable id for `label`, allocating one past the largest id seen so far on first use
    pub fn auto_term(&mut self, label: Label) -> CnfResult<Var> {
        let next_free = self.max_term + 1;
        match self.allocator.resolve(label, next_free, &self.context)? {
            Allocation::Existing(var) => Ok(var),
            Allocation::Created(var) => {
                self.max_term = var;
                if let Some((label, _)) = self.allocator.latest() {
                    trace!(var, label = %label, "allocated");
                    let line = format!("{}\t{}", label, var);
                    self.labels.write_line(&line)?;
                }
                Ok(var)
            }
        }
    }

    /// Id of a known label, ignoring the mode policy
    pub fn lookup(&self, label: &Label) -> Option<Var> {
        self.allocator.get(label)
    }

    /// Known labels matching position-aligned predicates, for introspection
    pub fn auto_search<'a>(
        &'a self,
        predicates: &'a [KeyPredicate],
    ) -> impl Iterator<Item = (&'a Label, Var)> + 'a {
        self.allocator.search(predicates)
    }

    pub fn mode(&self) -> Mode {
        self.allocator.mode()
    }

    /// Change the base allocation mode
    pub fn set_mode(&mut self, mode: Mode) {
        self.allocator.set_mode(mode);
    }

    pub fn push_mode(&mut self, mode: Mode) {
        self.allocator.push(mode);
    }

    pub fn pop_mode(&mut self) -> Option<Mode> {
        self.allocator.pop()
    }

    /// Override the allocation mode until the returned scope is dropped
    pub fn scoped_mode(&mut self, mode: Mode) -> ModeScope<'_> {
        self.allocator.push(mode);
        ModeScope { store: self }
    }

    /// Run `f` with `mode` in force; the previous mode is back afterwards, error or not
    pub fn with_mode<T>(
        &mut self,
        mode: Mode,
        f: impl FnOnce(&mut ClauseStore) -> CnfResult<T>,
    ) -> CnfResult<T> {
        let mut scope = self.scoped_mode(mode);
        f(&mut scope)
    }

    /// Require the referenced ids to be exactly `1..=count`
    pub fn check_density(&self) -> CnfResult<()> {
        let (Some(&min), Some(&max)) = (self.terms.first(), self.terms.last()) else {
            return Ok(());
        };
        if min != 1 {
            return Err(CnfError::DensityViolation {
                detail: format!("CNF does not start at 1 (lowest id is {})", min),
            });
        }
        if max as usize != self.terms.len() {
            let missing: Vec<String> = (1..=max)
                .filter(|id| !self.terms.contains(id))
                .take(8)
                .map(|id| id.to_string())
                .collect();
            return Err(CnfError::DensityViolation {
                detail: format!(
                    "CNF has gaps: {} distinct ids up to {} (missing {}...)",
                    self.terms.len(),
                    max,
                    missing.join(" ")
                ),
            });
        }
        Ok(())
    }

    /// Check density (unless `allow_partial`) and satisfiability
    pub fn verify(&self, allow_partial: bool) -> CnfResult<()> {
        if !allow_partial {
            self.check_density()?;
        }
        let snapshot = Snapshot::copy_of(&self.formula.path)?;
        match snapshot.solve(&self.solver)? {
            SolveOutcome::Satisfiable(_) => Ok(()),
            SolveOutcome::Unsatisfiable => Err(CnfError::Unsatisfiable {
                context: self.context.clone(),
            }),
        }
    }

    /// Up to `how_many` distinct solutions. With `interesting`, solutions that agree on
    /// those variables count as duplicates; an empty list means no restriction.
    pub fn solutions(&self, how_many: usize, interesting: Option<&[Var]>) -> CnfResult<Solutions<'_>> {
        let mut options = self.default_enumeration(how_many);
        if let Some(vars) = interesting.filter(|vars| !vars.is_empty()) {
            options = options.interesting(vars.iter().copied());
        }
        self.solutions_with(options)
    }

    /// Enumeration with explicit options
    pub fn solutions_with(&self, options: EnumerationOptions) -> CnfResult<Solutions<'_>> {
        let snapshot = Snapshot::copy_of(&self.formula.path)?;
        Ok(Solutions::new(&self.solver, snapshot, options))
    }

    /// Options built from the configured enumeration defaults
    pub fn default_enumeration(&self, how_many: usize) -> EnumerationOptions {
        EnumerationOptions::new(how_many).aggressive(self.enumeration.aggressive_blocking)
    }

    /// Wipe both logs and every counter; for interactive reuse
    pub fn clear(&mut self) -> CnfResult<()> {
        self.formula.truncate()?;
        self.labels.truncate()?;
        self.allocator.clear();
        self.clause_count = 0;
        self.max_term = 0;
        self.terms.clear();
        self.context = INITIAL_CONTEXT.to_string();
        Ok(())
    }

    /// Flush the logs and delete them if the store owns them
    pub fn close(self) -> CnfResult<()> {
        self.formula.close()?;
        self.labels.close()
    }

    pub fn formula_path(&self) -> &Path {
        &self.formula.path
    }

    pub fn label_path(&self) -> &Path {
        &self.labels.path
    }

    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Largest variable id written or allocated
    pub fn max_term(&self) -> Var {
        self.max_term
    }

    /// Number of distinct ids referenced by written clauses
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn allocator(&self) -> &VariableAllocator {
        &self.allocator
    }

    pub fn solver(&self) -> &SolverAdapter {
        &self.solver
    }

    pub fn statistics(&self) -> StoreStatistics {
        StoreStatistics {
            clauses: self.clause_count,
            max_term: self.max_term,
            distinct_terms: self.terms.len(),
            labels: self.allocator.len(),
            solver: self.solver.name(),
        }
    }
}

/// Allocation-mode override that is undone when dropped.
///
/// Dereferences to the store, so encoders can keep working through it.
pub struct ModeScope<'a> {
    store: &'a mut ClauseStore,
}

impl Deref for ModeScope<'_> {
    type Target = ClauseStore;

    fn deref(&self) -> &ClauseStore {
        self.store
    }
}

impl DerefMut for ModeScope<'_> {
    fn deref_mut(&mut self) -> &mut ClauseStore {
        self.store
    }
}

impl Drop for ModeScope<'_> {
    fn drop(&mut self) {
        self.store.allocator.pop();
    }
}

/// Size of the formula built so far
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    pub clauses: usize,
    pub max_term: Var,
    pub distinct_terms: usize,
    pub labels: usize,
    pub solver: String,
}

impl std::fmt::Display for StoreStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Formula Statistics:")?;
        writeln!(f, "  Clauses: {}", self.clauses)?;
        writeln!(f, "  Terms: {}", self.max_term)?;
        writeln!(f, "  Distinct terms used: {}", self.distinct_terms)?;
        writeln!(f, "  Labelled terms: {}", self.labels)?;
        writeln!(f, "  Solver: {}", self.solver)?;
        Ok(())
    }
}
