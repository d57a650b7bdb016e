//! Clauses and the DIMACS text form they are stored in

use crate::error::{CnfError, CnfResult};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::Path;

/// Signed literal; magnitude is the variable, sign the polarity. Never zero.
pub type Lit = i32;

/// Positive variable id
pub type Var = i32;

/// Represents a SAT clause (disjunction of literals)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clause {
    pub literals: Vec<Lit>, // Positive for variable, negative for negation
}

impl Clause {
    /// Create a new clause from literals
    pub fn new(literals: Vec<Lit>) -> Self {
        Self { literals }
    }

    /// Create a unit clause (single literal)
    pub fn unit(literal: Lit) -> Self {
        Self { literals: vec![literal] }
    }

    /// Create a binary clause (two literals)
    pub fn binary(lit1: Lit, lit2: Lit) -> Self {
        Self { literals: vec![lit1, lit2] }
    }

    /// Check if clause is empty (unsatisfiable)
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Check if clause is unit
    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    /// Clause with every literal flipped
    pub fn negated(&self) -> Clause {
        Clause::new(neg(&self.literals))
    }

    /// Prepend extra literals, keeping the existing ones after them
    pub fn prefixed(mut self, prefix: &[Lit]) -> Clause {
        let mut literals = prefix.to_vec();
        literals.append(&mut self.literals);
        Clause::new(literals)
    }

    /// Append one literal
    pub fn with(mut self, literal: Lit) -> Clause {
        self.literals.push(literal);
        self
    }

    /// Largest variable magnitude mentioned, 0 for the empty clause
    pub fn max_var(&self) -> Var {
        self.literals.iter().map(|lit| lit.abs()).max().unwrap_or(0)
    }

    /// Whether the clause holds under an assignment given as a predicate on variables
    pub fn satisfied_by(&self, is_true: impl Fn(Var) -> bool) -> bool {
        self.literals
            .iter()
            .any(|&lit| is_true(lit.abs()) == (lit > 0))
    }

    /// DIMACS line form, `1 -2 3 0`
    pub fn to_dimacs(&self) -> String {
        let mut line = String::with_capacity(self.literals.len() * 4 + 1);
        for lit in &self.literals {
            line.push_str(&lit.to_string());
            line.push(' ');
        }
        line.push('0');
        line
    }
}

impl From<Vec<Lit>> for Clause {
    fn from(literals: Vec<Lit>) -> Self {
        Clause::new(literals)
    }
}

impl From<&[Lit]> for Clause {
    fn from(literals: &[Lit]) -> Self {
        Clause::new(literals.to_vec())
    }
}

impl<const N: usize> From<[Lit; N]> for Clause {
    fn from(literals: [Lit; N]) -> Self {
        Clause::new(literals.to_vec())
    }
}

impl std::fmt::Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_dimacs())
    }
}

/// Flip every literal
pub fn neg(literals: &[Lit]) -> Vec<Lit> {
    literals.iter().map(|lit| -lit).collect()
}

/// Check that a list of every cell id is exactly `1..=len` with no repeats
pub fn sanity(cells: &[Var]) -> bool {
    let mut sorted = cells.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len() == cells.len()
        && sorted.first() == Some(&1)
        && sorted.last().copied() == Some(sorted.len() as Var)
}

/// Parse DIMACS text. Lines starting with `c` or `p` are skipped; each clause is
/// terminated by `0` and may span lines. A trailing clause without `0` is kept.
pub fn read_dimacs<R: BufRead>(reader: R) -> CnfResult<Vec<Clause>> {
    let mut clauses = Vec::new();
    let mut pending = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| CnfError::Malformed {
            line: index + 1,
            detail: e.to_string(),
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('c') || trimmed.starts_with('p') {
            continue;
        }
        for token in trimmed.split_whitespace() {
            let lit: Lit = token.parse().map_err(|_| CnfError::Malformed {
                line: index + 1,
                detail: format!("'{}' is not a literal", token),
            })?;
            if lit == 0 {
                clauses.push(Clause::new(std::mem::take(&mut pending)));
            } else {
                pending.push(lit);
            }
        }
    }

    if !pending.is_empty() {
        clauses.push(Clause::new(pending));
    }
    Ok(clauses)
}

/// Parse a DIMACS file from disk
pub fn read_dimacs_file(path: &Path) -> CnfResult<Vec<Clause>> {
    let file = std::fs::File::open(path).map_err(|e| CnfError::io(path, e))?;
    read_dimacs(std::io::BufReader::new(file))
}

/// Parse one line of signed integers (a model line), stopping at the first `0`
pub fn parse_literals(line: &str) -> Option<Vec<Lit>> {
    let mut literals = Vec::new();
    for token in line.split_whitespace() {
        let lit: Lit = token.parse().ok()?;
        if lit == 0 {
            break;
        }
        literals.push(lit);
    }
    Some(literals)
}
