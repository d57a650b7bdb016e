//! Error taxonomy for formula construction and solving

use crate::sat::variables::Mode;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result alias used throughout the library
pub type CnfResult<T> = std::result::Result<T, CnfError>;

/// Everything that can go wrong while building, verifying or solving a formula.
///
/// Store-originated variants carry the active comment tag in `context`, so an error
/// can be traced back to the constraint generator that produced it.
#[derive(Debug, Error)]
pub enum CnfError {
    #[error("illegal literal 0 in clause {clause:?} (in \"{context}\")")]
    InvalidLiteral { clause: Vec<i32>, context: String },

    #[error("empty clause written (in \"{context}\")")]
    EmptyClause { context: String },

    #[error("overclause: batch exceeded {limit} clauses (in \"{context}\")")]
    OverCapacity { limit: usize, context: String },

    #[error("label {label} cannot be {action} in {mode} mode (in \"{context}\")")]
    LabelPolicyViolation {
        label: String,
        mode: Mode,
        action: &'static str,
        context: String,
    },

    #[error("variable ids are not dense: {detail}")]
    DensityViolation { detail: String },

    #[error("no possible solutions (in \"{context}\")")]
    Unsatisfiable { context: String },

    #[error("solver {solver} misbehaved: {detail}")]
    SolverProtocolError { solver: String, detail: String },

    #[error("axis shape error: {0}")]
    AxisShapeError(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("malformed input at line {line}: {detail}")]
    Malformed { line: usize, detail: String },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CnfError {
    /// Wrap an I/O error together with the file it happened on
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        CnfError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Shorthand for a protocol error raised by the named solver
    pub fn protocol(solver: impl Into<String>, detail: impl Into<String>) -> Self {
        CnfError::SolverProtocolError {
            solver: solver.into(),
            detail: detail.into(),
        }
    }

    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, CnfError::Unsatisfiable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = CnfError::InvalidLiteral {
            clause: vec![1, 0],
            context: "one per row".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("one per row"));
        assert!(text.contains("[1, 0]"));
    }

    #[test]
    fn test_policy_violation_display() {
        let err = CnfError::LabelPolicyViolation {
            label: "(base 1 2)".to_string(),
            mode: Mode::ReadOnly,
            action: "created",
            context: "clues".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "label (base 1 2) cannot be created in read-only mode (in \"clues\")"
        );
    }

    #[test]
    fn test_io_helper() {
        let err = CnfError::io(
            "/nowhere/f.cnf",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/nowhere/f.cnf"));
        assert!(!err.is_unsatisfiable());
    }
}
