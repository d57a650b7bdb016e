//! Formula plumbing: clauses, labels, variable allocation, the clause store and solvers

pub mod clause;
pub mod enumerate;
pub mod label;
pub mod solver;
pub mod solver_factory;
pub mod store;
pub mod variables;

pub use clause::{neg, sanity, Clause, Lit, Var};
pub use enumerate::{EnumerationOptions, Solution, Solutions};
pub use label::{Key, Label};
pub use solver::SolveOutcome;
pub use solver_factory::SolverAdapter;
pub use store::{ClauseStore, ModeScope, StoreStatistics};
pub use variables::{any_key, key_is, KeyPredicate, Mode, VariableAllocator};
