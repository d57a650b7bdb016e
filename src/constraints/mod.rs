//! Constraint primitives: stateless generators of clauses
//!
//! Nothing here touches a store or allocates variables. Every primitive returns a lazy,
//! one-shot iterator of [`Clause`](crate::sat::Clause)s meant to be fed straight into
//! [`ClauseStore::write`](crate::sat::ClauseStore::write).

pub mod arithmetic;
pub mod cardinality;
pub mod logic;
pub mod order;

pub use arithmetic::addition;
pub use cardinality::{link, maybe, one_or_three, one_set_true, window};
pub use logic::{if_gen, if_then, if_wrap, xnor, Quantifier};
pub use order::{adjacent, consecutive, not_adjacent, ordered};
