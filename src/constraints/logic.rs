//! Implications and equivalences

use crate::sat::{neg, Clause, Lit};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::iter;

/// How a list of literals is read on one side of an implication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantifier {
    /// Every literal is true
    All,
    /// At least one literal is true
    Any,
}

/// `a ↔ b`
pub fn xnor(a: Lit, b: Lit) -> impl Iterator<Item = Clause> {
    [Clause::binary(-a, b), Clause::binary(a, -b)].into_iter()
}

/// `a → b`
pub fn if_then(a: Lit, b: Lit) -> impl Iterator<Item = Clause> {
    iter::once(Clause::binary(-a, b))
}

fn implication<'a>(
    a: &'a [Lit],
    b: &'a [Lit],
    mode_a: Quantifier,
    mode_b: Quantifier,
) -> Box<dyn Iterator<Item = Clause> + 'a> {
    match (mode_a, mode_b) {
        (Quantifier::All, Quantifier::All) => {
            Box::new(b.iter().map(move |&eb| Clause::new(neg(a)).with(eb)))
        }
        (Quantifier::All, Quantifier::Any) => {
            Box::new(iter::once(Clause::new(neg(a).into_iter().chain(b.iter().copied()).collect())))
        }
        (Quantifier::Any, Quantifier::All) => Box::new(
            a.iter()
                .cartesian_product(b.iter())
                .map(|(&ea, &eb)| Clause::binary(-ea, eb)),
        ),
        (Quantifier::Any, Quantifier::Any) => Box::new(
            a.iter()
                .map(move |&ea| Clause::new(iter::once(-ea).chain(b.iter().copied()).collect())),
        ),
    }
}

/// "`mode_a` of `a`" implies "`mode_b` of `b`"; with `bidirectional` the converse is
/// added, so the two quantified statements become equivalent.
pub fn if_gen<'a>(
    a: &'a [Lit],
    b: &'a [Lit],
    mode_a: Quantifier,
    mode_b: Quantifier,
    bidirectional: bool,
) -> Box<dyn Iterator<Item = Clause> + 'a> {
    let forward = implication(a, b, mode_a, mode_b);
    if bidirectional {
        Box::new(forward.chain(implication(b, a, mode_b, mode_a)))
    } else {
        forward
    }
}

/// Guard every clause with `cell`: each only has to hold when `cell` is true
pub fn if_wrap<I>(cell: Lit, clauses: I) -> impl Iterator<Item = Clause>
where
    I: IntoIterator,
    I::Item: Into<Clause>,
{
    clauses
        .into_iter()
        .map(move |clause| clause.into().prefixed(&[-cell]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::window;
    use crate::test_support::{assignments, satisfies};
    use std::collections::BTreeSet;

    fn holds(lits: &[Lit], mode: Quantifier, model: &BTreeSet<Lit>) -> bool {
        match mode {
            Quantifier::All => lits.iter().all(|l| model.contains(l)),
            Quantifier::Any => lits.iter().any(|l| model.contains(l)),
        }
    }

    #[test]
    fn test_xnor_and_if_then() {
        let vars = [1, 2];
        let eq: Vec<Clause> = xnor(1, 2).collect();
        let imp: Vec<Clause> = if_then(1, 2).collect();
        for model in assignments(&vars) {
            let (a, b) = (model.contains(&1), model.contains(&2));
            assert_eq!(satisfies(&eq, &model), a == b);
            assert_eq!(satisfies(&imp, &model), !a || b);
        }
    }

    #[test]
    fn test_if_gen_all_modes() {
        let a = [1, 2];
        let b = [3, 4, 5];
        let vars = [1, 2, 3, 4, 5];
        let modes = [Quantifier::All, Quantifier::Any];
        for mode_a in modes {
            for mode_b in modes {
                for bidirectional in [false, true] {
                    let clauses: Vec<Clause> = if_gen(&a, &b, mode_a, mode_b, bidirectional).collect();
                    for model in assignments(&vars) {
                        let lhs = holds(&a, mode_a, &model);
                        let rhs = holds(&b, mode_b, &model);
                        let expected = if bidirectional { lhs == rhs } else { !lhs || rhs };
                        assert_eq!(
                            satisfies(&clauses, &model),
                            expected,
                            "{mode_a:?} {mode_b:?} {bidirectional} {model:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_if_gen_any_of_nothing_is_false() {
        // s ↔ any([]) forces s false
        let clauses: Vec<Clause> = if_gen(&[], &[7], Quantifier::Any, Quantifier::All, true).collect();
        assert_eq!(clauses, vec![Clause::unit(-7)]);
    }

    #[test]
    fn test_if_wrap() {
        let vars = [1, 2, 3, 4];
        let guarded: Vec<Clause> = if_wrap(4, window(&[1, 2, 3], 1, 1)).collect();
        for model in assignments(&vars) {
            let count = [1, 2, 3].iter().filter(|v| model.contains(v)).count();
            let expected = !model.contains(&4) || count == 1;
            assert_eq!(satisfies(&guarded, &model), expected);
        }
    }
}
