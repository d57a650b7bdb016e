//! Counting constraints over lists of literals

use crate::sat::{neg, Clause, Lit};
use itertools::Itertools;

/// Between `low` and `high` (inclusive) of `cells` are true.
///
/// Uses the naive binomial encoding: every `n + 1 - low` cells contain a true one, and
/// every `high + 1` cells contain a false one. A `low` above `cells.len()` yields a
/// single empty clause.
pub fn window(cells: &[Lit], low: usize, high: usize) -> impl Iterator<Item = Clause> + '_ {
    let lower_size = (cells.len() + 1).saturating_sub(low);
    let lower = cells
        .iter()
        .copied()
        .combinations(lower_size)
        .map(Clause::new);
    let upper = cells
        .iter()
        .copied()
        .combinations(high + 1)
        .map(|chosen| Clause::new(neg(&chosen)));
    lower.chain(upper)
}

/// Either none of `cells` or exactly `n` of them are true.
///
/// Encoded as "at most `n`, never exactly `n - 1`", which is exact for `n <= 2`. For larger
/// `n` the counts below `n - 1` are admitted too; more than `cells.len()` forces all false.
pub fn maybe(cells: &[Lit], n: usize) -> Box<dyn Iterator<Item = Clause> + '_> {
    if n > cells.len() {
        return Box::new(cells.iter().map(|&cell| Clause::unit(-cell)));
    }

    let upper = cells
        .iter()
        .copied()
        .combinations(n + 1)
        .map(|chosen| Clause::new(neg(&chosen)));
    if n <= 1 {
        return Box::new(upper);
    }

    let lower = cells
        .iter()
        .copied()
        .combinations(cells.len() + 1 - n)
        .map(move |chosen| {
            let rest = cells.iter().filter(|cell| !chosen.contains(cell)).map(|cell| -cell);
            Clause::new(chosen.iter().copied().chain(rest).collect())
        });
    Box::new(upper.chain(lower))
}

/// All of `cells` take the same value; the chain is closed when there are three or more
pub fn link(cells: &[Lit]) -> impl Iterator<Item = Clause> + '_ {
    let chain = cells
        .windows(2)
        .flat_map(|pair| [Clause::binary(pair[0], -pair[1]), Clause::binary(-pair[0], pair[1])]);
    let closing = (cells.len() > 2)
        .then(|| {
            let (first, last) = (cells[0], cells[cells.len() - 1]);
            [Clause::binary(last, -first), Clause::binary(-last, first)]
        })
        .into_iter()
        .flatten();
    chain.chain(closing)
}

/// Exactly one or exactly three of the three cells are true
pub fn one_or_three(cells: [Lit; 3]) -> impl Iterator<Item = Clause> {
    let clauses: Vec<Clause> = maybe(&cells, 2).map(|clause| clause.negated()).collect();
    clauses.into_iter()
}

/// At least one of `sets` is entirely true.
///
/// One clause per way of picking a member from every set, so the output is the product
/// of the set sizes. Picking member `n` of a set contributes the negations of the members
/// before it followed by the member itself. An empty set is trivially true and yields no
/// clauses.
pub fn one_set_true<'a>(sets: &'a [&'a [Lit]]) -> impl Iterator<Item = Clause> + 'a {
    sets.iter()
        .map(|set| 0..set.len())
        .multi_cartesian_product()
        .map(move |picks| {
            let literals = sets
                .iter()
                .zip(picks)
                .flat_map(|(set, n)| set[..n].iter().map(|&lit| -lit).chain([set[n]]))
                .collect();
            Clause::new(literals)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::models;
    use std::collections::BTreeSet;

    fn counts(clauses: &[Clause], vars: &[Lit]) -> BTreeSet<usize> {
        models(clauses, vars).iter().map(|m| m.len()).collect()
    }

    #[test]
    fn test_window_exhaustive() {
        for n in 1..=6 {
            let vars: Vec<Lit> = (1..=n as Lit).collect();
            for low in 0..=n {
                for high in low..=n {
                    let clauses: Vec<Clause> = window(&vars, low, high).collect();
                    let expected: BTreeSet<usize> = (low..=high).collect();
                    assert_eq!(counts(&clauses, &vars), expected, "n={n} low={low} high={high}");
                }
            }
        }
    }

    #[test]
    fn test_window_exactly_one_clause_count() {
        let vars = [1, 2, 3, 4];
        // one at-least-one clause plus C(4, 2) pairwise exclusions
        assert_eq!(window(&vars, 1, 1).count(), 7);
        assert_eq!(window(&vars, 0, 4).count(), 0);
    }

    #[test]
    fn test_window_impossible_low_gives_empty_clause() {
        let clauses: Vec<Clause> = window(&[1, 2], 3, 3).collect();
        assert!(clauses.iter().any(Clause::is_empty));
    }

    #[test]
    fn test_maybe() {
        for m in 1..=6 {
            let vars: Vec<Lit> = (1..=m as Lit).collect();
            for n in 0..=m {
                let clauses: Vec<Clause> = maybe(&vars, n).collect();
                let expected: BTreeSet<usize> = (0..=n)
                    .filter(|&count| count == n || count + 1 < n || n == 1)
                    .collect();
                assert_eq!(counts(&clauses, &vars), expected, "m={m} n={n}");
            }
        }
    }

    #[test]
    fn test_maybe_small_n_is_zero_or_n() {
        let vars = [1, 2, 3, 4];
        let clauses: Vec<Clause> = maybe(&vars, 2).collect();
        assert_eq!(counts(&clauses, &vars), BTreeSet::from([0, 2]));
        let clauses: Vec<Clause> = maybe(&vars, 0).collect();
        assert_eq!(counts(&clauses, &vars), BTreeSet::from([0]));
    }

    #[test]
    fn test_maybe_more_than_available_forces_none() {
        let vars = [1, 2];
        let clauses: Vec<Clause> = maybe(&vars, 3).collect();
        assert_eq!(models(&clauses, &vars), vec![BTreeSet::new()]);
    }

    #[test]
    fn test_link() {
        for n in 2..=5 {
            let vars: Vec<Lit> = (1..=n).collect();
            let clauses: Vec<Clause> = link(&vars).collect();
            assert_eq!(counts(&clauses, &vars), BTreeSet::from([0, n as usize]));
        }
        assert_eq!(link(&[1]).count(), 0);
        assert_eq!(link(&[]).count(), 0);
    }

    #[test]
    fn test_one_or_three() {
        let vars = [1, 2, 3];
        let clauses: Vec<Clause> = one_or_three(vars).collect();
        assert_eq!(counts(&clauses, &vars), BTreeSet::from([1, 3]));
    }

    #[test]
    fn test_one_set_true() {
        let a = [1, 2];
        let b = [3];
        let c = [4, 5];
        let sets: [&[Lit]; 3] = [&a, &b, &c];
        let clauses: Vec<Clause> = one_set_true(&sets).collect();
        assert_eq!(clauses.len(), 4);

        let vars = [1, 2, 3, 4, 5];
        for model in crate::test_support::assignments(&vars) {
            let expected = sets.iter().any(|set| set.iter().all(|v| model.contains(v)));
            assert_eq!(crate::test_support::satisfies(&clauses, &model), expected, "{model:?}");
        }
    }

    #[test]
    fn test_one_set_true_negates_earlier_members() {
        let a = [1, 2];
        let b = [3];
        let sets: [&[Lit]; 2] = [&a, &b];
        let clauses: Vec<Vec<Lit>> = one_set_true(&sets).map(|clause| clause.literals).collect();
        assert_eq!(clauses, vec![vec![1, 3], vec![-1, 2, 3]]);

        let c = [4, 5, 6];
        let sets: [&[Lit]; 1] = [&c];
        let clauses: Vec<Vec<Lit>> = one_set_true(&sets).map(|clause| clause.literals).collect();
        assert_eq!(clauses, vec![vec![4], vec![-4, 5], vec![-4, -5, 6]]);
    }
}
