//! Balanced OR-tree: at most one of many, in a linear number of clauses

use crate::error::CnfResult;
use crate::label;
use crate::sat::{Clause, ClauseStore, Key, Lit, Mode, Var};

/// At most one of `vars` is true; returns a variable equivalent to "any of them is true".
///
/// Splits `vars` in halves recursively. Every internal node gets a fresh variable that
/// is the OR of its two children, and the children may not both be true, giving four
/// clauses per node. A single input is returned as is. With no input the root is a fresh
/// variable forced false. Node variables are always fresh, so `name` is single use.
pub fn tree_one(store: &mut ClauseStore, name: impl Into<Key>, vars: &[Lit]) -> CnfResult<Var> {
    let name = name.into();
    store.with_mode(Mode::WriteOnly, |store| {
        if vars.is_empty() {
            let root = store.auto_term(label!(&name, Key::Role("tree"), 0))?;
            store.write([Clause::unit(-root)])?;
            return Ok(root);
        }
        let mut next_node = 0;
        reduce(store, &name, vars, &mut next_node)
    })
}

fn reduce(store: &mut ClauseStore, name: &Key, vars: &[Lit], next_node: &mut usize) -> CnfResult<Lit> {
    if let [single] = vars {
        return Ok(*single);
    }
    let (left, right) = vars.split_at(vars.len() / 2);
    let left = reduce(store, name, left, next_node)?;
    let right = reduce(store, name, right, next_node)?;

    let node = store.auto_term(label!(name, Key::Role("tree"), *next_node))?;
    *next_node += 1;
    store.write([
        Clause::binary(-left, -right),
        Clause::binary(-left, node),
        Clause::binary(-right, node),
        Clause::new(vec![-node, left, right]),
    ])?;
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::window;
    use crate::test_support::{in_process_store, projected_solutions};
    use std::collections::BTreeSet;

    fn inputs(store: &mut ClauseStore, n: usize) -> Vec<Var> {
        (0..n)
            .map(|i| store.auto_term(label!("x", i)).unwrap())
            .collect()
    }

    #[test]
    fn test_at_most_one_with_root_as_any() {
        for n in 1..=6 {
            let mut store = in_process_store();
            let vars = inputs(&mut store, n);
            let root = tree_one(&mut store, "t", &vars).unwrap();
            // keep every input in the formula even when the tree is trivial
            store.write(vars.iter().map(|&v| Clause::new(vec![v, -v]))).unwrap();

            let mut watched = vars.clone();
            watched.push(root);
            let got = projected_solutions(&store, &watched);

            let mut expected: BTreeSet<BTreeSet<Var>> = BTreeSet::from([BTreeSet::new()]);
            for &v in &vars {
                expected.insert(BTreeSet::from([v, root]));
            }
            assert_eq!(got, expected, "n={n}");
        }
    }

    #[test]
    fn test_linear_clause_count() {
        let mut store = in_process_store();
        let vars = inputs(&mut store, 16);
        tree_one(&mut store, "t", &vars).unwrap();
        assert_eq!(store.clause_count(), 4 * 15);
        assert_eq!(store.max_term(), 16 + 15);

        // the quadratic encoding of the same bound
        assert_eq!(window(&vars, 0, 1).count(), 16 * 15 / 2);
    }

    #[test]
    fn test_matches_quadratic_at_most_one() {
        let mut tree = in_process_store();
        let vars = inputs(&mut tree, 5);
        tree_one(&mut tree, "t", &vars).unwrap();

        let mut quadratic = in_process_store();
        let same = inputs(&mut quadratic, 5);
        quadratic.write(window(&same, 0, 1)).unwrap();

        assert_eq!(
            projected_solutions(&tree, &vars),
            projected_solutions(&quadratic, &same)
        );
    }

    #[test]
    fn test_empty_input_root_is_false() {
        let mut store = in_process_store();
        let root = tree_one(&mut store, "t", &[]).unwrap();
        let solutions = projected_solutions(&store, &[root]);
        assert_eq!(solutions, BTreeSet::from([BTreeSet::new()]));
    }

    #[test]
    fn test_tree_name_is_single_use() {
        let mut store = in_process_store();
        let vars = inputs(&mut store, 3);
        tree_one(&mut store, "t", &vars).unwrap();
        assert!(tree_one(&mut store, "t", &vars).is_err());
        assert!(tree_one(&mut store, "u", &vars).is_ok());
    }

    #[test]
    fn test_single_input_is_returned() {
        let mut store = in_process_store();
        let vars = inputs(&mut store, 1);
        assert_eq!(tree_one(&mut store, "t", &vars).unwrap(), vars[0]);
        assert_eq!(store.clause_count(), 0);
    }
}
