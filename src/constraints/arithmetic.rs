//! Bit-vector arithmetic

use super::cardinality::{maybe, one_or_three, window};
use crate::sat::{Clause, Lit};

/// Clauses for one bit position above the lowest, given the bits one position lower
fn adder_bit(current: [Lit; 3], below: [Lit; 3]) -> Vec<Clause> {
    let [a, b, c] = below;
    let mut clauses = Vec::with_capacity(24);
    for clause in maybe(&current, 2) {
        clauses.push(clause.clone().prefixed(&[-a, -b]));
        clauses.push(clause.clone().prefixed(&[-a, b, c]));
        clauses.push(clause.prefixed(&[a, -b, c]));
    }
    for clause in one_or_three(current) {
        clauses.push(clause.clone().prefixed(&[-a, b, -c]));
        clauses.push(clause.clone().prefixed(&[a, -b, -c]));
        clauses.push(clause.prefixed(&[a, b]));
    }
    clauses
}

/// Bit-by-bit adder relation between big-endian vectors `a`, `b` and `c`, built from
/// cardinality helpers instead of carry variables.
///
/// The low bit gets exactly two of three set; each higher bit picks "none or two" or
/// "one or three" from the pattern of the bits below it. Only the shortest length among
/// the three vectors is used. The accepted triples are pinned by truth-table tests.
pub fn addition(a: &[Lit], b: &[Lit], c: &[Lit]) -> impl Iterator<Item = Clause> {
    let a: Vec<Lit> = a.iter().rev().copied().collect();
    let b: Vec<Lit> = b.iter().rev().copied().collect();
    let c: Vec<Lit> = c.iter().rev().copied().collect();
    let bits = a.len().min(b.len()).min(c.len());

    let low: Vec<Clause> = if bits == 0 {
        Vec::new()
    } else {
        window(&[a[0], b[0], c[0]], 2, 2).collect()
    };
    let higher = (1..bits).flat_map(move |i| adder_bit([a[i], b[i], c[i]], [a[i - 1], b[i - 1], c[i - 1]]));
    low.into_iter().chain(higher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{models, value};
    use std::collections::BTreeSet;

    fn accepted(n: Lit) -> BTreeSet<(u32, u32, u32)> {
        let a: Vec<Lit> = (1..=n).collect();
        let b: Vec<Lit> = (n + 1..=2 * n).collect();
        let c: Vec<Lit> = (2 * n + 1..=3 * n).collect();
        let clauses: Vec<Clause> = addition(&a, &b, &c).collect();
        let vars: Vec<Lit> = (1..=3 * n).collect();
        models(&clauses, &vars)
            .iter()
            .map(|m| (value(&a, m), value(&b, m), value(&c, m)))
            .collect()
    }

    #[test]
    fn test_single_bit() {
        let expected = BTreeSet::from([(0, 1, 1), (1, 0, 1), (1, 1, 0)]);
        assert_eq!(accepted(1), expected);
        assert_eq!(addition(&[1], &[2], &[3]).count(), 4);
    }

    #[test]
    fn test_two_bits() {
        let expected = BTreeSet::from([
            (0, 1, 3),
            (0, 3, 1),
            (1, 0, 3),
            (1, 1, 0),
            (1, 2, 1),
            (1, 3, 2),
            (2, 1, 1),
            (2, 3, 3),
            (3, 0, 1),
            (3, 1, 2),
            (3, 2, 3),
            (3, 3, 0),
        ]);
        assert_eq!(accepted(2), expected);
    }

    #[test]
    fn test_clause_counts() {
        assert_eq!(addition(&[1, 2], &[3, 4], &[5, 6]).count(), 28);
        assert_eq!(addition(&[1, 2, 3], &[4, 5, 6], &[7, 8, 9]).count(), 52);
    }

    #[test]
    fn test_three_bits_is_a_partial_function() {
        let got = accepted(3);
        assert_eq!(got.len(), 48);
        let operands: BTreeSet<(u32, u32)> = got.iter().map(|&(a, b, _)| (a, b)).collect();
        assert_eq!(operands.len(), got.len());
        // two even operands are never accepted
        assert!(got.iter().all(|&(a, b, _)| a % 2 == 1 || b % 2 == 1));
    }
}
