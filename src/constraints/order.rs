//! Relative-position constraints between two one-hot position vectors
//!
//! `c1[i]` means "the first thing sits at slot `i`", likewise `c2` for the second. The
//! vectors are expected to be one-hot already; these constraints only relate them.

use crate::error::{CnfError, CnfResult};
use crate::sat::{Clause, Lit};

fn check_lengths(what: &str, c1: &[Lit], c2: &[Lit]) -> CnfResult<()> {
    if c1.len() != c2.len() {
        return Err(CnfError::InvalidArgument(format!(
            "{}: position vectors differ in length ({} vs {})",
            what,
            c1.len(),
            c2.len()
        )));
    }
    if c1.is_empty() {
        return Err(CnfError::InvalidArgument(format!("{}: empty position vectors", what)));
    }
    Ok(())
}

/// Slots next to `i` among `n`, wrapping when circular. Never includes `i` itself.
fn neighbors(i: usize, n: usize, circular: bool) -> Vec<usize> {
    let mut slots = Vec::with_capacity(2);
    if i > 0 {
        slots.push(i - 1);
    } else if circular {
        slots.push(n - 1);
    }
    if i + 1 < n {
        slots.push(i + 1);
    } else if circular {
        slots.push(0);
    }
    slots.retain(|&j| j != i);
    slots.dedup();
    slots
}

/// The first thing sits strictly before the second
pub fn ordered<'a>(c1: &'a [Lit], c2: &'a [Lit]) -> CnfResult<impl Iterator<Item = Clause> + 'a> {
    check_lengths("ordered", c1, c2)?;
    Ok((0..c1.len()).flat_map(move |i| c2[..=i].iter().map(move |&b| Clause::binary(-c1[i], -b))))
}

/// The second thing sits exactly one slot after the first; with `circular` the last slot
/// is followed by the first, otherwise the first thing can't be last nor the second first.
pub fn consecutive<'a>(
    c1: &'a [Lit],
    c2: &'a [Lit],
    circular: bool,
) -> CnfResult<impl Iterator<Item = Clause> + 'a> {
    check_lengths("consecutive", c1, c2)?;
    let n = c1.len();
    let tail = if circular {
        vec![Clause::binary(-c1[n - 1], c2[0]), Clause::binary(c1[n - 1], -c2[0])]
    } else {
        vec![Clause::unit(-c1[n - 1]), Clause::unit(-c2[0])]
    };
    let steps = (0..n - 1)
        .flat_map(move |i| [Clause::binary(-c1[i], c2[i + 1]), Clause::binary(c1[i], -c2[i + 1])]);
    Ok(steps.chain(tail))
}

/// The two things sit in neighbouring slots (never the same one)
pub fn adjacent<'a>(
    c1: &'a [Lit],
    c2: &'a [Lit],
    circular: bool,
) -> CnfResult<impl Iterator<Item = Clause> + 'a> {
    check_lengths("adjacent", c1, c2)?;
    let n = c1.len();
    let apart = (0..n).map(move |i| Clause::binary(-c1[i], -c2[i]));
    let near = (0..n).map(move |i| {
        let mut literals = vec![-c1[i]];
        literals.extend(neighbors(i, n, circular).into_iter().map(|j| c2[j]));
        Clause::new(literals)
    });
    Ok(apart.chain(near))
}

/// The two things are not in neighbouring slots
pub fn not_adjacent<'a>(
    c1: &'a [Lit],
    c2: &'a [Lit],
    circular: bool,
) -> CnfResult<impl Iterator<Item = Clause> + 'a> {
    check_lengths("not_adjacent", c1, c2)?;
    let n = c1.len();
    Ok((0..n).flat_map(move |i| {
        neighbors(i, n, circular)
            .into_iter()
            .map(move |j| Clause::binary(-c1[i], -c2[j]))
    }))
}
