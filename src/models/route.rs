//! Cycles and the flat permutation encoding.
//!
//! A cycle is `[DEPOT, c1, ..., ck, DEPOT]`. Solvers that search over flat
//! sequences (brute force, GA) interleave customers with DEPOT tokens and
//! decode by splitting on them.

use super::DEPOT;

/// One out-and-back leg from the depot: `[DEPOT, c1, ..., ck, DEPOT]`.
pub type Cycle = Vec<usize>;

/// Splits a flat permutation on DEPOT tokens into cycles.
///
/// Consecutive DEPOT tokens (and leading/trailing ones) produce empty
/// segments, which are skipped. Pure: the same permutation always decodes
/// to the same cycles.
///
/// # Examples
///
/// ```
/// use td_routing::models::decode_permutation;
///
/// let cycles = decode_permutation(&[3, 1, 0, 0, 2]);
/// assert_eq!(cycles, vec![vec![0, 3, 1, 0], vec![0, 2, 0]]);
/// assert!(decode_permutation(&[0, 0]).is_empty());
/// ```
pub fn decode_permutation(permutation: &[usize]) -> Vec<Cycle> {
    permutation
        .split(|&node| node == DEPOT)
        .filter(|segment| !segment.is_empty())
        .map(wrap_cycle)
        .collect()
}

/// Wraps customer ids into a depot-delimited cycle.
pub fn wrap_cycle(customers: &[usize]) -> Cycle {
    let mut cycle = Vec::with_capacity(customers.len() + 2);
    cycle.push(DEPOT);
    cycle.extend_from_slice(customers);
    cycle.push(DEPOT);
    cycle
}

/// Joins cycles back into a flat permutation with single DEPOT separators.
pub fn encode_cycles(cycles: &[Cycle]) -> Vec<usize> {
    let mut perm = Vec::new();
    for cycle in cycles {
        let customers = cycle_customers(cycle);
        if customers.is_empty() {
            continue;
        }
        if !perm.is_empty() {
            perm.push(DEPOT);
        }
        perm.extend_from_slice(customers);
    }
    perm
}

/// The customer ids of a cycle, without depot endpoints.
pub fn cycle_customers(cycle: &[usize]) -> &[usize] {
    let start = usize::from(cycle.first() == Some(&DEPOT));
    let end = if cycle.len() > start && cycle.last() == Some(&DEPOT) {
        cycle.len() - 1
    } else {
        cycle.len()
    };
    &cycle[start..end]
}

/// Returns `true` if the permutation starts or ends with DEPOT or holds two
/// adjacent DEPOT tokens (an empty cycle).
pub fn is_degenerate(permutation: &[usize]) -> bool {
    permutation.first() == Some(&DEPOT)
        || permutation.last() == Some(&DEPOT)
        || permutation
            .windows(2)
            .any(|w| w[0] == DEPOT && w[1] == DEPOT)
}

/// Sum of demands over the customers of a cycle.
pub fn cycle_demand(cycle: &[usize], load: &[i64]) -> i64 {
    cycle_customers(cycle).iter().map(|&c| load[c]).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_no_depots() {
        assert_eq!(decode_permutation(&[2, 1]), vec![vec![0, 2, 1, 0]]);
    }

    #[test]
    fn test_decode_leading_trailing() {
        assert_eq!(
            decode_permutation(&[0, 1, 0, 2, 0]),
            vec![vec![0, 1, 0], vec![0, 2, 0]]
        );
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode_permutation(&[]).is_empty());
    }

    #[test]
    fn test_decode_idempotent() {
        let perm = [4, 0, 2, 3, 0, 0, 1];
        assert_eq!(decode_permutation(&perm), decode_permutation(&perm));
    }

    #[test]
    fn test_encode_decode() {
        let cycles = vec![vec![0, 3, 0], vec![0, 1, 2, 0]];
        let perm = encode_cycles(&cycles);
        assert_eq!(perm, vec![3, 0, 1, 2]);
        assert_eq!(decode_permutation(&perm), cycles);
    }

    #[test]
    fn test_cycle_customers() {
        assert_eq!(cycle_customers(&[0, 4, 5, 0]), &[4, 5]);
        assert!(cycle_customers(&[0, 0]).is_empty());
        assert!(cycle_customers(&[0]).is_empty());
        assert_eq!(cycle_customers(&[2, 3]), &[2, 3]);
    }

    #[test]
    fn test_is_degenerate() {
        assert!(is_degenerate(&[0, 1, 2]));
        assert!(is_degenerate(&[1, 2, 0]));
        assert!(is_degenerate(&[1, 0, 0, 2]));
        assert!(!is_degenerate(&[1, 0, 2]));
        assert!(!is_degenerate(&[]));
    }

    #[test]
    fn test_cycle_demand() {
        let load = vec![0, 3, 4, 5];
        assert_eq!(cycle_demand(&[0, 1, 3, 0], &load), 8);
        assert_eq!(cycle_demand(&[0, 0], &load), 0);
    }
}
