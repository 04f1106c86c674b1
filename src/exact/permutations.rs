//! Lexicographic permutation stepping over multisets.

/// Rearranges `items` into the next lexicographically greater permutation.
///
/// Returns `false` (leaving `items` sorted ascending) once the last
/// permutation has been passed. Repeated values are stepped over, so
/// starting from a sorted slice visits every distinct arrangement exactly
/// once.
///
/// # Examples
///
/// ```
/// use td_routing::exact::next_permutation;
///
/// let mut p = vec![0, 0, 1];
/// let mut seen = vec![p.clone()];
/// while next_permutation(&mut p) {
///     seen.push(p.clone());
/// }
/// assert_eq!(seen, vec![vec![0, 0, 1], vec![0, 1, 0], vec![1, 0, 0]]);
/// ```
pub fn next_permutation<T: Ord>(items: &mut [T]) -> bool {
    if items.len() < 2 {
        return false;
    }
    let Some(pivot) = (0..items.len() - 1).rev().find(|&i| items[i] < items[i + 1]) else {
        items.reverse();
        return false;
    };
    let Some(successor) = (pivot + 1..items.len())
        .rev()
        .find(|&j| items[j] > items[pivot])
    else {
        return false;
    };
    items.swap(pivot, successor);
    items[pivot + 1..].reverse();
    true
}

/// Number of distinct arrangements of a multiset with the given item counts.
///
/// Saturates at `u128::MAX`.
pub fn multiset_permutations(counts: &[usize]) -> u128 {
    let mut total: u128 = 1;
    let mut placed: u128 = 0;
    for &count in counts {
        for i in 1..=count as u128 {
            placed += 1;
            total = match total.checked_mul(placed) {
                Some(v) => v / i,
                None => return u128::MAX,
            };
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_all(mut items: Vec<usize>) -> usize {
        items.sort_unstable();
        let mut n = 1;
        while next_permutation(&mut items) {
            n += 1;
        }
        n
    }

    #[test]
    fn test_distinct_counts() {
        assert_eq!(count_all(vec![1, 2, 3, 4]), 24);
        assert_eq!(count_all(vec![0, 0, 1, 2]), 12);
        assert_eq!(count_all(vec![0, 0, 0]), 1);
        assert_eq!(count_all(vec![]), 1);
    }

    #[test]
    fn test_wraps_to_sorted() {
        let mut p = vec![3, 2, 1];
        assert!(!next_permutation(&mut p));
        assert_eq!(p, vec![1, 2, 3]);
    }

    #[test]
    fn test_multiset_permutations() {
        assert_eq!(multiset_permutations(&[1, 1, 1, 1]), 24);
        assert_eq!(multiset_permutations(&[2, 1, 1]), 12);
        assert_eq!(multiset_permutations(&[3]), 1);
        assert_eq!(multiset_permutations(&[]), 1);
    }
}
