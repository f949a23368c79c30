//! Combinatorics over multisets used to propose interpretations.

crate::prelude!();

/// All the sub-multisets of a multiset, smallest counts first.
///
/// ```rust
/// # use crn_verify::{bisim::partition::sub_multisets, ms};
/// let subs = sub_multisets(&ms!(A * 2, B));
/// assert_eq!(subs.len(), 6);
/// assert_eq!(subs[0], ms!());
/// assert!(subs.contains(&ms!(A * 2)));
/// ```
pub fn sub_multisets(ms: &Multiset) -> Vec<Multiset> {
    let mut res = vec![Multiset::new()];
    for (sp, count) in ms.iter() {
        let mut next = Vec::with_capacity(res.len() * (count + 1));
        for sub in &res {
            for n in 0..=count {
                let mut sub = sub.clone();
                sub.insert(sp.clone(), n);
                next.push(sub)
            }
        }
        res = next
    }
    res
}

/// All the lists `parts` of `weights.len()` multisets such that `Σ weights[i] · parts[i]` is
/// `total`.
///
/// A zero weight part can only be empty.
///
/// ```rust
/// # use crn_verify::{bisim::partition::weighted_partitions, ms};
/// let parts = weighted_partitions(&ms!(A * 2, B), &[2, 1]);
/// assert_eq!(parts, vec![vec![ms!(), ms!(A * 2, B)], vec![ms!(A), ms!(B)]]);
/// assert!(weighted_partitions(&ms!(A), &[2]).is_empty());
/// ```
pub fn weighted_partitions(total: &Multiset, weights: &[usize]) -> Vec<Vec<Multiset>> {
    let (weight, rest) = match weights.split_first() {
        Some(split) => split,
        None if total.is_empty() => return vec![vec![]],
        None => return vec![],
    };
    if *weight == 0 {
        return weighted_partitions(total, rest)
            .into_iter()
            .map(|parts| prepend(Multiset::new(), parts))
            .collect();
    }
    if rest.is_empty() {
        return match divide(total, *weight) {
            Some(part) => vec![vec![part]],
            None => vec![],
        };
    }

    let mut res = vec![];
    for sub in sub_multisets(total) {
        let used = sub.scale(*weight);
        if let Some(left) = total.checked_minus(&used) {
            for parts in weighted_partitions(&left, rest) {
                res.push(prepend(sub.clone(), parts))
            }
        }
    }
    res
}

/// Partitions of `total` in `n` ordered, possibly empty, parts.
///
/// ```rust
/// # use crn_verify::{bisim::partition::ordered_partitions, ms};
/// let parts = ordered_partitions(&ms!(A, B), 2);
/// assert_eq!(parts.len(), 4);
/// assert!(parts.contains(&vec![ms!(B), ms!(A)]));
/// ```
pub fn ordered_partitions(total: &Multiset, n: usize) -> Vec<Vec<Multiset>> {
    weighted_partitions(total, &vec![1; n])
}

/// All the ordered selections of `len` distinct elements of `items`.
///
/// ```rust
/// # use crn_verify::bisim::partition::arrangements;
/// assert_eq!(arrangements(&[1, 2, 3], 2).len(), 6);
/// assert_eq!(arrangements(&[1, 2, 3], 0), vec![vec![]]);
/// assert!(arrangements(&[1], 2).is_empty());
/// ```
pub fn arrangements<T: Clone>(items: &[T], len: usize) -> Vec<Vec<T>> {
    if len == 0 {
        return vec![vec![]];
    }
    let mut res = vec![];
    for (idx, item) in items.iter().enumerate() {
        let mut others = items.to_vec();
        others.remove(idx);
        for tail in arrangements(&others, len - 1) {
            res.push(prepend(item.clone(), tail))
        }
    }
    res
}

fn prepend<T>(head: T, mut tail: Vec<T>) -> Vec<T> {
    tail.insert(0, head);
    tail
}

/// `ms / factor`, if `factor` divides all the counts.
fn divide(ms: &Multiset, factor: usize) -> Option<Multiset> {
    let mut res = Multiset::new();
    for (sp, count) in ms.iter() {
        if count % factor != 0 {
            return None;
        }
        res.insert(sp.clone(), count / factor)
    }
    Some(res)
}
