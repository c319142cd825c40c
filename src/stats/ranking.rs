//! Ranking helpers
//!
//! All rankings sort descending and are stable: entries with equal keys keep
//! their input order. `slice::sort_by` is a stable sort, which is what
//! guarantees the tie policy.

use std::cmp::Ordering;

/// Number of entries a `limit` admits; zero or negative limits admit none
pub fn effective_limit(limit: i64, available: usize) -> usize {
    if limit <= 0 {
        return 0;
    }
    usize::try_from(limit).map_or(available, |l| l.min(available))
}

/// Sort descending by an integer key, ties in input order
pub fn rank_by_count<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> i64,
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

/// Sort descending by a float score, ties in input order
///
/// NaN scores cannot come out of the derived metrics (they guard zero
/// denominators); if one appears it compares as equal.
pub fn rank_by_score<T, F>(items: &mut [T], score: F)
where
    F: Fn(&T) -> f64,
{
    items.sort_by(|a, b| score(b).partial_cmp(&score(a)).unwrap_or(Ordering::Equal));
}

/// Keep the first `limit` entries
pub fn take_top<T>(mut items: Vec<T>, limit: i64) -> Vec<T> {
    let n = effective_limit(limit, items.len());
    items.truncate(n);
    items
}
