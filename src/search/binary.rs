//! Binary search for the oldest passing candidate.

/// Result of a search over the candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Oldest candidate the search settled on, if any passed.
    pub oldest: Option<String>,

    /// Number of times the predicate was evaluated.
    pub probes: usize,
}

/// Find the leftmost candidate for which `predicate` holds.
///
/// `candidates` must be sorted oldest first, and the predicate is assumed to
/// be monotonic over that order: once a version passes, every newer one
/// passes too. The search takes O(log N) evaluations and does not check that
/// assumption; with a non-monotonic predicate it returns whatever the
/// bisection path lands on.
pub fn find_oldest_compatible<T, F>(candidates: &[T], mut predicate: F) -> SearchOutcome
where
    T: AsRef<str>,
    F: FnMut(&str) -> bool,
{
    let mut left = 0;
    let mut right = candidates.len();
    let mut oldest = None;
    let mut probes = 0;

    while left < right {
        let mid = left + (right - left) / 2;
        let version = candidates[mid].as_ref();

        probes += 1;
        if predicate(version) {
            oldest = Some(version.to_string());
            right = mid;
        } else {
            left = mid + 1;
        }
    }

    SearchOutcome { oldest, probes }
}
