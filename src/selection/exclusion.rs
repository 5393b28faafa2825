//! Exclusion resolution: operator-supplied id list, optionally expanded to
//! every descendant of each listed section.

use crate::error::StorageError;
use crate::store::DescendantLookup;
use crate::types::SectionId;
use std::collections::{BTreeSet, HashSet, VecDeque};
use tracing::{debug, warn};

/// Split a comma-separated exclusion list into trimmed tokens.
pub fn split_exclusion_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Parse exclusion tokens. Any decimal number is accepted and truncated
/// toward zero (`"2.5"` is 2, `"1e1"` is 10); negatives and non-numbers are
/// dropped. Order of first appearance is preserved; duplicates are dropped.
pub fn parse_exclusion_ids<S: AsRef<str>>(tokens: &[S]) -> Vec<SectionId> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for token in tokens {
        let token = token.as_ref().trim();
        match numeric_id(token) {
            Some(id) => {
                if seen.insert(id) {
                    ids.push(id);
                }
            }
            None => debug!(token, "Ignoring non-numeric exclusion token"),
        }
    }
    ids
}

fn numeric_id(token: &str) -> Option<SectionId> {
    if let Ok(id) = token.parse::<SectionId>() {
        return Some(id);
    }
    // Only plain decimal notation; keeps "inf" and "NaN" out.
    let decimal = token
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !decimal {
        return None;
    }
    let value = token.parse::<f64>().ok()?;
    if !value.is_finite() || value < 0.0 || value >= SectionId::MAX as f64 {
        return None;
    }
    Some(value.trunc() as SectionId)
}

/// Computes the final excluded id set for a selection.
pub struct ExclusionResolver<'a, L: DescendantLookup + ?Sized> {
    lookup: &'a L,
}

impl<'a, L: DescendantLookup + ?Sized> ExclusionResolver<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    /// Base ids parsed from `tokens`, unioned with their descendant closure
    /// when `with_children` is set.
    pub fn resolve<S: AsRef<str>>(
        &self,
        tokens: &[S],
        with_children: bool,
    ) -> Result<BTreeSet<SectionId>, StorageError> {
        let base: BTreeSet<SectionId> = parse_exclusion_ids(tokens).into_iter().collect();
        if !with_children || base.is_empty() {
            return Ok(base);
        }
        self.with_descendants(&base)
    }

    /// `roots` plus every section reachable through `children_of`.
    ///
    /// Iterative and visit-guarded, so a corrupted parent chain that loops
    /// terminates instead of spinning.
    pub fn with_descendants(
        &self,
        roots: &BTreeSet<SectionId>,
    ) -> Result<BTreeSet<SectionId>, StorageError> {
        let mut excluded = roots.clone();
        let mut visited: HashSet<SectionId> = HashSet::new();
        let mut queue: VecDeque<SectionId> = roots.iter().copied().collect();

        while let Some(id) = queue.pop_front() {
            if !visited.insert(id) {
                warn!(section_id = id, "Section reached twice while collecting descendants");
                continue;
            }
            for child in self.lookup.children_of(id)? {
                excluded.insert(child);
                if !visited.contains(&child) {
                    queue.push_back(child);
                }
            }
        }
        Ok(excluded)
    }
}
