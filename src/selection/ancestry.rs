//! Ancestor chain resolution within a candidate map.

use crate::selection::CandidateMap;
use crate::types::{SectionId, ROOT_PARENT};

/// Parent levels sent to the provider per section.
pub const DEFAULT_ANCESTOR_LEVELS: usize = 2;

/// Names of up to `levels` ancestors of `id`, nearest parent first.
///
/// The chain stops at the root sentinel or at the first ancestor that is not a
/// candidate itself; a section missing from `candidates` has no chain.
pub fn ancestor_names(id: SectionId, candidates: &CandidateMap, levels: usize) -> Vec<String> {
    let mut chain = Vec::with_capacity(levels);
    let mut current = id;
    for _ in 0..levels {
        let Some(node) = candidates.get(current) else {
            break;
        };
        if node.parent_id == ROOT_PARENT {
            break;
        }
        let Some(parent) = candidates.get(node.parent_id) else {
            break;
        };
        chain.push(parent.name.clone());
        current = parent.id;
    }
    chain
}
