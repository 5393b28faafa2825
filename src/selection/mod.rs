//! Section selection
//!
//! Turns a [`SelectionScope`] into an ordered [`CandidateMap`]: the working set
//! of sections one generation run reads from. Selection never mutates the
//! store.

pub mod ancestry;
pub mod exclusion;
pub mod selector;

pub use ancestry::{ancestor_names, DEFAULT_ANCESTOR_LEVELS};
pub use exclusion::{parse_exclusion_ids, split_exclusion_list, ExclusionResolver};
pub use selector::SectionSelector;

use crate::store::SectionRecord;
use crate::types::{IblockId, SectionId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What to select: one catalog, optionally narrowed to a subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionScope {
    pub iblock_id: IblockId,
    /// `0` selects the whole catalog.
    pub root_section_id: SectionId,
    pub include_root: bool,
    /// Raw exclusion tokens as the operator typed them; garbage is dropped.
    pub exclusion_ids: Vec<String>,
    pub exclude_with_children: bool,
    /// `0` means unbounded.
    pub result_limit: usize,
}

impl SelectionScope {
    /// Whole-catalog scope with no exclusions and no cap.
    pub fn whole(iblock_id: IblockId) -> Self {
        Self {
            iblock_id,
            include_root: true,
            ..Self::default()
        }
    }

    pub fn limit(&self) -> Option<usize> {
        (self.result_limit > 0).then_some(self.result_limit)
    }
}

/// A selected section with the projection the generation run needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateNode {
    pub id: SectionId,
    pub name: String,
    pub parent_id: SectionId,
    pub auto_generated: bool,
}

impl From<&SectionRecord> for CandidateNode {
    fn from(record: &SectionRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            parent_id: record.parent_id,
            auto_generated: record.auto_generated,
        }
    }
}

/// Candidates keyed by id, iterated in selection (left-bound) order.
#[derive(Debug, Clone, Default)]
pub struct CandidateMap {
    order: Vec<SectionId>,
    nodes: HashMap<SectionId, CandidateNode>,
}

impl CandidateMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a candidate. Re-inserting an id replaces it in place.
    pub fn insert(&mut self, node: CandidateNode) {
        if self.nodes.insert(node.id, node.clone()).is_none() {
            self.order.push(node.id);
        }
    }

    pub fn get(&self, id: SectionId) -> Option<&CandidateNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: SectionId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn ids(&self) -> &[SectionId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateNode> + '_ {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }
}

impl FromIterator<CandidateNode> for CandidateMap {
    fn from_iter<T: IntoIterator<Item = CandidateNode>>(iter: T) -> Self {
        let mut map = Self::new();
        for node in iter {
            map.insert(node);
        }
        map
    }
}
