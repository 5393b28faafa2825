//! Section Store
//!
//! Read/write access to the catalog section tree. Sections are stored as a
//! flattened pre-order hierarchy: every section carries `left_margin` and
//! `right_margin`, and subtree membership is a pure interval-containment test.
//! The store is the system of record; the rest of the crate only reads through
//! [`SectionStore::list_sections`] and writes through [`SectionStore::update`].

pub mod memory;
pub mod persistence;

pub use memory::MemorySectionStore;
pub use persistence::{SledSectionStore, Storage};

use crate::error::StorageError;
use crate::types::{IblockId, SectionId, ROOT_PARENT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// SectionRecord: one catalog section with its pre-order bounds and SEO fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub id: SectionId,
    pub iblock_id: IblockId,
    pub name: String,
    /// `0` when the section sits directly under the catalog root.
    #[serde(default)]
    pub parent_id: SectionId,
    pub left_margin: u64,
    pub right_margin: u64,
    #[serde(default = "default_depth_level")]
    pub depth_level: u32,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub auto_generated: bool,
    #[serde(default)]
    pub h1: Option<String>,
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
}

fn default_depth_level() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl SectionRecord {
    /// True when `other` lies strictly inside this section's bounds.
    pub fn contains(&self, other: &SectionRecord) -> bool {
        self.left_margin < other.left_margin
            && other.left_margin < other.right_margin
            && other.right_margin < self.right_margin
    }

    /// Apply the `Some` fields of a patch in place.
    pub fn apply(&mut self, patch: &SectionPatch) {
        if let Some(h1) = &patch.h1 {
            self.h1 = Some(h1.clone());
        }
        if let Some(title) = &patch.meta_title {
            self.meta_title = Some(title.clone());
        }
        if let Some(description) = &patch.meta_description {
            self.meta_description = Some(description.clone());
        }
        if let Some(flag) = patch.auto_generated {
            self.auto_generated = flag;
        }
        if let Some(clear) = &patch.clear {
            if clear.h1 {
                self.h1 = None;
            }
            if clear.meta_title {
                self.meta_title = None;
            }
            if clear.meta_description {
                self.meta_description = None;
            }
        }
    }
}

/// Query filter over sections. All conditions are conjunctive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionFilter {
    pub iblock_id: IblockId,
    pub active_only: bool,
    /// Keep sections whose `left_margin` is strictly greater.
    pub left_above: Option<u64>,
    /// Keep sections whose `right_margin` is strictly smaller.
    pub right_below: Option<u64>,
    pub exclude_ids: BTreeSet<SectionId>,
}

impl SectionFilter {
    /// Active sections of one catalog.
    pub fn active_in(iblock_id: IblockId) -> Self {
        Self {
            iblock_id,
            active_only: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &SectionRecord) -> bool {
        if record.iblock_id != self.iblock_id {
            return false;
        }
        if self.active_only && !record.active {
            return false;
        }
        if let Some(left) = self.left_above {
            if record.left_margin <= left {
                return false;
            }
        }
        if let Some(right) = self.right_below {
            if record.right_margin >= right {
                return false;
            }
        }
        !self.exclude_ids.contains(&record.id)
    }
}

/// Fields to clear back to "absent" during a patch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearFields {
    pub h1: bool,
    pub meta_title: bool,
    pub meta_description: bool,
}

/// Partial update: only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionPatch {
    pub h1: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub auto_generated: Option<bool>,
    pub clear: Option<ClearFields>,
}

/// Descendant lookup: direct children of a section, ordered by left margin.
pub trait DescendantLookup {
    fn children_of(&self, id: SectionId) -> Result<Vec<SectionId>, StorageError>;
}

/// SectionStore interface
pub trait SectionStore: DescendantLookup + Send + Sync {
    /// Sections matching `filter`, ordered by `left_margin` ascending, capped at
    /// `limit` rows when given.
    fn list_sections(
        &self,
        filter: &SectionFilter,
        limit: Option<usize>,
    ) -> Result<Vec<SectionRecord>, StorageError>;

    fn get(&self, id: SectionId) -> Result<Option<SectionRecord>, StorageError>;

    fn put(&self, record: &SectionRecord) -> Result<(), StorageError>;

    /// Apply a partial update. Fails with `SectionNotFound` for unknown ids.
    fn update(&self, id: SectionId, patch: &SectionPatch) -> Result<(), StorageError>;
}

/// Children of `parent` among `rows`, ordered by left margin. The root sentinel
/// has no children of its own.
pub(crate) fn child_ids<'a>(
    rows: impl Iterator<Item = &'a SectionRecord>,
    parent: SectionId,
) -> Vec<SectionId> {
    if parent == ROOT_PARENT {
        return Vec::new();
    }
    let mut children: Vec<(u64, SectionId)> = rows
        .filter(|r| r.parent_id == parent)
        .map(|r| (r.left_margin, r.id))
        .collect();
    children.sort_unstable();
    children.into_iter().map(|(_, id)| id).collect()
}

/// Shared ordering and cap for store implementations that scan in memory.
pub(crate) fn order_and_cap(
    mut rows: Vec<SectionRecord>,
    limit: Option<usize>,
) -> Vec<SectionRecord> {
    rows.sort_by_key(|r| (r.left_margin, r.id));
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    rows
}

/// Load a batch of section records into a store.
///
/// Records with `left_margin >= right_margin` are rejected before anything is
/// written.
pub fn import_sections(
    store: &dyn SectionStore,
    records: &[SectionRecord],
) -> Result<usize, StorageError> {
    if let Some(bad) = records.iter().find(|r| r.left_margin >= r.right_margin) {
        return Err(StorageError::UpdateRejected {
            section_id: bad.id,
            reason: format!(
                "left margin {} must be smaller than right margin {}",
                bad.left_margin, bad.right_margin
            ),
        });
    }
    for record in records {
        store.put(record)?;
    }
    Ok(records.len())
}
