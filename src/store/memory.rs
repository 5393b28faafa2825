//! In-memory section store.
//!
//! Same contract as the sled store. Useful for embedding and for exercising
//! store-side update failures, which can be injected per section.

use crate::error::StorageError;
use crate::store::{
    child_ids, order_and_cap, DescendantLookup, SectionFilter, SectionPatch, SectionRecord,
    SectionStore,
};
use crate::types::SectionId;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

#[derive(Default)]
pub struct MemorySectionStore {
    sections: RwLock<BTreeMap<SectionId, SectionRecord>>,
    rejections: RwLock<HashMap<SectionId, String>>,
    updates: RwLock<Vec<SectionId>>,
}

impl MemorySectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sections(records: impl IntoIterator<Item = SectionRecord>) -> Self {
        let store = Self::new();
        {
            let mut sections = store.sections.write();
            for record in records {
                sections.insert(record.id, record);
            }
        }
        store
    }

    /// Make every later `update` of `id` fail with `reason`.
    pub fn reject_updates_for(&self, id: SectionId, reason: impl Into<String>) {
        self.rejections.write().insert(id, reason.into());
    }

    /// Ids of successful updates, in call order.
    pub fn updated_ids(&self) -> Vec<SectionId> {
        self.updates.read().clone()
    }
}

impl DescendantLookup for MemorySectionStore {
    fn children_of(&self, id: SectionId) -> Result<Vec<SectionId>, StorageError> {
        let sections = self.sections.read();
        Ok(child_ids(sections.values(), id))
    }
}

impl SectionStore for MemorySectionStore {
    fn list_sections(
        &self,
        filter: &SectionFilter,
        limit: Option<usize>,
    ) -> Result<Vec<SectionRecord>, StorageError> {
        let rows = self
            .sections
            .read()
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        Ok(order_and_cap(rows, limit))
    }

    fn get(&self, id: SectionId) -> Result<Option<SectionRecord>, StorageError> {
        Ok(self.sections.read().get(&id).cloned())
    }

    fn put(&self, record: &SectionRecord) -> Result<(), StorageError> {
        self.sections.write().insert(record.id, record.clone());
        Ok(())
    }

    fn update(&self, id: SectionId, patch: &SectionPatch) -> Result<(), StorageError> {
        if let Some(reason) = self.rejections.read().get(&id) {
            return Err(StorageError::UpdateRejected {
                section_id: id,
                reason: reason.clone(),
            });
        }
        let mut sections = self.sections.write();
        let record = sections
            .get_mut(&id)
            .ok_or(StorageError::SectionNotFound(id))?;
        record.apply(patch);
        self.updates.write().push(id);
        Ok(())
    }
}
