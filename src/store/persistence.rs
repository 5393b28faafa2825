//! Persistence layer for the section store, the history log, and run records

use crate::error::{invalid_data, sled_io, StorageError};
use crate::history::SledHistoryStore;
use crate::run::SledRunStore;
use crate::store::{
    order_and_cap, DescendantLookup, SectionFilter, SectionPatch, SectionRecord,
    SectionStore,
};
use crate::types::{SectionId, ROOT_PARENT};
use std::path::Path;
use std::sync::Arc;

const TREE_SECTIONS: &str = "sections";
const TREE_CHILDREN: &str = "section_children";

/// Sled-based implementation of SectionStore
///
/// Keys are big-endian section ids so iteration follows id order; listing
/// re-sorts by left margin. A second tree indexes every section under its
/// parent as `parent_id ‖ left_margin ‖ id` (all big-endian, empty values),
/// so `children_of` is one prefix scan already in left-margin order.
#[derive(Clone)]
pub struct SledSectionStore {
    sections: sled::Tree,
    children: sled::Tree,
}

impl SledSectionStore {
    pub fn new(db: &sled::Db) -> Result<Self, StorageError> {
        let sections = db.open_tree(TREE_SECTIONS).map_err(sled_io)?;
        let children = db.open_tree(TREE_CHILDREN).map_err(sled_io)?;
        Ok(Self { sections, children })
    }

    fn child_key(record: &SectionRecord) -> [u8; 24] {
        let mut key = [0u8; 24];
        key[..8].copy_from_slice(&record.parent_id.to_be_bytes());
        key[8..16].copy_from_slice(&record.left_margin.to_be_bytes());
        key[16..].copy_from_slice(&record.id.to_be_bytes());
        key
    }

    fn child_from_key(key: &[u8]) -> Result<SectionId, StorageError> {
        let tail: [u8; 8] = key
            .get(16..24)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| {
                invalid_data(format!("malformed child index key of {} bytes", key.len()))
            })?;
        Ok(SectionId::from_be_bytes(tail))
    }

    fn scan(&self) -> impl Iterator<Item = Result<SectionRecord, StorageError>> + '_ {
        self.sections.iter().map(|item| {
            let (_, value) = item.map_err(sled_io)?;
            bincode::deserialize::<SectionRecord>(&value).map_err(invalid_data)
        })
    }

    /// Number of stored sections across all catalogs
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        self.sections.flush().map_err(sled_io)?;
        Ok(())
    }
}

impl DescendantLookup for SledSectionStore {
    fn children_of(&self, id: SectionId) -> Result<Vec<SectionId>, StorageError> {
        if id == ROOT_PARENT {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for item in self.children.scan_prefix(id.to_be_bytes()) {
            let (key, _) = item.map_err(sled_io)?;
            out.push(Self::child_from_key(&key)?);
        }
        Ok(out)
    }
}

impl SectionStore for SledSectionStore {
    fn list_sections(
        &self,
        filter: &SectionFilter,
        limit: Option<usize>,
    ) -> Result<Vec<SectionRecord>, StorageError> {
        let mut rows = Vec::new();
        for record in self.scan() {
            let record = record?;
            if filter.matches(&record) {
                rows.push(record);
            }
        }
        Ok(order_and_cap(rows, limit))
    }

    fn get(&self, id: SectionId) -> Result<Option<SectionRecord>, StorageError> {
        match self.sections.get(id.to_be_bytes()).map_err(sled_io)? {
            Some(value) => Ok(Some(bincode::deserialize(&value).map_err(invalid_data)?)),
            None => Ok(None),
        }
    }

    fn put(&self, record: &SectionRecord) -> Result<(), StorageError> {
        let key = Self::child_key(record);
        if let Some(previous) = self.get(record.id)? {
            let previous_key = Self::child_key(&previous);
            if previous_key != key {
                self.children.remove(previous_key).map_err(sled_io)?;
            }
        }
        let value = bincode::serialize(record).map_err(invalid_data)?;
        self.sections
            .insert(record.id.to_be_bytes(), value)
            .map_err(sled_io)?;
        self.children.insert(key, &[] as &[u8]).map_err(sled_io)?;
        Ok(())
    }

    fn update(&self, id: SectionId, patch: &SectionPatch) -> Result<(), StorageError> {
        let mut record = self.get(id)?.ok_or(StorageError::SectionNotFound(id))?;
        record.apply(patch);
        self.put(&record)
    }
}

/// One sled database with the three stores this crate works against.
#[derive(Clone)]
pub struct Storage {
    db: sled::Db,
    pub sections: Arc<SledSectionStore>,
    pub history: Arc<SledHistoryStore>,
    pub runs: Arc<SledRunStore>,
}

impl Storage {
    /// Open (or create) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;
        let db = sled::open(path).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to open sled database: {}", e),
            ))
        })?;
        Self::from_db(db)
    }

    pub fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        Ok(Self {
            sections: Arc::new(SledSectionStore::new(&db)?),
            history: Arc::new(SledHistoryStore::new(&db)?),
            runs: Arc::new(SledRunStore::new(&db)?),
            db,
        })
    }

    /// Get the underlying sled database (for advanced operations)
    pub fn db(&self) -> &sled::Db {
        &self.db
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush().map_err(sled_io)?;
        Ok(())
    }
}
