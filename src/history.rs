//! Meta history
//!
//! Append-only log of each section's SEO fields as they were when a run
//! looked at it. One record per section per run, written before the run can
//! touch the section. Records are never updated or deleted here; they support
//! inspection and rollback of a run.

use crate::error::{invalid_data, sled_io, StorageError};
use crate::store::{ClearFields, SectionPatch, SectionStore};
use crate::types::{RunId, SectionId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

const TREE_HISTORY: &str = "meta_history";

/// Prior SEO fields of one section, captured by one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub section_id: SectionId,
    pub run_id: RunId,
    /// Page heading (h1) at snapshot time, "" when absent.
    pub name: String,
    /// Meta title at snapshot time, "" when absent.
    pub title: String,
    /// Meta description at snapshot time, "" when absent.
    pub description: String,
    pub recorded_at: String,
}

/// Append-only history store.
pub trait HistoryStore: Send + Sync {
    fn append(&self, record: &HistoryRecord) -> Result<(), StorageError>;

    /// Records of one run in append order.
    fn list_for_run(&self, run_id: RunId) -> Result<Vec<HistoryRecord>, StorageError>;
}

/// Sled-backed history store, keyed `{run_id}:{seq}` so a prefix scan returns
/// one run in append order.
#[derive(Clone)]
pub struct SledHistoryStore {
    db: sled::Db,
    history: sled::Tree,
}

impl SledHistoryStore {
    pub fn new(db: &sled::Db) -> Result<Self, StorageError> {
        let history = db.open_tree(TREE_HISTORY).map_err(sled_io)?;
        Ok(Self {
            db: db.clone(),
            history,
        })
    }

    pub fn encode_key(run_id: RunId, seq: u64) -> String {
        format!("{run_id:020}:{seq:020}")
    }
}

impl HistoryStore for SledHistoryStore {
    fn append(&self, record: &HistoryRecord) -> Result<(), StorageError> {
        let seq = self.db.generate_id().map_err(sled_io)?;
        let key = Self::encode_key(record.run_id, seq);
        let value = serde_json::to_vec(record).map_err(invalid_data)?;
        self.history.insert(key.as_bytes(), value).map_err(sled_io)?;
        Ok(())
    }

    fn list_for_run(&self, run_id: RunId) -> Result<Vec<HistoryRecord>, StorageError> {
        let prefix = format!("{run_id:020}:");
        let mut out = Vec::new();
        for item in self.history.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item.map_err(sled_io)?;
            out.push(serde_json::from_slice(&value).map_err(invalid_data)?);
        }
        Ok(out)
    }
}

/// In-memory history store.
#[derive(Default)]
pub struct MemoryHistoryStore {
    records: RwLock<Vec<HistoryRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<HistoryRecord> {
        self.records.read().clone()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn append(&self, record: &HistoryRecord) -> Result<(), StorageError> {
        self.records.write().push(record.clone());
        Ok(())
    }

    fn list_for_run(&self, run_id: RunId) -> Result<Vec<HistoryRecord>, StorageError> {
        Ok(self
            .records
            .read()
            .iter()
            .filter(|r| r.run_id == run_id)
            .cloned()
            .collect())
    }
}

/// Captures a section's current SEO fields into the history log.
pub struct HistorySnapshotter<'a> {
    sections: &'a dyn SectionStore,
    history: &'a dyn HistoryStore,
}

impl<'a> HistorySnapshotter<'a> {
    pub fn new(sections: &'a dyn SectionStore, history: &'a dyn HistoryStore) -> Self {
        Self { sections, history }
    }

    /// Append one record for `section_id` under `run_id`. Missing fields (or a
    /// missing section) are recorded as empty strings.
    pub fn snapshot(
        &self,
        section_id: SectionId,
        run_id: RunId,
    ) -> Result<HistoryRecord, StorageError> {
        let current = self.sections.get(section_id)?;
        let (name, title, description) = match current {
            Some(section) => (
                section.h1.unwrap_or_default(),
                section.meta_title.unwrap_or_default(),
                section.meta_description.unwrap_or_default(),
            ),
            None => {
                warn!(section_id, run_id, "Snapshotting a section the store does not know");
                Default::default()
            }
        };
        let record = HistoryRecord {
            section_id,
            run_id,
            name,
            title,
            description,
            recorded_at: chrono::Utc::now().to_rfc3339(),
        };
        self.history.append(&record)?;
        debug!(section_id, run_id, "History snapshot appended");
        Ok(record)
    }
}

/// Outcome of restoring a run's snapshots.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RollbackReport {
    pub restored: Vec<SectionId>,
    pub failures: Vec<(SectionId, String)>,
}

/// Patch that puts a snapshot back: empty snapshot fields become absent, and
/// the section is no longer marked as written by this system.
pub fn restore_patch(record: &HistoryRecord) -> SectionPatch {
    let keep = |value: &str| (!value.is_empty()).then(|| value.to_string());
    SectionPatch {
        h1: keep(&record.name),
        meta_title: keep(&record.title),
        meta_description: keep(&record.description),
        auto_generated: Some(false),
        clear: Some(ClearFields {
            h1: record.name.is_empty(),
            meta_title: record.title.is_empty(),
            meta_description: record.description.is_empty(),
        }),
    }
}

/// Write every section snapshot of `run_id` back to the store. The first
/// record per section wins. Per-section failures are collected, not fatal.
pub fn rollback_run(
    run_id: RunId,
    sections: &dyn SectionStore,
    history: &dyn HistoryStore,
) -> Result<RollbackReport, StorageError> {
    let records = history.list_for_run(run_id)?;
    let mut seen = HashSet::new();
    let mut report = RollbackReport::default();

    for record in records.iter().filter(|r| seen.insert(r.section_id)) {
        match sections.update(record.section_id, &restore_patch(record)) {
            Ok(()) => report.restored.push(record.section_id),
            Err(e) => {
                warn!(section_id = record.section_id, run_id, error = %e, "Rollback of section failed");
                report.failures.push((record.section_id, e.to_string()));
            }
        }
    }

    info!(
        run_id,
        restored = report.restored.len(),
        failed = report.failures.len(),
        "Run rolled back"
    );
    Ok(report)
}
