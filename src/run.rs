//! Generation run records.
//!
//! A run is the unit of one batch: the settings it was started with and a
//! done flag. The flag flips exactly once, after every response item has been
//! merged; a run that failed before that stays not done.

use crate::config::GenerationSettings;
use crate::error::{invalid_data, sled_io, StorageError};
use crate::types::RunId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TREE_RUNS: &str = "generation_runs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRun {
    pub id: RunId,
    pub settings: GenerationSettings,
    pub done: bool,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl GenerationRun {
    pub fn new(id: RunId, settings: GenerationSettings) -> Self {
        Self {
            id,
            settings,
            done: false,
            created_at: chrono::Utc::now().to_rfc3339(),
            completed_at: None,
        }
    }
}

/// Durable run records.
pub trait RunStore: Send + Sync {
    /// Create a new, not-done run with a fresh id.
    fn create(&self, settings: &GenerationSettings) -> Result<GenerationRun, StorageError>;

    fn get(&self, id: RunId) -> Result<Option<GenerationRun>, StorageError>;

    /// Run with the highest id.
    fn load_latest(&self) -> Result<Option<GenerationRun>, StorageError>;

    /// Mark the run done. Fails with `RunNotFound` for unknown ids.
    fn mark_done(&self, id: RunId) -> Result<(), StorageError>;

    /// All runs, oldest first.
    fn list(&self) -> Result<Vec<GenerationRun>, StorageError>;
}

fn complete(run: &mut GenerationRun) {
    run.done = true;
    run.completed_at = Some(chrono::Utc::now().to_rfc3339());
}

/// Sled-backed run store; big-endian id keys keep iteration in creation order.
#[derive(Clone)]
pub struct SledRunStore {
    db: sled::Db,
    runs: sled::Tree,
}

impl SledRunStore {
    pub fn new(db: &sled::Db) -> Result<Self, StorageError> {
        let runs = db.open_tree(TREE_RUNS).map_err(sled_io)?;
        Ok(Self {
            db: db.clone(),
            runs,
        })
    }

    fn put(&self, run: &GenerationRun) -> Result<(), StorageError> {
        let value = serde_json::to_vec(run).map_err(invalid_data)?;
        self.runs
            .insert(run.id.to_be_bytes(), value)
            .map_err(sled_io)?;
        Ok(())
    }

    fn decode(raw: &[u8]) -> Result<GenerationRun, StorageError> {
        serde_json::from_slice(raw).map_err(invalid_data)
    }
}

impl RunStore for SledRunStore {
    fn create(&self, settings: &GenerationSettings) -> Result<GenerationRun, StorageError> {
        // sled ids start at 0; run ids start at 1
        let id = self.db.generate_id().map_err(sled_io)? + 1;
        let run = GenerationRun::new(id, settings.clone());
        self.put(&run)?;
        Ok(run)
    }

    fn get(&self, id: RunId) -> Result<Option<GenerationRun>, StorageError> {
        match self.runs.get(id.to_be_bytes()).map_err(sled_io)? {
            Some(raw) => Ok(Some(Self::decode(&raw)?)),
            None => Ok(None),
        }
    }

    fn load_latest(&self) -> Result<Option<GenerationRun>, StorageError> {
        match self.runs.last().map_err(sled_io)? {
            Some((_, raw)) => Ok(Some(Self::decode(&raw)?)),
            None => Ok(None),
        }
    }

    fn mark_done(&self, id: RunId) -> Result<(), StorageError> {
        let mut run = self.get(id)?.ok_or(StorageError::RunNotFound(id))?;
        complete(&mut run);
        self.put(&run)
    }

    fn list(&self) -> Result<Vec<GenerationRun>, StorageError> {
        let mut out = Vec::new();
        for item in self.runs.iter() {
            let (_, raw) = item.map_err(sled_io)?;
            out.push(Self::decode(&raw)?);
        }
        Ok(out)
    }
}

/// In-memory run store.
#[derive(Default)]
pub struct MemoryRunStore {
    runs: RwLock<BTreeMap<RunId, GenerationRun>>,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RunStore for MemoryRunStore {
    fn create(&self, settings: &GenerationSettings) -> Result<GenerationRun, StorageError> {
        let mut runs = self.runs.write();
        let id = runs.keys().next_back().copied().unwrap_or(0) + 1;
        let run = GenerationRun::new(id, settings.clone());
        runs.insert(id, run.clone());
        Ok(run)
    }

    fn get(&self, id: RunId) -> Result<Option<GenerationRun>, StorageError> {
        Ok(self.runs.read().get(&id).cloned())
    }

    fn load_latest(&self) -> Result<Option<GenerationRun>, StorageError> {
        Ok(self.runs.read().values().next_back().cloned())
    }

    fn mark_done(&self, id: RunId) -> Result<(), StorageError> {
        let mut runs = self.runs.write();
        let run = runs.get_mut(&id).ok_or(StorageError::RunNotFound(id))?;
        complete(run);
        Ok(())
    }

    fn list(&self) -> Result<Vec<GenerationRun>, StorageError> {
        Ok(self.runs.read().values().cloned().collect())
    }
}
