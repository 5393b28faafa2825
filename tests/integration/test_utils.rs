//! Shared test utilities for integration tests

use async_trait::async_trait;
use parking_lot::Mutex;
use sectionseo::config::GenerationSettings;
use sectionseo::error::GenerationError;
use sectionseo::provider::{GenerationProvider, GenerationRequest};
use sectionseo::store::{SectionRecord, SectionStore, Storage};
use tempfile::TempDir;

pub fn section(
    id: u64,
    name: &str,
    parent_id: u64,
    depth_level: u32,
    left_margin: u64,
    right_margin: u64,
) -> SectionRecord {
    SectionRecord {
        id,
        iblock_id: 1,
        name: name.to_string(),
        parent_id,
        left_margin,
        right_margin,
        depth_level,
        active: true,
        auto_generated: false,
        h1: None,
        meta_title: None,
        meta_description: None,
    }
}

/// Catalog 1:
///
/// ```text
/// 10 Lighting      1..14
///   11 Lamps       2..7
///     12 Desk      3..4
///     13 Floor     5..6
///   14 Outdoor     8..13
///     15 Garden    9..10
///     16 Porch     11..12
/// 20 Furniture     15..18
///   21 Chairs      16..17
/// ```
pub fn lighting_catalog() -> Vec<SectionRecord> {
    vec![
        section(10, "Lighting", 0, 1, 1, 14),
        section(11, "Lamps", 10, 2, 2, 7),
        section(12, "Desk", 11, 3, 3, 4),
        section(13, "Floor", 11, 3, 5, 6),
        section(14, "Outdoor", 10, 2, 8, 13),
        section(15, "Garden", 14, 3, 9, 10),
        section(16, "Porch", 14, 3, 11, 12),
        section(20, "Furniture", 0, 1, 15, 18),
        section(21, "Chairs", 20, 2, 16, 17),
    ]
}

/// Sled storage in a temp dir, loaded with `records`.
pub fn storage_with(records: &[SectionRecord]) -> (TempDir, Storage) {
    let dir = TempDir::new().unwrap();
    let storage = Storage::open(dir.path().join("store")).unwrap();
    for record in records {
        storage.sections.put(record).unwrap();
    }
    (dir, storage)
}

pub fn settings_for(iblock_id: i64) -> GenerationSettings {
    GenerationSettings {
        api_key: "test-key".to_string(),
        iblock_id,
        limit: 0,
        ..GenerationSettings::default()
    }
}

/// Provider that answers every request with a fixed body or transport error.
pub struct ScriptedProvider {
    reply: Result<String, String>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedProvider {
    pub fn replying(body: &str) -> Self {
        Self {
            reply: Ok(body.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reply: Err("connection refused".to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    async fn submit(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().push(request.clone());
        self.reply.clone().map_err(GenerationError::Transport)
    }

    fn endpoint(&self) -> &str {
        "scripted://provider"
    }
}
