//! Per-shop config files kept next to the catalog export.
//!
//! A shop workspace carries `config/config.toml` with the generation settings
//! shared by every stage, and optionally `config/<stage>.toml` with overrides
//! for one deployment stage (API key, endpoint, scope of a test catalog). The
//! stage comes from `SECTIONSEO_ENV` and defaults to `development`.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const STAGE_VAR: &str = "SECTIONSEO_ENV";
const DEFAULT_STAGE: &str = "development";
const SHARED_FILE: &str = "config";

/// Deployment stage from a raw `SECTIONSEO_ENV` value.
///
/// Blank values use the default stage. Values that are not a bare file stem
/// are refused so the stage file always stays inside `config/`.
pub fn stage_name(raw: Option<&str>) -> String {
    let stage = raw.map(str::trim).unwrap_or_default();
    if stage.is_empty() {
        return DEFAULT_STAGE.to_string();
    }
    let bare = stage
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !bare {
        warn!(stage, "Ignoring {} that is not a bare name", STAGE_VAR);
        return DEFAULT_STAGE.to_string();
    }
    stage.to_string()
}

/// Existing workspace config files for `stage`, shared file first.
pub fn stage_files(workspace_root: &Path, stage: &str) -> Vec<PathBuf> {
    let dir = workspace_root.join("config");
    let mut stems = vec![SHARED_FILE];
    if stage != SHARED_FILE {
        stems.push(stage);
    }
    stems
        .into_iter()
        .map(|stem| dir.join(format!("{}.toml", stem)))
        .filter(|path| {
            let found = path.is_file();
            if !found {
                debug!(config_path = %path.display(), "No workspace configuration file");
            }
            found
        })
        .collect()
}

/// Layer the shared file and then the stage file onto `builder`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let raw = std::env::var(STAGE_VAR).ok();
    let stage = stage_name(raw.as_deref());
    let files = stage_files(workspace_root, &stage);
    debug!(stage = %stage, files = files.len(), "Workspace configuration");
    Ok(files.into_iter().fold(builder, |builder, path| {
        builder.add_source(File::from(path).format(FileFormat::Toml).required(true))
    }))
}
