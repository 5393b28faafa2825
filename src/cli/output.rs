//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{GenerationError, StorageError};

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &GenerationError) -> String {
    match e {
        GenerationError::Configuration(_) => {
            format!("{}\nCheck config/config.toml or run `sectionseo config init`.", e)
        }
        GenerationError::Transport(_) => {
            format!("{}\nThe run was not marked done; it can be started again.", e)
        }
        GenerationError::Storage(StorageError::RunNotFound(_)) => {
            format!("{}\nUse `sectionseo runs` to list known runs.", e)
        }
        _ => e.to_string(),
    }
}
