//! Configuration System
//!
//! Layered configuration: built-in defaults, the global config file, workspace
//! files, then `SECTIONSEO__*` environment variables. Generation settings are
//! validated separately at run start.

use crate::error::GenerationError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge;
mod settings;
mod sources;

pub use settings::{GenerationSettings, ProviderKind, ValidationError};
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub generation: GenerationSettings,

    #[serde(default)]
    pub endpoint: EndpointConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote generation service endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_endpoint_url")]
    pub url: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// One batch can take minutes on the remote side.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_endpoint_url() -> String {
    "https://test/seo/".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    600
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_endpoint_url(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl EndpointConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(format!(
                "Endpoint URL must start with http:// or https://: {}",
                self.url
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err("Request timeout must be positive".to_string());
        }
        Ok(())
    }
}

/// Storage location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".sectionseo/store")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl StorageConfig {
    /// Store path, relative paths resolved against `workspace_root`.
    pub fn resolve_path(&self, workspace_root: &Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            workspace_root.join(&self.path)
        }
    }
}

impl AppConfig {
    /// Validate endpoint and storage sections.
    pub fn validate(&self) -> Result<(), GenerationError> {
        let mut errors = Vec::new();
        if let Err(e) = self.endpoint.validate() {
            errors.push(e);
        }
        if self.storage.path.as_os_str().is_empty() {
            errors.push("Store path cannot be empty".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(GenerationError::Configuration(errors.join("\n")))
        }
    }

    /// Copy safe to print: the API key keeps only its last four characters.
    pub fn redacted(&self) -> AppConfig {
        let mut shown = self.clone();
        shown.generation.api_key = mask_secret(&self.generation.api_key);
        shown
    }

    /// TOML rendering, used to write a starter config file.
    pub fn to_toml(&self) -> Result<String, GenerationError> {
        toml::to_string_pretty(self).map_err(|e| GenerationError::Configuration(e.to_string()))
    }
}

fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

/// Loads [`AppConfig`] from the layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, global file, workspace files, environment.
    pub fn load(workspace_root: &Path) -> Result<AppConfig, GenerationError> {
        let builder = merge::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = sources::environment::add_to_builder(builder);
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Defaults plus one explicit file, then environment.
    pub fn load_from_file(path: &Path) -> Result<AppConfig, GenerationError> {
        if !path.exists() {
            return Err(GenerationError::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge::builder_with_defaults()?
            .add_source(config::File::from(path.to_path_buf()).required(true));
        let builder = sources::environment::add_to_builder(builder);
        Ok(builder.build()?.try_deserialize()?)
    }
}
