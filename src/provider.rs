//! Generation provider
//!
//! The external boundary of a run: one JSON `POST` carrying the global
//! parameters (`data1`) and the per-section context list (`data2`), answered
//! with a JSON array of per-section results.

use crate::config::{EndpointConfig, GenerationSettings};
use crate::error::{GenerationError, ItemMergeError};
use crate::store::SectionPatch;
use crate::types::SectionId;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Global parameters of one batch, in the provider's key layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GlobalParameters {
    pub api_key: String,
    pub provider: String,
    pub ai_model: String,
    pub company_name: String,
    pub primary_benefit: String,
    pub secondary_benefit: String,
    pub location: String,
    pub language: String,
    #[serde(serialize_with = "yes_no")]
    pub generate_title: bool,
    #[serde(serialize_with = "yes_no")]
    pub generate_description: bool,
    #[serde(serialize_with = "yes_no")]
    pub generate_h1: bool,
    #[serde(serialize_with = "yes_no")]
    pub generate_category_description: bool,
    pub max_length_title: u32,
    pub max_length_h1: u32,
    pub max_length_description: u32,
    pub max_length_category_description: u32,
    /// `0` when no test category is set.
    pub test_category_id: SectionId,
}

fn yes_no<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *flag { "Y" } else { "N" })
}

impl From<&GenerationSettings> for GlobalParameters {
    fn from(settings: &GenerationSettings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            provider: settings.provider.as_str().to_string(),
            ai_model: settings.ai_model.clone(),
            company_name: settings.company_name.clone(),
            primary_benefit: settings.primary_benefit.clone(),
            secondary_benefit: settings.secondary_benefit.clone(),
            location: settings.location.clone(),
            language: settings.language.clone(),
            generate_title: settings.generate_title,
            generate_description: settings.generate_description,
            generate_h1: settings.generate_h1,
            generate_category_description: settings.generate_category_description,
            max_length_title: settings.max_length_title,
            max_length_h1: settings.max_length_h1,
            max_length_description: settings.max_length_description,
            max_length_category_description: settings.max_length_category_description,
            test_category_id: settings.test_category_id,
        }
    }
}

/// Per-section context record. Missing ancestors are sent as "".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionContext {
    pub category_id: SectionId,
    pub category_name: String,
    pub parent_category_1: String,
    pub parent_category_2: String,
}

impl SectionContext {
    /// Build from a section and its ancestor names, nearest parent first.
    pub fn new(category_id: SectionId, category_name: &str, ancestors: &[String]) -> Self {
        let ancestor = |i: usize| ancestors.get(i).cloned().unwrap_or_default();
        Self {
            category_id,
            category_name: category_name.to_string(),
            parent_category_1: ancestor(0),
            parent_category_2: ancestor(1),
        }
    }
}

/// The single request of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub data1: GlobalParameters,
    pub data2: Vec<SectionContext>,
}

/// One accepted response item. `None` fields leave the section unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResultItem {
    pub id: SectionId,
    pub h1: Option<String>,
    pub title: Option<String>,
    pub meta_description: Option<String>,
}

impl GenerationResultItem {
    /// Read one array element. The id may be a positive number or a numeric
    /// string; text fields count only when they are non-null strings.
    pub fn from_value(index: usize, value: &Value) -> Result<Self, ItemMergeError> {
        let id = match value.get("id") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
            _ => None,
        }
        .filter(|id| *id > 0)
        .ok_or(ItemMergeError::MissingId { index })?;

        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Ok(Self {
            id,
            h1: text("h1"),
            title: text("title"),
            meta_description: text("meta_description"),
        })
    }

    /// Partial update for this item. Always marks the section as generated.
    pub fn patch(&self) -> SectionPatch {
        SectionPatch {
            h1: self.h1.clone(),
            meta_title: self.title.clone(),
            meta_description: self.meta_description.clone(),
            auto_generated: Some(true),
            clear: None,
        }
    }

    pub fn field_count(&self) -> usize {
        [&self.h1, &self.title, &self.meta_description]
            .iter()
            .filter(|f| f.is_some())
            .count()
    }
}

/// Parse a provider body. Anything but a top-level JSON array is fatal.
pub fn parse_response(body: &str) -> Result<Vec<Value>, GenerationError> {
    let parsed: Value = serde_json::from_str(body)
        .map_err(|e| GenerationError::ResponseFormat(format!("invalid JSON: {}", e)))?;
    match parsed {
        Value::Array(items) => Ok(items),
        other => Err(GenerationError::ResponseFormat(format!(
            "expected a JSON array, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Generation provider interface
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Submit the batch and return the raw response body.
    async fn submit(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    /// Where requests go, for logs.
    fn endpoint(&self) -> &str;
}

// Helper function to map HTTP errors to GenerationError
fn map_http_error(error: reqwest::Error) -> GenerationError {
    if error.is_timeout() {
        GenerationError::Transport(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        GenerationError::Transport(format!("Connection error: {}", error))
    } else {
        GenerationError::Transport(format!("HTTP error: {}", error))
    }
}

/// HTTP provider client
pub struct HttpGenerationProvider {
    client: Client,
    url: String,
}

impl HttpGenerationProvider {
    pub fn new(config: &EndpointConfig) -> Result<Self, GenerationError> {
        config.validate().map_err(GenerationError::Configuration)?;
        let client = Client::builder()
            .no_proxy()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                GenerationError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl GenerationProvider for HttpGenerationProvider {
    async fn submit(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = serde_json::to_vec(request).map_err(|e| {
            GenerationError::Configuration(format!("Failed to encode request: {}", e))
        })?;
        debug!(url = %self.url, bytes = body.len(), sections = request.data2.len(), "Posting generation request");

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenerationError::Transport(format!(
                "Request failed with status {}: {}",
                status, error_text
            )));
        }

        response.text().await.map_err(map_http_error)
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}
