//! Generation settings: the full parameter set of one run.
//!
//! Validated once at run start and then treated as immutable.

use crate::selection::{split_exclusion_list, SelectionScope};
use crate::types::{IblockId, SectionId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Content-generation backends the remote service can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "ChatGPT")]
    ChatGpt,
    #[serde(rename = "DeepSeek")]
    DeepSeek,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::ChatGpt, ProviderKind::DeepSeek];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::ChatGpt => "ChatGPT",
            ProviderKind::DeepSeek => "DeepSeek",
        }
    }

    /// Models offered for this provider.
    pub fn models(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::ChatGpt => &[
                "GPT-4o mini",
                "GPT-4o",
                "GPT-4.1",
                "GPT-4.1 mini",
                "GPT-4.1 nano",
                "o4 mini",
                "o3",
                "o3 mini",
                "GPT-4.5",
            ],
            ProviderKind::DeepSeek => &["DeepSeek-V3", "DeepSeek-R1"],
        }
    }

    pub fn offers(&self, model: &str) -> bool {
        self.models().contains(&model)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rejected settings field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Parameters of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub api_key: String,
    pub provider: ProviderKind,
    pub ai_model: String,
    pub company_name: String,
    pub primary_benefit: String,
    pub secondary_benefit: String,
    pub location: String,
    pub language: String,
    pub generate_title: bool,
    pub generate_description: bool,
    pub generate_h1: bool,
    pub generate_category_description: bool,
    /// `0` selects every matching section.
    pub limit: usize,
    /// Leave sections alone whose fields this system already wrote.
    pub skip_processed: bool,
    /// Comma-separated section ids; non-numeric tokens are ignored.
    pub exclusions: String,
    pub exclude_with_children: bool,
    /// Whether the scope root section itself is eligible.
    pub consider_parent_categories: bool,
    pub max_length_title: u32,
    pub max_length_description: u32,
    pub max_length_h1: u32,
    pub max_length_category_description: u32,
    pub test_category_id: SectionId,
    pub iblock_id: IblockId,
    /// Scope root; `0` covers the whole catalog.
    pub section_id: SectionId,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            provider: ProviderKind::ChatGpt,
            ai_model: "GPT-4o mini".to_string(),
            company_name: String::new(),
            primary_benefit: String::new(),
            secondary_benefit: String::new(),
            location: String::new(),
            language: "Русский".to_string(),
            generate_title: true,
            generate_description: true,
            generate_h1: true,
            generate_category_description: false,
            limit: 100,
            skip_processed: true,
            exclusions: String::new(),
            exclude_with_children: false,
            consider_parent_categories: true,
            max_length_title: 80,
            max_length_description: 255,
            max_length_h1: 70,
            max_length_category_description: 1200,
            test_category_id: 0,
            iblock_id: 0,
            section_id: 0,
        }
    }
}

impl GenerationSettings {
    /// Copy with free-text fields trimmed.
    pub fn normalized(&self) -> Self {
        let mut out = self.clone();
        for field in [
            &mut out.api_key,
            &mut out.ai_model,
            &mut out.company_name,
            &mut out.primary_benefit,
            &mut out.secondary_benefit,
            &mut out.location,
            &mut out.language,
            &mut out.exclusions,
        ] {
            *field = field.trim().to_string();
        }
        out
    }

    /// Every problem with these settings, empty when they are usable.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if self.api_key.trim().is_empty() {
            errors.push(ValidationError::new("api_key", "API key is required"));
        }
        if self.language.trim().is_empty() {
            errors.push(ValidationError::new("language", "language is required"));
        }
        if !self.provider.offers(&self.ai_model) {
            errors.push(ValidationError::new(
                "ai_model",
                format!(
                    "model '{}' is not offered by {} (expected one of: {})",
                    self.ai_model,
                    self.provider,
                    self.provider.models().join(", ")
                ),
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Selection scope these settings describe.
    pub fn scope(&self) -> SelectionScope {
        SelectionScope {
            iblock_id: self.iblock_id,
            root_section_id: self.section_id,
            include_root: self.consider_parent_categories,
            exclusion_ids: split_exclusion_list(&self.exclusions),
            exclude_with_children: self.exclude_with_children,
            result_limit: self.limit,
        }
    }
}
