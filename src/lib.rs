//! sectionseo: batch SEO generation for catalog section trees
//!
//! Catalog sections are stored as a flattened pre-order tree. A generation run
//! selects a scope of sections, snapshots their current SEO fields, asks an
//! external provider for new headings, titles and descriptions in one batch,
//! and merges the answers back section by section.

pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod history;
pub mod logging;
pub mod provider;
pub mod run;
pub mod selection;
pub mod store;
pub mod types;
