//! Identifier types shared across the crate.

/// Catalog section identifier. `0` is the root sentinel for `parent_id`.
pub type SectionId = u64;

/// Catalog (information block) identifier. Non-positive values select nothing.
pub type IblockId = i64;

/// Generation run identifier.
pub type RunId = u64;

/// Parent id of a section that sits directly under the catalog root.
pub const ROOT_PARENT: SectionId = 0;
