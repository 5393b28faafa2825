//! Section selector: scope → ordered candidate map.

use crate::error::StorageError;
use crate::selection::exclusion::ExclusionResolver;
use crate::selection::{CandidateMap, CandidateNode, SelectionScope};
use crate::store::{SectionFilter, SectionStore};
use crate::types::SectionId;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

pub struct SectionSelector<'a, S: SectionStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: SectionStore + ?Sized> SectionSelector<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Build the store filter and the exclusion set for `scope`.
    ///
    /// An unknown `root_section_id` falls back to the whole catalog.
    pub fn build_filter(
        &self,
        scope: &SelectionScope,
    ) -> Result<(SectionFilter, BTreeSet<SectionId>), StorageError> {
        let mut filter = SectionFilter::active_in(scope.iblock_id);
        let mut excluded = BTreeSet::new();

        if scope.root_section_id > 0 {
            match self.store.get(scope.root_section_id)? {
                Some(root) => {
                    filter.left_above = Some(root.left_margin);
                    filter.right_below = Some(root.right_margin);
                    if !scope.include_root {
                        excluded.insert(root.id);
                    }
                }
                None => warn!(
                    root_section_id = scope.root_section_id,
                    "Scope root not found, selecting the whole catalog"
                ),
            }
        }

        let resolved = ExclusionResolver::new(self.store)
            .resolve(&scope.exclusion_ids, scope.exclude_with_children)?;
        excluded.extend(resolved);

        filter.exclude_ids = excluded.clone();
        Ok((filter, excluded))
    }

    /// Select candidates for `scope`, ordered by left margin.
    ///
    /// The result cap is applied by the store query; excluded ids are dropped
    /// again afterwards, so a capped query may yield fewer candidates than the
    /// limit.
    pub fn select(&self, scope: &SelectionScope) -> Result<CandidateMap, StorageError> {
        if scope.iblock_id <= 0 {
            debug!(iblock_id = scope.iblock_id, "Non-positive catalog id, nothing to select");
            return Ok(CandidateMap::new());
        }

        let (filter, excluded) = self.build_filter(scope)?;
        let rows = self.store.list_sections(&filter, scope.limit())?;
        let fetched = rows.len();

        let candidates: CandidateMap = rows
            .iter()
            .filter(|row| !excluded.contains(&row.id))
            .map(CandidateNode::from)
            .collect();

        info!(
            iblock_id = scope.iblock_id,
            root_section_id = scope.root_section_id,
            excluded = excluded.len(),
            fetched,
            selected = candidates.len(),
            "Sections selected"
        );
        Ok(candidates)
    }
}
