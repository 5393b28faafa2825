//! Batch generation
//!
//! Drives one run end to end: snapshot every candidate, build a single
//! request for the sections that still need content, submit it once, and
//! merge the returned items back into the section store one by one.
//!
//! Transport and response-shape problems fail the whole run before anything
//! is merged. Problems with single items are collected in the [`RunReport`]
//! and the run still completes.

use crate::config::GenerationSettings;
use crate::error::{GenerationError, ItemMergeError};
use crate::history::{HistorySnapshotter, HistoryStore};
use crate::provider::{
    parse_response, GenerationProvider, GenerationRequest, GenerationResultItem, GlobalParameters,
    SectionContext,
};
use crate::run::{GenerationRun, RunStore};
use crate::selection::{ancestor_names, CandidateMap, SectionSelector, DEFAULT_ANCESTOR_LEVELS};
use crate::store::SectionStore;
use crate::types::RunId;
use serde_json::Value;
use std::fmt;
use tracing::{debug, error, info, warn};

/// Lifecycle of a run. `Failed` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Collecting,
    RequestBuilt,
    AwaitingResponse,
    Merging,
    Done,
    Failed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Collecting => "collecting",
            RunPhase::RequestBuilt => "request_built",
            RunPhase::AwaitingResponse => "awaiting_response",
            RunPhase::Merging => "merging",
            RunPhase::Done => "done",
            RunPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: RunId,
    pub phase: RunPhase,
    /// Candidates written to history.
    pub snapshotted: usize,
    /// Candidates left out of the request by the skip policy.
    pub skipped: usize,
    /// Sections sent in the request.
    pub requested: usize,
    /// Sections updated from the response.
    pub updated: usize,
    /// Response ids that are not candidates of this run.
    pub unchanged_unknown: usize,
    pub failures: Vec<ItemMergeError>,
}

impl RunReport {
    fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            phase: RunPhase::Collecting,
            snapshotted: 0,
            skipped: 0,
            requested: 0,
            updated: 0,
            unchanged_unknown: 0,
            failures: Vec::new(),
        }
    }

    /// Failures other than unknown ids.
    pub fn hard_failures(&self) -> impl Iterator<Item = &ItemMergeError> + '_ {
        self.failures
            .iter()
            .filter(|f| !matches!(f, ItemMergeError::UnknownSection(_)))
    }
}

/// Runs batches against one set of stores and one provider.
pub struct GenerationOrchestrator<'a> {
    sections: &'a dyn SectionStore,
    history: &'a dyn HistoryStore,
    runs: &'a dyn RunStore,
    provider: &'a dyn GenerationProvider,
}

impl<'a> GenerationOrchestrator<'a> {
    pub fn new(
        sections: &'a dyn SectionStore,
        history: &'a dyn HistoryStore,
        runs: &'a dyn RunStore,
        provider: &'a dyn GenerationProvider,
    ) -> Self {
        Self {
            sections,
            history,
            runs,
            provider,
        }
    }

    /// Whole invocation: validate settings, open a run record, select the
    /// candidates, and run the batch.
    pub async fn execute(&self, settings: &GenerationSettings) -> Result<RunReport, GenerationError> {
        let settings = settings.normalized();
        if let Err(errors) = settings.validate() {
            let message = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(GenerationError::Configuration(message));
        }

        let run = self.runs.create(&settings)?;
        let candidates = SectionSelector::new(self.sections).select(&settings.scope())?;
        self.run(&run, &settings, &candidates).await
    }

    /// Run one batch over `candidates`, which must be in selector order.
    pub async fn run(
        &self,
        run: &GenerationRun,
        settings: &GenerationSettings,
        candidates: &CandidateMap,
    ) -> Result<RunReport, GenerationError> {
        let mut report = RunReport::new(run.id);
        info!(
            run_id = run.id,
            candidates = candidates.len(),
            endpoint = self.provider.endpoint(),
            "Generation run started"
        );

        let contexts = self.collect(run.id, settings, candidates, &mut report)?;

        let request = GenerationRequest {
            data1: GlobalParameters::from(settings),
            data2: contexts,
        };
        report.requested = request.data2.len();
        self.advance(&mut report, RunPhase::RequestBuilt);
        if request.data2.is_empty() {
            info!(run_id = run.id, "No sections need generation; submitting empty batch");
        }

        self.advance(&mut report, RunPhase::AwaitingResponse);
        let items = match self.provider.submit(&request).await.and_then(|body| parse_response(&body)) {
            Ok(items) => items,
            Err(e) => {
                self.advance(&mut report, RunPhase::Failed);
                error!(run_id = run.id, error = %e, "Generation run failed");
                return Err(e);
            }
        };

        self.advance(&mut report, RunPhase::Merging);
        self.merge(&items, candidates, &mut report);

        if let Err(e) = self.runs.mark_done(run.id) {
            self.advance(&mut report, RunPhase::Failed);
            error!(run_id = run.id, error = %e, "Could not mark run done");
            return Err(e.into());
        }
        self.advance(&mut report, RunPhase::Done);

        info!(
            run_id = run.id,
            snapshotted = report.snapshotted,
            skipped = report.skipped,
            requested = report.requested,
            updated = report.updated,
            unknown = report.unchanged_unknown,
            failed = report.hard_failures().count(),
            "Generation run completed"
        );
        Ok(report)
    }

    /// Snapshot every candidate, then build context records for the ones the
    /// skip policy lets through.
    fn collect(
        &self,
        run_id: RunId,
        settings: &GenerationSettings,
        candidates: &CandidateMap,
        report: &mut RunReport,
    ) -> Result<Vec<SectionContext>, GenerationError> {
        let snapshotter = HistorySnapshotter::new(self.sections, self.history);
        let mut contexts = Vec::with_capacity(candidates.len());

        for node in candidates.iter() {
            snapshotter.snapshot(node.id, run_id)?;
            report.snapshotted += 1;

            if node.auto_generated && settings.skip_processed {
                debug!(run_id, section_id = node.id, "Skipping already generated section");
                report.skipped += 1;
                continue;
            }

            let ancestors = ancestor_names(node.id, candidates, DEFAULT_ANCESTOR_LEVELS);
            contexts.push(SectionContext::new(node.id, &node.name, &ancestors));
        }
        Ok(contexts)
    }

    /// Apply each item independently. Nothing here fails the run.
    fn merge(&self, items: &[Value], candidates: &CandidateMap, report: &mut RunReport) {
        for (index, value) in items.iter().enumerate() {
            let item = match GenerationResultItem::from_value(index, value) {
                Ok(item) => item,
                Err(e) => {
                    warn!(run_id = report.run_id, index, "Response item without usable id");
                    report.failures.push(e);
                    continue;
                }
            };

            if !candidates.contains(item.id) {
                debug!(run_id = report.run_id, section_id = item.id, "Response id is not a candidate; ignored");
                report.unchanged_unknown += 1;
                report.failures.push(ItemMergeError::UnknownSection(item.id));
                continue;
            }

            match self.sections.update(item.id, &item.patch()) {
                Ok(()) => {
                    debug!(
                        run_id = report.run_id,
                        section_id = item.id,
                        fields = item.field_count(),
                        "Section updated"
                    );
                    report.updated += 1;
                }
                Err(e) => {
                    warn!(run_id = report.run_id, section_id = item.id, error = %e, "Section update failed");
                    report.failures.push(ItemMergeError::UpdateFailed {
                        section_id: item.id,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    fn advance(&self, report: &mut RunReport, next: RunPhase) {
        debug!(run_id = report.run_id, from = %report.phase, to = %next, "Run phase");
        report.phase = next;
    }
}
