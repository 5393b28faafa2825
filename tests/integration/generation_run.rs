//! End-to-end generation runs against sled storage and a scripted provider

use super::test_utils::{lighting_catalog, section, settings_for, storage_with, ScriptedProvider};
use sectionseo::error::{GenerationError, ItemMergeError};
use sectionseo::generation::{GenerationOrchestrator, RunPhase};
use sectionseo::history::HistoryStore;
use sectionseo::run::RunStore;
use sectionseo::store::SectionStore;

#[tokio::test]
async fn three_node_chain_merges_single_item() {
    let (_dir, storage) = storage_with(&[
        section(1, "A", 0, 1, 1, 6),
        section(2, "B", 1, 2, 2, 5),
        section(3, "C", 2, 3, 3, 4),
    ]);
    let provider = ScriptedProvider::replying(r#"[{"id":3,"h1":"X"}]"#);
    let orchestrator = GenerationOrchestrator::new(
        storage.sections.as_ref(),
        storage.history.as_ref(),
        storage.runs.as_ref(),
        &provider,
    );

    let settings = sectionseo::config::GenerationSettings {
        skip_processed: false,
        ..settings_for(1)
    };
    let report = orchestrator.execute(&settings).await.unwrap();
    assert_eq!(report.phase, RunPhase::Done);

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    let data2 = &requests[0].data2;
    assert_eq!(data2.len(), 3);
    assert_eq!(
        (data2[2].parent_category_1.as_str(), data2[2].parent_category_2.as_str()),
        ("B", "A")
    );
    assert_eq!(data2[0].parent_category_1, "");

    let c = storage.sections.get(3).unwrap().unwrap();
    assert_eq!(c.h1.as_deref(), Some("X"));
    assert!(c.auto_generated);
    for untouched in [1, 2] {
        let node = storage.sections.get(untouched).unwrap().unwrap();
        assert_eq!(node.h1, None);
        assert!(!node.auto_generated);
    }

    assert!(storage.runs.get(report.run_id).unwrap().unwrap().done);
    assert_eq!(storage.history.list_for_run(report.run_id).unwrap().len(), 3);
}

#[tokio::test]
async fn second_run_skips_generated_sections() {
    let (_dir, storage) = storage_with(&lighting_catalog());
    let first = ScriptedProvider::replying(
        r#"[{"id":12,"h1":"Desk lamps","title":"Desk lamps in stock","meta_description":"Desk lamps"}]"#,
    );
    let orchestrator = GenerationOrchestrator::new(
        storage.sections.as_ref(),
        storage.history.as_ref(),
        storage.runs.as_ref(),
        &first,
    );
    orchestrator.execute(&settings_for(1)).await.unwrap();

    let second = ScriptedProvider::replying("[]");
    let orchestrator = GenerationOrchestrator::new(
        storage.sections.as_ref(),
        storage.history.as_ref(),
        storage.runs.as_ref(),
        &second,
    );
    let report = orchestrator.execute(&settings_for(1)).await.unwrap();

    assert_eq!(report.snapshotted, 9);
    assert_eq!(report.skipped, 1);
    let sent: Vec<u64> = second.requests()[0]
        .data2
        .iter()
        .map(|c| c.category_id)
        .collect();
    assert!(!sent.contains(&12));
    assert_eq!(sent.len(), 8);

    // The second run's snapshot holds the first run's output.
    let snapshot = storage
        .history
        .list_for_run(report.run_id)
        .unwrap()
        .into_iter()
        .find(|r| r.section_id == 12)
        .unwrap();
    assert_eq!(snapshot.name, "Desk lamps");
    assert_eq!(snapshot.title, "Desk lamps in stock");
}

#[tokio::test]
async fn unreachable_provider_leaves_everything_untouched() {
    let (_dir, storage) = storage_with(&lighting_catalog());
    let provider = ScriptedProvider::unreachable();
    let orchestrator = GenerationOrchestrator::new(
        storage.sections.as_ref(),
        storage.history.as_ref(),
        storage.runs.as_ref(),
        &provider,
    );

    let err = orchestrator.execute(&settings_for(1)).await.unwrap_err();
    assert!(matches!(err, GenerationError::Transport(_)));

    let run = storage.runs.load_latest().unwrap().unwrap();
    assert!(!run.done);
    for record in storage
        .sections
        .list_sections(&sectionseo::store::SectionFilter::active_in(1), None)
        .unwrap()
    {
        assert!(!record.auto_generated);
        assert_eq!(record.h1, None);
    }
}

#[tokio::test]
async fn unknown_ids_are_reported_and_run_completes() {
    let (_dir, storage) = storage_with(&lighting_catalog());
    let provider = ScriptedProvider::replying(
        r#"[{"id":11,"title":"Lamps"},{"id":12,"h1":"Desk"},{"id":500,"h1":"Ghost"}]"#,
    );
    let orchestrator = GenerationOrchestrator::new(
        storage.sections.as_ref(),
        storage.history.as_ref(),
        storage.runs.as_ref(),
        &provider,
    );

    let settings = sectionseo::config::GenerationSettings {
        section_id: 10,
        ..settings_for(1)
    };
    let report = orchestrator.execute(&settings).await.unwrap();

    assert_eq!(report.updated, 2);
    assert_eq!(report.unchanged_unknown, 1);
    assert_eq!(report.failures, vec![ItemMergeError::UnknownSection(500)]);
    assert!(storage.sections.get(500).unwrap().is_none());
    assert!(storage.runs.get(report.run_id).unwrap().unwrap().done);

    let lamps = storage.sections.get(11).unwrap().unwrap();
    assert_eq!(lamps.meta_title.as_deref(), Some("Lamps"));
    assert_eq!(lamps.h1, None);
}
