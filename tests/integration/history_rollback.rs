//! Rollback restores the fields a run overwrote

use super::test_utils::{lighting_catalog, settings_for, storage_with, ScriptedProvider};
use sectionseo::generation::GenerationOrchestrator;
use sectionseo::history::rollback_run;
use sectionseo::store::{SectionPatch, SectionStore};

#[tokio::test]
async fn rollback_puts_back_pre_run_fields() {
    let (_dir, storage) = storage_with(&lighting_catalog());
    storage
        .sections
        .update(
            13,
            &SectionPatch {
                meta_title: Some("Floor lamps | Shop".to_string()),
                ..SectionPatch::default()
            },
        )
        .unwrap();

    let provider = ScriptedProvider::replying(
        r#"[{"id":13,"h1":"Floor lamps","title":"Floor lamps for every room"}]"#,
    );
    let orchestrator = GenerationOrchestrator::new(
        storage.sections.as_ref(),
        storage.history.as_ref(),
        storage.runs.as_ref(),
        &provider,
    );
    let report = orchestrator.execute(&settings_for(1)).await.unwrap();

    let generated = storage.sections.get(13).unwrap().unwrap();
    assert_eq!(generated.meta_title.as_deref(), Some("Floor lamps for every room"));

    let rollback = rollback_run(
        report.run_id,
        storage.sections.as_ref(),
        storage.history.as_ref(),
    )
    .unwrap();
    assert_eq!(rollback.restored.len(), 9);
    assert!(rollback.failures.is_empty());

    let restored = storage.sections.get(13).unwrap().unwrap();
    assert_eq!(restored.meta_title.as_deref(), Some("Floor lamps | Shop"));
    assert_eq!(restored.h1, None);
    assert!(!restored.auto_generated);
}
