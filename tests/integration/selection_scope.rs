//! Selection over the sled store: scope narrowing, exclusions, limits

use super::test_utils::{lighting_catalog, section, storage_with};
use sectionseo::selection::{SectionSelector, SelectionScope};
use sectionseo::store::{SectionRecord, SectionStore};

fn ids(scope: &SelectionScope, records: &[SectionRecord]) -> Vec<u64> {
    let (_dir, storage) = storage_with(records);
    SectionSelector::new(storage.sections.as_ref())
        .select(scope)
        .unwrap()
        .ids()
        .to_vec()
}

#[test]
fn whole_catalog_in_bound_order() {
    let scope = SelectionScope::whole(1);
    assert_eq!(
        ids(&scope, &lighting_catalog()),
        vec![10, 11, 12, 13, 14, 15, 16, 20, 21]
    );
}

#[test]
fn root_scope_returns_strict_subtree() {
    let catalog = lighting_catalog();
    let scope = SelectionScope {
        root_section_id: 11,
        ..SelectionScope::whole(1)
    };
    let selected = ids(&scope, &catalog);
    assert_eq!(selected, vec![12, 13]);

    let root = catalog.iter().find(|r| r.id == 11).unwrap();
    for id in selected {
        let node = catalog.iter().find(|r| r.id == id).unwrap();
        assert!(root.contains(node));
    }
}

#[test]
fn root_scope_without_root_never_returns_root() {
    let scope = SelectionScope {
        root_section_id: 10,
        include_root: false,
        ..SelectionScope::whole(1)
    };
    let selected = ids(&scope, &lighting_catalog());
    assert!(!selected.contains(&10));
    assert_eq!(selected, vec![11, 12, 13, 14, 15, 16]);
}

#[test]
fn exclusions_with_children_drop_whole_branches() {
    let scope = SelectionScope {
        exclusion_ids: vec!["14".to_string(), "junk".to_string(), " 21 ".to_string()],
        exclude_with_children: true,
        ..SelectionScope::whole(1)
    };
    assert_eq!(ids(&scope, &lighting_catalog()), vec![10, 11, 12, 13, 20]);
}

#[test]
fn exclusions_without_children_drop_only_listed_ids() {
    let scope = SelectionScope {
        exclusion_ids: vec!["14".to_string()],
        exclude_with_children: false,
        ..SelectionScope::whole(1)
    };
    assert_eq!(
        ids(&scope, &lighting_catalog()),
        vec![10, 11, 12, 13, 15, 16, 20, 21]
    );
}

#[test]
fn inactive_and_foreign_sections_are_not_candidates() {
    let mut records = lighting_catalog();
    records[2].active = false;
    let mut foreign = section(99, "Elsewhere", 0, 1, 1, 2);
    foreign.iblock_id = 2;
    records.push(foreign);

    let selected = ids(&SelectionScope::whole(1), &records);
    assert!(!selected.contains(&12));
    assert!(!selected.contains(&99));
}

#[test]
fn limit_caps_result_and_unknown_root_falls_back() {
    let limited = SelectionScope {
        result_limit: 3,
        ..SelectionScope::whole(1)
    };
    assert_eq!(ids(&limited, &lighting_catalog()), vec![10, 11, 12]);

    let unknown_root = SelectionScope {
        root_section_id: 404,
        ..SelectionScope::whole(1)
    };
    assert_eq!(ids(&unknown_root, &lighting_catalog()).len(), 9);
}

#[test]
fn non_positive_catalog_selects_nothing() {
    let (_dir, storage) = storage_with(&lighting_catalog());
    let selector = SectionSelector::new(storage.sections.as_ref());
    assert!(selector.select(&SelectionScope::whole(0)).unwrap().is_empty());
    assert!(selector.select(&SelectionScope::whole(-3)).unwrap().is_empty());
    assert_eq!(storage.sections.get(10).unwrap().unwrap().name, "Lighting");
}
