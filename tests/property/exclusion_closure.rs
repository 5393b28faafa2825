//! Exclusion closure over random forests

use proptest::prelude::*;
use sectionseo::selection::ExclusionResolver;
use sectionseo::store::{MemorySectionStore, SectionRecord};
use std::collections::BTreeSet;

/// `parents[i]` is the parent of section `i + 1`, always an earlier id or 0.
fn forest_strategy() -> impl Strategy<Value = Vec<u64>> {
    (1usize..40).prop_flat_map(|n| {
        (0..n)
            .map(|i| 0..=(i as u64))
            .collect::<Vec<_>>()
    })
}

pub fn build_forest(parents: &[u64]) -> Vec<SectionRecord> {
    // Pre-order numbering from the parent links.
    let n = parents.len() as u64;
    let children = |p: u64| -> Vec<u64> {
        (1..=n).filter(|&id| parents[(id - 1) as usize] == p).collect()
    };
    let mut bounds = vec![(0u64, 0u64, 0u32); parents.len()];
    let mut counter = 0u64;
    let mut stack: Vec<(u64, u32, bool)> = children(0).into_iter().rev().map(|id| (id, 1, false)).collect();
    while let Some((id, depth, closing)) = stack.pop() {
        counter += 1;
        let slot = &mut bounds[(id - 1) as usize];
        if closing {
            slot.1 = counter;
            continue;
        }
        *slot = (counter, 0, depth);
        stack.push((id, depth, true));
        for child in children(id).into_iter().rev() {
            stack.push((child, depth + 1, false));
        }
    }

    (1..=n)
        .map(|id| {
            let (left, right, depth) = bounds[(id - 1) as usize];
            SectionRecord {
                id,
                iblock_id: 1,
                name: format!("S{id}"),
                parent_id: parents[(id - 1) as usize],
                left_margin: left,
                right_margin: right,
                depth_level: depth,
                active: true,
                auto_generated: false,
                h1: None,
                meta_title: None,
                meta_description: None,
            }
        })
        .collect()
}

fn is_descendant(parents: &[u64], mut id: u64, ancestor: u64) -> bool {
    loop {
        let parent = parents[(id - 1) as usize];
        if parent == 0 {
            return false;
        }
        if parent == ancestor {
            return true;
        }
        id = parent;
    }
}

#[test]
fn test_exclusion_closure_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(forest_strategy(), proptest::collection::vec(0u64..45, 0..6)),
            |(parents, picked)| {
                let store = MemorySectionStore::with_sections(build_forest(&parents));
                let resolver = ExclusionResolver::new(&store);
                let tokens: Vec<String> = picked.iter().map(|id| id.to_string()).collect();

                let resolved = resolver.resolve(&tokens, true).unwrap();

                let base: BTreeSet<u64> = picked.iter().copied().collect();
                let known = parents.len() as u64;
                let mut expected = base.clone();
                for id in 1..=known {
                    if base.iter().any(|&e| is_descendant(&parents, id, e)) {
                        expected.insert(id);
                    }
                }
                prop_assert_eq!(&resolved, &expected);

                let again: Vec<String> = resolved.iter().map(|id| id.to_string()).collect();
                prop_assert_eq!(resolver.resolve(&again, true).unwrap(), resolved.clone());

                let flat = resolver.resolve(&tokens, false).unwrap();
                prop_assert_eq!(flat, base);
                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn test_forest_bounds_nest_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&forest_strategy(), |parents| {
            let records = build_forest(&parents);
            for a in &records {
                prop_assert!(a.left_margin < a.right_margin);
                for b in &records {
                    let nested = a.contains(b);
                    prop_assert_eq!(nested, is_descendant(&parents, b.id, a.id));
                }
            }
            Ok(())
        })
        .unwrap();
}
