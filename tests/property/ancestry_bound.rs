//! Ancestry chains stay within the level bound and the candidate set

use super::exclusion_closure::build_forest;
use proptest::prelude::*;
use sectionseo::selection::{ancestor_names, CandidateMap, CandidateNode};

fn forest_and_subset() -> impl Strategy<Value = (Vec<u64>, Vec<bool>)> {
    (1usize..30).prop_flat_map(|n| {
        (
            (0..n).map(|i| 0..=(i as u64)).collect::<Vec<_>>(),
            proptest::collection::vec(any::<bool>(), n),
        )
    })
}

#[test]
fn test_ancestry_bound_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(forest_and_subset(), 0usize..5), |((parents, keep), levels)| {
            let candidates: CandidateMap = build_forest(&parents)
                .iter()
                .zip(&keep)
                .filter(|(_, keep)| **keep)
                .map(|(record, _)| CandidateNode::from(record))
                .collect();

            for node in candidates.iter() {
                let names = ancestor_names(node.id, &candidates, levels);
                prop_assert!(names.len() <= levels);

                // Expected: follow parents while they are candidates.
                let mut expected = Vec::new();
                let mut current = node.parent_id;
                while expected.len() < levels && current != 0 {
                    match candidates.get(current) {
                        Some(parent) => {
                            expected.push(parent.name.clone());
                            current = parent.parent_id;
                        }
                        None => break,
                    }
                }
                prop_assert_eq!(names, expected);
            }
            Ok(())
        })
        .unwrap();
}
