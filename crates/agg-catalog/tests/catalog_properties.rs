// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Property tests over randomly shaped container trees.

use agg_catalog::{Catalog, ContainerId, DimensionId, Status};
use proptest::prelude::*;

/// Builds a tree from a parent-choice list: entry `i` picks the parent of
/// container `i + 1` among the containers defined so far.
fn build(parents: &[usize]) -> Catalog {
    let mut catalog = Catalog::new();
    let root = catalog.create_root("agg.nca").unwrap();
    assert_eq!(root, ContainerId::ROOT);
    for (i, pick) in parents.iter().enumerate() {
        let parent = ContainerId(u32::try_from(pick % (i + 1)).unwrap());
        let id = catalog.define_container(parent, &format!("c{i}")).unwrap();
        assert_eq!(id.0 as usize, i + 1);
    }
    catalog
}

/// Live containers reachable from `id`, `id` included.
fn subtree(catalog: &Catalog, id: ContainerId) -> Vec<ContainerId> {
    let mut out = Vec::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        if let Ok(row) = catalog.container(current) {
            out.push(current);
            stack.extend(row.children().iter().copied());
        }
    }
    out
}

proptest! {
    #[test]
    fn handles_are_dense_and_sequential(
        dims in prop::collection::vec(0usize..1000, 0..64)
    ) {
        let mut catalog = Catalog::new();
        let root = catalog.create_root("agg.nca").unwrap();
        for (k, len) in dims.iter().enumerate() {
            let id = catalog.define_dimension(root, "d", *len).unwrap();
            prop_assert_eq!(id.0 as usize, k);
            prop_assert_eq!(catalog.dimension(root, id).unwrap().len(), *len);
        }
        prop_assert_eq!(catalog.inquire_dimension_count(root).unwrap(), dims.len());
    }

    #[test]
    fn store_released_exactly_when_nothing_lives(
        parents in prop::collection::vec(any::<usize>(), 0..40),
        frees in prop::collection::vec(any::<usize>(), 1..8),
    ) {
        let mut catalog = build(&parents);
        let total = parents.len() + 1;

        for pick in frees {
            if catalog.is_released() {
                break;
            }
            let target = ContainerId(u32::try_from(pick % total).unwrap());
            let doomed = subtree(&catalog, target);
            let live_before = catalog.live_container_count();
            let result = catalog.free_container(target);

            if doomed.is_empty() {
                prop_assert_eq!(Status::of(&result), Status::NotFound);
                prop_assert_eq!(catalog.live_container_count(), live_before);
                continue;
            }
            let report = result.unwrap();
            prop_assert_eq!(report.containers, doomed.len());
            for id in &doomed {
                prop_assert!(catalog.container(*id).is_err());
            }
            let live_after = live_before - doomed.len();
            prop_assert_eq!(report.released_store, live_after == 0);
            prop_assert_eq!(catalog.is_released(), live_after == 0);
            if !catalog.is_released() {
                prop_assert_eq!(catalog.live_container_count(), live_after);
                prop_assert_eq!(catalog.container_slots(), total);
            }
        }
    }

    #[test]
    fn variable_validation_matches_dimension_count(
        ndims in 0usize..6,
        requested in prop::collection::vec(0u32..8, 0..5),
    ) {
        let mut catalog = Catalog::new();
        let root = catalog.create_root("agg.nca").unwrap();
        for i in 0..ndims {
            catalog.define_dimension(root, &format!("d{i}"), i).unwrap();
        }
        let dims: Vec<DimensionId> = requested.iter().copied().map(DimensionId).collect();
        let valid = requested.iter().all(|&d| (d as usize) < ndims);

        let result = catalog.define_variable(root, "v", &dims);
        prop_assert_eq!(result.is_ok(), valid);
        if !valid {
            prop_assert_eq!(Status::of(&result), Status::DimNotFound);
        }
        prop_assert_eq!(catalog.inquire_variable_count(root).unwrap(), usize::from(valid));
    }
}
