// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Cascading, tombstone-based teardown of container subtrees.
//!
//! Tearing down a container visits its subtree with an explicit work stack,
//! so arbitrarily deep trees never deepen the call stack. For every
//! container the order is fixed:
//!
//! 1. tombstone its variables and release its variable store,
//! 2. tombstone its dimensions and release its dimension store,
//! 3. tear down each child in registration order, completely,
//! 4. tombstone the container itself.
//!
//! Once the cascade is done the container store is released, but only if no
//! live container is left anywhere in the catalog.
use tracing::{debug, info, instrument};

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::ident::{ContainerId, Handle};
use crate::store::{GrowableStore, Tombstone};

/// What a single [`Catalog::free_container`] call tore down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// Containers tombstoned, the target included.
    pub containers: usize,
    /// Live dimensions tombstoned across the subtree.
    pub dimensions: usize,
    /// Live variables tombstoned across the subtree.
    pub variables: usize,
    /// `true` if the container store was released because nothing live
    /// remained.
    pub released_store: bool,
}

#[derive(Debug, Clone, Copy)]
enum Step {
    /// Drop the container's own rows and schedule its children.
    Enter(ContainerId),
    /// All descendants are done; tombstone the container.
    Exit(ContainerId),
}

/// Tombstones every row of a store and frees it. Returns the live count.
fn drain<T, H>(store: Option<GrowableStore<T, H>>) -> usize
where
    T: Tombstone,
    H: Handle,
{
    store.map_or(0, |mut store| {
        let live = store.tombstone_all();
        store.release();
        live
    })
}

impl Catalog {
    /// Tears down `id` together with its whole subtree.
    ///
    /// Children that were already torn down on their own are skipped. When
    /// the call leaves no live container anywhere, the container store is
    /// released and the next [`create_root`](Catalog::create_root) starts
    /// again at handle 0; otherwise every tombstoned slot stays in place.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ContainerNotFound`] if `id` is not a live container.
    #[instrument(skip(self))]
    pub fn free_container(&mut self, id: ContainerId) -> Result<TeardownReport, CatalogError> {
        let store = self
            .containers
            .as_mut()
            .filter(|store| store.get_live(id).is_some())
            .ok_or(CatalogError::ContainerNotFound(id))?;

        let mut report = TeardownReport::default();
        let mut work = vec![Step::Enter(id)];
        while let Some(step) = work.pop() {
            match step {
                Step::Enter(current) => {
                    let Some(row) = store.get_live_mut(current) else {
                        debug!(%current, "skipping container already torn down");
                        continue;
                    };
                    let variables = drain(row.variables.take());
                    let dimensions = drain(row.dimensions.take());
                    debug!(%current, variables, dimensions, "dropped container rows");
                    report.variables += variables;
                    report.dimensions += dimensions;
                    work.push(Step::Exit(current));
                    work.extend(row.children().iter().rev().map(|&c| Step::Enter(c)));
                }
                Step::Exit(current) => {
                    if store.tombstone(current) {
                        report.containers += 1;
                        debug!(%current, "tombstoned container");
                    }
                }
            }
        }

        if store.live_len() == 0 {
            if let Some(store) = self.containers.take() {
                let slots = store.release();
                info!(slots, "released container store");
            }
            report.released_store = true;
        }
        Ok(report)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ident::DimensionId;
    use crate::store::RowState;

    #[test]
    fn freeing_the_only_root_releases_everything() {
        let mut catalog = Catalog::new();
        let root = catalog.create_root("agg.nca").unwrap();
        catalog.define_dimension(root, "x", 3).unwrap();
        catalog
            .define_variable(root, "v", &[DimensionId(0)])
            .unwrap();

        let report = catalog.free_container(root).unwrap();
        assert_eq!(
            report,
            TeardownReport {
                containers: 1,
                dimensions: 1,
                variables: 1,
                released_store: true,
            }
        );
        assert!(catalog.is_released());
        assert_eq!(catalog.create_root("again.nca").unwrap(), ContainerId::ROOT);
    }

    #[test]
    fn sibling_keeps_store_alive() {
        let mut catalog = Catalog::new();
        let root = catalog.create_root("agg.nca").unwrap();
        let a = catalog.define_container(root, "a").unwrap();
        let a1 = catalog.define_container(a, "a1").unwrap();
        let b = catalog.define_container(root, "b").unwrap();

        let report = catalog.free_container(a).unwrap();
        assert_eq!(report.containers, 2);
        assert!(!report.released_store);
        assert!(catalog.container(a).is_err());
        assert!(catalog.container(a1).is_err());
        assert!(catalog.container(b).is_ok());
        assert_eq!(catalog.container_state(a1), Some(RowState::Tombstoned));
        assert_eq!(catalog.container_slots(), 4, "no compaction");
        assert_eq!(catalog.container_slot(a).unwrap().name(), None);
    }

    #[test]
    fn already_freed_children_are_skipped() {
        let mut catalog = Catalog::new();
        let root = catalog.create_root("agg.nca").unwrap();
        let a = catalog.define_container(root, "a").unwrap();
        catalog.define_container(root, "b").unwrap();

        catalog.free_container(a).unwrap();
        let report = catalog.free_container(root).unwrap();
        assert_eq!(report.containers, 2);
        assert!(report.released_store);
    }

    #[test]
    fn double_free_is_not_found() {
        let mut catalog = Catalog::new();
        let root = catalog.create_root("agg.nca").unwrap();
        let a = catalog.define_container(root, "a").unwrap();
        catalog.free_container(a).unwrap();
        assert_eq!(
            catalog.free_container(a).unwrap_err(),
            CatalogError::ContainerNotFound(a)
        );
    }

    #[test]
    fn deep_chain_does_not_recurse() {
        let mut catalog = Catalog::new();
        let root = catalog.create_root("deep.nca").unwrap();
        let mut tail = root;
        for depth in 0..50_000 {
            tail = catalog
                .define_container(tail, &format!("level-{depth}"))
                .unwrap();
        }
        let report = catalog.free_container(root).unwrap();
        assert_eq!(report.containers, 50_001);
        assert!(catalog.is_released());
    }
}
