// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The caller-owned catalog and its container tree.
use tracing::debug;

use crate::config::CatalogConfig;
use crate::dimension::Dimension;
use crate::error::{CatalogError, RowKind};
use crate::ident::{ContainerId, DimensionId, Handle, VariableId};
use crate::store::{GrowableStore, RowState, Tombstone};
use crate::variable::Variable;

/// A directory-like node holding dimensions, variables and child containers.
///
/// Each container owns its own dimension and variable stores; both are
/// created on first use. The child list only ever grows: a child handle is
/// recorded once, when the child is defined.
#[derive(Debug, Clone, Default)]
pub struct Container {
    name: Option<String>,
    path: Option<String>,
    children: Vec<ContainerId>,
    pub(crate) dimensions: Option<GrowableStore<Dimension, DimensionId>>,
    pub(crate) variables: Option<GrowableStore<Variable, VariableId>>,
}

impl Container {
    fn root(path: String) -> Self {
        Self {
            path: Some(path),
            ..Self::default()
        }
    }

    fn child(name: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            ..Self::default()
        }
    }

    /// Name of the container; roots are usually unnamed.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Path of the aggregation file this container describes, if any.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Child container handles in registration order, tombstoned ones
    /// included.
    pub fn children(&self) -> &[ContainerId] {
        &self.children
    }

    /// Number of dimension slots, or 0 if no dimension was ever defined.
    pub fn dimension_count(&self) -> usize {
        self.dimensions.as_ref().map_or(0, GrowableStore::len)
    }

    /// Number of variable slots, or 0 if no variable was ever defined.
    pub fn variable_count(&self) -> usize {
        self.variables.as_ref().map_or(0, GrowableStore::len)
    }
}

impl Tombstone for Container {
    fn tombstone(&mut self) {
        self.name = None;
        self.path = None;
        self.children = Vec::new();
        self.dimensions = None;
        self.variables = None;
    }
}

/// Creates an empty store sized by `config`.
pub(crate) fn open_store<T, H>(config: &CatalogConfig) -> Result<GrowableStore<T, H>, CatalogError>
where
    T: Tombstone,
    H: Handle,
{
    GrowableStore::with_capacity(config.initial_capacity, config.max_rows)
}

/// Hierarchical metadata catalog for one or more aggregated datasets.
///
/// Every container of every tree lives in a single container store. The store
/// is created by the first [`create_root`](Catalog::create_root) and released
/// by the [`free_container`](Catalog::free_container) call that tombstones
/// the last live container; after that the catalog starts over at handle 0.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub(crate) containers: Option<GrowableStore<Container, ContainerId>>,
    pub(crate) config: CatalogConfig,
}

impl Catalog {
    /// Creates an empty catalog with default sizing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty catalog sized by `config`.
    pub fn with_config(config: CatalogConfig) -> Self {
        Self {
            containers: None,
            config,
        }
    }

    /// Sizing applied to stores created from now on.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Returns `true` while the container store is uninitialized, i.e. before
    /// the first root and after the last live container was torn down.
    pub fn is_released(&self) -> bool {
        self.containers.is_none()
    }

    /// Number of live containers across all trees.
    pub fn live_container_count(&self) -> usize {
        self.containers.as_ref().map_or(0, GrowableStore::live_len)
    }

    /// Number of container slots, tombstoned ones included.
    pub fn container_slots(&self) -> usize {
        self.containers.as_ref().map_or(0, GrowableStore::len)
    }

    /// Creates a root container describing the aggregation file at `path`.
    ///
    /// The container store is created if needed, so on a fresh or released
    /// catalog the first root is [`ContainerId::ROOT`].
    ///
    /// # Errors
    ///
    /// Memory errors from creating or growing the container store.
    pub fn create_root(&mut self, path: impl Into<String>) -> Result<ContainerId, CatalogError> {
        let store = match &mut self.containers {
            Some(store) => store,
            None => self.containers.insert(open_store(&self.config)?),
        };
        let (id, root) = store.append(Container::root(path.into()))?;
        debug!(%id, path = root.path(), "created root container");
        Ok(id)
    }

    /// Defines a container named `name` inside `parent`.
    ///
    /// The new handle is the container store's previous length and is
    /// appended to the parent's child list.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ContainerNotFound`] if `parent` is not live, or a
    /// memory error; either way nothing is appended.
    pub fn define_container(
        &mut self,
        parent: ContainerId,
        name: &str,
    ) -> Result<ContainerId, CatalogError> {
        let store = self
            .containers
            .as_mut()
            .ok_or(CatalogError::ContainerNotFound(parent))?;
        let parent_row = store
            .get_live_mut(parent)
            .ok_or(CatalogError::ContainerNotFound(parent))?;
        parent_row
            .children
            .try_reserve(1)
            .map_err(|_| CatalogError::OutOfMemory {
                requested: parent_row.children.len() + 1,
            })?;

        let (id, _) = store.append(Container::child(name))?;
        if let Some(parent_row) = store.get_live_mut(parent) {
            parent_row.children.push(id);
        }
        debug!(%parent, %id, name, "defined container");
        Ok(id)
    }

    /// Resolves a live container.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ContainerNotFound`] if the store is uninitialized, the
    /// handle is out of range, or the container is tombstoned.
    pub fn container(&self, id: ContainerId) -> Result<&Container, CatalogError> {
        self.containers
            .as_ref()
            .and_then(|store| store.get_live(id))
            .ok_or(CatalogError::ContainerNotFound(id))
    }

    pub(crate) fn container_mut(&mut self, id: ContainerId) -> Result<&mut Container, CatalogError> {
        self.containers
            .as_mut()
            .and_then(|store| store.get_live_mut(id))
            .ok_or(CatalogError::ContainerNotFound(id))
    }

    /// Row state of a container slot, live or not; `None` when the slot does
    /// not exist or the store is released.
    pub fn container_state(&self, id: ContainerId) -> Option<RowState> {
        self.containers.as_ref().and_then(|store| store.state(id))
    }

    /// Raw container row regardless of state.
    ///
    /// Tombstoned rows come back with every field unset. Intended for
    /// inspection and tests; [`container`](Catalog::container) is the lookup
    /// operations should use.
    pub fn container_slot(&self, id: ContainerId) -> Option<&Container> {
        self.containers.as_ref().and_then(|store| store.get(id))
    }

    /// Sets (or with `None`, unsets) the path recorded on a container.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ContainerNotFound`] if `id` is not live.
    pub fn set_container_path(
        &mut self,
        id: ContainerId,
        path: Option<String>,
    ) -> Result<(), CatalogError> {
        self.container_mut(id)?.path = path;
        Ok(())
    }

    /// Finds the first live child of `parent` named exactly `name`, in
    /// registration order.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ContainerNotFound`] for a dead parent,
    /// [`CatalogError::NameNotFound`] when no live child matches.
    pub fn inquire_container_id(
        &self,
        parent: ContainerId,
        name: &str,
    ) -> Result<ContainerId, CatalogError> {
        let parent_row = self.container(parent)?;
        parent_row
            .children
            .iter()
            .copied()
            .find(|&child| {
                self.container(child)
                    .is_ok_and(|row| row.name() == Some(name))
            })
            .ok_or_else(|| CatalogError::NameNotFound {
                container: parent,
                kind: RowKind::Container,
                name: name.to_owned(),
            })
    }

    /// Number of children ever registered under `parent`.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ContainerNotFound`] if `parent` is not live.
    pub fn inquire_child_count(&self, parent: ContainerId) -> Result<usize, CatalogError> {
        Ok(self.container(parent)?.children.len())
    }

    /// Copy of the child list of `parent`, in registration order.
    ///
    /// Tombstoned children are included; callers that care use
    /// [`container`](Self::container) to filter them.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ContainerNotFound`] if `parent` is not live.
    pub fn inquire_child_ids(&self, parent: ContainerId) -> Result<Vec<ContainerId>, CatalogError> {
        Ok(self.container(parent)?.children.clone())
    }
}
