// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-container dimension store.
use tracing::debug;

use crate::catalog::{open_store, Catalog};
use crate::error::{CatalogError, RowKind};
use crate::ident::{ContainerId, DimensionId};
use crate::store::Tombstone;

/// A named axis with a fixed length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    name: String,
    len: usize,
}

impl Dimension {
    /// Name of the axis.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of points along the axis.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` for a zero-length axis.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Tombstone for Dimension {
    fn tombstone(&mut self) {
        self.name = String::new();
    }
}

impl Catalog {
    /// Defines a dimension in `container` and returns its handle.
    ///
    /// The container's dimension store is created on the first call. Names
    /// need not be unique; lookups resolve to the lowest live handle.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ContainerNotFound`] or a memory error.
    pub fn define_dimension(
        &mut self,
        container: ContainerId,
        name: &str,
        len: usize,
    ) -> Result<DimensionId, CatalogError> {
        let config = self.config;
        let row = self.container_mut(container)?;
        let store = match &mut row.dimensions {
            Some(store) => store,
            None => row.dimensions.insert(open_store(&config)?),
        };
        let (id, _) = store.append(Dimension {
            name: name.to_owned(),
            len,
        })?;
        debug!(%container, %id, name, len, "defined dimension");
        Ok(id)
    }

    /// Finds the first live dimension of `container` named exactly `name`.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ContainerNotFound`] for a dead container,
    /// [`CatalogError::NameNotFound`] when nothing matches.
    pub fn inquire_dimension_id(
        &self,
        container: ContainerId,
        name: &str,
    ) -> Result<DimensionId, CatalogError> {
        self.container(container)?
            .dimensions
            .as_ref()
            .and_then(|store| store.find_live(|dim| dim.name == name))
            .ok_or_else(|| CatalogError::NameNotFound {
                container,
                kind: RowKind::Dimension,
                name: name.to_owned(),
            })
    }

    /// Resolves a live dimension.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ContainerNotFound`] for a dead container,
    /// [`CatalogError::DimensionNotFound`] for an out-of-range or tombstoned
    /// handle.
    pub fn dimension(
        &self,
        container: ContainerId,
        dimension: DimensionId,
    ) -> Result<&Dimension, CatalogError> {
        self.container(container)?
            .dimensions
            .as_ref()
            .and_then(|store| store.get_live(dimension))
            .ok_or(CatalogError::DimensionNotFound {
                container,
                dimension,
            })
    }

    /// Number of dimension slots in `container`; 0 if none was ever defined.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ContainerNotFound`] for a dead container.
    pub fn inquire_dimension_count(&self, container: ContainerId) -> Result<usize, CatalogError> {
        Ok(self.container(container)?.dimension_count())
    }

    /// Iterates the live dimensions of `container` in handle order.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ContainerNotFound`] for a dead container.
    pub fn iter_dimensions(
        &self,
        container: ContainerId,
    ) -> Result<impl Iterator<Item = (DimensionId, &Dimension)> + '_, CatalogError> {
        let row = self.container(container)?;
        Ok(row.dimensions.iter().flat_map(|store| store.iter_live()))
    }
}
