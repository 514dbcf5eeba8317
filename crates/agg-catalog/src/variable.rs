// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-container variable store.
use tracing::debug;

use crate::catalog::{open_store, Catalog};
use crate::error::{CatalogError, RowKind};
use crate::fragment::FragmentLocation;
use crate::ident::{ContainerId, DimensionId, Handle, VariableId};
use crate::store::Tombstone;

/// A named field spanning dimensions of its own container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    name: String,
    dimensions: Vec<DimensionId>,
    fragment: FragmentLocation,
}

impl Variable {
    /// Name of the variable.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dimension handles, in axis order, into the owning container.
    pub fn dimensions(&self) -> &[DimensionId] {
        &self.dimensions
    }

    /// Where the variable's fragments live.
    pub fn fragment(&self) -> &FragmentLocation {
        &self.fragment
    }
}

impl Tombstone for Variable {
    fn tombstone(&mut self) {
        self.name = String::new();
        self.dimensions = Vec::new();
        self.fragment.clear();
    }
}

impl Catalog {
    /// Defines a variable in `container` over the given dimensions.
    ///
    /// Every dimension handle must be below the container's dimension count
    /// at the time of the call; dimensions added later are never checked
    /// retroactively. Validation completes before the variable store is
    /// touched, so a rejected call leaves no row behind.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ContainerNotFound`], [`CatalogError::DimNotFound`] for
    /// the first out-of-range handle, or a memory error.
    pub fn define_variable(
        &mut self,
        container: ContainerId,
        name: &str,
        dimensions: &[DimensionId],
    ) -> Result<VariableId, CatalogError> {
        let config = self.config;
        let row = self.container_mut(container)?;

        let count = row.dimension_count();
        if let Some(&dimension) = dimensions.iter().find(|d| d.index() >= count) {
            return Err(CatalogError::DimNotFound {
                container,
                dimension,
                count,
            });
        }
        let mut owned = Vec::new();
        owned
            .try_reserve_exact(dimensions.len())
            .map_err(|_| CatalogError::OutOfMemory {
                requested: dimensions.len(),
            })?;
        owned.extend_from_slice(dimensions);

        let store = match &mut row.variables {
            Some(store) => store,
            None => row.variables.insert(open_store(&config)?),
        };
        let (id, _) = store.append(Variable {
            name: name.to_owned(),
            dimensions: owned,
            fragment: FragmentLocation::new(),
        })?;
        debug!(%container, %id, name, ndims = dimensions.len(), "defined variable");
        Ok(id)
    }

    /// Finds the first live variable of `container` named exactly `name`.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ContainerNotFound`] for a dead container,
    /// [`CatalogError::NameNotFound`] when nothing matches.
    pub fn inquire_variable_id(
        &self,
        container: ContainerId,
        name: &str,
    ) -> Result<VariableId, CatalogError> {
        self.container(container)?
            .variables
            .as_ref()
            .and_then(|store| store.find_live(|var| var.name == name))
            .ok_or_else(|| CatalogError::NameNotFound {
                container,
                kind: RowKind::Variable,
                name: name.to_owned(),
            })
    }

    /// Resolves a live variable.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ContainerNotFound`] for a dead container,
    /// [`CatalogError::VariableNotFound`] for an out-of-range or tombstoned
    /// handle.
    pub fn variable(
        &self,
        container: ContainerId,
        variable: VariableId,
    ) -> Result<&Variable, CatalogError> {
        self.container(container)?
            .variables
            .as_ref()
            .and_then(|store| store.get_live(variable))
            .ok_or(CatalogError::VariableNotFound {
                container,
                variable,
            })
    }

    /// Write access to a variable's fragment-location descriptor.
    ///
    /// # Errors
    ///
    /// Same as [`variable`](Self::variable).
    pub fn fragment_mut(
        &mut self,
        container: ContainerId,
        variable: VariableId,
    ) -> Result<&mut FragmentLocation, CatalogError> {
        self.container_mut(container)?
            .variables
            .as_mut()
            .and_then(|store| store.get_live_mut(variable))
            .map(|var| &mut var.fragment)
            .ok_or(CatalogError::VariableNotFound {
                container,
                variable,
            })
    }

    /// Number of variable slots in `container`; 0 if none was ever defined.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ContainerNotFound`] for a dead container.
    pub fn inquire_variable_count(&self, container: ContainerId) -> Result<usize, CatalogError> {
        Ok(self.container(container)?.variable_count())
    }

    /// Iterates the live variables of `container` in handle order.
    ///
    /// # Errors
    ///
    /// [`CatalogError::ContainerNotFound`] for a dead container.
    pub fn iter_variables(
        &self,
        container: ContainerId,
    ) -> Result<impl Iterator<Item = (VariableId, &Variable)> + '_, CatalogError> {
        let row = self.container(container)?;
        Ok(row.variables.iter().flat_map(|store| store.iter_live()))
    }
}
