// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error taxonomy for catalog operations.
use std::fmt;

use thiserror::Error;

use crate::ident::{ContainerId, DimensionId, VariableId};
use crate::status::Status;

/// Which kind of row a by-name lookup was searching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    /// A child container.
    Container,
    /// A dimension.
    Dimension,
    /// A variable.
    Variable,
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Container => "container",
            Self::Dimension => "dimension",
            Self::Variable => "variable",
        })
    }
}

/// Errors returned by [`Catalog`](crate::Catalog) operations.
///
/// Every operation fails fast on the first error it meets. Nothing is
/// recovered locally: a failed call leaves the catalog as it was before the
/// call, apart from lazily created empty stores.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The container handle is out of range, tombstoned, or the container
    /// store has not been created (or was released).
    #[error("[CATALOG_NOT_FOUND] {0} is not a live container")]
    ContainerNotFound(ContainerId),
    /// The dimension handle is out of range or tombstoned.
    #[error("[CATALOG_NOT_FOUND] {dimension} is not a live dimension of {container}")]
    DimensionNotFound {
        /// Owning container.
        container: ContainerId,
        /// Requested dimension.
        dimension: DimensionId,
    },
    /// The variable handle is out of range or tombstoned.
    #[error("[CATALOG_NOT_FOUND] {variable} is not a live variable of {container}")]
    VariableNotFound {
        /// Owning container.
        container: ContainerId,
        /// Requested variable.
        variable: VariableId,
    },
    /// A by-name lookup found no live row with that exact name.
    #[error("[CATALOG_NOT_FOUND] no live {kind} named {name:?} in {container}")]
    NameNotFound {
        /// Container whose rows were scanned.
        container: ContainerId,
        /// Kind of row searched.
        kind: RowKind,
        /// Name that was searched for.
        name: String,
    },
    /// A dimension handle passed to variable creation was outside the owning
    /// container's dimension store at the time of the call.
    #[error("[CATALOG_DIM_NOT_FOUND] {dimension} out of range: {container} has {count} dimensions")]
    DimNotFound {
        /// Container the variable was being defined in.
        container: ContainerId,
        /// First offending handle.
        dimension: DimensionId,
        /// Dimension count of the container when validation ran.
        count: usize,
    },
    /// The allocator refused to grow a store.
    #[error("[CATALOG_MEMORY] failed to reserve room for {requested} rows")]
    OutOfMemory {
        /// Total row capacity that was requested.
        requested: usize,
    },
    /// A store reached its configured row limit (or the handle space).
    #[error("[CATALOG_MEMORY] store is full at {limit} rows")]
    CapacityExceeded {
        /// Maximum number of rows the store may hold.
        limit: usize,
    },
}

impl CatalogError {
    /// Status code reported for this error on the flat operation surface.
    pub fn status(&self) -> Status {
        match self {
            Self::ContainerNotFound(_)
            | Self::DimensionNotFound { .. }
            | Self::VariableNotFound { .. }
            | Self::NameNotFound { .. } => Status::NotFound,
            Self::DimNotFound { .. } => Status::DimNotFound,
            Self::OutOfMemory { .. } | Self::CapacityExceeded { .. } => Status::Memory,
        }
    }

    /// Returns `true` for any flavour of not-found error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Status::NotFound
    }
}
