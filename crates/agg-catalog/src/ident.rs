// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Integer handles into the catalog's stores.
use std::fmt;

/// Common surface of the three handle newtypes.
///
/// A handle is the row's position in its store. It carries no generation
/// counter: a stale handle is caught only by the tombstone check on lookup.
pub trait Handle: Copy + Eq + Ord + fmt::Debug + fmt::Display {
    /// Wraps a raw row index.
    fn from_raw(raw: u32) -> Self;

    /// Returns the raw row index.
    fn raw(self) -> u32;

    /// Returns the row index as a `usize` for slice access.
    fn index(self) -> usize {
        self.raw() as usize
    }

    /// Converts a slot position into a handle, or `None` once the position no
    /// longer fits the 32-bit handle space.
    fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self::from_raw)
    }
}

/// Handle of a container row in the catalog's container store.
///
/// Container handles are global: every container of every tree lives in the
/// same store, so a handle identifies a container without naming its parent.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ContainerId(pub u32);

impl ContainerId {
    /// The first container created on a fresh (or fully released) catalog.
    pub const ROOT: Self = Self(0);
}

impl Handle for ContainerId {
    fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "container#{}", self.0)
    }
}

/// Handle of a dimension row, scoped to its owning container.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct DimensionId(pub u32);

impl Handle for DimensionId {
    fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dim#{}", self.0)
    }
}

/// Handle of a variable row, scoped to its owning container.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct VariableId(pub u32);

impl Handle for VariableId {
    fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "var#{}", self.0)
    }
}
