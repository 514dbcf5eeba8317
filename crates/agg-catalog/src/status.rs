// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Integer status codes for the flat, handle-based operation surface.
use crate::error::CatalogError;

/// Outcome of a catalog operation as seen by status-code callers.
///
/// `Ok` is zero; every failure is a distinct negative code.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The operation succeeded.
    Ok = 0,
    /// A container, dimension, variable or name lookup missed, or the handle
    /// refers to a tombstoned row.
    NotFound = -1,
    /// A store could not grow.
    Memory = -2,
    /// A dimension handle failed validation at variable creation.
    DimNotFound = -3,
    /// An argument could not be turned into a catalog input at all (null
    /// pointer, non-UTF-8 name, negative length).
    InvalidArgument = -4,
}

impl Status {
    /// Raw integer code.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Maps a raw code back onto a status, or `None` for unknown codes.
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            -1 => Some(Self::NotFound),
            -2 => Some(Self::Memory),
            -3 => Some(Self::DimNotFound),
            -4 => Some(Self::InvalidArgument),
            _ => None,
        }
    }

    /// Collapses an operation result into its status.
    pub fn of<T>(result: &Result<T, CatalogError>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(err) => err.status(),
        }
    }
}

impl From<&CatalogError> for Status {
    fn from(err: &CatalogError) -> Self {
        err.status()
    }
}

impl From<CatalogError> for Status {
    fn from(err: CatalogError) -> Self {
        err.status()
    }
}
