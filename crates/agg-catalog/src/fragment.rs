// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fragment-location descriptor attached to every variable.
//!
//! The catalog only stores these four strings. Populating them is the job of
//! whatever reads the aggregation definition; resolving them into bytes is
//! the job of a fragment-reading engine. Neither happens here.
use std::fmt;

/// Selects one of the four descriptor fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentField {
    /// Position of the fragment inside the file (e.g. a variable path).
    Address,
    /// Position of the fragment within the aggregated array.
    Location,
    /// File or URI holding the fragment.
    File,
    /// Storage format of the file.
    Format,
}

impl FragmentField {
    /// All fields in declaration order.
    pub const ALL: [Self; 4] = [Self::Address, Self::Location, Self::File, Self::Format];
}

impl fmt::Display for FragmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Address => "address",
            Self::Location => "location",
            Self::File => "file",
            Self::Format => "format",
        })
    }
}

/// Where a variable's underlying data fragments physically live.
///
/// All four fields are independent and start unset; the descriptor is
/// allocated eagerly with its variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentLocation {
    address: Option<String>,
    location: Option<String>,
    file: Option<String>,
    format: Option<String>,
}

impl FragmentLocation {
    /// Creates a descriptor with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the field selected by `field`.
    pub fn field(&self, field: FragmentField) -> Option<&str> {
        match field {
            FragmentField::Address => self.address.as_deref(),
            FragmentField::Location => self.location.as_deref(),
            FragmentField::File => self.file.as_deref(),
            FragmentField::Format => self.format.as_deref(),
        }
    }

    /// Replaces the field selected by `field`; `None` unsets it.
    pub fn set_field(&mut self, field: FragmentField, value: Option<String>) {
        let slot = match field {
            FragmentField::Address => &mut self.address,
            FragmentField::Location => &mut self.location,
            FragmentField::File => &mut self.file,
            FragmentField::Format => &mut self.format,
        };
        *slot = value;
    }

    /// Address of the fragment inside its file.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Location of the fragment in the aggregated array.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// File holding the fragment.
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Format of the fragment's file.
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Sets the address.
    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = Some(address.into());
    }

    /// Sets the location.
    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = Some(location.into());
    }

    /// Sets the file.
    pub fn set_file(&mut self, file: impl Into<String>) {
        self.file = Some(file.into());
    }

    /// Sets the format.
    pub fn set_format(&mut self, format: impl Into<String>) {
        self.format = Some(format.into());
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        FragmentField::ALL.iter().all(|f| self.field(*f).is_none())
    }

    /// Unsets every field.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
