// savbridge - glue between statistical data files and JSON.
// Copyright (C) 2026 The savbridge authors.
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <http://www.gnu.org/licenses/>.

//! Column descriptions.
//!
//! A [Column] describes one variable of a data file: its name, label, and
//! [StorageType].  The order of columns in a schema is the order of cells in
//! every row, on both the read and the write path.

// Warn about missing docs, but not for items declared with `#[cfg(test)]`.
#![cfg_attr(not(test), warn(missing_docs))]

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// How the codec stores the values of a column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Character data.
    String,

    /// 8-bit signed integer.
    Int8,

    /// 16-bit signed integer.
    Int16,

    /// 32-bit signed integer.
    Int32,

    /// 32-bit floating point.
    Float,

    /// 64-bit floating point.
    Double,
}

impl StorageType {
    /// All of the storage types, in codec code order.
    pub const ALL: [StorageType; 6] = [
        Self::String,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Float,
        Self::Double,
    ];

    /// Returns true for every type except [StorageType::String].
    pub fn is_numeric(self) -> bool {
        self != Self::String
    }

    /// Returns the name of this type, as used in configuration and fixture
    /// files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Float => "float",
            Self::Double => "double",
        }
    }
}

impl Display for StorageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw type tag as reported by a codec.
///
/// Codes 0 through 5 correspond to [StorageType] in declaration order.  Code
/// 6 is the codec's string-reference type, which is not supported, and any
/// other code is likewise unsupported.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeCode(pub i32);

impl TypeCode {
    /// The codec's string-reference type.
    pub const STRING_REF: TypeCode = TypeCode(6);

    /// Returns the storage type for this code, if it is a supported one.
    pub fn storage_type(self) -> Option<StorageType> {
        usize::try_from(self.0)
            .ok()
            .and_then(|index| StorageType::ALL.get(index).copied())
    }
}

impl From<StorageType> for TypeCode {
    fn from(value: StorageType) -> Self {
        Self(value as i32)
    }
}

impl Display for TypeCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.storage_type() {
            Some(storage_type) => write!(f, "{storage_type}"),
            None if *self == Self::STRING_REF => write!(f, "string reference"),
            None => write!(f, "type {}", self.0),
        }
    }
}

/// A column (header) descriptor.
///
/// Immutable once a schema has been built from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Variable name.
    pub name: String,

    /// Variable label, possibly empty.
    #[serde(default)]
    pub label: String,

    /// How values in this column are stored.
    #[serde(rename = "type")]
    pub storage_type: StorageType,

    /// Width declared by the source of the column.
    ///
    /// The export path does not use this to size the column; see
    /// [ExportOptions](crate::export::ExportOptions).
    #[serde(default)]
    pub declared_width: usize,

    /// Number of decimal places declared by the source of the column.
    #[serde(default)]
    pub precision: u32,
}

impl Column {
    /// Creates a new column with the given `name` and `storage_type` and an
    /// empty label.
    pub fn new(name: impl Into<String>, storage_type: StorageType) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            storage_type,
            declared_width: 0,
            precision: 0,
        }
    }

    /// Returns `self` with its label set to `label`.
    pub fn with_label(self, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..self
        }
    }

    /// Returns `self` with its declared width set to `declared_width`.
    pub fn with_declared_width(self, declared_width: usize) -> Self {
        Self {
            declared_width,
            ..self
        }
    }
}
