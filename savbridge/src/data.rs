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

//! Individual pieces of data.
//!
//! [Value] is one cell of a row, tagged with its storage type.  [CellValue]
//! is what a codec hands to a parse handler, which additionally distinguishes
//! system-missing cells and cells of types this crate does not support.

// Warn about missing docs, but not for items declared with `#[cfg(test)]`.
#![cfg_attr(not(test), warn(missing_docs))]

use std::fmt::{Display, Formatter};

use crate::variable::{StorageType, TypeCode};

/// A typed value.
///
/// The variant is the storage type tag, so only the payload that matches the
/// tag can ever be read.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Text.
    String(String),

    /// 8-bit integer.
    Int8(i8),

    /// 16-bit integer.
    Int16(i16),

    /// 32-bit integer.
    Int32(i32),

    /// 32-bit float.
    Float(f32),

    /// 64-bit double.
    Double(f64),
}

impl Value {
    /// Returns the storage type tag of this value.
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::String(_) => StorageType::String,
            Self::Int8(_) => StorageType::Int8,
            Self::Int16(_) => StorageType::Int16,
            Self::Int32(_) => StorageType::Int32,
            Self::Float(_) => StorageType::Float,
            Self::Double(_) => StorageType::Double,
        }
    }

    /// Returns the value of an integer of any width, promoted to `i32`, or
    /// `None` if this is not an integer.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int8(i) => Some(*i as i32),
            Self::Int16(i) => Some(*i as i32),
            Self::Int32(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns true if this value equals the missing-value sentinel for its
    /// type: the empty string for text, zero for every numeric type.
    ///
    /// A genuine zero is therefore indistinguishable from a missing value.
    pub fn is_missing_sentinel(&self) -> bool {
        match self {
            Self::String(s) => s.is_empty(),
            Self::Float(f) => *f == 0.0,
            Self::Double(d) => *d == 0.0,
            _ => self.as_i32() == Some(0),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Self::Int8(value)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Self::Int16(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int32(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Int8(i) => write!(f, "{i}"),
            Self::Int16(i) => write!(f, "{i}"),
            Self::Int32(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Double(x) => write!(f, "{x}"),
        }
    }
}

/// A cell as reported by a codec while parsing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CellValue<'a> {
    /// An ordinary value.
    Present(&'a Value),

    /// The source format's "no value present" marker, for a column of the
    /// given type.
    SystemMissing(StorageType),

    /// A value of a type that this crate does not handle.
    Unsupported(TypeCode),
}

impl CellValue<'_> {
    /// Returns the type code of the cell.
    pub fn type_code(&self) -> TypeCode {
        match self {
            Self::Present(value) => value.storage_type().into(),
            Self::SystemMissing(storage_type) => (*storage_type).into(),
            Self::Unsupported(type_code) => *type_code,
        }
    }
}
