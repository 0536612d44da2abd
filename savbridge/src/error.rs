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

//! Errors and the integer status reported at pipeline boundaries.

use std::{collections::TryReserveError, io::Error as IoError, path::PathBuf};

use thiserror::Error as ThisError;

use crate::{
    codec::CodecError,
    variable::{StorageType, TypeCode},
};

/// An error from one of the pipelines.
#[derive(ThisError, Debug)]
pub enum Error {
    #[error("No input file name was given.")]
    EmptyPath,

    #[error("{0}: file not found.")]
    FileNotFound(PathBuf),

    #[error("{cells} cells cannot be divided into rows of {columns} columns.")]
    CellCountMismatch { cells: usize, columns: usize },

    #[error("Row {row} has {actual} cells but the schema has {expected} columns.")]
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Cell for {column_type} column {column} holds a {value_type} value.")]
    CellType {
        column: String,
        column_type: StorageType,
        value_type: StorageType,
    },

    #[error("Column type {0} is not supported.")]
    UnsupportedType(TypeCode),

    #[error("No columns found in data file.  Is it empty?")]
    EmptyHeader,

    #[error("{0}")]
    Codec(#[from] CodecError),

    #[error("Unable to create {path}: {source}")]
    OpenOutput { path: PathBuf, source: IoError },

    #[error("Out of memory accumulating output: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("Imported document could not be deserialized: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// The three broad classes of [Error].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied a bad path or malformed rows.
    Input,

    /// The codec reported a failure while parsing or writing.
    Codec,

    /// An output destination could not be opened or memory ran out.
    Resource,
}

impl Error {
    /// Returns the class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyPath
            | Self::FileNotFound(_)
            | Self::CellCountMismatch { .. }
            | Self::RowLength { .. }
            | Self::CellType { .. }
            | Self::UnsupportedType(_)
            | Self::EmptyHeader
            | Self::Deserialize(_) => ErrorKind::Input,
            Self::Codec(_) => ErrorKind::Codec,
            Self::OpenOutput { .. } | Self::Allocation(_) => ErrorKind::Resource,
        }
    }
}

/// Outcome of a pipeline, as reported to a host that only understands status
/// codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// The pipeline completed its emission.
    Ok,

    /// The pipeline failed.
    Error,
}

impl Status {
    /// Returns `0` for [Status::Ok] and `-1` for [Status::Error].
    pub fn code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Error => -1,
        }
    }
}

impl<T> From<&Result<T, Error>> for Status {
    fn from(value: &Result<T, Error>) -> Self {
        match value {
            Ok(_) => Self::Ok,
            Err(_) => Self::Error,
        }
    }
}
