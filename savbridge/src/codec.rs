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

//! The seam between this crate and a data file codec.
//!
//! A codec understands the physical layout of a statistical data file.  This
//! crate never looks at that layout itself.  It talks to a codec only through
//! the traits in this module:
//!
//! - [Codec::parse] drives a [ParseHandler] through one file, calling
//!   [ParseHandler::metadata] once, [ParseHandler::variable] once per
//!   variable in declaration order, and then, unless the handler declines
//!   them, [ParseHandler::value] for every cell in row-major order, all on
//!   the calling thread.
//!
//! - [Codec::writer] returns a [DataWriter], which accepts variables and
//!   then rows of typed values.
//!
//! [FixtureCodec] is a complete codec that stores data files as JSON
//! documents.

use std::{
    io::{Error as IoError, Write},
    ops::ControlFlow,
    path::{Path, PathBuf},
};

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use crate::{
    data::CellValue,
    variable::{StorageType, TypeCode},
};

mod fixture;
pub use fixture::FixtureCodec;


/// Errors reported by a codec.
#[derive(ThisError, Debug)]
pub enum CodecError {
    #[error("Unable to open {path}: {source}")]
    Open { path: PathBuf, source: IoError },

    #[error("Error reading data file: {0}")]
    Read(IoError),

    #[error("Error writing data file: {0}")]
    Write(IoError),

    #[error("Malformed data file: {0}")]
    Parse(String),

    #[error("Unsupported data file feature: {0}")]
    Unsupported(String),

    #[error("Value {value} is out of range for {storage_type} variable {name}.")]
    ValueOutOfRange {
        name: String,
        value: String,
        storage_type: StorageType,
    },

    #[error("Row {row} has {actual} values but the file has {expected} variables.")]
    ColumnCountMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Writer was told to expect {expected} rows but {actual} were written.")]
    RowCountMismatch { expected: usize, actual: usize },

    #[error("Writer call out of sequence: {0}.")]
    OutOfSequence(&'static str),

    #[error("Parsing was aborted by the handler.")]
    UserAbort,
}

/// File-level information reported once, before any variable.
#[derive(Clone, Debug)]
pub struct Metadata {
    /// Number of variables in the file.
    pub var_count: usize,

    /// Number of rows in the file, if the file records it.
    pub row_count: Option<usize>,

    /// The file label, if any.
    pub file_label: Option<String>,

    /// Character encoding of the file's strings.
    pub encoding: &'static Encoding,
}

/// A variable as reported by a codec while parsing.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    /// 0-based position of the variable in the file.
    pub index: usize,

    /// Variable name.
    pub name: String,

    /// Variable label, if any.
    pub label: Option<String>,

    /// Raw type tag.
    pub type_code: TypeCode,

    /// Storage width in bytes.
    pub storage_width: usize,
}

/// Receives the contents of a file from [Codec::parse].
///
/// Returning [ControlFlow::Break] from any method stops the parse, which then
/// fails with [CodecError::UserAbort].  A handler that breaks is expected to
/// remember why.
pub trait ParseHandler {
    /// Called once, before any other method.
    fn metadata(&mut self, metadata: &Metadata) -> ControlFlow<()> {
        let _ = metadata;
        ControlFlow::Continue(())
    }

    /// Called once per variable, in declaration order.
    fn variable(&mut self, index: usize, variable: &Variable) -> ControlFlow<()> {
        let _ = (index, variable);
        ControlFlow::Continue(())
    }

    /// Called once per cell, in row-major order.  `row` is the 0-based row
    /// index.
    fn value(&mut self, row: usize, variable: &Variable, value: CellValue) -> ControlFlow<()> {
        let _ = (row, variable, value);
        ControlFlow::Continue(())
    }

    /// Whether the handler wants [ParseHandler::value] calls.  If this
    /// returns false, the codec stops successfully after the last variable
    /// without reading any rows.
    fn wants_values(&self) -> bool {
        true
    }
}

/// How a [DataWriter] should compress rows.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// No compression.
    None,

    /// Row-level compression.
    #[default]
    Rows,
}

/// A variable to be added with [DataWriter::add_variable].
#[derive(Clone, Debug, PartialEq)]
pub struct VariableSpec {
    /// Variable name.
    pub name: String,

    /// Variable label, possibly empty.
    pub label: String,

    /// How values are stored.
    pub storage_type: StorageType,

    /// Storage width in bytes.
    pub width: usize,
}

/// Identifies a variable added to a [DataWriter].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariableHandle(pub usize);

/// Writes a data file.
///
/// Calls must follow this order: any number of [set_file_label],
/// [set_encoding], [set_compression], and [add_variable]; then
/// [begin_writing]; then, for
/// each row, [begin_row], one `insert_*` per variable in order, and
/// [end_row]; then [end_writing].
///
/// [set_file_label]: DataWriter::set_file_label
/// [set_encoding]: DataWriter::set_encoding
/// [set_compression]: DataWriter::set_compression
/// [add_variable]: DataWriter::add_variable
/// [begin_writing]: DataWriter::begin_writing
/// [begin_row]: DataWriter::begin_row
/// [end_row]: DataWriter::end_row
/// [end_writing]: DataWriter::end_writing
pub trait DataWriter {
    fn set_file_label(&mut self, label: &str);

    /// Sets the encoding of the file's strings.  String values must fit in
    /// their variable's width when encoded this way.
    fn set_encoding(&mut self, encoding: &'static Encoding);

    fn set_compression(&mut self, compression: Compression);
    fn add_variable(&mut self, spec: VariableSpec) -> VariableHandle;

    /// Starts writing a file with `row_count` rows to `output`.
    fn begin_writing(
        &mut self,
        output: Box<dyn Write>,
        row_count: usize,
    ) -> Result<(), CodecError>;

    fn begin_row(&mut self) -> Result<(), CodecError>;
    fn insert_missing(&mut self, variable: VariableHandle) -> Result<(), CodecError>;
    fn insert_string(&mut self, variable: VariableHandle, value: &str) -> Result<(), CodecError>;
    fn insert_int8(&mut self, variable: VariableHandle, value: i8) -> Result<(), CodecError>;
    fn insert_int16(&mut self, variable: VariableHandle, value: i16) -> Result<(), CodecError>;
    fn insert_int32(&mut self, variable: VariableHandle, value: i32) -> Result<(), CodecError>;
    fn insert_float(&mut self, variable: VariableHandle, value: f32) -> Result<(), CodecError>;
    fn insert_double(&mut self, variable: VariableHandle, value: f64) -> Result<(), CodecError>;
    fn end_row(&mut self) -> Result<(), CodecError>;

    /// Finishes the file and releases the output.
    ///
    /// Must be called exactly once after [begin_writing] succeeds, whether
    /// or not the rows were written successfully.  If [begin_writing] fails,
    /// the writer must be dropped without calling this.
    ///
    /// [begin_writing]: DataWriter::begin_writing
    fn end_writing(&mut self) -> Result<(), CodecError>;
}

/// A data file codec.
pub trait Codec {
    /// Parses the file at `path`, reporting its contents to `handler`.
    fn parse(&self, path: &Path, handler: &mut dyn ParseHandler) -> Result<(), CodecError>;

    /// Returns a new writer.
    fn writer(&self) -> Box<dyn DataWriter>;
}
