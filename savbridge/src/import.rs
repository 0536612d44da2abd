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

//! Converting a data file into a JSON document.
//!
//! An import reads every cell of a file through a [Codec], renders each one
//! with [decode], and frames the fragments into one JSON array with one
//! object per row:
//!
//! ```text
//! [{"a":1,"b":"x"},{"a":0,"b":""}]
//! ```
//!
//! The whole document is handed to a [LineSink] in a single call once the
//! file has been read completely.  Nothing is emitted if reading fails.

use std::{io::ErrorKind as IoErrorKind, ops::ControlFlow, path::Path};

use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    buffer::{JsonArrayWriter, LineBuffer, DEFAULT_CHUNK_SIZE},
    codec::{Codec, CodecError, Metadata, ParseHandler, Variable},
    data::CellValue,
    dispatch::{decode, StringEscaping},
    error::Error,
    sink::LineSink,
};

/// Options for importing a data file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Growth increment of the output buffer, in bytes.
    pub chunk_size: usize,

    /// Number of digits written after the decimal point for float and double
    /// values.
    pub float_precision: usize,

    /// How names and string values are quoted.
    pub strings: StringEscaping,

    /// Text written between row objects.
    pub row_separator: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            float_precision: 6,
            strings: StringEscaping::default(),
            row_separator: String::from(","),
        }
    }
}

impl ImportOptions {
    /// Constructs a new set of default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `self` with the buffer growth increment set to `chunk_size`.
    pub fn with_chunk_size(self, chunk_size: usize) -> Self {
        Self { chunk_size, ..self }
    }

    /// Returns `self` with the float precision set to `float_precision`.
    pub fn with_float_precision(self, float_precision: usize) -> Self {
        Self {
            float_precision,
            ..self
        }
    }

    /// Returns `self` with string quoting set to `strings`.
    pub fn with_strings(self, strings: StringEscaping) -> Self {
        Self { strings, ..self }
    }

    /// Returns `self` with the row separator set to `row_separator`.
    pub fn with_row_separator(self, row_separator: impl Into<String>) -> Self {
        Self {
            row_separator: row_separator.into(),
            ..self
        }
    }

    /// Reads the file at `path` with `codec` and emits it to `sink` as a
    /// single JSON document.
    pub fn import_file<S>(&self, codec: &dyn Codec, path: &Path, sink: &mut S) -> Result<(), Error>
    where
        S: LineSink,
    {
        check_input_path(path)?;
        debug!("Importing {}.", path.display());

        let buffer = LineBuffer::with_chunk_size(self.chunk_size);
        let mut handler = ImportHandler {
            options: self,
            document: JsonArrayWriter::new(buffer, self.row_separator.as_str())?,
            var_count: 0,
            row: None,
            error: None,
        };
        let result = codec.parse(path, &mut handler);
        if let Some(error) = handler.error.take() {
            return Err(error);
        }
        result.map_err(|error| codec_error(path, error))?;

        let n_rows = handler.document.n_rows() + handler.document.is_row_open() as usize;
        let line = handler.document.finish()?;
        debug!(
            "Imported {n_rows} rows of {} variables from {} ({} bytes).",
            handler.var_count,
            path.display(),
            line.len()
        );
        sink.emit_line(line);
        Ok(())
    }

    /// Reads the file at `path` with `codec` and deserializes each row into a
    /// `T`, matching fields to columns by name.
    pub fn import_rows<T>(&self, codec: &dyn Codec, path: &Path) -> Result<Vec<T>, Error>
    where
        T: DeserializeOwned,
    {
        let mut document = String::new();
        self.import_file(codec, path, &mut |line: String| document = line)?;
        Ok(serde_json::from_str(&document)?)
    }
}

/// Rejects paths that cannot name an input file.
pub(crate) fn check_input_path(path: &Path) -> Result<(), Error> {
    if path.as_os_str().is_empty() {
        Err(Error::EmptyPath)
    } else {
        Ok(())
    }
}

/// Converts a codec error for `path` into an [Error], reporting a missing
/// file as an input error rather than a codec failure.
pub(crate) fn codec_error(path: &Path, error: CodecError) -> Error {
    match error {
        CodecError::Open { source, .. } if source.kind() == IoErrorKind::NotFound => {
            Error::FileNotFound(path.to_path_buf())
        }
        error => error.into(),
    }
}

struct ImportHandler<'a> {
    options: &'a ImportOptions,
    document: JsonArrayWriter,
    var_count: usize,

    /// Index of the row being written.
    row: Option<usize>,

    /// Why the parse was stopped, if it was.
    error: Option<Error>,
}

impl ImportHandler<'_> {
    fn write_value(&mut self, row: usize, variable: &Variable, cell: CellValue) -> Result<(), Error> {
        if self.row != Some(row) {
            self.document.begin_row()?;
            self.row = Some(row);
        }
        if let Some(fragment) = decode(&variable.name, cell, self.options) {
            self.document.push_fragment(&fragment)?;
        }
        if variable.index + 1 == self.var_count {
            self.document.end_row()?;
        }
        Ok(())
    }
}

impl ParseHandler for ImportHandler<'_> {
    fn metadata(&mut self, metadata: &Metadata) -> ControlFlow<()> {
        debug!(
            "{} variables, {} rows, {} encoding.",
            metadata.var_count,
            metadata
                .row_count
                .map_or_else(|| String::from("unknown"), |n| n.to_string()),
            metadata.encoding.name()
        );
        self.var_count = metadata.var_count;
        ControlFlow::Continue(())
    }

    fn value(&mut self, row: usize, variable: &Variable, value: CellValue) -> ControlFlow<()> {
        match self.write_value(row, variable, value) {
            Ok(()) => ControlFlow::Continue(()),
            Err(error) => {
                self.error = Some(error);
                ControlFlow::Break(())
            }
        }
    }
}
