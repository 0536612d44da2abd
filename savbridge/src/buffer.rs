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

//! Accumulating the JSON document produced by an import.
//!
//! [LineBuffer] is an append-only text store that grows in fixed-size chunks,
//! so that one append per value and one per row stays cheap over millions of
//! cells.  [JsonArrayWriter] frames rows into `[{...},{...}]` on top of it,
//! writing separators only between elements.

use std::fmt::{Debug, Formatter};

use crate::error::Error;

/// Default growth increment for a [LineBuffer]: 2 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 2 * 1024 * 1024;

/// A growable text accumulator.
///
/// Text in `[0, used)` is never rewritten.  Whenever the space remaining is
/// smaller than an incoming append plus a terminator byte, capacity grows by
/// as many whole chunks as that append needs.
pub struct LineBuffer {
    data: String,
    chunk_size: usize,
}

impl LineBuffer {
    /// Creates an empty buffer that grows by [DEFAULT_CHUNK_SIZE].
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Creates an empty buffer that grows by `chunk_size` bytes at a time.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            data: String::new(),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Number of bytes written so far.
    pub fn used(&self) -> usize {
        self.data.len()
    }

    /// Number of bytes allocated.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// The growth increment.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Appends `text` at the write cursor.
    ///
    /// Fails only if memory cannot be allocated, in which case the buffer is
    /// unchanged.
    pub fn append(&mut self, text: &str) -> Result<(), Error> {
        let needed = text.len() + 1;
        let remaining = self.capacity() - self.used();
        if remaining < needed {
            let chunks = (needed - remaining).div_ceil(self.chunk_size);
            self.data
                .try_reserve_exact(remaining + chunks * self.chunk_size)?;
        }
        self.data.push_str(text);
        Ok(())
    }

    /// Returns the text written so far.
    pub fn as_str(&self) -> &str {
        &self.data
    }

    /// Consumes the buffer, returning its text.
    pub fn into_string(self) -> String {
        self.data
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for LineBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineBuffer")
            .field("used", &self.used())
            .field("capacity", &self.capacity())
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

/// Writes a JSON array of row objects into a [LineBuffer].
#[derive(Debug)]
pub struct JsonArrayWriter {
    buffer: LineBuffer,
    row_separator: String,
    n_rows: usize,

    /// Number of fields written to the open row, or `None` between rows.
    n_fields: Option<usize>,
}

impl JsonArrayWriter {
    /// Starts a document in `buffer`, separating row objects with
    /// `row_separator`.
    pub fn new(mut buffer: LineBuffer, row_separator: impl Into<String>) -> Result<Self, Error> {
        buffer.append("[")?;
        Ok(Self {
            buffer,
            row_separator: row_separator.into(),
            n_rows: 0,
            n_fields: None,
        })
    }

    /// Opens a new row object, closing the previous one if it is still open.
    pub fn begin_row(&mut self) -> Result<(), Error> {
        self.end_row()?;
        if self.n_rows > 0 {
            self.buffer.append(&self.row_separator)?;
        }
        self.buffer.append("{")?;
        self.n_fields = Some(0);
        Ok(())
    }

    /// Appends `fragment`, a `"name":value` pair, to the open row, opening a
    /// row first if necessary.
    pub fn push_fragment(&mut self, fragment: &str) -> Result<(), Error> {
        match self.n_fields {
            None => self.begin_row()?,
            Some(0) => (),
            Some(_) => self.buffer.append(",")?,
        }
        self.buffer.append(fragment)?;
        self.n_fields = self.n_fields.map(|n| n + 1);
        Ok(())
    }

    /// Closes the open row, if there is one.
    pub fn end_row(&mut self) -> Result<(), Error> {
        if self.n_fields.take().is_some() {
            self.buffer.append("}")?;
            self.n_rows += 1;
        }
        Ok(())
    }

    /// Returns true if a row is open.
    pub fn is_row_open(&self) -> bool {
        self.n_fields.is_some()
    }

    /// Number of row objects completed so far.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Closes any open row and the array, returning the document.
    pub fn finish(mut self) -> Result<String, Error> {
        self.end_row()?;
        self.buffer.append("]")?;
        Ok(self.buffer.into_string())
    }
}
