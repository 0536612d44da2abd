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

//! Where pipeline output goes.
//!
//! The host of a pipeline receives its output through one of these traits.
//! Both are implemented for closures and for vectors that collect the
//! output.

use crate::header::HeaderItem;

/// Receives the document produced by an import.
pub trait LineSink {
    /// Takes ownership of one emitted line.
    fn emit_line(&mut self, line: String);
}

impl<F> LineSink for F
where
    F: FnMut(String),
{
    fn emit_line(&mut self, line: String) {
        self(line)
    }
}

impl LineSink for Vec<String> {
    fn emit_line(&mut self, line: String) {
        self.push(line);
    }
}

/// Receives column descriptions from a header read.
pub trait HeaderSink {
    /// Receives the description of one column.
    fn emit_header_item(&mut self, item: HeaderItem);
}

impl<F> HeaderSink for F
where
    F: FnMut(HeaderItem),
{
    fn emit_header_item(&mut self, item: HeaderItem) {
        self(item)
    }
}

impl HeaderSink for Vec<HeaderItem> {
    fn emit_header_item(&mut self, item: HeaderItem) {
        self.push(item);
    }
}
