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

//! Reading column descriptions without reading rows.

use std::{ops::ControlFlow, path::Path};

use log::debug;
use serde::Serialize;

use crate::{
    codec::{Codec, Metadata, ParseHandler, Variable},
    error::Error,
    import::{check_input_path, codec_error},
    sink::HeaderSink,
    variable::TypeCode,
};

/// The description of one column, as reported by [read_header].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeaderItem {
    /// 0-based column index.
    pub index: usize,

    /// Column name.
    pub name: String,

    /// Raw type tag.
    #[serde(rename = "type")]
    pub type_code: TypeCode,

    /// True only for the final column, so that a host can tell when the
    /// header is complete.
    pub is_last: bool,

    /// Storage width declared in the file.
    pub width: usize,
}

struct HeaderHandler<'a, S> {
    sink: &'a mut S,
    var_count: usize,
}

impl<S> ParseHandler for HeaderHandler<'_, S>
where
    S: HeaderSink,
{
    fn metadata(&mut self, metadata: &Metadata) -> ControlFlow<()> {
        self.var_count = metadata.var_count;
        ControlFlow::Continue(())
    }

    fn variable(&mut self, index: usize, variable: &Variable) -> ControlFlow<()> {
        let is_last = index + 1 == self.var_count;
        self.sink.emit_header_item(HeaderItem {
            index: variable.index,
            name: variable.name.clone(),
            type_code: variable.type_code,
            is_last,
            width: variable.storage_width,
        });
        ControlFlow::Continue(())
    }

    fn wants_values(&self) -> bool {
        false
    }
}

/// Reports each column of the file at `path` to `sink`, in column order.
pub fn read_header<S>(codec: &dyn Codec, path: &Path, sink: &mut S) -> Result<(), Error>
where
    S: HeaderSink,
{
    check_input_path(path)?;
    debug!("Reading header of {}.", path.display());
    let mut handler = HeaderHandler { sink, var_count: 0 };
    codec
        .parse(path, &mut handler)
        .map_err(|error| codec_error(path, error))
}
