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

//! Glue between statistical data files and JSON.
//!
//! Three pipelines sit on top of a data-file [codec](codec::Codec):
//!
//! * [ImportOptions::import_file] streams a file's rows into one JSON array
//!   of row objects.
//! * [read_header] reports each column's name and type without reading rows.
//! * [ExportOptions::write_file] writes a file from column descriptions and
//!   typed values.

pub mod buffer;
pub mod codec;
pub mod codegen;
pub mod config;
pub mod data;
pub mod dispatch;
pub mod error;
pub mod export;
pub mod header;
pub mod import;
pub mod sink;
pub mod variable;

pub use error::{Error, ErrorKind, Status};
pub use export::ExportOptions;
pub use header::{read_header, HeaderItem};
pub use import::ImportOptions;
