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

use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use encoding_rs::Encoding;
use log::info;
use savbridge::{
    codec::FixtureCodec,
    config::Config,
    data::Value,
    variable::{Column, StorageType},
};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::parse_encoding;

/// Create a data file from a JSON request.
///
/// The request is an object with a `label`, a list of `columns` (each with a
/// `name`, `type`, and optional `label`), and a list of `rows`, each a list
/// of cells in column order.  A `null` cell is written as missing.
#[derive(Args, Clone, Debug)]
pub struct Create {
    /// Request file name.
    request: PathBuf,

    /// Output file name.
    output: PathBuf,

    /// Encoding in which string widths are measured.
    #[arg(short = 'e', long, value_parser = parse_encoding)]
    encoding: Option<&'static Encoding>,

    /// Storage width of string columns.
    #[arg(long)]
    string_width: Option<usize>,
}

#[derive(Deserialize, Debug)]
struct Request {
    #[serde(default)]
    label: String,
    columns: Vec<Column>,
    #[serde(default)]
    rows: Vec<Vec<JsonValue>>,
}

/// Converts `cell` into a value for `column`.  `null` becomes the missing
/// sentinel for the column's type.
fn cell_value(column: &Column, cell: &JsonValue) -> Result<Value> {
    let mismatch = || {
        anyhow!(
            "{cell} is not a valid {} value for column {}",
            column.storage_type,
            column.name
        )
    };
    if cell.is_null() {
        return Ok(match column.storage_type {
            StorageType::String => Value::String(String::new()),
            StorageType::Int8 => Value::Int8(0),
            StorageType::Int16 => Value::Int16(0),
            StorageType::Int32 => Value::Int32(0),
            StorageType::Float => Value::Float(0.0),
            StorageType::Double => Value::Double(0.0),
        });
    }
    let integer = || cell.as_i64().ok_or_else(mismatch);
    Ok(match column.storage_type {
        StorageType::String => Value::String(cell.as_str().ok_or_else(mismatch)?.into()),
        StorageType::Int8 => Value::Int8(integer()?.try_into().map_err(|_| mismatch())?),
        StorageType::Int16 => Value::Int16(integer()?.try_into().map_err(|_| mismatch())?),
        StorageType::Int32 => Value::Int32(integer()?.try_into().map_err(|_| mismatch())?),
        StorageType::Float => Value::Float(cell.as_f64().ok_or_else(mismatch)? as f32),
        StorageType::Double => Value::Double(cell.as_f64().ok_or_else(mismatch)?),
    })
}

impl Create {
    pub fn run(self, config: Config) -> Result<()> {
        let file = File::open(&self.request)
            .with_context(|| format!("{}: cannot open request", self.request.display()))?;
        let request: Request = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("{}: invalid request", self.request.display()))?;

        let rows = request
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                if row.len() != request.columns.len() {
                    bail!(
                        "Row {index} has {} cells but there are {} columns.",
                        row.len(),
                        request.columns.len()
                    );
                }
                request
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(column, cell)| cell_value(column, cell))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let mut options = config.export;
        if let Some(encoding) = self.encoding {
            options = options.with_encoding(encoding);
        }
        if let Some(string_width) = self.string_width {
            options = options.with_string_width(string_width);
        }
        options.write_rows(
            &FixtureCodec::new(),
            &self.output,
            &request.label,
            &request.columns,
            &rows,
        )?;
        info!("Wrote {} rows to {}.", rows.len(), self.output.display());
        Ok(())
    }
}
