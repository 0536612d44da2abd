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

//! A codec that stores data files as JSON documents.
//!
//! A fixture file looks like this:
//!
//! ```json
//! {
//!   "label": "Survey wave 1",
//!   "encoding": "UTF-8",
//!   "compression": "rows",
//!   "variables": [
//!     {"name": "serial", "type": 3, "width": 8},
//!     {"name": "version", "label": "Form version", "type": 0, "width": 8}
//!   ],
//!   "rows": [[1001, "A"], [1002, null]]
//! }
//! ```
//!
//! `type` is the raw [TypeCode] and `null` is system-missing.  Rows must have
//! exactly one cell per variable.

use std::{
    fs::File,
    io::{BufReader, Error as IoError, Write},
    mem::take,
    ops::ControlFlow,
    path::Path,
};

use encoding_rs::{Encoding, UTF_8};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{
    codec::{
        Codec, CodecError, Compression, DataWriter, Metadata, ParseHandler, Variable,
        VariableHandle, VariableSpec,
    },
    data::{CellValue, Value},
    variable::{StorageType, TypeCode},
};

/// A [Codec] for JSON fixture files.
#[derive(Copy, Clone, Debug, Default)]
pub struct FixtureCodec;

impl FixtureCodec {
    /// Creates a new fixture codec.
    pub fn new() -> Self {
        Self
    }
}

fn default_encoding() -> &'static Encoding {
    UTF_8
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct FixtureFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,

    #[serde(default = "default_encoding")]
    encoding: &'static Encoding,

    #[serde(default)]
    compression: Compression,

    variables: Vec<FixtureVariable>,

    #[serde(default)]
    rows: Vec<Vec<JsonValue>>,
}

impl Default for FixtureFile {
    fn default() -> Self {
        Self {
            label: None,
            encoding: default_encoding(),
            compression: Compression::default(),
            variables: Vec::new(),
            rows: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct FixtureVariable {
    name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,

    #[serde(rename = "type")]
    type_code: TypeCode,

    #[serde(default)]
    width: usize,
}

impl FixtureVariable {
    fn to_variable(&self, index: usize) -> Variable {
        Variable {
            index,
            name: self.name.clone(),
            label: self.label.clone(),
            type_code: self.type_code,
            storage_width: self.width,
        }
    }
}

/// Converts the JSON `cell` in `row` into a value of `storage_type` for
/// `variable`.
fn cell_to_value(
    variable: &Variable,
    storage_type: StorageType,
    row: usize,
    cell: &JsonValue,
) -> Result<Value, CodecError> {
    let out_of_range = || CodecError::ValueOutOfRange {
        name: variable.name.clone(),
        value: cell.to_string(),
        storage_type,
    };
    let wrong_kind = || {
        CodecError::Parse(format!(
            "Row {row} has {cell} for {storage_type} variable {}.",
            variable.name
        ))
    };
    match storage_type {
        StorageType::String => cell
            .as_str()
            .map(|s| Value::String(s.into()))
            .ok_or_else(wrong_kind),
        StorageType::Int8 | StorageType::Int16 | StorageType::Int32 => {
            let integer = cell.as_i64().ok_or_else(wrong_kind)?;
            match storage_type {
                StorageType::Int8 => i8::try_from(integer).map(Value::Int8),
                StorageType::Int16 => i16::try_from(integer).map(Value::Int16),
                _ => i32::try_from(integer).map(Value::Int32),
            }
            .map_err(|_| out_of_range())
        }
        StorageType::Float => {
            let number = cell.as_f64().ok_or_else(wrong_kind)?;
            if number.abs() > f32::MAX as f64 {
                Err(out_of_range())
            } else {
                Ok(Value::Float(number as f32))
            }
        }
        StorageType::Double => cell.as_f64().map(Value::Double).ok_or_else(wrong_kind),
    }
}

impl Codec for FixtureCodec {
    fn parse(&self, path: &Path, handler: &mut dyn ParseHandler) -> Result<(), CodecError> {
        fn check(flow: ControlFlow<()>) -> Result<(), CodecError> {
            match flow {
                ControlFlow::Continue(()) => Ok(()),
                ControlFlow::Break(()) => Err(CodecError::UserAbort),
            }
        }

        let file = File::open(path).map_err(|source| CodecError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let fixture: FixtureFile =
            serde_json::from_reader(BufReader::new(file)).map_err(|error| {
                if error.is_io() {
                    CodecError::Read(IoError::from(error))
                } else {
                    CodecError::Parse(error.to_string())
                }
            })?;

        let variables = fixture
            .variables
            .iter()
            .enumerate()
            .map(|(index, variable)| variable.to_variable(index))
            .collect::<Vec<_>>();

        check(handler.metadata(&Metadata {
            var_count: variables.len(),
            row_count: Some(fixture.rows.len()),
            file_label: fixture.label.clone(),
            encoding: fixture.encoding,
        }))?;
        for variable in &variables {
            check(handler.variable(variable.index, variable))?;
        }
        if !handler.wants_values() {
            return Ok(());
        }
        for (row, cells) in fixture.rows.iter().enumerate() {
            if cells.len() != variables.len() {
                return Err(CodecError::ColumnCountMismatch {
                    row,
                    expected: variables.len(),
                    actual: cells.len(),
                });
            }
            for (variable, cell) in variables.iter().zip(cells) {
                let value;
                let cell = match variable.type_code.storage_type() {
                    None => CellValue::Unsupported(variable.type_code),
                    Some(storage_type) if cell.is_null() => CellValue::SystemMissing(storage_type),
                    Some(storage_type) => {
                        value = cell_to_value(variable, storage_type, row, cell)?;
                        CellValue::Present(&value)
                    }
                };
                check(handler.value(row, variable, cell))?;
            }
        }
        Ok(())
    }

    fn writer(&self) -> Box<dyn DataWriter> {
        Box::new(FixtureWriter::default())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
enum State {
    #[default]
    Setup,
    Writing,
    InRow,
    Finished,
}

#[derive(Default)]
struct FixtureWriter {
    file: FixtureFile,
    output: Option<Box<dyn Write>>,
    expected_rows: usize,
    state: State,
    row: Vec<JsonValue>,
}

impl FixtureWriter {
    fn insert(&mut self, variable: VariableHandle, value: JsonValue) -> Result<(), CodecError> {
        if self.state != State::InRow {
            return Err(CodecError::OutOfSequence("value inserted outside of a row"));
        }
        if variable.0 != self.row.len() {
            return Err(CodecError::OutOfSequence(
                "values must be inserted in variable order",
            ));
        }
        let Some(target) = self.file.variables.get(variable.0) else {
            return Err(CodecError::OutOfSequence("value inserted for unknown variable"));
        };
        let is_string = target.type_code == TypeCode::from(StorageType::String);
        if !value.is_null() && value.is_string() != is_string {
            return Err(CodecError::Unsupported(format!(
                "{value} cannot be stored in {} variable {}",
                target.type_code, target.name
            )));
        }
        self.row.push(value);
        Ok(())
    }

    /// JSON has no representation for NaN or infinities.
    fn insert_real(
        &mut self,
        variable: VariableHandle,
        value: f64,
        storage_type: StorageType,
    ) -> Result<(), CodecError> {
        if !value.is_finite() {
            return Err(CodecError::ValueOutOfRange {
                name: self
                    .file
                    .variables
                    .get(variable.0)
                    .map_or_else(String::new, |target| target.name.clone()),
                value: value.to_string(),
                storage_type,
            });
        }
        self.insert(variable, JsonValue::from(value))
    }
}

impl DataWriter for FixtureWriter {
    fn set_file_label(&mut self, label: &str) {
        self.file.label = (!label.is_empty()).then(|| label.into());
    }

    fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.file.encoding = encoding;
    }

    fn set_compression(&mut self, compression: Compression) {
        self.file.compression = compression;
    }

    fn add_variable(&mut self, spec: VariableSpec) -> VariableHandle {
        self.file.variables.push(FixtureVariable {
            name: spec.name,
            label: (!spec.label.is_empty()).then_some(spec.label),
            type_code: spec.storage_type.into(),
            width: spec.width,
        });
        VariableHandle(self.file.variables.len() - 1)
    }

    fn begin_writing(
        &mut self,
        output: Box<dyn Write>,
        row_count: usize,
    ) -> Result<(), CodecError> {
        if self.state != State::Setup {
            return Err(CodecError::OutOfSequence("writing already started"));
        }
        self.output = Some(output);
        self.expected_rows = row_count;
        self.file.rows.reserve(row_count);
        self.state = State::Writing;
        Ok(())
    }

    fn begin_row(&mut self) -> Result<(), CodecError> {
        if self.state != State::Writing {
            return Err(CodecError::OutOfSequence("row begun outside of writing"));
        }
        self.row.clear();
        self.state = State::InRow;
        Ok(())
    }

    fn insert_missing(&mut self, variable: VariableHandle) -> Result<(), CodecError> {
        self.insert(variable, JsonValue::Null)
    }

    fn insert_string(&mut self, variable: VariableHandle, value: &str) -> Result<(), CodecError> {
        if let Some(target) = self.file.variables.get(variable.0) {
            let (bytes, _, _) = self.file.encoding.encode(value);
            if bytes.len() > target.width {
                return Err(CodecError::ValueOutOfRange {
                    name: target.name.clone(),
                    value: format!(
                        "{value:?} ({} bytes in {})",
                        bytes.len(),
                        self.file.encoding.name()
                    ),
                    storage_type: StorageType::String,
                });
            }
        }
        self.insert(variable, JsonValue::from(value))
    }

    fn insert_int8(&mut self, variable: VariableHandle, value: i8) -> Result<(), CodecError> {
        self.insert(variable, JsonValue::from(value))
    }

    fn insert_int16(&mut self, variable: VariableHandle, value: i16) -> Result<(), CodecError> {
        self.insert(variable, JsonValue::from(value))
    }

    fn insert_int32(&mut self, variable: VariableHandle, value: i32) -> Result<(), CodecError> {
        self.insert(variable, JsonValue::from(value))
    }

    fn insert_float(&mut self, variable: VariableHandle, value: f32) -> Result<(), CodecError> {
        self.insert_real(variable, value as f64, StorageType::Float)
    }

    fn insert_double(&mut self, variable: VariableHandle, value: f64) -> Result<(), CodecError> {
        self.insert_real(variable, value, StorageType::Double)
    }

    fn end_row(&mut self) -> Result<(), CodecError> {
        if self.state != State::InRow {
            return Err(CodecError::OutOfSequence("row ended without being begun"));
        }
        self.state = State::Writing;
        if self.row.len() != self.file.variables.len() {
            return Err(CodecError::ColumnCountMismatch {
                row: self.file.rows.len(),
                expected: self.file.variables.len(),
                actual: self.row.len(),
            });
        }
        self.file.rows.push(take(&mut self.row));
        Ok(())
    }

    fn end_writing(&mut self) -> Result<(), CodecError> {
        match self.state {
            State::Setup => return Err(CodecError::OutOfSequence("writing never started")),
            State::Finished => return Err(CodecError::OutOfSequence("writing already ended")),
            State::Writing | State::InRow => (),
        }
        self.state = State::Finished;
        let Some(mut output) = self.output.take() else {
            return Err(CodecError::OutOfSequence("writing never started"));
        };
        if self.file.rows.len() != self.expected_rows {
            return Err(CodecError::RowCountMismatch {
                expected: self.expected_rows,
                actual: self.file.rows.len(),
            });
        }
        serde_json::to_writer(&mut output, &self.file)
            .map_err(|error| CodecError::Write(IoError::from(error)))?;
        output.flush().map_err(CodecError::Write)
    }
}
