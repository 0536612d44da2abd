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

//! Writing a data file from column descriptions and rows.
//!
//! [ExportOptions::write_file] is the simplest way in: it takes the columns
//! and a flattened, row-major array of cells.  [SchemaBuilder] and
//! [RowWriter] are the pieces it is built from, for callers that produce
//! rows incrementally.

use std::{fs::File, io::BufWriter, path::Path};

use encoding_rs::{Encoding, UTF_8};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    codec::{Codec, Compression, DataWriter, VariableHandle, VariableSpec},
    data::Value,
    dispatch::{encode, IntegerWidthPolicy},
    error::Error,
    import::check_input_path,
    variable::{Column, StorageType},
};

/// Options for writing a data file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Storage width of every string column, and the maximum number of bytes
    /// written for any string cell.
    pub string_width: usize,

    /// Storage width of every numeric column.
    pub numeric_width: usize,

    /// How integer cells are written.
    pub integer_width: IntegerWidthPolicy,

    /// How the codec should compress rows.
    pub compression: Compression,

    /// Encoding of strings in the output file.  [Self::string_width] counts
    /// bytes in this encoding.
    pub encoding: &'static Encoding,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            string_width: 255,
            numeric_width: 20,
            integer_width: IntegerWidthPolicy::default(),
            compression: Compression::default(),
            encoding: UTF_8,
        }
    }
}

impl ExportOptions {
    /// Constructs a new set of default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `self` with the string width cap set to `string_width`.
    pub fn with_string_width(self, string_width: usize) -> Self {
        Self {
            string_width,
            ..self
        }
    }

    /// Returns `self` with the numeric column width set to `numeric_width`.
    pub fn with_numeric_width(self, numeric_width: usize) -> Self {
        Self {
            numeric_width,
            ..self
        }
    }

    /// Returns `self` with the integer width policy set to `integer_width`.
    pub fn with_integer_width(self, integer_width: IntegerWidthPolicy) -> Self {
        Self {
            integer_width,
            ..self
        }
    }

    /// Returns `self` with compression set to `compression`.
    pub fn with_compression(self, compression: Compression) -> Self {
        Self {
            compression,
            ..self
        }
    }

    /// Returns `self` with the output encoding set to `encoding`.
    pub fn with_encoding(self, encoding: &'static Encoding) -> Self {
        Self { encoding, ..self }
    }

    /// Writes a file labeled `label` to `path` with `codec`.
    ///
    /// `cells` holds the rows one after another, so its length must be a
    /// multiple of the number of columns, and its values must follow the
    /// column order.
    pub fn write_file(
        &self,
        codec: &dyn Codec,
        path: &Path,
        label: &str,
        columns: &[Column],
        cells: &[Value],
    ) -> Result<(), Error> {
        let rows = match columns.len() {
            0 if cells.is_empty() => Vec::new(),
            n if n > 0 && cells.len() % n == 0 => cells.chunks_exact(n).collect(),
            n => {
                return Err(Error::CellCountMismatch {
                    cells: cells.len(),
                    columns: n,
                })
            }
        };
        self.write_rows(codec, path, label, columns, &rows)
    }

    /// Writes a file labeled `label` to `path` with `codec`, taking explicit
    /// rows.  Every row must have exactly one value per column.
    pub fn write_rows<R>(
        &self,
        codec: &dyn Codec,
        path: &Path,
        label: &str,
        columns: &[Column],
        rows: &[R],
    ) -> Result<(), Error>
    where
        R: AsRef<[Value]>,
    {
        check_input_path(path)?;
        if let Some((row, values)) = rows
            .iter()
            .map(AsRef::as_ref)
            .enumerate()
            .find(|(_, values)| values.len() != columns.len())
        {
            return Err(Error::RowLength {
                row,
                expected: columns.len(),
                actual: values.len(),
            });
        }

        let mut writer = codec.writer();
        writer.set_file_label(label);
        writer.set_encoding(self.encoding);
        writer.set_compression(self.compression);
        let schema = SchemaBuilder::new(self).build(columns, writer.as_mut());

        let output = File::create(path).map_err(|source| Error::OpenOutput {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "Writing {} rows of {} columns to {}.",
            rows.len(),
            columns.len(),
            path.display()
        );
        let output = Box::new(BufWriter::new(output));
        let mut row_writer = RowWriter::begin(writer, schema, self, output, rows.len())?;
        for row in rows {
            row_writer.write_row(row.as_ref())?;
        }
        row_writer.finish()?;
        Ok(())
    }
}

/// The columns registered with a [DataWriter], in order.
#[derive(Clone, Debug)]
pub struct Schema {
    columns: Vec<Column>,
    handles: Vec<VariableHandle>,
}

impl Schema {
    /// The columns, in row-cell order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Registers columns with a [DataWriter].
pub struct SchemaBuilder<'a> {
    options: &'a ExportOptions,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(options: &'a ExportOptions) -> Self {
        Self { options }
    }

    /// Returns the storage width given to columns of `storage_type`.
    ///
    /// This is fixed per kind of column: a column's declared width plays no
    /// part.
    pub fn width_for(&self, storage_type: StorageType) -> usize {
        if storage_type.is_numeric() {
            self.options.numeric_width
        } else {
            self.options.string_width
        }
    }

    /// Adds one variable to `writer` for each of `columns`, in order.
    pub fn build(&self, columns: &[Column], writer: &mut dyn DataWriter) -> Schema {
        let handles = columns
            .iter()
            .map(|column| {
                writer.add_variable(VariableSpec {
                    name: column.name.clone(),
                    label: column.label.clone(),
                    storage_type: column.storage_type,
                    width: self.width_for(column.storage_type),
                })
            })
            .collect();
        Schema {
            columns: columns.to_vec(),
            handles,
        }
    }
}

/// Writes rows, one cell at a time, in lockstep with a [Schema].
///
/// The writer is finalized exactly once: by [RowWriter::finish], or when the
/// [RowWriter] is dropped without being finished.
pub struct RowWriter<'a> {
    writer: Box<dyn DataWriter>,
    schema: Schema,
    options: &'a ExportOptions,

    /// Index of the next column to write, or `None` between rows.
    column: Option<usize>,
    n_rows: usize,
    finished: bool,
}

impl<'a> RowWriter<'a> {
    /// Starts writing `n_rows` rows to `output`.
    pub fn begin(
        mut writer: Box<dyn DataWriter>,
        schema: Schema,
        options: &'a ExportOptions,
        output: Box<dyn std::io::Write>,
        n_rows: usize,
    ) -> Result<Self, Error> {
        writer.begin_writing(output, n_rows)?;
        Ok(Self {
            writer,
            schema,
            options,
            column: None,
            n_rows: 0,
            finished: false,
        })
    }

    fn row_length_error(&self, actual: usize) -> Error {
        Error::RowLength {
            row: self.n_rows,
            expected: self.schema.len(),
            actual,
        }
    }

    /// Starts a row.
    pub fn begin_row(&mut self) -> Result<(), Error> {
        if let Some(column) = self.column {
            return Err(self.row_length_error(column));
        }
        self.writer.begin_row()?;
        self.column = Some(0);
        Ok(())
    }

    /// Writes `value` to the next column of the current row.
    pub fn write_cell(&mut self, value: &Value) -> Result<(), Error> {
        let index = self.column.unwrap_or_default();
        if index >= self.schema.len() {
            return Err(self.row_length_error(index + 1));
        }
        if self.column.is_none() {
            self.begin_row()?;
        }
        let column = &self.schema.columns[index];
        let handle = self.schema.handles[index];
        encode(column, value, self.options)?.insert(self.writer.as_mut(), handle)?;
        self.column = Some(index + 1);
        Ok(())
    }

    /// Ends the current row, which must have a value for every column.
    pub fn end_row(&mut self) -> Result<(), Error> {
        let written = self.column.unwrap_or_default();
        if written != self.schema.len() {
            return Err(self.row_length_error(written));
        }
        if self.column.is_none() {
            self.begin_row()?;
        }
        self.writer.end_row()?;
        self.column = None;
        self.n_rows += 1;
        Ok(())
    }

    /// Writes all of `values` as one row.
    pub fn write_row(&mut self, values: &[Value]) -> Result<(), Error> {
        if values.len() != self.schema.len() {
            return Err(self.row_length_error(values.len()));
        }
        self.begin_row()?;
        for value in values {
            self.write_cell(value)?;
        }
        self.end_row()
    }

    /// Number of rows completed so far.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Finalizes the file, returning the number of rows written.
    pub fn finish(mut self) -> Result<usize, Error> {
        self.finished = true;
        self.writer.end_writing()?;
        debug!("Finished writing {} rows.", self.n_rows);
        Ok(self.n_rows)
    }
}

impl Drop for RowWriter<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.finished = true;
            let _ = self.writer.end_writing();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use encoding_rs::UTF_8;
    use tempfile::TempDir;

    use crate::{
        codec::{
            test::{Call, RecordingCodec},
            Codec, Compression, VariableSpec,
        },
        data::Value,
        dispatch::IntegerWidthPolicy,
        error::{Error, ErrorKind},
        export::{ExportOptions, RowWriter, SchemaBuilder},
        variable::{Column, StorageType},
    };

    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", StorageType::Int32).with_label("Identifier"),
            Column::new("name", StorageType::String),
        ]
    }

    fn count(calls: &[Call], wanted: &Call) -> usize {
        calls.iter().filter(|call| *call == wanted).count()
    }

    #[test]
    fn write_file() {
        let dir = TempDir::new().unwrap();
        let codec = RecordingCodec::new();
        ExportOptions::new()
            .write_file(
                &codec,
                &dir.path().join("out.sav"),
                "My file",
                &columns(),
                &[
                    Value::Int32(5),
                    Value::from("abc"),
                    Value::Int32(0),
                    Value::from(""),
                ],
            )
            .unwrap();
        assert_eq!(
            codec.calls(),
            [
                Call::FileLabel("My file".into()),
                Call::Encoding(UTF_8),
                Call::Compression(Compression::Rows),
                Call::AddVariable(VariableSpec {
                    name: "id".into(),
                    label: "Identifier".into(),
                    storage_type: StorageType::Int32,
                    width: 20
                }),
                Call::AddVariable(VariableSpec {
                    name: "name".into(),
                    label: String::new(),
                    storage_type: StorageType::String,
                    width: 255
                }),
                Call::BeginWriting(2),
                Call::BeginRow,
                Call::Int32(0, 5),
                Call::String(1, "abc".into()),
                Call::EndRow,
                Call::BeginRow,
                Call::Missing(0),
                Call::Missing(1),
                Call::EndRow,
                Call::EndWriting,
            ]
        );
        assert!(dir.path().join("out.sav").exists());
    }

    #[test]
    fn truncates_long_text() {
        let dir = TempDir::new().unwrap();
        let codec = RecordingCodec::new();
        let column = Column::new("text", StorageType::String).with_declared_width(1000);
        ExportOptions::new()
            .write_file(
                &codec,
                &dir.path().join("out.sav"),
                "",
                &[column],
                &[Value::String("z".repeat(1000))],
            )
            .unwrap();
        let strings = codec
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::String(_, s) => Some(s),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(strings, ["z".repeat(255)]);
    }

    #[test]
    fn legacy_integer_width() {
        let dir = TempDir::new().unwrap();
        let codec = RecordingCodec::new();
        ExportOptions::new()
            .with_integer_width(IntegerWidthPolicy::Legacy8Bit)
            .write_file(
                &codec,
                &dir.path().join("out.sav"),
                "",
                &[Column::new("n", StorageType::Int32)],
                &[Value::Int32(7)],
            )
            .unwrap();
        assert_eq!(count(&codec.calls(), &Call::Int8(0, 7)), 1);
    }

    #[test]
    fn unopenable_destination() {
        let dir = TempDir::new().unwrap();
        let codec = RecordingCodec::new();
        let error = ExportOptions::new()
            .write_file(
                &codec,
                &dir.path().join("missing").join("out.sav"),
                "",
                &columns(),
                &[Value::Int32(1), Value::from("a")],
            )
            .unwrap_err();
        assert!(matches!(error, Error::OpenOutput { .. }));
        assert_eq!(error.kind(), ErrorKind::Resource);
        let calls = codec.calls();
        assert!(!calls.iter().any(|call| matches!(
            call,
            Call::BeginWriting(_) | Call::BeginRow | Call::EndWriting
        )));
    }

    #[test]
    fn failed_begin_is_not_finalized() {
        let dir = TempDir::new().unwrap();
        let codec = RecordingCodec::new().failing_to_begin();
        let error = ExportOptions::new()
            .write_file(
                &codec,
                &dir.path().join("out.sav"),
                "",
                &columns(),
                &[Value::Int32(1), Value::from("a")],
            )
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Codec);
        assert!(!codec.calls().iter().any(|call| matches!(
            call,
            Call::BeginWriting(_) | Call::BeginRow | Call::EndWriting
        )));
    }

    #[test]
    fn widths_depend_only_on_kind() {
        let options = ExportOptions::new().with_string_width(64).with_numeric_width(8);
        let builder = SchemaBuilder::new(&options);
        for storage_type in StorageType::ALL {
            let expected = if storage_type == StorageType::String { 64 } else { 8 };
            assert_eq!(builder.width_for(storage_type), expected, "{storage_type}");
        }
    }

    #[test]
    fn write_cell_opens_row() {
        let codec = RecordingCodec::new();
        let options = ExportOptions::new();
        let mut writer = codec.writer();
        let schema = SchemaBuilder::new(&options).build(&columns(), writer.as_mut());
        let mut rows =
            RowWriter::begin(writer, schema, &options, Box::new(std::io::sink()), 1).unwrap();
        rows.write_cell(&Value::Int32(4)).unwrap();
        rows.write_cell(&Value::from("b")).unwrap();
        rows.end_row().unwrap();
        rows.finish().unwrap();
        assert_eq!(
            codec.calls()[2..],
            [
                Call::BeginWriting(1),
                Call::BeginRow,
                Call::Int32(0, 4),
                Call::String(1, "b".into()),
                Call::EndRow,
                Call::EndWriting,
            ]
        );
    }

    #[test]
    fn cell_count_must_be_multiple_of_columns() {
        let codec = RecordingCodec::new();
        let error = ExportOptions::new()
            .write_file(
                &codec,
                Path::new("unused.sav"),
                "",
                &columns(),
                &[Value::Int32(1), Value::from("a"), Value::Int32(2)],
            )
            .unwrap_err();
        assert!(matches!(
            error,
            Error::CellCountMismatch {
                cells: 3,
                columns: 2
            }
        ));
        assert!(codec.calls().is_empty());
    }

    #[test]
    fn finalizes_once_after_codec_failure() {
        let dir = TempDir::new().unwrap();
        let codec = RecordingCodec::new().failing_on_variable(1);
        let error = ExportOptions::new()
            .write_file(
                &codec,
                &dir.path().join("out.sav"),
                "",
                &columns(),
                &[Value::Int32(1), Value::from("a")],
            )
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Codec);
        let calls = codec.calls();
        assert_eq!(count(&calls, &Call::EndWriting), 1);
        assert_eq!(calls.last(), Some(&Call::EndWriting));
        assert_eq!(count(&calls, &Call::EndRow), 0);
    }

    #[test]
    fn finalizes_once_after_type_mismatch() {
        let dir = TempDir::new().unwrap();
        let codec = RecordingCodec::new();
        let error = ExportOptions::new()
            .write_file(
                &codec,
                &dir.path().join("out.sav"),
                "",
                &columns(),
                &[Value::Int32(1), Value::from("a"), Value::from("b"), Value::from("c")],
            )
            .unwrap_err();
        assert!(matches!(error, Error::CellType { .. }));
        let calls = codec.calls();
        assert_eq!(count(&calls, &Call::EndRow), 1);
        assert_eq!(count(&calls, &Call::EndWriting), 1);
    }

    #[test]
    fn row_writer_enforces_column_order() {
        let codec = RecordingCodec::new();
        let options = ExportOptions::new();
        let mut writer = codec.writer();
        let schema = SchemaBuilder::new(&options).build(&columns(), writer.as_mut());
        assert_eq!(schema.len(), 2);
        let mut rows =
            RowWriter::begin(writer, schema, &options, Box::new(std::io::sink()), 1).unwrap();

        rows.begin_row().unwrap();
        rows.write_cell(&Value::Int32(3)).unwrap();
        assert!(matches!(
            rows.end_row(),
            Err(Error::RowLength {
                row: 0,
                expected: 2,
                actual: 1
            })
        ));
        rows.write_cell(&Value::from("x")).unwrap();
        assert!(matches!(
            rows.write_cell(&Value::from("y")),
            Err(Error::RowLength { actual: 3, .. })
        ));
        rows.end_row().unwrap();
        assert_eq!(rows.n_rows(), 1);
        assert_eq!(rows.finish().unwrap(), 1);
        assert_eq!(count(&codec.calls(), &Call::EndWriting), 1);
    }

    #[test]
    fn dropped_row_writer_finalizes() {
        let codec = RecordingCodec::new();
        let options = ExportOptions::new();
        let mut writer = codec.writer();
        let schema = SchemaBuilder::new(&options).build(&columns(), writer.as_mut());
        let rows = RowWriter::begin(writer, schema, &options, Box::new(std::io::sink()), 0).unwrap();
        drop(rows);
        assert_eq!(codec.calls().last(), Some(&Call::EndWriting));
    }
}
