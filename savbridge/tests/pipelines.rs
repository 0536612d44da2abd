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

use std::fs::{read_to_string, write};

use encoding_rs::WINDOWS_1252;
use savbridge::{
    codec::FixtureCodec,
    codegen::generate_struct,
    data::Value,
    error::{Error, ErrorKind, Status},
    read_header,
    variable::{Column, StorageType, TypeCode},
    ExportOptions, HeaderItem, ImportOptions,
};
use serde::Deserialize;
use tempfile::TempDir;

fn columns() -> Vec<Column> {
    vec![
        Column::new("id", StorageType::Int32),
        Column::new("name", StorageType::String).with_label("Respondent name"),
        Column::new("score", StorageType::Double),
    ]
}

fn import(path: &std::path::Path) -> String {
    let mut lines: Vec<String> = Vec::new();
    ImportOptions::new()
        .import_file(&FixtureCodec::new(), path, &mut lines)
        .unwrap();
    assert_eq!(lines.len(), 1);
    lines.pop().unwrap()
}

#[test]
fn export_then_import() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("survey.sav");
    ExportOptions::new()
        .write_file(
            &FixtureCodec::new(),
            &path,
            "Survey",
            &columns(),
            &[
                Value::Int32(5),
                Value::from("abc"),
                Value::Double(1.5),
                Value::Int32(0),
                Value::from(""),
                Value::Double(0.0),
            ],
        )
        .unwrap();

    assert_eq!(
        import(&path),
        r#"[{"id":5,"name":"abc","score":1.500000},{"id":0,"name":"","score":0.0}]"#
    );
}

#[test]
fn empty_file_imports_as_empty_array() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.sav");
    ExportOptions::new()
        .write_file(&FixtureCodec::new(), &path, "", &columns(), &[])
        .unwrap();
    assert_eq!(import(&path), "[]");
}

#[test]
fn header_of_written_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("survey.sav");
    ExportOptions::new()
        .write_file(
            &FixtureCodec::new(),
            &path,
            "",
            &columns(),
            &[Value::Int32(1), Value::from("x"), Value::Double(2.0)],
        )
        .unwrap();

    let mut header: Vec<HeaderItem> = Vec::new();
    read_header(&FixtureCodec::new(), &path, &mut header).unwrap();
    assert_eq!(
        header
            .iter()
            .map(|item| (item.index, item.name.as_str(), item.type_code, item.is_last, item.width))
            .collect::<Vec<_>>(),
        [
            (0, "id", TypeCode(3), false, 20),
            (1, "name", TypeCode(0), false, 255),
            (2, "score", TypeCode(5), true, 20),
        ]
    );
}

#[test]
fn long_text_is_truncated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("text.sav");
    ExportOptions::new()
        .write_file(
            &FixtureCodec::new(),
            &path,
            "",
            &[Column::new("text", StorageType::String)],
            &[Value::String("é".repeat(300))],
        )
        .unwrap();

    #[derive(Deserialize)]
    struct Row {
        text: String,
    }
    let rows: Vec<Row> = ImportOptions::new()
        .import_rows(&FixtureCodec::new(), &path)
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].text, "é".repeat(127));
}

#[test]
fn unsupported_last_column_keeps_rows_apart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("refs.sav");
    write(
        &path,
        r#"{"variables": [{"name": "a", "type": 3}, {"name": "r", "type": 6}],
            "rows": [[1, "x"], [2, "y"]]}"#,
    )
    .unwrap();
    assert_eq!(import(&path), r#"[{"a":1},{"a":2}]"#);

    let mut header: Vec<HeaderItem> = Vec::new();
    read_header(&FixtureCodec::new(), &path, &mut header).unwrap();
    assert!(matches!(
        generate_struct(&header, "Record"),
        Err(Error::UnsupportedType(TypeCode::STRING_REF))
    ));
}

#[test]
fn generated_struct_matches_import() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("survey.sav");
    ExportOptions::new()
        .write_file(
            &FixtureCodec::new(),
            &path,
            "",
            &columns(),
            &[Value::Int32(9), Value::from("Zoë"), Value::Double(0.25)],
        )
        .unwrap();

    let mut header: Vec<HeaderItem> = Vec::new();
    read_header(&FixtureCodec::new(), &path, &mut header).unwrap();
    let source = generate_struct(&header, "Record").unwrap();
    assert!(source.contains("    #[serde(rename = \"score\")]\n    pub score: f64,\n"));

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record {
        #[serde(rename = "id")]
        id: i32,
        #[serde(rename = "name")]
        name: String,
        #[serde(rename = "score")]
        score: f64,
    }
    let rows: Vec<Record> = ImportOptions::new()
        .import_rows(&FixtureCodec::new(), &path)
        .unwrap();
    assert_eq!(
        rows,
        [Record {
            id: 9,
            name: "Zoë".into(),
            score: 0.25
        }]
    );
}

#[test]
fn missing_input() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.sav");
    let mut lines: Vec<String> = Vec::new();
    let result = ImportOptions::new().import_file(&FixtureCodec::new(), &path, &mut lines);
    assert_eq!(Status::from(&result).code(), -1);
    let error = result.unwrap_err();
    assert!(matches!(error, Error::FileNotFound(_)));
    assert_eq!(error.kind(), ErrorKind::Input);
    assert!(lines.is_empty());
}

#[test]
fn written_file_is_labeled() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("labeled.sav");
    ExportOptions::new()
        .write_file(
            &FixtureCodec::new(),
            &path,
            "Survey 2026",
            &columns(),
            &[Value::Int32(1), Value::from("x"), Value::Double(2.0)],
        )
        .unwrap();
    let document: serde_json::Value = serde_json::from_str(&read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document["label"], "Survey 2026");
    assert_eq!(document["compression"], "rows");
    assert_eq!(document["variables"][1]["label"], "Respondent name");
}

#[test]
fn text_cap_holds_in_target_encoding() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("latin.sav");
    ExportOptions::new()
        .with_encoding(WINDOWS_1252)
        .with_string_width(4)
        .write_file(
            &FixtureCodec::new(),
            &path,
            "",
            &[Column::new("text", StorageType::String)],
            &[Value::from("éééééé")],
        )
        .unwrap();

    let document: serde_json::Value = serde_json::from_str(&read_to_string(&path).unwrap()).unwrap();
    assert_eq!(document["encoding"], "windows-1252");
    assert_eq!(document["variables"][0]["width"], 4);
    let text = document["rows"][0][0].as_str().unwrap();
    assert_eq!(text, "éééé");
    assert!(WINDOWS_1252.encode(text).0.len() <= 4);
}
