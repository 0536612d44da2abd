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

//! Per-value type dispatch.
//!
//! [decode] turns one cell reported by a codec into a `"name":value` JSON
//! fragment, and [encode] turns one exported [Value] into the [Encoded] form
//! that is handed to a [DataWriter].  Both apply the same missing-value
//! convention: text is missing when empty and numbers are missing when zero.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::{
    codec::{CodecError, DataWriter, VariableHandle},
    data::{CellValue, Value},
    error::Error,
    export::ExportOptions,
    import::ImportOptions,
    variable::{Column, StorageType},
};

/// How [decode] writes names and string values.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringEscaping {
    /// Escape quotes, backslashes, and control characters, so that the
    /// output is always valid JSON.
    #[default]
    Json,

    /// Copy string content between quotes without any escaping.
    ///
    /// Output is byte-for-byte what older tools produced, but a string that
    /// contains `"` or a control character yields invalid JSON.
    Legacy,
}

impl StringEscaping {
    /// Returns `s` as a quoted string literal.
    pub fn quote(self, s: &str) -> String {
        match self {
            Self::Json => serde_json::Value::from(s).to_string(),
            Self::Legacy => format!("\"{s}\""),
        }
    }
}

/// How [encode] writes integer cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntegerWidthPolicy {
    /// Write each integer with its column's declared width.
    #[default]
    Declared,

    /// Write every integer as an 8-bit value, whatever its declared width.
    ///
    /// Values outside `-128..=127` wrap.  This reproduces files written by
    /// older tools.
    #[serde(rename = "legacy-8-bit")]
    Legacy8Bit,
}

/// Returns the text used for a system-missing cell of `storage_type`.
pub fn missing_literal(storage_type: StorageType) -> &'static str {
    match storage_type {
        StorageType::String => "\"\"",
        StorageType::Int8 | StorageType::Int16 | StorageType::Int32 => "0",
        StorageType::Float | StorageType::Double => "0.0",
    }
}

fn format_real(name: &str, x: f64, precision: usize) -> Cow<'static, str> {
    if x.is_finite() {
        Cow::from(format!("{x:.precision$}"))
    } else {
        warn!("Writing non-finite value {x} for {name} as missing.");
        Cow::from(missing_literal(StorageType::Double))
    }
}

/// Renders `cell`, which belongs to the column named `name`, as a
/// `"name":value` fragment.
///
/// Returns `None` for a cell whose type is not supported.  That is not an
/// error: the cell is simply left out of its row.
pub fn decode(name: &str, cell: CellValue, options: &ImportOptions) -> Option<String> {
    let value = match cell {
        CellValue::Unsupported(type_code) => {
            trace!("Skipping {type_code} value for {name}.");
            return None;
        }
        CellValue::SystemMissing(storage_type) => Cow::from(missing_literal(storage_type)),
        CellValue::Present(Value::String(s)) => Cow::from(options.strings.quote(s)),
        CellValue::Present(Value::Int8(i)) => Cow::from(i.to_string()),
        CellValue::Present(Value::Int16(i)) => Cow::from(i.to_string()),
        CellValue::Present(Value::Int32(i)) => Cow::from(i.to_string()),
        CellValue::Present(Value::Float(x)) => format_real(name, *x as f64, options.float_precision),
        CellValue::Present(Value::Double(x)) => format_real(name, *x, options.float_precision),
    };
    Some(format!("{}:{value}", options.strings.quote(name)))
}

/// A value ready to be written.
#[derive(Clone, Debug, PartialEq)]
pub enum Encoded<'a> {
    /// The missing-value marker.
    Missing,

    /// Text, already truncated to the column's width.
    String(&'a str),

    /// 8-bit integer.
    Int8(i8),

    /// 16-bit integer.
    Int16(i16),

    /// 32-bit integer.
    Int32(i32),

    /// 32-bit float.
    Float(f32),

    /// 64-bit double.
    Double(f64),
}

impl Encoded<'_> {
    /// Writes this value to `variable` in `writer`.
    pub fn insert(
        &self,
        writer: &mut dyn DataWriter,
        variable: VariableHandle,
    ) -> Result<(), CodecError> {
        match self {
            Self::Missing => writer.insert_missing(variable),
            Self::String(s) => writer.insert_string(variable, s),
            Self::Int8(i) => writer.insert_int8(variable, *i),
            Self::Int16(i) => writer.insert_int16(variable, *i),
            Self::Int32(i) => writer.insert_int32(variable, *i),
            Self::Float(x) => writer.insert_float(variable, *x),
            Self::Double(x) => writer.insert_double(variable, *x),
        }
    }
}

/// Returns the longest prefix of `s` that occupies no more than `max_width`
/// bytes in `encoding`, without splitting a character.
pub fn truncate_to_width<'a>(s: &'a str, max_width: usize, encoding: &'static Encoding) -> &'a str {
    if encoding == UTF_8 {
        if s.len() <= max_width {
            return s;
        }
        let mut end = max_width;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        return &s[..end];
    }

    let mut width = 0;
    let mut buf = [0; 4];
    for (offset, c) in s.char_indices() {
        width += encoding.encode(c.encode_utf8(&mut buf)).0.len();
        if width > max_width {
            return &s[..offset];
        }
    }
    s
}

/// Prepares `value` to be written to `column`.
///
/// The value's type must match the column's.
pub fn encode<'a>(
    column: &Column,
    value: &'a Value,
    options: &ExportOptions,
) -> Result<Encoded<'a>, Error> {
    if value.storage_type() != column.storage_type {
        return Err(Error::CellType {
            column: column.name.clone(),
            column_type: column.storage_type,
            value_type: value.storage_type(),
        });
    }
    if value.is_missing_sentinel() {
        return Ok(Encoded::Missing);
    }
    let legacy = options.integer_width == IntegerWidthPolicy::Legacy8Bit;
    Ok(match value {
        Value::String(s) => {
            let truncated = truncate_to_width(s, options.string_width, options.encoding);
            if truncated.len() < s.len() {
                debug!(
                    "Truncating {}-byte value for {} to {} bytes.",
                    s.len(),
                    column.name,
                    truncated.len()
                );
            }
            Encoded::String(truncated)
        }
        Value::Int8(i) => Encoded::Int8(*i),
        Value::Int16(i) if legacy => Encoded::Int8(*i as i8),
        Value::Int16(i) => Encoded::Int16(*i),
        Value::Int32(i) if legacy => Encoded::Int8(*i as i8),
        Value::Int32(i) => Encoded::Int32(*i),
        Value::Float(x) => Encoded::Float(*x),
        Value::Double(x) => Encoded::Double(*x),
    })
}

#[cfg(test)]
mod tests {
    use encoding_rs::{UTF_8, WINDOWS_1252};

    use crate::{
        data::{CellValue, Value},
        dispatch::{
            decode, encode, truncate_to_width, Encoded, IntegerWidthPolicy, StringEscaping,
        },
        error::Error,
        export::ExportOptions,
        import::ImportOptions,
        variable::{Column, StorageType, TypeCode},
    };

    fn decode_present(name: &str, value: Value) -> Option<String> {
        decode(name, CellValue::Present(&value), &ImportOptions::new())
    }

    #[test]
    fn decode_values() {
        assert_eq!(decode_present("s", Value::from("x")).unwrap(), r#""s":"x""#);
        assert_eq!(decode_present("a", Value::Int8(-3)).unwrap(), r#""a":-3"#);
        assert_eq!(decode_present("a", Value::Int16(1234)).unwrap(), r#""a":1234"#);
        assert_eq!(
            decode_present("a", Value::Int32(-70000)).unwrap(),
            r#""a":-70000"#
        );
        assert_eq!(
            decode_present("f", Value::Float(1.5)).unwrap(),
            r#""f":1.500000"#
        );
        assert_eq!(
            decode_present("d", Value::Double(-2.25)).unwrap(),
            r#""d":-2.250000"#
        );
    }

    #[test]
    fn decode_missing() {
        let options = ImportOptions::new();
        for (storage_type, expected) in [
            (StorageType::String, r#""v":"""#),
            (StorageType::Int8, r#""v":0"#),
            (StorageType::Int16, r#""v":0"#),
            (StorageType::Int32, r#""v":0"#),
            (StorageType::Float, r#""v":0.0"#),
            (StorageType::Double, r#""v":0.0"#),
        ] {
            assert_eq!(
                decode("v", CellValue::SystemMissing(storage_type), &options).unwrap(),
                expected
            );
        }
    }

    #[test]
    fn decode_unsupported() {
        assert_eq!(
            decode(
                "r",
                CellValue::Unsupported(TypeCode::STRING_REF),
                &ImportOptions::new()
            ),
            None
        );
    }

    #[test]
    fn decode_escaping() {
        let value = Value::from("say \"hi\"\n");
        assert_eq!(
            decode("q\"", CellValue::Present(&value), &ImportOptions::new()).unwrap(),
            r#""q\"":"say \"hi\"\n""#
        );
        let legacy = ImportOptions::new().with_strings(StringEscaping::Legacy);
        assert_eq!(
            decode("q", CellValue::Present(&value), &legacy).unwrap(),
            "\"q\":\"say \"hi\"\n\""
        );
    }

    #[test]
    fn decode_precision_and_non_finite() {
        let options = ImportOptions::new().with_float_precision(2);
        let value = Value::Double(3.14159);
        assert_eq!(
            decode("pi", CellValue::Present(&value), &options).unwrap(),
            r#""pi":3.14"#
        );
        let value = Value::Double(f64::NAN);
        assert_eq!(
            decode("x", CellValue::Present(&value), &options).unwrap(),
            r#""x":0.0"#
        );
    }

    #[test]
    fn encode_missing_sentinels() {
        let options = ExportOptions::new();
        for value in [
            Value::from(""),
            Value::Int8(0),
            Value::Int16(0),
            Value::Int32(0),
            Value::Float(0.0),
            Value::Double(0.0),
        ] {
            let column = Column::new("v", value.storage_type());
            assert_eq!(encode(&column, &value, &options).unwrap(), Encoded::Missing);
        }
    }

    #[test]
    fn encode_values() {
        let options = ExportOptions::new();
        let cases = [
            (Value::from("abc"), Encoded::String("abc")),
            (Value::Int8(5), Encoded::Int8(5)),
            (Value::Int16(300), Encoded::Int16(300)),
            (Value::Int32(-100000), Encoded::Int32(-100000)),
            (Value::Float(2.5), Encoded::Float(2.5)),
            (Value::Double(1e300), Encoded::Double(1e300)),
        ];
        for (value, expected) in &cases {
            let column = Column::new("v", value.storage_type());
            assert_eq!(&encode(&column, value, &options).unwrap(), expected);
        }
    }

    #[test]
    fn encode_legacy_integers() {
        let options = ExportOptions::new().with_integer_width(IntegerWidthPolicy::Legacy8Bit);
        let column = Column::new("v", StorageType::Int16);
        assert_eq!(
            encode(&column, &Value::Int16(100), &options).unwrap(),
            Encoded::Int8(100)
        );
        assert_eq!(
            encode(&column, &Value::Int16(300), &options).unwrap(),
            Encoded::Int8(44)
        );
        let column = Column::new("v", StorageType::Int32);
        assert_eq!(
            encode(&column, &Value::Int32(-1), &options).unwrap(),
            Encoded::Int8(-1)
        );
    }

    #[test]
    fn encode_type_mismatch() {
        let column = Column::new("age", StorageType::Int32);
        assert!(matches!(
            encode(&column, &Value::from("x"), &ExportOptions::new()),
            Err(Error::CellType {
                column_type: StorageType::Int32,
                value_type: StorageType::String,
                ..
            })
        ));
    }

    #[test]
    fn encode_truncates_text() {
        let options = ExportOptions::new();
        let long = Value::String("x".repeat(300));
        let column = Column::new("s", StorageType::String).with_declared_width(1000);
        let Encoded::String(s) = encode(&column, &long, &options).unwrap() else {
            panic!()
        };
        assert_eq!(s.len(), 255);
    }

    #[test]
    fn truncation_respects_characters() {
        // "é" is two bytes in UTF-8 and one in windows-1252.
        assert_eq!(truncate_to_width("aéé", 4, UTF_8), "aé");
        assert_eq!(truncate_to_width("aéé", 2, UTF_8), "a");
        assert_eq!(truncate_to_width("aéé", 3, WINDOWS_1252), "aéé");
        assert_eq!(truncate_to_width("aéé", 2, WINDOWS_1252), "aé");
        assert_eq!(truncate_to_width("short", 255, UTF_8), "short");
        assert_eq!(truncate_to_width("", 0, UTF_8), "");
    }
}
