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

//! Generates a Rust record struct matching a data file's header.

use std::collections::HashSet;

use itertools::Itertools;
use log::debug;

use crate::{error::Error, header::HeaderItem, variable::StorageType};

/// Rust keywords that can be used as raw identifiers.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe",
    "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers.
const RESERVED: &[&str] = &["crate", "self", "super", "Self", "_"];

fn rust_type(storage_type: StorageType) -> &'static str {
    match storage_type {
        StorageType::String => "String",
        StorageType::Int8 => "i8",
        StorageType::Int16 => "i16",
        StorageType::Int32 => "i32",
        StorageType::Float => "f32",
        StorageType::Double => "f64",
    }
}

/// Converts a column name such as `HouseholdID` or `Q1.a` into a snake-case
/// identifier such as `household_id` or `q1_a`.
fn snake_case(name: &str) -> String {
    let chars = name.chars().collect::<Vec<_>>();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() {
            if c.is_uppercase() && i > 0 {
                let prev = chars[i - 1];
                let next_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
                if prev.is_lowercase()
                    || prev.is_numeric()
                    || (prev.is_uppercase() && next_lower)
                {
                    out.push('_');
                }
            }
            out.extend(c.to_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("field");
    }
    if out.starts_with(|c: char| c.is_numeric()) {
        out.insert(0, '_');
    }
    out
}

fn field_name(name: &str, used: &mut HashSet<String>) -> String {
    let base = snake_case(name);
    let mut candidate = base.clone();
    let mut suffix = 2;
    while used.contains(&candidate) {
        candidate = format!("{base}_{suffix}");
        suffix += 1;
    }
    used.insert(candidate.clone());
    if KEYWORDS.contains(&candidate.as_str()) {
        format!("r#{candidate}")
    } else if RESERVED.contains(&candidate.as_str()) {
        format!("{candidate}_")
    } else {
        candidate
    }
}

/// Returns the source of a struct named `struct_name` with one field per
/// item in `header`, in order, that deserializes the rows produced by
/// importing the file that `header` describes.
pub fn generate_struct(header: &[HeaderItem], struct_name: &str) -> Result<String, Error> {
    if header.is_empty() {
        return Err(Error::EmptyHeader);
    }

    let mut used = HashSet::new();
    let fields = header
        .iter()
        .map(|item| {
            let storage_type = item
                .type_code
                .storage_type()
                .ok_or(Error::UnsupportedType(item.type_code))?;
            Ok(format!(
                "    #[serde(rename = {:?})]\n    pub {}: {},\n",
                item.name,
                field_name(&item.name, &mut used),
                rust_type(storage_type)
            ))
        })
        .collect::<Result<Vec<_>, Error>>()?;
    debug!("Generated {} fields for {struct_name}.", fields.len());

    Ok(format!(
        "#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]\npub struct {struct_name} {{\n{}}}\n",
        fields.iter().join("")
    ))
}
