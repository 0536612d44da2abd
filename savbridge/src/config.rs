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

//! Configuration files.
//!
//! A configuration file is TOML with optional `[import]` and `[export]`
//! tables whose keys are the fields of [ImportOptions] and [ExportOptions]:
//!
//! ```toml
//! [import]
//! float_precision = 3
//! row_separator = ",\n"
//!
//! [export]
//! string_width = 128
//! integer_width = "legacy-8-bit"
//! encoding = "windows-1252"
//! ```

use std::{fs::read_to_string, io::Error as IoError, path::{Path, PathBuf}};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use crate::{export::ExportOptions, import::ImportOptions};

/// An error reading a configuration file.
#[derive(ThisError, Debug)]
pub enum ConfigError {
    #[error("{path}: {source}")]
    Read { path: PathBuf, source: IoError },

    #[error("{path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Options for both directions of conversion.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub import: ImportOptions,
    pub export: ExportOptions,
}

impl Config {
    /// Parses configuration from TOML `source`.
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Reads configuration from the TOML file at `path`.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let source = read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Read configuration from {}.", path.display());
        Ok(config)
    }

    /// Reads configuration from `path`, if it is present, and otherwise
    /// returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }
}
