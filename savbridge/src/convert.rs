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

use std::{
    fs::File,
    io::{stdout, Write},
    path::PathBuf,
};

use anyhow::Result;
use clap::Args;
use savbridge::{codec::FixtureCodec, config::Config, dispatch::StringEscaping};

/// Convert a data file into a JSON array of row objects.
#[derive(Args, Clone, Debug)]
pub struct Convert {
    /// Input file name.
    input: PathBuf,

    /// Output file name (if omitted, output is written to stdout).
    output: Option<PathBuf>,

    /// Number of digits written after the decimal point of real numbers.
    #[arg(long)]
    float_precision: Option<usize>,

    /// Write strings and names without JSON escaping, as older tools did.
    #[arg(long)]
    legacy_strings: bool,

    /// Text written between row objects.
    #[arg(long)]
    row_separator: Option<String>,
}

impl Convert {
    pub fn run(self, config: Config) -> Result<()> {
        let mut options = config.import;
        if let Some(float_precision) = self.float_precision {
            options = options.with_float_precision(float_precision);
        }
        if self.legacy_strings {
            options = options.with_strings(StringEscaping::Legacy);
        }
        if let Some(row_separator) = self.row_separator {
            options = options.with_row_separator(row_separator);
        }

        let mut lines: Vec<String> = Vec::new();
        options.import_file(&FixtureCodec::new(), &self.input, &mut lines)?;

        let mut output: Box<dyn Write> = match &self.output {
            Some(path) => Box::new(File::create(path)?),
            None => Box::new(stdout()),
        };
        for line in lines {
            writeln!(output, "{line}")?;
        }
        output.flush()?;
        Ok(())
    }
}
