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

use anyhow::{anyhow, Result};
use clap::Args;
use savbridge::{
    codec::FixtureCodec, codegen::generate_struct, config::Config, read_header, HeaderItem,
};

/// Generate a Rust struct that deserializes the rows of a data file.
#[derive(Args, Clone, Debug)]
pub struct Generate {
    /// Input file name.
    input: PathBuf,

    /// Output file name (if omitted, output is written to stdout).
    output: Option<PathBuf>,

    /// Name of the generated struct.
    #[arg(long, default_value = "DataItem")]
    struct_name: String,
}

impl Generate {
    pub fn run(self, _config: Config) -> Result<()> {
        let mut header: Vec<HeaderItem> = Vec::new();
        read_header(&FixtureCodec::new(), &self.input, &mut header)?;
        let source = generate_struct(&header, &self.struct_name)
            .map_err(|error| anyhow!("{}: {error}", self.input.display()))?;

        let mut output: Box<dyn Write> = match &self.output {
            Some(path) => Box::new(File::create(path)?),
            None => Box::new(stdout()),
        };
        output.write_all(source.as_bytes())?;
        output.flush()?;
        Ok(())
    }
}
