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
    io::{stdout, Write},
    path::PathBuf,
};

use anyhow::Result;
use clap::Args;
use savbridge::{codec::FixtureCodec, config::Config, read_header, HeaderItem};

/// Show the columns of a data file.
#[derive(Args, Clone, Debug)]
pub struct Show {
    /// File to show.
    input: PathBuf,

    /// Write one JSON object per column instead of aligned text.
    #[arg(long)]
    json: bool,
}

impl Show {
    pub fn run(self, _config: Config) -> Result<()> {
        let mut items: Vec<HeaderItem> = Vec::new();
        read_header(&FixtureCodec::new(), &self.input, &mut items)?;

        let mut output = stdout().lock();
        if self.json {
            for item in &items {
                serde_json::to_writer(&mut output, item)?;
                writeln!(output)?;
            }
        } else {
            let name_width = items.iter().map(|item| item.name.len()).max().unwrap_or(0);
            for item in &items {
                let type_name = match item.type_code.storage_type() {
                    Some(storage_type) => storage_type.to_string(),
                    None => item.type_code.to_string(),
                };
                writeln!(
                    output,
                    "{:>4}  {:name_width$}  {type_name:<16}  {:>5}",
                    item.index, item.name, item.width
                )?;
            }
        }
        Ok(())
    }
}
