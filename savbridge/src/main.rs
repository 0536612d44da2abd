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

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use encoding_rs::Encoding;
use savbridge::config::Config;
use thiserror::Error as ThisError;

use crate::{convert::Convert, create::Create, generate::Generate, show::Show};

mod convert;
mod create;
mod generate;
mod show;

/// Converts statistical data files to and from JSON.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML file with `[import]` and `[export]` options.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Debug)]
enum Command {
    Convert(Convert),
    Show(Show),
    Create(Create),
    Generate(Generate),
}

impl Command {
    fn run(self, config: Config) -> Result<()> {
        match self {
            Command::Convert(convert) => convert.run(config),
            Command::Show(show) => show.run(config),
            Command::Create(create) => create.run(config),
            Command::Generate(generate) => generate.run(config),
        }
    }
}

#[derive(ThisError, Debug)]
#[error("{0}: unknown encoding")]
struct UnknownEncodingError(String);

fn parse_encoding(arg: &str) -> Result<&'static Encoding, UnknownEncodingError> {
    match Encoding::for_label_no_replacement(arg.as_bytes()) {
        Some(encoding) => Ok(encoding),
        None => Err(UnknownEncodingError(arg.to_string())),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    cli.command.run(config)
}
