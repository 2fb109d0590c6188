//! Command output, either for humans or for machines.
//!
//! Diagnostics go through `tracing` to stderr. Results are written to the
//! main writer, and anything interactive, like confirmation prompts, to a
//! separate one so that piped or JSON output stays clean.

use clap::ValueEnum;
use comfy_table::Table;
use serde::Serialize;
use std::fmt::Display;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    #[default]
    Text,
    Json,
}

pub struct Output {
    format: Format,
    writer: Box<dyn Write + Send>,
    prompts: Box<dyn Write + Send>,
}

impl Output {
    pub fn new(
        format: Format,
        writer: Box<dyn Write + Send>,
        prompts: Box<dyn Write + Send>,
    ) -> Self {
        Output {
            format,
            writer,
            prompts,
        }
    }

    pub fn stdout(format: Format) -> Self {
        Self::new(format, Box::new(io::stdout()), Box::new(io::stderr()))
    }

    pub fn is_json(&self) -> bool {
        self.format == Format::Json
    }

    pub fn line<T: Display>(&mut self, x: T) -> io::Result<()> {
        writeln!(self.writer, "{}", x)
    }

    /// A line for whoever is at the terminal rather than for the result.
    pub fn notice<T: Display>(&mut self, x: T) -> io::Result<()> {
        writeln!(self.prompts, "{}", x)
    }

    /// Written without a trailing newline, so the answer is typed on the same
    /// line.
    pub fn prompt(&mut self, x: &str) -> io::Result<()> {
        write!(self.prompts, "{}", x)?;
        self.prompts.flush()
    }

    /// Pretty-printed, followed by a newline.
    pub fn json<T: Serialize>(&mut self, x: &T) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, x)?;
        writeln!(self.writer)
    }

    pub fn key_value<T: Display>(&mut self, key: &str, value: T) -> io::Result<()> {
        writeln!(self.writer, "{:<12}  {}", format!("{}:", key), value)
    }

    pub fn table(&mut self, table: &Table) -> io::Result<()> {
        writeln!(self.writer, "{}", table)
    }
}
