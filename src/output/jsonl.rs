//! JSON-lines output.
//!
//! Every result becomes one line of the primary stream. Data contracts with
//! data members are also written to the optional data-members stream. Lines
//! are flushed as they are written so a failed scan keeps its partial output.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};

use super::ResultSink;
use crate::core::{ContractKind, ScanResult};

pub struct JsonlSink {
    primary: Box<dyn Write>,
    data_members: Option<Box<dyn Write>>,
}

impl JsonlSink {
    /// Create (or truncate) the output files, creating parent directories.
    pub fn create(output: &Path, data_members_output: Option<&Path>) -> Result<Self> {
        let primary = Box::new(create_file(output)?);
        let data_members = match data_members_output {
            Some(path) => Some(Box::new(create_file(path)?) as Box<dyn Write>),
            None => None,
        };
        Ok(Self {
            primary,
            data_members,
        })
    }

    /// Primary stream to stdout, no data-members stream.
    pub fn stdout() -> Self {
        Self {
            primary: Box::new(io::stdout()),
            data_members: None,
        }
    }
}

fn create_file(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn write_line(writer: &mut dyn Write, result: &ScanResult) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, result)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

impl ResultSink for JsonlSink {
    fn write_result(&mut self, result: &ScanResult) -> io::Result<()> {
        write_line(&mut *self.primary, result)?;

        let has_members =
            result.kind == ContractKind::DataContract && result.data_members.is_some();
        if let Some(writer) = self.data_members.as_mut().filter(|_| has_members) {
            write_line(&mut **writer, result)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        if let Some(writer) = self.data_members.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}
