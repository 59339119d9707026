//! Result sinks.
//!
//! ## Module Structure
//!
//! - `jsonl`: JSON-lines writer (primary stream plus data-members projection)
//! - `memory`: In-memory collector

mod jsonl;
mod memory;

use std::io;
use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::core::{LogCallback, ScanError, ScanOptions, ScanResult, ScanSummary, scan};

pub use jsonl::JsonlSink;
pub use memory::MemorySink;

/// Destination for scan results, fed one result at a time.
pub trait ResultSink {
    /// Write one result. Called in emission order.
    fn write_result(&mut self, result: &ScanResult) -> io::Result<()>;

    /// Called once after the last result of a successful scan.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run a scan streaming every result into `sink`.
pub fn scan_into<S: ResultSink + ?Sized>(
    root: &Path,
    options: &ScanOptions,
    sink: &mut S,
    on_log: LogCallback<'_>,
    cancellation: &CancellationToken,
) -> Result<ScanSummary, ScanError> {
    let summary = scan(
        root,
        options,
        &mut |result| sink.write_result(&result),
        on_log,
        cancellation,
    )?;
    sink.finish()?;
    Ok(summary)
}
