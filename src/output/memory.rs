use std::io;

use super::ResultSink;
use crate::core::ScanResult;

/// Collects results in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    results: Vec<ScanResult>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_results(self) -> Vec<ScanResult> {
        self.results
    }
}

impl ResultSink for MemorySink {
    fn write_result(&mut self, result: &ScanResult) -> io::Result<()> {
        self.results.push(result.clone());
        Ok(())
    }
}
