use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use super::error::SampleLogError;
use super::record::Record;

/// Append-only JSON-lines sink for polled records. Never read back.
#[derive(Debug, Clone)]
pub struct SampleLog {
    path: PathBuf,
}

impl SampleLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn append(&self, record: &Record) -> Result<(), SampleLogError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&line)?;
        Ok(())
    }
}
