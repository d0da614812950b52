//! JSON file output

use crate::model::ResultRecord;
use crate::output::{OutputError, OutputHandler, OutputResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Writes records as a pretty-printed JSON array
///
/// The file is written to a temporary sibling first and then renamed into
/// place, so a crash never leaves a truncated results file behind.
#[derive(Debug, Clone)]
pub struct JsonOutput {
    path: PathBuf,
}

impl JsonOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputHandler for JsonOutput {
    fn write_records(&self, records: &[ResultRecord]) -> OutputResult<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;

        let json = serde_json::to_string_pretty(records)?;

        let mut file = NamedTempFile::new_in(&parent)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()?;
        file.persist(&self.path)
            .map_err(|e| OutputError::Write(format!("{}: {}", self.path.display(), e)))?;

        tracing::info!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}
