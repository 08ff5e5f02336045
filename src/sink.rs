//! Where finished reports go. A sink either stores the whole document or
//! fails without leaving anything behind.

use crate::error::ReportError;
use base64::Engine;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub trait ReportSink {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<(), ReportError>;
}

/// Writes into a directory through a `.part` file that is renamed into place
/// once complete.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            saved: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, oldest first.
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }

    fn write_atomically(&self, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut part = target.as_os_str().to_owned();
        part.push(".part");
        let part = PathBuf::from(part);
        let result = (|| {
            let mut file = fs::File::create(&part)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            fs::rename(&part, target)
        })();
        if result.is_err() {
            let _ = fs::remove_file(&part);
        }
        result
    }
}

impl ReportSink for FileSink {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<(), ReportError> {
        if filename.is_empty() || filename.contains(['/', '\\']) {
            return Err(ReportError::Save(format!(
                "refusing to write unsafe filename {:?}",
                filename
            )));
        }
        let target = self.dir.join(filename);
        self.write_atomically(&target, bytes).map_err(|err| {
            ReportError::Save(format!("{}: {}", target.display(), err))
        })?;
        log::info!("saved report to {}", target.display());
        self.saved.push(target);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Keeps reports in memory. Used by tests and embedding hosts.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub files: Vec<SavedFile>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&SavedFile> {
        self.files.last()
    }
}

impl ReportSink for MemorySink {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<(), ReportError> {
        self.files.push(SavedFile {
            filename: filename.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

/// Produces `data:application/pdf;base64,...` URIs for hosts that trigger a
/// browser download from a link.
#[derive(Debug, Default, Clone)]
pub struct DataUriSink {
    pub downloads: Vec<(String, String)>,
}

impl DataUriSink {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn pdf_data_uri(bytes: &[u8]) -> String {
    format!(
        "data:application/pdf;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

impl ReportSink for DataUriSink {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<(), ReportError> {
        self.downloads
            .push((filename.to_string(), pdf_data_uri(bytes)));
        Ok(())
    }
}
