use crate::error::AppResult;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Destination for a finished calendar document
pub trait DocumentSink {
    fn write(&self, document: &str) -> AppResult<()>;
}

/// Writes the document to a file, adding `.ics` when the path has no extension
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let mut path = path.as_ref().to_path_buf();
        if path.extension().is_none() {
            path.set_extension("ics");
        }
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentSink for FileSink {
    fn write(&self, document: &str) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, document)?;
        info!("Saved calendar file to {}", self.path.display());
        Ok(())
    }
}

/// Prints the document on standard output
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl DocumentSink for StdoutSink {
    fn write(&self, document: &str) -> AppResult<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(document.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}
