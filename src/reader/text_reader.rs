use crate::error::{MidCsvError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::task;

/// An input file read fully into memory, owned for one conversion.
#[derive(Debug, Clone)]
pub struct TextDocument {
    pub source_path: PathBuf,
    pub filename: String,
    pub size: u64,
    pub content: String,
}

impl TextDocument {
    pub fn display_path(&self) -> String {
        self.source_path.display().to_string()
    }
}

/// Reads a text file as UTF-8 with a size guard.
///
/// Reading is the only suspension point in the pipeline: `read` is a
/// single-shot asynchronous operation returning the document or one error,
/// never retried. The extraction that follows is synchronous.
#[derive(Debug, Clone)]
pub struct TextReader {
    max_file_size: u64,
}

impl TextReader {
    pub fn new() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
        }
    }

    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Reads `path` on the blocking pool.
    pub async fn read<P: AsRef<Path>>(&self, path: P) -> Result<TextDocument> {
        let reader = self.clone();
        let path = path.as_ref().to_path_buf();

        task::spawn_blocking(move || reader.read_sync(&path))
            .await
            .map_err(|e| MidCsvError::Config {
                message: format!("Read task failed: {}", e),
            })?
    }

    pub fn read_sync(&self, path: &Path) -> Result<TextDocument> {
        let metadata = fs::metadata(path).map_err(|e| MidCsvError::Read {
            path: path.display().to_string(),
            source: e,
        })?;

        if !metadata.is_file() {
            return Err(MidCsvError::InvalidInput {
                path: path.display().to_string(),
            });
        }

        if metadata.len() > self.max_file_size {
            return Err(MidCsvError::FileTooLarge {
                size: metadata.len(),
                max_size: self.max_file_size,
            });
        }

        let bytes = fs::read(path).map_err(|e| MidCsvError::Read {
            path: path.display().to_string(),
            source: e,
        })?;

        let content = String::from_utf8(bytes).map_err(|_| MidCsvError::InvalidEncoding {
            path: path.display().to_string(),
        })?;

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        Ok(TextDocument {
            source_path: path.to_path_buf(),
            filename,
            size: metadata.len(),
            content,
        })
    }
}

impl Default for TextReader {
    fn default() -> Self {
        Self::new()
    }
}
