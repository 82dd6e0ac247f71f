use crate::error::{MidCsvError, Result};
use crate::reader::TextDocument;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub input: InputInfo,
    pub summary: ConversionSummary,
    pub output_path: Option<String>,
    pub converted_at: DateTime<Utc>,
    pub warnings: Vec<String>,
    pub config_used: ConfigSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    pub path: String,
    pub filename: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionSummary {
    pub rows_extracted: usize,
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub duration: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub max_file_size: u64,
    pub base_directory: String,
    pub generate_report: bool,
}

impl From<&TextDocument> for InputInfo {
    fn from(document: &TextDocument) -> Self {
        Self {
            path: document.display_path(),
            filename: document.filename.clone(),
            size: document.size,
        }
    }
}

impl ConversionReport {
    pub fn new(
        document: &TextDocument,
        rows_extracted: usize,
        bytes_written: u64,
        output_path: Option<&Path>,
        duration: Duration,
        config: ConfigSnapshot,
    ) -> Self {
        let mut warnings = Vec::new();
        if rows_extracted == 0 {
            warnings.push("No merchant IDs found; no output file was written".to_string());
        }

        Self {
            input: InputInfo::from(document),
            summary: ConversionSummary {
                rows_extracted,
                bytes_read: document.size,
                bytes_written,
                duration,
            },
            output_path: output_path.map(|p| p.display().to_string()),
            converted_at: Utc::now(),
            warnings,
            config_used: config,
        }
    }

    /// Saves the report as a JSON sidecar next to the output file.
    pub fn save_json_sidecar(&self, output_path: &Path) -> Result<()> {
        let mut sidecar = output_path.as_os_str().to_owned();
        sidecar.push(".report.json");

        let json_content =
            serde_json::to_string_pretty(self).map_err(|e| MidCsvError::Config {
                message: format!("Failed to serialize report to JSON: {}", e),
            })?;

        fs::write(sidecar, json_content).map_err(MidCsvError::Io)?;
        Ok(())
    }
}
