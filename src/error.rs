use thiserror::Error;

#[derive(Error, Debug)]
pub enum MidCsvError {
    #[error("Failed to read input file: {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Input file is not valid UTF-8 text: {path}")]
    InvalidEncoding { path: String },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input is not a usable text file: {path}")]
    InvalidInput { path: String },

    #[error("File too large: {size} bytes (max: {max_size} bytes)")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Output file already exists: {path}")]
    OutputFileExists { path: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for MidCsvError {
    fn user_message(&self) -> String {
        match self {
            // All read-side failures collapse into the one generic message
            // the user sees; the cause stays in the error source chain.
            MidCsvError::Read { .. } | MidCsvError::InvalidEncoding { .. } => {
                "Error processing the file. Please check the file format.".to_string()
            }
            MidCsvError::InvalidInput { path } => {
                format!("Input is not a usable text file: {}", path)
            }
            MidCsvError::FileTooLarge { size, max_size } => {
                format!(
                    "File too large: {} (maximum allowed: {})",
                    format_bytes(*size),
                    format_bytes(*max_size)
                )
            }
            MidCsvError::InvalidPath { path } => {
                format!("Invalid file path: {}", path)
            }
            MidCsvError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            MidCsvError::OutputFileExists { path } => {
                format!("Output file already exists: {}", path)
            }
            MidCsvError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            MidCsvError::Read { .. } => Some(
                "Check that the file exists and is readable, then try again.".to_string(),
            ),
            MidCsvError::InvalidEncoding { .. } => Some(
                "The input must be plain UTF-8 text. Re-save the file as UTF-8 and try again."
                    .to_string(),
            ),
            MidCsvError::InvalidInput { .. } => Some(
                "Provide a path to a .txt file, or pass --force to convert a file with a different extension.".to_string(),
            ),
            MidCsvError::FileTooLarge { .. } => Some(
                "Increase the limit with --max-size or split the input into smaller files.".to_string(),
            ),
            MidCsvError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string(),
            ),
            MidCsvError::OutputFileExists { .. } => Some(
                "Remove the existing file, choose a different name with --output, or use --force to overwrite.".to_string(),
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for MidCsvError {
    fn from(error: toml::de::Error) -> Self {
        MidCsvError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MidCsvError>;

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
