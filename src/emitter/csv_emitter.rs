use crate::error::{MidCsvError, Result};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Computes the output file name from the input file name.
///
/// A terminal `.txt` extension (any ASCII case) is replaced by `.csv`;
/// any other name gets `.csv` appended, so the emitted file always
/// carries a `.csv` suffix.
pub fn derive_csv_name(input_name: &str) -> String {
    let stem = input_name
        .len()
        .checked_sub(4)
        .and_then(|split| input_name.get(split..).map(|tail| (split, tail)))
        .filter(|(_, tail)| tail.eq_ignore_ascii_case(".txt"))
        .map(|(split, _)| &input_name[..split])
        .unwrap_or(input_name);

    format!("{}.csv", stem)
}

/// Writes the serialized CSV body to disk.
///
/// Output is UTF-8, written through a buffer in fixed-size chunks so a
/// progress callback can observe large writes. An existing destination is
/// refused unless overwriting was requested.
pub struct CsvEmitter {
    base_directory: PathBuf,
    force_overwrite: bool,
    buffer_size: usize,
}

impl CsvEmitter {
    pub fn new<P: Into<PathBuf>>(base_directory: P) -> Self {
        Self {
            base_directory: base_directory.into(),
            force_overwrite: false,
            buffer_size: 64 * 1024,
        }
    }

    pub fn with_force_overwrite(mut self, force: bool) -> Self {
        self.force_overwrite = force;
        self
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(4096);
        self
    }

    /// Resolves where the CSV lands: an explicit `--output` value wins
    /// (bare names are placed in the base directory), otherwise the name
    /// is derived from the input file name.
    pub fn resolve_output_path(&self, input: &Path, explicit: Option<&Path>) -> Result<PathBuf> {
        let dest = match explicit {
            Some(path) if path.components().count() > 1 || path.is_absolute() => {
                path.to_path_buf()
            }
            Some(name) => self.base_directory.join(name),
            None => {
                let input_name = input
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| MidCsvError::InvalidPath {
                        path: input.display().to_string(),
                    })?;
                self.base_directory.join(derive_csv_name(input_name))
            }
        };

        self.validate_destination(&dest)?;
        Ok(dest)
    }

    /// Writes `document` to `dest`, returning the byte count written.
    pub fn emit(
        &self,
        document: &str,
        dest: &Path,
        progress_callback: Option<&dyn Fn(u64)>,
    ) -> Result<u64> {
        if dest.exists() && !self.force_overwrite {
            return Err(MidCsvError::OutputFileExists {
                path: dest.display().to_string(),
            });
        }

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(MidCsvError::Io)?;
            }
        }

        let file = fs::File::create(dest).map_err(MidCsvError::Io)?;
        let mut writer = BufWriter::with_capacity(self.buffer_size, file);

        let mut total_bytes = 0u64;
        for chunk in document.as_bytes().chunks(8192) {
            writer.write_all(chunk).map_err(MidCsvError::Io)?;
            total_bytes += chunk.len() as u64;

            if let Some(callback) = progress_callback {
                callback(total_bytes);
            }
        }

        writer.flush().map_err(MidCsvError::Io)?;
        Ok(total_bytes)
    }

    fn validate_destination(&self, path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();

        if path_str.len() > 4096 {
            return Err(MidCsvError::InvalidPath {
                path: format!("Path too long: {} characters", path_str.len()),
            });
        }

        if let Some(filename) = path.file_name().and_then(|s| s.to_str()) {
            let invalid_chars = ['<', '>', ':', '"', '|', '?', '*'];
            if filename
                .chars()
                .any(|c| invalid_chars.contains(&c) || c.is_control() || c == '\0')
            {
                return Err(MidCsvError::InvalidPath {
                    path: format!("Filename contains invalid characters: {}", filename),
                });
            }

            if filename.ends_with(' ') || filename.ends_with('.') {
                return Err(MidCsvError::InvalidPath {
                    path: format!("Filename cannot end with space or dot: {}", filename),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_derive_csv_name_replaces_txt_extension() {
        assert_eq!(derive_csv_name("accounts.txt"), "accounts.csv");
        assert_eq!(derive_csv_name("accounts.TXT"), "accounts.csv");
        assert_eq!(derive_csv_name("accounts.Txt"), "accounts.csv");
    }

    #[test]
    fn test_derive_csv_name_appends_when_no_txt_extension() {
        assert_eq!(derive_csv_name("accounts"), "accounts.csv");
        assert_eq!(derive_csv_name("notes.md"), "notes.md.csv");
        assert_eq!(derive_csv_name("archive.txt.bak"), "archive.txt.bak.csv");
    }

    #[test]
    fn test_emit_writes_document_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("accounts.csv");

        let emitter = CsvEmitter::new(temp_dir.path());
        let bytes = emitter
            .emit("1234 5678 9012345\n0000 1111 2222222", &dest, None)
            .unwrap();

        assert_eq!(bytes, 35);
        let written = fs::read_to_string(&dest).unwrap();
        assert_eq!(written, "1234 5678 9012345\n0000 1111 2222222");
        assert!(!written.ends_with('\n'));
    }

    #[test]
    fn test_emit_refuses_existing_destination() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("accounts.csv");
        fs::write(&dest, "old").unwrap();

        let emitter = CsvEmitter::new(temp_dir.path());
        let result = emitter.emit("new", &dest, None);
        assert!(matches!(result, Err(MidCsvError::OutputFileExists { .. })));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "old");
    }

    #[test]
    fn test_emit_overwrites_with_force() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("accounts.csv");
        fs::write(&dest, "old").unwrap();

        let emitter = CsvEmitter::new(temp_dir.path()).with_force_overwrite(true);
        emitter.emit("new", &dest, None).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
    }

    #[test]
    fn test_resolve_output_path_derives_from_input() {
        let temp_dir = TempDir::new().unwrap();
        let emitter = CsvEmitter::new(temp_dir.path());

        let dest = emitter
            .resolve_output_path(Path::new("/data/accounts.txt"), None)
            .unwrap();
        assert_eq!(dest, temp_dir.path().join("accounts.csv"));
    }

    #[test]
    fn test_resolve_output_path_with_explicit_name() {
        let temp_dir = TempDir::new().unwrap();
        let emitter = CsvEmitter::new(temp_dir.path());

        let dest = emitter
            .resolve_output_path(Path::new("accounts.txt"), Some(Path::new("mids.csv")))
            .unwrap();
        assert_eq!(dest, temp_dir.path().join("mids.csv"));
    }

    #[test]
    fn test_resolve_output_path_rejects_invalid_filename() {
        let temp_dir = TempDir::new().unwrap();
        let emitter = CsvEmitter::new(temp_dir.path());

        let result =
            emitter.resolve_output_path(Path::new("accounts.txt"), Some(Path::new("bad|name.csv")));
        assert!(matches!(result, Err(MidCsvError::InvalidPath { .. })));
    }

    #[test]
    fn test_emit_reports_progress() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("accounts.csv");
        let emitter = CsvEmitter::new(temp_dir.path());

        let seen = std::cell::Cell::new(0u64);
        let callback = |bytes: u64| seen.set(bytes);
        emitter.emit("0000 1111 2222222", &dest, Some(&callback)).unwrap();

        assert_eq!(seen.get(), 17);
    }
}
