pub mod cli;
pub mod config;
pub mod emitter;
pub mod error;
pub mod extractor;
pub mod reader;
pub mod session;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, OutputConfig, ReaderConfig};
pub use error::{MidCsvError, Result, UserFriendlyError};

// Core functionality re-exports
pub use emitter::{derive_csv_name, ConfigSnapshot, ConversionReport, CsvEmitter};
pub use extractor::{serialize, MidMatcher};
pub use reader::{TextDocument, TextReader};
pub use session::{SessionEvent, SessionState};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Main library interface for MidCsv functionality
pub struct MidCsv {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl MidCsv {
    /// Create a new MidCsv instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Create a new MidCsv instance for testing (no signal handler conflicts)
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet);
        let shutdown = GracefulShutdown::new_for_test();

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        }
    }

    /// Create MidCsv instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            crate::cli::OutputFormat::Human => OutputMode::Human,
            crate::cli::OutputFormat::Json => OutputMode::Json,
            crate::cli::OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
    }

    /// Convert one text file into a CSV of merchant IDs.
    ///
    /// Reads the input (the only asynchronous step), extracts MIDs,
    /// serializes them and emits the output file. With zero matches no
    /// file is written and the report records a warning instead.
    pub async fn convert(
        &self,
        input: &Path,
        output: Option<&Path>,
        force_overwrite: bool,
    ) -> Result<ConversionReport> {
        let start_time = Instant::now();

        self.shutdown.check_shutdown()?;
        self.output_formatter.start_operation("Starting MID extraction");

        let filename = input
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();
        let mut session = SessionState::new().apply(SessionEvent::FileSelected { filename });
        self.output_formatter.session_update(&session);

        // Step 1: Read the input file
        let document = match self.read_input(input).await {
            Ok(document) => document,
            Err(e) => {
                session = session.apply(SessionEvent::ReadFailed {
                    message: e.user_message(),
                });
                self.output_formatter.session_update(&session);
                return Err(e);
            }
        };
        self.shutdown.check_shutdown()?;

        // Step 2: Extract merchant IDs (synchronous and pure)
        let matcher = MidMatcher::new();
        let mids = matcher.extract(&document.content);

        session = session.apply(SessionEvent::ReadSucceeded { rows: mids.len() });
        self.output_formatter.session_update(&session);
        self.output_formatter
            .info(&format!("Found {} merchant IDs", mids.len()));

        // Step 3: Serialize and emit, unless there is nothing to download
        let (bytes_written, output_path) = if session.has_content() {
            self.shutdown.check_shutdown()?;
            let (bytes, dest) = self.emit_csv(&mids, input, output, force_overwrite)?;
            (bytes, Some(dest))
        } else {
            self.output_formatter
                .warning("No merchant IDs found; no output file was written");
            (0, None)
        };

        // Step 4: Build the report
        let report = ConversionReport::new(
            &document,
            mids.len(),
            bytes_written,
            output_path.as_deref(),
            start_time.elapsed(),
            self.create_config_snapshot(),
        );

        if self.config.output.generate_report {
            if let Some(ref dest) = output_path {
                report.save_json_sidecar(dest)?;
                self.output_formatter
                    .debug(&format!("Saved report sidecar for {}", dest.display()));
            }
        }

        Ok(report)
    }

    /// Read the input file with a spinner; the sole suspension point.
    async fn read_input(&self, input: &Path) -> Result<TextDocument> {
        self.output_formatter.start_operation("Reading input file");

        let spinner = self
            .progress_manager
            .create_spinner(&format!("Reading {}", input.display()));

        let reader = TextReader::new().with_max_file_size(self.config.reader.max_file_size);
        let result = reader.read(input).await;

        match result {
            Ok(document) => {
                ui::progress::finish_progress_with_summary(
                    &spinner,
                    &format!("Read {} bytes", document.size),
                    spinner.elapsed(),
                );
                Ok(document)
            }
            Err(e) => {
                spinner.abandon_with_message("Read failed".to_string());
                Err(e)
            }
        }
    }

    /// Serialize the match list and write the output file.
    fn emit_csv(
        &self,
        mids: &[String],
        input: &Path,
        output: Option<&Path>,
        force_overwrite: bool,
    ) -> Result<(u64, PathBuf)> {
        self.output_formatter.start_operation("Writing CSV output");

        let body = serialize(mids);

        let csv_emitter = CsvEmitter::new(self.config.output.base_directory.clone())
            .with_force_overwrite(force_overwrite);
        let dest = csv_emitter.resolve_output_path(input, output)?;

        let progress = self
            .progress_manager
            .create_bytes_progress(body.len() as u64, "Writing rows");
        let progress_callback = {
            let pb = progress.clone();
            move |bytes: u64| pb.set_position(bytes)
        };

        let bytes_written = csv_emitter.emit(&body, &dest, Some(&progress_callback))?;

        ui::progress::finish_progress_with_summary(
            &progress,
            &format!("Wrote {} rows", mids.len()),
            progress.elapsed(),
        );

        self.output_formatter.success(&format!(
            "Wrote {} rows to {}",
            mids.len(),
            dest.display()
        ));

        Ok((bytes_written, dest))
    }

    /// Create configuration snapshot for reporting
    fn create_config_snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            max_file_size: self.config.reader.max_file_size,
            base_directory: self.config.output.base_directory.display().to_string(),
            generate_report: self.config.output.generate_report,
        }
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config).map_err(MidCsvError::Io)?;
        Ok(())
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Get progress manager reference
    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    /// Check if shutdown has been requested
    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    /// Request graceful shutdown
    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &MidCsvError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Convenience function to convert a file with minimal setup
pub async fn convert_simple(
    input: &Path,
    output_dir: Option<&Path>,
    verbose: bool,
) -> Result<ConversionReport> {
    let mut config = Config::default();

    if let Some(output_path) = output_dir {
        config.output.base_directory = output_path.to_path_buf();
    }

    let midcsv = MidCsv::new(
        config,
        OutputMode::Human,
        if verbose { 1 } else { 0 },
        false,
    )?;

    midcsv.convert(input, None, false).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn quiet_instance(base_directory: &Path) -> MidCsv {
        let mut config = Config::default();
        config.output.base_directory = base_directory.to_path_buf();
        MidCsv::new_for_test(config, OutputMode::Plain, 0, true)
    }

    #[tokio::test]
    async fn test_convert_writes_expected_csv() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("accounts.txt");
        fs::write(
            &input,
            "first 1234 5678 9012345 then 0000 1111 2222222 done",
        )
        .unwrap();

        let midcsv = quiet_instance(temp_dir.path());
        let report = midcsv.convert(&input, None, false).await.unwrap();

        assert_eq!(report.summary.rows_extracted, 2);

        let output = temp_dir.path().join("accounts.csv");
        let body = fs::read_to_string(&output).unwrap();
        assert_eq!(body, "1234 5678 9012345\n0000 1111 2222222");
    }

    #[tokio::test]
    async fn test_convert_skips_output_when_no_matches() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("empty.txt");
        fs::write(&input, "no merchant ids in here").unwrap();

        let midcsv = quiet_instance(temp_dir.path());
        let report = midcsv.convert(&input, None, false).await.unwrap();

        assert_eq!(report.summary.rows_extracted, 0);
        assert!(report.output_path.is_none());
        assert!(!temp_dir.path().join("empty.csv").exists());
        assert_eq!(report.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_convert_refuses_overwrite_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("accounts.txt");
        fs::write(&input, "1234 5678 9012345").unwrap();
        fs::write(temp_dir.path().join("accounts.csv"), "old").unwrap();

        let midcsv = quiet_instance(temp_dir.path());
        let result = midcsv.convert(&input, None, false).await;
        assert!(matches!(result, Err(MidCsvError::OutputFileExists { .. })));

        let report = midcsv.convert(&input, None, true).await.unwrap();
        assert_eq!(report.summary.rows_extracted, 1);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("accounts.csv")).unwrap(),
            "1234 5678 9012345"
        );
    }

    #[tokio::test]
    async fn test_convert_reports_read_failure() {
        let temp_dir = TempDir::new().unwrap();
        let midcsv = quiet_instance(temp_dir.path());

        let result = midcsv
            .convert(&temp_dir.path().join("missing.txt"), None, false)
            .await;
        assert!(matches!(result, Err(MidCsvError::Read { .. })));
    }

    #[tokio::test]
    async fn test_convert_with_report_sidecar() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("accounts.txt");
        fs::write(&input, "1234 5678 9012345").unwrap();

        let mut config = Config::default();
        config.output.base_directory = temp_dir.path().to_path_buf();
        config.output.generate_report = true;
        let midcsv = MidCsv::new_for_test(config, OutputMode::Plain, 0, true);

        midcsv.convert(&input, None, false).await.unwrap();

        assert!(temp_dir.path().join("accounts.csv.report.json").exists());
    }

    #[test]
    fn test_midcsv_creation() {
        let config = Config::default();
        let midcsv = MidCsv::new_for_test(config, OutputMode::Human, 1, false);
        assert!(midcsv.is_running());
        assert_eq!(midcsv.config().reader.max_file_size, 50 * 1024 * 1024);
    }

    #[test]
    fn test_config_snapshot_creation() {
        let config = Config::default();
        let midcsv = MidCsv::new_for_test(config, OutputMode::Human, 0, true);

        let snapshot = midcsv.create_config_snapshot();
        assert_eq!(snapshot.max_file_size, 50 * 1024 * 1024);
        assert!(!snapshot.generate_report);
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        let result = MidCsv::generate_sample_config(&config_path);
        assert!(result.is_ok());
        assert!(config_path.exists());

        let content = std::fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[reader]"));
        assert!(content.contains("[output]"));
    }

    #[test]
    fn test_shutdown_handling() {
        let config = Config::default();
        let midcsv = MidCsv::new_for_test(config, OutputMode::Human, 0, true);

        assert!(midcsv.is_running());

        midcsv.request_shutdown();
        assert!(!midcsv.is_running());
    }
}
