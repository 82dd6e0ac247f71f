use crate::config::{CliOverrides, Config};
use crate::emitter::derive_csv_name;
use crate::error::{MidCsvError, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "midcsv")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract merchant IDs (MIDs) from text files into CSV")]
#[command(
    long_about = "MidCsv scans a text file for merchant IDs (four digits, a space, four \
                       digits, a space, seven digits) and writes them as a single-column \
                       CSV, one ID per row."
)]
#[command(after_help = "EXAMPLES:\n  \
    midcsv accounts.txt\n  \
    midcsv accounts.txt --output mids.csv --verbose\n  \
    midcsv statements.txt --output-dir exports --force\n  \
    midcsv accounts.txt --config my-config.toml --output-format json\n\n\
    For more information, visit: https://github.com/user/midcsv")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input text file to scan
    #[arg(value_parser = validate_input_arg, required_unless_present = "generate_config")]
    pub input: Option<PathBuf>,

    /// Output file name (defaults to the input name with a .csv extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory where the output file is placed
    #[arg(long, help = "Directory for the emitted CSV (default: current directory)")]
    pub output_dir: Option<PathBuf>,

    /// Maximum input file size in MB
    #[arg(long, help = "Maximum input file size to process (in MB)")]
    pub max_size: Option<u64>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Write a JSON report sidecar next to the output file
    #[arg(long, help = "Write <output>.report.json alongside the CSV")]
    pub report: bool,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force conversion of non-.txt inputs and overwrite of existing output
    #[arg(long, help = "Overwrite existing output and accept non-.txt inputs")]
    pub force: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "Show what would be converted without actually doing it")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        let max_file_size = self.max_size.map(|size| size * 1024 * 1024); // Convert MB to bytes

        let output_dir = self.output_dir.as_ref().map(|d| {
            if d.is_absolute() {
                d.clone()
            } else {
                std::env::current_dir().unwrap_or_default().join(d)
            }
        });

        CliOverrides::new()
            .with_max_file_size(max_file_size)
            .with_output_dir(output_dir)
            .with_generate_report(if self.report { Some(true) } else { None })
    }

    /// The input path, checked for a `.txt` extension. `--force` accepts
    /// any extension; the file's readability is checked later, at read time.
    pub fn validated_input(&self) -> Result<&Path> {
        let input = self.input.as_deref().ok_or_else(|| MidCsvError::Config {
            message: "No input file was provided".to_string(),
        })?;

        if self.force || has_txt_extension(input) {
            Ok(input)
        } else {
            Err(MidCsvError::InvalidInput {
                path: input.display().to_string(),
            })
        }
    }

    /// Output file name that a run would produce, for dry-run display.
    pub fn derived_output_name(&self) -> Result<String> {
        if let Some(ref output) = self.output {
            return Ok(output.display().to_string());
        }

        let input = self.validated_input()?;
        let input_name = input
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| MidCsvError::InvalidPath {
                path: input.display().to_string(),
            })?;

        Ok(derive_csv_name(input_name))
    }

    pub fn should_use_colors(&self) -> bool {
        !self.quiet && console::Term::stdout().features().colors_supported()
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose > 0 && !self.quiet
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

pub fn has_txt_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
}

fn validate_input_arg(s: &str) -> std::result::Result<PathBuf, String> {
    if s.trim().is_empty() {
        return Err("Input path must not be empty".to_string());
    }

    if s.ends_with('/') || s.ends_with('\\') {
        return Err("Input must be a file, not a directory".to_string());
    }

    Ok(PathBuf::from(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_input(input: &str) -> Cli {
        Cli {
            input: Some(PathBuf::from(input)),
            output: None,
            output_dir: None,
            max_size: None,
            config: None,
            output_format: OutputFormat::Human,
            report: false,
            verbose: 0,
            quiet: false,
            force: false,
            dry_run: false,
            generate_config: false,
        }
    }

    #[test]
    fn test_txt_extension_detection() {
        assert!(has_txt_extension(Path::new("accounts.txt")));
        assert!(has_txt_extension(Path::new("accounts.TXT")));
        assert!(!has_txt_extension(Path::new("accounts.csv")));
        assert!(!has_txt_extension(Path::new("accounts")));
    }

    #[test]
    fn test_validated_input_accepts_txt() {
        let cli = cli_with_input("accounts.txt");
        assert_eq!(cli.validated_input().unwrap(), Path::new("accounts.txt"));
    }

    #[test]
    fn test_validated_input_rejects_other_extensions() {
        let cli = cli_with_input("accounts.pdf");
        assert!(matches!(
            cli.validated_input(),
            Err(MidCsvError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_force_accepts_any_extension() {
        let mut cli = cli_with_input("accounts.pdf");
        cli.force = true;
        assert!(cli.validated_input().is_ok());
    }

    #[test]
    fn test_derived_output_name() {
        let cli = cli_with_input("data/accounts.txt");
        assert_eq!(cli.derived_output_name().unwrap(), "accounts.csv");
    }

    #[test]
    fn test_explicit_output_wins() {
        let mut cli = cli_with_input("accounts.txt");
        cli.output = Some(PathBuf::from("mids.csv"));
        assert_eq!(cli.derived_output_name().unwrap(), "mids.csv");
    }

    #[test]
    fn test_validate_input_arg() {
        assert!(validate_input_arg("accounts.txt").is_ok());
        assert!(validate_input_arg("").is_err());
        assert!(validate_input_arg("   ").is_err());
        assert!(validate_input_arg("data/").is_err());
    }

    #[test]
    fn test_max_size_override_converts_to_bytes() {
        let mut cli = cli_with_input("accounts.txt");
        cli.max_size = Some(5);

        let overrides = cli.create_cli_overrides();
        assert_eq!(overrides.max_file_size, Some(5 * 1024 * 1024));
    }

    #[test]
    fn test_verbosity_level() {
        let mut cli = cli_with_input("accounts.txt");
        cli.verbose = 2;
        assert_eq!(cli.verbosity_level(), 2);
        assert!(cli.is_verbose());

        cli.quiet = true;
        assert_eq!(cli.verbosity_level(), 0);
        assert!(!cli.is_verbose());
    }
}
