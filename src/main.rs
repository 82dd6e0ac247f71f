use clap::Parser;
use midcsv::{
    Cli, Config, MidCsv, MidCsvError, OutputFormatter, OutputMode, UserFriendlyError,
};
use std::process;

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    // Create MidCsv instance
    let midcsv = match MidCsv::from_cli(&cli) {
        Ok(midcsv) => midcsv,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    // Handle dry run mode
    if cli.dry_run {
        return handle_dry_run(&cli, midcsv.config(), midcsv.output_formatter());
    }

    let input = match cli.validated_input() {
        Ok(input) => input,
        Err(e) => {
            midcsv.handle_error(&e);
            return 2;
        }
    };

    // Execute main conversion workflow
    match midcsv.convert(input, cli.output.as_deref(), cli.force).await {
        Ok(report) => {
            midcsv.output_formatter().print_conversion_report(&report);
            0
        }
        Err(e) => {
            midcsv.handle_error(&e);

            // Map error types to appropriate exit codes
            match e {
                MidCsvError::Cancelled => 130, // Interrupted (SIGINT)
                MidCsvError::InvalidInput { .. } => 2,
                MidCsvError::Read { .. } | MidCsvError::InvalidEncoding { .. } => 3,
                MidCsvError::FileTooLarge { .. } => 6,
                MidCsvError::InvalidPath { .. } => 7,
                MidCsvError::OutputFileExists { .. } => 8,
                _ => 1, // General error
            }
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "midcsv.toml".to_string());

    match MidCsv::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  midcsv <input.txt> --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!(
                "Failed to generate configuration file: {}",
                e.user_message()
            );
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(cli: &Cli, config: &Config, formatter: &OutputFormatter) -> i32 {
    formatter.info("DRY RUN MODE - No files will be read or written");
    formatter.print_separator();

    // Validate the input path
    let input = match cli.validated_input() {
        Ok(input) => input,
        Err(e) => {
            formatter.error(&format!("✗ Invalid input: {}", e.user_message()));
            return 1;
        }
    };
    formatter.success(&format!("✓ Input file accepted: {}", input.display()));

    // Display configuration that would be used
    formatter.info("Configuration that would be used:");
    println!("  Max input size: {} bytes", config.reader.max_file_size);
    println!(
        "  Output directory: {}",
        config.output.base_directory.display()
    );
    println!("  Generate report: {}", config.output.generate_report);

    formatter.print_separator();

    let output_name = match cli.derived_output_name() {
        Ok(name) => name,
        Err(e) => {
            formatter.error(&format!(
                "Failed to determine output name: {}",
                e.user_message()
            ));
            return 1;
        }
    };

    formatter.info("Conversion plan:");
    println!("  Input:  {}", input.display());
    println!("  Output: {}", output_name);

    if cli.force {
        formatter.warning("Force mode enabled - would overwrite an existing output file");
    }

    formatter.print_separator();
    formatter.success("Dry run completed successfully");
    formatter.info("Run without --dry-run to perform the conversion");

    0
}

fn print_startup_error(error: &MidCsvError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
