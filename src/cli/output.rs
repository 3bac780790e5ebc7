// Output formatting for CLI

use crate::cli::config::OutputFormat;
use anyhow::Result;
use ferrotag::Metadata;
use std::io::Write;

/// Format and output metadata
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Serialize one file's metadata to the writer
    pub fn output_metadata(&self, metadata: &Metadata, writer: &mut dyn Write) -> Result<()> {
        let json = match self.format {
            OutputFormat::Pretty => serde_json::to_string_pretty(metadata)?,
            OutputFormat::Json => serde_json::to_string(metadata)?,
        };
        writeln!(writer, "{}", json)?;
        Ok(())
    }

    /// Print success message
    pub fn print_success(&self, message: &str) {
        if !self.quiet {
            println!("✓ {}", message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }
}
