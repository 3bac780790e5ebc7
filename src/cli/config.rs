// CLI configuration
use clap::{Parser, Subcommand, ValueEnum};

/// ferrotag - audio metadata CLI tool
#[derive(Parser, Debug)]
#[command(name = "ferrotag")]
#[command(about = "Read and write audio metadata from the command line", long_about = None)]
#[command(version)]
pub struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// Quiet mode (suppress progress messages)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Pretty,
    /// Compact JSON
    Json,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read metadata from audio file(s)
    Read {
        /// Audio file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,

        /// Output to file instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Include base64-encoded cover art in the output
        #[arg(long)]
        include_cover: bool,
    },

    /// Write metadata to an audio file
    Write {
        /// Audio file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Metadata JSON string, e.g. '{"title": "Song", "track": 4}'
        #[arg(short, long)]
        metadata: Option<String>,

        /// Read metadata JSON from a file
        #[arg(long, conflicts_with = "metadata")]
        from_file: Option<String>,
    },

    /// Detect file format
    Detect {
        /// Audio file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },

    /// Export the first embedded cover image
    ExportCover {
        /// Audio file path
        #[arg(value_name = "FILE")]
        file: String,

        /// Output path for the image
        #[arg(short, long)]
        output: String,
    },
}
