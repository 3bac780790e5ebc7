// CLI binary entry point for ferrotag

mod cli;

use clap::Parser;
use cli::commands;
use cli::config::{Commands, Config};
use cli::output::OutputFormatter;
use std::process;

fn main() {
    env_logger::init();
    let config = Config::parse();
    let formatter = OutputFormatter::new(config.format, config.quiet);

    let result = match &config.command {
        Commands::Read {
            files,
            output,
            include_cover,
        } => commands::command_read(files, output.as_deref(), *include_cover, &formatter),
        Commands::Write {
            file,
            metadata,
            from_file,
        } => commands::command_write(file, metadata.as_deref(), from_file.as_deref(), &formatter),
        Commands::Detect { files } => commands::command_detect(files, &formatter),
        Commands::ExportCover { file, output } => {
            commands::command_export_cover(file, output, &formatter)
        }
    };

    if let Err(error) = result {
        formatter.print_error(&format!("{:#}", error));
        process::exit(1);
    }
}
