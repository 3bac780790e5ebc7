// CLI command implementations
//
// The only filesystem access in the repository happens here: paths are
// read into byte buffers handed to the library, and saved buffers are
// written back out.

use crate::cli::output::OutputFormatter;
use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ferrotag::{AudioFile, CoverMetadata, MetadataUpdate};
use std::fs;
use std::io::{BufWriter, Write};

/// Read metadata from files
pub fn command_read(
    files: &[String],
    output: Option<&str>,
    include_cover: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = fs::File::create(path).with_context(|| format!("creating {}", path))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(std::io::stdout()),
    };

    let mut failures = 0;
    for path in files {
        match open(path) {
            Ok(audio) => {
                let mut metadata = audio.metadata();
                if include_cover {
                    metadata.cover = first_cover(&audio);
                }
                formatter.output_metadata(&metadata, &mut *writer)?;
            }
            Err(error) => {
                formatter.print_error(&format!("{}: {:#}", path, error));
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} file(s) could not be read", failures);
    }
    Ok(())
}

/// Write metadata fields to a file and save it back
pub fn command_write(
    file: &str,
    metadata: Option<&str>,
    from_file: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let json = match (metadata, from_file) {
        (Some(json), _) => json.to_string(),
        (None, Some(path)) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path))?
        }
        (None, None) => bail!("either --metadata or --from-file is required"),
    };

    let update: MetadataUpdate =
        serde_json::from_str(&json).context("parsing metadata JSON")?;

    let mut audio = open(file)?;
    audio.apply_update(&update);
    if !audio.container_mut().save() {
        bail!("{}: tag could not be rebuilt", file);
    }

    fs::write(file, audio.container().as_bytes())
        .with_context(|| format!("writing {}", file))?;
    formatter.print_success(&format!("{} updated", file));
    Ok(())
}

/// Detect file format(s)
pub fn command_detect(files: &[String], formatter: &OutputFormatter) -> Result<()> {
    for path in files {
        match open(path) {
            Ok(audio) => {
                let version = audio
                    .tag_version()
                    .unwrap_or_else(|| "no tag".to_string());
                formatter.print_info(&format!("{}: {} ({})", path, audio.format(), version));
            }
            Err(error) => {
                formatter.print_error(&format!("{}: {:#}", path, error));
            }
        }
    }
    Ok(())
}

/// Export the first embedded cover image
pub fn command_export_cover(
    file: &str,
    output: &str,
    formatter: &OutputFormatter,
) -> Result<()> {
    let audio = open(file)?;
    let mpeg = audio
        .as_mpeg()
        .context("container has no picture support")?;
    let tag = mpeg.id3v2_tag().context("file has no tag")?;
    let picture = tag
        .pictures()
        .into_iter()
        .next()
        .context("tag has no embedded picture")?;

    fs::write(output, &picture.data).with_context(|| format!("writing {}", output))?;
    formatter.print_success(&format!(
        "{} -> {} ({}, {} bytes)",
        file,
        output,
        picture.mime_type,
        picture.data.len()
    ));
    Ok(())
}

fn open(path: &str) -> Result<AudioFile> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path))?;
    AudioFile::from_bytes(path, bytes).map_err(Into::into)
}

fn first_cover(audio: &AudioFile) -> Option<CoverMetadata> {
    let tag = audio.as_mpeg()?.id3v2_tag()?;
    let picture = tag.pictures().into_iter().next()?;
    Some(CoverMetadata {
        mime_type: picture.mime_type.clone(),
        picture_type: picture.picture_type.as_str().to_string(),
        description: if picture.description.is_empty() {
            None
        } else {
            Some(picture.description.clone())
        },
        data: BASE64.encode(&picture.data),
    })
}
