// ferrotag - an audio metadata library
//
// The parsers consume and produce byte buffers only; reading bytes from
// a path (or anywhere else) is the caller's job. See the cli module of
// the binary for the filesystem side.

use serde::{Deserialize, Serialize};

pub mod id3;
pub mod mpeg;
pub mod utils;

pub use id3::{Id3v2Header, Id3v2Tag};
pub use mpeg::{MpegFile, MpegFrameHeader, MpegProperties, MpegVersion};
pub use utils::{ByteBuffer, TextEncoding};

/// Metadata fields common to tag formats
pub trait Tag {
    fn title(&self) -> &str;
    fn artist(&self) -> &str;
    fn album(&self) -> &str;
    fn comment(&self) -> &str;
    fn genre(&self) -> &str;
    fn year(&self) -> u32;
    fn track(&self) -> u32;

    fn set_title(&mut self, title: &str);
    fn set_artist(&mut self, artist: &str);
    fn set_album(&mut self, album: &str);
    fn set_comment(&mut self, comment: &str);
    fn set_genre(&mut self, genre: &str);
    fn set_year(&mut self, year: u32);
    fn set_track(&mut self, track: u32);

    fn is_empty(&self) -> bool;
}

/// Technical stream properties common to audio formats
pub trait AudioProperties {
    fn length_in_seconds(&self) -> u32;
    fn bitrate(&self) -> u32;
    fn sample_rate(&self) -> u32;
    fn channels(&self) -> u32;
}

/// A parsed audio container holding its bytes, tag and properties
pub trait AudioContainer {
    fn tag(&self) -> Option<&dyn Tag>;
    fn audio_properties(&self) -> Option<&dyn AudioProperties>;
    fn save(&mut self) -> bool;
    fn as_bytes(&self) -> &[u8];
    fn is_valid(&self) -> bool;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn name(&self) -> &str;
}

/// Errors surfaced by the AudioFile facade
#[derive(Debug)]
pub enum AudioFileError {
    UnsupportedFormat(String),
}

impl std::fmt::Display for AudioFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioFileError::UnsupportedFormat(name) => {
                write!(f, "unsupported format: {}", name)
            }
        }
    }
}

impl std::error::Error for AudioFileError {}

/// Container dispatch; one variant per supported format
#[derive(Debug)]
enum Container {
    Mpeg(MpegFile),
}

/// Format-dispatching facade over the concrete containers.
///
/// Picks a codec by sniffing the buffer content, never by file
/// extension, and owns the selected container. Adding a format means
/// adding a Container variant and a probe here.
#[derive(Debug)]
pub struct AudioFile {
    container: Container,
}

impl AudioFile {
    /// Construct from a named byte buffer, sniffing the format
    pub fn from_bytes(name: &str, bytes: Vec<u8>) -> Result<Self, AudioFileError> {
        if MpegFile::is_supported(&bytes) {
            return Ok(AudioFile {
                container: Container::Mpeg(MpegFile::new(name, bytes, true)),
            });
        }
        Err(AudioFileError::UnsupportedFormat(name.to_string()))
    }

    /// Short name of the detected format
    pub fn format(&self) -> &'static str {
        match &self.container {
            Container::Mpeg(_) => "MPEG",
        }
    }

    /// Tag format revision, e.g. "2.4.0", when a tag is present
    pub fn tag_version(&self) -> Option<String> {
        match &self.container {
            Container::Mpeg(file) => file.id3v2_tag().and_then(|tag| tag.header()).map(|header| {
                format!("2.{}.{}", header.major_version, header.revision)
            }),
        }
    }

    pub fn container(&self) -> &dyn AudioContainer {
        match &self.container {
            Container::Mpeg(file) => file,
        }
    }

    pub fn container_mut(&mut self) -> &mut dyn AudioContainer {
        match &mut self.container {
            Container::Mpeg(file) => file,
        }
    }

    /// The underlying MPEG container, when that format was detected
    pub fn as_mpeg(&self) -> Option<&MpegFile> {
        match &self.container {
            Container::Mpeg(file) => Some(file),
        }
    }

    /// The underlying MPEG container, mutably
    pub fn as_mpeg_mut(&mut self) -> Option<&mut MpegFile> {
        match &mut self.container {
            Container::Mpeg(file) => Some(file),
        }
    }

    /// Snapshot of the tag and properties for serialization
    pub fn metadata(&self) -> Metadata {
        let container = self.container();
        let mut metadata = Metadata {
            format: self.format().to_string(),
            version: self.tag_version(),
            ..Metadata::default()
        };

        if let Some(tag) = container.tag() {
            metadata.title = non_empty(tag.title());
            metadata.artist = non_empty(tag.artist());
            metadata.album = non_empty(tag.album());
            metadata.comment = non_empty(tag.comment());
            metadata.genre = non_empty(tag.genre());
            metadata.year = (tag.year() > 0).then(|| tag.year());
            metadata.track = (tag.track() > 0).then(|| tag.track());
        }

        if let Some(properties) = container.audio_properties() {
            metadata.duration_seconds = Some(properties.length_in_seconds());
            metadata.bitrate_kbps = Some(properties.bitrate());
            metadata.sample_rate_hz = Some(properties.sample_rate());
            metadata.channels = Some(properties.channels());
        }

        metadata
    }

    /// Apply the set fields of an update to the tag, creating one if
    /// the container has none yet
    pub fn apply_update(&mut self, update: &MetadataUpdate) {
        let tag: &mut dyn Tag = match &mut self.container {
            Container::Mpeg(file) => file.ensure_tag(),
        };

        if let Some(title) = &update.title {
            tag.set_title(title);
        }
        if let Some(artist) = &update.artist {
            tag.set_artist(artist);
        }
        if let Some(album) = &update.album {
            tag.set_album(album);
        }
        if let Some(comment) = &update.comment {
            tag.set_comment(comment);
        }
        if let Some(genre) = &update.genre {
            tag.set_genre(genre);
        }
        if let Some(year) = update.year {
            tag.set_year(year);
        }
        if let Some(track) = update.track {
            tag.set_track(track);
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Serializable snapshot of a file's metadata
#[derive(Debug, Default, Serialize)]
pub struct Metadata {
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate_kbps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate_hz: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<CoverMetadata>,
}

/// Cover art entry embedded in serialized metadata
#[derive(Debug, Serialize)]
pub struct CoverMetadata {
    pub mime_type: String,
    pub picture_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Image bytes, base64-encoded
    pub data: String,
}

/// Partial metadata for write operations; unset fields are untouched
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataUpdate {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<u32>,
    pub track: Option<u32>,
    pub genre: Option<String>,
    pub comment: Option<String>,
}
