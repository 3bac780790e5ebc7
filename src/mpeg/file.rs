// MPEG container: tag region location, property reading, save

use crate::id3::header::Id3v2Header;
use crate::id3::tag::Id3v2Tag;
use crate::mpeg::properties::MpegProperties;
use crate::utils::{synchsafe, ByteBuffer};
use crate::{AudioContainer, AudioProperties, Tag};

// Probe window for the frame-sync check in is_supported
const SYNC_PROBE_LIMIT: usize = 8192;

/// One MPEG audio stream with an optional leading ID3v2 tag.
///
/// Owns the complete byte buffer; construction never fails and never
/// performs I/O. A corrupt tag region degrades to "no tag" while the
/// audio region is still inspected for properties.
#[derive(Debug, Clone)]
pub struct MpegFile {
    name: String,
    data: ByteBuffer,
    tag: Option<Id3v2Tag>,
    properties: Option<MpegProperties>,
    tag_size: usize,
    valid: bool,
}

impl MpegFile {
    /// Construct from a named byte buffer
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, read_properties: bool) -> Self {
        let mut file = MpegFile {
            name: name.into(),
            data: ByteBuffer::from_bytes(bytes),
            tag: None,
            properties: None,
            tag_size: 0,
            valid: false,
        };
        file.read(read_properties);
        file
    }

    /// Content sniff: a leading tag magic or a frame-sync pattern near
    /// the start of the buffer
    pub fn is_supported(bytes: &[u8]) -> bool {
        if bytes.starts_with(Id3v2Header::ID) {
            return true;
        }
        let limit = bytes.len().saturating_sub(1).min(SYNC_PROBE_LIMIT);
        for i in 0..limit {
            if bytes[i] == 0xFF && (bytes[i + 1] & 0xE0) == 0xE0 {
                return true;
            }
        }
        false
    }

    fn read(&mut self, read_properties: bool) {
        if self.data.starts_with(Id3v2Header::ID) {
            let declared =
                synchsafe::decode(self.data.mid(6, 4).as_bytes()) as usize + Id3v2Header::SIZE;
            let tag = Id3v2Tag::read(&self.data.mid(0, declared));
            if tag.header().is_some() {
                self.tag = Some(tag);
                self.tag_size = declared;
            } else {
                log::warn!("{}: unreadable tag region, treating as untagged", self.name);
            }
        }

        if read_properties {
            let audio = self.data.mid_from(self.tag_size);
            let stream_length = audio.len();
            self.properties = Some(MpegProperties::read(&audio, stream_length));
        }

        self.valid = true;
    }

    /// The tag, mutably, for editing fields before save
    pub fn tag_mut(&mut self) -> Option<&mut Id3v2Tag> {
        self.tag.as_mut()
    }

    /// The tag, creating an empty one for untagged streams
    pub fn ensure_tag(&mut self) -> &mut Id3v2Tag {
        self.tag.get_or_insert_with(Id3v2Tag::new)
    }

    /// The concrete tag type, when present
    pub fn id3v2_tag(&self) -> Option<&Id3v2Tag> {
        self.tag.as_ref()
    }

    /// The concrete properties type, when read
    pub fn mpeg_properties(&self) -> Option<&MpegProperties> {
        self.properties.as_ref()
    }
}

impl AudioContainer for MpegFile {
    fn tag(&self) -> Option<&dyn Tag> {
        self.tag.as_ref().map(|tag| tag as &dyn Tag)
    }

    fn audio_properties(&self) -> Option<&dyn AudioProperties> {
        self.properties
            .as_ref()
            .map(|properties| properties as &dyn AudioProperties)
    }

    /// Re-render the tag and splice it with the untouched audio region.
    ///
    /// Returns false (buffer unchanged) when no tag is held. The audio
    /// bytes are copied verbatim; only the tag region is rebuilt.
    fn save(&mut self) -> bool {
        let Some(tag) = &self.tag else {
            return false;
        };

        let rendered = tag.render();
        let rendered_size = rendered.len();

        let mut new_data = rendered;
        new_data.append(&self.data.mid_from(self.tag_size));

        self.data = new_data;
        self.tag_size = rendered_size;
        true
    }

    fn as_bytes(&self) -> &[u8] {
        self.data.as_bytes()
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
