// ID3v2 frame codecs: text frames and attached pictures

use crate::utils::encoding::{self, TextEncoding};
use crate::utils::ByteBuffer;

/// Common ID3v2 frame identifiers
pub mod frame_ids {
    pub const TITLE: &str = "TIT2"; // Title/songname/content description
    pub const ARTIST: &str = "TPE1"; // Lead performer(s)/Soloist(s)
    pub const ALBUM: &str = "TALB"; // Album/Movie/Show title
    pub const COMMENT: &str = "COMM"; // Comments
    pub const GENRE: &str = "TCON"; // Content type
    pub const RECORDING_DATE: &str = "TDRC"; // Recording time (v2.4)
    pub const YEAR_LEGACY: &str = "TYER"; // Year (v2.3)
    pub const DATE_LEGACY: &str = "TDAT"; // Date (v2.3)
    pub const TRACK: &str = "TRCK"; // Track number/Position in set
    pub const USER_TEXT: &str = "TXXX"; // User defined text information
    pub const PICTURE: &str = "APIC"; // Attached picture
}

/// Structural kind a frame identifier maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Text,
    Picture,
    Unrecognized,
}

/// Map an identifier to its frame kind.
///
/// Every "T" identifier except TXXX is a plain text frame; APIC is the
/// attached picture. Everything else is unrecognized and skipped during
/// the scan. New kinds extend this match.
pub fn classify(id: &str) -> FrameKind {
    if id == frame_ids::PICTURE {
        FrameKind::Picture
    } else if id.starts_with('T') && id != frame_ids::USER_TEXT {
        FrameKind::Text
    } else {
        FrameKind::Unrecognized
    }
}

/// Picture kinds defined for attached-picture frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureType {
    Other = 0,
    FileIcon = 1,
    OtherFileIcon = 2,
    CoverFront = 3,
    CoverBack = 4,
    LeafletPage = 5,
    Media = 6,
    LeadArtist = 7,
    Artist = 8,
    Conductor = 9,
    Band = 10,
    Composer = 11,
    Lyricist = 12,
    RecordingLocation = 13,
    DuringRecording = 14,
    DuringPerformance = 15,
    VideoScreenCapture = 16,
    BrightColouredFish = 17,
    Illustration = 18,
    BandLogo = 19,
    PublisherLogo = 20,
}

impl PictureType {
    pub fn from_byte(value: u8) -> Self {
        match value {
            0 => PictureType::Other,
            1 => PictureType::FileIcon,
            2 => PictureType::OtherFileIcon,
            3 => PictureType::CoverFront,
            4 => PictureType::CoverBack,
            5 => PictureType::LeafletPage,
            6 => PictureType::Media,
            7 => PictureType::LeadArtist,
            8 => PictureType::Artist,
            9 => PictureType::Conductor,
            10 => PictureType::Band,
            11 => PictureType::Composer,
            12 => PictureType::Lyricist,
            13 => PictureType::RecordingLocation,
            14 => PictureType::DuringRecording,
            15 => PictureType::DuringPerformance,
            16 => PictureType::VideoScreenCapture,
            17 => PictureType::BrightColouredFish,
            18 => PictureType::Illustration,
            19 => PictureType::BandLogo,
            20 => PictureType::PublisherLogo,
            _ => PictureType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PictureType::Other => "Other",
            PictureType::FileIcon => "File Icon",
            PictureType::OtherFileIcon => "Other File Icon",
            PictureType::CoverFront => "Cover (front)",
            PictureType::CoverBack => "Cover (back)",
            PictureType::LeafletPage => "Leaflet page",
            PictureType::Media => "Media",
            PictureType::LeadArtist => "Lead artist",
            PictureType::Artist => "Artist",
            PictureType::Conductor => "Conductor",
            PictureType::Band => "Band",
            PictureType::Composer => "Composer",
            PictureType::Lyricist => "Lyricist",
            PictureType::RecordingLocation => "Recording Location",
            PictureType::DuringRecording => "During recording",
            PictureType::DuringPerformance => "During performance",
            PictureType::VideoScreenCapture => "Video screen capture",
            PictureType::BrightColouredFish => "Bright coloured fish",
            PictureType::Illustration => "Illustration",
            PictureType::BandLogo => "Band logo",
            PictureType::PublisherLogo => "Publisher logo",
        }
    }
}

/// Text frame: encoding selector byte followed by encoded text
#[derive(Debug, Clone)]
pub struct TextFrame {
    pub encoding: TextEncoding,
    pub text: String,
}

impl TextFrame {
    /// Create a frame holding new text (always written as UTF-8)
    pub fn new(text: impl Into<String>) -> Self {
        TextFrame {
            encoding: TextEncoding::Utf8,
            text: text.into(),
        }
    }

    /// Decode a text frame payload; total over malformed input
    pub fn parse(data: &ByteBuffer) -> Self {
        if data.is_empty() {
            return TextFrame {
                encoding: TextEncoding::Latin1,
                text: String::new(),
            };
        }

        let encoding = TextEncoding::from_byte(data.at(0));
        let text = encoding::decode_text(&data.as_bytes()[1..], encoding);
        TextFrame {
            encoding,
            text: text.trim_end_matches('\0').to_string(),
        }
    }

    /// Render as selector 3 plus UTF-8 bytes, whatever the input encoding was
    pub fn render(&self) -> ByteBuffer {
        let mut out = ByteBuffer::new();
        out.push(TextEncoding::Utf8 as u8);
        out.append_slice(self.text.as_bytes());
        out
    }
}

/// Attached picture frame (APIC)
#[derive(Debug, Clone)]
pub struct PictureFrame {
    pub encoding: TextEncoding,
    pub mime_type: String,
    pub picture_type: PictureType,
    pub description: String,
    pub data: Vec<u8>,
}

impl PictureFrame {
    /// Decode an attached-picture payload; total over malformed input.
    ///
    /// Layout: selector byte, NUL-terminated Latin-1 MIME type, picture
    /// type byte, description terminated per the selector (double NUL for
    /// the UTF-16 selectors, single NUL otherwise), then raw image bytes.
    pub fn parse(data: &ByteBuffer) -> Self {
        let encoding = TextEncoding::from_byte(data.at(0));
        let mut offset = 1;

        let mut mime_end = offset;
        while mime_end < data.len() && data.at(mime_end) != 0 {
            mime_end += 1;
        }
        let mime_type = data.mid(offset, mime_end - offset).to_string_with(TextEncoding::Latin1);
        offset = mime_end + 1;

        let picture_type = PictureType::from_byte(data.at(offset));
        offset += 1;

        let desc_end = Self::description_end(data, offset, encoding);
        let description = data.mid(offset, desc_end - offset).to_string_with(encoding);
        let image_start = desc_end + if encoding.is_wide() { 2 } else { 1 };

        PictureFrame {
            encoding,
            mime_type,
            picture_type,
            description,
            data: data.mid_from(image_start).into_bytes(),
        }
    }

    // First byte of the description terminator, or the end of the buffer
    // when none is found
    fn description_end(data: &ByteBuffer, start: usize, encoding: TextEncoding) -> usize {
        let mut end = start;
        if encoding.is_wide() {
            while end + 1 < data.len() && !(data.at(end) == 0 && data.at(end + 1) == 0) {
                end += 2;
            }
            end
        } else {
            while end < data.len() && data.at(end) != 0 {
                end += 1;
            }
            end
        }
    }

    /// Render the payload.
    ///
    /// The selector byte is preserved but the description is always
    /// re-encoded as UTF-8 with a single NUL terminator, so the write
    /// path does not mirror the read path's terminator width for the
    /// UTF-16 selectors. This matches the historical behavior of the
    /// format's common writers and is kept intentionally.
    pub fn render(&self) -> ByteBuffer {
        let mut out = ByteBuffer::new();
        out.push(self.encoding as u8);
        out.append_slice(&encoding::encode_latin1(&self.mime_type));
        out.push(0);
        out.push(self.picture_type as u8);
        out.append_slice(self.description.as_bytes());
        out.push(0);
        out.append_slice(&self.data);
        out
    }
}

/// Decoded frame payload variants
#[derive(Debug, Clone)]
pub enum FrameBody {
    Text(TextFrame),
    Picture(PictureFrame),
}

/// One metadata record: a 4-character identifier plus a decoded payload
#[derive(Debug, Clone)]
pub struct Frame {
    id: String,
    body: FrameBody,
}

impl Frame {
    /// Decode a payload for `id`, or None when the identifier is unrecognized
    pub fn parse(id: &str, payload: &ByteBuffer) -> Option<Frame> {
        match classify(id) {
            FrameKind::Text => Some(Frame {
                id: id.to_string(),
                body: FrameBody::Text(TextFrame::parse(payload)),
            }),
            FrameKind::Picture => Some(Frame {
                id: id.to_string(),
                body: FrameBody::Picture(PictureFrame::parse(payload)),
            }),
            FrameKind::Unrecognized => None,
        }
    }

    /// Build a text frame for `id` directly
    pub fn text(id: &str, text: impl Into<String>) -> Frame {
        Frame {
            id: id.to_string(),
            body: FrameBody::Text(TextFrame::new(text)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn body(&self) -> &FrameBody {
        &self.body
    }

    pub fn as_text(&self) -> Option<&TextFrame> {
        match &self.body {
            FrameBody::Text(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_picture(&self) -> Option<&PictureFrame> {
        match &self.body {
            FrameBody::Picture(frame) => Some(frame),
            _ => None,
        }
    }

    /// Human-readable payload summary
    pub fn display_text(&self) -> String {
        match &self.body {
            FrameBody::Text(frame) => frame.text.clone(),
            FrameBody::Picture(frame) => {
                format!("Picture: {}, {}", frame.mime_type, frame.description)
            }
        }
    }

    /// Encode the payload back to bytes
    pub fn render(&self) -> ByteBuffer {
        match &self.body {
            FrameBody::Text(frame) => frame.render(),
            FrameBody::Picture(frame) => frame.render(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("TIT2"), FrameKind::Text);
        assert_eq!(classify("TRCK"), FrameKind::Text);
        assert_eq!(classify("TXXX"), FrameKind::Unrecognized);
        assert_eq!(classify("APIC"), FrameKind::Picture);
        assert_eq!(classify("COMM"), FrameKind::Unrecognized);
        assert_eq!(classify("PRIV"), FrameKind::Unrecognized);
    }

    #[test]
    fn test_text_frame_latin1() {
        let payload = ByteBuffer::from_slice(&[0x00, b'A', b'B', b'B', b'A', 0x00]);
        let frame = TextFrame::parse(&payload);
        assert_eq!(frame.encoding, TextEncoding::Latin1);
        assert_eq!(frame.text, "ABBA");
    }

    #[test]
    fn test_text_frame_utf16_with_bom() {
        let payload = ByteBuffer::from_slice(&[0x01, 0xFF, 0xFE, b'H', 0x00, b'i', 0x00]);
        let frame = TextFrame::parse(&payload);
        assert_eq!(frame.text, "Hi");
    }

    #[test]
    fn test_text_frame_renders_utf8() {
        let payload = ByteBuffer::from_slice(&[0x01, 0xFF, 0xFE, b'H', 0x00, b'i', 0x00]);
        let frame = TextFrame::parse(&payload);
        let rendered = frame.render();
        assert_eq!(rendered.as_bytes(), &[0x03, b'H', b'i']);
    }

    #[test]
    fn test_empty_text_frame() {
        let frame = TextFrame::parse(&ByteBuffer::new());
        assert_eq!(frame.text, "");
    }

    #[test]
    fn test_picture_frame_latin1_description() {
        let mut payload = ByteBuffer::new();
        payload.push(0x00); // Latin-1
        payload.append_slice(b"image/png\x00");
        payload.push(0x03); // front cover
        payload.append_slice(b"cover\x00");
        payload.append_slice(&[0x89, 0x50, 0x4E, 0x47]);

        let frame = PictureFrame::parse(&payload);
        assert_eq!(frame.mime_type, "image/png");
        assert_eq!(frame.picture_type, PictureType::CoverFront);
        assert_eq!(frame.description, "cover");
        assert_eq!(frame.data, vec![0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn test_picture_frame_utf16_description_double_nul() {
        let mut payload = ByteBuffer::new();
        payload.push(0x01); // UTF-16
        payload.append_slice(b"image/jpeg\x00");
        payload.push(0x00);
        payload.append_slice(&[0xFF, 0xFE, b'c', 0x00, b'd', 0x00]); // "cd"
        payload.append_slice(&[0x00, 0x00]); // double-NUL terminator
        payload.append_slice(&[0xDE, 0xAD]);

        let frame = PictureFrame::parse(&payload);
        assert_eq!(frame.mime_type, "image/jpeg");
        assert_eq!(frame.description, "cd");
        assert_eq!(frame.data, vec![0xDE, 0xAD]);
    }

    #[test]
    fn test_picture_frame_render_uses_single_nul() {
        let mut payload = ByteBuffer::new();
        payload.push(0x01);
        payload.append_slice(b"image/jpeg\x00");
        payload.push(0x03);
        payload.append_slice(&[0xFF, 0xFE, b'c', 0x00, 0x00, 0x00]);
        payload.append_slice(&[0xAB]);

        let frame = PictureFrame::parse(&payload);
        let rendered = frame.render();
        // Selector preserved, description re-encoded UTF-8 + single NUL
        let mut expected = vec![0x01];
        expected.extend_from_slice(b"image/jpeg\x00");
        expected.push(0x03);
        expected.extend_from_slice(b"c\x00");
        expected.push(0xAB);
        assert_eq!(rendered.as_bytes(), expected.as_slice());
    }

    #[test]
    fn test_truncated_picture_frame_does_not_panic() {
        let payload = ByteBuffer::from_slice(&[0x00, b'i', b'm']);
        let frame = PictureFrame::parse(&payload);
        assert_eq!(frame.mime_type, "im");
        assert_eq!(frame.description, "");
        assert!(frame.data.is_empty());
    }

    #[test]
    fn test_frame_dispatch() {
        let payload = ByteBuffer::from_slice(&[0x00, b'x']);
        assert!(Frame::parse("TIT2", &payload).is_some());
        assert!(Frame::parse("APIC", &payload).is_some());
        assert!(Frame::parse("PRIV", &payload).is_none());
    }
}
