// ID3v2 tag assembly: frame scan, field projection, render

use crate::id3::frames::{frame_ids, Frame, PictureFrame};
use crate::id3::header::Id3v2Header;
use crate::utils::{synchsafe, ByteBuffer, TextEncoding};
use crate::Tag;

/// In-memory ID3v2 tag.
///
/// Frames are grouped by identifier in an association list so that both
/// first-seen identifier order and per-identifier occurrence order are
/// preserved; render walks that order, which keeps output deterministic.
/// The scalar fields (title, artist, ...) are projections over specific
/// identifiers and are refreshed whenever the frame table changes.
#[derive(Debug, Clone, Default)]
pub struct Id3v2Tag {
    header: Option<Id3v2Header>,
    frames: Vec<(String, Vec<Frame>)>,
    title: String,
    artist: String,
    album: String,
    comment: String,
    genre: String,
    year: u32,
    track: u32,
}

impl Id3v2Tag {
    /// Create an empty tag
    pub fn new() -> Self {
        Id3v2Tag::default()
    }

    /// Parse a complete tag region (header plus frame bytes).
    ///
    /// Malformed input degrades to an empty or partially-filled tag;
    /// this never fails.
    pub fn read(data: &ByteBuffer) -> Self {
        let mut tag = Id3v2Tag::default();

        if let Some(header) = Id3v2Header::parse(&data.mid(0, Id3v2Header::SIZE)) {
            let region = data.mid(Id3v2Header::SIZE, header.size as usize);
            tag.parse_frames(&region, header.major_version);
            tag.header = Some(header);
        }

        tag.populate_fields();
        tag
    }

    /// Header of the tag this was parsed from, if any
    pub fn header(&self) -> Option<&Id3v2Header> {
        self.header.as_ref()
    }

    fn parse_frames(&mut self, region: &ByteBuffer, major_version: u8) {
        let mut cursor = 0;

        while cursor + 10 < region.len() {
            let id_bytes = region.mid(cursor, 4);
            // A NUL first byte means the padding area has been reached
            if id_bytes.at(0) == 0 || !is_frame_id(id_bytes.as_bytes()) {
                break;
            }
            let id = id_bytes.to_string_with(TextEncoding::Latin1);

            // v2.4 sizes are synchsafe; v2.3 and earlier are plain big-endian
            let frame_size = if major_version >= 4 {
                synchsafe::decode(region.mid(cursor + 4, 4).as_bytes())
            } else {
                region.to_u32_be(cursor + 4)
            } as usize;

            if frame_size == 0 || frame_size > region.len() - cursor - 10 {
                log::warn!("invalid frame size {} for {}, stopping scan", frame_size, id);
                break;
            }

            cursor += 10;
            let payload = region.mid(cursor, frame_size);
            if let Some(frame) = Frame::parse(&id, &payload) {
                self.insert_frame(frame);
            }
            cursor += frame_size;
        }
    }

    fn insert_frame(&mut self, frame: Frame) {
        match self.frames.iter_mut().find(|(id, _)| id == frame.id()) {
            Some((_, list)) => list.push(frame),
            None => self.frames.push((frame.id().to_string(), vec![frame])),
        }
    }

    fn first_text(&self, id: &str) -> Option<&str> {
        self.frames
            .iter()
            .find(|(frame_id, _)| frame_id == id)
            .and_then(|(_, list)| list.first())
            .and_then(|frame| frame.as_text())
            .map(|text| text.text.as_str())
    }

    // Refresh the scalar projections from the frame table
    fn populate_fields(&mut self) {
        self.title = self.first_text(frame_ids::TITLE).unwrap_or("").to_string();
        self.artist = self.first_text(frame_ids::ARTIST).unwrap_or("").to_string();
        self.album = self.first_text(frame_ids::ALBUM).unwrap_or("").to_string();
        self.comment = self.first_text(frame_ids::COMMENT).unwrap_or("").to_string();
        self.genre = self.first_text(frame_ids::GENRE).unwrap_or("").to_string();

        // Dates live in different identifiers depending on the tag
        // revision; the first non-empty one wins
        let date_ids = [
            frame_ids::RECORDING_DATE,
            frame_ids::YEAR_LEGACY,
            frame_ids::DATE_LEGACY,
        ];
        self.year = date_ids
            .iter()
            .filter_map(|id| self.first_text(id))
            .find(|text| !text.is_empty())
            .map(first_four_digit_run)
            .unwrap_or(0);

        self.track = self
            .first_text(frame_ids::TRACK)
            .map(first_digit_run)
            .unwrap_or(0);
    }

    /// Replace the frame list for `id` with a single UTF-8 text frame
    pub fn set_text_frame(&mut self, id: &str, text: &str) {
        let frame = Frame::text(id, text);
        match self.frames.iter_mut().find(|(frame_id, _)| frame_id == id) {
            Some((_, list)) => *list = vec![frame],
            None => self.frames.push((id.to_string(), vec![frame])),
        }
        self.populate_fields();
    }

    /// All attached pictures, in tag order
    pub fn pictures(&self) -> Vec<&PictureFrame> {
        self.frames
            .iter()
            .flat_map(|(_, list)| list.iter())
            .filter_map(|frame| frame.as_picture())
            .collect()
    }

    /// Frame identifier / display text pairs, in tag order
    pub fn properties(&self) -> Vec<(String, String)> {
        self.frames
            .iter()
            .flat_map(|(id, list)| {
                list.iter()
                    .map(move |frame| (id.clone(), frame.display_text()))
            })
            .collect()
    }

    /// Render the tag back to bytes, always with v2.4 framing.
    ///
    /// Frame headers carry the identifier, a big-endian payload length
    /// and two zero flag bytes; the tag header declares the total frame
    /// length as a synchsafe integer.
    pub fn render(&self) -> ByteBuffer {
        let mut frame_data = ByteBuffer::new();

        for (id, list) in &self.frames {
            for frame in list {
                let payload = frame.render();
                frame_data.append(&ByteBuffer::from_latin1(id));
                frame_data.append(&ByteBuffer::from_u32_be(payload.len() as u32));
                frame_data.append(&ByteBuffer::from_u16_be(0)); // flags
                frame_data.append(&payload);
            }
        }

        let mut out = ByteBuffer::new();
        out.append_slice(Id3v2Header::ID);
        out.append_slice(&[4, 0]); // version 2.4.0
        out.push(0); // flags
        out.append_slice(&synchsafe::encode(frame_data.len() as u32));
        out.append(&frame_data);
        out
    }
}

impl Tag for Id3v2Tag {
    fn title(&self) -> &str {
        &self.title
    }

    fn artist(&self) -> &str {
        &self.artist
    }

    fn album(&self) -> &str {
        &self.album
    }

    fn comment(&self) -> &str {
        &self.comment
    }

    fn genre(&self) -> &str {
        &self.genre
    }

    fn year(&self) -> u32 {
        self.year
    }

    fn track(&self) -> u32 {
        self.track
    }

    fn set_title(&mut self, title: &str) {
        self.set_text_frame(frame_ids::TITLE, title);
    }

    fn set_artist(&mut self, artist: &str) {
        self.set_text_frame(frame_ids::ARTIST, artist);
    }

    fn set_album(&mut self, album: &str) {
        self.set_text_frame(frame_ids::ALBUM, album);
    }

    fn set_comment(&mut self, comment: &str) {
        self.set_text_frame(frame_ids::COMMENT, comment);
    }

    fn set_genre(&mut self, genre: &str) {
        self.set_text_frame(frame_ids::GENRE, genre);
    }

    fn set_year(&mut self, year: u32) {
        self.set_text_frame(frame_ids::RECORDING_DATE, &year.to_string());
    }

    fn set_track(&mut self, track: u32) {
        self.set_text_frame(frame_ids::TRACK, &track.to_string());
    }

    fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.artist.is_empty()
            && self.album.is_empty()
            && self.comment.is_empty()
            && self.genre.is_empty()
            && self.year == 0
            && self.track == 0
    }
}

// First run of four consecutive ASCII digits, parsed as a number
fn first_four_digit_run(text: &str) -> u32 {
    let bytes = text.as_bytes();
    let mut run = 0;
    for (i, byte) in bytes.iter().enumerate() {
        if byte.is_ascii_digit() {
            run += 1;
            if run == 4 {
                return text[i + 1 - 4..=i].parse().unwrap_or(0);
            }
        } else {
            run = 0;
        }
    }
    0
}

// First run of ASCII digits, parsed as a number ("4/12" yields 4)
fn first_digit_run(text: &str) -> u32 {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

fn is_frame_id(bytes: &[u8]) -> bool {
    bytes.len() == 4
        && bytes
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_frame_bytes(id: &str, text: &str, synchsafe_size: bool) -> Vec<u8> {
        let mut payload = vec![0x03];
        payload.extend_from_slice(text.as_bytes());
        let mut out = Vec::new();
        out.extend_from_slice(id.as_bytes());
        if synchsafe_size {
            out.extend_from_slice(&synchsafe::encode(payload.len() as u32));
        } else {
            out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        }
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&payload);
        out
    }

    fn tag_bytes(major_version: u8, frames: &[Vec<u8>]) -> ByteBuffer {
        let body: Vec<u8> = frames.concat();
        let mut out = Vec::new();
        out.extend_from_slice(b"ID3");
        out.extend_from_slice(&[major_version, 0, 0]);
        out.extend_from_slice(&synchsafe::encode(body.len() as u32));
        out.extend_from_slice(&body);
        ByteBuffer::from_bytes(out)
    }

    #[test]
    fn test_read_projects_fields() {
        let data = tag_bytes(
            4,
            &[
                text_frame_bytes("TIT2", "Song", true),
                text_frame_bytes("TPE1", "Band", true),
                text_frame_bytes("TDRC", "2020-05-01", true),
                text_frame_bytes("TRCK", "4/12", true),
            ],
        );
        let tag = Id3v2Tag::read(&data);
        assert_eq!(tag.title(), "Song");
        assert_eq!(tag.artist(), "Band");
        assert_eq!(tag.year(), 2020);
        assert_eq!(tag.track(), 4);
        assert!(!tag.is_empty());
    }

    #[test]
    fn test_year_falls_back_to_legacy_identifiers() {
        let data = tag_bytes(4, &[text_frame_bytes("TYER", "1979", true)]);
        let tag = Id3v2Tag::read(&data);
        assert_eq!(tag.year(), 1979);
    }

    #[test]
    fn test_frame_size_rule_depends_on_version() {
        // Payload of 0x81 bytes: the synchsafe and plain readings differ
        // (0x00 0x00 0x01 0x01 is 129 synchsafe but 257 plain)
        let text: String = "x".repeat(0x80);
        let v4 = tag_bytes(4, &[text_frame_bytes("TIT2", &text, true)]);
        let v3 = tag_bytes(3, &[text_frame_bytes("TIT2", &text, false)]);

        assert_eq!(Id3v2Tag::read(&v4).title(), text);
        assert_eq!(Id3v2Tag::read(&v3).title(), text);

        // A v3-sized frame read as v4 decodes a different size and the
        // scan stops without the frame
        let mut mislabeled = v3.into_bytes();
        mislabeled[3] = 4;
        let tag = Id3v2Tag::read(&ByteBuffer::from_bytes(mislabeled));
        assert_eq!(tag.title(), "");
    }

    #[test]
    fn test_invalid_identifier_stops_scan_keeping_frames() {
        let mut bad_frame = text_frame_bytes("TIT2", "kept", true);
        bad_frame[0] = b'b'; // lowercase violates [A-Z0-9]{4}
        let data = tag_bytes(
            4,
            &[text_frame_bytes("TALB", "Album", true), bad_frame],
        );
        let tag = Id3v2Tag::read(&data);
        assert_eq!(tag.album(), "Album");
        assert_eq!(tag.title(), "");
    }

    #[test]
    fn test_oversized_frame_stops_scan_keeping_frames() {
        let mut huge = Vec::new();
        huge.extend_from_slice(b"TIT2");
        huge.extend_from_slice(&synchsafe::encode(10_000));
        huge.extend_from_slice(&[0, 0, 0x03, b'x']);
        let data = tag_bytes(4, &[text_frame_bytes("TPE1", "Band", true), huge]);
        let tag = Id3v2Tag::read(&data);
        assert_eq!(tag.artist(), "Band");
        assert_eq!(tag.title(), "");
    }

    #[test]
    fn test_padding_stops_scan() {
        let mut frames = vec![text_frame_bytes("TIT2", "Song", true)];
        frames.push(vec![0u8; 32]);
        let tag = Id3v2Tag::read(&tag_bytes(4, &frames));
        assert_eq!(tag.title(), "Song");
    }

    #[test]
    fn test_render_round_trip() {
        let mut tag = Id3v2Tag::new();
        tag.set_title("Song");
        tag.set_artist("Band");
        tag.set_album("Album");
        tag.set_year(2021);
        tag.set_track(7);

        let reparsed = Id3v2Tag::read(&tag.render());
        assert_eq!(reparsed.title(), "Song");
        assert_eq!(reparsed.artist(), "Band");
        assert_eq!(reparsed.album(), "Album");
        assert_eq!(reparsed.year(), 2021);
        assert_eq!(reparsed.track(), 7);
        assert_eq!(reparsed.header().unwrap().major_version, 4);
    }

    #[test]
    fn test_render_upgrades_v3_input_to_v4() {
        let v3 = tag_bytes(3, &[text_frame_bytes("TIT2", "Song", false)]);
        let tag = Id3v2Tag::read(&v3);
        let rendered = tag.render();
        assert_eq!(rendered.at(3), 4);
        assert_eq!(Id3v2Tag::read(&rendered).title(), "Song");
    }

    #[test]
    fn test_render_is_deterministic() {
        let data = tag_bytes(
            4,
            &[
                text_frame_bytes("TPE1", "Band", true),
                text_frame_bytes("TIT2", "Song", true),
            ],
        );
        let tag = Id3v2Tag::read(&data);
        assert_eq!(tag.render(), tag.render());
        // Identifier order from the input survives the round trip
        let ids: Vec<String> = Id3v2Tag::read(&tag.render())
            .properties()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec!["TPE1".to_string(), "TIT2".to_string()]);
    }

    #[test]
    fn test_set_field_replaces_frames() {
        let data = tag_bytes(
            4,
            &[
                text_frame_bytes("TIT2", "Old", true),
                text_frame_bytes("TIT2", "Older", true),
            ],
        );
        let mut tag = Id3v2Tag::read(&data);
        tag.set_title("New");
        assert_eq!(tag.title(), "New");
        let titles: Vec<_> = tag
            .properties()
            .into_iter()
            .filter(|(id, _)| id == "TIT2")
            .collect();
        assert_eq!(titles.len(), 1);
    }

    #[test]
    fn test_projection_helpers() {
        assert_eq!(first_four_digit_run("2020-05-01"), 2020);
        assert_eq!(first_four_digit_run("live 1999 remaster"), 1999);
        assert_eq!(first_four_digit_run("abc"), 0);
        assert_eq!(first_digit_run("4/12"), 4);
        assert_eq!(first_digit_run("12"), 12);
        assert_eq!(first_digit_run(""), 0);
    }
}
