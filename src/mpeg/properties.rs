// Audio property derivation from the first MPEG frame header

use crate::mpeg::header::{self, MpegFrameHeader, MpegVersion};
use crate::utils::ByteBuffer;
use crate::AudioProperties;

/// Stream-level audio properties of an MPEG audio region.
///
/// Duration is a constant-bitrate estimate over the whole stream length;
/// variable-bitrate streams get an approximation, not a frame-accurate
/// figure. When no frame sync is found every field is zero.
#[derive(Debug, Clone, Copy)]
pub struct MpegProperties {
    length: u32,
    bitrate: u32,
    sample_rate: u32,
    channels: u32,
    version: MpegVersion,
    layer: u8,
}

impl Default for MpegProperties {
    fn default() -> Self {
        MpegProperties {
            length: 0,
            bitrate: 0,
            sample_rate: 0,
            channels: 0,
            version: MpegVersion::Reserved,
            layer: 0,
        }
    }
}

impl MpegProperties {
    /// Derive properties from an audio region and its byte length
    pub fn read(data: &ByteBuffer, stream_length: usize) -> Self {
        let mut properties = MpegProperties::default();

        let Some(word) = header::find_frame(data) else {
            return properties;
        };

        let frame = MpegFrameHeader::parse(word);
        properties.version = frame.version;
        properties.layer = frame.layer;
        properties.bitrate = frame.bitrate;
        properties.sample_rate = frame.sample_rate;
        properties.channels = frame.channels;

        if properties.bitrate > 0 {
            let bits = stream_length as f64 * 8.0;
            properties.length = (bits / (properties.bitrate as f64 * 1000.0)).round() as u32;
        }

        properties
    }

    pub fn version(&self) -> MpegVersion {
        self.version
    }

    pub fn layer(&self) -> u8 {
        self.layer
    }
}

impl AudioProperties for MpegProperties {
    fn length_in_seconds(&self) -> u32 {
        self.length
    }

    fn bitrate(&self) -> u32 {
        self.bitrate
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u32 {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_with_frame(total_len: usize) -> ByteBuffer {
        // MPEG-1 Layer III, 128 kbps, 44100 Hz, stereo
        let mut bytes = 0xFFFB_9000u32.to_be_bytes().to_vec();
        bytes.resize(total_len, 0);
        ByteBuffer::from_bytes(bytes)
    }

    #[test]
    fn test_cbr_duration_estimate() {
        let stream_length = 3_000_000;
        let data = stream_with_frame(64);
        let properties = MpegProperties::read(&data, stream_length);
        assert_eq!(properties.bitrate(), 128);
        assert_eq!(properties.sample_rate(), 44100);
        assert_eq!(properties.channels(), 2);
        // 3_000_000 * 8 / 128_000, rounded
        assert_eq!(properties.length_in_seconds(), 188);
        assert_eq!(properties.version(), MpegVersion::Mpeg1);
        assert_eq!(properties.layer(), 3);
    }

    #[test]
    fn test_no_sync_yields_zeroed_properties() {
        let data = ByteBuffer::from_bytes(vec![0u8; 1000]);
        let properties = MpegProperties::read(&data, 1000);
        assert_eq!(properties.bitrate(), 0);
        assert_eq!(properties.length_in_seconds(), 0);
        assert_eq!(properties.sample_rate(), 0);
        assert_eq!(properties.channels(), 0);
    }
}
