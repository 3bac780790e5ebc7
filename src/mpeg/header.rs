// MPEG audio frame header parsing

use crate::utils::ByteBuffer;

/// MPEG audio version ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    Mpeg1,
    Mpeg2,
    Mpeg25,
    Reserved,
}

impl MpegVersion {
    /// Decode the 2-bit version field
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0x3 {
            0 => MpegVersion::Mpeg25,
            1 => MpegVersion::Reserved,
            2 => MpegVersion::Mpeg2,
            _ => MpegVersion::Mpeg1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MpegVersion::Mpeg1 => "MPEG-1",
            MpegVersion::Mpeg2 => "MPEG-2",
            MpegVersion::Mpeg25 => "MPEG-2.5",
            MpegVersion::Reserved => "reserved",
        }
    }
}

/// Bitrate table for MPEG-1 Layer III (kbps)
const BITRATES_V1_L3: [u32; 16] = [
    0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0,
];

/// Fallback bitrate table for every other (version, layer) pair (kbps).
///
/// Only the MPEG-1 Layer III table is populated with its own rates;
/// other combinations resolve through this shared approximation. Known
/// limitation: their true tables differ and are not modeled yet.
const BITRATES_FALLBACK: [u32; 16] = [
    0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384, 0,
];

/// Sample rate table in Hz, indexed by version bits then the 2-bit
/// sample-rate field; index 3 is invalid in the format and reads as zero
const SAMPLE_RATES: [[u32; 4]; 4] = [
    [11025, 12000, 8000, 0],  // MPEG 2.5
    [0, 0, 0, 0],             // reserved
    [22050, 24000, 16000, 0], // MPEG 2
    [44100, 48000, 32000, 0], // MPEG 1
];

/// Decoded fields of one MPEG audio frame header
#[derive(Debug, Clone, Copy)]
pub struct MpegFrameHeader {
    pub version: MpegVersion,
    pub layer: u8,
    pub bitrate: u32,
    pub sample_rate: u32,
    pub channels: u32,
}

/// Scan a region for the first frame-sync pattern.
///
/// Returns the 4-byte header word at that position with the low 8 bits
/// masked off (they carry per-frame data not needed here). The scan is
/// linear in the region length with no upper bound; callers with
/// pathologically large regions should pre-bound them.
pub fn find_frame(data: &ByteBuffer) -> Option<u32> {
    if data.len() < 4 {
        return None;
    }
    for i in 0..data.len() - 4 {
        if data.at(i) == 0xFF && (data.at(i + 1) & 0xE0) == 0xE0 {
            return Some(data.to_u32_be(i) & 0xFFFF_FF00);
        }
    }
    None
}

impl MpegFrameHeader {
    /// Decode the bit fields of a frame header word.
    ///
    /// Layout: AAAAAAAA AAABBCCx EEEEFFxx IIxxxxxx
    /// A: sync, B: version, C: layer, E: bitrate index,
    /// F: sample-rate index, I: channel mode.
    pub fn parse(header: u32) -> Self {
        let version_bits = (header >> 19) & 0x3;
        let layer_bits = (header >> 17) & 0x3;
        let bitrate_bits = (header >> 12) & 0xF;
        let sample_rate_bits = (header >> 10) & 0x3;
        let channel_bits = (header >> 6) & 0x3;

        let version = MpegVersion::from_bits(version_bits);
        let layer = (4 - layer_bits) as u8;

        MpegFrameHeader {
            version,
            layer,
            bitrate: bitrate_table(version, layer)[bitrate_bits as usize],
            sample_rate: SAMPLE_RATES[version_bits as usize][sample_rate_bits as usize],
            // Mode 3 is single channel; everything else carries two
            channels: if channel_bits == 3 { 1 } else { 2 },
        }
    }
}

fn bitrate_table(version: MpegVersion, layer: u8) -> &'static [u32; 16] {
    if version == MpegVersion::Mpeg1 && layer == 3 {
        &BITRATES_V1_L3
    } else {
        &BITRATES_FALLBACK
    }
}
