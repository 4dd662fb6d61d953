use serde::{Deserialize, Serialize};

/// Sample encoding tag, as stored in the container's format record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// Linear PCM (wire tag 1).
    Pcm,
    /// 32-bit IEEE float (wire tag 3).
    IeeeFloat,
}

impl SampleFormat {
    /// The on-disk format tag.
    pub fn tag(self) -> u16 {
        match self {
            Self::Pcm => 1,
            Self::IeeeFloat => 3,
        }
    }

    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            1 => Some(Self::Pcm),
            3 => Some(Self::IeeeFloat),
            _ => None,
        }
    }
}

/// Format descriptor for a capture or playback stream.
///
/// Only the primary fields are stored. The derived values (byte rate,
/// block alignment) are computed on demand, so they can never go stale
/// against the fields they are derived from.
///
/// Immutable once handed to a device: a device handle is bound to exactly
/// one format for its open lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveFormat {
    pub tag: SampleFormat,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Count in bytes of extra format information following the fixed record.
    pub extra_bytes: u16,
}

impl WaveFormat {
    /// A plain PCM format with no extension bytes.
    pub fn pcm(channels: u16, sample_rate: u32, bits_per_sample: u16) -> Self {
        Self {
            tag: SampleFormat::Pcm,
            channels,
            sample_rate,
            bits_per_sample,
            extra_bytes: 0,
        }
    }

    /// Bytes per mono sample. Integer truncation is intentional;
    /// sub-byte sample widths are unsupported.
    pub fn sample_bytes(&self) -> u32 {
        (self.bits_per_sample / 8) as u32
    }

    /// Bytes consumed or produced per second of audio.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.channels as u32 * self.sample_bytes()
    }

    /// Block size of one interleaved sample frame.
    pub fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }
}
