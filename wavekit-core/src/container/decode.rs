//! Container decode: WAV file → format descriptor + flat payload.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use crate::buffer::chunk::BufferSequence;
use crate::container::riff::{RiffReader, DATA_ID, FMT_ID, WAVE_FORM};
use crate::models::error::ContainerError;
use crate::models::format::{SampleFormat, WaveFormat};

/// Size of the fixed PCM format record inside the `fmt ` chunk.
const FMT_RECORD_SIZE: u32 = 16;

/// A decoded audio container.
///
/// The payload is always a single flat buffer; decode never reproduces
/// the chunking the encoder happened to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundAsset {
    pub format: WaveFormat,
    /// Number of mono samples in the payload.
    pub sample_count: u32,
    /// Size of the payload in bytes, as declared by the data chunk.
    pub byte_size: u32,
    pub payload: Vec<u8>,
}

impl SoundAsset {
    /// Split the flat payload into a playable buffer sequence.
    pub fn into_sequence(self) -> BufferSequence {
        BufferSequence::from_payload(self.payload)
    }
}

/// Decode a WAV container from a file on disk.
pub fn decode_file(path: &Path) -> Result<SoundAsset, ContainerError> {
    let file = File::open(path).map_err(|e| ContainerError::Open(e.to_string()))?;
    decode(BufReader::new(file))
}

/// Decode a WAV container from any seekable byte source.
///
/// Walks the container in order: descend into the outer `RIFF`/`WAVE`
/// group, descend into `fmt ` and read exactly the fixed-size format
/// record, ascend, descend into `data` and read exactly the declared
/// number of payload bytes. Any size mismatch fails with
/// [`ContainerError`]; partially read payloads are dropped.
pub fn decode<R: Read + Seek>(source: R) -> Result<SoundAsset, ContainerError> {
    let mut reader = RiffReader::open(source, WAVE_FORM)?;

    // Format record. Tolerate the chunk being exactly the fixed-size
    // record with no extension bytes.
    let fmt = reader.descend(FMT_ID)?;
    if fmt.size < FMT_RECORD_SIZE {
        return Err(ContainerError::Truncated {
            chunk: "fmt ".into(),
            expected: FMT_RECORD_SIZE as u64,
            actual: fmt.size as u64,
        });
    }
    let mut record = [0u8; FMT_RECORD_SIZE as usize];
    reader.read_exact(FMT_ID, &mut record)?;

    let tag = u16::from_le_bytes([record[0], record[1]]);
    let channels = u16::from_le_bytes([record[2], record[3]]);
    let sample_rate = u32::from_le_bytes([record[4], record[5], record[6], record[7]]);
    // Bytes 8..14 hold the stored byte rate and block alignment; both are
    // derived values and are recomputed from the primary fields on use.
    let bits_per_sample = u16::from_le_bytes([record[14], record[15]]);

    let extra_bytes = if fmt.size >= FMT_RECORD_SIZE + 2 {
        let mut cb = [0u8; 2];
        reader.read_exact(FMT_ID, &mut cb)?;
        u16::from_le_bytes(cb)
    } else {
        0
    };

    let format = WaveFormat {
        tag: SampleFormat::from_tag(tag)
            .ok_or_else(|| ContainerError::UnsupportedFormat(format!("format tag {tag}")))?,
        channels,
        sample_rate,
        bits_per_sample,
        extra_bytes,
    };
    if format.sample_bytes() == 0 {
        return Err(ContainerError::UnsupportedFormat(format!(
            "{bits_per_sample} bits per sample"
        )));
    }
    reader.ascend(fmt)?;

    // Payload: one flat buffer of exactly the declared size.
    let data = reader.descend(DATA_ID)?;
    let mut payload = vec![0u8; data.size as usize];
    reader.read_exact(DATA_ID, &mut payload)?;

    let sample_count = data.size / format.sample_bytes();
    log::debug!(
        "decoded container: {} Hz, {} ch, {} bits, {} bytes",
        format.sample_rate,
        format.channels,
        format.bits_per_sample,
        data.size
    );

    Ok(SoundAsset {
        format,
        sample_count,
        byte_size: data.size,
        payload,
    })
}
