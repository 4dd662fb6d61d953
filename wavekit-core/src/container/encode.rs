//! Container encode: format descriptor + buffer sequence → WAV file.

use std::fs::{self, File};
use std::io::{Seek, Write};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::buffer::chunk::BufferSequence;
use crate::container::riff::{RiffWriter, DATA_ID, FMT_ID, WAVE_FORM};
use crate::models::error::ContainerError;
use crate::models::format::WaveFormat;

/// Encode a buffer sequence into a WAV container at `path`.
///
/// On success returns the SHA-256 hex digest of the finished file. On
/// failure the destination is left in a caller-visible partial state; no
/// on-disk rollback is attempted.
pub fn encode_file(
    path: &Path,
    format: &WaveFormat,
    sequence: &BufferSequence,
) -> Result<String, ContainerError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| ContainerError::Open(format!("failed to create directory: {e}")))?;
        }
    }
    let file = File::create(path).map_err(|e| ContainerError::Open(e.to_string()))?;
    encode(file, format, sequence)?;
    sha256_file(path)
}

/// Encode a buffer sequence into any seekable byte sink.
///
/// Chunk order is fixed: outer `RIFF`/`WAVE` group, `fmt ` sub-chunk
/// holding the format record, then the `data` sub-chunk holding every
/// buffer chunk in order, contiguously. Each ascend finalizes the
/// enclosing size field. The first failed write short-circuits.
pub fn encode<W: Write + Seek>(
    sink: W,
    format: &WaveFormat,
    sequence: &BufferSequence,
) -> Result<W, ContainerError> {
    let mut writer = RiffWriter::create(sink, WAVE_FORM)?;

    writer.create_chunk(FMT_ID)?;
    writer.write_all(&format_record(format))?;
    if format.extra_bytes > 0 {
        writer.write_all(&format.extra_bytes.to_le_bytes())?;
    }
    writer.ascend()?;

    writer.create_chunk(DATA_ID)?;
    for chunk in sequence.iter() {
        writer.write_all(chunk.as_slice())?;
    }
    writer.ascend()?;

    log::debug!(
        "encoded container: {} chunk(s), {} payload bytes",
        sequence.chunk_count(),
        sequence.total_len()
    );
    writer.finish()
}

/// The 16-byte fixed format record, with derived fields recomputed from
/// the primary ones at write time.
fn format_record(format: &WaveFormat) -> [u8; 16] {
    let mut record = [0u8; 16];
    record[0..2].copy_from_slice(&format.tag.tag().to_le_bytes());
    record[2..4].copy_from_slice(&format.channels.to_le_bytes());
    record[4..8].copy_from_slice(&format.sample_rate.to_le_bytes());
    record[8..12].copy_from_slice(&format.byte_rate().to_le_bytes());
    record[12..14].copy_from_slice(&format.block_align().to_le_bytes());
    record[14..16].copy_from_slice(&format.bits_per_sample.to_le_bytes());
    record
}

/// SHA-256 hex digest of a file.
fn sha256_file(path: &Path) -> Result<String, ContainerError> {
    let data = fs::read(path)
        .map_err(|e| ContainerError::Open(format!("failed to read file for checksum: {e}")))?;
    let digest = Sha256::digest(&data);
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}
