//! Splits a requested recording duration into bounded-size owned buffers.
//!
//! Allocation is all-or-nothing: if any individual buffer allocation
//! fails, every previously allocated buffer in the same request is
//! returned to its [`ChunkStorage`] before the failure is signaled, so a
//! failed request never leaks chunks.

use std::time::Duration;

use crate::buffer::chunk::{BufferChunk, BufferSequence};
use crate::models::error::AllocationError;
use crate::models::format::WaveFormat;

/// Maximum size of one chunk, in bytes. Pipeline-wide constant.
pub const MAX_CHUNK_BYTES: usize = 1_000_000;

/// Source of raw chunk memory.
///
/// The default [`HeapStorage`] allocates from the heap with fallible
/// reservation. Tests inject failing implementations to exercise the
/// rollback guarantee without exhausting real memory.
pub trait ChunkStorage {
    /// Allocate a zeroed buffer of exactly `len` bytes.
    fn allocate(&mut self, len: usize) -> Result<Vec<u8>, String>;

    /// Return a buffer obtained from [`allocate`](Self::allocate).
    ///
    /// Called during rollback of a failed request. The default simply
    /// drops the buffer.
    fn release(&mut self, buffer: Vec<u8>) {
        drop(buffer);
    }
}

/// Heap-backed chunk storage.
#[derive(Debug, Default)]
pub struct HeapStorage;

impl ChunkStorage for HeapStorage {
    fn allocate(&mut self, len: usize) -> Result<Vec<u8>, String> {
        let mut buffer = Vec::new();
        buffer.try_reserve_exact(len).map_err(|e| e.to_string())?;
        buffer.resize(len, 0);
        Ok(buffer)
    }
}

/// Total payload size for a recording of `duration` in `format`.
pub fn total_bytes(duration: Duration, format: &WaveFormat) -> u64 {
    (duration.as_secs_f64() * format.byte_rate() as f64).round() as u64
}

/// The chunk sizes a request would allocate, without allocating.
///
/// Every size except the last is exactly [`MAX_CHUNK_BYTES`]; the last
/// is the remainder, computed directly by subtraction. An exact multiple
/// of the chunk size still yields a full-size last chunk, never a
/// zero-size one.
pub fn plan_chunk_sizes(duration: Duration, format: &WaveFormat) -> Vec<usize> {
    let total = total_bytes(duration, format);
    if total == 0 {
        return Vec::new();
    }

    let max = MAX_CHUNK_BYTES as u64;
    let chunk_count = total.div_ceil(max) as usize;
    let last = (total - max * (chunk_count as u64 - 1)) as usize;

    let mut sizes = vec![MAX_CHUNK_BYTES; chunk_count];
    sizes[chunk_count - 1] = last;
    sizes
}

/// Allocate the buffer sequence for a recording request from the heap.
pub fn allocate(duration: Duration, format: &WaveFormat) -> Result<BufferSequence, AllocationError> {
    allocate_with(&mut HeapStorage, duration, format)
}

/// Allocate the buffer sequence for a recording request from `storage`.
pub fn allocate_with<S: ChunkStorage>(
    storage: &mut S,
    duration: Duration,
    format: &WaveFormat,
) -> Result<BufferSequence, AllocationError> {
    let sizes = plan_chunk_sizes(duration, format);
    if sizes.is_empty() {
        return Err(AllocationError::EmptyRequest(format!(
            "{:?} at {} bytes/s",
            duration,
            format.byte_rate()
        )));
    }

    let mut chunks: Vec<BufferChunk> = Vec::with_capacity(sizes.len());
    for (index, &size) in sizes.iter().enumerate() {
        match storage.allocate(size) {
            Ok(buffer) => chunks.push(BufferChunk::new(buffer)),
            Err(reason) => {
                // Roll back every chunk allocated so far before reporting.
                for chunk in chunks.drain(..).rev() {
                    storage.release(chunk.into_vec());
                }
                return Err(AllocationError::ChunkAllocFailed {
                    index,
                    requested: size,
                    reason,
                });
            }
        }
    }

    log::debug!(
        "allocated {} chunk(s), {} bytes total",
        sizes.len(),
        sizes.iter().sum::<usize>()
    );
    Ok(BufferSequence::from_chunks(chunks))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Storage that fails at a chosen allocation index and keeps a
    /// live-buffer balance to verify rollback completeness.
    struct FailingStorage {
        fail_at: usize,
        allocated: usize,
        live: isize,
    }

    impl FailingStorage {
        fn new(fail_at: usize) -> Self {
            Self {
                fail_at,
                allocated: 0,
                live: 0,
            }
        }
    }

    impl ChunkStorage for FailingStorage {
        fn allocate(&mut self, len: usize) -> Result<Vec<u8>, String> {
            if self.allocated == self.fail_at {
                return Err("injected failure".into());
            }
            self.allocated += 1;
            self.live += 1;
            Ok(vec![0; len])
        }

        fn release(&mut self, buffer: Vec<u8>) {
            self.live -= 1;
            drop(buffer);
        }
    }

    fn cd_stereo() -> WaveFormat {
        WaveFormat::pcm(2, 44_100, 16)
    }

    #[test]
    fn one_second_cd_stereo_is_one_chunk() {
        let sizes = plan_chunk_sizes(Duration::from_secs(1), &cd_stereo());
        assert_eq!(sizes, vec![176_400]);
    }

    #[test]
    fn long_request_splits_with_remainder() {
        // 10 s at 176 400 B/s = 1 764 000 B → one full chunk + 764 000.
        let sizes = plan_chunk_sizes(Duration::from_secs(10), &cd_stereo());
        assert_eq!(sizes, vec![MAX_CHUNK_BYTES, 764_000]);
        assert_eq!(sizes.iter().sum::<usize>(), 1_764_000);
    }

    #[test]
    fn exact_multiple_keeps_full_last_chunk() {
        // 8 000 Hz mono 8-bit: 125 s = exactly 1 000 000 bytes.
        let format = WaveFormat::pcm(1, 8_000, 8);
        let sizes = plan_chunk_sizes(Duration::from_secs(125), &format);
        assert_eq!(sizes, vec![MAX_CHUNK_BYTES]);

        // 250 s = exactly two full chunks; the last is never zero-size.
        let sizes = plan_chunk_sizes(Duration::from_secs(250), &format);
        assert_eq!(sizes, vec![MAX_CHUNK_BYTES, MAX_CHUNK_BYTES]);
    }

    #[test]
    fn sizes_sum_to_duration_times_byte_rate() {
        let format = WaveFormat::pcm(2, 48_000, 16);
        for secs in [1u64, 3, 7, 31] {
            let duration = Duration::from_secs(secs);
            let sizes = plan_chunk_sizes(duration, &format);
            let total: u64 = sizes.iter().map(|&s| s as u64).sum();
            assert_eq!(total, total_bytes(duration, &format));
            for &size in &sizes[..sizes.len() - 1] {
                assert_eq!(size, MAX_CHUNK_BYTES);
            }
            let last = *sizes.last().unwrap();
            assert!(last > 0 && last <= MAX_CHUNK_BYTES);
        }
    }

    #[test]
    fn allocate_matches_plan() {
        let seq = allocate(Duration::from_secs(10), &cd_stereo()).unwrap();
        assert_eq!(seq.chunk_count(), 2);
        assert_eq!(seq.total_len(), 1_764_000);
    }

    #[test]
    fn zero_duration_is_empty_request() {
        let err = allocate(Duration::ZERO, &cd_stereo()).unwrap_err();
        assert!(matches!(err, AllocationError::EmptyRequest(_)));
    }

    #[test]
    fn failure_rolls_back_all_prior_chunks() {
        // 30 s at 176 400 B/s needs 6 chunks; fail at each index in turn.
        let duration = Duration::from_secs(30);
        let chunk_count = plan_chunk_sizes(duration, &cd_stereo()).len();
        assert_eq!(chunk_count, 6);

        for fail_at in 0..chunk_count {
            let mut storage = FailingStorage::new(fail_at);
            let err = allocate_with(&mut storage, duration, &cd_stereo()).unwrap_err();
            assert!(
                matches!(err, AllocationError::ChunkAllocFailed { index, .. } if index == fail_at)
            );
            assert_eq!(storage.live, 0, "leaked chunks with fail_at={fail_at}");
        }
    }
}
