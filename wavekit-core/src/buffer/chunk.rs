use crate::buffer::allocator::MAX_CHUNK_BYTES;

/// One bounded-size owned byte region within a [`BufferSequence`].
///
/// The `prepared` flag tracks whether the chunk is currently registered
/// with a device driver. It is flipped by the recording session or
/// playback controller around the device prepare/unprepare calls; a chunk
/// must never be dropped while prepared with a live device.
#[derive(Debug, PartialEq, Eq)]
pub struct BufferChunk {
    data: Vec<u8>,
    prepared: bool,
}

impl BufferChunk {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            prepared: false,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Whether the chunk is registered with a device driver.
    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub(crate) fn set_prepared(&mut self, prepared: bool) {
        self.prepared = prepared;
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

/// An ordered list of [`BufferChunk`]s.
///
/// Invariant: every element except possibly the last has exactly
/// [`MAX_CHUNK_BYTES`]; the last holds the size remainder, which is
/// always greater than zero.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BufferSequence {
    chunks: Vec<BufferChunk>,
}

impl BufferSequence {
    /// An empty sequence. Playing it is a no-op.
    pub fn empty() -> Self {
        Self { chunks: Vec::new() }
    }

    pub(crate) fn from_chunks(chunks: Vec<BufferChunk>) -> Self {
        Self { chunks }
    }

    /// Split a flat payload into a sequence honoring the chunk-size
    /// invariant. An empty payload yields an empty sequence.
    pub fn from_payload(payload: Vec<u8>) -> Self {
        if payload.len() <= MAX_CHUNK_BYTES {
            if payload.is_empty() {
                return Self::empty();
            }
            return Self {
                chunks: vec![BufferChunk::new(payload)],
            };
        }

        let chunks = payload
            .chunks(MAX_CHUNK_BYTES)
            .map(|part| BufferChunk::new(part.to_vec()))
            .collect();
        Self { chunks }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total payload size in bytes across all chunks.
    pub fn total_len(&self) -> u64 {
        self.chunks.iter().map(|c| c.len() as u64).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BufferChunk> {
        self.chunks.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut BufferChunk> {
        self.chunks.iter_mut()
    }

    /// Flatten the sequence into a single contiguous payload.
    pub fn concat(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.total_len() as usize);
        for chunk in &self.chunks {
            payload.extend_from_slice(chunk.as_slice());
        }
        payload
    }

    pub fn into_chunks(self) -> Vec<BufferChunk> {
        self.chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_tracks_prepared_flag() {
        let mut chunk = BufferChunk::new(vec![0u8; 8]);
        assert!(!chunk.is_prepared());
        chunk.set_prepared(true);
        assert!(chunk.is_prepared());
    }

    #[test]
    fn sequence_totals() {
        let seq = BufferSequence::from_chunks(vec![
            BufferChunk::new(vec![1, 2, 3]),
            BufferChunk::new(vec![4, 5]),
        ]);
        assert_eq!(seq.chunk_count(), 2);
        assert_eq!(seq.total_len(), 5);
        assert_eq!(seq.concat(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn from_payload_splits_at_max_chunk_size() {
        let payload = vec![0xABu8; MAX_CHUNK_BYTES + 7];
        let seq = BufferSequence::from_payload(payload.clone());

        assert_eq!(seq.chunk_count(), 2);
        let sizes: Vec<usize> = seq.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![MAX_CHUNK_BYTES, 7]);
        assert_eq!(seq.concat(), payload);
    }

    #[test]
    fn from_payload_empty_is_empty_sequence() {
        let seq = BufferSequence::from_payload(Vec::new());
        assert!(seq.is_empty());
        assert_eq!(seq.total_len(), 0);
    }
}
