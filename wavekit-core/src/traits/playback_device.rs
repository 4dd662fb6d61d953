use crate::buffer::chunk::BufferChunk;
use crate::models::error::DeviceResult;

/// A playback device that renders submitted PCM buffers.
///
/// The playback controller prepares and submits chunks in order;
/// submitted chunks play back-to-back. `reset` cancels whatever is
/// still queued; every prepared chunk must be unprepared before the
/// device is dropped.
pub trait PlaybackDevice {
    /// Register a chunk's memory with the device driver.
    fn prepare(&mut self, chunk: &mut BufferChunk) -> DeviceResult<()>;

    /// Queue a prepared chunk for rendering.
    fn submit(&mut self, chunk: &mut BufferChunk) -> DeviceResult<()>;

    /// Cancel all queued chunks and stop rendering.
    fn reset(&mut self) -> DeviceResult<()>;

    /// Unregister a chunk's memory from the device driver.
    fn unprepare(&mut self, chunk: &mut BufferChunk) -> DeviceResult<()>;
}
