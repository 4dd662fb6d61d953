use crate::buffer::chunk::BufferChunk;
use crate::models::error::DeviceResult;

/// A capture device that fills registered buffers with PCM samples.
///
/// The recording session drives the lifecycle: every chunk is prepared
/// and enqueued before `start`, and every prepared chunk is unprepared
/// before the device is dropped. Implementations own the device handle;
/// one instance maps to one open device.
pub trait CaptureDevice {
    /// Register a chunk's memory with the device driver.
    fn prepare(&mut self, chunk: &mut BufferChunk) -> DeviceResult<()>;

    /// Hand a prepared chunk to the device for filling.
    fn enqueue(&mut self, chunk: &mut BufferChunk) -> DeviceResult<()>;

    /// Begin capturing into the enqueued chunks, in order.
    fn start(&mut self) -> DeviceResult<()>;

    /// Stop capturing. Enqueued chunks keep whatever data they hold.
    fn stop(&mut self) -> DeviceResult<()>;

    /// Cancel all pending chunks, returning them to the session.
    fn reset(&mut self) -> DeviceResult<()>;

    /// Unregister a chunk's memory from the device driver.
    fn unprepare(&mut self, chunk: &mut BufferChunk) -> DeviceResult<()>;

    /// Total bytes the device has written into enqueued chunks so far.
    ///
    /// Polled by the session to report progress and detect completion;
    /// monotonically non-decreasing while recording.
    fn bytes_filled(&self) -> u64;
}
