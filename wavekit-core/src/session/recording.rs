//! Buffered recording session over a capture device.
//!
//! [`RecordingSession::begin`] is atomic: it allocates the full buffer
//! sequence for the requested duration, registers and enqueues every
//! chunk, and starts the device. If any step fails, everything done so
//! far is undone before the error is returned, and the device is left
//! idle. [`RecordingSession::end`] always disarms the device and
//! unregisters every chunk, regardless of save outcome.

use std::time::Duration;

use crate::buffer::allocator;
use crate::buffer::chunk::BufferSequence;
use crate::container::{encode, sidecar};
use crate::models::config::SaveConfig;
use crate::models::error::{ContainerError, DeviceError, PipelineError};
use crate::models::format::WaveFormat;
use crate::models::metadata::RecordingMetadata;
use crate::models::state::SessionState;
use crate::traits::CaptureDevice;

/// Outcome of [`RecordingSession::end`].
#[derive(Debug)]
pub struct EndReport {
    /// The captured buffers, present unless `cleanup` was requested.
    pub buffers: Option<BufferSequence>,

    /// Metadata for the persisted container, when a save was requested
    /// and succeeded.
    pub metadata: Option<RecordingMetadata>,

    /// Save failure, reported separately so a failed save never blocks
    /// device cleanup.
    pub sink_error: Option<ContainerError>,
}

/// An in-progress buffered recording.
///
/// Holds an exclusive borrow of the device for its whole lifetime, so a
/// device can drive at most one session at a time.
pub struct RecordingSession<'d, D: CaptureDevice> {
    device: &'d mut D,
    buffers: BufferSequence,
    format: WaveFormat,
    state: SessionState,
}

impl<'d, D: CaptureDevice> RecordingSession<'d, D> {
    /// Allocate, register, enqueue, and start capturing.
    ///
    /// Equivalent to [`arm`](Self::arm) followed by
    /// [`start`](Self::start), with the session disarmed again if the
    /// start fails.
    pub fn begin(
        device: &'d mut D,
        duration: Duration,
        format: WaveFormat,
    ) -> Result<Self, PipelineError> {
        let mut session = Self::arm(device, duration, format)?;
        if let Err(e) = session.start() {
            Self::roll_back(session.device, &mut session.buffers);
            return Err(e.into());
        }
        Ok(session)
    }

    /// Allocate the buffer sequence and register and enqueue every
    /// chunk, leaving the device armed but not started.
    ///
    /// Failure at any chunk rolls back: pending chunks are cancelled,
    /// registered chunks unregistered, and the device returns to idle.
    /// Rollback errors are logged, not surfaced; the original failure
    /// is.
    pub fn arm(
        device: &'d mut D,
        duration: Duration,
        format: WaveFormat,
    ) -> Result<Self, PipelineError> {
        let mut buffers = allocator::allocate(duration, &format)?;

        let mut failure: Option<DeviceError> = None;
        for (index, chunk) in buffers.iter_mut().enumerate() {
            let armed = device.prepare(chunk).and_then(|()| {
                chunk.set_prepared(true);
                device.enqueue(chunk)
            });
            if let Err(e) = armed {
                log::error!("arming failed at chunk {index}: {e}");
                failure = Some(e);
                break;
            }
        }
        if let Some(e) = failure {
            Self::roll_back(device, &mut buffers);
            return Err(e.into());
        }

        log::debug!(
            "session armed: {} chunk(s), {} bytes",
            buffers.chunk_count(),
            buffers.total_len()
        );
        Ok(Self {
            device,
            buffers,
            format,
            state: SessionState::Armed,
        })
    }

    /// Start the device filling the armed chunks, in order.
    ///
    /// On failure the session stays armed; the caller can retry or
    /// [`end`](Self::end) it.
    pub fn start(&mut self) -> Result<(), DeviceError> {
        if !self.state.is_armed() {
            return Err(DeviceError::StartFailed(format!(
                "session is {:?}, not armed",
                self.state
            )));
        }
        if let Err(e) = self.device.start() {
            log::error!("device start failed: {e}");
            return Err(e);
        }

        self.state = SessionState::Recording;
        log::info!(
            "recording started: {} chunk(s), {} bytes, {} Hz",
            self.buffers.chunk_count(),
            self.buffers.total_len(),
            self.format.sample_rate
        );
        Ok(())
    }

    /// Undo a partial begin: cancel pending chunks, then unregister
    /// every registered chunk. Best-effort; failures are logged.
    fn roll_back(device: &mut D, buffers: &mut BufferSequence) {
        if let Err(e) = device.reset() {
            log::warn!("rollback reset failed: {e}");
        }
        for chunk in buffers.iter_mut() {
            if chunk.is_prepared() {
                if let Err(e) = device.unprepare(chunk) {
                    log::warn!("rollback unprepare failed: {e}");
                }
                chunk.set_prepared(false);
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn format(&self) -> &WaveFormat {
        &self.format
    }

    /// Bytes the device has captured so far. Poll this for progress.
    pub fn bytes_filled(&self) -> u64 {
        self.device.bytes_filled()
    }

    /// Whether the device has filled every allocated chunk.
    pub fn is_fill_complete(&self) -> bool {
        self.device.bytes_filled() >= self.buffers.total_len()
    }

    /// Stop capturing, disarm the device, and optionally persist.
    ///
    /// The device side runs first and unconditionally: stop, cancel
    /// pending chunks, unregister every chunk. A device failure along
    /// the way is returned after cleanup completes as far as possible.
    /// The save, when requested, runs after the device is clean; its
    /// failure goes into [`EndReport::sink_error`] rather than the
    /// return value. With `cleanup` the captured buffers are dropped
    /// instead of returned.
    pub fn end(
        mut self,
        save: Option<&SaveConfig>,
        cleanup: bool,
    ) -> Result<EndReport, DeviceError> {
        self.state = SessionState::Stopped;

        let mut first_error: Option<DeviceError> = None;
        let mut note = |result: Result<(), DeviceError>, what: &str| {
            if let Err(e) = result {
                log::error!("{what} failed during session end: {e}");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        };

        note(self.device.stop(), "stop");
        note(self.device.reset(), "reset");
        for chunk in self.buffers.iter_mut() {
            if chunk.is_prepared() {
                note(self.device.unprepare(chunk), "unprepare");
                chunk.set_prepared(false);
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        let mut metadata = None;
        let mut sink_error = None;
        if let Some(config) = save {
            match self.persist(config) {
                Ok(m) => metadata = Some(m),
                Err(e) => {
                    log::error!("saving recording failed: {e}");
                    sink_error = Some(e);
                }
            }
        }

        log::info!("recording ended: {} bytes captured", self.bytes_filled());
        Ok(EndReport {
            buffers: (!cleanup).then_some(self.buffers),
            metadata,
            sink_error,
        })
    }

    fn persist(&self, config: &SaveConfig) -> Result<RecordingMetadata, ContainerError> {
        let checksum = encode::encode_file(config.path(), &self.format, &self.buffers)?;

        let data_size = self.buffers.total_len();
        let duration_secs = data_size as f64 / self.format.byte_rate() as f64;
        let metadata = RecordingMetadata::new(
            &self.format,
            duration_secs,
            data_size,
            &checksum,
            &config.path().to_string_lossy(),
        );

        if config.write_sidecar {
            sidecar::write_sidecar(config.path(), &metadata)?;
        }
        Ok(metadata)
    }
}
