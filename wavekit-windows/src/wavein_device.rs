//! Buffered capture through the waveIn API.
//!
//! One [`WaveInDevice`] owns one open waveIn handle for its lifetime.
//! There is no process-wide device state: two instances are two
//! independent driver sessions.

use std::collections::HashMap;

use thiserror::Error;
use windows::Win32::Media::Audio::{
    waveInAddBuffer, waveInClose, waveInGetNumDevs, waveInOpen, waveInPrepareHeader, waveInReset,
    waveInStart, waveInStop, waveInUnprepareHeader, HWAVEIN, WAVEFORMATEX, WAVEHDR, WAVE_MAPPER,
};
use windows::Win32::Media::Audio::CALLBACK_NULL;

use wavekit_core::buffer::chunk::BufferChunk;
use wavekit_core::models::error::{DeviceError, DeviceResult};
use wavekit_core::models::format::WaveFormat;
use wavekit_core::traits::CaptureDevice;

/// A nonzero MMRESULT from the waveform API.
#[derive(Debug, Error)]
#[error("waveform API error {0:#06x}")]
pub(crate) struct MmError(pub u32);

pub(crate) fn mm(result: u32) -> Result<(), MmError> {
    if result == 0 {
        Ok(())
    } else {
        Err(MmError(result))
    }
}

pub(crate) fn wave_format_ex(format: &WaveFormat) -> WAVEFORMATEX {
    WAVEFORMATEX {
        wFormatTag: format.tag.tag(),
        nChannels: format.channels,
        nSamplesPerSec: format.sample_rate,
        nAvgBytesPerSec: format.byte_rate(),
        nBlockAlign: format.block_align(),
        wBitsPerSample: format.bits_per_sample,
        cbSize: format.extra_bytes,
    }
}

/// Waveform capture device.
///
/// Headers are boxed so their addresses stay valid while registered
/// with the driver, and are keyed by the chunk's data address. A chunk
/// must be unprepared before it is dropped; the session guarantees
/// this, and `Drop` resets the device so the driver holds no dangling
/// buffer references.
pub struct WaveInDevice {
    handle: HWAVEIN,
    headers: HashMap<usize, Box<WAVEHDR>>,
}

impl WaveInDevice {
    /// Open the default capture device for `format`.
    pub fn open_default(format: &WaveFormat) -> DeviceResult<Self> {
        Self::open(WAVE_MAPPER, format)
    }

    /// Open the capture device at `index` for `format`.
    pub fn open(index: u32, format: &WaveFormat) -> DeviceResult<Self> {
        if index != WAVE_MAPPER && index >= unsafe { waveInGetNumDevs() } {
            return Err(DeviceError::NotAvailable);
        }

        let wfx = wave_format_ex(format);
        let mut handle = HWAVEIN::default();
        let result =
            unsafe { waveInOpen(Some(&mut handle), index, &wfx, 0, 0, CALLBACK_NULL) };
        mm(result).map_err(|e| DeviceError::OpenFailed(e.to_string()))?;

        log::debug!("opened waveIn device {index} at {} Hz", format.sample_rate);
        Ok(Self {
            handle,
            headers: HashMap::new(),
        })
    }

    fn key(chunk: &mut BufferChunk) -> usize {
        chunk.as_mut_slice().as_mut_ptr() as usize
    }
}

impl CaptureDevice for WaveInDevice {
    fn prepare(&mut self, chunk: &mut BufferChunk) -> DeviceResult<()> {
        let mut header = Box::new(WAVEHDR {
            lpData: windows::core::PSTR(chunk.as_mut_slice().as_mut_ptr()),
            dwBufferLength: chunk.len() as u32,
            ..Default::default()
        });

        let result = unsafe {
            waveInPrepareHeader(
                self.handle,
                header.as_mut(),
                std::mem::size_of::<WAVEHDR>() as u32,
            )
        };
        mm(result).map_err(|e| DeviceError::PrepareFailed(e.to_string()))?;

        self.headers.insert(Self::key(chunk), header);
        Ok(())
    }

    fn enqueue(&mut self, chunk: &mut BufferChunk) -> DeviceResult<()> {
        let header = self
            .headers
            .get_mut(&Self::key(chunk))
            .ok_or_else(|| DeviceError::EnqueueFailed("chunk is not prepared".into()))?;

        let result = unsafe {
            waveInAddBuffer(
                self.handle,
                header.as_mut(),
                std::mem::size_of::<WAVEHDR>() as u32,
            )
        };
        mm(result).map_err(|e| DeviceError::EnqueueFailed(e.to_string()))
    }

    fn start(&mut self) -> DeviceResult<()> {
        let result = unsafe { waveInStart(self.handle) };
        mm(result).map_err(|e| DeviceError::StartFailed(e.to_string()))
    }

    fn stop(&mut self) -> DeviceResult<()> {
        let result = unsafe { waveInStop(self.handle) };
        mm(result).map_err(|e| DeviceError::StopFailed(e.to_string()))
    }

    fn reset(&mut self) -> DeviceResult<()> {
        let result = unsafe { waveInReset(self.handle) };
        mm(result).map_err(|e| DeviceError::ResetFailed(e.to_string()))
    }

    fn unprepare(&mut self, chunk: &mut BufferChunk) -> DeviceResult<()> {
        let mut header = self
            .headers
            .remove(&Self::key(chunk))
            .ok_or_else(|| DeviceError::UnprepareFailed("chunk is not prepared".into()))?;

        let result = unsafe {
            waveInUnprepareHeader(
                self.handle,
                header.as_mut(),
                std::mem::size_of::<WAVEHDR>() as u32,
            )
        };
        if let Err(e) = mm(result) {
            // Keep the header registered so the driver reference stays valid.
            self.headers.insert(Self::key(chunk), header);
            return Err(DeviceError::UnprepareFailed(e.to_string()));
        }
        Ok(())
    }

    fn bytes_filled(&self) -> u64 {
        // The driver updates dwBytesRecorded as buffers complete; the
        // polled sum may lag the device by one in-flight buffer.
        self.headers
            .values()
            .map(|h| h.dwBytesRecorded as u64)
            .sum()
    }
}

impl Drop for WaveInDevice {
    fn drop(&mut self) {
        unsafe {
            if let Err(e) = mm(waveInReset(self.handle)) {
                log::warn!("waveInReset on drop failed: {e}");
            }
            for (_, mut header) in self.headers.drain() {
                if let Err(e) = mm(waveInUnprepareHeader(
                    self.handle,
                    header.as_mut(),
                    std::mem::size_of::<WAVEHDR>() as u32,
                )) {
                    log::warn!("waveInUnprepareHeader on drop failed: {e}");
                }
            }
            if let Err(e) = mm(waveInClose(self.handle)) {
                log::warn!("waveInClose failed: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wavekit_core::models::format::SampleFormat;

    #[test]
    fn format_tag_is_taken_from_the_descriptor() {
        let mut format = WaveFormat::pcm(2, 48_000, 32);
        format.tag = SampleFormat::IeeeFloat;

        let wfx = wave_format_ex(&format);
        assert_eq!(wfx.wFormatTag, 3);
        assert_eq!(wfx.nAvgBytesPerSec, 384_000);
    }

    #[test]
    fn out_of_range_device_index_is_not_available() {
        // High enough to exceed any real device count, below the mapper.
        let err = match WaveInDevice::open(0x0FFF_FFFF, &WaveFormat::pcm(1, 8_000, 8)) {
            Ok(_) => panic!("bogus device index was opened"),
            Err(e) => e,
        };
        assert_eq!(err, DeviceError::NotAvailable);
    }
}
