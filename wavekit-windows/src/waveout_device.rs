//! Buffered playback through the waveOut API.

use std::collections::HashMap;

use windows::Win32::Media::Audio::{
    waveOutClose, waveOutGetNumDevs, waveOutOpen, waveOutPrepareHeader, waveOutReset,
    waveOutUnprepareHeader, waveOutWrite, HWAVEOUT, WAVEHDR, WAVE_MAPPER,
};
use windows::Win32::Media::Audio::CALLBACK_NULL;

use wavekit_core::buffer::chunk::BufferChunk;
use wavekit_core::models::error::{DeviceError, DeviceResult};
use wavekit_core::models::format::WaveFormat;
use wavekit_core::traits::PlaybackDevice;

use crate::wavein_device::{mm, wave_format_ex};

/// Waveform playback device.
///
/// Same header discipline as [`WaveInDevice`](crate::WaveInDevice):
/// boxed headers keyed by chunk data address, reset-on-drop so the
/// driver never outlives a registered buffer.
pub struct WaveOutDevice {
    handle: HWAVEOUT,
    headers: HashMap<usize, Box<WAVEHDR>>,
}

impl WaveOutDevice {
    /// Open the default playback device for `format`.
    pub fn open_default(format: &WaveFormat) -> DeviceResult<Self> {
        Self::open(WAVE_MAPPER, format)
    }

    /// Open the playback device at `index` for `format`.
    pub fn open(index: u32, format: &WaveFormat) -> DeviceResult<Self> {
        if index != WAVE_MAPPER && index >= unsafe { waveOutGetNumDevs() } {
            return Err(DeviceError::NotAvailable);
        }

        let wfx = wave_format_ex(format);
        let mut handle = HWAVEOUT::default();
        let result =
            unsafe { waveOutOpen(Some(&mut handle), index, &wfx, 0, 0, CALLBACK_NULL) };
        mm(result).map_err(|e| DeviceError::OpenFailed(e.to_string()))?;

        log::debug!("opened waveOut device {index} at {} Hz", format.sample_rate);
        Ok(Self {
            handle,
            headers: HashMap::new(),
        })
    }

    fn key(chunk: &mut BufferChunk) -> usize {
        chunk.as_mut_slice().as_mut_ptr() as usize
    }
}

impl PlaybackDevice for WaveOutDevice {
    fn prepare(&mut self, chunk: &mut BufferChunk) -> DeviceResult<()> {
        let mut header = Box::new(WAVEHDR {
            lpData: windows::core::PSTR(chunk.as_mut_slice().as_mut_ptr()),
            dwBufferLength: chunk.len() as u32,
            ..Default::default()
        });

        let result = unsafe {
            waveOutPrepareHeader(
                self.handle,
                header.as_mut(),
                std::mem::size_of::<WAVEHDR>() as u32,
            )
        };
        mm(result).map_err(|e| DeviceError::PrepareFailed(e.to_string()))?;

        self.headers.insert(Self::key(chunk), header);
        Ok(())
    }

    fn submit(&mut self, chunk: &mut BufferChunk) -> DeviceResult<()> {
        let header = self
            .headers
            .get_mut(&Self::key(chunk))
            .ok_or_else(|| DeviceError::SubmitFailed("chunk is not prepared".into()))?;

        let result = unsafe {
            waveOutWrite(
                self.handle,
                header.as_mut(),
                std::mem::size_of::<WAVEHDR>() as u32,
            )
        };
        mm(result).map_err(|e| DeviceError::SubmitFailed(e.to_string()))
    }

    fn reset(&mut self) -> DeviceResult<()> {
        let result = unsafe { waveOutReset(self.handle) };
        mm(result).map_err(|e| DeviceError::ResetFailed(e.to_string()))
    }

    fn unprepare(&mut self, chunk: &mut BufferChunk) -> DeviceResult<()> {
        let mut header = self
            .headers
            .remove(&Self::key(chunk))
            .ok_or_else(|| DeviceError::UnprepareFailed("chunk is not prepared".into()))?;

        let result = unsafe {
            waveOutUnprepareHeader(
                self.handle,
                header.as_mut(),
                std::mem::size_of::<WAVEHDR>() as u32,
            )
        };
        if let Err(e) = mm(result) {
            self.headers.insert(Self::key(chunk), header);
            return Err(DeviceError::UnprepareFailed(e.to_string()));
        }
        Ok(())
    }
}

impl Drop for WaveOutDevice {
    fn drop(&mut self) {
        unsafe {
            if let Err(e) = mm(waveOutReset(self.handle)) {
                log::warn!("waveOutReset on drop failed: {e}");
            }
            for (_, mut header) in self.headers.drain() {
                if let Err(e) = mm(waveOutUnprepareHeader(
                    self.handle,
                    header.as_mut(),
                    std::mem::size_of::<WAVEHDR>() as u32,
                )) {
                    log::warn!("waveOutUnprepareHeader on drop failed: {e}");
                }
            }
            if let Err(e) = mm(waveOutClose(self.handle)) {
                log::warn!("waveOutClose failed: {e}");
            }
        }
    }
}
