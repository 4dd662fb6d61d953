//! # wavekit-windows
//!
//! Windows waveform-audio backend for wavekit.
//!
//! Provides:
//! - `WaveInDevice` — buffered capture via the waveIn API
//! - `WaveOutDevice` — buffered playback via the waveOut API
//! - `SoundPlayer` — fire-and-forget file playback via PlaySound
//! - `device_enumerator` — waveform device enumeration
//!
//! ## Usage
//! ```ignore
//! use wavekit_windows::WaveInDevice;
//! use wavekit_core::{RecordingSession, WaveFormat};
//! use std::time::Duration;
//!
//! let mut device = WaveInDevice::open_default(&WaveFormat::pcm(2, 44_100, 16)).unwrap();
//! let session = RecordingSession::begin(
//!     &mut device,
//!     Duration::from_secs(5),
//!     WaveFormat::pcm(2, 44_100, 16),
//! ).unwrap();
//! ```

#[cfg(target_os = "windows")]
pub mod device_enumerator;
#[cfg(target_os = "windows")]
pub mod sound_player;
#[cfg(target_os = "windows")]
pub mod wavein_device;
#[cfg(target_os = "windows")]
pub mod waveout_device;

#[cfg(target_os = "windows")]
pub use sound_player::SoundPlayer;
#[cfg(target_os = "windows")]
pub use wavein_device::WaveInDevice;
#[cfg(target_os = "windows")]
pub use waveout_device::WaveOutDevice;
