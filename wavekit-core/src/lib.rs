//! # wavekit-core
//!
//! Platform-agnostic buffered PCM pipeline.
//!
//! Provides format math, bounded-chunk buffer allocation with
//! all-or-nothing rollback, a RIFF/WAV container codec, and recording
//! and playback session orchestration. Platform backends (Windows
//! waveform API) implement the device traits and plug into the generic
//! sessions.
//!
//! ## Architecture
//!
//! ```text
//! wavekit-core (this crate)
//! ├── traits/      ← CaptureDevice, PlaybackDevice, SimplePlayer
//! ├── models/      ← WaveFormat, SessionState, SaveConfig, errors, metadata
//! ├── buffer/      ← BufferChunk, BufferSequence, chunked allocator
//! ├── container/   ← RIFF reader/writer, WAV encode/decode, JSON sidecar
//! └── session/     ← RecordingSession, PlaybackController, timed playback
//! ```

pub mod buffer;
pub mod container;
pub mod models;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use buffer::allocator::{ChunkStorage, HeapStorage, MAX_CHUNK_BYTES};
pub use buffer::chunk::{BufferChunk, BufferSequence};
pub use container::decode::SoundAsset;
pub use models::config::SaveConfig;
pub use models::device_info::{DeviceInfo, DeviceKind};
pub use models::error::{AllocationError, ContainerError, DeviceError, PipelineError};
pub use models::format::{SampleFormat, WaveFormat};
pub use models::metadata::RecordingMetadata;
pub use models::state::SessionState;
pub use session::playback::{play_file_timed, PlaybackController};
pub use session::recording::{EndReport, RecordingSession};
pub use traits::{CaptureDevice, PlayFlags, PlaybackDevice, SimplePlayer};
