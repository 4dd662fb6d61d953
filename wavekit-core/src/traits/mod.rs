//! Device seams. Platform backends implement these; core sessions and
//! tests depend only on the traits.

pub mod capture_device;
pub mod playback_device;
pub mod simple_player;

pub use capture_device::CaptureDevice;
pub use playback_device::PlaybackDevice;
pub use simple_player::{PlayFlags, SimplePlayer};
