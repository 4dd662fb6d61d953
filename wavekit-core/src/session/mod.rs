pub mod playback;
pub mod recording;

pub use playback::{play_file_timed, PlaybackController};
pub use recording::{EndReport, RecordingSession};
