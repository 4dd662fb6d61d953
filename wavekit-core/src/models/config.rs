use std::path::{Path, PathBuf};

/// Destination for a finished recording.
///
/// Passed to [`RecordingSession::end`](crate::session::RecordingSession::end)
/// to persist the captured buffers as a WAV container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveConfig {
    /// Path of the container file to create.
    pub path: PathBuf,

    /// Also write a `{path}.metadata.json` sidecar describing the recording.
    pub write_sidecar: bool,
}

impl SaveConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_sidecar: false,
        }
    }

    pub fn with_sidecar(mut self) -> Self {
        self.write_sidecar = true;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
