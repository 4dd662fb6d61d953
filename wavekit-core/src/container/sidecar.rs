//! JSON metadata sidecar next to the container file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::ContainerError;
use crate::models::metadata::RecordingMetadata;

/// Sidecar path for a container file: `recording.wav` →
/// `recording.metadata.json`.
pub fn sidecar_path(container: &Path) -> PathBuf {
    container.with_extension("metadata.json")
}

/// Write the metadata sidecar for a container file.
pub fn write_sidecar(container: &Path, metadata: &RecordingMetadata) -> Result<(), ContainerError> {
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| ContainerError::Sidecar(e.to_string()))?;
    fs::write(sidecar_path(container), json).map_err(|e| ContainerError::Sidecar(e.to_string()))
}

/// Read the metadata sidecar for a container file.
pub fn read_sidecar(container: &Path) -> Result<RecordingMetadata, ContainerError> {
    let json = fs::read_to_string(sidecar_path(container))
        .map_err(|e| ContainerError::Sidecar(e.to_string()))?;
    serde_json::from_str(&json).map_err(|e| ContainerError::Sidecar(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::format::WaveFormat;

    #[test]
    fn sidecar_path_replaces_extension() {
        let path = sidecar_path(Path::new("/tmp/take1.wav"));
        assert_eq!(path, Path::new("/tmp/take1.metadata.json"));
    }

    #[test]
    fn sidecar_round_trips_metadata() {
        let container = std::env::temp_dir().join("wavekit_sidecar_test.wav");
        let format = WaveFormat::pcm(2, 44_100, 16);
        let metadata = RecordingMetadata::new(&format, 1.5, 264_600, "abc123", "take1.wav");

        write_sidecar(&container, &metadata).unwrap();
        let reread = read_sidecar(&container).unwrap();
        assert_eq!(reread, metadata);

        fs::remove_file(sidecar_path(&container)).ok();
    }

    #[test]
    fn missing_sidecar_is_an_error() {
        let container = std::env::temp_dir().join("wavekit_sidecar_missing.wav");
        fs::remove_file(sidecar_path(&container)).ok();

        let err = read_sidecar(&container).unwrap_err();
        assert!(matches!(err, ContainerError::Sidecar(_)));
    }
}
