use serde::{Deserialize, Serialize};

use super::format::WaveFormat;

/// Metadata describing a persisted recording.
///
/// Serializable for JSON sidecar export next to the container file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub created_at: String,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    /// Size of the raw sample payload in bytes.
    pub data_size: u64,
    /// SHA-256 hex digest of the finished container file.
    pub checksum: String,
    pub file_path: String,
}

impl RecordingMetadata {
    pub fn new(
        format: &WaveFormat,
        duration_secs: f64,
        data_size: u64,
        checksum: &str,
        file_path: &str,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            duration_secs,
            sample_rate: format.sample_rate,
            channels: format.channels,
            bits_per_sample: format.bits_per_sample,
            data_size,
            checksum: checksum.to_string(),
            file_path: file_path.to_string(),
        }
    }
}
