use serde::{Deserialize, Serialize};

/// Direction of an audio endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Capture,
    Playback,
}

/// A hardware audio endpoint, as reported by backend enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Backend-assigned endpoint index.
    pub index: u32,
    pub name: String,
    pub kind: DeviceKind,
    pub channels: u16,
    pub is_default: bool,
}
