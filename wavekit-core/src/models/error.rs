use thiserror::Error;

/// Errors from chunk allocation.
///
/// Always accompanied by full rollback: when allocation fails partway
/// through a request, every buffer already obtained for that request has
/// been released before the error is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("chunk {index} allocation of {requested} bytes failed: {reason}")]
    ChunkAllocFailed {
        index: usize,
        requested: usize,
        reason: String,
    },

    #[error("request yields no data: {0}")]
    EmptyRequest(String),
}

/// Errors surfaced by the device boundary (open, register, enqueue,
/// start, stop, reset).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("device open failed: {0}")]
    OpenFailed(String),

    #[error("device not available")]
    NotAvailable,

    #[error("buffer registration failed: {0}")]
    PrepareFailed(String),

    #[error("buffer enqueue failed: {0}")]
    EnqueueFailed(String),

    #[error("buffer submit failed: {0}")]
    SubmitFailed(String),

    #[error("buffer unregister failed: {0}")]
    UnprepareFailed(String),

    #[error("device start failed: {0}")]
    StartFailed(String),

    #[error("device stop failed: {0}")]
    StopFailed(String),

    #[error("device reset failed: {0}")]
    ResetFailed(String),

    #[error("playback task panicked")]
    TaskPanicked,
}

/// Errors from the chunked container codec.
///
/// On decode, any descend/read step whose result does not match the
/// expected size fails here. On encode, the first failed write
/// short-circuits; the destination is left in a caller-visible partial
/// state (no on-disk rollback is attempted).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContainerError {
    #[error("failed to open container: {0}")]
    Open(String),

    #[error("chunk '{0}' not found")]
    ChunkNotFound(String),

    #[error("chunk '{chunk}' truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        chunk: String,
        expected: u64,
        actual: u64,
    },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("write failed: {0}")]
    WriteFailed(String),

    #[error("sidecar error: {0}")]
    Sidecar(String),
}

/// Umbrella error for pipeline operations that cross failure domains.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("allocation error: {0}")]
    Allocation(#[from] AllocationError),

    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    #[error("container error: {0}")]
    Container(#[from] ContainerError),
}

/// Result alias for device-boundary calls.
pub type DeviceResult<T> = Result<T, DeviceError>;
