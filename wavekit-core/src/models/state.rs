/// Recording session state machine.
///
/// State transitions:
/// ```text
/// armed → recording → stopped
/// ```
///
/// A session comes into existence armed: every buffer is allocated,
/// registered with the capture device, and enqueued for filling, but the
/// device has not started. Idle is the absence of a session. `Stopped`
/// means the device has been halted and reset; buffers are
/// fill-complete or best-effort truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Armed,
    Recording,
    Stopped,
}

impl SessionState {
    pub fn is_armed(&self) -> bool {
        matches!(self, Self::Armed)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}
