use std::ops::BitOr;
use std::path::Path;

use crate::models::error::DeviceResult;

/// Playback mode flags for [`SimplePlayer::play`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayFlags(u32);

impl PlayFlags {
    /// Block until playback completes.
    pub const SYNC: PlayFlags = PlayFlags(0);
    /// Return immediately; playback continues in the background.
    pub const ASYNC: PlayFlags = PlayFlags(1);
    /// Repeat until stopped. Only meaningful with [`ASYNC`](Self::ASYNC).
    pub const LOOP_: PlayFlags = PlayFlags(1 << 1);
    /// Do not interrupt a sound that is already playing.
    pub const NO_STOP: PlayFlags = PlayFlags(1 << 2);

    pub fn contains(self, other: PlayFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for PlayFlags {
    type Output = PlayFlags;

    fn bitor(self, rhs: PlayFlags) -> PlayFlags {
        PlayFlags(self.0 | rhs.0)
    }
}

/// Fire-and-forget file playback.
///
/// Unlike [`PlaybackDevice`](super::PlaybackDevice) this surface hands
/// the whole file to the platform and only exposes start/stop. Stop is
/// scoped to the instance: `stop_all` cancels sounds this player
/// started, never another player's.
///
/// `Send + Sync` because the timed-playback helper drives `play` from a
/// background thread while `stop_all` runs on the caller's thread.
pub trait SimplePlayer: Send + Sync {
    /// Play an audio file. With [`PlayFlags::SYNC`] this blocks until
    /// the sound finishes or [`stop_all`](Self::stop_all) is called.
    fn play(&self, path: &Path, flags: PlayFlags) -> DeviceResult<()>;

    /// Stop every sound this player instance started.
    fn stop_all(&self) -> DeviceResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_combine_with_bitor() {
        let flags = PlayFlags::ASYNC | PlayFlags::LOOP_;
        assert!(flags.contains(PlayFlags::ASYNC));
        assert!(flags.contains(PlayFlags::LOOP_));
        assert!(!flags.contains(PlayFlags::NO_STOP));
    }

    #[test]
    fn sync_is_the_empty_flag_set() {
        assert!(PlayFlags::ASYNC.contains(PlayFlags::SYNC));
        assert!(!PlayFlags::SYNC.contains(PlayFlags::ASYNC));
    }
}
