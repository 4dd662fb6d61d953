//! Fire-and-forget file playback via PlaySound.

use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use parking_lot::Mutex;
use windows::core::PCWSTR;
use windows::Win32::Media::Audio::{
    PlaySoundW, SND_ASYNC, SND_FILENAME, SND_FLAGS, SND_LOOP, SND_NOSTOP, SND_PURGE, SND_SYNC,
};

use wavekit_core::models::error::{DeviceError, DeviceResult};
use wavekit_core::traits::{PlayFlags, SimplePlayer};

/// PlaySound-backed player.
///
/// The underlying API is process-global, so stop is scoped here:
/// [`stop_all`](SimplePlayer::stop_all) purges only when this instance
/// has started a sound, and a player that never played stops nothing.
#[derive(Default)]
pub struct SoundPlayer {
    started: Mutex<bool>,
}

impl SoundPlayer {
    pub fn new() -> Self {
        Self::default()
    }
}

fn snd_flags(flags: PlayFlags) -> SND_FLAGS {
    let mut out = SND_FILENAME;
    if flags.contains(PlayFlags::ASYNC) {
        out |= SND_ASYNC;
    } else {
        out |= SND_SYNC;
    }
    if flags.contains(PlayFlags::LOOP_) {
        // Looping only works asynchronously.
        out |= SND_LOOP | SND_ASYNC;
    }
    if flags.contains(PlayFlags::NO_STOP) {
        out |= SND_NOSTOP;
    }
    out
}

impl SimplePlayer for SoundPlayer {
    fn play(&self, path: &Path, flags: PlayFlags) -> DeviceResult<()> {
        let wide: Vec<u16> = path.as_os_str().encode_wide().chain(Some(0)).collect();

        *self.started.lock() = true;
        let ok = unsafe { PlaySoundW(PCWSTR(wide.as_ptr()), None, snd_flags(flags)) };
        if !ok.as_bool() {
            *self.started.lock() = false;
            return Err(DeviceError::OpenFailed(format!(
                "PlaySound failed for {}",
                path.display()
            )));
        }
        Ok(())
    }

    fn stop_all(&self) -> DeviceResult<()> {
        let mut started = self.started.lock();
        if !*started {
            return Ok(());
        }
        *started = false;

        let ok = unsafe { PlaySoundW(PCWSTR::null(), None, SND_PURGE) };
        if !ok.as_bool() {
            return Err(DeviceError::StopFailed("PlaySound purge failed".into()));
        }
        Ok(())
    }
}
