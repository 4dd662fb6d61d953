//! Buffered playback over a playback device, plus time-bounded file
//! playback over a simple player.

use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::buffer::chunk::BufferSequence;
use crate::container::decode::SoundAsset;
use crate::models::error::{DeviceError, PipelineError};
use crate::traits::{PlayFlags, PlaybackDevice, SimplePlayer};

/// Drives a buffer sequence through a playback device.
///
/// Chunks are registered and queued in order and render back-to-back.
/// [`stop`](Self::stop) cancels the queue and unregisters every chunk;
/// it must run before a played sequence is dropped.
pub struct PlaybackController<'d, D: PlaybackDevice> {
    device: &'d mut D,
}

impl<'d, D: PlaybackDevice> PlaybackController<'d, D> {
    pub fn new(device: &'d mut D) -> Self {
        Self { device }
    }

    /// Register and queue every chunk of the sequence, in order.
    ///
    /// An empty sequence is a no-op. On failure the chunk being handled
    /// is unregistered; chunks already queued stay with the device until
    /// [`stop`](Self::stop).
    pub fn play(&mut self, sequence: &mut BufferSequence) -> Result<(), PipelineError> {
        if sequence.is_empty() {
            log::debug!("empty sequence, nothing to play");
            return Ok(());
        }

        for chunk in sequence.iter_mut() {
            self.device.prepare(chunk)?;
            chunk.set_prepared(true);

            if let Err(e) = self.device.submit(chunk) {
                if let Err(u) = self.device.unprepare(chunk) {
                    log::warn!("unprepare after failed submit also failed: {u}");
                }
                chunk.set_prepared(false);
                return Err(e.into());
            }
        }

        log::info!(
            "queued {} chunk(s), {} bytes for playback",
            sequence.chunk_count(),
            sequence.total_len()
        );
        Ok(())
    }

    /// Play a decoded asset, returning the sequence for a later
    /// [`stop`](Self::stop). On failure everything queued so far is
    /// stopped before the error is returned.
    pub fn play_asset(&mut self, asset: SoundAsset) -> Result<BufferSequence, PipelineError> {
        let mut sequence = asset.into_sequence();
        if let Err(e) = self.play(&mut sequence) {
            if let Err(s) = self.stop(&mut sequence) {
                log::warn!("stop after failed play also failed: {s}");
            }
            return Err(e);
        }
        Ok(sequence)
    }

    /// Cancel the queue and unregister every registered chunk.
    ///
    /// Keeps going past individual failures so every chunk gets its
    /// unregister attempt; the first failure is returned.
    pub fn stop(&mut self, sequence: &mut BufferSequence) -> Result<(), DeviceError> {
        let mut first_error = None;

        if let Err(e) = self.device.reset() {
            log::error!("playback reset failed: {e}");
            first_error = Some(e);
        }

        for chunk in sequence.iter_mut() {
            if chunk.is_prepared() {
                if let Err(e) = self.device.unprepare(chunk) {
                    log::error!("playback unprepare failed: {e}");
                    first_error.get_or_insert(e);
                }
                chunk.set_prepared(false);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Play a file for at most `duration`, then stop it.
///
/// The player runs on a background thread while this thread sleeps out
/// the window; the sound is then stopped and the thread joined before
/// returning, so no playback activity survives the call. The call
/// therefore blocks for at least `duration`, even when the sound is
/// shorter or the file fails to play.
pub fn play_file_timed<P: SimplePlayer>(
    player: &P,
    path: &Path,
    flags: PlayFlags,
    duration: Duration,
) -> Result<(), PipelineError> {
    let outcome = thread::scope(|scope| {
        let handle = scope.spawn(|| player.play(path, flags));

        thread::sleep(duration);
        let stop_result = player.stop_all();

        let play_result = match handle.join() {
            Ok(result) => result,
            Err(_) => return Err(DeviceError::TaskPanicked),
        };
        stop_result?;
        play_result
    });
    outcome.map_err(PipelineError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::chunk::BufferChunk;
    use crate::models::error::DeviceResult;
    use parking_lot::{Condvar, Mutex};
    use std::time::Instant;

    #[derive(Default)]
    struct FakePlayback {
        calls: Vec<String>,
        fail_submit_at: Option<usize>,
        submits: usize,
    }

    impl PlaybackDevice for FakePlayback {
        fn prepare(&mut self, chunk: &mut BufferChunk) -> DeviceResult<()> {
            self.calls.push(format!("prepare:{}", chunk.len()));
            Ok(())
        }

        fn submit(&mut self, chunk: &mut BufferChunk) -> DeviceResult<()> {
            if self.fail_submit_at == Some(self.submits) {
                return Err(DeviceError::SubmitFailed("injected".into()));
            }
            self.submits += 1;
            self.calls.push(format!("submit:{}", chunk.len()));
            Ok(())
        }

        fn reset(&mut self) -> DeviceResult<()> {
            self.calls.push("reset".into());
            Ok(())
        }

        fn unprepare(&mut self, chunk: &mut BufferChunk) -> DeviceResult<()> {
            self.calls.push(format!("unprepare:{}", chunk.len()));
            Ok(())
        }
    }

    /// Player whose `play` blocks until `stop_all` runs, like a real
    /// synchronous sound call.
    #[derive(Default)]
    struct BlockingPlayer {
        stopped: Mutex<bool>,
        signal: Condvar,
    }

    impl SimplePlayer for BlockingPlayer {
        fn play(&self, _path: &Path, _flags: PlayFlags) -> DeviceResult<()> {
            let mut stopped = self.stopped.lock();
            while !*stopped {
                self.signal.wait(&mut stopped);
            }
            Ok(())
        }

        fn stop_all(&self) -> DeviceResult<()> {
            let mut stopped = self.stopped.lock();
            *stopped = true;
            self.signal.notify_all();
            Ok(())
        }
    }

    fn sequence(sizes: &[usize]) -> BufferSequence {
        let chunks = sizes.iter().map(|&s| BufferChunk::new(vec![0u8; s])).collect();
        BufferSequence::from_chunks(chunks)
    }

    #[test]
    fn play_then_stop_walks_every_chunk() {
        let mut device = FakePlayback::default();
        let mut controller = PlaybackController::new(&mut device);
        let mut seq = sequence(&[100, 50]);

        controller.play(&mut seq).unwrap();
        assert!(seq.iter().all(|c| c.is_prepared()));

        controller.stop(&mut seq).unwrap();
        assert!(seq.iter().all(|c| !c.is_prepared()));

        assert_eq!(
            device.calls,
            vec![
                "prepare:100",
                "submit:100",
                "prepare:50",
                "submit:50",
                "reset",
                "unprepare:100",
                "unprepare:50",
            ]
        );
    }

    #[test]
    fn empty_sequence_never_touches_the_device() {
        let mut device = FakePlayback::default();
        let mut controller = PlaybackController::new(&mut device);
        let mut seq = BufferSequence::empty();

        controller.play(&mut seq).unwrap();
        assert!(device.calls.is_empty());
    }

    #[test]
    fn failed_submit_unregisters_the_failing_chunk() {
        let mut device = FakePlayback {
            fail_submit_at: Some(1),
            ..Default::default()
        };
        let mut controller = PlaybackController::new(&mut device);
        let mut seq = sequence(&[10, 20, 30]);

        let err = controller.play(&mut seq).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Device(DeviceError::SubmitFailed(_))
        ));

        // Chunk 0 is still queued; chunk 1 was unregistered on failure.
        let prepared: Vec<bool> = seq.iter().map(|c| c.is_prepared()).collect();
        assert_eq!(prepared, vec![true, false, false]);

        controller.stop(&mut seq).unwrap();
        assert!(seq.iter().all(|c| !c.is_prepared()));
        assert!(device.calls.contains(&"unprepare:20".to_string()));
    }

    #[test]
    fn play_asset_queues_the_decoded_payload() {
        let mut device = FakePlayback::default();
        let mut controller = PlaybackController::new(&mut device);
        let asset = SoundAsset {
            format: crate::models::format::WaveFormat::pcm(1, 8_000, 8),
            sample_count: 64,
            byte_size: 64,
            payload: vec![0x7Fu8; 64],
        };

        let mut seq = controller.play_asset(asset).unwrap();
        assert_eq!(seq.total_len(), 64);
        assert!(seq.iter().all(|c| c.is_prepared()));

        controller.stop(&mut seq).unwrap();
    }

    #[test]
    fn timed_playback_blocks_for_the_window_and_joins() {
        let player = BlockingPlayer::default();
        let window = Duration::from_millis(50);

        let started = Instant::now();
        play_file_timed(&player, Path::new("unused.wav"), PlayFlags::SYNC, window).unwrap();
        let elapsed = started.elapsed();

        assert!(elapsed >= window, "returned after {elapsed:?}");
        // The player observed the stop; nothing is left running.
        assert!(*player.stopped.lock());
    }

    #[test]
    fn timed_playback_surfaces_play_failure_after_the_window() {
        struct FailingPlayer;

        impl SimplePlayer for FailingPlayer {
            fn play(&self, _path: &Path, _flags: PlayFlags) -> DeviceResult<()> {
                Err(DeviceError::OpenFailed("no such file".into()))
            }

            fn stop_all(&self) -> DeviceResult<()> {
                Ok(())
            }
        }

        let err = play_file_timed(
            &FailingPlayer,
            Path::new("missing.wav"),
            PlayFlags::SYNC,
            Duration::from_millis(1),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Device(DeviceError::OpenFailed(_))
        ));
    }
}
