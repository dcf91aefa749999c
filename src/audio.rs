// audio.rs

use crate::error::{Error, Result};
use crate::scheduler::{Scheduler, ThreadScheduler};
use crate::sync::Rendezvous;
use crossbeam::channel::{bounded, Receiver, Sender};
use log::{info, warn};
use std::thread::JoinHandle;
use std::time::Duration;

/// Audio playback running beside the video loop.
///
/// The only thing shared with the main thread is the start barrier; the
/// sink owns its decode/playback resource outright.
pub trait AudioSink {
    /// Starts playback on a background task. The task must arrive at `sync`
    /// before producing its first sample and give up after `timeout`.
    fn play_async(&mut self, sync: Rendezvous, timeout: Duration) -> Result<()>;

    /// Stops playback and releases the device. Safe to call repeatedly.
    fn stop(&mut self);
}

/// A sink that keeps time without producing sound. It takes part in the
/// start barrier and holds its thread until stopped, like a real device
/// would hold its stream.
///
/// The thread is linked to its owner by channels only: it reports getting
/// past the barrier on one and blocks on the other until `stop` drops the
/// sending half.
pub struct SilentAudio<S: Scheduler = ThreadScheduler> {
    scheduler: S,
    stop_tx: Option<Sender<()>>,
    started_rx: Option<Receiver<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SilentAudio<ThreadScheduler> {
    pub fn new() -> Self {
        Self::with_scheduler(ThreadScheduler::new())
    }
}

impl Default for SilentAudio<ThreadScheduler> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scheduler> SilentAudio<S> {
    pub fn with_scheduler(scheduler: S) -> Self {
        Self {
            scheduler,
            stop_tx: None,
            started_rx: None,
            handle: None,
        }
    }

    /// Whether the playback thread got past the start barrier.
    pub fn has_started(&self) -> bool {
        self.started_rx.as_ref().map_or(false, |rx| !rx.is_empty())
    }
}

impl<S: Scheduler> AudioSink for SilentAudio<S> {
    fn play_async(&mut self, sync: Rendezvous, timeout: Duration) -> Result<()> {
        if self.handle.is_some() {
            return Err(Error::Config("audio playback already started".to_string()));
        }
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let (started_tx, started_rx) = bounded::<()>(1);

        let handle = self.scheduler.spawn("midi2video-audio", move || {
            if let Err(e) = sync.arrive(timeout) {
                warn!("Audio playback abandoned: {}", e);
                return;
            }
            let _ = started_tx.try_send(());
            info!("Audio playback started");
            // returns once the owner drops its sender
            let _ = stop_rx.recv();
            info!("Audio playback finished");
        })?;
        self.stop_tx = Some(stop_tx);
        self.started_rx = Some(started_rx);
        self.handle = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        drop(self.stop_tx.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Audio thread panicked during shutdown");
            }
        }
    }
}

impl<S: Scheduler> Drop for SilentAudio<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync;

    #[test]
    fn test_silent_audio_meets_video() {
        let (video, audio_side) = sync::pair();
        let mut audio = SilentAudio::new();
        audio
            .play_async(audio_side, Duration::from_secs(2))
            .unwrap();
        assert!(video.arrive(Duration::from_secs(2)).is_ok());
        audio.stop();
        assert!(audio.has_started());
    }

    #[test]
    fn test_second_start_is_rejected() {
        let (_video, audio_side) = sync::pair();
        let (_video2, audio_side2) = sync::pair();
        let mut audio = SilentAudio::new();
        audio
            .play_async(audio_side, Duration::from_millis(10))
            .unwrap();
        assert!(audio
            .play_async(audio_side2, Duration::from_millis(10))
            .is_err());
        audio.stop();
    }

    #[test]
    fn test_stop_releases_waiting_thread() {
        let (video, audio_side) = sync::pair();
        let mut audio = SilentAudio::new();
        audio
            .play_async(audio_side, Duration::from_secs(2))
            .unwrap();
        assert!(video.arrive(Duration::from_secs(2)).is_ok());

        let stopping = std::time::Instant::now();
        audio.stop();
        assert!(stopping.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_unmet_barrier_never_starts() {
        let (_video, audio_side) = sync::pair();
        let mut audio = SilentAudio::new();
        audio
            .play_async(audio_side, Duration::from_millis(20))
            .unwrap();
        audio.stop();
        assert!(!audio.has_started());
    }

    #[test]
    fn test_stop_without_start_is_harmless() {
        let mut audio = SilentAudio::new();
        audio.stop();
        audio.stop();
        assert!(!audio.has_started());
    }
}
