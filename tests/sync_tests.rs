mod common;

use common::{color_for, init_logging, solid_clips, test_settings, RecordingDisplay};
use midi2video::audio::{AudioSink, SilentAudio};
use midi2video::clock::Pacing;
use midi2video::config::{EndPolicy, Mode, Settings};
use midi2video::display::NullDisplay;
use midi2video::midi::MockNoteSource;
use midi2video::sync::{self, Rendezvous, SyncError};
use midi2video::{EventLoop, PlaybackSession, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Takes the barrier but never arrives at it.
struct StalledAudio {
    held: Option<Rendezvous>,
    stops: Arc<AtomicUsize>,
}

impl AudioSink for StalledAudio {
    fn play_async(&mut self, sync: Rendezvous, _timeout: Duration) -> Result<()> {
        self.held = Some(sync);
        Ok(())
    }

    fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

fn audio_settings() -> Settings {
    Settings {
        audio: true,
        sync_timeout_ms: 100,
        ..test_settings(Mode::Exclusive, EndPolicy::Loop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_sides_release_together() {
        let (video, audio) = sync::pair();
        let audio_thread = thread::spawn(move || audio.arrive(Duration::from_secs(2)));
        assert!(video.arrive(Duration::from_secs(2)).is_ok());
        assert!(audio_thread.join().expect("audio thread").is_ok());
    }

    #[test]
    fn test_missing_peer_times_out() {
        let (video, _audio) = sync::pair();
        let result = video.arrive(Duration::from_millis(50));
        assert_eq!(result, Err(SyncError::Timeout(Duration::from_millis(50))));
    }

    #[test]
    fn test_dropped_peer_is_reported() {
        let (video, audio) = sync::pair();
        drop(audio);
        assert_eq!(video.arrive(Duration::from_secs(1)), Err(SyncError::PeerGone));
    }

    #[test]
    fn test_stalled_audio_degrades_to_video_only() {
        init_logging();
        let settings = audio_settings();
        let session = PlaybackSession::new(solid_clips(2, None), &settings).expect("session");
        let stops = Arc::new(AtomicUsize::new(0));
        let audio = StalledAudio {
            held: None,
            stops: Arc::clone(&stops),
        };

        let mut event_loop = EventLoop::new(
            session,
            &settings,
            MockNoteSource::new(),
            RecordingDisplay::new(),
            Pacing::Freerun,
        )
        .expect("event loop")
        .with_audio(Box::new(audio));

        event_loop.start().expect("start survives a sync timeout");
        assert!(!event_loop.session().audio_enabled);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert_eq!(event_loop.display().frames.len(), 1);
    }

    #[test]
    fn test_silent_audio_keeps_audio_enabled() {
        init_logging();
        let settings = audio_settings();
        let session = PlaybackSession::new(solid_clips(2, None), &settings).expect("session");

        let mut event_loop = EventLoop::new(
            session,
            &settings,
            MockNoteSource::new(),
            NullDisplay::new(),
            Pacing::Freerun,
        )
        .expect("event loop")
        .with_audio(Box::new(SilentAudio::new()));

        event_loop.start().expect("start");
        assert!(event_loop.session().audio_enabled);
        assert_eq!(event_loop.display().presented(), 1);
        event_loop.teardown();
        assert!(event_loop.is_torn_down());
    }

    #[test]
    fn test_start_clip_frame_is_presented_before_audio_starts() {
        init_logging();
        let settings = Settings {
            start_clip: Some(1),
            ..audio_settings()
        };
        let session = PlaybackSession::new(solid_clips(3, None), &settings).expect("session");
        let mut event_loop = EventLoop::new(
            session,
            &settings,
            MockNoteSource::new(),
            RecordingDisplay::new(),
            Pacing::Freerun,
        )
        .expect("event loop")
        .with_audio(Box::new(SilentAudio::new()));

        event_loop.start().expect("start");
        assert!(event_loop.session().audio_enabled);
        let frames = &event_loop.display().frames;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].pixel(0, 0), Some(color_for(1)));
    }

    #[test]
    fn test_audio_without_sink_continues_video_only() {
        init_logging();
        let settings = audio_settings();
        let session = PlaybackSession::new(solid_clips(1, None), &settings).expect("session");
        let mut event_loop = EventLoop::new(
            session,
            &settings,
            MockNoteSource::new(),
            RecordingDisplay::new(),
            Pacing::Freerun,
        )
        .expect("event loop");

        event_loop.start().expect("start");
        assert!(!event_loop.session().audio_enabled);
        assert_eq!(event_loop.display().frames.len(), 1);
    }
}
