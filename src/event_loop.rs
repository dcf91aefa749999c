// event_loop.rs

use crate::audio::AudioSink;
use crate::clock::{FrameClock, Pacing};
use crate::config::{InputMode, Mode, Settings};
use crate::display::DisplaySink;
use crate::error::{Error, Result};
use crate::grid::GridCompositor;
use crate::midi::{NoteEvent, NoteSource};
use crate::router::NoteRouter;
use crate::session::PlaybackSession;
use crate::sync;
use log::{debug, error, info, warn};
use std::thread;
use std::time::Duration;

/// Why a session ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    QuitNote,
    DisplayClosed,
}

/// The playback controller: drains MIDI, applies routed actions to the clip
/// state machine and pumps the frame clock into the display.
///
/// Everything here runs on the calling thread. The only other thread is the
/// optional audio sink, which meets this loop once at the start barrier.
/// Dropping the loop tears the session down, so every exit path releases
/// the display, the audio device and the MIDI port.
pub struct EventLoop<S: NoteSource, D: DisplaySink> {
    session: PlaybackSession,
    source: S,
    display: D,
    audio: Option<Box<dyn AudioSink>>,
    router: NoteRouter,
    clock: FrameClock,
    compositor: GridCompositor,
    input_mode: InputMode,
    idle_poll: Duration,
    sync_timeout: Duration,
    start_clip: Option<usize>,
    started: bool,
    ticking: bool,
    torn_down: bool,
}

impl<S: NoteSource, D: DisplaySink> EventLoop<S, D> {
    pub fn new(
        mut session: PlaybackSession,
        settings: &Settings,
        source: S,
        display: D,
        pacing: Pacing,
    ) -> Result<Self> {
        let compositor = session.build_compositor(settings)?;
        let router = session.router();
        let clock = FrameClock::new(session.fps, pacing);
        Ok(Self {
            session,
            source,
            display,
            audio: None,
            router,
            clock,
            compositor,
            input_mode: settings.input_mode,
            idle_poll: settings.idle_poll(),
            sync_timeout: settings.sync_timeout(),
            start_clip: settings.start_clip,
            started: false,
            ticking: false,
            torn_down: false,
        })
    }

    pub fn with_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn compositor(&self) -> &GridCompositor {
        &self.compositor
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Runs until a quit note, a close request or a fatal error. The session
    /// is torn down before this returns either way.
    pub fn run(&mut self) -> Result<ExitReason> {
        let result = self.run_until_exit();
        match &result {
            Ok(reason) => info!("Session finished: {:?}", reason),
            Err(e) => error!("Session aborted: {}", e),
        }
        self.teardown();
        result
    }

    fn run_until_exit(&mut self) -> Result<ExitReason> {
        self.start()?;
        loop {
            if let Some(reason) = self.step()? {
                return Ok(reason);
            }
        }
    }

    /// Opens the display, presents the first frame and, with audio enabled,
    /// meets the audio task at the start barrier. Runs once.
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        self.display.open(self.compositor.canvas_size())?;

        match self.start_clip {
            Some(index) if self.session.machine.mode() == Mode::Exclusive => {
                let index = index % self.session.clip_count();
                info!("Starting with clip {} active", index);
                self.session.machine.activate(index, self.clock.next_time());
            }
            Some(index) => warn!("Ignoring start clip {} outside exclusive mode", index),
            None => {}
        }

        // the first frame goes out before the barrier so picture and sound
        // begin together
        let first = if self.session.machine.any_active() {
            self.clock.resume();
            self.ticking = true;
            self.clock.tick(&mut self.session, &self.compositor)
        } else {
            self.compositor.blank()
        };
        if !self.session.audio_enabled {
            return self.display.present(&first);
        }

        let Some(audio) = self.audio.as_mut() else {
            warn!("Audio enabled but no audio sink configured, continuing video-only");
            self.session.audio_enabled = false;
            return self.display.present(&first);
        };

        let (video_side, audio_side) = sync::pair();
        audio.play_async(audio_side, self.sync_timeout)?;
        self.display.present(&first)?;
        match video_side.arrive(self.sync_timeout) {
            Ok(waited) => info!("Audio and video aligned after {:?}", waited),
            Err(e) => {
                warn!(
                    "{} ({}), continuing video-only",
                    Error::SyncTimeout(self.sync_timeout),
                    e
                );
                audio.stop();
                self.session.audio_enabled = false;
            }
        }
        if self.ticking {
            // waiting at the barrier is not playback time
            self.clock.resume();
        }
        Ok(())
    }

    /// One controller iteration. Returns the exit reason once the session
    /// should end.
    pub fn step(&mut self) -> Result<Option<ExitReason>> {
        self.start()?;
        if self.display.close_requested() {
            info!("Display close requested");
            return Ok(Some(ExitReason::DisplayClosed));
        }

        // activations take effect on the next rendered frame
        let at = self.clock.next_time();
        for event in self.drain()? {
            let action = self.router.route(&event);
            debug!("{:?} -> {:?} at t={:.3}", event, action, at);
            if self.session.machine.apply(action, at) {
                info!("Quit note {} received", self.session.quit_note);
                return Ok(Some(ExitReason::QuitNote));
            }
        }

        if self.session.machine.any_active() {
            if !self.ticking {
                debug!("Clock running from t={:.3}", self.clock.time());
                self.clock.resume();
                self.ticking = true;
            }
            let frame = self.clock.tick(&mut self.session, &self.compositor);
            self.display.present(&frame)?;
        } else {
            if self.ticking {
                debug!("All clips hidden, idling at t={:.3}", self.clock.time());
                self.ticking = false;
            }
            if !self.idle_poll.is_zero() {
                thread::sleep(self.idle_poll);
            }
        }
        Ok(None)
    }

    fn drain(&mut self) -> Result<Vec<NoteEvent>> {
        match self.input_mode {
            InputMode::Pending => Ok(self.source.iter_pending()?),
            InputMode::Poll => {
                let mut events = Vec::new();
                while let Some(event) = self.source.poll()? {
                    events.push(event);
                }
                Ok(events)
            }
        }
    }

    /// Stops audio, closes the display and hides every clip. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        if let Some(audio) = self.audio.as_mut() {
            audio.stop();
        }
        self.display.close();
        for index in 0..self.session.clip_count() {
            self.session.machine.hide(index);
        }
        info!(
            "Session torn down after {} frames ({:.2}s virtual)",
            self.clock.frame_count(),
            self.clock.time()
        );
    }
}

impl<S: NoteSource, D: DisplaySink> Drop for EventLoop<S, D> {
    fn drop(&mut self) {
        self.teardown();
    }
}
