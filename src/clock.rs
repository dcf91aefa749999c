// clock.rs

use crate::config::EndPolicy;
use crate::error::DecodeError;
use crate::frame::Frame;
use crate::grid::{GridCell, GridCompositor};
use crate::session::PlaybackSession;
use log::{debug, trace, warn};
use std::thread;
use std::time::{Duration, Instant};

/// Gap kept below a clip's duration when holding its last frame.
pub const HOLD_EPSILON: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Sleep so presentation tracks wall-clock time
    RealTime,
    /// Never sleep; virtual time advances as fast as frames are produced
    Freerun,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Playhead {
    At(f64),
    /// The clip ran past its end and should be hidden
    Ended,
}

/// Maps time elapsed since activation onto a clip-local playhead.
///
/// Looping clips land in `[0, duration)`; held clips never pass
/// `duration - HOLD_EPSILON`. Unbounded clips play straight through.
pub fn resolve_playhead(elapsed: f64, duration: Option<f64>, policy: EndPolicy) -> Playhead {
    let elapsed = elapsed.max(0.0);
    let Some(duration) = duration else {
        return Playhead::At(elapsed);
    };
    if duration <= 0.0 {
        return match policy {
            EndPolicy::Hide => Playhead::Ended,
            EndPolicy::Loop | EndPolicy::Hold => Playhead::At(0.0),
        };
    }
    if elapsed < duration {
        return Playhead::At(elapsed.min(last_frame_time(duration)).max(0.0));
    }
    match policy {
        EndPolicy::Loop => {
            let wrapped = elapsed % duration;
            Playhead::At(if wrapped < duration { wrapped } else { 0.0 })
        }
        EndPolicy::Hold => Playhead::At(last_frame_time(duration)),
        EndPolicy::Hide => Playhead::Ended,
    }
}

fn last_frame_time(duration: f64) -> f64 {
    (duration - HOLD_EPSILON).max(0.0)
}

/// Fixed-rate scheduler for the video side of a session.
///
/// Virtual time is `frames / fps`, so it never accumulates rounding drift.
/// Wall-clock pacing is soft: a slow decode shows up as visible lag rather
/// than a dropped tick.
pub struct FrameClock {
    fps: u32,
    frames: u64,
    pacing: Pacing,
    anchor: Option<Instant>,
    last_frames: Vec<Option<Frame>>,
}

impl FrameClock {
    pub fn new(fps: u32, pacing: Pacing) -> Self {
        Self {
            fps: fps.max(1),
            frames: 0,
            pacing,
            anchor: None,
            last_frames: Vec::new(),
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Current virtual time in seconds.
    pub fn time(&self) -> f64 {
        self.frames as f64 / f64::from(self.fps)
    }

    /// Virtual time the next tick will render.
    pub fn next_time(&self) -> f64 {
        (self.frames + 1) as f64 / f64::from(self.fps)
    }

    /// Re-anchors wall-clock pacing to the current virtual time, so an idle
    /// stretch does not count as drift once ticking resumes.
    pub fn resume(&mut self) {
        let now = Instant::now();
        let behind = Duration::from_secs_f64(self.time());
        self.anchor = Some(now.checked_sub(behind).unwrap_or(now));
        trace!("Clock re-anchored at t={:.3}", self.time());
    }

    /// Advances one frame, renders every active clip and paces to real time.
    pub fn tick(&mut self, session: &mut PlaybackSession, compositor: &GridCompositor) -> Frame {
        self.frames += 1;
        let t = self.time();
        if self.last_frames.len() != session.clips.len() {
            self.last_frames.resize(session.clips.len(), None);
        }

        let mut layers: Vec<(GridCell, Frame)> = Vec::new();
        for index in session.machine.active_indices() {
            if let Some(frame) = self.render_clip(session, index, t) {
                let cell = session.clips[index]
                    .grid_cell()
                    .unwrap_or_else(|| compositor.cell_for(index));
                layers.push((cell, frame));
            }
        }
        let frame = compositor.compose(layers.iter().map(|(cell, frame)| (*cell, frame)));

        self.pace(t);
        frame
    }

    fn render_clip(&mut self, session: &mut PlaybackSession, index: usize, t: f64) -> Option<Frame> {
        let policy = session.machine.end_policy();
        let slot = *session.machine.slot(index)?;
        let clip = &mut session.clips[index];

        let playhead = match resolve_playhead(t - slot.start_time, clip.duration(), policy) {
            Playhead::At(p) => p,
            Playhead::Ended => {
                debug!("Clip {} reached its end, hiding", index);
                session.machine.hide(index);
                self.last_frames[index] = None;
                return None;
            }
        };
        session.machine.set_playhead(index, playhead);

        let result = match clip.frame_at(playhead) {
            Err(DecodeError::EndOfStream { .. }) => match policy {
                EndPolicy::Loop => {
                    debug!("Clip {} hit end of stream, restarting", index);
                    session.machine.restart(index, t);
                    clip.frame_at(0.0)
                }
                EndPolicy::Hold => {
                    return self.last_frames[index].clone();
                }
                EndPolicy::Hide => {
                    session.machine.hide(index);
                    self.last_frames[index] = None;
                    return None;
                }
            },
            other => other,
        };

        match result {
            Ok(frame) => {
                if policy == EndPolicy::Hold {
                    self.last_frames[index] = Some(frame.clone());
                }
                Some(frame)
            }
            Err(e) => {
                warn!("Clip {} ({}) hidden for this tick: {}", index, clip.name, e);
                None
            }
        }
    }

    fn pace(&mut self, t: f64) {
        if self.pacing == Pacing::Freerun {
            return;
        }
        if self.anchor.is_none() {
            self.resume();
        }
        if let Some(anchor) = self.anchor {
            let target = Duration::from_secs_f64(t);
            let elapsed = anchor.elapsed();
            if target > elapsed {
                thread::sleep(target - elapsed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_time_is_frame_count_over_fps() {
        let clock = FrameClock::new(15, Pacing::Freerun);
        assert_eq!(clock.time(), 0.0);
        assert!((clock.next_time() - 1.0 / 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_loop_wraps() {
        assert_eq!(
            resolve_playhead(2.5, Some(2.0), EndPolicy::Loop),
            Playhead::At(0.5)
        );
    }

    #[test]
    fn test_hold_clamps_below_duration() {
        assert_eq!(
            resolve_playhead(9.0, Some(2.0), EndPolicy::Hold),
            Playhead::At(2.0 - HOLD_EPSILON)
        );
    }

    #[test]
    fn test_hide_ends() {
        assert_eq!(
            resolve_playhead(2.0, Some(2.0), EndPolicy::Hide),
            Playhead::Ended
        );
    }

    #[test]
    fn test_unbounded_clip_plays_through() {
        assert_eq!(
            resolve_playhead(100.0, None, EndPolicy::Loop),
            Playhead::At(100.0)
        );
    }

    #[test]
    fn test_negative_elapsed_is_clamped() {
        assert_eq!(
            resolve_playhead(-0.2, Some(1.0), EndPolicy::Loop),
            Playhead::At(0.0)
        );
    }
}
