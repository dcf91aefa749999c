#![allow(dead_code)]

use midi2video::clip::{Clip, FrameSource};
use midi2video::config::{EndPolicy, Mode, Settings};
use midi2video::display::DisplaySink;
use midi2video::error::{DecodeError, Result};
use midi2video::frame::{Frame, Rgb};
use midi2video::loader::PatternSource;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Distinct, non-black color per clip slot.
pub fn color_for(index: usize) -> Rgb {
    [
        (10 + index * 15) as u8,
        (250 - index * 12) as u8,
        (40 + index * 7) as u8,
    ]
}

/// `count` solid clips of `duration` seconds, each in its own color.
pub fn solid_clips(count: usize, duration: Option<f64>) -> Vec<Clip> {
    (0..count)
        .map(|i| {
            let source = PatternSource::solid((8, 6), duration, color_for(i));
            Clip::new(i, format!("clip{}", i), Box::new(source))
        })
        .collect()
}

pub fn test_settings(mode: Mode, end_policy: EndPolicy) -> Settings {
    Settings {
        mode,
        end_policy,
        cell_width: Some(4),
        cell_height: Some(4),
        idle_poll_ms: 0,
        sync_timeout_ms: 500,
        ..Settings::default()
    }
}

/// Keeps every presented frame for inspection.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub opened_with: Option<(u32, u32)>,
    pub frames: Vec<Frame>,
    pub closed: usize,
    pub close_after: Option<usize>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports a close request once `frames` frames have been presented.
    pub fn closing_after(frames: usize) -> Self {
        Self {
            close_after: Some(frames),
            ..Self::default()
        }
    }

    pub fn last_frame(&self) -> &Frame {
        self.frames.last().expect("no frame presented")
    }
}

impl DisplaySink for RecordingDisplay {
    fn open(&mut self, size: (u32, u32)) -> Result<()> {
        self.opened_with = Some(size);
        Ok(())
    }

    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn close_requested(&self) -> bool {
        self.close_after
            .map_or(false, |limit| self.frames.len() >= limit)
    }

    fn close(&mut self) {
        self.closed += 1;
    }
}

/// A source whose decoder fails for clip-local times inside `bad`.
pub struct FlakySource {
    pub inner: PatternSource,
    pub bad: std::ops::Range<f64>,
}

impl FrameSource for FlakySource {
    fn size(&self) -> (u32, u32) {
        self.inner.size()
    }

    fn duration(&self) -> Option<f64> {
        self.inner.duration()
    }

    fn frame_at(&mut self, t: f64) -> std::result::Result<Frame, DecodeError> {
        if self.bad.contains(&t) {
            return Err(DecodeError::Failed {
                t,
                reason: "corrupt packet".to_string(),
            });
        }
        self.inner.frame_at(t)
    }
}

/// An unbounded stream that runs dry after `frames_available` seconds,
/// signalling end of stream the way a live decoder would.
pub struct DryingSource {
    pub inner: PatternSource,
    pub frames_available: f64,
}

impl FrameSource for DryingSource {
    fn size(&self) -> (u32, u32) {
        self.inner.size()
    }

    fn duration(&self) -> Option<f64> {
        None
    }

    fn frame_at(&mut self, t: f64) -> std::result::Result<Frame, DecodeError> {
        if t >= self.frames_available {
            return Err(DecodeError::EndOfStream { t });
        }
        self.inner.frame_at(t)
    }
}
