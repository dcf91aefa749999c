use crate::clip::Clip;
use crate::config::{Mode, Settings};
use crate::error::{Error, Result};
use crate::grid::{GridCompositor, GridLayout};
use crate::router::NoteRouter;
use crate::state::ClipStateMachine;
use log::info;

/// Process-wide state for one run.
#[derive(Debug)]
pub struct PlaybackSession {
    pub clips: Vec<Clip>,
    pub machine: ClipStateMachine,
    pub quit_note: u8,
    pub offset: i32,
    pub fps: u32,
    pub audio_enabled: bool,
}

impl PlaybackSession {
    pub fn new(clips: Vec<Clip>, settings: &Settings) -> Result<Self> {
        if clips.is_empty() {
            return Err(Error::Config("the clip set is empty".to_string()));
        }
        settings.validate()?;
        let machine = ClipStateMachine::new(clips.len(), settings.mode, settings.end_policy);
        info!(
            "Session: {} clips, {} mode, quit note {}, offset {}, {} fps",
            clips.len(),
            settings.mode.as_str(),
            settings.quit_note,
            settings.offset,
            settings.fps
        );
        Ok(Self {
            clips,
            machine,
            quit_note: settings.quit_note,
            offset: settings.offset,
            fps: settings.fps,
            audio_enabled: settings.audio,
        })
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn router(&self) -> NoteRouter {
        NoteRouter::new(self.clips.len(), self.quit_note, self.offset)
    }

    /// Builds the compositor for `settings` and pins every clip to its cell.
    /// Exclusive sessions share one cell; polyphonic sessions get a grid.
    pub fn build_compositor(&mut self, settings: &Settings) -> Result<GridCompositor> {
        let layout = match settings.mode {
            Mode::Exclusive => GridLayout::single(),
            Mode::Polyphonic => GridLayout::resolve(
                self.clips.len(),
                settings.columns,
                settings.rows,
                settings.layout_order,
            )?,
        };
        let compositor = GridCompositor::new(layout, settings.cell_size(), settings.background);
        for (index, clip) in self.clips.iter_mut().enumerate() {
            clip.assign_cell(compositor.cell_for(index));
        }
        Ok(compositor)
    }
}
