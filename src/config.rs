// config.rs

use crate::error::{Error, Result};
use ::config::{Config, Environment, File, Value};
use log::{debug, info};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_FPS: u32 = 15;
pub const DEFAULT_QUIT_NOTE: u8 = 50;
pub const DEFAULT_GRID_CELL: u32 = 150;
pub const DEFAULT_SINGLE_CELL: u32 = 300;
pub const DEFAULT_SYNC_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_IDLE_POLL_MS: u64 = 5;
pub const ENV_PREFIX: &str = "MIDI2VIDEO";

/// How activations interact across clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// One clip at a time; a new note replaces the previous clip
    Exclusive,
    /// Every clip is gated by its own key
    Polyphonic,
}

/// What happens when a clip's playhead passes its duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EndPolicy {
    Loop,
    /// Keep presenting the last frame
    Hold,
    /// Return the clip to Hidden
    Hide,
}

/// Grid cell assignment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutOrder {
    /// Fill each column top to bottom before moving right
    ColumnMajor,
    /// Fill each row left to right before moving down
    RowMajor,
}

/// How the controller drains the MIDI source each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum InputMode {
    /// Call `poll` until it reports nothing pending
    Poll,
    /// Take the whole pending batch at once
    Pending,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Exclusive => "exclusive",
            Mode::Polyphonic => "polyphonic",
        }
    }
}

impl EndPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndPolicy::Loop => "loop",
            EndPolicy::Hold => "hold",
            EndPolicy::Hide => "hide",
        }
    }
}

impl LayoutOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutOrder::ColumnMajor => "column-major",
            LayoutOrder::RowMajor => "row-major",
        }
    }
}

impl InputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::Poll => "poll",
            InputMode::Pending => "pending",
        }
    }
}

/// Resolved configuration for one playback session.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub fps: u32,
    pub quit_note: u8,
    pub offset: i32,
    pub audio: bool,
    pub mode: Mode,
    #[serde(default)]
    pub cell_width: Option<u32>,
    #[serde(default)]
    pub cell_height: Option<u32>,
    pub end_policy: EndPolicy,
    pub layout_order: LayoutOrder,
    #[serde(default)]
    pub columns: Option<usize>,
    #[serde(default)]
    pub rows: Option<usize>,
    pub input_mode: InputMode,
    #[serde(default)]
    pub start_clip: Option<usize>,
    pub sync_timeout_ms: u64,
    pub idle_poll_ms: u64,
    pub background: [u8; 3],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            quit_note: DEFAULT_QUIT_NOTE,
            offset: 0,
            audio: false,
            mode: Mode::Polyphonic,
            cell_width: None,
            cell_height: None,
            end_policy: EndPolicy::Loop,
            layout_order: LayoutOrder::ColumnMajor,
            columns: None,
            rows: None,
            input_mode: InputMode::Pending,
            start_clip: None,
            sync_timeout_ms: DEFAULT_SYNC_TIMEOUT_MS,
            idle_poll_ms: DEFAULT_IDLE_POLL_MS,
            background: [0, 0, 0],
        }
    }
}

impl Settings {
    /// Layers built-in defaults, an optional settings file, `MIDI2VIDEO_*`
    /// environment variables and finally `overrides` (the command line).
    pub fn load<I>(config_file: Option<&Path>, overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'static str, Value)>,
    {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("fps", i64::from(defaults.fps))?
            .set_default("quit_note", i64::from(defaults.quit_note))?
            .set_default("offset", i64::from(defaults.offset))?
            .set_default("audio", defaults.audio)?
            .set_default("mode", defaults.mode.as_str())?
            .set_default("end_policy", defaults.end_policy.as_str())?
            .set_default("layout_order", defaults.layout_order.as_str())?
            .set_default("input_mode", defaults.input_mode.as_str())?
            .set_default("sync_timeout_ms", defaults.sync_timeout_ms as i64)?
            .set_default("idle_poll_ms", defaults.idle_poll_ms as i64)?
            .set_default("background", vec![0i64, 0, 0])?;

        if let Some(path) = config_file {
            info!("Reading settings from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        for (key, value) in overrides {
            debug!("Command-line override {} = {:?}", key, value);
            builder = builder.set_override(key, value)?;
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        debug!("Resolved settings: {:?}", settings);
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(Error::Config("fps must be at least 1".to_string()));
        }
        if self.quit_note > 127 {
            return Err(Error::Config(format!(
                "quit note {} is outside the MIDI range 0-127",
                self.quit_note
            )));
        }
        let (w, h) = self.cell_size();
        if w == 0 || h == 0 {
            return Err(Error::Config("cell size must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Cell size, falling back to the mode's default square.
    pub fn cell_size(&self) -> (u32, u32) {
        let fallback = match self.mode {
            Mode::Exclusive => DEFAULT_SINGLE_CELL,
            Mode::Polyphonic => DEFAULT_GRID_CELL,
        };
        (
            self.cell_width.unwrap_or(fallback),
            self.cell_height.unwrap_or(fallback),
        )
    }

    pub fn sync_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_timeout_ms)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }
}
