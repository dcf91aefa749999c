use crate::config::{EndPolicy, InputMode, LayoutOrder, Mode};
use clap::Parser;
use ::config::Value;
use std::path::PathBuf;

/// Play video clips from a MIDI controller: each note starts, stops or
/// switches a clip.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// List available MIDI input ports and exit
    #[arg(long)]
    pub device_list: bool,

    /// Name (or part of the name) of the MIDI input port
    #[arg(long)]
    pub portname: Option<String>,

    /// Pick the MIDI input port interactively
    #[arg(long, conflicts_with = "portname")]
    pub select_port: bool,

    /// Which MIDI note quits the session
    #[arg(long)]
    pub quitnote: Option<u8>,

    /// Offset added to every note before mapping it to a clip
    #[arg(long, allow_hyphen_values = true)]
    pub offset: Option<i32>,

    /// Size of each video cell in pixels (square)
    #[arg(long)]
    pub size: Option<u32>,

    /// Frames per second of the playback clock
    #[arg(long)]
    pub fps: Option<u32>,

    /// Exclusive (one clip at a time) or polyphonic (grid, key-gated)
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Play clip audio in sync with the first frame
    #[arg(long)]
    pub audio: bool,

    /// What a clip does when it reaches its end
    #[arg(long, value_enum)]
    pub end_policy: Option<EndPolicy>,

    /// Order in which clips are assigned to grid cells
    #[arg(long, value_enum)]
    pub layout_order: Option<LayoutOrder>,

    /// Number of grid columns (derived from the clip count if omitted)
    #[arg(long)]
    pub columns: Option<usize>,

    /// Number of grid rows (derived from the clip count if omitted)
    #[arg(long)]
    pub rows: Option<usize>,

    /// How pending MIDI events are drained each iteration
    #[arg(long, value_enum)]
    pub input_mode: Option<InputMode>,

    /// Clip to show before the first note (exclusive mode)
    #[arg(long)]
    pub start_clip: Option<usize>,

    /// Directory with video files
    #[arg(long, default_value = "data")]
    pub indir: PathBuf,

    /// Manifest listing clips and their rotation (.yml, .toml, .json)
    #[arg(long)]
    pub mapfile: Option<PathBuf>,

    /// Video file extension
    #[arg(long, default_value = ".mp4")]
    pub ext: String,

    /// Settings file layered under the command line
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Command-line values as settings overrides; only options that were
    /// actually given are returned.
    pub fn overrides(&self) -> Vec<(&'static str, Value)> {
        let mut overrides: Vec<(&'static str, Value)> = Vec::new();
        if let Some(note) = self.quitnote {
            overrides.push(("quit_note", Value::from(i64::from(note))));
        }
        if let Some(offset) = self.offset {
            overrides.push(("offset", Value::from(i64::from(offset))));
        }
        if let Some(size) = self.size {
            overrides.push(("cell_width", Value::from(i64::from(size))));
            overrides.push(("cell_height", Value::from(i64::from(size))));
        }
        if let Some(fps) = self.fps {
            overrides.push(("fps", Value::from(i64::from(fps))));
        }
        if let Some(mode) = self.mode {
            overrides.push(("mode", Value::from(mode.as_str())));
        }
        if self.audio {
            overrides.push(("audio", Value::from(true)));
        }
        if let Some(policy) = self.end_policy {
            overrides.push(("end_policy", Value::from(policy.as_str())));
        }
        if let Some(order) = self.layout_order {
            overrides.push(("layout_order", Value::from(order.as_str())));
        }
        if let Some(columns) = self.columns {
            overrides.push(("columns", Value::from(columns as i64)));
        }
        if let Some(rows) = self.rows {
            overrides.push(("rows", Value::from(rows as i64)));
        }
        if let Some(input_mode) = self.input_mode {
            overrides.push(("input_mode", Value::from(input_mode.as_str())));
        }
        if let Some(clip) = self.start_clip {
            overrides.push(("start_clip", Value::from(clip as i64)));
        }
        overrides
    }
}

pub fn validate_device(device_name: &str, devices: &[String]) -> Result<(), String> {
    if !devices.iter().any(|d| d.contains(device_name)) {
        let mut error_msg = format!(
            "Error: Device '{}' not found in available devices:\n",
            device_name
        );
        for device in devices {
            error_msg.push_str(&format!("  - {}\n", device));
        }
        return Err(error_msg);
    }
    Ok(())
}

/// Asks the user to pick one of `devices`.
pub fn select_device(devices: &[String]) -> Result<String, String> {
    let index = dialoguer::Select::new()
        .with_prompt("Select a MIDI input")
        .items(devices)
        .default(0)
        .interact()
        .map_err(|e| format!("Port selection failed: {}", e))?;
    Ok(devices[index].clone())
}
