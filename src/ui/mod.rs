//! Terminal status output
//!
//! Stands in for a window surface when running from a terminal: every
//! presented frame updates a spinner line with the frame number, canvas
//! size and mean brightness, which is enough to see clips come and go.

mod progress;

pub use progress::create_status_spinner;

use crate::display::DisplaySink;
use crate::error::Result;
use crate::frame::Frame;
use indicatif::ProgressBar;
use log::info;

pub struct StatusDisplay {
    spinner: ProgressBar,
    size: (u32, u32),
    presented: u64,
}

impl StatusDisplay {
    pub fn new() -> Self {
        Self::with_spinner(create_status_spinner())
    }

    pub fn with_spinner(spinner: ProgressBar) -> Self {
        Self {
            spinner,
            size: (0, 0),
            presented: 0,
        }
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl Default for StatusDisplay {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean of the RGB channels over the whole frame, 0-255.
pub fn mean_brightness(frame: &Frame) -> u8 {
    let bytes = frame.as_bytes();
    if bytes.is_empty() {
        return 0;
    }
    let total: u64 = bytes.iter().map(|&b| u64::from(b)).sum();
    (total / bytes.len() as u64) as u8
}

impl DisplaySink for StatusDisplay {
    fn open(&mut self, size: (u32, u32)) -> Result<()> {
        self.size = size;
        info!("Display opened at {}x{}", size.0, size.1);
        self.spinner
            .set_message(format!("canvas {}x{}, waiting for notes", size.0, size.1));
        Ok(())
    }

    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.presented += 1;
        self.spinner.set_message(format!(
            "frame {} | {}x{} | brightness {}",
            self.presented,
            frame.width(),
            frame.height(),
            mean_brightness(frame)
        ));
        self.spinner.tick();
        Ok(())
    }

    fn close(&mut self) {
        self.spinner
            .finish_with_message(format!("stopped after {} frames", self.presented));
    }
}
