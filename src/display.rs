use crate::error::Result;
use crate::frame::Frame;

/// The surface finished frames are handed to.
///
/// The core requests a size once at session start and then only presents;
/// window or device management belongs to the implementation.
pub trait DisplaySink {
    fn open(&mut self, size: (u32, u32)) -> Result<()>;

    fn present(&mut self, frame: &Frame) -> Result<()>;

    /// External close signal, e.g. the window was closed.
    fn close_requested(&self) -> bool {
        false
    }

    /// Releases the surface. Called exactly once during teardown.
    fn close(&mut self) {}
}

/// Counts frames and discards them.
#[derive(Debug, Default)]
pub struct NullDisplay {
    presented: u64,
}

impl NullDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl DisplaySink for NullDisplay {
    fn open(&mut self, _size: (u32, u32)) -> Result<()> {
        Ok(())
    }

    fn present(&mut self, _frame: &Frame) -> Result<()> {
        self.presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_display_counts_frames() {
        let mut display = NullDisplay::new();
        display.open((2, 2)).unwrap();
        display.present(&Frame::new(2, 2)).unwrap();
        assert_eq!(display.presented(), 1);
        assert!(!display.close_requested());
    }
}
