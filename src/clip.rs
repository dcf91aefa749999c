use crate::error::DecodeError;
use crate::frame::Frame;
use crate::grid::GridCell;
use std::fmt;

/// A decodable video source. Decoding itself is provided by whoever loads
/// the clip; the core only asks for frames by clip-local time.
pub trait FrameSource {
    /// Native frame size after any load-time transform.
    fn size(&self) -> (u32, u32);

    /// Length in seconds, or `None` for an unbounded stream.
    fn duration(&self) -> Option<f64>;

    fn frame_at(&mut self, t: f64) -> Result<Frame, DecodeError>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn size(&self) -> (u32, u32) {
        (**self).size()
    }

    fn duration(&self) -> Option<f64> {
        (**self).duration()
    }

    fn frame_at(&mut self, t: f64) -> Result<Frame, DecodeError> {
        (**self).frame_at(t)
    }
}

/// One loaded clip slot: the source plus the facts fixed at load time.
/// Per-activation state lives in the state machine, indexed by `id`.
pub struct Clip {
    pub id: usize,
    pub name: String,
    source: Box<dyn FrameSource>,
    duration: Option<f64>,
    size: (u32, u32),
    grid_cell: Option<GridCell>,
}

impl Clip {
    pub fn new(id: usize, name: impl Into<String>, source: Box<dyn FrameSource>) -> Self {
        let duration = source.duration();
        let size = source.size();
        Self {
            id,
            name: name.into(),
            source,
            duration,
            size,
            grid_cell: None,
        }
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn grid_cell(&self) -> Option<GridCell> {
        self.grid_cell
    }

    pub(crate) fn assign_cell(&mut self, cell: GridCell) {
        self.grid_cell = Some(cell);
    }

    pub fn frame_at(&mut self, t: f64) -> Result<Frame, DecodeError> {
        self.source.frame_at(t)
    }
}

impl fmt::Debug for Clip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clip")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("duration", &self.duration)
            .field("size", &self.size)
            .field("grid_cell", &self.grid_cell)
            .finish()
    }
}
