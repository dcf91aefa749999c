pub mod audio;
pub mod cli;
pub mod clip;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod event_loop;
pub mod frame;
pub mod grid;
pub mod loader;
pub mod logging;
pub mod midi;
pub mod router;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod sync;
pub mod ui;

pub use error::{Error, Result};
pub use event_loop::{EventLoop, ExitReason};
pub use session::PlaybackSession;
