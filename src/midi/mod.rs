//! MIDI input for midi2video
//!
//! This module provides the note input side of a playback session:
//! - Core note event type, wire decoding and error handling
//! - Real MIDI device input via midir
//! - A scripted source for tests
//!
//! The main components are:
//! - [`NoteSource`] trait for non-blocking event polling
//! - [`MidirNoteSource`] for real MIDI device communication
//! - [`MockNoteSource`] for testing
//!
mod engine;
pub mod midir_engine;
pub mod mock_engine;

// Re-export main types from engine
pub use engine::{EventKind, MidiError, NoteEvent, NoteSource, Result};

// Re-export concrete implementations
pub use midir_engine::{list_input_ports, MidirNoteSource};
pub use mock_engine::MockNoteSource;

// Set default source type
pub type DefaultNoteSource = MidirNoteSource;
