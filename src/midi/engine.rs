use std::error::Error;
use std::fmt;

/// Custom error type for MIDI input operations
#[derive(Debug, Clone, PartialEq)]
pub enum MidiError {
    /// Error when opening the MIDI subsystem or connecting to a port
    ConnectionError(String),
    /// No input port matched the requested name
    PortNotFound(String),
    /// The input went away while the session was running
    Disconnected(String),
    /// Error when receiving a MIDI message
    RecvError(String),
}

impl fmt::Display for MidiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiError::ConnectionError(msg) => write!(f, "MIDI connection error: {}", msg),
            MidiError::PortNotFound(name) => write!(f, "MIDI port not found: {}", name),
            MidiError::Disconnected(msg) => write!(f, "MIDI input disconnected: {}", msg),
            MidiError::RecvError(msg) => write!(f, "MIDI receive error: {}", msg),
        }
    }
}

impl Error for MidiError {}

/// Result type for MIDI operations
pub type Result<T> = std::result::Result<T, MidiError>;

/// What kind of message a [`NoteEvent`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    NoteOn,
    NoteOff,
    /// Control change, program change, clock and every other non-note message
    Other,
}

/// A single incoming MIDI event, consumed once by the note router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub kind: EventKind,
    pub note: u8,
    pub velocity: u8,
}

impl NoteEvent {
    pub fn note_on(note: u8, velocity: u8) -> Self {
        Self {
            kind: EventKind::NoteOn,
            note,
            velocity,
        }
    }

    pub fn note_off(note: u8) -> Self {
        Self {
            kind: EventKind::NoteOff,
            note,
            velocity: 0,
        }
    }

    pub fn other() -> Self {
        Self {
            kind: EventKind::Other,
            note: 0,
            velocity: 0,
        }
    }

    /// Decodes one raw MIDI message. Returns `None` for empty or truncated
    /// channel messages. A note-on with velocity 0 is a release.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let status = *data.first()?;
        match status & 0xF0 {
            0x90 | 0x80 if data.len() < 3 => None,
            0x90 if data[2] > 0 => Some(Self::note_on(data[1] & 0x7F, data[2] & 0x7F)),
            0x90 => Some(Self::note_off(data[1] & 0x7F)),
            0x80 => Some(Self {
                kind: EventKind::NoteOff,
                note: data[1] & 0x7F,
                velocity: data[2] & 0x7F,
            }),
            _ => Some(Self::other()),
        }
    }
}

/// Non-blocking source of note events. The core never owns port lifecycle;
/// implementations release their port when dropped.
pub trait NoteSource {
    /// Returns the next pending event, or `None` if nothing is waiting.
    fn poll(&mut self) -> Result<Option<NoteEvent>>;

    /// Returns every pending event in arrival order.
    fn iter_pending(&mut self) -> Result<Vec<NoteEvent>> {
        let mut events = Vec::new();
        while let Some(event) = self.poll()? {
            events.push(event);
        }
        Ok(events)
    }
}
