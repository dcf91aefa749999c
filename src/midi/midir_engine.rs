use crate::midi::{MidiError, NoteEvent, NoteSource, Result};
use crossbeam::channel::{unbounded, Receiver, TryRecvError};
use log::{debug, info, trace};
use midir::{Ignore, MidiInput, MidiInputConnection};

/// Note source backed by a live midir input connection.
///
/// The midir callback runs on the backend's thread and only forwards raw
/// bytes over a channel; decoding happens on the polling side.
pub struct MidirNoteSource {
    connection: Option<MidiInputConnection<()>>,
    rx: Receiver<Vec<u8>>,
    port_name: String,
}

impl MidirNoteSource {
    /// Connects to the first input port whose name contains `device_name`,
    /// or to the first port at all when no name is given.
    pub fn connect(device_name: Option<&str>) -> Result<Self> {
        let mut midi_in = MidiInput::new("midi2video-in")
            .map_err(|e| MidiError::ConnectionError(e.to_string()))?;
        midi_in.ignore(Ignore::All);

        let in_ports = midi_in.ports();
        debug!("Available MIDI input ports:");
        for port in &in_ports {
            if let Ok(port_name) = midi_in.port_name(port) {
                debug!("  - {}", port_name);
            }
        }

        let in_port = match device_name {
            Some(name) => in_ports
                .iter()
                .find(|p| midi_in.port_name(p).unwrap_or_default().contains(name))
                .ok_or_else(|| MidiError::PortNotFound(name.to_string()))?,
            None => in_ports
                .first()
                .ok_or_else(|| MidiError::PortNotFound("<any>".to_string()))?,
        };
        let port_name = midi_in.port_name(in_port).unwrap_or_default();

        let (tx, rx) = unbounded();
        let connection = midi_in
            .connect(
                in_port,
                "midi2video-input",
                move |stamp, message, _| {
                    trace!("MIDI bytes {:02X?} at {}", message, stamp);
                    let _ = tx.send(message.to_vec());
                },
                (),
            )
            .map_err(|e| MidiError::ConnectionError(e.to_string()))?;

        info!("Connected to MIDI input: {}", port_name);
        Ok(Self {
            connection: Some(connection),
            rx,
            port_name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl NoteSource for MidirNoteSource {
    fn poll(&mut self) -> Result<Option<NoteEvent>> {
        loop {
            match self.rx.try_recv() {
                Ok(bytes) => {
                    if let Some(event) = NoteEvent::parse(&bytes) {
                        return Ok(Some(event));
                    }
                    debug!("Dropping malformed MIDI message {:02X?}", bytes);
                }
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => {
                    return Err(MidiError::Disconnected(self.port_name.clone()))
                }
            }
        }
    }
}

impl Drop for MidirNoteSource {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
            info!("Closed MIDI input: {}", self.port_name);
        }
    }
}

/// Names of every MIDI input port currently visible.
#[cfg(not(feature = "test-mock"))]
pub fn list_input_ports() -> Vec<String> {
    let mut devices = Vec::new();

    if let Ok(midi_in) = MidiInput::new("midi2video-list") {
        for port in midi_in.ports() {
            if let Ok(name) = midi_in.port_name(&port) {
                devices.push(name);
            }
        }
    }

    devices
}

#[cfg(feature = "test-mock")]
pub fn list_input_ports() -> Vec<String> {
    // Mock implementation for tests
    vec!["Mock Device 1".to_string(), "Mock Device 2".to_string()]
}
