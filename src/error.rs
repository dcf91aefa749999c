//! Error taxonomy for a playback session.
//!
//! A [`DecodeError`] never reaches [`Error`]: the frame clock resolves it
//! per clip according to the end policy. Everything in [`Error`] ends the
//! session through the same teardown path as the quit note.

use crate::midi::MidiError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A clip could not produce a frame at the requested time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("end of stream at {t:.3}s")]
    EndOfStream { t: f64 },
    #[error("decode failed at {t:.3}s: {reason}")]
    Failed { t: f64, reason: String },
}

/// A clip could not be handed to the core.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("clip file not found: {0}")]
    NotFound(PathBuf),
    #[error("unsupported rotation {degrees} for {name} (multiples of 90 only)")]
    UnsupportedRotation { name: String, degrees: i64 },
    #[error("invalid manifest {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },
    #[error("could not read clip directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("audio did not signal ready within {0:?}")]
    SyncTimeout(Duration),
    #[error("MIDI input disconnected: {0}")]
    InputDisconnect(String),
    #[error(transparent)]
    Midi(MidiError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<MidiError> for Error {
    fn from(err: MidiError) -> Self {
        match err {
            MidiError::Disconnected(reason) => Error::InputDisconnect(reason),
            other => Error::Midi(other),
        }
    }
}

impl From<::config::ConfigError> for Error {
    fn from(err: ::config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
