//! One-shot audio/video start barrier.
//!
//! Each side owns one half of a [`Rendezvous`] pair. Arriving fires that
//! side's ready signal and waits for the peer's. Halves are consumed on
//! arrival, so the barrier cannot be reused after the first frame.

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, warn};
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    /// The peer did not arrive within the allowed wait
    Timeout(Duration),
    /// The peer's half was dropped without arriving
    PeerGone,
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Timeout(wait) => write!(f, "peer not ready after {:?}", wait),
            SyncError::PeerGone => write!(f, "peer left before signalling ready"),
        }
    }
}

impl std::error::Error for SyncError {}

/// One side of the barrier.
#[derive(Debug)]
pub struct Rendezvous {
    side: &'static str,
    ready: Sender<()>,
    peer_ready: Receiver<()>,
}

/// Creates the `(video, audio)` halves of a fresh barrier.
pub fn pair() -> (Rendezvous, Rendezvous) {
    let (video_tx, video_rx) = bounded(1);
    let (audio_tx, audio_rx) = bounded(1);
    (
        Rendezvous {
            side: "video",
            ready: video_tx,
            peer_ready: audio_rx,
        },
        Rendezvous {
            side: "audio",
            ready: audio_tx,
            peer_ready: video_rx,
        },
    )
}

impl Rendezvous {
    /// Signals this side ready, then blocks up to `timeout` for the peer.
    pub fn arrive(self, timeout: Duration) -> Result<Duration, SyncError> {
        let started = Instant::now();
        // capacity 1 and single use: never blocks
        let _ = self.ready.try_send(());
        debug!("{} ready, waiting for peer", self.side);

        match self.peer_ready.recv_timeout(timeout) {
            Ok(()) => {
                let waited = started.elapsed();
                debug!("{} synchronized after {:?}", self.side, waited);
                Ok(waited)
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!("{} gave up waiting for peer after {:?}", self.side, timeout);
                Err(SyncError::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(SyncError::PeerGone),
        }
    }
}
