use crate::midi::{MidiError, NoteEvent, NoteSource, Result};
use std::collections::VecDeque;

/// Scripted note source for tests and offline runs.
///
/// Events are grouped in batches; each call to [`NoteSource::iter_pending`]
/// hands out one batch, while [`NoteSource::poll`] walks the current batch
/// one event at a time. Once the script is exhausted the source either stays
/// silent or reports a disconnect.
#[derive(Debug, Default)]
pub struct MockNoteSource {
    batches: VecDeque<VecDeque<NoteEvent>>,
    disconnect_when_empty: bool,
}

impl MockNoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a batch that becomes visible on a single loop iteration.
    pub fn push_batch(&mut self, events: impl IntoIterator<Item = NoteEvent>) -> &mut Self {
        self.batches.push_back(events.into_iter().collect());
        self
    }

    /// Queues an empty batch, i.e. one loop iteration with no input.
    pub fn push_silence(&mut self) -> &mut Self {
        self.batches.push_back(VecDeque::new());
        self
    }

    /// Report a disconnect once every batch has been consumed.
    pub fn disconnect_when_empty(mut self) -> Self {
        self.disconnect_when_empty = true;
        self
    }

    fn check_connected(&self) -> Result<()> {
        if self.disconnect_when_empty && self.batches.is_empty() {
            Err(MidiError::Disconnected("mock script ended".to_string()))
        } else {
            Ok(())
        }
    }
}

impl NoteSource for MockNoteSource {
    fn poll(&mut self) -> Result<Option<NoteEvent>> {
        self.check_connected()?;
        let Some(batch) = self.batches.front_mut() else {
            return Ok(None);
        };
        match batch.pop_front() {
            Some(event) => Ok(Some(event)),
            None => {
                // end of this iteration's batch
                self.batches.pop_front();
                Ok(None)
            }
        }
    }

    fn iter_pending(&mut self) -> Result<Vec<NoteEvent>> {
        self.check_connected()?;
        Ok(self
            .batches
            .pop_front()
            .map(Vec::from)
            .unwrap_or_default())
    }
}
