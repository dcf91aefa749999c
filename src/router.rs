// router.rs

use crate::midi::{EventKind, NoteEvent};
use log::trace;

/// What a single note event asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Activate(usize),
    Deactivate(usize),
    Ignore,
}

/// Maps a note onto a clip slot: `(note + offset) mod note_count`.
///
/// The offset may be negative; the result is always in `[0, note_count)`.
/// `note_count` must be at least 1.
pub fn clip_index(note: u8, note_count: usize, offset: i32) -> usize {
    debug_assert!(note_count > 0);
    let shifted = i64::from(note) + i64::from(offset);
    shifted.rem_euclid(note_count as i64) as usize
}

/// Pure translation from note events to session actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteRouter {
    clip_count: usize,
    quit_note: u8,
    offset: i32,
}

impl NoteRouter {
    pub fn new(clip_count: usize, quit_note: u8, offset: i32) -> Self {
        Self {
            clip_count: clip_count.max(1),
            quit_note,
            offset,
        }
    }

    pub fn route(&self, event: &NoteEvent) -> Action {
        let action = match event.kind {
            EventKind::NoteOn if event.note == self.quit_note => Action::Quit,
            EventKind::NoteOn => {
                Action::Activate(clip_index(event.note, self.clip_count, self.offset))
            }
            EventKind::NoteOff => {
                Action::Deactivate(clip_index(event.note, self.clip_count, self.offset))
            }
            EventKind::Other => Action::Ignore,
        };
        trace!("Routed {:?} to {:?}", event, action);
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_wraps_modulo_clip_count() {
        assert_eq!(clip_index(0, 4, 0), 0);
        assert_eq!(clip_index(5, 4, 0), 1);
        assert_eq!(clip_index(127, 9, 0), 127 % 9);
    }

    #[test]
    fn test_index_applies_offset() {
        assert_eq!(clip_index(2, 4, 1), 3);
        assert_eq!(clip_index(3, 4, 1), 0);
    }

    #[test]
    fn test_negative_offset_stays_in_range() {
        assert_eq!(clip_index(0, 4, -1), 3);
        assert_eq!(clip_index(1, 3, -200), (1i64 - 200).rem_euclid(3) as usize);
    }

    #[test]
    fn test_quit_takes_precedence() {
        let router = NoteRouter::new(4, 50, 0);
        assert_eq!(router.route(&NoteEvent::note_on(50, 1)), Action::Quit);
        // the release of the quit note is an ordinary release
        assert_eq!(
            router.route(&NoteEvent::note_off(50)),
            Action::Deactivate(50 % 4)
        );
    }

    #[test]
    fn test_other_messages_are_ignored() {
        let router = NoteRouter::new(4, 50, 0);
        assert_eq!(router.route(&NoteEvent::other()), Action::Ignore);
    }
}
