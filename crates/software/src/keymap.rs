//! Coordinate-to-note mapping for the key matrix.

use crate::scan::{COLS, KeyCoordinate, ROWS};
use wmidi::{Note, U7};

/// Note assigned to row 0, column 0 by the default layout: middle C.
const ORIGIN_NOTE: u8 = 60;

/// Writable table assigning a note to every switch position.
///
/// The default layout is chromatic and row-major, anchored at middle C:
/// row 0/column 0 plays note 60 and each subsequent position plays one
/// semitone higher. Assignments are masked to the 7-bit note range;
/// assignments outside the matrix are ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanMap {
    notes: [[U7; COLS]; ROWS],
}

impl Default for ScanMap {
    fn default() -> Self {
        let mut notes = [[U7::default(); COLS]; ROWS];
        for (row, columns) in notes.iter_mut().enumerate() {
            for (col, note) in columns.iter_mut().enumerate() {
                *note = U7::from_u8_lossy(ORIGIN_NOTE + (row * COLS + col) as u8);
            }
        }
        Self { notes }
    }
}

impl ScanMap {
    /// The note a switch position is mapped to. Positions outside the
    /// matrix read as note 0.
    pub fn note_at(&self, key: KeyCoordinate) -> Note {
        let note = self
            .notes
            .get(usize::from(key.row))
            .and_then(|columns| columns.get(usize::from(key.col)))
            .copied()
            .unwrap_or_default();
        Note::from(note)
    }

    /// Reassign a switch position. The note is masked to 7 bits; a
    /// position outside the matrix is ignored.
    pub fn assign(&mut self, key: KeyCoordinate, note: Note) {
        if let Some(slot) = self
            .notes
            .get_mut(usize::from(key.row))
            .and_then(|columns| columns.get_mut(usize::from(key.col)))
        {
            *slot = U7::from_u8_lossy(u8::from(note));
        }
    }
}
