//! Key events produced by the debounce and velocity pipeline.

use wmidi::{Note, U7};

/// A completed key transition: which note, how hard, press or release.
///
/// Events are immutable once created; they are handed to the event queue
/// and consumed exactly once by the register surface. The note is stored as
/// a [`U7`] (which implements [`Default`], as [`tinyvec`] containers
/// require of their items); public interfaces deal in [`Note`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KeyEvent {
    note: U7,
    velocity: u8,
    press: bool,
}

impl KeyEvent {
    /// A qualified press of `note` struck with `velocity`.
    pub fn press(note: Note, velocity: u8) -> Self {
        Self {
            note: U7::from_u8_lossy(u8::from(note)),
            velocity,
            press: true,
        }
    }

    /// A qualified release of `note`. Release events carry a velocity of
    /// zero: a single-contact matrix has no release speed to measure.
    pub fn release(note: Note) -> Self {
        Self {
            note: U7::from_u8_lossy(u8::from(note)),
            velocity: 0,
            press: false,
        }
    }

    /// The note this event belongs to.
    pub fn note(&self) -> Note {
        Note::from(self.note)
    }

    /// Strike intensity, 0 for releases.
    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// `true` for a press, `false` for a release.
    pub fn is_press(&self) -> bool {
        self.press
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for KeyEvent {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "{} {} (velocity {})",
            if self.press { "press" } else { "release" },
            Note::from(self.note).to_str(),
            self.velocity
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_carries_note_and_velocity() {
        let event = KeyEvent::press(Note::C4, 200);
        assert_eq!(Note::C4, event.note());
        assert_eq!(200, event.velocity());
        assert!(event.is_press());
    }

    #[test]
    fn release_velocity_is_always_zero() {
        let event = KeyEvent::release(Note::C4);
        assert_eq!(0, event.velocity());
        assert!(!event.is_press());
    }
}
