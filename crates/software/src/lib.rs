//! This crate contains the architecture-agnostic scanning logic of the keybed scanner, a
//! velocity-sensing key-matrix core for musical keyboards. It covers everything between the raw
//! column lines and the register surface: walking the matrix rows, debouncing every switch,
//! estimating strike velocity from attack timing, mapping switch positions to notes, and queuing
//! the resulting events. The register file and interrupt wiring that put this pipeline behind a
//! bus live in the companion `keybed_scanner` crate.

#![deny(missing_docs)]
#![no_std]

/// Per-key contact debouncing and edge qualification.
pub mod debounce;

/// Coordinate-to-note mapping for the key matrix.
pub mod keymap;

/// Strike-velocity estimation from attack timing.
pub mod velocity;

mod event;
pub use event::*;

mod fifo;
pub use fifo::*;

mod scan;
pub use scan::*;

use crate::debounce::{KeyContact, Transition};
use crate::keymap::ScanMap;
use bitmask_enum::bitmask;

/// Noteworthy outcomes of a single scan tick.
#[bitmask(u8)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Activity {
    /// A qualified key transition appended a new event to the queue.
    EventQueued,
    /// A qualified key transition was discarded because the queue was full.
    Overflow,
}

/// The scan pipeline of the keybed scanner.
///
/// One call to [`tick`][Self::tick] is one scan tick: the next row is
/// driven, the column lines are sampled for it, every switch on that row
/// feeds its debounce machine, and qualified transitions become queued
/// [`KeyEvent`]s. The caller owns the clock: the pipeline keeps no notion
/// of time beyond counting the ticks it is given, so halting the calls
/// freezes every debounce counter and attack measurement in place.
#[derive(Clone, Debug)]
pub struct Keybed {
    scan: ScanDriver,
    keys: [[KeyContact; COLS]; ROWS],
    map: ScanMap,
    fifo: EventFifo,
    ticks: u64,
}

impl Default for Keybed {
    fn default() -> Self {
        Self::new()
    }
}

impl Keybed {
    /// Constructs a pipeline with all keys released, an empty queue and the
    /// default [`ScanMap`] layout.
    pub fn new() -> Self {
        Self {
            scan: ScanDriver::default(),
            keys: [[KeyContact::default(); COLS]; ROWS],
            map: ScanMap::default(),
            fifo: EventFifo::new(),
            ticks: 0,
        }
    }

    /// Run one scan tick against the current column input levels
    /// (active-low, one bit per column). Returns what the tick produced.
    pub fn tick(&mut self, columns: u8) -> Activity {
        self.ticks = self.ticks.wrapping_add(1);
        let observation = self.scan.observe(columns);
        let mut activity = Activity::none();

        for col in 0..COLS as u8 {
            let transition = self.keys[usize::from(observation.row)][usize::from(col)]
                .observe(observation.is_closed(col), self.ticks);
            let Some(transition) = transition else {
                continue;
            };

            let note = self.map.note_at(KeyCoordinate {
                row: observation.row,
                col,
            });
            let event = match transition {
                Transition::Pressed { attack_ticks } => {
                    KeyEvent::press(note, velocity::from_attack_ticks(attack_ticks))
                }
                Transition::Released => KeyEvent::release(note),
            };

            if self.fifo.push(event) {
                #[cfg(feature = "defmt")]
                defmt::info!("queued {}", event);
                activity |= Activity::EventQueued;
            } else {
                #[cfg(feature = "defmt")]
                defmt::warn!("event queue full, discarded {}", event);
                activity |= Activity::Overflow;
            }
        }

        activity
    }

    /// Remove and return the oldest queued event.
    pub fn pop_event(&mut self) -> Option<KeyEvent> {
        self.fifo.pop()
    }

    /// Number of queued, unread events.
    pub fn queued(&self) -> usize {
        self.fifo.len()
    }

    /// Whether the event queue has discarded an event since the indicator
    /// was last acknowledged.
    pub fn overflowed(&self) -> bool {
        self.fifo.overflowed()
    }

    /// Clear the sticky overflow indicator.
    pub fn acknowledge_overflow(&mut self) {
        self.fifo.acknowledge_overflow();
    }

    /// Discard all queued events along with the overflow indicator.
    /// Debounce state is untouched: keys that are held stay held and do not
    /// produce duplicate press events.
    pub fn flush(&mut self) {
        self.fifo.clear();
    }

    /// The coordinate-to-note table.
    pub fn map(&self) -> &ScanMap {
        &self.map
    }

    /// Mutable access to the coordinate-to-note table.
    pub fn map_mut(&mut self) -> &mut ScanMap {
        &mut self.map
    }

    /// Number of scan ticks run since reset.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Return every component of the pipeline to its initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wmidi::Note;

    /// All columns open (no key pressed, active-low).
    const IDLE: u8 = 0x7F;

    fn run(keybed: &mut Keybed, columns: u8, ticks: u32) -> Activity {
        let mut activity = Activity::none();
        for _ in 0..ticks {
            activity |= keybed.tick(columns);
        }
        activity
    }

    /// Drive `columns` whenever row 0 is sampled and the idle level
    /// everywhere else, the way a switch wired to row 0 conducts only
    /// while its row is driven.
    fn run_on_row0(keybed: &mut Keybed, columns: u8, ticks: u32) -> Activity {
        let mut activity = Activity::none();
        for _ in 0..ticks {
            let level = if keybed.ticks() % ROWS as u64 == 0 {
                columns
            } else {
                IDLE
            };
            activity |= keybed.tick(level);
        }
        activity
    }

    #[test]
    fn press_and_release_produce_a_paired_event_stream() {
        let mut keybed = Keybed::new();

        let pressed = run_on_row0(&mut keybed, 0x7E, 500);
        assert!(pressed.contains(Activity::EventQueued));
        assert_eq!(1, keybed.queued(), "Hold should queue exactly one event");

        run(&mut keybed, IDLE, 500);
        assert_eq!(2, keybed.queued(), "Release should queue exactly one more");

        let press = keybed.pop_event().unwrap();
        assert!(press.is_press());
        assert_eq!(Note::C4, press.note());
        assert_eq!(
            velocity::MAX,
            press.velocity(),
            "A clean hold is the fastest resolvable attack"
        );

        let release = keybed.pop_event().unwrap();
        assert!(!release.is_press());
        assert_eq!(Note::C4, release.note());
        assert_eq!(0, release.velocity());

        assert_eq!(None, keybed.pop_event());
    }

    #[test]
    fn sub_window_blip_produces_no_events() {
        let mut keybed = Keybed::new();
        let blip = run_on_row0(&mut keybed, 0x7E, 100);
        let settled = run(&mut keybed, IDLE, 400);
        assert_eq!(Activity::none(), blip);
        assert_eq!(Activity::none(), settled);
        assert_eq!(0, keybed.queued());
    }

    #[test]
    fn chord_on_one_row_yields_one_event_per_key() {
        let mut keybed = Keybed::new();

        // Columns 0, 1 and 2 closed while row 0 is driven.
        run_on_row0(&mut keybed, 0x78, 1000);
        assert_eq!(3, keybed.queued(), "Expected one press per coordinate");

        for semitone in 60..63u8 {
            let event = keybed.pop_event().unwrap();
            assert!(event.is_press());
            assert_eq!(
                semitone,
                u8::from(event.note()),
                "Presses should drain in column order"
            );
        }

        run(&mut keybed, IDLE, 500);
        assert_eq!(3, keybed.queued(), "Expected one release per coordinate");
        for semitone in 60..63u8 {
            let event = keybed.pop_event().unwrap();
            assert!(!event.is_press());
            assert_eq!(semitone, u8::from(event.note()));
        }
    }

    #[test]
    fn full_board_overflows_the_queue() {
        let mut keybed = Keybed::new();

        // Every switch in the matrix closed at once: more qualified
        // presses than the queue can hold.
        let activity = run(&mut keybed, 0x00, 500);
        assert!(activity.contains(Activity::EventQueued));
        assert!(activity.contains(Activity::Overflow));
        assert_eq!(FIFO_DEPTH, keybed.queued());
        assert!(keybed.overflowed());

        keybed.acknowledge_overflow();
        assert!(!keybed.overflowed());
        assert_eq!(
            FIFO_DEPTH,
            keybed.queued(),
            "Acknowledging the indicator must not drop events"
        );
    }

    #[test]
    fn reassigned_notes_flow_into_events() {
        let mut keybed = Keybed::new();
        keybed
            .map_mut()
            .assign(KeyCoordinate { row: 0, col: 1 }, Note::C6);

        run_on_row0(&mut keybed, 0x7D, 500);
        let event = keybed.pop_event().unwrap();
        assert_eq!(Note::C6, event.note(), "Expected left but got right");
    }

    #[test]
    fn flush_discards_events_but_not_held_keys() {
        let mut keybed = Keybed::new();
        run_on_row0(&mut keybed, 0x7E, 500);
        assert_eq!(1, keybed.queued());

        keybed.flush();
        assert_eq!(0, keybed.queued());

        // The key is still held; no duplicate press may appear.
        let held = run_on_row0(&mut keybed, 0x7E, 500);
        assert_eq!(Activity::none(), held);

        // Releasing it still produces the pairing release event.
        run(&mut keybed, IDLE, 500);
        assert_eq!(1, keybed.queued());
        assert!(!keybed.pop_event().unwrap().is_press());
    }

    #[test]
    fn reset_returns_the_pipeline_to_power_on_state() {
        let mut keybed = Keybed::new();
        run(&mut keybed, 0x00, 500);
        keybed.reset();
        assert_eq!(0, keybed.queued());
        assert!(!keybed.overflowed());

        run_on_row0(&mut keybed, 0x7E, 500);
        assert_eq!(1, keybed.queued(), "A fresh press must scan cleanly");
    }
}
