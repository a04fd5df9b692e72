//! Register-level core of the keybed scanner: a velocity-sensing key-matrix
//! scanner for musical keyboards, exposed to a host as six word registers
//! with FIFO-buffered events and an interrupt line.
//!
//! The scan pipeline itself (row walking, per-key debounce, velocity
//! estimation, event queuing) lives in `keybed_scanner_lib`; this crate puts
//! it behind the bus surface: a register file with a destructive-read event
//! port, an interrupt controller, and the scanner-enable gating.
//!
//! # Clocking and bus accesses
//!
//! [`KeybedScanner::tick`] is one scan clock. Bus transactions arrive
//! through [`read`][KeybedScanner::read] and [`write`][KeybedScanner::write]
//! between ticks; the surrounding bus adapter owns the handshake and is
//! expected to acknowledge within its own bounded time. All three methods
//! take `&mut self`, which is the single serialization point the design
//! needs: a tick's event push and a bus read's event pop can never
//! interleave, so queue occupancy accounting stays exact.

#![no_std]

pub mod irq;
pub mod registers;

use crate::irq::{Irq, IrqController};
use crate::registers::{
    CTRL_ENABLE, CTRL_FLUSH, Register, SCAN_MAP_INDEX_MASK, SCAN_MAP_INDEX_SHIFT,
    SCAN_MAP_NOTE_MASK, STATUS_COUNT_MASK, STATUS_COUNT_SHIFT, STATUS_FIFO_EMPTY,
    STATUS_FIFO_FULL, STATUS_OVERFLOW, encode_event,
};
use keybed_scanner_lib::{Activity, FIFO_DEPTH, KeyCoordinate, Keybed};
use wmidi::{Note, U7};

/// The keybed scanner peripheral core.
pub struct KeybedScanner {
    keybed: Keybed,
    irq: IrqController,
    enabled: bool,
    map_cursor: KeyCoordinate,
}

impl Default for KeybedScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl KeybedScanner {
    /// Constructs a core in its reset state: scanner enabled, queue empty,
    /// no interrupts enabled or pending, default note layout.
    pub fn new() -> Self {
        Self {
            keybed: Keybed::new(),
            irq: IrqController::new(),
            enabled: true,
            map_cursor: KeyCoordinate { row: 0, col: 0 },
        }
    }

    /// Run one scan clock against the current column input levels
    /// (active-low). While the scanner is disabled this is a no-op: key
    /// state, queue contents and the tick counter all freeze in place.
    pub fn tick(&mut self, columns: u8) {
        if !self.enabled {
            return;
        }
        let was_empty = self.keybed.queued() == 0;
        let activity = self.keybed.tick(columns);
        if was_empty && activity.contains(Activity::EventQueued) {
            self.irq.raise(Irq::EventReady);
        }
        if activity.contains(Activity::Overflow) {
            self.irq.raise(Irq::Overflow);
        }
    }

    /// Service a bus read. Reading EVENT pops the oldest queued event (the
    /// one read side effect in the map) and reads as zero when the queue
    /// is empty. Unmapped addresses read as zero.
    pub fn read(&mut self, addr: u32) -> u32 {
        match Register::decode(addr) {
            Some(Register::Ctrl) => {
                if self.enabled {
                    CTRL_ENABLE
                } else {
                    0
                }
            }
            Some(Register::Status) => self.status(),
            Some(Register::Event) => self.keybed.pop_event().map(encode_event).unwrap_or(0),
            Some(Register::IrqEnable) => u32::from(self.irq.enabled().bits()),
            Some(Register::IrqStatus) => u32::from(self.irq.pending().bits()),
            Some(Register::ScanMap) => self.scan_map_word(),
            None => 0,
        }
    }

    /// Service a bus write. Unmapped and read-only addresses swallow the
    /// write; malformed SCAN_MAP indices are ignored.
    pub fn write(&mut self, addr: u32, data: u32) {
        match Register::decode(addr) {
            Some(Register::Ctrl) => {
                self.enabled = data & CTRL_ENABLE != 0;
                if data & CTRL_FLUSH != 0 {
                    self.keybed.flush();
                }
            }
            Some(Register::IrqEnable) => {
                let sources = (Irq::EventReady | Irq::Overflow).bits();
                self.irq.set_enable(Irq::from(data as u8 & sources));
                // Conditions that already hold must not be missed by a
                // late enable.
                if self.keybed.queued() > 0 {
                    self.irq.raise(Irq::EventReady);
                }
                if self.keybed.overflowed() {
                    self.irq.raise(Irq::Overflow);
                }
            }
            Some(Register::IrqStatus) => {
                let acknowledged = Irq::from(data as u8);
                if acknowledged.contains(Irq::Overflow) {
                    self.keybed.acknowledge_overflow();
                }
                self.irq.acknowledge(acknowledged);
            }
            Some(Register::ScanMap) => {
                let index = ((data >> SCAN_MAP_INDEX_SHIFT) & SCAN_MAP_INDEX_MASK) as u8;
                let Some(key) = KeyCoordinate::from_index(index) else {
                    return;
                };
                let note = Note::from(U7::from_u8_lossy((data & SCAN_MAP_NOTE_MASK) as u8));
                self.keybed.map_mut().assign(key, note);
                self.map_cursor = key;
            }
            Some(Register::Status) | Some(Register::Event) | None => {}
        }
    }

    /// Level of the outgoing interrupt request line.
    pub fn irq_line(&self) -> bool {
        self.irq.asserted()
    }

    /// Number of scan ticks executed since reset. Advances only while the
    /// scanner is enabled.
    pub fn scan_ticks(&self) -> u64 {
        self.keybed.ticks()
    }

    /// Hardware reset: every component back to its defined initial value.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn status(&self) -> u32 {
        let queued = self.keybed.queued();
        let count = (queued as u32).min(STATUS_COUNT_MASK);
        let mut word = count << STATUS_COUNT_SHIFT;
        if queued == 0 {
            word |= STATUS_FIFO_EMPTY;
        }
        if queued >= FIFO_DEPTH {
            word |= STATUS_FIFO_FULL;
        }
        if self.keybed.overflowed() {
            word |= STATUS_OVERFLOW;
        }
        word
    }

    fn scan_map_word(&self) -> u32 {
        let note = self.keybed.map().note_at(self.map_cursor);
        (u32::from(self.map_cursor.index()) << SCAN_MAP_INDEX_SHIFT) | u32::from(u8::from(note))
    }
}
