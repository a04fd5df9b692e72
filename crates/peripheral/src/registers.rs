//! Register map of the scanner's bus surface.
//!
//! Six 32-bit registers at word-aligned byte offsets. Anything outside the
//! map reads as zero and swallows writes; nothing on the bus can fault.

use keybed_scanner_lib::KeyEvent;
use num_derive::FromPrimitive;

/// Byte offsets of the word registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive)]
pub enum Register {
    /// Scanner enable and event-queue flush.
    Ctrl = 0x00,
    /// Queue occupancy and the overflow indicator. Read-only.
    Status = 0x04,
    /// Oldest queued event; reading pops it. Reads as zero when empty.
    Event = 0x08,
    /// Interrupt enable mask.
    IrqEnable = 0x0C,
    /// Interrupt pending flags, write-1-to-clear.
    IrqStatus = 0x10,
    /// Scan-map table access: write `{index, note}`, read the last-written
    /// entry back.
    ScanMap = 0x14,
}

impl Register {
    /// Decode a bus address; `None` for anything outside the map.
    pub fn decode(addr: u32) -> Option<Self> {
        num_traits::FromPrimitive::from_u32(addr)
    }
}

/// CTRL: scanner enable, set out of reset.
pub const CTRL_ENABLE: u32 = 1 << 0;
/// CTRL: discard queued events and the overflow indicator. Self-clearing.
pub const CTRL_FLUSH: u32 = 1 << 1;

/// STATUS: the event queue is empty.
pub const STATUS_FIFO_EMPTY: u32 = 1 << 1;
/// STATUS: the event queue is at capacity.
pub const STATUS_FIFO_FULL: u32 = 1 << 2;
/// STATUS: an event has been discarded since the indicator was cleared.
pub const STATUS_OVERFLOW: u32 = 1 << 3;
/// STATUS: bit position of the queue occupancy field.
pub const STATUS_COUNT_SHIFT: u32 = 8;
/// STATUS: width mask of the queue occupancy field; occupancy clamps here.
pub const STATUS_COUNT_MASK: u32 = 0xF;

/// EVENT: note number field.
pub const EVENT_NOTE_MASK: u32 = 0xFF;
/// EVENT: bit position of the velocity field.
pub const EVENT_VELOCITY_SHIFT: u32 = 8;
/// EVENT: set for a press, clear for a release.
pub const EVENT_PRESS: u32 = 1 << 16;

/// SCAN_MAP: note number field.
pub const SCAN_MAP_NOTE_MASK: u32 = 0xFF;
/// SCAN_MAP: bit position of the key index field.
pub const SCAN_MAP_INDEX_SHIFT: u32 = 8;
/// SCAN_MAP: width mask of the key index field.
pub const SCAN_MAP_INDEX_MASK: u32 = 0x3F;

/// Pack a queued event into the EVENT register format. The default
/// (empty) event packs to zero, the defined empty-read value.
pub fn encode_event(event: KeyEvent) -> u32 {
    let mut word = u32::from(u8::from(event.note()));
    word |= u32::from(event.velocity()) << EVENT_VELOCITY_SHIFT;
    if event.is_press() {
        word |= EVENT_PRESS;
    }
    word
}
