//! Strike-velocity estimation from attack timing.
//!
//! The scanner has no dedicated velocity sensor; it infers strike intensity
//! from the interval between a key's first contact and its
//! debounce-confirmed press. A short interval means the key was driven hard
//! through its travel, a long one means a hesitant or partial strike. The
//! mapping is a clamped piecewise-linear curve: monotonically non-increasing
//! in elapsed ticks, saturating at [`MAX`] for anything at or under the
//! fastest physically resolvable attack and at [`FLOOR`] beyond
//! [`SLOWEST_ATTACK_TICKS`].

use crate::debounce::PRESS_STABLE_SAMPLES;
use crate::scan::ROWS;

/// Fastest resolvable attack interval. A clean press is confirmed after
/// [`PRESS_STABLE_SAMPLES`] observations of its row, one per row cycle.
pub const FASTEST_ATTACK_TICKS: u64 = PRESS_STABLE_SAMPLES as u64 * ROWS as u64;

/// Attack intervals at or beyond this many ticks report [`FLOOR`].
pub const SLOWEST_ATTACK_TICKS: u64 = 8 * FASTEST_ATTACK_TICKS;

/// Weakest strike reported for a qualified press. Kept above zero so a
/// press event is never mistaken for a velocity-less release.
pub const FLOOR: u8 = 16;

/// Hardest strike the estimator can report.
pub const MAX: u8 = u8::MAX;

/// Map the elapsed ticks between first contact and debounce-confirmed
/// press to a velocity byte in `[FLOOR, MAX]`.
pub fn from_attack_ticks(elapsed: u64) -> u8 {
    if elapsed <= FASTEST_ATTACK_TICKS {
        MAX
    } else if elapsed >= SLOWEST_ATTACK_TICKS {
        FLOOR
    } else {
        let span = SLOWEST_ATTACK_TICKS - FASTEST_ATTACK_TICKS;
        let excess = elapsed - FASTEST_ATTACK_TICKS;
        MAX - (excess * u64::from(MAX - FLOOR) / span) as u8
    }
}
