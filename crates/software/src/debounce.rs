//! Per-key contact debouncing and edge qualification.
//!
//! Each switch position carries its own four-phase state machine. A raw
//! level change only becomes a qualified press or release once the contact
//! has held the new level for a full debounce window of consecutive
//! observations; anything shorter is absorbed as bounce. A key is observed
//! once per row cycle, so the windows below are counted in visits of the
//! key's row, not in bus-clock ticks.

/// Consecutive closed observations required to qualify a press.
pub const PRESS_STABLE_SAMPLES: u16 = 32;

/// Consecutive open observations required to qualify a release.
pub const RELEASE_STABLE_SAMPLES: u16 = 32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Released,
    PressPending,
    Pressed,
    ReleasePending,
}

/// A qualified transition reported by a [`KeyContact`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The contact held closed through the press window. `attack_ticks` is
    /// the elapsed tick count between the first closed observation and this
    /// confirmation, the raw material for velocity estimation.
    Pressed {
        /// Ticks from first contact to debounce-confirmed press.
        attack_ticks: u64,
    },
    /// The contact held open through the release window.
    Released,
}

/// Debounce state for a single switch in the matrix.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyContact {
    phase: Phase,
    stable: u16,
    attack_at: Option<u64>,
}

impl KeyContact {
    /// Feed one observation of this key's contact level. `closed` is the
    /// decoded (active-low already resolved) contact state, `now` the
    /// current tick count. Returns a transition only when a press or
    /// release fully qualifies.
    pub fn observe(&mut self, closed: bool, now: u64) -> Option<Transition> {
        match self.phase {
            Phase::Released => {
                if closed {
                    self.phase = Phase::PressPending;
                    self.stable = 1;
                    self.attack_at = Some(now);
                }
                None
            }
            Phase::PressPending => {
                if !closed {
                    // Reopened inside the window: bounce, leaves no residue.
                    self.phase = Phase::Released;
                    self.stable = 0;
                    self.attack_at = None;
                    return None;
                }
                self.stable += 1;
                if self.stable < PRESS_STABLE_SAMPLES {
                    return None;
                }
                self.phase = Phase::Pressed;
                self.stable = 0;
                let attack = self.attack_at.take().unwrap_or(now);
                Some(Transition::Pressed {
                    attack_ticks: now.wrapping_sub(attack),
                })
            }
            Phase::Pressed => {
                if !closed {
                    self.phase = Phase::ReleasePending;
                    self.stable = 1;
                }
                None
            }
            Phase::ReleasePending => {
                if closed {
                    // Reclosed inside the window: still held.
                    self.phase = Phase::Pressed;
                    self.stable = 0;
                    return None;
                }
                self.stable += 1;
                if self.stable < RELEASE_STABLE_SAMPLES {
                    return None;
                }
                self.phase = Phase::Released;
                self.stable = 0;
                Some(Transition::Released)
            }
        }
    }

    /// Whether the debounced state of this key is currently "pressed".
    pub fn is_pressed(&self) -> bool {
        matches!(self.phase, Phase::Pressed | Phase::ReleasePending)
    }

    /// Return to the reset state: released, counters cleared.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
