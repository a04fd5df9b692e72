//! Interrupt controller: per-source enable gating and sticky pending flags.

use bitmask_enum::bitmask;

/// Interrupt sources of the scanner.
#[bitmask(u8)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Irq {
    /// The event queue went from empty to non-empty.
    EventReady,
    /// A completed event was discarded because the queue was full.
    Overflow,
}

/// Pending/enable flag pair behind the IRQ_EN and IRQ_STATUS registers.
///
/// A source only latches pending while its enable bit is set; once latched
/// it persists, independent of later queue state, until software clears it
/// with a write-1-to-clear or the core is reset.
#[derive(Clone, Copy, Debug)]
pub struct IrqController {
    enable: Irq,
    pending: Irq,
}

impl Default for IrqController {
    fn default() -> Self {
        Self::new()
    }
}

impl IrqController {
    /// Constructs a controller with all sources disabled and idle.
    pub fn new() -> Self {
        Self {
            enable: Irq::none(),
            pending: Irq::none(),
        }
    }

    /// Latch `source` pending, provided it is enabled.
    pub fn raise(&mut self, source: Irq) {
        self.pending |= source & self.enable;
    }

    /// Replace the enable mask. Callers re-raise any condition that
    /// already holds so a late enable cannot miss it.
    pub fn set_enable(&mut self, mask: Irq) {
        self.enable = mask;
    }

    /// Write-1-to-clear: drop the pending bits set in `mask`.
    pub fn acknowledge(&mut self, mask: Irq) {
        self.pending &= !mask;
    }

    /// The current enable mask.
    pub fn enabled(&self) -> Irq {
        self.enable
    }

    /// The currently pending sources.
    pub fn pending(&self) -> Irq {
        self.pending
    }

    /// Level of the outgoing interrupt request line.
    pub fn asserted(&self) -> bool {
        self.pending != Irq::none()
    }

    /// Return to the reset state: nothing enabled, nothing pending.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_sources_never_latch() {
        let mut irq = IrqController::new();
        irq.raise(Irq::EventReady);
        assert_eq!(Irq::none(), irq.pending());
        assert!(!irq.asserted());
    }

    #[test]
    fn enabled_sources_latch_and_assert_the_line() {
        let mut irq = IrqController::new();
        irq.set_enable(Irq::EventReady);
        irq.raise(Irq::EventReady);
        assert_eq!(Irq::EventReady, irq.pending());
        assert!(irq.asserted());
    }

    #[test]
    fn acknowledge_clears_only_the_written_bits() {
        let mut irq = IrqController::new();
        irq.set_enable(Irq::EventReady | Irq::Overflow);
        irq.raise(Irq::EventReady | Irq::Overflow);

        irq.acknowledge(Irq::Overflow);
        assert_eq!(Irq::EventReady, irq.pending());
        assert!(irq.asserted(), "Unacknowledged sources keep the line up");

        irq.acknowledge(Irq::EventReady);
        assert!(!irq.asserted());
    }

    #[test]
    fn pending_survives_disabling_the_source() {
        let mut irq = IrqController::new();
        irq.set_enable(Irq::EventReady);
        irq.raise(Irq::EventReady);
        irq.set_enable(Irq::none());
        assert_eq!(
            Irq::EventReady,
            irq.pending(),
            "Latched flags outlive the enable mask"
        );
    }

    #[test]
    fn masks_round_trip_through_register_bytes() {
        assert_eq!(1, Irq::EventReady.bits());
        assert_eq!(2, Irq::Overflow.bits());
        assert_eq!(Irq::Overflow, Irq::from(2));
        assert_eq!(Irq::EventReady | Irq::Overflow, Irq::from(3));
    }
}
