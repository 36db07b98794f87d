//! Trace pins for a logic analyser
//!
//! Each periodic task holds its own trace pin low for as long as it is
//! delayed (see [`PeriodicTrace`]). The scheduler hooks pulse two more pins:
//! the tick pin low-then-high on every tick, the idle pin high-then-low
//! whenever the idle task is entered.

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use embedded_hal::digital::OutputPin;

use crate::{Error, Kernel, Ticks};

/// Pulse for the tick hook: low, then high
pub fn tick_pulse<P: OutputPin>(pin: &mut P) -> Result<(), P::Error> {
    pin.set_low()?;
    pin.set_high()
}

/// Pulse for the idle hook: high, then low
pub fn idle_pulse<P: OutputPin>(pin: &mut P) -> Result<(), P::Error> {
    pin.set_high()?;
    pin.set_low()
}

/// The end of every periodic task's cycle: drive the trace pin low, wait one
/// period, drive it high
pub struct PeriodicTrace<P> {
    period: Ticks,
    pin: P,
}

impl<P: OutputPin> PeriodicTrace<P> {
    pub fn new(period: Ticks, pin: P) -> PeriodicTrace<P> {
        PeriodicTrace { period, pin }
    }

    /// The period this task waits for
    pub fn period(&self) -> Ticks {
        self.period
    }

    /// Wait out the period with the trace pin held low
    ///
    /// The delay always happens, even if the pin cannot be driven, so a bad
    /// pin never stops the task from yielding.
    pub fn wait<K: Kernel + ?Sized>(&mut self, kernel: &K) -> Result<(), Error> {
        let low = self.pin.set_low();
        kernel.delay(self.period);
        let high = self.pin.set_high();
        low.and(high).map_err(Error::gpio)
    }
}


// End of File
