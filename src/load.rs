//! CPU load simulation
//!
//! A [`LoadSimulator`] keeps the CPU busy for a set wall-clock time, measured
//! against a [`Clock`]. Spinning on the clock, rather than counting loop
//! iterations, keeps the duration right whatever the compiler or core clock
//! does. Time spent pre-empted by higher priority tasks counts towards it.

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::Clock;

/// Burns a fixed amount of time per cycle
#[derive(Copy, Clone, Debug)]
pub struct LoadSimulator {
    busy_micros: u32,
}

impl LoadSimulator {
    /// A simulator that stays busy for `busy_micros` microseconds
    pub const fn new(busy_micros: u32) -> LoadSimulator {
        LoadSimulator { busy_micros }
    }

    /// How long each cycle keeps the CPU busy
    pub fn busy_micros(&self) -> u32 {
        self.busy_micros
    }

    /// Spin until the busy time has passed on `clock`
    ///
    /// Returns the number of clock counts that actually passed, which is at
    /// least the busy time.
    ///
    /// The busy time is wall-clock time. While a higher priority task has the
    /// CPU the clock keeps running, so a pre-empted load burns less of its own
    /// CPU time than `busy_micros`. Load 2, sharing its periods with Load 1,
    /// only spins for about half of its 12 ms.
    pub fn cycle<C: Clock + ?Sized>(&self, clock: &C) -> u32 {
        let target = counts_for(self.busy_micros, clock.frequency());
        let start = clock.now();
        loop {
            let elapsed = clock.now().wrapping_sub(start);
            if elapsed >= target {
                return elapsed;
            }
            core::hint::spin_loop();
        }
    }
}

/// Convert microseconds to counts of a clock running at `frequency` Hz
fn counts_for(micros: u32, frequency: u32) -> u32 {
    let counts = u64::from(micros) * u64::from(frequency) / 1_000_000;
    u32::try_from(counts).unwrap_or(u32::MAX)
}


// End of File
