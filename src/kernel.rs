//! The interfaces the application tasks need from the platform

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

/// A count of scheduler ticks
pub type Ticks = u32;

/// The services a periodic task needs from the kernel
///
/// Implemented by [`Scheduler`](crate::Scheduler) on the target, and by mocks
/// in the tests.
pub trait Kernel {
    /// Get the current tick count
    fn now(&self) -> Ticks;

    /// Suspend the calling task for at least `ticks` ticks
    fn delay(&self, ticks: Ticks);

    /// Write a human-readable summary of the CPU time used by each task
    ///
    /// The output is whatever fits in `out`; writers that run out of room
    /// may stop early.
    fn runtime_stats(&self, out: &mut dyn core::fmt::Write) -> core::fmt::Result;
}

/// A free-running counter that wraps at `u32::MAX`
pub trait Clock {
    /// Read the counter
    fn now(&self) -> u32;

    /// How many counts make up one second
    fn frequency(&self) -> u32;
}

// End of File
