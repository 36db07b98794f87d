//! # edge-relay
//!
//! A small set of periodic tasks, and the fixed-priority pre-emptive
//! scheduler they run on.
//!
//! Two edge monitors poll an input pin each and publish the latest edge as
//! text into a single-slot [`event`] record. A periodic transmitter keeps the
//! record's length up to date, and a UART task sends the text out. Two load
//! simulators burn a fixed amount of CPU time, and the heavier of the two
//! also dumps per-task run-time statistics. Tick and idle hooks pulse trace
//! pins so a logic analyser can line up task activity with the scheduler.
//!
//! Everything above the [`Scheduler`] is written against the [`Kernel`],
//! [`Clock`], `embedded-hal` pin and [`SerialPort`] traits, so it runs on the
//! host under `cargo test`.

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;

pub mod app;
pub mod config;
pub mod edge;
pub mod event;
pub mod load;
pub mod stats;
pub mod trace;
pub mod transmit;

mod asm;
mod error;
mod io;
mod kernel;
mod port;
mod scheduler;
mod stack;
mod task;

#[cfg(test)]
mod testutil;

pub use error::Error;
pub use io::SerialPort;
pub use kernel::{Clock, Kernel, Ticks};
pub use scheduler::{Hooks, Scheduler, TaskId};
pub use stack::Stack;
use stack::StackPusher;
pub use task::{Priority, Task, TaskEntryFn};

/// Delay the calling task for at least the given number of ticks
///
/// Does nothing if the scheduler has not been started.
pub fn delay(ticks: Ticks) {
    if let Some(scheduler) = Scheduler::get_scheduler() {
        scheduler.delay(ticks);
    }
}

/// Get the current time in ticks
///
/// Returns `0xFFFF_FFFF` if the scheduler has not been started.
pub fn now() -> Ticks {
    match Scheduler::get_scheduler() {
        Some(scheduler) => scheduler.now(),
        None => 0xFFFF_FFFF,
    }
}

/// Get the ID of the task that is currently running
pub fn task_id() -> TaskId {
    match Scheduler::get_scheduler() {
        Some(scheduler) => scheduler.current_task_id(),
        None => TaskId::invalid(),
    }
}

// End of File
