//! Compile-time configuration of the task set
//!
//! Periods are in scheduler ticks. Priorities are rate-monotonic: the
//! shorter the period, the higher the priority.

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::edge::EdgeLabels;
use crate::{Priority, Ticks};

/// Scheduler tick rate
pub const TICK_RATE_HZ: u32 = 1_000;

/// Bytes of stack for each task
pub const STACK_SIZE: usize = 1024;

/// Capacity of the run-time statistics buffer
pub const STATS_BUFFER_LEN: usize = 190;

/// Serial port baud rate
pub const SERIAL_BAUD: u32 = 115_200;

/// Input watched by the first edge monitor
pub const BUTTON_1_INPUT_PIN: u8 = 0;

/// Input watched by the second edge monitor
pub const BUTTON_2_INPUT_PIN: u8 = 1;

/// Pulsed by the tick hook
pub const TICK_TRACE_PIN: u8 = 5;

/// Pulsed by the idle hook
pub const IDLE_TRACE_PIN: u8 = 7;

/// How long the light load keeps the CPU busy each cycle
pub const LOAD_1_BUSY_MICROS: u32 = 5_000;

/// How long the heavy load keeps the CPU busy each cycle
pub const LOAD_2_BUSY_MICROS: u32 = 12_000;

/// What the first edge monitor publishes
pub const BUTTON_1_LABELS: EdgeLabels =
    EdgeLabels::new(c"button 1 rising edge", c"button 1 falling edge");

/// What the second edge monitor publishes
pub const BUTTON_2_LABELS: EdgeLabels =
    EdgeLabels::new(c"button 2 rising edge", c"button 2 falling edge");

/// The fixed parameters of one periodic task
#[derive(Copy, Clone, Debug)]
pub struct TaskConfig {
    /// Shown in logs and in the run-time statistics
    pub name: &'static str,
    /// Ticks to wait at the end of each cycle
    pub period: Ticks,
    pub priority: Priority,
    /// Held low while the task waits
    pub trace_pin: u8,
}

impl TaskConfig {
    const fn new(name: &'static str, period: Ticks, priority: u8, trace_pin: u8) -> TaskConfig {
        assert!(period > 0, "a periodic task needs a period");
        assert!(priority > 0, "priority 0 belongs to the idle task");
        TaskConfig {
            name,
            period,
            priority: Priority::new(priority),
            trace_pin,
        }
    }
}

pub const BUTTON_1_MONITOR: TaskConfig = TaskConfig::new("Button_1_Monitor", 10, 4, 8);

pub const BUTTON_2_MONITOR: TaskConfig = TaskConfig::new("Button_2_Monitor", 50, 2, 9);

pub const PERIODIC_TRANSMITTER: TaskConfig = TaskConfig::new("Periodic_Transmitter", 100, 1, 10);

pub const UART_TRANSMITTER: TaskConfig = TaskConfig::new("Uart_Transmitter", 20, 3, 11);

pub const LOAD_1_SIMULATION: TaskConfig = TaskConfig::new("Load_1_Simulation", 10, 4, 12);

pub const LOAD_2_SIMULATION: TaskConfig = TaskConfig::new("Load_2_Simulation", 100, 1, 13);

/// Every periodic task, in creation order
pub const TASK_SET: [TaskConfig; 6] = [
    BUTTON_1_MONITOR,
    BUTTON_2_MONITOR,
    PERIODIC_TRANSMITTER,
    UART_TRANSMITTER,
    LOAD_1_SIMULATION,
    LOAD_2_SIMULATION,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priorities_are_rate_monotonic() {
        for a in &TASK_SET {
            for b in &TASK_SET {
                if a.period < b.period {
                    assert!(a.priority > b.priority, "{} vs {}", a.name, b.name);
                }
                if a.period == b.period {
                    assert_eq!(a.priority, b.priority, "{} vs {}", a.name, b.name);
                }
            }
        }
    }

    #[test]
    fn every_pin_has_one_job() {
        let mut pins = vec![BUTTON_1_INPUT_PIN, BUTTON_2_INPUT_PIN, TICK_TRACE_PIN, IDLE_TRACE_PIN];
        pins.extend(TASK_SET.iter().map(|task| task.trace_pin));
        let count = pins.len();
        pins.sort_unstable();
        pins.dedup();
        assert_eq!(pins.len(), count);
    }

    #[test]
    fn names_are_unique() {
        for (i, a) in TASK_SET.iter().enumerate() {
            for b in &TASK_SET[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn loads_fit_in_their_periods() {
        let tick_micros = 1_000_000 / TICK_RATE_HZ;
        assert!(LOAD_1_BUSY_MICROS < LOAD_1_SIMULATION.period * tick_micros);
        assert!(LOAD_2_BUSY_MICROS < LOAD_2_SIMULATION.period * tick_micros);
    }
}

// End of File
