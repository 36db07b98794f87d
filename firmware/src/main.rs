//! The edge-relay task set, on an MPS2-AN385
//!
//! Two button monitors, a length updater, a UART sender and two CPU loads,
//! plus the idle task. Every task pulses its own GPIO pin, and the tick and
//! idle hooks pulse two more.

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

#![no_std]
#![no_main]

use edge_relay::config::{self, STACK_SIZE, STATS_BUFFER_LEN};
use edge_relay::event::RacyEventRecord;
use edge_relay::load::LoadSimulator;
use edge_relay::{Hooks, Scheduler, Stack, Task, app, trace};

use edge_relay_firmware::board::{self, Input, Output, TickClock, Uart0};

/// The single event slot the monitors and transmitters share
static EVENTS: RacyEventRecord = RacyEventRecord::new();

static SCHEDULER: Scheduler = Scheduler::new(
    {
        static TASK_LIST: [Task; 7] = [
            Task::idle({
                static STACK: Stack<STACK_SIZE> = Stack::new();
                &STACK
            }),
            Task::new(
                config::BUTTON_1_MONITOR.name,
                config::BUTTON_1_MONITOR.priority,
                button_1_monitor,
                {
                    static STACK: Stack<STACK_SIZE> = Stack::new();
                    &STACK
                },
            ),
            Task::new(
                config::BUTTON_2_MONITOR.name,
                config::BUTTON_2_MONITOR.priority,
                button_2_monitor,
                {
                    static STACK: Stack<STACK_SIZE> = Stack::new();
                    &STACK
                },
            ),
            Task::new(
                config::PERIODIC_TRANSMITTER.name,
                config::PERIODIC_TRANSMITTER.priority,
                periodic_transmitter,
                {
                    static STACK: Stack<STACK_SIZE> = Stack::new();
                    &STACK
                },
            ),
            Task::new(
                config::UART_TRANSMITTER.name,
                config::UART_TRANSMITTER.priority,
                uart_transmitter,
                {
                    static STACK: Stack<STACK_SIZE> = Stack::new();
                    &STACK
                },
            ),
            Task::new(
                config::LOAD_1_SIMULATION.name,
                config::LOAD_1_SIMULATION.priority,
                load_1_simulation,
                {
                    static STACK: Stack<STACK_SIZE> = Stack::new();
                    &STACK
                },
            ),
            Task::new(
                config::LOAD_2_SIMULATION.name,
                config::LOAD_2_SIMULATION.priority,
                load_2_simulation,
                {
                    static STACK: Stack<STACK_SIZE> = Stack::new();
                    &STACK
                },
            ),
        ];
        &TASK_LIST
    },
    Hooks {
        tick: tick_hook,
        idle: idle_hook,
    },
);

/// Every pin we drive
const OUTPUT_PINS: u16 = board::pin_mask(&[
    config::TICK_TRACE_PIN,
    config::IDLE_TRACE_PIN,
    config::BUTTON_1_MONITOR.trace_pin,
    config::BUTTON_2_MONITOR.trace_pin,
    config::PERIODIC_TRANSMITTER.trace_pin,
    config::UART_TRANSMITTER.trace_pin,
    config::LOAD_1_SIMULATION.trace_pin,
    config::LOAD_2_SIMULATION.trace_pin,
]);

#[cortex_m_rt::entry]
fn main() -> ! {
    let cp = cortex_m::Peripherals::take().unwrap();
    board::init(OUTPUT_PINS, config::SERIAL_BAUD);
    defmt::info!("Hello!");
    SCHEDULER.start(cp.SYST, board::CYCLES_PER_TICK);
}

fn tick_hook() {
    let mut pin = Output::new(config::TICK_TRACE_PIN);
    let Ok(()) = trace::tick_pulse(&mut pin);
}

fn idle_hook() {
    let mut pin = Output::new(config::IDLE_TRACE_PIN);
    let Ok(()) = trace::idle_pulse(&mut pin);
}

fn button_1_monitor() -> ! {
    let task = &config::BUTTON_1_MONITOR;
    app::edge_monitor_task(
        &SCHEDULER,
        &EVENTS,
        task,
        config::BUTTON_1_LABELS,
        Input::new(config::BUTTON_1_INPUT_PIN),
        Output::new(task.trace_pin),
    )
}

fn button_2_monitor() -> ! {
    let task = &config::BUTTON_2_MONITOR;
    app::edge_monitor_task(
        &SCHEDULER,
        &EVENTS,
        task,
        config::BUTTON_2_LABELS,
        Input::new(config::BUTTON_2_INPUT_PIN),
        Output::new(task.trace_pin),
    )
}

fn periodic_transmitter() -> ! {
    let task = &config::PERIODIC_TRANSMITTER;
    app::periodic_transmitter_task(&SCHEDULER, &EVENTS, task, Output::new(task.trace_pin))
}

fn uart_transmitter() -> ! {
    let task = &config::UART_TRANSMITTER;
    app::event_transmitter_task(&SCHEDULER, &EVENTS, task, Uart0, Output::new(task.trace_pin))
}

fn load_1_simulation() -> ! {
    let task = &config::LOAD_1_SIMULATION;
    app::load_task(
        &SCHEDULER,
        &TickClock,
        task,
        LoadSimulator::new(config::LOAD_1_BUSY_MICROS),
        Output::new(task.trace_pin),
    )
}

fn load_2_simulation() -> ! {
    let task = &config::LOAD_2_SIMULATION;
    app::load_with_stats_task::<_, _, _, _, STATS_BUFFER_LEN>(
        &SCHEDULER,
        &TickClock,
        task,
        LoadSimulator::new(config::LOAD_2_BUSY_MICROS),
        Uart0,
        Output::new(task.trace_pin),
    )
}

// End of File
