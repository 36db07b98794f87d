//! The bodies of the six periodic tasks
//!
//! Each task is a [`Periodic`] loop: do one cycle of work, then wait out the
//! period with the trace pin held low. Errors from a cycle are logged and the
//! loop carries on. The `*_task` functions never return; the firmware calls
//! them from the task entry functions with the real hardware.

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::TaskConfig;
use crate::edge::{Edge, EdgeLabels, EdgeMonitor};
use crate::event::EventChannel;
use crate::load::LoadSimulator;
use crate::stats::StatsReporter;
use crate::trace::PeriodicTrace;
use crate::transmit::{EventTransmitter, PeriodicTransmitter};
use crate::{Clock, Error, Kernel, SerialPort};

/// One periodic task: a name, and the trace pin it waits behind
pub struct Periodic<P> {
    name: &'static str,
    trace: PeriodicTrace<P>,
}

impl<P: OutputPin> Periodic<P> {
    pub fn new(config: &TaskConfig, trace_pin: P) -> Periodic<P> {
        Periodic {
            name: config.name,
            trace: PeriodicTrace::new(config.period, trace_pin),
        }
    }

    /// Run `work` once, then wait one period
    ///
    /// The wait happens whether or not `work` failed. The first error is
    /// returned.
    pub fn step<K, F>(&mut self, kernel: &K, work: F) -> Result<(), Error>
    where
        K: Kernel + ?Sized,
        F: FnOnce() -> Result<(), Error>,
    {
        let worked = work();
        let waited = self.trace.wait(kernel);
        worked.and(waited)
    }

    /// Call [`step`](Self::step) forever, logging any errors
    pub fn run<K, F>(mut self, kernel: &K, mut work: F) -> !
    where
        K: Kernel + ?Sized,
        F: FnMut() -> Result<(), Error>,
    {
        info!(
            "{=str} running every {=u32} ticks",
            self.name,
            self.trace.period()
        );
        loop {
            if let Err(error) = self.step(kernel, &mut work) {
                warn!("{=str}: {}", self.name, error);
            }
        }
    }
}

/// Poll an input and publish its edges into `channel`
pub fn edge_monitor_task<K, C, I, P>(
    kernel: &K,
    channel: &C,
    config: &TaskConfig,
    labels: EdgeLabels,
    input: I,
    trace_pin: P,
) -> !
where
    K: Kernel + ?Sized,
    C: EventChannel + ?Sized,
    I: InputPin,
    P: OutputPin,
{
    let mut monitor = EdgeMonitor::new(input, labels);
    Periodic::new(config, trace_pin).run(kernel, || {
        let edge = monitor.cycle(channel)?;
        if edge != Edge::Steady {
            debug!("{=str} saw {}", config.name, edge);
        }
        Ok(())
    })
}

/// Keep the event length in `channel` up to date
pub fn periodic_transmitter_task<K, C, P>(kernel: &K, channel: &C, config: &TaskConfig, trace_pin: P) -> !
where
    K: Kernel + ?Sized,
    C: EventChannel + ?Sized,
    P: OutputPin,
{
    let mut transmitter = PeriodicTransmitter::new();
    Periodic::new(config, trace_pin).run(kernel, || {
        transmitter.cycle(channel);
        Ok(())
    })
}

/// Send the current event out of `serial`
pub fn event_transmitter_task<K, C, S, P>(
    kernel: &K,
    channel: &C,
    config: &TaskConfig,
    serial: S,
    trace_pin: P,
) -> !
where
    K: Kernel + ?Sized,
    C: EventChannel + ?Sized,
    S: SerialPort,
    P: OutputPin,
{
    let mut transmitter = EventTransmitter::new(serial);
    Periodic::new(config, trace_pin).run(kernel, || transmitter.cycle(channel).map(|_| ()))
}

/// Keep the CPU busy for a while every period
pub fn load_task<K, T, P>(kernel: &K, clock: &T, config: &TaskConfig, load: LoadSimulator, trace_pin: P) -> !
where
    K: Kernel + ?Sized,
    T: Clock + ?Sized,
    P: OutputPin,
{
    Periodic::new(config, trace_pin).run(kernel, || {
        load.cycle(clock);
        Ok(())
    })
}

/// Keep the CPU busy for a while, then dump the run-time statistics to
/// `serial`, every period
pub fn load_with_stats_task<K, T, S, P, const N: usize>(
    kernel: &K,
    clock: &T,
    config: &TaskConfig,
    load: LoadSimulator,
    serial: S,
    trace_pin: P,
) -> !
where
    K: Kernel + ?Sized,
    T: Clock + ?Sized,
    S: SerialPort,
    P: OutputPin,
{
    let mut reporter: StatsReporter<S, N> = StatsReporter::new(serial);
    Periodic::new(config, trace_pin).run(kernel, || {
        load.cycle(clock);
        reporter.cycle(kernel).map(|_| ())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BUTTON_1_LABELS, BUTTON_1_MONITOR, LOAD_2_SIMULATION, UART_TRANSMITTER};
    use crate::event::RacyEventRecord;
    use crate::testutil::{Action, Journal, MockInput, MockKernel, MockOutput, MockSerial, StepClock};

    #[test]
    fn step_works_then_waits() {
        let journal = Journal::new();
        let kernel = MockKernel::new(&journal);
        let mut task = Periodic::new(&BUTTON_1_MONITOR, MockOutput::new(8, &journal));
        let mut cycles = 0;
        for _ in 0..3 {
            task.step(&kernel, || {
                cycles += 1;
                Ok(())
            })
            .unwrap();
        }
        assert_eq!(cycles, 3);
        assert_eq!(kernel.now(), 30);
        assert_eq!(journal.actions().len(), 9);
    }

    #[test]
    fn failed_work_still_waits() {
        let journal = Journal::new();
        let kernel = MockKernel::new(&journal);
        let mut task = Periodic::new(&UART_TRANSMITTER, MockOutput::new(11, &journal));
        assert_eq!(task.step(&kernel, || Err(Error::Serial)), Err(Error::Serial));
        assert_eq!(
            journal.actions(),
            [Action::Low(11), Action::Delay(20), Action::High(11)]
        );
    }

    #[test]
    fn pipeline_from_pin_to_uart() {
        let journal = Journal::new();
        let kernel = MockKernel::new(&journal);
        let record = RacyEventRecord::new();
        let mut monitor = EdgeMonitor::new(MockInput::new(&[false, true, true, false]), BUTTON_1_LABELS);
        let mut length = PeriodicTransmitter::new();
        let mut serial = MockSerial::new();
        let mut uart = EventTransmitter::new(&mut serial);
        let mut task = Periodic::new(&BUTTON_1_MONITOR, MockOutput::new(8, &journal));

        for _ in 0..4 {
            task.step(&kernel, || monitor.cycle(&record).map(|_| ())).unwrap();
            length.cycle(&record);
            uart.cycle(&record).unwrap();
        }
        assert_eq!(
            serial.text(),
            "no event\nbutton 1 rising edge\nno event\nbutton 1 falling edge\n"
        );
    }

    #[test]
    fn heavy_load_reports_stats_after_spinning() {
        let journal = Journal::new();
        let kernel = MockKernel::with_stats(&journal, "Load_2_Simulation\t\t12\t\t60%\r\n");
        let clock = StepClock::new(0, 4_000, 1_000_000);
        let load = LoadSimulator::new(12_000);
        let mut serial = MockSerial::new();
        let mut reporter: StatsReporter<_, 190> = StatsReporter::new(&mut serial);
        let mut task = Periodic::new(&LOAD_2_SIMULATION, MockOutput::new(13, &journal));

        task.step(&kernel, || {
            load.cycle(&clock);
            reporter.cycle(&kernel).map(|_| ())
        })
        .unwrap();

        assert_eq!(clock.reads.get(), 4);
        assert_eq!(serial.text(), "Load_2_Simulation\t\t12\t\t60%\r\n\n");
        assert_eq!(
            journal.actions(),
            [Action::Low(13), Action::Delay(100), Action::High(13)]
        );
    }
}

// End of File
