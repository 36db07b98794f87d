//! Mock hardware and kernel for the unit tests

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::digital::{self, ErrorKind, InputPin, OutputPin};

use crate::{Clock, Kernel, SerialPort, Ticks};

/// Everything the mocks did, in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Low(u8),
    High(u8),
    Delay(Ticks),
}

/// A shared record of [`Action`]s
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Action>>>);

impl Journal {
    pub fn new() -> Journal {
        Journal::default()
    }

    pub fn record(&self, action: Action) {
        self.0.borrow_mut().push(action);
    }

    pub fn actions(&self) -> Vec<Action> {
        self.0.borrow().clone()
    }
}

/// An input that plays back a list of levels, then repeats the last one
pub struct MockInput {
    levels: VecDeque<bool>,
    last: bool,
    fail: bool,
}

impl MockInput {
    pub fn new(levels: &[bool]) -> MockInput {
        MockInput {
            levels: levels.iter().copied().collect(),
            last: false,
            fail: false,
        }
    }

    /// An input whose every read fails
    pub fn failing() -> MockInput {
        MockInput {
            levels: VecDeque::new(),
            last: false,
            fail: true,
        }
    }
}

impl digital::ErrorType for MockInput {
    type Error = ErrorKind;
}

impl InputPin for MockInput {
    fn is_high(&mut self) -> Result<bool, ErrorKind> {
        if self.fail {
            return Err(ErrorKind::Other);
        }
        if let Some(level) = self.levels.pop_front() {
            self.last = level;
        }
        Ok(self.last)
    }

    fn is_low(&mut self) -> Result<bool, ErrorKind> {
        self.is_high().map(|high| !high)
    }
}

/// An output that writes its transitions into a [`Journal`]
pub struct MockOutput {
    pin: u8,
    journal: Journal,
    fail: bool,
}

impl MockOutput {
    pub fn new(pin: u8, journal: &Journal) -> MockOutput {
        MockOutput {
            pin,
            journal: journal.clone(),
            fail: false,
        }
    }

    /// An output whose every write fails (and is not recorded)
    pub fn failing(pin: u8, journal: &Journal) -> MockOutput {
        MockOutput {
            fail: true,
            ..MockOutput::new(pin, journal)
        }
    }
}

impl digital::ErrorType for MockOutput {
    type Error = ErrorKind;
}

impl OutputPin for MockOutput {
    fn set_low(&mut self) -> Result<(), ErrorKind> {
        if self.fail {
            return Err(ErrorKind::Other);
        }
        self.journal.record(Action::Low(self.pin));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), ErrorKind> {
        if self.fail {
            return Err(ErrorKind::Other);
        }
        self.journal.record(Action::High(self.pin));
        Ok(())
    }
}

/// A serial port that keeps everything it was sent
#[derive(Default)]
pub struct MockSerial {
    pub sent: Vec<u8>,
    /// Refuse bytes once this many have been sent
    pub limit: Option<usize>,
}

impl MockSerial {
    pub fn new() -> MockSerial {
        MockSerial::default()
    }

    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.sent).unwrap()
    }
}

impl SerialPort for MockSerial {
    type Error = &'static str;

    fn put_char(&mut self, byte: u8) -> Result<(), Self::Error> {
        if self.limit.is_some_and(|limit| self.sent.len() >= limit) {
            return Err("tx full");
        }
        self.sent.push(byte);
        Ok(())
    }
}

/// A kernel whose delays return at once, and whose stats are canned text
pub struct MockKernel {
    journal: Journal,
    ticks: Cell<Ticks>,
    stats: String,
}

impl MockKernel {
    pub fn new(journal: &Journal) -> MockKernel {
        MockKernel {
            journal: journal.clone(),
            ticks: Cell::new(0),
            stats: String::new(),
        }
    }

    pub fn with_stats(journal: &Journal, stats: &str) -> MockKernel {
        MockKernel {
            stats: stats.to_owned(),
            ..MockKernel::new(journal)
        }
    }
}

impl Kernel for MockKernel {
    fn now(&self) -> Ticks {
        self.ticks.get()
    }

    fn delay(&self, ticks: Ticks) {
        self.journal.record(Action::Delay(ticks));
        self.ticks.set(self.ticks.get().wrapping_add(ticks));
    }

    fn runtime_stats(&self, out: &mut dyn core::fmt::Write) -> core::fmt::Result {
        out.write_str(&self.stats)
    }
}

/// A clock that moves on by a fixed step every time it is read
pub struct StepClock {
    now: Cell<u32>,
    step: u32,
    frequency: u32,
    pub reads: Cell<u32>,
}

impl StepClock {
    pub fn new(start: u32, step: u32, frequency: u32) -> StepClock {
        StepClock {
            now: Cell::new(start),
            step,
            frequency,
            reads: Cell::new(0),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> u32 {
        let now = self.now.get();
        self.now.set(now.wrapping_add(self.step));
        self.reads.set(self.reads.get() + 1);
        now
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }
}

/// The host's monotonic clock, counting microseconds
pub struct StdClock(std::time::Instant);

impl StdClock {
    pub fn new() -> StdClock {
        StdClock(std::time::Instant::now())
    }
}

impl Clock for StdClock {
    fn now(&self) -> u32 {
        self.0.elapsed().as_micros() as u32
    }

    fn frequency(&self) -> u32 {
        1_000_000
    }
}

// End of File
