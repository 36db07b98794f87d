//! The consumer side of the event record
//!
//! The [`PeriodicTransmitter`] keeps the record's length up to date, so the
//! [`EventTransmitter`] can send the text without scanning it again.

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::event::{EventChannel, EventText};
use crate::{Error, SerialPort};

/// Count the bytes of `text` up to (not including) its terminator
///
/// Saturates at `u16::MAX`.
pub fn scan_length(text: EventText) -> u16 {
    let count = text
        .to_bytes_with_nul()
        .iter()
        .take_while(|&&byte| byte != 0)
        .count();
    u16::try_from(count).unwrap_or(u16::MAX)
}

/// Recomputes the event length on its own schedule
#[derive(Debug, Default)]
pub struct PeriodicTransmitter;

impl PeriodicTransmitter {
    pub const fn new() -> PeriodicTransmitter {
        PeriodicTransmitter
    }

    /// Measure the current text and store its length
    ///
    /// Returns `None`, touching nothing, if no text has been published.
    pub fn cycle<C: EventChannel + ?Sized>(&mut self, channel: &C) -> Option<u16> {
        channel.refresh_length(scan_length)
    }
}

/// Sends the current event text out of a serial port
pub struct EventTransmitter<S> {
    serial: S,
}

impl<S: SerialPort> EventTransmitter<S> {
    pub fn new(serial: S) -> EventTransmitter<S> {
        EventTransmitter { serial }
    }

    /// Send the text, cut to the stored length, and a newline
    ///
    /// Sends nothing while the length is zero. Does not check that the text
    /// and length belong to the same event. Returns the number of text bytes
    /// sent.
    pub fn cycle<C: EventChannel + ?Sized>(&mut self, channel: &C) -> Result<usize, Error> {
        let event = channel.snapshot();
        if event.length == 0 {
            return Ok(0);
        }
        let bytes = event.bytes();
        self.serial.put_string(bytes).map_err(Error::serial)?;
        self.serial.put_char(b'\n').map_err(Error::serial)?;
        Ok(bytes.len())
    }

    /// Get the serial port back
    pub fn into_inner(self) -> S {
        self.serial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{LockedEventRecord, NO_EVENT, RacyEventRecord};
    use crate::testutil::MockSerial;

    #[test]
    fn scan_stops_at_the_terminator() {
        assert_eq!(scan_length(c"button 2 falling edge"), 21);
        assert_eq!(scan_length(NO_EVENT), 8);
        assert_eq!(scan_length(c""), 0);
    }

    #[test]
    fn periodic_transmitter_measures_the_injected_text() {
        let record = RacyEventRecord::new();
        record.publish(c"button 1 falling edge");
        assert_eq!(PeriodicTransmitter::new().cycle(&record), Some(21));
        assert_eq!(record.length(), 21);
    }

    #[test]
    fn periodic_transmitter_ignores_unset_text() {
        let record = RacyEventRecord::new();
        let mut transmitter = PeriodicTransmitter::new();
        for _ in 0..3 {
            assert_eq!(transmitter.cycle(&record), None);
        }
        assert_eq!(record.length(), 0);
    }

    #[test]
    fn clean_start_sends_nothing() {
        let record = RacyEventRecord::new();
        let mut uart = EventTransmitter::new(MockSerial::new());
        assert_eq!(uart.cycle(&record), Ok(0));
        // published but not yet measured: still nothing
        record.publish(c"button 1 rising edge");
        assert_eq!(uart.cycle(&record), Ok(0));
        assert!(uart.into_inner().sent.is_empty());
    }

    #[test]
    fn sends_measured_text_with_newline() {
        let record = RacyEventRecord::new();
        let mut serial = MockSerial::new();
        let mut uart = EventTransmitter::new(&mut serial);
        record.publish(c"button 1 rising edge");
        PeriodicTransmitter::new().cycle(&record);
        assert_eq!(uart.cycle(&record), Ok(20));
        record.publish(NO_EVENT);
        PeriodicTransmitter::new().cycle(&record);
        assert_eq!(uart.cycle(&record), Ok(8));
        assert_eq!(serial.text(), "button 1 rising edge\nno event\n");
    }

    #[test]
    fn sends_whatever_pair_it_sees() {
        let record = RacyEventRecord::new();
        let mut serial = MockSerial::new();
        record.publish(NO_EVENT);
        PeriodicTransmitter::new().cycle(&record);
        record.publish(c"button 2 rising edge");
        EventTransmitter::new(&mut serial).cycle(&record).unwrap();
        assert_eq!(serial.text(), "button 2\n");
    }

    #[test]
    fn hardened_record_sends_straight_away() {
        let record = LockedEventRecord::new();
        let mut serial = MockSerial::new();
        record.publish(c"button 2 rising edge");
        EventTransmitter::new(&mut serial).cycle(&record).unwrap();
        assert_eq!(serial.text(), "button 2 rising edge\n");
    }

    #[test]
    fn serial_failure_is_reported() {
        let record = RacyEventRecord::new();
        record.publish(NO_EVENT);
        PeriodicTransmitter::new().cycle(&record);
        let serial = MockSerial {
            limit: Some(3),
            ..MockSerial::default()
        };
        let mut uart = EventTransmitter::new(serial);
        assert_eq!(uart.cycle(&record), Err(Error::Serial));
        assert_eq!(uart.into_inner().sent, b"no ");
    }
}

// End of File
