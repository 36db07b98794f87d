//! Run-time statistics reporting
//!
//! Every cycle the [`StatsReporter`] asks the kernel for its per-task CPU
//! time summary, captures it in a fixed-size [`StatsBuffer`], and sends the
//! buffer out of the serial port. Nothing is kept between cycles.

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::{Error, Kernel, SerialPort};

/// A text buffer of `N` bytes that silently drops whatever does not fit
pub struct StatsBuffer<const N: usize> {
    text: heapless::String<N>,
    truncated: bool,
}

impl<const N: usize> StatsBuffer<N> {
    /// An empty buffer
    pub const fn new() -> StatsBuffer<N> {
        StatsBuffer {
            text: heapless::String::new(),
            truncated: false,
        }
    }

    /// Empty the buffer
    pub fn clear(&mut self) {
        self.text.clear();
        self.truncated = false;
    }

    /// The text captured so far
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    /// Did anything get dropped since the last [`clear`](Self::clear)?
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl<const N: usize> Default for StatsBuffer<N> {
    fn default() -> Self {
        StatsBuffer::new()
    }
}

impl<const N: usize> core::fmt::Write for StatsBuffer<N> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        if self.truncated {
            return Ok(());
        }
        for c in s.chars() {
            if self.text.push(c).is_err() {
                self.truncated = true;
                break;
            }
        }
        Ok(())
    }
}

/// Dumps the kernel's run-time statistics to a serial port
pub struct StatsReporter<S, const N: usize> {
    serial: S,
    buffer: StatsBuffer<N>,
}

impl<S: SerialPort, const N: usize> StatsReporter<S, N> {
    pub fn new(serial: S) -> StatsReporter<S, N> {
        StatsReporter {
            serial,
            buffer: StatsBuffer::new(),
        }
    }

    /// Refresh the buffer from `kernel` and send it, then a newline
    ///
    /// Returns the number of bytes of statistics sent.
    pub fn cycle<K: Kernel + ?Sized>(&mut self, kernel: &K) -> Result<usize, Error> {
        self.buffer.clear();
        // the buffer never fails, so an error here is the kernel's own, and
        // whatever it managed to write is still worth sending
        if kernel.runtime_stats(&mut self.buffer).is_err() {
            warn!("run-time stats incomplete");
        }
        if self.buffer.is_truncated() {
            debug!("run-time stats truncated to {=usize} bytes", N);
        }
        let bytes = self.buffer.as_str().as_bytes();
        self.serial.put_string(bytes).map_err(Error::serial)?;
        self.serial.put_char(b'\n').map_err(Error::serial)?;
        Ok(bytes.len())
    }

    /// The statistics captured by the last cycle
    pub fn buffer(&self) -> &StatsBuffer<N> {
        &self.buffer
    }
}


// End of File
