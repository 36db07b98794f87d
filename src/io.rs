//! Holds the [`SerialPort`] trait

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

/// A blocking, byte-oriented serial transmitter
///
/// Both calls return once the hardware (or its driver queue) has accepted the
/// data. There is no buffering contract beyond that.
pub trait SerialPort {
    /// The error a transmit can fail with
    type Error: core::fmt::Debug;

    /// Send one byte
    fn put_char(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Send a run of bytes
    fn put_string(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        for &byte in bytes {
            self.put_char(byte)?;
        }
        Ok(())
    }
}

impl<S: SerialPort + ?Sized> SerialPort for &mut S {
    type Error = S::Error;

    fn put_char(&mut self, byte: u8) -> Result<(), Self::Error> {
        S::put_char(self, byte)
    }

    fn put_string(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        S::put_string(self, bytes)
    }
}

// End of File
