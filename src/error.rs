//! Holds the [`Error`] type

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use embedded_hal::digital;

/// Something went wrong talking to the hardware during a task cycle
///
/// Tasks never stop because of one of these. The task loop logs it and
/// carries on with the next cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A GPIO read or write failed
    Gpio(digital::ErrorKind),
    /// The serial port refused a byte
    Serial,
}

impl Error {
    /// Convert any `embedded-hal` pin error
    pub(crate) fn gpio<E: digital::Error>(error: E) -> Error {
        Error::Gpio(error.kind())
    }

    /// Convert any [`SerialPort`](crate::SerialPort) error
    pub(crate) fn serial<E: core::fmt::Debug>(_error: E) -> Error {
        Error::Serial
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Gpio(kind) => write!(f, "gpio error: {kind:?}"),
            Error::Serial => write!(f, "serial port error"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Error::Gpio(kind) => defmt::write!(fmt, "gpio error: {}", defmt::Debug2Format(kind)),
            Error::Serial => defmt::write!(fmt, "serial port error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpio_errors_keep_their_kind() {
        let error = Error::gpio(digital::ErrorKind::Other);
        assert_eq!(error, Error::Gpio(digital::ErrorKind::Other));
        assert_eq!(format!("{error}"), "gpio error: Other");
    }

    #[test]
    fn serial_errors_drop_the_detail() {
        assert_eq!(Error::serial("overrun"), Error::Serial);
        assert_eq!(format!("{}", Error::Serial), "serial port error");
    }
}

// End of File
