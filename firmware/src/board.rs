//! Drivers for the parts of the Arm MPS2-AN385 the firmware uses
//!
//! * CMSDK GPIO0, for the button inputs and the trace outputs
//! * CMSDK UART0, for the serial output
//! * a 25 MHz monotonic clock made from the scheduler tick and SysTick

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use core::convert::Infallible;
use core::ptr::{read_volatile, write_volatile};

use edge_relay::{Clock, SerialPort};
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// Core clock of the AN385 FPGA image
pub const SYSTEM_CLOCK_HZ: u32 = 25_000_000;

/// Core clock cycles per scheduler tick
pub const CYCLES_PER_TICK: u32 = SYSTEM_CLOCK_HZ / edge_relay::config::TICK_RATE_HZ;

/// Base address of the CMSDK AHB GPIO block 0
const GPIO0_BASE: usize = 0x4001_0000;
const GPIO_DATA: usize = 0x000;
const GPIO_OUTENSET: usize = 0x010;
const GPIO_OUTENCLR: usize = 0x014;
/// Masked access to bits 7:0; the word index is the mask
const GPIO_LB_MASKED: usize = 0x400;
/// Masked access to bits 15:8; the word index is the mask, shifted down
const GPIO_UB_MASKED: usize = 0x800;

/// Base address of the CMSDK APB UART 0
const UART0_BASE: usize = 0x4000_4000;
const UART_DATA: usize = 0x00;
const UART_STATE: usize = 0x04;
const UART_CTRL: usize = 0x08;
const UART_BAUDDIV: usize = 0x10;
const UART_STATE_TX_FULL: u32 = 1 << 0;
const UART_CTRL_TX_ENABLE: u32 = 1 << 0;

fn reg(base: usize, offset: usize) -> *mut u32 {
    (base + offset) as *mut u32
}

/// Set up GPIO0 and UART0
///
/// `outputs` is a bit mask of the GPIO pins to drive; every other pin is an
/// input. Call once, before the scheduler starts.
pub fn init(outputs: u16, baud: u32) {
    // SAFETY: these are the documented CMSDK registers, and nothing else is
    // running yet
    unsafe {
        write_volatile(reg(GPIO0_BASE, GPIO_OUTENCLR), u32::from(!outputs));
        write_volatile(reg(GPIO0_BASE, GPIO_OUTENSET), u32::from(outputs));
        write_volatile(reg(UART0_BASE, UART_BAUDDIV), SYSTEM_CLOCK_HZ / baud);
        write_volatile(reg(UART0_BASE, UART_CTRL), UART_CTRL_TX_ENABLE);
    }
    defmt::info!("GPIO outputs {=u16:#06x}, UART0 at {=u32} baud", outputs, baud);
}

/// Bit mask for a list of GPIO pins
pub const fn pin_mask(pins: &[u8]) -> u16 {
    let mut mask = 0;
    let mut idx = 0;
    while idx < pins.len() {
        mask |= 1 << pins[idx];
        idx += 1;
    }
    mask
}

/// One GPIO0 input
pub struct Input {
    pin: u8,
}

impl Input {
    pub const fn new(pin: u8) -> Input {
        assert!(pin < 16);
        Input { pin }
    }
}

impl ErrorType for Input {
    type Error = Infallible;
}

impl InputPin for Input {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        // SAFETY: reading the data register has no side effects
        let data = unsafe { read_volatile(reg(GPIO0_BASE, GPIO_DATA)) };
        Ok(data & (1 << self.pin) != 0)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}

/// One GPIO0 output
///
/// Writes go through the masked-access window, so each is a single store
/// that leaves every other pin alone. Tasks can pre-empt each other mid-write
/// without corrupting each other's trace pins.
pub struct Output {
    pin: u8,
}

impl Output {
    pub const fn new(pin: u8) -> Output {
        assert!(pin < 16);
        Output { pin }
    }

    fn write(&mut self, high: bool) {
        let bit = 1u32 << self.pin;
        let (window, mask) = if self.pin < 8 {
            (GPIO_LB_MASKED, bit)
        } else {
            (GPIO_UB_MASKED, bit >> 8)
        };
        let value = if high { bit } else { 0 };
        // SAFETY: a masked write only changes the pins in `mask`
        unsafe {
            write_volatile(reg(GPIO0_BASE, window + (mask as usize) * 4), value);
        }
    }
}

impl ErrorType for Output {
    type Error = Infallible;
}

impl OutputPin for Output {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.write(true);
        Ok(())
    }
}

/// UART0, transmit only
///
/// Any number of these may exist; bytes from different tasks interleave in
/// whatever order the tasks run.
pub struct Uart0;

impl SerialPort for Uart0 {
    type Error = Infallible;

    fn put_char(&mut self, byte: u8) -> Result<(), Infallible> {
        // SAFETY: the CMSDK UART registers, polled then written
        unsafe {
            while read_volatile(reg(UART0_BASE, UART_STATE)) & UART_STATE_TX_FULL != 0 {
                core::hint::spin_loop();
            }
            write_volatile(reg(UART0_BASE, UART_DATA), u32::from(byte));
        }
        Ok(())
    }
}

/// Core clock cycles since the scheduler started
///
/// Made from the tick count and the SysTick current value, so it keeps
/// counting in QEMU, which does not model the DWT cycle counter.
pub struct TickClock;

impl Clock for TickClock {
    fn now(&self) -> u32 {
        loop {
            let ticks = edge_relay::now();
            let current = cortex_m::peripheral::SYST::get_current();
            // if a tick landed in between, the pair doesn't match; go again
            if ticks == edge_relay::now() {
                let into_tick = CYCLES_PER_TICK - 1 - current.min(CYCLES_PER_TICK - 1);
                return ticks.wrapping_mul(CYCLES_PER_TICK).wrapping_add(into_tick);
            }
        }
    }

    fn frequency(&self) -> u32 {
        SYSTEM_CLOCK_HZ
    }
}

// End of File
