//! The single-slot record that carries the latest event from the edge
//! monitors to the transmitters
//!
//! Two flavours share the [`EventChannel`] trait:
//!
//! * [`RacyEventRecord`] keeps the text and the length in two independent
//!   cells. Producers and consumers touch them without any locking, so a
//!   reader can pair the text of one cycle with the length of another. This
//!   is the record the firmware uses.
//! * [`LockedEventRecord`] moves text and length together inside one
//!   critical section, so every snapshot is self-consistent.

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use core::cell::Cell;
use core::ffi::{CStr, c_char};
use core::sync::atomic::{AtomicPtr, AtomicU16, Ordering};

use critical_section::Mutex;

/// The text of an event: a NUL-terminated string that lives forever
pub type EventText = &'static CStr;

/// What a monitor publishes when its input has not changed
pub const NO_EVENT: EventText = c"no event";

/// A text and length pair, as one reader saw them
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EventSnapshot {
    /// The published text, if any monitor has run yet
    pub text: Option<EventText>,
    /// The length most recently computed by the periodic transmitter
    pub length: u16,
}

impl EventSnapshot {
    /// Nothing published, nothing measured
    pub const EMPTY: EventSnapshot = EventSnapshot {
        text: None,
        length: 0,
    };

    /// The bytes a transmitter sends for this snapshot
    ///
    /// The text cut to `length` bytes. A stale length longer than the text
    /// stops at the terminator rather than reading past it.
    pub fn bytes(&self) -> &'static [u8] {
        match self.text {
            Some(text) => {
                let bytes = text.to_bytes();
                &bytes[..usize::from(self.length).min(bytes.len())]
            }
            None => &[],
        }
    }
}

/// A mailbox holding the most recent event, written by many tasks and read
/// by many others
pub trait EventChannel: Sync {
    /// Replace the current event text
    fn publish(&self, text: EventText);

    /// Measure whatever text is visible now and store the result as the
    /// length
    ///
    /// Returns the new length, or `None` (leaving the length alone) if
    /// nothing has been published yet.
    fn refresh_length(&self, measure: fn(EventText) -> u16) -> Option<u16>;

    /// Read the text and length
    fn snapshot(&self) -> EventSnapshot;
}

/// The unsynchronised event record
///
/// Each field is a word-sized relaxed atomic: a plain load or store on the
/// target, with no ordering between the two fields.
pub struct RacyEventRecord {
    text: AtomicPtr<c_char>,
    length: AtomicU16,
}

impl RacyEventRecord {
    /// Create a record with no text and a zero length
    pub const fn new() -> RacyEventRecord {
        RacyEventRecord {
            text: AtomicPtr::new(core::ptr::null_mut()),
            length: AtomicU16::new(0),
        }
    }

    /// The text as it is right now
    pub fn text(&self) -> Option<EventText> {
        let ptr = self.text.load(Ordering::Relaxed);
        if ptr.is_null() {
            None
        } else {
            // SAFETY: the only non-null values ever stored come from
            // `&'static CStr`s in `publish`
            Some(unsafe { CStr::from_ptr(ptr) })
        }
    }

    /// The length as it is right now
    pub fn length(&self) -> u16 {
        self.length.load(Ordering::Relaxed)
    }
}

impl Default for RacyEventRecord {
    fn default() -> Self {
        RacyEventRecord::new()
    }
}

impl EventChannel for RacyEventRecord {
    fn publish(&self, text: EventText) {
        self.text.store(text.as_ptr().cast_mut(), Ordering::Relaxed);
    }

    fn refresh_length(&self, measure: fn(EventText) -> u16) -> Option<u16> {
        let text = self.text()?;
        let length = measure(text);
        // a monitor may have published again by now; that is allowed
        self.length.store(length, Ordering::Relaxed);
        Some(length)
    }

    fn snapshot(&self) -> EventSnapshot {
        let length = self.length();
        EventSnapshot {
            text: self.text(),
            length,
        }
    }
}

/// The hardened event record
///
/// `publish` stores the text together with its length, and every access
/// happens inside a critical section.
pub struct LockedEventRecord {
    slot: Mutex<Cell<EventSnapshot>>,
}

impl LockedEventRecord {
    /// Create a record with no text and a zero length
    pub const fn new() -> LockedEventRecord {
        LockedEventRecord {
            slot: Mutex::new(Cell::new(EventSnapshot::EMPTY)),
        }
    }
}

impl Default for LockedEventRecord {
    fn default() -> Self {
        LockedEventRecord::new()
    }
}

impl EventChannel for LockedEventRecord {
    fn publish(&self, text: EventText) {
        let length = u16::try_from(text.count_bytes()).unwrap_or(u16::MAX);
        critical_section::with(|cs| {
            self.slot.borrow(cs).set(EventSnapshot {
                text: Some(text),
                length,
            })
        });
    }

    fn refresh_length(&self, measure: fn(EventText) -> u16) -> Option<u16> {
        critical_section::with(|cs| {
            let slot = self.slot.borrow(cs);
            let mut event = slot.get();
            let length = measure(event.text?);
            event.length = length;
            slot.set(event);
            Some(length)
        })
    }

    fn snapshot(&self) -> EventSnapshot {
        critical_section::with(|cs| self.slot.borrow(cs).get())
    }
}


// End of File
