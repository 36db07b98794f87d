//! Edge detection by polling
//!
//! An [`EdgeDetector`] turns a series of level samples into rising and
//! falling edges. It is armed for a rising edge to begin with, flips to
//! armed-for-falling when it sees one, and back again on the falling edge:
//!
//! | level | armed for | emits   | then armed for |
//! |-------|-----------|---------|----------------|
//! | high  | rising    | rising  | falling        |
//! | high  | falling   | steady  | falling        |
//! | low   | falling   | falling | rising         |
//! | low   | rising    | steady  | rising         |
//!
//! An [`EdgeMonitor`] wraps a detector around an input pin and publishes a
//! label for every sample, steady ones included, into an
//! [`EventChannel`](crate::event::EventChannel).

// Copyright (c) 2025 Ferrous Systems
// SPDX-License-Identifier: GPL-3.0-or-later

use embedded_hal::digital::InputPin;

use crate::Error;
use crate::event::{EventChannel, EventText, NO_EVENT};

/// The level of a digital input
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(is_high: bool) -> Level {
        if is_high { Level::High } else { Level::Low }
    }
}

/// Which edge the detector is waiting for
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Armed {
    Rising,
    Falling,
}

/// What one sample revealed
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
    /// No change since the last edge
    Steady,
}

/// The two-state edge detector
#[derive(Clone, Debug)]
pub struct EdgeDetector {
    armed: Armed,
}

impl EdgeDetector {
    /// A detector armed for a rising edge
    pub const fn new() -> EdgeDetector {
        EdgeDetector {
            armed: Armed::Rising,
        }
    }

    /// Which edge we are waiting for
    pub fn armed(&self) -> Armed {
        self.armed
    }

    /// Feed in one sample
    pub fn poll(&mut self, level: Level) -> Edge {
        match (level, self.armed) {
            (Level::High, Armed::Rising) => {
                self.armed = Armed::Falling;
                Edge::Rising
            }
            (Level::Low, Armed::Falling) => {
                self.armed = Armed::Rising;
                Edge::Falling
            }
            (Level::High, Armed::Falling) | (Level::Low, Armed::Rising) => Edge::Steady,
        }
    }
}

impl Default for EdgeDetector {
    fn default() -> Self {
        EdgeDetector::new()
    }
}

/// The text a monitor publishes for each kind of sample
#[derive(Copy, Clone, Debug)]
pub struct EdgeLabels {
    pub rising: EventText,
    pub falling: EventText,
    pub steady: EventText,
}

impl EdgeLabels {
    /// Labels with the usual "no event" for steady samples
    pub const fn new(rising: EventText, falling: EventText) -> EdgeLabels {
        EdgeLabels {
            rising,
            falling,
            steady: NO_EVENT,
        }
    }

    /// Pick the label for an edge
    pub fn label(&self, edge: Edge) -> EventText {
        match edge {
            Edge::Rising => self.rising,
            Edge::Falling => self.falling,
            Edge::Steady => self.steady,
        }
    }
}

/// Polls one input and publishes what it saw
pub struct EdgeMonitor<I> {
    input: I,
    detector: EdgeDetector,
    labels: EdgeLabels,
}

impl<I: InputPin> EdgeMonitor<I> {
    /// Create a monitor, armed for a rising edge
    pub fn new(input: I, labels: EdgeLabels) -> EdgeMonitor<I> {
        EdgeMonitor {
            input,
            detector: EdgeDetector::new(),
            labels,
        }
    }

    /// Which edge we are waiting for
    pub fn armed(&self) -> Armed {
        self.detector.armed()
    }

    /// Sample the input once and publish the result, overwriting whatever
    /// was in the channel
    ///
    /// If the pin cannot be read, nothing is published and the detector
    /// keeps its state.
    pub fn cycle<C: EventChannel + ?Sized>(&mut self, channel: &C) -> Result<Edge, Error> {
        let level = Level::from(self.input.is_high().map_err(Error::gpio)?);
        let edge = self.detector.poll(level);
        channel.publish(self.labels.label(edge));
        Ok(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventChannel, RacyEventRecord};
    use crate::testutil::MockInput;
    use Level::{High, Low};

    const BUTTON_1: EdgeLabels = EdgeLabels::new(c"button 1 rising edge", c"button 1 falling edge");
    const BUTTON_2: EdgeLabels = EdgeLabels::new(c"button 2 rising edge", c"button 2 falling edge");

    #[test]
    fn decision_table() {
        let cases = [
            (High, Armed::Rising, Edge::Rising, Armed::Falling),
            (High, Armed::Falling, Edge::Steady, Armed::Falling),
            (Low, Armed::Falling, Edge::Falling, Armed::Rising),
            (Low, Armed::Rising, Edge::Steady, Armed::Rising),
        ];
        for (level, armed, edge, next) in cases {
            let mut detector = EdgeDetector { armed };
            assert_eq!(detector.poll(level), edge, "{level:?} while armed for {armed:?}");
            assert_eq!(detector.armed(), next);
        }
    }

    #[test]
    fn any_sample_sequence_follows_the_table() {
        // every 8-sample pattern
        for pattern in 0u8..=255 {
            let mut detector = EdgeDetector::new();
            let mut armed = Armed::Rising;
            for bit in 0..8 {
                let level = Level::from(pattern & (1 << bit) != 0);
                let expected = match (level, armed) {
                    (High, Armed::Rising) => Edge::Rising,
                    (Low, Armed::Falling) => Edge::Falling,
                    _ => Edge::Steady,
                };
                if expected != Edge::Steady {
                    armed = if level == High { Armed::Falling } else { Armed::Rising };
                }
                assert_eq!(detector.poll(level), expected);
                assert_eq!(detector.armed(), armed);
            }
        }
    }

    #[test]
    fn held_level_is_steady_after_the_edge() {
        for level in [High, Low] {
            let mut detector = EdgeDetector::new();
            if level == Low {
                // get armed for falling first
                detector.poll(High);
            }
            assert_ne!(detector.poll(level), Edge::Steady);
            for _ in 0..10 {
                assert_eq!(detector.poll(level), Edge::Steady);
            }
        }
    }

    #[test]
    fn press_and_release_publishes_in_order() {
        let record = RacyEventRecord::new();
        let mut monitor = EdgeMonitor::new(MockInput::new(&[false, true, true, false]), BUTTON_1);
        let mut published = Vec::new();
        for _ in 0..4 {
            monitor.cycle(&record).unwrap();
            published.push(record.text().unwrap());
        }
        assert_eq!(
            published,
            [
                c"no event",
                c"button 1 rising edge",
                c"no event",
                c"button 1 falling edge"
            ]
        );
        assert_eq!(monitor.armed(), Armed::Rising);
    }

    #[test]
    fn monitors_keep_separate_state_but_share_the_record() {
        let record = RacyEventRecord::new();
        let mut first = EdgeMonitor::new(MockInput::new(&[true, true]), BUTTON_1);
        let mut second = EdgeMonitor::new(MockInput::new(&[false, true]), BUTTON_2);

        assert_eq!(first.cycle(&record), Ok(Edge::Rising));
        // the second monitor's steady sample hides the first one's edge
        assert_eq!(second.cycle(&record), Ok(Edge::Steady));
        assert_eq!(record.text(), Some(NO_EVENT));

        assert_eq!(first.cycle(&record), Ok(Edge::Steady));
        assert_eq!(second.cycle(&record), Ok(Edge::Rising));
        assert_eq!(record.text(), Some(c"button 2 rising edge"));
        assert_eq!(first.armed(), Armed::Falling);
        assert_eq!(second.armed(), Armed::Falling);
    }

    #[test]
    fn read_failure_publishes_nothing() {
        let record = RacyEventRecord::new();
        let mut monitor = EdgeMonitor::new(MockInput::failing(), BUTTON_1);
        assert!(matches!(monitor.cycle(&record), Err(Error::Gpio(_))));
        assert_eq!(record.snapshot().text, None);
        assert_eq!(monitor.armed(), Armed::Rising);
    }
}

// End of File
