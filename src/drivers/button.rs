//! Push-button sampling and press classification.
//!
//! The board has one momentary button wired active-low. The task polls it
//! every 5 ms through the register's debounced read and classifies each
//! press by how long it was held: under 1.5 s is a short press, everything
//! else a long press. A press held past 10 s is reported as long while the
//! finger is still down, so the operator gets shutdown feedback without
//! having to let go.
//!
//! Classified events land in the context's single-slot mailbox; the
//! dispatcher consumes them on its next poll.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::context::DeviceContext;
use crate::drivers::pin_register::PinRegister;
use crate::pins::LogicalPin;

/// Classified button press.
///
/// Discriminants double as the mailbox wire values; `0` is reserved for
/// "empty slot".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SwitchEvent {
    ShortPress = 1,
    LongPress = 2,
}

impl SwitchEvent {
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::ShortPress),
            2 => Some(Self::LongPress),
            _ => None,
        }
    }
}

/// Held this long or more counts as a long press.
pub const LONG_PRESS_TICKS: u32 = 300;
/// Held this long emits `LongPress` immediately, without waiting for
/// release.
pub const FORCED_EMIT_TICKS: u32 = 2000;

/// Tick-driven press classifier.
///
/// Pure state machine, one [`tick`](Self::tick) per poll period. Kept free
/// of I/O so the timing rules are testable without a clock.
#[derive(Debug, Default)]
pub struct PressClassifier {
    state: State,
}

#[derive(Debug, Default, PartialEq, Eq)]
enum State {
    #[default]
    Released,
    Pressed {
        ticks: u32,
    },
    /// Long press already emitted; swallow ticks until release.
    Latched,
}

impl PressClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one poll period. `pressed` is the debounced, polarity-
    /// corrected button level. Returns an event at most once per press.
    pub fn tick(&mut self, pressed: bool) -> Option<SwitchEvent> {
        match (&mut self.state, pressed) {
            (State::Released, false) => None,
            (State::Released, true) => {
                self.state = State::Pressed { ticks: 1 };
                None
            }
            (State::Pressed { ticks }, true) => {
                *ticks += 1;
                if *ticks >= FORCED_EMIT_TICKS {
                    self.state = State::Latched;
                    Some(SwitchEvent::LongPress)
                } else {
                    None
                }
            }
            (State::Pressed { ticks }, false) => {
                let held = *ticks;
                self.state = State::Released;
                if held >= LONG_PRESS_TICKS {
                    Some(SwitchEvent::LongPress)
                } else {
                    Some(SwitchEvent::ShortPress)
                }
            }
            (State::Latched, true) => None,
            (State::Latched, false) => {
                self.state = State::Released;
                None
            }
        }
    }
}

/// Button polling task body.
pub fn run(ctx: Arc<DeviceContext>, register: Arc<PinRegister>, poll: Duration) {
    let mut classifier = PressClassifier::new();
    info!("button task up, polling every {:?}", poll);

    while ctx.is_running() {
        if ctx.selftest_active() {
            thread::sleep(Duration::from_millis(500));
            continue;
        }
        // Active-low: level low means the button is held.
        let pressed = !register.read_debounced(LogicalPin::PushButton);
        if let Some(event) = classifier.tick(pressed) {
            debug!("button event: {:?}", event);
            ctx.offer_switch_event(event);
        }
        thread::sleep(poll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hold_for(classifier: &mut PressClassifier, ticks: u32) -> Option<SwitchEvent> {
        for _ in 0..ticks {
            if let Some(event) = classifier.tick(true) {
                return Some(event);
            }
        }
        classifier.tick(false)
    }

    #[test]
    fn quick_tap_is_short() {
        let mut c = PressClassifier::new();
        assert_eq!(hold_for(&mut c, 10), Some(SwitchEvent::ShortPress));
    }

    #[test]
    fn boundary_is_long() {
        let mut c = PressClassifier::new();
        assert_eq!(hold_for(&mut c, 299), Some(SwitchEvent::ShortPress));
        assert_eq!(hold_for(&mut c, 300), Some(SwitchEvent::LongPress));
    }

    #[test]
    fn marathon_hold_emits_before_release() {
        let mut c = PressClassifier::new();
        let mut emitted = None;
        for tick in 1..=FORCED_EMIT_TICKS {
            if let Some(event) = c.tick(true) {
                emitted = Some((tick, event));
                break;
            }
        }
        assert_eq!(emitted, Some((FORCED_EMIT_TICKS, SwitchEvent::LongPress)));
        // Still held: no repeat.
        assert_eq!(c.tick(true), None);
        assert_eq!(c.tick(true), None);
        // Release is silent after the forced emit.
        assert_eq!(c.tick(false), None);
        // Next press starts a fresh cycle.
        assert_eq!(hold_for(&mut c, 5), Some(SwitchEvent::ShortPress));
    }

    #[test]
    fn idle_emits_nothing() {
        let mut c = PressClassifier::new();
        for _ in 0..1000 {
            assert_eq!(c.tick(false), None);
        }
    }

    proptest! {
        /// Every completed press yields exactly one event.
        #[test]
        fn one_event_per_press(held in 1u32..FORCED_EMIT_TICKS + 500) {
            let mut c = PressClassifier::new();
            let mut events = 0;
            for _ in 0..held {
                if c.tick(true).is_some() {
                    events += 1;
                }
            }
            if c.tick(false).is_some() {
                events += 1;
            }
            prop_assert_eq!(events, 1);
        }

        /// Short vs long splits exactly at the threshold.
        #[test]
        fn threshold_split(held in 1u32..FORCED_EMIT_TICKS) {
            let mut c = PressClassifier::new();
            let event = hold_for(&mut c, held);
            let expected = if held >= LONG_PRESS_TICKS {
                SwitchEvent::LongPress
            } else {
                SwitchEvent::ShortPress
            };
            prop_assert_eq!(event, Some(expected));
        }
    }
}
